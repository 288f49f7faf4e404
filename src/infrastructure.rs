//! インフラストラクチャ層
//!
//! ドメイン層で定義されたトレイトを Linux ホスト上で実装します。
//! 外部コマンドの実行、埋め込みアセット、デプロイ、実行環境、
//! 本番機能プロビジョニングの実装を含みます。

pub mod assets;
pub mod command;
pub mod deployment;
pub mod environment;
pub mod provisioning;
