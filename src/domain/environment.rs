//! 実行環境ドメイン
//!
//! デプロイ前提条件（権限、設定ファイル）と実行環境の能力を表現します。
//! サンドボックス環境とフルサーバー環境の違いは `RuntimeCapabilities` に
//! 一度だけ集約され、各ユースケースへ明示的に渡されます。

pub mod entities;
pub mod repositories;

// 主要な型の再エクスポート
pub use entities::{DeploymentConfig, OPTIONAL_KEYS, REQUIRED_KEYS, RuntimeCapabilities};
pub use repositories::{CapabilityProbe, DeploymentConfigLoader, EnvironmentError};
