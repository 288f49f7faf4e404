//! アプリケーション層
//!
//! ドメインのトレイトを組み合わせてデプロイと本番機能インストールの
//! ユースケースを実行します。

pub mod use_cases;
