//! 実行環境インフラストラクチャの実装
//!
//! 実行環境の能力検出と、デプロイ設定ファイル（.env）の読み込みを提供します。

mod env_file_loader;
mod linux_capability_probe;

// 公開APIの再エクスポート
pub use env_file_loader::{EnvFileLoader, parse_env_file};
pub use linux_capability_probe::LinuxCapabilityProbe;
