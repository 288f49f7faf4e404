//! # Volcano Deploy
//!
//! 火山監視ダッシュボードを本番環境へデプロイし、TLS終端付きリバースプロキシ、
//! 定期バックアップ、システム監視といった本番機能をインストールするツール
//!
//! このクレートは Domain-Driven Design (DDD) 原則に基づいて設計されており、
//! 以下の層に分かれています：
//!
//! - **Domain Layer**: デプロイとプロビジョニングのドメインモデル
//! - **Application Layer**: ユースケース
//! - **Infrastructure Layer**: git、docker compose、apt、nginx、certbot、cron、systemd との統合

// Rust 2024 Edition 準拠の構造
pub mod application;
pub mod config;
pub mod debug;
pub mod domain;
pub mod infrastructure;

// 公開API
pub use config::DeployConfig;
