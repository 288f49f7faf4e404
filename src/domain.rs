//! ドメイン層
//!
//! デプロイと本番機能インストールのドメインモデルを含む層

pub mod deployment;
pub mod environment;
pub mod provisioning;
pub mod shared;
