//! デプロイメントドメイン
//!
//! ソース同期、コンテナ再構築、パーミッション強化、ヘルスチェックという
//! ベースデプロイの各ステップを表現します。

pub mod entities;
pub mod repositories;

// 主要な型の再エクスポート
pub use entities::{
    ContainerState, DeploymentReport, HealthCheckSettings, HealthReport, LockLease, ProbeOutcome,
    SyncOutcome,
};
pub use repositories::{
    ContainerOrchestrator, DeployError, DeploymentLock, HealthProbe, PermissionHardener,
    SourceSynchronizer,
};
