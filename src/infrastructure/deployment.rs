//! デプロイインフラストラクチャの実装
//!
//! ドメイン層で定義されたデプロイ関連のトレイトの具体的な実装を提供します。
//! git によるソース同期、docker compose によるコンテナ再構築、
//! パーミッション強化、HTTPヘルスチェック、flock によるデプロイロックが含まれます。

mod docker_compose_orchestrator;
mod file_deployment_lock;
mod git_source_synchronizer;
mod http_health_probe;
mod unix_permission_hardener;

// 公開APIの再エクスポート
pub use docker_compose_orchestrator::{ComposeCommand, DockerComposeOrchestrator};
pub use file_deployment_lock::FileDeploymentLock;
pub use git_source_synchronizer::GitSourceSynchronizer;
pub use http_health_probe::HttpHealthProbe;
pub use unix_permission_hardener::{DIR_MODE, FILE_MODE, UnixPermissionHardener};
