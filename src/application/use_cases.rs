pub mod deploy_application;
pub mod restart_stack;
pub mod setup_production;
pub mod show_deployment_info;
pub mod validate_environment;
pub mod verify_health;

pub use deploy_application::DeployApplicationUseCase;
pub use restart_stack::RestartStackUseCase;
pub use setup_production::{ProductionInstallers, SetupProductionUseCase};
pub use show_deployment_info::{DeploymentStatus, ShowDeploymentInfoUseCase};
pub use validate_environment::ValidateEnvironmentUseCase;
pub use verify_health::VerifyHealthUseCase;
