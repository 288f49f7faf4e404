mod cli;

use crate::cli::{Cli, Commands};
use clap::Parser;
use clap::error::ErrorKind;
use std::sync::Arc;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

use volcano_deploy::application::use_cases::{
    DeployApplicationUseCase, ProductionInstallers, SetupProductionUseCase,
    ShowDeploymentInfoUseCase, ValidateEnvironmentUseCase,
};
use volcano_deploy::config::DeployConfig;
use volcano_deploy::debug::debug_helpers::{dump_state, log_error_details, log_system_info};
use volcano_deploy::debug::{DebugConfig, init_logging};
use volcano_deploy::domain::environment::{CapabilityProbe, RuntimeCapabilities};
use volcano_deploy::infrastructure::command::{CommandRunner, SystemCommandRunner};
use volcano_deploy::infrastructure::deployment::{
    DockerComposeOrchestrator, FileDeploymentLock, GitSourceSynchronizer, HttpHealthProbe,
    UnixPermissionHardener,
};
use volcano_deploy::infrastructure::environment::{EnvFileLoader, LinuxCapabilityProbe};
use volcano_deploy::infrastructure::provisioning::{
    AptPackageManager, CertbotProvisioner, CronDScheduler, EmbeddedScriptInstaller,
    NginxProxyManager, SystemdSupervisor,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Usage errors exit 1 for the calling automation; help and version are not errors
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            e.print()?;
            std::process::exit(code);
        }
    };

    let config = match DeployConfig::from_env(cli.project_dir.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let capabilities =
        LinuxCapabilityProbe::new(&config.project_dir, config.sandbox_override).probe();

    // Initialize logging (logs/ is only created once the preconditions hold)
    let debug_config = if preconditions_hold(&cli.command, &config, &capabilities) {
        DebugConfig::production(&config.logs_dir)
    } else {
        DebugConfig {
            enable_file_logging: false,
            ..DebugConfig::default()
        }
    };
    if let Err(e) = init_logging(&debug_config) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let run_id = Uuid::new_v4();
    let span = info_span!("volcano_deploy", run_id = %run_id);
    let code = run(cli.command, config, capabilities, run_id)
        .instrument(span)
        .await;
    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}

const SETUP_USAGE: &str = "Usage: volcano-deploy setup-production [--domain=<host>] [--email=<addr>] [--nginx] [--backups] [--monitoring] [--all]";

/// Side-effect free checks deciding whether this run may write its log file.
/// `info` is read-only and never does.
fn preconditions_hold(
    command: &Commands,
    config: &DeployConfig,
    capabilities: &RuntimeCapabilities,
) -> bool {
    match command {
        Commands::Deploy => {
            ValidateEnvironmentUseCase::new(Arc::new(EnvFileLoader::new(&config.env_file)))
                .execute(capabilities)
                .is_ok()
        }
        Commands::SetupProduction(args) => {
            ValidateEnvironmentUseCase::check_privileges(capabilities).is_ok()
                && args.clone().into_selection().is_ok_and(|selection| {
                    SetupProductionUseCase::check_prerequisites(capabilities, &selection).is_ok()
                })
        }
        Commands::Info { .. } => false,
    }
}

async fn run(
    command: Commands,
    config: DeployConfig,
    capabilities: RuntimeCapabilities,
    run_id: Uuid,
) -> i32 {
    log_system_info();
    dump_state("capabilities", &capabilities);

    // Dependency injection
    let runner: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner::new());
    let config_loader = Arc::new(EnvFileLoader::new(&config.env_file));
    let lock = Arc::new(FileDeploymentLock::new(&config.lock_file));
    let orchestrator = Arc::new(DockerComposeOrchestrator::new(
        runner.clone(),
        &config.project_dir,
        &config.compose_file,
    ));
    let proxy = Arc::new(NginxProxyManager::new(runner.clone(), &config.nginx_dir));
    let scheduler = Arc::new(CronDScheduler::new(&config.cron_dir));
    let supervisor = Arc::new(SystemdSupervisor::new(runner.clone(), &config.systemd_dir));
    let scripts = Arc::new(EmbeddedScriptInstaller::new(&config.bin_dir));

    match command {
        Commands::Deploy => {
            info!("Executing deploy command...");
            let use_case = DeployApplicationUseCase::new(
                config_loader,
                lock,
                Arc::new(GitSourceSynchronizer::new(
                    runner.clone(),
                    &config.project_dir,
                    config.git_remote.clone(),
                    config.git_branch.clone(),
                )),
                orchestrator,
                Arc::new(UnixPermissionHardener::new(
                    vec![config.data_dir.clone(), config.logs_dir.clone()],
                    vec![config.backup_dir.clone()],
                )),
                Arc::new(HttpHealthProbe::new(
                    config.health_url(),
                    config.health.request_timeout,
                )),
                config.health.clone(),
            );

            match use_case.execute(&capabilities, run_id).await {
                Ok(report) => {
                    match report.health {
                        Some(health) => println!(
                            "✅ Deployment completed successfully! Dashboard is up at {} (HTTP {})",
                            health.url, health.status
                        ),
                        None => println!(
                            "✅ Deployment completed successfully! ({})",
                            capabilities.label()
                        ),
                    }
                    0
                }
                Err(e) => {
                    error!("Deployment failed: {}", e);
                    log_error_details(&e, "deploy");
                    eprintln!("❌ Deployment failed: {}", e);
                    if e.is_health_failure() {
                        eprintln!("⚠️  The containers are still running. Inspect them with:");
                        eprintln!(
                            "    docker compose -f {} logs --tail=100",
                            config.compose_file.display()
                        );
                    }
                    e.exit_code()
                }
            }
        }
        Commands::SetupProduction(args) => {
            info!("Executing setup-production command...");
            let selection = match args.into_selection() {
                Ok(selection) => selection,
                Err(e) => {
                    eprintln!("❌ {}", e);
                    eprintln!("{}", SETUP_USAGE);
                    return 1;
                }
            };

            let use_case = SetupProductionUseCase::new(
                ProductionInstallers {
                    packages: Arc::new(AptPackageManager::new(runner.clone())),
                    proxy,
                    certificates: Arc::new(CertbotProvisioner::new(runner.clone())),
                    scheduler,
                    supervisor,
                    scripts,
                },
                lock,
                orchestrator,
                config,
            );

            match use_case.execute(&capabilities, &selection, run_id).await {
                Ok(report) => {
                    println!("✅ Production setup completed successfully!");
                    for feature in &report.installed {
                        println!("   - {}: {}", feature.feature, feature.detail);
                    }
                    if !report.stack_rebuilt {
                        println!("⚠️  Container stack was not rebuilt ({})", capabilities.label());
                    }
                    0
                }
                Err(e) => {
                    error!("Production setup failed: {}", e);
                    log_error_details(&e, "setup-production");
                    eprintln!("❌ Production setup failed: {}", e);
                    e.exit_code()
                }
            }
        }
        Commands::Info { verbose } => {
            let use_case =
                ShowDeploymentInfoUseCase::new(config_loader, proxy, scheduler, supervisor, scripts);
            match use_case.execute(&capabilities, verbose) {
                Ok(()) => 0,
                Err(e) => {
                    eprintln!("❌ Failed to render deployment info: {}", e);
                    1
                }
            }
        }
    }
}
