use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use volcano_deploy::domain::provisioning::{FeatureSelection, ProvisionError};

#[derive(Parser, Debug)]
#[command(
    name = "volcano-deploy",
    author = "Volcano Dashboard Team",
    version,
    about = "Production deployment for the volcano monitoring dashboard",
    long_about = "Deploys the volcano monitoring dashboard container stack and installs production features (TLS reverse proxy, scheduled backups, system monitoring)"
)]
pub struct Cli {
    /// Project directory containing the compose file and .env
    #[arg(long, global = true, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pull, rebuild and restart the dashboard, then verify it responds
    Deploy,
    /// Install production features on this host (requires root privileges)
    #[command(name = "setup-production")]
    SetupProduction(SetupArgs),
    /// Show runtime capabilities, configuration and installed features
    #[command(name = "info")]
    Info {
        /// Show verbose output with detailed information
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct SetupArgs {
    /// Public host name for the reverse proxy and certificate
    #[arg(long, value_name = "HOST")]
    pub domain: Option<String>,
    /// Contact address for the certificate authority and monitor alerts
    #[arg(long, value_name = "ADDR")]
    pub email: Option<String>,
    /// Configure nginx with a Let's Encrypt certificate
    #[arg(long)]
    pub nginx: bool,
    /// Install the daily database backup
    #[arg(long)]
    pub backups: bool,
    /// Install the system monitor service
    #[arg(long)]
    pub monitoring: bool,
    /// Shorthand for --nginx --backups --monitoring
    #[arg(long)]
    pub all: bool,
}

impl SetupArgs {
    pub fn into_selection(self) -> Result<FeatureSelection, ProvisionError> {
        FeatureSelection::new(
            self.nginx || self.all,
            self.backups || self.all,
            self.monitoring || self.all,
            self.domain,
            self.email,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use volcano_deploy::domain::provisioning::Feature;

    fn setup_args(argv: &[&str]) -> SetupArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::SetupProduction(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_all_expands_to_every_feature() {
        let args = setup_args(&[
            "volcano-deploy",
            "setup-production",
            "--domain=volcano.example.org",
            "--email=ops@example.org",
            "--all",
        ]);
        let selection = args.into_selection().unwrap();
        assert_eq!(
            selection.requested(),
            vec![Feature::Nginx, Feature::Backups, Feature::Monitoring]
        );
    }

    #[test]
    fn test_nginx_without_domain_is_usage_error() {
        let args = setup_args(&["volcano-deploy", "setup-production", "--nginx"]);
        let err = args.into_selection().unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn test_no_flags_is_usage_error() {
        let args = setup_args(&["volcano-deploy", "setup-production"]);
        assert!(args.into_selection().unwrap_err().is_usage());
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        let err = Cli::try_parse_from(["volcano-deploy", "setup-production", "--ngnix"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_project_dir_is_global() {
        let cli =
            Cli::try_parse_from(["volcano-deploy", "deploy", "--project-dir", "/srv/volcano"]).unwrap();
        assert_eq!(cli.project_dir, Some(PathBuf::from("/srv/volcano")));
        assert!(matches!(cli.command, Commands::Deploy));
    }

    #[test]
    fn test_help_is_not_an_error_kind() {
        let err = Cli::try_parse_from(["volcano-deploy", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }
}
