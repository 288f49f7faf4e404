use crate::domain::provisioning::{
    CertificateProvisioner, ProvisionError, validate_domain, validate_email,
};
use crate::infrastructure::command::{CommandRunner, CommandSpec};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Obtains a Let's Encrypt certificate and wires it into nginx.
pub struct CertbotProvisioner {
    runner: Arc<dyn CommandRunner>,
}

impl CertbotProvisioner {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl CertificateProvisioner for CertbotProvisioner {
    async fn provision(&self, domain: &str, email: &str) -> Result<(), ProvisionError> {
        validate_domain(domain)?;
        validate_email(email)?;

        info!("Requesting certificate for {}...", domain);
        // --keep-until-expiring makes re-runs reinstall the existing
        // certificate instead of hitting the CA rate limit
        let spec = CommandSpec::new("certbot").args([
            "--nginx",
            "-d",
            domain,
            "--non-interactive",
            "--agree-tos",
            "-m",
            email,
            "--redirect",
            "--keep-until-expiring",
        ]);

        self.runner
            .run_checked(&spec)
            .await
            .map_err(|source| ProvisionError::CertificateFailed {
                domain: domain.to_string(),
                source,
            })?;

        info!("Certificate installed for {}", domain);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::command::testing::RecordingCommandRunner;

    #[tokio::test]
    async fn test_certbot_invocation() {
        let runner = Arc::new(RecordingCommandRunner::new());
        let certbot = CertbotProvisioner::new(runner.clone());

        certbot
            .provision("volcano.example.org", "ops@example.org")
            .await
            .unwrap();
        assert_eq!(
            runner.calls(),
            vec![
                "certbot --nginx -d volcano.example.org --non-interactive --agree-tos -m ops@example.org --redirect --keep-until-expiring"
            ]
        );
    }

    #[tokio::test]
    async fn test_rejects_injection_before_running() {
        let runner = Arc::new(RecordingCommandRunner::new());
        let certbot = CertbotProvisioner::new(runner.clone());

        let err = certbot
            .provision("volcano.example.org --staging", "ops@example.org")
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidDomain(_)));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_ca_failure_is_reported() {
        let runner = Arc::new(RecordingCommandRunner::new());
        runner.respond("certbot", 1, "");
        let certbot = CertbotProvisioner::new(runner);

        let err = certbot
            .provision("volcano.example.org", "ops@example.org")
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::CertificateFailed { .. }));
    }
}
