use crate::domain::deployment::{
    DeployError, HealthCheckSettings, HealthProbe, HealthReport, ProbeOutcome,
};
use crate::domain::environment::RuntimeCapabilities;
use std::sync::Arc;
use tracing::{info, warn};

/// ダッシュボードの応答を有限回のポーリングで確認するユースケース
pub struct VerifyHealthUseCase {
    probe: Arc<dyn HealthProbe>,
    settings: HealthCheckSettings,
}

impl VerifyHealthUseCase {
    pub fn new(probe: Arc<dyn HealthProbe>, settings: HealthCheckSettings) -> Self {
        Self { probe, settings }
    }

    /// Waits for the settle delay, then polls with capped exponential
    /// backoff until the dashboard answers or attempts run out.
    pub async fn execute(
        &self,
        capabilities: &RuntimeCapabilities,
    ) -> Result<Option<HealthReport>, DeployError> {
        let url = self.probe.url();
        if capabilities.sandbox {
            info!("Sandbox environment: health check of {} skipped", url);
            return Ok(None);
        }

        info!(
            "Waiting {:?} for the dashboard to start...",
            self.settings.settle_delay
        );
        tokio::time::sleep(self.settings.settle_delay).await;

        let max_attempts = self.settings.max_attempts.max(1);
        let mut last = ProbeOutcome::Unreachable("not probed".to_string());

        for attempt in 1..=max_attempts {
            last = self.probe.probe().await;
            if let ProbeOutcome::Responded(status) = last {
                if last.is_healthy() {
                    info!("Dashboard is up at {} ({})", url, last);
                    return Ok(Some(HealthReport {
                        url,
                        attempts: attempt,
                        status,
                    }));
                }
            }

            if attempt < max_attempts {
                let delay = self.settings.backoff_after(attempt);
                warn!(
                    "Health check {}/{} for {}: {}; retrying in {:?}",
                    attempt, max_attempts, url, last, delay
                );
                tokio::time::sleep(delay).await;
            } else {
                warn!(
                    "Health check {}/{} for {}: {}",
                    attempt, max_attempts, url, last
                );
            }
        }

        Err(DeployError::HealthCheckFailed {
            url,
            attempts: max_attempts,
            last,
        })
    }
}
