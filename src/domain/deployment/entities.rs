use crate::domain::environment::RuntimeCapabilities;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

/// Lifecycle of the application container stack within one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContainerState {
    NotRunning,
    Built,
    Running,
}

impl ContainerState {
    /// Teardown is allowed from any state; otherwise the stack must move
    /// strictly forward: not-running → built → running.
    pub fn can_transition_to(self, next: ContainerState) -> bool {
        matches!(
            (self, next),
            (_, ContainerState::NotRunning)
                | (ContainerState::NotRunning, ContainerState::Built)
                | (ContainerState::Built, ContainerState::Running)
        )
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ContainerState::NotRunning => "not-running",
            ContainerState::Built => "built",
            ContainerState::Running => "running",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SyncOutcome {
    Updated { branch: String },
    Skipped { reason: String },
}

/// Result of a single health probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Responded(u16),
    Unreachable(String),
}

impl ProbeOutcome {
    /// Anything the server answers below 500 counts as up; a 5xx means the
    /// process is listening but the dashboard itself is broken.
    pub fn is_healthy(&self) -> bool {
        matches!(self, ProbeOutcome::Responded(status) if *status < 500)
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Responded(status) => write!(f, "HTTP {status}"),
            ProbeOutcome::Unreachable(reason) => write!(f, "unreachable ({reason})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheckSettings {
    pub settle_delay: Duration,
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub request_timeout: Duration,
}

impl Default for HealthCheckSettings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(5),
            max_attempts: 6,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(16),
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl HealthCheckSettings {
    /// Delay before attempt `attempt + 1`, doubling from the initial backoff.
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub url: String,
    pub attempts: u32,
    pub status: u16,
}

/// Keeps the deployment lock held until dropped.
pub struct LockLease {
    _guard: Box<dyn Send>,
}

impl LockLease {
    pub fn new<T: Send + 'static>(guard: T) -> Self {
        Self {
            _guard: Box::new(guard),
        }
    }
}

impl fmt::Debug for LockLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LockLease")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeploymentReport {
    pub run_id: Uuid,
    pub capabilities: RuntimeCapabilities,
    pub sync: SyncOutcome,
    /// `None` when orchestration was bypassed in the sandbox.
    pub container_state: Option<ContainerState>,
    pub hardened_paths: Vec<PathBuf>,
    pub health: Option<HealthReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_state_transitions() {
        use ContainerState::*;
        assert!(NotRunning.can_transition_to(Built));
        assert!(Built.can_transition_to(Running));
        assert!(Running.can_transition_to(NotRunning));
        assert!(Built.can_transition_to(NotRunning));
        assert!(!NotRunning.can_transition_to(Running));
        assert!(!Running.can_transition_to(Built));
        assert_eq!(NotRunning.to_string(), "not-running");
    }

    #[test]
    fn test_backoff_is_capped() {
        let settings = HealthCheckSettings::default();
        assert_eq!(settings.backoff_after(1), Duration::from_secs(1));
        assert_eq!(settings.backoff_after(2), Duration::from_secs(2));
        assert_eq!(settings.backoff_after(4), Duration::from_secs(8));
        assert_eq!(settings.backoff_after(5), Duration::from_secs(16));
        assert_eq!(settings.backoff_after(40), Duration::from_secs(16));
    }

    #[test]
    fn test_probe_outcome_health() {
        assert!(ProbeOutcome::Responded(200).is_healthy());
        assert!(ProbeOutcome::Responded(404).is_healthy());
        assert!(!ProbeOutcome::Responded(502).is_healthy());
        assert!(!ProbeOutcome::Unreachable("connection refused".into()).is_healthy());
    }
}
