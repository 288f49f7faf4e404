use crate::domain::environment::{
    DeploymentConfig, DeploymentConfigLoader, EnvironmentError, RuntimeCapabilities,
};
use std::sync::Arc;
use tracing::{info, warn};

/// デプロイ前提条件を検証するユースケース
///
/// 副作用はありません。変更を伴う処理の前に必ず実行します。
pub struct ValidateEnvironmentUseCase {
    config_loader: Arc<dyn DeploymentConfigLoader>,
}

impl ValidateEnvironmentUseCase {
    pub fn new(config_loader: Arc<dyn DeploymentConfigLoader>) -> Self {
        Self { config_loader }
    }

    /// Privilege gate shared by every mutating command.
    pub fn check_privileges(capabilities: &RuntimeCapabilities) -> Result<(), EnvironmentError> {
        if capabilities.may_mutate() {
            return Ok(());
        }
        Err(EnvironmentError::PermissionDenied(
            "This command requires root privileges. Please run with sudo.".to_string(),
        ))
    }

    /// Runs all deployment checks and returns the loaded configuration.
    pub fn execute(
        &self,
        capabilities: &RuntimeCapabilities,
    ) -> Result<DeploymentConfig, EnvironmentError> {
        info!("Validating deployment environment ({})...", capabilities.label());
        Self::check_privileges(capabilities)?;

        let config = self.config_loader.load()?;
        let missing = config.missing_required_keys();
        if !missing.is_empty() {
            return Err(EnvironmentError::ConfigIncomplete(
                missing.into_iter().map(String::from).collect(),
            ));
        }

        if config.has_ai_integration() {
            info!("AI integration key present");
        } else {
            warn!("OPENAI_API_KEY not set; AI-generated alert text is disabled");
        }

        info!("Environment validated ({})", config.source().display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    struct StaticLoader(Option<BTreeMap<String, String>>);

    impl DeploymentConfigLoader for StaticLoader {
        fn location(&self) -> PathBuf {
            PathBuf::from("/srv/volcano/.env")
        }

        fn exists(&self) -> bool {
            self.0.is_some()
        }

        fn load(&self) -> Result<DeploymentConfig, EnvironmentError> {
            match &self.0 {
                Some(values) => Ok(DeploymentConfig::new(self.location(), values.clone())),
                None => Err(EnvironmentError::ConfigMissing(self.location())),
            }
        }
    }

    fn complete() -> BTreeMap<String, String> {
        [
            ("DATABASE_URL", "sqlite:///data/volcano_dashboard.db"),
            ("TWILIO_ACCOUNT_SID", "AC123"),
            ("TWILIO_AUTH_TOKEN", "secret"),
            ("TWILIO_PHONE_NUMBER", "+15550100"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_non_root_outside_sandbox_is_denied() {
        let use_case = ValidateEnvironmentUseCase::new(Arc::new(StaticLoader(Some(complete()))));
        let caps = RuntimeCapabilities {
            has_root: false,
            ..RuntimeCapabilities::full_server()
        };

        let err = use_case.execute(&caps).unwrap_err();
        assert!(matches!(err, EnvironmentError::PermissionDenied(_)));
    }

    #[test]
    fn test_sandbox_passes_without_root() {
        assert!(
            ValidateEnvironmentUseCase::check_privileges(&RuntimeCapabilities::restricted_sandbox())
                .is_ok()
        );
    }

    #[test]
    fn test_missing_config() {
        let use_case = ValidateEnvironmentUseCase::new(Arc::new(StaticLoader(None)));
        let err = use_case
            .execute(&RuntimeCapabilities::full_server())
            .unwrap_err();
        assert!(matches!(err, EnvironmentError::ConfigMissing(_)));
    }

    #[test]
    fn test_blank_required_key_is_reported() {
        let mut values = complete();
        values.insert("TWILIO_AUTH_TOKEN".to_string(), "  ".to_string());
        values.remove("DATABASE_URL");
        let use_case = ValidateEnvironmentUseCase::new(Arc::new(StaticLoader(Some(values))));

        match use_case.execute(&RuntimeCapabilities::full_server()) {
            Err(EnvironmentError::ConfigIncomplete(keys)) => {
                assert_eq!(keys, vec!["DATABASE_URL", "TWILIO_AUTH_TOKEN"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_complete_config_is_returned() {
        let use_case = ValidateEnvironmentUseCase::new(Arc::new(StaticLoader(Some(complete()))));
        let config = use_case.execute(&RuntimeCapabilities::full_server()).unwrap();
        assert_eq!(config.get("TWILIO_ACCOUNT_SID"), Some("AC123"));
        assert!(!config.has_ai_integration());
    }
}
