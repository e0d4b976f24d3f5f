use super::{types::SyncConfig, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Remote timeout is not 0
/// - Concurrency limit, page budget and compaction threshold are not 0
/// - Id namespace is not empty
pub fn validate_config(config: &SyncConfig) -> Result<(), ConfigError> {
    if config.remote.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "remote.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.sync.concurrency_limit == 0 {
        return Err(ConfigError::ValidationError(
            "sync.concurrency_limit cannot be 0".to_string(),
        ));
    }

    if config.sync.incremental_page_budget == 0 {
        return Err(ConfigError::ValidationError(
            "sync.incremental_page_budget cannot be 0".to_string(),
        ));
    }

    if config.sync.compaction_threshold == 0 {
        return Err(ConfigError::ValidationError(
            "sync.compaction_threshold cannot be 0".to_string(),
        ));
    }

    if config.sync.id_namespace.is_empty() {
        return Err(ConfigError::ValidationError(
            "sync.id_namespace cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&SyncConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_zero_concurrency_fails() {
        let mut config = SyncConfig::default();
        config.sync.concurrency_limit = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let mut config = SyncConfig::default();
        config.remote.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_empty_namespace_fails() {
        let mut config = SyncConfig::default();
        config.sync.id_namespace = String::new();
        assert!(validate_config(&config).is_err());
    }
}
