use crate::config::types::{ArchiveConfig, Config, FetcherConfig, ProcessorConfig, ScannerConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    validate_archive_config(&config.archive)?;
    validate_processor_config(&config.processor)?;
    validate_scanner_config(&config.scanners)?;
    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates archive configuration
fn validate_archive_config(config: &ArchiveConfig) -> Result<(), ConfigError> {
    if config.directory.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "archive directory cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates processor configuration
fn validate_processor_config(config: &ProcessorConfig) -> Result<(), ConfigError> {
    if config.program.trim().is_empty() {
        return Err(ConfigError::Validation(
            "processor program cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates scanner configuration
fn validate_scanner_config(config: &ScannerConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.managed_area_root).map_err(|e| {
        ConfigError::InvalidUrl(format!(
            "Invalid managed_area_root '{}': {}",
            config.managed_area_root, e
        ))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "managed_area_root '{}' must use HTTP or HTTPS",
            config.managed_area_root
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_fetcher_config() {
        let mut config = FetcherConfig::default();
        assert!(validate_fetcher_config(&config).is_ok());

        config.user_agent = "  ".to_string();
        assert!(validate_fetcher_config(&config).is_err());

        let config = FetcherConfig {
            connect_timeout_secs: 0,
            ..FetcherConfig::default()
        };
        assert!(validate_fetcher_config(&config).is_err());
    }

    #[test]
    fn test_validate_processor_config() {
        let config = ProcessorConfig {
            program: String::new(),
            args: vec![],
        };
        assert!(validate_processor_config(&config).is_err());
    }

    #[test]
    fn test_validate_archive_config() {
        let config = ArchiveConfig {
            directory: "".into(),
        };
        assert!(validate_archive_config(&config).is_err());
    }

    #[test]
    fn test_validate_scanner_config() {
        let bad = ScannerConfig {
            managed_area_root: "not a url".to_string(),
        };
        assert!(matches!(
            validate_scanner_config(&bad),
            Err(ConfigError::InvalidUrl(_))
        ));

        let ftp = ScannerConfig {
            managed_area_root: "ftp://example.org/states/".to_string(),
        };
        assert!(matches!(
            validate_scanner_config(&ftp),
            Err(ConfigError::Validation(_))
        ));
    }
}
