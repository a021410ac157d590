use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - iTunes base URL is set and timeout is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.itunes.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "itunes.base_url cannot be empty".to_string(),
        ));
    }

    if config.itunes.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "itunes.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
