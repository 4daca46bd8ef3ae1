use crate::config::types::{ProcessorConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &ProcessorConfig) -> Result<(), ConfigError> {
    validate_secret(&config.secret)?;
    validate_timings(config)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// The secret is the hashing key and must not be blank
fn validate_secret(secret: &str) -> Result<(), ConfigError> {
    if secret.trim().is_empty() {
        return Err(ConfigError::Validation("secret cannot be empty".to_string()));
    }
    Ok(())
}

fn validate_timings(config: &ProcessorConfig) -> Result<(), ConfigError> {
    if config.fetch_timeout.is_zero() {
        return Err(ConfigError::Validation(
            "fetch_timeout must be greater than zero".to_string(),
        ));
    }

    if config.max_redirects < 1 {
        return Err(ConfigError::Validation(format!(
            "max_redirects must be >= 1, got {}",
            config.max_redirects
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.client_name.is_empty() {
        return Err(ConfigError::Validation(
            "client_name cannot be empty".to_string(),
        ));
    }

    if !config
        .client_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "client_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.client_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}
