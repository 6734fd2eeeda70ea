use crate::config::types::{
    Config, CrawlerConfig, LinkCheckConfig, ServerConfig, StorageConfig, UserAgentConfig,
};
use crate::{ConfigError, ConfigResult};
use std::net::SocketAddr;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_server_config(&config.server)?;
    validate_crawler_config(&config.crawler)?;
    validate_link_check_config(&config.link_check)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_storage_config(&config.storage)?;
    Ok(())
}

/// Validates server configuration
fn validate_server_config(config: &ServerConfig) -> ConfigResult<()> {
    config.bind_address.parse::<SocketAddr>().map_err(|e| {
        ConfigError::Validation(format!(
            "bind_address must be a socket address like 127.0.0.1:8080, got '{}': {}",
            config.bind_address, e
        ))
    })?;

    Url::parse(&config.allowed_origin)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid allowed_origin: {}", e)))?;

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.page_timeout < 1 || config.page_timeout > 300 {
        return Err(ConfigError::Validation(format!(
            "page_timeout must be between 1 and 300 seconds, got {}",
            config.page_timeout
        )));
    }

    if config.max_redirects > 20 {
        return Err(ConfigError::Validation(format!(
            "max_redirects must be <= 20, got {}",
            config.max_redirects
        )));
    }

    if config.max_concurrent_crawls < 1 || config.max_concurrent_crawls > 64 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_crawls must be between 1 and 64, got {}",
            config.max_concurrent_crawls
        )));
    }

    Ok(())
}

/// Validates link check configuration
fn validate_link_check_config(config: &LinkCheckConfig) -> ConfigResult<()> {
    if config.probe_timeout < 1 || config.probe_timeout > 60 {
        return Err(ConfigError::Validation(format!(
            "probe_timeout must be between 1 and 60 seconds, got {}",
            config.probe_timeout
        )));
    }

    if config.max_concurrent_probes < 1 || config.max_concurrent_probes > 64 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_probes must be between 1 and 64, got {}",
            config.max_concurrent_probes
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> ConfigResult<()> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> ConfigResult<()> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    // Must contain exactly one @ with text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
