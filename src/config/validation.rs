use crate::config::types::{
    Config, CrawlerConfig, OutputConfig, ProxyConfig, RequestConfig, SearchConfig, SiteConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_search_config(&config.search)?;
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_request_config(&config.request)?;
    if let Some(proxy) = &config.proxy {
        validate_proxy_config(proxy)?;
    }
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates search configuration
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.results_wanted < 1 {
        return Err(ConfigError::Validation(format!(
            "results_wanted must be >= 1, got {}",
            config.results_wanted
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    for seed in config.explicit_seeds() {
        validate_http_url(&seed, "start URL")?;
    }

    Ok(())
}

/// Validates site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    validate_http_url(&config.base_url, "base_url")?;

    if config.source.trim().is_empty() {
        return Err(ConfigError::Validation("source cannot be empty".to_string()));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrency < 1 || config.max_concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrency must be between 1 and 100, got {}",
            config.max_concurrency
        )));
    }

    if config.min_concurrency < 1 || config.min_concurrency > config.max_concurrency {
        return Err(ConfigError::Validation(format!(
            "min_concurrency must be between 1 and max_concurrency ({}), got {}",
            config.max_concurrency, config.min_concurrency
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.block_phrases.iter().any(|p| p.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "block_phrases cannot contain empty phrases".to_string(),
        ));
    }

    Ok(())
}

/// Validates request shaping configuration
fn validate_request_config(config: &RequestConfig) -> Result<(), ConfigError> {
    if config.user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "user_agents must contain at least one entry".to_string(),
        ));
    }

    if config.user_agents.iter().any(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "user_agents cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

/// Validates proxy configuration
fn validate_proxy_config(config: &ProxyConfig) -> Result<(), ConfigError> {
    validate_http_url(&config.url, "proxy url")?;

    if config.password.is_some() && config.username.is_none() {
        return Err(ConfigError::Validation(
            "proxy password given without a username".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation("output path cannot be empty".to_string()));
    }

    if config.batch_size < 1 {
        return Err(ConfigError::Validation(format!(
            "batch_size must be >= 1, got {}",
            config.batch_size
        )));
    }

    Ok(())
}

/// Checks that a string is an absolute http(s) URL
fn validate_http_url(value: &str, what: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", what, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            what, value
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
    fn test_concurrency_bounds() {
        let mut config = Config::default();
        config.crawler.min_concurrency = 5;
        config.crawler.max_concurrency = 4;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));

        config.crawler.min_concurrency = 0;
        config.crawler.max_concurrency = 4;
        assert!(validate(&config).is_err());

        config.crawler.min_concurrency = 1;
        config.crawler.max_concurrency = 101;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_invalid_start_url() {
        let mut config = Config::default();
        config.search.start_urls = vec!["not a url".to_string()];
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));

        config.search.start_urls = vec!["ftp://www.rozee.pk/list".to_string()];
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_zero_limits_rejected() {
        let mut config = Config::default();
        config.search.max_pages = 0;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.output.batch_size = 0;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.crawler.request_timeout_secs = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_user_agent_pool() {
        let mut config = Config::default();
        config.request.user_agents.clear();
        assert!(validate(&config).is_err());

        config.request.user_agents = vec!["  ".to_string()];
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_proxy_validation() {
        let mut config = Config::default();
        config.proxy = Some(ProxyConfig {
            url: "http://proxy.local:8080".to_string(),
            username: None,
            password: Some("secret".to_string()),
        });
        assert!(validate(&config).is_err());

        config.proxy = Some(ProxyConfig {
            url: "http://proxy.local:8080".to_string(),
            username: Some("user".to_string()),
            password: Some("secret".to_string()),
        });
        assert!(validate(&config).is_ok());
    }
}
