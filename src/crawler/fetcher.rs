//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client (compression, cookie reuse, proxy)
//! - Shaping request headers with a rotating user agent
//! - Classifying transport failures
//!
//! The crawler only talks to the [`PageFetcher`] trait, so a rendered-page
//! backend can replace [`HttpFetcher`] without touching the controller.

use crate::config::{Config, RequestConfig};
use crate::state::TaskError;
use crate::ConfigError;
use async_trait::async_trait;
use rand::seq::IndexedRandom;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, UPGRADE_INSECURE_REQUESTS,
    USER_AGENT,
};
use reqwest::{Client, Proxy};
use std::time::Duration;

/// A fetched page, whatever its status
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code
    pub status_code: u16,

    /// Final URL after redirects
    pub final_url: String,

    /// Page body content
    pub body: String,
}

/// Capability to fetch a page with caller-supplied headers
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url`
    ///
    /// Non-success statuses are returned as pages; only failures to obtain
    /// a response at all are errors.
    async fn fetch(&self, url: &str, headers: HeaderMap) -> Result<FetchedPage, TaskError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The full configuration (timeouts and proxy)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client or parse the proxy URL
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .timeout(Duration::from_secs(config.crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .cookie_store(true)
        .gzip(true)
        .brotli(true);

    if let Some(proxy_config) = &config.proxy {
        let mut proxy = Proxy::all(&proxy_config.url)?;
        if let Some(username) = &proxy_config.username {
            proxy = proxy.basic_auth(username, proxy_config.password.as_deref().unwrap_or(""));
        }
        builder = builder.proxy(proxy);
    }

    builder.build()
}

/// Per-request header shaping
#[derive(Debug, Clone)]
pub struct RequestProfile {
    user_agents: Vec<HeaderValue>,
    accept: HeaderValue,
    accept_language: HeaderValue,
}

impl RequestProfile {
    /// Validates configured header values once, up front
    pub fn from_config(config: &RequestConfig) -> Result<Self, ConfigError> {
        let header = |name: &str, value: &str| {
            HeaderValue::from_str(value).map_err(|e| {
                ConfigError::Validation(format!("Invalid {} header value {:?}: {}", name, value, e))
            })
        };

        let user_agents = config
            .user_agents
            .iter()
            .map(|ua| header("user-agent", ua))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            user_agents,
            accept: header("accept", &config.accept)?,
            accept_language: header("accept-language", &config.accept_language)?,
        })
    }

    /// Headers for one request, with a user agent drawn from the pool
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(user_agent) = self.user_agents.choose(&mut rand::rng()) {
            headers.insert(USER_AGENT, user_agent.clone());
        }
        headers.insert(ACCEPT, self.accept.clone());
        headers.insert(ACCEPT_LANGUAGE, self.accept_language.clone());
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers
    }
}

/// reqwest-backed page fetcher
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, headers: HeaderMap) -> Result<FetchedPage, TaskError> {
        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.text().await.map_err(|e| classify_error(url, e))?;

        Ok(FetchedPage {
            status_code,
            final_url,
            body,
        })
    }
}

fn classify_error(url: &str, error: reqwest::Error) -> TaskError {
    if error.is_timeout() {
        TaskError::Timeout {
            url: url.to_string(),
        }
    } else {
        TaskError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
