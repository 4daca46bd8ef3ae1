//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the processor, including:
//! - Building the HTTP client with the configured user agent and timeout
//! - GET requests with automatic redirect following
//! - Error classification
//! - The same-attempt https -> http protocol fallback

use crate::config::ProcessorConfig;
use crate::url::{downgrade_to_http, is_secure};
use crate::{FetchError, FetchResult};
use reqwest::{redirect::Policy, Client};
use std::error::Error as _;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The processor configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &ProcessorConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(config.fetch_timeout)
        .connect_timeout(config.fetch_timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches page bodies for the processor
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Creates a fetcher from the processor configuration
    pub fn new(config: &ProcessorConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Fetches a URL, applying the protocol fallback on first attempts
    ///
    /// # Request Flow
    ///
    /// 1. GET the URL (redirects followed, absolute timeout)
    /// 2. Non-2xx → `FetchError::Status`
    /// 3. On a connection-level failure of a first attempt against an
    ///    `https://` URL, re-issue the request once against `http://`
    ///    with the same host and path. The downgraded request never falls
    ///    back again, and retry attempts never downgrade.
    ///
    /// # Arguments
    ///
    /// * `url` - The canonical URL to fetch
    /// * `is_retry` - Whether this is the scheduled retry attempt
    ///
    /// # Returns
    ///
    /// The response body, or the error that ended this attempt
    pub async fn fetch(&self, url: &str, is_retry: bool) -> FetchResult<String> {
        let err = match self.get(url).await {
            Ok(body) => return Ok(body),
            Err(err) => err,
        };

        if is_retry || !is_secure(url) || !err.allows_protocol_fallback() {
            return Err(err);
        }

        let Some(insecure) = downgrade_to_http(url) else {
            return Err(err);
        };

        tracing::debug!(
            "Secure request to {} failed ({}), retrying as {}",
            url,
            err,
            insecure
        );
        self.get(&insecure).await
    }

    /// Issues a single GET request and reads the body
    async fn get(&self, url: &str) -> FetchResult<String> {
        let response = self.client.get(url).send().await.map_err(classify_error)?;
        let status = response.status();

        if !status.is_success() {
            tracing::debug!("{} answered with HTTP {}", url, status.as_u16());
            return Err(FetchError::Status {
                code: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Body(e.to_string())
            }
        })
    }
}

/// Classifies a reqwest error
///
/// | Condition | Result |
/// |-----------|--------|
/// | Timeout | `Timeout` |
/// | Connection refused, DNS, TLS handshake, certificate | `Transport` |
/// | Malformed URL | `InvalidUrl` |
/// | Anything else (redirect limit, protocol error) | `Request` |
///
/// reqwest performs the TLS handshake inside its connector, so handshake
/// and certificate failures report `is_connect()` like refused connections.
fn classify_error(err: reqwest::Error) -> FetchError {
    let message = error_chain(&err);

    if err.is_timeout() {
        FetchError::Timeout
    } else if err.is_connect() {
        FetchError::Transport { message }
    } else if err.is_builder() {
        FetchError::InvalidUrl(message)
    } else {
        FetchError::Request(message)
    }
}

/// Joins an error and all of its sources into one message
fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
