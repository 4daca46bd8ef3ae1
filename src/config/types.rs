use std::time::Duration;

/// Delay before the single retry of a failed URL
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Retry delay used in fast (test) mode
pub const FAST_RETRY_DELAY: Duration = Duration::from_millis(5);

/// Absolute timeout for one HTTP request, body included
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Minimum spacing between the starts of queued tasks
pub const DEFAULT_RATE_LIMIT_INTERVAL: Duration = Duration::from_secs(1);

/// Maximum number of redirects followed per request
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Main configuration structure for the URL processor
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Secret appended to extracted emails before hashing
    pub secret: String,

    /// Delay between a failed first attempt and its retry
    pub retry_delay: Duration,

    /// Timeout applied to every HTTP request
    pub fetch_timeout: Duration,

    /// Minimum time between sequentially queued task starts
    pub rate_limit_interval: Duration,

    /// Maximum redirects to follow before failing
    pub max_redirects: usize,

    /// Client identification
    pub user_agent: UserAgentConfig,
}

impl ProcessorConfig {
    /// Creates a configuration with production timings
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            retry_delay: DEFAULT_RETRY_DELAY,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            rate_limit_interval: DEFAULT_RATE_LIMIT_INTERVAL,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: UserAgentConfig::default(),
        }
    }

    /// Creates a configuration with a near-instant retry delay
    pub fn fast(secret: impl Into<String>) -> Self {
        Self::new(secret).with_retry_delay(FAST_RETRY_DELAY)
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_rate_limit_interval(mut self, interval: Duration) -> Self {
        self.rate_limit_interval = interval;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> crate::ConfigResult<()> {
        super::validate(self)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone)]
pub struct UserAgentConfig {
    /// Name of the client
    pub client_name: String,

    /// Version of the client
    pub client_version: String,

    /// URL with information about the client
    pub contact_url: String,
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.client_name, self.client_version, self.contact_url
        )
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            client_name: env!("CARGO_PKG_NAME").to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/bracket-fetch/bracket-fetch".to_string(),
        }
    }
}
