//! Client configuration

/// Configuration for connecting to the retail backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL (e.g., "http://localhost:8080")
    pub base_url: String,

    /// Bearer token of the staff session
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl ClientConfig {
    /// Create a new configuration for the given backend.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: 30,
        }
    }

    /// Read the configuration from the environment, falling back to
    /// the defaults for anything unset.
    pub fn from_env() -> Self {
        let base = std::env::var("OPTICA_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());
        let mut config = Self::new(base);
        config.token = std::env::var("OPTICA_API_TOKEN").ok();
        config.timeout = std::env::var("OPTICA_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(config.timeout);
        config
    }

    /// Set the staff session token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Create an API client from this configuration.
    pub fn build_client(&self) -> crate::OpticaClient {
        crate::OpticaClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}
