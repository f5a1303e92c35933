//! Provider client configuration

/// Default endpoint of the step-execution function
pub const DEFAULT_ENDPOINT: &str = "http://localhost:54321/functions/v1/execute-pipeline-step";

/// Configuration for the HTTP generation client
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// URL that accepts `POST {prompt, stepId, stream}` and answers with a frame stream
    pub endpoint: String,

    /// Sent as a bearer token when present
    pub api_key: Option<String>,

    /// Connect timeout in seconds. No overall request timeout is applied;
    /// callers bound a run through cancellation instead.
    pub connect_timeout_secs: Option<u64>,

    /// Overrides the default `User-Agent` header
    pub user_agent: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            connect_timeout_secs: None,
            user_agent: None,
        }
    }
}

impl ProviderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = Some(secs);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}
