#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl Environment {
    /// Production logs are JSON lines; everything else is human-readable text.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        match self {
            Environment::Production => LogFormat::Json,
            Environment::Development | Environment::Test => LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Clone)]
pub struct AppConfig {
    /// Base URL of the devices API, e.g. `https://api.example.com/prod`.
    pub api_endpoint: String,
    pub env: Environment,
    pub log_level: String,
    /// Records submitted concurrently per import batch. Always positive.
    pub import_batch_size: usize,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Additional attempts for transient write failures. `0` disables retries.
    pub write_max_retries: u32,
    pub retry_backoff_base_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_endpoint", &self.api_endpoint)
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("import_batch_size", &self.import_batch_size)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("write_max_retries", &self.write_max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .finish()
    }
}
