use std::path::PathBuf;

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

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Number of times a pending (HTTP 202) page is polled again before giving up.
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    /// Attribution link appended to shared and copied leads.
    pub site_url: String,
    pub resources_path: Option<PathBuf>,
    pub sources_path: Option<PathBuf>,
    pub cities_path: Option<PathBuf>,
    pub city_locations_path: Option<PathBuf>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The endpoint may carry an access token in its query string.
        let base_url = self
            .api_base_url
            .split_once('?')
            .map_or(self.api_base_url.as_str(), |(base, _)| base);
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("api_base_url", &base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("site_url", &self.site_url)
            .field("resources_path", &self.resources_path)
            .field("sources_path", &self.sources_path)
            .field("cities_path", &self.cities_path)
            .field("city_locations_path", &self.city_locations_path)
            .finish()
    }
}
