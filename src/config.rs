use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_PRIMARY_MODEL: &str = "gemini-3-pro-image-preview";
pub const DEFAULT_SECONDARY_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

/// Settings for the Gemini REST API and the fallback pipeline.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub request_timeout: Duration,
    pub primary_model: String,
    pub secondary_model: String,
    pub text_model: String,
    pub max_attempts: u32,
    /// Linear backoff unit: the wait after failed attempt `n` is `n * backoff_unit`.
    pub backoff_unit: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: Option<u16>,
    pub use_psql: bool,
    pub gemini: GeminiConfig,
    pub postgres: Option<PostgresConfig>,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        PostgresConfig {
            host: None,
            port: None,
            username: None,
            password: None,
            database: None,
        }
    }
}

impl PostgresConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        PostgresConfig {
            host: env::var("POSTGRES_HOST").ok(),
            port: env::var("POSTGRES_PORT").ok().and_then(|s| s.parse().ok()),
            username: env::var("POSTGRES_USERNAME").ok(),
            password: env::var("POSTGRES_PASSWORD").ok(),
            database: env::var("POSTGRES_DATABASE").ok(),
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_connection_info(
        mut self,
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
    ) -> Self {
        self.host = Some(host.into());
        self.port = Some(port);
        self.database = Some(database.into());
        self
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(60),
            primary_model: DEFAULT_PRIMARY_MODEL.to_string(),
            secondary_model: DEFAULT_SECONDARY_MODEL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            max_attempts: 2,
            backoff_unit: Duration::from_millis(3000),
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `GEMINI_API_KEY`, then `GOOGLE_API_KEY`, then `API_KEY`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let api_key = ["GEMINI_API_KEY", "GOOGLE_API_KEY", "API_KEY"]
            .iter()
            .find_map(|name| env::var(name).ok().filter(|v| !v.trim().is_empty()));
        let request_timeout = env::var("GEMINI_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        GeminiConfig {
            api_key,
            base_url: env::var("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            request_timeout,
            ..defaults
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_models(
        mut self,
        primary: impl Into<String>,
        secondary: impl Into<String>,
    ) -> Self {
        self.primary_model = primary.into();
        self.secondary_model = secondary.into();
        self
    }

    pub fn with_retry(mut self, max_attempts: u32, backoff_unit: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.backoff_unit = backoff_unit;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: None,
            use_psql: false,
            gemini: GeminiConfig::default(),
            postgres: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let port = env::var("PORT").ok().and_then(|port| port.parse().ok());
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let use_psql = env::var("USE_PSQL").ok().map_or(false, |val| val == "true");

        Config {
            host,
            port,
            use_psql,
            gemini: GeminiConfig::from_env(),
            postgres: use_psql.then(PostgresConfig::from_env),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = config;
        self
    }

    pub fn with_postgres(mut self, config: PostgresConfig) -> Self {
        self.postgres = Some(config);
        self.use_psql = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_defaults() {
        let config = GeminiConfig::new();
        assert_eq!(config.primary_model, "gemini-3-pro-image-preview");
        assert_eq!(config.secondary_model, "gemini-2.5-flash-image");
        assert_eq!(config.max_attempts, 2);
        assert_eq!(config.backoff_unit, Duration::from_millis(3000));
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_retry_attempts_never_zero() {
        let config = GeminiConfig::new().with_retry(0, Duration::from_millis(10));
        assert_eq!(config.max_attempts, 1);
    }

    #[test]
    fn test_with_postgres_enables_psql() {
        let config = Config::new().with_postgres(PostgresConfig::new().with_connection_info(
            "localhost",
            5432,
            "studio",
        ));
        assert!(config.use_psql);
        assert_eq!(config.postgres.unwrap().port, Some(5432));
    }
}
