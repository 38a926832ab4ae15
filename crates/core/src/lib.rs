pub mod cache;
pub mod catalog;
pub mod consensus;
pub mod domain;
pub mod error;
pub mod numeric;
pub mod orchestrator;
pub mod provider;
pub mod retry;
pub mod threshold;

pub mod config {
    use anyhow::Context;
    use std::path::PathBuf;
    use std::time::Duration;

    const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
    const DEFAULT_MIN_DELAY_MS: u64 = 1000;
    const DEFAULT_MAX_RETRIES: u32 = 2;
    const DEFAULT_BACKOFF_BASE_MS: u64 = 1000;
    const DEFAULT_ATTEMPT_TIMEOUT_SECS: u64 = 10;
    const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 45;
    const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;
    const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;
    const DEFAULT_PORT: u16 = 8000;
    const DEFAULT_ANALYZE_TIMEOUT_SECS: u64 = 90;
    const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub cache_ttl: Duration,
        pub provider_min_delay: Duration,
        pub provider_max_retries: u32,
        pub provider_backoff_base: Duration,
        pub provider_attempt_timeout: Duration,
        pub provider_timeout: Duration,
        pub max_concurrent_fetches: usize,
        pub http_timeout: Duration,
        pub http_user_agent: String,
        pub metrics_config: Option<PathBuf>,
        pub use_fixtures: bool,
        /// API server only.
        pub port: u16,
        /// API server only: bound on one whole analyze request.
        pub analyze_timeout: Duration,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                sentry_dsn: None,
                cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
                provider_min_delay: Duration::from_millis(DEFAULT_MIN_DELAY_MS),
                provider_max_retries: DEFAULT_MAX_RETRIES,
                provider_backoff_base: Duration::from_millis(DEFAULT_BACKOFF_BASE_MS),
                provider_attempt_timeout: Duration::from_secs(DEFAULT_ATTEMPT_TIMEOUT_SECS),
                provider_timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
                max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
                http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
                http_user_agent: DEFAULT_USER_AGENT.to_string(),
                metrics_config: None,
                use_fixtures: false,
                port: DEFAULT_PORT,
                analyze_timeout: Duration::from_secs(DEFAULT_ANALYZE_TIMEOUT_SECS),
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let defaults = Self::default();
            Ok(Self {
                sentry_dsn: std::env::var("SENTRY_DSN").ok().filter(|s| !s.trim().is_empty()),
                cache_ttl: env_secs("CACHE_TTL_SECS").unwrap_or(defaults.cache_ttl),
                provider_min_delay: env_millis("PROVIDER_MIN_DELAY_MS")
                    .unwrap_or(defaults.provider_min_delay),
                provider_max_retries: env_parse("PROVIDER_MAX_RETRIES")
                    .unwrap_or(defaults.provider_max_retries),
                provider_backoff_base: env_millis("PROVIDER_BACKOFF_BASE_MS")
                    .unwrap_or(defaults.provider_backoff_base),
                provider_attempt_timeout: env_secs("PROVIDER_ATTEMPT_TIMEOUT_SECS")
                    .unwrap_or(defaults.provider_attempt_timeout),
                provider_timeout: env_secs("PROVIDER_TIMEOUT_SECS")
                    .unwrap_or(defaults.provider_timeout),
                max_concurrent_fetches: env_parse::<usize>("MAX_CONCURRENT_FETCHES")
                    .filter(|n| *n > 0)
                    .unwrap_or(defaults.max_concurrent_fetches),
                http_timeout: env_secs("HTTP_TIMEOUT_SECS").unwrap_or(defaults.http_timeout),
                http_user_agent: std::env::var("HTTP_USER_AGENT")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or(defaults.http_user_agent),
                metrics_config: std::env::var("METRICS_CONFIG")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .map(PathBuf::from),
                use_fixtures: env_flag("USE_FIXTURES"),
                port: env_parse("PORT").unwrap_or(defaults.port),
                analyze_timeout: env_secs("ANALYZE_TIMEOUT_SECS")
                    .unwrap_or(defaults.analyze_timeout),
            })
        }

        pub fn http_client(&self) -> anyhow::Result<reqwest::Client> {
            reqwest::Client::builder()
                .timeout(self.http_timeout)
                .user_agent(self.http_user_agent.clone())
                .build()
                .context("failed to build provider http client")
        }
    }

    fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
        std::env::var(key).ok().and_then(|s| s.trim().parse::<T>().ok())
    }

    fn env_secs(key: &str) -> Option<Duration> {
        env_parse::<u64>(key).map(Duration::from_secs)
    }

    fn env_millis(key: &str) -> Option<Duration> {
        env_parse::<u64>(key).map(Duration::from_millis)
    }

    fn env_flag(key: &str) -> bool {
        std::env::var(key)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false)
    }

}
