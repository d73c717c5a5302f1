use std::env;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:3001";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub request_timeout_ms: u64,
    pub cooldown_tick_interval_ms: u64,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_ms: 10_000,
            cooldown_tick_interval_ms: 1_000,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            api_url: env::var("API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            request_timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .unwrap_or(10_000),
            cooldown_tick_interval_ms: env::var("COOLDOWN_TICK_INTERVAL_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap_or(1_000),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.cooldown_tick_interval_ms)
    }

    /// Parses `log_level`, falling back to `Info` for unknown names.
    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }

    pub fn validate_and_log(&self) {
        log::info!("Application Configuration Loaded: {:?}", self);
        if self.cooldown_tick_interval_ms == 0 {
            log::error!("COOLDOWN_TICK_INTERVAL_MS cannot be zero.");
        }
    }
}
