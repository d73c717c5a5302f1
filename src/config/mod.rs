pub mod settings;

pub use settings::Config;

use crate::error::TrackerError;
use std::sync::Arc;
use url::Url;

/// Loads the configuration from the environment (and `.env` when present) and validates
/// it. `api_url_override` wins over `API_URL`, which is how the CLI flag is applied.
pub fn load_config(api_url_override: Option<String>) -> Result<Arc<Config>, TrackerError> {
    dotenv::dotenv().ok(); // Load .env file if present, ignore errors

    let mut config = Config::from_env();
    if let Some(api_url) = api_url_override {
        config.api_url = api_url;
    }

    validate(&config)?;
    config.validate_and_log();

    Ok(Arc::new(config))
}

pub fn validate(config: &Config) -> Result<(), TrackerError> {
    let url = Url::parse(&config.api_url)
        .map_err(|e| TrackerError::ConfigError(format!("API_URL '{}' is invalid: {}", config.api_url, e)))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(TrackerError::ConfigError(format!(
            "API_URL must use http or https, got '{}'",
            url.scheme()
        )));
    }
    if config.cooldown_tick_interval_ms == 0 {
        return Err(TrackerError::ConfigError(
            "COOLDOWN_TICK_INTERVAL_MS cannot be zero".to_string(),
        ));
    }
    if config.request_timeout_ms == 0 {
        return Err(TrackerError::ConfigError(
            "REQUEST_TIMEOUT_MS cannot be zero".to_string(),
        ));
    }
    Ok(())
}
