use crate::catalog::ItemId;
use crate::presentation::format::cooldown_minutes;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TrackerError {
    /// Backend unreachable, non-success status or undecodable body on a list fetch
    #[error("Network Error: {0}")]
    NetworkError(String),

    /// Non-success HTTP status other than a rate-limit rejection
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Response body did not match the expected shape
    #[error("Parse Error: {0}")]
    ParseError(String),

    /// Local, pre-emptive rejection: the item is still cooling down
    #[error("Item is cooling down for another {0:?}")]
    Cooldown(Duration),

    /// Server-authoritative rejection (HTTP 429)
    #[error("Rate limited until {next_available}: {message}")]
    RateLimited {
        message: String,
        next_available: DateTime<Utc>,
    },

    /// Another refresh is already in flight
    #[error("A price refresh is already in progress")]
    Busy,

    /// Generic refresh failure; nothing was mutated
    #[error("Update Failed: {0}")]
    UpdateFailed(String),

    #[error("Item Not Found: {0}")]
    NotFound(ItemId),

    #[error("No item is selected")]
    NoSelection,

    #[error("Config Error: {0}")]
    ConfigError(String),
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::ParseError(format!("JSON deserialization error: {}", err))
    }
}

impl From<reqwest::Error> for TrackerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TrackerError::ParseError(format!("Response body error: {}", err))
        } else {
            TrackerError::NetworkError(format!("Request error: {}", err))
        }
    }
}

impl TrackerError {
    /// Whether a user-initiated retry can succeed without fixing anything first.
    pub fn is_recoverable(&self) -> bool {
        match self {
            TrackerError::NetworkError(_) => true,
            TrackerError::HttpStatus { status, .. } => *status >= 500,
            TrackerError::ParseError(_) => false,
            TrackerError::Cooldown(_) => true, // once the countdown elapses
            TrackerError::RateLimited { .. } => true,
            TrackerError::Busy => true,
            TrackerError::UpdateFailed(_) => true, // no local cooldown is imposed
            TrackerError::NotFound(_) => false,
            TrackerError::NoSelection => false,
            TrackerError::ConfigError(_) => false,
        }
    }

    pub fn categorize(&self) -> ErrorCategory {
        match self {
            TrackerError::NetworkError(_) | TrackerError::HttpStatus { .. } => {
                ErrorCategory::Network
            }
            TrackerError::ParseError(_) => ErrorCategory::Data,
            TrackerError::Cooldown(_) | TrackerError::RateLimited { .. } => {
                ErrorCategory::RateLimit
            }
            TrackerError::Busy => ErrorCategory::Concurrency,
            TrackerError::UpdateFailed(_) => ErrorCategory::Network,
            TrackerError::NotFound(_) | TrackerError::NoSelection => ErrorCategory::Usage,
            TrackerError::ConfigError(_) => ErrorCategory::Configuration,
        }
    }

    /// Text for the dashboard's error banner.
    pub fn user_message(&self) -> String {
        match self {
            TrackerError::NetworkError(_)
            | TrackerError::HttpStatus { .. }
            | TrackerError::ParseError(_) => {
                "Could not load the games. Is the backend running?".to_string()
            }
            TrackerError::Cooldown(remaining) => match cooldown_minutes(*remaining) {
                1 => "This game is cooling down. Wait 1 minute.".to_string(),
                minutes => format!("This game is cooling down. Wait {} minutes.", minutes),
            },
            TrackerError::RateLimited { message, .. } => message.clone(),
            TrackerError::Busy => "A price update is already running.".to_string(),
            TrackerError::UpdateFailed(_) => "Error while updating prices".to_string(),
            TrackerError::NotFound(id) => format!("Unknown game: {}", id),
            TrackerError::NoSelection => "Select a game first.".to_string(),
            TrackerError::ConfigError(msg) => format!("Configuration problem: {}", msg),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    RateLimit,
    Concurrency,
    Usage,
    Configuration,
}

pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_message_rounds_minutes_up() {
        let err = TrackerError::Cooldown(Duration::from_secs(61));
        assert_eq!(err.user_message(), "This game is cooling down. Wait 2 minutes.");
        assert_eq!(err.categorize(), ErrorCategory::RateLimit);
    }

    #[test]
    fn cooldown_message_is_singular_for_the_last_minute() {
        for secs in [1, 45, 60] {
            let err = TrackerError::Cooldown(Duration::from_secs(secs));
            assert_eq!(err.user_message(), "This game is cooling down. Wait 1 minute.");
        }
    }

    #[test]
    fn rate_limited_surfaces_server_message() {
        let err = TrackerError::RateLimited {
            message: "wait".to_string(),
            next_available: Utc::now(),
        };
        assert_eq!(err.user_message(), "wait");
        assert!(err.is_recoverable());
    }

    #[test]
    fn server_errors_are_recoverable_client_errors_are_not() {
        let server = TrackerError::HttpStatus { status: 503, body: String::new() };
        let client = TrackerError::HttpStatus { status: 404, body: String::new() };
        assert!(server.is_recoverable());
        assert!(!client.is_recoverable());
    }

    #[test]
    fn json_errors_become_parse_errors() {
        let err: TrackerError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, TrackerError::ParseError(_)));
    }
}
