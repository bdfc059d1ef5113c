//! Configuration module for the JobTrack client.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::time::Duration;

use crate::errors::{ClientError, Result};
use crate::models::User;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the REST API (without the `/api` prefix)
    pub api_url: String,
    /// Base URL of the WebSocket broker
    pub ws_url: String,
    /// Broker application key
    pub app_key: String,
    /// Bearer token sent with every API request
    pub api_token: Option<String>,
    /// CSRF token sent with every API request
    pub csrf_token: Option<String>,
    /// Initial user, as embedded by the server-rendered page
    pub initial_user: Option<User>,
    /// Namespace prefix the server puts in front of broadcast event names
    pub event_namespace: String,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8000".to_string(),
            ws_url: "ws://127.0.0.1:6001".to_string(),
            app_key: "23d1749ad2b7bf6d3315".to_string(),
            api_token: None,
            csrf_token: None,
            initial_user: None,
            event_namespace: "App\\Events".to_string(),
            request_timeout: Duration::from_secs(30),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let api_url = env::var("JOBTRACK_API_URL").unwrap_or(defaults.api_url);
        let ws_url = env::var("JOBTRACK_WS_URL").unwrap_or(defaults.ws_url);
        let app_key = env::var("JOBTRACK_APP_KEY").unwrap_or(defaults.app_key);
        let api_token = env::var("JOBTRACK_API_TOKEN").ok();
        let csrf_token = env::var("JOBTRACK_CSRF_TOKEN").ok();

        let initial_user = match env::var("JOBTRACK_USER") {
            Ok(raw) => Some(User::from_meta(&raw)?),
            Err(_) => None,
        };

        let event_namespace =
            env::var("JOBTRACK_EVENT_NAMESPACE").unwrap_or(defaults.event_namespace);

        let request_timeout = match env::var("JOBTRACK_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(raw.parse().map_err(|_| {
                ClientError::config(format!("Invalid JOBTRACK_TIMEOUT_SECS: {}", raw))
            })?),
            Err(_) => defaults.request_timeout,
        };

        let log_level = env::var("JOBTRACK_LOG_LEVEL").unwrap_or(defaults.log_level);

        let log_format = match env::var("JOBTRACK_LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("text") | Err(_) => LogFormat::Text,
            Ok(other) => {
                return Err(ClientError::config(format!(
                    "Invalid JOBTRACK_LOG_FORMAT: {}",
                    other
                )))
            }
        };

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            ws_url: ws_url.trim_end_matches('/').to_string(),
            app_key,
            api_token,
            csrf_token,
            initial_user,
            event_namespace,
            request_timeout,
            log_level,
            log_format,
        })
    }

    /// Config pointing at a given API base URL, everything else default.
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: &[&str] = &[
        "JOBTRACK_API_URL",
        "JOBTRACK_WS_URL",
        "JOBTRACK_APP_KEY",
        "JOBTRACK_API_TOKEN",
        "JOBTRACK_CSRF_TOKEN",
        "JOBTRACK_USER",
        "JOBTRACK_EVENT_NAMESPACE",
        "JOBTRACK_TIMEOUT_SECS",
        "JOBTRACK_LOG_LEVEL",
        "JOBTRACK_LOG_FORMAT",
    ];

    // Environment variables are process-global; keep every env-touching
    // assertion in one test.
    #[test]
    fn test_config_from_env() {
        for var in VARS {
            env::remove_var(var);
        }

        let config = Config::from_env().unwrap();

        assert_eq!(config.api_url, "http://127.0.0.1:8000");
        assert_eq!(config.ws_url, "ws://127.0.0.1:6001");
        assert!(config.api_token.is_none());
        assert!(config.initial_user.is_none());
        assert_eq!(config.event_namespace, "App\\Events");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Text);

        env::set_var("JOBTRACK_API_URL", "https://jobs.example.com/");
        env::set_var("JOBTRACK_USER", r#"{"id":4,"is_technician":1,"dark_mode":true}"#);
        env::set_var("JOBTRACK_TIMEOUT_SECS", "5");
        env::set_var("JOBTRACK_LOG_FORMAT", "json");

        let config = Config::from_env().unwrap();
        assert_eq!(config.api_url, "https://jobs.example.com");
        let user = config.initial_user.unwrap();
        assert_eq!(user.id, 4);
        assert!(user.is_technician);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.log_format, LogFormat::Json);

        env::set_var("JOBTRACK_TIMEOUT_SECS", "soon");
        let err = Config::from_env().unwrap_err();
        assert_eq!(err.error_code(), crate::errors::codes::CONFIG_ERROR);

        for var in VARS {
            env::remove_var(var);
        }
    }
}
