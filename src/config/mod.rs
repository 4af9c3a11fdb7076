use crate::error::{KeystoneError, Result};
use crate::exception::InternalViewMessage;
use dashmap::DashMap;
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Configuration service
///
/// Flat key/value store. Keys are normalized so that `keystone.web.enabled` and the
/// environment variable `KEYSTONE_WEB_ENABLED` name the same entry.
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

fn normalize(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            '.' | '-' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

impl ConfigService {
    /// Loads the process environment. Entries that are not valid UTF-8 are skipped.
    pub fn new() -> Self {
        let service = Self::default();
        for (key, value) in env::vars_os() {
            if let (Some(key), Some(value)) = (key.to_str(), value.to_str()) {
                service.set(key, value);
            }
        }
        service
    }

    /// An empty service, for tests and embedded setups.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(&normalize(key)).map(|v| v.clone())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(normalize(key), value.to_string());
    }

    /// Parse `key`; a present but malformed value is an error, a missing one is `None`.
    pub fn get_parsed<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|e| KeystoneError::config(key, format!("'{raw}': {e}"))),
        }
    }

    pub fn get_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        Ok(self.get_parsed(key)?.unwrap_or(default))
    }
}

/// Options under `keystone.web`.
#[derive(Debug, Clone, PartialEq)]
pub struct WebProperties {
    /// Install the exception filter layer.
    pub enabled: bool,
    /// What internal faults show when they carry no view message.
    pub internal_view_message: InternalViewMessage,
}

impl WebProperties {
    pub const PREFIX: &'static str = "keystone.web";

    pub fn from_config(config: &ConfigService) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            enabled: config.get_or(&format!("{}.enabled", Self::PREFIX), defaults.enabled)?,
            internal_view_message: config.get_or(
                &format!("{}.internal-view-message", Self::PREFIX),
                defaults.internal_view_message,
            )?,
        })
    }
}

impl Default for WebProperties {
    fn default() -> Self {
        Self {
            enabled: true,
            internal_view_message: InternalViewMessage::default(),
        }
    }
}

/// Options under `keystone.http`, used by the shared HTTP client.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpClientProps {
    pub connect_timeout_ms: u64,
    /// Per-request timeout when the caller gives none.
    pub default_read_timeout_ms: u64,
    pub default_content_type: String,
    pub http1_only: bool,
    pub follow_redirects: bool,
    pub max_redirects: usize,
}

impl HttpClientProps {
    pub const PREFIX: &'static str = "keystone.http";

    pub fn from_config(config: &ConfigService) -> Result<Self> {
        let d = Self::default();
        let key = |name: &str| format!("{}.{}", Self::PREFIX, name);
        Ok(Self {
            connect_timeout_ms: config.get_or(&key("connect-timeout-ms"), d.connect_timeout_ms)?,
            default_read_timeout_ms: config
                .get_or(&key("default-read-timeout-ms"), d.default_read_timeout_ms)?,
            default_content_type: config
                .get(&key("default-content-type"))
                .unwrap_or(d.default_content_type),
            http1_only: config.get_or(&key("http1-only"), d.http1_only)?,
            follow_redirects: config.get_or(&key("follow-redirects"), d.follow_redirects)?,
            max_redirects: config.get_or(&key("max-redirects"), d.max_redirects)?,
        })
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn default_read_timeout(&self) -> Duration {
        Duration::from_millis(self.default_read_timeout_ms)
    }
}

impl Default for HttpClientProps {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000,
            default_read_timeout_ms: 1_200_000,
            default_content_type: "application/json".to_string(),
            http1_only: true,
            follow_redirects: true,
            max_redirects: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_normalized() {
        let config = ConfigService::empty();
        config.set("KEYSTONE_WEB_ENABLED", "false");
        assert_eq!(config.get("keystone.web.enabled").as_deref(), Some("false"));
        assert_eq!(config.get("Keystone.Web-Enabled").as_deref(), Some("false"));
    }

    #[test]
    fn test_web_properties() {
        let config = ConfigService::empty();
        assert_eq!(WebProperties::from_config(&config).unwrap(), WebProperties::default());

        config.set("keystone.web.enabled", "false");
        config.set("KEYSTONE_WEB_INTERNAL_VIEW_MESSAGE", "Generic");
        let props = WebProperties::from_config(&config).unwrap();
        assert!(!props.enabled);
        assert_eq!(props.internal_view_message, InternalViewMessage::Generic);
    }

    #[test]
    fn test_malformed_value_is_reported() {
        let config = ConfigService::empty();
        config.set("keystone.web.enabled", "sometimes");
        let err = WebProperties::from_config(&config).unwrap_err();
        assert!(matches!(err, KeystoneError::Config { ref key, .. } if key == "keystone.web.enabled"));
    }

    #[test]
    fn test_http_client_props() {
        let config = ConfigService::empty();
        config.set("KEYSTONE_HTTP_CONNECT_TIMEOUT_MS", "2500");
        let props = HttpClientProps::from_config(&config).unwrap();
        assert_eq!(props.connect_timeout(), Duration::from_millis(2500));
        assert_eq!(props.default_read_timeout(), Duration::from_secs(1200));
        assert_eq!(props.default_content_type, "application/json");
    }
}
