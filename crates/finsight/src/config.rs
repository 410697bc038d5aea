//! Environment configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use finsight_alphavantage::{ALPHA_VANTAGE_BASE_URL, DEFAULT_TIMEOUT};
use finsight_core::{DEFAULT_TOLERANCE_DAYS, DataError, HistoryDepth, Result};

/// Variable holding the Alpha Vantage API key.
pub const API_KEY_VAR: &str = "ALPHA_VANTAGE_API_KEY";
/// Variable overriding the Alpha Vantage host.
pub const BASE_URL_VAR: &str = "ALPHA_VANTAGE_BASE_URL";
/// Variable overriding the request timeout, in seconds.
pub const TIMEOUT_VAR: &str = "ALPHA_VANTAGE_TIMEOUT_SECS";

/// Dividends kept per ticker by default.
pub const DEFAULT_DIVIDEND_LIMIT: usize = 10;
/// Insider trades kept per ticker by default.
pub const DEFAULT_INSIDER_LIMIT: usize = 20;

/// Settings for a [`ReportService`](crate::ReportService).
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    /// Alpha Vantage API key.
    pub api_key: String,
    /// Alpha Vantage host.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Periods kept per cadence.
    pub history: HistoryDepth,
    /// Maximum distance in days between a shares snapshot and its close.
    pub tolerance_days: i64,
    /// Dividends kept per ticker.
    pub dividend_limit: usize,
    /// Insider trades kept per ticker.
    pub insider_limit: usize,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("history", &self.history)
            .field("tolerance_days", &self.tolerance_days)
            .field("dividend_limit", &self.dividend_limit)
            .field("insider_limit", &self.insider_limit)
            .finish()
    }
}

impl Settings {
    /// Settings with defaults for everything but the key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: ALPHA_VANTAGE_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            history: HistoryDepth::default(),
            tolerance_days: DEFAULT_TOLERANCE_DAYS,
            dividend_limit: DEFAULT_DIVIDEND_LIMIT,
            insider_limit: DEFAULT_INSIDER_LIMIT,
        }
    }

    /// Loads settings from `.env` (if present) and the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Configuration`] if the API key is missing or
    /// blank, or an override does not parse.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Settings::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| DataError::Configuration(format!("{API_KEY_VAR} is not set")))?;

        let mut settings = Self::new(api_key);
        if let Some(base_url) = lookup(BASE_URL_VAR).filter(|url| !url.trim().is_empty()) {
            settings.base_url = base_url.trim().trim_end_matches('/').to_string();
        }
        if let Some(secs) = parse_var::<u64>(&lookup, TIMEOUT_VAR)? {
            if secs == 0 {
                return Err(DataError::Configuration(format!(
                    "{TIMEOUT_VAR} must be greater than zero"
                )));
            }
            settings.timeout = Duration::from_secs(secs);
        }

        tracing::debug!(settings = ?settings, "Loaded settings");
        Ok(settings)
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, var: &str) -> Result<Option<T>> {
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| DataError::Configuration(format!("{var} is not a valid number: {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let err = Settings::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, DataError::Configuration(_)));
        assert!(err.is_fatal());

        let err = Settings::from_lookup(lookup(&[(API_KEY_VAR, "   ")])).unwrap_err();
        assert!(matches!(err, DataError::Configuration(_)));
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&[(API_KEY_VAR, " demo ")])).unwrap();
        assert_eq!(settings.api_key, "demo");
        assert_eq!(settings.base_url, "https://www.alphavantage.co");
        assert_eq!(settings.timeout, Duration::from_secs(10));
        assert_eq!(settings.history, HistoryDepth::new(10, 12));
        assert_eq!(settings.tolerance_days, 10);
        assert_eq!(settings.dividend_limit, 10);
        assert_eq!(settings.insider_limit, 20);
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            (API_KEY_VAR, "demo"),
            (BASE_URL_VAR, "http://localhost:9000/"),
            (TIMEOUT_VAR, "30"),
        ]))
        .unwrap();
        assert_eq!(settings.base_url, "http://localhost:9000");
        assert_eq!(settings.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_timeout() {
        for bad in ["ten", "0", "-1"] {
            let err = Settings::from_lookup(lookup(&[(API_KEY_VAR, "demo"), (TIMEOUT_VAR, bad)]))
                .unwrap_err();
            assert!(matches!(err, DataError::Configuration(_)), "{bad}");
        }
    }

    #[test]
    fn test_debug_redacts_key() {
        let debug = format!("{:?}", Settings::new("super_secret"));
        assert!(!debug.contains("super_secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
