// src/config.rs

use std::time::Duration;

use color_eyre::eyre::{eyre, Result, WrapErr};
use lazy_static::lazy_static;

use crate::core::orchestrator::{OrchestratorConfig, DEFAULT_POLL_INTERVAL};
use crate::logging::PROJECT_NAME;

pub const DEFAULT_API_URL: &str = "https://api.ssllabs.com/api/v2";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

lazy_static! {
    pub static ref API_URL_ENV: String = format!("{}_API_URL", PROJECT_NAME.clone());
    pub static ref POLL_INTERVAL_ENV: String = format!("{}_POLL_INTERVAL_SECS", PROJECT_NAME.clone());
    pub static ref REQUEST_TIMEOUT_ENV: String = format!("{}_REQUEST_TIMEOUT_SECS", PROJECT_NAME.clone());
    pub static ref MAX_SCAN_ENV: String = format!("{}_MAX_SCAN_SECS", PROJECT_NAME.clone());
}

/// Runtime settings, read from `TLS_VERDICT_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub max_scan_duration: Option<Duration>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_scan_duration: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the settings from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(url) = lookup(&API_URL_ENV).filter(|u| !u.trim().is_empty()) {
            url::Url::parse(url.trim())
                .wrap_err_with(|| format!("{} is not a valid URL: {}", *API_URL_ENV, url))?;
            settings.api_url = url.trim().to_string();
        }
        if let Some(secs) = read_secs(&lookup, &POLL_INTERVAL_ENV)? {
            if secs == 0 {
                return Err(eyre!("{} must be greater than zero", *POLL_INTERVAL_ENV));
            }
            settings.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = read_secs(&lookup, &REQUEST_TIMEOUT_ENV)? {
            settings.request_timeout = Duration::from_secs(secs);
        }
        settings.max_scan_duration = read_secs(&lookup, &MAX_SCAN_ENV)?.map(Duration::from_secs);

        Ok(settings)
    }

    pub fn orchestrator(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            poll_interval: self.poll_interval,
            max_scan_duration: self.max_scan_duration,
        }
    }
}

fn read_secs<F>(lookup: &F, key: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .wrap_err_with(|| format!("{} must be a whole number of seconds, got '{}'", key, raw))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let settings = Settings::from_lookup(|_| None).unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.poll_interval, Duration::from_secs(10));
        assert!(settings.max_scan_duration.is_none());
    }

    #[test]
    fn overrides_are_read() {
        let settings = Settings::from_lookup(lookup(&[
            ("TLS_VERDICT_API_URL", "http://localhost:9000/api/v3"),
            ("TLS_VERDICT_POLL_INTERVAL_SECS", "2"),
            ("TLS_VERDICT_REQUEST_TIMEOUT_SECS", " 15 "),
            ("TLS_VERDICT_MAX_SCAN_SECS", "600"),
        ]))
        .unwrap();

        assert_eq!(settings.api_url, "http://localhost:9000/api/v3");
        assert_eq!(settings.poll_interval, Duration::from_secs(2));
        assert_eq!(settings.request_timeout, Duration::from_secs(15));
        assert_eq!(settings.orchestrator().max_scan_duration, Some(Duration::from_secs(600)));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(Settings::from_lookup(lookup(&[("TLS_VERDICT_POLL_INTERVAL_SECS", "ten")])).is_err());
        assert!(Settings::from_lookup(lookup(&[("TLS_VERDICT_POLL_INTERVAL_SECS", "0")])).is_err());
        assert!(Settings::from_lookup(lookup(&[("TLS_VERDICT_API_URL", "not a url")])).is_err());
    }
}
