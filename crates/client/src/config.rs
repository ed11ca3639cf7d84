//! Environment-driven client configuration.

use std::time::Duration;

use thiserror::Error;

use sigma_auth::{SessionConfig, SpecializationFailurePolicy};

pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend REST API base URL.
    pub api_url: String,
    /// Identity provider REST base URL.
    pub identity_url: String,
    pub firebase_api_key: String,
    pub session: SessionConfig,
}

impl ClientConfig {
    /// Read `SIGMA_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] over an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_url = read("SIGMA_API_URL").ok_or(ConfigError::Missing("SIGMA_API_URL"))?;
        let firebase_api_key =
            read("SIGMA_FIREBASE_API_KEY").ok_or(ConfigError::Missing("SIGMA_FIREBASE_API_KEY"))?;

        let mut session = SessionConfig::default();
        if let Some(raw) = read("SIGMA_MIN_LOADING_MS") {
            let millis = raw.parse::<u64>().map_err(|_| ConfigError::Invalid {
                key: "SIGMA_MIN_LOADING_MS",
                value: raw.clone(),
            })?;
            session.min_loading_duration = Duration::from_millis(millis);
        }
        if let Some(raw) = read("SIGMA_SPECIALIZATION_FAILURE") {
            session.on_specialization_fetch_failure = SpecializationFailurePolicy::parse(&raw)
                .ok_or(ConfigError::Invalid {
                    key: "SIGMA_SPECIALIZATION_FAILURE",
                    value: raw.clone(),
                })?;
        }

        Ok(Self {
            api_url: trim_base(api_url),
            identity_url: trim_base(
                read("SIGMA_IDENTITY_URL").unwrap_or_else(|| DEFAULT_IDENTITY_URL.to_string()),
            ),
            firebase_api_key,
            session,
        })
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_required_settings_are_set() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("SIGMA_API_URL", "http://localhost:8000"),
            ("SIGMA_FIREBASE_API_KEY", "k"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.identity_url, DEFAULT_IDENTITY_URL);
        assert_eq!(config.session, SessionConfig::default());
    }

    #[test]
    fn api_url_and_key_are_required() {
        assert_eq!(
            ClientConfig::from_lookup(lookup(&[("SIGMA_FIREBASE_API_KEY", "k")])),
            Err(ConfigError::Missing("SIGMA_API_URL"))
        );
        assert_eq!(
            ClientConfig::from_lookup(lookup(&[("SIGMA_API_URL", "http://api")])),
            Err(ConfigError::Missing("SIGMA_FIREBASE_API_KEY"))
        );
    }

    #[test]
    fn overrides_are_parsed() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("SIGMA_FIREBASE_API_KEY", "k"),
            ("SIGMA_API_URL", "https://api.sigma.test/"),
            ("SIGMA_MIN_LOADING_MS", "0"),
            ("SIGMA_SPECIALIZATION_FAILURE", "degrade"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "https://api.sigma.test");
        assert_eq!(config.session.min_loading_duration, Duration::ZERO);
        assert_eq!(
            config.session.on_specialization_fetch_failure,
            SpecializationFailurePolicy::Degrade
        );
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[
            ("SIGMA_API_URL", "http://api"),
            ("SIGMA_FIREBASE_API_KEY", "k"),
            ("SIGMA_MIN_LOADING_MS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "SIGMA_MIN_LOADING_MS", .. }));
    }
}
