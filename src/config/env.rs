use super::{ClientConfig, ConfigError, DEFAULT_SPEAKER, DEFAULT_TIMEOUT_SECONDS};
use crate::core::tts::{HAMSA_API_KEY_ENV, HAMSA_TTS_URL};

pub const HAMSA_SPEAKER_ENV: &str = "HAMSA_SPEAKER";
pub const HAMSA_DIALECT_ENV: &str = "HAMSA_DIALECT";
pub const HAMSA_MULAW_ENV: &str = "HAMSA_MULAW";
pub const HAMSA_ENDPOINT_ENV: &str = "HAMSA_ENDPOINT";
pub const HAMSA_TIMEOUT_ENV: &str = "HAMSA_TIMEOUT_SECS";

impl ClientConfig {
    /// Build a configuration from variables returned by `lookup`.
    ///
    /// Unset or empty variables keep their defaults. The result is not
    /// validated.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let mulaw = match get(HAMSA_MULAW_ENV) {
            Some(value) => parse_bool(HAMSA_MULAW_ENV, &value)?,
            None => false,
        };

        let timeout_seconds = match get(HAMSA_TIMEOUT_ENV) {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: HAMSA_TIMEOUT_ENV.to_string(),
                    value: value.clone(),
                    reason: e.to_string(),
                })?,
            None => DEFAULT_TIMEOUT_SECONDS,
        };

        Ok(Self {
            api_key: get(HAMSA_API_KEY_ENV),
            speaker: get(HAMSA_SPEAKER_ENV).unwrap_or_else(|| DEFAULT_SPEAKER.to_string()),
            dialect: get(HAMSA_DIALECT_ENV),
            mulaw,
            endpoint: get(HAMSA_ENDPOINT_ENV).unwrap_or_else(|| HAMSA_TTS_URL.to_string()),
            timeout_seconds,
        })
    }
}

/// Parse a boolean flag (`true/false`, `1/0`, `yes/no`, `on/off`)
pub(crate) fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: "expected true/false, 1/0, yes/no or on/off".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ClientConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_all_variables() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("HAMSA_API_KEY", "env-key"),
            ("HAMSA_SPEAKER", "Rami"),
            ("HAMSA_DIALECT", "egy"),
            ("HAMSA_MULAW", "yes"),
            ("HAMSA_ENDPOINT", "http://localhost:7000/tts"),
            ("HAMSA_TIMEOUT_SECS", "25"),
        ]))
        .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("env-key"));
        assert_eq!(config.speaker, "Rami");
        assert_eq!(config.dialect.as_deref(), Some("egy"));
        assert!(config.mulaw);
        assert_eq!(config.endpoint, "http://localhost:7000/tts");
        assert_eq!(config.timeout_seconds, 25);
    }

    #[test]
    fn test_empty_values_keep_defaults() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("HAMSA_SPEAKER", ""),
            ("HAMSA_DIALECT", "  "),
            ("HAMSA_API_KEY", ""),
        ]))
        .unwrap();

        assert_eq!(config.speaker, DEFAULT_SPEAKER);
        assert!(config.dialect.is_none());
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_invalid_timeout() {
        let result = ClientConfig::from_lookup(lookup_from(&[("HAMSA_TIMEOUT_SECS", "ten")]));
        match result {
            Err(ConfigError::InvalidValue { key, value, .. }) => {
                assert_eq!(key, HAMSA_TIMEOUT_ENV);
                assert_eq!(value, "ten");
            }
            other => panic!("Expected InvalidValue error, got: {:?}", other),
        }
    }

    #[test]
    fn test_parse_bool() {
        for value in ["true", "TRUE", "1", "yes", "On"] {
            assert!(parse_bool("K", value).unwrap(), "{value}");
        }
        for value in ["false", "0", "No", "off"] {
            assert!(!parse_bool("K", value).unwrap(), "{value}");
        }
        assert!(matches!(
            parse_bool("HAMSA_MULAW", "maybe"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
