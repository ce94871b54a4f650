// src/config.rs
use crate::errors::StylizeError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub heartbeat_interval: Duration,
    pub describe_timeout: Duration,
    pub generate_timeout: Duration,
    pub openai_base_url: String,
    pub vision_model: String,
    pub image_model: String,
    pub description_max_tokens: u32,
    pub emit_prompt_event: bool,
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            heartbeat_interval: Duration::from_millis(2000),
            describe_timeout: Duration::from_secs(60),
            generate_timeout: Duration::from_secs(120),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            vision_model: "gpt-4o".to_string(),
            image_model: "dall-e-3".to_string(),
            description_max_tokens: 1000,
            emit_prompt_event: false,
            max_body_bytes: 20 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, StylizeError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, StylizeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let heartbeat_ms: u64 = parse_or(&lookup, "HEARTBEAT_INTERVAL_MS", 2000)?;
        if heartbeat_ms == 0 {
            return Err(StylizeError::Config(
                "HEARTBEAT_INTERVAL_MS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            bind_addr: lookup("STYLIZE_BIND").unwrap_or(defaults.bind_addr),
            heartbeat_interval: Duration::from_millis(heartbeat_ms),
            describe_timeout: Duration::from_secs(parse_or(&lookup, "DESCRIBE_TIMEOUT_SECS", 60)?),
            generate_timeout: Duration::from_secs(parse_or(&lookup, "GENERATE_TIMEOUT_SECS", 120)?),
            openai_base_url: lookup("OPENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.openai_base_url),
            vision_model: lookup("VISION_MODEL").unwrap_or(defaults.vision_model),
            image_model: lookup("IMAGE_MODEL").unwrap_or(defaults.image_model),
            description_max_tokens: parse_or(
                &lookup,
                "DESCRIPTION_MAX_TOKENS",
                defaults.description_max_tokens,
            )?,
            emit_prompt_event: parse_or(&lookup, "EMIT_PROMPT_EVENT", defaults.emit_prompt_event)?,
            max_body_bytes: parse_or(&lookup, "MAX_BODY_BYTES", defaults.max_body_bytes)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, StylizeError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| StylizeError::Config(format!("invalid {}={:?}: {}", key, raw, e))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.heartbeat_interval, Duration::from_secs(2));
        assert_eq!(config.image_model, "dall-e-3");
        assert!(!config.emit_prompt_event);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("HEARTBEAT_INTERVAL_MS", "5000"),
            ("OPENAI_BASE_URL", "http://localhost:9000/v1/"),
            ("EMIT_PROMPT_EVENT", "true"),
        ]))
        .unwrap();

        assert_eq!(config.heartbeat_interval, Duration::from_secs(5));
        assert_eq!(config.openai_base_url, "http://localhost:9000/v1");
        assert!(config.emit_prompt_event);
    }

    #[test]
    fn bad_values_name_the_variable() {
        let err = Config::from_lookup(lookup_from(&[("DESCRIBE_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("DESCRIBE_TIMEOUT_SECS"));

        let err = Config::from_lookup(lookup_from(&[("HEARTBEAT_INTERVAL_MS", "0")])).unwrap_err();
        assert!(matches!(err, StylizeError::Config(_)));
    }
}
