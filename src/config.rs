//! Configuration
//!
//! Read from the environment once at startup. A `.env` file in the working
//! directory is honoured by the binary before this runs.

use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Base URL of the analysis backend, without a trailing endpoint
    pub api_url: String,
    /// Bound on analyze / metrics / ranking requests
    pub request_timeout: Duration,
    /// Bound on the insights call, which waits on a language model
    pub insights_timeout: Duration,
    /// Where `save` writes the session
    pub session_file: PathBuf,
    /// Chat turns kept in the transcript
    pub transcript_turns: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(15),
            insights_timeout: Duration::from_secs(60),
            session_file: PathBuf::from("soil_session.json"),
            transcript_turns: 50,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; unset or unparsable values
    /// keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("SOIL_API_URL").filter(|u| !u.trim().is_empty()) {
            config.api_url = url.trim().to_string();
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "SOIL_REQUEST_TIMEOUT_SECS").filter(|s| *s > 0) {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "SOIL_INSIGHTS_TIMEOUT_SECS").filter(|s| *s > 0) {
            config.insights_timeout = Duration::from_secs(secs);
        }
        if let Some(path) = lookup("SOIL_SESSION_FILE").filter(|p| !p.trim().is_empty()) {
            config.session_file = PathBuf::from(path.trim());
        }
        if let Some(turns) = parse_var::<usize>(&lookup, "SOIL_TRANSCRIPT_TURNS").filter(|t| *t > 0) {
            config.transcript_turns = turns;
        }

        config
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid number", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("SOIL_API_URL", "https://soil.example.org/api"),
            ("SOIL_REQUEST_TIMEOUT_SECS", "5"),
            ("SOIL_INSIGHTS_TIMEOUT_SECS", "90"),
            ("SOIL_SESSION_FILE", "/tmp/s.json"),
            ("SOIL_TRANSCRIPT_TURNS", "10"),
        ]));
        assert_eq!(config.api_url, "https://soil.example.org/api");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.insights_timeout, Duration::from_secs(90));
        assert_eq!(config.session_file, PathBuf::from("/tmp/s.json"));
        assert_eq!(config.transcript_turns, 10);
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("SOIL_REQUEST_TIMEOUT_SECS", "soon"),
            ("SOIL_INSIGHTS_TIMEOUT_SECS", "0"),
            ("SOIL_API_URL", "  "),
        ]));
        assert_eq!(config, AppConfig::default());
    }
}
