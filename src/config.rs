use std::time::Duration;

use chess_match_app::MatchConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a non-negative integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },
    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub turn_deadline_secs: u64,
    pub clock_interval_ms: u64,
    pub completed_games_limit: usize,
    pub log_file_path: Option<String>,
    pub log_archive_pattern: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            turn_deadline_secs: positive(&lookup, "TURN_DEADLINE_SECS", 60)?,
            clock_interval_ms: positive(&lookup, "TURN_CLOCK_INTERVAL_MS", 1000)?,
            completed_games_limit: positive(&lookup, "COMPLETED_GAMES_LIMIT", 10)? as usize,
            log_file_path: lookup("LOG_FILE_PATH").filter(|s| !s.is_empty()),
            log_archive_pattern: lookup("LOG_ARCHIVE_PATTERN").filter(|s| !s.is_empty()),
        })
    }

    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            turn_deadline: Duration::from_secs(self.turn_deadline_secs),
            clock_interval: Duration::from_millis(self.clock_interval_ms),
            completed_games_limit: self.completed_games_limit,
        }
    }
}

fn positive(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    let Some(value) = lookup(name) else {
        return Ok(default);
    };
    let parsed = value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidNumber {
            name,
            value: value.clone(),
        })?;
    if parsed == 0 {
        return Err(ConfigError::Zero { name });
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.match_config(), MatchConfig::default());
        assert_eq!(config.log_file_path, None);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("TURN_DEADLINE_SECS", "3"),
            ("TURN_CLOCK_INTERVAL_MS", "250"),
            ("COMPLETED_GAMES_LIMIT", " 25 "),
            ("LOG_FILE_PATH", "logs/server.log"),
        ])
        .unwrap();
        let match_config = config.match_config();
        assert_eq!(match_config.turn_deadline, Duration::from_secs(3));
        assert_eq!(match_config.clock_interval, Duration::from_millis(250));
        assert_eq!(match_config.completed_games_limit, 25);
        assert_eq!(config.log_file_path.as_deref(), Some("logs/server.log"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config(&[("TURN_DEADLINE_SECS", "soon")]),
            Err(ConfigError::InvalidNumber { name: "TURN_DEADLINE_SECS", .. })
        ));
        assert!(matches!(
            config(&[("TURN_CLOCK_INTERVAL_MS", "0")]),
            Err(ConfigError::Zero { name: "TURN_CLOCK_INTERVAL_MS" })
        ));
    }
}
