//! Application configuration.
//!
//! Each setting is taken from `config.toml` first, then from the environment
//! (a `.env` file is loaded if present), then from the defaults below.

use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;

// ==================== Defaults ====================

/// Default database location
pub const DEFAULT_DATABASE_PATH: &str = "data/flashdeck.db";

/// Server address to bind to
pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0";

/// Server port
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Pause between recording an answer and showing the next card
pub const DEFAULT_FEEDBACK_DELAY_MS: u64 = 350;

/// Study sessions idle for longer than this are discarded
pub const DEFAULT_SESSION_EXPIRY_HOURS: i64 = 4;

/// Probability threshold for session cleanup (0-255, lower = less frequent)
/// Value of 25 means ~10% chance (25/256) on each session access
pub const SESSION_CLEANUP_THRESHOLD: u8 = 25;

pub const DEFAULT_AI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_AI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 60;

/// Cards requested from text when the caller does not say
pub const DEFAULT_GENERATE_COUNT: usize = 10;
/// Upper bound on cards generated from text in one request
pub const MAX_GENERATE_COUNT: usize = 50;

// ==================== File format ====================

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    database: Option<DatabaseSection>,
    server: Option<ServerSection>,
    study: Option<StudySection>,
    ai: Option<AiSection>,
}

#[derive(Debug, Deserialize)]
struct DatabaseSection {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
    addr: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct StudySection {
    feedback_delay_ms: Option<u64>,
    session_expiry_hours: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct AiSection {
    base_url: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

// ==================== Resolved configuration ====================

#[derive(Debug, Clone, PartialEq)]
pub struct AiConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub server_addr: String,
    pub server_port: u16,
    pub feedback_delay_ms: u64,
    pub session_expiry_hours: i64,
    /// `None` when no API key is configured; AI endpoints are then unavailable
    pub ai: Option<AiConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            server_addr: DEFAULT_SERVER_ADDR.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            feedback_delay_ms: DEFAULT_FEEDBACK_DELAY_MS,
            session_expiry_hours: DEFAULT_SESSION_EXPIRY_HOURS,
            ai: None,
        }
    }
}

impl AppConfig {
    /// Load from `config.toml` in the working directory and the process environment
    pub fn load() -> Self {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let contents = std::fs::read_to_string("config.toml").ok();
        Self::from_sources(contents.as_deref(), |key| std::env::var(key).ok())
    }

    /// Resolve settings from optional `config.toml` contents and an environment lookup
    pub fn from_sources(contents: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Self {
        let file = match contents.map(toml::from_str::<FileConfig>) {
            Some(Ok(file)) => file,
            Some(Err(e)) => {
                tracing::warn!("Ignoring invalid config.toml: {}", e);
                FileConfig::default()
            }
            None => FileConfig::default(),
        };

        let database_path = file
            .database
            .and_then(|d| d.path)
            .or_else(|| env("DATABASE_PATH"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));

        let (addr, port) = file.server.map(|s| (s.addr, s.port)).unwrap_or_default();
        let (delay, expiry) = file
            .study
            .map(|s| (s.feedback_delay_ms, s.session_expiry_hours))
            .unwrap_or_default();

        let ai_file = file.ai;
        let api_key = ai_file
            .as_ref()
            .and_then(|a| a.api_key.clone())
            .or_else(|| env("AI_API_KEY"))
            .or_else(|| env("OPENAI_API_KEY"))
            .filter(|key| !key.trim().is_empty());
        let ai = api_key.map(|api_key| AiConfig {
            base_url: ai_file
                .as_ref()
                .and_then(|a| a.base_url.clone())
                .or_else(|| env("AI_BASE_URL"))
                .unwrap_or_else(|| DEFAULT_AI_BASE_URL.to_string()),
            model: ai_file
                .as_ref()
                .and_then(|a| a.model.clone())
                .or_else(|| env("AI_MODEL"))
                .unwrap_or_else(|| DEFAULT_AI_MODEL.to_string()),
            api_key,
            timeout_secs: ai_file
                .as_ref()
                .and_then(|a| a.timeout_secs)
                .or_else(|| env_parsed(&env, "AI_TIMEOUT_SECS"))
                .unwrap_or(DEFAULT_AI_TIMEOUT_SECS),
        });

        let config = Self {
            database_path,
            server_addr: addr
                .or_else(|| env("SERVER_ADDR"))
                .unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string()),
            server_port: port
                .or_else(|| env_parsed(&env, "SERVER_PORT"))
                .unwrap_or(DEFAULT_SERVER_PORT),
            feedback_delay_ms: delay
                .or_else(|| env_parsed(&env, "FEEDBACK_DELAY_MS"))
                .unwrap_or(DEFAULT_FEEDBACK_DELAY_MS),
            session_expiry_hours: expiry
                .or_else(|| env_parsed(&env, "SESSION_EXPIRY_HOURS"))
                .unwrap_or(DEFAULT_SESSION_EXPIRY_HOURS),
            ai,
        };
        tracing::info!("Using database at {}", config.database_path.display());
        config
    }

    /// Get the full server bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_addr, self.server_port)
    }
}

fn env_parsed<T: FromStr>(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    env(key).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_sources(None, env_of(&[]));
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert!(config.ai.is_none());
    }

    #[test]
    fn test_file_wins_over_env() {
        let toml = r#"
            [database]
            path = "/tmp/from-file.db"

            [study]
            feedback_delay_ms = 0
        "#;
        let env = env_of(&[("DATABASE_PATH", "/tmp/from-env.db"), ("FEEDBACK_DELAY_MS", "900")]);
        let config = AppConfig::from_sources(Some(toml), env);
        assert_eq!(config.database_path, PathBuf::from("/tmp/from-file.db"));
        assert_eq!(config.feedback_delay_ms, 0);
    }

    #[test]
    fn test_env_used_when_file_silent() {
        let env = env_of(&[("SERVER_PORT", "8080"), ("SESSION_EXPIRY_HOURS", "12")]);
        let config = AppConfig::from_sources(Some("[server]\naddr = \"127.0.0.1\"\n"), env);
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.session_expiry_hours, 12);
    }

    #[test]
    fn test_unparseable_env_falls_back() {
        let config = AppConfig::from_sources(None, env_of(&[("SERVER_PORT", "not-a-port")]));
        assert_eq!(config.server_port, DEFAULT_SERVER_PORT);
    }

    #[test]
    fn test_invalid_file_ignored() {
        let config = AppConfig::from_sources(Some("this is not toml ["), env_of(&[]));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_ai_requires_api_key() {
        let config = AppConfig::from_sources(None, env_of(&[("AI_MODEL", "custom")]));
        assert!(config.ai.is_none());

        let config = AppConfig::from_sources(
            None,
            env_of(&[("OPENAI_API_KEY", "sk-test"), ("AI_MODEL", "custom")]),
        );
        let ai = config.ai.unwrap();
        assert_eq!(ai.api_key, "sk-test");
        assert_eq!(ai.model, "custom");
        assert_eq!(ai.base_url, DEFAULT_AI_BASE_URL);
        assert_eq!(ai.timeout_secs, DEFAULT_AI_TIMEOUT_SECS);
    }

    #[test]
    fn test_blank_api_key_ignored() {
        let config = AppConfig::from_sources(Some("[ai]\napi_key = \"  \"\n"), env_of(&[]));
        assert!(config.ai.is_none());
    }
}
