use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub realtime: RealtimeConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// Store connection string: a file path, `sqlite://<path>`, or `:memory:`.
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RealtimeConfig {
    /// Credential for the realtime provider. `None` leaves the bridge unmounted.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub voice: String,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8001,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let url = default_app_dir()
            .join("assistant.db")
            .to_string_lossy()
            .into_owned();
        Self { url }
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o-realtime-preview".into(),
            voice: "alloy".into(),
            timeout_secs: 30,
        }
    }
}

/// Returns `~/.studiomind/`, or `./.studiomind/` when no home directory is known.
pub fn default_app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".studiomind")
}

/// Returns the default config file path: `~/.studiomind/config.toml`
pub fn default_config_path() -> PathBuf {
    default_app_dir().join("config.toml")
}

impl AppConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            AppConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (STUDIOMIND_DB, STUDIOMIND_HOST,
    /// STUDIOMIND_PORT, STUDIOMIND_LOG_LEVEL, OPENAI_API_KEY).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("STUDIOMIND_DB") {
            self.storage.url = val;
        }
        if let Ok(val) = std::env::var("STUDIOMIND_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("STUDIOMIND_PORT") {
            match val.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!(value = %val, "ignoring invalid STUDIOMIND_PORT"),
            }
        }
        if let Ok(val) = std::env::var("STUDIOMIND_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("OPENAI_API_KEY") {
            self.realtime.api_key = Some(val);
        }
    }

    /// The realtime credential, treating an empty string as absent.
    pub fn realtime_credential(&self) -> Option<&str> {
        self.realtime
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8001);
        assert_eq!(config.server.log_level, "info");
        assert!(config.storage.url.ends_with("assistant.db"));
        assert!(config.realtime.api_key.is_none());
        assert_eq!(config.realtime.timeout_secs, 30);
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
port = 9100
log_level = "debug"

[storage]
url = "sqlite:///tmp/assistant-test.db"

[realtime]
voice = "verse"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.storage.url, "sqlite:///tmp/assistant-test.db");
        assert_eq!(config.realtime.voice, "verse");
        // defaults still apply for unset fields
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.realtime.model, "gpt-4o-realtime-preview");
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = AppConfig::default();
        std::env::set_var("STUDIOMIND_DB", "/tmp/override.db");
        std::env::set_var("STUDIOMIND_PORT", "9200");
        std::env::set_var("STUDIOMIND_LOG_LEVEL", "trace");
        std::env::set_var("OPENAI_API_KEY", "sk-test");

        config.apply_env_overrides();

        assert_eq!(config.storage.url, "/tmp/override.db");
        assert_eq!(config.server.port, 9200);
        assert_eq!(config.server.log_level, "trace");
        assert_eq!(config.realtime_credential(), Some("sk-test"));

        // Clean up
        std::env::remove_var("STUDIOMIND_DB");
        std::env::remove_var("STUDIOMIND_PORT");
        std::env::remove_var("STUDIOMIND_LOG_LEVEL");
        std::env::remove_var("OPENAI_API_KEY");
    }

    #[test]
    fn blank_credential_counts_as_absent() {
        let mut config = AppConfig::default();
        config.realtime.api_key = Some("   ".into());
        assert!(config.realtime_credential().is_none());
    }
}
