use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use aubade_core::matching::DEFAULT_THRESHOLD;

/// Configuration for aubade.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (AUBADE_* prefix, plus the unprefixed
///    DATA_DIR and SPOTIFY_CLIENT_* names)
/// 3. Config file (~/.config/aubade/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the catalog, history, curated lists and records.
    ///
    /// Can be set via:
    /// - CLI: --data-dir /path/to/data
    /// - ENV: DATA_DIR or AUBADE_DATA_DIR
    /// - Config: data_dir = "/path/to/data"
    /// - Default: ./data
    pub data_dir: PathBuf,

    /// Spotify client-credentials pair. Spotify lookups are skipped
    /// unless both are set.
    ///
    /// Can be set via:
    /// - ENV: SPOTIFY_CLIENT_ID, SPOTIFY_CLIENT_SECRET
    /// - Config: spotify_client_id = "...", spotify_client_secret = "..."
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,

    /// Minimum combined fuzzy score (0-100) to accept a search result.
    ///
    /// Can be set via:
    /// - ENV: AUBADE_MATCH_THRESHOLD
    /// - Config: match_threshold = 80
    #[serde(deserialize_with = "number_or_text")]
    pub match_threshold: f64,

    pub requests: RequestConfig,
    pub endpoints: Endpoints,
}

/// Retry and pacing for external requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    /// Attempts per request, including the first.
    pub attempts: usize,
    /// Wait between attempts of one request.
    pub retry_delay_ms: u64,
    /// Wait between consecutive search queries.
    pub query_delay_ms: u64,
}

/// Base URLs of the external services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub musicbrainz: String,
    pub cover_art: String,
    pub wikidata: String,
    pub wikipedia: String,
    pub spotify_accounts: String,
    pub spotify_api: String,
    pub odesli: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            spotify_client_id: None,
            spotify_client_secret: None,
            match_threshold: DEFAULT_THRESHOLD,
            requests: RequestConfig::default(),
            endpoints: Endpoints::default(),
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            retry_delay_ms: 1000,
            query_delay_ms: 1000,
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            musicbrainz: "https://musicbrainz.org/ws/2".to_string(),
            cover_art: "https://coverartarchive.org".to_string(),
            wikidata: "https://www.wikidata.org".to_string(),
            wikipedia: "https://en.wikipedia.org".to_string(),
            spotify_accounts: "https://accounts.spotify.com".to_string(),
            spotify_api: "https://api.spotify.com/v1".to_string(),
            odesli: "https://api.song.link/v1-alpha.1".to_string(),
        }
    }
}

impl RequestConfig {
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    #[must_use]
    pub fn query_delay(&self) -> Duration {
        Duration::from_millis(self.query_delay_ms)
    }
}

impl Config {
    /// Load configuration from the config file and environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed, or
    /// if an environment variable holds an invalid value.
    pub fn load() -> Result<Self> {
        let mut config = Self::layered(
            &config_file_path(),
            Some(env::Options::with_top_level("aubade")),
        )?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from an explicit config file path, with `env` standing in for
    /// the unprefixed environment variables.
    pub fn load_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::layered(path, None)?;
        config.apply_env_overrides(env);
        Ok(config)
    }

    fn layered(path: &Path, env_opts: Option<env::Options>) -> Result<Self> {
        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if path.exists() {
            let path_str = path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .with_context(|| format!("Failed to load config file {}", path.display()))?;
        }

        if let Some(env_opts) = env_opts {
            builder
                .add_env(env_opts)
                .context("Failed to load environment variables")?;
        }

        let config: Self = builder.build().context("Failed to build configuration")?;
        Ok(config)
    }

    /// Names outside the AUBADE_ prefix that deployments already set.
    fn apply_env_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = env("DATA_DIR").filter(|v| !v.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(id) = env("SPOTIFY_CLIENT_ID").filter(|v| !v.is_empty()) {
            self.spotify_client_id = Some(id);
        }
        if let Some(secret) = env("SPOTIFY_CLIENT_SECRET").filter(|v| !v.is_empty()) {
            self.spotify_client_secret = Some(secret);
        }
    }

    /// Load configuration with a data directory given on the command line.
    pub fn load_with_data_dir(data_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::load()?;
        if let Some(dir) = data_dir {
            config.data_dir = dir;
        }
        Ok(config)
    }

    /// Both halves of the Spotify credentials, if configured.
    #[must_use]
    pub fn spotify_credentials(&self) -> Option<(&str, &str)> {
        match (&self.spotify_client_id, &self.spotify_client_secret) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }

    /// Render as TOML with secrets masked.
    pub fn to_display_toml(&self) -> Result<String> {
        let mut shown = self.clone();
        if shown.spotify_client_secret.is_some() {
            shown.spotify_client_secret = Some("********".to_string());
        }
        toml::to_string_pretty(&shown).context("Failed to serialize configuration")
    }
}

/// Accept a number, or text holding one (environment values arrive as text).
fn number_or_text<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/aubade/config.toml
/// - macOS: ~/Library/Application Support/aubade/config.toml
/// - Windows: %APPDATA%\aubade\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("aubade")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Aubade Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (AUBADE_* prefix, plus DATA_DIR and
#    SPOTIFY_CLIENT_ID / SPOTIFY_CLIENT_SECRET)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Directory holding albums.csv, history.csv, curated-lists/ and
# album-of-the-day/
#
# Can also be set via:
# - CLI: aubade --data-dir /srv/aubade/data pick 2025-06-12
# - Environment: DATA_DIR=/srv/aubade/data
#data_dir = "data"

# Spotify client credentials, used to find the album's Spotify page and
# from it the links on other streaming platforms. Without them the
# Spotify lookup is skipped and search links are used instead.
#
# Create an app at: https://developer.spotify.com/dashboard
#
# Can also be set via:
# - Environment: SPOTIFY_CLIENT_ID, SPOTIFY_CLIENT_SECRET
#spotify_client_id = "your-client-id"
#spotify_client_secret = "your-client-secret"

# Minimum fuzzy score (0-100) to accept a search result
#
# Can also be set via:
# - Environment: AUBADE_MATCH_THRESHOLD=85
#match_threshold = 80

[requests]
# Attempts per request, including the first
#attempts = 3
# Milliseconds between attempts, and between search queries
#retry_delay_ms = 1000
#query_delay_ms = 1000
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config())
        .context("Failed to write config file")?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert!(config.spotify_credentials().is_none());
        assert_eq!(config.requests.attempts, 3);
        assert!((config.match_threshold - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(&temp_dir.path().join("config.toml"), no_env).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_example_config_parses_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, example_config()).unwrap();
        let config = Config::load_from(&path, no_env).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_file_then_env_priority() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "data_dir = \"/from/file\"\nspotify_client_id = \"file-id\"\n\n[requests]\nattempts = 5\n",
        )
        .unwrap();

        let env: HashMap<&str, &str> = [
            ("DATA_DIR", "/from/env"),
            ("SPOTIFY_CLIENT_SECRET", "env-secret"),
        ]
        .into_iter()
        .collect();
        let config =
            Config::load_from(&path, |k| env.get(k).map(|v| (*v).to_string())).unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/from/env"));
        assert_eq!(config.spotify_credentials(), Some(("file-id", "env-secret")));
        assert_eq!(config.requests.attempts, 5);
        assert_eq!(config.requests.retry_delay_ms, 1000);
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(&temp_dir.path().join("none.toml"), |k| {
            (k == "DATA_DIR").then(String::new)
        })
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_threshold_given_as_text() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "match_threshold = \" 90 \"\n").unwrap();
        let config = Config::load_from(&path, no_env).unwrap();
        assert!((config.match_threshold - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_threshold_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "match_threshold = \"high\"\n").unwrap();
        assert!(Config::load_from(&path, no_env).is_err());
    }

    #[test]
    fn test_display_masks_secret() {
        let config = Config {
            spotify_client_id: Some("id".to_string()),
            spotify_client_secret: Some("very-secret".to_string()),
            ..Config::default()
        };
        let shown = config.to_display_toml().unwrap();
        assert!(shown.contains("********"));
        assert!(!shown.contains("very-secret"));
    }
}
