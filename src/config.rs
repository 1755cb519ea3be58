//! Configuration loader and validator for the Trello→Notion migration.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::enrich::EnrichOptions;
use crate::import::ImportOptions;

/// Trello allows roughly 10 requests per second per token; enrichment issues
/// one request per card, so parallel workers must stay at or below this.
pub const SOURCE_RATE_BUDGET: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub app: App,
    pub trello: Trello,
    pub notion: Notion,
    #[serde(default)]
    pub tuning: Tuning,
}

/// App-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    pub data_dir: String,
    pub board: String,
    /// Characters of the description kept in the page property. `null`
    /// keeps the full description there and skips the trailing section.
    #[serde(default = "default_description_limit")]
    pub description_limit: Option<usize>,
}

/// Trello credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Trello {
    pub key: String,
    pub token: String,
}

/// Notion API settings and mappings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notion {
    pub token: String,
    pub version: String,
    /// Trello list name -> Notion database title.
    pub databases: BTreeMap<String, String>,
    /// Trello label color -> Notion select color.
    #[serde(default)]
    pub colors: BTreeMap<String, String>,
}

/// Throughput knobs; defaults match the rate limits observed on both APIs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Tuning {
    pub enrich_chunk_size: usize,
    pub enrich_parallelism: usize,
    pub import_chunk_size: usize,
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            enrich_chunk_size: 10,
            enrich_parallelism: 2,
            import_chunk_size: 3,
            max_attempts: 4,
            retry_backoff_ms: 2000,
        }
    }
}

fn default_description_limit() -> Option<usize> {
    Some(100)
}

impl Config {
    /// Ensure the save directory exists.
    pub fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        fs::create_dir_all(&self.app.data_dir)
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.app.data_dir)
    }

    /// Replace credentials with `TRELLO_API_KEY`, `TRELLO_TOKEN` and
    /// `NOTION_INTEGRATION_KEY` when those are set.
    pub fn apply_env_overrides(&mut self) {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        if let Some(key) = read("TRELLO_API_KEY") {
            self.trello.key = key;
        }
        if let Some(token) = read("TRELLO_TOKEN") {
            self.trello.token = token;
        }
        if let Some(token) = read("NOTION_INTEGRATION_KEY") {
            self.notion.token = token;
        }
    }

    pub fn enrich_options(&self) -> EnrichOptions {
        EnrichOptions {
            chunk_size: self.tuning.enrich_chunk_size,
            parallelism: self.tuning.enrich_parallelism,
        }
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            chunk_size: self.tuning.import_chunk_size,
            max_attempts: self.tuning.max_attempts,
            retry_backoff: Duration::from_millis(self.tuning.retry_backoff_ms),
            description_limit: self.app.description_limit,
        }
    }
}

/// Load configuration from a YAML file, apply environment overrides and
/// validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let cfg = read(path)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Parse the YAML file and apply environment overrides without validating.
pub fn read(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let mut cfg: Config = serde_yaml::from_str(&content)?;
    cfg.apply_env_overrides();
    Ok(cfg)
}

/// Checks only what talking to Notion needs.
pub fn validate_notion(notion: &Notion) -> Result<(), ConfigError> {
    if notion.token.trim().is_empty() {
        return Err(ConfigError::Invalid("notion.token must be non-empty"));
    }
    if notion.version.trim().is_empty() {
        return Err(ConfigError::Invalid("notion.version must be non-empty"));
    }
    Ok(())
}

/// Validate a configuration instance.
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.data_dir.trim().is_empty() {
        return Err(ConfigError::Invalid("app.data_dir must be non-empty"));
    }
    if cfg.app.board.trim().is_empty() {
        return Err(ConfigError::Invalid("app.board must be non-empty"));
    }
    if cfg.app.description_limit == Some(0) {
        return Err(ConfigError::Invalid("app.description_limit must be > 0 or null"));
    }

    if cfg.trello.key.trim().is_empty() {
        return Err(ConfigError::Invalid("trello.key must be non-empty"));
    }
    if cfg.trello.token.trim().is_empty() {
        return Err(ConfigError::Invalid("trello.token must be non-empty"));
    }

    validate_notion(&cfg.notion)?;
    if cfg.notion.databases.is_empty() {
        return Err(ConfigError::Invalid("notion.databases must map at least one list"));
    }
    if cfg.notion.databases.values().any(|db| db.trim().is_empty()) {
        return Err(ConfigError::Invalid("notion.databases titles must be non-empty"));
    }

    let t = &cfg.tuning;
    if t.enrich_chunk_size == 0 {
        return Err(ConfigError::Invalid("tuning.enrich_chunk_size must be > 0"));
    }
    if t.enrich_parallelism == 0 {
        return Err(ConfigError::Invalid("tuning.enrich_parallelism must be > 0"));
    }
    if t.enrich_parallelism > SOURCE_RATE_BUDGET {
        return Err(ConfigError::Invalid(
            "tuning.enrich_parallelism exceeds the Trello rate budget of 10 requests/s",
        ));
    }
    if t.import_chunk_size == 0 {
        return Err(ConfigError::Invalid("tuning.import_chunk_size must be > 0"));
    }
    if t.max_attempts == 0 {
        return Err(ConfigError::Invalid("tuning.max_attempts must be > 0"));
    }

    Ok(())
}

/// Returns a complete example configuration.
pub fn example() -> &'static str {
    r#"app:
  data_dir: "./data"
  board: "Programming Bucket"
  description_limit: 100

trello:
  key: "YOUR_TRELLO_API_KEY"
  token: "YOUR_TRELLO_TOKEN"

notion:
  token: "YOUR_NOTION_INTEGRATION_TOKEN"
  version: "2022-06-28"
  databases:
    "To Read": "Reading List"
    "Project Ideas": "Projects"
    "Tools": "Projects"
  colors:
    sky: "blue"
    lime: "green"
    black: "gray"

tuning:
  enrich_chunk_size: 10
  enrich_parallelism: 2
  import_chunk_size: 3
  max_attempts: 4
  retry_backoff_ms: 2000
"#
}
