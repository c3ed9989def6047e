//! Configuration for the diamond-ingest loader.
//!
//! Loaded from (in priority order):
//! 1. Environment variables (`DIAMOND__` prefix, `__` separator)
//! 2. Config file (`diamond.toml`, prefix selectable on the command line)
//! 3. Defaults

use std::path::PathBuf;
use std::time::Duration;

use diamond_graph::GraphConfig;
use serde::Deserialize;

use crate::error::{IngestError, Result};
use crate::retry::RetryPolicy;
use crate::sources::SourcePaths;

/// Everything the binary needs: the store connection and the ingest run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub neo4j: GraphConfig,

    #[serde(default)]
    pub ingest: IngestConfig,
}

impl AppConfig {
    /// Credentials must come from configuration, never from defaults.
    pub fn validate_store(&self) -> Result<()> {
        if self.neo4j.password.is_empty() {
            return Err(IngestError::Config(
                "neo4j.password is not set (use DIAMOND__NEO4J__PASSWORD or the config file)"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// The `[ingest]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Directory the source file names are resolved against.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_conferences")]
    pub conferences: String,

    #[serde(default = "default_schools")]
    pub schools: String,

    #[serde(default = "default_teams")]
    pub teams: String,

    #[serde(default = "default_players")]
    pub players: String,

    #[serde(default = "default_coaches")]
    pub coaches: String,

    /// Upper bound on every single store call.
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,

    /// Retries after the first attempt, for transient failures only.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
}

impl IngestConfig {
    pub fn source_paths(&self) -> SourcePaths {
        let dir = &self.data_dir;
        SourcePaths {
            conferences: dir.join(&self.conferences),
            schools: dir.join(&self.schools),
            teams: dir.join(&self.teams),
            players: dir.join(&self.players),
            coaches: dir.join(&self.coaches),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            timeout: Duration::from_secs(self.query_timeout_secs),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_conferences() -> String {
    "conferences.csv".to_string()
}

fn default_schools() -> String {
    "schools.csv".to_string()
}

fn default_teams() -> String {
    "teams.csv".to_string()
}

fn default_players() -> String {
    "players.csv".to_string()
}

fn default_coaches() -> String {
    "coaches.csv".to_string()
}

fn default_query_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff() -> u64 {
    100
}

fn default_max_backoff() -> u64 {
    2000
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            conferences: default_conferences(),
            schools: default_schools(),
            teams: default_teams(),
            players: default_players(),
            coaches: default_coaches(),
            query_timeout_secs: default_query_timeout(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
        }
    }
}

/// Load configuration from `<file_prefix>.toml` (optional) and the environment.
pub fn load_config(file_prefix: &str) -> Result<AppConfig> {
    let cfg = ::config::Config::builder()
        .add_source(::config::File::with_name(file_prefix).required(false))
        .add_source(
            ::config::Environment::with_prefix("DIAMOND")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(cfg.try_deserialize::<AppConfig>()?)
}
