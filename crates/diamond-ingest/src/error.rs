//! Error types for the diamond-ingest crate.

use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::Stage;

/// Fatal pipeline errors. Per-record problems are
/// [`diamond_core::RecordIssue`]s and never surface here.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Config load error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Failed to read {name} source {path}: {source}")]
    Source {
        name: &'static str,
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Stage '{stage}' failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: diamond_graph::GraphError,
    },

    #[error("Graph error: {0}")]
    Graph(#[from] diamond_graph::GraphError),
}

pub type Result<T> = std::result::Result<T, IngestError>;
