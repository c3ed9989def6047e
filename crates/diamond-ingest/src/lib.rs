//! diamond-ingest: Builds the sports knowledge graph from CSV sources.
//!
//! Reads the conference, school, team, player and coach sources, normalises
//! each record, upserts entities by natural key and wires relationships
//! between already-loaded entities, one ordered stage at a time.

pub mod config;
pub mod context;
pub mod error;
pub mod guard;
pub mod loaders;
pub mod pipeline;
pub mod report;
pub mod retry;
pub mod sources;
pub mod wirers;

pub use error::IngestError;
pub use pipeline::{run_pipeline, Pipeline, Stage};
pub use report::{RunReport, StageReport};
