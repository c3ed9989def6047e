//! diamond-core: Shared types and rules for the Diamond sports knowledge graph.
//!
//! This crate provides the foundational pieces used by the graph gateway and
//! the ingest pipeline:
//! - Node labels and relationship types of the fixed taxonomy
//! - Entity structs (Conference, School, Team, Player, Coach) and their natural keys
//! - Per-record issues reported by loaders and wirers
//! - Field normalisation (heights, weights, sentinel values, assistant lists)

pub mod error;
pub mod normalize;
pub mod types;

pub use error::{EndpointSide, RecordIssue};
pub use types::{
    Coach, CoachRole, Conference, GraphEntity, NodeKey, NodeLabel, Player, PropValue, Props,
    RelType, School, Team,
};
