//! The query execution seam between the pipeline and the store.

use async_trait::async_trait;

use diamond_core::{GraphEntity, NodeKey, NodeLabel, Props, RelType};

use crate::client::GraphError;
use crate::schema::UniqueConstraint;

/// One parameterised instruction for the store.
///
/// Labels, relationship types and property names come from the fixed
/// taxonomy; record values only ever travel as bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Create a uniqueness constraint unless it already exists.
    EnsureUnique(UniqueConstraint),
    /// Merge a node on its natural key, then overwrite `properties`.
    UpsertNode { key: NodeKey, properties: Props },
    /// Match both endpoints (never create them) and merge the edge.
    MergeEdge {
        rel: RelType,
        from: NodeKey,
        to: NodeKey,
    },
    /// Detach and delete every node.
    DeleteAll,
    CountNodes(NodeLabel),
    CountEdges(RelType),
}

impl Directive {
    pub fn upsert<E: GraphEntity>(entity: &E) -> Self {
        Directive::UpsertNode {
            key: entity.key(),
            properties: entity.properties(),
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Directive::EnsureUnique(_) => "ensure_unique",
            Directive::UpsertNode { .. } => "upsert_node",
            Directive::MergeEdge { .. } => "merge_edge",
            Directive::DeleteAll => "delete_all",
            Directive::CountNodes(_) => "count_nodes",
            Directive::CountEdges(_) => "count_edges",
        }
    }
}

/// What the store reported back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Result of a `MergeEdge`: the edge exists iff both endpoints were found.
    Edge { from_found: bool, to_found: bool },
    Count(i64),
}

impl Outcome {
    pub fn count(self) -> Result<i64, GraphError> {
        match self {
            Outcome::Count(n) => Ok(n),
            other => Err(GraphError::Unexpected(format!("expected a count, got {other:?}"))),
        }
    }
}

/// A store able to execute directives.
#[async_trait]
pub trait GraphGateway: Send + Sync {
    async fn execute(&self, directive: &Directive, database: &str) -> Result<Outcome, GraphError>;

    async fn verify_connectivity(&self) -> Result<(), GraphError>;
}
