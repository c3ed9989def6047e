//! In-process graph implementing the same directive semantics as Neo4j.
//!
//! Used by `--dry-run` and by tests. Nodes are keyed by [`NodeKey`], so two
//! nodes of one label can never share a natural key; edges are a set of
//! `(type, from, to)` triples.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use diamond_core::{NodeKey, NodeLabel, PropValue, RelType};

use crate::client::GraphError;
use crate::gateway::{Directive, GraphGateway, Outcome};

#[derive(Debug, Default)]
struct MemoryState {
    nodes: BTreeMap<NodeKey, BTreeMap<&'static str, PropValue>>,
    edges: BTreeSet<(RelType, NodeKey, NodeKey)>,
    constraints: BTreeSet<&'static str>,
}

/// Thread-safe in-memory graph store.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    state: Mutex<MemoryState>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, GraphError> {
        self.state
            .lock()
            .map_err(|_| GraphError::Unexpected("memory graph lock poisoned".to_string()))
    }

    /// All properties of a node, key properties included.
    pub fn node_properties(&self, key: &NodeKey) -> Option<serde_json::Map<String, serde_json::Value>> {
        let state = self.lock().ok()?;
        let props = state.nodes.get(key)?;

        let mut out = serde_json::Map::new();
        for (name, value) in &key.values {
            out.insert(name.to_string(), serde_json::Value::from(value.as_str()));
        }
        for (name, value) in props {
            out.insert(name.to_string(), value.to_json());
        }
        Some(out)
    }

    pub fn contains_node(&self, key: &NodeKey) -> bool {
        self.lock().map(|s| s.nodes.contains_key(key)).unwrap_or(false)
    }

    pub fn node_count(&self, label: NodeLabel) -> usize {
        self.lock()
            .map(|s| s.nodes.keys().filter(|k| k.label == label).count())
            .unwrap_or(0)
    }

    pub fn edge_count(&self, rel: RelType) -> usize {
        self.lock()
            .map(|s| s.edges.iter().filter(|(r, _, _)| *r == rel).count())
            .unwrap_or(0)
    }

    pub fn has_edge(&self, rel: RelType, from: &NodeKey, to: &NodeKey) -> bool {
        self.lock()
            .map(|s| s.edges.contains(&(rel, from.clone(), to.clone())))
            .unwrap_or(false)
    }

    /// Edges of `rel` leaving `from`.
    pub fn edges_from(&self, rel: RelType, from: &NodeKey) -> Vec<NodeKey> {
        self.lock()
            .map(|s| {
                s.edges
                    .iter()
                    .filter(|(r, f, _)| *r == rel && f == from)
                    .map(|(_, _, t)| t.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn constraint_names(&self) -> Vec<&'static str> {
        self.lock()
            .map(|s| s.constraints.iter().copied().collect())
            .unwrap_or_default()
    }

    fn apply(&self, directive: &Directive) -> Result<Outcome, GraphError> {
        let mut state = self.lock()?;

        match directive {
            Directive::EnsureUnique(c) => {
                state.constraints.insert(c.name);
                Ok(Outcome::Applied)
            }
            Directive::UpsertNode { key, properties } => {
                let node = state.nodes.entry(key.clone()).or_default();
                for (name, value) in properties {
                    if value.is_null() {
                        node.remove(name);
                    } else {
                        node.insert(*name, value.clone());
                    }
                }
                Ok(Outcome::Applied)
            }
            Directive::MergeEdge { rel, from, to } => {
                let from_found = state.nodes.contains_key(from);
                let to_found = state.nodes.contains_key(to);
                if from_found && to_found {
                    state.edges.insert((*rel, from.clone(), to.clone()));
                }
                Ok(Outcome::Edge {
                    from_found,
                    to_found,
                })
            }
            Directive::DeleteAll => {
                state.nodes.clear();
                state.edges.clear();
                Ok(Outcome::Applied)
            }
            Directive::CountNodes(label) => {
                let n = state.nodes.keys().filter(|k| k.label == *label).count();
                Ok(Outcome::Count(n as i64))
            }
            Directive::CountEdges(rel) => {
                let n = state.edges.iter().filter(|(r, _, _)| r == rel).count();
                Ok(Outcome::Count(n as i64))
            }
        }
    }
}

#[async_trait]
impl GraphGateway for MemoryGraph {
    async fn execute(&self, directive: &Directive, _database: &str) -> Result<Outcome, GraphError> {
        self.apply(directive)
    }

    async fn verify_connectivity(&self) -> Result<(), GraphError> {
        Ok(())
    }
}
