//! Diamond Graph — query gateway for the sports knowledge graph.
//!
//! Every graph read and write is expressed as a [`Directive`] and executed
//! through a [`GraphGateway`]: [`GraphClient`] runs directives against Neo4j
//! as parameterised Cypher, [`MemoryGraph`] applies them to an in-process
//! graph for tests and dry runs.

pub mod client;
pub mod cypher;
pub mod gateway;
pub mod memory;
pub mod schema;

pub use client::{GraphClient, GraphConfig, GraphError};
pub use gateway::{Directive, GraphGateway, Outcome};
pub use memory::MemoryGraph;
pub use schema::{UniqueConstraint, UNIQUE_CONSTRAINTS};
