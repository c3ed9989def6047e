//! Cypher compilation of directives and the Neo4j gateway.
//!
//! Nodes are merged on their natural key only, so re-running an upsert
//! updates the existing node. Edges are merged between matched endpoints,
//! so re-running a wiring never duplicates them.

use async_trait::async_trait;
use neo4rs::{query, BoltNull, BoltType, Query};

use diamond_core::{NodeKey, PropValue, RelType};

use crate::client::{GraphClient, GraphError};
use crate::gateway::{Directive, GraphGateway, Outcome};
use crate::schema::UniqueConstraint;

/// Cypher text plus its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CypherStatement {
    pub text: String,
    pub params: Vec<(String, PropValue)>,
}

impl CypherStatement {
    fn new(text: String) -> Self {
        Self {
            text,
            params: Vec::new(),
        }
    }

    pub fn to_query(&self) -> Query {
        self.params
            .iter()
            .fold(query(&self.text), |q, (name, value)| {
                q.param(name, to_bolt(value))
            })
    }
}

/// Whether the store answers the directive with a row the caller must read.
fn expects_row(directive: &Directive) -> bool {
    matches!(
        directive,
        Directive::MergeEdge { .. } | Directive::CountNodes(_) | Directive::CountEdges(_)
    )
}

/// Compile a directive to Cypher.
pub fn compile(directive: &Directive) -> CypherStatement {
    match directive {
        Directive::EnsureUnique(c) => ensure_unique(c),
        Directive::UpsertNode { key, properties } => {
            let mut stmt = CypherStatement::new(format!("MERGE (n:{})", key_pattern(key, "key")));
            bind_key(&mut stmt, key, "key");

            if !properties.is_empty() {
                let assignments: Vec<String> = properties
                    .iter()
                    .map(|(name, _)| format!("n.{name} = ${name}"))
                    .collect();
                stmt.text.push_str(&format!("\nSET {}", assignments.join(", ")));
                stmt.params.extend(
                    properties
                        .iter()
                        .map(|(name, value)| (name.to_string(), value.clone())),
                );
            }
            stmt
        }
        Directive::MergeEdge { rel, from, to } => merge_edge(*rel, from, to),
        Directive::DeleteAll => CypherStatement::new("MATCH (n) DETACH DELETE n".to_string()),
        Directive::CountNodes(label) => CypherStatement::new(format!(
            "MATCH (n:{label}) RETURN count(n) AS cnt"
        )),
        Directive::CountEdges(rel) => CypherStatement::new(format!(
            "MATCH ()-[r:{rel}]->() RETURN count(r) AS cnt"
        )),
    }
}

fn ensure_unique(c: &UniqueConstraint) -> CypherStatement {
    let props: Vec<String> = c.properties().iter().map(|p| format!("n.{p}")).collect();
    let target = match props.as_slice() {
        [single] => single.clone(),
        many => format!("({})", many.join(", ")),
    };
    CypherStatement::new(format!(
        "CREATE CONSTRAINT {} IF NOT EXISTS FOR (n:{}) REQUIRE {target} IS UNIQUE",
        c.name, c.label
    ))
}

fn merge_edge(rel: RelType, from: &NodeKey, to: &NodeKey) -> CypherStatement {
    let mut stmt = CypherStatement::new(format!(
        "OPTIONAL MATCH (a:{})
         OPTIONAL MATCH (b:{})
         FOREACH (x IN CASE WHEN a IS NOT NULL AND b IS NOT NULL THEN [1] ELSE [] END |
           MERGE (a)-[:{rel}]->(b))
         RETURN a IS NOT NULL AS from_found, b IS NOT NULL AS to_found",
        key_pattern(from, "from"),
        key_pattern(to, "to"),
    ));
    bind_key(&mut stmt, from, "from");
    bind_key(&mut stmt, to, "to");
    stmt
}

/// `Label {name: $prefix_name, school: $prefix_school}`
fn key_pattern(key: &NodeKey, prefix: &str) -> String {
    let fields: Vec<String> = key
        .values
        .iter()
        .map(|(name, _)| format!("{name}: ${prefix}_{name}"))
        .collect();
    format!("{} {{{}}}", key.label, fields.join(", "))
}

fn bind_key(stmt: &mut CypherStatement, key: &NodeKey, prefix: &str) {
    stmt.params.extend(
        key.values
            .iter()
            .map(|(name, value)| (format!("{prefix}_{name}"), PropValue::Text(value.clone()))),
    );
}

fn to_bolt(value: &PropValue) -> BoltType {
    match value {
        PropValue::Int(i) => BoltType::from(*i),
        PropValue::Text(s) => BoltType::from(s.clone()),
        PropValue::Null => BoltType::Null(BoltNull),
    }
}

fn read_column<T: serde::de::DeserializeOwned>(row: &neo4rs::Row, column: &str) -> Result<T, GraphError> {
    row.get::<T>(column)
        .map_err(|e| GraphError::Unexpected(format!("column '{column}': {e}")))
}

#[async_trait]
impl GraphGateway for GraphClient {
    async fn execute(&self, directive: &Directive, database: &str) -> Result<Outcome, GraphError> {
        let stmt = compile(directive);
        tracing::trace!(kind = directive.kind(), cypher = %stmt.text, "Executing directive");

        if !expects_row(directive) {
            self.run_on(database, stmt.to_query()).await?;
            return Ok(Outcome::Applied);
        }

        let row = self
            .query_one_on(database, stmt.to_query())
            .await?
            .ok_or_else(|| GraphError::Unexpected(format!("{} returned no row", directive.kind())))?;

        match directive {
            Directive::MergeEdge { .. } => Ok(Outcome::Edge {
                from_found: read_column(&row, "from_found")?,
                to_found: read_column(&row, "to_found")?,
            }),
            _ => Ok(Outcome::Count(read_column(&row, "cnt")?)),
        }
    }

    async fn verify_connectivity(&self) -> Result<(), GraphError> {
        self.ping().await
    }
}
