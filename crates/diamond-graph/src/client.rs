//! Neo4j connection management and shared graph client.

use neo4rs::{query, ConfigBuilder, Graph, Query};
use serde::Deserialize;

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Neo4j query error: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("Uniqueness constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Store call timed out after {millis}ms")]
    Timeout { millis: u64 },

    #[error("Unexpected store response: {0}")]
    Unexpected(String),
}

impl GraphError {
    /// Transient failures are safe to retry: every directive is idempotent.
    pub fn is_transient(&self) -> bool {
        match self {
            GraphError::Connection(_) | GraphError::Timeout { .. } => true,
            GraphError::Query(e) => matches!(
                e,
                neo4rs::Error::IOError { .. } | neo4rs::Error::ConnectionError
            ),
            GraphError::ConstraintViolation(_) | GraphError::Unexpected(_) => false,
        }
    }

    /// Lift constraint failures reported by the server into their own variant.
    pub(crate) fn classify(e: neo4rs::Error) -> Self {
        let message = e.to_string();
        if message.contains("ConstraintValidationFailed") || message.contains("already exists with label")
        {
            GraphError::ConstraintViolation(message)
        } else {
            GraphError::Query(e)
        }
    }
}

/// Configuration for connecting to Neo4j.
///
/// Loaded from the `[neo4j]` section of the config file or
/// `DIAMOND__NEO4J__*` environment variables. There is no default password.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    #[serde(default = "default_uri")]
    pub uri: String,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default)]
    pub password: String,

    /// Target database for every directive.
    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

fn default_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_user() -> String {
    "neo4j".to_string()
}

fn default_database() -> String {
    "neo4j".to_string()
}

fn default_max_connections() -> u32 {
    16
}

fn default_fetch_size() -> usize {
    256
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            user: default_user(),
            password: String::new(),
            database: default_database(),
            max_connections: default_max_connections(),
            fetch_size: default_fetch_size(),
        }
    }
}

/// Neo4j graph client with connection pooling.
///
/// Clone is cheap (inner Arc). The pool is released when the last clone drops.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Connect to Neo4j with the given configuration.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db(config.database.as_str())
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        tracing::info!(uri = %config.uri, database = %config.database, "Connected to Neo4j");
        Ok(Self { graph })
    }

    /// Round-trip a trivial query to prove the server is reachable.
    pub async fn ping(&self) -> Result<(), GraphError> {
        self.graph
            .run(query("RETURN 1"))
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))
    }

    /// Execute a write-only query (CREATE, MERGE, DELETE, SET) on `database`.
    pub async fn run_on(&self, database: &str, query: Query) -> Result<(), GraphError> {
        let result = if database.is_empty() {
            self.graph.run(query).await
        } else {
            self.graph.run_on(database, query).await
        };
        result.map_err(GraphError::classify)
    }

    /// Execute a read query on `database` and return the first row, if any.
    pub async fn query_one_on(
        &self,
        database: &str,
        query: Query,
    ) -> Result<Option<neo4rs::Row>, GraphError> {
        let stream = if database.is_empty() {
            self.graph.execute(query).await
        } else {
            self.graph.execute_on(database, query).await
        };
        let mut stream = stream.map_err(GraphError::classify)?;
        stream.next().await.map_err(GraphError::classify)
    }
}
