//! Mock Database Engine
//!
//! Explicit connection factory; there is no process-wide driver registry.

use super::{expectation::Expectation, fixture, queue::ExpectationQueue, MockConnection};
use crate::config::MockConfig;
use crate::database::engine::{DatabaseConnection, DatabaseEngine};
use crate::error::Result;
use async_trait::async_trait;
use tracing::info;

/// Mock Database Engine
///
/// Every `open` produces an independent connection. If the engine was seeded
/// with expectations, each connection starts with its own copy of them.
#[derive(Debug, Clone, Default)]
pub struct MockEngine {
    seed: ExpectationQueue,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine whose connections start with `expectations` loaded
    ///
    /// Patterns are compiled here so a bad seed fails before any connection
    /// is opened.
    pub fn with_expectations(expectations: Vec<Expectation>) -> Result<Self> {
        let seed = ExpectationQueue::compile(expectations)?;
        Ok(Self { seed })
    }

    /// Engine seeded with every fixture named in the configuration, in order
    pub fn from_config(config: &MockConfig) -> Result<Self> {
        let mut seed = Vec::new();
        for path in &config.fixtures {
            seed.extend(fixture::load_expectations(path)?);
        }
        info!(
            fixtures = config.fixtures.len(),
            expectations = seed.len(),
            "mock engine configured"
        );
        Self::with_expectations(seed)
    }

    /// Expectations every new connection starts with
    pub fn seed(&self) -> &ExpectationQueue {
        &self.seed
    }

    /// Open a connection; the dsn is recorded but otherwise ignored
    pub fn open(&self, dsn: &str) -> MockConnection {
        MockConnection::open(self.seed.clone(), dsn)
    }
}

#[async_trait]
impl DatabaseEngine for MockEngine {
    fn name(&self) -> &str {
        "dbmock"
    }

    async fn connect(&self, dsn: &str) -> Result<Box<dyn DatabaseConnection>> {
        Ok(Box::new(self.open(dsn)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::types::CallContext;
    use crate::error::Error;

    #[test]
    fn test_open_ignores_dsn() {
        let engine = MockEngine::new();
        let conn = engine.open("postgres://nowhere");
        assert_eq!(conn.remaining_count(), 0);
        assert_eq!(conn.connection_info().dsn, "postgres://nowhere");
    }

    #[test]
    fn test_seeded_connections_are_independent() {
        let engine = MockEngine::with_expectations(vec![Expectation::new("^select 1$")]).unwrap();
        assert_eq!(engine.seed().len(), 1);
        let a = engine.open("");
        let b = engine.open("");

        a.prepare_in("select 1", CallContext::Standalone).unwrap();
        assert_eq!(a.remaining_count(), 0);
        assert_eq!(b.remaining_count(), 1);
    }

    #[test]
    fn test_bad_seed_is_rejected() {
        let err = MockEngine::with_expectations(vec![Expectation::new("[")]).unwrap_err();
        assert!(matches!(err, Error::PatternCompile { .. }));
    }

    #[tokio::test]
    async fn test_connect_through_trait() {
        let engine = MockEngine::new();
        assert_eq!(engine.name(), "dbmock");
        let conn = engine.connect("").await.unwrap();
        assert!(conn.ping().await.is_ok());
        assert!(conn.close().await.is_ok());
    }
}
