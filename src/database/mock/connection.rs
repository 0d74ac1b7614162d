//! Mock Connection
//!
//! The façade the host driver calls into. Owns the expectation queue and at
//! most one tracked transaction.

use super::{
    expectation::Expectation, queue::ExpectationQueue, MockPreparedStatement, MockTransaction,
};
use crate::database::{
    engine::{ConnectionInfo, DatabaseConnection, DatabaseTransaction, PreparedStatement},
    types::{CallContext, TransactionState},
};
use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;
use uuid::Uuid;

/// Transaction tracked by a connection
#[derive(Debug, Clone, Copy)]
pub(crate) struct TrackedTransaction {
    pub(crate) id: Uuid,
    pub(crate) state: TransactionState,
}

#[derive(Debug, Default)]
pub(crate) struct ConnectionState {
    pub(crate) queue: ExpectationQueue,
    pub(crate) transaction: Option<TrackedTransaction>,
}

/// Shared handle to one connection's state
///
/// Not meant for concurrent statement issuance; the lock only makes the
/// handle shareable between test code and the code under test.
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedState(Arc<Mutex<ConnectionState>>);

impl SharedState {
    fn new(queue: ExpectationQueue) -> Self {
        Self(Arc::new(Mutex::new(ConnectionState {
            queue,
            transaction: None,
        })))
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, ConnectionState> {
        // no invariant spans a panic inside the lock, so a poisoned state is still usable
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn prepare(&self, sql: &str, context: CallContext) -> Result<MockPreparedStatement> {
        let matched = self.lock().queue.prepare_next(sql, context)?;
        Ok(MockPreparedStatement::new(matched))
    }
}

/// Mock database connection
///
/// Clones share one queue and transaction slot, so test code can keep a
/// handle while the code under test owns another. Separately opened
/// connections share nothing.
#[derive(Debug, Clone)]
pub struct MockConnection {
    state: SharedState,
    connection_id: String,
    dsn: String,
    connected_at: chrono::DateTime<Utc>,
}

impl Default for MockConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConnection {
    /// Create a connection with an empty queue
    pub fn new() -> Self {
        Self::open(ExpectationQueue::default(), "")
    }

    /// Connection starting from an already compiled queue
    pub(crate) fn open(queue: ExpectationQueue, dsn: &str) -> Self {
        Self {
            state: SharedState::new(queue),
            connection_id: Uuid::new_v4().to_string(),
            dsn: dsn.to_string(),
            connected_at: Utc::now(),
        }
    }

    /// Replace the expectation queue
    ///
    /// Order matters: statements must arrive in the order given. If any
    /// pattern fails to compile the current queue is left untouched.
    pub fn load_expectations<I>(&self, expectations: I) -> Result<()>
    where
        I: IntoIterator<Item = Expectation>,
    {
        let queue = ExpectationQueue::compile(expectations)?;
        debug!(
            connection_id = %self.connection_id,
            count = queue.len(),
            "expectations loaded"
        );
        self.state.lock().queue = queue;
        Ok(())
    }

    /// Number of expectations not yet consumed
    pub fn remaining_count(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// State of the most recently begun transaction, `None` before any begin
    pub fn transaction_state(&self) -> Option<TransactionState> {
        self.state.lock().transaction.map(|tx| tx.state)
    }

    /// Prepare with an explicit transaction context
    pub fn prepare_in(&self, sql: &str, context: CallContext) -> Result<MockPreparedStatement> {
        self.state.prepare(sql, context)
    }

    /// Start tracking a new transaction
    ///
    /// Overwrites any previously tracked transaction; nested transactions
    /// are not supported.
    pub fn begin(&self) -> MockTransaction {
        let tx = MockTransaction::new(self.state.clone());
        let previous = self.state.lock().transaction.replace(TrackedTransaction {
            id: tx.id(),
            state: TransactionState::Open,
        });
        debug!(
            connection_id = %self.connection_id,
            transaction_id = %tx.id(),
            replaced = previous.is_some(),
            "transaction begun"
        );
        tx
    }
}

#[async_trait]
impl DatabaseConnection for MockConnection {
    async fn prepare(&self, sql: &str) -> Result<Box<dyn PreparedStatement>> {
        let stmt = self.prepare_in(sql, CallContext::Standalone)?;
        Ok(Box::new(stmt))
    }

    async fn begin_transaction(&self) -> Result<Box<dyn DatabaseTransaction>> {
        Ok(Box::new(self.begin()))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            connection_id: self.connection_id.clone(),
            dsn: self.dsn.clone(),
            connected_at: self.connected_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{rows::RowCursor, types::Value};
    use crate::error::Error;

    #[tokio::test]
    async fn test_select_one_scenario() {
        let mock = MockConnection::new();
        let expected = Expectation::new("^select 1$")
            .returning_rows(RowCursor::new(["n"], vec![vec![Value::Int(1)]]));
        mock.load_expectations([expected]).unwrap();

        let mut rows = mock.query("select 1", &[]).await.unwrap();
        let mut dest = vec![Value::Null; rows.columns().len()];
        assert!(rows.next_into(&mut dest).unwrap());
        assert_eq!(dest, vec![Value::Int(1)]);
        assert!(!rows.next_into(&mut dest).unwrap());
        assert_eq!(mock.remaining_count(), 0);
    }

    #[test]
    fn test_failed_load_keeps_previous_queue() {
        let mock = MockConnection::new();
        mock.load_expectations([Expectation::new("^a$")]).unwrap();

        let err = mock
            .load_expectations([Expectation::new("^b$"), Expectation::new("[")])
            .unwrap_err();
        assert!(matches!(err, Error::PatternCompile { index: 1, .. }));

        assert_eq!(mock.remaining_count(), 1);
        assert!(mock.prepare_in("a", CallContext::Standalone).is_ok());
    }

    #[test]
    fn test_load_replaces_queue_wholesale() {
        let mock = MockConnection::new();
        mock.load_expectations([Expectation::new("a"), Expectation::new("b")]).unwrap();
        mock.load_expectations([Expectation::new("c")]).unwrap();

        assert_eq!(mock.remaining_count(), 1);
        assert!(mock.prepare_in("a", CallContext::Standalone).is_err());
    }

    #[test]
    fn test_transaction_state_unset_before_begin() {
        let mock = MockConnection::new();
        assert_eq!(mock.transaction_state(), None);

        let _tx = mock.begin();
        assert_eq!(mock.transaction_state(), Some(TransactionState::Open));
    }

    #[test]
    fn test_clones_share_state() {
        let mock = MockConnection::new();
        let handle = mock.clone();
        mock.load_expectations([Expectation::new("x")]).unwrap();

        assert_eq!(handle.remaining_count(), 1);
        handle.prepare_in("x", CallContext::Standalone).unwrap();
        assert_eq!(mock.remaining_count(), 0);
    }

    #[test]
    fn test_separate_connections_are_independent() {
        let a = MockConnection::new();
        let b = MockConnection::new();
        a.load_expectations([Expectation::new("x")]).unwrap();

        assert_eq!(b.remaining_count(), 0);
        assert_ne!(
            a.connection_info().connection_id,
            b.connection_info().connection_id
        );
    }

    #[test]
    fn test_ping_and_close_are_noops() {
        let mock = MockConnection::new();
        assert!(tokio_test::block_on(mock.ping()).is_ok());
        assert!(tokio_test::block_on(mock.close()).is_ok());
    }

    #[test]
    fn test_prepare_through_trait_is_standalone() {
        let mock = MockConnection::new();
        mock.load_expectations([Expectation::new("^update").in_transaction()]).unwrap();

        let err = tokio_test::block_on(DatabaseConnection::prepare(&mock, "update t"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::TransactionContextMismatch { .. }));
        assert_eq!(mock.remaining_count(), 1);
    }
}
