//! Mock Transaction
//!
//! Tracks commit/rollback for one begun transaction and issues its statements
//! in transaction context.

use super::connection::SharedState;
use super::MockPreparedStatement;
use crate::database::{
    engine::{DatabaseTransaction, PreparedStatement, TransactionInfo},
    types::{CallContext, TransactionState},
};
use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

/// Mock Transaction
///
/// Commit and rollback never fail. Only the connection's current transaction
/// is tracked: finishing a handle that a later `begin` replaced has no
/// visible effect.
pub struct MockTransaction {
    state: SharedState,
    transaction_id: Uuid,
    started_at: chrono::DateTime<Utc>,
}

impl MockTransaction {
    pub(crate) fn new(state: SharedState) -> Self {
        Self {
            state,
            transaction_id: Uuid::new_v4(),
            started_at: Utc::now(),
        }
    }

    pub(crate) fn id(&self) -> Uuid {
        self.transaction_id
    }

    /// Prepare a statement inside this transaction
    pub fn prepare_statement(&self, sql: &str) -> Result<MockPreparedStatement> {
        self.state.prepare(sql, CallContext::Transaction)
    }

    fn finish(&self, outcome: TransactionState) {
        let mut state = self.state.lock();
        match state.transaction.as_mut() {
            Some(tracked) if tracked.id == self.transaction_id => {
                tracked.state = outcome;
                debug!(transaction_id = %self.transaction_id, %outcome, "transaction finished");
            }
            _ => {
                debug!(
                    transaction_id = %self.transaction_id,
                    %outcome,
                    "finished transaction is no longer tracked"
                );
            }
        }
    }
}

#[async_trait]
impl DatabaseTransaction for MockTransaction {
    async fn prepare(&self, sql: &str) -> Result<Box<dyn PreparedStatement>> {
        let stmt = self.prepare_statement(sql)?;
        Ok(Box::new(stmt))
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.finish(TransactionState::Committed);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.finish(TransactionState::RolledBack);
        Ok(())
    }

    fn transaction_info(&self) -> TransactionInfo {
        TransactionInfo {
            transaction_id: self.transaction_id.to_string(),
            started_at: self.started_at,
        }
    }
}
