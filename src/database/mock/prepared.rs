//! Mock Prepared Statement
//!
//! Carries one matched expectation back to the host's exec/query call sites.

use super::expectation::MatchedExpectation;
use crate::database::{
    engine::PreparedStatement,
    rows::RowCursor,
    types::{ExecuteResult, Value},
};
use crate::error::Result;
use async_trait::async_trait;

/// Mock Prepared Statement
pub struct MockPreparedStatement {
    matched: MatchedExpectation,
}

impl MockPreparedStatement {
    pub(crate) fn new(matched: MatchedExpectation) -> Self {
        Self { matched }
    }

    /// Statement text the host prepared
    pub fn sql(&self) -> &str {
        self.matched.query()
    }
}

#[async_trait]
impl PreparedStatement for MockPreparedStatement {
    async fn query(&self, params: &[Value]) -> Result<RowCursor> {
        self.matched.query_with(params)
    }

    async fn execute(&self, params: &[Value]) -> Result<ExecuteResult> {
        self.matched.execute_with(params)
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    fn num_input(&self) -> Option<usize> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::mock::expectation::Expectation;

    fn statement(expectation: Expectation) -> MockPreparedStatement {
        MockPreparedStatement::new(MatchedExpectation::new(expectation, "select 1".to_string()))
    }

    #[test]
    fn test_num_input_is_unknown() {
        let stmt = statement(Expectation::new("select"));
        assert_eq!(stmt.num_input(), None);
        assert_eq!(stmt.sql(), "select 1");
    }

    #[tokio::test]
    async fn test_prepared_statement_query() {
        let stmt = statement(
            Expectation::new("select")
                .returning_rows(RowCursor::new(["n"], vec![vec![Value::Int(1)]])),
        );

        let mut rows = stmt.query(&[]).await.unwrap();
        let mut dest = vec![Value::Null];
        assert!(rows.next_into(&mut dest).unwrap());
        assert_eq!(dest, vec![Value::Int(1)]);
        assert!(stmt.close().await.is_ok());
    }

    #[tokio::test]
    async fn test_prepared_statement_execute_checks_args() {
        let stmt = statement(
            Expectation::new("insert")
                .with_args([1])
                .returning_result(ExecuteResult::new(9, 1)),
        );

        assert!(stmt.execute(&[Value::Int(2)]).await.is_err());
        let result = stmt.execute(&[Value::Int(1)]).await.unwrap();
        assert_eq!(result.last_insert_id(), 9);
    }
}
