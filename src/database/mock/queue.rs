//! Expectation Queue
//!
//! Ordered statement queue and its matching engine.

use super::expectation::{Expectation, MatchedExpectation};
use crate::database::types::CallContext;
use crate::error::{Error, Result};
use regex::Regex;
use std::collections::VecDeque;
use tracing::debug;

#[derive(Debug, Clone)]
struct QueuedExpectation {
    expectation: Expectation,
    regex: Regex,
}

impl QueuedExpectation {
    fn check(&self, query: &str, context: CallContext) -> Result<()> {
        if !self.regex.is_match(query) {
            return Err(Error::PatternMismatch {
                query: query.to_string(),
                pattern: self.expectation.pattern.clone(),
            });
        }

        let in_tx = context.in_transaction();
        if self.expectation.in_tx != in_tx {
            return Err(Error::TransactionContextMismatch {
                query: query.to_string(),
                expected: self.expectation.in_tx,
                actual: in_tx,
            });
        }
        Ok(())
    }
}

/// Ordered, FIFO queue of expectations
///
/// Exactly one expectation is consumed per successful prepare, whether the
/// statement is later executed or queried. The queue never grows while
/// statements are being matched; it is only replaced wholesale.
#[derive(Debug, Clone, Default)]
pub struct ExpectationQueue {
    entries: VecDeque<QueuedExpectation>,
}

impl ExpectationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile every pattern up front
    ///
    /// The first invalid pattern fails the whole list; no partially compiled
    /// queue is ever produced.
    pub fn compile<I>(expectations: I) -> Result<Self>
    where
        I: IntoIterator<Item = Expectation>,
    {
        let entries = expectations
            .into_iter()
            .enumerate()
            .map(|(index, expectation)| {
                let regex =
                    Regex::new(&expectation.pattern).map_err(|source| Error::PatternCompile {
                        index,
                        pattern: expectation.pattern.clone(),
                        source,
                    })?;
                Ok(QueuedExpectation { expectation, regex })
            })
            .collect::<Result<VecDeque<_>>>()?;

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pattern of the next expectation, if any
    pub fn peek_pattern(&self) -> Option<&str> {
        self.entries
            .front()
            .map(|entry| entry.expectation.pattern.as_str())
    }

    /// Match `query` against the head expectation
    ///
    /// Checks run in order: queue empty, pattern, transaction context. Only a
    /// full match pops the head; a rejected call leaves the queue as it was.
    /// Argument checks happen later, when the statement is executed or queried.
    pub fn prepare_next(
        &mut self,
        query: &str,
        context: CallContext,
    ) -> Result<MatchedExpectation> {
        let entry = self.entries.pop_front().ok_or_else(|| Error::QueueEmpty {
            query: query.to_string(),
        })?;

        if let Err(err) = entry.check(query, context) {
            self.entries.push_front(entry);
            return Err(err);
        }

        debug!(
            query,
            pattern = %entry.expectation.pattern,
            in_tx = context.in_transaction(),
            remaining = self.entries.len(),
            "statement matched expectation"
        );
        Ok(MatchedExpectation::new(entry.expectation, query.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{rows::RowCursor, types::Value};

    fn queue(expectations: Vec<Expectation>) -> ExpectationQueue {
        ExpectationQueue::compile(expectations).unwrap()
    }

    #[test]
    fn test_n_expectations_need_n_calls() {
        let mut q = queue(vec![
            Expectation::new("^select 1$"),
            Expectation::new("^select 2$"),
            Expectation::new("^select 3$"),
        ]);

        for n in 1..=3 {
            q.prepare_next(&format!("select {n}"), CallContext::Standalone).unwrap();
        }

        assert_eq!(q.len(), 0);
        let err = q.prepare_next("select 4", CallContext::Standalone).unwrap_err();
        assert!(matches!(err, Error::QueueEmpty { .. }));
    }

    #[test]
    fn test_matching_is_strictly_in_order() {
        let mut q = queue(vec![
            Expectation::new("^select a"),
            Expectation::new("^select b"),
        ]);

        let err = q.prepare_next("select b", CallContext::Standalone).unwrap_err();
        match err {
            Error::PatternMismatch { query, pattern } => {
                assert_eq!(query, "select b");
                assert_eq!(pattern, "^select a");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(q.len(), 2);
        assert_eq!(q.peek_pattern(), Some("^select a"));
    }

    #[test]
    fn test_patterns_are_not_anchored() {
        let mut q = queue(vec![Expectation::new("from user")]);
        assert!(q
            .prepare_next("select id from user where id > $1", CallContext::Standalone)
            .is_ok());
    }

    #[test]
    fn test_transaction_context_must_agree() {
        let mut q = queue(vec![Expectation::new("^insert").in_transaction()]);

        let err = q.prepare_next("insert into t", CallContext::Standalone).unwrap_err();
        assert!(matches!(
            err,
            Error::TransactionContextMismatch {
                expected: true,
                actual: false,
                ..
            }
        ));
        assert_eq!(q.len(), 1);

        assert!(q.prepare_next("insert into t", CallContext::Transaction).is_ok());
        assert!(q.is_empty());
    }

    #[test]
    fn test_standalone_expectation_rejects_transaction_call() {
        let mut q = queue(vec![Expectation::new("^select")]);
        assert!(q.prepare_next("select 1", CallContext::Transaction).is_err());
    }

    #[test]
    fn test_matched_expectation_keeps_actual_text() {
        let expected = Expectation::new("select .*? from user")
            .with_args([2])
            .returning_rows(RowCursor::new(["id"], vec![vec![Value::Int(3)]]));
        let mut q = queue(vec![expected]);

        let m = q
            .prepare_next("select id from user where id > $1", CallContext::Standalone)
            .unwrap();
        assert_eq!(m.query(), "select id from user where id > $1");
        let rows: Vec<_> = m.query_with(&[Value::Int(2)]).unwrap().collect();
        assert_eq!(rows, vec![vec![Value::Int(3)]]);
    }

    #[test]
    fn test_invalid_pattern_reports_index() {
        let err = ExpectationQueue::compile(vec![
            Expectation::new("^ok$"),
            Expectation::new("(unclosed"),
        ])
        .unwrap_err();

        match err {
            Error::PatternCompile { index, pattern, .. } => {
                assert_eq!(index, 1);
                assert_eq!(pattern, "(unclosed");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
