//! Expectations
//!
//! A declared statement with its match criteria and canned outcome, and the
//! popped form that resolves bound arguments at exec/query time.

use crate::database::{
    rows::RowCursor,
    types::{ExecuteResult, Value},
};
use crate::error::{CallKind, Error, Result};

/// Expected database statement
///
/// `pattern` is an unanchored regular expression tested against the literal
/// statement text; anchor it (`^...$`) to avoid matching the wrong call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expectation {
    /// Regular expression matched against the statement text
    pub pattern: String,
    /// Bound arguments compared element-wise with the actual ones
    pub args: Vec<Value>,
    /// Never compare arguments for this statement
    pub skip_args: bool,
    /// Must the statement be issued through a transaction
    pub in_tx: bool,
    /// Rows returned from a query call
    pub rows: Option<RowCursor>,
    /// Outcome returned from an exec call
    pub result: Option<ExecuteResult>,
}

impl Expectation {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Default::default()
        }
    }

    pub fn with_args<I, V>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn skip_args(mut self) -> Self {
        self.skip_args = true;
        self
    }

    pub fn in_transaction(mut self) -> Self {
        self.in_tx = true;
        self
    }

    pub fn returning_rows(mut self, rows: RowCursor) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn returning_result(mut self, result: ExecuteResult) -> Self {
        self.result = Some(result);
        self
    }
}

/// Expectation popped off the queue, bound to the statement text that matched it
#[derive(Debug, Clone)]
pub struct MatchedExpectation {
    expectation: Expectation,
    query: String,
}

impl MatchedExpectation {
    pub(crate) fn new(expectation: Expectation, query: String) -> Self {
        Self { expectation, query }
    }

    /// Actual statement text
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn expectation(&self) -> &Expectation {
        &self.expectation
    }

    /// Resolve an exec call
    ///
    /// A missing result resolves to the zero outcome.
    pub fn execute_with(&self, args: &[Value]) -> Result<ExecuteResult> {
        self.check_args(CallKind::Exec, args)?;
        Ok(self.expectation.result.unwrap_or_default())
    }

    /// Resolve a query call
    ///
    /// Each call gets its own cursor positioned at the first row; missing rows
    /// resolve to an empty cursor so row loops end immediately.
    pub fn query_with(&self, args: &[Value]) -> Result<RowCursor> {
        self.check_args(CallKind::Query, args)?;
        Ok(self
            .expectation
            .rows
            .as_ref()
            .map(RowCursor::rewound)
            .unwrap_or_default())
    }

    fn check_args(&self, call: CallKind, actual: &[Value]) -> Result<()> {
        if self.expectation.skip_args {
            return Ok(());
        }

        compare_args(&self.expectation.args, actual).map_err(|reason| Error::ArgMismatch {
            call,
            reason,
            expected: self.expectation.args.clone(),
            actual: actual.to_vec(),
        })
    }
}

/// Element-wise, order-sensitive comparison
fn compare_args(expected: &[Value], actual: &[Value]) -> std::result::Result<(), String> {
    if expected.len() != actual.len() {
        return Err(format!(
            "len args not equal: {} vs {}",
            expected.len(),
            actual.len()
        ));
    }

    for (i, (want, got)) in expected.iter().zip(actual).enumerate() {
        if want != got {
            return Err(format!(
                "element {} not equal: {}({}) vs {}({})",
                i,
                want.type_name(),
                want,
                got.type_name(),
                got
            ));
        }
    }

    Ok(())
}
