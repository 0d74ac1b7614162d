//! # dbmock-rs
//!
//! Programmable test double for a SQL driver interface.
//!
//! Test code declares, in order, the statements the code under test is
//! expected to issue: a pattern for the statement text, the bound arguments,
//! whether the statement runs inside a transaction, and a canned answer
//! (rows or an exec outcome). The mock connection checks each call against
//! the head of that queue and fails on the first mismatch.
//!
//! ```no_run
//! use dbmock_rs::database::{mock::{Expectation, MockConnection}, DatabaseConnection, RowCursor, Value};
//!
//! # async fn demo() -> dbmock_rs::Result<()> {
//! let mock = MockConnection::new();
//! let expected = Expectation::new("^select 1$")
//!     .returning_rows(RowCursor::new(["n"], vec![vec![Value::Int(1)]]));
//! mock.load_expectations([expected])?;
//!
//! let rows: Vec<_> = mock.query("select 1", &[]).await?.collect();
//! assert_eq!(rows, vec![vec![Value::Int(1)]]);
//! assert_eq!(mock.remaining_count(), 0);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod logging;

pub use database::mock::{Expectation, MockConnection, MockEngine};
pub use error::{Error, Result};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::QueueEmpty {
            query: "select 1".to_string(),
        };
        assert!(err.to_string().contains("select 1"));
    }
}
