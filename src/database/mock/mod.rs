//! Mock Database Engine
//!
//! Programmable test double: statements are matched, in order, against a
//! queue of expectations and answered with canned rows or results.

pub mod connection;
pub mod engine;
pub mod expectation;
pub mod fixture;
pub mod prepared;
pub mod queue;
pub mod transaction;

pub use connection::MockConnection;
pub use engine::MockEngine;
pub use expectation::{Expectation, MatchedExpectation};
pub use prepared::MockPreparedStatement;
pub use queue::ExpectationQueue;
pub use transaction::MockTransaction;
