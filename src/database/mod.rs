//! Database Driver Module
//!
//! ドライバ層の抽象化とモック実装

pub mod engine;
pub mod mock;
pub mod rows;
pub mod types;

// 公開API
pub use engine::{DatabaseConnection, DatabaseEngine, DatabaseTransaction, PreparedStatement};
pub use rows::{IntoRow, RowCursor, RowsBuilder};
pub use types::{CallContext, ExecuteResult, TransactionState, Value};
