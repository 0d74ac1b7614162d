//! Database Types and Common Structures
//!
//! Values bound to statements, write outcomes and transaction state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// データベース値
///
/// Equality is structural: `Int(1)` never equals `Float(1.0)` or `String("1")`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Binary(Vec<u8>),
    Json(serde_json::Value),
    DateTime(DateTime<Utc>),
}

impl Value {
    /// 型名（診断メッセージ用）
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Binary(_) => "binary",
            Value::Json(_) => "json",
            Value::DateTime(_) => "datetime",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{}", s),
            Value::Binary(b) => write!(f, "<{} bytes>", b.len()),
            Value::Json(j) => write!(f, "{}", j),
            Value::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Binary(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// コマンド実行結果
///
/// The zero value (`Default`) is what an exec call observes when the
/// expectation carries no result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteResult {
    /// 最後に挿入されたID
    #[serde(default)]
    pub last_insert_id: i64,
    /// 影響を受けた行数
    #[serde(default)]
    pub rows_affected: u64,
}

impl ExecuteResult {
    pub fn new(last_insert_id: i64, rows_affected: u64) -> Self {
        Self {
            last_insert_id,
            rows_affected,
        }
    }

    pub fn last_insert_id(&self) -> i64 {
        self.last_insert_id
    }

    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }
}

/// トランザクション状態
///
/// "Unset" (no `begin` yet) is represented as `None` by readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionState {
    Open,
    Committed,
    RolledBack,
}

impl TransactionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionState::Open)
    }
}

impl std::fmt::Display for TransactionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionState::Open => write!(f, "open"),
            TransactionState::Committed => write!(f, "committed"),
            TransactionState::RolledBack => write!(f, "rolledback"),
        }
    }
}

/// Whether a statement is issued through a transaction
///
/// Supplied explicitly by the layer that owns transaction scoping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallContext {
    #[default]
    Standalone,
    Transaction,
}

impl CallContext {
    pub fn in_transaction(&self) -> bool {
        matches!(self, CallContext::Transaction)
    }
}

impl From<bool> for CallContext {
    fn from(in_tx: bool) -> Self {
        if in_tx {
            CallContext::Transaction
        } else {
            CallContext::Standalone
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_equality_is_type_sensitive() {
        assert_eq!(Value::from(1), Value::Int(1));
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::Int(1), Value::from("1"));
    }

    #[test]
    fn test_value_from_option() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::from("a"));
    }

    #[test]
    fn test_execute_result_default_is_zero() {
        let result = ExecuteResult::default();
        assert_eq!(result.last_insert_id(), 0);
        assert_eq!(result.rows_affected(), 0);
    }

    #[test]
    fn test_transaction_state_display() {
        assert_eq!(TransactionState::Committed.to_string(), "committed");
        assert_eq!(TransactionState::RolledBack.to_string(), "rolledback");
        assert!(!TransactionState::Open.is_terminal());
    }

    #[test]
    fn test_call_context_from_bool() {
        assert!(CallContext::from(true).in_transaction());
        assert_eq!(CallContext::from(false), CallContext::Standalone);
    }
}
