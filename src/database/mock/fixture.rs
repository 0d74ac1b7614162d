//! Fixture Files
//!
//! Loads expectation lists from JSON, TOML or YAML files.
//!
//! ```toml
//! [[expectations]]
//! pattern = "^select id, name from users"
//! rows = { columns = ["id", "name"], data = [[1, "fizz"], [2, "buzz"]] }
//!
//! [[expectations]]
//! pattern = "^insert into users"
//! args = [3, "foo", 1979-05-27T07:32:00Z]
//! result = { last_insert_id = 3, rows_affected = 1 }
//! ```
//!
//! Values are read in the file format's own value tree, so TOML datetimes
//! bind as [`Value::DateTime`]. Integers outside the `i64` range are
//! rejected.

use super::expectation::Expectation;
use super::queue::ExpectationQueue;
use crate::config::MockConfig;
use crate::database::{
    rows::RowCursor,
    types::{ExecuteResult, Value},
};
use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Serialized form of a fixture file
///
/// `V` is the value tree of the format the file was written in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "V: Deserialize<'de>"))]
pub struct FixtureFile<V = serde_json::Value> {
    #[serde(default)]
    pub expectations: Vec<ExpectationSpec<V>>,
}

/// One expectation as written in a fixture
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "V: Deserialize<'de>"))]
pub struct ExpectationSpec<V = serde_json::Value> {
    pub pattern: String,
    #[serde(default)]
    pub args: Vec<V>,
    #[serde(default)]
    pub skip_args: bool,
    #[serde(default)]
    pub in_tx: bool,
    #[serde(default)]
    pub rows: Option<RowsSpec<V>>,
    #[serde(default)]
    pub result: Option<ExecuteResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "V: Deserialize<'de>"))]
pub struct RowsSpec<V = serde_json::Value> {
    pub columns: Vec<String>,
    #[serde(default)]
    pub data: Vec<Vec<V>>,
}

/// A fixture format's value that can be bound as a [`Value`]
pub trait FixtureValue {
    /// Convert, or explain why the value cannot be bound
    fn into_value(self) -> std::result::Result<Value, String>;
}

impl FixtureValue for serde_json::Value {
    fn into_value(self) -> std::result::Result<Value, String> {
        let value = match self {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if n.is_u64() {
                    return Err(format!("integer {n} does not fit in i64"));
                } else {
                    let f = n.as_f64().ok_or_else(|| format!("unsupported number {n}"))?;
                    Value::Float(f)
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            other => Value::Json(other),
        };
        Ok(value)
    }
}

impl FixtureValue for toml::Value {
    fn into_value(self) -> std::result::Result<Value, String> {
        let value = match self {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::Int(i),
            toml::Value::Float(f) => Value::Float(f),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::DateTime(toml_datetime(&dt)?),
            other => Value::Json(toml_to_json(other)),
        };
        Ok(value)
    }
}

/// Offset datetimes are converted to UTC; local datetimes are taken as UTC.
/// A bare date or time has no instant to bind.
fn toml_datetime(dt: &toml::value::Datetime) -> std::result::Result<DateTime<Utc>, String> {
    let text = dt.to_string();
    if dt.offset.is_some() {
        return DateTime::parse_from_rfc3339(&text)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|e| format!("datetime {text}: {e}"));
    }
    if dt.date.is_none() || dt.time.is_none() {
        return Err(format!("datetime {text} needs both a date and a time"));
    }
    text.parse::<NaiveDateTime>()
        .map(|parsed| parsed.and_utc())
        .map_err(|e| format!("datetime {text}: {e}"))
}

// nested datetimes inside arrays and tables are kept as their TOML text
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => i.into(),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        toml::Value::Boolean(b) => b.into(),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(items) => items.into_iter().map(toml_to_json).collect(),
        toml::Value::Table(table) => table
            .into_iter()
            .map(|(key, value)| (key, toml_to_json(value)))
            .collect(),
    }
}

fn convert_all<V: FixtureValue>(values: Vec<V>) -> std::result::Result<Vec<Value>, String> {
    values.into_iter().map(FixtureValue::into_value).collect()
}

/// Fixture encodings, picked by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureFormat {
    Json,
    Toml,
    Yaml,
}

impl FixtureFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "json" => Ok(FixtureFormat::Json),
            "toml" => Ok(FixtureFormat::Toml),
            "yaml" | "yml" => Ok(FixtureFormat::Yaml),
            _ => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Parse fixture text into expectations
pub fn parse_expectations(content: &str, format: FixtureFormat) -> Result<Vec<Expectation>> {
    match format {
        FixtureFormat::Json => serde_json::from_str::<FixtureFile>(content)?.into_expectations(),
        FixtureFormat::Toml => {
            toml::from_str::<FixtureFile<toml::Value>>(content)?.into_expectations()
        }
        FixtureFormat::Yaml => serde_yaml_ng::from_str::<FixtureFile>(content)?.into_expectations(),
    }
}

impl<V: FixtureValue> FixtureFile<V> {
    /// Convert into expectations
    ///
    /// Every value must be bindable, every data row must be as wide as its
    /// column list, and every pattern must compile; otherwise the whole
    /// fixture is rejected.
    pub fn into_expectations(self) -> Result<Vec<Expectation>> {
        let expectations = self
            .expectations
            .into_iter()
            .enumerate()
            .map(|(index, spec)| spec.into_expectation(index))
            .collect::<Result<Vec<_>>>()?;

        ExpectationQueue::compile(expectations.iter().cloned())?;
        Ok(expectations)
    }
}

impl<V: FixtureValue> ExpectationSpec<V> {
    fn into_expectation(self, index: usize) -> Result<Expectation> {
        let args = convert_all(self.args).map_err(|reason| {
            Error::InvalidFixture(format!("expectation #{index}: args: {reason}"))
        })?;
        let rows = match self.rows {
            Some(spec) => Some(spec.into_cursor(index)?),
            None => None,
        };

        Ok(Expectation {
            pattern: self.pattern,
            args,
            skip_args: self.skip_args,
            in_tx: self.in_tx,
            rows,
            result: self.result,
        })
    }
}

impl<V: FixtureValue> RowsSpec<V> {
    fn into_cursor(self, index: usize) -> Result<RowCursor> {
        let width = self.columns.len();
        let mut rows = Vec::with_capacity(self.data.len());
        for (row, data) in self.data.into_iter().enumerate() {
            if data.len() != width {
                return Err(Error::InvalidFixture(format!(
                    "expectation #{}: row {} has {} values, want {}",
                    index,
                    row,
                    data.len(),
                    width
                )));
            }
            let values = convert_all(data).map_err(|reason| {
                Error::InvalidFixture(format!("expectation #{index}: row {row}: {reason}"))
            })?;
            rows.push(values);
        }

        Ok(RowCursor::new(self.columns, rows))
    }
}

/// Load expectations from a fixture file
pub fn load_expectations(path: impl AsRef<Path>) -> Result<Vec<Expectation>> {
    let path = path.as_ref();
    let format = FixtureFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    let expectations = parse_expectations(&content, format)?;

    debug!(
        path = %path.display(),
        count = expectations.len(),
        "fixture loaded"
    );
    Ok(expectations)
}

/// Result of checking one fixture file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureReport {
    pub path: PathBuf,
    pub expectations: usize,
}

/// Check fixture files in order, stopping at the first invalid one
///
/// When `paths` is empty the fixtures named in `config` are checked instead.
pub fn validate_fixtures(paths: &[PathBuf], config: &MockConfig) -> Result<Vec<FixtureReport>> {
    let paths = if paths.is_empty() {
        config.fixtures.as_slice()
    } else {
        paths
    };
    if paths.is_empty() {
        return Err(Error::InvalidFixture(
            "no fixture files given or configured".to_string(),
        ));
    }

    paths
        .iter()
        .map(|path| {
            let expectations = load_expectations(path).map_err(|source| Error::Fixture {
                path: path.display().to_string(),
                source: Box::new(source),
            })?;
            Ok(FixtureReport {
                path: path.clone(),
                expectations: expectations.len(),
            })
        })
        .collect()
}
