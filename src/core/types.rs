use serde::{Serialize, Deserialize};
use std::collections::HashMap;
use crate::core::error::{Error, ErrorKind, Result};

/// Typed view of a single cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Array(Vec<serde_json::Value>),
    Object(serde_json::Map<String, serde_json::Value>),
}

impl Value {
    /// Serialize back to the raw cell text written to disk.
    /// Booleans become "1"/"0", arrays and objects compact JSON,
    /// null the empty string.
    pub fn to_raw(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Int(n) => n.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Bool(true) => "1".to_string(),
            Value::Bool(false) => "0".to_string(),
            Value::Text(s) => s.clone(),
            Value::Array(items) => {
                serde_json::to_string(items).unwrap_or_default()
            }
            Value::Object(map) => {
                serde_json::to_string(map).unwrap_or_default()
            }
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// Materialized, typed view of one row. Attribute edits stay in memory
/// until an explicit save; `related` holds eager-loaded relation results.
#[derive(Debug, Clone, Default)]
pub struct Record {
    attrs: HashMap<String, Value>,
    related: HashMap<String, Vec<Record>>,
}

impl Record {
    pub fn new() -> Self {
        Record::default()
    }

    pub fn from_attrs(attrs: HashMap<String, Value>) -> Self {
        Record {
            attrs,
            related: HashMap::new(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.attrs.get(column)
    }

    pub fn set(&mut self, column: &str, value: Value) {
        self.attrs.insert(column.to_string(), value);
    }

    pub fn attrs(&self) -> &HashMap<String, Value> {
        &self.attrs
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn get_int(&self, column: &str) -> Result<i64> {
        match self.require(column)? {
            Value::Int(n) => Ok(*n),
            other => Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("column '{}' is not an integer: {:?}", column, other),
            )),
        }
    }

    pub fn get_float(&self, column: &str) -> Result<f64> {
        match self.require(column)? {
            Value::Float(f) => Ok(*f),
            Value::Int(n) => Ok(*n as f64),
            other => Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("column '{}' is not a float: {:?}", column, other),
            )),
        }
    }

    pub fn get_str(&self, column: &str) -> Result<&str> {
        match self.require(column)? {
            Value::Text(s) => Ok(s),
            other => Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("column '{}' is not text: {:?}", column, other),
            )),
        }
    }

    pub fn get_bool(&self, column: &str) -> Result<bool> {
        match self.require(column)? {
            Value::Bool(b) => Ok(*b),
            other => Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("column '{}' is not a bool: {:?}", column, other),
            )),
        }
    }

    fn require(&self, column: &str) -> Result<&Value> {
        self.attrs.get(column).ok_or_else(|| {
            Error::new(
                ErrorKind::UnknownColumn,
                format!("column '{}' not present on record", column),
            )
        })
    }

    pub fn set_related(&mut self, name: &str, records: Vec<Record>) {
        self.related.insert(name.to_string(), records);
    }

    pub fn related(&self, name: &str) -> &[Record] {
        self.related.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn related_one(&self, name: &str) -> Option<&Record> {
        self.related(name).first()
    }
}
