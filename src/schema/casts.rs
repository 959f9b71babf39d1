use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{Record, Value};
use crate::schema::schema::Schema;

/// Per-model cast directive for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cast {
    Int,
    Float,
    Str,
    Bool,
    Object,
    Array,
}

/// Map one raw row into a typed record.
///
/// Casting rules: an explicit directive wins; otherwise the primary key
/// and columns named `*_id` / `*_at` are read as integers, the empty
/// string as null, and everything else as text. Rows shorter or longer
/// than the schema have already been padded/truncated by the table
/// handle, but a short slice is tolerated here too.
pub fn to_record(
    schema: &Schema,
    casts: &HashMap<String, Cast>,
    raw: &[String],
) -> Result<Record> {
    let mut record = Record::new();
    for (i, column) in schema.columns().iter().enumerate() {
        let cell = raw.get(i).map(String::as_str).unwrap_or("");
        let value = match casts.get(column) {
            Some(cast) => cast_explicit(column, cell, *cast)?,
            None => cast_inferred(schema, column, cell),
        };
        record.set(column, value);
    }
    Ok(record)
}

/// Serialize a record back into a raw row in schema order. Attributes
/// missing from the record become empty cells.
pub fn to_raw(schema: &Schema, record: &Record) -> Vec<String> {
    schema
        .columns()
        .iter()
        .map(|column| {
            record
                .get(column)
                .map(Value::to_raw)
                .unwrap_or_default()
        })
        .collect()
}

fn cast_explicit(column: &str, cell: &str, cast: Cast) -> Result<Value> {
    if cell.is_empty() {
        return Ok(Value::Null);
    }
    match cast {
        Cast::Str => Ok(Value::Text(cell.to_string())),
        Cast::Int => cell.parse::<i64>().map(Value::Int).map_err(|_| {
            parse_error(column, cell, "integer")
        }),
        Cast::Float => cell.parse::<f64>().map(Value::Float).map_err(|_| {
            parse_error(column, cell, "float")
        }),
        Cast::Bool => match cell {
            "1" | "true" => Ok(Value::Bool(true)),
            "0" | "false" => Ok(Value::Bool(false)),
            _ => Err(parse_error(column, cell, "bool")),
        },
        Cast::Array => match serde_json::from_str(cell) {
            Ok(serde_json::Value::Array(items)) => Ok(Value::Array(items)),
            _ => Err(parse_error(column, cell, "JSON array")),
        },
        Cast::Object => match serde_json::from_str(cell) {
            Ok(serde_json::Value::Object(map)) => Ok(Value::Object(map)),
            _ => Err(parse_error(column, cell, "JSON object")),
        },
    }
}

fn cast_inferred(schema: &Schema, column: &str, cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    let keyed = column == schema.primary_key()
        || column.ends_with("_id")
        || column.ends_with("_at");
    if keyed {
        // Imported data may predate the naming convention; fall back
        // to text rather than failing the whole row.
        if let Ok(n) = cell.parse::<i64>() {
            return Value::Int(n);
        }
    }
    Value::Text(cell.to_string())
}

fn parse_error(column: &str, cell: &str, expected: &str) -> Error {
    Error::new(
        ErrorKind::Parse,
        format!("column '{}': '{}' is not a valid {}", column, cell, expected),
    )
}
