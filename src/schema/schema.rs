use serde::{Serialize, Deserialize};
use crate::core::error::{Error, ErrorKind, Result};

/// Ordered column names read from row 0 of a table file.
/// Column 0 is always the primary key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<String>,
}

impl Schema {
    pub fn from_row(row: Vec<String>) -> Result<Self> {
        if row.is_empty() || (row.len() == 1 && row[0].is_empty()) {
            return Err(Error::new(
                ErrorKind::Schema,
                "table has no header row".to_string(),
            ));
        }
        for (i, name) in row.iter().enumerate() {
            if row[..i].contains(name) {
                return Err(Error::new(
                    ErrorKind::Schema,
                    format!("duplicate column name '{}' in header", name),
                ));
            }
        }
        Ok(Schema { columns: row })
    }

    pub fn primary_key(&self) -> &str {
        &self.columns[0]
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Position lookup that reports unknown columns as errors.
    pub fn require(&self, name: &str) -> Result<usize> {
        self.position(name).ok_or_else(|| {
            Error::new(
                ErrorKind::UnknownColumn,
                format!("column '{}' not found in table header", name),
            )
        })
    }
}
