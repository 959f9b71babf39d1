use std::path::Path;
use crate::core::error::{Error, ErrorKind, Result};
use crate::mutation::rewrite::locked_rewrite;
use crate::table::codec;
use crate::table::handle::Table;

/// Where an added column lands in the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Position {
    Last,
    Before(String),
    After(String),
}

/// Write a fresh table: a single header row. Refuses to clobber an
/// existing non-empty file.
pub fn create_table(path: &Path, delimiter: char, columns: &[String]) -> Result<()> {
    if path.exists() && std::fs::metadata(path)?.len() > 0 {
        return Err(Error::new(
            ErrorKind::Schema,
            format!("table '{}' already exists", path.display()),
        ));
    }
    let mut line = codec::encode_row(columns, delimiter);
    line.push('\n');
    std::fs::write(path, line)?;
    Ok(())
}

pub fn delete_table(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(Error::new(
            ErrorKind::Schema,
            format!("table '{}' does not exist", path.display()),
        ));
    }
    std::fs::remove_file(path)?;
    Ok(())
}

/// Insert a column into the header and its default value into every
/// data row. The insertion index is resolved once against the header
/// as it stands before the rewrite begins.
pub fn add_column(table: &Table, name: &str, default: &str, position: Position) -> Result<()> {
    let schema = table.schema()?;
    if schema.contains(name) {
        return Err(Error::new(
            ErrorKind::Schema,
            format!("column '{}' already exists", name),
        ));
    }
    let index = match &position {
        Position::Last => schema.len(),
        Position::Before(other) => schema.require(other)?,
        Position::After(other) => schema.require(other)? + 1,
    };

    let width = schema.len();
    locked_rewrite(table, |row_index, mut row| {
        row.resize(width, String::new());
        let cell = if row_index == 0 { name } else { default };
        row.insert(index, cell.to_string());
        Some(row)
    })
}

/// Rewrite only the header cell; data rows pass through untouched.
pub fn rename_column(table: &Table, from: &str, to: &str) -> Result<()> {
    let schema = table.schema()?;
    let index = schema.require(from)?;
    if schema.contains(to) {
        return Err(Error::new(
            ErrorKind::Schema,
            format!("cannot rename '{}': column '{}' already exists", from, to),
        ));
    }
    locked_rewrite(table, |row_index, mut row| {
        if row_index == 0 {
            row[index] = to.to_string();
        }
        Some(row)
    })
}

/// Remove the column from the header and from every data row.
pub fn delete_column(table: &Table, name: &str) -> Result<()> {
    let schema = table.schema()?;
    let index = schema.require(name)?;
    locked_rewrite(table, |_, mut row| {
        if index < row.len() {
            row.remove(index);
        }
        Some(row)
    })
}

/// Column operations batched under one `change_table` call, applied in
/// declaration order.
#[derive(Debug, Default)]
pub struct TableChange {
    ops: Vec<ColumnOp>,
}

#[derive(Debug)]
enum ColumnOp {
    Add {
        name: String,
        default: String,
        position: Position,
    },
    Rename {
        from: String,
        to: String,
    },
    Delete {
        name: String,
    },
}

impl TableChange {
    pub fn new() -> Self {
        TableChange::default()
    }

    pub fn add(self, name: &str, default: &str) -> Self {
        self.add_at(name, default, Position::Last)
    }

    pub fn add_at(mut self, name: &str, default: &str, position: Position) -> Self {
        self.ops.push(ColumnOp::Add {
            name: name.to_string(),
            default: default.to_string(),
            position,
        });
        self
    }

    pub fn rename(mut self, from: &str, to: &str) -> Self {
        self.ops.push(ColumnOp::Rename {
            from: from.to_string(),
            to: to.to_string(),
        });
        self
    }

    pub fn delete(mut self, name: &str) -> Self {
        self.ops.push(ColumnOp::Delete {
            name: name.to_string(),
        });
        self
    }

    pub fn apply(self, table: &Table) -> Result<()> {
        for op in self.ops {
            match op {
                ColumnOp::Add { name, default, position } => {
                    add_column(table, &name, &default, position)?;
                }
                ColumnOp::Rename { from, to } => rename_column(table, &from, &to)?,
                ColumnOp::Delete { name } => delete_column(table, &name)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_table(contents: &str) -> (tempfile::TempDir, Table) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.csv");
        std::fs::write(&path, contents).unwrap();
        let table = Table::open(&path, ',').unwrap();
        (dir, table)
    }

    #[test]
    fn create_and_delete_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.csv");

        create_table(&path, ',', &["id".into(), "title".into()]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "id,title\n");

        // Creating again over the non-empty file fails
        let err = create_table(&path, ',', &["id".into()]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Schema);

        delete_table(&path).unwrap();
        assert_eq!(delete_table(&path).unwrap_err().kind, ErrorKind::Schema);
    }

    #[test]
    fn add_column_with_position_and_default() {
        let (_dir, table) = temp_table("id,name\n1,A\n2,B\n");
        add_column(&table, "flag", "0", Position::After("name".into())).unwrap();
        let text = std::fs::read_to_string(table.path()).unwrap();
        assert_eq!(text, "id,name,flag\n1,A,0\n2,B,0\n");
    }

    #[test]
    fn add_column_before() {
        let (_dir, table) = temp_table("id,name\n1,A\n");
        add_column(&table, "rank", "9", Position::Before("name".into())).unwrap();
        let text = std::fs::read_to_string(table.path()).unwrap();
        assert_eq!(text, "id,rank,name\n1,9,A\n");
    }

    #[test]
    fn add_existing_column_fails() {
        let (_dir, table) = temp_table("id,name\n");
        let err = add_column(&table, "name", "", Position::Last).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Schema);
    }

    #[test]
    fn rename_column_touches_header_only() {
        let (_dir, table) = temp_table("id,flag\n1,0\n");
        rename_column(&table, "flag", "active").unwrap();
        let text = std::fs::read_to_string(table.path()).unwrap();
        assert_eq!(text, "id,active\n1,0\n");

        assert_eq!(
            rename_column(&table, "missing", "x").unwrap_err().kind,
            ErrorKind::UnknownColumn
        );
        assert_eq!(
            rename_column(&table, "id", "active").unwrap_err().kind,
            ErrorKind::Schema
        );
    }

    #[test]
    fn delete_column_strips_every_row() {
        let (_dir, table) = temp_table("id,name,flag\n1,A,0\n2,B,1\n");
        delete_column(&table, "flag").unwrap();
        let text = std::fs::read_to_string(table.path()).unwrap();
        assert_eq!(text, "id,name\n1,A\n2,B\n");

        assert_eq!(
            delete_column(&table, "flag").unwrap_err().kind,
            ErrorKind::UnknownColumn
        );
    }

    #[test]
    fn batched_change() {
        let (_dir, table) = temp_table("id,name\n1,A\n");
        TableChange::new()
            .add_at("flag", "0", Position::After("name".into()))
            .rename("flag", "active")
            .apply(&table)
            .unwrap();
        let text = std::fs::read_to_string(table.path()).unwrap();
        assert_eq!(text, "id,name,active\n1,A,0\n");
    }
}
