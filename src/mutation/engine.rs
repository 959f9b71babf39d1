use std::collections::{HashMap, HashSet};
use std::io::{Read, Seek, SeekFrom, Write};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{Record, Value};
use crate::mutation::rewrite::locked_rewrite;
use crate::schema::casts::{self, Cast};
use crate::schema::schema::Schema;
use crate::table::codec;
use crate::table::file_lock::FileLock;
use crate::table::handle::Table;

/// Insert one row. The lock is held across key generation, the
/// duplicate check, and the append, so two writers cannot mint the
/// same key. When the caller supplies no primary key and existing keys
/// are numeric, the new key is max+1 (1 for an empty table).
pub fn create(
    table: &Table,
    model_casts: &HashMap<String, Cast>,
    values: &HashMap<String, Value>,
) -> Result<Record> {
    let mut lock = FileLock::acquire(table.path())?;
    let file = lock.file_mut();

    let mut buf = String::new();
    file.seek(SeekFrom::Start(0))?;
    file.read_to_string(&mut buf)?;
    let mut rows = codec::parse(&buf, table.delimiter());

    let header = if rows.is_empty() { Vec::new() } else { rows.remove(0) };
    let schema = Schema::from_row(header)?;
    validate_columns(&schema, values)?;

    let pk = schema.primary_key();
    let id = match values.get(pk) {
        Some(value) => {
            let raw = value.to_raw();
            if raw.is_empty() {
                return Err(Error::new(
                    ErrorKind::InvalidArgument,
                    format!("primary key '{}' must not be empty", pk),
                ));
            }
            raw
        }
        None => next_numeric_key(pk, &rows)?,
    };

    if rows.iter().any(|row| row.first().map(String::as_str) == Some(id.as_str())) {
        return Err(Error::new(
            ErrorKind::DuplicateKey,
            format!("primary key '{}' already exists in table", id),
        ));
    }

    let mut cells = Vec::with_capacity(schema.len());
    for column in schema.columns() {
        if column == pk {
            cells.push(id.clone());
        } else {
            cells.push(values.get(column).map(Value::to_raw).unwrap_or_default());
        }
    }

    file.seek(SeekFrom::End(0))?;
    if !buf.is_empty() && !buf.ends_with('\n') {
        file.write_all(b"\n")?;
    }
    file.write_all(codec::encode_row(&cells, table.delimiter()).as_bytes())?;
    file.write_all(b"\n")?;

    casts::to_record(&schema, model_casts, &cells)
}

/// Merge `values` into every row whose primary key is in `ids`.
pub fn update(
    table: &Table,
    ids: &HashSet<String>,
    values: &HashMap<String, Value>,
) -> Result<usize> {
    let schema = table.schema()?;
    let mut updates = Vec::with_capacity(values.len());
    for (column, value) in values {
        updates.push((schema.require(column)?, value.to_raw()));
    }

    let width = schema.len();
    let mut affected = 0;
    locked_rewrite(table, |index, mut row| {
        if index > 0 && ids.contains(row[0].as_str()) {
            row.resize(width, String::new());
            for (pos, raw) in &updates {
                row[*pos] = raw.clone();
            }
            affected += 1;
        }
        Some(row)
    })?;
    Ok(affected)
}

/// Drop every row whose primary key is in `ids`.
pub fn delete(table: &Table, ids: &HashSet<String>) -> Result<usize> {
    let mut affected = 0;
    locked_rewrite(table, |index, row| {
        if index > 0 && ids.contains(row[0].as_str()) {
            affected += 1;
            None
        } else {
            Some(row)
        }
    })?;
    Ok(affected)
}

/// Replace the single row matching the record's primary key with the
/// record's in-memory attributes.
pub fn save(table: &Table, record: &Record) -> Result<()> {
    let schema = table.schema()?;
    let pk = schema.primary_key();
    let id = record.get(pk).map(Value::to_raw).ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidArgument,
            format!("record has no '{}' attribute to save by", pk),
        )
    })?;

    let replacement = casts::to_raw(&schema, record);
    let mut saved = false;
    locked_rewrite(table, |index, row| {
        if index > 0 && row[0] == id {
            saved = true;
            Some(replacement.clone())
        } else {
            Some(row)
        }
    })?;

    if saved {
        Ok(())
    } else {
        Err(Error::new(
            ErrorKind::NotFound,
            format!("no row with primary key '{}' to save", id),
        ))
    }
}

/// Empty all data rows, keeping only the header.
pub fn truncate(table: &Table) -> Result<()> {
    locked_rewrite(table, |index, row| if index == 0 { Some(row) } else { None })
}

fn validate_columns(schema: &Schema, values: &HashMap<String, Value>) -> Result<()> {
    for column in values.keys() {
        schema.require(column)?;
    }
    Ok(())
}

fn next_numeric_key(pk: &str, rows: &[Vec<String>]) -> Result<String> {
    let mut max = 0i64;
    for row in rows {
        let cell = row.first().map(String::as_str).unwrap_or("");
        match cell.parse::<i64>() {
            Ok(n) => max = max.max(n),
            Err(_) => {
                return Err(Error::new(
                    ErrorKind::InvalidArgument,
                    format!(
                        "primary key '{}' holds non-numeric values; supply an explicit key",
                        pk
                    ),
                ));
            }
        }
    }
    Ok((max + 1).to_string())
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

    fn vals(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn create_assigns_sequential_keys() {
        let (_dir, table) = temp_table("id,name\n");
        let casts = HashMap::new();

        let a = create(&table, &casts, &vals(&[("name", "A".into())])).unwrap();
        assert_eq!(a.get_int("id").unwrap(), 1);

        let b = create(&table, &casts, &vals(&[("name", "B".into())])).unwrap();
        assert_eq!(b.get_int("id").unwrap(), 2);

        let text = std::fs::read_to_string(table.path()).unwrap();
        assert_eq!(text, "id,name\n1,A\n2,B\n");
    }

    #[test]
    fn create_rejects_duplicate_key() {
        let (_dir, table) = temp_table("id,name\n1,A\n");
        let err = create(
            &table,
            &HashMap::new(),
            &vals(&[("id", 1.into()), ("name", "B".into())]),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateKey);
        // Nothing was written
        let text = std::fs::read_to_string(table.path()).unwrap();
        assert_eq!(text, "id,name\n1,A\n");
    }

    #[test]
    fn create_rejects_unknown_column() {
        let (_dir, table) = temp_table("id,name\n");
        let err = create(&table, &HashMap::new(), &vals(&[("email", "x".into())])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownColumn);
    }

    #[test]
    fn create_requires_explicit_key_for_text_keys() {
        let (_dir, table) = temp_table("code,name\nABC,A\n");
        let err = create(&table, &HashMap::new(), &vals(&[("name", "B".into())])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);

        let rec = create(
            &table,
            &HashMap::new(),
            &vals(&[("code", "XYZ".into()), ("name", "B".into())]),
        )
        .unwrap();
        assert_eq!(rec.get_str("code").unwrap(), "XYZ");
    }

    #[test]
    fn update_merges_values() {
        let (_dir, table) = temp_table("id,name,age\n1,A,10\n2,B,20\n");
        let ids = HashSet::from(["2".to_string()]);
        let affected = update(&table, &ids, &vals(&[("age", 21.into())])).unwrap();
        assert_eq!(affected, 1);
        let text = std::fs::read_to_string(table.path()).unwrap();
        assert_eq!(text, "id,name,age\n1,A,10\n2,B,21\n");
    }

    #[test]
    fn delete_drops_matching_rows() {
        let (_dir, table) = temp_table("id,name\n1,A\n2,B\n3,C\n");
        let ids = HashSet::from(["1".to_string(), "3".to_string()]);
        assert_eq!(delete(&table, &ids).unwrap(), 2);
        let text = std::fs::read_to_string(table.path()).unwrap();
        assert_eq!(text, "id,name\n2,B\n");
    }

    #[test]
    fn save_replaces_single_row() {
        let (_dir, table) = temp_table("id,name\n1,A\n2,B\n");
        let mut record = Record::new();
        record.set("id", Value::Int(2));
        record.set("name", Value::Text("Bea".into()));
        save(&table, &record).unwrap();
        let text = std::fs::read_to_string(table.path()).unwrap();
        assert_eq!(text, "id,name\n1,A\n2,Bea\n");
    }

    #[test]
    fn save_unknown_key_is_not_found() {
        let (_dir, table) = temp_table("id,name\n1,A\n");
        let mut record = Record::new();
        record.set("id", Value::Int(9));
        record.set("name", Value::Text("X".into()));
        assert_eq!(save(&table, &record).unwrap_err().kind, ErrorKind::NotFound);
    }

    #[test]
    fn truncate_keeps_header_only() {
        let (_dir, table) = temp_table("id,name\n1,A\n2,B\n");
        truncate(&table).unwrap();
        let text = std::fs::read_to_string(table.path()).unwrap();
        assert_eq!(text, "id,name\n");
    }
}
