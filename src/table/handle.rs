use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use crate::core::error::Result;
use crate::schema::schema::Schema;
use crate::table::codec;

/// Handle on one table file. Opening creates the file when absent and
/// never locks; the header is re-read from disk on every access so
/// migrations from other handles are visible immediately.
#[derive(Debug, Clone)]
pub struct Table {
    path: PathBuf,
    delimiter: char,
}

impl Table {
    pub fn open(path: impl Into<PathBuf>, delimiter: char) -> Result<Self> {
        let path = path.into();
        // Append-if-missing create; contents are untouched.
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        Ok(Table { path, delimiter })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Fresh header read.
    pub fn schema(&self) -> Result<Schema> {
        let (schema, _) = self.load()?;
        Ok(schema)
    }

    pub fn primary_key(&self) -> Result<String> {
        Ok(self.schema()?.primary_key().to_string())
    }

    /// All data rows, padded or truncated to the header width.
    pub fn read_rows(&self) -> Result<Vec<Vec<String>>> {
        let (_, rows) = self.load()?;
        Ok(rows)
    }

    /// Header plus data rows in one read, so a query chain sees one
    /// consistent snapshot of the file.
    pub fn load(&self) -> Result<(Schema, Vec<Vec<String>>)> {
        let mut buf = String::new();
        std::fs::File::open(&self.path)?.read_to_string(&mut buf)?;
        let mut all = codec::parse(&buf, self.delimiter);

        let header = if all.is_empty() { Vec::new() } else { all.remove(0) };
        let schema = Schema::from_row(header)?;

        let width = schema.len();
        for row in &mut all {
            row.resize(width, String::new());
        }
        Ok((schema, all))
    }

    /// Raw append of one encoded row. Callers that need atomicity hold
    /// a `FileLock` and write through it instead.
    pub fn append_row(&self, cells: &[String]) -> Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        let line = codec::encode_row(cells, self.delimiter);
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;

    fn temp_table(contents: &str) -> (tempfile::TempDir, Table) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.csv");
        std::fs::write(&path, contents).unwrap();
        let table = Table::open(&path, ',').unwrap();
        (dir, table)
    }

    #[test]
    fn open_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.csv");
        Table::open(&path, ',').unwrap();
        assert!(path.exists());
    }

    #[test]
    fn schema_reads_header() {
        let (_dir, table) = temp_table("id,name\n1,A\n");
        let schema = table.schema().unwrap();
        assert_eq!(schema.columns(), &["id", "name"]);
        assert_eq!(schema.primary_key(), "id");
    }

    #[test]
    fn empty_file_has_no_schema() {
        let (_dir, table) = temp_table("");
        assert_eq!(table.schema().unwrap_err().kind, ErrorKind::Schema);
    }

    #[test]
    fn rows_padded_to_header_width() {
        let (_dir, table) = temp_table("id,name,age\n1,A\n2,B,30,extra\n");
        let rows = table.read_rows().unwrap();
        assert_eq!(rows[0], vec!["1", "A", ""]);
        assert_eq!(rows[1], vec!["2", "B", "30"]);
    }

    #[test]
    fn header_changes_visible_without_reopen() {
        let (_dir, table) = temp_table("id,name\n");
        std::fs::write(table.path(), "id,name,flag\n").unwrap();
        assert_eq!(table.schema().unwrap().columns(), &["id", "name", "flag"]);
    }
}
