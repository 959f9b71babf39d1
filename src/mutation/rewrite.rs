use std::io::{Read, Seek, SeekFrom, Write};
use crate::core::error::Result;
use crate::table::codec;
use crate::table::file_lock::FileLock;
use crate::table::handle::Table;

/// The copy-rewrite primitive behind every mutation: take the exclusive
/// lock, buffer the whole file, truncate it, and feed every original
/// row (header included, index 0) through `transform`. A row maps to
/// its replacement, or to `None` to drop it.
///
/// Readers take no lock, so another process can observe the truncated
/// mid-rewrite state; crash durability is whatever the filesystem
/// gives. Both gaps are part of the stated contract.
pub fn locked_rewrite<F>(table: &Table, mut transform: F) -> Result<()>
where
    F: FnMut(usize, Vec<String>) -> Option<Vec<String>>,
{
    let mut lock = FileLock::acquire(table.path())?;
    let file = lock.file_mut();

    let mut buf = String::new();
    file.seek(SeekFrom::Start(0))?;
    file.read_to_string(&mut buf)?;
    let rows = codec::parse(&buf, table.delimiter());

    let mut out = String::new();
    for (index, row) in rows.into_iter().enumerate() {
        if let Some(replacement) = transform(index, row) {
            out.push_str(&codec::encode_row(&replacement, table.delimiter()));
            out.push('\n');
        }
    }

    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(out.as_bytes())?;
    Ok(())
}
