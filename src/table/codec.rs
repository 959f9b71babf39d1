//! Delimited-text row codec. Cells containing the delimiter, a double
//! quote, or a line break are quoted; embedded quotes are doubled.
//! Quoted cells may span lines, so decoding works on the whole buffer.

const QUOTE: char = '"';

/// Split a file buffer into rows of raw cells.
pub fn parse(buf: &str, delimiter: char) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = buf.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == QUOTE {
                if chars.peek() == Some(&QUOTE) {
                    // Doubled quote inside a quoted cell
                    chars.next();
                    cell.push(QUOTE);
                } else {
                    in_quotes = false;
                }
            } else {
                cell.push(c);
            }
        } else if c == QUOTE {
            in_quotes = true;
        } else if c == delimiter {
            row.push(std::mem::take(&mut cell));
        } else if c == '\r' && chars.peek() == Some(&'\n') {
            // CRLF ends the row on the following '\n'
        } else if c == '\n' {
            row.push(std::mem::take(&mut cell));
            rows.push(std::mem::take(&mut row));
        } else {
            cell.push(c);
        }
    }

    // Trailing row without a final newline
    if !cell.is_empty() || !row.is_empty() {
        row.push(cell);
        rows.push(row);
    }

    // A blank line is not a row
    rows.retain(|r| !(r.len() == 1 && r[0].is_empty()));
    rows
}

/// Encode one row, without the trailing newline.
pub fn encode_row(cells: &[String], delimiter: char) -> String {
    let mut out = String::new();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        if needs_quoting(cell, delimiter) {
            out.push(QUOTE);
            for c in cell.chars() {
                if c == QUOTE {
                    out.push(QUOTE);
                }
                out.push(c);
            }
            out.push(QUOTE);
        } else {
            out.push_str(cell);
        }
    }
    out
}

fn needs_quoting(cell: &str, delimiter: char) -> bool {
    cell.contains(delimiter)
        || cell.contains(QUOTE)
        || cell.contains('\n')
        || cell.contains('\r')
}
