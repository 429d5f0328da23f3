//! Minimal CSV/TSV parser that produces a [`TableSnapshot`].
//!
//! The first line holds the headers and the first field of every line is the
//! row's index label. A header written as `Group|Leaf` becomes a two-level
//! column path.

use crate::error::Result;
use crate::types::{CellEntry, CellValue, ColumnHeader, Row, TableSnapshot};

/// Separator between header path segments.
const PATH_SEPARATOR: char = '|';

/// Delimiter for parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    /// Pick a delimiter from a file name; anything that isn't `.tsv` is CSV.
    pub fn from_path(path: &str) -> Self {
        if path.to_ascii_lowercase().ends_with(".tsv") {
            Self::Tab
        } else {
            Self::Comma
        }
    }

    fn as_char(self) -> char {
        match self {
            Self::Comma => ',',
            Self::Tab => '\t',
        }
    }
}

/// Parse CSV/TSV bytes into a [`TableSnapshot`].
///
/// # Errors
/// Returns [`crate::error::TableError::RaggedRow`] if a line has a different
/// number of fields than the header line.
pub fn parse_delimited(data: &[u8], delim: Delimiter) -> Result<TableSnapshot> {
    let text = String::from_utf8_lossy(data);
    let sep = delim.as_char();
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return Ok(TableSnapshot::default());
    };
    let columns: Vec<ColumnHeader> = split_csv_line(header_line, sep)
        .into_iter()
        .skip(1)
        .map(|h| parse_header(h.trim()))
        .collect();

    let rows = lines
        .map(|line| {
            let mut fields = split_csv_line(line, sep).into_iter().map(|f| parse_value(f.trim()));
            let index = fields.next().unwrap_or_default();
            Row {
                index,
                cells: fields.map(CellEntry::new).collect(),
            }
        })
        .collect();

    let table = TableSnapshot { columns, rows };
    table.validate()?;
    Ok(table)
}

fn parse_header(label: &str) -> ColumnHeader {
    let path: Vec<String> = label.split(PATH_SEPARATOR).map(|s| s.trim().to_string()).collect();
    ColumnHeader {
        path,
        classes: Vec::new(),
    }
}

fn parse_value(field: &str) -> CellValue {
    if field.is_empty() {
        CellValue::Empty
    } else if let Some(n) = field.parse::<f64>().ok().filter(|n| n.is_finite()) {
        CellValue::Number(n)
    } else {
        CellValue::Text(field.to_string())
    }
}

/// Split a CSV line respecting quoted fields.
fn split_csv_line(line: &str, sep: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    // Escaped quote
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(ch);
            }
        } else if ch == '"' {
            in_quotes = true;
        } else if ch == sep {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]
mod tests {
    use super::*;
    use crate::error::{ClickTableError, TableError};

    #[test]
    fn test_non_finite_fields_stay_text() {
        let data = b"Tenor,Score,Limit\nQ1,NaN,inf";
        let table = parse_delimited(data, Delimiter::Comma).unwrap();
        assert_eq!(table.value(0, 1), Some(&CellValue::Text("NaN".into())));
        assert_eq!(table.value(0, 2), Some(&CellValue::Text("inf".into())));
    }

    #[test]
    fn test_parse_csv_basic() {
        let data = b"Tenor,Revenue,Region\nQ1,30,NYC\nQ2,-2.5,";
        let table = parse_delimited(data, Delimiter::Comma).unwrap();
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.leaf_header(1), Some("Revenue"));
        assert_eq!(table.value(0, 0), Some(&CellValue::Text("Q1".into())));
        assert_eq!(table.value(1, 1), Some(&CellValue::Number(-2.5)));
        assert_eq!(table.value(1, 2), Some(&CellValue::Empty));
    }

    #[test]
    fn test_parse_tsv_group_headers() {
        let data = b"Tenor\tRevenue|Actual\tRevenue|Forecast\n1Y\t1\t2";
        let table = parse_delimited(data, Delimiter::Tab).unwrap();
        assert_eq!(table.header_depth(), 2);
        assert_eq!(table.columns[1].path, vec!["Revenue", "Forecast"]);
    }

    #[test]
    fn test_quoted_csv() {
        let data = b"Idx,Note\n\"Hello, World\",\"She said \"\"hi\"\"\"";
        let table = parse_delimited(data, Delimiter::Comma).unwrap();
        assert_eq!(table.value(0, 0), Some(&CellValue::Text("Hello, World".into())));
        assert_eq!(table.value(0, 1), Some(&CellValue::Text("She said \"hi\"".into())));
    }

    #[test]
    fn test_ragged_row_rejected() {
        let data = b"Idx,A,B\nr1,1";
        let err = parse_delimited(data, Delimiter::Comma).unwrap_err();
        assert!(matches!(
            err,
            ClickTableError::Table(TableError::RaggedRow { row: 0, expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_empty_csv() {
        let table = parse_delimited(b"", Delimiter::Comma).unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 1);
    }

    #[test]
    fn test_delimiter_from_path() {
        assert_eq!(Delimiter::from_path("data/table.TSV"), Delimiter::Tab);
        assert_eq!(Delimiter::from_path("table.csv"), Delimiter::Comma);
    }
}
