//! Loading coordination exports
//!
//! Navisworks writes CSV; the same data often arrives re-saved as a workbook.
//! Both are read into a [`Table`] with the first row as headers. CSV cells
//! stay text (blank when empty) so part numbers with leading zeros survive;
//! workbook cells keep their numeric type.

use crate::constants::{CSV_EXTENSION, EXCEL_EXTENSIONS};
use crate::error::{QuantError, Result};
use crate::models::{Table, Value};
use calamine::{Data, Reader, open_workbook_auto};
use csv::ReaderBuilder;
use encoding_rs::WINDOWS_1252;
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Read a table from a CSV or Excel file, chosen by extension
pub fn read_table(path: &Path) -> Result<Table> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    if extension == CSV_EXTENSION {
        read_csv(path)
    } else if EXCEL_EXTENSIONS.contains(&extension.as_str()) {
        read_excel(path)
    } else {
        Err(QuantError::UnsupportedFormat {
            path: path.to_path_buf(),
        })
    }
}

/// Read a CSV export; ragged rows are padded and fully blank rows skipped
pub fn read_csv(path: &Path) -> Result<Table> {
    let file = File::open(path)?;
    read_csv_from(file, &path.display().to_string())
}

/// Read CSV from any reader; `source_name` is used in errors and logs
pub fn read_csv_from<R: std::io::Read>(input: R, source_name: &str) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut records = reader.byte_records();

    let headers: Vec<String> = match records.next() {
        Some(record) => record?
            .iter()
            .enumerate()
            .map(|(index, field)| {
                let header = decode_field(field);
                if index == 0 {
                    header.trim_start_matches(BYTE_ORDER_MARK).to_string()
                } else {
                    header
                }
            })
            .collect(),
        None => {
            return Err(QuantError::EmptyTable {
                source_name: source_name.to_string(),
            });
        }
    };

    let mut rows = Vec::new();
    let mut skipped = 0;
    for record in records {
        let record = record?;
        let row: Vec<Value> = record
            .iter()
            .map(|field| Value::from_raw(&decode_field(field)))
            .collect();

        if row.iter().all(Value::is_blank) {
            skipped += 1;
            continue;
        }
        rows.push(row);
    }

    debug!(
        "Read {} rows from {} ({} blank rows skipped)",
        rows.len(),
        source_name,
        skipped
    );

    Ok(Table::new(headers, rows))
}

/// Read the first worksheet of an Excel workbook
pub fn read_excel(path: &Path) -> Result<Table> {
    let workbook_error = |reason: String| QuantError::Workbook {
        path: path.to_path_buf(),
        reason,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| workbook_error("workbook has no worksheets".to_string()))?
        .map_err(|e| workbook_error(e.to_string()))?;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = sheet_rows
        .next()
        .ok_or_else(|| QuantError::EmptyTable {
            source_name: path.display().to_string(),
        })?
        .iter()
        .map(|cell| cell.to_string())
        .collect();

    let rows: Vec<Vec<Value>> = sheet_rows
        .map(|row| row.iter().map(cell_value).collect::<Vec<_>>())
        .filter(|row| !row.iter().all(Value::is_blank))
        .collect();

    Ok(Table::new(headers, rows))
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Blank,
        Data::Float(f) => Value::Number(*f),
        Data::Int(i) => Value::Number(*i as f64),
        Data::String(s) => Value::from_raw(s),
        Data::Error(e) => {
            warn!("Cell error {:?} read as blank", e);
            Value::Blank
        }
        other => Value::from_raw(&other.to_string()),
    }
}

/// UTF-8 when valid, otherwise Windows-1252 as written by Windows exporters
fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => WINDOWS_1252
            .decode_without_bom_handling(bytes)
            .0
            .into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_read_csv_keeps_text_and_blanks() {
        let data = "Name,Length,Angle\nCasework 2,500 mm,10°\n,007,\n";

        let table = read_csv_from(data.as_bytes(), "inline").unwrap();

        assert_eq!(table.headers(), &["Name", "Length", "Angle"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 1), &Value::from("500 mm"));
        assert_eq!(table.cell(0, 2), &Value::from("10°"));
        assert_eq!(table.cell(1, 0), &Value::Blank);
        assert_eq!(table.cell(1, 1), &Value::from("007"));
    }

    #[test]
    fn test_read_csv_pads_ragged_rows_and_skips_blank_rows() {
        let data = "A,B,C\n1\n,,\n4,5,6\n";

        let table = read_csv_from(data.as_bytes(), "inline").unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[0], vec![Value::from("1"), Value::Blank, Value::Blank]);
    }

    #[test]
    fn test_read_csv_strips_byte_order_mark() {
        let data = "\u{feff}Name,Angle\nRod,\n";

        let table = read_csv_from(data.as_bytes(), "inline").unwrap();

        assert_eq!(table.headers()[0], "Name");
    }

    #[test]
    fn test_read_csv_windows_1252_degree_sign() {
        let data: &[u8] = b"Name,Angle\nBracket,45\xb0\n";

        let table = read_csv_from(data, "inline").unwrap();

        assert_eq!(table.cell(0, 1), &Value::from("45°"));
    }

    #[test]
    fn test_read_csv_windows_1252_punctuation() {
        let data: &[u8] = b"Name,Angle\nRod \x96 M10,45\xb0\nInstaller\x92s Bracket,\n";

        let table = read_csv_from(data, "inline").unwrap();

        assert_eq!(table.cell(0, 0), &Value::from("Rod \u{2013} M10"));
        assert_eq!(table.cell(0, 1), &Value::from("45°"));
        assert_eq!(table.cell(1, 0), &Value::from("Installer\u{2019}s Bracket"));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            read_csv_from("".as_bytes(), "inline"),
            Err(QuantError::EmptyTable { .. })
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let mut file = Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "Name").unwrap();

        assert!(matches!(
            read_table(file.path()),
            Err(QuantError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_read_table_dispatches_csv() {
        let mut file = Builder::new().suffix(".CSV").tempfile().unwrap();
        writeln!(file, "Name,Unistrut Length,Angle").unwrap();
        writeln!(file, "Rod,600,").unwrap();

        let table = read_table(file.path()).unwrap();

        assert_eq!(table.row_count(), 1);
        assert_eq!(table.cell(0, 1), &Value::from("600"));
    }
}
