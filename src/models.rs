//! Core data structures for quantification runs.
//!
//! Defines the loosely typed cell [`Value`], the in-memory [`Table`] every
//! stage mutates, and the [`RunSummary`] reported at the end of a run.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// A single cell as supplied by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Blank,
}

impl Value {
    /// Build a cell from raw text; empty text is blank, everything else stays text
    pub fn from_raw(raw: &str) -> Self {
        if raw.is_empty() {
            Value::Blank
        } else {
            Value::Text(raw.to_string())
        }
    }

    /// Plain numeric coercion: numbers as-is, text that parses as a finite number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) if n.is_finite() => Some(*n),
            Value::Number(_) => None,
            Value::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
            }
            Value::Blank => None,
        }
    }

    /// Numeric comparison that evaluates false for anything non-numeric
    pub fn exceeds(&self, threshold: f64) -> bool {
        self.as_number().is_some_and(|n| n > threshold)
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Value::Blank => true,
            Value::Text(s) => s.is_empty(),
            Value::Number(_) => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
            Value::Blank => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(raw: &str) -> Self {
        Value::from_raw(raw)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

/// Rectangular table: one header row plus data rows of equal width
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create a table, padding short rows with blanks and dropping cells past the last header
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(index, mut row)| {
                if row.len() > width {
                    warn!(
                        "Row {} has {} cells but only {} headers; extra cells dropped",
                        index + 1,
                        row.len(),
                        width
                    );
                }
                row.resize(width, Value::Blank);
                row
            })
            .collect();

        Self { headers, rows }
    }

    /// Convenience constructor from string literals; empty strings become blanks
    pub fn from_strings(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|cell| Value::from_raw(cell)).collect())
                .collect(),
        )
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Index of the first column with exactly this header
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    pub fn cell(&self, row: usize, column: usize) -> &Value {
        &self.rows[row][column]
    }

    pub fn set_cell(&mut self, row: usize, column: usize, value: Value) {
        self.rows[row][column] = value;
    }

    /// All values of one column, top to bottom
    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |row| &row[column])
    }

    pub fn rename_column(&mut self, column: usize, header: impl Into<String>) {
        self.headers[column] = header.into();
    }

    /// Remove a column, shifting every column to its right one place left
    pub fn remove_column(&mut self, column: usize) -> String {
        for row in &mut self.rows {
            row.remove(column);
        }
        self.headers.remove(column)
    }

    /// Insert a column at `column`, filling every row with `fill`
    pub fn insert_column(&mut self, column: usize, header: impl Into<String>, fill: Value) {
        self.headers.insert(column, header.into());
        for row in &mut self.rows {
            row.insert(column, fill.clone());
        }
    }

    pub fn remove_row(&mut self, row: usize) -> Vec<Value> {
        self.rows.remove(row)
    }

    /// Header row followed by every data row, rendered as display strings
    pub fn to_grid(&self) -> Vec<Vec<String>> {
        std::iter::once(self.headers.clone())
            .chain(
                self.rows
                    .iter()
                    .map(|row| row.iter().map(|value| value.to_string()).collect()),
            )
            .collect()
    }
}

/// What a run did to the table, for logging and the CLI report
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub rows_in: usize,
    pub rows_out: usize,
    pub rows_excluded: usize,
    pub names_trimmed: usize,
    pub names_rewritten: usize,
    pub headers_cleaned: usize,
    pub unistrut_provisioned: bool,
    pub columns_merged: Vec<String>,
    pub unistrut_filled: usize,
    pub unistrut_defaulted: usize,
    pub angle_filled: usize,
    pub units_mm: usize,
    pub units_count: usize,
}

impl RunSummary {
    /// One-line description of the run
    pub fn summary(&self) -> String {
        format!(
            "{} rows in, {} rows out ({} excluded), {} columns merged, {} mm / {} No.",
            self.rows_in,
            self.rows_out,
            self.rows_excluded,
            self.columns_merged.len(),
            self.units_mm,
            self.units_count
        )
    }
}
