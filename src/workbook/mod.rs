//! Workbook hosts.
//!
//! A host supplies the raw export once and receives the finished views once.
//! Nothing is written until the whole pipeline has succeeded, so a failed run
//! leaves the host exactly as it was.
//!
//! - [`MemoryWorkbook`] keeps everything in memory, for library callers and tests
//! - [`FileWorkbook`] reads a CSV or Excel export and commits the views into a
//!   directory, one file per view

pub mod reader;
pub mod writer;

use crate::error::{QuantError, Result};
use crate::models::Table;
use crate::processor::PipelineOutput;
use std::path::{Path, PathBuf};
use tracing::info;

/// Source and destination of one pipeline run
pub trait Workbook {
    /// Read the raw table: header row plus data rows
    fn load(&mut self) -> Result<Table>;

    /// Persist the consolidated table and the aggregation view
    fn commit(&mut self, output: &PipelineOutput) -> Result<()>;
}

/// In-memory host
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    source: Table,
    committed: Option<PipelineOutput>,
    loads: usize,
    commits: usize,
}

impl MemoryWorkbook {
    pub fn new(source: Table) -> Self {
        Self {
            source,
            ..Default::default()
        }
    }

    pub fn source(&self) -> &Table {
        &self.source
    }

    /// Views from the last successful commit
    pub fn committed(&self) -> Option<&PipelineOutput> {
        self.committed.as_ref()
    }

    pub fn loads(&self) -> usize {
        self.loads
    }

    pub fn commits(&self) -> usize {
        self.commits
    }
}

impl Workbook for MemoryWorkbook {
    fn load(&mut self) -> Result<Table> {
        self.loads += 1;
        Ok(self.source.clone())
    }

    fn commit(&mut self, output: &PipelineOutput) -> Result<()> {
        self.commits += 1;
        self.committed = Some(output.clone());
        Ok(())
    }
}

/// File-backed host: a CSV/Excel export in, a directory of views out
#[derive(Debug, Clone)]
pub struct FileWorkbook {
    input_path: PathBuf,
    output_dir: PathBuf,
}

impl FileWorkbook {
    /// Create a host for `input_path`, defaulting the output directory to
    /// `<input stem>_quantifications` next to the input
    pub fn new(input_path: PathBuf, output_dir: Option<PathBuf>) -> Result<Self> {
        if !input_path.exists() {
            return Err(QuantError::InputNotFound { path: input_path });
        }

        let output_dir = output_dir.unwrap_or_else(|| default_output_dir(&input_path));

        Ok(Self {
            input_path,
            output_dir,
        })
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl Workbook for FileWorkbook {
    fn load(&mut self) -> Result<Table> {
        let table = reader::read_table(&self.input_path)?;
        info!(
            "Loaded {} rows x {} columns from {}",
            table.row_count(),
            table.column_count(),
            self.input_path.display()
        );
        Ok(table)
    }

    fn commit(&mut self, output: &PipelineOutput) -> Result<()> {
        let written = writer::write_views(&self.output_dir, output)?;
        info!(
            "Committed {} files to {}",
            written.len(),
            self.output_dir.display()
        );
        Ok(())
    }
}

fn default_output_dir(input_path: &Path) -> PathBuf {
    let stem = input_path
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    input_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("{}_quantifications", stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_input_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.csv");

        match FileWorkbook::new(missing.clone(), None) {
            Err(QuantError::InputNotFound { path }) => assert_eq!(path, missing),
            other => panic!("Expected InputNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_default_output_dir() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("Level 2 Export.csv");
        std::fs::write(&input, "Name\n").unwrap();

        let workbook = FileWorkbook::new(input, None).unwrap();

        assert_eq!(
            workbook.output_dir(),
            temp_dir.path().join("Level 2 Export_quantifications")
        );
    }
}
