//! Committing pipeline output to disk
//!
//! Each view is written to a temporary file in the output directory first.
//! Only when every file has been written are they persisted under their final
//! names, so an interrupted commit never leaves a fresh quantifications view
//! next to a stale pivot.

use crate::error::{QuantError, Result};
use crate::models::Table;
use crate::processor::PipelineOutput;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Write the quantifications table, the pivot grid and the pivot definition
/// into `output_dir`, returning the final paths
pub fn write_views(output_dir: &Path, output: &PipelineOutput) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;

    let staged = vec![
        (
            stage_table(output_dir, &output.quantifications)?,
            output_dir.join(format!("{}.csv", output.pivot.source_view)),
        ),
        (
            stage_table(output_dir, &output.pivot_grid)?,
            output_dir.join(format!("{}.csv", output.pivot.name)),
        ),
        (
            stage_json(output_dir, &output.pivot)?,
            output_dir.join(format!("{}.json", output.pivot.name)),
        ),
    ];

    let mut written = Vec::with_capacity(staged.len());
    for (temp_file, target) in staged {
        temp_file
            .persist(&target)
            .map_err(|e| QuantError::Commit {
                path: target.clone(),
                reason: e.error.to_string(),
            })?;
        debug!("Wrote {}", target.display());
        written.push(target);
    }

    Ok(written)
}

/// Write a table as CSV, header row first
pub fn write_table<W: Write>(writer: W, table: &Table) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    for record in table.to_grid() {
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn stage_table(output_dir: &Path, table: &Table) -> Result<NamedTempFile> {
    let mut temp_file = NamedTempFile::new_in(output_dir)?;
    write_table(BufWriter::new(temp_file.as_file_mut()), table)?;
    Ok(temp_file)
}

fn stage_json<T: serde::Serialize>(output_dir: &Path, value: &T) -> Result<NamedTempFile> {
    let mut temp_file = NamedTempFile::new_in(output_dir)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    Ok(temp_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Value;

    #[test]
    fn test_write_table_renders_numbers_plainly() {
        let table = Table::new(
            vec!["Name".into(), "Unistrut Length".into()],
            vec![
                vec![Value::from("Rod"), Value::Number(1.0)],
                vec![Value::from("Strut, long"), Value::Number(612.5)],
            ],
        );

        let mut buffer = Vec::new();
        write_table(&mut buffer, &table).unwrap();

        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "Name,Unistrut Length\nRod,1\n\"Strut, long\",612.5\n"
        );
    }
}
