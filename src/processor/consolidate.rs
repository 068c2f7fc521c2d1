//! Column consolidation
//!
//! The same quantity shows up under several headers depending on the element
//! type ("Length", "Length 2", "Rod Length"...). Every length-like column is
//! folded into the canonical unistrut column and every extra angle column into
//! the canonical angle column, then the source columns are removed.
//!
//! Columns are scanned left to right and a later qualifying value overwrites an
//! earlier one. Each removal shifts the columns to its right, so the header row
//! is resolved again after every removal and the scan does not advance.

use crate::config::PipelineConfig;
use crate::constants::{DEFAULT_COUNT, MEASUREMENT_THRESHOLD};
use crate::error::Result;
use crate::header::{ResolvedColumns, Role, header_matches, resolve};
use crate::models::{Table, Value};
use tracing::{debug, info};

/// What consolidation changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsolidationStats {
    /// Headers of the source columns that were merged and removed, in scan order
    pub merged_columns: Vec<String>,
    /// Unistrut cells overwritten from length columns
    pub unistrut_filled: usize,
    /// Angle cells overwritten from angle columns
    pub angle_filled: usize,
    /// Unistrut cells that stayed blank and were set to a count of one
    pub unistrut_defaulted: usize,
}

/// Insert a blank unistrut column in front of the first length-like column.
///
/// Returns the inserted position, or `None` when there is no length-like
/// column to consolidate from.
pub fn provision_unistrut(table: &mut Table, config: &PipelineConfig) -> Option<usize> {
    let position = table
        .headers()
        .iter()
        .position(|header| header_matches(header, &config.length_keyword))?;

    info!(
        "No unistrut column; adding '{}' before '{}'",
        config.unistrut_header,
        table.headers()[position]
    );
    table.insert_column(position, config.unistrut_header.clone(), Value::Blank);
    Some(position)
}

/// Merge length and angle columns into their canonical columns.
///
/// Returns the resolution for the consolidated header row.
pub fn consolidate(
    table: &mut Table,
    resolved: ResolvedColumns,
    config: &PipelineConfig,
) -> Result<(ResolvedColumns, ConsolidationStats)> {
    let mut resolved = resolved;
    let mut stats = ConsolidationStats::default();

    strip_canonical_suffix(table, resolved.unistrut, &config.unit_suffix);

    let mut column = 0;
    while column < table.column_count() {
        let header = table.headers()[column].clone();

        let is_length =
            column != resolved.unistrut && header_matches(&header, &config.length_keyword);
        let is_angle = !is_length
            && column != resolved.angle
            && header_matches(&header, config.role_keywords.keyword(Role::Angle));

        if !is_length && !is_angle {
            column += 1;
            continue;
        }

        if is_length {
            let filled = merge_length_column(table, column, resolved.unistrut, &config.unit_suffix);
            debug!("Length column '{}' filled {} unistrut cells", header, filled);
            stats.unistrut_filled += filled;
        } else {
            let filled =
                merge_angle_column(table, column, resolved.angle, config.degree_indicator);
            debug!("Angle column '{}' filled {} angle cells", header, filled);
            stats.angle_filled += filled;
        }

        table.remove_column(column);
        stats.merged_columns.push(header);
        resolved = resolve(table, &config.role_keywords)?;
    }

    stats.unistrut_defaulted = default_blank_counts(table, resolved.unistrut);

    if table.headers()[resolved.angle] != config.angle_header {
        debug!(
            "Renaming angle column '{}' to '{}'",
            table.headers()[resolved.angle],
            config.angle_header
        );
        table.rename_column(resolved.angle, config.angle_header.clone());
        resolved = resolve(table, &config.role_keywords)?;
    }

    info!(
        "Consolidation: merged {} columns, {} unistrut and {} angle cells filled, {} defaulted to {}",
        stats.merged_columns.len(),
        stats.unistrut_filled,
        stats.angle_filled,
        stats.unistrut_defaulted,
        DEFAULT_COUNT
    );

    Ok((resolved, stats))
}

/// Remove the unit suffix from a cell's text, if present
pub fn strip_unit_suffix(value: &Value, suffix: &str) -> String {
    value.to_string().replacen(suffix, "", 1)
}

/// Strip the unit suffix from the canonical column's own cells
fn strip_canonical_suffix(table: &mut Table, unistrut: usize, suffix: &str) {
    for row in 0..table.row_count() {
        let value = table.cell(row, unistrut);
        if let Value::Text(text) = value {
            if text.contains(suffix) {
                let stripped = strip_unit_suffix(value, suffix);
                table.set_cell(row, unistrut, Value::Text(stripped));
            }
        }
    }
}

/// Copy qualifying length values into the unistrut column, returning how many
fn merge_length_column(table: &mut Table, source: usize, unistrut: usize, suffix: &str) -> usize {
    let mut filled = 0;
    for row in 0..table.row_count() {
        let stripped = strip_unit_suffix(table.cell(row, source), suffix);
        let candidate = Value::from_raw(&stripped);

        if candidate.exceeds(MEASUREMENT_THRESHOLD) {
            table.set_cell(row, unistrut, Value::Text(stripped));
            filled += 1;
        } else if !candidate.is_blank() && candidate.as_number().is_none() {
            debug!("Row {}: non-numeric length {:?} ignored", row + 1, stripped);
        }
    }
    filled
}

/// Copy numeric or degree-marked values into the angle column, returning how many
fn merge_angle_column(table: &mut Table, source: usize, angle: usize, degree: char) -> usize {
    let mut filled = 0;
    for row in 0..table.row_count() {
        let value = table.cell(row, source);
        if value.exceeds(MEASUREMENT_THRESHOLD) || value.to_string().contains(degree) {
            let value = value.clone();
            table.set_cell(row, angle, value);
            filled += 1;
        }
    }
    filled
}

/// Blank unistrut cells mean a counted item
fn default_blank_counts(table: &mut Table, unistrut: usize) -> usize {
    let mut defaulted = 0;
    for row in 0..table.row_count() {
        if table.cell(row, unistrut).is_blank() {
            table.set_cell(row, unistrut, Value::Number(DEFAULT_COUNT));
            defaulted += 1;
        }
    }
    defaulted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuantError;

    fn run(table: &mut Table) -> (ResolvedColumns, ConsolidationStats) {
        let config = PipelineConfig::default();
        let resolved = resolve(table, &config.role_keywords).unwrap();
        consolidate(table, resolved, &config).unwrap()
    }

    #[test]
    fn test_last_qualifying_length_column_wins() {
        let mut table = Table::from_strings(
            &["Name", "Length", "Unistrut Length", "Length 2", "Angle"],
            &[
                &["A", "300 mm", "", "450 mm", ""],
                &["B", "300 mm", "", "1", ""],
                &["C", "abc", "", "", ""],
            ],
        );

        let (resolved, stats) = run(&mut table);

        assert_eq!(table.headers(), &["Name", "Unistrut Length", "Angle"]);
        assert_eq!(resolved.index(Role::Unistrut), 1);
        assert_eq!(table.cell(0, 1), &Value::from("450"));
        assert_eq!(table.cell(1, 1), &Value::from("300"));
        assert_eq!(table.cell(2, 1), &Value::Number(1.0));
        assert_eq!(stats.merged_columns, vec!["Length", "Length 2"]);
        assert_eq!(stats.unistrut_filled, 3);
        assert_eq!(stats.unistrut_defaulted, 1);
    }

    #[test]
    fn test_existing_unistrut_value_kept_when_nothing_qualifies() {
        let mut table = Table::from_strings(
            &["Name", "Unistrut Length", "Length", "Angle"],
            &[&["A", "600 mm", "0.5", ""]],
        );

        run(&mut table);

        assert_eq!(table.cell(0, 1), &Value::from("600"));
    }

    #[test]
    fn test_number_cells_are_written_as_text() {
        let mut table = Table::new(
            vec!["Name".into(), "Unistrut".into(), "Length".into(), "Angle".into()],
            vec![vec![Value::from("A"), Value::Blank, Value::Number(250.0), Value::Blank]],
        );

        run(&mut table);

        assert_eq!(table.cell(0, 1), &Value::from("250"));
    }

    #[test]
    fn test_angle_columns_merge_numeric_and_degree_values() {
        let mut table = Table::from_strings(
            &["Name", "Unistrut", "Angle", "Angle 2", "angle_3"],
            &[
                &["A", "", "", "45", ""],
                &["B", "", "5", "1", ""],
                &["C", "", "", "", "90°"],
                &["D", "", "", "flat", ""],
            ],
        );

        let (_, stats) = run(&mut table);

        assert_eq!(table.headers(), &["Name", "Unistrut", "Angle"]);
        assert_eq!(table.cell(0, 2), &Value::from("45"));
        assert_eq!(table.cell(1, 2), &Value::from("5"));
        assert_eq!(table.cell(2, 2), &Value::from("90°"));
        assert_eq!(table.cell(3, 2), &Value::Blank);
        assert_eq!(stats.angle_filled, 2);
    }

    #[test]
    fn test_canonical_angle_header_is_renamed() {
        let mut table = Table::from_strings(&["Name", "Unistrut", "Element Angle"], &[&["A", "2", ""]]);

        let (resolved, _) = run(&mut table);

        assert_eq!(table.headers()[resolved.angle], "Angle");
    }

    #[test]
    fn test_provision_unistrut_before_first_length_column() {
        let config = PipelineConfig::default();
        let mut table = Table::from_strings(
            &["Name", "Size", "Length", "Angle"],
            &[&["A", "M10", "500 mm", ""]],
        );

        assert_eq!(provision_unistrut(&mut table, &config), Some(2));
        assert_eq!(table.headers(), &["Name", "Size", "Unistrut Length", "Length", "Angle"]);
    }

    #[test]
    fn test_provision_unistrut_without_length_columns() {
        let config = PipelineConfig::default();
        let mut table = Table::from_strings(&["Name", "Angle"], &[]);

        assert_eq!(provision_unistrut(&mut table, &config), None);
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn test_removing_a_needed_column_is_fatal() {
        let config = PipelineConfig::default();
        let mut table = Table::from_strings(
            &["Length Name", "Unistrut", "Angle"],
            &[&["5", "", ""]],
        );
        let resolved = resolve(&table, &config.role_keywords).unwrap();

        let err = consolidate(&mut table, resolved, &config).unwrap_err();

        assert!(matches!(err, QuantError::ColumnNotFound { .. }));
    }

    #[test]
    fn test_consolidated_table_is_unchanged_by_second_pass() {
        let mut table = Table::from_strings(
            &["Name", "Length", "Unistrut Length", "Angle", "Angle 2"],
            &[&["A", "500 mm", "", "", "10°"], &["B", "", "", "", ""]],
        );
        run(&mut table);
        let first = table.clone();

        let (_, stats) = run(&mut table);

        assert_eq!(table, first);
        assert!(stats.merged_columns.is_empty());
        assert_eq!(stats.unistrut_defaulted, 0);
    }
}
