//! Units classification
//!
//! Each row is either a measured length ("mm") or a counted item ("No."),
//! decided from the consolidated unistrut value. The column sits directly
//! after the angle column and holds materialized values, not formulas.

use crate::config::PipelineConfig;
use crate::constants::{MEASUREMENT_THRESHOLD, UNITS_COUNT, UNITS_MM};
use crate::error::Result;
use crate::header::{ResolvedColumns, resolve};
use crate::models::{Table, Value};
use tracing::{debug, info};

/// Classification of one unistrut value
pub fn classify(unistrut: &Value) -> &'static str {
    if unistrut.exceeds(MEASUREMENT_THRESHOLD) {
        UNITS_MM
    } else {
        UNITS_COUNT
    }
}

/// Row counts per classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitsStats {
    pub column: usize,
    pub mm: usize,
    pub count: usize,
}

/// Add (or refresh) the units column after the angle column.
///
/// A table that already carries the units column, such as the output of a
/// previous run, has its values recomputed in place.
pub fn derive_units(
    table: &mut Table,
    resolved: ResolvedColumns,
    config: &PipelineConfig,
) -> Result<(ResolvedColumns, UnitsStats)> {
    let column = match table.column_index(&config.units_header) {
        Some(existing) => {
            debug!("Units column already present at {}; refreshing", existing);
            existing
        }
        None => {
            let position = resolved.angle + 1;
            table.insert_column(position, config.units_header.clone(), Value::Blank);
            position
        }
    };

    let resolved = resolve(table, &config.role_keywords)?;
    let mut stats = UnitsStats {
        column,
        ..Default::default()
    };

    for row in 0..table.row_count() {
        let units = classify(table.cell(row, resolved.unistrut));
        if units == UNITS_MM {
            stats.mm += 1;
        } else {
            stats.count += 1;
        }
        table.set_cell(row, column, Value::Text(units.to_string()));
    }

    info!(
        "Units derived: {} rows in mm, {} rows counted",
        stats.mm, stats.count
    );

    Ok((resolved, stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify(&Value::from("500")), "mm");
        assert_eq!(classify(&Value::Number(1.0)), "No.");
        assert_eq!(classify(&Value::from("0.75")), "No.");
        assert_eq!(classify(&Value::from("n/a")), "No.");
        assert_eq!(classify(&Value::Blank), "No.");
    }

    #[test]
    fn test_units_column_follows_angle() {
        let config = PipelineConfig::default();
        let mut table = Table::from_strings(
            &["Name", "Unistrut Length", "Angle", "Service Type"],
            &[&["A", "500", "", "Power"], &["B", "1", "", "Data"]],
        );
        let resolved = resolve(&table, &config.role_keywords).unwrap();

        let (resolved, stats) = derive_units(&mut table, resolved, &config).unwrap();

        assert_eq!(
            table.headers(),
            &["Name", "Unistrut Length", "Angle", "Units (mm/No.)", "Service Type"]
        );
        assert_eq!(resolved.angle, 2);
        assert_eq!(table.cell(0, 3), &Value::from("mm"));
        assert_eq!(table.cell(1, 3), &Value::from("No."));
        assert_eq!((stats.mm, stats.count), (1, 1));
    }

    #[test]
    fn test_existing_units_column_is_refreshed() {
        let config = PipelineConfig::default();
        let mut table = Table::from_strings(
            &["Name", "Unistrut Length", "Angle", "Units (mm/No.)"],
            &[&["A", "500", "", "No."]],
        );
        let resolved = resolve(&table, &config.role_keywords).unwrap();

        derive_units(&mut table, resolved, &config).unwrap();

        assert_eq!(table.column_count(), 4);
        assert_eq!(table.cell(0, 3), &Value::from("mm"));
    }
}
