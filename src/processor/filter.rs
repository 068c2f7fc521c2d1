//! Exclusion filtering
//!
//! Clearance zones and similar modelling aids are exported as elements but are
//! not physical parts. Rows whose name starts with the exclusion prefix,
//! ignoring case, are removed.

use crate::models::Table;
use tracing::{debug, info};

/// Whether a name falls under the exclusion prefix
pub fn is_excluded(name: &str, prefix: &str) -> bool {
    name.to_lowercase().starts_with(&prefix.to_lowercase())
}

/// Remove excluded rows in place, returning how many were removed.
///
/// After a removal the row that moved into the cursor position is checked
/// before the cursor advances, so consecutive matches are all removed.
pub fn remove_excluded_rows(table: &mut Table, name_column: usize, prefix: &str) -> usize {
    let mut removed = 0;
    let mut row = 0;

    while row < table.row_count() {
        let name = table.cell(row, name_column).to_string();
        if is_excluded(&name, prefix) {
            debug!("Removing row {} ({:?})", row + removed + 1, name);
            table.remove_row(row);
            removed += 1;
        } else {
            row += 1;
        }
    }

    info!(
        "Exclusion filter: {} rows removed, {} remain",
        removed,
        table.row_count()
    );

    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::EXCLUSION_PREFIX;
    use crate::models::Value;

    #[test]
    fn test_prefix_match_ignores_case() {
        assert!(is_excluded("ClearanceZone_01", EXCLUSION_PREFIX));
        assert!(is_excluded("ClearanceZoneAdjacent", EXCLUSION_PREFIX));
        assert!(is_excluded("CLEARANCEZONE", EXCLUSION_PREFIX));
        assert!(!is_excluded("Not ClearanceZone", EXCLUSION_PREFIX));
        assert!(!is_excluded("Clearance Zone", EXCLUSION_PREFIX));
        assert!(!is_excluded("", EXCLUSION_PREFIX));
    }

    #[test]
    fn test_consecutive_matches_are_all_removed() {
        let mut table = Table::from_strings(
            &["ID", "Name"],
            &[
                &["1", "ClearanceZone_01"],
                &["2", "ClearanceZone_02"],
                &["3", "Bracket"],
                &["4", "clearancezone"],
                &["5", "ClearanceZoneAdjacent"],
                &["6", "Not ClearanceZone"],
            ],
        );

        let removed = remove_excluded_rows(&mut table, 1, EXCLUSION_PREFIX);

        assert_eq!(removed, 4);
        let ids: Vec<&Value> = table.column_values(0).collect();
        assert_eq!(ids, vec![&Value::from("3"), &Value::from("6")]);
    }

    #[test]
    fn test_no_matches_leaves_table_untouched() {
        let mut table = Table::from_strings(&["Name"], &[&["Bracket"], &["Rod"]]);
        let before = table.clone();

        assert_eq!(remove_excluded_rows(&mut table, 0, EXCLUSION_PREFIX), 0);
        assert_eq!(table, before);
    }
}
