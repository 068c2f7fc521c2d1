//! Header cleanup and role resolution.
//!
//! Coordination exports name the same property differently depending on the
//! element type and the tab it came from, so columns are located by role:
//! the first header that contains the role keyword, case-insensitively.
//! A resolution is only valid for the header row it was computed from; any
//! stage that inserts or removes a column must resolve again.

use crate::config::RoleKeywords;
use crate::error::{QuantError, Result};
use crate::models::Table;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Canonical roles every run must be able to locate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Name,
    Unistrut,
    Angle,
}

impl Role {
    pub const REQUIRED: [Role; 3] = [Role::Name, Role::Unistrut, Role::Angle];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::Name => "Name",
            Role::Unistrut => "Unistrut",
            Role::Angle => "Angle",
        };
        f.write_str(label)
    }
}

/// Column positions of the canonical roles for one header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub name: usize,
    pub unistrut: usize,
    pub angle: usize,
}

impl ResolvedColumns {
    pub fn index(&self, role: Role) -> usize {
        match role {
            Role::Name => self.name,
            Role::Unistrut => self.unistrut,
            Role::Angle => self.angle,
        }
    }
}

/// Result of scanning a header row, before deciding whether gaps are fatal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeaderScan {
    pub name: Option<usize>,
    pub unistrut: Option<usize>,
    pub angle: Option<usize>,
}

impl HeaderScan {
    pub fn scan(headers: &[String], keywords: &RoleKeywords) -> Self {
        let scan = Self {
            name: find_column(headers, keywords.keyword(Role::Name)),
            unistrut: find_column(headers, keywords.keyword(Role::Unistrut)),
            angle: find_column(headers, keywords.keyword(Role::Angle)),
        };
        debug!(
            "Header scan: name={:?}, unistrut={:?}, angle={:?}",
            scan.name, scan.unistrut, scan.angle
        );
        scan
    }

    pub fn get(&self, role: Role) -> Option<usize> {
        match role {
            Role::Name => self.name,
            Role::Unistrut => self.unistrut,
            Role::Angle => self.angle,
        }
    }

    /// Roles with no matching column
    pub fn missing(&self) -> Vec<Role> {
        Role::REQUIRED
            .into_iter()
            .filter(|role| self.get(*role).is_none())
            .collect()
    }

    /// Turn the scan into a resolution, failing if any role is unmatched
    pub fn require(self, headers: &[String]) -> Result<ResolvedColumns> {
        match (self.name, self.unistrut, self.angle) {
            (Some(name), Some(unistrut), Some(angle)) => Ok(ResolvedColumns {
                name,
                unistrut,
                angle,
            }),
            _ => Err(QuantError::ColumnNotFound {
                roles: self.missing(),
                headers: headers.to_vec(),
            }),
        }
    }
}

/// Index of the first header containing `keyword`, ignoring case
pub fn find_column(headers: &[String], keyword: &str) -> Option<usize> {
    let keyword = keyword.to_lowercase();
    headers
        .iter()
        .position(|header| header.to_lowercase().contains(&keyword))
}

/// Whether a header contains `keyword`, ignoring case
pub fn header_matches(header: &str, keyword: &str) -> bool {
    header.to_lowercase().contains(&keyword.to_lowercase())
}

/// Resolve all canonical roles against the table's current header row
pub fn resolve(table: &Table, keywords: &RoleKeywords) -> Result<ResolvedColumns> {
    HeaderScan::scan(table.headers(), keywords).require(table.headers())
}

/// Strips export noise from header text
#[derive(Debug, Clone)]
pub struct HeaderCleaner {
    noise: Regex,
}

impl HeaderCleaner {
    pub fn new(noise_pattern: &str) -> Result<Self> {
        let noise = Regex::new(noise_pattern).map_err(|e| QuantError::Configuration {
            message: format!("Invalid header noise pattern '{}': {}", noise_pattern, e),
        })?;
        Ok(Self { noise })
    }

    /// Remove prefix noise and control characters, then trim
    pub fn clean(&self, header: &str) -> String {
        let without_noise = self.noise.replace_all(header, "");
        without_noise
            .chars()
            .filter(|c| !c.is_control())
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// Clean every header in place, returning how many changed
    pub fn clean_table(&self, table: &mut Table) -> usize {
        let mut changed = 0;
        for index in 0..table.column_count() {
            let original = &table.headers()[index];
            let cleaned = self.clean(original);
            if &cleaned != original {
                debug!("Header {} cleaned: {:?} -> {:?}", index, original, cleaned);
                table.rename_column(index, cleaned);
                changed += 1;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::HEADER_NOISE_PATTERN;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_find_column_is_case_insensitive_substring() {
        let headers = headers(&["ID", "Element NAME", "Unistrut Length", "ANGLE 2"]);

        assert_eq!(find_column(&headers, "name"), Some(1));
        assert_eq!(find_column(&headers, "unistrut"), Some(2));
        assert_eq!(find_column(&headers, "angle"), Some(3));
        assert_eq!(find_column(&headers, "size"), None);
    }

    #[test]
    fn test_first_match_wins() {
        let headers = headers(&["Name", "Raceway Name"]);
        assert_eq!(find_column(&headers, "name"), Some(0));
    }

    #[test]
    fn test_resolve_all_roles() {
        let table = Table::from_strings(&["Name", "Unistrut Length", "Angle"], &[]);
        let resolved = resolve(&table, &RoleKeywords::default()).unwrap();

        assert_eq!(resolved.index(Role::Name), 0);
        assert_eq!(resolved.index(Role::Unistrut), 1);
        assert_eq!(resolved.index(Role::Angle), 2);
    }

    #[test]
    fn test_missing_roles_are_reported() {
        let table = Table::from_strings(&["Name", "Length"], &[]);
        let err = resolve(&table, &RoleKeywords::default()).unwrap_err();

        assert_eq!(err.missing_roles(), Some(&[Role::Unistrut, Role::Angle][..]));
        assert!(err.to_string().contains("Unistrut, Angle"));
    }

    #[test]
    fn test_header_cleaner_strips_vendor_prefixes() {
        let cleaner = HeaderCleaner::new(HEADER_NOISE_PATTERN).unwrap();

        assert_eq!(cleaner.clean("Element Name"), "Name");
        assert_eq!(cleaner.clean("KGE_Location"), "Location");
        assert_eq!(cleaner.clean("Item GUID"), "GUID");
        assert_eq!(cleaner.clean("custom Raceway Name"), "Raceway Name");
        // control characters are dropped, not replaced by a space
        assert_eq!(cleaner.clean("Rod\nLength"), "RodLength");
        assert_eq!(cleaner.clean("Unistrut Length"), "Unistrut Length");
    }

    #[test]
    fn test_clean_table_counts_changes() {
        let cleaner = HeaderCleaner::new(HEADER_NOISE_PATTERN).unwrap();
        let mut table = Table::from_strings(&["Element Name", "Angle", "Item Length"], &[]);

        assert_eq!(cleaner.clean_table(&mut table), 2);
        assert_eq!(table.headers(), &["Name", "Angle", "Length"]);
    }

    #[test]
    fn test_invalid_noise_pattern() {
        assert!(matches!(
            HeaderCleaner::new("("),
            Err(QuantError::Configuration { .. })
        ));
    }
}
