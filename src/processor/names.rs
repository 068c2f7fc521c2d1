//! Element name cleanup
//!
//! Modellers leave two kinds of noise in element names: superseded part
//! numbers and standalone counters appended when an element is copied
//! ("Casework 2"). Counters fused to the name ("MIDAS_Plate_2") are part of
//! the name and stay.

use crate::config::{NameRewriteRule, RewriteMode};
use crate::error::{QuantError, Result};
use crate::models::{Table, Value};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info};

use crate::constants::TRAILING_COUNTER_PATTERN;

static TRAILING_COUNTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(TRAILING_COUNTER_PATTERN).expect("trailing counter pattern is a valid regex")
});

/// Apply rewrite rules in order, each operating on the previous result
pub fn apply_rewrite_rules(name: &str, rules: &[NameRewriteRule]) -> String {
    rules.iter().fold(name.to_string(), |current, rule| {
        if rule.pattern.is_empty() {
            current
        } else {
            current.replacen(&rule.pattern, &rule.replacement, 1)
        }
    })
}

/// Drop a trailing space-separated all-digit token.
///
/// A name made of a single numeric token is left alone.
pub fn strip_trailing_counter(name: &str) -> String {
    let parts: Vec<&str> = name.split(' ').collect();
    match parts.split_last() {
        Some((last, rest)) if !rest.is_empty() && TRAILING_COUNTER.is_match(last) => rest.join(" "),
        _ => name.to_string(),
    }
}

/// Outcome of normalizing one name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedName {
    pub name: String,
    pub rewritten: bool,
    pub trimmed: bool,
}

/// Normalize a single name: rewrite rules first, then counter removal
pub fn normalize_name(name: &str, rules: &[NameRewriteRule], mode: RewriteMode) -> NormalizedName {
    let rewritten = apply_rewrite_rules(name, rules);
    let rewrite_changed = rewritten != name;

    let base = match mode {
        RewriteMode::Apply => rewritten,
        RewriteMode::Observe => {
            if rewrite_changed {
                debug!("Rewrite rules would rename {:?} to {:?}", name, rewritten);
            }
            name.to_string()
        }
    };

    let stripped = strip_trailing_counter(&base);
    let trimmed = stripped != base;

    NormalizedName {
        name: stripped,
        rewritten: rewrite_changed && mode == RewriteMode::Apply,
        trimmed,
    }
}

/// Counts from normalizing a whole column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NameStats {
    pub rewritten: usize,
    pub trimmed: usize,
}

/// Normalize the name cell of every row in place
pub fn normalize_names(
    table: &mut Table,
    name_column: usize,
    rules: &[NameRewriteRule],
    mode: RewriteMode,
) -> Result<NameStats> {
    if name_column >= table.column_count() {
        return Err(QuantError::Configuration {
            message: format!(
                "Name column {} out of range for {} columns",
                name_column,
                table.column_count()
            ),
        });
    }

    let mut stats = NameStats::default();

    for row in 0..table.row_count() {
        let value = table.cell(row, name_column);
        if value.is_blank() {
            continue;
        }

        let original = value.to_string();
        let normalized = normalize_name(&original, rules, mode);

        if normalized.rewritten {
            stats.rewritten += 1;
        }
        if normalized.trimmed {
            stats.trimmed += 1;
        }
        if normalized.name != original {
            table.set_cell(row, name_column, Value::Text(normalized.name));
        }
    }

    info!(
        "Name normalization: {} counters stripped, {} names rewritten",
        stats.trimmed, stats.rewritten
    );

    Ok(stats)
}
