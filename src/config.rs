//! Pipeline configuration.
//!
//! Every run uses [`PipelineConfig::default()`], which is assembled from the
//! compiled-in constants. The struct exists so stages receive their settings
//! explicitly and tests can vary one setting at a time.

use crate::constants::{
    ANGLE_HEADER, ANGLE_KEYWORD, DEGREE_INDICATOR, EXCLUSION_PREFIX, HEADER_NOISE_PATTERN,
    LENGTH_KEYWORD, MM_SUFFIX, NAME_KEYWORD, NAME_REWRITE_RULES, PIVOT_VIEW, QUANTIFICATIONS_VIEW,
    UNISTRUT_HEADER, UNISTRUT_KEYWORD, UNITS_HEADER,
};
use crate::header::Role;
use serde::{Deserialize, Serialize};

/// Ordered substring substitution applied to element names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRewriteRule {
    pub pattern: String,
    pub replacement: String,
}

impl NameRewriteRule {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }
}

/// Whether rewrite rules change the stored name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RewriteMode {
    /// Compute and log the rewritten name but keep the original
    #[default]
    Observe,
    /// Store the rewritten name, each rule operating on the previous result
    Apply,
}

/// Keyword used to resolve each canonical role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleKeywords {
    pub name: String,
    pub unistrut: String,
    pub angle: String,
}

impl RoleKeywords {
    pub fn keyword(&self, role: Role) -> &str {
        match role {
            Role::Name => &self.name,
            Role::Unistrut => &self.unistrut,
            Role::Angle => &self.angle,
        }
    }
}

impl Default for RoleKeywords {
    fn default() -> Self {
        Self {
            name: NAME_KEYWORD.to_string(),
            unistrut: UNISTRUT_KEYWORD.to_string(),
            angle: ANGLE_KEYWORD.to_string(),
        }
    }
}

/// Settings for a single pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Keywords resolving the Name, Unistrut and Angle roles
    pub role_keywords: RoleKeywords,

    /// Keyword marking length-like columns to merge into the unistrut column
    pub length_keyword: String,

    /// Regex of prefix noise removed from every header before resolution
    pub header_noise_pattern: String,

    /// Unit suffix stripped from length values
    pub unit_suffix: String,

    /// Glyph that marks a non-numeric angle value worth keeping
    pub degree_indicator: char,

    /// Ordered name substitutions
    pub rewrite_rules: Vec<NameRewriteRule>,

    /// Whether rewrite rules are stored or only observed
    pub rewrite_mode: RewriteMode,

    /// Case-insensitive name prefix of rows to exclude
    pub exclusion_prefix: String,

    /// Create the unistrut column when it is missing but length columns exist
    pub provision_unistrut: bool,

    /// Header of a provisioned unistrut column
    pub unistrut_header: String,

    /// Header the canonical angle column is renamed to
    pub angle_header: String,

    /// Header of the derived units column
    pub units_header: String,

    /// Name of the consolidated table view
    pub quantifications_view: String,

    /// Name of the aggregation view
    pub pivot_view: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            role_keywords: RoleKeywords::default(),
            length_keyword: LENGTH_KEYWORD.to_string(),
            header_noise_pattern: HEADER_NOISE_PATTERN.to_string(),
            unit_suffix: MM_SUFFIX.to_string(),
            degree_indicator: DEGREE_INDICATOR,
            rewrite_rules: NAME_REWRITE_RULES
                .iter()
                .map(|(pattern, replacement)| NameRewriteRule::new(*pattern, *replacement))
                .collect(),
            rewrite_mode: RewriteMode::default(),
            exclusion_prefix: EXCLUSION_PREFIX.to_string(),
            provision_unistrut: true,
            unistrut_header: UNISTRUT_HEADER.to_string(),
            angle_header: ANGLE_HEADER.to_string(),
            units_header: UNITS_HEADER.to_string(),
            quantifications_view: QUANTIFICATIONS_VIEW.to_string(),
            pivot_view: PIVOT_VIEW.to_string(),
        }
    }
}
