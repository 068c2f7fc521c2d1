//! Application constants for the quantifications pipeline
//!
//! Everything the pipeline needs to know about a coordination export is
//! compiled in here: role keywords, canonical headers, rewrite rules and the
//! exclusion pattern. Runs never read configuration from the environment.

// =============================================================================
// Role Keywords
// =============================================================================

/// Keyword identifying the element name column
pub const NAME_KEYWORD: &str = "name";

/// Keyword identifying the canonical unistrut length column
pub const UNISTRUT_KEYWORD: &str = "unistrut";

/// Keyword identifying angle columns (first match is canonical)
pub const ANGLE_KEYWORD: &str = "angle";

/// Keyword identifying length-like columns merged into the unistrut column
pub const LENGTH_KEYWORD: &str = "length";

// =============================================================================
// Canonical Headers
// =============================================================================

/// Header given to a provisioned unistrut column
pub const UNISTRUT_HEADER: &str = "Unistrut Length";

/// Header the canonical angle column is renamed to
pub const ANGLE_HEADER: &str = "Angle";

/// Header of the derived units column
pub const UNITS_HEADER: &str = "Units (mm/No.)";

// =============================================================================
// Value Markers
// =============================================================================

/// Unit suffix stripped from length cells before numeric comparison
pub const MM_SUFFIX: &str = " mm";

/// Glyph marking an angle value that is not purely numeric
pub const DEGREE_INDICATOR: char = '°';

/// Values above this threshold are measurements rather than counts
pub const MEASUREMENT_THRESHOLD: f64 = 1.0;

/// Value written to unistrut cells that stay blank (a count of one)
pub const DEFAULT_COUNT: f64 = 1.0;

/// Units classification for length measurements
pub const UNITS_MM: &str = "mm";

/// Units classification for counted items
pub const UNITS_COUNT: &str = "No.";

// =============================================================================
// Name Cleanup
// =============================================================================

/// Part number substitutions, applied in order.
///
/// These are specific to some parts (M12 -> M10) and need checking whenever
/// the supplier catalogue changes.
pub const NAME_REWRITE_RULES: &[(&str, &str)] = &[
    ("P1428-H-", "M1116"),
    ("M12", "M10"),
    ("P1062", "P1020"),
];

/// Trailing standalone counter appended by the modeller ("Casework 2")
pub const TRAILING_COUNTER_PATTERN: &str = r"^[0-9]+$";

/// Rows whose name starts with this prefix (case-insensitive) are excluded
pub const EXCLUSION_PREFIX: &str = "clearancezone";

// =============================================================================
// Header Cleanup
// =============================================================================

/// Vendor and property-tab prefixes the export prepends to headers
pub const HEADER_NOISE_PATTERN: &str = r"(?i)Element|Item|Custom|KGE_";

// =============================================================================
// Output Views
// =============================================================================

/// View holding the consolidated table
pub const QUANTIFICATIONS_VIEW: &str = "Quantifications";

/// View holding the aggregation
pub const PIVOT_VIEW: &str = "Pivot Table";

/// Corner label of a rendered pivot grid
pub const PIVOT_COLUMN_LABELS: &str = "Column Labels";

/// Column appended to a rendered pivot when row grand totals are shown
pub const PIVOT_GRAND_TOTAL: &str = "Grand Total";

/// Label used for blank units in a rendered pivot
pub const PIVOT_BLANK_LABEL: &str = "(blank)";

// =============================================================================
// Input Formats
// =============================================================================

/// Extensions accepted by the file-backed workbook
pub const CSV_EXTENSION: &str = "csv";
pub const EXCEL_EXTENSIONS: &[&str] = &["xlsx", "xls", "xlsm"];
