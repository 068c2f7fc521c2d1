//! Quantifications Library
//!
//! Normalizes element tables exported from BIM/CAD coordination tools into a
//! quantities table ready for takeoff.
//!
//! This library provides tools for:
//! - Cleaning vendor noise out of headers and resolving the name, unistrut and
//!   angle columns by keyword
//! - Stripping trailing instance counters from element names
//! - Folding every length and angle column into a single canonical column
//! - Classifying each row as a measured length ("mm") or a counted item ("No.")
//! - Dropping clearance-zone helper elements
//! - Building a pivot view over the units classification

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod header;
pub mod models;
pub mod processor;
pub mod workbook;

pub use config::{NameRewriteRule, PipelineConfig, RewriteMode, RoleKeywords};
pub use error::{QuantError, Result};
pub use header::{ResolvedColumns, Role};
pub use models::{RunSummary, Table, Value};
pub use processor::{Pipeline, PipelineOutput, run};
pub use workbook::{FileWorkbook, MemoryWorkbook, Workbook};
