//! Error handling for quantification runs.
//!
//! Structural problems (a required column cannot be found, the source cannot be
//! read, the result cannot be committed) abort the run. Value-level anomalies
//! never reach this type; the stages absorb them locally.

use crate::header::Role;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuantError {
    #[error("Required columns not found: {} (headers: {})", format_roles(.roles), .headers.join(", "))]
    ColumnNotFound { roles: Vec<Role>, headers: Vec<String> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Input not found at path: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Could not read workbook {path}: {reason}")]
    Workbook { path: PathBuf, reason: String },

    #[error("Source has no header row: {source_name}")]
    EmptyTable { source_name: String },

    #[error("Unsupported input format: {path} (expected .csv, .xlsx or .xls)")]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to commit view to {path}: {reason}")]
    Commit { path: PathBuf, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl QuantError {
    /// Roles that were missing, if this is a column resolution failure
    pub fn missing_roles(&self) -> Option<&[Role]> {
        match self {
            QuantError::ColumnNotFound { roles, .. } => Some(roles),
            _ => None,
        }
    }
}

fn format_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(|role| role.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, QuantError>;
