//! Quantifications pipeline.
//!
//! Turns a raw coordination export into a consolidated quantities table and a
//! pivot over it. Stages run in a fixed order, each in its own module:
//! header cleaning and resolution, name normalization, column consolidation,
//! units derivation, exclusion filtering and the aggregation view.

pub mod consolidate;
pub mod filter;
pub mod names;
pub mod pivot;
pub mod units;

#[cfg(test)]
pub mod tests;

use self::pivot::{PivotView, build_pivot};

use crate::config::PipelineConfig;
use crate::constants::UNITS_MM;
use crate::error::Result;
use crate::header::{HeaderCleaner, HeaderScan, Role};
use crate::models::{RunSummary, Table};
use crate::workbook::Workbook;

use std::time::Instant;
use tracing::{debug, info};

/// Everything a run hands back to the host for committing
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// The consolidated table, committed as the quantifications view
    pub quantifications: Table,
    /// Definition of the aggregation view
    pub pivot: PivotView,
    /// The aggregation view laid out as a grid
    pub pivot_grid: Table,
    pub summary: RunSummary,
}

/// Runs the normalization stages over one table
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the pipeline
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Transform a raw table. The input is consumed; on error nothing of it
    /// escapes, so a host that only commits on success is never half-written.
    pub fn process(&self, mut table: Table) -> Result<PipelineOutput> {
        let start_time = Instant::now();
        let config = &self.config;

        let mut summary = RunSummary {
            rows_in: table.row_count(),
            ..Default::default()
        };

        // Step 1: clean and resolve headers
        summary.headers_cleaned =
            HeaderCleaner::new(&config.header_noise_pattern)?.clean_table(&mut table);

        let scan = HeaderScan::scan(table.headers(), &config.role_keywords);
        if config.provision_unistrut && scan.missing() == [Role::Unistrut] {
            summary.unistrut_provisioned =
                consolidate::provision_unistrut(&mut table, config).is_some();
        }
        let resolved = HeaderScan::scan(table.headers(), &config.role_keywords)
            .require(table.headers())?;
        debug!("Resolved columns: {:?}", resolved);

        // Step 2: names
        let name_stats = names::normalize_names(
            &mut table,
            resolved.name,
            &config.rewrite_rules,
            config.rewrite_mode,
        )?;
        summary.names_trimmed = name_stats.trimmed;
        summary.names_rewritten = name_stats.rewritten;

        // Step 3: fold length and angle columns into the canonical ones
        let (resolved, consolidation) = consolidate::consolidate(&mut table, resolved, config)?;
        summary.columns_merged = consolidation.merged_columns;
        summary.unistrut_filled = consolidation.unistrut_filled;
        summary.unistrut_defaulted = consolidation.unistrut_defaulted;
        summary.angle_filled = consolidation.angle_filled;

        // Step 4: units
        let (resolved, units_stats) = units::derive_units(&mut table, resolved, config)?;

        // Step 5: drop excluded rows
        summary.rows_excluded =
            filter::remove_excluded_rows(&mut table, resolved.name, &config.exclusion_prefix);
        summary.rows_out = table.row_count();

        summary.units_mm = table
            .column_values(units_stats.column)
            .filter(|value| value.to_string() == UNITS_MM)
            .count();
        summary.units_count = summary.rows_out - summary.units_mm;

        // Step 6: aggregation view
        let pivot = build_pivot(config);
        let pivot_grid = pivot.render(&table)?;

        info!(
            "Pipeline finished in {}ms: {}",
            start_time.elapsed().as_millis(),
            summary.summary()
        );

        Ok(PipelineOutput {
            quantifications: table,
            pivot,
            pivot_grid,
            summary,
        })
    }

    /// Load from the host, transform, and commit only if every stage succeeded
    pub fn run<W: Workbook + ?Sized>(&self, workbook: &mut W) -> Result<RunSummary> {
        let table = workbook.load()?;
        let output = self.process(table)?;
        workbook.commit(&output)?;
        Ok(output.summary)
    }
}

/// Run the pipeline with the compiled-in configuration
pub fn run<W: Workbook + ?Sized>(workbook: &mut W) -> Result<()> {
    Pipeline::new().run(workbook).map(|_| ())
}
