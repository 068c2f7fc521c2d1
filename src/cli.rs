//! Command-line interface components.

use crate::models::RunSummary;
use crate::processor::Pipeline;
use crate::workbook::FileWorkbook;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "quantifications")]
#[command(about = "Consolidate a BIM coordination export into a quantities table and pivot")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Exported element table (.csv, .xlsx, .xls or .xlsm)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Directory for the output views (defaults to <INPUT stem>_quantifications)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

/// Install the tracing subscriber; logs go to stderr so stdout carries the report
pub fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();
    let filter = EnvFilter::new(format!("quantifications={}", log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Run the pipeline against the input file and print a summary
pub fn execute(args: Args) -> Result<RunSummary> {
    setup_logging(&args)?;
    debug!("Command line arguments: {:?}", args);

    let start_time = Instant::now();
    let mut workbook = FileWorkbook::new(args.input.clone(), args.output_dir.clone())
        .with_context(|| format!("Cannot open {}", args.input.display()))?;

    println!("{}", "Building quantifications".bright_green().bold());
    println!(
        "  {} {}",
        "Input:".bright_cyan(),
        workbook.input_path().display()
    );
    println!(
        "  {} {}",
        "Output:".bright_cyan(),
        workbook.output_dir().display()
    );

    let summary = Pipeline::new()
        .run(&mut workbook)
        .with_context(|| format!("Failed to process {}", args.input.display()))?;

    print_summary(&summary, start_time.elapsed().as_millis());
    Ok(summary)
}

fn print_summary(summary: &RunSummary, elapsed_ms: u128) {
    println!("\n{}", "Run Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        elapsed_ms.to_string().bright_white()
    );
    println!(
        "  {} {} in, {} out",
        "Rows:".bright_cyan(),
        summary.rows_in.to_string().bright_white(),
        summary.rows_out.to_string().bright_white().bold()
    );
    if summary.rows_excluded > 0 {
        println!(
            "  {} {}",
            "Excluded:".bright_yellow(),
            summary.rows_excluded.to_string().bright_yellow()
        );
    }
    if !summary.columns_merged.is_empty() {
        println!(
            "  {} {}",
            "Merged columns:".bright_cyan(),
            summary.columns_merged.join(", ")
        );
    }
    if summary.unistrut_provisioned {
        println!(
            "  {} unistrut column added",
            "Note:".bright_yellow()
        );
    }
    println!(
        "  {} {} filled, {} counted as 1",
        "Unistrut:".bright_cyan(),
        summary.unistrut_filled.to_string().bright_white(),
        summary.unistrut_defaulted.to_string().bright_white()
    );
    println!(
        "  {} {} mm, {} No.",
        "Units:".bright_cyan(),
        summary.units_mm.to_string().bright_white().bold(),
        summary.units_count.to_string().bright_white().bold()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::parse_from(["quantifications", "export.csv", "-o", "out", "-v"]);

        assert_eq!(args.input, PathBuf::from("export.csv"));
        assert_eq!(args.output_dir, Some(PathBuf::from("out")));
        assert_eq!(args.get_log_level(), "debug");
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Args::try_parse_from(["quantifications", "export.csv", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_default_log_level() {
        let args = Args::parse_from(["quantifications", "export.csv"]);
        assert_eq!(args.get_log_level(), "info");
    }
}
