//! Scenario tests for the processor module
//!
//! Runs whole exports through the pipeline against an in-memory workbook.
