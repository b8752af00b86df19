//! Output formatters for duplicate scan results.
//!
//! This module provides different output formats for scan results:
//! - Plain text for terminals
//! - JSON for automation and scripting
//! - CSV for spreadsheet import
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::duplicates::DuplicateFinder;
//! use dupsweep::error::ExitCode;
//! use dupsweep::output::json::JsonOutput;
//! use dupsweep::scanner::HashAlgorithm;
//! use std::path::PathBuf;
//!
//! let result = DuplicateFinder::with_defaults().scan(&[PathBuf::from(".")]).unwrap();
//!
//! let output = JsonOutput::new(&result.groups, &result.stats, HashAlgorithm::Md5, ExitCode::Success);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod csv;
pub mod json;
pub mod text;

// Re-export main types
pub use csv::CsvOutput;
pub use json::JsonOutput;
