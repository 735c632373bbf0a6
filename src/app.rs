//! Application logic for the QueryGuard CLI.
//!
//! This module contains the lint pipeline separated from the main entry
//! point to enable testing.

mod analyze;
mod convert;
mod helpers;
mod types;

pub use analyze::{list_rules, run_lint};
pub use convert::{cli_overrides, convert_format};
pub use helpers::{calculate_exit_code, create_output_options, log_provenance, progress_bar};
pub use types::{LintParams, LintResult};
