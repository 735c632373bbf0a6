//! Helper functions for CLI operations.

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use crate::{
    config::Config,
    output::{OutputFormat, OutputOptions},
    rules::FileReport
};

/// Calculates the process exit code of a lint run.
///
/// - `0` - No file has violations
/// - `1` - At least one violation found
///
/// Errors exit with `2` from `main` and never reach this function.
///
/// # Example
///
/// ```
/// use queryguard::{app::calculate_exit_code, rules::FileReport};
///
/// let mut report = FileReport::new("clean.sql");
/// report.record(Vec::new());
/// assert_eq!(calculate_exit_code(&[report]), 0);
/// ```
pub fn calculate_exit_code(reports: &[FileReport]) -> i32 {
    if reports.iter().any(FileReport::has_violations) {
        1
    } else {
        0
    }
}

/// Create output options from the resolved format
pub fn create_output_options(format: OutputFormat, no_color: bool) -> OutputOptions {
    OutputOptions {
        format,
        colored: !no_color
    }
}

/// Progress bar over `len` files, hidden unless `visible`
pub fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb.set_message("Linting files...");
    pb
}

/// Logs where every setting came from
pub fn log_provenance(config: &Config) {
    if let Some(path) = &config.settings_file {
        debug!(path = %path.display(), "settings file");
    }
    for (setting, source) in &config.provenance {
        debug!(setting, source, "resolved setting");
    }
    debug!(
        select = ?config.rules.select,
        ignore = ?config.rules.ignore,
        output = %config.output,
        "configuration"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{RuleCategory, RuleInfo, Violation};

    fn failed_report() -> FileReport {
        let script = crate::script::tokenize("DROP LOGIN alice");
        let info = RuleInfo {
            id:       "S002",
            name:     "NoDropLogin",
            category: RuleCategory::Logins
        };
        let statement = script.statement(0).unwrap();
        let mut report = FileReport::new("bad.sql");
        report.record(vec![Violation::new(&info, statement)]);
        report
    }

    #[test]
    fn test_calculate_exit_code_no_files() {
        assert_eq!(calculate_exit_code(&[]), 0);
    }

    #[test]
    fn test_calculate_exit_code_violation() {
        let mut clean = FileReport::new("clean.sql");
        clean.record(Vec::new());
        assert_eq!(calculate_exit_code(&[clean, failed_report()]), 1);
    }

    #[test]
    fn test_create_output_options_no_color() {
        let opts = create_output_options(OutputFormat::Json, true);
        assert_eq!(opts.format, OutputFormat::Json);
        assert!(!opts.colored);
    }

    #[test]
    fn test_progress_bar_hidden() {
        assert!(progress_bar(3, false).is_hidden());
    }
}
