//! Application types for the lint command.

use std::path::PathBuf;

use crate::rules::FileReport;

/// Parameters for the lint command.
///
/// Settings that can also come from the environment or a settings file live
/// in [`Config`](crate::config::Config); these are the command line only
/// ones.
///
/// # Example
///
/// ```
/// use queryguard::app::LintParams;
///
/// let params = LintParams {
///     path:     "migrations".into(),
///     no_color: true
/// };
/// assert!(params.path.ends_with("migrations"));
/// ```
#[derive(Debug, Clone)]
pub struct LintParams {
    /// SQL file or directory to lint.
    pub path:     PathBuf,
    /// Disable colored terminal output.
    pub no_color: bool
}

/// Result of a lint run.
#[derive(Debug, Clone)]
pub struct LintResult {
    /// Exit code (0 = no violations, 1 = violations found).
    pub exit_code: i32,
    /// Rendered reports.
    pub output:    String,
    /// Per file reports, sorted by path.
    pub reports:   Vec<FileReport>
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lint_params_debug() {
        let params = LintParams {
            path:     PathBuf::from("deploy.sql"),
            no_color: false
        };
        assert!(format!("{:?}", params).contains("LintParams"));
    }

    #[test]
    fn test_lint_result_clone() {
        let result = LintResult {
            exit_code: 1,
            output:    "out".to_string(),
            reports:   vec![FileReport::new("a.sql")]
        };
        let cloned = result.clone();
        assert_eq!(cloned.exit_code, 1);
        assert_eq!(cloned.reports.len(), 1);
    }
}
