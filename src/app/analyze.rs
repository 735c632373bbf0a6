//! Core lint execution logic.
//!
//! [`run_lint`] orchestrates the complete pipeline: file discovery, rule
//! selection, parallel evaluation of all files and rendering.

use rayon::prelude::*;
use tracing::debug;

use super::{
    helpers::{calculate_exit_code, create_output_options, progress_bar},
    types::{LintParams, LintResult}
};
use crate::{
    config::Config,
    error::AppResult,
    files::{discover, read_source},
    output::{OutputFormat, format_reports, format_rule_list},
    rules::{FileReport, RuleRunner}
};

/// Executes the complete lint pipeline.
///
/// 1. **Discovery**: expands `params.path` into the SQL files to lint
/// 2. **Selection**: builds a [`RuleRunner`] from the configured prefixes
/// 3. **Evaluation**: decodes and evaluates every file on the rayon pool
/// 4. **Rendering**: formats the reports in the configured output format
///
/// # Errors
///
/// Returns an error if the path is invalid, a rule selector matches no rule,
/// or a file cannot be read or decoded.
///
/// # Example
///
/// ```no_run
/// use queryguard::{
///     app::{LintParams, run_lint},
///     config::Config
/// };
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let params = LintParams {
///     path:     "migrations".into(),
///     no_color: false
/// };
/// let result = run_lint(params, &Config::default())?;
/// println!("{}", result.output);
/// std::process::exit(result.exit_code);
/// # }
/// ```
pub fn run_lint(params: LintParams, config: &Config) -> AppResult<LintResult> {
    let files = discover(&params.path)?;
    let runner = RuleRunner::with_config(&config.rules)?;
    let output_opts = create_output_options(config.output, params.no_color);
    debug!(files = files.len(), rules = runner.len(), "starting lint run");

    let pb = progress_bar(files.len(), config.output == OutputFormat::Text);
    let reports: AppResult<Vec<FileReport>> = files
        .par_iter()
        .map(|path| {
            let source = read_source(path)?;
            let report = runner.evaluate_source(path, &source);
            pb.inc(1);
            Ok(report)
        })
        .collect();
    pb.finish_and_clear();
    let reports = reports?;

    let output = format_reports(&reports, &output_opts)?;
    Ok(LintResult {
        exit_code: calculate_exit_code(&reports),
        output,
        reports
    })
}

/// Renders the rules picked by the configured selectors
///
/// # Errors
///
/// Returns an error if a rule selector matches no rule.
pub fn list_rules(config: &Config, no_color: bool) -> AppResult<String> {
    let runner = RuleRunner::with_config(&config.rules)?;
    format_rule_list(&runner.rules(), &create_output_options(config.output, no_color))
}
