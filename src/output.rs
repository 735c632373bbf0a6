use std::{fmt, str::FromStr};

use colored::Colorize;

use crate::{
    error::{AppResult, render_error},
    rules::{FileReport, FileStatus, RuleInfo}
};

/// Output format for results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "yaml" => Ok(Self::Yaml),
            other => Err(format!("unknown output format '{}'", other))
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml")
        }
    }
}

/// Output options
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format:  OutputFormat,
    pub colored: bool
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format:  OutputFormat::Text,
            colored: true
        }
    }
}

/// Format evaluation results of all files
pub fn format_reports(reports: &[FileReport], opts: &OutputOptions) -> AppResult<String> {
    match opts.format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(reports).map_err(|e| render_error("JSON", e))
        }
        OutputFormat::Yaml => serde_yaml::to_string(reports).map_err(|e| render_error("YAML", e)),
        OutputFormat::Text => Ok(format_text_reports(reports, opts))
    }
}

/// Format the list of available rules
pub fn format_rule_list(rules: &[RuleInfo], opts: &OutputOptions) -> AppResult<String> {
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(rules).map_err(|e| render_error("JSON", e)),
        OutputFormat::Yaml => serde_yaml::to_string(rules).map_err(|e| render_error("YAML", e)),
        OutputFormat::Text => {
            let name_width = rules.iter().map(|r| r.name.len()).max().unwrap_or(0);
            let mut output = String::new();
            for rule in rules {
                let id = if opts.colored {
                    rule.id.cyan().bold().to_string()
                } else {
                    rule.id.to_string()
                };
                output.push_str(&format!(
                    "{}  {:<width$}  {}\n",
                    id,
                    rule.name,
                    rule.category,
                    width = name_width
                ));
            }
            Ok(output)
        }
    }
}

/// One line of the text table
struct Row {
    file:      String,
    status:    Option<FileStatus>,
    violation: String,
    statement: String
}

fn format_text_reports(reports: &[FileReport], opts: &OutputOptions) -> String {
    let mut rows = Vec::new();
    for report in reports {
        let file = report.path.display().to_string();
        if report.violations.is_empty() {
            rows.push(Row {
                file,
                status: Some(report.status),
                violation: String::new(),
                statement: String::new()
            });
            continue;
        }
        for (i, violation) in report.violations.iter().enumerate() {
            rows.push(Row {
                file:      if i == 0 { file.clone() } else { String::new() },
                status:    (i == 0).then_some(report.status),
                violation: violation.to_string(),
                statement: single_line(violation.trimmed_statement())
            });
        }
    }

    let headers = ["File", "Status", "Violations", "Statements"];
    let file_width = column_width(headers[0], rows.iter().map(|r| r.file.as_str()));
    let status_width = column_width(headers[1], rows.iter().map(|r| status_label(r.status)));
    let violation_width = column_width(headers[2], rows.iter().map(|r| r.violation.as_str()));

    let mut output = String::new();
    let header = format!(
        "{:<fw$}  {:<sw$}  {:<vw$}  {}",
        headers[0],
        headers[1],
        headers[2],
        headers[3],
        fw = file_width,
        sw = status_width,
        vw = violation_width
    );
    if opts.colored {
        output.push_str(&header.bold().to_string());
    } else {
        output.push_str(&header);
    }
    output.push('\n');

    for row in &rows {
        let label = format!("{:<width$}", status_label(row.status), width = status_width);
        let status = match row.status {
            Some(FileStatus::Passed) if opts.colored => label.green().to_string(),
            Some(FileStatus::Failed) if opts.colored => label.red().to_string(),
            _ => label
        };
        let line = format!(
            "{:<fw$}  {}  {:<vw$}  {}",
            row.file,
            status,
            row.violation,
            row.statement,
            fw = file_width,
            vw = violation_width
        );
        output.push_str(line.trim_end());
        output.push('\n');
    }

    let failed = reports
        .iter()
        .filter(|r| r.status == FileStatus::Failed)
        .count();
    let violations: usize = reports.iter().map(|r| r.violations.len()).sum();
    let summary = format!(
        "\n{} file(s) checked, {} failed, {} violation(s)",
        reports.len(),
        failed,
        violations
    );
    if opts.colored && violations > 0 {
        output.push_str(&summary.red().bold().to_string());
    } else if opts.colored {
        output.push_str(&summary.green().bold().to_string());
    } else {
        output.push_str(&summary);
    }
    output
}

fn status_label(status: Option<FileStatus>) -> &'static str {
    match status {
        Some(FileStatus::Passed) => "Passed ✅",
        Some(FileStatus::Failed) => "Failed ❌",
        Some(FileStatus::NotRun) => "Not Run",
        None => ""
    }
}

/// Width in characters of the widest cell, header included
fn column_width<'a>(header: &str, cells: impl Iterator<Item = &'a str>) -> usize {
    cells
        .map(|cell| cell.chars().count())
        .chain(std::iter::once(header.chars().count()))
        .max()
        .unwrap_or(0)
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
