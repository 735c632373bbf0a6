// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use queryguard::{
    output::{OutputFormat, OutputOptions, format_reports, format_rule_list},
    rules::{FileReport, RuleRunner}
};

fn sample_reports() -> Vec<FileReport> {
    let runner = RuleRunner::new();
    vec![
        runner.evaluate_source("clean.sql".as_ref(), "SELECT 1;"),
        runner.evaluate_source(
            "deploy.sql".as_ref(),
            "CREATE LOGIN alice WITH PASSWORD = 'p'\nGO\nDROP USER bob\nGO\n"
        ),
    ]
}

fn plain(format: OutputFormat) -> OutputOptions {
    OutputOptions {
        format,
        colored: false
    }
}

#[test]
fn test_output_format_default() {
    assert_eq!(OutputFormat::default(), OutputFormat::Text);
}

#[test]
fn test_output_options_default() {
    let opts = OutputOptions::default();
    assert_eq!(opts.format, OutputFormat::Text);
    assert!(opts.colored);
}

#[test]
fn test_output_format_from_str() {
    assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
    assert_eq!(" YAML ".parse::<OutputFormat>(), Ok(OutputFormat::Yaml));
    assert!("sarif".parse::<OutputFormat>().is_err());
    assert_eq!(OutputFormat::Text.to_string(), "text");
}

#[test]
fn test_text_table() {
    let output = format_reports(&sample_reports(), &plain(OutputFormat::Text)).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert!(lines[0].starts_with("File"));
    assert!(lines[0].contains("Status"));
    assert!(lines[0].contains("Violations"));
    assert!(lines[0].contains("Statements"));
    assert!(lines[1].starts_with("clean.sql"));
    assert!(lines[1].contains("Passed ✅"));
    assert!(lines[2].starts_with("deploy.sql"));
    assert!(lines[2].contains("Failed ❌"));
    assert!(lines[2].contains("NoCreateLogin (S001)"));
    assert!(lines[2].ends_with("CREATE LOGIN alice WITH PASSWORD = 'p'"));
    assert!(lines[3].trim_start().starts_with("NoDropUser (S015)"));
    assert!(lines[3].ends_with("DROP USER bob"));
    assert!(output.contains("2 file(s) checked, 1 failed, 2 violation(s)"));
}

#[test]
fn test_text_without_color_has_no_escape_codes() {
    let output = format_reports(&sample_reports(), &plain(OutputFormat::Text)).unwrap();
    assert!(!output.contains('\u{1b}'));
}

#[test]
fn test_json_output() {
    let output = format_reports(&sample_reports(), &plain(OutputFormat::Json)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    let files = json.as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["status"], "Passed");
    assert_eq!(files[1]["path"], "deploy.sql");
    let violations = files[1]["violations"].as_array().unwrap();
    assert_eq!(violations[0]["id"], "S001");
    assert_eq!(violations[1]["name"], "NoDropUser");
    assert_eq!(violations[1]["statement"], "DROP USER bob");
}

#[test]
fn test_yaml_output() {
    let output = format_reports(&sample_reports(), &plain(OutputFormat::Yaml)).unwrap();
    assert!(output.contains("path: deploy.sql"));
    assert!(output.contains("status: Failed"));
    assert!(output.contains("id: S015"));
}

#[test]
fn test_empty_reports() {
    let output = format_reports(&[], &plain(OutputFormat::Text)).unwrap();
    assert!(output.contains("0 file(s) checked"));
    let json = format_reports(&[], &plain(OutputFormat::Json)).unwrap();
    assert_eq!(json, "[]");
}

#[test]
fn test_rule_list_text() {
    let rules = RuleRunner::new().rules();
    let output = format_rule_list(&rules, &plain(OutputFormat::Text)).unwrap();
    assert_eq!(output.lines().count(), 24);
    assert!(output.lines().next().unwrap().starts_with("S001  NoCreateLogin"));
    assert!(output.contains("NoGrantExceptObject"));
}

#[test]
fn test_rule_list_json() {
    let rules = RuleRunner::new().rules();
    let output = format_rule_list(&rules, &plain(OutputFormat::Json)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json[12]["id"], "S013");
    assert_eq!(json[12]["name"], "NoDynamicSQL");
    assert_eq!(json[12]["category"], "Execution");
}
