// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use clap::Parser;
use queryguard::cli::{Cli, Format};

#[test]
fn test_format_variants() {
    let _text = Format::Text;
    let _json = Format::Json;
    let _yaml = Format::Yaml;
}

#[test]
fn test_parse_path_only() {
    let cli = Cli::try_parse_from(["queryguard", "migrations"]).unwrap();
    assert_eq!(cli.path.as_deref(), Some(std::path::Path::new("migrations")));
    assert!(cli.output.is_none());
    assert!(!cli.debug);
    assert!(!cli.no_color);
    assert!(!cli.list_rules);
}

#[test]
fn test_parse_all_options() {
    let cli = Cli::try_parse_from([
        "queryguard",
        "deploy.sql",
        "--settings",
        "ci.toml",
        "--select",
        "S00,S01",
        "--ignore",
        "S013",
        "-o",
        "json",
        "--debug",
        "--no-color"
    ])
    .unwrap();
    assert_eq!(cli.select.as_deref(), Some("S00,S01"));
    assert_eq!(cli.ignore.as_deref(), Some("S013"));
    assert!(matches!(cli.output, Some(Format::Json)));
    assert!(cli.debug);
    assert!(cli.no_color);
}

#[test]
fn test_path_required() {
    assert!(Cli::try_parse_from(["queryguard"]).is_err());
}

#[test]
fn test_list_rules_without_path() {
    let cli = Cli::try_parse_from(["queryguard", "--list-rules"]).unwrap();
    assert!(cli.list_rules);
    assert!(cli.path.is_none());
}

#[test]
fn test_invalid_format() {
    assert!(Cli::try_parse_from(["queryguard", "x.sql", "--output", "sarif"]).is_err());
}
