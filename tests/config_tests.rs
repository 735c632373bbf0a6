use std::io::Write;

use queryguard::{
    config::{
        CliOverrides, Config, Defaults, EnvSource, FileSource, RawValue, RulesConfig, Setting,
        SettingSource
    },
    output::OutputFormat
};
use tempfile::NamedTempFile;

fn resolve(sources: Vec<Box<dyn SettingSource>>) -> Config {
    Config::resolve(&sources).unwrap()
}

fn env(vars: &[(&str, &str)]) -> EnvSource {
    EnvSource::from_vars(vars.iter().map(|(k, v)| (k.to_string(), v.to_string())))
}

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.rules.select, vec!["S"]);
    assert!(config.rules.ignore.is_empty());
    assert!(!config.debug);
    assert_eq!(config.output, OutputFormat::Text);
}

#[test]
fn test_defaults_only() {
    let config = resolve(vec![Box::new(Defaults)]);
    assert_eq!(config.rules, RulesConfig::default());
    assert_eq!(config.provenance.get("select"), Some(&"default"));
    assert_eq!(config.provenance.get("ignore"), None);
}

#[test]
fn test_rules_config_is_enabled() {
    let config = RulesConfig {
        select: vec!["S00".to_string(), "S02".to_string()],
        ignore: vec!["S002".to_string()]
    };
    assert!(config.is_enabled("S001"));
    assert!(!config.is_enabled("S002"));
    assert!(config.is_enabled("S024"));
    assert!(!config.is_enabled("S013"));
}

#[test]
fn test_cli_has_priority() {
    let cli = CliOverrides {
        select: Some("s01".to_string()),
        output: Some("json".to_string()),
        ..Default::default()
    };
    let config = resolve(vec![
        Box::new(cli),
        Box::new(env(&[("QUERYGUARD_SELECT", "S02"), ("QUERYGUARD_OUTPUT", "yaml")])),
        Box::new(Defaults),
    ]);
    assert_eq!(config.rules.select, vec!["S01"]);
    assert_eq!(config.output, OutputFormat::Json);
    assert_eq!(config.provenance.get("select"), Some(&"cli"));
}

#[test]
fn test_env_source_and_alias() {
    let source = env(&[
        ("QUERYGUARD_DISABLED", "S013, S024"),
        ("QUERYGUARD_DEBUG", "yes"),
        ("PATH", "/usr/bin")
    ]);
    assert_eq!(
        source.get(Setting::Ignore),
        Some(RawValue::Text("S013, S024".to_string()))
    );
    let config = resolve(vec![Box::new(source), Box::new(Defaults)]);
    assert_eq!(config.rules.ignore, vec!["S013", "S024"]);
    assert!(config.debug);
    assert_eq!(config.provenance.get("debug"), Some(&"env"));
}

#[test]
fn test_key_wins_over_alias() {
    let source = env(&[("QUERYGUARD_SELECT", "S01"), ("QUERYGUARD_ENABLED", "S02")]);
    assert_eq!(source.get(Setting::Select), Some(RawValue::Text("S01".to_string())));
}

#[test]
fn test_empty_value_falls_through() {
    let cli = CliOverrides {
        select: Some(" , ".to_string()),
        ..Default::default()
    };
    let config = resolve(vec![
        Box::new(cli),
        Box::new(env(&[("QUERYGUARD_SELECT", "")])),
        Box::new(Defaults),
    ]);
    assert_eq!(config.rules.select, vec!["S"]);
}

#[test]
fn test_debug_flag_absent_on_cli_defers() {
    let config = resolve(vec![
        Box::new(CliOverrides::default()),
        Box::new(env(&[("QUERYGUARD_DEBUG", "1")])),
        Box::new(Defaults),
    ]);
    assert!(config.debug);
}

#[test]
fn test_file_source_top_level() {
    let file = FileSource::parse(
        r#"
select = ["s0", "S1"]
ignore = "S013"
debug = true
output = "YAML"
"#
    )
    .unwrap();
    let config = resolve(vec![Box::new(file), Box::new(Defaults)]);
    assert_eq!(config.rules.select, vec!["S0", "S1"]);
    assert_eq!(config.rules.ignore, vec!["S013"]);
    assert!(config.debug);
    assert_eq!(config.output, OutputFormat::Yaml);
}

#[test]
fn test_file_source_tool_section_and_aliases() {
    let file = FileSource::parse(
        r#"
[project]
name = "warehouse"

[tool.queryguard]
enabled = "S00, S01"
disabled = ["S013"]
debug = "no"
"#
    )
    .unwrap();
    let config = resolve(vec![Box::new(file), Box::new(Defaults)]);
    assert_eq!(config.rules.select, vec!["S00", "S01"]);
    assert_eq!(config.rules.ignore, vec!["S013"]);
    assert!(!config.debug);
    assert_eq!(config.provenance.get("debug"), Some(&"file"));
}

#[test]
fn test_file_source_invalid_toml() {
    assert!(FileSource::parse("select = [").is_err());
}

#[test]
fn test_invalid_output_format() {
    let cli = CliOverrides {
        output: Some("sarif".to_string()),
        ..Default::default()
    };
    assert!(Config::resolve(&[Box::new(cli) as Box<dyn SettingSource>, Box::new(Defaults)]).is_err());
}

#[test]
fn test_load_explicit_settings_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[tool.queryguard]\nselect = [\"S02\"]\noutput = \"json\"").unwrap();
    let config = Config::load(CliOverrides {
        settings: Some(file.path().to_path_buf()),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(config.settings_file.as_deref(), Some(file.path()));
    assert_eq!(config.output, OutputFormat::Json);
}

#[test]
fn test_load_missing_settings_file() {
    let result = Config::load(CliOverrides {
        settings: Some("/nonexistent/queryguard.toml".into()),
        ..Default::default()
    });
    assert!(result.is_err());
}
