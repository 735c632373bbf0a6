//! Configuration loading and management.
//!
//! Every setting is looked up in an ordered list of [`SettingSource`]s and
//! the first source holding a non-empty value wins:
//!
//! 1. Command-line arguments
//! 2. Environment variables (`QUERYGUARD_<NAME>` or `QUERYGUARD_<ALIAS>`)
//! 3. A TOML settings file
//! 4. Default values
//!
//! # Settings File
//!
//! The file passed with `--settings` is used when given. Otherwise the first
//! existing file of this list is read:
//!
//! - `queryguard.toml`, `.queryguard.toml`, `.config/queryguard.toml`,
//!   `.config/.queryguard.toml`, `pyproject.toml` in the current directory
//! - `.config/queryguard.toml`, `.config/.queryguard.toml` in its parent
//! - `queryguard.toml`, `.queryguard.toml`, `.config/queryguard.toml` in the
//!   home directory
//!
//! Keys are read from the `[tool.queryguard]` table when the file has one,
//! otherwise from the top level. `pyproject.toml` is only used when it has
//! the table.
//!
//! ```toml
//! [tool.queryguard]
//! select = ["S"]           # alias: enabled
//! ignore = "S013, S024"    # alias: disabled
//! debug = false
//! output = "json"          # text, json, yaml
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Alias | Description |
//! |----------|-------|-------------|
//! | `QUERYGUARD_SELECT` | `QUERYGUARD_ENABLED` | Rule id prefixes to run |
//! | `QUERYGUARD_IGNORE` | `QUERYGUARD_DISABLED` | Rule id prefixes to skip |
//! | `QUERYGUARD_DEBUG` | | `true`, `t`, `yes`, `y` or `1` enables debug logs |
//! | `QUERYGUARD_OUTPUT` | | Output format |

use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf}
};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::{
    error::{AppResult, config_error},
    output::OutputFormat,
    rules::has_prefix
};

/// Prefix of all environment variables read by [`EnvSource`]
pub const ENV_PREFIX: &str = "QUERYGUARD_";

const LOCAL_FILES: &[&str] = &[
    "queryguard.toml",
    ".queryguard.toml",
    ".config/queryguard.toml",
    ".config/.queryguard.toml",
    "pyproject.toml"
];

const PARENT_FILES: &[&str] = &[".config/queryguard.toml", ".config/.queryguard.toml"];

const HOME_FILES: &[&str] = &[
    "queryguard.toml",
    ".queryguard.toml",
    ".config/queryguard.toml"
];

/// A configurable setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setting {
    Select,
    Ignore,
    Debug,
    Output
}

impl Setting {
    pub fn key(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Ignore => "ignore",
            Self::Debug => "debug",
            Self::Output => "output"
        }
    }

    pub fn alias(self) -> Option<&'static str> {
        match self {
            Self::Select => Some("enabled"),
            Self::Ignore => Some("disabled"),
            Self::Debug | Self::Output => None
        }
    }
}

/// Value of a setting as found in a source, before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Text(String),
    List(Vec<String>),
    Flag(bool)
}

/// Provider of raw setting values
pub trait SettingSource {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn get(&self, setting: Setting) -> Option<RawValue>;
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub select:   Option<String>,
    pub ignore:   Option<String>,
    /// `--debug` was passed; absence defers to the other sources
    pub debug:    bool,
    pub output:   Option<String>,
    pub settings: Option<PathBuf>
}

impl SettingSource for CliOverrides {
    fn name(&self) -> &'static str {
        "cli"
    }

    fn get(&self, setting: Setting) -> Option<RawValue> {
        match setting {
            Setting::Select => self.select.clone().map(RawValue::Text),
            Setting::Ignore => self.ignore.clone().map(RawValue::Text),
            Setting::Debug => self.debug.then_some(RawValue::Flag(true)),
            Setting::Output => self.output.clone().map(RawValue::Text)
        }
    }
}

/// `QUERYGUARD_*` environment variables
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    vars: HashMap<String, String>
}

impl EnvSource {
    /// Snapshot of the process environment
    pub fn from_env() -> Self {
        Self::from_vars(env::vars())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>
    {
        let vars = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| k.starts_with(ENV_PREFIX))
            .collect();
        Self {
            vars
        }
    }

    fn var(&self, key: &str) -> Option<&String> {
        self.vars
            .get(&format!("{}{}", ENV_PREFIX, key.to_ascii_uppercase()))
    }
}

impl SettingSource for EnvSource {
    fn name(&self) -> &'static str {
        "env"
    }

    fn get(&self, setting: Setting) -> Option<RawValue> {
        self.var(setting.key())
            .or_else(|| setting.alias().and_then(|alias| self.var(alias)))
            .cloned()
            .map(RawValue::Text)
    }
}

/// List value written either as an array or a comma separated string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListValue {
    One(String),
    Many(Vec<String>)
}

/// Boolean value written either as a TOML boolean or a string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Flag(bool),
    Text(String)
}

/// Settings as written in a TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileSettings {
    #[serde(default, alias = "enabled")]
    pub select: Option<ListValue>,
    #[serde(default, alias = "disabled")]
    pub ignore: Option<ListValue>,
    #[serde(default)]
    pub debug:  Option<FlagValue>,
    #[serde(default)]
    pub output: Option<String>
}

#[derive(Debug, Default, Deserialize)]
struct SettingsDocument {
    #[serde(default)]
    tool:     Option<ToolSection>,
    #[serde(flatten)]
    settings: FileSettings
}

#[derive(Debug, Default, Deserialize)]
struct ToolSection {
    #[serde(default)]
    queryguard: Option<FileSettings>
}

/// Settings read from a TOML file
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    pub path:     Option<PathBuf>,
    pub settings: FileSettings
}

impl FileSource {
    /// Reads the explicit settings file, or the first candidate file found
    /// relative to the current and home directories
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit file is missing, or a file cannot be
    /// read or parsed.
    pub fn discover(explicit: Option<&Path>) -> AppResult<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(config_error(format!(
                    "Settings file '{}' does not exist",
                    path.display()
                )));
            }
            return Self::load(path);
        }
        let cwd = env::current_dir().ok();
        let home = env::var_os("HOME").map(PathBuf::from);
        for path in candidate_paths(cwd.as_deref(), home.as_deref()) {
            if !path.is_file() {
                continue;
            }
            let (settings, sectioned) = read_settings(&path)?;
            if !sectioned && path.file_name().is_some_and(|name| name == "pyproject.toml") {
                continue;
            }
            return Ok(Self {
                path: Some(path),
                settings
            });
        }
        Ok(Self::default())
    }

    /// Reads settings from `path`
    pub fn load(path: &Path) -> AppResult<Self> {
        let (settings, _) = read_settings(path)?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            settings
        })
    }

    /// Parses settings from TOML text
    pub fn parse(content: &str) -> AppResult<Self> {
        let (settings, _) = parse_settings(content)
            .map_err(|e| config_error(format!("Invalid config file: {}", e)))?;
        Ok(Self {
            path: None,
            settings
        })
    }
}

impl SettingSource for FileSource {
    fn name(&self) -> &'static str {
        "file"
    }

    fn get(&self, setting: Setting) -> Option<RawValue> {
        let list = |value: &ListValue| match value {
            ListValue::One(text) => RawValue::Text(text.clone()),
            ListValue::Many(items) => RawValue::List(items.clone())
        };
        match setting {
            Setting::Select => self.settings.select.as_ref().map(list),
            Setting::Ignore => self.settings.ignore.as_ref().map(list),
            Setting::Debug => self.settings.debug.as_ref().map(|value| match value {
                FlagValue::Flag(flag) => RawValue::Flag(*flag),
                FlagValue::Text(text) => RawValue::Text(text.clone())
            }),
            Setting::Output => self.settings.output.clone().map(RawValue::Text)
        }
    }
}

/// Built-in defaults
#[derive(Debug, Clone, Copy, Default)]
pub struct Defaults;

impl SettingSource for Defaults {
    fn name(&self) -> &'static str {
        "default"
    }

    fn get(&self, setting: Setting) -> Option<RawValue> {
        match setting {
            Setting::Select => Some(RawValue::Text("S".into())),
            Setting::Ignore => None,
            Setting::Debug => Some(RawValue::Flag(false)),
            Setting::Output => Some(RawValue::Text("text".into()))
        }
    }
}

/// Rule selection by id prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulesConfig {
    /// Rule id prefixes to run
    pub select: Vec<String>,
    /// Rule id prefixes to skip, winning over `select`
    pub ignore: Vec<String>
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            select: vec![String::from("S")],
            ignore: Vec::new()
        }
    }
}

impl RulesConfig {
    /// Returns `true` if rule `id` is selected and not ignored
    pub fn is_enabled(&self, id: &str) -> bool {
        self.select.iter().any(|prefix| has_prefix(id, prefix))
            && !self
                .ignore
                .iter()
                .filter(|prefix| !prefix.is_empty())
                .any(|prefix| has_prefix(id, prefix))
    }
}

/// Application configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub rules:         RulesConfig,
    pub debug:         bool,
    pub output:        OutputFormat,
    /// Settings file that was read, if any
    pub settings_file: Option<PathBuf>,
    /// Name of the source each setting was taken from
    pub provenance:    IndexMap<&'static str, &'static str>
}

impl Config {
    /// Load configuration from the command line, environment, settings file
    /// and defaults
    pub fn load(overrides: CliOverrides) -> AppResult<Self> {
        let file = FileSource::discover(overrides.settings.as_deref())?;
        let settings_file = file.path.clone();
        let sources: Vec<Box<dyn SettingSource>> = vec![
            Box::new(overrides),
            Box::new(EnvSource::from_env()),
            Box::new(file),
            Box::new(Defaults),
        ];
        let mut config = Self::resolve(&sources)?;
        config.settings_file = settings_file;
        Ok(config)
    }

    /// Resolve every setting against `sources`, highest priority first
    ///
    /// # Errors
    ///
    /// Returns an error for an unsupported output format.
    pub fn resolve(sources: &[Box<dyn SettingSource>]) -> AppResult<Self> {
        let mut provenance = IndexMap::new();
        let mut lookup = |setting: Setting| {
            sources.iter().find_map(|source| {
                let value = source.get(setting).and_then(|raw| normalize(setting, raw))?;
                provenance.insert(setting.key(), source.name());
                Some(value)
            })
        };
        let select = lookup(Setting::Select).and_then(Normalized::into_list);
        let ignore = lookup(Setting::Ignore).and_then(Normalized::into_list);
        let debug = lookup(Setting::Debug).and_then(Normalized::into_flag);
        let output = lookup(Setting::Output).and_then(Normalized::into_text);
        let output = match output {
            Some(name) => name.parse::<OutputFormat>().map_err(|_| {
                config_error(format!(
                    "Invalid output format '{}': expected one of text, json, yaml",
                    name
                ))
            })?,
            None => OutputFormat::default()
        };
        Ok(Self {
            rules: RulesConfig {
                select: select.unwrap_or_default(),
                ignore: ignore.unwrap_or_default()
            },
            debug: debug.unwrap_or(false),
            output,
            settings_file: None,
            provenance
        })
    }
}

/// Setting value after normalization
#[derive(Debug, Clone, PartialEq, Eq)]
enum Normalized {
    List(Vec<String>),
    Flag(bool),
    Text(String)
}

impl Normalized {
    fn into_list(self) -> Option<Vec<String>> {
        match self {
            Self::List(items) => Some(items),
            _ => None
        }
    }

    fn into_flag(self) -> Option<bool> {
        match self {
            Self::Flag(flag) => Some(flag),
            _ => None
        }
    }

    fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            _ => None
        }
    }
}

/// Converts a raw value to the shape of `setting`; empty values are absent
fn normalize(setting: Setting, raw: RawValue) -> Option<Normalized> {
    match setting {
        Setting::Select | Setting::Ignore => {
            let items = match raw {
                RawValue::Text(text) => split_list(&text),
                RawValue::List(items) => items.iter().flat_map(|item| split_list(item)).collect(),
                RawValue::Flag(_) => return None
            };
            (!items.is_empty()).then_some(Normalized::List(items))
        }
        Setting::Debug => match raw {
            RawValue::Flag(flag) => Some(Normalized::Flag(flag)),
            RawValue::Text(text) if !text.trim().is_empty() => {
                Some(Normalized::Flag(parse_flag(&text)))
            }
            _ => None
        },
        Setting::Output => match raw {
            RawValue::Text(text) if !text.trim().is_empty() => {
                Some(Normalized::Text(text.trim().to_ascii_lowercase()))
            }
            _ => None
        }
    }
}

/// Splits a comma separated list into trimmed, upper-cased entries
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(|item| item.trim().to_ascii_uppercase())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Interprets `true`, `t`, `yes`, `y` and `1` as true, ignoring case
pub fn parse_flag(text: &str) -> bool {
    matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "true" | "t" | "yes" | "y" | "1"
    )
}

/// Settings file candidates in lookup order
pub fn candidate_paths(cwd: Option<&Path>, home: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(cwd) = cwd {
        paths.extend(LOCAL_FILES.iter().map(|file| cwd.join(file)));
        if let Some(parent) = cwd.parent() {
            paths.extend(PARENT_FILES.iter().map(|file| parent.join(file)));
        }
    }
    if let Some(home) = home {
        paths.extend(HOME_FILES.iter().map(|file| home.join(file)));
    }
    paths
}

fn read_settings(path: &Path) -> AppResult<(FileSettings, bool)> {
    let content = fs::read_to_string(path).map_err(|e| {
        config_error(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;
    parse_settings(&content)
        .map_err(|e| config_error(format!("Invalid config file '{}': {}", path.display(), e)))
}

/// Parses a settings document; the flag tells whether `[tool.queryguard]`
/// was present
fn parse_settings(content: &str) -> Result<(FileSettings, bool), toml::de::Error> {
    let document: SettingsDocument = toml::from_str(content)?;
    Ok(match document.tool.and_then(|tool| tool.queryguard) {
        Some(settings) => (settings, true),
        None => (document.settings, false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" s001, s002 ,,"), vec!["S001", "S002"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_parse_flag() {
        for text in ["true", "T", "yes", "Y", "1", " TRUE "] {
            assert!(parse_flag(text), "{text}");
        }
        for text in ["false", "no", "0", "maybe"] {
            assert!(!parse_flag(text), "{text}");
        }
    }

    #[test]
    fn test_candidate_paths_order() {
        let paths = candidate_paths(Some(Path::new("/work/project")), Some(Path::new("/home/u")));
        assert_eq!(paths[0], PathBuf::from("/work/project/queryguard.toml"));
        assert_eq!(paths[4], PathBuf::from("/work/project/pyproject.toml"));
        assert_eq!(paths[5], PathBuf::from("/work/.config/queryguard.toml"));
        assert_eq!(paths.last().unwrap(), &PathBuf::from("/home/u/.config/queryguard.toml"));
        assert_eq!(paths.len(), 10);
    }

    #[test]
    fn test_normalize_empty_is_absent() {
        assert_eq!(normalize(Setting::Select, RawValue::Text(" , ".into())), None);
        assert_eq!(normalize(Setting::Debug, RawValue::Text(String::new())), None);
        assert_eq!(normalize(Setting::Output, RawValue::Text("  ".into())), None);
    }
}
