//! Conversion of CLI-facing types to internal types.

use crate::{
    cli::{Cli, Format},
    config::CliOverrides,
    output::OutputFormat
};

/// Converts a CLI format enum to the internal output format type.
///
/// # Example
///
/// ```
/// use queryguard::{app::convert_format, cli::Format, output::OutputFormat};
///
/// assert_eq!(convert_format(Format::Json), OutputFormat::Json);
/// ```
pub fn convert_format(format: Format) -> OutputFormat {
    match format {
        Format::Text => OutputFormat::Text,
        Format::Json => OutputFormat::Json,
        Format::Yaml => OutputFormat::Yaml
    }
}

/// Extracts the highest priority setting source from parsed arguments.
///
/// Options that were not passed stay `None` so that the environment,
/// settings file and defaults are consulted for them.
pub fn cli_overrides(cli: &Cli) -> CliOverrides {
    CliOverrides {
        select:   cli.select.clone(),
        ignore:   cli.ignore.clone(),
        debug:    cli.debug,
        output:   cli.output.map(|format| convert_format(format).to_string()),
        settings: cli.settings.clone()
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_convert_format_text() {
        assert_eq!(convert_format(Format::Text), OutputFormat::Text);
    }

    #[test]
    fn test_convert_format_yaml() {
        assert_eq!(convert_format(Format::Yaml), OutputFormat::Yaml);
    }

    #[test]
    fn test_cli_overrides_absent_options() {
        let cli = Cli::parse_from(["queryguard", "deploy.sql"]);
        let overrides = cli_overrides(&cli);
        assert!(overrides.select.is_none());
        assert!(overrides.output.is_none());
        assert!(!overrides.debug);
    }

    #[test]
    fn test_cli_overrides_passed_options() {
        let cli = Cli::parse_from([
            "queryguard",
            "deploy.sql",
            "--select",
            "S01",
            "--output",
            "yaml",
            "--debug",
            "--settings",
            "ci.toml"
        ]);
        let overrides = cli_overrides(&cli);
        assert_eq!(overrides.select.as_deref(), Some("S01"));
        assert_eq!(overrides.output.as_deref(), Some("yaml"));
        assert!(overrides.debug);
        assert_eq!(
            overrides.settings.as_deref(),
            Some(std::path::Path::new("ci.toml"))
        );
    }
}
