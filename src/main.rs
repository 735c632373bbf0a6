use std::process;

use clap::Parser;
use queryguard::{
    app::{LintParams, cli_overrides, list_rules, log_provenance, run_lint},
    cli::Cli,
    config::Config,
    error::{AppResult, config_error}
};
use tracing_subscriber::EnvFilter;

fn main() {
    match run() {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    }
}

fn run() -> AppResult<i32> {
    let cli = Cli::parse();
    let config = Config::load(cli_overrides(&cli))?;
    init_logging(config.debug);
    log_provenance(&config);

    if cli.list_rules {
        println!("{}", list_rules(&config, cli.no_color)?);
        return Ok(0);
    }

    let path = cli.path.ok_or_else(|| config_error("No path given to lint"))?;
    let result = run_lint(
        LintParams {
            path,
            no_color: cli.no_color
        },
        &config
    )?;
    println!("{}", result.output);
    Ok(result.exit_code)
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("queryguard=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("queryguard=warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
