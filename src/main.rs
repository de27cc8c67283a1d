//! sharpfmt - check and format C# projects.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use sharpfmt::Result;
use sharpfmt::app::AppContext;
use sharpfmt::cli::Cli;
use sharpfmt::cli::output::{emit_json, error_envelope};
use sharpfmt::cli::run::{self, Outcome};
use sharpfmt::config::OutputFormat;

const EXIT_VIOLATIONS: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.output_format() == Some(OutputFormat::Json);
    init_tracing(&cli, json);

    match execute(&cli) {
        Ok(Outcome::Clean) => ExitCode::SUCCESS,
        Ok(Outcome::Violations) => ExitCode::from(EXIT_VIOLATIONS),
        Err(e) => {
            if json {
                if emit_json(&error_envelope(&e)).is_err() {
                    eprintln!("Error: {e}");
                }
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: &Cli) -> Result<Outcome> {
    let ctx = AppContext::from_cli(cli)?;
    run::run(&ctx)
}

fn init_tracing(cli: &Cli, json: bool) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,sharpfmt=info",
        1 => "info,sharpfmt=debug",
        2 => "debug,sharpfmt=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
