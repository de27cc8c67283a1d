//! Command-line interface.

pub mod output;
pub mod run;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::OutputFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Styled text for terminals
    Human,
    /// Single JSON document on stdout
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Human => Self::Human,
            FormatArg::Json => Self::Json,
        }
    }
}

/// Check and format C# projects.
///
/// Without flags, reports diagnostics, formats every document and writes
/// the result back in one atomic step.
#[derive(Parser, Debug)]
#[command(name = "sharpfmt", version, about, long_about = None)]
pub struct Cli {
    /// Project (.csproj) or solution (.sln) to process
    #[arg(
        value_name = "PROJECT_OR_SOLUTION",
        required_unless_present_any = ["list_rules", "explain"]
    )]
    pub target: Option<PathBuf>,

    /// Configuration file (replaces the global and project files)
    #[arg(long, value_name = "PATH", env = "SHARPFMT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Report only; exit with status 2 if anything is found
    #[arg(long, conflicts_with = "fix")]
    pub check: bool,

    /// Apply auto-fixes (including directive sorting) before committing
    #[arg(long)]
    pub fix: bool,

    /// Skip the formatter and the format-check rule
    #[arg(long)]
    pub no_format: bool,

    /// Sort System directives ahead of everything else
    #[arg(long)]
    pub external_first: bool,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// List all available rules
    #[arg(long)]
    pub list_rules: bool,

    /// Show documentation for a rule
    #[arg(long, value_name = "RULE")]
    pub explain: Option<String>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress logging
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// Output format requested on the command line, if any.
    #[must_use]
    pub fn output_format(&self) -> Option<OutputFormat> {
        self.format.map(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn target_required_unless_listing() {
        assert!(Cli::try_parse_from(["sharpfmt"]).is_err());
        assert!(Cli::try_parse_from(["sharpfmt", "--list-rules"]).is_ok());
        assert!(Cli::try_parse_from(["sharpfmt", "--explain", "directive-order"]).is_ok());
    }

    #[test]
    fn check_and_fix_conflict() {
        assert!(Cli::try_parse_from(["sharpfmt", "App.csproj", "--check", "--fix"]).is_err());
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from([
            "sharpfmt",
            "App.sln",
            "--check",
            "--external-first",
            "--format",
            "json",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.target, Some(PathBuf::from("App.sln")));
        assert!(cli.check);
        assert!(cli.external_first);
        assert_eq!(cli.output_format(), Some(OutputFormat::Json));
        assert_eq!(cli.verbose, 2);
    }
}
