use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::{Config, OutputFormat};
use crate::error::Result;

/// Everything a command needs, resolved from the command line and the
/// configuration layers.
pub struct AppContext {
    pub target: Option<PathBuf>,
    pub project_root: PathBuf,
    pub config: Config,
    pub output_format: OutputFormat,
    pub check: bool,
    pub fix: bool,
    pub no_format: bool,
    pub list_rules: bool,
    pub explain: Option<String>,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let project_root = project_root(cli.target.as_deref())?;
        let mut config = Config::load(cli.config.as_deref(), &project_root)?;

        // command-line flags beat every file and environment layer
        if cli.external_first {
            config.order.external_first = true;
        }
        if cli.strict {
            config.lint.strict = true;
        }
        if let Some(format) = cli.output_format() {
            config.output.format = format;
        }
        if !config.output.color {
            console::set_colors_enabled(false);
        }

        Ok(Self {
            target: cli.target.clone(),
            project_root,
            output_format: config.output.format,
            config,
            check: cli.check,
            fix: cli.fix,
            no_format: cli.no_format,
            list_rules: cli.list_rules,
            explain: cli.explain.clone(),
        })
    }
}

/// Directory holding the target, or the working directory when there is
/// no target.
fn project_root(target: Option<&Path>) -> Result<PathBuf> {
    match target.and_then(Path::parent) {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(parent.to_path_buf()),
        _ => Ok(std::env::current_dir()?),
    }
}
