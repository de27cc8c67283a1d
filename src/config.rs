use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FmtError, Result};
use crate::format::FormatOptions;
use crate::lint::{DEFAULT_EXTERNAL_PREFIXES, LintConfig, OrderComparator, Severity};

/// File name looked up next to the target project or solution.
pub const PROJECT_CONFIG_FILE: &str = "sharpfmt.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub order: OrderConfig,
    #[serde(default)]
    pub format: FormatOptions,
    #[serde(default)]
    pub lint: LintConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Defaults, then the global and project files (or only the explicit
    /// file when one is given), then environment overrides.
    pub fn load(explicit_path: Option<&Path>, project_root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("SHARPFMT_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            match Self::load_patch(&path)? {
                Some(patch) => config.merge_patch(patch),
                None => return Err(FmtError::NotFound(path)),
            }
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_patch(&project_root.join(PROJECT_CONFIG_FILE))? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides()?;
        debug!(?config, "configuration loaded");
        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        match dirs::config_dir() {
            Some(dir) => Self::load_patch(&dir.join("sharpfmt").join("config.toml")),
            None => Ok(None),
        }
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| FmtError::Config(format!("read config {}: {err}", path.display())))?;
        Self::parse_patch(&raw, path).map(Some)
    }

    fn parse_patch(raw: &str, origin: &Path) -> Result<ConfigPatch> {
        toml::from_str(raw)
            .map_err(|err| FmtError::Config(format!("parse config {}: {err}", origin.display())))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.order {
            self.order.merge(patch);
        }
        if let Some(patch) = patch.format {
            merge_format(&mut self.format, patch);
        }
        if let Some(patch) = patch.lint {
            merge_lint(&mut self.lint, patch);
        }
        if let Some(patch) = patch.output {
            self.output.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(&|key: &str| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, env: &dyn Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(strict) = env_bool(env, "SHARPFMT_STRICT") {
            self.lint.strict = strict;
        }
        if let Some(external_first) = env_bool(env, "SHARPFMT_EXTERNAL_FIRST") {
            self.order.external_first = external_first;
        }
        if let Some(values) = env_list(env, "SHARPFMT_EXTERNAL_PREFIXES") {
            self.order.external_prefixes = unique_prefixes(values);
        }
        if let Some(space) = env_bool(env, "SHARPFMT_SPACE_AFTER_CONTROL_KEYWORD") {
            self.format.space_after_control_keyword = space;
        }
        if let Some(values) = env_list(env, "SHARPFMT_DISABLED_RULES") {
            self.lint.disabled_rules.extend(values);
        }
        if let Some(format) = env("SHARPFMT_FORMAT") {
            self.output.format = parse_output_format(&format)?;
        }
        Ok(())
    }

    /// Comparator selected by the `[order]` section.
    #[must_use]
    pub fn comparator(&self) -> OrderComparator {
        if self.order.external_first {
            OrderComparator::ExternalFirst {
                prefixes: self.order.external_prefixes.clone(),
            }
        } else {
            OrderComparator::Alphabetical
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfig {
    /// Sort directives under `external_prefixes` ahead of the rest
    #[serde(default)]
    pub external_first: bool,
    #[serde(default = "default_external_prefixes")]
    pub external_prefixes: Vec<String>,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            external_first: false,
            external_prefixes: default_external_prefixes(),
        }
    }
}

impl OrderConfig {
    fn merge(&mut self, patch: OrderPatch) {
        if let Some(value) = patch.external_first {
            self.external_first = value;
        }
        if let Some(values) = patch.external_prefixes {
            self.external_prefixes = unique_prefixes(values);
        }
    }
}

fn default_external_prefixes() -> Vec<String> {
    DEFAULT_EXTERNAL_PREFIXES
        .iter()
        .map(ToString::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Include rule descriptions next to diagnostics in human output
    #[serde(default)]
    pub verbose_rules: bool,
    #[serde(default = "default_color")]
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Human,
            verbose_rules: false,
            color: default_color(),
        }
    }
}

const fn default_color() -> bool {
    true
}

impl OutputConfig {
    fn merge(&mut self, patch: OutputPatch) {
        if let Some(value) = patch.format {
            self.format = value;
        }
        if let Some(value) = patch.verbose_rules {
            self.verbose_rules = value;
        }
        if let Some(value) = patch.color {
            self.color = value;
        }
    }
}

fn merge_format(options: &mut FormatOptions, patch: FormatPatch) {
    if let Some(value) = patch.space_after_control_keyword {
        options.space_after_control_keyword = value;
    }
    if let Some(value) = patch.trim_trailing_whitespace {
        options.trim_trailing_whitespace = value;
    }
    if let Some(value) = patch.insert_final_newline {
        options.insert_final_newline = value;
    }
}

fn merge_lint(config: &mut LintConfig, patch: LintPatch) {
    if let Some(values) = patch.disabled_rules {
        config.disabled_rules.extend(values);
    }
    if let Some(overrides) = patch.severity_overrides {
        config.severity_overrides.extend(overrides);
    }
    if let Some(value) = patch.strict {
        config.strict = value;
    }
    if let Some(value) = patch.fail_on_rule_error {
        config.fail_on_rule_error = value;
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    pub order: Option<OrderPatch>,
    pub format: Option<FormatPatch>,
    pub lint: Option<LintPatch>,
    pub output: Option<OutputPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct OrderPatch {
    pub external_first: Option<bool>,
    pub external_prefixes: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FormatPatch {
    pub space_after_control_keyword: Option<bool>,
    pub trim_trailing_whitespace: Option<bool>,
    pub insert_final_newline: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LintPatch {
    pub disabled_rules: Option<Vec<String>>,
    pub severity_overrides: Option<BTreeMap<String, Severity>>,
    pub strict: Option<bool>,
    pub fail_on_rule_error: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct OutputPatch {
    pub format: Option<OutputFormat>,
    pub verbose_rules: Option<bool>,
    pub color: Option<bool>,
}

fn unique_prefixes(values: Vec<String>) -> Vec<String> {
    values.into_iter().unique().collect()
}

fn parse_output_format(value: &str) -> Result<OutputFormat> {
    match value.to_lowercase().as_str() {
        "human" | "text" => Ok(OutputFormat::Human),
        "json" => Ok(OutputFormat::Json),
        _ => Err(FmtError::Config(format!(
            "invalid output format {value} (expected human|json)"
        ))),
    }
}

fn env_bool(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    env(key).map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

fn env_list(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<Vec<String>> {
    env(key).map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(ToString::to_string)
            .collect()
    })
}
