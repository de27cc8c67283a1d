//! Lint configuration.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::diagnostic::Severity;

/// Which rules run and how loudly they report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    /// Rules to skip, by id
    pub disabled_rules: BTreeSet<String>,

    /// Severity overrides by rule id
    pub severity_overrides: BTreeMap<String, Severity>,

    /// Treat warnings as errors
    pub strict: bool,

    /// Turn a rule that fails to evaluate into a fatal error instead of a
    /// recorded failure.
    pub fail_on_rule_error: bool,
}

impl LintConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    #[must_use]
    pub const fn fail_on_rule_error(mut self) -> Self {
        self.fail_on_rule_error = true;
        self
    }

    #[must_use]
    pub fn disable_rule(mut self, rule_id: impl Into<String>) -> Self {
        self.disabled_rules.insert(rule_id.into());
        self
    }

    #[must_use]
    pub fn override_severity(mut self, rule_id: impl Into<String>, severity: Severity) -> Self {
        self.severity_overrides.insert(rule_id.into(), severity);
        self
    }

    #[must_use]
    pub fn is_rule_disabled(&self, rule_id: &str) -> bool {
        self.disabled_rules.contains(rule_id)
    }

    /// Severity after overrides and strict mode.
    #[must_use]
    pub fn effective_severity(&self, rule_id: &str, default: Severity) -> Severity {
        let severity = self
            .severity_overrides
            .get(rule_id)
            .copied()
            .unwrap_or(default);

        if self.strict && severity == Severity::Warning {
            Severity::Error
        } else {
            severity
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = LintConfig::new();
        assert!(!config.strict);
        assert!(!config.fail_on_rule_error);
        assert!(config.disabled_rules.is_empty());
        assert!(config.severity_overrides.is_empty());
    }

    #[test]
    fn builder() {
        let config = LintConfig::new()
            .strict()
            .disable_rule("format-check")
            .override_severity("directive-order", Severity::Warning);

        assert!(config.strict);
        assert!(config.is_rule_disabled("format-check"));
        assert!(!config.is_rule_disabled("directive-order"));
    }

    #[test]
    fn override_then_strict() {
        let config = LintConfig::new().override_severity("directive-order", Severity::Info);
        assert_eq!(
            config.effective_severity("directive-order", Severity::Error),
            Severity::Info
        );

        let strict = LintConfig::new().strict();
        assert_eq!(
            strict.effective_severity("format-check", Severity::Warning),
            Severity::Error
        );
        assert_eq!(
            strict.effective_severity("format-check", Severity::Info),
            Severity::Info
        );
    }

    #[test]
    fn parses_from_toml() {
        let config: LintConfig = toml::from_str(
            r#"
            disabled_rules = ["format-check"]
            strict = true

            [severity_overrides]
            directive-order = "warning"
            "#,
        )
        .unwrap();
        assert!(config.is_rule_disabled("format-check"));
        assert_eq!(
            config.severity_overrides.get("directive-order"),
            Some(&Severity::Warning)
        );
    }
}
