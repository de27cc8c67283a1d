//! Ordering policies for import directives.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::scope::ImportDirective;

/// Prefixes treated as external when no list is configured.
pub const DEFAULT_EXTERNAL_PREFIXES: &[&str] = &["System"];

/// Total order over directives.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "kebab-case")]
pub enum OrderComparator {
    /// Ordinal comparison of sort keys.
    #[default]
    Alphabetical,
    /// Directives under one of `prefixes` first, then the rest. Each group
    /// is alphabetical.
    ExternalFirst { prefixes: Vec<String> },
}

impl OrderComparator {
    /// External-first with the default `System` prefix.
    #[must_use]
    pub fn external_first() -> Self {
        Self::ExternalFirst {
            prefixes: DEFAULT_EXTERNAL_PREFIXES
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    pub fn compare(&self, a: &ImportDirective, b: &ImportDirective) -> Ordering {
        self.compare_keys(&a.sort_key, &b.sort_key)
    }

    pub fn compare_keys(&self, a: &str, b: &str) -> Ordering {
        match self {
            Self::Alphabetical => a.cmp(b),
            Self::ExternalFirst { prefixes } => {
                let a_external = is_external(a, prefixes);
                let b_external = is_external(b, prefixes);
                // true sorts first
                b_external.cmp(&a_external).then_with(|| a.cmp(b))
            }
        }
    }

    /// Whether `directives` is already in order (every adjacent pair
    /// compares `<=`).
    #[must_use]
    pub fn is_sorted(&self, directives: &[ImportDirective]) -> bool {
        directives
            .windows(2)
            .all(|pair| self.compare(&pair[0], &pair[1]) != Ordering::Greater)
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Alphabetical => "alphabetical",
            Self::ExternalFirst { .. } => "external-first",
        }
    }
}

/// `key` equals a prefix or continues it at a `.` boundary.
fn is_external(key: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| {
        key.strip_prefix(prefix.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
    })
}
