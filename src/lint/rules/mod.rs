//! Built-in rules.
//!
//! - **Ordering** (`directive_order`): using directives sorted per scope
//! - **Formatting** (`format_check`): formatter output matches the document
//!
//! # Usage
//!
//! ```
//! use sharpfmt::format::FormatOptions;
//! use sharpfmt::lint::rules::all_rules;
//! use sharpfmt::lint::{LintConfig, LintEngine, OrderComparator};
//!
//! let mut engine = LintEngine::new(LintConfig::default());
//! for rule in all_rules(&OrderComparator::Alphabetical, &FormatOptions::default()) {
//!     engine.register(rule);
//! }
//! assert_eq!(engine.rules().len(), 2);
//! ```

pub mod directive_order;
pub mod format_check;

use crate::format::FormatOptions;
use crate::lint::order::OrderComparator;
use crate::lint::rule::BoxedRule;

pub use directive_order::DirectiveOrderRule;
pub use format_check::FormatCheckRule;

/// Ordering rules built with `comparator`.
#[must_use]
pub fn ordering_rules(comparator: &OrderComparator) -> Vec<BoxedRule> {
    vec![Box::new(DirectiveOrderRule::new(comparator.clone()))]
}

/// Formatting rules backed by the structural formatter.
#[must_use]
pub fn formatting_rules(options: &FormatOptions) -> Vec<BoxedRule> {
    vec![Box::new(FormatCheckRule::structural(options.clone()))]
}

/// Every built-in rule.
#[must_use]
pub fn all_rules(comparator: &OrderComparator, options: &FormatOptions) -> Vec<BoxedRule> {
    let mut rules = ordering_rules(comparator);
    rules.extend(formatting_rules(options));
    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_ids_unique() {
        let rules = all_rules(&OrderComparator::Alphabetical, &FormatOptions::default());
        let mut ids: Vec<&str> = rules.iter().map(|r| r.id()).collect();
        let original_len = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), original_len);
    }

    #[test]
    fn every_builtin_can_fix() {
        let rules = all_rules(&OrderComparator::external_first(), &FormatOptions::default());
        assert!(rules.iter().all(|r| r.can_fix()));
        assert_eq!(rules[0].id(), DirectiveOrderRule::ID);
        assert_eq!(rules[1].id(), FormatCheckRule::ID);
    }
}
