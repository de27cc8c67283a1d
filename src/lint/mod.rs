//! Rule evaluation and diagnostics.
//!
//! - [`Rule`] trait for implementing style rules
//! - [`LintEngine`] for running rules against documents in parallel
//! - [`Diagnostic`] types anchored to byte spans
//! - [`ScopeWalker`] and [`OrderComparator`] used by the ordering rule
//! - [`LintConfig`] for disabling rules and overriding severities
//!
//! # Example
//!
//! ```
//! use sharpfmt::lint::rules::DirectiveOrderRule;
//! use sharpfmt::lint::{LintConfig, LintEngine, OrderComparator};
//! use sharpfmt::syntax::CSharpFrontEnd;
//! use sharpfmt::workspace::{Document, DocumentId};
//!
//! let (doc, _) = Document::parse(
//!     DocumentId::new(0),
//!     "Program.cs",
//!     "using Beta;\nusing Alpha;\n",
//!     &CSharpFrontEnd,
//! );
//!
//! let engine = LintEngine::new(LintConfig::default())
//!     .with_rule(Box::new(DirectiveOrderRule::new(OrderComparator::Alphabetical)));
//! let report = engine.run(&[doc]);
//!
//! assert_eq!(report.error_count(), 1);
//! assert_eq!(report.diagnostics[0].message, "Must be sorted");
//! ```

pub mod config;
pub mod diagnostic;
pub mod engine;
pub mod order;
pub mod rule;
pub mod rules;
pub mod scope;

pub use config::LintConfig;
pub use diagnostic::{Diagnostic, RuleCategory, Severity};
pub use engine::{
    CancellationToken, DiagnosticSink, FixOutcome, LintEngine, LintReport, RuleFailure, RuleInfo,
};
pub use order::{DEFAULT_EXTERNAL_PREFIXES, OrderComparator};
pub use rule::{BoxedRule, Rule, RuleContext};
pub use rules::all_rules;
pub use scope::{ImportDirective, Scope, ScopeKind, ScopeWalker};
