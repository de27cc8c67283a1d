//! sharpfmt: lint and format C# projects.
//!
//! A run loads a `.csproj` or `.sln` into an immutable [`workspace::Solution`],
//! evaluates every [`lint::Rule`] against every document, stages fixes and
//! formatting into a working snapshot and commits all changed documents in
//! one atomic step through [`workspace::ChangeCoordinator`].
//!
//! ```
//! use std::sync::Arc;
//!
//! use sharpfmt::lint::{LintConfig, LintEngine, OrderComparator};
//! use sharpfmt::lint::rules::DirectiveOrderRule;
//! use sharpfmt::syntax::CSharpFrontEnd;
//! use sharpfmt::workspace::SolutionBuilder;
//!
//! let mut builder = SolutionBuilder::new(Arc::new(CSharpFrontEnd));
//! let project = builder.add_project("App", "App.csproj");
//! builder.add_document(project, "Program.cs", "using B;\nusing A;\n");
//! let (solution, _) = builder.build();
//!
//! let engine = LintEngine::new(LintConfig::default())
//!     .with_rule(Box::new(DirectiveOrderRule::new(OrderComparator::Alphabetical)));
//! let documents: Vec<_> = solution.documents().cloned().collect();
//! let report = engine.run(&documents);
//! assert_eq!(report.error_count(), 1);
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod lint;
pub mod pipeline;
pub mod syntax;
#[doc(hidden)]
pub mod test_utils;
pub mod workspace;

pub use error::{FmtError, Result};
