//! Syntax layer: spans, tokens, the declaration-level tree and the front end
//! that produces it.

pub mod lexer;
pub mod parser;
pub mod span;
pub mod tree;

pub use parser::{CSharpFrontEnd, FrontEnd, LoadDiagnostic, LoadSeverity, ParseOutcome};
pub use span::{LineIndex, LinePosition, LineSpan, TextSpan};
pub use tree::{CompilationUnit, NamespaceDecl, SyntaxTree, UsingDirective, UsingKind};
