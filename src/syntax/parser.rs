//! Front end: turns file text into a [`SyntaxTree`].
//!
//! `CSharpFrontEnd` parses declarations only. Type bodies, attribute lists and
//! top-level statements are skipped as balanced token runs; what remains is
//! the nesting of namespaces and the using directives each one owns.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::lexer::{Token, TokenKind, tokenize};
use super::span::TextSpan;
use super::tree::{CompilationUnit, NamespaceDecl, SyntaxTree, UsingDirective, UsingKind};

/// Severity of a load-time diagnostic.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadSeverity {
    /// Aborts the pipeline before analysis.
    Failure,
    Warning,
}

/// A diagnostic raised while loading or parsing, before any rule runs.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct LoadDiagnostic {
    pub severity: LoadSeverity,
    pub message: String,
    pub path: Option<PathBuf>,
}

impl LoadDiagnostic {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            severity: LoadSeverity::Failure,
            message: message.into(),
            path: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: LoadSeverity::Warning,
            message: message.into(),
            path: None,
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.severity == LoadSeverity::Failure
    }
}

impl fmt::Display for LoadDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            LoadSeverity::Failure => "failure",
            LoadSeverity::Warning => "warning",
        };
        match &self.path {
            Some(path) => write!(f, "[{severity}] {}: {}", path.display(), self.message),
            None => write!(f, "[{severity}] {}", self.message),
        }
    }
}

/// Result of parsing one file.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    /// `None` when no usable tree could be produced.
    pub tree: Option<SyntaxTree>,
    pub diagnostics: Vec<LoadDiagnostic>,
}

/// Boundary to the language front end.
pub trait FrontEnd: Send + Sync {
    fn parse(&self, path: &Path, text: &str) -> ParseOutcome;
}

/// Declaration-level C# parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct CSharpFrontEnd;

impl FrontEnd for CSharpFrontEnd {
    fn parse(&self, path: &Path, text: &str) -> ParseOutcome {
        let tokens = match tokenize(text) {
            Ok(tokens) => tokens,
            Err(err) => {
                debug!(path = %path.display(), offset = err.offset, "lex error: {}", err.message);
                return ParseOutcome {
                    tree: None,
                    diagnostics: vec![
                        LoadDiagnostic::warning(format!("{} at offset {}", err.message, err.offset))
                            .with_path(path),
                    ],
                };
            }
        };

        let mut parser = Parser::new(text, tokens);
        match parser.compilation_unit() {
            Ok(root) => ParseOutcome {
                tree: Some(SyntaxTree::new(root)),
                diagnostics: parser
                    .warnings
                    .into_iter()
                    .map(|w| w.with_path(path))
                    .collect(),
            },
            Err(err) => {
                debug!(path = %path.display(), offset = err.offset, "parse error: {}", err.message);
                let mut diagnostics: Vec<LoadDiagnostic> = parser
                    .warnings
                    .into_iter()
                    .map(|w| w.with_path(path))
                    .collect();
                diagnostics.push(
                    LoadDiagnostic::warning(format!("{} at offset {}", err.message, err.offset))
                        .with_path(path),
                );
                ParseOutcome {
                    tree: None,
                    diagnostics,
                }
            }
        }
    }
}

struct ParseError {
    message: String,
    offset: usize,
}

type ParseResult<T> = std::result::Result<T, ParseError>;

struct Body {
    usings: Vec<UsingDirective>,
    namespaces: Vec<NamespaceDecl>,
    end: usize,
}

struct Parser<'a> {
    text: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    warnings: Vec<LoadDiagnostic>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            text,
            tokens: tokens.into_iter().filter(|t| !t.kind.is_trivia()).collect(),
            pos: 0,
            warnings: Vec::new(),
        }
    }

    fn peek(&self, ahead: usize) -> Option<Token> {
        self.tokens.get(self.pos + ahead).copied()
    }

    fn is_ident(&self, ahead: usize, word: &str) -> bool {
        self.peek(ahead)
            .is_some_and(|t| t.kind == TokenKind::Ident && t.text(self.text) == word)
    }

    fn is_punct(&self, ahead: usize, byte: u8) -> bool {
        self.peek(ahead).is_some_and(|t| t.is_punct(byte))
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            offset: self.peek(0).map_or(self.text.len(), |t| t.span.start),
        }
    }

    fn compilation_unit(&mut self) -> ParseResult<CompilationUnit> {
        let body = self.body(false)?;
        Ok(CompilationUnit {
            span: TextSpan::new(0, self.text.len()),
            usings: body.usings,
            namespaces: body.namespaces,
        })
    }

    /// Parse declarations until the closing `}` (when `braced`) or end of file.
    fn body(&mut self, braced: bool) -> ParseResult<Body> {
        let mut usings = Vec::new();
        let mut namespaces = Vec::new();
        let mut members_started = false;

        loop {
            let Some(token) = self.peek(0) else {
                if braced {
                    return Err(self.error("expected '}' before end of file"));
                }
                return Ok(Body {
                    usings,
                    namespaces,
                    end: self.text.len(),
                });
            };

            if token.is_punct(b'}') {
                if !braced {
                    return Err(self.error("unexpected '}'"));
                }
                self.pos += 1;
                return Ok(Body {
                    usings,
                    namespaces,
                    end: token.span.end,
                });
            }

            if self.is_ident(0, "extern") && self.is_ident(1, "alias") {
                self.skip_past(b';')?;
            } else if self.is_using_directive() {
                let directive = self.using_directive()?;
                if members_started {
                    self.warnings.push(LoadDiagnostic::warning(format!(
                        "using directive '{}' follows other declarations",
                        directive.name
                    )));
                } else {
                    usings.push(directive);
                }
            } else if self.is_ident(0, "namespace") {
                let ns = self.namespace(braced)?;
                let file_scoped = ns.file_scoped;
                namespaces.push(ns);
                members_started = true;
                if file_scoped {
                    return Ok(Body {
                        usings,
                        namespaces,
                        end: self.text.len(),
                    });
                }
            } else if token.is_punct(b'[') {
                members_started = true;
                self.skip_balanced(b'[', b']')?;
            } else {
                members_started = true;
                self.skip_member()?;
            }
        }
    }

    fn is_using_directive(&self) -> bool {
        let offset = usize::from(self.is_ident(0, "global"));
        self.is_ident(offset, "using")
            && !self.is_punct(offset + 1, b'(')
            && !self.is_ident(offset + 1, "var")
    }

    fn using_directive(&mut self) -> ParseResult<UsingDirective> {
        let start = self.peek(0).map_or(0, |t| t.span.start);
        let is_global = self.is_ident(0, "global");
        if is_global {
            self.pos += 1;
        }
        self.pos += 1; // `using`

        let is_static = self.is_ident(0, "static");
        if is_static {
            self.pos += 1;
        }

        let mut parts: Vec<Token> = Vec::new();
        let mut alias: Option<String> = None;
        loop {
            let Some(token) = self.peek(0) else {
                return Err(self.error("expected ';' after using directive"));
            };
            self.pos += 1;
            match token.kind {
                TokenKind::Punct(b';') => {
                    let Some((first, last)) = parts.first().zip(parts.last()) else {
                        return Err(ParseError {
                            message: "empty using directive".into(),
                            offset: token.span.start,
                        });
                    };
                    let name_span = TextSpan::cover(first.span, last.span);
                    let name: String = parts.iter().map(|t| t.text(self.text)).collect();
                    let kind = match alias {
                        Some(alias) => UsingKind::Alias { alias },
                        None if is_static => UsingKind::Static,
                        None => UsingKind::Namespace,
                    };
                    return Ok(UsingDirective {
                        span: TextSpan::new(start, token.span.end),
                        name,
                        name_span,
                        kind,
                        is_global,
                    });
                }
                TokenKind::Punct(b'=') if alias.is_none() && !parts.is_empty() => {
                    alias = Some(parts.iter().map(|t| t.text(self.text)).collect());
                    parts.clear();
                }
                TokenKind::Punct(b'{' | b'}') => {
                    return Err(ParseError {
                        message: "expected ';' after using directive".into(),
                        offset: token.span.start,
                    });
                }
                _ => parts.push(token),
            }
        }
    }

    fn namespace(&mut self, nested: bool) -> ParseResult<NamespaceDecl> {
        let start = self.peek(0).map_or(0, |t| t.span.start);
        self.pos += 1; // `namespace`

        let mut name = String::new();
        loop {
            let Some(token) = self.peek(0) else {
                return Err(self.error("expected '{' or ';' after namespace name"));
            };
            match token.kind {
                TokenKind::Punct(b'{') => {
                    self.pos += 1;
                    let body = self.body(true)?;
                    return Ok(NamespaceDecl {
                        name,
                        span: TextSpan::new(start, body.end),
                        file_scoped: false,
                        usings: body.usings,
                        namespaces: body.namespaces,
                    });
                }
                TokenKind::Punct(b';') => {
                    if nested {
                        return Err(self.error("file-scoped namespace inside a namespace block"));
                    }
                    self.pos += 1;
                    let body = self.body(false)?;
                    return Ok(NamespaceDecl {
                        name,
                        span: TextSpan::new(start, body.end),
                        file_scoped: true,
                        usings: body.usings,
                        namespaces: body.namespaces,
                    });
                }
                TokenKind::Ident | TokenKind::Punct(b'.') => {
                    name.push_str(token.text(self.text));
                    self.pos += 1;
                }
                _ => return Err(self.error("unexpected token in namespace name")),
            }
        }
    }

    /// Skip one non-namespace member: up to `;` or through one braced block.
    fn skip_member(&mut self) -> ParseResult<()> {
        loop {
            let Some(token) = self.peek(0) else {
                return Ok(());
            };
            match token.kind {
                TokenKind::Punct(b';') => {
                    self.pos += 1;
                    return Ok(());
                }
                TokenKind::Punct(b'}') => return Ok(()),
                TokenKind::Punct(b'{') => return self.skip_balanced(b'{', b'}'),
                TokenKind::Punct(b'(') => self.skip_balanced(b'(', b')')?,
                TokenKind::Punct(b'[') => self.skip_balanced(b'[', b']')?,
                _ => self.pos += 1,
            }
        }
    }

    fn skip_balanced(&mut self, open: u8, close: u8) -> ParseResult<()> {
        let start = self.peek(0).map_or(self.text.len(), |t| t.span.start);
        let mut depth = 0usize;
        while let Some(token) = self.peek(0) {
            self.pos += 1;
            if token.is_punct(open) {
                depth += 1;
            } else if token.is_punct(close) {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
        }
        Err(ParseError {
            message: format!("unbalanced '{}'", char::from(open)),
            offset: start,
        })
    }

    fn skip_past(&mut self, byte: u8) -> ParseResult<()> {
        while let Some(token) = self.peek(0) {
            self.pos += 1;
            if token.is_punct(byte) {
                return Ok(());
            }
        }
        Err(self.error(format!("expected '{}'", char::from(byte))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ParseOutcome {
        CSharpFrontEnd.parse(Path::new("Test.cs"), text)
    }

    fn tree(text: &str) -> SyntaxTree {
        parse(text).tree.expect("tree")
    }

    #[test]
    fn file_level_usings() {
        let text = "using System.Text;\nusing Alpha;\n";
        let tree = tree(text);
        let names: Vec<&str> = tree.root().usings.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["System.Text", "Alpha"]);
        assert_eq!(tree.root().usings[0].span, TextSpan::new(0, 18));
        assert_eq!(tree.root().usings[1].span.slice(text), "using Alpha;");
    }

    #[test]
    fn alias_static_and_global_forms() {
        let text = "global using G;\nusing static System.Math;\nusing Col = System.Collections.Generic.List<int>;\n";
        let tree = tree(text);
        let usings = &tree.root().usings;
        assert!(usings[0].is_global);
        assert_eq!(usings[0].kind, UsingKind::Namespace);
        assert_eq!(usings[1].kind, UsingKind::Static);
        assert_eq!(usings[1].name, "System.Math");
        assert_eq!(
            usings[2].kind,
            UsingKind::Alias {
                alias: "Col".into()
            }
        );
        assert_eq!(usings[2].name, "System.Collections.Generic.List<int>");
        assert!(usings[2].is_alias());
    }

    #[test]
    fn whitespace_and_comments_inside_names_are_dropped() {
        let tree = tree("using System . /* x */ Text;");
        assert_eq!(tree.root().usings[0].name, "System.Text");
    }

    #[test]
    fn nested_namespaces_own_their_usings() {
        let text = "using A;\nnamespace Foo {\n    using B;\n    namespace Bar.Baz {\n        using C;\n        class X { void M() { using (var s = Open()) { } } }\n    }\n}\n";
        let tree = tree(text);
        let root = tree.root();
        assert_eq!(root.usings.len(), 1);
        assert_eq!(root.namespaces.len(), 1);
        let foo = &root.namespaces[0];
        assert_eq!(foo.name, "Foo");
        assert_eq!(foo.usings[0].name, "B");
        let bar = &foo.namespaces[0];
        assert_eq!(bar.name, "Bar.Baz");
        assert_eq!(bar.usings.len(), 1);
        assert_eq!(bar.usings[0].name, "C");
        assert!(foo.span.slice(text).starts_with("namespace Foo {"));
        assert!(foo.span.slice(text).ends_with('}'));
        assert_eq!(tree.all_usings().len(), 3);
    }

    #[test]
    fn file_scoped_namespace() {
        let text = "using A;\nnamespace Foo;\nusing C;\nusing B;\nclass X {}\n";
        let tree = tree(text);
        let ns = &tree.root().namespaces[0];
        assert!(ns.file_scoped);
        assert_eq!(ns.span.end, text.len());
        let names: Vec<&str> = ns.usings.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["C", "B"]);
    }

    #[test]
    fn attributes_and_extern_alias_are_skipped() {
        let text = "extern alias Legacy;\nusing A;\n[assembly: Foo(\"}\")]\nnamespace N { }\n";
        let tree = tree(text);
        assert_eq!(tree.root().usings.len(), 1);
        assert_eq!(tree.root().namespaces[0].name, "N");
    }

    #[test]
    fn misplaced_using_is_reported_not_collected() {
        let outcome = parse("using A;\nclass X { }\nusing B;\n");
        let tree = outcome.tree.expect("tree");
        assert_eq!(tree.root().usings.len(), 1);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].severity, LoadSeverity::Warning);
    }

    #[test]
    fn unbalanced_braces_produce_no_tree() {
        let outcome = parse("namespace Foo {\n using A;\n");
        assert!(outcome.tree.is_none());
        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(!outcome.diagnostics[0].is_failure());
        assert!(outcome.diagnostics[0].to_string().contains("Test.cs"));
    }

    #[test]
    fn stray_closing_brace_is_an_error() {
        assert!(parse("using A;\n}\n").tree.is_none());
    }
}
