//! Scope discovery over a syntax tree.
//!
//! A scope is the file itself or any namespace declaration. Each scope lists
//! only the import directives declared directly in it; directives of nested
//! namespaces belong to the nested scope.

use serde::Serialize;

use crate::syntax::{NamespaceDecl, SyntaxTree, TextSpan, UsingDirective};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    File,
    NestedNamespace,
}

/// One import directive as the ordering rule sees it.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ImportDirective {
    /// Imported path with whitespace removed. For aliases this is the target,
    /// for `using static` the type name.
    pub sort_key: String,
    pub span: TextSpan,
    pub is_alias: bool,
    /// `global using`; these must precede every non-global directive.
    pub is_global: bool,
}

impl From<&UsingDirective> for ImportDirective {
    fn from(using: &UsingDirective) -> Self {
        Self {
            sort_key: using.name.clone(),
            span: using.span,
            is_alias: using.is_alias(),
            is_global: using.is_global,
        }
    }
}

/// A region holding its own block of directives, in source order.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Scope {
    pub kind: ScopeKind,
    /// Namespace name, `None` for the file scope.
    pub name: Option<String>,
    pub span: TextSpan,
    pub directives: Vec<ImportDirective>,
}

impl Scope {
    /// Span from the first directive's start to the last directive's end.
    #[must_use]
    pub fn directive_block(&self) -> Option<TextSpan> {
        let first = self.directives.first()?;
        let last = self.directives.last()?;
        Some(TextSpan::cover(first.span, last.span))
    }
}

/// Yields every scope of a tree. Stateless; safe to share.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeWalker;

impl ScopeWalker {
    /// Every scope in `tree`: the file scope first, then namespaces
    /// top-down. Sibling order is not guaranteed.
    #[must_use]
    pub fn scopes(self, tree: &SyntaxTree) -> Vec<Scope> {
        let root = tree.root();
        let mut scopes = vec![Scope {
            kind: ScopeKind::File,
            name: None,
            span: root.span,
            directives: root.usings.iter().map(ImportDirective::from).collect(),
        }];

        // Explicit worklist keeps deeply nested files off the call stack.
        let mut pending: Vec<&NamespaceDecl> = root.namespaces.iter().rev().collect();
        while let Some(ns) = pending.pop() {
            scopes.push(Scope {
                kind: ScopeKind::NestedNamespace,
                name: Some(ns.name.clone()),
                span: ns.span,
                directives: ns.usings.iter().map(ImportDirective::from).collect(),
            });
            pending.extend(ns.namespaces.iter().rev());
        }
        scopes
    }
}
