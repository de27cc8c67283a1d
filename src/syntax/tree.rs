//! Immutable declaration-level syntax tree.

use super::span::TextSpan;

/// Which form a using directive takes.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum UsingKind {
    /// `using A.B;`
    Namespace,
    /// `using static A.B;`
    Static,
    /// `using X = A.B;`
    Alias { alias: String },
}

/// A single `using` directive.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UsingDirective {
    /// Whole directive, `using` keyword through `;`.
    pub span: TextSpan,
    /// Imported name (the alias target for aliases), whitespace removed.
    pub name: String,
    pub name_span: TextSpan,
    pub kind: UsingKind,
    /// `global using ...`
    pub is_global: bool,
}

impl UsingDirective {
    #[must_use]
    pub const fn is_alias(&self) -> bool {
        matches!(self.kind, UsingKind::Alias { .. })
    }
}

/// A `namespace` declaration, block-scoped or file-scoped.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NamespaceDecl {
    pub name: String,
    /// Whole declaration. For file-scoped namespaces this runs to end of file.
    pub span: TextSpan,
    pub file_scoped: bool,
    pub usings: Vec<UsingDirective>,
    pub namespaces: Vec<NamespaceDecl>,
}

/// Root of a parsed file.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CompilationUnit {
    pub span: TextSpan,
    pub usings: Vec<UsingDirective>,
    pub namespaces: Vec<NamespaceDecl>,
}

/// A parsed document. Never mutated after construction.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SyntaxTree {
    root: CompilationUnit,
}

impl SyntaxTree {
    #[must_use]
    pub const fn new(root: CompilationUnit) -> Self {
        Self { root }
    }

    #[must_use]
    pub const fn root(&self) -> &CompilationUnit {
        &self.root
    }

    /// Every using directive in the file, in source order.
    #[must_use]
    pub fn all_usings(&self) -> Vec<&UsingDirective> {
        fn collect<'t>(namespaces: &'t [NamespaceDecl], out: &mut Vec<&'t UsingDirective>) {
            for ns in namespaces {
                out.extend(ns.usings.iter());
                collect(&ns.namespaces, out);
            }
        }
        let mut out: Vec<&UsingDirective> = self.root.usings.iter().collect();
        collect(&self.root.namespaces, &mut out);
        out.sort_by_key(|u| u.span.start);
        out
    }
}
