//! Access paths and the diagnostics tree produced by a failed validation.

use std::fmt::{self, Write};

use serde::Serialize;

/// Escape a JSON Pointer (RFC 6901) reference token (`~` -> `~0`, `/` -> `~1`).
pub(crate) fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Undo [`escape_token`].
pub(crate) fn unescape_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathElement<'v> {
    Name(&'v str),
    Index(usize),
}

/// Position in the data tree, pushed and popped around each descent.
#[derive(Debug, Default)]
pub struct AccessPath<'v> {
    elements: Vec<PathElement<'v>>,
}

impl<'v> AccessPath<'v> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_name(&mut self, name: &'v str) {
        self.elements.push(PathElement::Name(name));
    }

    pub fn push_index(&mut self, index: usize) {
        self.elements.push(PathElement::Index(index));
    }

    pub fn pop(&mut self) {
        self.elements.pop();
    }

    pub fn depth(&self) -> usize {
        self.elements.len()
    }
}

impl fmt::Display for AccessPath<'_> {
    /// JSON Pointer rendering; the empty string is the document root.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in &self.elements {
            match element {
                PathElement::Name(name) => write!(f, "/{}", escape_token(name))?,
                PathElement::Index(index) => write!(f, "/{index}")?,
            }
        }
        Ok(())
    }
}

/// Whether a diagnostic describes bad data or a broken schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    /// The value violates a constraint.
    Invalid,
    /// The schema could not be applied (unresolvable `$ref`, invalid
    /// pattern, depth limit).
    Internal,
}

/// One node of the diagnostics tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// JSON Pointer (RFC 6901) to the rejected value.
    pub path: String,
    /// Human-readable message.
    pub message: String,
    pub kind: DiagnosticKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Diagnostic>,
}

impl Diagnostic {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind: DiagnosticKind::Invalid,
            children: Vec::new(),
        }
    }

    pub fn internal(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Internal,
            ..Self::new(path, message)
        }
    }

    pub fn with_children(mut self, children: Vec<Diagnostic>) -> Self {
        self.children = children;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// True if this node or any descendant is an internal failure.
    pub fn has_internal_errors(&self) -> bool {
        self.kind == DiagnosticKind::Internal
            || self.children.iter().any(Diagnostic::has_internal_errors)
    }

    /// Leaf diagnostics in depth-first order.
    pub fn leaves(&self) -> Vec<&Diagnostic> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a Diagnostic>) {
        if self.is_leaf() {
            leaves.push(self);
        }
        for child in &self.children {
            child.collect_leaves(leaves);
        }
    }

    /// Render the tree one node per line, indented two spaces per level.
    pub fn render(&self, indent: usize) -> String {
        let mut out = String::new();
        self.render_into(&mut out, indent);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        let location = if self.path.is_empty() {
            "(root)"
        } else {
            self.path.as_str()
        };
        let _ = writeln!(out, "{:width$}{}: {}", "", location, self.message, width = depth * 2);
        for child in &self.children {
            child.render_into(out, depth + 1);
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.render(0).trim_end())
    }
}
