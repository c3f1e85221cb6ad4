//! Lazily rendered checker diagnostics.
//!
//! Resolution runs speculatively: most diagnostics produced inside a
//! temporary trace are thrown away with it. Diagnostics therefore carry
//! structured arguments and are only turned into text by `render`.

use ksc_common::diagnostics::{Diagnostic, lookup_message};
use ksc_common::interner::Atom;
use ksc_solver::{TypeFormatter, TypeId, TypeInterner};
use ksc_syntax::{NodeArena, NodeIndex};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticArg {
    /// Formatted with `TypeFormatter`.
    Type(TypeId),
    Atom(Atom),
    String(Arc<str>),
    Number(usize),
}

macro_rules! impl_from_diagnostic_arg {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(impl From<$source> for DiagnosticArg {
            fn from(v: $source) -> Self { Self::$variant(v) }
        })*
    };
}

impl_from_diagnostic_arg! {
    TypeId => Type,
    Atom   => Atom,
    usize  => Number,
}

impl From<&str> for DiagnosticArg {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for DiagnosticArg {
    fn from(s: String) -> Self {
        Self::String(s.into())
    }
}

impl DiagnosticArg {
    pub fn render(&self, db: &TypeInterner) -> String {
        match self {
            DiagnosticArg::Type(ty) => TypeFormatter::new(db).format(*ty),
            DiagnosticArg::Atom(atom) => db.resolve_name(*atom).to_string(),
            DiagnosticArg::String(s) => s.to_string(),
            DiagnosticArg::Number(n) => n.to_string(),
        }
    }
}

/// A diagnostic that hasn't been rendered yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingDiagnostic {
    pub code: u32,
    /// Node the diagnostic is reported on.
    pub node: NodeIndex,
    pub args: Vec<DiagnosticArg>,
    /// Additional locations, e.g. the candidates of an ambiguous call.
    pub related: Vec<NodeIndex>,
}

impl PendingDiagnostic {
    pub fn new(code: u32, node: NodeIndex, args: Vec<DiagnosticArg>) -> Self {
        PendingDiagnostic {
            code,
            node,
            args,
            related: Vec::new(),
        }
    }

    pub fn with_related(mut self, node: NodeIndex) -> Self {
        self.related.push(node);
        self
    }

    /// Render against the source file. `None` for codes missing from the
    /// message table.
    pub fn render(&self, db: &TypeInterner, arena: &NodeArena, file: &str) -> Option<Diagnostic> {
        let message = lookup_message(self.code)?;
        let args: Vec<String> = self.args.iter().map(|arg| arg.render(db)).collect();
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let (start, length) = arena.span(self.node);
        let mut diagnostic = Diagnostic::from_message(file.to_string(), start, length, message, &arg_refs);
        for &related in &self.related {
            let (start, length) = arena.span(related);
            diagnostic = diagnostic.with_related(file.to_string(), start, length, "declared here".to_string());
        }
        Some(diagnostic)
    }
}
