//! Hard analysis failures.
//!
//! User errors become diagnostics; `AnalysisError` is reserved for trees and
//! traces that violate the checker's structural assumptions.

use crate::trace::TraceError;
use ksc_binder::DeclId;
use ksc_syntax::{NodeIndex, NodeKind};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Trace(#[from] TraceError),

    #[error("function literal {literal:?} is not wrapped in a function literal expression (parent kind: {parent:?})")]
    FunctionLiteralWithoutExpression {
        literal: NodeIndex,
        parent: Option<NodeKind>,
    },

    #[error("declaration {0:?} has no container")]
    MissingContainer(DeclId),

    #[error("malformed syntax tree at {node:?}: {reason}")]
    MalformedTree { node: NodeIndex, reason: &'static str },

    #[error("expression nesting exceeds {0} levels")]
    DepthExceeded(u32),

    #[error("no synthetic node ids left for placeholders")]
    PlaceholdersExhausted,
}
