use crate::asm_type::AsmType;
use crate::intrinsics::IntrinsicMethod;
use ksc_syntax::{NodeIndex, NodeKind};
use thiserror::Error;

/// Failures while generating code for checked input.
///
/// Well-typed programs never produce these; each variant names a broken
/// precondition of the caller (missing resolution, error types, ...).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CodegenError {
    #[error("call at node {0:?} has no resolved call")]
    UnresolvedCall(NodeIndex),

    #[error("reference at node {0:?} is not bound to a local slot")]
    UnboundLocal(NodeIndex),

    #[error("cannot generate code for {kind:?} at node {node:?}")]
    UnsupportedExpression { node: NodeIndex, kind: Option<NodeKind> },

    #[error("invalid literal `{text}` at node {node:?}")]
    InvalidLiteral { node: NodeIndex, text: String },

    #[error("cannot map error type {0}")]
    ErrorType(String),

    #[error("{intrinsic:?} needs a primitive operand, got {ty}")]
    NonPrimitiveOperand { intrinsic: IntrinsicMethod, ty: AsmType },

    #[error("{intrinsic:?} is missing argument {index}")]
    MissingArgument { intrinsic: IntrinsicMethod, index: usize },

    #[error("call at node {0:?} needs a receiver")]
    MissingReceiver(NodeIndex),

    #[error("{0} is not an array type")]
    NotAnArray(AsmType),

    #[error("{0:?} has no callable form")]
    CallableNotSupported(IntrinsicMethod),
}
