//! Results of call resolution.

use crate::receiver::ReceiverValue;
use ksc_binder::{CallableDescriptor, DeclId};
use ksc_solver::TypeSubstitution;
use ksc_syntax::{CallKind, NodeIndex};
use std::sync::Arc;

/// A call bound to one candidate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedCall {
    /// Element the call is keyed by; synthetic for fake calls.
    pub call_element: NodeIndex,
    pub candidate: DeclId,
    /// Declared signature of the candidate.
    pub candidate_descriptor: CallableDescriptor,
    /// Signature after substituting inferred type arguments.
    pub resulting_descriptor: CallableDescriptor,
    pub substitution: TypeSubstitution,
    pub explicit_receiver: ReceiverValue,
    pub call_kind: CallKind,
    /// The receiver only matched after treating a nullable receiver as
    /// non-null.
    pub receiver_widened: bool,
    pub value_arguments: Vec<NodeIndex>,
}

impl ResolvedCall {
    pub const fn is_safe_call(&self) -> bool {
        matches!(self.call_kind, CallKind::Safe)
    }
}

/// Outcome of resolving one call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverloadResolutionResults {
    Success(Arc<ResolvedCall>),
    /// Several candidates apply and none is most specific.
    Ambiguous(Vec<Arc<ResolvedCall>>),
    /// No applicable candidate. `inapplicable` lists the candidates that
    /// had the right name; it is empty when nothing was found at all.
    Missing { inapplicable: Vec<DeclId> },
    /// One candidate was chosen but its type arguments could not be
    /// inferred; unknown arguments are error types.
    Error(Arc<ResolvedCall>),
}

impl OverloadResolutionResults {
    pub const fn is_success(&self) -> bool {
        matches!(self, OverloadResolutionResults::Success(_))
    }

    pub const fn is_ambiguity(&self) -> bool {
        matches!(self, OverloadResolutionResults::Ambiguous(_))
    }

    pub const fn is_missing(&self) -> bool {
        matches!(self, OverloadResolutionResults::Missing { .. })
    }

    /// The single resulting call of a success or inference error.
    pub fn resulting_call(&self) -> Option<&Arc<ResolvedCall>> {
        match self {
            OverloadResolutionResults::Success(call) | OverloadResolutionResults::Error(call) => Some(call),
            _ => None,
        }
    }

    pub fn resulting_calls(&self) -> &[Arc<ResolvedCall>] {
        match self {
            OverloadResolutionResults::Success(call) | OverloadResolutionResults::Error(call) => {
                std::slice::from_ref(call)
            }
            OverloadResolutionResults::Ambiguous(calls) => calls,
            OverloadResolutionResults::Missing { .. } => &[],
        }
    }

    pub fn resulting_descriptor(&self) -> Option<&CallableDescriptor> {
        self.resulting_call().map(|call| &call.resulting_descriptor)
    }
}
