//! Checker state and the per-expression typing context.

use crate::data_flow::DataFlowInfo;
use crate::error::AnalysisError;
use crate::options::CheckerOptions;
use crate::receiver::{ExpectedType, ReceiverValue};
use ksc_binder::{BinderState, ScopeId};
use ksc_solver::TypeInterner;
use ksc_syntax::{NodeArena, NodeIndex};

/// Shared inputs of one checking session.
pub struct CheckerContext<'a> {
    pub arena: &'a NodeArena,
    pub types: &'a TypeInterner,
    /// Scopes grow while checking: destructured variables and function
    /// literals are declared as they are reached.
    pub binder: &'a mut BinderState,
    pub options: CheckerOptions,
}

/// Where an expression is being typed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypingContext {
    pub scope: ScopeId,
    pub expected_type: ExpectedType,
    pub data_flow: DataFlowInfo,
    /// Receiver `this` refers to, if any.
    pub this_receiver: Option<ReceiverValue>,
}

impl TypingContext {
    pub fn new(scope: ScopeId) -> Self {
        TypingContext {
            scope,
            expected_type: ExpectedType::NoExpectedType,
            data_flow: DataFlowInfo::empty(),
            this_receiver: None,
        }
    }

    #[must_use]
    pub fn replace_scope(&self, scope: ScopeId) -> Self {
        TypingContext { scope, ..self.clone() }
    }

    #[must_use]
    pub fn replace_expected_type(&self, expected_type: impl Into<ExpectedType>) -> Self {
        TypingContext {
            expected_type: expected_type.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn replace_data_flow(&self, data_flow: DataFlowInfo) -> Self {
        TypingContext {
            data_flow,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_this_receiver(&self, receiver: ReceiverValue) -> Self {
        TypingContext {
            this_receiver: Some(receiver),
            ..self.clone()
        }
    }
}

pub struct CheckerState<'a> {
    pub ctx: CheckerContext<'a>,
    /// Counter for synthetic placeholder nodes.
    pub(crate) next_synthetic: u32,
    /// Current expression nesting.
    pub(crate) depth: u32,
}

impl<'a> CheckerState<'a> {
    pub fn new(
        arena: &'a NodeArena,
        types: &'a TypeInterner,
        binder: &'a mut BinderState,
        options: CheckerOptions,
    ) -> Self {
        CheckerState {
            ctx: CheckerContext {
                arena,
                types,
                binder,
                options,
            },
            next_synthetic: 0,
            depth: 0,
        }
    }

    /// A fresh synthetic node, distinct from every arena node and from
    /// every placeholder handed out before.
    pub fn next_placeholder(&mut self) -> Result<NodeIndex, AnalysisError> {
        let n = self.next_synthetic;
        if n > NodeIndex::MAX_SYNTHETIC {
            return Err(AnalysisError::PlaceholdersExhausted);
        }
        self.next_synthetic = n
            .checked_add(1)
            .ok_or(AnalysisError::PlaceholdersExhausted)?;
        Ok(NodeIndex::synthetic(n))
    }
}
