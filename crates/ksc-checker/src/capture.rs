//! Classification of variables captured by function literals.
//!
//! A capture is `InlineOnly` when every literal between the use and the
//! variable's owner is passed directly to an inline function; such captures
//! need no closure object. Anything else is `NotInline`.

use crate::context::CheckerState;
use crate::error::AnalysisError;
use crate::resolved_call::ResolvedCall;
use crate::trace::{BindingTrace, BindingTraceExt, Slice, TraceKey, TraceValue};
use ksc_binder::{DeclId, DeclKind, ScopeId};
use ksc_syntax::{NodeIndex, NodeKind};
use std::sync::Arc;
use tracing::trace;

/// Ordered: a recorded kind only ever moves up.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CaptureKind {
    #[default]
    NotCaptured,
    InlineOnly,
    NotInline,
}

impl CheckerState<'_> {
    /// Record how the variable `expression` refers to is captured when used
    /// from `scope`. Does nothing for non-variables and uses in the
    /// variable's own body.
    pub fn check_capturing_in_closure(
        &self,
        trace: &mut dyn BindingTrace,
        expression: NodeIndex,
        scope: ScopeId,
    ) -> Result<(), AnalysisError> {
        let binder = &*self.ctx.binder;
        let Some(variable) = trace.reference_target(expression) else {
            return Ok(());
        };
        if !matches!(
            binder.kind(variable),
            Some(DeclKind::LocalVariable | DeclKind::ValueParameter)
        ) {
            return Ok(());
        }
        let variable_parent = binder.container_of(variable);
        let scope_container = binder.scope_container(scope);
        if scope_container == variable_parent || !binder.is_callable(variable_parent) {
            return Ok(());
        }
        if trace.captured_in_closure(variable) == Some(CaptureKind::NotInline) {
            return Ok(());
        }
        let inline = self.is_captured_in_inline(&*trace, scope_container, variable_parent, 0)?;
        let kind = if inline {
            CaptureKind::InlineOnly
        } else {
            CaptureKind::NotInline
        };
        trace!(variable = variable.0, ?kind, "variable captured in closure");
        trace.record(Slice::CapturedInClosure, TraceKey::Decl(variable), TraceValue::Capture(kind))?;
        Ok(())
    }

    /// Recorded capture kind of `variable`.
    pub fn capture_kind(&self, trace: &dyn BindingTrace, variable: DeclId) -> CaptureKind {
        trace.captured_in_closure(variable).unwrap_or_default()
    }

    fn is_captured_in_inline(
        &self,
        trace: &dyn BindingTrace,
        scope_container: DeclId,
        variable_parent: DeclId,
        depth: u32,
    ) -> Result<bool, AnalysisError> {
        let binder = &*self.ctx.binder;
        let arena = self.ctx.arena;
        if depth >= self.ctx.options.max_capture_depth {
            trace!(depth, "capture chain too deep, treating as not inline");
            return Ok(false);
        }
        if binder.kind(scope_container) != Some(DeclKind::FunctionLiteral) {
            return Ok(false);
        }
        let literal = binder.source_node(scope_container);
        let expression = arena.parent(literal);
        if arena.kind(expression) != Some(NodeKind::FunctionLiteralExpression) {
            return Err(AnalysisError::FunctionLiteralWithoutExpression {
                literal,
                parent: arena.kind(expression),
            });
        }
        let Some(call) = self.parent_resolved_call(trace, expression) else {
            return Ok(false);
        };
        let callee = &call.resulting_descriptor;
        if !(callee.is_simple_function() && callee.inline_strategy.is_inline()) {
            return Ok(false);
        }
        let outer = binder.container_of(scope_container);
        if outer.is_none() {
            return Err(AnalysisError::MissingContainer(scope_container));
        }
        if outer == variable_parent {
            return Ok(true);
        }
        self.is_captured_in_inline(trace, outer, variable_parent, depth + 1)
    }

    /// Resolved call that `argument` is passed to directly.
    fn parent_resolved_call(&self, trace: &dyn BindingTrace, argument: NodeIndex) -> Option<Arc<ResolvedCall>> {
        let call = self.ctx.arena.parent(argument);
        let data = self.ctx.arena.get_call(call)?;
        if !data.arguments.contains(&argument) {
            return None;
        }
        trace.resolved_call(call)
    }
}
