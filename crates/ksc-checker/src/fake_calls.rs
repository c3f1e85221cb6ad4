//! Calls the source never spelled out: `componentN()` for destructuring and
//! operator conventions resolved against computed types.
//!
//! A fake call is keyed by a fresh synthetic node. It is resolved in a
//! temporary trace; success merges everything except the entries keyed by
//! that placeholder, failure drops the whole attempt.

use crate::call_resolver::CallDescription;
use crate::context::{CheckerState, TypingContext};
use crate::error::AnalysisError;
use crate::receiver::ReceiverValue;
use crate::resolved_call::OverloadResolutionResults;
use crate::trace::{BindingTrace, BindingTraceExt, Slice, TemporaryTrace, TraceKey, TraceValue};
use ksc_common::interner::Atom;
use ksc_solver::TypeId;
use ksc_syntax::NodeIndex;
use tracing::debug;

/// Where a failed fake call reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FailureReport {
    /// The caller reports its own diagnostic.
    Silent,
    On(NodeIndex),
}

impl CheckerState<'_> {
    /// A placeholder expression whose type is `ty`.
    pub fn create_fake_expression_of_type(
        &mut self,
        trace: &mut dyn BindingTrace,
        ty: TypeId,
    ) -> Result<NodeIndex, AnalysisError> {
        let expression = self.next_placeholder()?;
        trace.record_expression_type(expression, ty)?;
        trace.record(Slice::Processed, TraceKey::Node(expression), TraceValue::Flag)?;
        Ok(expression)
    }

    pub fn resolve_fake_call(
        &mut self,
        trace: &mut dyn BindingTrace,
        typing: &TypingContext,
        receiver: ReceiverValue,
        name: Atom,
        value_arguments: Vec<NodeIndex>,
        report: FailureReport,
    ) -> Result<OverloadResolutionResults, AnalysisError> {
        let placeholder = self.next_placeholder()?;
        let call = CallDescription::new(placeholder, receiver, value_arguments);

        let mut fake_trace = TemporaryTrace::new(trace, "trace to resolve fake call");
        let results = self.resolve_call_with_given_name(&mut fake_trace, typing, &call, name)?;
        if results.is_success() {
            fake_trace.commit_filtered(|_, key| key != TraceKey::Node(placeholder), true)?;
            return Ok(results);
        }
        fake_trace.discard();
        debug!(name = %self.ctx.types.resolve_name(name), "fake call failed");
        if let FailureReport::On(node) = report {
            self.report_resolution_failure(trace, node, name, &results);
        }
        Ok(results)
    }

    /// Resolve `receiver.name(args)` where only the argument types are known.
    /// Argument placeholders live in a trace that is never committed.
    pub fn resolve_fake_call_with_types(
        &mut self,
        trace: &mut dyn BindingTrace,
        typing: &TypingContext,
        receiver: ReceiverValue,
        name: Atom,
        argument_types: &[TypeId],
        report: FailureReport,
    ) -> Result<OverloadResolutionResults, AnalysisError> {
        let mut argument_trace = TemporaryTrace::new(trace, "trace to store fake argument expressions");
        let mut arguments = Vec::with_capacity(argument_types.len());
        for &ty in argument_types {
            arguments.push(self.create_fake_expression_of_type(&mut argument_trace, ty)?);
        }
        let results = self.resolve_fake_call(&mut argument_trace, typing, receiver, name, arguments, FailureReport::Silent)?;
        argument_trace.discard();
        if let FailureReport::On(node) = report
            && !results.is_success()
        {
            self.report_resolution_failure(trace, node, name, &results);
        }
        Ok(results)
    }
}
