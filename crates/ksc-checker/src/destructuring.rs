//! `val (a, b) = x` declarations.
//!
//! Entry `i` (1-based) is bound to the result of the fake call
//! `x.component{i}()`; failures are reported on the initializer and leave
//! the variable with an error type.

use crate::context::{CheckerState, TypingContext};
use crate::diagnostics::PendingDiagnostic;
use crate::error::AnalysisError;
use crate::fake_calls::FailureReport;
use crate::receiver::{ExpectedType, ReceiverValue};
use crate::resolved_call::OverloadResolutionResults;
use crate::trace::{BindingTrace, Slice, TraceKey, TraceValue};
use ksc_binder::{DeclId, ScopeId};
use ksc_common::diagnostics::diagnostic_codes;
use ksc_solver::{TypeId, is_subtype_of, type_queries};
use ksc_syntax::{NodeData, NodeIndex};
use tracing::debug;

impl CheckerState<'_> {
    /// Declare one variable per entry of `multi_declaration` in
    /// `writable_scope`, in entry order.
    #[tracing::instrument(level = "debug", skip_all, fields(node = multi_declaration.0))]
    pub fn define_local_variables_from_multi_declaration(
        &mut self,
        trace: &mut dyn BindingTrace,
        typing: &TypingContext,
        writable_scope: ScopeId,
        multi_declaration: NodeIndex,
        receiver: ReceiverValue,
        report_errors_on: NodeIndex,
    ) -> Result<Vec<DeclId>, AnalysisError> {
        let arena = self.ctx.arena;
        let db = self.ctx.types;
        let declaration = arena
            .get_multi_declaration(multi_declaration)
            .ok_or(AnalysisError::MalformedTree {
                node: multi_declaration,
                reason: "expected a multi-declaration",
            })?;

        let mut variables = Vec::with_capacity(declaration.entries.len());
        for (index, &entry) in declaration.entries.iter().enumerate() {
            let Some(NodeData::MultiDeclarationEntry { name, type_reference }) =
                arena.get(entry).map(|node| &node.data)
            else {
                return Err(AnalysisError::MalformedTree {
                    node: entry,
                    reason: "expected a multi-declaration entry",
                });
            };
            let component_name = db.name(&format!("component{}", index + 1));
            let expected = match type_reference.into_option() {
                Some(reference) => Some(self.resolve_type_reference(trace, reference)?),
                None => None,
            };

            let results = self.resolve_fake_call(
                trace,
                &typing.replace_expected_type(ExpectedType::from(expected)),
                receiver.clone(),
                component_name,
                Vec::new(),
                FailureReport::Silent,
            )?;

            let component_type = match &results {
                OverloadResolutionResults::Success(call) => {
                    trace.record(
                        Slice::ComponentResolvedCall,
                        TraceKey::Node(entry),
                        TraceValue::ResolvedCall(call.clone()),
                    )?;
                    let return_type = call.resulting_descriptor.return_type;
                    if let Some(expected) = expected
                        && !type_queries::contains_error(db, expected)
                        && !is_subtype_of(db, return_type, expected)
                    {
                        trace.report(PendingDiagnostic::new(
                            diagnostic_codes::COMPONENT_FUNCTION_RETURN_TYPE_MISMATCH,
                            report_errors_on,
                            vec![component_name.into(), return_type.into(), expected.into()],
                        ));
                    }
                    Some(return_type)
                }
                OverloadResolutionResults::Ambiguous(calls) => {
                    let candidates = self.render_candidates(calls.iter().map(|call| &call.candidate_descriptor));
                    let diagnostic = PendingDiagnostic::new(
                        diagnostic_codes::COMPONENT_FUNCTION_AMBIGUITY,
                        report_errors_on,
                        vec![component_name.into(), candidates.into()],
                    );
                    trace.report(self.with_candidate_locations(diagnostic, calls));
                    None
                }
                OverloadResolutionResults::Missing { .. } | OverloadResolutionResults::Error(_) => {
                    let receiver_type = receiver.ty().unwrap_or(TypeId::ERROR);
                    trace.report(PendingDiagnostic::new(
                        diagnostic_codes::COMPONENT_FUNCTION_MISSING,
                        report_errors_on,
                        vec![component_name.into(), receiver_type.into()],
                    ));
                    None
                }
            };
            let component_type = component_type.unwrap_or_else(|| {
                let text = db.resolve_name(component_name);
                db.error_type(&format!("{text}() return type"))
            });
            let variable_type = expected.unwrap_or(component_type);
            debug!(entry = entry.0, ty = variable_type.0, "destructured variable");

            let variable = self
                .ctx
                .binder
                .create_local_variable(writable_scope, *name, variable_type, entry);
            trace.record(Slice::Variable, TraceKey::Node(entry), TraceValue::Decl(variable))?;
            let older = self.ctx.binder.lookup_variable(writable_scope, *name);
            self.check_variable_shadowing(trace, variable, older);
            self.ctx.binder.add_variable_to_scope(writable_scope, variable);
            variables.push(variable);
        }
        Ok(variables)
    }

    /// Warn when `variable` hides `older` and `older` is a local of a
    /// function enclosing the new variable, or a value parameter.
    pub fn check_variable_shadowing(&self, trace: &mut dyn BindingTrace, variable: DeclId, older: Option<DeclId>) {
        if !self.ctx.options.report_name_shadowing {
            return;
        }
        let Some(older) = older else {
            return;
        };
        let binder = &*self.ctx.binder;
        if !binder.is_local(binder.container_of(variable), older) {
            return;
        }
        let node = binder.source_node(variable);
        let Some(name) = binder.declaration(variable).and_then(|decl| decl.name()) else {
            return;
        };
        if node.is_some() {
            trace.report(PendingDiagnostic::new(
                diagnostic_codes::NAME_SHADOWING,
                node,
                vec![name.into()],
            ));
        }
    }
}
