//! Overload resolution.
//!
//! Candidates are grouped in priority tiers: local functions, members of the
//! receiver, then everything else visible from the scope chain (innermost
//! scope first). The first tier with an applicable candidate decides the
//! call; specificity ranking only compares candidates within it.

use crate::context::{CheckerState, TypingContext};
use crate::data_flow::smart_cast_variants;
use crate::diagnostics::PendingDiagnostic;
use crate::error::AnalysisError;
use crate::receiver::ReceiverValue;
use crate::receiver_resolver::{ReceiverMatch, find_dispatch_receiver_match, find_extension_receiver_match};
use crate::resolved_call::{OverloadResolutionResults, ResolvedCall};
use crate::trace::{BindingTrace, BindingTraceExt, Slice, TraceKey, TraceValue};
use ksc_binder::{CallableDescriptor, DeclId};
use ksc_common::diagnostics::diagnostic_codes;
use ksc_common::interner::Atom;
use ksc_solver::{
    ConstraintPosition, ConstraintSystem, ConstraintSystemImpl, DefId, TypeFormatter, TypeId, TypeInterner,
    TypeSubstitution, type_queries,
};
use ksc_syntax::{CallKind, NodeIndex, NodeKind};
use std::sync::Arc;
use tracing::{debug, trace};

/// A call as the resolver sees it, real or synthetic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallDescription {
    /// Element results are keyed by and diagnostics reported on.
    pub call_element: NodeIndex,
    pub explicit_receiver: ReceiverValue,
    pub call_kind: CallKind,
    pub value_arguments: Vec<NodeIndex>,
}

impl CallDescription {
    pub fn new(call_element: NodeIndex, explicit_receiver: ReceiverValue, value_arguments: Vec<NodeIndex>) -> Self {
        CallDescription {
            call_element,
            explicit_receiver,
            call_kind: CallKind::Normal,
            value_arguments,
        }
    }

    #[must_use]
    pub fn with_call_kind(mut self, call_kind: CallKind) -> Self {
        self.call_kind = call_kind;
        self
    }
}

#[derive(Clone, Debug)]
struct ApplicableCandidate {
    decl: DeclId,
    descriptor: CallableDescriptor,
    receiver: ReceiverMatch,
}

impl<'a> CheckerState<'a> {
    #[tracing::instrument(level = "debug", skip_all, fields(name = %self.ctx.types.resolve_name(name)))]
    pub fn resolve_call_with_given_name(
        &mut self,
        trace: &mut dyn BindingTrace,
        typing: &TypingContext,
        call: &CallDescription,
        name: Atom,
    ) -> Result<OverloadResolutionResults, AnalysisError> {
        let tiers = self.candidate_tiers(&*trace, typing, &call.explicit_receiver, name);
        let mut inapplicable = Vec::new();
        for tier in tiers {
            let mut applicable = Vec::new();
            for decl in tier {
                match self.check_candidate(&*trace, typing, call, decl) {
                    Some(candidate) => applicable.push(candidate),
                    None => inapplicable.push(decl),
                }
            }
            if applicable.is_empty() {
                continue;
            }
            debug!(applicable = applicable.len(), "tier has applicable candidates");
            let results = match self.choose_most_specific(applicable) {
                Ok(winner) => self.complete_call(trace, typing, call, winner)?,
                Err(tied) => OverloadResolutionResults::Ambiguous(
                    tied.into_iter()
                        .map(|candidate| Arc::new(self.uncompleted_call(call, candidate)))
                        .collect(),
                ),
            };
            self.report_resolution_failure(trace, call.call_element, name, &results);
            return Ok(results);
        }
        let results = OverloadResolutionResults::Missing { inapplicable };
        self.report_resolution_failure(trace, call.call_element, name, &results);
        Ok(results)
    }

    /// `[local, members, other]` candidates named `name`.
    fn candidate_tiers(
        &self,
        trace: &dyn BindingTrace,
        typing: &TypingContext,
        receiver: &ReceiverValue,
        name: Atom,
    ) -> [Vec<DeclId>; 3] {
        let binder = &*self.ctx.binder;
        let mut local = Vec::new();
        let mut non_local = Vec::new();
        for scope in binder.scope_chain(typing.scope) {
            let Some(scope) = binder.scope(scope) else {
                continue;
            };
            for &decl in scope.functions_named(name) {
                if binder.is_declared_in_function(decl) {
                    local.push(decl);
                } else {
                    non_local.push(decl);
                }
            }
        }
        let members = if receiver.exists() {
            self.member_candidates(trace, typing, receiver, name)
        } else {
            Vec::new()
        };
        trace!(
            local = local.len(),
            members = members.len(),
            non_local = non_local.len(),
            "candidate tiers"
        );
        [local, members, non_local]
    }

    /// Members named `name` of every class the receiver may be an instance
    /// of, including supertypes and `Any`.
    fn member_candidates(
        &self,
        trace: &dyn BindingTrace,
        typing: &TypingContext,
        receiver: &ReceiverValue,
        name: Atom,
    ) -> Vec<DeclId> {
        let db = self.ctx.types;
        let mut defs: Vec<DefId> = Vec::new();
        let mut worklist: Vec<TypeId> = smart_cast_variants(&*self.ctx.binder, trace, receiver, &typing.data_flow)
            .into_iter()
            .collect();
        while let Some(ty) = worklist.pop() {
            if let Some(def) = type_queries::class_def(db, ty) {
                if defs.contains(&def) {
                    continue;
                }
                defs.push(def);
                if let Some(info) = db.class_info(def) {
                    worklist.extend(info.supertypes);
                }
            } else if let Some(param) = type_queries::type_param_of(db, ty)
                && let Some(info) = db.type_param_info(param)
            {
                worklist.extend(info.upper_bounds);
            }
        }
        if !defs.contains(&DefId::ANY) {
            defs.push(DefId::ANY);
        }
        defs.into_iter()
            .flat_map(|def| self.ctx.binder.members_named(def, name))
            .collect()
    }

    fn check_candidate(
        &self,
        trace: &dyn BindingTrace,
        typing: &TypingContext,
        call: &CallDescription,
        decl: DeclId,
    ) -> Option<ApplicableCandidate> {
        let db = self.ctx.types;
        let descriptor = self.ctx.binder.callable(decl)?.clone();
        let arity_ok = if descriptor.is_property() {
            call.value_arguments.is_empty()
        } else {
            descriptor.value_params.len() == call.value_arguments.len()
        };
        if !arity_ok {
            trace!(decl = decl.0, "arity mismatch");
            return None;
        }

        let is_infix = call.call_kind == CallKind::Infix;
        let receiver = if descriptor.dispatch_receiver.is_some() {
            if is_infix && !(descriptor.is_simple_function() && descriptor.value_params.len() == 1) {
                return None;
            }
            find_dispatch_receiver_match(
                db,
                &*self.ctx.binder,
                trace,
                &call.explicit_receiver,
                &descriptor,
                &typing.data_flow,
            )?
        } else {
            find_extension_receiver_match(
                db,
                &*self.ctx.binder,
                trace,
                &call.explicit_receiver,
                &descriptor,
                is_infix,
                &typing.data_flow,
            )?
        };

        if !self.function_literals_fit(trace, call, &descriptor) {
            trace!(decl = decl.0, "function literal passed for a non-function parameter");
            return None;
        }
        let mut system = self.build_constraint_system(trace, call, &descriptor, &receiver);
        if system.status().has_contradiction() || !system.check_bounds_satisfied(true) {
            trace!(decl = decl.0, "argument constraints fail");
            return None;
        }
        Some(ApplicableCandidate {
            decl,
            descriptor,
            receiver,
        })
    }

    /// Function literals not typed yet are analyzed after resolution; they
    /// fit parameters of function type or of a type-parameter type.
    fn function_literals_fit(
        &self,
        trace: &dyn BindingTrace,
        call: &CallDescription,
        descriptor: &CallableDescriptor,
    ) -> bool {
        let db = self.ctx.types;
        call.value_arguments
            .iter()
            .zip(&descriptor.value_params)
            .filter(|&(&argument, _)| self.is_pending_function_literal(trace, argument))
            .all(|(_, param)| {
                type_queries::class_def(db, param.ty) == Some(DefId::FUNCTION)
                    || type_queries::type_param_of(db, param.ty).is_some()
            })
    }

    fn is_pending_function_literal(&self, trace: &dyn BindingTrace, argument: NodeIndex) -> bool {
        self.ctx.arena.kind(argument) == Some(NodeKind::FunctionLiteralExpression)
            && trace.expression_type(argument).is_none()
    }

    fn build_constraint_system(
        &self,
        trace: &dyn BindingTrace,
        call: &CallDescription,
        descriptor: &CallableDescriptor,
        receiver: &ReceiverMatch,
    ) -> ConstraintSystemImpl<'a> {
        let db: &'a TypeInterner = self.ctx.types;
        let mut system = ConstraintSystemImpl::new(db);
        system.register_type_variables(&descriptor.type_params);
        let declared_receiver = descriptor.extension_receiver.or(descriptor.dispatch_receiver);
        if let (Some(actual), Some(declared)) = (receiver.receiver_type, declared_receiver) {
            system.add_subtype_constraint(actual, declared, ConstraintPosition::Receiver);
        }
        for (index, (&argument, param)) in call.value_arguments.iter().zip(&descriptor.value_params).enumerate() {
            if self.is_pending_function_literal(trace, argument) {
                continue;
            }
            let argument_type = trace.expression_type(argument).unwrap_or(TypeId::ERROR);
            system.add_subtype_constraint(
                argument_type,
                param.ty,
                ConstraintPosition::ValueParameter(index as u32),
            );
        }
        system
    }

    /// The single most specific candidate, or all of them when none is.
    fn choose_most_specific(
        &self,
        mut candidates: Vec<ApplicableCandidate>,
    ) -> Result<ApplicableCandidate, Vec<ApplicableCandidate>> {
        if candidates.len() == 1 {
            return Ok(candidates.remove(0));
        }
        let winner = (0..candidates.len()).find(|&i| {
            (0..candidates.len()).all(|j| i == j || self.is_strictly_more_specific(&candidates[i], &candidates[j]))
        });
        match winner {
            Some(index) => Ok(candidates.swap_remove(index)),
            None => {
                debug!(candidates = candidates.len(), "no most specific candidate");
                Err(candidates)
            }
        }
    }

    fn is_strictly_more_specific(&self, a: &ApplicableCandidate, b: &ApplicableCandidate) -> bool {
        if a.receiver.widened != b.receiver.widened {
            return !a.receiver.widened;
        }
        self.is_not_less_specific(&a.descriptor, &b.descriptor)
            && !self.is_not_less_specific(&b.descriptor, &a.descriptor)
    }

    /// Whether every call `a` accepts is also accepted by `b`.
    fn is_not_less_specific(&self, a: &CallableDescriptor, b: &CallableDescriptor) -> bool {
        let mut system = ConstraintSystemImpl::new(self.ctx.types);
        system.register_type_variables(&b.type_params);
        for (index, (pa, pb)) in a.value_params.iter().zip(&b.value_params).enumerate() {
            system.add_subtype_constraint(pa.ty, pb.ty, ConstraintPosition::ValueParameter(index as u32));
        }
        if let (Some(ra), Some(rb)) = (a.extension_receiver, b.extension_receiver) {
            system.add_subtype_constraint(ra, rb, ConstraintPosition::Receiver);
        }
        !system.status().has_contradiction()
    }

    /// Infer type arguments for the chosen candidate and bind the call.
    fn complete_call(
        &mut self,
        trace: &mut dyn BindingTrace,
        typing: &TypingContext,
        call: &CallDescription,
        winner: ApplicableCandidate,
    ) -> Result<OverloadResolutionResults, AnalysisError> {
        let db = self.ctx.types;
        let mut system = self.build_constraint_system(&*trace, call, &winner.descriptor, &winner.receiver);
        let expected = typing
            .expected_type
            .as_type()
            .filter(|_| !winner.descriptor.type_params.is_empty());
        if let Some(expected) = expected {
            let mut constrained = self.build_constraint_system(&*trace, call, &winner.descriptor, &winner.receiver);
            constrained.add_subtype_constraint(
                winner.descriptor.return_type,
                expected,
                ConstraintPosition::ExpectedType,
            );
            if constrained.status().has_contradiction() {
                debug!("expected type constraint dropped");
            } else {
                system = constrained;
            }
        }

        let status = system.status();
        let mut substitution = system.resulting_substitution();
        for &param in status.unknown_parameters() {
            let param_name = db
                .type_param_info(param)
                .map(|info| db.resolve_name(info.name))
                .unwrap_or_else(|| "?".into());
            substitution.insert(param, db.error_type(&format!("Cannot infer type parameter {param_name}")));
        }
        let resulting_descriptor = winner.descriptor.substitute(db, &substitution);
        let resolved = Arc::new(ResolvedCall {
            call_element: call.call_element,
            candidate: winner.decl,
            candidate_descriptor: winner.descriptor,
            resulting_descriptor,
            substitution,
            explicit_receiver: call.explicit_receiver.clone(),
            call_kind: call.call_kind,
            receiver_widened: winner.receiver.widened,
            value_arguments: call.value_arguments.clone(),
        });

        let key = TraceKey::Node(call.call_element);
        trace.record(Slice::ResolvedCall, key, TraceValue::ResolvedCall(resolved.clone()))?;
        trace.record(Slice::ReferenceTarget, key, TraceValue::Decl(winner.decl))?;

        if status.has_unknown_parameters() {
            debug!(unknown = status.unknown_parameters().len(), "type inference incomplete");
            return Ok(OverloadResolutionResults::Error(resolved));
        }

        if winner.receiver.widened
            && call.call_kind != CallKind::Safe
            && !call.call_element.is_synthetic()
            && self.ctx.options.report_unsafe_calls
        {
            let receiver_type = call.explicit_receiver.ty().unwrap_or(TypeId::ERROR);
            trace.report(PendingDiagnostic::new(
                diagnostic_codes::UNSAFE_CALL,
                call.call_element,
                vec![receiver_type.into()],
            ));
        }
        Ok(OverloadResolutionResults::Success(resolved))
    }

    fn uncompleted_call(&self, call: &CallDescription, candidate: ApplicableCandidate) -> ResolvedCall {
        ResolvedCall {
            call_element: call.call_element,
            candidate: candidate.decl,
            resulting_descriptor: candidate.descriptor.clone(),
            candidate_descriptor: candidate.descriptor,
            substitution: TypeSubstitution::new(),
            explicit_receiver: call.explicit_receiver.clone(),
            call_kind: call.call_kind,
            receiver_widened: candidate.receiver.widened,
            value_arguments: call.value_arguments.clone(),
        }
    }

    /// Report an unsuccessful outcome on `node`. Successes report nothing.
    pub(crate) fn report_resolution_failure(
        &self,
        trace: &mut dyn BindingTrace,
        node: NodeIndex,
        name: Atom,
        results: &OverloadResolutionResults,
    ) {
        let diagnostic = match results {
            OverloadResolutionResults::Success(_) => return,
            OverloadResolutionResults::Ambiguous(calls) => self.with_candidate_locations(
                PendingDiagnostic::new(
                    diagnostic_codes::OVERLOAD_RESOLUTION_AMBIGUITY,
                    node,
                    vec![self.render_candidates(calls.iter().map(|call| &call.candidate_descriptor)).into()],
                ),
                calls,
            ),
            OverloadResolutionResults::Missing { inapplicable } if inapplicable.is_empty() => {
                PendingDiagnostic::new(diagnostic_codes::UNRESOLVED_REFERENCE, node, vec![name.into()])
            }
            OverloadResolutionResults::Missing { inapplicable } => {
                let descriptors = inapplicable
                    .iter()
                    .filter_map(|&decl| self.ctx.binder.callable(decl));
                PendingDiagnostic::new(
                    diagnostic_codes::NONE_APPLICABLE,
                    node,
                    vec![self.render_candidates(descriptors).into()],
                )
            }
            OverloadResolutionResults::Error(_) => {
                PendingDiagnostic::new(diagnostic_codes::TYPE_INFERENCE_FAILED, node, vec![name.into()])
            }
        };
        trace.report(diagnostic);
    }

    /// `a, b, c` list of every candidate signature.
    pub fn render_candidates<'d>(&self, descriptors: impl Iterator<Item = &'d CallableDescriptor>) -> String {
        descriptors
            .map(|descriptor| self.render_callable(descriptor))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Point the diagnostic at the declaration of each candidate that has
    /// one in the tree.
    pub(crate) fn with_candidate_locations(
        &self,
        mut diagnostic: PendingDiagnostic,
        calls: &[Arc<ResolvedCall>],
    ) -> PendingDiagnostic {
        for call in calls {
            let node = self.ctx.binder.source_node(call.candidate);
            if node.is_some() {
                diagnostic = diagnostic.with_related(node);
            }
        }
        diagnostic
    }

    /// `Receiver.name(p: T): R`, or `Receiver.name: R` for properties.
    pub fn render_callable(&self, descriptor: &CallableDescriptor) -> String {
        let db = self.ctx.types;
        let formatter = TypeFormatter::new(db);
        let mut out = String::new();
        if let Some(receiver) = descriptor.extension_receiver.or(descriptor.dispatch_receiver) {
            out.push_str(&formatter.format(receiver));
            out.push('.');
        }
        out.push_str(&db.resolve_name(descriptor.name));
        if !descriptor.is_property() {
            let params: Vec<String> = descriptor
                .value_params
                .iter()
                .map(|param| format!("{}: {}", db.resolve_name(param.name), formatter.format(param.ty)))
                .collect();
            out.push('(');
            out.push_str(&params.join(", "));
            out.push(')');
        }
        out.push_str(": ");
        out.push_str(&formatter.format(descriptor.return_type));
        out
    }
}
