//! Expression typing.
//!
//! Types are cached in the trace: an expression is computed once per trace
//! chain and later queries read `ExpressionType`.

use crate::call_resolver::CallDescription;
use crate::context::{CheckerState, TypingContext};
use crate::diagnostics::PendingDiagnostic;
use crate::error::AnalysisError;
use crate::receiver::{ExpectedType, ReceiverValue};
use crate::trace::{BindingTrace, BindingTraceExt, Slice, TraceKey, TraceValue};
use ksc_binder::{CallableDescriptor, DeclKind};
use ksc_common::diagnostics::diagnostic_codes;
use ksc_common::interner::Atom;
use ksc_solver::{DefId, TypeId, is_subtype_of, type_queries};
use ksc_syntax::{CallKind, LiteralKind, NodeData, NodeIndex, NodeKind};
use tracing::trace;

/// Infix conventions whose result must be `Boolean`.
const BOOLEAN_CONVENTIONS: [&str; 2] = ["contains", "equals"];

impl<'a> CheckerState<'a> {
    pub fn get_type_of_expression(
        &mut self,
        trace: &mut dyn BindingTrace,
        typing: &TypingContext,
        expression: NodeIndex,
    ) -> Result<TypeId, AnalysisError> {
        if let Some(ty) = trace.expression_type(expression) {
            return Ok(ty);
        }
        if self.depth >= self.ctx.options.max_expression_depth {
            return Err(AnalysisError::DepthExceeded(self.ctx.options.max_expression_depth));
        }
        self.depth += 1;
        let result = self.compute_type_of_expression(trace, typing, expression);
        self.depth -= 1;
        let ty = result?;

        if let Some(expected) = typing.expected_type.as_type()
            && self.is_value_expression(expression)
        {
            self.check_type(trace, expression, ty, expected);
        }
        trace.record_expression_type(expression, ty)?;
        trace.record(Slice::Processed, TraceKey::Node(expression), TraceValue::Flag)?;
        Ok(ty)
    }

    /// Type the statements of a body in `scope`; the type of the last one,
    /// or `Unit`.
    pub fn check_statements(
        &mut self,
        trace: &mut dyn BindingTrace,
        typing: &TypingContext,
        statements: &[NodeIndex],
    ) -> Result<TypeId, AnalysisError> {
        let statement_context = typing.replace_expected_type(ExpectedType::NoExpectedType);
        let mut last = TypeId::UNIT;
        for &statement in statements {
            last = self.get_type_of_expression(trace, &statement_context, statement)?;
        }
        Ok(last)
    }

    fn compute_type_of_expression(
        &mut self,
        trace: &mut dyn BindingTrace,
        typing: &TypingContext,
        expression: NodeIndex,
    ) -> Result<TypeId, AnalysisError> {
        let arena = self.ctx.arena;
        let node = arena.get(expression).ok_or(AnalysisError::MalformedTree {
            node: expression,
            reason: "expression is not in the syntax tree",
        })?;
        trace!(node = expression.0, kind = ?node.kind(), "type expression");
        match &node.data {
            NodeData::Literal { kind, .. } => Ok(get_default_type(*kind)),
            NodeData::NameReference { name } => self.check_name_reference(trace, typing, expression, *name),
            NodeData::ThisExpression => self.check_this_expression(trace, typing, expression),
            NodeData::Call(_) => self.check_call_expression(trace, typing, expression),
            NodeData::FunctionLiteralExpression { .. } => self.check_function_literal(trace, typing, expression),
            NodeData::MultiDeclaration(_) => {
                self.check_multi_declaration(trace, typing, expression)?;
                Ok(TypeId::UNIT)
            }
            NodeData::Block { statements } => {
                let container = self.ctx.binder.scope_container(typing.scope);
                let scope = self.ctx.binder.new_scope(typing.scope, container);
                self.check_statements(trace, &typing.replace_scope(scope), statements)
            }
            NodeData::FunctionDeclaration { name, body } => {
                self.check_function_declaration(trace, typing, expression, *name, *body)?;
                Ok(TypeId::UNIT)
            }
            NodeData::FunctionLiteral { .. } | NodeData::MultiDeclarationEntry { .. } | NodeData::TypeReference(_) => {
                Err(AnalysisError::MalformedTree {
                    node: expression,
                    reason: "node is not an expression",
                })
            }
        }
    }

    fn is_value_expression(&self, expression: NodeIndex) -> bool {
        !matches!(
            self.ctx.arena.kind(expression),
            Some(NodeKind::MultiDeclaration | NodeKind::FunctionDeclaration) | None
        )
    }

    /// Report `TYPE_MISMATCH` unless `ty <: expected`. Error types match
    /// anything.
    pub fn check_type(&self, trace: &mut dyn BindingTrace, expression: NodeIndex, ty: TypeId, expected: TypeId) -> bool {
        let db = self.ctx.types;
        if type_queries::contains_error(db, ty) || type_queries::contains_error(db, expected) {
            return true;
        }
        if is_subtype_of(db, ty, expected) {
            return true;
        }
        trace.report(PendingDiagnostic::new(
            diagnostic_codes::TYPE_MISMATCH,
            expression,
            vec![ty.into(), expected.into()],
        ));
        false
    }

    fn check_name_reference(
        &mut self,
        trace: &mut dyn BindingTrace,
        typing: &TypingContext,
        expression: NodeIndex,
        name: Atom,
    ) -> Result<TypeId, AnalysisError> {
        let Some(variable) = self.ctx.binder.lookup_variable(typing.scope, name) else {
            trace.report(PendingDiagnostic::new(
                diagnostic_codes::UNRESOLVED_REFERENCE,
                expression,
                vec![name.into()],
            ));
            let text = self.ctx.types.resolve_name(name);
            return Ok(self.ctx.types.error_type(&format!("Unresolved reference: {text}")));
        };
        trace.record(Slice::ReferenceTarget, TraceKey::Node(expression), TraceValue::Decl(variable))?;
        self.check_capturing_in_closure(trace, expression, typing.scope)?;
        Ok(self
            .ctx
            .binder
            .variable(variable)
            .map_or(TypeId::ERROR, |descriptor| descriptor.ty))
    }

    fn check_this_expression(
        &mut self,
        trace: &mut dyn BindingTrace,
        typing: &TypingContext,
        expression: NodeIndex,
    ) -> Result<TypeId, AnalysisError> {
        let owner_and_type = match &typing.this_receiver {
            Some(ReceiverValue::This { owner, ty } | ReceiverValue::ClassReceiver { class: owner, ty }) => {
                Some((*owner, *ty))
            }
            _ => None,
        };
        let Some((owner, ty)) = owner_and_type else {
            trace.report(PendingDiagnostic::new(
                diagnostic_codes::UNRESOLVED_REFERENCE,
                expression,
                vec!["this".into()],
            ));
            return Ok(self.ctx.types.error_type("'this' is not defined in this context"));
        };
        trace.record(Slice::ReferenceTarget, TraceKey::Node(expression), TraceValue::Decl(owner))?;
        Ok(ty)
    }

    /// A `this` receiver that refers to a class is used as the class
    /// itself; other receivers are returned unchanged.
    pub fn normalize_receiver_value_for_visibility(
        &self,
        trace: &dyn BindingTrace,
        receiver: ReceiverValue,
    ) -> ReceiverValue {
        if let ReceiverValue::Expression { expression, ty } = receiver
            && self.ctx.arena.kind(expression) == Some(NodeKind::ThisExpression)
            && let Some(target) = trace.reference_target(expression)
            && self.ctx.binder.kind(target) == Some(DeclKind::Class)
        {
            return ReceiverValue::ClassReceiver { class: target, ty };
        }
        receiver
    }

    fn check_call_expression(
        &mut self,
        trace: &mut dyn BindingTrace,
        typing: &TypingContext,
        expression: NodeIndex,
    ) -> Result<TypeId, AnalysisError> {
        let db = self.ctx.types;
        let arena = self.ctx.arena;
        let call = arena.get_call(expression).ok_or(AnalysisError::MalformedTree {
            node: expression,
            reason: "call expression without call data",
        })?;
        let unexpected = typing.replace_expected_type(ExpectedType::NoExpectedType);

        let receiver = match call.receiver.into_option() {
            Some(receiver_expression) => {
                let ty = self.get_type_of_expression(trace, &unexpected, receiver_expression)?;
                self.normalize_receiver_value_for_visibility(
                    &*trace,
                    ReceiverValue::Expression {
                        expression: receiver_expression,
                        ty,
                    },
                )
            }
            None => ReceiverValue::NoReceiver,
        };
        for &argument in &call.arguments {
            if arena.kind(argument) != Some(NodeKind::FunctionLiteralExpression) {
                self.get_type_of_expression(trace, &unexpected, argument)?;
            }
        }

        let description = CallDescription::new(expression, receiver.clone(), call.arguments.clone())
            .with_call_kind(call.call_kind);
        let results = self.resolve_call_with_given_name(trace, typing, &description, call.callee)?;

        // Function literals see the resolved call when they are analyzed.
        for &argument in &call.arguments {
            if arena.kind(argument) == Some(NodeKind::FunctionLiteralExpression) {
                self.get_type_of_expression(trace, &unexpected, argument)?;
            }
        }

        let Some(resolved) = results.resulting_call() else {
            let callee = db.resolve_name(call.callee);
            return Ok(db.error_type(&format!("Unresolved call: {callee}")));
        };
        let mut ty = resolved.resulting_descriptor.return_type;
        if call.call_kind == CallKind::Safe && receiver.ty().is_some_and(|t| type_queries::is_nullable(db, t)) {
            ty = type_queries::make_nullable(db, ty);
        }
        if call.call_kind == CallKind::Infix && BOOLEAN_CONVENTIONS.contains(&&*db.resolve_name(call.callee)) {
            self.ensure_boolean_result(trace, expression, call.callee, Some(ty));
        }
        Ok(ty)
    }

    /// Check that an operator convention returned `Boolean`. A missing
    /// result type has already been reported elsewhere.
    pub fn ensure_boolean_result(
        &self,
        trace: &mut dyn BindingTrace,
        operation: NodeIndex,
        name: Atom,
        result_type: Option<TypeId>,
    ) -> bool {
        let Some(result_type) = result_type else {
            return true;
        };
        let db = self.ctx.types;
        if type_queries::contains_error(db, result_type) || is_subtype_of(db, result_type, TypeId::BOOLEAN) {
            return true;
        }
        trace.report(PendingDiagnostic::new(
            diagnostic_codes::RESULT_TYPE_MISMATCH,
            operation,
            vec![name.into(), TypeId::BOOLEAN.into(), result_type.into()],
        ));
        false
    }

    /// Analyze a `{ ... }` literal in a scope of its own; its type is
    /// `Function<R>` with `R` the type of the last statement.
    fn check_function_literal(
        &mut self,
        trace: &mut dyn BindingTrace,
        typing: &TypingContext,
        expression: NodeIndex,
    ) -> Result<TypeId, AnalysisError> {
        let arena = self.ctx.arena;
        let literal = match arena.get(expression).map(|node| &node.data) {
            Some(NodeData::FunctionLiteralExpression { literal }) => *literal,
            _ => {
                return Err(AnalysisError::MalformedTree {
                    node: expression,
                    reason: "expected a function literal expression",
                });
            }
        };
        let Some(NodeData::FunctionLiteral { statements }) = arena.get(literal).map(|node| &node.data) else {
            return Err(AnalysisError::MalformedTree {
                node: literal,
                reason: "function literal expression without a literal",
            });
        };

        let binder = &mut *self.ctx.binder;
        let container = binder.scope_container(typing.scope);
        let decl = match binder.declaration_at(literal) {
            Some(decl) => decl,
            None => binder.declare_function_literal(container, literal),
        };
        let scope = binder.new_scope(typing.scope, decl);
        let result = self.check_statements(trace, &typing.replace_scope(scope), statements)?;
        Ok(self.ctx.types.class_type(DefId::FUNCTION, &[result]))
    }

    /// Declare a local `fun name() { body }` in the current scope and check
    /// its body.
    fn check_function_declaration(
        &mut self,
        trace: &mut dyn BindingTrace,
        typing: &TypingContext,
        node: NodeIndex,
        name: Atom,
        body: NodeIndex,
    ) -> Result<(), AnalysisError> {
        let binder = &mut *self.ctx.binder;
        let decl = match binder.declaration_at(node) {
            Some(decl) => decl,
            None => binder.declare_callable(typing.scope, CallableDescriptor::function(name, TypeId::UNIT), node),
        };
        if body.is_none() {
            return Ok(());
        }
        let scope = binder.new_scope(typing.scope, decl);
        let body_context = typing
            .replace_scope(scope)
            .replace_expected_type(ExpectedType::NoExpectedType);
        self.get_type_of_expression(trace, &body_context, body)?;
        Ok(())
    }

    /// `val (a, b) = initializer`.
    fn check_multi_declaration(
        &mut self,
        trace: &mut dyn BindingTrace,
        typing: &TypingContext,
        node: NodeIndex,
    ) -> Result<(), AnalysisError> {
        let declaration = self
            .ctx
            .arena
            .get_multi_declaration(node)
            .ok_or(AnalysisError::MalformedTree {
                node,
                reason: "expected a multi-declaration",
            })?;
        let initializer = declaration.initializer;
        let ty = self.get_type_of_expression(
            trace,
            &typing.replace_expected_type(ExpectedType::NoExpectedType),
            initializer,
        )?;
        let receiver = ReceiverValue::Expression {
            expression: initializer,
            ty,
        };
        self.define_local_variables_from_multi_declaration(trace, typing, typing.scope, node, receiver, initializer)?;
        Ok(())
    }

    /// Resolve a written type. Unknown class names are reported and become
    /// error types.
    pub fn resolve_type_reference(
        &self,
        trace: &mut dyn BindingTrace,
        node: NodeIndex,
    ) -> Result<TypeId, AnalysisError> {
        let db = self.ctx.types;
        let reference = self.ctx.arena.get_type_reference(node).ok_or(AnalysisError::MalformedTree {
            node,
            reason: "expected a type reference",
        })?;
        let Some(def) = db.class_named(reference.name) else {
            trace.report(PendingDiagnostic::new(
                diagnostic_codes::UNRESOLVED_REFERENCE,
                node,
                vec![reference.name.into()],
            ));
            let name = db.resolve_name(reference.name);
            return Ok(db.error_type(&format!("Unresolved type: {name}")));
        };
        let mut arguments = Vec::with_capacity(reference.arguments.len());
        for &argument in &reference.arguments {
            arguments.push(self.resolve_type_reference(trace, argument)?);
        }
        let ty = db.class_type(def, &arguments);
        Ok(if reference.nullable {
            type_queries::make_nullable(db, ty)
        } else {
            ty
        })
    }
}

/// Type of a literal without an expected type.
pub fn get_default_type(kind: LiteralKind) -> TypeId {
    match kind {
        LiteralKind::Integer => TypeId::INT,
        LiteralKind::Float => TypeId::DOUBLE,
        LiteralKind::Boolean => TypeId::BOOLEAN,
        LiteralKind::Character => TypeId::CHAR,
        LiteralKind::String => TypeId::STRING,
        LiteralKind::Null => TypeId::NULLABLE_NOTHING,
    }
}
