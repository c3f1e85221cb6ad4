//! Expression code generation over checked trees.
//!
//! The generator reads the analysis trace only: every call must already
//! carry a resolved call and every name reference a target declaration.

use crate::asm_type::AsmType;
use crate::error::CodegenError;
use crate::instructions::{Constant, InstructionAdapter, InvokeOpcode};
use crate::intrinsics;
use crate::options::EmitterOptions;
use crate::stack_value::{StackValue, coerce};
use crate::type_mapper::TypeMapper;
use ksc_binder::{BinderState, DeclData, DeclId};
use ksc_checker::{BindingTrace, BindingTraceExt, ReceiverValue, get_default_type};
use ksc_solver::{TypeId, TypeInterner};
use ksc_syntax::{LiteralKind, NodeArena, NodeData, NodeIndex};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

pub struct ExpressionCodegen<'a> {
    arena: &'a NodeArena,
    db: &'a TypeInterner,
    binder: &'a BinderState,
    trace: &'a dyn BindingTrace,
    mapper: TypeMapper<'a>,
    /// Local slot and type of each variable in the current frame.
    frame: FxHashMap<DeclId, (u16, AsmType)>,
    next_slot: u16,
    this_type: Option<AsmType>,
    options: EmitterOptions,
    pub v: InstructionAdapter,
}

impl<'a> ExpressionCodegen<'a> {
    pub fn new(
        arena: &'a NodeArena,
        db: &'a TypeInterner,
        binder: &'a BinderState,
        trace: &'a dyn BindingTrace,
        options: EmitterOptions,
    ) -> Self {
        let package = binder
            .declaration(binder.root_package())
            .and_then(|decl| decl.name())
            .map(|name| db.resolve_name(name).to_string())
            .unwrap_or_default();
        ExpressionCodegen {
            arena,
            db,
            binder,
            trace,
            mapper: TypeMapper::new(db, &package),
            frame: FxHashMap::default(),
            next_slot: 0,
            this_type: None,
            options,
            v: InstructionAdapter::new(),
        }
    }

    pub const fn options(&self) -> EmitterOptions {
        self.options
    }

    pub fn mapper(&self) -> &TypeMapper<'a> {
        &self.mapper
    }

    /// Generate inside a member of `owner`: slot 0 holds `this`.
    pub fn with_this(mut self, owner: TypeId) -> Result<Self, CodegenError> {
        let this = self.mapper.map_type(owner)?;
        self.this_type = Some(this);
        self.next_slot = self.next_slot.max(1);
        Ok(self)
    }

    /// Allocate the next local slot(s) for a variable or value parameter.
    pub fn declare_local(&mut self, variable: DeclId) -> Result<u16, CodegenError> {
        let ty = match self.binder.declaration(variable).map(|decl| &decl.data) {
            Some(DeclData::LocalVariable(descriptor) | DeclData::ValueParameter(descriptor)) => descriptor.ty,
            _ => return Err(CodegenError::UnboundLocal(self.binder.source_node(variable))),
        };
        let ty = self.mapper.map_type(ty)?;
        let slot = self.next_slot;
        self.next_slot += ty.size().max(1);
        trace!(variable = variable.0, slot, %ty, "declare_local");
        self.frame.insert(variable, (slot, ty));
        Ok(slot)
    }

    /// Generate `expression` and leave it on the stack as `ty`.
    pub fn gen_expression(&mut self, expression: NodeIndex, ty: &AsmType) -> Result<(), CodegenError> {
        let value = self.gen_value(expression)?;
        value.put(ty, &mut self.v);
        Ok(())
    }

    /// Generate `expression` as a value that is not yet coerced. Calls are
    /// emitted immediately; locals and constants are emitted by `put`.
    pub fn gen_value(&mut self, expression: NodeIndex) -> Result<StackValue, CodegenError> {
        let Some(node) = self.arena.get(expression) else {
            return Err(CodegenError::UnsupportedExpression {
                node: expression,
                kind: None,
            });
        };
        match &node.data {
            NodeData::Literal { kind, text } => self.gen_literal(expression, *kind, &self.db.resolve_name(*text)),
            NodeData::NameReference { .. } => {
                let (slot, ty) = self
                    .trace
                    .reference_target(expression)
                    .and_then(|target| self.frame.get(&target))
                    .cloned()
                    .ok_or(CodegenError::UnboundLocal(expression))?;
                Ok(StackValue::Local { slot, ty })
            }
            NodeData::ThisExpression => self.this_value().ok_or(CodegenError::UnsupportedExpression {
                node: expression,
                kind: Some(node.kind()),
            }),
            NodeData::Call(_) => self.gen_call(expression),
            _ => Err(CodegenError::UnsupportedExpression {
                node: expression,
                kind: Some(node.kind()),
            }),
        }
    }

    fn this_value(&self) -> Option<StackValue> {
        self.this_type
            .clone()
            .map(|ty| StackValue::Local { slot: 0, ty })
    }

    fn gen_literal(&self, node: NodeIndex, kind: LiteralKind, text: &str) -> Result<StackValue, CodegenError> {
        let checked = self
            .trace
            .expression_type(node)
            .unwrap_or_else(|| get_default_type(kind));
        let ty = self.mapper.map_type(checked)?;
        let invalid = || CodegenError::InvalidLiteral {
            node,
            text: text.to_string(),
        };
        let value = match kind {
            LiteralKind::Null => Constant::Null,
            LiteralKind::Boolean => match text {
                "true" => Constant::Int(1),
                "false" => Constant::Int(0),
                _ => return Err(invalid()),
            },
            LiteralKind::Character => {
                let mut chars = text.trim_matches('\'').chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Constant::Int(c as i32),
                    _ => return Err(invalid()),
                }
            }
            LiteralKind::String => Constant::String(text.trim_matches('"').into()),
            LiteralKind::Integer => {
                let digits = text.trim_end_matches(['L', 'l']).replace('_', "");
                match ty {
                    AsmType::Long => Constant::Long(digits.parse().map_err(|_| invalid())?),
                    AsmType::Float => Constant::Float(digits.parse().map_err(|_| invalid())?),
                    AsmType::Double => Constant::Double(digits.parse().map_err(|_| invalid())?),
                    _ => Constant::Int(digits.parse().map_err(|_| invalid())?),
                }
            }
            LiteralKind::Float => {
                let digits = text.trim_end_matches(['F', 'f']).replace('_', "");
                match ty {
                    AsmType::Float => Constant::Float(digits.parse().map_err(|_| invalid())?),
                    _ => Constant::Double(digits.parse().map_err(|_| invalid())?),
                }
            }
        };
        Ok(StackValue::Constant { value, ty })
    }

    /// Generate a resolved call, leaving its result on the stack as the
    /// mapped type of the resulting signature.
    pub fn gen_call(&mut self, call: NodeIndex) -> Result<StackValue, CodegenError> {
        let resolved = self
            .trace
            .resolved_call(call)
            .ok_or(CodegenError::UnresolvedCall(call))?;
        if resolved.is_safe_call() {
            return Err(CodegenError::UnsupportedExpression {
                node: call,
                kind: self.arena.kind(call),
            });
        }
        let return_type = self.mapper.map_type(resolved.resulting_descriptor.return_type)?;

        let receiver = match &resolved.explicit_receiver {
            ReceiverValue::Expression { expression, .. } => self.gen_value(*expression)?,
            ReceiverValue::This { .. } | ReceiverValue::ClassReceiver { .. } => {
                self.this_value().ok_or(CodegenError::MissingReceiver(call))?
            }
            ReceiverValue::NoReceiver if resolved.candidate_descriptor.dispatch_receiver.is_some() => {
                self.this_value().unwrap_or(StackValue::None)
            }
            ReceiverValue::NoReceiver => StackValue::None,
        };

        if let Some(intrinsic) = intrinsics::lookup(self.db, self.binder, resolved.candidate) {
            debug!(call = call.0, ?intrinsic, "intrinsic call");
            return intrinsic.generate(self, &return_type, &resolved.value_arguments, receiver);
        }

        let method = self.mapper.map_to_callable_method(&resolved.candidate_descriptor)?;
        debug!(call = call.0, owner = %method.owner, name = %method.name, "call");
        if let Some(this) = method.this_type.as_ref().or(method.receiver_type.as_ref()) {
            if receiver == StackValue::None {
                return Err(CodegenError::MissingReceiver(call));
            }
            receiver.put(this, &mut self.v);
        }
        for (&argument, ty) in resolved.value_arguments.iter().zip(&method.value_parameter_types) {
            self.gen_expression(argument, ty)?;
        }
        let descriptor = method.descriptor();
        match method.opcode {
            InvokeOpcode::Static => self.v.invokestatic(&method.owner, &method.name, &descriptor),
            InvokeOpcode::Virtual => self.v.invokevirtual(&method.owner, &method.name, &descriptor),
            InvokeOpcode::Interface => self.v.invokeinterface(&method.owner, &method.name, &descriptor),
        }
        coerce(&method.return_type, &return_type, &mut self.v);
        Ok(StackValue::OnStack(return_type))
    }
}
