//! Checked-tree setup for emitter tests: expressions are typed by the
//! checker inside `fun main()` of package `demo`, then generated.

use super::*;
use ksc_binder::{BinderState, CallableDescriptor, DeclId, ScopeId};
use ksc_checker::{BindingContext, CheckerOptions, CheckerState, TypingContext};
use ksc_common::interner::Atom;
use ksc_solver::{TypeId, TypeInterner};
use ksc_syntax::{CallKind, LiteralKind, NodeArena, NodeIndex};

pub(crate) struct Fixture {
    pub db: TypeInterner,
    pub arena: NodeArena,
    pub binder: BinderState,
    pub trace: BindingContext,
    pub scope: ScopeId,
    /// Locals in slot order.
    pub locals: Vec<DeclId>,
}

impl Fixture {
    pub fn new() -> Self {
        ksc_common::tracing_config::init_tracing();
        let db = TypeInterner::new();
        let mut binder = BinderState::new(db.name("demo"));
        binder.declare_builtin_members(&db);
        let root = binder.root_scope();
        let main = binder.declare_callable(
            root,
            CallableDescriptor::function(db.name("main"), TypeId::UNIT),
            NodeIndex::NONE,
        );
        let scope = binder.new_scope(root, main);
        Fixture {
            db,
            arena: NodeArena::new(),
            binder,
            trace: BindingContext::new(),
            scope,
            locals: Vec::new(),
        }
    }

    pub fn name(&self, text: &str) -> Atom {
        self.db.name(text)
    }

    pub fn declare_top_level(&mut self, descriptor: CallableDescriptor) -> DeclId {
        let root = self.binder.root_scope();
        self.binder.declare_callable(root, descriptor, NodeIndex::NONE)
    }

    /// `val name: ty` in `main`, in the next free slot.
    pub fn local(&mut self, name: &str, ty: TypeId) -> DeclId {
        let name = self.db.name(name);
        let decl = self.binder.declare_local_variable(self.scope, name, ty, NodeIndex::NONE);
        self.locals.push(decl);
        decl
    }

    pub fn literal(&mut self, kind: LiteralKind, text: &str) -> NodeIndex {
        let text = self.db.name(text);
        self.arena.add_literal(kind, text)
    }

    pub fn reference(&mut self, name: &str) -> NodeIndex {
        let name = self.db.name(name);
        self.arena.add_name_reference(name)
    }

    pub fn call(&mut self, receiver: NodeIndex, name: &str, args: Vec<NodeIndex>) -> NodeIndex {
        let callee = self.db.name(name);
        self.arena.add_call(receiver, callee, args, CallKind::Normal)
    }

    /// Type `expression` and return its type; the test fails on any
    /// diagnostic.
    pub fn check(&mut self, expression: NodeIndex) -> TypeId {
        let typing = TypingContext::new(self.scope);
        let mut checker = CheckerState::new(&self.arena, &self.db, &mut self.binder, CheckerOptions::default());
        let ty = checker
            .get_type_of_expression(&mut self.trace, &typing, expression)
            .unwrap();
        assert!(self.trace.diagnostics().is_empty(), "{:?}", self.trace.diagnostics());
        ty
    }

    /// A generator with every local bound to its slot.
    pub fn codegen(&self) -> ExpressionCodegen<'_> {
        self.codegen_with(EmitterOptions::default())
    }

    pub fn codegen_with(&self, options: EmitterOptions) -> ExpressionCodegen<'_> {
        let mut codegen = ExpressionCodegen::new(&self.arena, &self.db, &self.binder, &self.trace, options);
        for &local in &self.locals {
            codegen.declare_local(local).unwrap();
        }
        codegen
    }
}
