//! Binder state: the declaration and scope arenas.

use crate::declarations::{
    CallableDescriptor, DeclData, DeclId, DeclKind, Declaration, VariableDescriptor,
};
use crate::scopes::{Scope, ScopeId};
use ksc_common::interner::Atom;
use ksc_solver::{DefId, TypeId};
use ksc_syntax::NodeIndex;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

pub struct BinderState {
    decls: Vec<Declaration>,
    scopes: Vec<Scope>,
    /// Member functions and properties per class.
    members: FxHashMap<DefId, Vec<DeclId>>,
    /// Members declared by `declare_builtin_members`.
    builtin_members: FxHashSet<DeclId>,
    class_decls: FxHashMap<DefId, DeclId>,
    node_decls: FxHashMap<NodeIndex, DeclId>,
    root_package: DeclId,
    root_scope: ScopeId,
}

impl BinderState {
    pub fn new(package_name: Atom) -> Self {
        let mut state = BinderState {
            decls: Vec::new(),
            scopes: Vec::new(),
            members: FxHashMap::default(),
            builtin_members: FxHashSet::default(),
            class_decls: FxHashMap::default(),
            node_decls: FxHashMap::default(),
            root_package: DeclId::NONE,
            root_scope: ScopeId::NONE,
        };
        state.root_package = state.add_declaration(
            DeclData::Package { name: package_name },
            DeclId::NONE,
            NodeIndex::NONE,
        );
        state.root_scope = state.new_scope(ScopeId::NONE, state.root_package);
        state
    }

    pub const fn root_package(&self) -> DeclId {
        self.root_package
    }

    pub const fn root_scope(&self) -> ScopeId {
        self.root_scope
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    pub fn add_declaration(&mut self, data: DeclData, container: DeclId, node: NodeIndex) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(Declaration {
            data,
            container,
            node,
        });
        if node.is_some() {
            self.node_decls.insert(node, id);
        }
        id
    }

    pub fn declaration(&self, id: DeclId) -> Option<&Declaration> {
        self.decls.get(id.0 as usize)
    }

    pub fn kind(&self, id: DeclId) -> Option<DeclKind> {
        self.declaration(id).map(Declaration::kind)
    }

    /// Containing declaration, `DeclId::NONE` for the root or unknown ids.
    pub fn container_of(&self, id: DeclId) -> DeclId {
        self.declaration(id).map_or(DeclId::NONE, |decl| decl.container)
    }

    pub fn source_node(&self, id: DeclId) -> NodeIndex {
        self.declaration(id).map_or(NodeIndex::NONE, |decl| decl.node)
    }

    pub fn declaration_at(&self, node: NodeIndex) -> Option<DeclId> {
        self.node_decls.get(&node).copied()
    }

    pub fn callable(&self, id: DeclId) -> Option<&CallableDescriptor> {
        match &self.declaration(id)?.data {
            DeclData::Callable(callable) => Some(callable),
            _ => None,
        }
    }

    pub fn variable(&self, id: DeclId) -> Option<&VariableDescriptor> {
        match &self.declaration(id)?.data {
            DeclData::LocalVariable(variable) | DeclData::ValueParameter(variable) => Some(variable),
            _ => None,
        }
    }

    pub fn class_def(&self, id: DeclId) -> Option<DefId> {
        match &self.declaration(id)?.data {
            DeclData::Class { def, .. } => Some(*def),
            _ => None,
        }
    }

    pub fn class_declaration(&self, def: DefId) -> Option<DeclId> {
        self.class_decls.get(&def).copied()
    }

    /// Whether `id` has a body of its own: functions, properties and
    /// function literals.
    pub fn is_callable(&self, id: DeclId) -> bool {
        matches!(
            self.kind(id),
            Some(DeclKind::Function | DeclKind::Property | DeclKind::FunctionLiteral)
        )
    }

    fn is_function_like(&self, id: DeclId) -> bool {
        matches!(self.kind(id), Some(DeclKind::Function | DeclKind::FunctionLiteral))
    }

    /// Whether `candidate` is a local of some function enclosing
    /// `container_of_target` (value parameters always count).
    pub fn is_local(&self, container_of_target: DeclId, candidate: DeclId) -> bool {
        if self.kind(candidate) == Some(DeclKind::ValueParameter) {
            return true;
        }
        let parent = self.container_of(candidate);
        if !self.is_function_like(parent) {
            return false;
        }
        let mut current = container_of_target;
        while current.is_some() {
            if current == parent {
                return true;
            }
            current = self.container_of(current);
        }
        false
    }

    /// Whether `id` is declared somewhere inside a function body.
    pub fn is_declared_in_function(&self, id: DeclId) -> bool {
        let mut current = self.container_of(id);
        while current.is_some() {
            if self.is_function_like(current) {
                return true;
            }
            current = self.container_of(current);
        }
        false
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    pub fn new_scope(&mut self, parent: ScopeId, container: DeclId) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(parent, container));
        id
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.0 as usize)
    }

    pub fn scope_container(&self, id: ScopeId) -> DeclId {
        self.scope(id).map_or(DeclId::NONE, |scope| scope.container)
    }

    /// `id` and its ancestors, innermost first.
    pub fn scope_chain(&self, id: ScopeId) -> Vec<ScopeId> {
        let mut chain = Vec::new();
        let mut current = id;
        while let Some(scope) = self.scope(current) {
            chain.push(current);
            current = scope.parent;
        }
        chain
    }

    pub fn add_function_to_scope(&mut self, scope: ScopeId, decl: DeclId) {
        let Some(name) = self.declaration(decl).and_then(Declaration::name) else {
            return;
        };
        if let Some(scope) = self.scopes.get_mut(scope.0 as usize) {
            scope.functions.entry(name).or_default().push(decl);
        }
    }

    /// Make `decl` visible by name in `scope`, hiding any same-named
    /// variable from outer scopes.
    pub fn add_variable_to_scope(&mut self, scope: ScopeId, decl: DeclId) {
        let Some(name) = self.declaration(decl).and_then(Declaration::name) else {
            return;
        };
        if let Some(scope) = self.scopes.get_mut(scope.0 as usize) {
            scope.variables.insert(name, decl);
        }
    }

    /// Nearest visible variable named `name`.
    pub fn lookup_variable(&self, scope: ScopeId, name: Atom) -> Option<DeclId> {
        self.scope_chain(scope)
            .into_iter()
            .find_map(|id| self.scope(id).and_then(|s| s.own_variable(name)))
    }

    // =========================================================================
    // Class members
    // =========================================================================

    pub fn members_named(&self, def: DefId, name: Atom) -> Vec<DeclId> {
        self.members
            .get(&def)
            .map(|members| {
                members
                    .iter()
                    .copied()
                    .filter(|&member| self.declaration(member).and_then(Declaration::name) == Some(name))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_builtin_member(&self, id: DeclId) -> bool {
        self.builtin_members.contains(&id)
    }

    pub(crate) fn declare_builtin_member(&mut self, def: DefId, descriptor: CallableDescriptor) -> DeclId {
        let decl = self.declare_member(def, descriptor);
        self.builtin_members.insert(decl);
        decl
    }

    // =========================================================================
    // Declaration helpers
    // =========================================================================

    pub fn declare_class(&mut self, name: Atom, def: DefId, node: NodeIndex) -> DeclId {
        let decl = self.add_declaration(DeclData::Class { name, def }, self.root_package, node);
        self.class_decls.insert(def, decl);
        decl
    }

    /// Declare a function or property in `scope`, contained by the scope's
    /// declaration.
    pub fn declare_callable(&mut self, scope: ScopeId, descriptor: CallableDescriptor, node: NodeIndex) -> DeclId {
        let container = self.scope_container(scope);
        trace!(decl = self.decls.len(), container = container.0, "declare_callable");
        let decl = self.add_declaration(DeclData::Callable(descriptor), container, node);
        self.add_function_to_scope(scope, decl);
        decl
    }

    /// Declare a member of class `def`. The descriptor should carry the
    /// class type as its dispatch receiver.
    pub fn declare_member(&mut self, def: DefId, descriptor: CallableDescriptor) -> DeclId {
        let container = self.class_declaration(def).unwrap_or(self.root_package);
        let decl = self.add_declaration(DeclData::Callable(descriptor), container, NodeIndex::NONE);
        self.members.entry(def).or_default().push(decl);
        decl
    }

    pub fn declare_function_literal(&mut self, container: DeclId, literal: NodeIndex) -> DeclId {
        self.add_declaration(DeclData::FunctionLiteral, container, literal)
    }

    /// Create a local variable contained by the scope's declaration. The
    /// variable is not added to the scope.
    pub fn create_local_variable(&mut self, scope: ScopeId, name: Atom, ty: TypeId, node: NodeIndex) -> DeclId {
        let container = self.scope_container(scope);
        self.add_declaration(
            DeclData::LocalVariable(VariableDescriptor {
                name,
                ty,
                is_var: false,
            }),
            container,
            node,
        )
    }

    /// Create a local variable and make it visible in `scope`.
    pub fn declare_local_variable(&mut self, scope: ScopeId, name: Atom, ty: TypeId, node: NodeIndex) -> DeclId {
        let decl = self.create_local_variable(scope, name, ty, node);
        self.add_variable_to_scope(scope, decl);
        decl
    }

    pub fn declare_value_parameter(&mut self, scope: ScopeId, name: Atom, ty: TypeId, node: NodeIndex) -> DeclId {
        let container = self.scope_container(scope);
        let decl = self.add_declaration(
            DeclData::ValueParameter(VariableDescriptor {
                name,
                ty,
                is_var: false,
            }),
            container,
            node,
        );
        self.add_variable_to_scope(scope, decl);
        decl
    }
}
