//! Declaration payloads.

use ksc_common::interner::Atom;
use ksc_solver::{DefId, TypeId, TypeInterner, TypeParamId, TypeSubstitution, instantiate_type};
use ksc_syntax::NodeIndex;

/// Index of a declaration in `BinderState`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

impl DeclId {
    pub const NONE: Self = Self(u32::MAX);

    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    pub const fn is_some(self) -> bool {
        !self.is_none()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Package,
    Class,
    Function,
    Property,
    FunctionLiteral,
    LocalVariable,
    ValueParameter,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum InlineStrategy {
    #[default]
    NotInline,
    /// The body is substituted at every call site.
    Inline,
}

impl InlineStrategy {
    pub const fn is_inline(self) -> bool {
        matches!(self, InlineStrategy::Inline)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum CallableKind {
    #[default]
    SimpleFunction,
    Property,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueParameterDescriptor {
    pub name: Atom,
    pub ty: TypeId,
}

/// Signature of a function or property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallableDescriptor {
    pub name: Atom,
    pub kind: CallableKind,
    pub type_params: Vec<TypeParamId>,
    /// Type of the extension receiver, `fun R.name()`.
    pub extension_receiver: Option<TypeId>,
    /// Type of the class a member belongs to.
    pub dispatch_receiver: Option<TypeId>,
    pub value_params: Vec<ValueParameterDescriptor>,
    pub return_type: TypeId,
    pub inline_strategy: InlineStrategy,
}

impl CallableDescriptor {
    pub fn function(name: Atom, return_type: TypeId) -> Self {
        CallableDescriptor {
            name,
            kind: CallableKind::SimpleFunction,
            type_params: Vec::new(),
            extension_receiver: None,
            dispatch_receiver: None,
            value_params: Vec::new(),
            return_type,
            inline_strategy: InlineStrategy::NotInline,
        }
    }

    pub fn property(name: Atom, ty: TypeId) -> Self {
        CallableDescriptor {
            kind: CallableKind::Property,
            ..Self::function(name, ty)
        }
    }

    pub fn with_type_params(mut self, type_params: Vec<TypeParamId>) -> Self {
        self.type_params = type_params;
        self
    }

    pub fn with_extension_receiver(mut self, receiver: TypeId) -> Self {
        self.extension_receiver = Some(receiver);
        self
    }

    pub fn with_dispatch_receiver(mut self, receiver: TypeId) -> Self {
        self.dispatch_receiver = Some(receiver);
        self
    }

    pub fn with_value_param(mut self, name: Atom, ty: TypeId) -> Self {
        self.value_params.push(ValueParameterDescriptor { name, ty });
        self
    }

    pub fn inline(mut self) -> Self {
        self.inline_strategy = InlineStrategy::Inline;
        self
    }

    pub const fn is_simple_function(&self) -> bool {
        matches!(self.kind, CallableKind::SimpleFunction)
    }

    pub const fn is_property(&self) -> bool {
        matches!(self.kind, CallableKind::Property)
    }

    pub const fn is_extension(&self) -> bool {
        self.extension_receiver.is_some()
    }

    pub fn value_param_types(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.value_params.iter().map(|param| param.ty)
    }

    /// The descriptor with `substitution` applied to every type it
    /// mentions. Substituted type parameters are dropped from the list.
    pub fn substitute(&self, db: &TypeInterner, substitution: &TypeSubstitution) -> CallableDescriptor {
        if substitution.is_empty() {
            return self.clone();
        }
        let apply = |ty: TypeId| instantiate_type(db, ty, substitution);
        CallableDescriptor {
            name: self.name,
            kind: self.kind,
            type_params: self
                .type_params
                .iter()
                .copied()
                .filter(|&param| substitution.get(param).is_none())
                .collect(),
            extension_receiver: self.extension_receiver.map(apply),
            dispatch_receiver: self.dispatch_receiver.map(apply),
            value_params: self
                .value_params
                .iter()
                .map(|param| ValueParameterDescriptor {
                    name: param.name,
                    ty: apply(param.ty),
                })
                .collect(),
            return_type: apply(self.return_type),
            inline_strategy: self.inline_strategy,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableDescriptor {
    pub name: Atom,
    pub ty: TypeId,
    pub is_var: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeclData {
    Package { name: Atom },
    Class { name: Atom, def: DefId },
    Callable(CallableDescriptor),
    /// Anonymous function created for a `{ ... }` literal.
    FunctionLiteral,
    LocalVariable(VariableDescriptor),
    ValueParameter(VariableDescriptor),
}

#[derive(Clone, Debug)]
pub struct Declaration {
    pub data: DeclData,
    /// Containing declaration; `DeclId::NONE` only for the root package.
    pub container: DeclId,
    /// Source node, `NodeIndex::NONE` for declarations without source.
    pub node: NodeIndex,
}

impl Declaration {
    pub fn kind(&self) -> DeclKind {
        match &self.data {
            DeclData::Package { .. } => DeclKind::Package,
            DeclData::Class { .. } => DeclKind::Class,
            DeclData::Callable(callable) if callable.is_property() => DeclKind::Property,
            DeclData::Callable(_) => DeclKind::Function,
            DeclData::FunctionLiteral => DeclKind::FunctionLiteral,
            DeclData::LocalVariable(_) => DeclKind::LocalVariable,
            DeclData::ValueParameter(_) => DeclKind::ValueParameter,
        }
    }

    pub fn name(&self) -> Option<Atom> {
        match &self.data {
            DeclData::Package { name } | DeclData::Class { name, .. } => Some(*name),
            DeclData::Callable(callable) => Some(callable.name),
            DeclData::LocalVariable(variable) | DeclData::ValueParameter(variable) => Some(variable.name),
            DeclData::FunctionLiteral => None,
        }
    }
}
