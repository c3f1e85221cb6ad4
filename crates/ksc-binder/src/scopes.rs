//! Lexical scopes.

use crate::declarations::DeclId;
use indexmap::IndexMap;
use ksc_common::interner::Atom;
use rustc_hash::{FxBuildHasher, FxHashMap};
use smallvec::SmallVec;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub const NONE: Self = Self(u32::MAX);

    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    pub const fn is_some(self) -> bool {
        !self.is_none()
    }
}

#[derive(Clone, Debug)]
pub struct Scope {
    pub parent: ScopeId,
    /// Declaration whose body this scope belongs to.
    pub container: DeclId,
    pub(crate) functions: FxHashMap<Atom, SmallVec<[DeclId; 2]>>,
    /// Insertion-ordered so diagnostics listing locals are deterministic.
    pub(crate) variables: IndexMap<Atom, DeclId, FxBuildHasher>,
}

impl Scope {
    pub(crate) fn new(parent: ScopeId, container: DeclId) -> Self {
        Scope {
            parent,
            container,
            functions: FxHashMap::default(),
            variables: IndexMap::with_hasher(FxBuildHasher),
        }
    }

    /// Functions and properties declared directly in this scope.
    pub fn functions_named(&self, name: Atom) -> &[DeclId] {
        self.functions
            .get(&name)
            .map(|decls| decls.as_slice())
            .unwrap_or(&[])
    }

    /// Variable declared directly in this scope.
    pub fn own_variable(&self, name: Atom) -> Option<DeclId> {
        self.variables.get(&name).copied()
    }

    pub fn variables(&self) -> impl Iterator<Item = (Atom, DeclId)> + '_ {
        self.variables.iter().map(|(&name, &decl)| (name, decl))
    }
}
