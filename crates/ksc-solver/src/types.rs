//! Core type definitions.
//!
//! Types are interned: a `TypeId` is a handle into the `TypeInterner`, and
//! two structurally equal types always receive the same id.

use ksc_common::interner::Atom;
use smallvec::SmallVec;

/// Interned type handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Generic error type. Error types are compatible with everything so a
    /// single failure does not cascade into unrelated diagnostics.
    pub const ERROR: TypeId = TypeId(0);
    pub const ANY: TypeId = TypeId(1);
    pub const NULLABLE_ANY: TypeId = TypeId(2);
    pub const NOTHING: TypeId = TypeId(3);
    pub const NULLABLE_NOTHING: TypeId = TypeId(4);
    pub const UNIT: TypeId = TypeId(5);
    pub const BOOLEAN: TypeId = TypeId(6);
    pub const CHAR: TypeId = TypeId(7);
    pub const BYTE: TypeId = TypeId(8);
    pub const SHORT: TypeId = TypeId(9);
    pub const INT: TypeId = TypeId(10);
    pub const LONG: TypeId = TypeId(11);
    pub const FLOAT: TypeId = TypeId(12);
    pub const DOUBLE: TypeId = TypeId(13);
    pub const NUMBER: TypeId = TypeId(14);
    pub const CHAR_SEQUENCE: TypeId = TypeId(15);
    pub const STRING: TypeId = TypeId(16);

    /// First id handed out for non-builtin types.
    pub const FIRST_USER: u32 = 17;

    pub const fn is_builtin(self) -> bool {
        self.0 < Self::FIRST_USER
    }
}

/// Identifier of a class declaration in the interner's class store.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefId(pub u32);

impl DefId {
    pub const INVALID: DefId = DefId(0);

    pub const ANY: DefId = DefId(1);
    pub const NOTHING: DefId = DefId(2);
    pub const UNIT: DefId = DefId(3);
    pub const BOOLEAN: DefId = DefId(4);
    pub const CHAR: DefId = DefId(5);
    pub const BYTE: DefId = DefId(6);
    pub const SHORT: DefId = DefId(7);
    pub const INT: DefId = DefId(8);
    pub const LONG: DefId = DefId(9);
    pub const FLOAT: DefId = DefId(10);
    pub const DOUBLE: DefId = DefId(11);
    pub const NUMBER: DefId = DefId(12);
    pub const CHAR_SEQUENCE: DefId = DefId(13);
    pub const STRING: DefId = DefId(14);
    pub const COMPARABLE: DefId = DefId(15);
    pub const ARRAY: DefId = DefId(16);
    pub const BOOLEAN_ARRAY: DefId = DefId(17);
    pub const CHAR_ARRAY: DefId = DefId(18);
    pub const BYTE_ARRAY: DefId = DefId(19);
    pub const SHORT_ARRAY: DefId = DefId(20);
    pub const INT_ARRAY: DefId = DefId(21);
    pub const LONG_ARRAY: DefId = DefId(22);
    pub const FLOAT_ARRAY: DefId = DefId(23);
    pub const DOUBLE_ARRAY: DefId = DefId(24);
    pub const FUNCTION: DefId = DefId(25);

    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

/// Identifier of a type parameter declaration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeParamId(pub u32);

/// Declaration-site variance of a type parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Variance {
    #[default]
    Invariant,
    /// `in T`
    In,
    /// `out T`
    Out,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    /// An unresolved or erroneous type.
    Error { message: Atom },
    /// `C<A1, ..., An>` or `C<...>?`
    Class {
        def: DefId,
        args: SmallVec<[TypeId; 2]>,
        nullable: bool,
    },
    /// Use of a declared type parameter, `T` or `T?`.
    TypeParameter { param: TypeParamId, nullable: bool },
}

impl TypeData {
    /// Whether the type was written with `?`. A non-marked type parameter can
    /// still admit null through a nullable upper bound.
    pub const fn is_marked_nullable(&self) -> bool {
        match self {
            TypeData::Class { nullable, .. } | TypeData::TypeParameter { nullable, .. } => *nullable,
            TypeData::Error { .. } => false,
        }
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, TypeData::Error { .. })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Object,
}

/// Class declaration as the solver sees it.
#[derive(Clone, Debug)]
pub struct ClassInfo {
    pub name: Atom,
    /// Dotted qualified name, `kotlin.Int`.
    pub fq_name: Atom,
    pub kind: ClassKind,
    pub type_params: Vec<TypeParamId>,
    /// Direct supertypes, expressed over `type_params`.
    pub supertypes: Vec<TypeId>,
}

#[derive(Clone, Debug)]
pub struct TypeParamInfo {
    pub name: Atom,
    pub variance: Variance,
    /// Declared upper bounds; `Any?` when none was written.
    pub upper_bounds: Vec<TypeId>,
}
