//! Type solver for the ksc compiler.
//!
//! This crate owns the type representation and the relations the resolver
//! queries:
//!
//! - **Interning**: `TypeData` structures become `TypeId` handles, so type
//!   equality is a `u32` comparison
//! - **Subtyping**: nominal class hierarchy with declaration-site variance
//!   and nullability
//! - **Constraint system**: type variables solved with `ena` union-find plus
//!   lower/upper bound sets, used to decide candidate applicability
//!
//! The checker treats the constraint system as a capability behind the
//! `ConstraintSystem` trait.

mod constraints;
mod format;
mod instantiate;
mod intern;
pub mod recursion;
mod subtype;
pub mod type_queries;
mod types;

pub use constraints::{
    ConstraintError, ConstraintPosition, ConstraintSystem, ConstraintSystemImpl,
    ConstraintSystemStatus, FixedValue, TypeVariable,
};
pub use format::TypeFormatter;
pub use instantiate::{TypeSubstitution, instantiate_type};
pub use intern::TypeInterner;
pub use subtype::{SubtypeChecker, common_supertype, find_corresponding_supertype, is_subtype_of};
pub use types::{ClassInfo, ClassKind, DefId, TypeData, TypeId, TypeParamId, TypeParamInfo, Variance};

#[cfg(test)]
#[path = "../tests/intern_tests.rs"]
mod intern_tests;
#[cfg(test)]
#[path = "../tests/subtype_tests.rs"]
mod subtype_tests;
#[cfg(test)]
#[path = "../tests/constraints_tests.rs"]
mod constraints_tests;
#[cfg(test)]
#[path = "../tests/recursion_tests.rs"]
mod recursion_tests;
