//! Declarations and scopes for the ksc compiler.
//!
//! Declarations live in an arena owned by `BinderState` and refer to their
//! containing declaration by `DeclId`, so walking outward from a local
//! variable to its function, and from a function literal to the function
//! that contains it, is an index lookup. Scopes form a second arena of
//! `ScopeId`s, each knowing its parent scope and the declaration it belongs
//! to.

mod builtins;
mod declarations;
mod scopes;
mod state;

pub use declarations::{
    CallableDescriptor, CallableKind, DeclData, DeclId, DeclKind, Declaration, InlineStrategy,
    ValueParameterDescriptor, VariableDescriptor,
};
pub use scopes::{Scope, ScopeId};
pub use state::BinderState;

#[cfg(test)]
#[path = "../tests/scopes_tests.rs"]
mod scopes_tests;
#[cfg(test)]
#[path = "../tests/declarations_tests.rs"]
mod declarations_tests;
