//! Flow-sensitive type facts about stable variables.
//!
//! A `DataFlowInfo` is an immutable value: narrowing returns a new info, so
//! contexts can be cloned into branches without sharing.

use crate::receiver::ReceiverValue;
use crate::trace::{BindingTrace, BindingTraceExt};
use ksc_binder::{BinderState, DeclId};
use ksc_common::limits::SMART_CAST_VARIANTS_INLINE;
use ksc_solver::{TypeId, TypeInterner, type_queries};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::Arc;

pub type SmartCastVariants = SmallVec<[TypeId; SMART_CAST_VARIANTS_INLINE]>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DataFlowInfo {
    narrowed: Arc<FxHashMap<DeclId, SmartCastVariants>>,
}

impl DataFlowInfo {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Info where `variable` is additionally known to have type `ty`.
    #[must_use]
    pub fn with_narrowed(&self, variable: DeclId, ty: TypeId) -> Self {
        let mut narrowed = (*self.narrowed).clone();
        let types = narrowed.entry(variable).or_default();
        if !types.contains(&ty) {
            types.push(ty);
        }
        DataFlowInfo {
            narrowed: Arc::new(narrowed),
        }
    }

    /// Info where `variable` of type `declared` is known to be non-null.
    #[must_use]
    pub fn with_not_null(&self, db: &TypeInterner, variable: DeclId, declared: TypeId) -> Self {
        self.with_narrowed(variable, type_queries::make_not_nullable(db, declared))
    }

    pub fn possible_types(&self, variable: DeclId) -> &[TypeId] {
        self.narrowed.get(&variable).map(|types| types.as_slice()).unwrap_or(&[])
    }
}

/// Types a receiver may be treated as: its own type first, then anything
/// the data flow knows about the variable it reads.
pub fn smart_cast_variants(
    binder: &BinderState,
    trace: &dyn BindingTrace,
    receiver: &ReceiverValue,
    data_flow: &DataFlowInfo,
) -> SmartCastVariants {
    let mut variants = SmartCastVariants::new();
    let Some(ty) = receiver.ty() else {
        return variants;
    };
    variants.push(ty);
    let variable = receiver
        .expression()
        .and_then(|expression| trace.reference_target(expression))
        .filter(|&decl| binder.variable(decl).is_some());
    if let Some(variable) = variable {
        for &narrowed in data_flow.possible_types(variable) {
            if !variants.contains(&narrowed) {
                variants.push(narrowed);
            }
        }
    }
    variants
}
