//! Receiver compatibility for extension and member candidates.
//!
//! A receiver matches a declared receiver type if any of its smart-cast
//! variants does, trying each variant as is and then, when it is nullable,
//! its non-null form. A match on the non-null form is a *widening*: it makes
//! the call unsafe unless the call is a safe call.

use crate::data_flow::{DataFlowInfo, smart_cast_variants};
use crate::receiver::ReceiverValue;
use crate::trace::BindingTrace;
use ksc_binder::{BinderState, CallableDescriptor};
use ksc_solver::{
    ConstraintPosition, ConstraintSystem, ConstraintSystemImpl, TypeId, TypeInterner, TypeParamId, is_subtype_of,
    type_queries,
};
use tracing::trace;

/// How a receiver satisfied a declared receiver type.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ReceiverMatch {
    /// Variant that matched, `None` when neither side has a receiver.
    pub receiver_type: Option<TypeId>,
    /// Matched only after dropping the nullability of the variant.
    pub widened: bool,
}

impl ReceiverMatch {
    pub const NONE: Self = ReceiverMatch {
        receiver_type: None,
        widened: false,
    };
}

/// Whether `callable` can be invoked on `receiver` as an extension.
pub fn check_is_extension_callable(
    db: &TypeInterner,
    binder: &BinderState,
    trace: &dyn BindingTrace,
    receiver: &ReceiverValue,
    callable: &CallableDescriptor,
    is_infix_call: bool,
    data_flow: &DataFlowInfo,
) -> bool {
    find_extension_receiver_match(db, binder, trace, receiver, callable, is_infix_call, data_flow).is_some()
}

pub fn find_extension_receiver_match(
    db: &TypeInterner,
    binder: &BinderState,
    trace: &dyn BindingTrace,
    receiver: &ReceiverValue,
    callable: &CallableDescriptor,
    is_infix_call: bool,
    data_flow: &DataFlowInfo,
) -> Option<ReceiverMatch> {
    if is_infix_call && !(callable.is_simple_function() && callable.value_params.len() == 1) {
        return None;
    }
    if !receiver.exists() {
        return callable.extension_receiver.is_none().then_some(ReceiverMatch::NONE);
    }
    callable.extension_receiver?;
    let variants = smart_cast_variants(binder, trace, receiver, data_flow);
    find_variant_match(db, &variants, |variant| {
        check_receiver_resolution(db, receiver, variant, callable)
    })
}

/// Match the receiver against a member's dispatch receiver.
pub fn find_dispatch_receiver_match(
    db: &TypeInterner,
    binder: &BinderState,
    trace: &dyn BindingTrace,
    receiver: &ReceiverValue,
    callable: &CallableDescriptor,
    data_flow: &DataFlowInfo,
) -> Option<ReceiverMatch> {
    let declared = callable.dispatch_receiver?;
    let variants = smart_cast_variants(binder, trace, receiver, data_flow);
    find_variant_match(db, &variants, |variant| {
        receiver_type_fits(db, variant, declared, &callable.type_params)
    })
}

/// Variants as they are first, then their non-null forms, so a variant
/// the data flow proved non-null is preferred to widening.
fn find_variant_match(
    db: &TypeInterner,
    variants: &[TypeId],
    mut fits: impl FnMut(TypeId) -> bool,
) -> Option<ReceiverMatch> {
    if let Some(&variant) = variants.iter().find(|&&variant| fits(variant)) {
        return Some(ReceiverMatch {
            receiver_type: Some(variant),
            widened: false,
        });
    }
    for &variant in variants {
        if !type_queries::is_nullable(db, variant) {
            continue;
        }
        let not_null = type_queries::make_not_nullable(db, variant);
        if fits(not_null) {
            trace!(variant = variant.0, "receiver matched after non-null widening");
            return Some(ReceiverMatch {
                receiver_type: Some(not_null),
                widened: true,
            });
        }
    }
    None
}

/// Whether a receiver of type `receiver_type` fits the extension receiver of
/// `callable`. Both sides absent counts as a fit; one side absent does not.
pub fn check_receiver_resolution(
    db: &TypeInterner,
    receiver: &ReceiverValue,
    receiver_type: TypeId,
    callable: &CallableDescriptor,
) -> bool {
    match (receiver.exists(), callable.extension_receiver) {
        (false, None) => true,
        (true, Some(declared)) => receiver_type_fits(db, receiver_type, declared, &callable.type_params),
        _ => false,
    }
}

/// `receiver_type <: declared`, solving for the type parameters that occur
/// in `declared` by name.
fn receiver_type_fits(db: &TypeInterner, receiver_type: TypeId, declared: TypeId, type_params: &[TypeParamId]) -> bool {
    if !type_queries::contains_type_params(db, declared) {
        return is_subtype_of(db, receiver_type, declared);
    }
    let used_names = type_queries::collect_used_type_names(db, declared);
    let variables: Vec<TypeParamId> = type_params
        .iter()
        .copied()
        .filter(|&param| {
            db.type_param_info(param)
                .is_some_and(|info| used_names.contains(&info.name))
        })
        .collect();
    let mut system = ConstraintSystemImpl::new(db);
    system.register_type_variables(&variables);
    system.add_subtype_constraint(receiver_type, declared, ConstraintPosition::Receiver);
    system.status().is_successful() && system.check_bounds_satisfied(true)
}
