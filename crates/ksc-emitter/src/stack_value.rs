//! Values produced by code generation and the coercions between their
//! stack representations.

use crate::asm_type::{AsmType, NUMBER, OBJECT, UNIT, method_descriptor};
use crate::instructions::{Constant, InstructionAdapter};
use tracing::trace;

/// Where a generated value lives until it is put on the stack.
#[derive(Clone, Debug, PartialEq)]
pub enum StackValue {
    /// No value; putting it as a non-void type pushes a default.
    None,
    /// Already on the operand stack.
    OnStack(AsmType),
    Local { slot: u16, ty: AsmType },
    Constant { value: Constant, ty: AsmType },
}

impl StackValue {
    pub fn ty(&self) -> AsmType {
        match self {
            StackValue::None => AsmType::Void,
            StackValue::OnStack(ty) | StackValue::Local { ty, .. } | StackValue::Constant { ty, .. } => {
                ty.clone()
            }
        }
    }

    pub const fn is_on_stack(&self) -> bool {
        matches!(self, StackValue::OnStack(_))
    }

    /// Materialize the value on the stack as `ty`.
    pub fn put(&self, ty: &AsmType, v: &mut InstructionAdapter) {
        match self {
            StackValue::None => coerce(&AsmType::Void, ty, v),
            StackValue::OnStack(actual) => coerce(actual, ty, v),
            StackValue::Local { slot, ty: actual } => {
                v.load(*slot, actual);
                coerce(actual, ty, v);
            }
            StackValue::Constant { value, ty: actual } => {
                v.push(value.clone());
                coerce(actual, ty, v);
            }
        }
    }
}

/// Convert the value on top of the stack from `from` to `to`.
pub fn coerce(from: &AsmType, to: &AsmType, v: &mut InstructionAdapter) {
    if from == to {
        return;
    }
    trace!(%from, %to, "coerce");

    if *to == AsmType::Void {
        v.pop_value(from);
        return;
    }
    if *from == AsmType::Void {
        if to.is_object(UNIT) {
            let descriptor = to.descriptor();
            v.getstatic(UNIT, "INSTANCE", &descriptor);
        } else {
            v.push_default_value(to);
        }
        return;
    }

    match (from.is_primitive(), to.is_primitive()) {
        (true, true) => v.cast(from, to),
        (true, false) => box_value(from, to, v),
        (false, true) => unbox_value(from, to, v),
        (false, false) => {
            if !to.is_object(OBJECT) && !is_numeric_wrapper_widening(from, to) {
                v.checkcast(to);
            }
        }
    }
}

/// A numeric wrapper used as `Number` needs no check.
fn is_numeric_wrapper_widening(from: &AsmType, to: &AsmType) -> bool {
    to.is_object(NUMBER)
        && from
            .unboxed()
            .is_some_and(|primitive| !matches!(primitive, AsmType::Boolean | AsmType::Char))
}

fn box_value(from: &AsmType, to: &AsmType, v: &mut InstructionAdapter) {
    let boxed = from.boxed();
    let descriptor = method_descriptor(std::slice::from_ref(from), &boxed);
    v.invokestatic(&boxed.internal_name(), "valueOf", &descriptor);
    if *to != boxed && !to.is_object(OBJECT) && !is_numeric_wrapper_widening(&boxed, to) {
        v.checkcast(to);
    }
}

fn unbox_value(from: &AsmType, to: &AsmType, v: &mut InstructionAdapter) {
    let owner = match to {
        AsmType::Boolean => AsmType::object("java/lang/Boolean"),
        AsmType::Char => AsmType::object("java/lang/Character"),
        _ => AsmType::object(NUMBER),
    };
    coerce(from, &owner, v);
    if let Some(method) = to.unbox_method() {
        let descriptor = method_descriptor(&[], to);
        v.invokevirtual(&owner.internal_name(), method, &descriptor);
    }
}
