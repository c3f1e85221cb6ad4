//! Builtin members compiled to instruction sequences instead of calls.
//!
//! The table maps `(owner class, name, arity)` of a resolved candidate to
//! an `IntrinsicMethod`. It is built once and never changes.

mod callable;

pub use callable::IntrinsicCallable;

use crate::asm_type::AsmType;
use crate::codegen::ExpressionCodegen;
use crate::error::CodegenError;
use crate::stack_value::{StackValue, coerce};
use crate::type_mapper::CallableMethod;
use ksc_binder::{BinderState, DeclId};
use ksc_solver::{DefId, TypeInterner, type_queries};
use ksc_syntax::NodeIndex;
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntrinsicMethod {
    /// `array[index]` on `Array<T>` and the primitive arrays.
    ArrayGet,
    /// `array.size`
    ArraySize,
    /// `CharSequence.length`
    StringLength,
    UnaryPlus,
    UnaryMinus,
    ToString,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct IntrinsicKey {
    owner: DefId,
    arity: usize,
}

const ARRAYS: [DefId; 9] = [
    DefId::ARRAY,
    DefId::BOOLEAN_ARRAY,
    DefId::CHAR_ARRAY,
    DefId::BYTE_ARRAY,
    DefId::SHORT_ARRAY,
    DefId::INT_ARRAY,
    DefId::LONG_ARRAY,
    DefId::FLOAT_ARRAY,
    DefId::DOUBLE_ARRAY,
];

const NUMBERS: [DefId; 6] = [
    DefId::BYTE,
    DefId::SHORT,
    DefId::INT,
    DefId::LONG,
    DefId::FLOAT,
    DefId::DOUBLE,
];

type IntrinsicTable = FxHashMap<&'static str, SmallVec<[(IntrinsicKey, IntrinsicMethod); 4]>>;

static INTRINSICS: Lazy<IntrinsicTable> = Lazy::new(|| {
    let mut table = IntrinsicTable::default();
    let mut register = |owner: DefId, name: &'static str, arity: usize, method: IntrinsicMethod| {
        table
            .entry(name)
            .or_default()
            .push((IntrinsicKey { owner, arity }, method));
    };
    for array in ARRAYS {
        register(array, "get", 1, IntrinsicMethod::ArrayGet);
        register(array, "size", 0, IntrinsicMethod::ArraySize);
    }
    register(DefId::CHAR_SEQUENCE, "length", 0, IntrinsicMethod::StringLength);
    for number in NUMBERS {
        register(number, "plus", 0, IntrinsicMethod::UnaryPlus);
        register(number, "minus", 0, IntrinsicMethod::UnaryMinus);
    }
    register(DefId::ANY, "toString", 0, IntrinsicMethod::ToString);
    table
});

/// Intrinsic implementing the resolved `candidate`, if any. Only builtin
/// members qualify; user functions of the same shape are called normally.
pub fn lookup(db: &TypeInterner, binder: &BinderState, candidate: DeclId) -> Option<IntrinsicMethod> {
    if !binder.is_builtin_member(candidate) {
        return None;
    }
    let descriptor = binder.callable(candidate)?;
    let owner = type_queries::class_def(db, descriptor.dispatch_receiver?)?;
    let name = db.resolve_name(descriptor.name);
    let arity = descriptor.value_params.len();
    INTRINSICS
        .get(&*name)?
        .iter()
        .find(|(key, _)| key.owner == owner && key.arity == arity)
        .map(|&(_, method)| method)
}

impl IntrinsicMethod {
    /// Whether a callable reference to the member can use the intrinsic.
    pub const fn supports_callable(self) -> bool {
        !matches!(self, IntrinsicMethod::ArrayGet | IntrinsicMethod::ToString)
    }

    /// Generate the intrinsic and leave its value on the stack as
    /// `return_type`.
    ///
    /// `receiver` is the receiver value not yet put on the stack; when it is
    /// `StackValue::None` the receiver is the first of `arguments`.
    pub fn generate(
        self,
        codegen: &mut ExpressionCodegen<'_>,
        return_type: &AsmType,
        arguments: &[NodeIndex],
        receiver: StackValue,
    ) -> Result<StackValue, CodegenError> {
        debug!(intrinsic = ?self, %return_type, "generate intrinsic");
        let actual = self.generate_impl(codegen, return_type, arguments, receiver)?;
        coerce(&actual, return_type, &mut codegen.v);
        Ok(StackValue::OnStack(return_type.clone()))
    }

    fn generate_impl(
        self,
        codegen: &mut ExpressionCodegen<'_>,
        return_type: &AsmType,
        arguments: &[NodeIndex],
        receiver: StackValue,
    ) -> Result<AsmType, CodegenError> {
        let (receiver, arguments) = self.receiver_or_first_argument(codegen, receiver, arguments)?;
        match self {
            IntrinsicMethod::ArrayGet => {
                let array_type = receiver.ty();
                let element = array_type
                    .element_type()
                    .cloned()
                    .ok_or_else(|| CodegenError::NotAnArray(array_type.clone()))?;
                let index = arguments.first().copied().ok_or(CodegenError::MissingArgument {
                    intrinsic: self,
                    index: 0,
                })?;
                receiver.put(&array_type, &mut codegen.v);
                codegen.gen_expression(index, &AsmType::Int)?;
                codegen.v.aload(&element);
                Ok(element)
            }
            IntrinsicMethod::ArraySize => {
                let array_type = receiver.ty();
                if array_type.element_type().is_none() {
                    return Err(CodegenError::NotAnArray(array_type));
                }
                receiver.put(&array_type, &mut codegen.v);
                codegen.v.arraylength();
                Ok(AsmType::Int)
            }
            IntrinsicMethod::StringLength => {
                receiver.put(&receiver.ty(), &mut codegen.v);
                codegen
                    .v
                    .invokeinterface("java/lang/CharSequence", "length", "()I");
                Ok(AsmType::Int)
            }
            IntrinsicMethod::UnaryPlus => {
                self.check_primitive(codegen, return_type)?;
                receiver.put(return_type, &mut codegen.v);
                Ok(return_type.clone())
            }
            IntrinsicMethod::UnaryMinus => {
                self.check_primitive(codegen, return_type)?;
                let operand = return_type.number_function_operand_type();
                receiver.put(&operand, &mut codegen.v);
                codegen.v.neg(&operand);
                Ok(operand)
            }
            IntrinsicMethod::ToString => {
                let operand = receiver.ty().string_value_of_type();
                receiver.put(&operand, &mut codegen.v);
                codegen.v.string_value_of(&operand);
                Ok(AsmType::string())
            }
        }
    }

    /// Split off the receiver; without one on hand, the first argument is
    /// the receiver.
    fn receiver_or_first_argument<'n>(
        self,
        codegen: &mut ExpressionCodegen<'_>,
        receiver: StackValue,
        arguments: &'n [NodeIndex],
    ) -> Result<(StackValue, &'n [NodeIndex]), CodegenError> {
        if receiver != StackValue::None {
            return Ok((receiver, arguments));
        }
        let (&first, rest) = arguments.split_first().ok_or(CodegenError::MissingArgument {
            intrinsic: self,
            index: 0,
        })?;
        Ok((codegen.gen_value(first)?, rest))
    }

    fn check_primitive(self, codegen: &ExpressionCodegen<'_>, ty: &AsmType) -> Result<(), CodegenError> {
        if codegen.options().assert_primitive_operands && !ty.is_primitive() {
            return Err(CodegenError::NonPrimitiveOperand {
                intrinsic: self,
                ty: ty.clone(),
            });
        }
        Ok(())
    }

    /// Callable form of the intrinsic for a member lowered to `method`.
    pub fn to_callable(
        self,
        method: &CallableMethod,
        assert_primitive_operands: bool,
    ) -> Result<IntrinsicCallable, CodegenError> {
        IntrinsicCallable::new(self, method, assert_primitive_operands)
    }
}
