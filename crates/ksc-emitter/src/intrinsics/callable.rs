use super::IntrinsicMethod;
use crate::asm_type::AsmType;
use crate::error::CodegenError;
use crate::instructions::InstructionAdapter;
use crate::stack_value::StackValue;
use crate::type_mapper::CallableMethod;

type Thunk = fn(&IntrinsicCallable, &mut InstructionAdapter);

/// An intrinsic packaged as a callable: the signature seen by callers and
/// the instructions that replace the invocation.
#[derive(Clone, Debug)]
pub struct IntrinsicCallable {
    pub intrinsic: IntrinsicMethod,
    pub return_type: AsmType,
    pub value_parameter_types: Vec<AsmType>,
    /// Type the dispatch receiver is put as before `invoke`.
    pub this_type: Option<AsmType>,
    pub receiver_type: Option<AsmType>,
    thunk: Thunk,
}

impl IntrinsicCallable {
    pub(super) fn new(
        intrinsic: IntrinsicMethod,
        method: &CallableMethod,
        assert_primitive_operands: bool,
    ) -> Result<Self, CodegenError> {
        let mut this_type = method.this_type.clone();
        let thunk: Thunk = match intrinsic {
            IntrinsicMethod::ArrayGet | IntrinsicMethod::ToString => {
                return Err(CodegenError::CallableNotSupported(intrinsic));
            }
            IntrinsicMethod::ArraySize => |_, v| v.arraylength(),
            IntrinsicMethod::StringLength => {
                |_, v| v.invokeinterface("java/lang/CharSequence", "length", "()I")
            }
            IntrinsicMethod::UnaryPlus | IntrinsicMethod::UnaryMinus => {
                if assert_primitive_operands && !method.return_type.is_primitive() {
                    return Err(CodegenError::NonPrimitiveOperand {
                        intrinsic,
                        ty: method.return_type.clone(),
                    });
                }
                if intrinsic == IntrinsicMethod::UnaryPlus {
                    this_type = Some(method.return_type.clone());
                    |_, _| {}
                } else {
                    this_type = Some(method.return_type.number_function_operand_type());
                    |callable, v| {
                        if let Some(operand) = &callable.this_type {
                            v.neg(operand);
                        }
                    }
                }
            }
        };
        Ok(IntrinsicCallable {
            intrinsic,
            return_type: method.return_type.clone(),
            value_parameter_types: method.value_parameter_types.clone(),
            this_type,
            receiver_type: method.receiver_type.clone(),
            thunk,
        })
    }

    /// Emit the intrinsic body; receiver and arguments are already on the
    /// stack.
    pub fn invoke(&self, v: &mut InstructionAdapter) {
        (self.thunk)(self, v);
    }

    /// Put `receiver` as the expected receiver type, then invoke.
    pub fn invoke_with_receiver(&self, receiver: &StackValue, v: &mut InstructionAdapter) {
        if let Some(ty) = self.this_type.as_ref().or(self.receiver_type.as_ref()) {
            receiver.put(ty, v);
        }
        self.invoke(v);
    }
}
