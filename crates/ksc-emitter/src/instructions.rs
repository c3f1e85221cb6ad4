//! Instruction model and the adapter code generation writes through.
//!
//! The adapter mirrors the typed helpers of ASM's `InstructionAdapter`:
//! callers say `aload(Int)` and the adapter picks `IALOAD`.

use crate::asm_type::{AsmType, method_descriptor};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

#[derive(Clone, Debug, PartialEq)]
pub enum Constant {
    Null,
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(Arc<str>),
}

/// Primitive conversion opcodes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Conversion {
    I2L,
    I2F,
    I2D,
    I2B,
    I2C,
    I2S,
    L2I,
    L2F,
    L2D,
    F2I,
    F2L,
    F2D,
    D2I,
    D2L,
    D2F,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InvokeOpcode {
    Static,
    Virtual,
    Interface,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    Push(Constant),
    /// Load a local slot.
    Load { slot: u16, ty: AsmType },
    /// Array element load (`IALOAD`, `AALOAD`, ...) of the element type.
    ArrayLoad(AsmType),
    ArrayLength,
    Neg(AsmType),
    Convert(Conversion),
    Pop,
    Pop2,
    CheckCast(AsmType),
    GetStatic {
        owner: Arc<str>,
        name: Arc<str>,
        descriptor: Arc<str>,
    },
    Invoke {
        opcode: InvokeOpcode,
        owner: Arc<str>,
        name: Arc<str>,
        descriptor: Arc<str>,
    },
}

impl Instruction {
    /// Opcode name as a disassembler prints it.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Push(constant) => match constant {
                Constant::Null => "ACONST_NULL",
                Constant::Int(-1) => "ICONST_M1",
                Constant::Int(0) => "ICONST_0",
                Constant::Int(1) => "ICONST_1",
                Constant::Int(2) => "ICONST_2",
                Constant::Int(3) => "ICONST_3",
                Constant::Int(4) => "ICONST_4",
                Constant::Int(5) => "ICONST_5",
                Constant::Int(value) if i8::try_from(*value).is_ok() => "BIPUSH",
                Constant::Int(value) if i16::try_from(*value).is_ok() => "SIPUSH",
                Constant::Long(0) => "LCONST_0",
                Constant::Long(1) => "LCONST_1",
                Constant::Float(value) if *value == 0.0 => "FCONST_0",
                Constant::Float(value) if *value == 1.0 => "FCONST_1",
                Constant::Float(value) if *value == 2.0 => "FCONST_2",
                Constant::Double(value) if *value == 0.0 => "DCONST_0",
                Constant::Double(value) if *value == 1.0 => "DCONST_1",
                _ => "LDC",
            },
            Instruction::Load { ty, .. } => match ty {
                AsmType::Long => "LLOAD",
                AsmType::Float => "FLOAD",
                AsmType::Double => "DLOAD",
                AsmType::Object(_) | AsmType::Array(_) => "ALOAD",
                _ => "ILOAD",
            },
            Instruction::ArrayLoad(element) => match element {
                AsmType::Boolean | AsmType::Byte => "BALOAD",
                AsmType::Char => "CALOAD",
                AsmType::Short => "SALOAD",
                AsmType::Long => "LALOAD",
                AsmType::Float => "FALOAD",
                AsmType::Double => "DALOAD",
                AsmType::Object(_) | AsmType::Array(_) => "AALOAD",
                _ => "IALOAD",
            },
            Instruction::ArrayLength => "ARRAYLENGTH",
            Instruction::Neg(ty) => match ty {
                AsmType::Long => "LNEG",
                AsmType::Float => "FNEG",
                AsmType::Double => "DNEG",
                _ => "INEG",
            },
            Instruction::Convert(conversion) => match conversion {
                Conversion::I2L => "I2L",
                Conversion::I2F => "I2F",
                Conversion::I2D => "I2D",
                Conversion::I2B => "I2B",
                Conversion::I2C => "I2C",
                Conversion::I2S => "I2S",
                Conversion::L2I => "L2I",
                Conversion::L2F => "L2F",
                Conversion::L2D => "L2D",
                Conversion::F2I => "F2I",
                Conversion::F2L => "F2L",
                Conversion::F2D => "F2D",
                Conversion::D2I => "D2I",
                Conversion::D2L => "D2L",
                Conversion::D2F => "D2F",
            },
            Instruction::Pop => "POP",
            Instruction::Pop2 => "POP2",
            Instruction::CheckCast(_) => "CHECKCAST",
            Instruction::GetStatic { .. } => "GETSTATIC",
            Instruction::Invoke { opcode, .. } => match opcode {
                InvokeOpcode::Static => "INVOKESTATIC",
                InvokeOpcode::Virtual => "INVOKEVIRTUAL",
                InvokeOpcode::Interface => "INVOKEINTERFACE",
            },
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mnemonic = self.mnemonic();
        match self {
            Instruction::Push(constant) => match constant {
                Constant::Int(value) if mnemonic == "BIPUSH" || mnemonic == "SIPUSH" || mnemonic == "LDC" => {
                    write!(f, "{mnemonic} {value}")
                }
                Constant::Long(value) if mnemonic == "LDC" => write!(f, "LDC {value}L"),
                Constant::Float(value) if mnemonic == "LDC" => write!(f, "LDC {value:?}F"),
                Constant::Double(value) if mnemonic == "LDC" => write!(f, "LDC {value:?}D"),
                Constant::String(text) => write!(f, "LDC {text:?}"),
                _ => f.write_str(mnemonic),
            },
            Instruction::Load { slot, .. } => write!(f, "{mnemonic} {slot}"),
            Instruction::CheckCast(ty) => write!(f, "{mnemonic} {}", ty.internal_name()),
            Instruction::GetStatic {
                owner,
                name,
                descriptor,
            } => write!(f, "{mnemonic} {owner}.{name} : {descriptor}"),
            Instruction::Invoke {
                owner,
                name,
                descriptor,
                ..
            } => write!(f, "{mnemonic} {owner}.{name} {descriptor}"),
            _ => f.write_str(mnemonic),
        }
    }
}

/// Append-only instruction sink.
#[derive(Clone, Debug, Default)]
pub struct InstructionAdapter {
    instructions: Vec<Instruction>,
}

impl InstructionAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }

    pub fn mnemonics(&self) -> Vec<&'static str> {
        self.instructions.iter().map(Instruction::mnemonic).collect()
    }

    /// One instruction per line.
    pub fn listing(&self) -> String {
        self.instructions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    fn emit(&mut self, instruction: Instruction) {
        trace!(%instruction, "emit");
        self.instructions.push(instruction);
    }

    pub fn push(&mut self, constant: Constant) {
        self.emit(Instruction::Push(constant));
    }

    pub fn iconst(&mut self, value: i32) {
        self.push(Constant::Int(value));
    }

    pub fn aconst_null(&mut self) {
        self.push(Constant::Null);
    }

    /// Zero of `ty`: `0`, `0L`, `0.0F`, `0.0D` or `null`.
    pub fn push_default_value(&mut self, ty: &AsmType) {
        match ty {
            AsmType::Void => {}
            AsmType::Long => self.push(Constant::Long(0)),
            AsmType::Float => self.push(Constant::Float(0.0)),
            AsmType::Double => self.push(Constant::Double(0.0)),
            AsmType::Object(_) | AsmType::Array(_) => self.aconst_null(),
            _ => self.iconst(0),
        }
    }

    pub fn load(&mut self, slot: u16, ty: &AsmType) {
        self.emit(Instruction::Load { slot, ty: ty.clone() });
    }

    /// Array element load for `element`.
    pub fn aload(&mut self, element: &AsmType) {
        self.emit(Instruction::ArrayLoad(element.clone()));
    }

    pub fn arraylength(&mut self) {
        self.emit(Instruction::ArrayLength);
    }

    pub fn neg(&mut self, ty: &AsmType) {
        self.emit(Instruction::Neg(ty.clone()));
    }

    /// Pop one value of `ty`.
    pub fn pop_value(&mut self, ty: &AsmType) {
        match ty.size() {
            0 => {}
            1 => self.emit(Instruction::Pop),
            _ => self.emit(Instruction::Pop2),
        }
    }

    pub fn checkcast(&mut self, ty: &AsmType) {
        self.emit(Instruction::CheckCast(ty.clone()));
    }

    pub fn getstatic(&mut self, owner: &str, name: &str, descriptor: &str) {
        self.emit(Instruction::GetStatic {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        });
    }

    pub fn invoke(&mut self, opcode: InvokeOpcode, owner: &str, name: &str, descriptor: &str) {
        self.emit(Instruction::Invoke {
            opcode,
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        });
    }

    pub fn invokestatic(&mut self, owner: &str, name: &str, descriptor: &str) {
        self.invoke(InvokeOpcode::Static, owner, name, descriptor);
    }

    pub fn invokevirtual(&mut self, owner: &str, name: &str, descriptor: &str) {
        self.invoke(InvokeOpcode::Virtual, owner, name, descriptor);
    }

    pub fn invokeinterface(&mut self, owner: &str, name: &str, descriptor: &str) {
        self.invoke(InvokeOpcode::Interface, owner, name, descriptor);
    }

    /// Primitive-to-primitive conversion. Int-like types share a stack
    /// representation; `Boolean` never converts.
    pub fn cast(&mut self, from: &AsmType, to: &AsmType) {
        if from == to || *from == AsmType::Boolean || *to == AsmType::Boolean {
            return;
        }
        let narrow_from_int = |adapter: &mut Self| adapter.cast(&AsmType::Int, to);
        match from {
            AsmType::Double => match to {
                AsmType::Float => self.emit(Instruction::Convert(Conversion::D2F)),
                AsmType::Long => self.emit(Instruction::Convert(Conversion::D2L)),
                _ => {
                    self.emit(Instruction::Convert(Conversion::D2I));
                    narrow_from_int(self);
                }
            },
            AsmType::Float => match to {
                AsmType::Double => self.emit(Instruction::Convert(Conversion::F2D)),
                AsmType::Long => self.emit(Instruction::Convert(Conversion::F2L)),
                _ => {
                    self.emit(Instruction::Convert(Conversion::F2I));
                    narrow_from_int(self);
                }
            },
            AsmType::Long => match to {
                AsmType::Double => self.emit(Instruction::Convert(Conversion::L2D)),
                AsmType::Float => self.emit(Instruction::Convert(Conversion::L2F)),
                _ => {
                    self.emit(Instruction::Convert(Conversion::L2I));
                    narrow_from_int(self);
                }
            },
            _ => match to {
                AsmType::Byte => self.emit(Instruction::Convert(Conversion::I2B)),
                AsmType::Char => self.emit(Instruction::Convert(Conversion::I2C)),
                AsmType::Short => self.emit(Instruction::Convert(Conversion::I2S)),
                AsmType::Long => self.emit(Instruction::Convert(Conversion::I2L)),
                AsmType::Float => self.emit(Instruction::Convert(Conversion::I2F)),
                AsmType::Double => self.emit(Instruction::Convert(Conversion::I2D)),
                _ => {}
            },
        }
    }

    /// `String.valueOf` overload for `ty`.
    pub fn string_value_of(&mut self, ty: &AsmType) {
        let descriptor = method_descriptor(std::slice::from_ref(ty), &AsmType::string());
        self.invokestatic("java/lang/String", "valueOf", &descriptor);
    }
}
