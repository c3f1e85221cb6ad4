//! JVM value types.

use std::fmt;
use std::sync::Arc;

/// A JVM type as it appears in descriptors and on the operand stack.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AsmType {
    Void,
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    /// Class or interface, by internal name (`java/lang/String`).
    Object(Arc<str>),
    Array(Box<AsmType>),
}

pub const OBJECT: &str = "java/lang/Object";
pub const STRING: &str = "java/lang/String";
pub const NUMBER: &str = "java/lang/Number";
pub const UNIT: &str = "kotlin/Unit";

impl AsmType {
    pub fn object(internal_name: &str) -> Self {
        AsmType::Object(internal_name.into())
    }

    pub fn array_of(element: AsmType) -> Self {
        AsmType::Array(Box::new(element))
    }

    pub fn java_object() -> Self {
        AsmType::object(OBJECT)
    }

    pub fn string() -> Self {
        AsmType::object(STRING)
    }

    pub const fn is_primitive(&self) -> bool {
        !matches!(self, AsmType::Void | AsmType::Object(_) | AsmType::Array(_))
    }

    pub const fn is_reference(&self) -> bool {
        matches!(self, AsmType::Object(_) | AsmType::Array(_))
    }

    /// Primitives that live on the stack as `int`.
    pub const fn is_int_like(&self) -> bool {
        matches!(
            self,
            AsmType::Boolean | AsmType::Char | AsmType::Byte | AsmType::Short | AsmType::Int
        )
    }

    /// Stack slots taken by a value of this type.
    pub const fn size(&self) -> u16 {
        match self {
            AsmType::Void => 0,
            AsmType::Long | AsmType::Double => 2,
            _ => 1,
        }
    }

    pub fn is_object(&self, internal_name: &str) -> bool {
        matches!(self, AsmType::Object(name) if &**name == internal_name)
    }

    pub fn element_type(&self) -> Option<&AsmType> {
        match self {
            AsmType::Array(element) => Some(element),
            _ => None,
        }
    }

    /// Wrapper class of a primitive; references are returned unchanged.
    pub fn boxed(&self) -> AsmType {
        match self.wrapper_name() {
            Some(name) => AsmType::object(name),
            None => self.clone(),
        }
    }

    /// Primitive a wrapper class unboxes to.
    pub fn unboxed(&self) -> Option<AsmType> {
        let AsmType::Object(name) = self else {
            return None;
        };
        let primitive = match &**name {
            "java/lang/Boolean" => AsmType::Boolean,
            "java/lang/Character" => AsmType::Char,
            "java/lang/Byte" => AsmType::Byte,
            "java/lang/Short" => AsmType::Short,
            "java/lang/Integer" => AsmType::Int,
            "java/lang/Long" => AsmType::Long,
            "java/lang/Float" => AsmType::Float,
            "java/lang/Double" => AsmType::Double,
            _ => return None,
        };
        Some(primitive)
    }

    pub const fn wrapper_name(&self) -> Option<&'static str> {
        match self {
            AsmType::Boolean => Some("java/lang/Boolean"),
            AsmType::Char => Some("java/lang/Character"),
            AsmType::Byte => Some("java/lang/Byte"),
            AsmType::Short => Some("java/lang/Short"),
            AsmType::Int => Some("java/lang/Integer"),
            AsmType::Long => Some("java/lang/Long"),
            AsmType::Float => Some("java/lang/Float"),
            AsmType::Double => Some("java/lang/Double"),
            _ => None,
        }
    }

    /// Name of the `Number`/`Boolean`/`Character` accessor unboxing to this
    /// primitive, e.g. `intValue`.
    pub const fn unbox_method(&self) -> Option<&'static str> {
        match self {
            AsmType::Boolean => Some("booleanValue"),
            AsmType::Char => Some("charValue"),
            AsmType::Byte => Some("byteValue"),
            AsmType::Short => Some("shortValue"),
            AsmType::Int => Some("intValue"),
            AsmType::Long => Some("longValue"),
            AsmType::Float => Some("floatValue"),
            AsmType::Double => Some("doubleValue"),
            _ => None,
        }
    }

    /// Operand type of arithmetic on this type: sub-int primitives compute
    /// in `int`.
    pub fn number_function_operand_type(&self) -> AsmType {
        match self {
            AsmType::Byte | AsmType::Short | AsmType::Char => AsmType::Int,
            other => other.clone(),
        }
    }

    /// Argument type of the `String.valueOf` overload used for this type.
    pub fn string_value_of_type(&self) -> AsmType {
        match self {
            AsmType::Byte | AsmType::Short => AsmType::Int,
            AsmType::Void | AsmType::Object(_) | AsmType::Array(_) => AsmType::java_object(),
            other => other.clone(),
        }
    }

    /// `I`, `Ljava/lang/String;`, `[I`.
    pub fn descriptor(&self) -> String {
        let mut out = String::new();
        self.write_descriptor(&mut out);
        out
    }

    fn write_descriptor(&self, out: &mut String) {
        match self {
            AsmType::Void => out.push('V'),
            AsmType::Boolean => out.push('Z'),
            AsmType::Char => out.push('C'),
            AsmType::Byte => out.push('B'),
            AsmType::Short => out.push('S'),
            AsmType::Int => out.push('I'),
            AsmType::Long => out.push('J'),
            AsmType::Float => out.push('F'),
            AsmType::Double => out.push('D'),
            AsmType::Object(name) => {
                out.push('L');
                out.push_str(name);
                out.push(';');
            }
            AsmType::Array(element) => {
                out.push('[');
                element.write_descriptor(out);
            }
        }
    }

    /// Name used by `CHECKCAST` and as an invocation owner: the internal
    /// name for classes, the descriptor for arrays and primitives.
    pub fn internal_name(&self) -> String {
        match self {
            AsmType::Object(name) => name.to_string(),
            other => other.descriptor(),
        }
    }
}

impl fmt::Display for AsmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor())
    }
}

/// `(I)Ljava/lang/String;`
pub fn method_descriptor(params: &[AsmType], return_type: &AsmType) -> String {
    let mut out = String::from("(");
    for param in params {
        param.write_descriptor(&mut out);
    }
    out.push(')');
    return_type.write_descriptor(&mut out);
    out
}
