//! Mapping of checked types and signatures to JVM types and methods.

use crate::asm_type::{AsmType, method_descriptor};
use crate::error::CodegenError;
use crate::instructions::InvokeOpcode;
use ksc_binder::CallableDescriptor;
use ksc_solver::{ClassKind, DefId, TypeData, TypeFormatter, TypeId, TypeInterner};
use std::sync::Arc;

/// A callable lowered to a JVM method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallableMethod {
    pub owner: String,
    pub name: String,
    pub opcode: InvokeOpcode,
    /// Declared value parameters, without the extension receiver.
    pub value_parameter_types: Vec<AsmType>,
    pub return_type: AsmType,
    /// Class the member is dispatched on.
    pub this_type: Option<AsmType>,
    /// Extension receiver, passed as the first argument.
    pub receiver_type: Option<AsmType>,
}

impl CallableMethod {
    /// Parameter types of the JVM method, extension receiver first.
    pub fn argument_types(&self) -> Vec<AsmType> {
        self.receiver_type
            .iter()
            .chain(self.value_parameter_types.iter())
            .cloned()
            .collect()
    }

    pub fn descriptor(&self) -> String {
        method_descriptor(&self.argument_types(), &self.return_type)
    }
}

pub struct TypeMapper<'a> {
    db: &'a TypeInterner,
    /// Internal name of the class holding top-level functions.
    facade: String,
}

impl<'a> TypeMapper<'a> {
    /// `package` is the dotted package name; top-level functions go to
    /// `<package path>/<Package>Package`.
    pub fn new(db: &'a TypeInterner, package: &str) -> Self {
        TypeMapper {
            db,
            facade: facade_name(package),
        }
    }

    pub fn facade(&self) -> &str {
        &self.facade
    }

    pub fn map_type(&self, ty: TypeId) -> Result<AsmType, CodegenError> {
        match self.db.lookup(ty) {
            None => Err(CodegenError::ErrorType(TypeFormatter::new(self.db).format(ty))),
            Some(TypeData::Error { .. }) => Err(CodegenError::ErrorType(TypeFormatter::new(self.db).format(ty))),
            Some(TypeData::TypeParameter { .. }) => Ok(AsmType::java_object()),
            Some(TypeData::Class { def, args, nullable }) => self.map_class(def, &args, nullable),
        }
    }

    /// Type of a value stored as a generic argument: primitives box.
    pub fn map_boxed_type(&self, ty: TypeId) -> Result<AsmType, CodegenError> {
        Ok(self.map_type(ty)?.boxed())
    }

    fn map_class(&self, def: DefId, args: &[TypeId], nullable: bool) -> Result<AsmType, CodegenError> {
        if let Some(primitive) = primitive_of(def) {
            return Ok(if nullable { primitive.boxed() } else { primitive });
        }
        if let Some(element) = primitive_array_element(def) {
            return Ok(AsmType::array_of(element));
        }
        let mapped = match def {
            DefId::UNIT if nullable => AsmType::object(crate::asm_type::UNIT),
            DefId::UNIT => AsmType::Void,
            DefId::ANY => AsmType::java_object(),
            DefId::NOTHING => AsmType::object("java/lang/Void"),
            DefId::NUMBER => AsmType::object(crate::asm_type::NUMBER),
            DefId::CHAR_SEQUENCE => AsmType::object("java/lang/CharSequence"),
            DefId::STRING => AsmType::string(),
            DefId::COMPARABLE => AsmType::object("java/lang/Comparable"),
            DefId::FUNCTION => AsmType::object("kotlin/Function"),
            DefId::ARRAY => {
                let element = match args.first() {
                    Some(&arg) => self.map_boxed_type(arg)?,
                    None => AsmType::java_object(),
                };
                AsmType::array_of(element)
            }
            _ => {
                let info = self
                    .db
                    .class_info(def)
                    .ok_or_else(|| CodegenError::ErrorType(format!("unknown class {}", def.0)))?;
                let fq_name = self.db.resolve_name(info.fq_name);
                AsmType::Object(Arc::from(fq_name.replace('.', "/")))
            }
        };
        Ok(mapped)
    }

    fn is_interface(&self, ty: TypeId) -> bool {
        match self.db.lookup(ty) {
            Some(TypeData::Class { def, .. }) => {
                def == DefId::CHAR_SEQUENCE
                    || def == DefId::COMPARABLE
                    || def == DefId::FUNCTION
                    || self
                        .db
                        .class_info(def)
                        .is_some_and(|info| info.kind == ClassKind::Interface)
            }
            _ => false,
        }
    }

    /// Lower a declared signature. Pass the candidate (unsubstituted)
    /// descriptor so type parameters erase to `Object`.
    pub fn map_to_callable_method(&self, descriptor: &CallableDescriptor) -> Result<CallableMethod, CodegenError> {
        let value_parameter_types = descriptor
            .value_param_types()
            .map(|ty| self.map_type(ty))
            .collect::<Result<Vec<_>, _>>()?;
        let return_type = self.map_type(descriptor.return_type)?;
        let receiver_type = descriptor
            .extension_receiver
            .map(|ty| self.map_type(ty))
            .transpose()?;
        let this_type = descriptor
            .dispatch_receiver
            .map(|ty| self.map_type(ty))
            .transpose()?;

        let raw_name = self.db.resolve_name(descriptor.name);
        let name = if descriptor.is_property() {
            getter_name(&raw_name)
        } else {
            raw_name.to_string()
        };

        let (owner, opcode) = match (&this_type, descriptor.dispatch_receiver) {
            (Some(this), Some(dispatch)) => {
                let opcode = if self.is_interface(dispatch) {
                    InvokeOpcode::Interface
                } else {
                    InvokeOpcode::Virtual
                };
                (this.internal_name(), opcode)
            }
            _ => (self.facade.clone(), InvokeOpcode::Static),
        };

        Ok(CallableMethod {
            owner,
            name,
            opcode,
            value_parameter_types,
            return_type,
            this_type,
            receiver_type,
        })
    }
}

fn primitive_of(def: DefId) -> Option<AsmType> {
    Some(match def {
        DefId::BOOLEAN => AsmType::Boolean,
        DefId::CHAR => AsmType::Char,
        DefId::BYTE => AsmType::Byte,
        DefId::SHORT => AsmType::Short,
        DefId::INT => AsmType::Int,
        DefId::LONG => AsmType::Long,
        DefId::FLOAT => AsmType::Float,
        DefId::DOUBLE => AsmType::Double,
        _ => return None,
    })
}

fn primitive_array_element(def: DefId) -> Option<AsmType> {
    Some(match def {
        DefId::BOOLEAN_ARRAY => AsmType::Boolean,
        DefId::CHAR_ARRAY => AsmType::Char,
        DefId::BYTE_ARRAY => AsmType::Byte,
        DefId::SHORT_ARRAY => AsmType::Short,
        DefId::INT_ARRAY => AsmType::Int,
        DefId::LONG_ARRAY => AsmType::Long,
        DefId::FLOAT_ARRAY => AsmType::Float,
        DefId::DOUBLE_ARRAY => AsmType::Double,
        _ => return None,
    })
}

/// `demo.util` -> `demo/util/UtilPackage`; the root package -> `_DefaultPackage`.
pub fn facade_name(package: &str) -> String {
    let Some(last) = package.rsplit('.').next().filter(|segment| !segment.is_empty()) else {
        return "_DefaultPackage".to_string();
    };
    let mut class_name = capitalize(last);
    class_name.push_str("Package");
    format!("{}/{class_name}", package.replace('.', "/"))
}

/// `size` -> `getSize`
pub fn getter_name(property: &str) -> String {
    format!("get{}", capitalize(property))
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
