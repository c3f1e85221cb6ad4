//! Human-readable type rendering for diagnostics and traces.

use crate::intern::TypeInterner;
use crate::types::{TypeData, TypeId};

pub struct TypeFormatter<'a> {
    db: &'a TypeInterner,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(db: &'a TypeInterner) -> Self {
        TypeFormatter { db }
    }

    pub fn format(&self, ty: TypeId) -> String {
        let mut out = String::new();
        self.write(ty, &mut out);
        out
    }

    fn write(&self, ty: TypeId, out: &mut String) {
        match self.db.lookup(ty) {
            None => out.push_str("<unknown>"),
            Some(TypeData::Error { message }) => {
                out.push_str("[ERROR : ");
                out.push_str(&self.db.resolve_name(message));
                out.push(']');
            }
            Some(TypeData::TypeParameter { param, nullable }) => {
                match self.db.type_param_info(param) {
                    Some(info) => out.push_str(&self.db.resolve_name(info.name)),
                    None => out.push_str("<unknown>"),
                }
                if nullable {
                    out.push('?');
                }
            }
            Some(TypeData::Class { def, args, nullable }) => {
                out.push_str(&self.db.class_name(def));
                if !args.is_empty() {
                    out.push('<');
                    for (index, &arg) in args.iter().enumerate() {
                        if index > 0 {
                            out.push_str(", ");
                        }
                        self.write(arg, out);
                    }
                    out.push('>');
                }
                if nullable {
                    out.push('?');
                }
            }
        }
    }
}
