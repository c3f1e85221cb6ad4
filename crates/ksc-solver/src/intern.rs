//! Type interning and the class/type-parameter stores.
//!
//! `TypeInterner` is the single source of truth for types: it hands out
//! `TypeId`s for structural `TypeData`, owns the class table keyed by
//! `DefId`, and the type-parameter table keyed by `TypeParamId`. The builtin
//! classes (`Any`, the primitives, `String`, `Array<T>`, ...) are registered
//! at construction so their ids are the constants on `TypeId` and `DefId`.

use crate::types::{ClassInfo, ClassKind, DefId, TypeData, TypeId, TypeParamId, TypeParamInfo, Variance};
use dashmap::DashMap;
use ksc_common::interner::{Atom, Interner};
use rustc_hash::FxBuildHasher;
use smallvec::{SmallVec, smallvec};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::trace;

pub struct TypeInterner {
    names: Interner,
    type_to_id: DashMap<TypeData, TypeId, FxBuildHasher>,
    types: RwLock<Vec<TypeData>>,
    /// Indexed by `DefId.0 - 1`.
    classes: RwLock<Vec<ClassInfo>>,
    classes_by_name: DashMap<Atom, DefId, FxBuildHasher>,
    type_params: RwLock<Vec<TypeParamInfo>>,
}

impl TypeInterner {
    pub fn new() -> Self {
        let interner = TypeInterner {
            names: Interner::new(),
            type_to_id: DashMap::with_hasher(FxBuildHasher),
            types: RwLock::new(Vec::new()),
            classes: RwLock::new(Vec::new()),
            classes_by_name: DashMap::with_hasher(FxBuildHasher),
            type_params: RwLock::new(Vec::new()),
        };
        interner.register_builtins();
        interner
    }

    // =========================================================================
    // Names
    // =========================================================================

    pub fn name(&self, text: &str) -> Atom {
        self.names.intern(text)
    }

    pub fn resolve_name(&self, atom: Atom) -> Arc<str> {
        self.names.resolve(atom)
    }

    pub fn names(&self) -> &Interner {
        &self.names
    }

    // =========================================================================
    // Types
    // =========================================================================

    pub fn intern(&self, data: TypeData) -> TypeId {
        if let Some(id) = self.type_to_id.get(&data) {
            return *id;
        }
        let mut types = self.types.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(id) = self.type_to_id.get(&data) {
            return *id;
        }
        let id = TypeId(types.len() as u32);
        types.push(data.clone());
        self.type_to_id.insert(data, id);
        id
    }

    pub fn lookup(&self, id: TypeId) -> Option<TypeData> {
        self.types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id.0 as usize)
            .cloned()
    }

    pub fn type_count(&self) -> usize {
        self.types.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn class_type(&self, def: DefId, args: &[TypeId]) -> TypeId {
        self.intern(TypeData::Class {
            def,
            args: SmallVec::from_slice(args),
            nullable: false,
        })
    }

    pub fn nullable_class_type(&self, def: DefId, args: &[TypeId]) -> TypeId {
        self.intern(TypeData::Class {
            def,
            args: SmallVec::from_slice(args),
            nullable: true,
        })
    }

    pub fn type_param_type(&self, param: TypeParamId) -> TypeId {
        self.intern(TypeData::TypeParameter {
            param,
            nullable: false,
        })
    }

    /// `Array<element>`
    pub fn array_of(&self, element: TypeId) -> TypeId {
        self.class_type(DefId::ARRAY, &[element])
    }

    /// An error type carrying a message. Distinct messages give distinct ids.
    pub fn error_type(&self, message: &str) -> TypeId {
        let message = self.name(message);
        self.intern(TypeData::Error { message })
    }

    /// The class type over its own type parameters, `C<T1, ..., Tn>`.
    pub fn default_type(&self, def: DefId) -> TypeId {
        let params = self
            .class_info(def)
            .map(|info| info.type_params)
            .unwrap_or_default();
        let args: SmallVec<[TypeId; 2]> = params.iter().map(|&p| self.type_param_type(p)).collect();
        self.intern(TypeData::Class {
            def,
            args,
            nullable: false,
        })
    }

    // =========================================================================
    // Classes
    // =========================================================================

    pub fn register_class(&self, info: ClassInfo) -> DefId {
        let mut classes = self.classes.write().unwrap_or_else(PoisonError::into_inner);
        let def = DefId(classes.len() as u32 + 1);
        trace!(def = def.0, name = %self.names.resolve(info.name), "register_class");
        self.classes_by_name.entry(info.name).or_insert(def);
        classes.push(info);
        def
    }

    pub fn class_info(&self, def: DefId) -> Option<ClassInfo> {
        let index = def.0.checked_sub(1)? as usize;
        self.classes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(index)
            .cloned()
    }

    pub fn set_supertypes(&self, def: DefId, supertypes: Vec<TypeId>) {
        let Some(index) = def.0.checked_sub(1) else {
            return;
        };
        let mut classes = self.classes.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(info) = classes.get_mut(index as usize) {
            info.supertypes = supertypes;
        }
    }

    /// Class registered under a simple name. The first registration wins.
    pub fn class_named(&self, name: Atom) -> Option<DefId> {
        self.classes_by_name.get(&name).map(|def| *def)
    }

    pub fn class_name(&self, def: DefId) -> Arc<str> {
        self.class_info(def)
            .map_or_else(|| Arc::from("<unknown>"), |info| self.names.resolve(info.name))
    }

    // =========================================================================
    // Type parameters
    // =========================================================================

    pub fn register_type_param(&self, info: TypeParamInfo) -> TypeParamId {
        let mut params = self.type_params.write().unwrap_or_else(PoisonError::into_inner);
        let id = TypeParamId(params.len() as u32);
        params.push(info);
        id
    }

    /// Shorthand for an unbounded type parameter.
    pub fn fresh_type_param(&self, name: &str, variance: Variance) -> TypeParamId {
        self.register_type_param(TypeParamInfo {
            name: self.name(name),
            variance,
            upper_bounds: vec![TypeId::NULLABLE_ANY],
        })
    }

    pub fn type_param_info(&self, id: TypeParamId) -> Option<TypeParamInfo> {
        self.type_params
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id.0 as usize)
            .cloned()
    }

    pub fn set_upper_bounds(&self, id: TypeParamId, upper_bounds: Vec<TypeId>) {
        let mut params = self.type_params.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(info) = params.get_mut(id.0 as usize) {
            info.upper_bounds = upper_bounds;
        }
    }

    // =========================================================================
    // Builtins
    // =========================================================================

    fn builtin_class(&self, name: &str, kind: ClassKind, type_params: Vec<TypeParamId>) -> DefId {
        self.register_class(ClassInfo {
            name: self.name(name),
            fq_name: self.name(&format!("kotlin.{name}")),
            kind,
            type_params,
            supertypes: Vec::new(),
        })
    }

    fn register_builtins(&self) {
        let comparable_t = self.fresh_type_param("T", Variance::In);
        let array_t = self.fresh_type_param("T", Variance::Invariant);
        let function_r = self.fresh_type_param("R", Variance::Out);

        let classes: [(&str, ClassKind, Vec<TypeParamId>, DefId); 25] = [
            ("Any", ClassKind::Class, vec![], DefId::ANY),
            ("Nothing", ClassKind::Class, vec![], DefId::NOTHING),
            ("Unit", ClassKind::Object, vec![], DefId::UNIT),
            ("Boolean", ClassKind::Class, vec![], DefId::BOOLEAN),
            ("Char", ClassKind::Class, vec![], DefId::CHAR),
            ("Byte", ClassKind::Class, vec![], DefId::BYTE),
            ("Short", ClassKind::Class, vec![], DefId::SHORT),
            ("Int", ClassKind::Class, vec![], DefId::INT),
            ("Long", ClassKind::Class, vec![], DefId::LONG),
            ("Float", ClassKind::Class, vec![], DefId::FLOAT),
            ("Double", ClassKind::Class, vec![], DefId::DOUBLE),
            ("Number", ClassKind::Class, vec![], DefId::NUMBER),
            ("CharSequence", ClassKind::Interface, vec![], DefId::CHAR_SEQUENCE),
            ("String", ClassKind::Class, vec![], DefId::STRING),
            ("Comparable", ClassKind::Interface, vec![comparable_t], DefId::COMPARABLE),
            ("Array", ClassKind::Class, vec![array_t], DefId::ARRAY),
            ("BooleanArray", ClassKind::Class, vec![], DefId::BOOLEAN_ARRAY),
            ("CharArray", ClassKind::Class, vec![], DefId::CHAR_ARRAY),
            ("ByteArray", ClassKind::Class, vec![], DefId::BYTE_ARRAY),
            ("ShortArray", ClassKind::Class, vec![], DefId::SHORT_ARRAY),
            ("IntArray", ClassKind::Class, vec![], DefId::INT_ARRAY),
            ("LongArray", ClassKind::Class, vec![], DefId::LONG_ARRAY),
            ("FloatArray", ClassKind::Class, vec![], DefId::FLOAT_ARRAY),
            ("DoubleArray", ClassKind::Class, vec![], DefId::DOUBLE_ARRAY),
            ("Function", ClassKind::Interface, vec![function_r], DefId::FUNCTION),
        ];
        for (name, kind, params, expected) in classes {
            let def = self.builtin_class(name, kind, params);
            debug_assert_eq!(def, expected, "builtin class {name} registered out of order");
        }

        let error = self.error_type("ERROR");
        debug_assert_eq!(error, TypeId::ERROR);

        let plain: [(DefId, bool, TypeId); 16] = [
            (DefId::ANY, false, TypeId::ANY),
            (DefId::ANY, true, TypeId::NULLABLE_ANY),
            (DefId::NOTHING, false, TypeId::NOTHING),
            (DefId::NOTHING, true, TypeId::NULLABLE_NOTHING),
            (DefId::UNIT, false, TypeId::UNIT),
            (DefId::BOOLEAN, false, TypeId::BOOLEAN),
            (DefId::CHAR, false, TypeId::CHAR),
            (DefId::BYTE, false, TypeId::BYTE),
            (DefId::SHORT, false, TypeId::SHORT),
            (DefId::INT, false, TypeId::INT),
            (DefId::LONG, false, TypeId::LONG),
            (DefId::FLOAT, false, TypeId::FLOAT),
            (DefId::DOUBLE, false, TypeId::DOUBLE),
            (DefId::NUMBER, false, TypeId::NUMBER),
            (DefId::CHAR_SEQUENCE, false, TypeId::CHAR_SEQUENCE),
            (DefId::STRING, false, TypeId::STRING),
        ];
        for (def, nullable, expected) in plain {
            let id = self.intern(TypeData::Class {
                def,
                args: smallvec![],
                nullable,
            });
            debug_assert_eq!(id, expected);
        }

        let comparable = |ty: TypeId| self.class_type(DefId::COMPARABLE, &[ty]);
        self.set_supertypes(DefId::BOOLEAN, vec![comparable(TypeId::BOOLEAN)]);
        self.set_supertypes(DefId::CHAR, vec![comparable(TypeId::CHAR)]);
        for (def, ty) in [
            (DefId::BYTE, TypeId::BYTE),
            (DefId::SHORT, TypeId::SHORT),
            (DefId::INT, TypeId::INT),
            (DefId::LONG, TypeId::LONG),
            (DefId::FLOAT, TypeId::FLOAT),
            (DefId::DOUBLE, TypeId::DOUBLE),
        ] {
            self.set_supertypes(def, vec![TypeId::NUMBER, comparable(ty)]);
        }
        self.set_supertypes(
            DefId::STRING,
            vec![TypeId::CHAR_SEQUENCE, comparable(TypeId::STRING)],
        );
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}
