//! Small queries over interned types.
//!
//! These are the operations the checker reaches for most: nullability,
//! class/argument extraction and type-variable membership.

use crate::intern::TypeInterner;
use crate::types::{DefId, TypeData, TypeId, TypeParamId};
use ksc_common::interner::Atom;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

pub fn is_error_type(db: &TypeInterner, ty: TypeId) -> bool {
    ty == TypeId::ERROR || db.lookup(ty).is_some_and(|data| data.is_error())
}

/// Whether `ty` or any of its arguments is an error type.
pub fn contains_error(db: &TypeInterner, ty: TypeId) -> bool {
    match db.lookup(ty) {
        Some(TypeData::Error { .. }) | None => true,
        Some(TypeData::Class { args, .. }) => args.iter().any(|&arg| contains_error(db, arg)),
        Some(TypeData::TypeParameter { .. }) => false,
    }
}

/// Whether a value of `ty` may be null: either the type is marked `?`, or it
/// is a type parameter whose upper bounds all admit null.
pub fn is_nullable(db: &TypeInterner, ty: TypeId) -> bool {
    match db.lookup(ty) {
        Some(TypeData::Class { nullable, .. }) => nullable,
        Some(TypeData::TypeParameter { param, nullable }) => {
            nullable
                || db.type_param_info(param).is_some_and(|info| {
                    info.upper_bounds.is_empty()
                        || info.upper_bounds.iter().all(|&bound| is_nullable(db, bound))
                })
        }
        Some(TypeData::Error { .. }) | None => false,
    }
}

/// Whether `ty` carries the `?` marker.
pub fn is_marked_nullable(db: &TypeInterner, ty: TypeId) -> bool {
    db.lookup(ty).is_some_and(|data| data.is_marked_nullable())
}

fn with_nullability(db: &TypeInterner, ty: TypeId, value: bool) -> TypeId {
    match db.lookup(ty) {
        Some(TypeData::Class { def, args, nullable }) if nullable != value => {
            db.intern(TypeData::Class {
                def,
                args,
                nullable: value,
            })
        }
        Some(TypeData::TypeParameter { param, nullable }) if nullable != value => {
            db.intern(TypeData::TypeParameter {
                param,
                nullable: value,
            })
        }
        _ => ty,
    }
}

/// `T?` for `T`; identity on already-nullable and error types.
pub fn make_nullable(db: &TypeInterner, ty: TypeId) -> TypeId {
    with_nullability(db, ty, true)
}

/// `T` for `T?`; identity on non-nullable and error types.
pub fn make_not_nullable(db: &TypeInterner, ty: TypeId) -> TypeId {
    with_nullability(db, ty, false)
}

pub fn class_def(db: &TypeInterner, ty: TypeId) -> Option<DefId> {
    match db.lookup(ty)? {
        TypeData::Class { def, .. } => Some(def),
        _ => None,
    }
}

pub fn type_args(db: &TypeInterner, ty: TypeId) -> SmallVec<[TypeId; 2]> {
    match db.lookup(ty) {
        Some(TypeData::Class { args, .. }) => args,
        _ => SmallVec::new(),
    }
}

pub fn type_param_of(db: &TypeInterner, ty: TypeId) -> Option<TypeParamId> {
    match db.lookup(ty)? {
        TypeData::TypeParameter { param, .. } => Some(param),
        _ => None,
    }
}

pub fn is_nothing(db: &TypeInterner, ty: TypeId) -> bool {
    class_def(db, ty) == Some(DefId::NOTHING)
}

/// Whether `ty` mentions any of `params`.
pub fn depends_on_params(db: &TypeInterner, ty: TypeId, params: &[TypeParamId]) -> bool {
    match db.lookup(ty) {
        Some(TypeData::TypeParameter { param, .. }) => params.contains(&param),
        Some(TypeData::Class { args, .. }) => {
            args.iter().any(|&arg| depends_on_params(db, arg, params))
        }
        _ => false,
    }
}

/// Whether `ty` mentions any type parameter at all.
pub fn contains_type_params(db: &TypeInterner, ty: TypeId) -> bool {
    match db.lookup(ty) {
        Some(TypeData::TypeParameter { .. }) => true,
        Some(TypeData::Class { args, .. }) => args.iter().any(|&arg| contains_type_params(db, arg)),
        _ => false,
    }
}

/// Names of the classifiers a type mentions: its class (or type parameter)
/// name and, recursively, those of its arguments.
pub fn collect_used_type_names(db: &TypeInterner, ty: TypeId) -> FxHashSet<Atom> {
    let mut out = FxHashSet::default();
    collect_used_type_names_into(db, ty, &mut out);
    out
}

fn collect_used_type_names_into(db: &TypeInterner, ty: TypeId, out: &mut FxHashSet<Atom>) {
    match db.lookup(ty) {
        Some(TypeData::Class { def, args, .. }) => {
            if let Some(info) = db.class_info(def) {
                out.insert(info.name);
            }
            for arg in args {
                collect_used_type_names_into(db, arg, out);
            }
        }
        Some(TypeData::TypeParameter { param, .. }) => {
            if let Some(info) = db.type_param_info(param) {
                out.insert(info.name);
            }
        }
        Some(TypeData::Error { .. }) | None => {}
    }
}
