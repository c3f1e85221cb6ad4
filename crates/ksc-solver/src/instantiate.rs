//! Type parameter substitution.

use crate::intern::TypeInterner;
use crate::recursion::{RecursionGuard, RecursionProfile};
use crate::type_queries::make_nullable;
use crate::types::{TypeData, TypeId, TypeParamId};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Mapping from type parameters to the types that replace them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeSubstitution {
    map: FxHashMap<TypeParamId, TypeId>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair class/callable parameters with arguments positionally. Extra
    /// entries on either side are ignored.
    pub fn from_args(params: &[TypeParamId], args: &[TypeId]) -> Self {
        let map = params.iter().copied().zip(args.iter().copied()).collect();
        TypeSubstitution { map }
    }

    pub fn insert(&mut self, param: TypeParamId, ty: TypeId) {
        self.map.insert(param, ty);
    }

    pub fn get(&self, param: TypeParamId) -> Option<TypeId> {
        self.map.get(&param).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeParamId, TypeId)> + '_ {
        self.map.iter().map(|(&param, &ty)| (param, ty))
    }
}

/// Replace every substituted type parameter in `ty`. `T?` with `T := X`
/// yields `X?`.
pub fn instantiate_type(db: &TypeInterner, ty: TypeId, substitution: &TypeSubstitution) -> TypeId {
    if substitution.is_empty() {
        return ty;
    }
    let mut guard = RecursionGuard::with_profile(RecursionProfile::Instantiation);
    instantiate_inner(db, ty, substitution, &mut guard)
}

fn instantiate_inner(
    db: &TypeInterner,
    ty: TypeId,
    substitution: &TypeSubstitution,
    guard: &mut RecursionGuard<TypeId>,
) -> TypeId {
    if !guard.enter(ty).is_entered() {
        return ty;
    }
    let result = match db.lookup(ty) {
        Some(TypeData::TypeParameter { param, nullable }) => match substitution.get(param) {
            Some(replacement) if nullable => make_nullable(db, replacement),
            Some(replacement) => replacement,
            None => ty,
        },
        Some(TypeData::Class { def, args, nullable }) if !args.is_empty() => {
            let new_args: SmallVec<[TypeId; 2]> = args
                .iter()
                .map(|&arg| instantiate_inner(db, arg, substitution, guard))
                .collect();
            if new_args == args {
                ty
            } else {
                db.intern(TypeData::Class {
                    def,
                    args: new_args,
                    nullable,
                })
            }
        }
        _ => ty,
    };
    guard.leave(ty);
    result
}
