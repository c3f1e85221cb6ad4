//! Subtype relation.
//!
//! Nominal subtyping over the class table with declaration-site variance:
//!
//! - `Any?` is the top type, `Nothing` the bottom type
//! - a `?`-marked type is only a subtype of a `?`-marked type
//! - a type parameter is a subtype of whatever one of its upper bounds is
//! - `C<A>` <: `D<B>` when `C`'s supertype walk reaches `D<A'>` and each
//!   argument pair respects the variance of `D`'s parameter
//!
//! Error types are compatible in both directions.

use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::intern::TypeInterner;
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::type_queries::{is_error_type, is_nothing, is_nullable, make_not_nullable, make_nullable, type_args};
use crate::types::{DefId, TypeData, TypeId, Variance};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use tracing::trace;

pub struct SubtypeChecker<'a> {
    db: &'a TypeInterner,
    guard: RecursionGuard<(TypeId, TypeId)>,
}

impl<'a> SubtypeChecker<'a> {
    pub fn new(db: &'a TypeInterner) -> Self {
        SubtypeChecker {
            db,
            guard: RecursionGuard::with_profile(RecursionProfile::SubtypeCheck),
        }
    }

    pub fn is_subtype(&mut self, sub: TypeId, sup: TypeId) -> bool {
        if sub == sup {
            return true;
        }
        if is_error_type(self.db, sub) || is_error_type(self.db, sup) {
            return true;
        }
        match self.guard.enter((sub, sup)) {
            RecursionResult::Entered => {
                let result = self.check(sub, sup);
                self.guard.leave((sub, sup));
                result
            }
            // Assume success on a cycle; the outer comparison decides.
            RecursionResult::Cycle => true,
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                trace!(sub = sub.0, sup = sup.0, "subtype check exceeded limits");
                false
            }
        }
    }

    pub fn is_equivalent(&mut self, a: TypeId, b: TypeId) -> bool {
        a == b || (self.is_subtype(a, b) && self.is_subtype(b, a))
    }

    fn check(&mut self, sub: TypeId, sup: TypeId) -> bool {
        let db = self.db;
        let (Some(s), Some(t)) = (db.lookup(sub), db.lookup(sup)) else {
            return true;
        };

        if let TypeData::Class {
            def: DefId::ANY,
            nullable,
            ..
        } = t
        {
            return nullable || !is_nullable(db, sub);
        }
        if let TypeData::Class {
            def: DefId::NOTHING,
            nullable,
            ..
        } = s
        {
            return !nullable || t.is_marked_nullable();
        }
        if s.is_marked_nullable() && !t.is_marked_nullable() {
            return false;
        }

        match (s, t) {
            (TypeData::TypeParameter { param: p, .. }, TypeData::TypeParameter { param: q, .. })
                if p == q =>
            {
                true
            }
            (TypeData::TypeParameter { param, nullable }, _) => {
                let bounds = db
                    .type_param_info(param)
                    .map(|info| info.upper_bounds)
                    .unwrap_or_default();
                bounds.iter().any(|&bound| {
                    let bound = if nullable { make_nullable(db, bound) } else { bound };
                    self.is_subtype(bound, sup)
                })
            }
            (TypeData::Class { .. }, TypeData::TypeParameter { .. }) => false,
            (TypeData::Class { .. }, TypeData::Class { def: target, args: target_args, .. }) => {
                let Some(corresponding) = find_corresponding_supertype(db, sub, target) else {
                    return false;
                };
                let source_args = type_args(db, corresponding);
                if source_args.len() != target_args.len() {
                    return false;
                }
                let params = db
                    .class_info(target)
                    .map(|info| info.type_params)
                    .unwrap_or_default();
                for (index, (&a, &b)) in source_args.iter().zip(target_args.iter()).enumerate() {
                    let variance = params
                        .get(index)
                        .and_then(|&param| db.type_param_info(param))
                        .map(|info| info.variance)
                        .unwrap_or_default();
                    let ok = match variance {
                        Variance::Out => self.is_subtype(a, b),
                        Variance::In => self.is_subtype(b, a),
                        Variance::Invariant => self.is_equivalent(a, b),
                    };
                    if !ok {
                        return false;
                    }
                }
                true
            }
            _ => false,
        }
    }
}

pub fn is_subtype_of(db: &TypeInterner, sub: TypeId, sup: TypeId) -> bool {
    SubtypeChecker::new(db).is_subtype(sub, sup)
}

/// Walk the supertypes of `ty` (a class type) until one whose class is
/// `target`, returning it with arguments expressed in `ty`'s terms. The
/// result is never `?`-marked.
pub fn find_corresponding_supertype(db: &TypeInterner, ty: TypeId, target: DefId) -> Option<TypeId> {
    let mut guard = RecursionGuard::with_profile(RecursionProfile::SupertypeSearch);
    find_corresponding_inner(db, make_not_nullable(db, ty), target, &mut guard)
}

fn find_corresponding_inner(
    db: &TypeInterner,
    ty: TypeId,
    target: DefId,
    guard: &mut RecursionGuard<DefId>,
) -> Option<TypeId> {
    let TypeData::Class { def, args, .. } = db.lookup(ty)? else {
        return None;
    };
    if def == target {
        return Some(ty);
    }
    if target == DefId::ANY {
        return Some(TypeId::ANY);
    }
    if !guard.enter(def).is_entered() {
        return None;
    }
    let result = db.class_info(def).and_then(|info| {
        let substitution = TypeSubstitution::from_args(&info.type_params, &args);
        info.supertypes.iter().find_map(|&supertype| {
            let supertype = instantiate_type(db, supertype, &substitution);
            find_corresponding_inner(db, supertype, target, guard)
        })
    });
    guard.leave(def);
    result
}

/// Breadth-first list of `ty` and all of its supertypes, ending with `Any`.
fn supertype_closure(db: &TypeInterner, ty: TypeId) -> Vec<TypeId> {
    let mut out = Vec::new();
    let mut seen = FxHashSet::default();
    let mut queue = VecDeque::from([make_not_nullable(db, ty)]);
    while let Some(current) = queue.pop_front() {
        if !seen.insert(current) {
            continue;
        }
        out.push(current);
        match db.lookup(current) {
            Some(TypeData::Class { def, args, .. }) => {
                if let Some(info) = db.class_info(def) {
                    let substitution = TypeSubstitution::from_args(&info.type_params, &args);
                    for &supertype in &info.supertypes {
                        queue.push_back(instantiate_type(db, supertype, &substitution));
                    }
                }
            }
            Some(TypeData::TypeParameter { param, .. }) => {
                if let Some(info) = db.type_param_info(param) {
                    queue.extend(info.upper_bounds.iter().map(|&b| make_not_nullable(db, b)));
                }
            }
            _ => {}
        }
    }
    if !seen.contains(&TypeId::ANY) {
        out.push(TypeId::ANY);
    }
    out
}

/// Least common supertype of `types` as far as the nominal hierarchy can
/// express it. Nullable if any input is nullable; `Nothing` inputs are
/// absorbed.
pub fn common_supertype(db: &TypeInterner, types: &[TypeId]) -> TypeId {
    if types.is_empty() {
        return TypeId::NOTHING;
    }
    if let Some(&error) = types.iter().find(|&&ty| is_error_type(db, ty)) {
        return error;
    }
    let nullable = types.iter().any(|&ty| is_nullable(db, ty));

    let mut candidates: Vec<TypeId> = Vec::new();
    for &ty in types {
        if is_nothing(db, ty) {
            continue;
        }
        let ty = make_not_nullable(db, ty);
        if !candidates.contains(&ty) {
            candidates.push(ty);
        }
    }

    let result = match candidates.as_slice() {
        [] => TypeId::NOTHING,
        [single] => *single,
        [first, ..] => {
            let mut checker = SubtypeChecker::new(db);
            let covers_all =
                |checker: &mut SubtypeChecker<'_>, c: TypeId| candidates.iter().all(|&o| checker.is_subtype(o, c));
            if let Some(&member) = candidates.iter().find(|&&c| covers_all(&mut checker, c)) {
                member
            } else {
                supertype_closure(db, *first)
                    .into_iter()
                    .find(|&c| covers_all(&mut checker, c))
                    .unwrap_or(TypeId::ANY)
            }
        }
    };
    if nullable { make_nullable(db, result) } else { result }
}
