//! Constraint system for type-variable inference.
//!
//! Registered type parameters become type variables. Constraints between
//! types are decomposed structurally (following declaration-site variance)
//! until they bottom out as bounds on single variables:
//!
//! - `L <: T` records a lower bound
//! - `T <: U` records an upper bound
//! - `T == X` fixes the variable through the `ena` unification table, which
//!   also merges variables constrained to be equal
//!
//! Solving picks the common supertype of the lower bounds (or the most
//! specific upper bound) and then verifies every bound against the chosen
//! value. Every failure remembers the `ConstraintPosition` it came from so
//! callers can tell a receiver mismatch from an argument mismatch.

use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::intern::TypeInterner;
use crate::recursion::{RecursionGuard, RecursionProfile};
use crate::subtype::{SubtypeChecker, common_supertype, find_corresponding_supertype};
use crate::type_queries::{
    contains_type_params, is_error_type, is_marked_nullable, is_nothing, is_nullable, make_not_nullable,
    make_nullable, type_args,
};
use crate::types::{TypeData, TypeId, TypeParamId, Variance};
use ena::unify::{InPlaceUnificationTable, UnifyKey, UnifyValue};
use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap};
use smallvec::SmallVec;
use tracing::{debug, trace};

/// A type variable in the unification table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeVariable(pub u32);

/// Fixed value of a variable, if an equality constraint pinned one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FixedValue(pub Option<TypeId>);

impl UnifyKey for TypeVariable {
    type Value = FixedValue;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        TypeVariable(u)
    }

    fn tag() -> &'static str {
        "TypeVariable"
    }
}

impl UnifyValue for FixedValue {
    type Error = (TypeId, TypeId);

    fn unify_values(a: &Self, b: &Self) -> Result<Self, Self::Error> {
        match (a.0, b.0) {
            (None, None) => Ok(FixedValue(None)),
            (Some(t), None) | (None, Some(t)) => Ok(FixedValue(Some(t))),
            (Some(x), Some(y)) if x == y => Ok(FixedValue(Some(x))),
            (Some(x), Some(y)) => Err((x, y)),
        }
    }
}

/// Where a constraint came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintPosition {
    Receiver,
    ValueParameter(u32),
    ExpectedType,
    /// Declared upper bound of the n-th type parameter.
    TypeBound(u32),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConstraintError {
    /// `sub <: sup` cannot hold.
    TypeMismatch {
        sub: TypeId,
        sup: TypeId,
        position: ConstraintPosition,
    },
    /// Two equality constraints pinned a variable to different types.
    ConflictingFixedValues {
        first: TypeId,
        second: TypeId,
        position: ConstraintPosition,
    },
}

impl ConstraintError {
    pub const fn position(&self) -> ConstraintPosition {
        match self {
            ConstraintError::TypeMismatch { position, .. }
            | ConstraintError::ConflictingFixedValues { position, .. } => *position,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConstraintSystemStatus {
    errors: Vec<ConstraintError>,
    unknown: Vec<TypeParamId>,
}

impl ConstraintSystemStatus {
    /// No contradiction and every variable received a value.
    pub fn is_successful(&self) -> bool {
        self.errors.is_empty() && self.unknown.is_empty()
    }

    pub fn has_contradiction(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_unknown_parameters(&self) -> bool {
        !self.unknown.is_empty()
    }

    /// Whether the system failed and every failure came from `position`.
    pub fn has_only_errors_from(&self, position: ConstraintPosition) -> bool {
        !self.errors.is_empty() && self.errors.iter().all(|e| e.position() == position)
    }

    pub fn has_error_from(&self, position: ConstraintPosition) -> bool {
        self.errors.iter().any(|e| e.position() == position)
    }

    pub fn errors(&self) -> &[ConstraintError] {
        &self.errors
    }

    pub fn unknown_parameters(&self) -> &[TypeParamId] {
        &self.unknown
    }
}

/// Inference capability used by the resolver.
pub trait ConstraintSystem {
    /// Turn `params` into type variables. Already registered parameters are
    /// ignored.
    fn register_type_variables(&mut self, params: &[TypeParamId]);

    fn type_variables(&self) -> Vec<TypeParamId>;

    /// Require `sub <: sup`.
    fn add_subtype_constraint(&mut self, sub: TypeId, sup: TypeId, position: ConstraintPosition);

    /// Require `sup :> sub`.
    fn add_supertype_constraint(&mut self, sup: TypeId, sub: TypeId, position: ConstraintPosition) {
        self.add_subtype_constraint(sub, sup, position);
    }

    /// Require `a == b`.
    fn add_equality_constraint(&mut self, a: TypeId, b: TypeId, position: ConstraintPosition);

    fn status(&mut self) -> ConstraintSystemStatus;

    /// Values of all variables that could be inferred.
    fn resulting_substitution(&mut self) -> TypeSubstitution;

    /// Whether every inferred value satisfies the declared upper bounds of
    /// its type parameter. With `skip_foreign_params`, bounds that still
    /// mention non-registered type parameters after substitution are not
    /// checked.
    fn check_bounds_satisfied(&mut self, skip_foreign_params: bool) -> bool;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum Relation {
    Subtype,
    Equal,
}

type Bound = (TypeId, ConstraintPosition);

#[derive(Clone, Debug, Default)]
struct VariableBounds {
    lower: SmallVec<[Bound; 4]>,
    upper: SmallVec<[Bound; 4]>,
    exact: SmallVec<[Bound; 2]>,
}

impl VariableBounds {
    fn merge_from(&mut self, other: &VariableBounds) {
        for bound in &other.lower {
            if !self.lower.contains(bound) {
                self.lower.push(*bound);
            }
        }
        for bound in &other.upper {
            if !self.upper.contains(bound) {
                self.upper.push(*bound);
            }
        }
        for bound in &other.exact {
            if !self.exact.contains(bound) {
                self.exact.push(*bound);
            }
        }
    }
}

#[derive(Clone, Debug)]
struct Solution {
    status: ConstraintSystemStatus,
    substitution: TypeSubstitution,
}

pub struct ConstraintSystemImpl<'a> {
    db: &'a TypeInterner,
    table: InPlaceUnificationTable<TypeVariable>,
    variables: IndexMap<TypeParamId, TypeVariable, FxBuildHasher>,
    /// Indexed by `TypeVariable.0`.
    bounds: Vec<VariableBounds>,
    errors: Vec<ConstraintError>,
    solution: Option<Solution>,
}

impl<'a> ConstraintSystemImpl<'a> {
    pub fn new(db: &'a TypeInterner) -> Self {
        ConstraintSystemImpl {
            db,
            table: InPlaceUnificationTable::new(),
            variables: IndexMap::with_hasher(FxBuildHasher),
            bounds: Vec::new(),
            errors: Vec::new(),
            solution: None,
        }
    }

    fn variable_of(&self, ty: TypeId) -> Option<(TypeVariable, bool)> {
        match self.db.lookup(ty)? {
            TypeData::TypeParameter { param, nullable } => {
                self.variables.get(&param).map(|&var| (var, nullable))
            }
            _ => None,
        }
    }

    fn mentions_variables(&self, ty: TypeId) -> bool {
        match self.db.lookup(ty) {
            Some(TypeData::TypeParameter { param, .. }) => self.variables.contains_key(&param),
            Some(TypeData::Class { args, .. }) => args.iter().any(|&arg| self.mentions_variables(arg)),
            _ => false,
        }
    }

    fn mismatch(&mut self, sub: TypeId, sup: TypeId, position: ConstraintPosition) {
        trace!(sub = sub.0, sup = sup.0, ?position, "constraint mismatch");
        self.errors.push(ConstraintError::TypeMismatch { sub, sup, position });
    }

    fn add_constraint(&mut self, a: TypeId, b: TypeId, relation: Relation, position: ConstraintPosition) {
        self.solution = None;
        let mut guard = RecursionGuard::with_profile(RecursionProfile::ConstraintIncorporation);
        self.incorporate(a, b, relation, position, &mut guard);
    }

    fn incorporate(
        &mut self,
        a: TypeId,
        b: TypeId,
        relation: Relation,
        position: ConstraintPosition,
        guard: &mut RecursionGuard<(TypeId, TypeId, Relation)>,
    ) {
        if is_error_type(self.db, a) || is_error_type(self.db, b) {
            return;
        }
        let key = (a, b, relation);
        if !guard.enter(key).is_entered() {
            return;
        }
        self.incorporate_inner(a, b, relation, position, guard);
        guard.leave(key);
    }

    fn incorporate_inner(
        &mut self,
        a: TypeId,
        b: TypeId,
        relation: Relation,
        position: ConstraintPosition,
        guard: &mut RecursionGuard<(TypeId, TypeId, Relation)>,
    ) {
        let db = self.db;
        match (self.variable_of(a), self.variable_of(b)) {
            (Some((x, _)), Some((y, _))) => {
                if let Err((first, second)) = self.table.unify_var_var(x, y) {
                    self.errors.push(ConstraintError::ConflictingFixedValues {
                        first,
                        second,
                        position,
                    });
                }
            }
            (None, Some((y, marked))) => {
                if relation == Relation::Equal && marked != is_marked_nullable(db, a) {
                    self.mismatch(a, b, position);
                    return;
                }
                let bound = if marked { make_not_nullable(db, a) } else { a };
                match relation {
                    Relation::Subtype => self.bounds[y.0 as usize].lower.push((bound, position)),
                    Relation::Equal => self.fix(y, bound, position),
                }
            }
            (Some((x, marked)), None) => {
                if marked && !is_nullable(db, b) {
                    self.mismatch(a, b, position);
                    return;
                }
                if relation == Relation::Equal && marked != is_marked_nullable(db, b) {
                    self.mismatch(a, b, position);
                    return;
                }
                let bound = if marked { make_not_nullable(db, b) } else { b };
                match relation {
                    Relation::Subtype => self.bounds[x.0 as usize].upper.push((bound, position)),
                    Relation::Equal => self.fix(x, bound, position),
                }
            }
            (None, None) => {
                if !self.mentions_variables(a) && !self.mentions_variables(b) {
                    let mut checker = SubtypeChecker::new(db);
                    let holds = match relation {
                        Relation::Subtype => checker.is_subtype(a, b),
                        Relation::Equal => checker.is_equivalent(a, b),
                    };
                    if !holds {
                        self.mismatch(a, b, position);
                    }
                    return;
                }
                self.decompose(a, b, relation, position, guard);
            }
        }
    }

    fn fix(&mut self, var: TypeVariable, value: TypeId, position: ConstraintPosition) {
        self.bounds[var.0 as usize].exact.push((value, position));
        if self.mentions_variables(value) {
            return;
        }
        if let Err((first, second)) = self.table.unify_var_value(var, FixedValue(Some(value))) {
            self.errors.push(ConstraintError::ConflictingFixedValues {
                first,
                second,
                position,
            });
        }
    }

    /// Split a constraint between two class types into constraints between
    /// their arguments.
    fn decompose(
        &mut self,
        a: TypeId,
        b: TypeId,
        relation: Relation,
        position: ConstraintPosition,
        guard: &mut RecursionGuard<(TypeId, TypeId, Relation)>,
    ) {
        let db = self.db;
        if relation == Relation::Subtype && is_nothing(db, a) && (!is_marked_nullable(db, a) || is_nullable(db, b)) {
            return;
        }
        match (db.lookup(a), db.lookup(b)) {
            (
                Some(TypeData::Class {
                    def: a_def,
                    nullable: a_nullable,
                    ..
                }),
                Some(TypeData::Class {
                    def: b_def,
                    args: b_args,
                    nullable: b_nullable,
                }),
            ) => {
                let nullability_ok = match relation {
                    Relation::Subtype => !a_nullable || b_nullable,
                    Relation::Equal => a_nullable == b_nullable,
                };
                if !nullability_ok {
                    self.mismatch(a, b, position);
                    return;
                }
                let corresponding = match relation {
                    Relation::Subtype => find_corresponding_supertype(db, a, b_def),
                    Relation::Equal => (a_def == b_def).then(|| make_not_nullable(db, a)),
                };
                let Some(corresponding) = corresponding else {
                    self.mismatch(a, b, position);
                    return;
                };
                let a_args = type_args(db, corresponding);
                if a_args.len() != b_args.len() {
                    self.mismatch(a, b, position);
                    return;
                }
                let params = db.class_info(b_def).map(|info| info.type_params).unwrap_or_default();
                for (index, (&left, &right)) in a_args.iter().zip(b_args.iter()).enumerate() {
                    let variance = params
                        .get(index)
                        .and_then(|&param| db.type_param_info(param))
                        .map(|info| info.variance)
                        .unwrap_or_default();
                    match (relation, variance) {
                        (Relation::Equal, _) | (_, Variance::Invariant) => {
                            self.incorporate(left, right, Relation::Equal, position, guard);
                        }
                        (Relation::Subtype, Variance::Out) => {
                            self.incorporate(left, right, Relation::Subtype, position, guard);
                        }
                        (Relation::Subtype, Variance::In) => {
                            self.incorporate(right, left, Relation::Subtype, position, guard);
                        }
                    }
                }
            }
            (Some(TypeData::TypeParameter { param, nullable }), _) if relation == Relation::Subtype => {
                // A foreign type parameter is only as good as its bounds.
                let bounds = db.type_param_info(param).map(|info| info.upper_bounds).unwrap_or_default();
                match bounds.first() {
                    Some(&bound) => {
                        let bound = if nullable { make_nullable(db, bound) } else { bound };
                        self.incorporate(bound, b, relation, position, guard);
                    }
                    None => self.mismatch(a, b, position),
                }
            }
            _ => self.mismatch(a, b, position),
        }
    }

    fn solution(&mut self) -> &Solution {
        let solution = match self.solution.take() {
            Some(solution) => solution,
            None => self.compute_solution(),
        };
        self.solution.insert(solution)
    }

    fn compute_solution(&mut self) -> Solution {
        let db = self.db;
        let keys: Vec<(TypeParamId, TypeVariable)> =
            self.variables.iter().map(|(&param, &var)| (param, var)).collect();

        let mut groups: IndexMap<TypeVariable, VariableBounds, FxBuildHasher> =
            IndexMap::with_hasher(FxBuildHasher);
        let mut roots: Vec<(TypeParamId, TypeVariable)> = Vec::with_capacity(keys.len());
        for &(param, var) in &keys {
            let root = self.table.find(var);
            roots.push((param, root));
            groups
                .entry(root)
                .or_default()
                .merge_from(&self.bounds[var.0 as usize]);
        }

        let mut values: FxHashMap<TypeVariable, TypeId> = FxHashMap::default();
        for (&root, _) in &groups {
            if let Some(fixed) = self.table.probe_value(root).0 {
                values.insert(root, fixed);
            }
        }

        // Variables whose bounds mention other variables become solvable once
        // those are known; iterate until nothing changes.
        let mut substitution = TypeSubstitution::new();
        loop {
            for &(param, root) in &roots {
                if let Some(&value) = values.get(&root) {
                    substitution.insert(param, value);
                }
            }
            let mut progress = false;
            for (root, bounds) in &groups {
                if values.contains_key(root) {
                    continue;
                }
                if let Some(value) = self.choose_value(bounds, &substitution) {
                    values.insert(*root, value);
                    progress = true;
                }
            }
            if !progress {
                break;
            }
        }

        let mut status = ConstraintSystemStatus {
            errors: self.errors.clone(),
            unknown: Vec::new(),
        };
        for &(param, root) in &roots {
            if !values.contains_key(&root) {
                status.unknown.push(param);
            }
        }

        let mut checker = SubtypeChecker::new(db);
        for (root, bounds) in &groups {
            let Some(&value) = values.get(root) else {
                continue;
            };
            for &(lower, position) in &bounds.lower {
                let lower = instantiate_type(db, lower, &substitution);
                if !self.mentions_variables(lower) && !checker.is_subtype(lower, value) {
                    status.errors.push(ConstraintError::TypeMismatch {
                        sub: lower,
                        sup: value,
                        position,
                    });
                }
            }
            for &(upper, position) in &bounds.upper {
                let upper = instantiate_type(db, upper, &substitution);
                if !self.mentions_variables(upper) && !checker.is_subtype(value, upper) {
                    status.errors.push(ConstraintError::TypeMismatch {
                        sub: value,
                        sup: upper,
                        position,
                    });
                }
            }
            for &(exact, position) in &bounds.exact {
                let exact = instantiate_type(db, exact, &substitution);
                if !self.mentions_variables(exact) && !checker.is_equivalent(value, exact) {
                    status.errors.push(ConstraintError::ConflictingFixedValues {
                        first: value,
                        second: exact,
                        position,
                    });
                }
            }
        }

        debug!(
            variables = keys.len(),
            errors = status.errors.len(),
            unknown = status.unknown.len(),
            "constraint system solved"
        );
        Solution { status, substitution }
    }

    /// Pick a value from bounds that no longer mention unsolved variables.
    fn choose_value(&self, bounds: &VariableBounds, substitution: &TypeSubstitution) -> Option<TypeId> {
        let db = self.db;
        let resolved = |list: &[Bound]| -> Vec<TypeId> {
            list.iter()
                .map(|&(ty, _)| instantiate_type(db, ty, substitution))
                .filter(|&ty| !self.mentions_variables(ty))
                .collect()
        };

        if let Some(&exact) = resolved(&bounds.exact).first() {
            return Some(exact);
        }
        let lowers = resolved(&bounds.lower);
        if !lowers.is_empty() {
            return Some(common_supertype(db, &lowers));
        }
        let uppers = resolved(&bounds.upper);
        if uppers.is_empty() {
            return None;
        }
        let mut checker = SubtypeChecker::new(db);
        let most_specific = uppers
            .iter()
            .copied()
            .find(|&candidate| uppers.iter().all(|&other| checker.is_subtype(candidate, other)));
        Some(most_specific.unwrap_or(uppers[0]))
    }
}

impl ConstraintSystem for ConstraintSystemImpl<'_> {
    fn register_type_variables(&mut self, params: &[TypeParamId]) {
        for &param in params {
            if self.variables.contains_key(&param) {
                continue;
            }
            let var = self.table.new_key(FixedValue(None));
            debug_assert_eq!(var.0 as usize, self.bounds.len());
            self.bounds.push(VariableBounds::default());
            self.variables.insert(param, var);
        }
        self.solution = None;
    }

    fn type_variables(&self) -> Vec<TypeParamId> {
        self.variables.keys().copied().collect()
    }

    fn add_subtype_constraint(&mut self, sub: TypeId, sup: TypeId, position: ConstraintPosition) {
        self.add_constraint(sub, sup, Relation::Subtype, position);
    }

    fn add_equality_constraint(&mut self, a: TypeId, b: TypeId, position: ConstraintPosition) {
        self.add_constraint(a, b, Relation::Equal, position);
    }

    fn status(&mut self) -> ConstraintSystemStatus {
        self.solution().status.clone()
    }

    fn resulting_substitution(&mut self) -> TypeSubstitution {
        self.solution().substitution.clone()
    }

    fn check_bounds_satisfied(&mut self, skip_foreign_params: bool) -> bool {
        let substitution = self.resulting_substitution();
        let db = self.db;
        let mut checker = SubtypeChecker::new(db);
        for param in self.type_variables() {
            let Some(value) = substitution.get(param) else {
                continue;
            };
            let Some(info) = db.type_param_info(param) else {
                continue;
            };
            for &bound in &info.upper_bounds {
                let bound = instantiate_type(db, bound, &substitution);
                if skip_foreign_params && contains_type_params(db, bound) {
                    continue;
                }
                if !checker.is_subtype(value, bound) {
                    trace!(param = param.0, value = value.0, bound = bound.0, "upper bound violated");
                    return false;
                }
            }
        }
        true
    }
}
