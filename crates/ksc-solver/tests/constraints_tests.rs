use super::*;
use crate::type_queries::make_nullable;

fn type_var(db: &TypeInterner, name: &str) -> (TypeParamId, TypeId) {
    let param = db.fresh_type_param(name, Variance::Invariant);
    (param, db.type_param_type(param))
}

#[test]
fn test_lower_bound_infers_value() {
    let db = TypeInterner::new();
    let (t, t_ty) = type_var(&db, "T");
    let mut system = ConstraintSystemImpl::new(&db);
    system.register_type_variables(&[t]);
    system.add_subtype_constraint(TypeId::INT, t_ty, ConstraintPosition::ValueParameter(0));

    assert!(system.status().is_successful());
    assert_eq!(system.resulting_substitution().get(t), Some(TypeId::INT));
}

#[test]
fn test_invariant_receiver_fixes_variable() {
    let db = TypeInterner::new();
    let (t, t_ty) = type_var(&db, "T");
    let mut system = ConstraintSystemImpl::new(&db);
    system.register_type_variables(&[t]);
    system.add_subtype_constraint(
        db.array_of(TypeId::STRING),
        db.array_of(t_ty),
        ConstraintPosition::Receiver,
    );

    assert!(system.status().is_successful());
    assert_eq!(system.resulting_substitution().get(t), Some(TypeId::STRING));
}

#[test]
fn test_nullable_argument_against_marked_variable() {
    let db = TypeInterner::new();
    let (t, t_ty) = type_var(&db, "T");
    let mut system = ConstraintSystemImpl::new(&db);
    system.register_type_variables(&[t]);
    system.add_subtype_constraint(
        make_nullable(&db, TypeId::INT),
        make_nullable(&db, t_ty),
        ConstraintPosition::Receiver,
    );

    assert!(system.status().is_successful());
    assert_eq!(system.resulting_substitution().get(t), Some(TypeId::INT));
}

#[test]
fn test_nullable_value_against_non_null_bound_fails_bound_check() {
    let db = TypeInterner::new();
    let t = db.register_type_param(TypeParamInfo {
        name: db.name("T"),
        variance: Variance::Invariant,
        upper_bounds: vec![TypeId::ANY],
    });
    let mut system = ConstraintSystemImpl::new(&db);
    system.register_type_variables(&[t]);
    system.add_subtype_constraint(
        make_nullable(&db, TypeId::INT),
        db.type_param_type(t),
        ConstraintPosition::Receiver,
    );

    assert!(system.status().is_successful());
    assert!(!system.check_bounds_satisfied(true));
}

#[test]
fn test_conflicting_fixed_values_are_a_contradiction() {
    let db = TypeInterner::new();
    let (t, t_ty) = type_var(&db, "T");
    let mut system = ConstraintSystemImpl::new(&db);
    system.register_type_variables(&[t]);
    system.add_subtype_constraint(
        db.array_of(TypeId::INT),
        db.array_of(t_ty),
        ConstraintPosition::ValueParameter(0),
    );
    system.add_subtype_constraint(
        db.array_of(TypeId::STRING),
        db.array_of(t_ty),
        ConstraintPosition::ValueParameter(1),
    );

    let status = system.status();
    assert!(status.has_contradiction());
    assert!(status.has_only_errors_from(ConstraintPosition::ValueParameter(1)));
}

#[test]
fn test_unconstrained_variable_is_unknown() {
    let db = TypeInterner::new();
    let (t, _) = type_var(&db, "T");
    let mut system = ConstraintSystemImpl::new(&db);
    system.register_type_variables(&[t]);

    let status = system.status();
    assert!(!status.is_successful());
    assert!(!status.has_contradiction());
    assert_eq!(status.unknown_parameters(), &[t]);
}

#[test]
fn test_expected_type_only_failure_is_attributed() {
    let db = TypeInterner::new();
    let (t, t_ty) = type_var(&db, "T");
    let mut system = ConstraintSystemImpl::new(&db);
    system.register_type_variables(&[t]);
    system.add_subtype_constraint(TypeId::INT, t_ty, ConstraintPosition::ValueParameter(0));
    system.add_subtype_constraint(t_ty, TypeId::STRING, ConstraintPosition::ExpectedType);

    let status = system.status();
    assert!(status.has_only_errors_from(ConstraintPosition::ExpectedType));
}

#[test]
fn test_expected_type_compatible_with_lower_bound() {
    let db = TypeInterner::new();
    let (t, t_ty) = type_var(&db, "T");
    let mut system = ConstraintSystemImpl::new(&db);
    system.register_type_variables(&[t]);
    system.add_subtype_constraint(TypeId::INT, t_ty, ConstraintPosition::ValueParameter(0));
    system.add_subtype_constraint(t_ty, TypeId::NUMBER, ConstraintPosition::ExpectedType);

    assert!(system.status().is_successful());
    assert_eq!(system.resulting_substitution().get(t), Some(TypeId::INT));
}

#[test]
fn test_ground_mismatch_without_variables() {
    let db = TypeInterner::new();
    let mut system = ConstraintSystemImpl::new(&db);
    system.add_subtype_constraint(TypeId::STRING, TypeId::INT, ConstraintPosition::ValueParameter(0));

    let status = system.status();
    assert!(status.has_contradiction());
    assert!(status.has_error_from(ConstraintPosition::ValueParameter(0)));
}

#[test]
fn test_covariant_argument_gives_lower_bound() {
    let db = TypeInterner::new();
    let (t, t_ty) = type_var(&db, "T");
    let mut system = ConstraintSystemImpl::new(&db);
    system.register_type_variables(&[t]);
    system.add_subtype_constraint(TypeId::INT, t_ty, ConstraintPosition::ValueParameter(0));
    system.add_subtype_constraint(
        db.class_type(DefId::FUNCTION, &[TypeId::LONG]),
        db.class_type(DefId::FUNCTION, &[t_ty]),
        ConstraintPosition::ValueParameter(1),
    );

    assert!(system.status().is_successful());
    assert_eq!(system.resulting_substitution().get(t), Some(TypeId::NUMBER));
}

#[test]
fn test_equal_variables_share_a_value() {
    let db = TypeInterner::new();
    let (t, t_ty) = type_var(&db, "T");
    let (r, r_ty) = type_var(&db, "R");
    let mut system = ConstraintSystemImpl::new(&db);
    system.register_type_variables(&[t, r]);
    system.add_subtype_constraint(db.array_of(t_ty), db.array_of(r_ty), ConstraintPosition::Receiver);
    system.add_subtype_constraint(TypeId::CHAR, t_ty, ConstraintPosition::ValueParameter(0));

    assert!(system.status().is_successful());
    let substitution = system.resulting_substitution();
    assert_eq!(substitution.get(t), Some(TypeId::CHAR));
    assert_eq!(substitution.get(r), Some(TypeId::CHAR));
}
