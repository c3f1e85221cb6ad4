use super::*;
use ksc_solver::{TypeId, TypeInterner};
use ksc_syntax::NodeIndex;

#[test]
fn test_lookup_variable_walks_outward() {
    let db = TypeInterner::new();
    let mut binder = BinderState::new(db.name("demo"));
    let root = binder.root_scope();
    let main = binder.declare_callable(
        root,
        CallableDescriptor::function(db.name("main"), TypeId::UNIT),
        NodeIndex::NONE,
    );
    let body = binder.new_scope(root, main);
    let inner = binder.new_scope(body, main);

    let x = binder.declare_local_variable(body, db.name("x"), TypeId::INT, NodeIndex::NONE);
    assert_eq!(binder.lookup_variable(inner, db.name("x")), Some(x));
    assert_eq!(binder.lookup_variable(root, db.name("x")), None);

    let shadow = binder.declare_local_variable(inner, db.name("x"), TypeId::STRING, NodeIndex::NONE);
    assert_eq!(binder.lookup_variable(inner, db.name("x")), Some(shadow));
    assert_eq!(binder.scope_chain(inner), vec![inner, body, root]);
}

#[test]
fn test_functions_are_grouped_by_name() {
    let db = TypeInterner::new();
    let mut binder = BinderState::new(db.name("demo"));
    let root = binder.root_scope();
    let name = db.name("describe");
    let a = binder.declare_callable(
        root,
        CallableDescriptor::function(name, TypeId::STRING).with_value_param(db.name("x"), TypeId::INT),
        NodeIndex::NONE,
    );
    let b = binder.declare_callable(
        root,
        CallableDescriptor::function(name, TypeId::STRING).with_value_param(db.name("x"), TypeId::LONG),
        NodeIndex::NONE,
    );
    let scope = binder.scope(root).expect("root scope");
    assert_eq!(scope.functions_named(name), &[a, b]);
    assert!(scope.functions_named(db.name("missing")).is_empty());
}

#[test]
fn test_builtin_members_are_declared() {
    let db = TypeInterner::new();
    let mut binder = BinderState::new(db.name("demo"));
    binder.declare_builtin_members(&db);

    let get = binder.members_named(ksc_solver::DefId::ARRAY, db.name("get"));
    assert_eq!(get.len(), 1);
    let descriptor = binder.callable(get[0]).expect("callable");
    assert_eq!(descriptor.value_params.len(), 1);
    assert_eq!(descriptor.type_params.len(), 1);

    let size = binder.members_named(ksc_solver::DefId::INT_ARRAY, db.name("size"));
    assert_eq!(binder.kind(size[0]), Some(DeclKind::Property));
}

#[test]
fn test_only_builtin_members_are_marked_builtin() {
    let db = TypeInterner::new();
    let mut binder = BinderState::new(db.name("demo"));
    binder.declare_builtin_members(&db);

    let size = binder.members_named(ksc_solver::DefId::INT_ARRAY, db.name("size"));
    assert!(binder.is_builtin_member(size[0]));

    let int_array = db.class_type(ksc_solver::DefId::INT_ARRAY, &[]);
    let user_member = binder.declare_member(
        ksc_solver::DefId::INT_ARRAY,
        CallableDescriptor::function(db.name("get"), TypeId::INT)
            .with_dispatch_receiver(int_array)
            .with_value_param(db.name("i"), TypeId::INT),
    );
    assert!(!binder.is_builtin_member(user_member));
    assert_eq!(binder.members_named(ksc_solver::DefId::INT_ARRAY, db.name("get")).len(), 2);
}
