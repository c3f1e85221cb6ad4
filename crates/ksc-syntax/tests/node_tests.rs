use super::*;
use ksc_common::Interner;

#[test]
fn test_children_get_parent_links() {
    let names = Interner::new();
    let mut arena = NodeArena::new();
    let receiver = arena.add_name_reference(names.intern("xs"));
    let index = arena.add_literal(LiteralKind::Integer, names.intern("0"));
    let call = arena.add_call(receiver, names.intern("get"), vec![index], CallKind::Normal);

    assert_eq!(arena.parent(receiver), call);
    assert_eq!(arena.parent(index), call);
    assert!(arena.parent(call).is_none());
    assert_eq!(arena.children(call).as_slice(), &[receiver, index]);
    assert_eq!(arena.kind(call), Some(NodeKind::Call));
}

#[test]
fn test_function_literal_expression_wraps_literal() {
    let names = Interner::new();
    let mut arena = NodeArena::new();
    let body = arena.add_name_reference(names.intern("x"));
    let (expression, literal) = arena.add_function_literal(vec![body]);

    assert_eq!(arena.parent(body), literal);
    assert_eq!(arena.parent(literal), expression);
    assert_eq!(arena.kind(expression), Some(NodeKind::FunctionLiteralExpression));
    assert!(arena.is_ancestor(expression, body, true));
    assert!(arena.is_ancestor(body, body, false));
    assert!(!arena.is_ancestor(body, body, true));
}

#[test]
fn test_synthetic_indices_never_resolve() {
    let mut arena = NodeArena::new();
    arena.add_this();
    let fake = NodeIndex::synthetic(0);
    assert!(fake.is_synthetic());
    assert!(fake.is_some());
    assert!(!NodeIndex::NONE.is_synthetic());
    assert!(!NodeIndex(0).is_synthetic());
    assert!(arena.get(fake).is_none());
    assert_eq!(arena.span(fake), (0, 0));
}

#[test]
fn test_multi_declaration_accessors() {
    let names = Interner::new();
    let mut arena = NodeArena::new();
    let int_ref = arena.add_type_reference(names.intern("Int"), vec![], false);
    let a = arena.add_multi_declaration_entry(names.intern("a"), int_ref);
    let b = arena.add_multi_declaration_entry(names.intern("b"), NodeIndex::NONE);
    let init = arena.add_name_reference(names.intern("pair"));
    let decl = arena.add_multi_declaration(vec![a, b], init);

    let data = arena.get_multi_declaration(decl).expect("multi declaration");
    assert_eq!(data.entries, vec![a, b]);
    assert_eq!(data.initializer, init);
    assert_eq!(arena.parent(int_ref), a);
    assert_eq!(arena.name_of(b), Some(names.intern("b")));
    assert!(arena.get_call(decl).is_none());
}
