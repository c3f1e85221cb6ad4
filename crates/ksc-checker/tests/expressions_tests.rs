use super::*;
use crate::fixture::{Fixture, codes};
use ksc_binder::CallableDescriptor;
use ksc_common::diagnostics::diagnostic_codes;
use ksc_solver::{TypeId, type_queries};
use ksc_syntax::{CallKind, LiteralKind, NodeIndex};

#[test]
fn test_literal_default_types() {
    assert_eq!(get_default_type(LiteralKind::Integer), TypeId::INT);
    assert_eq!(get_default_type(LiteralKind::Float), TypeId::DOUBLE);
    assert_eq!(get_default_type(LiteralKind::Boolean), TypeId::BOOLEAN);
    assert_eq!(get_default_type(LiteralKind::Character), TypeId::CHAR);
    assert_eq!(get_default_type(LiteralKind::String), TypeId::STRING);
    assert_eq!(get_default_type(LiteralKind::Null), TypeId::NULLABLE_NOTHING);
}

#[test]
fn test_expression_types_are_cached() {
    let mut fx = Fixture::new();
    let one = fx.int_literal("1");
    let typing = fx.typing();
    let mut trace = BindingContext::new();
    let mut checker = fx.checker();

    assert_eq!(checker.get_type_of_expression(&mut trace, &typing, one).unwrap(), TypeId::INT);
    assert!(trace.is_processed(one));
    // The cached type is returned without checking again.
    let expecting_string = typing.replace_expected_type(ExpectedType::Type(TypeId::STRING));
    assert_eq!(
        checker.get_type_of_expression(&mut trace, &expecting_string, one).unwrap(),
        TypeId::INT
    );
    assert!(trace.diagnostics().is_empty());
}

#[test]
fn test_unresolved_name() {
    let mut fx = Fixture::new();
    let missing = fx.reference("missing");
    let typing = fx.typing();
    let mut trace = BindingContext::new();
    let ty = fx.checker().get_type_of_expression(&mut trace, &typing, missing).unwrap();

    assert!(type_queries::is_error_type(&fx.db, ty));
    assert_eq!(codes(&trace), vec![diagnostic_codes::UNRESOLVED_REFERENCE]);
    assert!(trace.reference_target(missing).is_none());
}

#[test]
fn test_type_mismatch_against_expected_type() {
    let mut fx = Fixture::new();
    let text = fx.string_literal("s");
    let typing = fx.typing().replace_expected_type(ExpectedType::Type(TypeId::INT));
    let mut trace = BindingContext::new();
    fx.checker().get_type_of_expression(&mut trace, &typing, text).unwrap();

    assert_eq!(codes(&trace), vec![diagnostic_codes::TYPE_MISMATCH]);
    let rendered = trace.diagnostics()[0].render(&fx.db, &fx.arena, "main.kt").unwrap();
    assert_eq!(rendered.message_text, "Type mismatch: inferred type is String but Int was expected");
    assert_eq!(rendered.file, "main.kt");
}

#[test]
fn test_infix_contains_must_return_boolean() {
    let mut fx = Fixture::new();
    let bag = fx.declare_class("Bag");
    fx.declare_member(
        bag,
        CallableDescriptor::function(fx.name("contains"), TypeId::INT).with_value_param(fx.name("x"), TypeId::INT),
    );
    fx.local("bag", bag);
    let receiver = fx.reference("bag");
    let one = fx.int_literal("1");
    let contains = fx.name("contains");
    let call = fx.arena.add_call(receiver, contains, vec![one], CallKind::Infix);
    let typing = fx.typing();
    let mut trace = BindingContext::new();
    let ty = fx.checker().get_type_of_expression(&mut trace, &typing, call).unwrap();

    assert_eq!(ty, TypeId::INT);
    assert_eq!(codes(&trace), vec![diagnostic_codes::RESULT_TYPE_MISMATCH]);
    let rendered = trace.diagnostics()[0].render(&fx.db, &fx.arena, "main.kt").unwrap();
    assert_eq!(rendered.message_text, "contains must return Boolean but returns Int");
}

#[test]
fn test_ensure_boolean_result() {
    let mut fx = Fixture::new();
    let node = fx.reference("op");
    let equals = fx.name("equals");
    let mut trace = BindingContext::new();
    let checker = fx.checker();

    assert!(checker.ensure_boolean_result(&mut trace, node, equals, Some(TypeId::BOOLEAN)));
    assert!(checker.ensure_boolean_result(&mut trace, node, equals, None));
    assert!(checker.ensure_boolean_result(&mut trace, node, equals, Some(TypeId::ERROR)));
    assert!(trace.diagnostics().is_empty());
    assert!(!checker.ensure_boolean_result(&mut trace, node, equals, Some(TypeId::STRING)));
    assert_eq!(codes(&trace), vec![diagnostic_codes::RESULT_TYPE_MISMATCH]);
}

#[test]
fn test_this_referring_to_class_becomes_class_receiver() {
    let mut fx = Fixture::new();
    let widget = fx.declare_class("Widget");
    let member = fx.declare_member(widget, CallableDescriptor::function(fx.name("size"), TypeId::INT));
    let def = type_queries::class_def(&fx.db, widget).unwrap();
    let class = fx.binder.class_declaration(def).unwrap();
    let this = fx.arena.add_this();
    let size = fx.name("size");
    let call = fx.arena.add_call(this, size, vec![], CallKind::Normal);
    let typing = fx
        .typing()
        .with_this_receiver(ReceiverValue::This { owner: class, ty: widget });
    let mut trace = BindingContext::new();
    let ty = fx.checker().get_type_of_expression(&mut trace, &typing, call).unwrap();

    assert_eq!(ty, TypeId::INT);
    assert_eq!(trace.reference_target(call), Some(member));
    assert_eq!(
        trace.resolved_call(call).unwrap().explicit_receiver,
        ReceiverValue::ClassReceiver { class, ty: widget }
    );
}

#[test]
fn test_this_outside_a_class() {
    let mut fx = Fixture::new();
    let this = fx.arena.add_this();
    let typing = fx.typing();
    let mut trace = BindingContext::new();
    let ty = fx.checker().get_type_of_expression(&mut trace, &typing, this).unwrap();

    assert!(type_queries::is_error_type(&fx.db, ty));
    assert_eq!(codes(&trace), vec![diagnostic_codes::UNRESOLVED_REFERENCE]);
}

#[test]
fn test_resolve_type_reference() {
    let mut fx = Fixture::new();
    let int_name = fx.name("Int");
    let array_name = fx.name("Array");
    let unknown_name = fx.name("Missing");
    let int_ref = fx.arena.add_type_reference(int_name, vec![], false);
    let array_ref = fx.arena.add_type_reference(array_name, vec![int_ref], true);
    let unknown_ref = fx.arena.add_type_reference(unknown_name, vec![], false);
    let mut trace = BindingContext::new();
    let checker = fx.checker();
    let db = checker.ctx.types;

    let ty = checker.resolve_type_reference(&mut trace, array_ref).unwrap();
    assert_eq!(ty, type_queries::make_nullable(db, db.array_of(TypeId::INT)));
    assert!(trace.diagnostics().is_empty());

    let ty = checker.resolve_type_reference(&mut trace, unknown_ref).unwrap();
    assert!(type_queries::is_error_type(db, ty));
    assert_eq!(codes(&trace), vec![diagnostic_codes::UNRESOLVED_REFERENCE]);

    assert_eq!(checker.resolve_type_reference(&mut trace, int_ref).unwrap(), TypeId::INT);
}

#[test]
fn test_non_expression_node_is_malformed() {
    let mut fx = Fixture::new();
    let int_name = fx.name("Int");
    let type_ref = fx.arena.add_type_reference(int_name, vec![], false);
    let typing = fx.typing();
    let mut trace = BindingContext::new();
    let err = fx
        .checker()
        .get_type_of_expression(&mut trace, &typing, type_ref)
        .unwrap_err();

    assert!(matches!(err, AnalysisError::MalformedTree { node, .. } if node == type_ref));
}

#[test]
fn test_expression_depth_limit() {
    let mut fx = Fixture::new();
    fx.declare_top_level(
        CallableDescriptor::function(fx.name("foo"), TypeId::UNIT).with_value_param(fx.name("x"), TypeId::INT),
    );
    let one = fx.int_literal("1");
    let foo = fx.name("foo");
    let call = fx.arena.add_call(NodeIndex::NONE, foo, vec![one], CallKind::Normal);
    let typing = fx.typing();
    let mut trace = BindingContext::new();
    let options = CheckerOptions {
        max_expression_depth: 1,
        ..CheckerOptions::default()
    };
    let err = CheckerState::new(&fx.arena, &fx.db, &mut fx.binder, options)
        .get_type_of_expression(&mut trace, &typing, call)
        .unwrap_err();

    assert_eq!(err, AnalysisError::DepthExceeded(1));
}

#[test]
fn test_local_function_declaration_is_callable() {
    let mut fx = Fixture::new();
    let helper = fx.name("helper");
    let body = fx.arena.add_block(vec![]);
    let declaration = fx.arena.add_function_declaration(helper, body);
    let call = fx.arena.add_call(NodeIndex::NONE, helper, vec![], CallKind::Normal);
    let typing = fx.typing();
    let mut trace = BindingContext::new();
    let ty = fx
        .checker()
        .check_statements(&mut trace, &typing, &[declaration, call])
        .unwrap();

    assert_eq!(ty, TypeId::UNIT);
    let target = trace.reference_target(call).unwrap();
    assert_eq!(fx.binder.declaration_at(declaration), Some(target));
    assert!(fx.binder.is_declared_in_function(target));
    assert!(trace.diagnostics().is_empty());
}
