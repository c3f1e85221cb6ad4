use super::*;
use crate::fixture::{Fixture, codes};
use ksc_binder::CallableDescriptor;
use ksc_common::diagnostics::diagnostic_codes;
use ksc_solver::{DefId, TypeId, Variance, type_queries};
use ksc_syntax::{CallKind, NodeIndex};

fn call(fx: &mut Fixture, receiver: NodeIndex, name: &str, args: Vec<NodeIndex>, kind: CallKind) -> NodeIndex {
    let callee = fx.name(name);
    fx.arena.add_call(receiver, callee, args, kind)
}

#[test]
fn test_single_candidate_resolves() {
    let mut fx = Fixture::new();
    let foo = fx.declare_top_level(
        CallableDescriptor::function(fx.name("foo"), TypeId::STRING).with_value_param(fx.name("x"), TypeId::INT),
    );
    let one = fx.int_literal("1");
    let node = call(&mut fx, NodeIndex::NONE, "foo", vec![one], CallKind::Normal);
    let typing = fx.typing();
    let mut trace = BindingContext::new();
    let ty = fx.checker().get_type_of_expression(&mut trace, &typing, node).unwrap();

    assert_eq!(ty, TypeId::STRING);
    assert_eq!(trace.expression_type(node), Some(TypeId::STRING));
    assert_eq!(trace.reference_target(node), Some(foo));
    let resolved = trace.resolved_call(node).unwrap();
    assert_eq!(resolved.candidate, foo);
    assert_eq!(resolved.value_arguments, vec![one]);
    assert!(trace.diagnostics().is_empty());
}

#[test]
fn test_unknown_name_is_unresolved() {
    let mut fx = Fixture::new();
    let node = call(&mut fx, NodeIndex::NONE, "bar", vec![], CallKind::Normal);
    let typing = fx.typing();
    let mut trace = BindingContext::new();
    let mut checker = fx.checker();
    let description = CallDescription::new(node, ReceiverValue::NoReceiver, vec![]);
    let bar = checker.ctx.types.name("bar");
    let results = checker
        .resolve_call_with_given_name(&mut trace, &typing, &description, bar)
        .unwrap();

    assert_eq!(results, OverloadResolutionResults::Missing { inapplicable: vec![] });
    assert_eq!(codes(&trace), vec![diagnostic_codes::UNRESOLVED_REFERENCE]);
}

#[test]
fn test_call_with_wrong_argument_reports_none_applicable() {
    let mut fx = Fixture::new();
    fx.declare_top_level(
        CallableDescriptor::function(fx.name("foo"), TypeId::UNIT).with_value_param(fx.name("x"), TypeId::INT),
    );
    let text = fx.string_literal("s");
    let node = call(&mut fx, NodeIndex::NONE, "foo", vec![text], CallKind::Normal);
    let typing = fx.typing();
    let mut trace = BindingContext::new();
    let ty = fx.checker().get_type_of_expression(&mut trace, &typing, node).unwrap();

    assert!(type_queries::is_error_type(&fx.db, ty));
    assert_eq!(codes(&trace), vec![diagnostic_codes::NONE_APPLICABLE]);
    assert!(trace.resolved_call(node).is_none());
    let rendered = trace.diagnostics()[0]
        .render(&fx.db, &fx.arena, "main.kt")
        .unwrap();
    assert!(rendered.message_text.contains("foo(x: Int): Unit"), "{}", rendered.message_text);
}

#[test]
fn test_most_specific_overload_wins() {
    let mut fx = Fixture::new();
    let on_int = fx.declare_top_level(
        CallableDescriptor::function(fx.name("foo"), TypeId::INT).with_value_param(fx.name("x"), TypeId::INT),
    );
    fx.declare_top_level(
        CallableDescriptor::function(fx.name("foo"), TypeId::NUMBER).with_value_param(fx.name("x"), TypeId::NUMBER),
    );
    let t = fx.db.fresh_type_param("T", Variance::Invariant);
    fx.declare_top_level(
        CallableDescriptor::function(fx.name("foo"), TypeId::UNIT)
            .with_type_params(vec![t])
            .with_value_param(fx.name("x"), fx.db.type_param_type(t)),
    );
    let one = fx.int_literal("1");
    let node = call(&mut fx, NodeIndex::NONE, "foo", vec![one], CallKind::Normal);
    let typing = fx.typing();
    let mut trace = BindingContext::new();
    let ty = fx.checker().get_type_of_expression(&mut trace, &typing, node).unwrap();

    assert_eq!(ty, TypeId::INT);
    assert_eq!(trace.reference_target(node), Some(on_int));
    assert!(trace.diagnostics().is_empty());
}

#[test]
fn test_equally_specific_overloads_are_ambiguous() {
    let mut fx = Fixture::new();
    let first = fx.declare_top_level(
        CallableDescriptor::function(fx.name("foo"), TypeId::INT).with_value_param(fx.name("x"), TypeId::INT),
    );
    let second = fx.declare_top_level(
        CallableDescriptor::function(fx.name("foo"), TypeId::STRING).with_value_param(fx.name("y"), TypeId::INT),
    );
    let one = fx.int_literal("1");
    let node = call(&mut fx, NodeIndex::NONE, "foo", vec![one], CallKind::Normal);
    let typing = fx.typing();
    let mut trace = BindingContext::new();
    let mut checker = fx.checker();
    checker.get_type_of_expression(&mut trace, &typing, one).unwrap();
    let foo = checker.ctx.types.name("foo");
    let description = CallDescription::new(node, ReceiverValue::NoReceiver, vec![one]);
    let results = checker
        .resolve_call_with_given_name(&mut trace, &typing, &description, foo)
        .unwrap();

    let OverloadResolutionResults::Ambiguous(calls) = &results else {
        panic!("expected ambiguity, got {results:?}");
    };
    let mut candidates: Vec<_> = calls.iter().map(|call| call.candidate).collect();
    candidates.sort_by_key(|decl| decl.0);
    assert_eq!(candidates, vec![first, second]);
    assert_eq!(codes(&trace), vec![diagnostic_codes::OVERLOAD_RESOLUTION_AMBIGUITY]);
    assert!(trace.resolved_call(node).is_none());
}

#[test]
fn test_ambiguity_cites_every_candidate() {
    let mut fx = Fixture::new();
    let root = fx.binder.root_scope();
    let mut declared = Vec::new();
    for i in 0..10 {
        let name = fx.name("foo");
        let node = fx.arena.add_function_declaration(name, NodeIndex::NONE);
        fx.binder.declare_callable(
            root,
            CallableDescriptor::function(name, TypeId::INT).with_value_param(fx.name(&format!("p{i}")), TypeId::INT),
            node,
        );
        declared.push(node);
    }
    let one = fx.int_literal("1");
    let node = call(&mut fx, NodeIndex::NONE, "foo", vec![one], CallKind::Normal);
    let typing = fx.typing();
    let mut trace = BindingContext::new();
    let mut checker = fx.checker();
    checker.get_type_of_expression(&mut trace, &typing, one).unwrap();
    let foo = checker.ctx.types.name("foo");
    let description = CallDescription::new(node, ReceiverValue::NoReceiver, vec![one]);
    let results = checker
        .resolve_call_with_given_name(&mut trace, &typing, &description, foo)
        .unwrap();
    assert!(results.is_ambiguity());

    let diagnostic = &trace.diagnostics()[0];
    assert_eq!(diagnostic.code, diagnostic_codes::OVERLOAD_RESOLUTION_AMBIGUITY);
    let rendered = diagnostic.args[0].render(&fx.db);
    for i in 0..10 {
        assert!(rendered.contains(&format!("foo(p{i}: Int): Int")), "{rendered}");
    }
    assert!(!rendered.contains("more"), "{rendered}");

    let mut related = diagnostic.related.clone();
    related.sort_by_key(|node| node.0);
    assert_eq!(related, declared);
}

#[test]
fn test_local_candidates_take_priority() {
    let mut fx = Fixture::new();
    fx.declare_top_level(
        CallableDescriptor::function(fx.name("foo"), TypeId::INT).with_value_param(fx.name("x"), TypeId::INT),
    );
    let local = fx.declare_local_function(
        CallableDescriptor::function(fx.name("foo"), TypeId::STRING).with_value_param(fx.name("x"), TypeId::ANY),
    );
    let one = fx.int_literal("1");
    let node = call(&mut fx, NodeIndex::NONE, "foo", vec![one], CallKind::Normal);
    let typing = fx.typing();
    let mut trace = BindingContext::new();
    let ty = fx.checker().get_type_of_expression(&mut trace, &typing, node).unwrap();

    assert_eq!(ty, TypeId::STRING);
    assert_eq!(trace.reference_target(node), Some(local));
}

#[test]
fn test_member_beats_non_local_extension() {
    let mut fx = Fixture::new();
    let boxed = fx.declare_class("Box");
    let member = fx.declare_member(boxed, CallableDescriptor::function(fx.name("get"), TypeId::INT));
    fx.declare_top_level(
        CallableDescriptor::function(fx.name("get"), TypeId::STRING).with_extension_receiver(boxed),
    );
    fx.local("b", boxed);
    let receiver = fx.reference("b");
    let node = call(&mut fx, receiver, "get", vec![], CallKind::Normal);
    let typing = fx.typing();
    let mut trace = BindingContext::new();
    let ty = fx.checker().get_type_of_expression(&mut trace, &typing, node).unwrap();

    assert_eq!(ty, TypeId::INT);
    assert_eq!(trace.reference_target(node), Some(member));
}

#[test]
fn test_unsafe_call_on_nullable_receiver() {
    let mut fx = Fixture::new();
    let nullable_int = type_queries::make_nullable(&fx.db, TypeId::INT);
    fx.local("x", nullable_int);
    let plain_receiver = fx.reference("x");
    let plain = call(&mut fx, plain_receiver, "minus", vec![], CallKind::Normal);
    let safe_receiver = fx.reference("x");
    let safe = call(&mut fx, safe_receiver, "minus", vec![], CallKind::Safe);
    let typing = fx.typing();
    let mut trace = BindingContext::new();
    let mut checker = fx.checker();

    let plain_type = checker.get_type_of_expression(&mut trace, &typing, plain).unwrap();
    assert_eq!(plain_type, TypeId::INT);
    assert_eq!(codes(&trace), vec![diagnostic_codes::UNSAFE_CALL]);
    assert_eq!(trace.diagnostics()[0].node, plain);
    assert!(trace.resolved_call(plain).unwrap().receiver_widened);

    let safe_type = checker.get_type_of_expression(&mut trace, &typing, safe).unwrap();
    assert_eq!(safe_type, type_queries::make_nullable(checker.ctx.types, TypeId::INT));
    assert_eq!(trace.diagnostics().len(), 1);
}

#[test]
fn test_direct_nullable_receiver_match_beats_widening() {
    let mut fx = Fixture::new();
    let nullable_int = type_queries::make_nullable(&fx.db, TypeId::INT);
    let on_nullable = fx.declare_top_level(
        CallableDescriptor::function(fx.name("describe"), TypeId::STRING).with_extension_receiver(nullable_int),
    );
    let on_int = fx.declare_top_level(
        CallableDescriptor::function(fx.name("describe"), TypeId::INT).with_extension_receiver(TypeId::INT),
    );
    fx.local("n", nullable_int);
    fx.local("i", TypeId::INT);
    let n = fx.reference("n");
    let on_n = call(&mut fx, n, "describe", vec![], CallKind::Normal);
    let i = fx.reference("i");
    let on_i = call(&mut fx, i, "describe", vec![], CallKind::Normal);
    let typing = fx.typing();
    let mut trace = BindingContext::new();
    let mut checker = fx.checker();

    assert_eq!(checker.get_type_of_expression(&mut trace, &typing, on_n).unwrap(), TypeId::STRING);
    assert_eq!(trace.reference_target(on_n), Some(on_nullable));
    assert_eq!(checker.get_type_of_expression(&mut trace, &typing, on_i).unwrap(), TypeId::INT);
    assert_eq!(trace.reference_target(on_i), Some(on_int));
    assert!(trace.diagnostics().is_empty());
}

#[test]
fn test_generic_call_infers_from_arguments() {
    let mut fx = Fixture::new();
    let t = fx.db.fresh_type_param("T", Variance::Invariant);
    let t_type = fx.db.type_param_type(t);
    fx.declare_top_level(
        CallableDescriptor::function(fx.name("id"), t_type)
            .with_type_params(vec![t])
            .with_value_param(fx.name("value"), t_type),
    );
    let one = fx.int_literal("1");
    let node = call(&mut fx, NodeIndex::NONE, "id", vec![one], CallKind::Normal);
    let typing = fx.typing();
    let mut trace = BindingContext::new();
    let ty = fx.checker().get_type_of_expression(&mut trace, &typing, node).unwrap();

    assert_eq!(ty, TypeId::INT);
    let resolved = trace.resolved_call(node).unwrap();
    assert_eq!(resolved.substitution.get(t), Some(TypeId::INT));
    assert!(resolved.resulting_descriptor.type_params.is_empty());
    assert_eq!(resolved.candidate_descriptor.type_params, vec![t]);
}

#[test]
fn test_expected_type_completes_inference() {
    let mut fx = Fixture::new();
    let t = fx.db.fresh_type_param("T", Variance::Invariant);
    let array_t = fx.db.array_of(fx.db.type_param_type(t));
    fx.declare_top_level(CallableDescriptor::function(fx.name("emptyArray"), array_t).with_type_params(vec![t]));
    let with_expected = call(&mut fx, NodeIndex::NONE, "emptyArray", vec![], CallKind::Normal);
    let without_expected = call(&mut fx, NodeIndex::NONE, "emptyArray", vec![], CallKind::Normal);
    let strings = fx.db.array_of(TypeId::STRING);
    let typing = fx.typing();
    let mut trace = BindingContext::new();
    let mut checker = fx.checker();

    let ty = checker
        .get_type_of_expression(&mut trace, &typing.replace_expected_type(ExpectedType::Type(strings)), with_expected)
        .unwrap();
    assert_eq!(ty, strings);
    assert!(trace.diagnostics().is_empty());

    checker.get_type_of_expression(&mut trace, &typing, without_expected).unwrap();
    assert_eq!(codes(&trace), vec![diagnostic_codes::TYPE_INFERENCE_FAILED]);
}

#[test]
fn test_unsatisfiable_expected_type_is_dropped() {
    let mut fx = Fixture::new();
    let t = fx.db.fresh_type_param("T", Variance::Invariant);
    let t_type = fx.db.type_param_type(t);
    fx.declare_top_level(
        CallableDescriptor::function(fx.name("id"), t_type)
            .with_type_params(vec![t])
            .with_value_param(fx.name("value"), t_type),
    );
    let one = fx.int_literal("1");
    let node = call(&mut fx, NodeIndex::NONE, "id", vec![one], CallKind::Normal);
    let typing = fx.typing().replace_expected_type(ExpectedType::Type(TypeId::STRING));
    let mut trace = BindingContext::new();
    let ty = fx.checker().get_type_of_expression(&mut trace, &typing, node).unwrap();

    assert_eq!(ty, TypeId::INT);
    assert!(trace.resolved_call(node).is_some());
    assert_eq!(codes(&trace), vec![diagnostic_codes::TYPE_MISMATCH]);
}

#[test]
fn test_array_get_is_resolved_through_class_type_parameter() {
    let mut fx = Fixture::new();
    let ints = fx.db.array_of(TypeId::INT);
    fx.local("values", ints);
    let receiver = fx.reference("values");
    let zero = fx.int_literal("0");
    let get = call(&mut fx, receiver, "get", vec![zero], CallKind::Normal);
    let size_receiver = fx.reference("values");
    let size = call(&mut fx, size_receiver, "size", vec![], CallKind::Normal);
    let typing = fx.typing();
    let mut trace = BindingContext::new();
    let mut checker = fx.checker();

    assert_eq!(checker.get_type_of_expression(&mut trace, &typing, get).unwrap(), TypeId::INT);
    assert_eq!(checker.get_type_of_expression(&mut trace, &typing, size).unwrap(), TypeId::INT);
    let resolved = trace.resolved_call(get).unwrap();
    assert_eq!(resolved.resulting_descriptor.dispatch_receiver, Some(ints));
    assert!(trace.resolved_call(size).unwrap().resulting_descriptor.is_property());
    assert!(trace.diagnostics().is_empty());
}

#[test]
fn test_function_literal_argument_needs_function_parameter() {
    let mut fx = Fixture::new();
    let block_type = fx.db.class_type(DefId::FUNCTION, &[TypeId::UNIT]);
    fx.declare_top_level(
        CallableDescriptor::function(fx.name("run"), TypeId::UNIT).with_value_param(fx.name("block"), block_type),
    );
    fx.declare_top_level(
        CallableDescriptor::function(fx.name("take"), TypeId::UNIT).with_value_param(fx.name("n"), TypeId::INT),
    );
    let one = fx.int_literal("1");
    let (literal, _) = fx.arena.add_function_literal(vec![one]);
    let run = call(&mut fx, NodeIndex::NONE, "run", vec![literal], CallKind::Normal);
    let two = fx.int_literal("2");
    let (other_literal, _) = fx.arena.add_function_literal(vec![two]);
    let take = call(&mut fx, NodeIndex::NONE, "take", vec![other_literal], CallKind::Normal);
    let typing = fx.typing();
    let mut trace = BindingContext::new();
    let mut checker = fx.checker();

    assert_eq!(checker.get_type_of_expression(&mut trace, &typing, run).unwrap(), TypeId::UNIT);
    let literal_type = trace.expression_type(literal).unwrap();
    assert_eq!(literal_type, checker.ctx.types.class_type(DefId::FUNCTION, &[TypeId::INT]));
    assert!(trace.diagnostics().is_empty());

    checker.get_type_of_expression(&mut trace, &typing, take).unwrap();
    assert_eq!(codes(&trace), vec![diagnostic_codes::NONE_APPLICABLE]);
    // The literal is still analyzed.
    assert!(trace.expression_type(other_literal).is_some());
}
