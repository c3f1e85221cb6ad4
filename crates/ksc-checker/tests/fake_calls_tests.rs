use super::*;
use crate::fixture::{Fixture, codes};
use ksc_binder::CallableDescriptor;
use ksc_common::diagnostics::diagnostic_codes;
use ksc_solver::TypeId;
use ksc_syntax::NodeIndex;

fn int_receiver(fx: &mut Fixture) -> ReceiverValue {
    let expression = fx.int_literal("1");
    ReceiverValue::Expression {
        expression,
        ty: TypeId::INT,
    }
}

#[test]
fn test_failed_fake_call_leaves_no_trace() {
    let mut fx = Fixture::new();
    let receiver = int_receiver(&mut fx);
    let component = fx.name("component1");
    let typing = fx.typing();
    let mut root = BindingContext::new();
    let results = fx
        .checker()
        .resolve_fake_call(&mut root, &typing, receiver, component, vec![], FailureReport::Silent)
        .unwrap();

    assert!(results.is_missing());
    assert!(!root.has_entries_for(TraceKey::Node(NodeIndex::synthetic(0))));
    assert!(root.is_empty());
    assert!(root.diagnostics().is_empty());
}

#[test]
fn test_failed_fake_call_reports_on_real_node() {
    let mut fx = Fixture::new();
    let receiver = int_receiver(&mut fx);
    let site = fx.reference("site");
    let component = fx.name("component1");
    let typing = fx.typing();
    let mut root = BindingContext::new();
    fx.checker()
        .resolve_fake_call(&mut root, &typing, receiver, component, vec![], FailureReport::On(site))
        .unwrap();

    assert_eq!(codes(&root), vec![diagnostic_codes::UNRESOLVED_REFERENCE]);
    assert_eq!(root.diagnostics()[0].node, site);
    assert!(root.is_empty());
}

#[test]
fn test_successful_fake_call_drops_placeholder_entries() {
    let mut fx = Fixture::new();
    let receiver = int_receiver(&mut fx);
    let to_string = fx.name("toString");
    let typing = fx.typing();
    let mut root = BindingContext::new();
    let mut checker = fx.checker();
    let results = checker
        .resolve_fake_call(&mut root, &typing, receiver, to_string, vec![], FailureReport::Silent)
        .unwrap();

    assert!(results.is_success());
    let call = results.resulting_call().unwrap();
    assert!(call.call_element.is_synthetic());
    assert_eq!(call.resulting_descriptor.return_type, TypeId::STRING);
    assert_eq!(root.entries_keyed_by(TraceKey::Node(call.call_element)), 0);
    assert!(root.diagnostics().is_empty());
    // Each fake call gets a fresh placeholder.
    assert_ne!(checker.next_placeholder().unwrap(), call.call_element);
}

#[test]
fn test_fake_call_with_argument_types() {
    let mut fx = Fixture::new();
    fx.declare_top_level(
        CallableDescriptor::function(fx.name("times"), TypeId::INT)
            .with_extension_receiver(TypeId::INT)
            .with_value_param(fx.name("other"), TypeId::INT),
    );
    let receiver = int_receiver(&mut fx);
    let site = fx.reference("site");
    let times = fx.name("times");
    let typing = fx.typing();
    let mut root = BindingContext::new();
    let mut checker = fx.checker();

    let results = checker
        .resolve_fake_call_with_types(
            &mut root,
            &typing,
            receiver.clone(),
            times,
            &[TypeId::INT],
            FailureReport::On(site),
        )
        .unwrap();
    assert!(results.is_success());
    let call = results.resulting_call().unwrap();
    assert_eq!(call.value_arguments.len(), 1);
    assert!(call.value_arguments[0].is_synthetic());
    // Argument placeholders never reach the caller's trace.
    assert!(root.is_empty());
    assert!(root.diagnostics().is_empty());

    let results = checker
        .resolve_fake_call_with_types(&mut root, &typing, receiver, times, &[TypeId::STRING], FailureReport::On(site))
        .unwrap();
    assert!(results.is_missing());
    assert_eq!(codes(&root), vec![diagnostic_codes::NONE_APPLICABLE]);
    assert_eq!(root.diagnostics()[0].node, site);
}

#[test]
fn test_fake_expression_has_recorded_type() {
    let mut fx = Fixture::new();
    let mut root = BindingContext::new();
    let mut checker = fx.checker();
    let expression = checker.create_fake_expression_of_type(&mut root, TypeId::LONG).unwrap();

    assert!(expression.is_synthetic());
    assert_eq!(root.expression_type(expression), Some(TypeId::LONG));
    assert!(root.is_processed(expression));
}

#[test]
fn test_placeholders_stop_before_aliasing_none() {
    let mut fx = Fixture::new();
    let mut checker = fx.checker();
    checker.next_synthetic = NodeIndex::MAX_SYNTHETIC;
    let last = checker.next_placeholder().unwrap();
    assert!(last.is_synthetic());
    assert_ne!(last, NodeIndex::NONE);
    assert_eq!(checker.next_placeholder(), Err(AnalysisError::PlaceholdersExhausted));

    let to_string = fx.name("toString");
    let receiver = int_receiver(&mut fx);
    let typing = fx.typing();
    let mut root = BindingContext::new();
    let mut checker = fx.checker();
    checker.next_synthetic = u32::MAX;
    assert_eq!(
        checker.resolve_fake_call(&mut root, &typing, receiver, to_string, vec![], FailureReport::Silent),
        Err(AnalysisError::PlaceholdersExhausted)
    );
    assert_eq!(root.len(), 0);
}
