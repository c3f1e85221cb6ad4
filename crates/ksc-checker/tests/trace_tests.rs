use super::*;
use ksc_binder::DeclId;
use ksc_common::diagnostics::diagnostic_codes;
use ksc_solver::TypeId;
use ksc_syntax::NodeIndex;

fn key(n: u32) -> TraceKey {
    TraceKey::Node(NodeIndex(n))
}

fn warning_on(n: u32) -> PendingDiagnostic {
    PendingDiagnostic::new(diagnostic_codes::NAME_SHADOWING, NodeIndex(n), vec!["x".into()])
}

#[test]
fn test_commit_merges_into_parent() {
    let mut root = BindingContext::new();
    let mut temp = TemporaryTrace::new(&mut root, "test");
    temp.record_expression_type(NodeIndex(1), TypeId::INT).unwrap();
    temp.report(warning_on(1));
    assert_eq!(temp.expression_type(NodeIndex(1)), Some(TypeId::INT));
    temp.commit().unwrap();

    assert_eq!(root.expression_type(NodeIndex(1)), Some(TypeId::INT));
    assert_eq!(root.diagnostics().len(), 1);
}

#[test]
fn test_dropping_temporary_trace_discards_everything() {
    let mut root = BindingContext::new();
    {
        let mut temp = TemporaryTrace::new(&mut root, "test");
        temp.record_expression_type(NodeIndex(1), TypeId::INT).unwrap();
        temp.report(warning_on(1));
    }
    let temp = TemporaryTrace::new(&mut root, "explicit");
    temp.discard();

    assert!(root.is_empty());
    assert!(root.diagnostics().is_empty());
}

#[test]
fn test_reads_fall_through_to_parent() {
    let mut root = BindingContext::new();
    root.record(Slice::ReferenceTarget, key(3), TraceValue::Decl(DeclId(7)))
        .unwrap();
    let temp = TemporaryTrace::new(&mut root, "test");
    assert_eq!(temp.reference_target(NodeIndex(3)), Some(DeclId(7)));
    assert!(temp.has_entries_for(key(3)));
    assert_eq!(temp.local_len(), 0);
}

#[test]
fn test_filtered_commit_skips_rejected_keys() {
    let mut root = BindingContext::new();
    let mut temp = TemporaryTrace::new(&mut root, "test");
    temp.record_expression_type(NodeIndex(1), TypeId::INT).unwrap();
    temp.record_expression_type(NodeIndex(2), TypeId::STRING).unwrap();
    temp.record(Slice::Processed, key(2), TraceValue::Flag).unwrap();
    temp.report(warning_on(2));
    temp.commit_filtered(|_, k| k != key(2), true).unwrap();

    assert_eq!(root.expression_type(NodeIndex(1)), Some(TypeId::INT));
    assert_eq!(root.entries_keyed_by(key(2)), 0);
    assert!(!root.has_entries_for(key(2)));
    assert!(root.diagnostics().is_empty());
}

#[test]
fn test_commit_without_diagnostics() {
    let mut root = BindingContext::new();
    let mut temp = TemporaryTrace::new(&mut root, "test");
    temp.record_expression_type(NodeIndex(1), TypeId::INT).unwrap();
    temp.report(warning_on(1));
    temp.commit_filtered(|_, _| true, false).unwrap();

    assert_eq!(root.len(), 1);
    assert!(root.diagnostics().is_empty());
}

#[test]
fn test_conflicting_record_is_an_error() {
    let mut root = BindingContext::new();
    root.record(Slice::ReferenceTarget, key(1), TraceValue::Decl(DeclId(1)))
        .unwrap();
    // Writing the same value again is fine.
    root.record(Slice::ReferenceTarget, key(1), TraceValue::Decl(DeclId(1)))
        .unwrap();
    let err = root
        .record(Slice::ReferenceTarget, key(1), TraceValue::Decl(DeclId(2)))
        .unwrap_err();
    assert_eq!(
        err,
        TraceError::ConflictingRecord {
            slice: Slice::ReferenceTarget,
            key: key(1)
        }
    );
}

#[test]
fn test_conflict_is_detected_against_parent_value() {
    let mut root = BindingContext::new();
    root.record(Slice::Variable, key(4), TraceValue::Decl(DeclId(1)))
        .unwrap();
    let mut temp = TemporaryTrace::new(&mut root, "test");
    assert!(
        temp.record(Slice::Variable, key(4), TraceValue::Decl(DeclId(9)))
            .is_err()
    );
}

#[test]
fn test_capture_kind_never_goes_down() {
    let mut root = BindingContext::new();
    let variable = TraceKey::Decl(DeclId(3));
    root.record(Slice::CapturedInClosure, variable, TraceValue::Capture(CaptureKind::NotInline))
        .unwrap();
    root.record(Slice::CapturedInClosure, variable, TraceValue::Capture(CaptureKind::InlineOnly))
        .unwrap();
    assert_eq!(root.captured_in_closure(DeclId(3)), Some(CaptureKind::NotInline));
}

#[test]
fn test_expression_type_may_be_replaced() {
    let mut root = BindingContext::new();
    root.record_expression_type(NodeIndex(1), TypeId::INT).unwrap();
    root.record_expression_type(NodeIndex(1), TypeId::LONG).unwrap();
    assert_eq!(root.expression_type(NodeIndex(1)), Some(TypeId::LONG));
    assert_eq!(Slice::ExpressionType.rewrite_policy(), RewritePolicy::Replace);
}

#[test]
fn test_nested_temporary_traces() {
    let mut root = BindingContext::new();
    let mut outer = TemporaryTrace::new(&mut root, "outer");
    let mut inner = TemporaryTrace::new(&mut outer, "inner");
    inner.record_expression_type(NodeIndex(5), TypeId::BOOLEAN).unwrap();
    inner.commit().unwrap();

    assert_eq!(outer.expression_type(NodeIndex(5)), Some(TypeId::BOOLEAN));
    outer.discard();
    assert!(root.is_empty());
}

#[test]
fn test_identical_diagnostics_are_reported_once() {
    let mut root = BindingContext::new();
    root.report(warning_on(1));
    root.report(warning_on(1));
    root.report(warning_on(2));
    assert_eq!(root.diagnostics().len(), 2);
}
