use super::diagnostics::*;

#[test]
fn test_format_message_substitutes_in_order() {
    let text = format_message(
        diagnostic_messages::COMPONENT_FUNCTION_MISSING.message,
        &["component2", "Pair<Int, String>"],
    );
    assert_eq!(
        text,
        "Destructuring declaration initializer of type Pair<Int, String> must have a 'component2()' function"
    );
}

#[test]
fn test_every_code_has_a_template() {
    for code in [
        diagnostic_codes::UNRESOLVED_REFERENCE,
        diagnostic_codes::NONE_APPLICABLE,
        diagnostic_codes::OVERLOAD_RESOLUTION_AMBIGUITY,
        diagnostic_codes::TYPE_MISMATCH,
        diagnostic_codes::UNSAFE_CALL,
        diagnostic_codes::RESULT_TYPE_MISMATCH,
        diagnostic_codes::TYPE_INFERENCE_FAILED,
        diagnostic_codes::COMPONENT_FUNCTION_MISSING,
        diagnostic_codes::COMPONENT_FUNCTION_AMBIGUITY,
        diagnostic_codes::COMPONENT_FUNCTION_RETURN_TYPE_MISMATCH,
        diagnostic_codes::NAME_SHADOWING,
    ] {
        assert!(get_message_template(code).is_some(), "no template for {code}");
    }
}

#[test]
fn test_shadowing_is_a_warning() {
    let diag = Diagnostic::from_message(
        "main.kt".to_string(),
        10,
        1,
        &diagnostic_messages::NAME_SHADOWING,
        &["x"],
    );
    assert_eq!(diag.category, DiagnosticCategory::Warning);
    assert!(!diag.is_error());
    assert_eq!(diag.message_text, "Name shadowed: x");
}

#[test]
fn test_json_omits_empty_related_information() {
    let diag = Diagnostic::error("a.kt".to_string(), 0, 3, "boom".to_string(), 1004);
    let json = diag.to_json().expect("serializes");
    assert!(!json.contains("related_information"));

    let with_related = diag.with_related("a.kt".to_string(), 4, 2, "candidate".to_string());
    let json = with_related.to_json().expect("serializes");
    assert!(json.contains("related_information"));
}
