//! Diagnostic message table.

use super::DiagnosticMessage;

pub mod diagnostic_codes {
    pub const UNRESOLVED_REFERENCE: u32 = 1001;
    pub const NONE_APPLICABLE: u32 = 1002;
    pub const OVERLOAD_RESOLUTION_AMBIGUITY: u32 = 1003;
    pub const TYPE_MISMATCH: u32 = 1004;
    pub const UNSAFE_CALL: u32 = 1005;
    pub const RESULT_TYPE_MISMATCH: u32 = 1006;
    pub const TYPE_INFERENCE_FAILED: u32 = 1007;
    pub const COMPONENT_FUNCTION_MISSING: u32 = 1010;
    pub const COMPONENT_FUNCTION_AMBIGUITY: u32 = 1011;
    pub const COMPONENT_FUNCTION_RETURN_TYPE_MISMATCH: u32 = 1012;
    pub const NAME_SHADOWING: u32 = 1020;
}

pub mod diagnostic_messages {
    use super::super::{DiagnosticCategory, DiagnosticMessage};
    use super::diagnostic_codes;

    pub const UNRESOLVED_REFERENCE: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::UNRESOLVED_REFERENCE,
        category: DiagnosticCategory::Error,
        message: "Unresolved reference: {0}",
    };
    pub const NONE_APPLICABLE: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::NONE_APPLICABLE,
        category: DiagnosticCategory::Error,
        message: "None of the following functions can be called with the arguments supplied: {0}",
    };
    pub const OVERLOAD_RESOLUTION_AMBIGUITY: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::OVERLOAD_RESOLUTION_AMBIGUITY,
        category: DiagnosticCategory::Error,
        message: "Overload resolution ambiguity: {0}",
    };
    pub const TYPE_MISMATCH: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::TYPE_MISMATCH,
        category: DiagnosticCategory::Error,
        message: "Type mismatch: inferred type is {0} but {1} was expected",
    };
    pub const UNSAFE_CALL: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::UNSAFE_CALL,
        category: DiagnosticCategory::Error,
        message: "Only safe (?.) calls are allowed on a nullable receiver of type {0}",
    };
    pub const RESULT_TYPE_MISMATCH: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::RESULT_TYPE_MISMATCH,
        category: DiagnosticCategory::Error,
        message: "{0} must return {1} but returns {2}",
    };
    pub const TYPE_INFERENCE_FAILED: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::TYPE_INFERENCE_FAILED,
        category: DiagnosticCategory::Error,
        message: "Type inference failed for {0}",
    };
    pub const COMPONENT_FUNCTION_MISSING: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::COMPONENT_FUNCTION_MISSING,
        category: DiagnosticCategory::Error,
        message: "Destructuring declaration initializer of type {1} must have a '{0}()' function",
    };
    pub const COMPONENT_FUNCTION_AMBIGUITY: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::COMPONENT_FUNCTION_AMBIGUITY,
        category: DiagnosticCategory::Error,
        message: "Function '{0}()' is ambiguous for this expression: {1}",
    };
    pub const COMPONENT_FUNCTION_RETURN_TYPE_MISMATCH: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::COMPONENT_FUNCTION_RETURN_TYPE_MISMATCH,
        category: DiagnosticCategory::Error,
        message: "'{0}()' function returns '{1}', but '{2}' is expected",
    };
    pub const NAME_SHADOWING: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::NAME_SHADOWING,
        category: DiagnosticCategory::Warning,
        message: "Name shadowed: {0}",
    };
}

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    diagnostic_messages::UNRESOLVED_REFERENCE,
    diagnostic_messages::NONE_APPLICABLE,
    diagnostic_messages::OVERLOAD_RESOLUTION_AMBIGUITY,
    diagnostic_messages::TYPE_MISMATCH,
    diagnostic_messages::UNSAFE_CALL,
    diagnostic_messages::RESULT_TYPE_MISMATCH,
    diagnostic_messages::TYPE_INFERENCE_FAILED,
    diagnostic_messages::COMPONENT_FUNCTION_MISSING,
    diagnostic_messages::COMPONENT_FUNCTION_AMBIGUITY,
    diagnostic_messages::COMPONENT_FUNCTION_RETURN_TYPE_MISMATCH,
    diagnostic_messages::NAME_SHADOWING,
];
