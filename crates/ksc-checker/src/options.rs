//! Checker configuration.

use ksc_common::limits::{MAX_CAPTURE_CHAIN_DEPTH, MAX_EXPR_CHECK_DEPTH};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckerOptions {
    /// Report `NAME_SHADOWING` warnings for destructured variables.
    pub report_name_shadowing: bool,
    /// Report `UNSAFE_CALL` for calls that only resolved through non-null
    /// widening of a nullable receiver.
    pub report_unsafe_calls: bool,
    /// Nested function literals walked while classifying a capture. Deeper
    /// chains are treated as not inline.
    pub max_capture_depth: u32,
    pub max_expression_depth: u32,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        CheckerOptions {
            report_name_shadowing: true,
            report_unsafe_calls: true,
            max_capture_depth: MAX_CAPTURE_CHAIN_DEPTH,
            max_expression_depth: MAX_EXPR_CHECK_DEPTH,
        }
    }
}
