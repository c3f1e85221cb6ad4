//! Centralized limits and thresholds for the ksc compiler.
//!
//! Solver recursion limits live in `ksc_solver::recursion::RecursionProfile`;
//! the constants here cover the checker and the emitter.

// =============================================================================
// Recursion Depth Limits (Checker)
// =============================================================================

/// Maximum depth for expression type checking.
///
/// Each nested call argument adds a frame; past this depth the checker gives
/// the expression the error type instead of recursing further.
pub const MAX_EXPR_CHECK_DEPTH: u32 = 500;

/// Maximum number of function-literal boundaries walked when classifying a
/// captured variable.
///
/// Lambdas nested this deep are classified as not-inline.
pub const MAX_CAPTURE_CHAIN_DEPTH: u32 = 256;

/// Maximum depth for substituting type arguments into a type.
pub const MAX_INSTANTIATION_DEPTH: u32 = 50;

// =============================================================================
// Capacity Limits
// =============================================================================

/// Number of smart-cast variants kept inline before spilling to the heap.
pub const SMART_CAST_VARIANTS_INLINE: usize = 4;
