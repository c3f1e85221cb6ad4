//! Semantic analysis core of the ksc compiler: call resolution and the
//! analyses built on it.
//!
//! - `trace`: transactional store of analysis results (`BindingContext`,
//!   `TemporaryTrace`)
//! - `receiver_resolver`: receiver compatibility with nullable widening
//! - `call_resolver` / `fake_calls`: overload resolution for real and
//!   synthetic calls
//! - `capture`: inline-only vs. escaping captures of local variables
//! - `destructuring`: `componentN` binding of `val (a, b) = x`
//! - `expressions`: expression typing that drives all of the above
//!
//! Semantic errors become `PendingDiagnostic`s in the trace; `AnalysisError`
//! is only returned for structurally broken input.

pub mod call_resolver;
pub mod capture;
pub mod context;
pub mod data_flow;
pub mod destructuring;
pub mod diagnostics;
pub mod error;
pub mod expressions;
pub mod fake_calls;
pub mod options;
pub mod receiver;
pub mod receiver_resolver;
pub mod resolved_call;
pub mod trace;

pub use call_resolver::CallDescription;
pub use capture::CaptureKind;
pub use context::{CheckerContext, CheckerState, TypingContext};
pub use data_flow::{DataFlowInfo, smart_cast_variants};
pub use diagnostics::{DiagnosticArg, PendingDiagnostic};
pub use error::AnalysisError;
pub use expressions::get_default_type;
pub use fake_calls::FailureReport;
pub use options::CheckerOptions;
pub use receiver::{ExpectedType, ReceiverValue};
pub use receiver_resolver::{ReceiverMatch, check_is_extension_callable, check_receiver_resolution};
pub use resolved_call::{OverloadResolutionResults, ResolvedCall};
pub use trace::{
    BindingContext, BindingTrace, BindingTraceExt, RewritePolicy, Slice, TemporaryTrace, TraceError, TraceKey,
    TraceValue,
};

#[cfg(test)]
#[path = "../tests/fixture.rs"]
mod fixture;
#[cfg(test)]
#[path = "../tests/trace_tests.rs"]
mod trace_tests;
#[cfg(test)]
#[path = "../tests/receiver_resolver_tests.rs"]
mod receiver_resolver_tests;
#[cfg(test)]
#[path = "../tests/call_resolver_tests.rs"]
mod call_resolver_tests;
#[cfg(test)]
#[path = "../tests/fake_calls_tests.rs"]
mod fake_calls_tests;
#[cfg(test)]
#[path = "../tests/capture_tests.rs"]
mod capture_tests;
#[cfg(test)]
#[path = "../tests/destructuring_tests.rs"]
mod destructuring_tests;
#[cfg(test)]
#[path = "../tests/expressions_tests.rs"]
mod expressions_tests;
