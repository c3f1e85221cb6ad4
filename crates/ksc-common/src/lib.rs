//! Common types and utilities for the ksc compiler.
//!
//! This crate provides foundational types used across all ksc crates:
//! - String interning (`Atom`, `Interner`)
//! - Diagnostics (`Diagnostic`, `DiagnosticCategory`, message table)
//! - Compiler limits and thresholds
//! - Tracing subscriber setup

// String interning for identifier deduplication
pub mod interner;
pub use interner::{Atom, Interner};

// Diagnostic model and the message table
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticMessage, format_message};

// Centralized limits and thresholds
pub mod limits;

// Opt-in tracing subscriber (KSC_LOG / KSC_LOG_FORMAT)
pub mod tracing_config;

#[cfg(test)]
#[path = "../tests/interner_tests.rs"]
mod interner_tests;
#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod diagnostics_tests;
