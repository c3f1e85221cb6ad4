//! JVM-style code generation for checked ksc expressions.
//!
//! - `type_mapper`: checked types and signatures to `AsmType`s and methods
//! - `instructions`: the instruction model and `InstructionAdapter`
//! - `stack_value`: pending values and `coerce` between stack types
//! - `intrinsics`: builtin members emitted inline instead of invoked
//! - `codegen`: `ExpressionCodegen`, which ties these together
//!
//! Both intrinsic and ordinary calls end with the same coercion from the
//! produced type to the type the caller asked for.

pub mod asm_type;
pub mod codegen;
pub mod error;
pub mod instructions;
pub mod intrinsics;
pub mod options;
pub mod stack_value;
pub mod type_mapper;

pub use asm_type::{AsmType, method_descriptor};
pub use codegen::ExpressionCodegen;
pub use error::CodegenError;
pub use instructions::{Constant, Conversion, Instruction, InstructionAdapter, InvokeOpcode};
pub use intrinsics::{IntrinsicCallable, IntrinsicMethod};
pub use options::EmitterOptions;
pub use stack_value::{StackValue, coerce};
pub use type_mapper::{CallableMethod, TypeMapper};

#[cfg(test)]
#[path = "../tests/fixture.rs"]
mod fixture;
#[cfg(test)]
#[path = "../tests/coercion_tests.rs"]
mod coercion_tests;
#[cfg(test)]
#[path = "../tests/type_mapper_tests.rs"]
mod type_mapper_tests;
#[cfg(test)]
#[path = "../tests/intrinsics_tests.rs"]
mod intrinsics_tests;
#[cfg(test)]
#[path = "../tests/codegen_tests.rs"]
mod codegen_tests;
