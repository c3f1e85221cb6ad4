//! Syntax tree storage for the ksc compiler.
//!
//! The parser is an external collaborator; this crate only fixes the shape of
//! the tree the analysis reads: an arena of immutable nodes addressed by
//! `NodeIndex`, with parent links for upward navigation. Analysis results are
//! never stored on nodes; they live in the checker's binding trace.

pub mod node;

pub use node::{
    CallData, CallKind, LiteralKind, MultiDeclarationData, Node, NodeArena, NodeData, NodeIndex,
    NodeKind, TypeReferenceData,
};

#[cfg(test)]
#[path = "../tests/node_tests.rs"]
mod node_tests;
