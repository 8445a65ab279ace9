//! Type checking and semantic analysis module.
//!
//! This module performs type checking and semantic analysis on the AST.
//! The AST itself stays untouched; results go into an annotation table keyed
//! by node id. While walking the tree the checker:
//!
//! - Synthesizes the type of every expression from the operator tables
//! - Resolves names through a chain of lexical frames
//! - Rejects duplicate declarations, assignments to constants and mismatches
//! - Keeps going after an error so one pass reports all of them
//!
//! A clean result converts into a [`CheckedProgram`](type_checker::CheckedProgram),
//! the only input the backends accept.

pub mod operators;
pub mod type_checker;
