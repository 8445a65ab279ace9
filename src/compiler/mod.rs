//! Code generation module for the compiler.
//!
//! This module lowers a checked program into a basic-block IR. It handles:
//!
//! - Storage slots for declared variables
//! - Expressions into virtual registers
//! - `if`, `while`, `break` and `continue` as branches between blocks
//! - Calls to the external print intrinsics
//!
//! With the `llvm` feature the IR can be lowered further into an LLVM module
//! and written out as a `.ll` file.

pub mod compiler;
pub mod expr;
pub mod ir;
#[cfg(feature = "llvm")]
pub mod llvm;
pub mod stmt;

#[cfg(test)]
mod tests;
