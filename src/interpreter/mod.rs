//! Tree-walking evaluator.
//!
//! Executes a [`CheckedProgram`](crate::type_checker::type_checker::CheckedProgram)
//! directly, keeping runtime values in the same kind of scope chain the type
//! checker uses for declarations.

pub mod interpreter;
pub mod value;

#[cfg(test)]
mod tests;
