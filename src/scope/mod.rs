//! Lexical scope environment.
//!
//! A chain of frames mapping names to records. The type checker stores
//! declarations, the evaluator runtime values and the code generator
//! storage slots in separate instances of the same structure.

pub mod scope;

#[cfg(test)]
mod tests;
