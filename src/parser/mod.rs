//! Parser module for building an Abstract Syntax Tree (AST).
//!
//! This module contains the parser that transforms a stream of tokens
//! into a [`Program`](crate::ast::ast::Program). It uses a Pratt parser for
//! expressions with C-like operator precedence and handles:
//!
//! - Statement parsing (declarations, assignment, print, control flow)
//! - Expression parsing (unary and binary operators, literals, compound blocks)
//! - Node id assignment for the type checker's annotation table
//!
//! The parser uses NUD (null denotation) and LED (left denotation) functions
//! for expression parsing with binding power for precedence handling.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;

#[cfg(test)]
mod tests;
