//! Lexical analysis module for the compiler.
//!
//! This module contains the lexer (tokenizer) that converts source code
//! into a stream of tokens for parsing. It handles:
//!
//! - Tokenization of source code using anchored regex patterns
//! - Recognition of keywords, type names, identifiers, literals and operators
//! - Token position tracking for error reporting
//! - Line and block comments and whitespace

pub mod lexer;
pub mod tokens;
