/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: Node definitions (closed enums for expressions and statements)
/// - types: Scalar types, literals and operators
/// - printer: Conversion of a program back into source text
pub mod ast;
pub mod printer;
pub mod types;
