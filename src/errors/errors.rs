use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    /// Whether the error belongs to the recoverable type-error family.
    pub fn is_type_error(&self) -> bool {
        matches!(
            self.internal_error,
            ErrorImpl::BinOpMismatch { .. }
                | ErrorImpl::UnaryOpMismatch { .. }
                | ErrorImpl::DuplicateDeclaration { .. }
                | ErrorImpl::UndefinedName { .. }
                | ErrorImpl::InitMismatch { .. }
                | ErrorImpl::AssignTypeMismatch { .. }
                | ErrorImpl::AssignToConst { .. }
                | ErrorImpl::ConditionMismatch { .. }
                | ErrorImpl::MissingValue
                | ErrorImpl::LoopControlOutsideLoop { .. }
        )
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::BinOpMismatch { .. } => "BinOpMismatch",
            ErrorImpl::UnaryOpMismatch { .. } => "UnaryOpMismatch",
            ErrorImpl::DuplicateDeclaration { .. } => "DuplicateDeclaration",
            ErrorImpl::UndefinedName { .. } => "UndefinedName",
            ErrorImpl::InitMismatch { .. } => "InitMismatch",
            ErrorImpl::AssignTypeMismatch { .. } => "AssignTypeMismatch",
            ErrorImpl::AssignToConst { .. } => "AssignToConst",
            ErrorImpl::ConditionMismatch { .. } => "ConditionMismatch",
            ErrorImpl::MissingValue => "MissingValue",
            ErrorImpl::LoopControlOutsideLoop { .. } => "LoopControlOutsideLoop",
            ErrorImpl::DivisionByZero => "DivisionByZero",
            ErrorImpl::InternalError { .. } => "InternalError",
            ErrorImpl::CodegenError { .. } => "CodegenError",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::BinOpMismatch {
                left,
                operator,
                right,
            } => ErrorTip::Suggestion(format!(
                "Operator `{}` is not defined for `{}` and `{}`",
                operator, left, right
            )),
            ErrorImpl::UnaryOpMismatch { operator, operand } => ErrorTip::Suggestion(format!(
                "Unary operator `{}` is not defined for `{}`",
                operator, operand
            )),
            ErrorImpl::DuplicateDeclaration { name } => ErrorTip::Suggestion(format!(
                "`{}` is already declared in this scope",
                name
            )),
            ErrorImpl::UndefinedName { name } => ErrorTip::Suggestion(format!(
                "Name `{}` is not declared in any enclosing scope",
                name
            )),
            ErrorImpl::InitMismatch { expected, received } => ErrorTip::Suggestion(format!(
                "Declared as `{}` but initialised with `{}`",
                expected, received
            )),
            ErrorImpl::AssignTypeMismatch {
                name,
                expected,
                received,
            } => ErrorTip::Suggestion(format!(
                "`{}` has type `{}`, cannot assign `{}`",
                name, expected, received
            )),
            ErrorImpl::AssignToConst { name } => {
                ErrorTip::Suggestion(format!("`{}` is a constant and cannot be reassigned", name))
            }
            ErrorImpl::ConditionMismatch { construct, received } => ErrorTip::Suggestion(
                format!("`{}` condition must be `bool`, found `{}`", construct, received),
            ),
            ErrorImpl::MissingValue => ErrorTip::Suggestion(String::from(
                "This block does not end in an expression, so it has no value",
            )),
            ErrorImpl::LoopControlOutsideLoop { keyword } => {
                ErrorTip::Suggestion(format!("`{}` can only be used inside a loop", keyword))
            }
            ErrorImpl::DivisionByZero => ErrorTip::None,
            ErrorImpl::InternalError { .. } => ErrorTip::Suggestion(String::from(
                "The program was not type checked before it was executed",
            )),
            ErrorImpl::CodegenError { .. } => ErrorTip::Suggestion(String::from(
                "Code generation expects a program without type errors",
            )),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.get_error_name(), self.internal_error)
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message:?}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("type error ({left} {operator} {right})")]
    BinOpMismatch {
        left: String,
        operator: String,
        right: String,
    },
    #[error("type error {operator}{operand}")]
    UnaryOpMismatch { operator: String, operand: String },
    #[error("duplicate definition of {name}")]
    DuplicateDeclaration { name: String },
    #[error("undefined name {name}")]
    UndefinedName { name: String },
    #[error("type mismatch in initialization: expected {expected}, received {received}")]
    InitMismatch { expected: String, received: String },
    #[error("bad assignment to {name}: expected {expected}, received {received}")]
    AssignTypeMismatch {
        name: String,
        expected: String,
        received: String,
    },
    #[error("can't assign to const {name}")]
    AssignToConst { name: String },
    #[error("{construct} condition must be bool, received {received}")]
    ConditionMismatch { construct: String, received: String },
    #[error("expression has no value")]
    MissingValue,
    #[error("{keyword} outside of loop")]
    LoopControlOutsideLoop { keyword: String },
    #[error("division by zero")]
    DivisionByZero,
    #[error("internal error: {message}")]
    InternalError { message: String },
    #[error("code generation failed: {message}")]
    CodegenError { message: String },
}
