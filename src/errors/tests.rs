//! Unit tests for error handling.

use crate::errors::errors::{Error, ErrorImpl, ErrorTip};
use crate::Position;
use std::rc::Rc;

fn at(offset: u32) -> Position {
    Position(offset, Rc::new("test.wb".to_string()))
}

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        at(10),
    );

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.get_position().0, 10);
}

#[test]
fn test_bin_op_mismatch_message() {
    let error = Error::new(
        ErrorImpl::BinOpMismatch {
            left: "int".to_string(),
            operator: "+".to_string(),
            right: "float".to_string(),
        },
        at(0),
    );

    assert_eq!(error.get_error_name(), "BinOpMismatch");
    assert_eq!(
        error.get_impl().to_string(),
        "type error (int + float)"
    );
    assert_eq!(error.to_string(), "BinOpMismatch: type error (int + float)");
}

#[test]
fn test_type_error_family() {
    let type_errors = [
        ErrorImpl::UnaryOpMismatch {
            operator: "-".to_string(),
            operand: "bool".to_string(),
        },
        ErrorImpl::DuplicateDeclaration {
            name: "x".to_string(),
        },
        ErrorImpl::UndefinedName {
            name: "x".to_string(),
        },
        ErrorImpl::InitMismatch {
            expected: "int".to_string(),
            received: "float".to_string(),
        },
        ErrorImpl::AssignToConst {
            name: "x".to_string(),
        },
        ErrorImpl::MissingValue,
    ];

    for error_impl in type_errors {
        assert!(Error::new(error_impl, at(0)).is_type_error());
    }

    let fatal = [
        ErrorImpl::UnexpectedToken {
            token: "}".to_string(),
        },
        ErrorImpl::CodegenError {
            message: "oops".to_string(),
        },
        ErrorImpl::DivisionByZero,
    ];

    for error_impl in fatal {
        assert!(!Error::new(error_impl, at(0)).is_type_error());
    }
}

#[test]
fn test_error_tip_none() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        at(0),
    );

    assert!(matches!(error.get_tip(), ErrorTip::None));
}

#[test]
fn test_error_tip_suggestion() {
    let error = Error::new(
        ErrorImpl::AssignToConst {
            name: "pi".to_string(),
        },
        at(0),
    );

    match error.get_tip() {
        ErrorTip::Suggestion(tip) => assert!(tip.contains("`pi`")),
        _ => panic!("Expected suggestion tip"),
    }
}

#[test]
fn test_error_tip_display() {
    let tip = ErrorTip::Suggestion("Try this instead".to_string());
    assert_eq!(tip.to_string(), "Try this instead");

    let tip = ErrorTip::None;
    assert_eq!(tip.to_string(), "");
}
