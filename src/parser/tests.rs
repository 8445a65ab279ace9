//! Unit tests for the parser module.
//!
//! This module contains tests for parsing the language constructs including:
//! - Variable and constant declarations
//! - Expressions and operator precedence
//! - Control flow statements
//! - Compound expressions
//! - Printing a program back to source

use std::rc::Rc;

use super::parser::parse;
use crate::{
    ast::{
        ast::{ExprKind, Program, StmtKind},
        printer::{expr_to_source, to_source},
        types::{BinaryOperator, Literal, Type, UnaryOperator},
    },
    errors::errors::ErrorImpl,
    lexer::lexer::tokenize,
};

fn parse_source(source: &str) -> Result<Program, crate::errors::errors::Error> {
    let tokens = tokenize(source.to_string(), Some("test.wb".to_string()))?;
    parse(tokens, Rc::new("test.wb".to_string()))
}

fn first_expression(source: &str) -> String {
    let program = parse_source(source).unwrap();
    match &program.statements[0].kind {
        StmtKind::Expression { expression } => expr_to_source(expression),
        other => panic!("expected an expression statement, found {}", other.name()),
    }
}

#[test]
fn test_parse_variable_declaration() {
    let program = parse_source("var x int = 42;").unwrap();

    assert_eq!(program.statements.len(), 1);
    match &program.statements[0].kind {
        StmtKind::DeclareVar {
            name,
            declared_type,
            initializer,
        } => {
            assert_eq!(name, "x");
            assert_eq!(*declared_type, Some(Type::Int));
            assert_eq!(
                initializer.as_ref().map(|expr| &expr.kind),
                Some(&ExprKind::Literal(Literal::Int(42)))
            );
        }
        other => panic!("unexpected statement {}", other.name()),
    }
}

#[test]
fn test_parse_variable_declaration_without_initializer() {
    let program = parse_source("var x float;").unwrap();

    assert!(matches!(
        &program.statements[0].kind,
        StmtKind::DeclareVar {
            declared_type: Some(Type::Float),
            initializer: None,
            ..
        }
    ));
}

#[test]
fn test_parse_variable_declaration_requires_type_or_value() {
    let error = parse_source("var x;").unwrap_err();

    assert!(matches!(
        error.get_impl(),
        ErrorImpl::UnexpectedTokenDetailed { .. }
    ));
}

#[test]
fn test_parse_const_declaration() {
    let program = parse_source("const pi = 3.14159;").unwrap();

    match &program.statements[0].kind {
        StmtKind::DeclareConst {
            name,
            declared_type,
            initializer,
        } => {
            assert_eq!(name, "pi");
            assert_eq!(*declared_type, None);
            assert_eq!(initializer.kind, ExprKind::Literal(Literal::Float(3.14159)));
        }
        other => panic!("unexpected statement {}", other.name()),
    }
}

#[test]
fn test_parse_const_requires_initializer() {
    assert!(parse_source("const x int;").is_err());
}

#[test]
fn test_parse_assignment() {
    let program = parse_source("x = x + 1;").unwrap();

    assert!(matches!(
        &program.statements[0].kind,
        StmtKind::Assignment { name, .. } if name == "x"
    ));
}

#[test]
fn test_parse_precedence() {
    assert_eq!(first_expression("1 + 2 * 3;"), "1 + 2 * 3");
    assert_eq!(first_expression("(1 + 2) * 3;"), "(1 + 2) * 3");
    assert_eq!(first_expression("1 < 2 == true;"), "1 < 2 == true");
    assert_eq!(first_expression("a || b && c;"), "a || b && c");
    assert_eq!(first_expression("(a || b) && c;"), "(a || b) && c");
}

#[test]
fn test_parse_left_associative() {
    let program = parse_source("1 - 2 - 3;").unwrap();

    let StmtKind::Expression { expression } = &program.statements[0].kind else {
        panic!("expected an expression statement");
    };
    let ExprKind::Binary {
        operator, left, ..
    } = &expression.kind
    else {
        panic!("expected a binary expression");
    };

    assert_eq!(*operator, BinaryOperator::Subtract);
    assert!(matches!(
        left.kind,
        ExprKind::Binary {
            operator: BinaryOperator::Subtract,
            ..
        }
    ));
    assert_eq!(first_expression("1 - (2 - 3);"), "1 - (2 - 3)");
}

#[test]
fn test_parse_prefix_binds_tighter_than_binary() {
    let program = parse_source("-1 + 2;").unwrap();

    let StmtKind::Expression { expression } = &program.statements[0].kind else {
        panic!("expected an expression statement");
    };
    let ExprKind::Binary { left, .. } = &expression.kind else {
        panic!("expected a binary expression");
    };

    assert!(matches!(
        left.kind,
        ExprKind::Unary {
            operator: UnaryOperator::Minus,
            ..
        }
    ));
}

#[test]
fn test_parse_repeated_prefix() {
    assert_eq!(first_expression("-----1;"), "-----1");
}

#[test]
fn test_parse_if_else_statement() {
    let program = parse_source("if x < 1 { print 1; } else { print 2; }").unwrap();

    match &program.statements[0].kind {
        StmtKind::If {
            consequence,
            alternative,
            ..
        } => {
            assert_eq!(consequence.statements.len(), 1);
            assert_eq!(alternative.as_ref().map(|b| b.statements.len()), Some(1));
        }
        other => panic!("unexpected statement {}", other.name()),
    }
}

#[test]
fn test_parse_else_if_chain() {
    let program =
        parse_source("if a { print 1; } else if b { print 2; } else { print 3; }").unwrap();

    let StmtKind::If {
        alternative: Some(alternative),
        ..
    } = &program.statements[0].kind
    else {
        panic!("expected an if with an else branch");
    };

    assert_eq!(alternative.statements.len(), 1);
    assert!(matches!(
        &alternative.statements[0].kind,
        StmtKind::If {
            alternative: Some(_),
            ..
        }
    ));
}

#[test]
fn test_parse_while_with_loop_control() {
    let program = parse_source("while true { break; continue; }").unwrap();

    let StmtKind::While { body, .. } = &program.statements[0].kind else {
        panic!("expected a while loop");
    };

    assert_eq!(body.statements[0].kind, StmtKind::Break);
    assert_eq!(body.statements[1].kind, StmtKind::Continue);
}

#[test]
fn test_parse_compound_expression() {
    let program = parse_source("x = { var t = y; y = x; t; };").unwrap();

    let StmtKind::Assignment { value, .. } = &program.statements[0].kind else {
        panic!("expected an assignment");
    };
    let ExprKind::Compound { body } = &value.kind else {
        panic!("expected a compound expression");
    };

    assert_eq!(body.statements.len(), 3);
    assert!(body.tail_expression().is_some());
}

#[test]
fn test_parse_node_ids_are_unique() {
    let program = parse_source("var x = 1 + 2; print x * 3;").unwrap();

    let mut ids = vec![];
    for stmt in program.statements.iter() {
        ids.push(stmt.id);
        match &stmt.kind {
            StmtKind::DeclareVar {
                initializer: Some(expr),
                ..
            }
            | StmtKind::Print { value: expr } => {
                ids.push(expr.id);
                if let ExprKind::Binary { left, right, .. } = &expr.kind {
                    ids.push(left.id);
                    ids.push(right.id);
                }
            }
            _ => {}
        }
    }

    let count = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), count);
}

#[test]
fn test_parse_missing_semicolon() {
    let error = parse_source("print 1").unwrap_err();

    assert!(matches!(error.get_impl(), ErrorImpl::UnexpectedToken { .. }));
}

#[test]
fn test_parse_missing_operand() {
    let error = parse_source("var a = * 2;").unwrap_err();

    assert!(matches!(
        error.get_impl(),
        ErrorImpl::UnexpectedTokenDetailed { token, .. } if token == "*"
    ));
}

#[test]
fn test_parse_unclosed_block() {
    assert!(parse_source("while true { print 1;").is_err());
}

#[test]
fn test_parse_integer_overflow() {
    let error = parse_source("print 99999999999;").unwrap_err();

    assert!(matches!(error.get_impl(), ErrorImpl::NumberParseError { .. }));
}

#[test]
fn test_printed_program_parses_back_identically() {
    let source = "
        const limit int = 10;
        var n = 0;
        var total float;
        while n < limit && (false == false) || n == 0 {
            n = n + 1;
            if n / 2 * 2 == n { continue; } else if n > 7 { break; }
            total = total + 1.5 * -(2.0 - .5);
        }
        var swapped = { var t = n; t - (1 - 2); };
        print swapped;
        {
            print total;
        };
    ";
    let program = parse_source(source).unwrap();
    let printed = to_source(&program);
    let reparsed = parse_source(&printed).unwrap();

    assert_eq!(program, reparsed);
    assert_eq!(printed, to_source(&reparsed));
}
