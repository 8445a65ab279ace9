use std::rc::Rc;

use super::{
    interpreter::{run, RunError},
    value::Value,
};
use crate::{
    ast::ast::Program,
    errors::errors::ErrorImpl,
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::type_checker::{type_check, Annotations, CheckedProgram},
};

fn parse_source(source: &str) -> Program {
    let tokens = tokenize(source.to_string(), Some("test.wb".to_string())).unwrap();
    parse(tokens, Rc::new("test.wb".to_string())).unwrap()
}

fn execute(source: &str) -> Result<Vec<String>, RunError> {
    let program = parse_source(source);
    let checked = type_check(&program).into_checked(program).unwrap();
    run(&checked)
}

fn output(source: &str) -> Vec<String> {
    execute(source).unwrap()
}

#[test]
fn test_declare_assign_print() {
    assert_eq!(output("var x int; x = 3; print x;"), vec!["3"]);
}

#[test]
fn test_addition() {
    assert_eq!(output("var x = 4; var y = 5; print x + y;"), vec!["9"]);
}

#[test]
fn test_default_values() {
    assert_eq!(
        output("var i int; var f float; var b bool; print i; print f; print b;"),
        vec!["0", "0.0", "false"]
    );
}

#[test]
fn test_float_formatting() {
    assert_eq!(
        output("print 2.0; print 3.0 / 4.0; print 1. + .5; print -0.25;"),
        vec!["2.0", "0.75", "1.5", "-0.25"]
    );
}

#[test]
fn test_float_division_by_zero_is_infinite() {
    assert_eq!(output("print 1.0 / 0.0; print -1.0 / 0.0;"), vec!["inf", "-inf"]);
}

#[test]
fn test_integer_division_truncates() {
    assert_eq!(
        output("print 7 / 2; print -7 / 2; print 7 / -2;"),
        vec!["3", "-3", "-3"]
    );
}

#[test]
fn test_integer_division_by_zero() {
    let failure = execute("var zero = 0; print 1 / zero;").unwrap_err();

    assert_eq!(*failure.error.get_impl(), ErrorImpl::DivisionByZero);
    assert!(failure.output.is_empty());
}

#[test]
fn test_output_before_error_is_kept() {
    let failure = execute("print 1; print 2; print 1 / 0; print 3;").unwrap_err();

    assert_eq!(*failure.error.get_impl(), ErrorImpl::DivisionByZero);
    assert_eq!(failure.output, vec!["1", "2"]);
}

#[test]
fn test_nan_is_not_equal_to_itself() {
    assert_eq!(
        output("var z = 0.0 / 0.0; print z != z; print z == z; print z < 1.0;"),
        vec!["true", "false", "false"]
    );
}

#[test]
fn test_integer_overflow_wraps() {
    assert_eq!(
        output("var big = 2147483647; print big + 1; print -big - 2;"),
        vec!["-2147483648", "2147483647"]
    );
}

#[test]
fn test_comparisons_and_logic() {
    assert_eq!(
        output(
            "print 1 < 2; print 2.5 >= 3.0; print true && false; print true || false; \
             print 1 == 1 != false; print 3 <= 3;"
        ),
        vec!["true", "false", "false", "true", "true", "true"]
    );
}

#[test]
fn test_unary_operators() {
    assert_eq!(output("print -----1; print +2; print -(1.5);"), vec!["-1", "2", "-1.5"]);
}

#[test]
fn test_if_else() {
    assert_eq!(
        output(
            "var a = 1; var b = 2;
             if a < b { print a; } else { print b; }
             if a > b { print a; } else if a == 1 { print 10; } else { print b; }
             if false { print 99; }"
        ),
        vec!["1", "10"]
    );
}

#[test]
fn test_factorial_loop() {
    assert_eq!(
        output(
            "const n = 10;
             var x int = 1;
             var fact int = 1;
             while x < n {
                 fact = fact * x;
                 print fact;
                 x = x + 1;
             }"
        ),
        vec!["1", "2", "6", "24", "120", "720", "5040", "40320", "362880"]
    );
}

#[test]
fn test_compound_swap() {
    assert_eq!(
        output(
            "var x = 37;
             var y = 42;
             x = { var t = y; y = x; t; };
             print x;
             print y;"
        ),
        vec!["42", "37"]
    );
}

#[test]
fn test_shadowing_does_not_leak() {
    assert_eq!(
        output(
            "var x = 1;
             if true { var x = 2; print x; x = 3; print x; }
             print x;"
        ),
        vec!["2", "3", "1"]
    );
}

#[test]
fn test_assignment_updates_outer_frame() {
    assert_eq!(
        output("var total = 0; var i = 0; while i < 4 { i = i + 1; total = total + i; } print total;"),
        vec!["10"]
    );
}

#[test]
fn test_fresh_frame_per_iteration() {
    // Redeclaring in the body is legal every time round
    assert_eq!(
        output("var i = 0; while i < 3 { var sq = i * i; print sq; i = i + 1; }"),
        vec!["0", "1", "4"]
    );
}

#[test]
fn test_break_and_continue() {
    assert_eq!(
        output(
            "var i = 0;
             while true {
                 i = i + 1;
                 if i == 2 { continue; }
                 if i > 4 { break; }
                 print i;
             }
             print i;"
        ),
        vec!["1", "3", "4", "5"]
    );
}

#[test]
fn test_break_only_leaves_inner_loop() {
    assert_eq!(
        output(
            "var i = 0;
             while i < 2 {
                 var j = 0;
                 while true { j = j + 1; if j == 3 { break; } }
                 print j;
                 i = i + 1;
             }"
        ),
        vec!["3", "3"]
    );
}

#[test]
fn test_compound_statement_runs_in_its_own_frame() {
    assert_eq!(
        output("var x = 1; { var x = 5; print x; }; print x;"),
        vec!["5", "1"]
    );
}

#[test]
fn test_value_display() {
    assert_eq!(Value::Int(-4).to_string(), "-4");
    assert_eq!(Value::Float(1e21).to_string(), "1000000000000000000000.0");
    assert_eq!(Value::Float(f64::NAN).to_string(), "NaN");
    assert_eq!(Value::Bool(true).to_string(), "true");
}

#[test]
fn test_unchecked_program_is_an_internal_error() {
    let program = parse_source("print missing;");
    let checked = CheckedProgram::assume_checked(program, Annotations::default());

    let failure = run(&checked).unwrap_err();

    assert!(matches!(failure.error.get_impl(), ErrorImpl::InternalError { .. }));
}
