//! Converts a program back into canonical source text.
//!
//! The output re-parses into a structurally identical program: binary
//! operands are parenthesised only where precedence or left associativity
//! would otherwise regroup them.

use super::{
    ast::{Block, Expr, ExprKind, Program, Stmt, StmtKind},
    types::Literal,
};

const INDENT: &str = "    ";

pub fn to_source(program: &Program) -> String {
    let mut out = String::new();
    for stmt in program.statements.iter() {
        write_stmt(&mut out, stmt, 0);
    }
    out
}

pub fn expr_to_source(expr: &Expr) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr, 0);
    out
}

/// Formats a float so that it always carries a fractional part.
///
/// Uses the shortest representation that parses back to the same value.
/// Non-finite values fall back to `inf`, `-inf` and `NaN`.
pub fn format_float(value: f64) -> String {
    let formatted = format!("{}", value);
    if value.is_finite() && !formatted.contains('.') {
        format!("{}.0", formatted)
    } else {
        formatted
    }
}

fn write_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn write_stmt(out: &mut String, stmt: &Stmt, depth: usize) {
    write_indent(out, depth);

    match &stmt.kind {
        StmtKind::DeclareVar {
            name,
            declared_type,
            initializer,
        } => {
            out.push_str("var ");
            out.push_str(name);
            if let Some(ty) = declared_type {
                out.push(' ');
                out.push_str(ty.name());
            }
            if let Some(initializer) = initializer {
                out.push_str(" = ");
                write_expr(out, initializer, depth);
            }
            out.push_str(";\n");
        }
        StmtKind::DeclareConst {
            name,
            declared_type,
            initializer,
        } => {
            out.push_str("const ");
            out.push_str(name);
            if let Some(ty) = declared_type {
                out.push(' ');
                out.push_str(ty.name());
            }
            out.push_str(" = ");
            write_expr(out, initializer, depth);
            out.push_str(";\n");
        }
        StmtKind::Assignment { name, value } => {
            out.push_str(name);
            out.push_str(" = ");
            write_expr(out, value, depth);
            out.push_str(";\n");
        }
        StmtKind::Print { value } => {
            out.push_str("print ");
            write_expr(out, value, depth);
            out.push_str(";\n");
        }
        StmtKind::If {
            condition,
            consequence,
            alternative,
        } => {
            out.push_str("if ");
            write_expr(out, condition, depth);
            out.push(' ');
            write_block(out, consequence, depth);
            if let Some(alternative) = alternative {
                out.push_str(" else ");
                write_block(out, alternative, depth);
            }
            out.push('\n');
        }
        StmtKind::While { condition, body } => {
            out.push_str("while ");
            write_expr(out, condition, depth);
            out.push(' ');
            write_block(out, body, depth);
            out.push('\n');
        }
        StmtKind::Break => out.push_str("break;\n"),
        StmtKind::Continue => out.push_str("continue;\n"),
        StmtKind::Expression { expression } => {
            write_expr(out, expression, depth);
            out.push_str(";\n");
        }
    }
}

fn write_block(out: &mut String, block: &Block, depth: usize) {
    out.push_str("{\n");
    for stmt in block.statements.iter() {
        write_stmt(out, stmt, depth + 1);
    }
    write_indent(out, depth);
    out.push('}');
}

fn write_expr(out: &mut String, expr: &Expr, depth: usize) {
    match &expr.kind {
        ExprKind::Literal(literal) => match literal {
            Literal::Int(value) => out.push_str(&value.to_string()),
            Literal::Float(value) => out.push_str(&format_float(*value)),
            Literal::Bool(value) => out.push_str(if *value { "true" } else { "false" }),
        },
        ExprKind::Unary { operator, operand } => {
            out.push_str(operator.symbol());
            let wrap = matches!(operand.kind, ExprKind::Binary { .. });
            write_operand(out, operand, wrap, depth);
        }
        ExprKind::Binary {
            operator,
            left,
            right,
        } => {
            let precedence = operator.precedence();

            let wrap_left = match &left.kind {
                ExprKind::Binary { operator, .. } => operator.precedence() < precedence,
                _ => false,
            };
            let wrap_right = match &right.kind {
                ExprKind::Binary { operator, .. } => operator.precedence() <= precedence,
                _ => false,
            };

            write_operand(out, left, wrap_left, depth);
            out.push(' ');
            out.push_str(operator.symbol());
            out.push(' ');
            write_operand(out, right, wrap_right, depth);
        }
        ExprKind::Load { name } => out.push_str(name),
        ExprKind::Compound { body } => write_block(out, body, depth),
    }
}

fn write_operand(out: &mut String, expr: &Expr, wrap: bool, depth: usize) {
    if wrap {
        out.push('(');
        write_expr(out, expr, depth);
        out.push(')');
    } else {
        write_expr(out, expr, depth);
    }
}
