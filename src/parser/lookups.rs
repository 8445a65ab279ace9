use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::{ast::ast::{Expr, Stmt}, errors::errors::Error, lexer::tokens::TokenKind};

use super::{expr::*, parser::Parser, stmt::*};

#[derive(PartialEq, PartialOrd, Clone, Copy, Debug)]
pub enum BindingPower {
    Default,
    LogicalOr,
    LogicalAnd,
    Equality,
    Relational,
    Additive,
    Multiplicative,
    Unary,
    Primary,
}

pub type StmtHandler = fn(&mut Parser) -> Result<Stmt, Error>;
pub type NUDHandler = fn(&mut Parser) -> Result<Expr, Error>;
pub type LEDHandler = fn(&mut Parser, Expr, BindingPower) -> Result<Expr, Error>;

/// Handler tables for every token that can start a statement or an
/// expression, or continue an expression as an infix operator.
///
/// The tables never change after construction and are shared by every parse.
#[derive(Default)]
pub struct Grammar {
    stmt: HashMap<TokenKind, StmtHandler>,
    nud: HashMap<TokenKind, NUDHandler>,
    led: HashMap<TokenKind, (BindingPower, LEDHandler)>,
}

impl Grammar {
    fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.led.insert(kind, (binding_power, led_fn));
    }

    fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud.insert(kind, nud_fn);
    }

    fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt.insert(kind, stmt_fn);
    }

    pub fn stmt_handler(&self, kind: TokenKind) -> Option<StmtHandler> {
        self.stmt.get(&kind).copied()
    }

    pub fn nud_handler(&self, kind: TokenKind) -> Option<NUDHandler> {
        self.nud.get(&kind).copied()
    }

    pub fn led_handler(&self, kind: TokenKind) -> Option<LEDHandler> {
        self.led.get(&kind).map(|(_, handler)| *handler)
    }

    /// Binding power of `kind` as an infix operator, `Default` if it is none.
    pub fn binding_power(&self, kind: TokenKind) -> BindingPower {
        self.led
            .get(&kind)
            .map(|(binding_power, _)| *binding_power)
            .unwrap_or(BindingPower::Default)
    }
}

lazy_static! {
    pub static ref GRAMMAR: Grammar = create_token_lookups();
}

fn create_token_lookups() -> Grammar {
    let mut grammar = Grammar::default();

    // Logical
    grammar.led(TokenKind::Or, BindingPower::LogicalOr, parse_binary_expr);
    grammar.led(TokenKind::And, BindingPower::LogicalAnd, parse_binary_expr);

    // Equality and relational
    grammar.led(TokenKind::Equals, BindingPower::Equality, parse_binary_expr);
    grammar.led(TokenKind::NotEquals, BindingPower::Equality, parse_binary_expr);
    grammar.led(TokenKind::Less, BindingPower::Relational, parse_binary_expr);
    grammar.led(TokenKind::LessEquals, BindingPower::Relational, parse_binary_expr);
    grammar.led(TokenKind::Greater, BindingPower::Relational, parse_binary_expr);
    grammar.led(TokenKind::GreaterEquals, BindingPower::Relational, parse_binary_expr);

    // Additive and multiplicative
    grammar.led(TokenKind::Plus, BindingPower::Additive, parse_binary_expr);
    grammar.led(TokenKind::Dash, BindingPower::Additive, parse_binary_expr);
    grammar.led(TokenKind::Star, BindingPower::Multiplicative, parse_binary_expr);
    grammar.led(TokenKind::Slash, BindingPower::Multiplicative, parse_binary_expr);

    // Literals, symbols and prefixes
    grammar.nud(TokenKind::Integer, parse_primary_expr);
    grammar.nud(TokenKind::Float, parse_primary_expr);
    grammar.nud(TokenKind::True, parse_primary_expr);
    grammar.nud(TokenKind::False, parse_primary_expr);
    grammar.nud(TokenKind::Identifier, parse_primary_expr);
    grammar.nud(TokenKind::Dash, parse_prefix_expr);
    grammar.nud(TokenKind::Plus, parse_prefix_expr);
    grammar.nud(TokenKind::OpenParen, parse_grouping_expr);
    grammar.nud(TokenKind::OpenCurly, parse_compound_expr);

    // Statements
    grammar.stmt(TokenKind::Var, parse_var_decl_stmt);
    grammar.stmt(TokenKind::Const, parse_const_decl_stmt);
    grammar.stmt(TokenKind::Print, parse_print_stmt);
    grammar.stmt(TokenKind::If, parse_if_stmt);
    grammar.stmt(TokenKind::While, parse_while_stmt);
    grammar.stmt(TokenKind::Break, parse_loop_control_stmt);
    grammar.stmt(TokenKind::Continue, parse_loop_control_stmt);

    grammar
}
