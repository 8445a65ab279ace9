use crate::{
    ast::{
        ast::{Block, Expr, Stmt, StmtKind},
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
    Span,
};

use super::parser::Parser;

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    if let Some(handler) = parser.get_stmt_handler(parser.current_token_kind()) {
        return handler(parser);
    }

    if parser.current_token_kind() == TokenKind::Identifier
        && parser.peek_token_kind() == TokenKind::Assignment
    {
        return parse_assignment_stmt(parser);
    }

    let start = parser.get_position();
    let expression = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(finish(
        parser,
        StmtKind::Expression { expression },
        Span {
            start,
            end: parser.previous_end(),
        },
    ))
}

fn finish(parser: &mut Parser, kind: StmtKind, span: Span) -> Stmt {
    Stmt {
        id: parser.advance_id(),
        kind,
        span,
    }
}

fn parse_type_name(parser: &mut Parser) -> Result<Option<Type>, Error> {
    if parser.current_token_kind() != TokenKind::TypeName {
        return Ok(None);
    }

    let token = parser.advance().clone();
    match Type::from_name(&token.value) {
        Some(ty) => Ok(Some(ty)),
        None => Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: token.value,
                message: String::from("expected a type name"),
            },
            token.span.start,
        )),
    }
}

fn parse_initializer(parser: &mut Parser) -> Result<Option<Expr>, Error> {
    if parser.current_token_kind() != TokenKind::Assignment {
        return Ok(None);
    }

    parser.advance();
    Ok(Some(parse_expr(parser, BindingPower::Default)?))
}

/// `var NAME [type] [= expr];`, at least one of the type and the initializer.
pub fn parse_var_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let name = parser
        .expect_detailed(TokenKind::Identifier, "expected identifier during variable declaration")?
        .value;

    let declared_type = parse_type_name(parser)?;
    let initializer = parse_initializer(parser)?;

    if declared_type.is_none() && initializer.is_none() {
        return Err(parser.error_here("expected rhs or explicit type"));
    }

    parser.expect(TokenKind::Semicolon)?;

    Ok(finish(
        parser,
        StmtKind::DeclareVar {
            name,
            declared_type,
            initializer,
        },
        Span {
            start,
            end: parser.previous_end(),
        },
    ))
}

/// `const NAME [type] = expr;`
pub fn parse_const_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let name = parser
        .expect_detailed(TokenKind::Identifier, "expected identifier during constant declaration")?
        .value;

    let declared_type = parse_type_name(parser)?;
    let Some(initializer) = parse_initializer(parser)? else {
        return Err(parser.error_here("expected rhs in constant definition"));
    };

    parser.expect(TokenKind::Semicolon)?;

    Ok(finish(
        parser,
        StmtKind::DeclareConst {
            name,
            declared_type,
            initializer,
        },
        Span {
            start,
            end: parser.previous_end(),
        },
    ))
}

pub fn parse_assignment_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let target = parser.expect(TokenKind::Identifier)?;
    parser.expect(TokenKind::Assignment)?;

    let value = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(finish(
        parser,
        StmtKind::Assignment {
            name: target.value,
            value,
        },
        Span {
            start: target.span.start,
            end: parser.previous_end(),
        },
    ))
}

pub fn parse_print_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let value = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(finish(
        parser,
        StmtKind::Print { value },
        Span {
            start,
            end: parser.previous_end(),
        },
    ))
}

/// `if expr { ... } [else { ... } | else if ...]`
///
/// `else if` is sugar for an `else` block holding a single `if`.
pub fn parse_if_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let condition = parse_expr(parser, BindingPower::Default)?;
    let consequence = parse_block(parser)?;

    let alternative = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();

        if parser.current_token_kind() == TokenKind::If {
            let nested = parse_if_stmt(parser)?;
            Some(Block {
                span: nested.span.clone(),
                statements: vec![nested],
            })
        } else {
            Some(parse_block(parser)?)
        }
    } else {
        None
    };

    Ok(finish(
        parser,
        StmtKind::If {
            condition,
            consequence,
            alternative,
        },
        Span {
            start,
            end: parser.previous_end(),
        },
    ))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let condition = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block(parser)?;

    Ok(finish(
        parser,
        StmtKind::While { condition, body },
        Span {
            start,
            end: parser.previous_end(),
        },
    ))
}

/// `break;` and `continue;`
pub fn parse_loop_control_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let keyword = parser.advance().clone();
    parser.expect(TokenKind::Semicolon)?;

    let kind = if keyword.kind == TokenKind::Break {
        StmtKind::Break
    } else {
        StmtKind::Continue
    };

    Ok(finish(
        parser,
        kind,
        Span {
            start: keyword.span.start,
            end: parser.previous_end(),
        },
    ))
}

pub fn parse_block(parser: &mut Parser) -> Result<Block, Error> {
    let start = parser.expect(TokenKind::OpenCurly)?.span.start;

    let mut statements = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseCurly {
        if !parser.has_tokens() {
            return Err(parser.error_here("expected `}` before end of file"));
        }
        statements.push(parse_stmt(parser)?);
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(Block {
        statements,
        span: Span {
            start,
            end: parser.previous_end(),
        },
    })
}
