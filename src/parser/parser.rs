//! Token cursor and the `parse` entry point.
//!
//! Statements are dispatched on their leading token; expressions go through
//! the Pratt loop in [`super::expr`], with prefix (NUD) and infix (LED)
//! handlers taken from the shared [`GRAMMAR`] tables.

use std::rc::Rc;

use tracing::{debug, debug_span};

use crate::{
    ast::ast::{NodeId, Program},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Position, Span,
};

use super::{
    lookups::{BindingPower, LEDHandler, NUDHandler, StmtHandler, GRAMMAR},
    stmt::parse_stmt,
};

/// Cursor over one token stream.
///
/// Also hands out the [`NodeId`]s of the tree being built, so ids are unique
/// within a single parse.
pub struct Parser {
    /// Always ends in an `EOF` token
    tokens: Vec<Token>,
    pos: usize,
    file: Rc<String>,
    next_id: u32,
}

impl Parser {
    /// Creates a parser over `tokens`, appending `EOF` if the stream lacks it.
    ///
    /// # Arguments
    ///
    /// * `tokens` - Output of the lexer
    /// * `file` - Name of the source file, used for positions
    pub fn new(mut tokens: Vec<Token>, file: Rc<String>) -> Self {
        if tokens.last().map(|token| token.kind) != Some(TokenKind::EOF) {
            let end = tokens
                .last()
                .map(|token| token.span.end.clone())
                .unwrap_or_else(|| Position(0, Rc::clone(&file)));
            tokens.push(Token {
                kind: TokenKind::EOF,
                value: String::from("EOF"),
                span: Span {
                    start: end.clone(),
                    end,
                },
            });
        }

        Parser {
            tokens,
            pos: 0,
            file,
            next_id: 0,
        }
    }

    fn last_index(&self) -> usize {
        self.tokens.len() - 1
    }

    pub fn current_token(&self) -> &Token {
        &self.tokens[self.pos.min(self.last_index())]
    }

    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Kind of the token after the current one.
    pub fn peek_token_kind(&self) -> TokenKind {
        self.tokens[(self.pos + 1).min(self.last_index())].kind
    }

    /// Consumes the current token and returns it. Stays on `EOF` once there.
    pub fn advance(&mut self) -> &Token {
        let index = self.pos.min(self.last_index());
        if self.pos < self.last_index() {
            self.pos += 1;
        }
        &self.tokens[index]
    }

    /// Consumes a token of `kind` or fails with `UnexpectedToken`.
    pub fn expect(&mut self, kind: TokenKind) -> Result<Token, Error> {
        if self.current_token_kind() == kind {
            return Ok(self.advance().clone());
        }

        let token = self.current_token();
        Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: token.value.clone(),
            },
            token.span.start.clone(),
        ))
    }

    /// Like [`Parser::expect`], but fails with `message` attached.
    pub fn expect_detailed(&mut self, kind: TokenKind, message: &str) -> Result<Token, Error> {
        if self.current_token_kind() == kind {
            Ok(self.advance().clone())
        } else {
            Err(self.error_here(message))
        }
    }

    /// Builds an `UnexpectedTokenDetailed` error at the current token.
    pub fn error_here(&self, message: &str) -> Error {
        Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: self.current_token().value.clone(),
                message: String::from(message),
            },
            self.get_position(),
        )
    }

    pub fn has_tokens(&self) -> bool {
        self.current_token_kind() != TokenKind::EOF
    }

    pub fn get_stmt_handler(&self, kind: TokenKind) -> Option<StmtHandler> {
        GRAMMAR.stmt_handler(kind)
    }

    pub fn get_nud_handler(&self, kind: TokenKind) -> Option<NUDHandler> {
        GRAMMAR.nud_handler(kind)
    }

    pub fn get_led_handler(&self, kind: TokenKind) -> Option<LEDHandler> {
        GRAMMAR.led_handler(kind)
    }

    pub fn get_binding_power(&self, kind: TokenKind) -> BindingPower {
        GRAMMAR.binding_power(kind)
    }

    /// Hands out the next node id.
    pub fn advance_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Start of the current token.
    pub fn get_position(&self) -> Position {
        self.current_token().span.start.clone()
    }

    /// End of the most recently consumed token.
    pub fn previous_end(&self) -> Position {
        match self.pos.checked_sub(1) {
            Some(index) => self.tokens[index].span.end.clone(),
            None => Position(0, Rc::clone(&self.file)),
        }
    }
}

/// Parses a token stream into a [`Program`].
///
/// # Arguments
///
/// * `tokens` - Output of the lexer
/// * `file` - Name of the source file
///
/// # Returns
///
/// The program, or the first syntax error. Parsing does not recover.
pub fn parse(tokens: Vec<Token>, file: Rc<String>) -> Result<Program, Error> {
    let _span = debug_span!("parse").entered();

    let mut parser = Parser::new(tokens, Rc::clone(&file));
    let mut statements = vec![];

    while parser.has_tokens() {
        statements.push(parse_stmt(&mut parser)?);
    }

    debug!(statements = statements.len(), nodes = parser.next_id, "parsed");

    Ok(Program {
        statements,
        span: Span {
            start: Position(0, file),
            end: parser.get_position(),
        },
    })
}
