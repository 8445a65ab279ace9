use crate::Span;

use super::types::{BinaryOperator, Literal, Type, UnaryOperator};

/// Identity of a node within one parsed program.
///
/// Ids are handed out by the parser and are unique per parse; the type
/// checker keys its annotation table by them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// A whole program: the statements of the outermost frame.
#[derive(Debug, Clone)]
pub struct Program {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

/// A braced statement sequence owned by `if`, `while` or a compound expression.
#[derive(Debug, Clone)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    /// The trailing expression statement, if the block ends in one.
    pub fn tail_expression(&self) -> Option<&Expr> {
        match self.statements.last().map(|stmt| &stmt.kind) {
            Some(StmtKind::Expression { expression }) => Some(expression),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Unary {
        operator: UnaryOperator,
        operand: Box<Expr>,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Load {
        name: String,
    },
    /// A block used as an expression; its value is that of its last statement.
    Compound {
        body: Block,
    },
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub id: NodeId,
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    DeclareVar {
        name: String,
        declared_type: Option<Type>,
        initializer: Option<Expr>,
    },
    DeclareConst {
        name: String,
        declared_type: Option<Type>,
        initializer: Expr,
    },
    Assignment {
        name: String,
        value: Expr,
    },
    Print {
        value: Expr,
    },
    If {
        condition: Expr,
        consequence: Block,
        alternative: Option<Block>,
    },
    While {
        condition: Expr,
        body: Block,
    },
    Break,
    Continue,
    Expression {
        expression: Expr,
    },
}

impl StmtKind {
    pub fn name(&self) -> &'static str {
        match self {
            StmtKind::DeclareVar { .. } => "DeclareVar",
            StmtKind::DeclareConst { .. } => "DeclareConst",
            StmtKind::Assignment { .. } => "Assignment",
            StmtKind::Print { .. } => "Print",
            StmtKind::If { .. } => "IfStatement",
            StmtKind::While { .. } => "WhileLoop",
            StmtKind::Break => "Break",
            StmtKind::Continue => "Continue",
            StmtKind::Expression { .. } => "ExprAsStatement",
        }
    }
}

// Structural equality: ids and spans are bookkeeping and never compared.

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl PartialEq for Stmt {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.statements == other.statements
    }
}

impl PartialEq for Program {
    fn eq(&self, other: &Self) -> bool {
        self.statements == other.statements
    }
}
