use std::collections::HashMap;

use tracing::{debug, debug_span};

use crate::{
    ast::{
        ast::{Block, Expr, ExprKind, NodeId, Program, Stmt, StmtKind},
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
    scope::scope::{Declaration, ScopeChain, ScopeError},
    Position,
};

use super::operators::{binary_result, unary_result};

/// Resolved types keyed by node id.
///
/// Expressions map to the type of their value, declarations to the type of
/// the declared variable. Only the checker writes entries.
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    types: HashMap<NodeId, Type>,
}

impl Annotations {
    pub fn get(&self, id: NodeId) -> Option<Type> {
        self.types.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn insert(&mut self, id: NodeId, ty: Type) {
        self.types.insert(id, ty);
    }
}

#[derive(Debug, Clone)]
pub struct TypeCheckResult {
    pub annotations: Annotations,
    pub errors: Vec<Error>,
}

impl TypeCheckResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Pairs the program with its annotations if checking found no errors.
    pub fn into_checked(self, program: Program) -> Result<CheckedProgram, Vec<Error>> {
        if !self.errors.is_empty() {
            return Err(self.errors);
        }

        Ok(CheckedProgram {
            program,
            annotations: self.annotations,
        })
    }
}

/// A program that type checked without errors, ready for either backend.
#[derive(Debug, Clone)]
pub struct CheckedProgram {
    program: Program,
    annotations: Annotations,
}

impl CheckedProgram {
    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    pub fn type_of(&self, id: NodeId) -> Option<Type> {
        self.annotations.get(id)
    }

    /// Skips the checker entirely; backends must cope with missing entries.
    #[cfg(test)]
    pub(crate) fn assume_checked(program: Program, annotations: Annotations) -> Self {
        CheckedProgram {
            program,
            annotations,
        }
    }
}

/// Outcome of synthesizing an expression.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Synthesized {
    Typed(Type),
    /// A compound whose block does not end in an expression.
    NoValue,
    /// An error was already reported somewhere inside.
    Poisoned,
}

struct TypeChecker {
    annotations: Annotations,
    errors: Vec<Error>,
    loop_depth: usize,
}

/// Checks a whole program, collecting every error instead of stopping at the
/// first one.
pub fn type_check(program: &Program) -> TypeCheckResult {
    let _span = debug_span!("type_check").entered();

    let mut checker = TypeChecker {
        annotations: Annotations::default(),
        errors: vec![],
        loop_depth: 0,
    };
    let mut scopes = ScopeChain::new();

    for stmt in program.statements.iter() {
        checker.check_stmt(&mut scopes, stmt);
    }

    debug!(
        annotated = checker.annotations.len(),
        errors = checker.errors.len(),
        "checked"
    );

    TypeCheckResult {
        annotations: checker.annotations,
        errors: checker.errors,
    }
}

impl TypeChecker {
    fn error(&mut self, error: ErrorImpl, position: &Position) {
        self.errors.push(Error::new(error, position.clone()));
    }

    fn check_stmt(&mut self, scopes: &mut ScopeChain<Declaration>, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::DeclareVar {
                name,
                declared_type,
                initializer,
            } => {
                let ty = self.check_initializer(scopes, *declared_type, initializer.as_ref());
                self.declare(scopes, stmt, name, false, ty);
            }
            StmtKind::DeclareConst {
                name,
                declared_type,
                initializer,
            } => {
                let ty = self.check_initializer(scopes, *declared_type, Some(initializer));
                self.declare(scopes, stmt, name, true, ty);
            }
            StmtKind::Assignment { name, value } => {
                let received = self.check_value(scopes, value);

                let target = match scopes.assign_target(name) {
                    Ok(declaration) => *declaration,
                    Err(_) => {
                        self.error(
                            ErrorImpl::UndefinedName { name: name.clone() },
                            &stmt.span.start,
                        );
                        return;
                    }
                };

                if target.is_const {
                    self.error(
                        ErrorImpl::AssignToConst { name: name.clone() },
                        &stmt.span.start,
                    );
                } else if let (Some(expected), Some(received)) = (target.ty, received) {
                    if expected != received {
                        self.error(
                            ErrorImpl::AssignTypeMismatch {
                                name: name.clone(),
                                expected: expected.to_string(),
                                received: received.to_string(),
                            },
                            &value.span.start,
                        );
                    }
                }
            }
            StmtKind::Print { value } => {
                self.check_value(scopes, value);
            }
            StmtKind::If {
                condition,
                consequence,
                alternative,
            } => {
                self.check_condition(scopes, "if", condition);

                // Both branches, whatever the condition
                self.check_block(scopes, consequence);
                if let Some(alternative) = alternative {
                    self.check_block(scopes, alternative);
                }
            }
            StmtKind::While { condition, body } => {
                self.check_condition(scopes, "while", condition);

                self.loop_depth += 1;
                self.check_block(scopes, body);
                self.loop_depth -= 1;
            }
            StmtKind::Break | StmtKind::Continue => {
                if self.loop_depth == 0 {
                    let keyword = match stmt.kind {
                        StmtKind::Break => "break",
                        _ => "continue",
                    };
                    self.error(
                        ErrorImpl::LoopControlOutsideLoop {
                            keyword: keyword.to_string(),
                        },
                        &stmt.span.start,
                    );
                }
            }
            StmtKind::Expression { expression } => {
                // A statement may discard a compound that has no value
                self.check_expr(scopes, expression);
            }
        }
    }

    /// Resolves the type of a declared name from its annotation and initializer.
    fn check_initializer(
        &mut self,
        scopes: &mut ScopeChain<Declaration>,
        declared_type: Option<Type>,
        initializer: Option<&Expr>,
    ) -> Option<Type> {
        let Some(initializer) = initializer else {
            return declared_type;
        };

        let received = self.check_value(scopes, initializer);

        match (declared_type, received) {
            (Some(expected), Some(received)) if expected != received => {
                self.error(
                    ErrorImpl::InitMismatch {
                        expected: expected.to_string(),
                        received: received.to_string(),
                    },
                    &initializer.span.start,
                );
                Some(expected)
            }
            (Some(expected), _) => Some(expected),
            (None, received) => received,
        }
    }

    fn declare(
        &mut self,
        scopes: &mut ScopeChain<Declaration>,
        stmt: &Stmt,
        name: &str,
        is_const: bool,
        ty: Option<Type>,
    ) {
        if let Some(ty) = ty {
            self.annotations.insert(stmt.id, ty);
        }

        if let Err(ScopeError::DuplicateDeclaration(name)) =
            scopes.declare(name, Declaration { is_const, ty })
        {
            self.error(ErrorImpl::DuplicateDeclaration { name }, &stmt.span.start);
        }
    }

    fn check_condition(
        &mut self,
        scopes: &mut ScopeChain<Declaration>,
        construct: &str,
        condition: &Expr,
    ) {
        if let Some(received) = self.check_value(scopes, condition) {
            if received != Type::Bool {
                self.error(
                    ErrorImpl::ConditionMismatch {
                        construct: construct.to_string(),
                        received: received.to_string(),
                    },
                    &condition.span.start,
                );
            }
        }
    }

    /// Synthesizes an expression whose value is required.
    ///
    /// Returns `None` if the value is unusable; the cause has been reported.
    fn check_value(&mut self, scopes: &mut ScopeChain<Declaration>, expr: &Expr) -> Option<Type> {
        match self.check_expr(scopes, expr) {
            Synthesized::Typed(ty) => Some(ty),
            Synthesized::Poisoned => None,
            Synthesized::NoValue => {
                self.error(ErrorImpl::MissingValue, &expr.span.start);
                None
            }
        }
    }

    fn check_expr(&mut self, scopes: &mut ScopeChain<Declaration>, expr: &Expr) -> Synthesized {
        let synthesized = match &expr.kind {
            ExprKind::Literal(literal) => Synthesized::Typed(literal.get_type()),
            ExprKind::Unary { operator, operand } => {
                let Some(operand_type) = self.check_value(scopes, operand) else {
                    return Synthesized::Poisoned;
                };

                match unary_result(*operator, operand_type) {
                    Some(ty) => Synthesized::Typed(ty),
                    None => {
                        self.error(
                            ErrorImpl::UnaryOpMismatch {
                                operator: operator.symbol().to_string(),
                                operand: operand_type.to_string(),
                            },
                            &expr.span.start,
                        );
                        Synthesized::Poisoned
                    }
                }
            }
            ExprKind::Binary {
                operator,
                left,
                right,
            } => {
                let left_type = self.check_value(scopes, left);
                let right_type = self.check_value(scopes, right);

                let (Some(left_type), Some(right_type)) = (left_type, right_type) else {
                    return Synthesized::Poisoned;
                };

                match binary_result(left_type, *operator, right_type) {
                    Some(ty) => Synthesized::Typed(ty),
                    None => {
                        self.error(
                            ErrorImpl::BinOpMismatch {
                                left: left_type.to_string(),
                                operator: operator.symbol().to_string(),
                                right: right_type.to_string(),
                            },
                            &expr.span.start,
                        );
                        Synthesized::Poisoned
                    }
                }
            }
            ExprKind::Load { name } => match scopes.resolve(name) {
                Ok(Declaration { ty: Some(ty), .. }) => Synthesized::Typed(*ty),
                Ok(Declaration { ty: None, .. }) => Synthesized::Poisoned,
                Err(_) => {
                    self.error(
                        ErrorImpl::UndefinedName { name: name.clone() },
                        &expr.span.start,
                    );
                    Synthesized::Poisoned
                }
            },
            ExprKind::Compound { body } => {
                // `break` and `continue` cannot leave an expression
                let loop_depth = std::mem::replace(&mut self.loop_depth, 0);
                let synthesized = self.check_block(scopes, body);
                self.loop_depth = loop_depth;
                synthesized
            }
        };

        if let Synthesized::Typed(ty) = synthesized {
            self.annotations.insert(expr.id, ty);
        }

        synthesized
    }

    /// Checks a block in its own frame and synthesizes its trailing value.
    fn check_block(&mut self, scopes: &mut ScopeChain<Declaration>, block: &Block) -> Synthesized {
        let mut scope = scopes.enter();
        let mut result = Synthesized::NoValue;

        let count = block.statements.len();
        for (index, stmt) in block.statements.iter().enumerate() {
            match &stmt.kind {
                StmtKind::Expression { expression } if index + 1 == count => {
                    result = self.check_expr(&mut scope, expression);
                }
                _ => self.check_stmt(&mut scope, stmt),
            }
        }

        result
    }
}
