use thiserror::Error;
use tracing::{debug, debug_span, trace};

use crate::{
    ast::{
        ast::{Block, Expr, ExprKind, Stmt, StmtKind},
        types::{BinaryOperator, Type, UnaryOperator},
    },
    errors::errors::{Error, ErrorImpl},
    scope::scope::ScopeChain,
    type_checker::type_checker::CheckedProgram,
    Position,
};

use super::value::Value;

enum FlowSignal {
    Break,
    Continue,
}

enum BlockEval {
    Value(Option<Value>),
    Flow(FlowSignal),
}

struct Interpreter {
    output: Vec<String>,
}

/// A failed run, together with the lines printed before the failure.
#[derive(Debug, Clone, Error)]
#[error("{error}")]
pub struct RunError {
    pub output: Vec<String>,
    pub error: Error,
}

impl From<Error> for RunError {
    fn from(error: Error) -> Self {
        RunError {
            output: vec![],
            error,
        }
    }
}

/// Runs a checked program and returns the printed lines in order.
///
/// The only user-facing failure is `DivisionByZero`. Any other error means
/// the tree reached the evaluator without a clean type check. Either way the
/// lines printed up to the failing statement come back with the error.
pub fn run(program: &CheckedProgram) -> Result<Vec<String>, RunError> {
    let _span = debug_span!("interpret").entered();

    let mut interpreter = Interpreter { output: vec![] };
    let mut scopes = ScopeChain::new();

    if let Err(error) = interpreter.exec_program(&mut scopes, program) {
        debug!(lines = interpreter.output.len(), %error, "interpretation failed");
        return Err(RunError {
            output: interpreter.output,
            error,
        });
    }

    debug!(lines = interpreter.output.len(), "interpreted");

    Ok(interpreter.output)
}

fn internal(message: &str, position: &Position) -> Error {
    Error::new(
        ErrorImpl::InternalError {
            message: message.to_string(),
        },
        position.clone(),
    )
}

impl Interpreter {
    fn exec_program(
        &mut self,
        scopes: &mut ScopeChain<Value>,
        program: &CheckedProgram,
    ) -> Result<(), Error> {
        for stmt in program.program().statements.iter() {
            if self.exec_stmt(scopes, stmt)?.is_some() {
                return Err(internal("loop control outside of a loop", &stmt.span.start));
            }
        }

        Ok(())
    }

    fn exec_stmt(
        &mut self,
        scopes: &mut ScopeChain<Value>,
        stmt: &Stmt,
    ) -> Result<Option<FlowSignal>, Error> {
        match &stmt.kind {
            StmtKind::DeclareVar {
                name,
                declared_type,
                initializer,
            } => {
                let value = match (initializer, declared_type) {
                    (Some(initializer), _) => self.eval_value(scopes, initializer)?,
                    (None, Some(ty)) => Value::zero(*ty),
                    (None, None) => {
                        return Err(internal("declaration without type", &stmt.span.start))
                    }
                };
                self.declare(scopes, name, value, &stmt.span.start)?;
            }
            StmtKind::DeclareConst {
                name, initializer, ..
            } => {
                let value = self.eval_value(scopes, initializer)?;
                self.declare(scopes, name, value, &stmt.span.start)?;
            }
            StmtKind::Assignment { name, value } => {
                let value = self.eval_value(scopes, value)?;
                let slot = scopes
                    .assign_target(name)
                    .map_err(|error| internal(&error.to_string(), &stmt.span.start))?;
                *slot = value;
            }
            StmtKind::Print { value } => {
                let value = self.eval_value(scopes, value)?;
                trace!(%value, "print");
                self.output.push(value.to_string());
            }
            StmtKind::If {
                condition,
                consequence,
                alternative,
            } => {
                let branch = if self.eval_condition(scopes, condition)? {
                    Some(consequence)
                } else {
                    alternative.as_ref()
                };

                if let Some(branch) = branch {
                    if let BlockEval::Flow(flow) = self.eval_block(scopes, branch)? {
                        return Ok(Some(flow));
                    }
                }
            }
            StmtKind::While { condition, body } => {
                while self.eval_condition(scopes, condition)? {
                    match self.eval_block(scopes, body)? {
                        BlockEval::Flow(FlowSignal::Break) => break,
                        BlockEval::Flow(FlowSignal::Continue) | BlockEval::Value(_) => {}
                    }
                }
            }
            StmtKind::Break => return Ok(Some(FlowSignal::Break)),
            StmtKind::Continue => return Ok(Some(FlowSignal::Continue)),
            StmtKind::Expression { expression } => {
                self.eval_expr(scopes, expression)?;
            }
        }

        Ok(None)
    }

    fn declare(
        &mut self,
        scopes: &mut ScopeChain<Value>,
        name: &str,
        value: Value,
        position: &Position,
    ) -> Result<(), Error> {
        scopes
            .declare(name, value)
            .map_err(|error| internal(&error.to_string(), position))
    }

    fn eval_condition(&mut self, scopes: &mut ScopeChain<Value>, condition: &Expr) -> Result<bool, Error> {
        match self.eval_value(scopes, condition)? {
            Value::Bool(value) => Ok(value),
            other => Err(internal(
                &format!("condition evaluated to {}", other.get_type()),
                &condition.span.start,
            )),
        }
    }

    /// Runs a block in a fresh frame.
    fn eval_block(&mut self, scopes: &mut ScopeChain<Value>, block: &Block) -> Result<BlockEval, Error> {
        let mut scope = scopes.enter();
        let mut last = None;

        let count = block.statements.len();
        for (index, stmt) in block.statements.iter().enumerate() {
            match &stmt.kind {
                StmtKind::Expression { expression } if index + 1 == count => {
                    last = self.eval_expr(&mut scope, expression)?;
                }
                _ => {
                    if let Some(flow) = self.exec_stmt(&mut scope, stmt)? {
                        return Ok(BlockEval::Flow(flow));
                    }
                }
            }
        }

        Ok(BlockEval::Value(last))
    }

    fn eval_value(&mut self, scopes: &mut ScopeChain<Value>, expr: &Expr) -> Result<Value, Error> {
        self.eval_expr(scopes, expr)?
            .ok_or_else(|| internal("expression has no value", &expr.span.start))
    }

    /// Evaluates an expression; only a compound without tail has no value.
    fn eval_expr(&mut self, scopes: &mut ScopeChain<Value>, expr: &Expr) -> Result<Option<Value>, Error> {
        let value = match &expr.kind {
            ExprKind::Literal(literal) => Value::from(*literal),
            ExprKind::Unary { operator, operand } => {
                let operand = self.eval_value(scopes, operand)?;
                unary(*operator, operand, &expr.span.start)?
            }
            ExprKind::Binary {
                operator,
                left,
                right,
            } => {
                // Both operands, even for `&&` and `||`
                let left = self.eval_value(scopes, left)?;
                let right = self.eval_value(scopes, right)?;
                binary(*operator, left, right, &expr.span.start)?
            }
            ExprKind::Load { name } => *scopes
                .resolve(name)
                .map_err(|error| internal(&error.to_string(), &expr.span.start))?,
            ExprKind::Compound { body } => {
                return match self.eval_block(scopes, body)? {
                    BlockEval::Value(value) => Ok(value),
                    BlockEval::Flow(_) => Err(internal(
                        "loop control escaped a compound expression",
                        &expr.span.start,
                    )),
                };
            }
        };

        Ok(Some(value))
    }
}

fn unary(operator: UnaryOperator, operand: Value, position: &Position) -> Result<Value, Error> {
    match (operator, operand) {
        (UnaryOperator::Plus, Value::Int(_) | Value::Float(_)) => Ok(operand),
        (UnaryOperator::Minus, Value::Int(value)) => Ok(Value::Int(value.wrapping_neg())),
        (UnaryOperator::Minus, Value::Float(value)) => Ok(Value::Float(-value)),
        _ => Err(internal(
            &format!("no unary {} for {}", operator.symbol(), operand.get_type()),
            position,
        )),
    }
}

fn binary(
    operator: BinaryOperator,
    left: Value,
    right: Value,
    position: &Position,
) -> Result<Value, Error> {
    use BinaryOperator::*;

    let value = match (left, right) {
        (Value::Int(a), Value::Int(b)) => match operator {
            Add => Value::Int(a.wrapping_add(b)),
            Subtract => Value::Int(a.wrapping_sub(b)),
            Multiply => Value::Int(a.wrapping_mul(b)),
            Divide => {
                if b == 0 {
                    return Err(Error::new(ErrorImpl::DivisionByZero, position.clone()));
                }
                // Truncates toward zero
                Value::Int(a.wrapping_div(b))
            }
            Less => Value::Bool(a < b),
            Greater => Value::Bool(a > b),
            LessEquals => Value::Bool(a <= b),
            GreaterEquals => Value::Bool(a >= b),
            Equals => Value::Bool(a == b),
            NotEquals => Value::Bool(a != b),
            And | Or => return Err(mismatch(operator, Type::Int, position)),
        },
        (Value::Float(a), Value::Float(b)) => match operator {
            Add => Value::Float(a + b),
            Subtract => Value::Float(a - b),
            Multiply => Value::Float(a * b),
            Divide => Value::Float(a / b),
            Less => Value::Bool(a < b),
            Greater => Value::Bool(a > b),
            LessEquals => Value::Bool(a <= b),
            GreaterEquals => Value::Bool(a >= b),
            Equals => Value::Bool(a == b),
            NotEquals => Value::Bool(a != b),
            And | Or => return Err(mismatch(operator, Type::Float, position)),
        },
        (Value::Bool(a), Value::Bool(b)) => match operator {
            And => Value::Bool(a && b),
            Or => Value::Bool(a || b),
            Equals => Value::Bool(a == b),
            NotEquals => Value::Bool(a != b),
            _ => return Err(mismatch(operator, Type::Bool, position)),
        },
        _ => {
            return Err(internal(
                &format!(
                    "no binary {} for {} and {}",
                    operator.symbol(),
                    left.get_type(),
                    right.get_type()
                ),
                position,
            ))
        }
    };

    Ok(value)
}

fn mismatch(operator: BinaryOperator, ty: Type, position: &Position) -> Error {
    internal(
        &format!("no binary {} for {}", operator.symbol(), ty),
        position,
    )
}
