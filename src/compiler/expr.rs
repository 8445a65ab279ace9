use crate::{
    ast::{
        ast::{Expr, ExprKind},
        types::{BinaryOperator, Literal, Type, UnaryOperator},
    },
    errors::errors::Error,
    scope::scope::ScopeChain,
};

use super::{
    compiler::{codegen_error, Compiler},
    ir::{BinaryOp, Constant, Instruction, IrType, Operand, Predicate, Reg, SlotId},
    stmt::gen_block,
};

/// Lowers an expression whose value is required.
pub fn gen_value(
    compiler: &mut Compiler<'_>,
    scopes: &mut ScopeChain<SlotId>,
    expression: &Expr,
) -> Result<Operand, Error> {
    gen_expression(compiler, scopes, expression)?
        .ok_or_else(|| codegen_error("expression has no value", &expression.span.start))
}

/// Lowers an expression into the current block.
///
/// Returns `None` only for a compound expression without a trailing value.
pub fn gen_expression(
    compiler: &mut Compiler<'_>,
    scopes: &mut ScopeChain<SlotId>,
    expression: &Expr,
) -> Result<Option<Operand>, Error> {
    let position = &expression.span.start;

    let operand = match &expression.kind {
        ExprKind::Literal(literal) => Operand::Const(match literal {
            Literal::Int(value) => Constant::Int(*value),
            Literal::Float(value) => Constant::Float(*value),
            Literal::Bool(value) => Constant::Bool(*value),
        }),
        ExprKind::Unary { operator, operand } => {
            let ty = compiler.type_of(expression.id, position)?;
            let operand = gen_value(compiler, scopes, operand)?;

            match operator {
                UnaryOperator::Plus => operand,
                UnaryOperator::Minus => {
                    let dest = compiler.next_reg();
                    compiler.emit(Instruction::Neg {
                        dest,
                        ty: IrType::from(ty),
                        operand,
                    });
                    Operand::Reg(dest)
                }
            }
        }
        ExprKind::Binary {
            operator,
            left,
            right,
        } => {
            let operand_type = compiler.type_of(left.id, &left.span.start)?;
            let left = gen_value(compiler, scopes, left)?;
            let right = gen_value(compiler, scopes, right)?;

            let dest = compiler.next_reg();
            let instruction = binary_instruction(*operator, operand_type, dest, left, right)
                .ok_or_else(|| {
                    codegen_error(
                        &format!("no lowering for {} on {}", operator.symbol(), operand_type),
                        position,
                    )
                })?;
            compiler.emit(instruction);

            Operand::Reg(dest)
        }
        ExprKind::Load { name } => {
            let slot = *scopes
                .resolve(name)
                .map_err(|error| codegen_error(&error.to_string(), position))?;

            let ty = compiler.slot_type(slot);
            let dest = compiler.next_reg();
            compiler.emit(Instruction::Load { dest, slot, ty });

            Operand::Reg(dest)
        }
        ExprKind::Compound { body } => return gen_block(compiler, scopes, body),
    };

    Ok(Some(operand))
}

fn binary_instruction(
    operator: BinaryOperator,
    operand_type: Type,
    dest: Reg,
    left: Operand,
    right: Operand,
) -> Option<Instruction> {
    use BinaryOperator::*;

    let arithmetic = |op: BinaryOp| Instruction::Binary {
        dest,
        op,
        ty: IrType::from(operand_type),
        left,
        right,
    };
    let compare = |predicate: Predicate| match operand_type {
        Type::Float => Instruction::FCmp {
            dest,
            predicate,
            left,
            right,
        },
        _ => Instruction::ICmp {
            dest,
            predicate,
            ty: IrType::from(operand_type),
            left,
            right,
        },
    };

    let instruction = match (operand_type, operator) {
        (Type::Int, Add) => arithmetic(BinaryOp::Add),
        (Type::Int, Subtract) => arithmetic(BinaryOp::Sub),
        (Type::Int, Multiply) => arithmetic(BinaryOp::Mul),
        (Type::Int, Divide) => arithmetic(BinaryOp::SDiv),
        (Type::Float, Add) => arithmetic(BinaryOp::FAdd),
        (Type::Float, Subtract) => arithmetic(BinaryOp::FSub),
        (Type::Float, Multiply) => arithmetic(BinaryOp::FMul),
        (Type::Float, Divide) => arithmetic(BinaryOp::FDiv),
        (Type::Bool, And) => arithmetic(BinaryOp::And),
        (Type::Bool, Or) => arithmetic(BinaryOp::Or),
        (_, Equals) => compare(Predicate::Eq),
        (_, NotEquals) => compare(Predicate::Ne),
        (Type::Int | Type::Float, Less) => compare(Predicate::Lt),
        (Type::Int | Type::Float, Greater) => compare(Predicate::Gt),
        (Type::Int | Type::Float, LessEquals) => compare(Predicate::Le),
        (Type::Int | Type::Float, GreaterEquals) => compare(Predicate::Ge),
        _ => return None,
    };

    Some(instruction)
}
