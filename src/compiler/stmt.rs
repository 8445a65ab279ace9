use crate::{
    ast::ast::{Block, Stmt, StmtKind},
    errors::errors::Error,
    scope::scope::ScopeChain,
    Position,
};

use super::{
    compiler::{codegen_error, print_intrinsic, Compiler, LoopTargets},
    expr::{gen_expression, gen_value},
    ir::{Constant, Instruction, IrType, Operand, SlotId, Terminator},
};

pub fn gen_statement(
    compiler: &mut Compiler<'_>,
    scopes: &mut ScopeChain<SlotId>,
    statement: &Stmt,
) -> Result<(), Error> {
    let position = &statement.span.start;

    match &statement.kind {
        StmtKind::DeclareVar {
            name, initializer, ..
        } => {
            let ty = IrType::from(compiler.type_of(statement.id, position)?);
            let value = match initializer {
                Some(initializer) => gen_value(compiler, scopes, initializer)?,
                None => Operand::Const(Constant::zero(ty)),
            };
            declare(compiler, scopes, name, ty, value, position)?;
        }
        StmtKind::DeclareConst {
            name, initializer, ..
        } => {
            let ty = IrType::from(compiler.type_of(statement.id, position)?);
            let value = gen_value(compiler, scopes, initializer)?;
            declare(compiler, scopes, name, ty, value, position)?;
        }
        StmtKind::Assignment { name, value } => {
            let value = gen_value(compiler, scopes, value)?;
            let slot = *scopes
                .resolve(name)
                .map_err(|error| codegen_error(&error.to_string(), position))?;

            let ty = compiler.slot_type(slot);
            compiler.emit(Instruction::Store { slot, ty, value });
        }
        StmtKind::Print { value: expression } => {
            let ty = compiler.type_of(expression.id, &expression.span.start)?;
            let value = gen_value(compiler, scopes, expression)?;

            compiler.emit(Instruction::Call {
                callee: print_intrinsic(ty).to_string(),
                args: vec![(IrType::from(ty), value)],
            });
        }
        StmtKind::If {
            condition,
            consequence,
            alternative,
        } => {
            let condition = gen_value(compiler, scopes, condition)?;

            let then_block = compiler.create_basic_block("then");
            let else_block = compiler.create_basic_block("else");
            let merge_block = compiler.create_basic_block("merge");

            compiler.terminate(Terminator::CondBr {
                condition,
                then_block,
                else_block,
            });

            compiler.position_at_end(then_block);
            gen_block(compiler, scopes, consequence)?;
            compiler.terminate(Terminator::Br(merge_block));

            // Empty when there is no alternative
            compiler.position_at_end(else_block);
            if let Some(alternative) = alternative {
                gen_block(compiler, scopes, alternative)?;
            }
            compiler.terminate(Terminator::Br(merge_block));

            compiler.position_at_end(merge_block);
        }
        StmtKind::While { condition, body } => {
            let header_block = compiler.create_basic_block("header");
            let body_block = compiler.create_basic_block("body");
            let exit_block = compiler.create_basic_block("exit");

            compiler.terminate(Terminator::Br(header_block));

            compiler.position_at_end(header_block);
            let condition = gen_value(compiler, scopes, condition)?;
            compiler.terminate(Terminator::CondBr {
                condition,
                then_block: body_block,
                else_block: exit_block,
            });

            compiler.loops.push(LoopTargets {
                header: header_block,
                exit: exit_block,
            });
            compiler.position_at_end(body_block);
            let body = gen_block(compiler, scopes, body);
            compiler.loops.pop();
            body?;
            compiler.terminate(Terminator::Br(header_block));

            compiler.position_at_end(exit_block);
        }
        StmtKind::Break | StmtKind::Continue => {
            let Some(targets) = compiler.loops.last().copied() else {
                return Err(codegen_error("loop control outside of a loop", position));
            };

            let target = match statement.kind {
                StmtKind::Break => targets.exit,
                _ => targets.header,
            };
            compiler.terminate(Terminator::Br(target));

            // Whatever follows in this block is dead code
            let unreachable = compiler.create_basic_block("unreachable");
            compiler.position_at_end(unreachable);
        }
        StmtKind::Expression { expression } => {
            gen_expression(compiler, scopes, expression)?;
        }
    }

    Ok(())
}

fn declare(
    compiler: &mut Compiler<'_>,
    scopes: &mut ScopeChain<SlotId>,
    name: &str,
    ty: IrType,
    value: Operand,
    position: &Position,
) -> Result<(), Error> {
    let slot = compiler.allocate_slot(name, ty);
    compiler.emit(Instruction::Store { slot, ty, value });

    scopes
        .declare(name, slot)
        .map_err(|error| codegen_error(&error.to_string(), position))
}

/// Lowers a block in its own frame, returning the value of its trailing
/// expression statement if it has one.
pub fn gen_block(
    compiler: &mut Compiler<'_>,
    scopes: &mut ScopeChain<SlotId>,
    block: &Block,
) -> Result<Option<Operand>, Error> {
    let mut scope = scopes.enter();
    let mut last = None;

    let count = block.statements.len();
    for (index, statement) in block.statements.iter().enumerate() {
        match &statement.kind {
            StmtKind::Expression { expression } if index + 1 == count => {
                last = gen_expression(compiler, &mut scope, expression)?;
            }
            _ => gen_statement(compiler, &mut scope, statement)?,
        }
    }

    Ok(last)
}
