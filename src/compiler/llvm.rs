//! Lowering of the IR module to a real LLVM module through inkwell.

use std::{collections::HashMap, path::Path};

use inkwell::{
    attributes::{Attribute, AttributeLoc},
    basic_block::BasicBlock,
    builder::Builder,
    context::Context,
    module::{Linkage, Module},
    targets::{CodeModel, InitializationConfig, RelocMode, Target, TargetMachine},
    types::{BasicMetadataTypeEnum, BasicTypeEnum},
    values::{BasicMetadataValueEnum, BasicValue, BasicValueEnum, FunctionValue, PointerValue},
    FloatPredicate, IntPredicate, OptimizationLevel,
};
use tracing::{debug, debug_span};

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::ir::{self, BinaryOp, Constant, Instruction, IrType, Operand, Predicate, Reg, Terminator};

fn llvm_error(message: impl ToString) -> Error {
    Error::new(
        ErrorImpl::CodegenError {
            message: message.to_string(),
        },
        Position::null(),
    )
}

/// Holds the inkwell state while one IR function is being lowered.
struct Lowering<'a, 'ctx> {
    context: &'ctx Context,
    module: &'a Module<'ctx>,
    builder: Builder<'ctx>,
    slots: Vec<PointerValue<'ctx>>,
    blocks: Vec<BasicBlock<'ctx>>,
    registers: HashMap<Reg, BasicValueEnum<'ctx>>,
}

/// Lowers `module` into a verified LLVM module owned by `context`.
pub fn lower<'ctx>(context: &'ctx Context, module: &ir::Module) -> Result<Module<'ctx>, Error> {
    let _span = debug_span!("lower_llvm").entered();

    let llvm_module = context.create_module(&module.name);

    Target::initialize_all(&InitializationConfig::default());
    let target_triple = TargetMachine::get_default_triple();
    let target = Target::from_triple(&target_triple).map_err(llvm_error)?;
    let target_machine = target
        .create_target_machine(
            &target_triple,
            "generic",
            "",
            OptimizationLevel::Default,
            RelocMode::PIC,
            CodeModel::Default,
        )
        .ok_or_else(|| llvm_error("could not create a target machine"))?;

    llvm_module.set_triple(&target_triple);
    llvm_module.set_data_layout(&target_machine.get_target_data().get_data_layout());

    for function in module.externs.iter() {
        let params = function
            .params
            .iter()
            .map(|ty| basic_type(context, *ty).into())
            .collect::<Vec<BasicMetadataTypeEnum>>();
        let function_type = context.void_type().fn_type(&params, false);
        llvm_module.add_function(&function.name, function_type, Some(Linkage::External));
    }

    for function in module.functions.iter() {
        let mut lowering = Lowering {
            context,
            module: &llvm_module,
            builder: context.create_builder(),
            slots: vec![],
            blocks: vec![],
            registers: HashMap::new(),
        };
        lowering.lower_function(function)?;
    }

    llvm_module.verify().map_err(llvm_error)?;

    debug!(functions = module.functions.len(), "lowered to llvm");

    Ok(llvm_module)
}

/// Lowers `module` and writes the textual LLVM IR to `output_file`.
pub fn write_llvm_ir(module: &ir::Module, output_file: &Path) -> Result<(), Error> {
    let context = Context::create();
    let llvm_module = lower(&context, module)?;

    llvm_module
        .print_to_file(output_file)
        .map_err(llvm_error)
}

fn basic_type(context: &Context, ty: IrType) -> BasicTypeEnum<'_> {
    match ty {
        IrType::I1 => context.bool_type().into(),
        IrType::I32 => context.i32_type().into(),
        IrType::F64 => context.f64_type().into(),
    }
}

impl<'a, 'ctx> Lowering<'a, 'ctx> {
    fn lower_function(&mut self, function: &ir::Function) -> Result<(), Error> {
        let function_type = basic_type(self.context, function.return_type).fn_type(&[], false);
        let function_value = self.module.add_function(&function.name, function_type, None);
        self.add_attributes(function_value);

        self.blocks = function
            .blocks
            .iter()
            .map(|block| self.context.append_basic_block(function_value, &block.label))
            .collect();

        let Some(entry) = self.blocks.first().copied() else {
            return Err(llvm_error("function has no entry block"));
        };
        self.builder.position_at_end(entry);

        for slot in function.slots.iter() {
            let pointer = self
                .builder
                .build_alloca(basic_type(self.context, slot.ty), &slot.name)
                .map_err(llvm_error)?;
            self.slots.push(pointer);
        }

        for (block, llvm_block) in function.blocks.iter().zip(self.blocks.clone()) {
            self.builder.position_at_end(llvm_block);

            for instruction in block.instructions.iter() {
                self.lower_instruction(instruction)?;
            }

            match &block.terminator {
                Some(terminator) => self.lower_terminator(terminator)?,
                None => {
                    self.builder.build_unreachable().map_err(llvm_error)?;
                }
            }
        }

        Ok(())
    }

    fn add_attributes(&self, function: FunctionValue<'ctx>) {
        let attributes = [
            self.context
                .create_enum_attribute(Attribute::get_named_enum_kind_id("uwtable"), 0),
            self.context
                .create_enum_attribute(Attribute::get_named_enum_kind_id("nounwind"), 0),
        ];

        for attribute in attributes.iter() {
            function.add_attribute(AttributeLoc::Function, *attribute);
        }
    }

    fn operand(&self, operand: &Operand) -> Result<BasicValueEnum<'ctx>, Error> {
        match operand {
            Operand::Reg(reg) => self
                .registers
                .get(reg)
                .copied()
                .ok_or_else(|| llvm_error(format!("register %r{} used before definition", reg.0))),
            Operand::Const(Constant::Int(value)) => {
                Ok(self.context.i32_type().const_int(*value as u64, true).into())
            }
            Operand::Const(Constant::Float(value)) => {
                Ok(self.context.f64_type().const_float(*value).into())
            }
            Operand::Const(Constant::Bool(value)) => {
                Ok(self.context.bool_type().const_int(*value as u64, false).into())
            }
        }
    }

    fn lower_instruction(&mut self, instruction: &Instruction) -> Result<(), Error> {
        match instruction {
            Instruction::Load { dest, slot, .. } => {
                let value = self
                    .builder
                    .build_load(self.slots[slot.0 as usize], "")
                    .map_err(llvm_error)?;
                self.registers.insert(*dest, value);
            }
            Instruction::Store { slot, value, .. } => {
                let value = self.operand(value)?;
                self.builder
                    .build_store(self.slots[slot.0 as usize], value)
                    .map_err(llvm_error)?;
            }
            Instruction::Binary {
                dest,
                op,
                left,
                right,
                ..
            } => {
                let left = self.operand(left)?;
                let right = self.operand(right)?;
                let value: BasicValueEnum = match op {
                    BinaryOp::Add => self
                        .builder
                        .build_int_add(left.into_int_value(), right.into_int_value(), "")
                        .map(Into::into),
                    BinaryOp::Sub => self
                        .builder
                        .build_int_sub(left.into_int_value(), right.into_int_value(), "")
                        .map(Into::into),
                    BinaryOp::Mul => self
                        .builder
                        .build_int_mul(left.into_int_value(), right.into_int_value(), "")
                        .map(Into::into),
                    BinaryOp::SDiv => self
                        .builder
                        .build_int_signed_div(left.into_int_value(), right.into_int_value(), "")
                        .map(Into::into),
                    BinaryOp::And => self
                        .builder
                        .build_and(left.into_int_value(), right.into_int_value(), "")
                        .map(Into::into),
                    BinaryOp::Or => self
                        .builder
                        .build_or(left.into_int_value(), right.into_int_value(), "")
                        .map(Into::into),
                    BinaryOp::FAdd => self
                        .builder
                        .build_float_add(left.into_float_value(), right.into_float_value(), "")
                        .map(Into::into),
                    BinaryOp::FSub => self
                        .builder
                        .build_float_sub(left.into_float_value(), right.into_float_value(), "")
                        .map(Into::into),
                    BinaryOp::FMul => self
                        .builder
                        .build_float_mul(left.into_float_value(), right.into_float_value(), "")
                        .map(Into::into),
                    BinaryOp::FDiv => self
                        .builder
                        .build_float_div(left.into_float_value(), right.into_float_value(), "")
                        .map(Into::into),
                }
                .map_err(llvm_error)?;
                self.registers.insert(*dest, value);
            }
            Instruction::ICmp {
                dest,
                predicate,
                left,
                right,
                ..
            } => {
                let predicate = match predicate {
                    Predicate::Eq => IntPredicate::EQ,
                    Predicate::Ne => IntPredicate::NE,
                    Predicate::Lt => IntPredicate::SLT,
                    Predicate::Gt => IntPredicate::SGT,
                    Predicate::Le => IntPredicate::SLE,
                    Predicate::Ge => IntPredicate::SGE,
                };
                let value = self
                    .builder
                    .build_int_compare(
                        predicate,
                        self.operand(left)?.into_int_value(),
                        self.operand(right)?.into_int_value(),
                        "",
                    )
                    .map_err(llvm_error)?;
                self.registers.insert(*dest, value.into());
            }
            Instruction::FCmp {
                dest,
                predicate,
                left,
                right,
            } => {
                let predicate = match predicate {
                    Predicate::Eq => FloatPredicate::OEQ,
                    Predicate::Ne => FloatPredicate::UNE,
                    Predicate::Lt => FloatPredicate::OLT,
                    Predicate::Gt => FloatPredicate::OGT,
                    Predicate::Le => FloatPredicate::OLE,
                    Predicate::Ge => FloatPredicate::OGE,
                };
                let value = self
                    .builder
                    .build_float_compare(
                        predicate,
                        self.operand(left)?.into_float_value(),
                        self.operand(right)?.into_float_value(),
                        "",
                    )
                    .map_err(llvm_error)?;
                self.registers.insert(*dest, value.into());
            }
            Instruction::Neg { dest, ty, operand } => {
                let operand = self.operand(operand)?;
                let value: BasicValueEnum = match ty {
                    IrType::F64 => self
                        .builder
                        .build_float_neg(operand.into_float_value(), "")
                        .map(Into::into),
                    _ => self
                        .builder
                        .build_int_neg(operand.into_int_value(), "")
                        .map(Into::into),
                }
                .map_err(llvm_error)?;
                self.registers.insert(*dest, value);
            }
            Instruction::Call { callee, args } => {
                let function = self
                    .module
                    .get_function(callee)
                    .ok_or_else(|| llvm_error(format!("unknown function @{}", callee)))?;
                let args = args
                    .iter()
                    .map(|(_, operand)| self.operand(operand).map(Into::into))
                    .collect::<Result<Vec<BasicMetadataValueEnum>, Error>>()?;
                self.builder
                    .build_call(function, &args, "")
                    .map_err(llvm_error)?;
            }
        }

        Ok(())
    }

    fn lower_terminator(&mut self, terminator: &Terminator) -> Result<(), Error> {
        match terminator {
            Terminator::Br(target) => {
                self.builder
                    .build_unconditional_branch(self.blocks[target.0])
                    .map_err(llvm_error)?;
            }
            Terminator::CondBr {
                condition,
                then_block,
                else_block,
            } => {
                let condition = self.operand(condition)?.into_int_value();
                self.builder
                    .build_conditional_branch(
                        condition,
                        self.blocks[then_block.0],
                        self.blocks[else_block.0],
                    )
                    .map_err(llvm_error)?;
            }
            Terminator::Ret(value) => {
                let value = self.operand(value)?;
                self.builder
                    .build_return(Some(&value as &dyn BasicValue))
                    .map_err(llvm_error)?;
            }
        }

        Ok(())
    }
}
