//! In-memory basic-block IR produced by the code generator.
//!
//! The shapes mirror a small subset of LLVM: one stack slot per declared
//! variable, virtual registers for intermediate values, and basic blocks that
//! each end in exactly one terminator. `Display` renders LLVM-flavoured text.

use std::fmt::{self, Display};

use crate::ast::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reg(pub u32);

/// Index into [`Function::blocks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrType {
    I1,
    I32,
    F64,
}

impl From<Type> for IrType {
    fn from(ty: Type) -> Self {
        match ty {
            Type::Int => IrType::I32,
            Type::Float => IrType::F64,
            Type::Bool => IrType::I1,
        }
    }
}

impl Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::I1 => write!(f, "i1"),
            IrType::I32 => write!(f, "i32"),
            IrType::F64 => write!(f, "double"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constant {
    Int(i32),
    Float(f64),
    Bool(bool),
}

impl Constant {
    pub fn zero(ty: IrType) -> Self {
        match ty {
            IrType::I1 => Constant::Bool(false),
            IrType::I32 => Constant::Int(0),
            IrType::F64 => Constant::Float(0.0),
        }
    }

    pub fn ir_type(&self) -> IrType {
        match self {
            Constant::Int(_) => IrType::I32,
            Constant::Float(_) => IrType::F64,
            Constant::Bool(_) => IrType::I1,
        }
    }
}

/// Spells a double the way LLVM's text parser accepts it.
///
/// Values with at most ten fractional bits are written as exact decimals;
/// everything else, including non-finite values, as the 64-bit hex pattern.
pub fn float_literal(value: f64) -> String {
    if value.is_finite() && value.abs() < 1e9 && (value * 1024.0).fract() == 0.0 {
        let text = format!("{:.10}", value);
        let text = text.trim_end_matches('0');
        if text.ends_with('.') {
            format!("{}0", text)
        } else {
            text.to_string()
        }
    } else {
        format!("0x{:016X}", value.to_bits())
    }
}

impl Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(value) => write!(f, "{}", value),
            Constant::Float(value) => write!(f, "{}", float_literal(*value)),
            Constant::Bool(value) => write!(f, "{}", value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Reg(Reg),
    Const(Constant),
}

impl Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Reg(reg) => write!(f, "%r{}", reg.0),
            Operand::Const(constant) => write!(f, "{}", constant),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    SDiv,
    FAdd,
    FSub,
    FMul,
    FDiv,
    And,
    Or,
}

impl BinaryOp {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::SDiv => "sdiv",
            BinaryOp::FAdd => "fadd",
            BinaryOp::FSub => "fsub",
            BinaryOp::FMul => "fmul",
            BinaryOp::FDiv => "fdiv",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}

/// Comparison predicate. Integer compares are signed, float compares ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl Predicate {
    fn int_mnemonic(&self) -> &'static str {
        match self {
            Predicate::Eq => "eq",
            Predicate::Ne => "ne",
            Predicate::Lt => "slt",
            Predicate::Gt => "sgt",
            Predicate::Le => "sle",
            Predicate::Ge => "sge",
        }
    }

    fn float_mnemonic(&self) -> &'static str {
        match self {
            Predicate::Eq => "oeq",
            // Unordered, so NaN != NaN holds
            Predicate::Ne => "une",
            Predicate::Lt => "olt",
            Predicate::Gt => "ogt",
            Predicate::Le => "ole",
            Predicate::Ge => "oge",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Load {
        dest: Reg,
        slot: SlotId,
        ty: IrType,
    },
    Store {
        slot: SlotId,
        ty: IrType,
        value: Operand,
    },
    Binary {
        dest: Reg,
        op: BinaryOp,
        ty: IrType,
        left: Operand,
        right: Operand,
    },
    /// Compare two `i1` or `i32` operands.
    ICmp {
        dest: Reg,
        predicate: Predicate,
        ty: IrType,
        left: Operand,
        right: Operand,
    },
    FCmp {
        dest: Reg,
        predicate: Predicate,
        left: Operand,
        right: Operand,
    },
    Neg {
        dest: Reg,
        ty: IrType,
        operand: Operand,
    },
    /// Call to an external `void` function.
    Call {
        callee: String,
        args: Vec<(IrType, Operand)>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Terminator {
    Br(BlockId),
    CondBr {
        condition: Operand,
        then_block: BlockId,
        else_block: BlockId,
    },
    Ret(Operand),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    pub label: String,
    pub instructions: Vec<Instruction>,
    /// `None` only while the block is still being filled.
    pub terminator: Option<Terminator>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub name: String,
    pub ty: IrType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub return_type: IrType,
    pub slots: Vec<Slot>,
    /// The first block is the entry block.
    pub blocks: Vec<BasicBlock>,
}

impl Function {
    pub fn entry_block(&self) -> Option<&BasicBlock> {
        self.blocks.first()
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id.0]
    }

    pub fn find_block(&self, label: &str) -> Option<&BasicBlock> {
        self.blocks.iter().find(|block| block.label == label)
    }
}

/// An externally defined `void` function such as a print intrinsic.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternFunction {
    pub name: String,
    pub params: Vec<IrType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    pub externs: Vec<ExternFunction>,
    pub functions: Vec<Function>,
}

impl Module {
    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|function| function.name == name)
    }
}

impl Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = '{}'", self.name)?;

        for function in self.externs.iter() {
            let params = function
                .params
                .iter()
                .map(|ty| ty.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(f, "declare void @{}({})", function.name, params)?;
        }

        for function in self.functions.iter() {
            writeln!(f)?;
            write!(f, "{}", function)?;
        }

        Ok(())
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "define {} @{}() {{", self.return_type, self.name)?;

        for (index, block) in self.blocks.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}:", block.label)?;

            // Slots live at the top of the entry block
            if index == 0 {
                for (slot, Slot { name, ty }) in self.slots.iter().enumerate() {
                    writeln!(f, "  %s{} = alloca {} ; {}", slot, ty, name)?;
                }
            }

            for instruction in block.instructions.iter() {
                writeln!(f, "  {}", instruction)?;
            }

            match &block.terminator {
                Some(terminator) => writeln!(f, "  {}", terminator.display(self))?,
                None => writeln!(f, "  unreachable")?,
            }
        }

        writeln!(f, "}}")
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Load { dest, slot, ty } => {
                write!(f, "%r{} = load {}, {}* %s{}", dest.0, ty, ty, slot.0)
            }
            Instruction::Store { slot, ty, value } => {
                write!(f, "store {} {}, {}* %s{}", ty, value, ty, slot.0)
            }
            Instruction::Binary {
                dest,
                op,
                ty,
                left,
                right,
            } => write!(
                f,
                "%r{} = {} {} {}, {}",
                dest.0,
                op.mnemonic(),
                ty,
                left,
                right
            ),
            Instruction::ICmp {
                dest,
                predicate,
                ty,
                left,
                right,
            } => write!(
                f,
                "%r{} = icmp {} {} {}, {}",
                dest.0,
                predicate.int_mnemonic(),
                ty,
                left,
                right
            ),
            Instruction::FCmp {
                dest,
                predicate,
                left,
                right,
            } => write!(
                f,
                "%r{} = fcmp {} double {}, {}",
                dest.0,
                predicate.float_mnemonic(),
                left,
                right
            ),
            Instruction::Neg { dest, ty, operand } => match ty {
                IrType::F64 => write!(f, "%r{} = fneg double {}", dest.0, operand),
                _ => write!(f, "%r{} = sub {} 0, {}", dest.0, ty, operand),
            },
            Instruction::Call { callee, args } => {
                let args = args
                    .iter()
                    .map(|(ty, operand)| format!("{} {}", ty, operand))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "call void @{}({})", callee, args)
            }
        }
    }
}

impl Terminator {
    fn display<'a>(&'a self, function: &'a Function) -> TerminatorDisplay<'a> {
        TerminatorDisplay {
            terminator: self,
            function,
        }
    }
}

/// Terminators name their targets by label, which lives on the function.
struct TerminatorDisplay<'a> {
    terminator: &'a Terminator,
    function: &'a Function,
}

impl Display for TerminatorDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = |id: &BlockId| self.function.block(*id).label.as_str();

        match self.terminator {
            Terminator::Br(target) => write!(f, "br label %{}", label(target)),
            Terminator::CondBr {
                condition,
                then_block,
                else_block,
            } => write!(
                f,
                "br i1 {}, label %{}, label %{}",
                condition,
                label(then_block),
                label(else_block)
            ),
            Terminator::Ret(value) => match value {
                Operand::Const(constant) => write!(f, "ret {} {}", constant.ir_type(), value),
                Operand::Reg(_) => write!(f, "ret {} {}", self.function.return_type, value),
            },
        }
    }
}
