//! Main compiler module.
//!
//! This module contains the core Compiler structure and the `generate` entry
//! point that lowers a checked program into an IR [`Module`]. The compiler
//! keeps a cursor on the block currently being filled; statements append to
//! it and control flow moves it.

use tracing::{debug, debug_span, trace};

use crate::{
    ast::{ast::NodeId, types::Type},
    errors::errors::{Error, ErrorImpl},
    scope::scope::ScopeChain,
    type_checker::type_checker::CheckedProgram,
    Position,
};

use super::{
    ir::{
        BasicBlock, BlockId, Constant, ExternFunction, Function, Instruction, IrType, Module,
        Operand, Reg, Slot, SlotId, Terminator,
    },
    stmt::gen_statement,
};

/// Name of the generated entry function.
pub const ENTRY_FUNCTION: &str = "main";

/// Branch targets of the innermost enclosing loop.
#[derive(Debug, Clone, Copy)]
pub struct LoopTargets {
    pub header: BlockId,
    pub exit: BlockId,
}

/// The main compiler structure that holds the state of the compilation process.
///
/// # Type Parameters
///
/// * `'a` - Lifetime of the checked program being compiled
pub struct Compiler<'a> {
    /// The checked program and its type annotations
    pub program: &'a CheckedProgram,
    /// The entry function under construction
    pub function: Function,
    /// The block instructions are currently appended to
    pub current_block: BlockId,
    /// Enclosing loops, innermost last
    pub loops: Vec<LoopTargets>,
    next_reg: u32,
}

impl<'a> Compiler<'a> {
    /// Creates a new Compiler instance with an empty entry block.
    pub fn new(program: &'a CheckedProgram) -> Self {
        let mut compiler = Compiler {
            program,
            function: Function {
                name: String::from(ENTRY_FUNCTION),
                return_type: IrType::I32,
                slots: vec![],
                blocks: vec![],
            },
            current_block: BlockId(0),
            loops: vec![],
            next_reg: 0,
        };

        let entry = compiler.create_basic_block("entry");
        compiler.position_at_end(entry);

        compiler
    }

    /// Appends a new, empty block to the function.
    ///
    /// Every label except `entry` gets the block index appended so labels
    /// stay unique.
    ///
    /// # Arguments
    ///
    /// * `name` - Label prefix for the basic block
    ///
    /// # Returns
    ///
    /// The id of the created block
    pub fn create_basic_block(&mut self, name: &str) -> BlockId {
        let id = BlockId(self.function.blocks.len());
        let label = if id.0 == 0 {
            name.to_string()
        } else {
            format!("{}.{}", name, id.0)
        };

        trace!(%label, "create block");

        self.function.blocks.push(BasicBlock {
            label,
            instructions: vec![],
            terminator: None,
        });

        id
    }

    /// Moves the cursor so later instructions are appended to `block`.
    pub fn position_at_end(&mut self, block: BlockId) {
        self.current_block = block;
    }

    pub fn is_terminated(&self) -> bool {
        self.function.blocks[self.current_block.0]
            .terminator
            .is_some()
    }

    /// Appends an instruction to the current block.
    pub fn emit(&mut self, instruction: Instruction) {
        self.function.blocks[self.current_block.0]
            .instructions
            .push(instruction);
    }

    /// Ends the current block unless it already ended.
    ///
    /// A block that ended in `break` or `continue` keeps its first terminator.
    pub fn terminate(&mut self, terminator: Terminator) {
        let block = &mut self.function.blocks[self.current_block.0];
        if block.terminator.is_none() {
            block.terminator = Some(terminator);
        }
    }

    pub fn next_reg(&mut self) -> Reg {
        let reg = Reg(self.next_reg);
        self.next_reg += 1;
        reg
    }

    /// Allocates a fresh storage slot. Shadowed names get separate slots.
    pub fn allocate_slot(&mut self, name: &str, ty: IrType) -> SlotId {
        let id = SlotId(self.function.slots.len() as u32);
        self.function.slots.push(Slot {
            name: name.to_string(),
            ty,
        });
        id
    }

    pub fn slot_type(&self, slot: SlotId) -> IrType {
        self.function.slots[slot.0 as usize].ty
    }

    /// Looks up the checked type of a node.
    pub fn type_of(&self, id: NodeId, position: &Position) -> Result<Type, Error> {
        self.program
            .type_of(id)
            .ok_or_else(|| codegen_error("node has no type annotation", position))
    }

    /// Lowers every statement of the program, then returns `0` from `main`.
    fn gen(&mut self) -> Result<(), Error> {
        let program: &'a CheckedProgram = self.program;
        let mut scopes = ScopeChain::new();

        for statement in program.program().statements.iter() {
            gen_statement(self, &mut scopes, statement)?;
        }

        self.terminate(Terminator::Ret(Operand::Const(Constant::Int(0))));

        Ok(())
    }
}

pub fn codegen_error(message: &str, position: &Position) -> Error {
    Error::new(
        ErrorImpl::CodegenError {
            message: message.to_string(),
        },
        position.clone(),
    )
}

/// Print intrinsic for a value of the given type.
pub fn print_intrinsic(ty: Type) -> &'static str {
    match ty {
        Type::Int => "printInt",
        Type::Float => "printFloat",
        Type::Bool => "printBool",
    }
}

/// Declarations of the runtime functions every module may call.
fn create_external_functions() -> Vec<ExternFunction> {
    [Type::Int, Type::Float, Type::Bool]
        .into_iter()
        .map(|ty| ExternFunction {
            name: print_intrinsic(ty).to_string(),
            params: vec![IrType::from(ty)],
        })
        .collect()
}

/// Lowers a checked program into a module with a single `main` function.
///
/// # Arguments
///
/// * `program` - The program, already checked without errors
/// * `module_name` - Name recorded on the module, usually the source file
///
/// # Returns
///
/// The generated module, or a `CodegenError` if the tree holds something the
/// checker should have rejected.
pub fn generate(program: &CheckedProgram, module_name: &str) -> Result<Module, Error> {
    let _span = debug_span!("generate").entered();

    let mut compiler = Compiler::new(program);
    compiler.gen()?;

    debug!(
        blocks = compiler.function.blocks.len(),
        slots = compiler.function.slots.len(),
        "generated"
    );

    Ok(Module {
        name: module_name.to_string(),
        externs: create_external_functions(),
        functions: vec![compiler.function],
    })
}
