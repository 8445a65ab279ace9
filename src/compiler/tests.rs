use std::rc::Rc;

use super::{
    compiler::generate,
    ir::{
        float_literal, BinaryOp, BlockId, Constant, Function, Instruction, IrType, Module, Operand, Predicate,
        Reg, SlotId, Terminator,
    },
};
use crate::{
    ast::ast::Program,
    errors::errors::ErrorImpl,
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::type_checker::{type_check, Annotations, CheckedProgram},
};

fn parse_source(source: &str) -> Program {
    let tokens = tokenize(source.to_string(), Some("test.wb".to_string())).unwrap();
    parse(tokens, Rc::new("test.wb".to_string())).unwrap()
}

fn compile(source: &str) -> Module {
    let program = parse_source(source);
    let checked = type_check(&program).into_checked(program).unwrap();
    generate(&checked, "test.wb").unwrap()
}

fn main_function(module: &Module) -> &Function {
    module.get_function("main").unwrap()
}

fn block_id(function: &Function, prefix: &str) -> BlockId {
    let index = function
        .blocks
        .iter()
        .position(|block| block.label.starts_with(prefix))
        .unwrap();
    BlockId(index)
}

fn calls(function: &Function) -> Vec<String> {
    function
        .blocks
        .iter()
        .flat_map(|block| block.instructions.iter())
        .filter_map(|instruction| match instruction {
            Instruction::Call { callee, .. } => Some(callee.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_entry_block_for_addition() {
    let module = compile("var x = 4; var y = 5; print x + y;");
    let function = main_function(&module);

    assert_eq!(function.blocks.len(), 1);
    assert_eq!(function.slots.len(), 2);
    assert!(function.slots.iter().all(|slot| slot.ty == IrType::I32));

    let entry = function.entry_block().unwrap();
    assert_eq!(entry.label, "entry");
    assert_eq!(
        entry.instructions,
        vec![
            Instruction::Store {
                slot: SlotId(0),
                ty: IrType::I32,
                value: Operand::Const(Constant::Int(4)),
            },
            Instruction::Store {
                slot: SlotId(1),
                ty: IrType::I32,
                value: Operand::Const(Constant::Int(5)),
            },
            Instruction::Load {
                dest: Reg(0),
                slot: SlotId(0),
                ty: IrType::I32,
            },
            Instruction::Load {
                dest: Reg(1),
                slot: SlotId(1),
                ty: IrType::I32,
            },
            Instruction::Binary {
                dest: Reg(2),
                op: BinaryOp::Add,
                ty: IrType::I32,
                left: Operand::Reg(Reg(0)),
                right: Operand::Reg(Reg(1)),
            },
            Instruction::Call {
                callee: String::from("printInt"),
                args: vec![(IrType::I32, Operand::Reg(Reg(2)))],
            },
        ]
    );
    assert_eq!(
        entry.terminator,
        Some(Terminator::Ret(Operand::Const(Constant::Int(0))))
    );
}

#[test]
fn test_print_intrinsics_are_declared() {
    let module = compile("print 1;");

    let names = module
        .externs
        .iter()
        .map(|function| function.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["printInt", "printFloat", "printBool"]);
}

#[test]
fn test_print_selects_intrinsic_by_type() {
    let module = compile("print 1; print 2.5; print 1 < 2; print -(1.5 * 2.0);");

    assert_eq!(
        calls(main_function(&module)),
        vec!["printInt", "printFloat", "printBool", "printFloat"]
    );
}

#[test]
fn test_slots_are_sized_by_type() {
    let module = compile("var a int; var b float; var c bool; const d = 1.5;");
    let function = main_function(&module);

    let types = function
        .slots
        .iter()
        .map(|slot| slot.ty)
        .collect::<Vec<_>>();
    assert_eq!(types, vec![IrType::I32, IrType::F64, IrType::I1, IrType::F64]);

    // Uninitialised variables start at zero
    let entry = function.entry_block().unwrap();
    assert_eq!(
        entry.instructions[1],
        Instruction::Store {
            slot: SlotId(1),
            ty: IrType::F64,
            value: Operand::Const(Constant::Float(0.0)),
        }
    );
}

#[test]
fn test_shadowed_names_get_their_own_slot() {
    let module = compile("var x = 1; if true { var x = 2.0; print x; } print x;");
    let function = main_function(&module);

    assert_eq!(function.slots.len(), 2);
    assert_eq!(function.slots[0].ty, IrType::I32);
    assert_eq!(function.slots[1].ty, IrType::F64);

    let then_block = function.block(block_id(function, "then"));
    assert!(then_block.instructions.contains(&Instruction::Load {
        dest: Reg(0),
        slot: SlotId(1),
        ty: IrType::F64,
    }));

    let merge_block = function.block(block_id(function, "merge"));
    assert_eq!(
        merge_block.instructions[0],
        Instruction::Load {
            dest: Reg(1),
            slot: SlotId(0),
            ty: IrType::I32,
        }
    );
}

#[test]
fn test_if_lowers_to_then_else_merge() {
    let module = compile("var a = 1; if a < 2 { print 1; } else { print 2; } print 3;");
    let function = main_function(&module);

    let then_id = block_id(function, "then");
    let else_id = block_id(function, "else");
    let merge_id = block_id(function, "merge");

    let entry = function.entry_block().unwrap();
    assert!(matches!(
        entry.instructions.last(),
        Some(Instruction::ICmp {
            predicate: Predicate::Lt,
            ..
        })
    ));
    assert!(matches!(
        &entry.terminator,
        Some(Terminator::CondBr { then_block, else_block, .. })
            if *then_block == then_id && *else_block == else_id
    ));

    assert_eq!(
        function.block(then_id).terminator,
        Some(Terminator::Br(merge_id))
    );
    assert_eq!(
        function.block(else_id).terminator,
        Some(Terminator::Br(merge_id))
    );
    assert!(matches!(
        function.block(merge_id).terminator,
        Some(Terminator::Ret(_))
    ));
    assert_eq!(calls(function), vec!["printInt", "printInt", "printInt"]);
}

#[test]
fn test_if_without_alternative_has_empty_else() {
    let module = compile("if true { print 1; }");
    let function = main_function(&module);

    let else_block = function.block(block_id(function, "else"));
    assert!(else_block.instructions.is_empty());
    assert_eq!(
        else_block.terminator,
        Some(Terminator::Br(block_id(function, "merge")))
    );
}

#[test]
fn test_while_lowers_to_header_body_exit() {
    let module = compile("var i = 0; while i < 3 { i = i + 1; } print i;");
    let function = main_function(&module);

    let header_id = block_id(function, "header");
    let body_id = block_id(function, "body");
    let exit_id = block_id(function, "exit");

    assert_eq!(
        function.entry_block().unwrap().terminator,
        Some(Terminator::Br(header_id))
    );
    assert!(matches!(
        &function.block(header_id).terminator,
        Some(Terminator::CondBr { then_block, else_block, .. })
            if *then_block == body_id && *else_block == exit_id
    ));
    assert_eq!(
        function.block(body_id).terminator,
        Some(Terminator::Br(header_id))
    );
    assert_eq!(calls(function), vec!["printInt"]);
    assert!(function
        .block(exit_id)
        .instructions
        .iter()
        .any(|instruction| matches!(instruction, Instruction::Call { .. })));
}

#[test]
fn test_break_and_continue_branch_to_loop_blocks() {
    let module = compile(
        "var i = 0; while true { i = i + 1; if i == 2 { continue; } if i > 4 { break; } }",
    );
    let function = main_function(&module);

    let header_id = block_id(function, "header");
    let exit_id = block_id(function, "exit");

    let branches_to = |target: BlockId| {
        function
            .blocks
            .iter()
            .filter(|block| block.label.starts_with("then"))
            .any(|block| block.terminator == Some(Terminator::Br(target)))
    };
    assert!(branches_to(header_id));
    assert!(branches_to(exit_id));

    // Dead code after the jump lands in a fresh block
    assert!(function
        .blocks
        .iter()
        .any(|block| block.label.starts_with("unreachable")));
}

#[test]
fn test_every_block_is_terminated() {
    let module = compile(
        "var n = 0;
         while n < 10 {
             n = n + 1;
             if n == 3 { continue; print n; } else if n == 8 { break; }
             var sq = { var t = n * n; t; };
             print sq;
         }",
    );

    assert!(main_function(&module)
        .blocks
        .iter()
        .all(|block| block.terminator.is_some()));
}

#[test]
fn test_compound_value_is_a_register() {
    let module = compile("var y = 42; var x = { var t = y; t; }; print x;");
    let function = main_function(&module);

    assert_eq!(function.slots.len(), 3);
    let entry = function.entry_block().unwrap();
    // `t` is loaded into a register and that register is stored into `x`
    assert!(entry.instructions.contains(&Instruction::Store {
        slot: SlotId(2),
        ty: IrType::I32,
        value: Operand::Reg(Reg(1)),
    }));
}

#[test]
fn test_float_and_bool_operations() {
    let module = compile("var f = 1.5; print f / 2.0 >= 0.5 && true != false;");
    let entry = main_function(&module).entry_block().unwrap();

    assert!(entry.instructions.iter().any(|instruction| matches!(
        instruction,
        Instruction::Binary {
            op: BinaryOp::FDiv,
            ..
        }
    )));
    assert!(entry.instructions.iter().any(|instruction| matches!(
        instruction,
        Instruction::FCmp {
            predicate: Predicate::Ge,
            ..
        }
    )));
    assert!(entry.instructions.iter().any(|instruction| matches!(
        instruction,
        Instruction::ICmp {
            predicate: Predicate::Ne,
            ty: IrType::I1,
            ..
        }
    )));
    assert!(entry.instructions.iter().any(|instruction| matches!(
        instruction,
        Instruction::Binary {
            op: BinaryOp::And,
            ..
        }
    )));
}

#[test]
fn test_float_inequality_is_unordered() {
    let module = compile("var z = 0.0 / 0.0; print z != z;");
    let entry = main_function(&module).entry_block().unwrap();

    let compare = entry
        .instructions
        .iter()
        .find(|instruction| matches!(instruction, Instruction::FCmp { .. }))
        .unwrap();
    assert!(matches!(
        compare,
        Instruction::FCmp {
            predicate: Predicate::Ne,
            ..
        }
    ));
    assert!(compare.to_string().contains("fcmp une double"));
}

#[test]
fn test_float_constants_use_llvm_spelling() {
    assert_eq!(float_literal(1.5), "1.5");
    assert_eq!(float_literal(-2.0), "-2.0");
    assert_eq!(float_literal(0.0), "0.0");
    assert_eq!(float_literal(0.1), "0x3FB999999999999A");
    assert_eq!(float_literal(f64::INFINITY), "0x7FF0000000000000");

    let text = compile("var x = 0.1; print x * 0.25;").to_string();
    assert!(text.contains("store double 0x3FB999999999999A, double* %s0"));
    assert!(text.contains("fmul double %r0, 0.25"));
}

#[test]
fn test_module_renders_as_text() {
    let text = compile("var x = 4; var y = 5; print x + y;").to_string();

    assert!(text.starts_with("; ModuleID = 'test.wb'"));
    assert!(text.contains("declare void @printInt(i32)"));
    assert!(text.contains("define i32 @main() {"));
    assert!(text.contains("%s0 = alloca i32 ; x"));
    assert!(text.contains("store i32 4, i32* %s0"));
    assert!(text.contains("%r2 = add i32 %r0, %r1"));
    assert!(text.contains("call void @printInt(i32 %r2)"));
    assert!(text.contains("ret i32 0"));
}

#[test]
fn test_missing_annotation_is_a_codegen_error() {
    let program = parse_source("var x = 1;");
    let checked = CheckedProgram::assume_checked(program, Annotations::default());

    let error = generate(&checked, "test.wb").unwrap_err();

    assert!(matches!(error.get_impl(), ErrorImpl::CodegenError { .. }));
}

#[test]
fn test_undeclared_name_is_a_codegen_error() {
    let program = parse_source("print 1; x = 2;");
    let checked = CheckedProgram::assume_checked(program, Annotations::default());

    // `print 1` already needs an annotation, so the first failure wins
    assert!(generate(&checked, "test.wb").is_err());
}

#[cfg(feature = "llvm")]
mod llvm {
    use inkwell::context::Context;

    use super::compile;
    use crate::compiler::llvm::lower;

    #[test]
    fn test_lowered_module_verifies() {
        let module = compile(
            "var i = 0;
             var total = 0.0;
             while i < 5 {
                 i = i + 1;
                 if i == 2 { continue; }
                 total = total + 1.5;
             }
             print total;
             print i > 3 || false;",
        );
        let context = Context::create();

        let llvm_module = lower(&context, &module).unwrap();

        assert!(llvm_module.get_function("main").is_some());
        assert!(llvm_module.get_function("printFloat").is_some());
    }
}
