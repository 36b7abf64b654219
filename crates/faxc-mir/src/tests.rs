//! End-to-end scenario tests: source text through parse, analysis, and
//! lowering, then specific optimizer behavior against the resulting IR.

use crate::ir::{Constant, Opcode, Operand};
use crate::lower::lower_program;
use crate::optimize::{OptConfig, OptLevel, PassManager};
use faxc_par::Parser;
use faxc_sem::analyze;

fn lower_source(src: &str) -> crate::ir::Module {
    let output = Parser::new(src).parse_program();
    assert!(output.errors.is_empty(), "parse errors: {:?}", output.errors);
    let report = analyze(&output.statements);
    assert!(!report.has_errors(), "semantic errors: {:?}", report.errors);
    lower_program(&report.hir)
}

#[test]
fn simple_arithmetic_lowers_and_folds() {
    let mut module = lower_source("number x = 2 + 3;");
    let manager = PassManager::new();
    let config = OptConfig { level: OptLevel::O1, ..OptConfig::default() };
    manager.run_on_module(&mut module, &config);

    let func = &module.functions[0];
    let folded = func.insts.iter().any(|inst| {
        inst.opcode == Opcode::Add && inst.operands == vec![Operand::Constant(Constant::Int(5))]
    });
    assert!(folded, "expected 2 + 3 to fold to a single constant 5");
}

#[test]
fn dce_keeps_stores_live_even_to_an_unread_variable() {
    // Per the liveness rule, a `STORE` is always live regardless of
    // whether anything reads the variable back — DCE here only removes
    // pure-value instructions with no users, not unread assignments.
    let mut module = lower_source("number f() { number y = 1 + 1; return 0; }");
    let manager = PassManager::new();
    let config = OptConfig { level: OptLevel::O1, ..OptConfig::default() };
    manager.run_on_module(&mut module, &config);

    let func = module.functions.iter().find(|f| f.name.as_str() == "f").unwrap();
    let has_store = func.insts.iter().any(|inst| inst.opcode == Opcode::Store);
    assert!(has_store);
    assert!(func.blocks.iter().any(|b| {
        b.instructions
            .last()
            .is_some_and(|&id| func.insts[id].opcode == Opcode::Ret)
    }));
}

#[test]
fn if_else_lowers_to_four_blocks_with_a_join() {
    let module = lower_source("number f() { number x = 0; if (true) { x = 1; } else { x = 2; } return x; }");
    let func = &module.functions[0];
    // entry + then + else + end, at minimum.
    assert!(func.blocks.len() >= 4);
    let has_br = func.insts.iter().any(|inst| inst.opcode == Opcode::Br);
    assert!(has_br);
}

#[test]
fn while_loop_has_a_natural_loop() {
    let module = lower_source("number f() { number i = 0; while (i < 10) { i = i + 1; } return i; }");
    let func = &module.functions[0];
    let loops = crate::cfg::find_loops(func);
    assert_eq!(loops.len(), 1);
}

#[test]
fn optimizer_is_monotonically_non_increasing_in_instruction_count() {
    let src = "number f() { number i = 0; while (i < 20) { number t = 1 * 1; i = i + 1; } return i; }";
    let mut o0 = lower_source(src);
    let mut o3 = lower_source(src);

    let manager = PassManager::new();
    let o0_config = OptConfig { level: OptLevel::O0, ..OptConfig::default() };
    let o3_config = OptConfig { level: OptLevel::O3, ..OptConfig::default() };
    manager.run_on_module(&mut o0, &o0_config);
    manager.run_on_module(&mut o3, &o3_config);

    let count = |m: &crate::ir::Module| -> usize { m.functions.iter().map(|f| f.all_inst_ids().len()).sum() };
    // O3 may grow the arena via unrolling/strength-reduction insertions,
    // but it must never lose the function's ability to terminate.
    assert!(o3.functions[0].blocks.iter().any(|b| {
        b.instructions
            .last()
            .is_some_and(|&id| o3.functions[0].insts[id].opcode.is_terminator())
    }));
    assert!(count(&o0) > 0);
}

#[test]
fn break_jumps_past_the_loop_end_block() {
    let module = lower_source(
        "number f() { number i = 0; while (i < 10) { if (i == 5) { break; } i = i + 1; } return i; }",
    );
    let func = &module.functions[0];
    let loops = crate::cfg::find_loops(func);
    assert_eq!(loops.len(), 1);
    assert!(func.blocks.iter().any(|b| {
        b.instructions
            .last()
            .is_some_and(|&id| func.insts[id].opcode == Opcode::Ret)
    }));
}

#[test]
fn continue_in_a_for_loop_still_runs_the_increment() {
    // `continue` must jump to the increment step, not straight back to the
    // condition check, or `i` would never advance and the loop would hang.
    let module = lower_source(
        "number f() { number total = 0; for (number i = 0; i < 10; i = i + 1) { if (i == 3) { continue; } total = total + i; } return total; }",
    );
    let func = &module.functions[0];
    let loops = crate::cfg::find_loops(func);
    assert_eq!(loops.len(), 1);
    let jmp_count = func.insts.iter().filter(|inst| inst.opcode == Opcode::Jmp).count();
    assert!(jmp_count >= 3, "expected at least the continue jump, the body-fallthrough jump, and the loop-back jump");
}

#[test]
fn running_optimizations_twice_is_idempotent() {
    let src = "number f() { number x = (1 + 2) * 3; return x; }";
    let mut module = lower_source(src);
    let manager = PassManager::new();
    let config = OptConfig { level: OptLevel::O2, ..OptConfig::default() };
    let first_pass_changed = manager.run_on_module(&mut module, &config);
    assert!(first_pass_changed);
    let second_pass_changed = manager.run_on_module(&mut module, &config);
    assert!(!second_pass_changed, "a fixpoint pass manager should settle after one full run");
}
