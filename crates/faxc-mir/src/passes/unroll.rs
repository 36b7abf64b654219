//! Loop unrolling: duplicate a small, countable loop body and fold the
//! per-copy induction steps into one multiplied step.
//!
//! This only recognizes the canonical shape this crate's own lowering
//! produces for `while`/`for`: a loop of exactly two blocks (header,
//! body), where the header's sole content is a `<` comparison of the
//! induction variable against a constant bound feeding a `BR`, and the
//! body ends with a `STORE` of `induction + constant_step` back into the
//! induction variable. Anything else is left untouched — `DESIGN.md`
//! tracks this as a deliberately narrow first cut rather than a general
//! trip-count analysis.

use crate::cfg::find_loops;
use crate::ir::{BlockId, Constant, Function, InstId, Instruction, Opcode, Operand};
use crate::optimize::{OptConfig, OptLevel, Pass};
use faxc_util::{FxHashMap, Symbol};

pub struct Unroll;

impl Pass for Unroll {
    fn name(&self) -> &'static str {
        "unroll"
    }

    fn level(&self) -> OptLevel {
        OptLevel::O3
    }

    fn run(&self, func: &mut Function, config: &OptConfig) -> bool {
        let loops = find_loops(func);
        let mut changed = false;
        for lp in loops {
            if lp.blocks.len() != 2 {
                continue;
            }
            if try_unroll(func, lp.header, &lp.blocks, config.unroll_factor) {
                changed = true;
            }
        }
        changed
    }
}

pub(crate) struct Induction {
    pub(crate) var: Symbol,
    pub(crate) init: i64,
    pub(crate) bound: i64,
    pub(crate) step: i64,
    pub(crate) increment_inst: InstId,
}

pub(crate) fn body_block_of(header: BlockId, blocks: &faxc_util::FxHashSet<BlockId>) -> Option<BlockId> {
    blocks.iter().copied().find(|&b| b != header)
}

pub(crate) fn find_induction(func: &Function, header: BlockId, body: BlockId) -> Option<Induction> {
    let header_insts = &func.blocks[header].instructions;
    if header_insts.len() > 4 {
        return None; // keep this to the small, single-comparison canonical shape
    }
    let br_id = *header_insts.last()?;
    if func.insts[br_id].opcode != Opcode::Br {
        return None;
    }
    let cond = func.insts[br_id].operands.first()?.as_inst()?;
    let cmp = &func.insts[cond];
    if cmp.opcode != Opcode::Lt {
        return None;
    }
    let (Operand::Variable(var), Operand::Constant(Constant::Int(bound))) =
        (&cmp.operands[0], &cmp.operands[1])
    else {
        return None;
    };
    let (var, bound) = (*var, *bound);

    let store_id = func.blocks[body].instructions.iter().rev().find_map(|&id| {
        let is_match = func.insts[id].opcode == Opcode::Store
            && matches!(&func.insts[id].operands[1], Operand::Variable(v) if *v == var);
        is_match.then_some(id)
    })?;
    let add_id = func.insts[store_id].operands[0].as_inst()?;
    let add = &func.insts[add_id];
    if add.opcode != Opcode::Add {
        return None;
    }
    let (Operand::Variable(add_var), Operand::Constant(Constant::Int(step))) =
        (&add.operands[0], &add.operands[1])
    else {
        return None;
    };
    if *add_var != var || *step == 0 {
        return None;
    }
    let step = *step;

    // Initial value: the most recent constant STORE into `var` in a
    // predecessor of the header reached from outside the loop.
    let init = func.predecessors(header).into_iter().find_map(|pred| {
        func.blocks[pred].instructions.iter().rev().find_map(|&id| {
            let inst = &func.insts[id];
            if inst.opcode == Opcode::Store
                && matches!(&inst.operands[1], Operand::Variable(v) if *v == var)
            {
                if let Operand::Constant(Constant::Int(i)) = &inst.operands[0] {
                    return Some(*i);
                }
            }
            None
        })
    })?;

    Some(Induction { var, init, bound, step, increment_inst: add_id })
}

fn try_unroll(func: &mut Function, header: BlockId, loop_blocks: &faxc_util::FxHashSet<BlockId>, unroll_factor: usize) -> bool {
    let Some(body) = body_block_of(header, loop_blocks) else {
        return false;
    };
    if func.blocks[body].instructions.len() > 50 {
        return false;
    }
    let Some(ind) = find_induction(func, header, body) else {
        return false;
    };
    if ind.step == 0 {
        return false;
    }
    let trip_count = ((ind.bound - ind.init) + ind.step - 1) / ind.step;
    if trip_count <= 2 {
        return false;
    }
    let k = (trip_count as usize).min(unroll_factor).max(1);
    if k < 2 {
        return false;
    }

    // Fold the per-copy steps into a single multiplied step on the
    // original body's increment instruction.
    if let Operand::Constant(Constant::Int(step)) = &mut func.insts[ind.increment_inst].operands[1] {
        *step *= k as i64;
    }

    let mut prev_block = body;
    for _ in 1..k {
        let new_block = clone_block_without_increment(func, body, ind.var);
        retarget_jmp(func, prev_block, new_block);
        prev_block = new_block;
    }
    retarget_jmp(func, prev_block, header);
    true
}

/// Clones `source`'s non-terminator, non-increment instructions into a
/// fresh block appended to the function, remapping any intra-copy
/// operand references through an old id to new id map.
fn clone_block_without_increment(func: &mut Function, source: BlockId, induction_var: Symbol) -> BlockId {
    let new_block = func.blocks.push(crate::ir::BasicBlock::default());
    let source_ids = func.blocks[source].instructions.clone();
    let mut remap: FxHashMap<InstId, InstId> = FxHashMap::default();

    for id in source_ids {
        let inst = func.insts[id].clone();
        if inst.opcode.is_terminator() {
            continue;
        }
        if inst.opcode == Opcode::Store
            && matches!(&inst.operands[1], Operand::Variable(v) if *v == induction_var)
        {
            continue; // the induction update itself was folded into the original
        }
        let remapped_operands: Vec<Operand> = inst
            .operands
            .iter()
            .map(|op| match op {
                Operand::Inst(old) => Operand::Inst(*remap.get(old).unwrap_or(old)),
                other => other.clone(),
            })
            .collect();
        let new_id = func.insts.push(Instruction::new(inst.opcode, remapped_operands.clone(), inst.ty, new_block));
        for op in &remapped_operands {
            if let Operand::Inst(target) = op {
                func.insts[*target].users.insert(new_id);
            }
        }
        remap.insert(id, new_id);
        func.blocks[new_block].instructions.push(new_id);
    }
    new_block
}

/// Replaces `from`'s trailing `JMP` (if any) with a jump to `to`,
/// appending one if the block had fallen off the end without one.
fn retarget_jmp(func: &mut Function, from: BlockId, to: BlockId) {
    if let Some(&last) = func.blocks[from].instructions.last() {
        if func.insts[last].opcode == Opcode::Jmp {
            func.insts[last].operands = vec![Operand::Label(to)];
            return;
        }
    }
    let id = func.insts.push(Instruction::new(Opcode::Jmp, vec![Operand::Label(to)], crate::ir::IrType::Void, from));
    func.blocks[from].instructions.push(id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::IrBuilder;
    use crate::ir::IrType;

    fn counted_loop(bound: i64, step: i64) -> Function {
        let mut func = Function::new(Symbol::intern("f"), Vec::new(), IrType::Void);
        let i = Symbol::intern("i$0");
        {
            let mut b = IrBuilder::new(&mut func);
            let entry = b.current_block();
            let header = b.new_block();
            let body = b.new_block();
            let end = b.new_block();

            b.switch_to_block(entry);
            b.push(Opcode::Alloca, vec![Operand::Variable(i)], IrType::Int);
            b.push(Opcode::Store, vec![Operand::Constant(Constant::Int(0)), Operand::Variable(i)], IrType::Void);
            b.jmp(header);

            b.switch_to_block(header);
            let cond = b.push(
                Opcode::Lt,
                vec![Operand::Variable(i), Operand::Constant(Constant::Int(bound))],
                IrType::Bool,
            );
            b.br(Operand::Inst(cond), body, end);

            b.switch_to_block(body);
            let add = b.push(
                Opcode::Add,
                vec![Operand::Variable(i), Operand::Constant(Constant::Int(step))],
                IrType::Int,
            );
            b.push(Opcode::Store, vec![Operand::Inst(add), Operand::Variable(i)], IrType::Void);
            b.jmp(header);

            b.switch_to_block(end);
            b.ret(None);
        }
        func
    }

    #[test]
    fn unrolls_a_countable_loop() {
        let mut func = counted_loop(10, 1);
        let changed = Unroll.run(&mut func, &OptConfig::default());
        assert!(changed);
        assert!(func.blocks.len() > 4); // original 4 blocks plus unrolled copies
    }

    #[test]
    fn leaves_a_short_trip_count_alone() {
        let mut func = counted_loop(2, 1);
        let changed = Unroll.run(&mut func, &OptConfig::default());
        assert!(!changed);
    }
}
