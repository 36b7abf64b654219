//! Loop-invariant code motion: hoist instructions whose operands never
//! change across loop iterations into a synthesized pre-header.

use crate::cfg::find_loops;
use crate::ir::{BasicBlock, Function, InstId, Opcode, Operand};
use crate::optimize::{OptConfig, OptLevel, Pass};
use faxc_util::FxHashSet;

pub struct Licm;

impl Pass for Licm {
    fn name(&self) -> &'static str {
        "licm"
    }

    fn level(&self) -> OptLevel {
        OptLevel::O2
    }

    fn run(&self, func: &mut Function, _config: &OptConfig) -> bool {
        let loops = find_loops(func);
        let mut changed = false;
        for lp in loops {
            if hoist(func, &lp.header, &lp.blocks) {
                changed = true;
            }
        }
        changed
    }
}

fn is_invariant(func: &Function, id: InstId, loop_blocks: &FxHashSet<crate::ir::BlockId>, invariant: &FxHashSet<InstId>) -> bool {
    let inst = &func.insts[id];
    if inst.opcode.has_side_effects() {
        return false;
    }
    inst.operands.iter().all(|operand| match operand {
        Operand::Inst(def) => !loop_blocks.contains(&func.insts[*def].block) || invariant.contains(def),
        _ => true,
    })
}

fn hoist(func: &mut Function, header: &crate::ir::BlockId, loop_blocks: &FxHashSet<crate::ir::BlockId>) -> bool {
    let preds = func.predecessors(*header);
    let outside_preds: Vec<_> = preds.iter().copied().filter(|p| !loop_blocks.contains(p)).collect();
    if outside_preds.is_empty() {
        // The header is unreachable from outside the loop (it's the
        // function entry, or every predecessor is a back edge); there's
        // nowhere structurally sound to redirect a pre-header from.
        return false;
    }

    let mut invariant: FxHashSet<InstId> = FxHashSet::default();
    let mut order = Vec::new();
    loop {
        let mut found_new = false;
        for &block in loop_blocks {
            for &id in &func.blocks[block].instructions {
                if !invariant.contains(&id) && is_invariant(func, id, loop_blocks, &invariant) {
                    invariant.insert(id);
                    order.push(id);
                    found_new = true;
                }
            }
        }
        if !found_new {
            break;
        }
    }
    if invariant.is_empty() {
        return false;
    }

    let preheader = func.blocks.push(BasicBlock::default());
    for p in outside_preds {
        for inst_id in func.blocks[p].instructions.clone() {
            for operand in &mut func.insts[inst_id].operands {
                if let Operand::Label(target) = operand {
                    if *target == *header {
                        *operand = Operand::Label(preheader);
                    }
                }
            }
        }
    }

    for &id in &order {
        if let Some(pos) = func.blocks[func.insts[id].block].instructions.iter().position(|x| *x == id) {
            func.blocks[func.insts[id].block].instructions.remove(pos);
        }
        func.insts[id].block = preheader;
        func.blocks[preheader].instructions.push(id);
    }
    let jmp = func.insts.push(crate::ir::Instruction::new(
        Opcode::Jmp,
        vec![Operand::Label(*header)],
        crate::ir::IrType::Void,
        preheader,
    ));
    func.blocks[preheader].instructions.push(jmp);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::IrBuilder;
    use crate::ir::{Constant, IrType};
    use faxc_util::{Idx, Symbol};

    #[test]
    fn hoists_an_invariant_computation_out_of_the_loop() {
        let mut func = Function::new(Symbol::intern("f"), Vec::new(), IrType::Void);
        {
            let mut b = IrBuilder::new(&mut func);
            let entry = b.current_block();
            let header = b.new_block();
            let body = b.new_block();
            let end = b.new_block();
            b.switch_to_block(entry);
            b.jmp(header);

            b.switch_to_block(header);
            b.br(Operand::Constant(Constant::Bool(true)), body, end);

            b.switch_to_block(body);
            b.push(
                Opcode::Add,
                vec![Operand::Constant(Constant::Int(1)), Operand::Constant(Constant::Int(2))],
                IrType::Int,
            );
            b.jmp(header);

            b.switch_to_block(end);
            b.ret(None);
        }
        let changed = Licm.run(&mut func, &OptConfig::default());
        assert!(changed);
        // A new pre-header block now exists, holding the hoisted add.
        let preheader = func.blocks.len() - 1;
        let preheader_id = crate::ir::BlockId::from_usize(preheader);
        assert_eq!(func.blocks[preheader_id].instructions.len(), 2); // hoisted add + jmp header
    }
}
