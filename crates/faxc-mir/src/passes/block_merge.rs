//! Block merging: fold a block into its sole predecessor when neither
//! side has another edge to worry about.

use crate::ir::{Function, Opcode, Operand};
use crate::optimize::{OptConfig, OptLevel, Pass};
use faxc_util::Idx;

pub struct BlockMerge;

impl Pass for BlockMerge {
    fn name(&self) -> &'static str {
        "block_merge"
    }

    fn level(&self) -> OptLevel {
        OptLevel::O1
    }

    fn run(&self, func: &mut Function, _config: &OptConfig) -> bool {
        let mut changed = false;
        let block_ids: Vec<_> = func.blocks.indices().collect();
        for window in block_ids.windows(2) {
            let (a, b) = (window[0], window[1]);
            if merge_pair(func, a, b) {
                changed = true;
            }
        }
        changed
    }
}

/// Merges `b` into `a` if `a`'s only successor is `b`, `b`'s only
/// predecessor is `a`, and `a`'s terminator is an unconditional `JMP`
/// (never a conditional `BR`).
fn merge_pair(func: &mut Function, a: crate::ir::BlockId, b: crate::ir::BlockId) -> bool {
    if func.successors(a) != vec![b] {
        return false;
    }
    if func.predecessors(b) != vec![a] {
        return false;
    }
    let Some(term) = func.terminator(a) else {
        return false;
    };
    if func.insts[term].opcode != Opcode::Jmp {
        return false;
    }

    func.blocks[a].instructions.pop(); // drop A's trailing JMP

    let b_instructions = std::mem::take(&mut func.blocks[b].instructions);
    for &id in &b_instructions {
        func.insts[id].block = a;
    }
    func.blocks[a].instructions.extend(b_instructions);

    for inst in func.insts.iter_mut() {
        for operand in &mut inst.operands {
            if let Operand::Label(target) = operand {
                if *target == b {
                    *target = a;
                }
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::IrBuilder;
    use crate::ir::{Constant, IrType};
    use faxc_util::Symbol;

    #[test]
    fn merges_a_fallthrough_pair() {
        let mut func = Function::new(Symbol::intern("f"), Vec::new(), IrType::Void);
        {
            let mut b = IrBuilder::new(&mut func);
            let second = b.new_block();
            b.jmp(second);
            b.switch_to_block(second);
            b.push(
                crate::ir::Opcode::Add,
                vec![Operand::Constant(Constant::Int(1)), Operand::Constant(Constant::Int(2))],
                IrType::Int,
            );
            b.ret(None);
        }
        let changed = BlockMerge.run(&mut func, &OptConfig::default());
        assert!(changed);
        assert_eq!(func.blocks[func.entry_block()].instructions.len(), 2);
        assert!(func.blocks[crate::ir::BlockId::from_usize(1)].instructions.is_empty());
    }
}
