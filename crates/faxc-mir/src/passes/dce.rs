//! Dead-code elimination: drop instructions nothing needs.

use crate::ir::Function;
use crate::optimize::{OptConfig, OptLevel, Pass};
use faxc_util::FxHashSet;

pub struct Dce;

impl Pass for Dce {
    fn name(&self) -> &'static str {
        "dce"
    }

    fn level(&self) -> OptLevel {
        OptLevel::O1
    }

    fn run(&self, func: &mut Function, _config: &OptConfig) -> bool {
        let mut live = FxHashSet::default();

        // Bottom-up per block: an instruction is live if its opcode always
        // is, or at least one of its users in the same block is already
        // marked live (reverse order means every later use has already
        // been decided by the time we reach its definition).
        for block in func.blocks.iter() {
            for &id in block.instructions.iter().rev() {
                let inst = &func.insts[id];
                let has_live_user_in_block = inst
                    .users
                    .iter()
                    .any(|u| live.contains(u) && func.insts[*u].block == inst.block);
                if inst.opcode.is_always_live() || has_live_user_in_block {
                    live.insert(id);
                }
            }
        }

        // Transitively keep whatever a live instruction's operands are
        // defined by, however far that chain runs (possibly into other
        // blocks, for a `PHI`'s incoming values).
        let mut worklist: Vec<_> = live.iter().copied().collect();
        while let Some(id) = worklist.pop() {
            let operands = func.insts[id].operands.clone();
            for operand in operands {
                if let Some(def) = operand.as_inst() {
                    if live.insert(def) {
                        worklist.push(def);
                    }
                }
            }
        }

        let mut changed = false;
        for block in func.blocks.iter_mut() {
            let terminator = block.instructions.last().copied();
            let before = block.instructions.len();
            block.instructions.retain(|id| live.contains(id) || Some(*id) == terminator);
            if block.instructions.len() != before {
                changed = true;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::IrBuilder;
    use crate::ir::{Constant, IrType, Opcode, Operand};
    use faxc_util::Symbol;

    #[test]
    fn removes_instruction_with_no_users() {
        let mut func = Function::new(Symbol::intern("f"), Vec::new(), IrType::Void);
        {
            let mut b = IrBuilder::new(&mut func);
            b.push(
                Opcode::Add,
                vec![Operand::Constant(Constant::Int(1)), Operand::Constant(Constant::Int(2))],
                IrType::Int,
            );
            b.ret(None);
        }
        let changed = Dce.run(&mut func, &OptConfig::default());
        assert!(changed);
        assert_eq!(func.blocks[func.entry_block()].instructions.len(), 1);
    }

    #[test]
    fn keeps_a_store_even_with_no_users() {
        let mut func = Function::new(Symbol::intern("f"), Vec::new(), IrType::Void);
        {
            let mut b = IrBuilder::new(&mut func);
            b.push(
                Opcode::Store,
                vec![Operand::Constant(Constant::Int(1)), Operand::Variable(Symbol::intern("x"))],
                IrType::Void,
            );
            b.ret(None);
        }
        let changed = Dce.run(&mut func, &OptConfig::default());
        assert!(!changed);
        assert_eq!(func.blocks[func.entry_block()].instructions.len(), 2);
    }
}
