//! Common-subexpression elimination: within a block, redirect a
//! recomputation of an already-seen expression to the first instance.

use crate::ir::{BlockId, Constant, Function, InstId, Opcode, Operand};
use crate::optimize::{OptConfig, OptLevel, Pass};
use faxc_util::{FxHashMap, Symbol};

pub struct Cse;

impl Pass for Cse {
    fn name(&self) -> &'static str {
        "cse"
    }

    fn level(&self) -> OptLevel {
        OptLevel::O2
    }

    fn run(&self, func: &mut Function, _config: &OptConfig) -> bool {
        let mut changed = false;
        let block_ids: Vec<BlockId> = func.blocks.indices().collect();
        for block_id in block_ids {
            let ids = func.blocks[block_id].instructions.clone();
            let mut seen: FxHashMap<(Opcode, Vec<OperandKey>), InstId> = FxHashMap::default();
            let mut redundant = Vec::new();

            for id in ids {
                let inst = &func.insts[id];
                if !matches!(inst.opcode, Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div) {
                    continue;
                }
                let key = (inst.opcode, inst.operands.iter().map(operand_key).collect());
                if let Some(&first) = seen.get(&key) {
                    redirect_users(func, id, first);
                    redundant.push(id);
                } else {
                    seen.insert(key, id);
                }
            }

            if !redundant.is_empty() {
                func.blocks[block_id].instructions.retain(|id| !redundant.contains(id));
                changed = true;
            }
        }
        changed
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
enum OperandKey {
    Bool(bool),
    Int(i64),
    FloatBits(u64),
    Str(Symbol),
    Variable(Symbol),
    Inst(InstId),
    Label(BlockId),
}

fn operand_key(operand: &Operand) -> OperandKey {
    match operand {
        Operand::Constant(Constant::Bool(b)) => OperandKey::Bool(*b),
        Operand::Constant(Constant::Int(i)) => OperandKey::Int(*i),
        Operand::Constant(Constant::Float(x)) => OperandKey::FloatBits(x.to_bits()),
        Operand::Constant(Constant::Str(s)) => OperandKey::Str(*s),
        Operand::Variable(s) => OperandKey::Variable(*s),
        Operand::Inst(id) => OperandKey::Inst(*id),
        Operand::Label(b) => OperandKey::Label(*b),
    }
}

/// Points every user of `old` at `new` instead, merging the user sets.
fn redirect_users(func: &mut Function, old: InstId, new: InstId) {
    let users: Vec<InstId> = func.insts[old].users.iter().copied().collect();
    for user in users {
        for operand in &mut func.insts[user].operands {
            if let Operand::Inst(target) = operand {
                if *target == old {
                    *operand = Operand::Inst(new);
                }
            }
        }
        func.insts[new].users.insert(user);
    }
    func.insts[old].users.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::IrBuilder;
    use crate::ir::IrType;
    use faxc_util::Symbol as Sym;

    #[test]
    fn eliminates_a_recomputed_expression() {
        let mut func = Function::new(Sym::intern("f"), Vec::new(), IrType::Int);
        let x = Operand::Variable(Sym::intern("x"));
        let y = Operand::Variable(Sym::intern("y"));
        {
            let mut b = IrBuilder::new(&mut func);
            b.push(Opcode::Add, vec![x.clone(), y.clone()], IrType::Int);
            b.push(Opcode::Add, vec![x, y], IrType::Int);
            b.ret(None);
        }
        let changed = Cse.run(&mut func, &OptConfig::default());
        assert!(changed);
        assert_eq!(func.blocks[func.entry_block()].instructions.len(), 2); // first add + ret
    }
}
