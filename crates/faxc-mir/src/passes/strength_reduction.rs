//! Strength reduction: replace `i * f` inside a loop (where `f` is
//! loop-invariant) with an accumulator `s` updated by `c * f` alongside
//! the induction variable's own `i = i + c` step, trading a multiply per
//! iteration for an add.

use crate::cfg::find_loops;
use crate::ir::{BasicBlock, BlockId, Constant, Function, InstId, Instruction, IrType, Opcode, Operand};
use crate::optimize::{OptConfig, OptLevel, Pass};
use crate::passes::unroll::{body_block_of, find_induction};
use faxc_util::{Idx, Symbol};

pub struct StrengthReduction;

impl Pass for StrengthReduction {
    fn name(&self) -> &'static str {
        "strength_reduction"
    }

    fn level(&self) -> OptLevel {
        OptLevel::O3
    }

    fn run(&self, func: &mut Function, _config: &OptConfig) -> bool {
        let loops = find_loops(func);
        let mut changed = false;
        for lp in loops {
            if lp.blocks.len() != 2 {
                continue;
            }
            let Some(body) = body_block_of(lp.header, &lp.blocks) else {
                continue;
            };
            let Some(ind) = find_induction(func, lp.header, body) else {
                continue;
            };
            if reduce_one(func, lp.header, body, &ind) {
                changed = true;
            }
        }
        changed
    }
}

/// Finds the first `MUL` in `body` whose operands are the induction
/// variable and a loop-invariant operand, and rewrites it. Only one
/// multiply is reduced per call; the fixpoint loop in the pass manager
/// calls this again for any remaining candidates.
fn reduce_one(func: &mut Function, header: BlockId, body: BlockId, ind: &crate::passes::unroll::Induction) -> bool {
    let Some((mul_id, factor)) = find_candidate_multiply(func, body, ind.var, &lp_blocks(header, body)) else {
        return false;
    };

    let Some(preheader) = ensure_preheader(func, header, body) else {
        return false;
    };

    let s = Symbol::intern(&format!("sr${}", mul_id.index()));
    push(func, preheader, Opcode::Alloca, vec![Operand::Variable(s)], IrType::Int);
    let init_mul = push(
        func,
        preheader,
        Opcode::Mul,
        vec![Operand::Constant(Constant::Int(ind.init)), factor.clone()],
        IrType::Int,
    );
    push(func, preheader, Opcode::Store, vec![Operand::Inst(init_mul), Operand::Variable(s)], IrType::Void);

    let step_mul = push(
        func,
        body,
        Opcode::Mul,
        vec![Operand::Constant(Constant::Int(ind.step)), factor],
        IrType::Int,
    );
    let add = push(func, body, Opcode::Add, vec![Operand::Variable(s), Operand::Inst(step_mul)], IrType::Int);
    push(func, body, Opcode::Store, vec![Operand::Inst(add), Operand::Variable(s)], IrType::Void);

    redirect_to_variable(func, mul_id, s);
    func.blocks[body].instructions.retain(|&id| id != mul_id);
    true
}

fn lp_blocks(header: BlockId, body: BlockId) -> faxc_util::FxHashSet<BlockId> {
    let mut s = faxc_util::FxHashSet::default();
    s.insert(header);
    s.insert(body);
    s
}

fn find_candidate_multiply(
    func: &Function,
    body: BlockId,
    induction_var: Symbol,
    loop_blocks: &faxc_util::FxHashSet<BlockId>,
) -> Option<(InstId, Operand)> {
    for &id in &func.blocks[body].instructions {
        let inst = &func.insts[id];
        if inst.opcode != Opcode::Mul {
            continue;
        }
        let [ref a, ref b] = inst.operands[..] else {
            continue;
        };
        let factor = match (a, b) {
            (Operand::Variable(v), other) if *v == induction_var && is_invariant_operand(func, other, loop_blocks) => {
                other.clone()
            }
            (other, Operand::Variable(v)) if *v == induction_var && is_invariant_operand(func, other, loop_blocks) => {
                other.clone()
            }
            _ => continue,
        };
        return Some((id, factor));
    }
    None
}

fn is_invariant_operand(func: &Function, operand: &Operand, loop_blocks: &faxc_util::FxHashSet<BlockId>) -> bool {
    match operand {
        Operand::Constant(_) | Operand::Variable(_) => true,
        Operand::Inst(id) => !loop_blocks.contains(&func.insts[*id].block),
        Operand::Label(_) => false,
    }
}

/// Creates (or reuses, if one already sits immediately before `header`
/// in predecessor order) a pre-header block for `header`, as in `licm`.
fn ensure_preheader(func: &mut Function, header: BlockId, body: BlockId) -> Option<BlockId> {
    let outside_preds: Vec<BlockId> = func.predecessors(header).into_iter().filter(|&p| p != body).collect();
    if outside_preds.len() == 1 {
        let candidate = outside_preds[0];
        let only_jumps_to_header = func.successors(candidate) == vec![header];
        if only_jumps_to_header && func.predecessors(candidate).len() <= 1 {
            return Some(candidate);
        }
    }
    if outside_preds.is_empty() {
        return None;
    }

    let preheader = func.blocks.push(BasicBlock::default());
    for p in outside_preds {
        for inst_id in func.blocks[p].instructions.clone() {
            for operand in &mut func.insts[inst_id].operands {
                if let Operand::Label(target) = operand {
                    if *target == header {
                        *operand = Operand::Label(preheader);
                    }
                }
            }
        }
    }
    let jmp = func.insts.push(Instruction::new(Opcode::Jmp, vec![Operand::Label(header)], IrType::Void, preheader));
    func.blocks[preheader].instructions.push(jmp);
    Some(preheader)
}

/// Appends a new instruction to `block`, just before its terminator if
/// it has one.
fn push(func: &mut Function, block: BlockId, opcode: Opcode, operands: Vec<Operand>, ty: IrType) -> InstId {
    let id = func.insts.push(Instruction::new(opcode, operands.clone(), ty, block));
    for operand in &operands {
        if let Operand::Inst(used) = operand {
            func.insts[*used].users.insert(id);
        }
    }
    let insts = &mut func.blocks[block].instructions;
    let has_terminator = insts.last().map(|&last| func.insts[last].opcode.is_terminator()).unwrap_or(false);
    if has_terminator {
        let pos = insts.len() - 1;
        insts.insert(pos, id);
    } else {
        insts.push(id);
    }
    id
}

fn redirect_to_variable(func: &mut Function, old: InstId, new: Symbol) {
    let users: Vec<InstId> = func.insts[old].users.iter().copied().collect();
    for user in users {
        for operand in &mut func.insts[user].operands {
            if let Operand::Inst(target) = operand {
                if *target == old {
                    *operand = Operand::Variable(new);
                }
            }
        }
    }
    func.insts[old].users.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::IrBuilder;

    #[test]
    fn replaces_induction_multiply_with_an_accumulator() {
        let mut func = Function::new(Symbol::intern("f"), Vec::new(), IrType::Void);
        let i = Symbol::intern("i$0");
        let f = Symbol::intern("f$1");
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
                vec![Operand::Variable(i), Operand::Constant(Constant::Int(10))],
                IrType::Bool,
            );
            b.br(Operand::Inst(cond), body, end);

            b.switch_to_block(body);
            let mul = b.push(Opcode::Mul, vec![Operand::Variable(i), Operand::Variable(f)], IrType::Int);
            b.push(Opcode::Store, vec![Operand::Inst(mul), Operand::Variable(Symbol::intern("m$2"))], IrType::Void);
            let add = b.push(Opcode::Add, vec![Operand::Variable(i), Operand::Constant(Constant::Int(1))], IrType::Int);
            b.push(Opcode::Store, vec![Operand::Inst(add), Operand::Variable(i)], IrType::Void);
            b.jmp(header);

            b.switch_to_block(end);
            b.ret(None);
        }
        let changed = StrengthReduction.run(&mut func, &OptConfig::default());
        assert!(changed);
    }
}
