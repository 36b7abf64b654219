//! Constant folding: instructions over two integer constants are
//! replaced by the single computed constant.

use crate::ir::{Constant, Function, Opcode, Operand};
use crate::optimize::{OptConfig, OptLevel, Pass};

pub struct ConstFold;

impl Pass for ConstFold {
    fn name(&self) -> &'static str {
        "const_fold"
    }

    fn level(&self) -> OptLevel {
        OptLevel::O1
    }

    fn run(&self, func: &mut Function, _config: &OptConfig) -> bool {
        let mut changed = false;
        for inst in func.insts.iter_mut() {
            if !matches!(inst.opcode, Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div | Opcode::Mod) {
                continue;
            }
            let [ref a, ref b] = inst.operands[..] else {
                continue;
            };
            let (Operand::Constant(Constant::Int(x)), Operand::Constant(Constant::Int(y))) = (a, b) else {
                continue;
            };
            let (x, y) = (*x, *y);
            let folded = match inst.opcode {
                Opcode::Add => x.checked_add(y),
                Opcode::Sub => x.checked_sub(y),
                Opcode::Mul => x.checked_mul(y),
                Opcode::Div if y != 0 => x.checked_div(y),
                Opcode::Mod if y != 0 => x.checked_rem(y),
                _ => None,
            };
            if let Some(result) = folded {
                inst.operands = vec![Operand::Constant(Constant::Int(result))];
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
    use crate::ir::IrType;
    use faxc_util::Symbol;

    #[test]
    fn folds_two_integer_constants() {
        let mut func = Function::new(Symbol::intern("f"), Vec::new(), IrType::Int);
        {
            let mut b = IrBuilder::new(&mut func);
            b.push(
                Opcode::Add,
                vec![Operand::Constant(Constant::Int(2)), Operand::Constant(Constant::Int(3))],
                IrType::Int,
            );
        }
        let changed = ConstFold.run(&mut func, &OptConfig::default());
        assert!(changed);
        assert_eq!(func.insts[crate::ir::InstId(0)].operands, vec![Operand::Constant(Constant::Int(5))]);
    }

    #[test]
    fn does_not_fold_division_by_zero() {
        let mut func = Function::new(Symbol::intern("f"), Vec::new(), IrType::Int);
        {
            let mut b = IrBuilder::new(&mut func);
            b.push(
                Opcode::Div,
                vec![Operand::Constant(Constant::Int(1)), Operand::Constant(Constant::Int(0))],
                IrType::Int,
            );
        }
        let changed = ConstFold.run(&mut func, &OptConfig::default());
        assert!(!changed);
    }
}
