//! Incremental construction of a [`Function`]'s arena and blocks, keeping
//! the `users` back-links consistent as instructions are appended.

use crate::ir::{BasicBlock, BlockId, Function, InstId, Instruction, IrType, Opcode, Operand};
use faxc_util::Idx;

pub struct IrBuilder<'f> {
    func: &'f mut Function,
    current: BlockId,
}

impl<'f> IrBuilder<'f> {
    pub fn new(func: &'f mut Function) -> Self {
        let current = func.blocks.push(BasicBlock::default());
        IrBuilder { func, current }
    }

    pub fn current_block(&self) -> BlockId {
        self.current
    }

    pub fn new_block(&mut self) -> BlockId {
        self.func.blocks.push(BasicBlock::default())
    }

    pub fn switch_to_block(&mut self, block: BlockId) {
        self.current = block;
    }

    /// Appends an instruction to the current block, registering it as a
    /// user of every operand that names another instruction.
    pub fn push(&mut self, opcode: Opcode, operands: Vec<Operand>, ty: IrType) -> InstId {
        let inst = Instruction::new(opcode, operands.clone(), ty, self.current);
        let id = self.func.insts.push(inst);
        self.func.blocks[self.current].instructions.push(id);
        for operand in &operands {
            if let Operand::Inst(used) = operand {
                self.func.insts[*used].users.insert(id);
            }
        }
        id
    }

    /// True if the current block already ends with a terminator.
    pub fn is_terminated(&self) -> bool {
        self.func
            .terminator(self.current)
            .map(|id| self.func.insts[id].opcode.is_terminator())
            .unwrap_or(false)
    }

    pub fn jmp(&mut self, target: BlockId) {
        if !self.is_terminated() {
            self.push(Opcode::Jmp, vec![Operand::Label(target)], IrType::Void);
        }
    }

    pub fn br(&mut self, cond: Operand, then_block: BlockId, else_block: BlockId) {
        if !self.is_terminated() {
            self.push(
                Opcode::Br,
                vec![cond, Operand::Label(then_block), Operand::Label(else_block)],
                IrType::Void,
            );
        }
    }

    pub fn ret(&mut self, value: Option<Operand>) {
        if !self.is_terminated() {
            let operands = value.into_iter().collect();
            self.push(Opcode::Ret, operands, IrType::Void);
        }
    }
}
