//! The IR entity model: module, function, basic block, instruction,
//! operand. Each function owns a single arena of instructions
//! (`IndexVec<InstId, Instruction>`); a basic block is just an ordered
//! list of `InstId`s into that arena, so an operand can reference an
//! instruction in any block of the same function without a block-local
//! index colliding with another block's.

use faxc_util::{define_idx, FxHashSet, Idx, IndexVec, Symbol};
use std::fmt;

define_idx!(BlockId);
define_idx!(InstId);

/// The type an [`Operand`] or instruction result carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IrType {
    Void,
    Bool,
    Int,
    Float,
    String,
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IrType::Void => "void",
            IrType::Bool => "bool",
            IrType::Int => "int",
            IrType::Float => "float",
            IrType::String => "string",
        };
        write!(f, "{s}")
    }
}

/// A compile-time constant value.
#[derive(Clone, Debug, PartialEq)]
pub enum Constant {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Symbol),
}

impl Constant {
    pub fn ty(&self) -> IrType {
        match self {
            Constant::Bool(_) => IrType::Bool,
            Constant::Int(_) => IrType::Int,
            Constant::Float(_) => IrType::Float,
            Constant::Str(_) => IrType::String,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Bool(b) => write!(f, "{b}"),
            Constant::Int(i) => write!(f, "{i}"),
            Constant::Float(x) => write!(f, "{x}"),
            Constant::Str(s) => write!(f, "{:?}", s.as_str()),
        }
    }
}

/// One opcode per §6.2's normative list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Neg,
    And,
    Or,
    Xor,
    Not,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Br,
    Jmp,
    Ret,
    Call,
    Alloca,
    Load,
    Store,
    Cast,
    Phi,
    Nop,
}

impl Opcode {
    /// Opcodes with side effects: an instruction carrying one of these is
    /// always live and is never loop-invariant.
    pub fn has_side_effects(self) -> bool {
        matches!(
            self,
            Opcode::Store | Opcode::Call | Opcode::Br | Opcode::Jmp | Opcode::Ret
        )
    }

    /// Opcodes that make an instruction live by themselves, independent of
    /// whether anything uses its result.
    pub fn is_always_live(self) -> bool {
        matches!(
            self,
            Opcode::Store | Opcode::Call | Opcode::Ret | Opcode::Br | Opcode::Jmp
        )
    }

    pub fn is_terminator(self) -> bool {
        matches!(self, Opcode::Br | Opcode::Jmp | Opcode::Ret)
    }

    pub fn is_commutative_arith(self) -> bool {
        matches!(self, Opcode::Add | Opcode::Mul)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Mod => "MOD",
            Opcode::Neg => "NEG",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Xor => "XOR",
            Opcode::Not => "NOT",
            Opcode::Shl => "SHL",
            Opcode::Shr => "SHR",
            Opcode::Eq => "EQ",
            Opcode::Ne => "NE",
            Opcode::Lt => "LT",
            Opcode::Le => "LE",
            Opcode::Gt => "GT",
            Opcode::Ge => "GE",
            Opcode::Br => "BR",
            Opcode::Jmp => "JMP",
            Opcode::Ret => "RET",
            Opcode::Call => "CALL",
            Opcode::Alloca => "ALLOCA",
            Opcode::Load => "LOAD",
            Opcode::Store => "STORE",
            Opcode::Cast => "CAST",
            Opcode::Phi => "PHI",
            Opcode::Nop => "NOP",
        };
        write!(f, "{s}")
    }
}

/// One operand of an instruction.
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Constant(Constant),
    Variable(Symbol),
    Label(BlockId),
    Inst(InstId),
}

impl Operand {
    pub fn as_inst(&self) -> Option<InstId> {
        match self {
            Operand::Inst(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<&Constant> {
        match self {
            Operand::Constant(c) => Some(c),
            _ => None,
        }
    }
}

/// A single IR instruction: an opcode applied to an ordered operand list.
/// `users` tracks every instruction that references this one as an
/// operand, kept in sync by [`crate::builder::IrBuilder`] and every
/// optimization pass that rewrites operands.
#[derive(Clone, Debug)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operands: Vec<Operand>,
    pub ty: IrType,
    pub block: BlockId,
    pub users: FxHashSet<InstId>,
}

impl Instruction {
    pub fn new(opcode: Opcode, operands: Vec<Operand>, ty: IrType, block: BlockId) -> Self {
        Instruction {
            opcode,
            operands,
            ty,
            block,
            users: FxHashSet::default(),
        }
    }
}

/// An ordered list of instruction ids. Exposes successors/predecessors
/// derived from its terminator; a block is responsible for labelling
/// itself via its [`BlockId`].
#[derive(Clone, Debug, Default)]
pub struct BasicBlock {
    pub instructions: Vec<InstId>,
}

/// Owns every instruction in the function (the arena) plus the list of
/// blocks, each of which is just an ordered view into that arena.
#[derive(Clone, Debug)]
pub struct Function {
    pub name: Symbol,
    pub params: Vec<(Symbol, IrType)>,
    pub ret_ty: IrType,
    pub insts: IndexVec<InstId, Instruction>,
    pub blocks: IndexVec<BlockId, BasicBlock>,
}

impl Function {
    pub fn new(name: Symbol, params: Vec<(Symbol, IrType)>, ret_ty: IrType) -> Self {
        Function {
            name,
            params,
            ret_ty,
            insts: IndexVec::new(),
            blocks: IndexVec::new(),
        }
    }

    pub fn entry_block(&self) -> BlockId {
        BlockId::from_usize(0)
    }

    pub fn terminator(&self, block: BlockId) -> Option<InstId> {
        self.blocks[block].instructions.last().copied()
    }

    /// Successor blocks derived from `block`'s terminator.
    pub fn successors(&self, block: BlockId) -> Vec<BlockId> {
        let Some(term) = self.terminator(block) else {
            return Vec::new();
        };
        let inst = &self.insts[term];
        match inst.opcode {
            Opcode::Jmp => inst
                .operands
                .iter()
                .filter_map(|op| match op {
                    Operand::Label(b) => Some(*b),
                    _ => None,
                })
                .collect(),
            Opcode::Br => inst
                .operands
                .iter()
                .skip(1)
                .filter_map(|op| match op {
                    Operand::Label(b) => Some(*b),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Predecessor blocks of `target`, computed by scanning every block's
    /// terminator (back-pointers aren't stored, since blocks can be
    /// inserted/removed by optimization passes).
    pub fn predecessors(&self, target: BlockId) -> Vec<BlockId> {
        self.blocks
            .indices()
            .filter(|&b| self.successors(b).contains(&target))
            .collect()
    }

    pub fn all_inst_ids(&self) -> Vec<InstId> {
        self.blocks
            .iter()
            .flat_map(|b| b.instructions.iter().copied())
            .collect()
    }
}

/// A set of functions sharing a name. String/constant pools are future
/// work, not required by the core optimizer.
#[derive(Clone, Debug, Default)]
pub struct Module {
    pub functions: Vec<Function>,
}

impl Module {
    pub fn new() -> Self {
        Module::default()
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for func in &self.functions {
            write_function(f, func)?;
        }
        Ok(())
    }
}

fn write_function(f: &mut fmt::Formatter<'_>, func: &Function) -> fmt::Result {
    writeln!(f, "function {} {{", func.name.as_str())?;
    for (block_id, block) in func.blocks.iter_enumerated() {
        writeln!(f, "block_{}:", block_id.index())?;
        for &inst_id in &block.instructions {
            let inst = &func.insts[inst_id];
            write!(f, "  %{} = {}", inst_id.index(), inst.opcode)?;
            for (i, operand) in inst.operands.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, " {}", display_operand(operand))?;
            }
            writeln!(f)?;
        }
    }
    writeln!(f, "}}")
}

fn display_operand(operand: &Operand) -> String {
    match operand {
        Operand::Constant(c) => c.to_string(),
        Operand::Variable(s) => format!("%{}", s.as_str()),
        Operand::Label(b) => format!("block_{}", b.index()),
        Operand::Inst(id) => format!("%{}", id.index()),
    }
}
