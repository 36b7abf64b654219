//! faxc-mir — the IR model, HIR-to-IR lowering, and the optimizer.
//!
//! [`ir`] defines the module/function/block/instruction/operand types;
//! [`builder`] constructs them incrementally; [`lower`] turns a checked
//! program (`faxc_sem::hir`) into a [`Module`]; [`cfg`] computes
//! dominators and natural loops for the loop-aware passes; [`optimize`]
//! runs the ordered pass list in [`passes`] to a fixpoint.

pub mod builder;
pub mod cfg;
pub mod error;
pub mod ir;
pub mod lower;
pub mod optimize;
pub mod passes;

pub use error::IRError;
pub use ir::{BasicBlock, BlockId, Constant, Function, InstId, Instruction, IrType, Module, Opcode, Operand};
pub use lower::lower_program;
pub use optimize::{OptConfig, OptLevel, Pass, PassManager};

use faxc_sem::hir::HirStmt;

/// Lowers a checked program and optimizes every function in it at the
/// given level. The convenience entry point the driver calls.
pub fn lower_and_optimize(hir: &[HirStmt], config: &OptConfig) -> Module {
    let mut module = lower_program(hir);
    let manager = PassManager::new();
    manager.run_on_module(&mut module, config);
    module
}

#[cfg(test)]
mod tests;
