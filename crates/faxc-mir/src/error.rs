//! IR error type: invariant violations during IR construction or
//! transformation. Unlike a [`faxc_sem::SemanticError`], one of these
//! always aborts the current pipeline — a malformed IR can't be
//! meaningfully optimized or lowered further.

use crate::ir::{BlockId, InstId};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IRError {
    #[error("function '{function}' block {block:?} has no terminator")]
    MissingTerminator { function: String, block: BlockId },

    #[error("instruction {inst:?} expected {expected} operands, found {found}")]
    OperandCountMismatch {
        inst: InstId,
        expected: usize,
        found: usize,
    },

    #[error("dangling reference to {inst:?}")]
    DanglingReference { inst: InstId },

    #[error("block {block:?} referenced but not present in the function")]
    DanglingBlock { block: BlockId },
}
