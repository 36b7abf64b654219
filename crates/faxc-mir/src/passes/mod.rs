//! The concrete optimization passes, one module each.

pub mod block_merge;
pub mod const_fold;
pub mod cse;
pub mod dce;
pub mod licm;
pub mod strength_reduction;
pub mod unroll;
