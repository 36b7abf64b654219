//! The pass manager: an ordered list of passes gated by optimization
//! level, iterated to a fixpoint.

use crate::ir::{Function, Module};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum OptLevel {
    #[default]
    O0,
    O1,
    O2,
    O3,
}

/// Tunables the trip-count-sensitive passes (`unroll`, `strength_reduction`)
/// and the fixpoint loop itself read.
#[derive(Debug, Clone, Copy)]
pub struct OptConfig {
    pub level: OptLevel,
    pub max_iterations: usize,
    pub unroll_factor: usize,
}

impl Default for OptConfig {
    fn default() -> Self {
        OptConfig {
            level: OptLevel::O0,
            max_iterations: 100,
            unroll_factor: 4,
        }
    }
}

/// One optimization pass, operating on a single function. A pass that
/// cannot safely complete (a structural precondition fails) must leave
/// the function unchanged and return `false` rather than partially
/// apply itself.
pub trait Pass {
    fn name(&self) -> &'static str;
    fn level(&self) -> OptLevel;
    fn run(&self, func: &mut Function, config: &OptConfig) -> bool;
}

pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    pub fn new() -> Self {
        PassManager {
            passes: vec![
                Box::new(crate::passes::const_fold::ConstFold),
                Box::new(crate::passes::dce::Dce),
                Box::new(crate::passes::block_merge::BlockMerge),
                Box::new(crate::passes::cse::Cse),
                Box::new(crate::passes::licm::Licm),
                Box::new(crate::passes::unroll::Unroll),
                Box::new(crate::passes::strength_reduction::StrengthReduction),
            ],
        }
    }

    /// Runs every selected pass (`pass.level() <= config.level`) against
    /// `func` once per iteration, looping until a full iteration makes no
    /// change or `config.max_iterations` is reached. Returns whether any
    /// change occurred across the whole run.
    pub fn run_optimizations(&self, func: &mut Function, config: &OptConfig) -> bool {
        let selected: Vec<&Box<dyn Pass>> =
            self.passes.iter().filter(|p| p.level() <= config.level).collect();
        let mut any_change = false;
        for iteration in 0..config.max_iterations {
            let mut changed = false;
            for pass in &selected {
                if pass.run(func, config) {
                    changed = true;
                    debug!("{} modified {} on iteration {iteration}", pass.name(), func.name.as_str());
                }
            }
            if !changed {
                break;
            }
            any_change = true;
        }
        any_change
    }

    pub fn run_on_module(&self, module: &mut Module, config: &OptConfig) -> bool {
        let mut any_change = false;
        for func in &mut module.functions {
            if self.run_optimizations(func, config) {
                any_change = true;
            }
        }
        any_change
    }
}

impl Default for PassManager {
    fn default() -> Self {
        PassManager::new()
    }
}
