//! Dominators and natural-loop discovery over a function's CFG.
//!
//! `successors`/`predecessors` already live on [`Function`]; this module
//! builds the dominator relation and loop regions on top of those, for
//! the loop-aware passes (`licm`, `unroll`, `strength_reduction`) to
//! consume.

use crate::ir::{BlockId, Function};
use faxc_util::{FxHashMap, FxHashSet};

/// `doms[b]` is the set of blocks that dominate `b`, including `b` itself.
/// Computed by the textbook iterative dataflow fixpoint: the entry block
/// dominates only itself, and every other block is dominated by itself
/// plus whatever every one of its predecessors is dominated by.
pub fn dominators(func: &Function) -> FxHashMap<BlockId, FxHashSet<BlockId>> {
    let all_blocks: Vec<BlockId> = func.blocks.indices().collect();
    let entry = func.entry_block();
    let universe: FxHashSet<BlockId> = all_blocks.iter().copied().collect();

    let mut doms: FxHashMap<BlockId, FxHashSet<BlockId>> = FxHashMap::default();
    for &b in &all_blocks {
        let set = if b == entry {
            let mut s = FxHashSet::default();
            s.insert(entry);
            s
        } else {
            universe.clone()
        };
        doms.insert(b, set);
    }

    let mut changed = true;
    while changed {
        changed = false;
        for &b in &all_blocks {
            if b == entry {
                continue;
            }
            let preds = func.predecessors(b);
            let mut new_set = if preds.is_empty() {
                let mut s = FxHashSet::default();
                s.insert(b);
                s
            } else {
                let mut iter = preds.iter();
                let first = *iter.next().unwrap();
                let mut acc = doms[&first].clone();
                for &p in iter {
                    acc = acc.intersection(&doms[&p]).copied().collect();
                }
                acc.insert(b);
                acc
            };
            std::mem::swap(&mut new_set, doms.get_mut(&b).unwrap());
            if new_set != doms[&b] {
                changed = true;
            }
        }
    }
    doms
}

/// `a` dominates `b` iff `a` is in the set of blocks dominating `b`.
pub fn dominates(doms: &FxHashMap<BlockId, FxHashSet<BlockId>>, a: BlockId, b: BlockId) -> bool {
    doms.get(&b).map(|set| set.contains(&a)).unwrap_or(false)
}

/// A natural loop: the header plus every block from which the header is
/// reachable without leaving the region it dominates.
#[derive(Debug, Clone)]
pub struct NaturalLoop {
    pub header: BlockId,
    pub blocks: FxHashSet<BlockId>,
}

/// Discovers every natural loop in `func`. A block `H` is a loop header
/// iff some predecessor `P` it dominates forms a back edge `P -> H`; the
/// loop body is found by walking predecessors backward from `P` until
/// `H` is reached, per the worklist construction.
pub fn find_loops(func: &Function) -> Vec<NaturalLoop> {
    let doms = dominators(func);
    let mut by_header: FxHashMap<BlockId, FxHashSet<BlockId>> = FxHashMap::default();

    for header in func.blocks.indices() {
        for pred in func.predecessors(header) {
            if !dominates(&doms, header, pred) {
                continue;
            }
            let blocks = by_header.entry(header).or_insert_with(|| {
                let mut s = FxHashSet::default();
                s.insert(header);
                s
            });
            let mut worklist = vec![pred];
            while let Some(b) = worklist.pop() {
                if blocks.insert(b) {
                    for p in func.predecessors(b) {
                        if p != header {
                            worklist.push(p);
                        }
                    }
                }
            }
        }
    }

    by_header
        .into_iter()
        .map(|(header, blocks)| NaturalLoop { header, blocks })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::IrBuilder;
    use crate::ir::{IrType, Operand};
    use faxc_util::{Idx, Symbol};

    /// `while (true) {}`-shaped CFG: header branches to body or end, body
    /// jumps back to header. Header should dominate itself and body.
    fn while_loop_function() -> Function {
        let mut func = Function::new(Symbol::intern("f"), Vec::new(), IrType::Void);
        {
            let mut b = IrBuilder::new(&mut func);
            let header = b.current_block();
            let body = b.new_block();
            let end = b.new_block();
            b.switch_to_block(header);
            b.br(Operand::Constant(crate::ir::Constant::Bool(true)), body, end);
            b.switch_to_block(body);
            b.jmp(header);
            b.switch_to_block(end);
            b.ret(None);
        }
        func
    }

    #[test]
    fn header_dominates_itself_and_body() {
        let func = while_loop_function();
        let doms = dominators(&func);
        let header = func.entry_block();
        let body = BlockId::from_usize(1);
        assert!(dominates(&doms, header, header));
        assert!(dominates(&doms, header, body));
    }

    #[test]
    fn finds_the_single_natural_loop() {
        let func = while_loop_function();
        let loops = find_loops(&func);
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].header, func.entry_block());
        assert_eq!(loops[0].blocks.len(), 2);
    }
}
