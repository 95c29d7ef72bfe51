use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::debug;

use crate::errors::ShapeError;
use crate::grammar::cfg::Cfg;
use crate::grammar::to_wcnf;
use crate::graph::LabeledGraph;
use crate::matrix::BoolMatrix;
use crate::query::cfpq::{Triple, WcnfParts};

/// Runs the matrix CFPQ algorithm: one `n × n` boolean matrix per WCNF
/// nonterminal, swept with `M[A] ∨= M[B] · M[C]` for every `A → B C` until
/// no matrix gains an entry.
pub(crate) fn run<M: BoolMatrix>(
    cfg: &Cfg,
    graph: &LabeledGraph,
) -> Result<HashSet<Triple>, ShapeError> {
    let n = graph.node_count();
    if n == 0 {
        return Ok(HashSet::new());
    }

    let wcnf = to_wcnf(cfg);
    let parts = WcnfParts::of(&wcnf);
    let nodes: Vec<_> = graph.nodes().cloned().collect();

    let mut mats: IndexMap<String, M> = wcnf
        .variables()
        .into_iter()
        .map(|var| (var, M::zeros(n, n)))
        .collect();

    for head in &parts.eps_heads {
        for i in 0..n {
            mats[head].set(i, i);
        }
    }
    for (from, label, to) in graph.edges() {
        let i = graph.index_of(from).expect("edge endpoint is a graph node");
        let j = graph.index_of(to).expect("edge endpoint is a graph node");
        for head in parts.heads_for_terminal(label) {
            mats[head].set(i, j);
        }
    }

    let mut sweeps = 0usize;
    loop {
        sweeps += 1;
        let mut changed = false;
        for (head, pairs) in &parts.pair_heads {
            let before = mats[head].nnz();
            let mut delta = M::zeros(n, n);
            for (left, right) in pairs {
                delta = delta.or(&mats[left].mul(&mats[right])?)?;
            }
            let updated = mats[head].or(&delta)?;
            changed |= updated.nnz() != before;
            mats[head] = updated;
        }
        if !changed {
            break;
        }
    }
    debug!(sweeps, nonterminals = mats.len(), "matrix cfpq converged");

    let mut result = HashSet::new();
    for (head, mat) in &mats {
        for (i, j) in mat.nonzeros() {
            result.insert((nodes[i].clone(), head.clone(), nodes[j].clone()));
        }
    }
    Ok(result)
}
