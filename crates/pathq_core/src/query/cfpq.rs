use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::automata::state::Value;
use crate::errors::QueryError;
use crate::grammar::cfg::{Cfg, Symbol};
use crate::graph::LabeledGraph;
use crate::matrix::SparseBitMatrix;
use crate::query::{hellings, matrix, tensor};

/// The algorithm evaluating a context-free path query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CfpqAlgorithm {
    /// Worklist fixpoint over `(u, N, v)` triples.
    Hellings,
    /// Per-nonterminal sparse matrix fixpoint.
    Matrix,
    /// Kronecker product of the grammar's RSM with the graph.
    Tensor,
}

/// A derivation fact: some `u → v` path derives from nonterminal `N`.
pub(crate) type Triple = (Value, String, Value);

/// Evaluates a context-free path query.
///
/// Returns the vertex pairs `(u, v)` such that some `u → v` path spells a
/// word derivable from `start_symbol`, restricted to the given start and
/// final vertex sets. Passing [`None`] for a vertex set means every vertex.
///
/// # Errors
///
/// Returns a [`QueryError`] if an internal matrix operation misbehaves.
pub fn cfpq(
    algo: CfpqAlgorithm,
    graph: &LabeledGraph,
    cfg: &Cfg,
    start_nodes: Option<&HashSet<Value>>,
    final_nodes: Option<&HashSet<Value>>,
    start_symbol: &str,
) -> Result<HashSet<(Value, Value)>, QueryError> {
    let cfg = cfg.with_start(start_symbol);
    debug!(?algo, start_symbol, nodes = graph.node_count(), "running cfpq");
    let triples = match algo {
        CfpqAlgorithm::Hellings => hellings::run(&cfg, graph),
        CfpqAlgorithm::Matrix => matrix::run::<SparseBitMatrix>(&cfg, graph)?,
        CfpqAlgorithm::Tensor => tensor::run::<SparseBitMatrix>(&cfg, graph)?,
    };
    Ok(triples
        .into_iter()
        .filter(|(from, head, to)| {
            head == start_symbol
                && start_nodes.is_none_or(|set| set.contains(from))
                && final_nodes.is_none_or(|set| set.contains(to))
        })
        .map(|(from, _, to)| (from, to))
        .collect())
}

/// The productions of a WCNF grammar, partitioned by body form.
pub(crate) struct WcnfParts {
    /// Heads with an ε body.
    pub eps_heads: IndexSet<String>,
    /// Head → terminals it derives directly.
    pub term_heads: IndexMap<String, IndexSet<String>>,
    /// Head → nonterminal pairs it derives.
    pub pair_heads: IndexMap<String, IndexSet<(String, String)>>,
}

impl WcnfParts {
    pub(crate) fn of(wcnf: &Cfg) -> Self {
        let mut eps_heads = IndexSet::new();
        let mut term_heads: IndexMap<String, IndexSet<String>> = IndexMap::new();
        let mut pair_heads: IndexMap<String, IndexSet<(String, String)>> = IndexMap::new();
        for production in wcnf.productions() {
            match production.body.as_slice() {
                [] => {
                    eps_heads.insert(production.head.clone());
                }
                [Symbol::Term(t)] => {
                    term_heads
                        .entry(production.head.clone())
                        .or_default()
                        .insert(t.clone());
                }
                [Symbol::Var(a), Symbol::Var(b)] => {
                    pair_heads
                        .entry(production.head.clone())
                        .or_default()
                        .insert((a.clone(), b.clone()));
                }
                other => unreachable!("non-WCNF body {other:?}"),
            }
        }
        Self {
            eps_heads,
            term_heads,
            pair_heads,
        }
    }

    /// Heads that derive `terminal` directly.
    pub(crate) fn heads_for_terminal<'a>(
        &'a self,
        terminal: &'a str,
    ) -> impl Iterator<Item = &'a String> {
        self.term_heads
            .iter()
            .filter(move |(_, terms)| terms.contains(terminal))
            .map(|(head, _)| head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::to_wcnf;

    #[test]
    fn test_wcnf_partition() {
        let cfg = Cfg::from_text("S ->\nS -> a S b | c", "S").unwrap();
        let parts = WcnfParts::of(&to_wcnf(&cfg));
        assert!(parts.eps_heads.contains("S"));
        let c_heads: Vec<_> = parts.heads_for_terminal("c").collect();
        assert_eq!(c_heads, [&"S".to_owned()]);
        assert!(!parts.pair_heads.is_empty());
    }
}
