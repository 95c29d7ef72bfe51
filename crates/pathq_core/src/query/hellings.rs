use std::collections::{HashSet, VecDeque};

use tracing::debug;

use crate::grammar::cfg::Cfg;
use crate::grammar::to_wcnf;
use crate::graph::LabeledGraph;
use crate::query::cfpq::{Triple, WcnfParts};

/// Runs the Hellings worklist algorithm over the graph and grammar.
///
/// Seeds derivation triples from ε and terminal productions, then joins
/// triples pairwise along shared endpoints until the set stops growing.
pub(crate) fn run(cfg: &Cfg, graph: &LabeledGraph) -> HashSet<Triple> {
    if graph.node_count() == 0 {
        return HashSet::new();
    }

    let parts = WcnfParts::of(&to_wcnf(cfg));

    let mut result: HashSet<Triple> = HashSet::new();
    for node in graph.nodes() {
        for head in &parts.eps_heads {
            result.insert((node.clone(), head.clone(), node.clone()));
        }
    }
    for (from, label, to) in graph.edges() {
        for head in parts.heads_for_terminal(label) {
            result.insert((from.clone(), head.clone(), to.clone()));
        }
    }

    let mut worklist: VecDeque<Triple> = result.iter().cloned().collect();
    while let Some((i, n1, j)) = worklist.pop_front() {
        let mut to_add: HashSet<Triple> = HashSet::new();
        for (k, n2, l) in &result {
            // (k, N₂, i) joined with the popped (i, N₁, j).
            if *l == i {
                for (head, pairs) in &parts.pair_heads {
                    if pairs.contains(&(n2.clone(), n1.clone())) {
                        let candidate = (k.clone(), head.clone(), j.clone());
                        if !result.contains(&candidate) && to_add.insert(candidate.clone()) {
                            worklist.push_back(candidate);
                        }
                    }
                }
            }
            // The popped (i, N₁, j) joined with (j, N₂, l).
            if j == *k {
                for (head, pairs) in &parts.pair_heads {
                    if pairs.contains(&(n1.clone(), n2.clone())) {
                        let candidate = (i.clone(), head.clone(), l.clone());
                        if !result.contains(&candidate) && to_add.insert(candidate.clone()) {
                            worklist.push_back(candidate);
                        }
                    }
                }
            }
        }
        result.extend(to_add);
    }

    debug!(triples = result.len(), "hellings fixpoint reached");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automata::state::Value;

    #[test]
    fn test_balanced_brackets_on_a_chain() {
        let mut graph = LabeledGraph::new();
        graph.add_edge(0, "a", 1);
        graph.add_edge(1, "a", 2);
        graph.add_edge(2, "b", 3);
        graph.add_edge(3, "b", 4);
        let cfg = Cfg::from_text("S -> a S b | a b", "S").unwrap();

        let triples = run(&cfg, &graph);
        let s_pairs: HashSet<(Value, Value)> = triples
            .into_iter()
            .filter(|(_, head, _)| head == "S")
            .map(|(from, _, to)| (from, to))
            .collect();
        let expected: HashSet<(Value, Value)> =
            [(Value::Int(1), Value::Int(3)), (Value::Int(0), Value::Int(4))].into();
        assert_eq!(s_pairs, expected);
    }

    #[test]
    fn test_epsilon_only_grammar_yields_diagonal() {
        let mut graph = LabeledGraph::new();
        graph.add_edge(0, "a", 1);
        let cfg = Cfg::from_text("S ->", "S").unwrap();
        let triples = run(&cfg, &graph);
        let expected: HashSet<Triple> = [
            (Value::Int(0), "S".to_owned(), Value::Int(0)),
            (Value::Int(1), "S".to_owned(), Value::Int(1)),
        ]
        .into();
        assert_eq!(triples, expected);
    }

    #[test]
    fn test_empty_graph() {
        let cfg = Cfg::from_text("S -> a", "S").unwrap();
        assert!(run(&cfg, &LabeledGraph::new()).is_empty());
    }
}
