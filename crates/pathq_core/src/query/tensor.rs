use std::collections::HashSet;

use tracing::debug;

use crate::automata::bool_matrix::BoolMatrixAutomaton;
use crate::automata::state::{Label, Value};
use crate::errors::ShapeError;
use crate::grammar::Ecfg;
use crate::grammar::cfg::Cfg;
use crate::graph::LabeledGraph;
use crate::matrix::BoolMatrix;
use crate::query::cfpq::Triple;

/// Runs the tensor CFPQ algorithm.
///
/// The grammar's RSM and the graph are both held as boolean-matrix automata.
/// Each round intersects them, takes the transitive closure of the product,
/// and turns every closure edge between a box start and a box final state
/// into a new graph edge labeled with that box's nonterminal. Nullable
/// nonterminals seed reflexive edges up front. The loop stops when the
/// closure's nonzero count stops changing.
pub(crate) fn run<M: BoolMatrix>(
    cfg: &Cfg,
    graph: &LabeledGraph,
) -> Result<HashSet<Triple>, ShapeError> {
    if graph.node_count() == 0 {
        return Ok(HashSet::new());
    }

    let machine: BoolMatrixAutomaton<M> =
        BoolMatrixAutomaton::from_rsm(&Ecfg::from_cfg(cfg).to_rsm());
    let mut graph_bm: BoolMatrixAutomaton<M> =
        BoolMatrixAutomaton::from_nfa(&graph.to_epsilon_nfa(None, None));
    let n = graph_bm.state_count();

    for var in cfg.nullables() {
        let mat = graph_bm.ensure_label(Label::sym(var));
        for i in 0..n {
            mat.set(i, i);
        }
    }

    let mut prev = None;
    loop {
        let product = machine.intersect(&graph_bm);
        let closure = product.transitive_closure()?;
        for (i, j) in closure.nonzeros() {
            let (machine_from, graph_from) = (i / n, i % n);
            let (machine_to, graph_to) = (j / n, j % n);
            if !machine.is_start_index(machine_from) || !machine.is_final_index(machine_to) {
                continue;
            }
            // Box states are (head, state) pairs; the start's head names the
            // nonterminal this closure edge derives.
            let Value::Pair(head, _) = machine.state_at(machine_from) else {
                continue;
            };
            let Value::Str(head) = head.as_ref() else {
                continue;
            };
            graph_bm
                .ensure_label(Label::sym(head.clone()))
                .set(graph_from, graph_to);
        }
        let nnz = closure.nnz();
        debug!(closure_nnz = nnz, "tensor round");
        if prev == Some(nnz) {
            break;
        }
        prev = Some(nnz);
    }

    let mut result = HashSet::new();
    for var in cfg.variables() {
        if let Some(mat) = graph_bm.mat(&Label::sym(var.clone())) {
            for (i, j) in mat.nonzeros() {
                result.insert((
                    graph_bm.state_at(i).clone(),
                    var.clone(),
                    graph_bm.state_at(j).clone(),
                ));
            }
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::SparseBitMatrix;

    #[test]
    fn test_matches_hellings_on_a_chain() {
        let mut graph = LabeledGraph::new();
        graph.add_edge(0, "a", 1);
        graph.add_edge(1, "a", 2);
        graph.add_edge(2, "b", 3);
        graph.add_edge(3, "b", 4);
        let cfg = Cfg::from_text("S -> a S b | a b", "S").unwrap();
        let ours = run::<SparseBitMatrix>(&cfg, &graph).unwrap();
        let reference = crate::query::hellings::run(&cfg, &graph);
        let ours_s: HashSet<_> = ours.into_iter().filter(|(_, h, _)| h == "S").collect();
        let reference_s: HashSet<_> = reference.into_iter().filter(|(_, h, _)| h == "S").collect();
        assert_eq!(ours_s, reference_s);
    }

    #[test]
    fn test_nullable_grammar_gives_reflexive_pairs() {
        let mut graph = LabeledGraph::new();
        graph.add_edge(0, "a", 1);
        let cfg = Cfg::from_text("S ->", "S").unwrap();
        let triples = run::<SparseBitMatrix>(&cfg, &graph).unwrap();
        assert!(triples.contains(&(Value::Int(0), "S".to_owned(), Value::Int(0))));
        assert!(triples.contains(&(Value::Int(1), "S".to_owned(), Value::Int(1))));
    }

    #[test]
    fn test_empty_graph() {
        let cfg = Cfg::from_text("S -> a", "S").unwrap();
        assert!(
            run::<SparseBitMatrix>(&cfg, &LabeledGraph::new())
                .unwrap()
                .is_empty()
        );
    }
}
