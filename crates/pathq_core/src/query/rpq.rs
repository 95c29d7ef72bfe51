use std::collections::HashSet;

use tracing::debug;

use crate::automata::bool_matrix::{BfsResult, BoolMatrixAutomaton};
use crate::automata::dfa::regex_to_min_dfa;
use crate::automata::state::Value;
use crate::errors::QueryError;
use crate::graph::LabeledGraph;
use crate::matrix::{BoolMatrix, MatrixBackend, SparseBitMatrix};

/// What a multi-source BFS query reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpqMode {
    /// All graph vertices reachable from the start set.
    FindAllReachable,
    /// Reachable vertices tracked separately per start vertex.
    FindReachableForEachStartNode,
}

/// Evaluates a regular-path query through the Kronecker product of the
/// graph with the minimal query DFA, followed by a transitive closure.
///
/// Returns the `(u, v)` pairs connected by a path spelling a word of the
/// query language. Passing [`None`] for a vertex set means every vertex.
///
/// # Errors
///
/// Returns a [`QueryError`] for an invalid pattern or unavailable backend.
pub fn rpq_tensor(
    graph: &LabeledGraph,
    pattern: &str,
    start_nodes: Option<&HashSet<Value>>,
    final_nodes: Option<&HashSet<Value>>,
    backend: MatrixBackend,
) -> Result<HashSet<(Value, Value)>, QueryError> {
    match backend {
        MatrixBackend::Cpu => {
            rpq_tensor_impl::<SparseBitMatrix>(graph, pattern, start_nodes, final_nodes)
        }
        MatrixBackend::Gpu => Err(QueryError::UnsupportedBackend { backend: "gpu" }),
    }
}

fn rpq_tensor_impl<M: BoolMatrix>(
    graph: &LabeledGraph,
    pattern: &str,
    start_nodes: Option<&HashSet<Value>>,
    final_nodes: Option<&HashSet<Value>>,
) -> Result<HashSet<(Value, Value)>, QueryError> {
    let dfa = regex_to_min_dfa(pattern)?;
    let graph_bm: BoolMatrixAutomaton<M> =
        BoolMatrixAutomaton::from_nfa(&graph.to_epsilon_nfa(start_nodes, final_nodes));
    let query_bm = BoolMatrixAutomaton::from_nfa(&dfa.to_nfa());

    let product = graph_bm.intersect(&query_bm);
    let closure = product.transitive_closure()?;
    debug!(
        pattern,
        product_states = product.state_count(),
        closure_nnz = closure.nnz(),
        "tensor rpq closure"
    );

    let mut result = HashSet::new();
    for (i, j) in closure.nonzeros() {
        if !product.is_start_index(i) || !product.is_final_index(j) {
            continue;
        }
        let (Value::Pair(from, _), Value::Pair(to, _)) = (product.state_at(i), product.state_at(j))
        else {
            continue;
        };
        result.insert((from.as_ref().clone(), to.as_ref().clone()));
    }
    if dfa.accepts_empty() {
        result.extend(
            epsilon_pairs(graph, start_nodes, final_nodes).map(|node| (node.clone(), node.clone())),
        );
    }
    Ok(result)
}

/// Evaluates a regular-path query with the synchronous multi-source BFS.
///
/// In [`RpqMode::FindAllReachable`] mode the result is the set of reachable
/// final vertices; in [`RpqMode::FindReachableForEachStartNode`] mode it is
/// the set of `(start, reached)` pairs.
///
/// # Errors
///
/// Returns a [`QueryError`] for an invalid pattern or unavailable backend.
pub fn rpq_bfs(
    graph: &LabeledGraph,
    pattern: &str,
    start_nodes: Option<&HashSet<Value>>,
    final_nodes: Option<&HashSet<Value>>,
    mode: RpqMode,
    backend: MatrixBackend,
) -> Result<BfsResult, QueryError> {
    match backend {
        MatrixBackend::Cpu => {
            rpq_bfs_impl::<SparseBitMatrix>(graph, pattern, start_nodes, final_nodes, mode)
        }
        MatrixBackend::Gpu => Err(QueryError::UnsupportedBackend { backend: "gpu" }),
    }
}

fn rpq_bfs_impl<M: BoolMatrix>(
    graph: &LabeledGraph,
    pattern: &str,
    start_nodes: Option<&HashSet<Value>>,
    final_nodes: Option<&HashSet<Value>>,
    mode: RpqMode,
) -> Result<BfsResult, QueryError> {
    let dfa = regex_to_min_dfa(pattern)?;
    let graph_bm: BoolMatrixAutomaton<M> =
        BoolMatrixAutomaton::from_nfa(&graph.to_epsilon_nfa(start_nodes, final_nodes));
    let query_bm = BoolMatrixAutomaton::from_nfa(&dfa.to_nfa());

    let per_node = matches!(mode, RpqMode::FindReachableForEachStartNode);
    let mut result = graph_bm.sync_bfs(&query_bm, per_node)?;
    if dfa.accepts_empty() {
        match &mut result {
            BfsResult::All(reached) => {
                reached.extend(epsilon_pairs(graph, start_nodes, final_nodes).cloned());
            }
            BfsResult::PerSource(pairs) => {
                pairs.extend(
                    epsilon_pairs(graph, start_nodes, final_nodes)
                        .map(|node| (node.clone(), node.clone())),
                );
            }
        }
    }
    Ok(result)
}

/// Vertices in both the chosen start and final sets; when the query accepts
/// the empty word each of them reaches itself.
fn epsilon_pairs<'a>(
    graph: &'a LabeledGraph,
    start_nodes: Option<&'a HashSet<Value>>,
    final_nodes: Option<&'a HashSet<Value>>,
) -> impl Iterator<Item = &'a Value> {
    graph.nodes().filter(move |node| {
        start_nodes.is_none_or(|set| set.contains(node))
            && final_nodes.is_none_or(|set| set.contains(node))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> LabeledGraph {
        let mut graph = LabeledGraph::new();
        graph.add_edge(0, "a", 1);
        graph.add_edge(1, "b", 2);
        graph
    }

    #[test]
    fn test_tensor_rpq_chain() {
        let pairs = rpq_tensor(&chain(), "a b", None, None, MatrixBackend::Cpu).unwrap();
        assert_eq!(pairs, [(Value::Int(0), Value::Int(2))].into());
    }

    #[test]
    fn test_bfs_rpq_per_node_chain() {
        let starts: HashSet<Value> = [Value::Int(0)].into();
        let result = rpq_bfs(
            &chain(),
            "a b",
            Some(&starts),
            None,
            RpqMode::FindReachableForEachStartNode,
            MatrixBackend::Cpu,
        )
        .unwrap();
        assert_eq!(
            result,
            BfsResult::PerSource([(Value::Int(0), Value::Int(2))].into())
        );
    }

    #[test]
    fn test_gpu_backend_is_unsupported() {
        let err = rpq_tensor(&chain(), "a", None, None, MatrixBackend::Gpu).unwrap_err();
        assert!(matches!(err, QueryError::UnsupportedBackend { .. }));
    }

    #[test]
    fn test_bad_pattern_reports_parse_error() {
        let err = rpq_tensor(&chain(), "a|", None, None, MatrixBackend::Cpu).unwrap_err();
        assert!(matches!(err, QueryError::Regex(_)));
    }

    #[test]
    fn test_epsilon_query_yields_reflexive_pairs() {
        let pairs = rpq_tensor(&chain(), "a*", None, None, MatrixBackend::Cpu).unwrap();
        assert!(pairs.contains(&(Value::Int(0), Value::Int(1))));
        assert!(pairs.contains(&(Value::Int(2), Value::Int(2))));
        assert!(pairs.contains(&(Value::Int(0), Value::Int(0))));
    }
}
