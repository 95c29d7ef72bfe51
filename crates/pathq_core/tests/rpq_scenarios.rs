use std::collections::HashSet;

use pathq_core::{
    BfsResult, LabeledGraph, MatrixBackend, QueryError, RpqMode, Value, rpq_bfs, rpq_tensor,
};

fn pairs(expected: &[(i64, i64)]) -> HashSet<(Value, Value)> {
    expected
        .iter()
        .map(|&(u, v)| (Value::Int(u), Value::Int(v)))
        .collect()
}

fn nodes(values: &[i64]) -> HashSet<Value> {
    values.iter().copied().map(Value::Int).collect()
}

fn cycle3() -> LabeledGraph {
    let mut graph = LabeledGraph::new();
    graph.add_edge(0, "a", 1);
    graph.add_edge(1, "a", 2);
    graph.add_edge(2, "a", 0);
    graph
}

fn chain() -> LabeledGraph {
    let mut graph = LabeledGraph::new();
    graph.add_edge(0, "a", 1);
    graph.add_edge(1, "b", 2);
    graph
}

/// Tensor-RPQ and BFS-RPQ must agree: per-source pairs match the tensor
/// pair set, and the aggregate set matches its projection.
fn assert_rpq_agreement(graph: &LabeledGraph, pattern: &str) {
    let tensor = rpq_tensor(graph, pattern, None, None, MatrixBackend::Cpu).unwrap();
    let per_source = rpq_bfs(
        graph,
        pattern,
        None,
        None,
        RpqMode::FindReachableForEachStartNode,
        MatrixBackend::Cpu,
    )
    .unwrap();
    assert_eq!(
        per_source,
        BfsResult::PerSource(tensor.clone()),
        "per-source bfs disagrees with tensor on {pattern:?}"
    );

    let aggregate = rpq_bfs(
        graph,
        pattern,
        None,
        None,
        RpqMode::FindAllReachable,
        MatrixBackend::Cpu,
    )
    .unwrap();
    let projected: HashSet<Value> = tensor.into_iter().map(|(_, v)| v).collect();
    assert_eq!(
        aggregate,
        BfsResult::All(projected),
        "aggregate bfs disagrees with tensor on {pattern:?}"
    );
}

#[test]
fn test_cycle_with_a_plus_reaches_everything() {
    let result = rpq_tensor(&cycle3(), "a a*", None, None, MatrixBackend::Cpu).unwrap();
    let expected: HashSet<(Value, Value)> = (0..3)
        .flat_map(|u| (0..3).map(move |v| (Value::Int(u), Value::Int(v))))
        .collect();
    assert_eq!(result, expected, "all 9 ordered pairs are connected");
}

#[test]
fn test_chain_per_source_from_zero() {
    let starts = nodes(&[0]);
    let finals = nodes(&[0, 1, 2]);
    let result = rpq_bfs(
        &chain(),
        "a b",
        Some(&starts),
        Some(&finals),
        RpqMode::FindReachableForEachStartNode,
        MatrixBackend::Cpu,
    )
    .unwrap();
    assert_eq!(result, BfsResult::PerSource(pairs(&[(0, 2)])));
}

#[test]
fn test_tensor_respects_start_and_final_sets() {
    let graph = cycle3();
    let starts = nodes(&[0]);
    let finals = nodes(&[2]);
    let result = rpq_tensor(&graph, "a a*", Some(&starts), Some(&finals), MatrixBackend::Cpu)
        .unwrap();
    assert_eq!(result, pairs(&[(0, 2)]));
}

#[test]
fn test_rpq_variants_agree() {
    let mut branching = LabeledGraph::new();
    branching.add_edge(0, "a", 1);
    branching.add_edge(0, "b", 2);
    branching.add_edge(1, "b", 2);
    branching.add_edge(2, "a", 0);
    branching.add_edge(2, "b", 2);

    for pattern in ["a b", "(a|b)*", "a* b a?", "b+"] {
        assert_rpq_agreement(&cycle3(), pattern);
        assert_rpq_agreement(&chain(), pattern);
        assert_rpq_agreement(&branching, pattern);
    }
}

#[test]
fn test_epsilon_matching_pattern_gives_reflexive_pairs() {
    let mut graph = LabeledGraph::new();
    graph.add_node(0);
    graph.add_node(1);
    let result = rpq_tensor(&graph, "a*", None, None, MatrixBackend::Cpu).unwrap();
    assert_eq!(result, pairs(&[(0, 0), (1, 1)]));

    let starts = nodes(&[0]);
    let finals = nodes(&[1]);
    let filtered =
        rpq_tensor(&graph, "a*", Some(&starts), Some(&finals), MatrixBackend::Cpu).unwrap();
    assert!(filtered.is_empty(), "start and final sets do not overlap");
}

#[test]
fn test_empty_graph_returns_empty() {
    let graph = LabeledGraph::new();
    assert!(
        rpq_tensor(&graph, "a*", None, None, MatrixBackend::Cpu)
            .unwrap()
            .is_empty()
    );
    let result = rpq_bfs(
        &graph,
        "a*",
        None,
        None,
        RpqMode::FindAllReachable,
        MatrixBackend::Cpu,
    )
    .unwrap();
    assert_eq!(result, BfsResult::All(HashSet::new()));
}

#[test]
fn test_string_vertices() {
    let mut graph = LabeledGraph::new();
    graph.add_edge("src", "dep", "lib");
    graph.add_edge("lib", "dep", "core");
    let result = rpq_tensor(&graph, "dep dep", None, None, MatrixBackend::Cpu).unwrap();
    let expected: HashSet<(Value, Value)> = [(Value::from("src"), Value::from("core"))].into();
    assert_eq!(result, expected);
}

#[test]
fn test_gpu_backend_reports_unsupported() {
    let err = rpq_bfs(
        &chain(),
        "a",
        None,
        None,
        RpqMode::FindAllReachable,
        MatrixBackend::Gpu,
    )
    .unwrap_err();
    assert!(matches!(err, QueryError::UnsupportedBackend { .. }));
}
