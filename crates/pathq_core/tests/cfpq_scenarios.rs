use std::collections::HashSet;

use pathq_core::{Cfg, CfpqAlgorithm, LabeledGraph, Value, cfpq};

const ALGORITHMS: [CfpqAlgorithm; 3] = [
    CfpqAlgorithm::Hellings,
    CfpqAlgorithm::Matrix,
    CfpqAlgorithm::Tensor,
];

fn pairs(expected: &[(i64, i64)]) -> HashSet<(Value, Value)> {
    expected
        .iter()
        .map(|&(u, v)| (Value::Int(u), Value::Int(v)))
        .collect()
}

fn nodes(values: &[i64]) -> HashSet<Value> {
    values.iter().copied().map(Value::Int).collect()
}

fn balanced_grammar() -> Cfg {
    Cfg::from_text("S -> a S b | a b", "S").unwrap()
}

/// Every algorithm must produce the expected pair set.
fn assert_all_algorithms(
    graph: &LabeledGraph,
    cfg: &Cfg,
    starts: Option<&HashSet<Value>>,
    finals: Option<&HashSet<Value>>,
    expected: &HashSet<(Value, Value)>,
) {
    for algo in ALGORITHMS {
        let result = cfpq(algo, graph, cfg, starts, finals, "S").unwrap();
        assert_eq!(&result, expected, "{algo:?} disagrees");
    }
}

#[test]
fn test_two_cycles_balanced_words() {
    let graph = LabeledGraph::two_cycles(2, 2, ("a", "b"));
    let expected = pairs(&[(0, 0), (1, 4), (2, 3)]);
    assert_all_algorithms(&graph, &balanced_grammar(), None, None, &expected);
}

#[test]
fn test_two_cycles_filtered_to_outer_starts() {
    let graph = LabeledGraph::two_cycles(2, 1, ("a", "b"));
    let starts = nodes(&[1, 2]);
    let finals = nodes(&[0]);
    let expected = pairs(&[(1, 0), (2, 0)]);
    assert_all_algorithms(
        &graph,
        &balanced_grammar(),
        Some(&starts),
        Some(&finals),
        &expected,
    );
}

#[test]
fn test_two_cycles_unfiltered_smaller_inner_cycle() {
    let graph = LabeledGraph::two_cycles(2, 1, ("a", "b"));
    let expected = pairs(&[(0, 0), (1, 0), (2, 0), (0, 3), (1, 3), (2, 3)]);
    assert_all_algorithms(&graph, &balanced_grammar(), None, None, &expected);
}

#[test]
fn test_algorithms_agree_on_chain_with_branches() {
    let mut graph = LabeledGraph::new();
    graph.add_edge(0, "a", 1);
    graph.add_edge(1, "a", 2);
    graph.add_edge(2, "b", 3);
    graph.add_edge(3, "b", 4);
    graph.add_edge(1, "b", 4);
    graph.add_edge(4, "a", 0);
    let cfg = balanced_grammar();

    let reference = cfpq(CfpqAlgorithm::Hellings, &graph, &cfg, None, None, "S").unwrap();
    assert_eq!(reference, pairs(&[(1, 3), (0, 4)]));
    for algo in ALGORITHMS {
        assert_eq!(
            cfpq(algo, &graph, &cfg, None, None, "S").unwrap(),
            reference,
            "{algo:?} disagrees with the Hellings reference"
        );
    }
}

#[test]
fn test_algorithms_agree_with_nullable_grammar() {
    let mut graph = LabeledGraph::new();
    graph.add_edge(0, "a", 1);
    graph.add_edge(1, "b", 0);
    graph.add_edge(1, "a", 2);
    let cfg = Cfg::from_text("S -> a S b |", "S").unwrap();

    // ε pairs on every vertex; `a S b` adds nothing new on this graph.
    let expected = pairs(&[(0, 0), (1, 1), (2, 2)]);
    assert_all_algorithms(&graph, &cfg, None, None, &expected);
}

#[test]
fn test_empty_graph_returns_empty() {
    let graph = LabeledGraph::new();
    let cfg = balanced_grammar();
    for algo in ALGORITHMS {
        assert!(cfpq(algo, &graph, &cfg, None, None, "S").unwrap().is_empty());
    }
}

#[test]
fn test_epsilon_only_grammar_reflexive_on_start_final_overlap() {
    let mut graph = LabeledGraph::new();
    graph.add_edge(0, "a", 1);
    graph.add_edge(1, "a", 2);
    let cfg = Cfg::from_text("S ->", "S").unwrap();
    let starts = nodes(&[0, 1]);
    let finals = nodes(&[1, 2]);
    let expected = pairs(&[(1, 1)]);
    assert_all_algorithms(&graph, &cfg, Some(&starts), Some(&finals), &expected);
}

#[test]
fn test_start_symbol_override() {
    let mut graph = LabeledGraph::new();
    graph.add_edge(0, "a", 1);
    graph.add_edge(1, "b", 2);
    let cfg = Cfg::from_text("S -> a b\nT -> a", "S").unwrap();
    for algo in ALGORITHMS {
        let result = cfpq(algo, &graph, &cfg, None, None, "T").unwrap();
        assert_eq!(result, pairs(&[(0, 1)]), "{algo:?} with start symbol T");
    }
}

#[test]
fn test_grammar_without_matching_labels() {
    let mut graph = LabeledGraph::new();
    graph.add_edge(0, "x", 1);
    let cfg = balanced_grammar();
    for algo in ALGORITHMS {
        assert!(cfpq(algo, &graph, &cfg, None, None, "S").unwrap().is_empty());
    }
}
