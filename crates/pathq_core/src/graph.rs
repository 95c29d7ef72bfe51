//! Labeled directed multigraphs and their automaton view.

use std::collections::{BTreeSet, HashSet};
use std::fmt::Write as _;

use indexmap::IndexSet;

use crate::automata::nfa::Nfa;
use crate::automata::state::{Label, Value};

/// A directed multigraph whose edges carry string labels.
///
/// Vertices are opaque [`Value`]s; an empty label stands for ε. Parallel
/// edges and self-loops are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabeledGraph {
    nodes: IndexSet<Value>,
    edges: Vec<(Value, String, Value)>,
}

/// Summary counts for a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphInfo {
    /// Number of vertices.
    pub node_count: usize,
    /// Number of edges.
    pub edge_count: usize,
    /// Distinct non-ε edge labels.
    pub labels: BTreeSet<String>,
}

impl LabeledGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a vertex; already-known vertices are kept once.
    pub fn add_node(&mut self, node: impl Into<Value>) {
        self.nodes.insert(node.into());
    }

    /// Adds an edge, registering both endpoints. An empty label means ε.
    pub fn add_edge(&mut self, from: impl Into<Value>, label: impl Into<String>, to: impl Into<Value>) {
        let from = from.into();
        let to = to.into();
        self.nodes.insert(from.clone());
        self.nodes.insert(to.clone());
        self.edges.push((from, label.into(), to));
    }

    /// Vertices in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Value> {
        self.nodes.iter()
    }

    /// Number of vertices.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Edges as `(from, label, to)` triples.
    #[must_use]
    pub fn edges(&self) -> &[(Value, String, Value)] {
        &self.edges
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the vertex is registered.
    #[must_use]
    pub fn contains(&self, node: &Value) -> bool {
        self.nodes.contains(node)
    }

    /// Index of a vertex in insertion order, if registered.
    #[must_use]
    pub fn index_of(&self, node: &Value) -> Option<usize> {
        self.nodes.get_index_of(node)
    }

    /// Summary counts and the label set.
    #[must_use]
    pub fn info(&self) -> GraphInfo {
        GraphInfo {
            node_count: self.nodes.len(),
            edge_count: self.edges.len(),
            labels: self
                .edges
                .iter()
                .filter(|(_, label, _)| !label.is_empty())
                .map(|(_, label, _)| label.clone())
                .collect(),
        }
    }

    /// Two directed cycles sharing vertex `0`: `0→1→…→n→0` carrying the
    /// first label and `0→n+1→…→n+m→0` carrying the second.
    ///
    /// # Panics
    ///
    /// Panics if `n` or `m` is zero.
    #[must_use]
    pub fn two_cycles(n: usize, m: usize, labels: (&str, &str)) -> LabeledGraph {
        assert!(n > 0 && m > 0, "both cycles need at least one extra vertex");
        let mut graph = LabeledGraph::new();
        for i in 0..n {
            graph.add_edge(i as i64, labels.0, (i + 1) as i64);
        }
        graph.add_edge(n as i64, labels.0, 0);
        graph.add_edge(0, labels.1, (n + 1) as i64);
        for i in n + 1..n + m {
            graph.add_edge(i as i64, labels.1, (i + 1) as i64);
        }
        graph.add_edge((n + m) as i64, labels.1, 0);
        graph
    }

    /// Lifts the graph into an ε-NFA. Edges with empty labels become
    /// ε-transitions. Passing [`None`] for a state set marks every vertex.
    #[must_use]
    pub fn to_epsilon_nfa(
        &self,
        start_nodes: Option<&HashSet<Value>>,
        final_nodes: Option<&HashSet<Value>>,
    ) -> Nfa {
        let mut nfa = Nfa::new();
        for node in &self.nodes {
            nfa.add_state(node.clone());
        }
        for (from, label, to) in &self.edges {
            let label = if label.is_empty() {
                Label::Eps
            } else {
                Label::sym(label.clone())
            };
            nfa.add_transition(from.clone(), label, to.clone());
        }
        for node in &self.nodes {
            if start_nodes.is_none_or(|set| set.contains(node)) {
                nfa.add_start(node.clone());
            }
            if final_nodes.is_none_or(|set| set.contains(node)) {
                nfa.add_final(node.clone());
            }
        }
        nfa
    }

    /// Renders the graph in DOT format.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph {\n");
        for node in &self.nodes {
            let _ = writeln!(out, "    \"{node}\";");
        }
        for (from, label, to) in &self.edges {
            let _ = writeln!(out, "    \"{from}\" -> \"{to}\" [label=\"{label}\"];");
        }
        out.push_str("}\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_cycles_layout() {
        let graph = LabeledGraph::two_cycles(2, 2, ("a", "b"));
        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.edge_count(), 6);
        let a_edges: Vec<(i64, i64)> = graph
            .edges()
            .iter()
            .filter(|(_, l, _)| l == "a")
            .map(|(f, _, t)| match (f, t) {
                (Value::Int(f), Value::Int(t)) => (*f, *t),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(a_edges, vec![(0, 1), (1, 2), (2, 0)]);
        let info = graph.info();
        assert_eq!(info.labels, BTreeSet::from(["a".into(), "b".into()]));
    }

    #[test]
    fn test_to_epsilon_nfa_defaults_to_all_nodes() {
        let mut graph = LabeledGraph::new();
        graph.add_edge(0, "a", 1);
        graph.add_node(2);
        let nfa = graph.to_epsilon_nfa(None, None);
        assert_eq!(nfa.state_count(), 3);
        assert_eq!(nfa.start_indices().count(), 3);
        assert_eq!(nfa.final_indices().count(), 3);
    }

    #[test]
    fn test_to_epsilon_nfa_empty_label_is_epsilon() {
        let mut graph = LabeledGraph::new();
        graph.add_edge(0, "", 1);
        graph.add_edge(1, "a", 2);
        let starts: HashSet<Value> = [Value::Int(0)].into();
        let finals: HashSet<Value> = [Value::Int(2)].into();
        let nfa = graph.to_epsilon_nfa(Some(&starts), Some(&finals));
        assert!(nfa.accepts(&["a"]), "the ε edge should be free");
        assert!(!nfa.accepts(&[]));
    }

    #[test]
    fn test_to_dot_lists_nodes_and_edges() {
        let mut graph = LabeledGraph::new();
        graph.add_edge("x", "go", "y");
        let dot = graph.to_dot();
        assert!(dot.starts_with("digraph {"));
        assert!(dot.contains("\"x\" -> \"y\" [label=\"go\"]"));
    }
}
