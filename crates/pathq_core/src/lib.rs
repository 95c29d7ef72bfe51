//! Language-constrained reachability over labeled directed multigraphs.
//!
//! Given a graph whose edges carry string labels and a constraint language —
//! a regex, a context-free grammar, or its extended/recursive forms — the
//! engine answers which vertex pairs `(u, v)` are connected by a path
//! spelling a word of that language.
//!
//! Everything is built on one abstraction: an automaton held as a set of
//! sparse boolean adjacency matrices, one per label
//! ([`BoolMatrixAutomaton`]). Intersection is a Kronecker product, label-blind
//! reachability is a transitive closure, and multi-source traversal is a
//! synchronous BFS over a block-matrix front. Regular constraints compile to
//! minimal DFAs; context-free constraints are solved by three interchangeable
//! algorithms ([`CfpqAlgorithm`]) over Weak Chomsky Normal Form or a
//! recursive state machine.
//!
//! ```
//! use pathq_core::{cfpq, Cfg, CfpqAlgorithm, LabeledGraph, Value};
//!
//! let mut graph = LabeledGraph::new();
//! graph.add_edge(0, "a", 1);
//! graph.add_edge(1, "b", 2);
//! let grammar = Cfg::from_text("S -> a b", "S").unwrap();
//! let pairs = cfpq(CfpqAlgorithm::Hellings, &graph, &grammar, None, None, "S").unwrap();
//! assert_eq!(pairs, [(Value::Int(0), Value::Int(2))].into());
//! ```

pub mod automata;
pub mod errors;
pub mod grammar;
pub mod graph;
pub mod matrix;
pub mod query;
pub mod regex;

pub use self::automata::{
    BfsResult, BoolMatrixAutomaton, Dfa, Label, Nfa, StateId, Value, determinize, equivalent,
    intersect_automata, minimize, regex_to_min_dfa,
};
pub use self::errors::{GrammarError, QueryError, RegexError, ShapeError};
pub use self::grammar::{Cfg, Ecfg, Production, Rsm, Symbol, minimize_rsm, to_cnf, to_wcnf};
pub use self::graph::{GraphInfo, LabeledGraph};
pub use self::matrix::{BoolMatrix, MatrixBackend, SparseBitMatrix};
pub use self::query::{CfpqAlgorithm, RpqMode, cfpq, cyk, rpq_bfs, rpq_tensor};
