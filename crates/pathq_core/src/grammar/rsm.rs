use indexmap::IndexMap;

use crate::automata::dfa::Dfa;

/// A recursive state machine: one DFA box per nonterminal.
///
/// Box states are identified by `(head, state)` pairs wherever boxes are
/// unioned into a single automaton, so states stay unique across boxes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rsm {
    start: String,
    boxes: IndexMap<String, Dfa>,
}

impl Rsm {
    /// Creates an RSM from a start symbol and per-head boxes.
    #[must_use]
    pub fn new(start: impl Into<String>, boxes: IndexMap<String, Dfa>) -> Self {
        Self {
            start: start.into(),
            boxes,
        }
    }

    /// The start symbol.
    #[must_use]
    pub fn start_symbol(&self) -> &str {
        &self.start
    }

    /// `(head, box)` entries in insertion order.
    pub fn boxes(&self) -> impl Iterator<Item = (&String, &Dfa)> {
        self.boxes.iter()
    }

    /// The box for `head`, if present.
    #[must_use]
    pub fn box_for(&self, head: &str) -> Option<&Dfa> {
        self.boxes.get(head)
    }

    /// Number of boxes.
    #[must_use]
    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }

    /// An RSM with every box replaced by its minimal DFA. The language of
    /// each nonterminal is unchanged.
    #[must_use]
    pub fn minimize(&self) -> Rsm {
        Rsm {
            start: self.start.clone(),
            boxes: self
                .boxes
                .iter()
                .map(|(head, dfa)| (head.clone(), dfa.minimize()))
                .collect(),
        }
    }
}

/// Minimizes every box of an RSM. See [`Rsm::minimize`].
#[must_use]
pub fn minimize_rsm(rsm: &Rsm) -> Rsm {
    rsm.minimize()
}
