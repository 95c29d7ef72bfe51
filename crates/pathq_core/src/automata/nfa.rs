use std::collections::BTreeSet;

use indexmap::IndexSet;

use crate::automata::sim;
use crate::automata::state::{Label, Value};
use crate::regex::Ast;

/// A nondeterministic finite automaton with ε-transitions.
///
/// States are opaque [`Value`]s registered in insertion order; that order is
/// the index order every matrix view of this automaton uses. Start and final
/// sets are tracked by index and always refer to registered states.
#[derive(Debug, Clone, Default)]
pub struct Nfa {
    states: IndexSet<Value>,
    transitions: Vec<(usize, Label, usize)>,
    starts: IndexSet<usize>,
    finals: IndexSet<usize>,
}

impl Nfa {
    /// Creates an empty automaton.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a state and returns its index. Re-registering an existing
    /// state returns the index it already has.
    pub fn add_state(&mut self, state: impl Into<Value>) -> usize {
        self.states.insert_full(state.into()).0
    }

    /// Adds a transition, registering both endpoint states.
    pub fn add_transition(&mut self, from: impl Into<Value>, label: Label, to: impl Into<Value>) {
        let from = self.add_state(from);
        let to = self.add_state(to);
        self.transitions.push((from, label, to));
    }

    /// Marks a state as a start state, registering it if needed.
    pub fn add_start(&mut self, state: impl Into<Value>) {
        let idx = self.add_state(state);
        self.starts.insert(idx);
    }

    /// Marks a state as a final state, registering it if needed.
    pub fn add_final(&mut self, state: impl Into<Value>) {
        let idx = self.add_state(state);
        self.finals.insert(idx);
    }

    /// Number of registered states.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// States in registration order.
    pub fn states(&self) -> impl Iterator<Item = &Value> {
        self.states.iter()
    }

    /// The state registered at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not a registered index.
    #[must_use]
    pub fn state_at(&self, idx: usize) -> &Value {
        self.states
            .get_index(idx)
            .expect("state index out of range")
    }

    /// Index of a state, if registered.
    #[must_use]
    pub fn index_of(&self, state: &Value) -> Option<usize> {
        self.states.get_index_of(state)
    }

    /// Indices of start states, in the order they were marked.
    pub fn start_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.starts.iter().copied()
    }

    /// Indices of final states, in the order they were marked.
    pub fn final_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.finals.iter().copied()
    }

    /// Whether the state at `idx` is a start state.
    #[must_use]
    pub fn is_start(&self, idx: usize) -> bool {
        self.starts.contains(&idx)
    }

    /// Whether the state at `idx` is a final state.
    #[must_use]
    pub fn is_final(&self, idx: usize) -> bool {
        self.finals.contains(&idx)
    }

    /// All transitions as `(from, label, to)` index triples.
    #[must_use]
    pub fn transitions(&self) -> &[(usize, Label, usize)] {
        &self.transitions
    }

    /// The set of labels appearing on transitions, ε included.
    #[must_use]
    pub fn labels(&self) -> BTreeSet<Label> {
        self.transitions
            .iter()
            .map(|(_, label, _)| label.clone())
            .collect()
    }

    /// Whether the automaton accepts the given word of symbols.
    #[must_use]
    pub fn accepts(&self, word: &[&str]) -> bool {
        sim::nfa_accepts(self, word)
    }

    /// Builds an automaton from a regex AST using Thompson's construction.
    #[must_use]
    pub fn from_regex(ast: &Ast) -> Nfa {
        let mut builder = Builder::default();
        let fragment = builder.build(ast);
        builder.finalize(fragment)
    }
}

/// Internal builder assembling Thompson fragments into an [`Nfa`].
#[derive(Default)]
struct Builder {
    nfa: Nfa,
    next: i64,
}

/// A fragment with one entry state and its accepting states.
struct Fragment {
    start: usize,
    accepts: Vec<usize>,
}

impl Builder {
    fn new_state(&mut self) -> usize {
        let idx = self.nfa.add_state(Value::Int(self.next));
        self.next += 1;
        idx
    }

    fn connect(&mut self, from: usize, label: Label, to: usize) {
        self.nfa.transitions.push((from, label, to));
    }

    fn build(&mut self, ast: &Ast) -> Fragment {
        match ast {
            Ast::Empty => self.build_empty(),
            Ast::Epsilon => self.build_leaf(Label::Eps),
            Ast::Sym(s) => self.build_leaf(Label::sym(s.clone())),
            Ast::Concat(lhs, rhs) => self.build_concat(lhs, rhs),
            Ast::Alt(lhs, rhs) => self.build_alternation(lhs, rhs),
            Ast::Star(inner) => self.build_star(inner),
            Ast::Plus(inner) => self.build_plus(inner),
            Ast::Opt(inner) => self.build_optional(inner),
        }
    }

    /// Two disconnected states; nothing reaches the accept.
    fn build_empty(&mut self) -> Fragment {
        let start = self.new_state();
        let accept = self.new_state();
        Fragment {
            start,
            accepts: vec![accept],
        }
    }

    fn build_leaf(&mut self, label: Label) -> Fragment {
        let start = self.new_state();
        let accept = self.new_state();
        self.connect(start, label, accept);
        Fragment {
            start,
            accepts: vec![accept],
        }
    }

    fn build_concat(&mut self, lhs: &Ast, rhs: &Ast) -> Fragment {
        let left = self.build(lhs);
        let right = self.build(rhs);
        for accept in &left.accepts {
            self.connect(*accept, Label::Eps, right.start);
        }
        Fragment {
            start: left.start,
            accepts: right.accepts,
        }
    }

    fn build_alternation(&mut self, lhs: &Ast, rhs: &Ast) -> Fragment {
        let left = self.build(lhs);
        let right = self.build(rhs);

        let start = self.new_state();
        let accept = self.new_state();
        self.connect(start, Label::Eps, left.start);
        self.connect(start, Label::Eps, right.start);
        for state in left.accepts.iter().chain(right.accepts.iter()) {
            self.connect(*state, Label::Eps, accept);
        }
        Fragment {
            start,
            accepts: vec![accept],
        }
    }

    fn build_star(&mut self, inner: &Ast) -> Fragment {
        let frag = self.build(inner);
        let start = self.new_state();
        let accept = self.new_state();
        self.connect(start, Label::Eps, frag.start);
        self.connect(start, Label::Eps, accept);
        for state in frag.accepts {
            self.connect(state, Label::Eps, frag.start);
            self.connect(state, Label::Eps, accept);
        }
        Fragment {
            start,
            accepts: vec![accept],
        }
    }

    fn build_plus(&mut self, inner: &Ast) -> Fragment {
        let frag = self.build(inner);
        let start = self.new_state();
        let accept = self.new_state();
        self.connect(start, Label::Eps, frag.start);
        for state in frag.accepts {
            self.connect(state, Label::Eps, frag.start);
            self.connect(state, Label::Eps, accept);
        }
        Fragment {
            start,
            accepts: vec![accept],
        }
    }

    fn build_optional(&mut self, inner: &Ast) -> Fragment {
        let frag = self.build(inner);
        let start = self.new_state();
        let accept = self.new_state();
        self.connect(start, Label::Eps, frag.start);
        self.connect(start, Label::Eps, accept);
        for state in frag.accepts {
            self.connect(state, Label::Eps, accept);
        }
        Fragment {
            start,
            accepts: vec![accept],
        }
    }

    fn finalize(mut self, fragment: Fragment) -> Nfa {
        self.nfa.starts.insert(fragment.start);
        for accept in fragment.accepts {
            self.nfa.finals.insert(accept);
        }
        self.nfa
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thompson_symbol() {
        let nfa = Nfa::from_regex(&Ast::build("a").unwrap());
        assert!(nfa.accepts(&["a"]));
        assert!(!nfa.accepts(&[]));
        assert!(!nfa.accepts(&["a", "a"]));
    }

    #[test]
    fn test_thompson_multichar_symbols() {
        let nfa = Nfa::from_regex(&Ast::build("load next*").unwrap());
        assert!(nfa.accepts(&["load"]));
        assert!(nfa.accepts(&["load", "next", "next"]));
        assert!(!nfa.accepts(&["next"]));
    }

    #[test]
    fn test_thompson_alternation_star() {
        let nfa = Nfa::from_regex(&Ast::build("(a|b)*").unwrap());
        assert!(nfa.accepts(&[]));
        assert!(nfa.accepts(&["a", "b", "b", "a"]));
        assert!(!nfa.accepts(&["c"]));
    }

    #[test]
    fn test_thompson_plus_and_opt() {
        let plus = Nfa::from_regex(&Ast::build("a+").unwrap());
        assert!(!plus.accepts(&[]));
        assert!(plus.accepts(&["a"]));
        assert!(plus.accepts(&["a", "a", "a"]));

        let opt = Nfa::from_regex(&Ast::build("a?").unwrap());
        assert!(opt.accepts(&[]));
        assert!(opt.accepts(&["a"]));
        assert!(!opt.accepts(&["a", "a"]));
    }

    #[test]
    fn test_thompson_empty_language() {
        let nfa = Nfa::from_regex(&Ast::Empty);
        assert!(!nfa.accepts(&[]));
        assert!(!nfa.accepts(&["a"]));
    }

    #[test]
    fn test_thompson_epsilon() {
        let nfa = Nfa::from_regex(&Ast::Epsilon);
        assert!(nfa.accepts(&[]));
        assert!(!nfa.accepts(&["a"]));
    }

    #[test]
    fn test_state_registration_order() {
        let mut nfa = Nfa::new();
        nfa.add_transition(1, Label::sym("x"), 2);
        nfa.add_transition(2, Label::sym("y"), 3);
        nfa.add_start(1);
        nfa.add_final(3);
        let states: Vec<_> = nfa.states().cloned().collect();
        assert_eq!(states, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(nfa.index_of(&Value::Int(2)), Some(1));
    }
}
