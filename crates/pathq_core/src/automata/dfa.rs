use std::collections::{BTreeSet, HashSet, VecDeque};

use indexmap::IndexMap;

use crate::automata::min;
use crate::automata::nfa::Nfa;
use crate::automata::sim;
use crate::automata::state::{Label, StateId, Value};
use crate::errors::RegexError;
use crate::regex::Ast;

/// Deterministic finite automaton produced by subset construction.
///
/// The transition table is partial: [`None`] means the word is rejected from
/// that state on that symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    /// All DFA state identifiers, `0..n`.
    pub states: Vec<StateId>,
    /// Start state identifier.
    pub start: StateId,
    /// Accepting state identifiers.
    pub accepts: Vec<StateId>,
    /// Transition table indexed by state then alphabet position.
    pub trans: Vec<Vec<Option<StateId>>>,
    /// Alphabet corresponding to the transition table columns, sorted.
    pub alphabet: Vec<String>,
}

impl Dfa {
    /// Whether the automaton accepts the given word of symbols.
    #[must_use]
    pub fn accepts(&self, word: &[&str]) -> bool {
        sim::dfa_accepts(self, word)
    }

    /// Whether the automaton accepts the empty word.
    #[must_use]
    pub fn accepts_empty(&self) -> bool {
        self.accepts.contains(&self.start)
    }

    /// Minimizes this automaton (Hopcroft partition refinement).
    #[must_use]
    pub fn minimize(&self) -> Dfa {
        min::minimize(self)
    }

    /// Views this automaton as an ε-free [`Nfa`] with integer state values.
    #[must_use]
    pub fn to_nfa(&self) -> Nfa {
        let mut nfa = Nfa::new();
        for &state in &self.states {
            nfa.add_state(Value::Int(i64::from(state)));
        }
        for (from, row) in self.trans.iter().enumerate() {
            for (sym_idx, target) in row.iter().enumerate() {
                if let Some(to) = target {
                    nfa.add_transition(
                        Value::Int(from as i64),
                        Label::sym(self.alphabet[sym_idx].clone()),
                        Value::Int(i64::from(*to)),
                    );
                }
            }
        }
        nfa.add_start(Value::Int(i64::from(self.start)));
        for &accept in &self.accepts {
            nfa.add_final(Value::Int(i64::from(accept)));
        }
        nfa
    }
}

/// Parses a pattern and produces its minimal DFA.
///
/// # Errors
///
/// Returns a [`RegexError`] when the pattern fails to lex or parse.
pub fn regex_to_min_dfa(pattern: &str) -> Result<Dfa, RegexError> {
    let ast = Ast::build(pattern)?;
    Ok(determinize(&Nfa::from_regex(&ast)).minimize())
}

/// Determinizes an NFA into a [`Dfa`] using subset construction.
#[must_use]
pub fn determinize(nfa: &Nfa) -> Dfa {
    Determinizer::new(nfa).run()
}

/// Converts a set of state indices into a sorted vector key.
fn set_to_key(set: BTreeSet<usize>) -> Vec<usize> {
    set.into_iter().collect()
}

/// Subset construction state: maps NFA state subsets to DFA identifiers and
/// fills in the transition table breadth-first.
struct Determinizer<'a> {
    nfa: &'a Nfa,
    adj: Vec<Vec<(Label, usize)>>,
    alphabet: Vec<String>,
    map: IndexMap<Vec<usize>, StateId>,
    queue: VecDeque<Vec<usize>>,
    transitions: Vec<Vec<Option<StateId>>>,
}

impl<'a> Determinizer<'a> {
    fn new(nfa: &'a Nfa) -> Self {
        let adj = sim::adjacency(nfa);
        let alphabet: Vec<String> = nfa
            .labels()
            .into_iter()
            .filter_map(|label| match label {
                Label::Sym(s) => Some(s),
                Label::Eps => None,
            })
            .collect();

        let seed: BTreeSet<usize> = nfa.start_indices().collect();
        let start_key = set_to_key(sim::epsilon_closure(&adj, &seed));

        let mut map = IndexMap::new();
        let mut queue = VecDeque::new();
        map.insert(start_key.clone(), 0);
        queue.push_back(start_key);

        Self {
            nfa,
            adj,
            alphabet,
            map,
            queue,
            transitions: Vec::new(),
        }
    }

    fn run(mut self) -> Dfa {
        while let Some(key) = self.queue.pop_front() {
            let state_id = self.map[&key];
            self.ensure_capacity(state_id as usize + 1);
            let subset: BTreeSet<usize> = key.iter().copied().collect();

            for symbol_idx in 0..self.alphabet.len() {
                let symbol = self.alphabet[symbol_idx].clone();
                let next = self.advance_subset(&subset, &symbol);
                self.transitions[state_id as usize][symbol_idx] = next;
            }
        }

        let accepts = self.collect_accepting();
        let states: Vec<StateId> = (0..self.map.len() as StateId).collect();
        Dfa {
            states,
            start: 0,
            accepts,
            trans: self.transitions,
            alphabet: self.alphabet,
        }
    }

    fn ensure_capacity(&mut self, len: usize) {
        while self.transitions.len() < len {
            self.transitions.push(vec![None; self.alphabet.len()]);
        }
    }

    fn advance_subset(&mut self, subset: &BTreeSet<usize>, symbol: &str) -> Option<StateId> {
        let moved = sim::move_on(&self.adj, subset, symbol);
        if moved.is_empty() {
            return None;
        }
        let closure = sim::epsilon_closure(&self.adj, &moved);
        Some(self.lookup_or_insert(closure))
    }

    fn lookup_or_insert(&mut self, subset: BTreeSet<usize>) -> StateId {
        let key = set_to_key(subset);
        if let Some(id) = self.map.get(&key) {
            *id
        } else {
            let new_id = self.map.len() as StateId;
            self.map.insert(key.clone(), new_id);
            self.queue.push_back(key);
            new_id
        }
    }

    fn collect_accepting(&self) -> Vec<StateId> {
        self.map
            .iter()
            .filter_map(|(subset, id)| {
                let accepting = subset.iter().any(|&state| self.nfa.is_final(state));
                accepting.then_some(*id)
            })
            .collect()
    }
}

/// Whether two DFAs recognize the same language.
///
/// Walks the product of both automata over the union of their alphabets,
/// treating missing transitions as a rejecting sink.
#[must_use]
pub fn equivalent(a: &Dfa, b: &Dfa) -> bool {
    let mut alphabet: Vec<&String> = a.alphabet.iter().chain(b.alphabet.iter()).collect();
    alphabet.sort();
    alphabet.dedup();

    let step = |dfa: &Dfa, state: Option<StateId>, symbol: &String| -> Option<StateId> {
        let state = state?;
        let idx = dfa.alphabet.iter().position(|s| s == symbol)?;
        dfa.trans[state as usize][idx]
    };
    let accepting =
        |dfa: &Dfa, state: Option<StateId>| state.is_some_and(|s| dfa.accepts.contains(&s));

    let mut seen = HashSet::new();
    let mut stack = vec![(Some(a.start), Some(b.start))];
    while let Some(pair) = stack.pop() {
        if !seen.insert(pair) {
            continue;
        }
        let (sa, sb) = pair;
        if accepting(a, sa) != accepting(b, sb) {
            return false;
        }
        for symbol in &alphabet {
            let next = (step(a, sa, symbol), step(b, sb, symbol));
            if next != (None, None) {
                stack.push(next);
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn determinized(pattern: &str) -> Dfa {
        determinize(&Nfa::from_regex(&Ast::build(pattern).unwrap()))
    }

    #[test]
    fn test_determinize_symbol() {
        let dfa = determinized("a");
        assert_eq!(dfa.alphabet, vec!["a"]);
        assert_eq!(dfa.start, 0);
        assert_eq!(dfa.accepts, vec![1]);
        assert_eq!(dfa.trans, vec![vec![Some(1)], vec![None]]);
    }

    #[test]
    fn test_determinize_concat() {
        let dfa = determinized("a b");
        assert_eq!(dfa.alphabet, vec!["a", "b"]);
        assert_eq!(dfa.states.len(), 3);
        assert!(dfa.accepts(&["a", "b"]));
        assert!(!dfa.accepts(&["a"]));
        assert!(!dfa.accepts(&["b", "a"]));
    }

    #[test]
    fn test_determinize_star_accepts_empty() {
        let dfa = determinized("a*");
        assert!(dfa.accepts_empty());
        assert!(dfa.accepts(&["a", "a", "a"]));
        assert!(!dfa.accepts(&["b"]));
    }

    #[test]
    fn test_determinize_empty_language() {
        let dfa = determinized("");
        assert!(dfa.accepts.is_empty());
        assert!(!dfa.accepts(&[]));
    }

    #[test]
    fn test_dfa_round_trips_through_nfa() {
        let dfa = determinized("(a|b)* c");
        let again = determinize(&dfa.to_nfa());
        assert!(equivalent(&dfa, &again));
    }

    #[test]
    fn test_equivalent_detects_difference() {
        let a = determinized("a*");
        let b = determinized("a+");
        assert!(!equivalent(&a, &b));
        assert!(equivalent(&a, &determinized("(a*)*")));
    }
}
