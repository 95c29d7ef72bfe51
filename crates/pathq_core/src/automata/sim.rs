//! Step-by-step simulation of automata on words.

use std::collections::BTreeSet;

use crate::automata::dfa::Dfa;
use crate::automata::nfa::Nfa;
use crate::automata::state::Label;

/// Outgoing transitions per state, derived from an NFA's transition list.
pub(crate) fn adjacency(nfa: &Nfa) -> Vec<Vec<(Label, usize)>> {
    let mut adj = vec![Vec::new(); nfa.state_count()];
    for (from, label, to) in nfa.transitions() {
        adj[*from].push((label.clone(), *to));
    }
    adj
}

/// States reachable from `seed` through ε-transitions alone, `seed` included.
pub(crate) fn epsilon_closure(
    adj: &[Vec<(Label, usize)>],
    seed: &BTreeSet<usize>,
) -> BTreeSet<usize> {
    let mut closure = seed.clone();
    let mut stack: Vec<usize> = seed.iter().copied().collect();
    while let Some(state) = stack.pop() {
        for (label, to) in &adj[state] {
            if label.is_eps() && closure.insert(*to) {
                stack.push(*to);
            }
        }
    }
    closure
}

/// States reachable from `set` by exactly one transition on `symbol`.
pub(crate) fn move_on(
    adj: &[Vec<(Label, usize)>],
    set: &BTreeSet<usize>,
    symbol: &str,
) -> BTreeSet<usize> {
    let mut moved = BTreeSet::new();
    for &state in set {
        for (label, to) in &adj[state] {
            if matches!(label, Label::Sym(s) if s == symbol) {
                moved.insert(*to);
            }
        }
    }
    moved
}

/// Whether `nfa` accepts the given word of symbols.
#[must_use]
pub fn nfa_accepts(nfa: &Nfa, word: &[&str]) -> bool {
    let adj = adjacency(nfa);
    let seed: BTreeSet<usize> = nfa.start_indices().collect();
    let mut current = epsilon_closure(&adj, &seed);
    for symbol in word {
        let moved = move_on(&adj, &current, symbol);
        if moved.is_empty() {
            return false;
        }
        current = epsilon_closure(&adj, &moved);
    }
    current.iter().any(|&state| nfa.is_final(state))
}

/// Walks `dfa`'s transition table on the given word of symbols.
#[must_use]
pub fn dfa_accepts(dfa: &Dfa, word: &[&str]) -> bool {
    let mut current = dfa.start;
    for symbol in word {
        let Some(idx) = dfa.alphabet.iter().position(|s| s == symbol) else {
            return false;
        };
        match dfa.trans[current as usize][idx] {
            Some(next) => current = next,
            None => return false,
        }
    }
    dfa.accepts.contains(&current)
}
