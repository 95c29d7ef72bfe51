//! Automata: ε-NFAs over opaque state values, table DFAs, and the
//! boolean-matrix view the query solvers operate on.

pub mod bool_matrix;
pub mod dfa;
pub mod min;
pub mod nfa;
pub mod sim;
pub mod state;

use crate::matrix::SparseBitMatrix;

pub use self::bool_matrix::{BfsResult, BoolMatrixAutomaton};
pub use self::dfa::{Dfa, determinize, equivalent, regex_to_min_dfa};
pub use self::min::minimize;
pub use self::nfa::Nfa;
pub use self::state::{Label, StateId, Value};

/// Intersects two ε-NFAs through their boolean-matrix views.
///
/// Both automata are lifted into [`BoolMatrixAutomaton`]s, intersected via
/// the Kronecker product and converted back. Product states are value pairs.
#[must_use]
pub fn intersect_automata(first: &Nfa, second: &Nfa) -> Nfa {
    let first = BoolMatrixAutomaton::<SparseBitMatrix>::from_nfa(first);
    let second = BoolMatrixAutomaton::from_nfa(second);
    first.intersect(&second).to_nfa()
}
