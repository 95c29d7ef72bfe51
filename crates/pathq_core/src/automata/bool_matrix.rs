use std::collections::{BTreeMap, HashSet};

use indexmap::IndexSet;
use tracing::debug;

use crate::automata::nfa::Nfa;
use crate::automata::state::{Label, Value};
use crate::errors::ShapeError;
use crate::grammar::Rsm;
use crate::matrix::{BoolMatrix, SparseBitMatrix};

/// Result of a synchronous BFS over a product automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BfsResult {
    /// Final graph states reachable from any start state.
    All(HashSet<Value>),
    /// `(start, reached)` pairs, tracked separately per start state.
    PerSource(HashSet<(Value, Value)>),
}

/// A labeled automaton held as one boolean adjacency matrix per label.
///
/// States are indexed in registration order; `mats[label][i, j]` is set iff
/// there is an `i —label→ j` transition. ε-transitions live under the
/// dedicated ε label. Every operation returns freshly owned objects and
/// leaves its operands untouched.
#[derive(Debug, Clone)]
pub struct BoolMatrixAutomaton<M: BoolMatrix = SparseBitMatrix> {
    states: IndexSet<Value>,
    starts: IndexSet<usize>,
    finals: IndexSet<usize>,
    mats: BTreeMap<Label, M>,
}

impl<M: BoolMatrix> BoolMatrixAutomaton<M> {
    /// Number of states.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// States in index order.
    pub fn states(&self) -> impl Iterator<Item = &Value> {
        self.states.iter()
    }

    /// The state at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= state_count()`.
    #[must_use]
    pub fn state_at(&self, idx: usize) -> &Value {
        self.states
            .get_index(idx)
            .expect("state index out of range")
    }

    /// Whether the state at `idx` is a start state.
    #[must_use]
    pub fn is_start_index(&self, idx: usize) -> bool {
        self.starts.contains(&idx)
    }

    /// Whether the state at `idx` is a final state.
    #[must_use]
    pub fn is_final_index(&self, idx: usize) -> bool {
        self.finals.contains(&idx)
    }

    /// Start states, in the order they were registered.
    pub fn start_states(&self) -> impl Iterator<Item = &Value> {
        self.starts.iter().map(|&i| self.state_at(i))
    }

    /// Final states, in the order they were registered.
    pub fn final_states(&self) -> impl Iterator<Item = &Value> {
        self.finals.iter().map(|&i| self.state_at(i))
    }

    /// Labels that have an adjacency matrix.
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.mats.keys()
    }

    /// The adjacency matrix for `label`, if present.
    #[must_use]
    pub fn mat(&self, label: &Label) -> Option<&M> {
        self.mats.get(label)
    }

    /// The adjacency matrix for `label`, created as all-zero if absent.
    pub fn ensure_label(&mut self, label: Label) -> &mut M {
        let n = self.states.len();
        self.mats.entry(label).or_insert_with(|| M::zeros(n, n))
    }

    /// Builds the matrix view of an NFA. State indices follow the NFA's
    /// registration order; start and final sets are copied.
    #[must_use]
    pub fn from_nfa(nfa: &Nfa) -> Self {
        let states: IndexSet<Value> = nfa.states().cloned().collect();
        let n = states.len();
        let mut mats: BTreeMap<Label, M> = BTreeMap::new();
        for (from, label, to) in nfa.transitions() {
            mats.entry(label.clone())
                .or_insert_with(|| M::zeros(n, n))
                .set(*from, *to);
        }
        Self {
            states,
            starts: nfa.start_indices().collect(),
            finals: nfa.final_indices().collect(),
            mats,
        }
    }

    /// Builds the matrix view of a whole RSM. Box states are tagged
    /// `(head, state)` and indexed box by box; the start state of every box
    /// is a start state here, and box accepting states are final.
    #[must_use]
    pub fn from_rsm(rsm: &Rsm) -> Self {
        let total: usize = rsm.boxes().map(|(_, dfa)| dfa.states.len()).sum();
        let mut out = Self {
            states: IndexSet::new(),
            starts: IndexSet::new(),
            finals: IndexSet::new(),
            mats: BTreeMap::new(),
        };
        let mut offset = 0;
        for (head, dfa) in rsm.boxes() {
            for &state in &dfa.states {
                out.states.insert(Value::pair(
                    Value::Str(head.clone()),
                    Value::Int(i64::from(state)),
                ));
            }
            out.starts.insert(offset + dfa.start as usize);
            for &accept in &dfa.accepts {
                out.finals.insert(offset + accept as usize);
            }
            for (from, row) in dfa.trans.iter().enumerate() {
                for (sym_idx, target) in row.iter().enumerate() {
                    if let Some(to) = target {
                        out.mats
                            .entry(Label::sym(dfa.alphabet[sym_idx].clone()))
                            .or_insert_with(|| M::zeros(total, total))
                            .set(offset + from, offset + *to as usize);
                    }
                }
            }
            offset += dfa.states.len();
        }
        out
    }

    /// Converts back into an explicit NFA by enumerating matrix nonzeros.
    #[must_use]
    pub fn to_nfa(&self) -> Nfa {
        let mut nfa = Nfa::new();
        for state in &self.states {
            nfa.add_state(state.clone());
        }
        for (label, mat) in &self.mats {
            for (i, j) in mat.nonzeros() {
                nfa.add_transition(
                    self.state_at(i).clone(),
                    label.clone(),
                    self.state_at(j).clone(),
                );
            }
        }
        for &idx in &self.starts {
            nfa.add_start(self.state_at(idx).clone());
        }
        for &idx in &self.finals {
            nfa.add_final(self.state_at(idx).clone());
        }
        nfa
    }

    /// The product automaton of `self` and `other`.
    ///
    /// The product state `(i, j)` is indexed `i · |Q₂| + j`; every consumer
    /// that decodes product indices relies on exactly this mapping. Only
    /// labels known to both operands survive, with Kronecker-multiplied
    /// matrices; starts and finals are the set products.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        let mut mats = BTreeMap::new();
        for (label, mat) in &self.mats {
            if let Some(other_mat) = other.mats.get(label) {
                mats.insert(label.clone(), mat.kron(other_mat));
            }
        }

        let mut states = IndexSet::new();
        let mut starts = IndexSet::new();
        let mut finals = IndexSet::new();
        let other_n = other.states.len();
        for (i, left) in self.states.iter().enumerate() {
            for (j, right) in other.states.iter().enumerate() {
                let idx = i * other_n + j;
                states.insert(Value::pair(left.clone(), right.clone()));
                if self.starts.contains(&i) && other.starts.contains(&j) {
                    starts.insert(idx);
                }
                if self.finals.contains(&i) && other.finals.contains(&j) {
                    finals.insert(idx);
                }
            }
        }

        Self {
            states,
            starts,
            finals,
            mats,
        }
    }

    /// Label-blind reachability via one or more transitions.
    ///
    /// ORs every label matrix together and squares until the nonzero count
    /// stops changing. The reflexive closure is not included: the diagonal is
    /// set only where a state lies on a cycle.
    pub fn transitive_closure(&self) -> Result<M, ShapeError> {
        let n = self.states.len();
        let mut closure = M::zeros(n, n);
        for mat in self.mats.values() {
            closure = closure.or(mat)?;
        }
        if closure.nnz() == 0 {
            return Ok(closure);
        }
        loop {
            let next = closure.or(&closure.mul(&closure)?)?;
            if next.nnz() == closure.nnz() {
                debug!(states = n, nnz = next.nnz(), "transitive closure reached fixpoint");
                return Ok(next);
            }
            closure = next;
        }
    }

    /// Block-diagonal union: `self`'s states keep their indices and
    /// `other`'s are shifted by `self.state_count()`. Only labels known to
    /// both operands are kept. The operands' state values are expected to be
    /// disjoint.
    #[must_use]
    pub fn direct_sum(&self, other: &Self) -> Self {
        let n1 = self.states.len();
        let n = n1 + other.states.len();

        let mut mats = BTreeMap::new();
        for (label, mat) in &self.mats {
            if let Some(other_mat) = other.mats.get(label) {
                let mut block = M::zeros(n, n);
                for (i, j) in mat.nonzeros() {
                    block.set(i, j);
                }
                for (i, j) in other_mat.nonzeros() {
                    block.set(n1 + i, n1 + j);
                }
                mats.insert(label.clone(), block);
            }
        }

        let mut states = self.states.clone();
        states.extend(other.states.iter().cloned());
        debug_assert_eq!(states.len(), n, "direct_sum operands must not share states");

        Self {
            states,
            starts: self
                .starts
                .iter()
                .copied()
                .chain(other.starts.iter().map(|&j| n1 + j))
                .collect(),
            finals: self
                .finals
                .iter()
                .copied()
                .chain(other.finals.iter().map(|&j| n1 + j))
                .collect(),
            mats,
        }
    }

    /// Multi-source BFS over the product of `self` (the graph) with `query`
    /// (a DFA), reporting which final graph states are reached through paths
    /// the query accepts.
    ///
    /// The front matrix has `p + q` columns, where `p` is the query state
    /// count and `q` the graph state count: the first `p` columns carry a
    /// query-state identity block and the last `q` columns carry the graph
    /// frontier. In per-source mode each graph start state owns a `p`-row
    /// block of the front. Each sweep multiplies the front by every shared
    /// label's block-diagonal matrix (query block first, graph block shifted)
    /// and re-aligns the identity columns, until the visited set stops
    /// growing. Cells already present in the initial front are not reported.
    pub fn sync_bfs(&self, query: &Self, reachable_per_node: bool) -> Result<BfsResult, ShapeError> {
        let q = self.states.len();
        let p = query.states.len();
        if p == 0 || q == 0 {
            return Ok(if reachable_per_node {
                BfsResult::PerSource(HashSet::new())
            } else {
                BfsResult::All(HashSet::new())
            });
        }

        let graph_starts: Vec<usize> = self.starts.iter().copied().collect();
        let d_mats: Vec<M> = query
            .mats
            .iter()
            .filter_map(|(label, query_mat)| {
                self.mats.get(label).map(|graph_mat| {
                    let mut block = M::zeros(p + q, p + q);
                    for (i, j) in query_mat.nonzeros() {
                        block.set(i, j);
                    }
                    for (i, j) in graph_mat.nonzeros() {
                        block.set(p + i, p + j);
                    }
                    block
                })
            })
            .collect();

        let rows = if reachable_per_node {
            graph_starts.len() * p
        } else {
            p
        };
        let mut front = M::zeros(rows, p + q);
        if reachable_per_node {
            for (block, &graph_start) in graph_starts.iter().enumerate() {
                for &query_start in &query.starts {
                    front.set(block * p + query_start, query_start);
                    front.set(block * p + query_start, p + graph_start);
                }
            }
        } else {
            for &query_start in &query.starts {
                front.set(query_start, query_start);
                for &graph_start in &graph_starts {
                    front.set(query_start, p + graph_start);
                }
            }
        }

        let initial = front.clone();
        let mut visited = front.clone();

        loop {
            let before = visited.nnz();
            let mut new_front = M::zeros(rows, p + q);
            for block in &d_mats {
                let step = front.mul(block)?;
                new_front = new_front.or(&realign(&step, p))?;
            }
            let fresh = new_front.sub(&visited)?;
            visited = visited.or(&fresh)?;
            front = fresh;
            if visited.nnz() == before {
                break;
            }
            debug!(visited = visited.nnz(), front = front.nnz(), "bfs sweep");
        }

        let reached = visited.sub(&initial)?;
        let mut all = HashSet::new();
        let mut pairs = HashSet::new();
        for (i, j) in reached.nonzeros() {
            if j < p || !query.finals.contains(&(i % p)) {
                continue;
            }
            let graph_state = j - p;
            if !self.finals.contains(&graph_state) {
                continue;
            }
            let target = self.state_at(graph_state).clone();
            if reachable_per_node {
                let source = self.state_at(graph_starts[i / p]).clone();
                pairs.insert((source, target));
            } else {
                all.insert(target);
            }
        }
        Ok(if reachable_per_node {
            BfsResult::PerSource(pairs)
        } else {
            BfsResult::All(all)
        })
    }
}

/// Re-aligns a BFS step: for every row whose query part advanced to state
/// `j`, the graph tail of that row is copied into row `j` of the row's block,
/// together with the identity bit at column `j`.
fn realign<M: BoolMatrix>(step: &M, p: usize) -> M {
    let (rows, cols) = step.shape();
    let mut aligned = M::zeros(rows, cols);
    for row in 0..rows {
        let (head, tail): (Vec<usize>, Vec<usize>) =
            step.row_nonzeros(row).into_iter().partition(|&col| col < p);
        if tail.is_empty() {
            continue;
        }
        let block_base = row / p * p;
        for &next_query in &head {
            aligned.set(block_base + next_query, next_query);
            for &col in &tail {
                aligned.set(block_base + next_query, col);
            }
        }
    }
    aligned
}
