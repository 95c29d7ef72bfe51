use std::collections::HashSet;

use crate::grammar::cfg::{Cfg, Symbol};
use crate::grammar::to_cnf;

/// Decides whether the grammar generates `word` using the CYK dynamic
/// program over the grammar's Chomsky Normal Form.
///
/// The word is read character by character, so single-character terminals
/// are matched. The empty word is answered directly from the grammar's
/// nullability.
#[must_use]
pub fn cyk(word: &str, cfg: &Cfg) -> bool {
    if word.is_empty() {
        return cfg.generates_epsilon();
    }

    let cnf = to_cnf(cfg);
    let chars: Vec<String> = word.chars().map(String::from).collect();
    let n = chars.len();

    let mut term_prods = Vec::new();
    let mut pair_prods = Vec::new();
    for production in cnf.productions() {
        match production.body.as_slice() {
            [Symbol::Term(t)] => term_prods.push((&production.head, t)),
            [Symbol::Var(a), Symbol::Var(b)] => pair_prods.push((&production.head, a, b)),
            _ => {}
        }
    }

    // dp[i][j] holds the heads deriving chars[i..=j].
    let mut dp: Vec<Vec<HashSet<&String>>> = vec![vec![HashSet::new(); n]; n];
    for (i, c) in chars.iter().enumerate() {
        dp[i][i] = term_prods
            .iter()
            .filter(|(_, t)| *t == c)
            .map(|(head, _)| *head)
            .collect();
    }

    for step in 1..n {
        for i in 0..n - step {
            let j = i + step;
            for k in i..j {
                let found: Vec<&String> = pair_prods
                    .iter()
                    .filter(|(_, a, b)| dp[i][k].contains(a) && dp[k + 1][j].contains(b))
                    .map(|(head, _, _)| *head)
                    .collect();
                dp[i][j].extend(found);
            }
        }
    }

    dp[0][n - 1]
        .iter()
        .any(|head| head.as_str() == cfg.start_symbol())
}
