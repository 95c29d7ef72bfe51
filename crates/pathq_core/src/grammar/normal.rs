//! Normal-form pipelines: Weak Chomsky Normal Form for the CFPQ solvers and
//! plain Chomsky Normal Form for CYK.

use std::collections::HashSet;

use indexmap::IndexSet;

use crate::grammar::cfg::{Cfg, Production, Symbol};

/// Converts a grammar to Weak Chomsky Normal Form.
///
/// After conversion every body is ε, a single terminal, or two nonterminals.
/// Unlike CNF, ε bodies survive on any nonterminal, so the language is
/// preserved exactly.
#[must_use]
pub fn to_wcnf(cfg: &Cfg) -> Cfg {
    let cleared = remove_useless(&eliminate_unit(&remove_useless(cfg)));
    decompose(&lift_terminals(&cleared))
}

/// Converts a grammar to Chomsky Normal Form.
///
/// The result generates the same language minus the empty word; CYK handles
/// the empty word separately through [`Cfg::generates_epsilon`].
#[must_use]
pub fn to_cnf(cfg: &Cfg) -> Cfg {
    let cleared = remove_useless(&eliminate_unit(&remove_epsilon(&remove_useless(cfg))));
    decompose(&lift_terminals(&cleared))
}

/// Drops productions mentioning non-generating or unreachable symbols.
fn remove_useless(cfg: &Cfg) -> Cfg {
    let mut generating: HashSet<&str> = HashSet::new();
    loop {
        let mut changed = false;
        for production in cfg.productions() {
            if generating.contains(production.head.as_str()) {
                continue;
            }
            let generates = production.body.iter().all(|s| match s {
                Symbol::Term(_) => true,
                Symbol::Var(v) => generating.contains(v.as_str()),
            });
            if generates {
                generating.insert(&production.head);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let generating_prods: Vec<&Production> = cfg
        .productions()
        .filter(|p| {
            generating.contains(p.head.as_str())
                && p.body
                    .iter()
                    .all(|s| !s.is_var() || generating.contains(s.name()))
        })
        .collect();

    let mut reachable: HashSet<&str> = HashSet::new();
    let mut stack = vec![cfg.start_symbol()];
    while let Some(var) = stack.pop() {
        if !reachable.insert(var) {
            continue;
        }
        for production in &generating_prods {
            if production.head == var {
                for symbol in &production.body {
                    if let Symbol::Var(v) = symbol {
                        stack.push(v);
                    }
                }
            }
        }
    }

    Cfg::new(
        cfg.start_symbol(),
        generating_prods
            .into_iter()
            .filter(|p| reachable.contains(p.head.as_str()))
            .cloned(),
    )
}

/// Replaces unit productions `A → B` by copying `B`'s non-unit bodies to `A`.
fn eliminate_unit(cfg: &Cfg) -> Cfg {
    fn unit_target(p: &Production) -> Option<&str> {
        match p.body.as_slice() {
            [Symbol::Var(v)] => Some(v),
            _ => None,
        }
    }

    let mut productions = IndexSet::new();
    for var in cfg.variables() {
        // Unit pairs (var, B) by closure over unit productions.
        let mut reach: IndexSet<String> = IndexSet::new();
        reach.insert(var.clone());
        let mut stack = vec![var.clone()];
        while let Some(current) = stack.pop() {
            for production in cfg.productions() {
                if production.head != current {
                    continue;
                }
                if let Some(target) = unit_target(production) {
                    if reach.insert(target.to_owned()) {
                        stack.push(target.to_owned());
                    }
                }
            }
        }

        for target in &reach {
            for production in cfg.productions() {
                if production.head == *target && unit_target(production).is_none() {
                    productions.insert(Production::new(var.clone(), production.body.clone()));
                }
            }
        }
    }

    Cfg::new(cfg.start_symbol(), productions)
}

/// Removes ε-productions by expanding every body over its nullable
/// positions. The resulting grammar generates the original language minus ε.
fn remove_epsilon(cfg: &Cfg) -> Cfg {
    let nullable = cfg.nullables();
    let mut productions = IndexSet::new();
    for production in cfg.productions() {
        let optional: Vec<usize> = production
            .body
            .iter()
            .enumerate()
            .filter(|(_, s)| matches!(s, Symbol::Var(v) if nullable.contains(v)))
            .map(|(i, _)| i)
            .collect();
        for mask in 0..(1u64 << optional.len()) {
            let body: Vec<Symbol> = production
                .body
                .iter()
                .enumerate()
                .filter(|(i, _)| match optional.iter().position(|&o| o == *i) {
                    Some(bit) => mask & (1 << bit) == 0,
                    None => true,
                })
                .map(|(_, s)| s.clone())
                .collect();
            if !body.is_empty() {
                productions.insert(Production::new(production.head.clone(), body));
            }
        }
    }
    Cfg::new(cfg.start_symbol(), productions)
}

/// In bodies of length two or more, replaces each terminal `t` with the
/// fresh nonterminal `t#CNF#` deriving it.
fn lift_terminals(cfg: &Cfg) -> Cfg {
    let mut lifted: IndexSet<String> = IndexSet::new();
    let mut productions = IndexSet::new();
    for production in cfg.productions() {
        if production.body.len() < 2 {
            productions.insert(production.clone());
            continue;
        }
        let body = production
            .body
            .iter()
            .map(|symbol| match symbol {
                Symbol::Var(_) => symbol.clone(),
                Symbol::Term(t) => {
                    lifted.insert(t.clone());
                    Symbol::var(format!("{t}#CNF#"))
                }
            })
            .collect();
        productions.insert(Production::new(production.head.clone(), body));
    }
    for terminal in lifted {
        productions.insert(Production::new(
            format!("{terminal}#CNF#"),
            vec![Symbol::term(terminal)],
        ));
    }
    Cfg::new(cfg.start_symbol(), productions)
}

/// Splits bodies longer than two into chains of fresh `C#CNF#n` variables.
fn decompose(cfg: &Cfg) -> Cfg {
    let mut counter = 0usize;
    let mut productions = IndexSet::new();
    for production in cfg.productions() {
        if production.body.len() <= 2 {
            productions.insert(production.clone());
            continue;
        }
        let mut head = production.head.clone();
        let mut rest = production.body.as_slice();
        while rest.len() > 2 {
            counter += 1;
            let fresh = format!("C#CNF#{counter}");
            productions.insert(Production::new(
                head,
                vec![rest[0].clone(), Symbol::var(fresh.clone())],
            ));
            head = fresh;
            rest = &rest[1..];
        }
        productions.insert(Production::new(head, rest.to_vec()));
    }
    Cfg::new(cfg.start_symbol(), productions)
}

/// Whether every production body is a legal WCNF body.
#[cfg(test)]
fn is_wcnf_body(body: &[Symbol]) -> bool {
    match body {
        [] => true,
        [Symbol::Term(_)] => true,
        [Symbol::Var(_), Symbol::Var(_)] => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wcnf_bodies_are_normal() {
        let cfg = Cfg::from_text("S -> a S b S | a b c | c", "S").unwrap();
        let wcnf = to_wcnf(&cfg);
        for production in wcnf.productions() {
            assert!(
                is_wcnf_body(&production.body),
                "body {:?} is not a WCNF body",
                production.body
            );
        }
    }

    #[test]
    fn test_wcnf_keeps_epsilon() {
        let cfg = Cfg::from_text("S ->\nS -> a S b", "S").unwrap();
        let wcnf = to_wcnf(&cfg);
        assert!(
            wcnf.productions().any(|p| p.body.is_empty()),
            "WCNF must keep the ε production"
        );
    }

    #[test]
    fn test_cnf_drops_epsilon() {
        let cfg = Cfg::from_text("S ->\nS -> a S b", "S").unwrap();
        let cnf = to_cnf(&cfg);
        assert!(cnf.productions().all(|p| !p.body.is_empty()));
        // The ε-free part of the language survives: nothing derivable is lost
        // beyond ε itself, which shows up as a nullable start before
        // conversion only.
        assert!(cfg.generates_epsilon());
        assert!(!cnf.generates_epsilon());
    }

    #[test]
    fn test_unit_productions_are_gone() {
        let cfg = Cfg::from_text("S -> A\nA -> B\nB -> b", "S").unwrap();
        let wcnf = to_wcnf(&cfg);
        for production in wcnf.productions() {
            assert!(!matches!(production.body.as_slice(), [Symbol::Var(_)]));
        }
        assert!(
            wcnf.productions()
                .any(|p| p.head == "S" && p.body == vec![Symbol::term("b")])
        );
    }

    #[test]
    fn test_useless_symbols_removed() {
        // `D` generates nothing, `U` is unreachable.
        let cfg = Cfg::from_text("S -> a | D d\nD -> D a\nU -> a", "S").unwrap();
        let wcnf = to_wcnf(&cfg);
        for production in wcnf.productions() {
            assert_ne!(production.head, "U");
            assert!(production.body.iter().all(|s| s.name() != "D"));
        }
    }

    #[test]
    fn test_non_generating_start_yields_no_productions() {
        let cfg = Cfg::from_text("S -> S a", "S").unwrap();
        let wcnf = to_wcnf(&cfg);
        assert_eq!(wcnf.productions().count(), 0);
    }
}
