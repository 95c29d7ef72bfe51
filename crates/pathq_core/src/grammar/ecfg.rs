use indexmap::IndexMap;

use crate::automata::dfa::determinize;
use crate::automata::nfa::Nfa;
use crate::errors::GrammarError;
use crate::grammar::cfg::{Cfg, parse_head};
use crate::grammar::rsm::Rsm;
use crate::regex::Ast;

/// An extended context-free grammar: one regex over `V ∪ T` per nonterminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ecfg {
    start: String,
    productions: IndexMap<String, Ast>,
}

impl Ecfg {
    /// Creates an ECFG from a start symbol and per-head regexes.
    #[must_use]
    pub fn new(start: impl Into<String>, productions: IndexMap<String, Ast>) -> Self {
        Self {
            start: start.into(),
            productions,
        }
    }

    /// The start symbol.
    #[must_use]
    pub fn start_symbol(&self) -> &str {
        &self.start
    }

    /// `(head, regex)` entries in insertion order.
    pub fn productions(&self) -> impl Iterator<Item = (&String, &Ast)> {
        self.productions.iter()
    }

    /// The regex for `head`, if present.
    #[must_use]
    pub fn production(&self, head: &str) -> Option<&Ast> {
        self.productions.get(head)
    }

    /// Number of heads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.productions.len()
    }

    /// Whether the grammar has no productions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.productions.is_empty()
    }

    /// Reads an ECFG from text: one `HEAD -> regex` rule per non-blank line.
    ///
    /// # Errors
    ///
    /// Returns a [`GrammarError`] when a line does not contain exactly one
    /// `->`, a head is not a single nonterminal identifier, a head repeats,
    /// or a body regex fails to parse.
    pub fn from_text(text: &str, start: impl Into<String>) -> Result<Ecfg, GrammarError> {
        let mut productions = IndexMap::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let line_no = idx + 1;
            let parts: Vec<&str> = line.split("->").collect();
            let [head, body] = parts.as_slice() else {
                return Err(GrammarError::MalformedLine { line: line_no });
            };
            let head = parse_head(head, line_no)?;
            if productions.contains_key(&head) {
                return Err(GrammarError::DuplicateHead { head });
            }
            let body = Ast::build(body.trim()).map_err(|source| GrammarError::BadBody {
                head: head.clone(),
                source,
            })?;
            productions.insert(head, body);
        }
        Ok(Ecfg {
            start: start.into(),
            productions,
        })
    }

    /// Derives an ECFG from a CFG by grouping productions per head.
    ///
    /// Each head's regex is the `|`-union of its bodies; a body is the
    /// concatenation of its symbols' textual values and an empty body is ε.
    /// Variables without productions map to the empty language.
    #[must_use]
    pub fn from_cfg(cfg: &Cfg) -> Ecfg {
        let mut productions: IndexMap<String, Option<Ast>> = cfg
            .variables()
            .into_iter()
            .map(|var| (var, None))
            .collect();
        for production in cfg.productions() {
            let body = body_regex(&production.body);
            let entry = productions
                .entry(production.head.clone())
                .or_insert(None);
            *entry = Some(match entry.take() {
                Some(existing) => Ast::alt(existing, body),
                None => body,
            });
        }
        Ecfg {
            start: cfg.start_symbol().to_owned(),
            productions: productions
                .into_iter()
                .map(|(head, ast)| (head, ast.unwrap_or(Ast::Empty)))
                .collect(),
        }
    }

    /// Builds the recursive state machine: every head's regex becomes a
    /// determinized box automaton.
    #[must_use]
    pub fn to_rsm(&self) -> Rsm {
        let boxes = self
            .productions
            .iter()
            .map(|(head, ast)| (head.clone(), determinize(&Nfa::from_regex(ast))))
            .collect();
        Rsm::new(self.start.clone(), boxes)
    }
}

fn body_regex(body: &[crate::grammar::cfg::Symbol]) -> Ast {
    let mut symbols = body.iter();
    match symbols.next() {
        None => Ast::Epsilon,
        Some(first) => symbols.fold(Ast::sym(first.name()), |acc, symbol| {
            Ast::concat(acc, Ast::sym(symbol.name()))
        }),
    }
}
