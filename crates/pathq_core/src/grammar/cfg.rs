use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexSet;

use crate::errors::GrammarError;

/// A grammar symbol: a nonterminal or a terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    /// A nonterminal (variable).
    Var(String),
    /// A terminal.
    Term(String),
}

impl Symbol {
    /// Creates a nonterminal symbol.
    #[must_use]
    pub fn var(name: impl Into<String>) -> Symbol {
        Symbol::Var(name.into())
    }

    /// Creates a terminal symbol.
    #[must_use]
    pub fn term(name: impl Into<String>) -> Symbol {
        Symbol::Term(name.into())
    }

    /// Whether this symbol is a nonterminal.
    #[must_use]
    pub fn is_var(&self) -> bool {
        matches!(self, Symbol::Var(_))
    }

    /// The textual value of the symbol.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Symbol::Var(name) | Symbol::Term(name) => name,
        }
    }
}

/// A single production `head → body`. An empty body denotes ε.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    pub head: String,
    pub body: Vec<Symbol>,
}

impl Production {
    /// Creates a new [`Production`].
    #[must_use]
    pub fn new(head: impl Into<String>, body: Vec<Symbol>) -> Self {
        Self {
            head: head.into(),
            body,
        }
    }
}

/// A context-free grammar.
///
/// Grammars are immutable once built; deriving a grammar with a different
/// start symbol goes through [`Cfg::with_start`] rather than mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cfg {
    start: String,
    productions: IndexSet<Production>,
}

impl Cfg {
    /// Creates a grammar from a start symbol and productions. Duplicate
    /// productions collapse; insertion order is preserved.
    #[must_use]
    pub fn new(start: impl Into<String>, productions: impl IntoIterator<Item = Production>) -> Self {
        Self {
            start: start.into(),
            productions: productions.into_iter().collect(),
        }
    }

    /// The start symbol.
    #[must_use]
    pub fn start_symbol(&self) -> &str {
        &self.start
    }

    /// Productions in insertion order.
    pub fn productions(&self) -> impl Iterator<Item = &Production> {
        self.productions.iter()
    }

    /// A grammar with the same productions and a different start symbol.
    #[must_use]
    pub fn with_start(&self, start: impl Into<String>) -> Cfg {
        Cfg {
            start: start.into(),
            productions: self.productions.clone(),
        }
    }

    /// All nonterminals: the start symbol, production heads and every
    /// variable occurring in a body, in first-appearance order.
    #[must_use]
    pub fn variables(&self) -> IndexSet<String> {
        let mut vars = IndexSet::new();
        vars.insert(self.start.clone());
        for production in &self.productions {
            vars.insert(production.head.clone());
            for symbol in &production.body {
                if let Symbol::Var(name) = symbol {
                    vars.insert(name.clone());
                }
            }
        }
        vars
    }

    /// All terminals, in first-appearance order.
    #[must_use]
    pub fn terminals(&self) -> IndexSet<String> {
        let mut terms = IndexSet::new();
        for production in &self.productions {
            for symbol in &production.body {
                if let Symbol::Term(name) = symbol {
                    terms.insert(name.clone());
                }
            }
        }
        terms
    }

    /// Nonterminals that derive ε.
    #[must_use]
    pub fn nullables(&self) -> HashSet<String> {
        let mut nullable: HashSet<String> = HashSet::new();
        loop {
            let mut changed = false;
            for production in &self.productions {
                if nullable.contains(&production.head) {
                    continue;
                }
                let all_nullable = production
                    .body
                    .iter()
                    .all(|s| matches!(s, Symbol::Var(v) if nullable.contains(v)));
                if all_nullable {
                    nullable.insert(production.head.clone());
                    changed = true;
                }
            }
            if !changed {
                return nullable;
            }
        }
    }

    /// Whether the grammar generates the empty word.
    #[must_use]
    pub fn generates_epsilon(&self) -> bool {
        self.nullables().contains(&self.start)
    }

    /// Reads a grammar from text: one `HEAD -> BODY` rule per line, bodies
    /// split on `|` into alternatives of whitespace-separated symbols.
    /// Symbols starting with an uppercase letter are nonterminals; an empty
    /// alternative is ε. Blank lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`GrammarError`] for lines without `->` or with a head that
    /// is not a single nonterminal identifier.
    pub fn from_text(text: &str, start: impl Into<String>) -> Result<Cfg, GrammarError> {
        let mut productions = IndexSet::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let line_no = idx + 1;
            let Some((head, bodies)) = line.split_once("->") else {
                return Err(GrammarError::MalformedLine { line: line_no });
            };
            let head = parse_head(head, line_no)?;
            for alternative in bodies.split('|') {
                let body = alternative.split_whitespace().map(classify).collect();
                productions.insert(Production::new(head.clone(), body));
            }
        }
        Ok(Cfg {
            start: start.into(),
            productions,
        })
    }

    /// Reads a grammar from a file via [`Cfg::from_text`].
    ///
    /// # Errors
    ///
    /// Returns a [`GrammarError`] on I/O failure or malformed grammar text.
    pub fn from_file(path: impl AsRef<Path>, start: impl Into<String>) -> Result<Cfg, GrammarError> {
        let text = std::fs::read_to_string(path)?;
        Cfg::from_text(&text, start)
    }
}

/// Whether a token names a nonterminal (leading uppercase letter).
pub(crate) fn is_variable_token(token: &str) -> bool {
    token.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// Validates a production head: a single nonterminal identifier.
pub(crate) fn parse_head(raw: &str, line_no: usize) -> Result<String, GrammarError> {
    let head = raw.trim();
    if head.split_whitespace().count() == 1 && is_variable_token(head) {
        Ok(head.to_owned())
    } else {
        Err(GrammarError::InvalidHead {
            line: line_no,
            found: head.to_owned(),
        })
    }
}

fn classify(token: &str) -> Symbol {
    if is_variable_token(token) {
        Symbol::var(token)
    } else {
        Symbol::term(token)
    }
}
