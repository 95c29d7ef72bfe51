//! The regex dialect used for regular-path queries and ECFG bodies.
//!
//! Atoms are multi-character symbols (graph edge labels, grammar terminals
//! and nonterminals), so `load next*` means "one `load`, one `next`, then any
//! number of `next`". Whitespace and `.` separate concatenated atoms; `$` is
//! the explicit ε literal; the empty pattern denotes the empty language.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod tokens;

pub use self::ast::Ast;
