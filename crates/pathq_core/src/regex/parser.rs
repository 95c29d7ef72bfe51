use crate::errors::{ParseError, ParseErrorKind};
use crate::regex::ast::Ast;
use crate::regex::tokens::{Token, TokenKind};

/// Converts a token stream into an [`Ast`] using recursive descent.
///
/// An empty pattern (only the end-of-stream token) denotes the empty
/// language, [`Ast::Empty`].
///
/// # Errors
///
/// Returns a [`ParseError`] on malformed patterns.
pub fn parse(tokens: &[Token]) -> Result<Ast, ParseError> {
    let mut parser = Parser::new(tokens);
    if parser.peek_kind() == Some(&TokenKind::Eos) {
        return Ok(Ast::Empty);
    }
    let ast = parser.parse_alt()?;
    parser.expect(&TokenKind::Eos)?;
    Ok(ast)
}

/// Stateful parser over a token slice.
struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parses an alternation (`lhs | rhs`).
    fn parse_alt(&mut self) -> Result<Ast, ParseError> {
        let mut node = self.parse_concat()?;
        while self.matches(&TokenKind::Or) {
            let rhs = self.parse_concat()?;
            node = Ast::alt(node, rhs);
        }
        Ok(node)
    }

    /// Parses implicit concatenation of atoms.
    fn parse_concat(&mut self) -> Result<Ast, ParseError> {
        let mut nodes = Vec::new();
        while self.can_start_atom() {
            nodes.push(self.parse_repeat()?);
        }
        match nodes.len() {
            0 => {
                if matches!(
                    self.peek_kind(),
                    Some(TokenKind::Star | TokenKind::Plus | TokenKind::QMark)
                ) {
                    Err(self.error_here(ParseErrorKind::MisplacedPostfix))
                } else {
                    Err(self.error_here(ParseErrorKind::EmptyAlternative))
                }
            }
            1 => Ok(nodes.remove(0)),
            _ => Ok(chain_concat(nodes)),
        }
    }

    /// Parses unary postfix operators (`*`, `+`, `?`).
    fn parse_repeat(&mut self) -> Result<Ast, ParseError> {
        let mut node = self.parse_atom()?;
        while let Some(apply) = self.next_repetition() {
            node = apply(node);
        }
        Ok(node)
    }

    /// Determines whether the current token may begin an atom.
    fn can_start_atom(&self) -> bool {
        matches!(
            self.peek_kind(),
            Some(TokenKind::Sym(_) | TokenKind::Epsilon | TokenKind::LParen)
        )
    }

    /// Parses a single atom (symbol, ε literal or grouped sub-expression).
    fn parse_atom(&mut self) -> Result<Ast, ParseError> {
        match self.peek_kind() {
            Some(TokenKind::Sym(s)) => {
                let node = Ast::Sym(s.clone());
                self.advance();
                Ok(node)
            }
            Some(TokenKind::Epsilon) => {
                self.advance();
                Ok(Ast::Epsilon)
            }
            Some(TokenKind::LParen) => {
                self.advance();
                let node = self.parse_alt()?;
                self.expect(&TokenKind::RParen)?;
                Ok(node)
            }
            Some(TokenKind::Eos) | None => Err(self.error_here(ParseErrorKind::UnexpectedEos)),
            Some(other) => Err(self.error_here(ParseErrorKind::UnexpectedToken {
                found: other.to_string(),
            })),
        }
    }

    /// Returns and consumes the next repetition operator, if any.
    fn next_repetition(&mut self) -> Option<fn(Ast) -> Ast> {
        let apply: fn(Ast) -> Ast = match self.peek_kind() {
            Some(TokenKind::Star) => Ast::star,
            Some(TokenKind::Plus) => Ast::plus,
            Some(TokenKind::QMark) => Ast::opt,
            _ => return None,
        };
        self.advance();
        Some(apply)
    }

    /// Consumes the next token if it matches the provided kind.
    fn matches(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consumes the next token or reports a detailed error.
    fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.peek_kind() == Some(kind) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected_token_error())
        }
    }

    fn unexpected_token_error(&self) -> ParseError {
        match self.peek() {
            Some(tok) => ParseError::new(
                tok.pos,
                ParseErrorKind::UnexpectedToken {
                    found: tok.kind.to_string(),
                },
            ),
            None => ParseError::new(self.last_column(), ParseErrorKind::UnexpectedEos),
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&'a TokenKind> {
        self.peek().map(|tok| &tok.kind)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn error_here(&self, kind: ParseErrorKind) -> ParseError {
        let column = self
            .peek()
            .map(|t| t.pos)
            .unwrap_or_else(|| self.last_column());
        ParseError::new(column, kind)
    }

    fn last_column(&self) -> usize {
        self.tokens.last().map(|tok| tok.pos).unwrap_or_default()
    }
}

fn chain_concat(nodes: Vec<Ast>) -> Ast {
    let mut it = nodes.into_iter();
    let mut acc = it.next().expect("chain_concat requires a non-empty vector");
    for node in it {
        acc = Ast::concat(acc, node);
    }
    acc
}
