use thiserror::Error;

/// Error emitted by the regex lexer with a message and column position.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message} at column {column}")]
pub struct LexError {
    /// Column at which the error occurred (1-indexed).
    pub column: usize,
    /// Human-readable error message.
    pub message: String,
}

impl LexError {
    /// Creates a new [`LexError`].
    #[must_use]
    pub fn new(column: usize, message: impl Into<String>) -> Self {
        Self {
            column,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("unexpected end of input")]
    UnexpectedEos,
    #[error("unexpected token {found}")]
    UnexpectedToken { found: String },
    #[error("illegal postfix operator usage")]
    MisplacedPostfix,
    #[error("empty alternative")]
    EmptyAlternative,
}

/// Regex parser error annotated with the offending column and kind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} at column {column}")]
pub struct ParseError {
    /// Column at which the parser reported the error.
    pub column: usize,
    /// Detailed categorization of the error.
    pub kind: ParseErrorKind,
}

impl ParseError {
    /// Creates a new [`ParseError`].
    #[must_use]
    pub fn new(column: usize, kind: ParseErrorKind) -> Self {
        Self { column, kind }
    }
}

/// Failure while turning a regex pattern into an automaton.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegexError {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Failure while reading grammar text (CFG or ECFG).
#[derive(Debug, Error)]
pub enum GrammarError {
    /// A non-blank line does not have exactly one `->` separator.
    #[error("line {line}: expected exactly one `->`")]
    MalformedLine { line: usize },
    /// The head of a production is not a single nonterminal identifier.
    #[error("line {line}: invalid head {found:?}")]
    InvalidHead { line: usize, found: String },
    /// An ECFG head appeared on more than one line.
    #[error("duplicate head {head:?}")]
    DuplicateHead { head: String },
    /// The regex body of an ECFG production failed to parse.
    #[error("invalid body for {head:?}: {source}")]
    BadBody { head: String, source: RegexError },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Shape mismatch inside a matrix operation.
///
/// All shapes are established when an automaton is built, so hitting this
/// means a bug in the engine rather than bad user input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{op}: incompatible shapes {lhs:?} and {rhs:?}")]
pub struct ShapeError {
    /// Name of the offending operation.
    pub op: &'static str,
    /// Shape of the left operand.
    pub lhs: (usize, usize),
    /// Shape of the right operand.
    pub rhs: (usize, usize),
}

impl ShapeError {
    #[must_use]
    pub fn new(op: &'static str, lhs: (usize, usize), rhs: (usize, usize)) -> Self {
        Self { op, lhs, rhs }
    }
}

/// Top-level failure type returned by the query entry points.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("regex error: {0}")]
    Regex(#[from] RegexError),
    #[error("grammar error: {0}")]
    Grammar(#[from] GrammarError),
    #[error("matrix error: {0}")]
    Shape(#[from] ShapeError),
    #[error("matrix backend {backend} is not available on this host")]
    UnsupportedBackend { backend: &'static str },
}
