use std::fmt;

/// Identifier type for DFA states.
pub type StateId = u32;

/// An opaque value identifying a graph vertex or an automaton state.
///
/// Values compare structurally, so the product state `(a, b)` built by an
/// intersection is equal to any other pair built from equal components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    /// An integer identifier.
    Int(i64),
    /// A string identifier.
    Str(String),
    /// A pair of values, as produced by product constructions.
    Pair(Box<Value>, Box<Value>),
}

impl Value {
    /// Creates a pair value.
    #[must_use]
    pub fn pair(first: Value, second: Value) -> Value {
        Value::Pair(Box::new(first), Box::new(second))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Pair(a, b) => write!(f, "({a}, {b})"),
        }
    }
}

/// A transition label: a named symbol or ε.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    /// The ε label; transitions under it consume no input.
    Eps,
    /// A named symbol.
    Sym(String),
}

impl Label {
    /// Creates a symbol label.
    #[must_use]
    pub fn sym(value: impl Into<String>) -> Label {
        Label::Sym(value.into())
    }

    /// Whether this is the ε label.
    #[must_use]
    pub fn is_eps(&self) -> bool {
        matches!(self, Label::Eps)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Eps => write!(f, "ε"),
            Label::Sym(s) => write!(f, "{s}"),
        }
    }
}
