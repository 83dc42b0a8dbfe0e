//! Definitions of errors that can occur while reading, writing and manipulating values.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// What went wrong in a piece of malformed external text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxKind {
    #[error("unterminated string")]
    UnterminatedString,

    #[error("unclosed parenthesis")]
    UnclosedList,

    #[error("unclosed vector")]
    UnclosedVector,

    #[error("too many ')'s")]
    UnmatchedParenthesis,

    #[error("misplaced dot")]
    MisplacedDot,

    #[error("invalid numeric syntax '{0}'")]
    InvalidNumber(String),

    #[error("invalid character name '{0}'")]
    InvalidCharacter(String),

    #[error("invalid # syntax '{0}'")]
    InvalidHashSyntax(String),

    #[error("expected a datum after {0}")]
    MissingDatum(&'static str),
}

#[derive(Error, miette::Diagnostic, Debug)]
pub enum Error {
    #[error("{kind} at {port}:{line}")]
    #[diagnostic(code(sexp::syntax))]
    Syntax {
        kind: SyntaxKind,
        port: String,
        line: usize,
    },

    #[error("expected {expected} but got {found}")]
    #[diagnostic(code(sexp::type_error))]
    Type {
        expected: &'static str,
        found: &'static str,
    },

    #[error("index {index} out of bounds of {len}")]
    #[diagnostic(code(sexp::range))]
    OutOfBounds { index: usize, len: usize },

    #[error("division by zero")]
    #[diagnostic(code(sexp::arith))]
    DivideByZero,

    #[error(transparent)]
    #[diagnostic(code(sexp::io))]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn type_error(expected: &'static str, found: &'static str) -> Self {
        Error::Type { expected, found }
    }

    /// Line and port name of a syntax error.
    pub fn location(&self) -> Option<(&str, usize)> {
        match self {
            Error::Syntax { port, line, .. } => Some((port, *line)),
            _ => None,
        }
    }
}
