//! Submodule defining the errors used across the crate.

use alloc::string::String;

/// Errors raised while parsing a scalar expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpressionError {
    /// The tokens ran out where an operand, operator or `)` was required.
    #[error("Unexpected end of expression")]
    UnexpectedEnd,
    /// A token that cannot continue the expression at this point.
    #[error("Unexpected token {token:?} in expression")]
    UnexpectedToken {
        /// The offending token text.
        token: String,
    },
    /// The lexer flagged this token as malformed.
    #[error("Invalid token {token:?} in expression")]
    InvalidToken {
        /// The offending token text.
        token: String,
    },
    /// Sub-queries are not representable.
    #[error("Sub-queries are not supported in expressions")]
    Subquery,
    /// `DISTINCT DISTINCT`.
    #[error("DISTINCT repeated")]
    RepeatedDistinct,
    /// `DISTINCT` outside a function argument list.
    #[error("DISTINCT is only allowed as a function argument prefix")]
    MisplacedDistinct,
    /// `CAST(x AS)` without a type name.
    #[error("CAST is missing its type name")]
    MissingCastType,
}

/// Errors raised while renaming columns inside an expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenameError {
    /// The expression references a column that is being dropped.
    #[error("Expression references dropped column '{column}'")]
    DroppedColumn {
        /// The dropped column name, as spelled in the expression.
        column: String,
    },
}

/// Errors raised by the strict statement entry points.
///
/// The permissive parser never fails; it reports where it stopped instead.
/// These errors turn such a stop into a hard failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The text does not start a `CREATE TABLE` or `CREATE INDEX` statement.
    #[error("Not a CREATE TABLE or CREATE INDEX statement")]
    NotDdl,
    /// Parsing stopped before the end of the statement.
    #[error("Statement parsing stopped in state {state} at {token:?}")]
    Incomplete {
        /// The parser state that rejected the token.
        state: &'static str,
        /// The rejected token text, `None` if the input ended early.
        token: Option<String>,
    },
}

/// Any error produced by this crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Expression parsing failed.
    #[error("Expression error: {0}")]
    Expression(#[from] ExpressionError),
    /// Column substitution failed.
    #[error("Rename error: {0}")]
    Rename(#[from] RenameError),
    /// Statement parsing was incomplete.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}
