//! Parse results.

use super::index::CreateIndex;
use super::table::CreateTable;
use crate::errors::ParseError;
use crate::sql::Token;

/// A parsed DDL statement.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Statement {
    /// `CREATE TABLE`
    CreateTable(CreateTable),
    /// `CREATE INDEX`
    CreateIndex(CreateIndex),
}

impl Statement {
    /// The name of the created object.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Statement::CreateTable(table) => &table.name,
            Statement::CreateIndex(index) => &index.name,
        }
    }

    /// The table model, if this is a `CREATE TABLE`.
    #[must_use]
    pub fn as_table(&self) -> Option<&CreateTable> {
        match self {
            Statement::CreateTable(table) => Some(table),
            Statement::CreateIndex(_) => None,
        }
    }

    /// The index model, if this is a `CREATE INDEX`.
    #[must_use]
    pub fn as_index(&self) -> Option<&CreateIndex> {
        match self {
            Statement::CreateIndex(index) => Some(index),
            Statement::CreateTable(_) => None,
        }
    }
}

impl From<CreateTable> for Statement {
    fn from(table: CreateTable) -> Self {
        Statement::CreateTable(table)
    }
}

impl From<CreateIndex> for Statement {
    fn from(index: CreateIndex) -> Self {
        Statement::CreateIndex(index)
    }
}

/// Where the statement parser stopped before reaching the end of a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStop {
    /// Name of the parser state that had no continuation.
    pub state: &'static str,
    /// The token it could not consume, `None` if the input ended.
    pub token: Option<Token>,
}

/// Outcome of a permissive statement parse.
///
/// The model is kept however far the parser got. `stop` tells a complete
/// parse apart from an early stop, which is otherwise silent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStatement {
    /// The model, `None` until the statement kind was known.
    pub statement: Option<Statement>,
    /// Where parsing stopped early, `None` if the whole input was consumed.
    pub stop: Option<ParseStop>,
}

impl ParsedStatement {
    /// Whether the whole statement was parsed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.statement.is_some() && self.stop.is_none()
    }

    /// The model of a complete parse.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NotDdl`] if the input does not start a
    /// `CREATE TABLE` or `CREATE INDEX`, and [`ParseError::Incomplete`] if
    /// parsing stopped early.
    pub fn into_complete(self) -> Result<Statement, ParseError> {
        match (self.statement, self.stop) {
            (None, _) => Err(ParseError::NotDdl),
            (Some(_), Some(stop)) => Err(ParseError::Incomplete {
                state: stop.state,
                token: stop.token.map(|t| t.text),
            }),
            (Some(statement), None) => Ok(statement),
        }
    }
}
