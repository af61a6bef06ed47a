//! The `CREATE INDEX` model.

use alloc::string::String;
use alloc::vec::Vec;

use crate::sql::Expression;

/// A parsed `CREATE INDEX` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreateIndex {
    /// `UNIQUE`.
    pub unique: bool,
    /// `IF NOT EXISTS`.
    pub if_not_exists: bool,
    /// Schema qualifier, as in `main.ix`.
    pub schema: Option<String>,
    /// Index name.
    pub name: String,
    /// Indexed table.
    pub table: String,
    /// Indexed-column terms, each possibly carrying `COLLATE` and `ASC`/`DESC`.
    pub columns: Vec<Expression>,
    /// Partial-index `WHERE` predicate.
    pub predicate: Option<Expression>,
}

impl CreateIndex {
    /// An empty non-unique index `name` on `table`.
    #[must_use]
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            unique: false,
            if_not_exists: false,
            schema: None,
            name: name.into(),
            table: table.into(),
            columns: Vec::new(),
            predicate: None,
        }
    }
}
