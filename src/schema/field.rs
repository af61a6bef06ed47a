//! Column-level pieces of the table model.

use alloc::string::String;
use alloc::vec::Vec;

/// Conflict resolution algorithm named by an `ON CONFLICT` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConflictAction {
    /// `ON CONFLICT ROLLBACK`
    Rollback,
    /// `ON CONFLICT ABORT`
    Abort,
    /// `ON CONFLICT FAIL`
    Fail,
    /// `ON CONFLICT IGNORE`
    Ignore,
    /// `ON CONFLICT REPLACE`
    Replace,
}

impl ConflictAction {
    /// Parse the action keyword (case-insensitive).
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        [
            ConflictAction::Rollback,
            ConflictAction::Abort,
            ConflictAction::Fail,
            ConflictAction::Ignore,
            ConflictAction::Replace,
        ]
        .into_iter()
        .find(|action| action.as_str().eq_ignore_ascii_case(word))
    }

    /// The action keyword.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ConflictAction::Rollback => "ROLLBACK",
            ConflictAction::Abort => "ABORT",
            ConflictAction::Fail => "FAIL",
            ConflictAction::Ignore => "IGNORE",
            ConflictAction::Replace => "REPLACE",
        }
    }
}

/// A column's `DEFAULT` value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefaultValue {
    /// The value. Unescaped content for quoted literals, SQL text otherwise.
    pub text: String,
    /// The value is evaluated on insert: a parenthesized expression or one
    /// of the `CURRENT_*` keywords.
    pub is_expression: bool,
    /// `text` is the content of a string literal and is re-quoted on output.
    pub is_quoted: bool,
}

/// The target of a `REFERENCES` clause.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForeignKey {
    /// The referenced table.
    pub table: String,
    /// The referenced columns, empty when the parent's primary key is implied.
    pub columns: Vec<String>,
    /// `MATCH`, `ON DELETE`/`ON UPDATE` and `DEFERRABLE` clauses as SQL text,
    /// empty when there are none.
    pub clauses: String,
}

/// Storage of a generated column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GeneratedStorage {
    /// `STORED`
    Stored,
    /// `VIRTUAL`
    Virtual,
}

/// A `[GENERATED ALWAYS] AS (expr)` clause.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneratedColumn {
    /// The body between the parentheses, as SQL text.
    pub expression: String,
    /// Whether `GENERATED ALWAYS` was spelled out.
    pub always: bool,
    /// Explicit storage keyword, if any.
    pub storage: Option<GeneratedStorage>,
}

/// One column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldInfo {
    /// Column name.
    pub name: String,
    /// Declared type as SQL text, empty if the column has none.
    pub type_name: String,
    /// `COLLATE` name.
    pub collation: Option<String>,
    /// `DEFAULT` value.
    pub default: Option<DefaultValue>,
    /// Member of the primary key.
    pub is_primary_key: bool,
    /// The only member of the primary key.
    ///
    /// Derived from `is_primary_key` across the table, see
    /// [`recompute_whole_primary_key`].
    pub is_whole_primary_key: bool,
    /// `PRIMARY KEY DESC` on the column itself.
    pub is_column_pk_desc: bool,
    /// `DESC` in a table-level `PRIMARY KEY (...)`.
    pub is_table_pk_desc: bool,
    /// `AUTOINCREMENT`.
    pub is_autoincrement: bool,
    /// `NOT NULL`.
    pub is_not_null: bool,
    /// `UNIQUE`.
    pub is_unique: bool,
    /// `REFERENCES` clause.
    pub references: Option<ForeignKey>,
    /// `ON CONFLICT` of the `NOT NULL` constraint.
    pub not_null_conflict: Option<ConflictAction>,
    /// `ON CONFLICT` of the `UNIQUE` constraint.
    pub unique_conflict: Option<ConflictAction>,
    /// Generated column clause.
    pub generated: Option<GeneratedColumn>,
}

impl FieldInfo {
    /// Create a column with no type and no constraints.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Whether this column is named `name` (ASCII case-insensitive).
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Whether the key ordering of this column is descending.
    #[must_use]
    pub fn is_pk_desc(&self) -> bool {
        self.is_column_pk_desc || self.is_table_pk_desc
    }
}

/// Recompute `is_whole_primary_key` on every field.
///
/// A field is the whole primary key iff it is a key member and exactly one
/// field of the table is.
pub fn recompute_whole_primary_key(fields: &mut [FieldInfo]) {
    let members = fields.iter().filter(|f| f.is_primary_key).count();
    for field in fields {
        field.is_whole_primary_key = field.is_primary_key && members == 1;
    }
}
