//! The `CREATE TABLE` model.

use alloc::string::String;
use alloc::vec::Vec;

use super::field::{ConflictAction, FieldInfo, ForeignKey, recompute_whole_primary_key};

/// A column reference in a table-level key list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrderedColumn {
    /// Column name.
    pub name: String,
    /// `COLLATE` name.
    pub collation: Option<String>,
    /// `DESC` ordering.
    pub descending: bool,
}

impl OrderedColumn {
    /// A plain column reference.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A table-level `UNIQUE (...)` that is not folded into a single column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UniqueConstraint {
    /// The key columns in order.
    pub columns: Vec<OrderedColumn>,
    /// `ON CONFLICT` action.
    pub on_conflict: Option<ConflictAction>,
}

/// A multi-column `FOREIGN KEY (...) REFERENCES ...`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableForeignKey {
    /// The child columns.
    pub columns: Vec<String>,
    /// The parent reference.
    pub references: ForeignKey,
}

/// A parsed `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreateTable {
    /// `TEMP` / `TEMPORARY`.
    pub is_temporary: bool,
    /// `IF NOT EXISTS`.
    pub if_not_exists: bool,
    /// Schema qualifier, as in `main.t`.
    pub schema: Option<String>,
    /// Table name.
    pub name: String,
    /// Columns in declaration order.
    pub fields: Vec<FieldInfo>,
    /// Indices into `fields` of the primary key members, in key order.
    pub primary_key: Vec<usize>,
    /// `ON CONFLICT` action of the primary key.
    pub primary_key_conflict: Option<ConflictAction>,
    /// Table-level unique constraints over more than one plain column.
    pub unique_constraints: Vec<UniqueConstraint>,
    /// Multi-column foreign keys.
    pub foreign_keys: Vec<TableForeignKey>,
    /// `CHECK` bodies as SQL text, column-level ones included.
    pub checks: Vec<String>,
    /// `false` for `WITHOUT ROWID` tables.
    pub has_rowid: bool,
    /// `STRICT`.
    pub is_strict: bool,
}

impl CreateTable {
    /// An empty rowid table named `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            is_temporary: false,
            if_not_exists: false,
            schema: None,
            name: name.into(),
            fields: Vec::new(),
            primary_key: Vec::new(),
            primary_key_conflict: None,
            unique_constraints: Vec::new(),
            foreign_keys: Vec::new(),
            checks: Vec::new(),
            has_rowid: true,
            is_strict: false,
        }
    }

    /// Position of the column named `name` (ASCII case-insensitive).
    #[must_use]
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.is_named(name))
    }

    /// The column named `name` (ASCII case-insensitive).
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.is_named(name))
    }

    /// Column names in declaration order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Primary key members in key order.
    pub fn primary_key_fields(&self) -> impl Iterator<Item = &FieldInfo> {
        self.primary_key.iter().filter_map(|&i| self.fields.get(i))
    }

    /// Add the field at `index` to the primary key, or remove it.
    ///
    /// The whole-key flag of every field is recomputed. Out-of-range indices
    /// are ignored.
    pub fn set_primary_key(&mut self, index: usize, member: bool) {
        let Some(field) = self.fields.get_mut(index) else {
            return;
        };
        field.is_primary_key = member;
        if member {
            if !self.primary_key.contains(&index) {
                self.primary_key.push(index);
            }
        } else {
            self.primary_key.retain(|&i| i != index);
            field.is_column_pk_desc = false;
            field.is_table_pk_desc = false;
            field.is_autoincrement = false;
        }
        recompute_whole_primary_key(&mut self.fields);
    }

    /// The single key column written inline as `PRIMARY KEY` on output.
    ///
    /// Only a sole key column carrying `AUTOINCREMENT` or column-level `DESC`
    /// stays inline: the table-level form of `INTEGER PRIMARY KEY DESC` would
    /// turn it into a rowid alias. Every other key goes to a trailing
    /// `PRIMARY KEY (...)`.
    #[must_use]
    pub fn inline_primary_key(&self) -> Option<usize> {
        match self.primary_key.as_slice() {
            &[index] => self
                .fields
                .get(index)
                .filter(|f| f.is_autoincrement || f.is_column_pk_desc)
                .map(|_| index),
            _ => None,
        }
    }
}
