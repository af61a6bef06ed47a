//! Column definitions: name, type name and column constraints.

use super::super::default_value::read_catalog_default;
use super::super::format::render_tokens;
use super::{ForeignKeyOwner, Parser, State, conflict_action, is, is_any};
use crate::schema::{FieldInfo, ForeignKey, GeneratedColumn, GeneratedStorage};
use crate::sql::{Token, TokenKind};

/// Keywords that start a table constraint where a column could start.
const TABLE_CONSTRAINT_KEYWORDS: [&str; 5] = ["CONSTRAINT", "PRIMARY", "UNIQUE", "CHECK", "FOREIGN"];

/// Keywords that end a type name.
const COLUMN_CONSTRAINT_KEYWORDS: [&str; 11] = [
    "CONSTRAINT", "PRIMARY", "NOT", "NULL", "UNIQUE", "CHECK", "DEFAULT", "COLLATE",
    "REFERENCES", "GENERATED", "AS",
];

impl Parser {
    #[allow(clippy::too_many_lines)]
    pub(super) fn column_def(&mut self, state: State, token: &Token) -> Option<State> {
        match state {
            State::ColumnName => {
                if is_any(token, &TABLE_CONSTRAINT_KEYWORDS) {
                    return self.table_constraint(State::TableConstraint, token);
                }
                if !token.is_name() {
                    return None;
                }
                self.table()?.fields.push(FieldInfo::new(token.text.as_str()));
                self.type_tokens.clear();
                Some(State::ColumnType)
            }
            State::ColumnType => {
                let is_type_word = (token.kind == TokenKind::Identifier
                    || token.kind.is_quoted_identifier())
                    && !is_any(token, &COLUMN_CONSTRAINT_KEYWORDS);
                if is_type_word {
                    self.push_type(token)?;
                    Some(State::ColumnType)
                } else if is(token, TokenKind::OpenParen) && !self.type_tokens.is_empty() {
                    self.push_type(token)?;
                    Some(State::ColumnWidth)
                } else {
                    self.column_constraint(token)
                }
            }
            State::ColumnWidth | State::ColumnWidthSecond => {
                let second = state == State::ColumnWidthSecond;
                let next = match token.kind {
                    TokenKind::Sign if second => State::ColumnWidthSecondSign,
                    TokenKind::Sign => State::ColumnWidthSign,
                    TokenKind::Numeric if second => State::ColumnWidthSecondNumber,
                    TokenKind::Numeric => State::ColumnWidthNumber,
                    _ => return None,
                };
                self.push_type(token)?;
                Some(next)
            }
            State::ColumnWidthSign | State::ColumnWidthSecondSign => {
                if !is(token, TokenKind::Numeric) {
                    return None;
                }
                self.push_type(token)?;
                Some(if state == State::ColumnWidthSign {
                    State::ColumnWidthNumber
                } else {
                    State::ColumnWidthSecondNumber
                })
            }
            State::ColumnWidthNumber | State::ColumnWidthSecondNumber => {
                let next = match token.kind {
                    TokenKind::Comma if state == State::ColumnWidthNumber => State::ColumnWidthSecond,
                    TokenKind::CloseParen => State::ColumnConstraints,
                    _ => return None,
                };
                self.push_type(token)?;
                Some(next)
            }

            State::ColumnConstraints => self.column_constraint(token),
            State::ColumnConstraintName => token.is_name().then_some(State::ColumnNamedConstraint),
            State::ColumnNamedConstraint => self.column_constraint_keyword(token),

            State::ColumnPrimary => {
                if !token.is_keyword("KEY") {
                    return None;
                }
                let table = self.table()?;
                let index = table.fields.len().checked_sub(1)?;
                table.set_primary_key(index, true);
                Some(State::ColumnPrimaryKey)
            }
            State::ColumnPrimaryKey | State::ColumnPrimaryOrdered => {
                if state == State::ColumnPrimaryKey && is_any(token, &["ASC", "DESC"]) {
                    self.field()?.is_column_pk_desc = token.is_keyword("DESC");
                    Some(State::ColumnPrimaryOrdered)
                } else if token.is_keyword("ON") {
                    Some(State::ColumnPrimaryOn)
                } else {
                    self.autoincrement_or_constraint(token)
                }
            }
            State::ColumnPrimaryOn => token.is_keyword("CONFLICT").then_some(State::ColumnPrimaryConflict),
            State::ColumnPrimaryConflict => {
                let action = conflict_action(token)?;
                self.table()?.primary_key_conflict = Some(action);
                Some(State::ColumnPrimaryResolved)
            }
            State::ColumnPrimaryResolved => self.autoincrement_or_constraint(token),

            State::ColumnNot => {
                if !token.is_keyword("NULL") {
                    return None;
                }
                self.field()?.is_not_null = true;
                Some(State::ColumnNotNull)
            }
            State::ColumnNotNull => {
                if token.is_keyword("ON") {
                    Some(State::ColumnNotNullOn)
                } else {
                    self.column_constraint(token)
                }
            }
            State::ColumnNotNullOn => token.is_keyword("CONFLICT").then_some(State::ColumnNotNullConflict),
            State::ColumnNotNullConflict => {
                let action = conflict_action(token)?;
                self.field()?.not_null_conflict = Some(action);
                Some(State::ColumnConstraints)
            }

            State::ColumnUnique => {
                if token.is_keyword("ON") {
                    Some(State::ColumnUniqueOn)
                } else {
                    self.column_constraint(token)
                }
            }
            State::ColumnUniqueOn => token.is_keyword("CONFLICT").then_some(State::ColumnUniqueConflict),
            State::ColumnUniqueConflict => {
                let action = conflict_action(token)?;
                self.field()?.unique_conflict = Some(action);
                Some(State::ColumnConstraints)
            }

            State::ColumnCheck => {
                if !is(token, TokenKind::OpenParen) {
                    return None;
                }
                self.open_body();
                Some(State::ColumnCheckBody)
            }
            State::ColumnCheckBody => match self.scan_body(token) {
                Some(check) => {
                    self.table()?.checks.push(check);
                    Some(State::ColumnConstraints)
                }
                None => Some(State::ColumnCheckBody),
            },

            State::ColumnCollate => {
                if !token.is_name() {
                    return None;
                }
                self.field()?.collation = Some(token.text.clone());
                Some(State::ColumnConstraints)
            }

            State::ColumnGenerated => {
                if !token.is_keyword("ALWAYS") {
                    return None;
                }
                self.generated_always = true;
                Some(State::ColumnGeneratedAlways)
            }
            State::ColumnGeneratedAlways => token.is_keyword("AS").then_some(State::ColumnGeneratedAs),
            State::ColumnGeneratedAs => {
                if !is(token, TokenKind::OpenParen) {
                    return None;
                }
                self.open_body();
                Some(State::ColumnGeneratedBody)
            }
            State::ColumnGeneratedBody => match self.scan_body(token) {
                Some(expression) => {
                    let always = self.generated_always;
                    self.field()?.generated = Some(GeneratedColumn {
                        expression,
                        always,
                        storage: None,
                    });
                    Some(State::ColumnGeneratedEnd)
                }
                None => Some(State::ColumnGeneratedBody),
            },
            State::ColumnGeneratedEnd => {
                let storage = if token.is_keyword("STORED") {
                    GeneratedStorage::Stored
                } else if token.is_keyword("VIRTUAL") {
                    GeneratedStorage::Virtual
                } else {
                    return self.column_constraint(token);
                };
                if let Some(generated) = &mut self.field()?.generated {
                    generated.storage = Some(storage);
                }
                Some(State::ColumnConstraints)
            }
            _ => None,
        }
    }

    /// Between column constraints: the next one, or the end of the column.
    pub(super) fn column_constraint(&mut self, token: &Token) -> Option<State> {
        match token.kind {
            TokenKind::Comma => Some(State::ColumnName),
            TokenKind::CloseParen => Some(State::TableEnd),
            _ => self.column_constraint_keyword(token),
        }
    }

    fn column_constraint_keyword(&mut self, token: &Token) -> Option<State> {
        if token.is_keyword("CONSTRAINT") {
            Some(State::ColumnConstraintName)
        } else if token.is_keyword("PRIMARY") {
            Some(State::ColumnPrimary)
        } else if token.is_keyword("NOT") {
            Some(State::ColumnNot)
        } else if token.is_keyword("NULL") {
            Some(State::ColumnConstraints)
        } else if token.is_keyword("UNIQUE") {
            self.field()?.is_unique = true;
            Some(State::ColumnUnique)
        } else if token.is_keyword("CHECK") {
            Some(State::ColumnCheck)
        } else if token.is_keyword("DEFAULT") {
            match read_catalog_default(&mut self.tokens) {
                Ok(default) => {
                    self.field()?.default = Some(default);
                    Some(State::ColumnConstraints)
                }
                Err(error) => {
                    tracing::debug!(target: "sqlite_ddl::parser", %error, "invalid column default");
                    None
                }
            }
        } else if token.is_keyword("COLLATE") {
            Some(State::ColumnCollate)
        } else if token.is_keyword("REFERENCES") {
            self.begin_references(ForeignKeyOwner::Column);
            Some(State::References)
        } else if token.is_keyword("GENERATED") {
            Some(State::ColumnGenerated)
        } else if token.is_keyword("AS") {
            self.generated_always = false;
            Some(State::ColumnGeneratedAs)
        } else {
            None
        }
    }

    fn autoincrement_or_constraint(&mut self, token: &Token) -> Option<State> {
        if token.is_keyword("AUTOINCREMENT") {
            self.field()?.is_autoincrement = true;
            Some(State::ColumnConstraints)
        } else {
            self.column_constraint(token)
        }
    }

    /// Append a type-name token and re-render the column's type.
    fn push_type(&mut self, token: &Token) -> Option<()> {
        self.type_tokens.push(token.clone());
        let type_name = render_tokens(&self.type_tokens);
        self.field()?.type_name = type_name;
        Some(())
    }

    /// Start reading a `REFERENCES` clause for `owner`.
    pub(super) fn begin_references(&mut self, owner: ForeignKeyOwner) {
        self.foreign_key = ForeignKey::default();
        self.foreign_key_owner = owner;
        self.clauses.clear();
    }
}
