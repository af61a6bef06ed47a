//! Table constraints after the column definitions.

use alloc::vec::Vec;
use core::mem;

use super::{ForeignKeyOwner, Parser, PendingKey, State, conflict_action, is, is_any};
use crate::schema::{OrderedColumn, UniqueConstraint};
use crate::sql::{Token, TokenKind};

impl Parser {
    #[allow(clippy::too_many_lines)]
    pub(super) fn table_constraint(&mut self, state: State, token: &Token) -> Option<State> {
        match state {
            State::TableConstraint => {
                if token.is_keyword("CONSTRAINT") {
                    Some(State::TableConstraintName)
                } else {
                    self.table_constraint_keyword(token)
                }
            }
            State::TableConstraintName => token.is_name().then_some(State::TableNamedConstraint),
            State::TableNamedConstraint => self.table_constraint_keyword(token),

            State::TablePrimary => {
                if !token.is_keyword("KEY") {
                    return None;
                }
                self.key = PendingKey {
                    primary: true,
                    ..PendingKey::default()
                };
                Some(State::TablePrimaryKey)
            }
            State::TablePrimaryKey | State::TableUnique => {
                is(token, TokenKind::OpenParen).then_some(State::TableKeyColumn)
            }
            State::TableKeyColumn => {
                if !token.is_name() {
                    return None;
                }
                self.key.columns.push(OrderedColumn::new(token.text.as_str()));
                Some(State::TableKeyColumnName)
            }
            State::TableKeyColumnName => {
                if token.is_keyword("COLLATE") {
                    Some(State::TableKeyCollate)
                } else {
                    self.key_ordering(token)
                }
            }
            State::TableKeyCollate => {
                if !token.is_name() {
                    return None;
                }
                let column = self.key.columns.last_mut()?;
                column.collation = Some(token.text.clone());
                Some(State::TableKeyCollated)
            }
            State::TableKeyCollated => self.key_ordering(token),
            State::TableKeyOrdered => self.key_column_end(token),
            State::TableKeyEnd => {
                if token.is_keyword("ON") {
                    Some(State::TableKeyOn)
                } else {
                    if !self.finish_key() {
                        return None;
                    }
                    self.table_constraint_end(token)
                }
            }
            State::TableKeyOn => token.is_keyword("CONFLICT").then_some(State::TableKeyConflict),
            State::TableKeyConflict => {
                self.key.conflict = Some(conflict_action(token)?);
                self.finish_key().then_some(State::TableConstraintEnd)
            }

            State::TableCheck => {
                if !is(token, TokenKind::OpenParen) {
                    return None;
                }
                self.open_body();
                Some(State::TableCheckBody)
            }
            State::TableCheckBody => match self.scan_body(token) {
                Some(check) => {
                    self.table()?.checks.push(check);
                    Some(State::TableConstraintEnd)
                }
                None => Some(State::TableCheckBody),
            },

            State::TableForeign => token.is_keyword("KEY").then_some(State::TableForeignKey),
            State::TableForeignKey => {
                if !is(token, TokenKind::OpenParen) {
                    return None;
                }
                self.foreign_key_owner = ForeignKeyOwner::Table(Vec::new());
                Some(State::TableForeignColumn)
            }
            State::TableForeignColumn => {
                let ForeignKeyOwner::Table(columns) = &mut self.foreign_key_owner else {
                    return None;
                };
                if !token.is_name() {
                    return None;
                }
                columns.push(token.text.clone());
                Some(State::TableForeignColumnName)
            }
            State::TableForeignColumnName => match token.kind {
                TokenKind::Comma => Some(State::TableForeignColumn),
                TokenKind::CloseParen => Some(State::TableForeignReferences),
                _ => None,
            },
            State::TableForeignReferences => {
                if !token.is_keyword("REFERENCES") {
                    return None;
                }
                let owner = mem::replace(&mut self.foreign_key_owner, ForeignKeyOwner::Column);
                self.begin_references(owner);
                Some(State::References)
            }

            State::TableConstraintEnd => self.table_constraint_end(token),
            _ => None,
        }
    }

    fn table_constraint_keyword(&mut self, token: &Token) -> Option<State> {
        if token.is_keyword("PRIMARY") {
            Some(State::TablePrimary)
        } else if token.is_keyword("UNIQUE") {
            self.key = PendingKey::default();
            Some(State::TableUnique)
        } else if token.is_keyword("CHECK") {
            Some(State::TableCheck)
        } else if token.is_keyword("FOREIGN") {
            Some(State::TableForeign)
        } else {
            None
        }
    }

    /// After a complete table constraint. The separating comma is optional.
    pub(super) fn table_constraint_end(&mut self, token: &Token) -> Option<State> {
        match token.kind {
            TokenKind::Comma => Some(State::TableConstraint),
            TokenKind::CloseParen => Some(State::TableEnd),
            _ => self.table_constraint(State::TableConstraint, token),
        }
    }

    fn key_ordering(&mut self, token: &Token) -> Option<State> {
        if is_any(token, &["ASC", "DESC"]) {
            self.key.columns.last_mut()?.descending = token.is_keyword("DESC");
            Some(State::TableKeyOrdered)
        } else {
            self.key_column_end(token)
        }
    }

    fn key_column_end(&mut self, token: &Token) -> Option<State> {
        if self.key.primary && token.is_keyword("AUTOINCREMENT") {
            self.key.autoincrement = true;
            return Some(State::TableKeyOrdered);
        }
        match token.kind {
            TokenKind::Comma => Some(State::TableKeyColumn),
            TokenKind::CloseParen => Some(State::TableKeyEnd),
            _ => None,
        }
    }

    /// Apply the key read so far to the table. Fails on a key column that is
    /// not defined.
    fn finish_key(&mut self) -> bool {
        let key = mem::take(&mut self.key);
        let Some(table) = self.table() else {
            return false;
        };

        if key.primary {
            for column in &key.columns {
                let Some(index) = table.field_index(&column.name) else {
                    tracing::debug!(target: "sqlite_ddl::parser", column = %column.name, "primary key names an unknown column");
                    return false;
                };
                table.set_primary_key(index, true);
                let field = &mut table.fields[index];
                field.is_table_pk_desc = column.descending;
                field.is_autoincrement |= key.autoincrement;
            }
            if key.conflict.is_some() {
                table.primary_key_conflict = key.conflict;
            }
            return true;
        }

        let single = match key.columns.as_slice() {
            [column] if column.collation.is_none() && !column.descending => {
                table.field_index(&column.name)
            }
            _ => None,
        };
        match single {
            Some(index) => {
                let field = &mut table.fields[index];
                field.is_unique = true;
                field.unique_conflict = key.conflict;
            }
            None => table.unique_constraints.push(UniqueConstraint {
                columns: key.columns,
                on_conflict: key.conflict,
            }),
        }
        true
    }
}
