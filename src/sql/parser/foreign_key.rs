//! `REFERENCES parent (columns) clauses...`, for a column or a table-level
//! `FOREIGN KEY`.
//!
//! Clauses after the parent columns are not modelled: they are validated and
//! kept as text.

use core::mem;

use super::super::format::render_tokens;
use super::{ForeignKeyOwner, Parser, State, is, is_any};
use crate::schema::TableForeignKey;
use crate::sql::{Token, TokenKind};

impl Parser {
    pub(super) fn foreign_key(&mut self, state: State, token: &Token) -> Option<State> {
        match state {
            State::References => {
                if !token.is_name() {
                    return None;
                }
                self.foreign_key.table.clone_from(&token.text);
                Some(State::ReferencesTable)
            }
            State::ReferencesTable => {
                if is(token, TokenKind::OpenParen) {
                    Some(State::ReferencesColumn)
                } else {
                    self.references_clause(token)
                }
            }
            State::ReferencesColumn => {
                if !token.is_name() {
                    return None;
                }
                self.foreign_key.columns.push(token.text.clone());
                Some(State::ReferencesColumnName)
            }
            State::ReferencesColumnName => match token.kind {
                TokenKind::Comma => Some(State::ReferencesColumn),
                TokenKind::CloseParen => Some(State::ReferencesClauses),
                _ => None,
            },
            State::ReferencesClauses => self.references_clause(token),
            State::ReferencesMatch => self.clause_word(token.is_name(), token),
            State::ReferencesOn => self
                .clause_word(is_any(token, &["DELETE", "UPDATE"]), token)
                .map(|_| State::ReferencesAction),
            State::ReferencesAction => {
                if token.is_keyword("SET") {
                    self.clauses.push(token.clone());
                    Some(State::ReferencesSet)
                } else if token.is_keyword("NO") {
                    self.clauses.push(token.clone());
                    Some(State::ReferencesNo)
                } else {
                    self.clause_word(is_any(token, &["CASCADE", "RESTRICT"]), token)
                }
            }
            State::ReferencesSet => self.clause_word(is_any(token, &["NULL", "DEFAULT"]), token),
            State::ReferencesNo => self.clause_word(token.is_keyword("ACTION"), token),
            State::ReferencesNot => self
                .clause_word(token.is_keyword("DEFERRABLE"), token)
                .map(|_| State::ReferencesDeferrable),
            State::ReferencesDeferrable => {
                if token.is_keyword("INITIALLY") {
                    self.clauses.push(token.clone());
                    Some(State::ReferencesInitially)
                } else {
                    self.references_clause(token)
                }
            }
            State::ReferencesInitially => {
                self.clause_word(is_any(token, &["DEFERRED", "IMMEDIATE"]), token)
            }
            _ => None,
        }
    }

    /// The start of the next clause, or the end of the foreign key.
    fn references_clause(&mut self, token: &Token) -> Option<State> {
        let next = if token.is_keyword("MATCH") {
            State::ReferencesMatch
        } else if token.is_keyword("ON") {
            State::ReferencesOn
        } else if token.is_keyword("DEFERRABLE") {
            State::ReferencesDeferrable
        } else if token.is_keyword("NOT")
            && self.tokens.front().is_some_and(|t| t.is_keyword("DEFERRABLE"))
        {
            State::ReferencesNot
        } else {
            let table_level = matches!(self.foreign_key_owner, ForeignKeyOwner::Table(_));
            self.finish_foreign_key()?;
            return if table_level {
                self.table_constraint_end(token)
            } else {
                self.column_constraint(token)
            };
        };
        self.clauses.push(token.clone());
        Some(next)
    }

    /// Keep `token` as the last word of a clause if `accepted`.
    fn clause_word(&mut self, accepted: bool, token: &Token) -> Option<State> {
        accepted.then(|| {
            self.clauses.push(token.clone());
            State::ReferencesClauses
        })
    }

    /// Attach the foreign key read so far to its owner.
    ///
    /// A table-level key over a single existing column is folded into that
    /// column, unless the column already references another table.
    fn finish_foreign_key(&mut self) -> Option<()> {
        let mut references = mem::take(&mut self.foreign_key);
        references.clauses = render_tokens(&self.clauses);
        self.clauses.clear();

        let owner = mem::replace(&mut self.foreign_key_owner, ForeignKeyOwner::Column);
        match owner {
            ForeignKeyOwner::Column => self.field()?.references = Some(references),
            ForeignKeyOwner::Table(columns) => {
                let table = self.table()?;
                let single = match columns.as_slice() {
                    [column] => table.field_index(column),
                    _ => None,
                }
                .filter(|&i| table.fields[i].references.is_none());
                match single {
                    Some(index) => table.fields[index].references = Some(references),
                    None => table.foreign_keys.push(TableForeignKey { columns, references }),
                }
            }
        }
        Some(())
    }
}
