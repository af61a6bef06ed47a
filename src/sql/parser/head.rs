//! Statement head: `CREATE [TEMP] TABLE`, `CREATE [UNIQUE] INDEX`, names and
//! the index's `ON table (...)`.

use super::super::expr_parser::{ExpressionParser, Level};
use super::{Parser, State, is, is_any, is_dot};
use crate::schema::{CreateIndex, CreateTable, Statement};
use crate::sql::{Token, TokenKind};

impl Parser {
    pub(super) fn head(&mut self, state: State, token: &Token) -> Option<State> {
        match state {
            State::Start => token.is_keyword("CREATE").then_some(State::Create),
            State::Create => {
                if is_any(token, &["TEMP", "TEMPORARY"]) {
                    self.temporary = true;
                    Some(State::CreateTemp)
                } else if token.is_keyword("UNIQUE") {
                    Some(State::CreateUnique)
                } else {
                    self.begin(token, false)
                }
            }
            State::CreateTemp => token.is_keyword("TABLE").then(|| self.begin_table()),
            State::CreateUnique => token.is_keyword("INDEX").then(|| self.begin_index(true)),

            State::Table => {
                if token.is_keyword("IF") {
                    Some(State::TableIf)
                } else {
                    self.name_table(token, State::TableName)
                }
            }
            State::TableIf => token.is_keyword("NOT").then_some(State::TableIfNot),
            State::TableIfNot => {
                if token.is_keyword("EXISTS") {
                    self.table()?.if_not_exists = true;
                    Some(State::TableIfNotExists)
                } else {
                    None
                }
            }
            State::TableIfNotExists => self.name_table(token, State::TableName),
            State::TableName => {
                if is_dot(token) {
                    let table = self.table()?;
                    table.schema = Some(core::mem::take(&mut table.name));
                    Some(State::TableSchemaDot)
                } else {
                    is(token, TokenKind::OpenParen).then_some(State::ColumnName)
                }
            }
            State::TableSchemaDot => self.name_table(token, State::TableQualified),
            State::TableQualified => is(token, TokenKind::OpenParen).then_some(State::ColumnName),

            State::Index => {
                if token.is_keyword("IF") {
                    Some(State::IndexIf)
                } else {
                    self.name_index(token, State::IndexName)
                }
            }
            State::IndexIf => token.is_keyword("NOT").then_some(State::IndexIfNot),
            State::IndexIfNot => {
                if token.is_keyword("EXISTS") {
                    self.index()?.if_not_exists = true;
                    Some(State::IndexIfNotExists)
                } else {
                    None
                }
            }
            State::IndexIfNotExists => self.name_index(token, State::IndexName),
            State::IndexName => {
                if is_dot(token) {
                    let index = self.index()?;
                    index.schema = Some(core::mem::take(&mut index.name));
                    Some(State::IndexSchemaDot)
                } else {
                    token.is_keyword("ON").then_some(State::IndexOn)
                }
            }
            State::IndexSchemaDot => self.name_index(token, State::IndexQualified),
            State::IndexQualified => token.is_keyword("ON").then_some(State::IndexOn),
            State::IndexOn => {
                if !token.is_name() {
                    return None;
                }
                self.index()?.table.clone_from(&token.text);
                Some(State::IndexTable)
            }
            State::IndexTable => {
                if !is(token, TokenKind::OpenParen) {
                    return None;
                }
                match ExpressionParser::new(&mut self.tokens).parse(Level::Arguments, &[]) {
                    Ok(columns) => {
                        self.index()?.columns = columns.split_commas();
                        Some(State::IndexColumnList)
                    }
                    Err(error) => {
                        tracing::debug!(target: "sqlite_ddl::parser", %error, "invalid index column list");
                        None
                    }
                }
            }
            _ => None,
        }
    }

    /// `TABLE` or `INDEX` right after `CREATE`.
    fn begin(&mut self, token: &Token, unique: bool) -> Option<State> {
        if token.is_keyword("TABLE") {
            Some(self.begin_table())
        } else if token.is_keyword("INDEX") {
            Some(self.begin_index(unique))
        } else {
            None
        }
    }

    fn begin_table(&mut self) -> State {
        let mut table = CreateTable::new("");
        table.is_temporary = self.temporary;
        self.statement = Some(Statement::CreateTable(table));
        State::Table
    }

    fn begin_index(&mut self, unique: bool) -> State {
        let mut index = CreateIndex::new("", "");
        index.unique = unique;
        self.statement = Some(Statement::CreateIndex(index));
        State::Index
    }

    fn name_table(&mut self, token: &Token, next: State) -> Option<State> {
        if !token.is_name() {
            return None;
        }
        self.table()?.name.clone_from(&token.text);
        Some(next)
    }

    fn name_index(&mut self, token: &Token, next: State) -> Option<State> {
        if !token.is_name() {
            return None;
        }
        self.index()?.name.clone_from(&token.text);
        Some(next)
    }
}
