//! After the body: table options, and the end of an index.

use super::super::expr_parser::{ExpressionParser, Level};
use super::{Parser, State, is};
use crate::sql::{Token, TokenKind};

impl Parser {
    pub(super) fn tail(&mut self, state: State, token: &Token) -> Option<State> {
        match state {
            State::TableEnd | State::TableOption => self.table_option(token),
            State::TableWithout => {
                if !token.is_keyword("ROWID") {
                    return None;
                }
                self.table()?.has_rowid = false;
                Some(State::TableOptionEnd)
            }
            State::TableOptionEnd => is(token, TokenKind::Comma).then_some(State::TableOption),

            State::IndexColumnList => is(token, TokenKind::CloseParen).then_some(State::IndexColumns),
            State::IndexColumns => {
                if !token.is_keyword("WHERE") {
                    return None;
                }
                let predicate = match ExpressionParser::new(&mut self.tokens).parse(Level::Top, &[]) {
                    Ok(predicate) if !predicate.is_empty() => predicate,
                    Ok(_) => return None,
                    Err(error) => {
                        tracing::debug!(target: "sqlite_ddl::parser", %error, "invalid index predicate");
                        return None;
                    }
                };
                self.index()?.predicate = Some(predicate);
                Some(State::IndexWhere)
            }
            _ => None,
        }
    }

    fn table_option(&mut self, token: &Token) -> Option<State> {
        if token.is_keyword("WITHOUT") {
            Some(State::TableWithout)
        } else if token.is_keyword("STRICT") {
            self.table()?.is_strict = true;
            Some(State::TableOptionEnd)
        } else {
            None
        }
    }
}
