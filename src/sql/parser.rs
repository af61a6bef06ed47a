//! Statement parser for `CREATE TABLE` and `CREATE INDEX`.
//!
//! The parser is a state machine driven one token at a time. Each state tries
//! its continuations in a fixed order and the first match consumes the token.
//! When nothing matches, parsing stops and the model is kept as far as it got:
//! catalog text is trusted to be valid, so the stop is reported in
//! [`ParsedStatement::stop`] rather than raised as an error.
//!
//! States are grouped in regions, each handled by its own submodule: the
//! statement head, column definitions, table constraints, the foreign-key
//! clause shared by both, and the statement tail.

mod column_def;
mod foreign_key;
mod head;
mod table_constraint;
mod tail;

use alloc::string::String;
use alloc::vec::Vec;
use core::str::FromStr;

use super::expr_parser::TokenQueue;
use super::format::render_tokens;
use super::lexer::tokenize;
use super::token::{Token, TokenKind};
use crate::errors::ParseError;
use crate::schema::{
    ConflictAction, CreateIndex, CreateTable, FieldInfo, ForeignKey, OrderedColumn, ParseStop,
    ParsedStatement, Statement,
};

/// Grammar regions, one submodule each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Head,
    ColumnDef,
    ForeignKey,
    TableConstraint,
    Tail,
}

macro_rules! parser_states {
    ($($region:ident => { $($(#[$meta:meta])* $state:ident,)+ })+) => {
        /// Parser states. Each is named after what was read last.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub(crate) enum State {
            $($($(#[$meta])* $state,)+)+
        }

        impl State {
            /// The state's name, as reported in a [`ParseStop`].
            pub(crate) fn name(self) -> &'static str {
                match self {
                    $($(State::$state => stringify!($state),)+)+
                }
            }

            fn region(self) -> Region {
                match self {
                    $($(State::$state => Region::$region,)+)+
                }
            }
        }
    };
}

parser_states! {
    Head => {
        /// Nothing read yet.
        Start,
        Create,
        CreateTemp,
        CreateUnique,
        Table,
        TableIf,
        TableIfNot,
        TableIfNotExists,
        TableName,
        TableSchemaDot,
        TableQualified,
        Index,
        IndexIf,
        IndexIfNot,
        IndexIfNotExists,
        IndexName,
        IndexSchemaDot,
        IndexQualified,
        IndexOn,
        /// `ON table`, the column list follows.
        IndexTable,
    }
    ColumnDef => {
        /// After `(` or `,`: a column or the first table constraint.
        ColumnName,
        ColumnType,
        ColumnWidth,
        ColumnWidthSign,
        ColumnWidthNumber,
        ColumnWidthSecond,
        ColumnWidthSecondSign,
        ColumnWidthSecondNumber,
        /// Between column constraints.
        ColumnConstraints,
        ColumnConstraintName,
        ColumnNamedConstraint,
        ColumnPrimary,
        ColumnPrimaryKey,
        ColumnPrimaryOrdered,
        ColumnPrimaryOn,
        ColumnPrimaryConflict,
        ColumnPrimaryResolved,
        ColumnNot,
        ColumnNotNull,
        ColumnNotNullOn,
        ColumnNotNullConflict,
        ColumnUnique,
        ColumnUniqueOn,
        ColumnUniqueConflict,
        ColumnCheck,
        ColumnCheckBody,
        ColumnCollate,
        ColumnGenerated,
        ColumnGeneratedAlways,
        ColumnGeneratedAs,
        ColumnGeneratedBody,
        ColumnGeneratedEnd,
    }
    ForeignKey => {
        References,
        ReferencesTable,
        ReferencesColumn,
        ReferencesColumnName,
        /// After the parent columns, or after a complete clause.
        ReferencesClauses,
        ReferencesMatch,
        ReferencesOn,
        ReferencesAction,
        ReferencesSet,
        ReferencesNo,
        ReferencesNot,
        ReferencesDeferrable,
        ReferencesInitially,
    }
    TableConstraint => {
        /// After `,` following a table constraint.
        TableConstraint,
        TableConstraintName,
        TableNamedConstraint,
        TablePrimary,
        TablePrimaryKey,
        TableUnique,
        TableKeyColumn,
        TableKeyColumnName,
        TableKeyCollate,
        TableKeyCollated,
        TableKeyOrdered,
        TableKeyEnd,
        TableKeyOn,
        TableKeyConflict,
        TableCheck,
        TableCheckBody,
        TableForeign,
        TableForeignKey,
        TableForeignColumn,
        TableForeignColumnName,
        TableForeignReferences,
        /// After a complete table constraint.
        TableConstraintEnd,
    }
    Tail => {
        /// After the closing `)` of a table.
        TableEnd,
        TableWithout,
        TableOptionEnd,
        TableOption,
        IndexColumnList,
        /// After the closing `)` of an index column list.
        IndexColumns,
        IndexWhere,
    }
}

impl State {
    /// States in which the input may end.
    fn is_accepting(self) -> bool {
        matches!(
            self,
            State::TableEnd | State::TableOptionEnd | State::IndexColumns | State::IndexWhere
        )
    }
}

/// A table-level `PRIMARY KEY (...)` or `UNIQUE (...)` being read.
#[derive(Debug, Default)]
struct PendingKey {
    primary: bool,
    columns: Vec<OrderedColumn>,
    autoincrement: bool,
    conflict: Option<ConflictAction>,
}

/// Who a `REFERENCES` clause being read belongs to.
#[derive(Debug)]
enum ForeignKeyOwner {
    /// The column being defined.
    Column,
    /// A table-level `FOREIGN KEY` over these child columns.
    Table(Vec<String>),
}

/// Permissive statement parser.
///
/// # Example
///
/// ```rust
/// use sqlite_ddl_rs::sql::Parser;
///
/// let parsed = Parser::new("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)").parse();
/// assert!(parsed.is_complete());
/// let table = parsed.statement.as_ref().and_then(|s| s.as_table()).unwrap();
/// assert_eq!(table.column_names(), ["id", "name"]);
/// ```
#[derive(Debug)]
pub struct Parser {
    tokens: TokenQueue,
    statement: Option<Statement>,
    temporary: bool,
    type_tokens: Vec<Token>,
    /// Body of a `CHECK` or generated column, without the outer parentheses.
    body: Vec<Token>,
    depth: usize,
    generated_always: bool,
    key: PendingKey,
    foreign_key: ForeignKey,
    foreign_key_owner: ForeignKeyOwner,
    clauses: Vec<Token>,
}

impl Parser {
    /// Create a parser over one statement's text. A trailing `;` is ignored.
    #[must_use]
    pub fn new(sql: &str) -> Self {
        let mut tokens: TokenQueue = tokenize(sql).into();
        while tokens
            .back()
            .is_some_and(|t| t.kind == TokenKind::Invalid && t.text == ";")
        {
            tokens.pop_back();
        }
        Self {
            tokens,
            statement: None,
            temporary: false,
            type_tokens: Vec::new(),
            body: Vec::new(),
            depth: 0,
            generated_always: false,
            key: PendingKey::default(),
            foreign_key: ForeignKey::default(),
            foreign_key_owner: ForeignKeyOwner::Column,
            clauses: Vec::new(),
        }
    }

    /// Run the state machine over the whole statement.
    #[must_use]
    pub fn parse(mut self) -> ParsedStatement {
        let mut state = State::Start;
        while let Some(token) = self.tokens.pop_front() {
            let next = match state.region() {
                Region::Head => self.head(state, &token),
                Region::ColumnDef => self.column_def(state, &token),
                Region::ForeignKey => self.foreign_key(state, &token),
                Region::TableConstraint => self.table_constraint(state, &token),
                Region::Tail => self.tail(state, &token),
            };
            let Some(next) = next else {
                return self.stop(state, Some(token));
            };
            tracing::trace!(
                target: "sqlite_ddl::parser",
                from = state.name(),
                to = next.name(),
                token = %token.text,
            );
            state = next;
        }

        if state.is_accepting() {
            ParsedStatement {
                statement: self.statement,
                stop: None,
            }
        } else {
            self.stop(state, None)
        }
    }

    fn stop(self, state: State, token: Option<Token>) -> ParsedStatement {
        tracing::debug!(
            target: "sqlite_ddl::parser",
            state = state.name(),
            token = ?token.as_ref().map(|t| t.text.as_str()),
            "statement parser stopped early",
        );
        ParsedStatement {
            statement: self.statement,
            stop: Some(ParseStop {
                state: state.name(),
                token,
            }),
        }
    }

    fn table(&mut self) -> Option<&mut CreateTable> {
        match &mut self.statement {
            Some(Statement::CreateTable(table)) => Some(table),
            _ => None,
        }
    }

    fn index(&mut self) -> Option<&mut CreateIndex> {
        match &mut self.statement {
            Some(Statement::CreateIndex(index)) => Some(index),
            _ => None,
        }
    }

    /// The column being defined.
    fn field(&mut self) -> Option<&mut FieldInfo> {
        self.table()?.fields.last_mut()
    }

    /// Start capturing a parenthesized body after its `(`.
    fn open_body(&mut self) {
        self.depth = 1;
        self.body.clear();
    }

    /// Feed one body token. Returns the body text once its closing `)` is read.
    fn scan_body(&mut self, token: &Token) -> Option<String> {
        match token.kind {
            TokenKind::OpenParen => self.depth += 1,
            TokenKind::CloseParen => {
                self.depth -= 1;
                if self.depth == 0 {
                    let text = render_tokens(&self.body);
                    self.body.clear();
                    return Some(text);
                }
            }
            _ => {}
        }
        self.body.push(token.clone());
        None
    }
}

impl FromStr for Statement {
    type Err = ParseError;

    fn from_str(sql: &str) -> Result<Self, Self::Err> {
        Parser::new(sql).parse().into_complete()
    }
}

/// Whether `token` is the punctuation `kind`.
fn is(token: &Token, kind: TokenKind) -> bool {
    token.kind == kind
}

/// Whether `token` is the `.` of a qualified name.
fn is_dot(token: &Token) -> bool {
    token.kind == TokenKind::Symbol && token.text == "."
}

/// Whether `token` is any of `keywords`.
fn is_any(token: &Token, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| token.is_keyword(k))
}

/// The `ON CONFLICT` action named by `token`.
fn conflict_action(token: &Token) -> Option<ConflictAction> {
    token
        .kind
        .is_word()
        .then(|| ConflictAction::from_keyword(&token.text))
        .flatten()
}
