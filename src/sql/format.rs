//! SQL output formatting.
//!
//! Output is minimal: a space is written only between two tokens whose
//! spellings would otherwise run together and re-tokenize differently.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{self, Display};

use super::expression::Expression;
use super::lexer::tokenize;
use super::token::{Token, TokenKind};
use crate::schema::{
    ConflictAction, CreateIndex, CreateTable, FieldInfo, ForeignKey, GeneratedStorage, Statement,
};

/// Trait for types that can be formatted as SQL.
pub trait FormatSql {
    /// Write this value's tokens to `writer`.
    fn write_sql(&self, writer: &mut TokenWriter);

    /// Format this value as a SQL string.
    fn format_sql(&self) -> String {
        let mut writer = TokenWriter::new();
        self.write_sql(&mut writer);
        writer.finish()
    }
}

/// Accumulates output text, remembering the last token written so the next
/// one can be separated from it when needed.
#[derive(Debug, Default)]
pub struct TokenWriter {
    sql: String,
    last: Option<Token>,
}

/// How a token's spelling begins or ends, for adjacency purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Word,
    Symbol,
    Quote(char),
    Closed,
}

impl TokenWriter {
    /// An empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one token in its quoted spelling.
    pub fn push(&mut self, token: &Token) {
        let kind = output_kind(token);
        let token = Token::new(kind, token.text.as_str());
        if let Some(last) = &self.last
            && needs_space(last, &token)
        {
            self.sql.push(' ');
        }
        spell(&token, &mut self.sql);
        self.last = Some(token);
    }

    /// Write a keyword.
    pub fn push_keyword(&mut self, keyword: &str) {
        self.push(&Token::new(TokenKind::Identifier, keyword));
    }

    /// Write a table, column, index or collation name.
    pub fn push_name(&mut self, name: &str) {
        self.push(&Token::name(name));
    }

    /// Write an optionally schema-qualified name.
    pub fn push_qualified(&mut self, schema: Option<&str>, name: &str) {
        if let Some(schema) = schema {
            self.push_name(schema);
            self.push(&Token::new(TokenKind::Symbol, "."));
        }
        self.push_name(name);
    }

    /// Write a punctuation token: `(`, `)` or `,`.
    pub fn push_punct(&mut self, kind: TokenKind) {
        let text = match kind {
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            _ => ",",
        };
        self.push(&Token::new(kind, text));
    }

    /// Write stored SQL text token by token.
    pub fn push_fragment(&mut self, sql: &str) {
        for token in tokenize(sql) {
            self.push(&token);
        }
    }

    /// Write `items` separated by commas.
    pub fn push_list<T>(&mut self, items: &[T], mut write: impl FnMut(&mut Self, &T)) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.push_punct(TokenKind::Comma);
            }
            write(self, item);
        }
    }

    /// The text written so far.
    #[must_use]
    pub fn finish(self) -> String {
        self.sql
    }
}

/// Render a token sequence.
pub(crate) fn render_tokens(tokens: &[Token]) -> String {
    let mut writer = TokenWriter::new();
    for token in tokens {
        writer.push(token);
    }
    writer.finish()
}

/// `[name]` cannot hold a `]`; such names are double-quoted instead.
fn output_kind(token: &Token) -> TokenKind {
    match token.kind {
        TokenKind::SquareIdentifier if token.text.contains(']') => TokenKind::QuotedIdentifier,
        kind => kind,
    }
}

fn spell(token: &Token, sql: &mut String) {
    let quote = |sql: &mut String, open: char, close: char| {
        sql.push(open);
        for c in token.text.chars() {
            sql.push(c);
            if c == close {
                sql.push(close);
            }
        }
        sql.push(close);
    };
    match token.kind {
        TokenKind::QuotedIdentifier => quote(sql, '"', '"'),
        TokenKind::BackQuotedIdentifier => quote(sql, '`', '`'),
        TokenKind::StringLiteral => quote(sql, '\'', '\''),
        TokenKind::SquareIdentifier => {
            sql.push('[');
            sql.push_str(&token.text);
            sql.push(']');
        }
        TokenKind::BlobLiteral => {
            sql.push_str("X'");
            sql.push_str(&token.text);
            sql.push('\'');
        }
        _ => sql.push_str(&token.text),
    }
}

fn leading_edge(kind: TokenKind) -> Edge {
    match kind {
        TokenKind::BlobLiteral => Edge::Word,
        kind => trailing_edge(kind),
    }
}

fn trailing_edge(kind: TokenKind) -> Edge {
    match kind {
        TokenKind::QuotedIdentifier => Edge::Quote('"'),
        TokenKind::BackQuotedIdentifier => Edge::Quote('`'),
        TokenKind::StringLiteral | TokenKind::BlobLiteral => Edge::Quote('\''),
        TokenKind::Symbol | TokenKind::Sign | TokenKind::SymbolPrefix => Edge::Symbol,
        TokenKind::SquareIdentifier
        | TokenKind::OpenParen
        | TokenKind::CloseParen
        | TokenKind::Comma => Edge::Closed,
        TokenKind::Identifier
        | TokenKind::Numeric
        | TokenKind::Operator
        | TokenKind::Postfix
        | TokenKind::Prefix
        | TokenKind::Not
        | TokenKind::Invalid => Edge::Word,
    }
}

fn needs_space(prev: &Token, next: &Token) -> bool {
    let runs_together = match (trailing_edge(prev.kind), leading_edge(next.kind)) {
        (Edge::Word, Edge::Word) | (Edge::Symbol, Edge::Symbol) => true,
        (Edge::Quote(a), Edge::Quote(b)) => a == b,
        _ => false,
    };
    let starts_digit = |t: &Token| t.text.starts_with(|c: char| c.is_ascii_digit());

    runs_together
        // x 'ab' would read as a blob
        || (prev.kind == TokenKind::Identifier
            && prev.text.eq_ignore_ascii_case("x")
            && next.kind == TokenKind::StringLiteral)
        // 1 . would read as 1.
        || (prev.kind == TokenKind::Numeric && next.kind == TokenKind::Symbol && next.text == ".")
        // . 5 would read as .5
        || (prev.kind == TokenKind::Symbol
            && prev.text == "."
            && next.kind == TokenKind::Numeric
            && starts_digit(next))
}

impl FormatSql for Token {
    fn write_sql(&self, writer: &mut TokenWriter) {
        writer.push(self);
    }
}

impl FormatSql for Expression {
    fn write_sql(&self, writer: &mut TokenWriter) {
        match self {
            Expression::Empty => {}
            Expression::Leaf(token) => writer.push(token),
            Expression::Prefix { op, operand } => {
                writer.push(op);
                operand.write_sql(writer);
            }
            Expression::Binary { left, op, right } => {
                left.write_sql(writer);
                writer.push(op);
                right.write_sql(writer);
            }
            Expression::Postfix { operand, op } => {
                operand.write_sql(writer);
                writer.push(op);
            }
            Expression::Parenthesized(inner) => {
                writer.push_punct(TokenKind::OpenParen);
                inner.write_sql(writer);
                writer.push_punct(TokenKind::CloseParen);
            }
            Expression::Call { name, arguments } => {
                writer.push(name);
                writer.push_punct(TokenKind::OpenParen);
                arguments.write_sql(writer);
                writer.push_punct(TokenKind::CloseParen);
            }
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_sql())
    }
}

fn write_conflict(writer: &mut TokenWriter, action: Option<ConflictAction>) {
    if let Some(action) = action {
        writer.push_keyword("ON");
        writer.push_keyword("CONFLICT");
        writer.push_keyword(action.as_str());
    }
}

fn write_parenthesized_names(writer: &mut TokenWriter, names: &[String]) {
    writer.push_punct(TokenKind::OpenParen);
    writer.push_list(names, |w, name| w.push_name(name));
    writer.push_punct(TokenKind::CloseParen);
}

fn write_references(writer: &mut TokenWriter, references: &ForeignKey) {
    writer.push_keyword("REFERENCES");
    writer.push_name(&references.table);
    if !references.columns.is_empty() {
        write_parenthesized_names(writer, &references.columns);
    }
    writer.push_fragment(&references.clauses);
}

fn write_field(writer: &mut TokenWriter, field: &FieldInfo, inline_key: bool, table: &CreateTable) {
    writer.push_name(&field.name);
    writer.push_fragment(&field.type_name);

    if inline_key {
        writer.push_keyword("PRIMARY");
        writer.push_keyword("KEY");
        if field.is_pk_desc() {
            writer.push_keyword("DESC");
        }
        write_conflict(writer, table.primary_key_conflict);
        if field.is_autoincrement {
            writer.push_keyword("AUTOINCREMENT");
        }
    }
    if field.is_not_null {
        writer.push_keyword("NOT");
        writer.push_keyword("NULL");
        write_conflict(writer, field.not_null_conflict);
    }
    if field.is_unique {
        writer.push_keyword("UNIQUE");
        write_conflict(writer, field.unique_conflict);
    }
    if let Some(default) = &field.default {
        writer.push_keyword("DEFAULT");
        if default.is_quoted {
            writer.push(&Token::new(TokenKind::StringLiteral, default.text.as_str()));
        } else {
            writer.push_fragment(&default.text);
        }
    }
    if let Some(collation) = &field.collation {
        writer.push_keyword("COLLATE");
        writer.push_name(collation);
    }
    if let Some(references) = &field.references {
        write_references(writer, references);
    }
    if let Some(generated) = &field.generated {
        if generated.always {
            writer.push_keyword("GENERATED");
            writer.push_keyword("ALWAYS");
        }
        writer.push_keyword("AS");
        writer.push_punct(TokenKind::OpenParen);
        writer.push_fragment(&generated.expression);
        writer.push_punct(TokenKind::CloseParen);
        match generated.storage {
            Some(GeneratedStorage::Stored) => writer.push_keyword("STORED"),
            Some(GeneratedStorage::Virtual) => writer.push_keyword("VIRTUAL"),
            None => {}
        }
    }
}

impl FormatSql for CreateTable {
    fn write_sql(&self, writer: &mut TokenWriter) {
        writer.push_keyword("CREATE");
        if self.is_temporary {
            writer.push_keyword("TEMP");
        }
        writer.push_keyword("TABLE");
        if self.if_not_exists {
            writer.push_keyword("IF");
            writer.push_keyword("NOT");
            writer.push_keyword("EXISTS");
        }
        writer.push_qualified(self.schema.as_deref(), &self.name);
        writer.push_punct(TokenKind::OpenParen);

        let inline_key = self.inline_primary_key();
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                writer.push_punct(TokenKind::Comma);
            }
            write_field(writer, field, inline_key == Some(i), self);
        }

        // Table-level primary key
        if inline_key.is_none() && !self.primary_key.is_empty() {
            let members: Vec<&FieldInfo> = self.primary_key_fields().collect();
            writer.push_punct(TokenKind::Comma);
            writer.push_keyword("PRIMARY");
            writer.push_keyword("KEY");
            writer.push_punct(TokenKind::OpenParen);
            writer.push_list(&members, |w, field| {
                w.push_name(&field.name);
                if field.is_pk_desc() {
                    w.push_keyword("DESC");
                }
            });
            if members.iter().any(|f| f.is_autoincrement) {
                writer.push_keyword("AUTOINCREMENT");
            }
            writer.push_punct(TokenKind::CloseParen);
            write_conflict(writer, self.primary_key_conflict);
        }

        for unique in &self.unique_constraints {
            writer.push_punct(TokenKind::Comma);
            writer.push_keyword("UNIQUE");
            writer.push_punct(TokenKind::OpenParen);
            writer.push_list(&unique.columns, |w, column| {
                w.push_name(&column.name);
                if let Some(collation) = &column.collation {
                    w.push_keyword("COLLATE");
                    w.push_name(collation);
                }
                if column.descending {
                    w.push_keyword("DESC");
                }
            });
            writer.push_punct(TokenKind::CloseParen);
            write_conflict(writer, unique.on_conflict);
        }

        for check in &self.checks {
            writer.push_punct(TokenKind::Comma);
            writer.push_keyword("CHECK");
            writer.push_punct(TokenKind::OpenParen);
            writer.push_fragment(check);
            writer.push_punct(TokenKind::CloseParen);
        }

        for foreign_key in &self.foreign_keys {
            writer.push_punct(TokenKind::Comma);
            writer.push_keyword("FOREIGN");
            writer.push_keyword("KEY");
            write_parenthesized_names(writer, &foreign_key.columns);
            write_references(writer, &foreign_key.references);
        }

        writer.push_punct(TokenKind::CloseParen);

        if !self.has_rowid {
            writer.push_keyword("WITHOUT");
            writer.push_keyword("ROWID");
        }
        if self.is_strict {
            if !self.has_rowid {
                writer.push_punct(TokenKind::Comma);
            }
            writer.push_keyword("STRICT");
        }
    }
}

impl FormatSql for CreateIndex {
    fn write_sql(&self, writer: &mut TokenWriter) {
        writer.push_keyword("CREATE");
        if self.unique {
            writer.push_keyword("UNIQUE");
        }
        writer.push_keyword("INDEX");
        if self.if_not_exists {
            writer.push_keyword("IF");
            writer.push_keyword("NOT");
            writer.push_keyword("EXISTS");
        }
        writer.push_qualified(self.schema.as_deref(), &self.name);
        writer.push_keyword("ON");
        writer.push_name(&self.table);
        writer.push_punct(TokenKind::OpenParen);
        writer.push_list(&self.columns, |w, column| column.write_sql(w));
        writer.push_punct(TokenKind::CloseParen);
        if let Some(predicate) = &self.predicate {
            writer.push_keyword("WHERE");
            predicate.write_sql(writer);
        }
    }
}

impl FormatSql for Statement {
    fn write_sql(&self, writer: &mut TokenWriter) {
        match self {
            Statement::CreateTable(table) => table.write_sql(writer),
            Statement::CreateIndex(index) => index.write_sql(writer),
        }
    }
}
