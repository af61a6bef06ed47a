//! SQLite DDL text processing.
//!
//! This module turns the `sql` column of `sqlite_master` into a typed model
//! and back:
//! - [`tokenize`] splits text into classified [`Token`]s
//! - [`parse_expression`] builds precedence-free [`Expression`] trees
//! - [`Parser`] reads `CREATE TABLE` and `CREATE INDEX` statements
//! - [`FormatSql`] writes models back as compact, re-parseable SQL
//! - [`substitute`] renames columns inside index expressions

mod default_value;
mod expr_parser;
mod expression;
mod format;
mod lexer;
mod parser;
mod rename;
mod token;

pub use default_value::is_valid_default;
pub use expr_parser::{ExpressionParser, Level, TokenQueue, parse_expression};
pub use expression::Expression;
pub use format::{FormatSql, TokenWriter};
pub use lexer::{Lexer, tokenize};
pub use parser::Parser;
pub use rename::{Placement, RenameMap, substitute};
pub use token::{Token, TokenKind, is_keyword};
