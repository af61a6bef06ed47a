#![doc = include_str!("../README.md")]
#![no_std]
#![deny(clippy::mod_module_files)]

extern crate alloc;
#[cfg(feature = "testing")]
extern crate std;

pub mod errors;
pub mod schema;
pub mod sql;
#[cfg(feature = "testing")]
pub mod testing;

// Re-export main types
pub use schema::{
    ConflictAction, CreateIndex, CreateTable, DefaultValue, FieldInfo, ForeignKey,
    GeneratedColumn, GeneratedStorage, OrderedColumn, ParseStop, ParsedStatement, Statement,
    TableForeignKey, UniqueConstraint,
};
pub use sql::{Expression, FormatSql, Parser, Placement, RenameMap, Token, TokenKind};

// Re-export errors
pub use errors::{Error, ExpressionError, ParseError, RenameError};
