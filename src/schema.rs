//! Structured model of parsed `CREATE TABLE` and `CREATE INDEX` statements.
mod field;
mod index;
mod statement;
mod table;

pub use field::{
    ConflictAction, DefaultValue, FieldInfo, ForeignKey, GeneratedColumn, GeneratedStorage,
    recompute_whole_primary_key,
};
pub use index::CreateIndex;
pub use statement::{ParseStop, ParsedStatement, Statement};
pub use table::{CreateTable, OrderedColumn, TableForeignKey, UniqueConstraint};
