//! Testing utilities comparing parsed models with SQLite itself.
//!
//! This module is gated behind the `testing` feature.
//!
//! # Provided helpers
//!
//! - [`table_columns`]: the columns SQLite reports for a table
//! - [`table_indexes`]: the indexes SQLite reports for a table, with their key columns
//! - [`assert_table_matches_sqlite`]: compare a parsed table with SQLite's view of it
//! - [`assert_render_equivalent`]: check that re-rendered statements build the same schema
//! - [`replay_index`]: retarget an index at a rebuilt table and create it
//! - [`FuzzTable`]: arbitrary table definitions for the fuzz targets
//! - [`FuzzIndexReplay`]: arbitrary indexes replayed against a rebuilt table

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use arbitrary::Arbitrary;
use rusqlite::Connection;

use crate::schema::{CreateIndex, CreateTable, Statement};
use crate::sql::{FormatSql, RenameMap};

/// One column as reported by `PRAGMA table_xinfo`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Declared type, as written.
    pub declared_type: String,
    /// `NOT NULL` constraint.
    pub not_null: bool,
    /// Default expression text, as written.
    pub default: Option<String>,
    /// 1-based position in the primary key, 0 if not a key column.
    pub primary_key_position: i64,
    /// 0 for plain columns, 2 for virtual and 3 for stored generated columns.
    pub hidden: i64,
}

/// One key column of an index, as reported by `PRAGMA index_xinfo`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct IndexColumnInfo {
    /// Column name, `None` for an expression.
    pub column: Option<String>,
    /// Descending sort order.
    pub descending: bool,
    /// Collating sequence name.
    pub collation: String,
}

/// One index of a table, as reported by `PRAGMA index_list`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct IndexInfo {
    /// `c` for `CREATE INDEX`, `u` for `UNIQUE` and `pk` for `PRIMARY KEY`.
    pub origin: String,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
    /// Whether the index has a `WHERE` clause.
    pub partial: bool,
    /// Key columns in index order.
    pub columns: Vec<IndexColumnInfo>,
}

/// Columns of `table`, hidden ones included, in declaration order.
///
/// # Errors
///
/// Returns an error if the pragma query fails.
pub fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<ColumnInfo>> {
    let mut stmt = conn.prepare(
        "SELECT name, type, \"notnull\", dflt_value, pk, hidden FROM pragma_table_xinfo(?1) ORDER BY cid",
    )?;
    let rows = stmt.query_map([table], |row| {
        Ok(ColumnInfo {
            name: row.get(0)?,
            declared_type: row.get(1)?,
            not_null: row.get(2)?,
            default: row.get(3)?,
            primary_key_position: row.get(4)?,
            hidden: row.get(5)?,
        })
    })?;
    rows.collect()
}

/// Key columns of `index`, in index order.
///
/// # Errors
///
/// Returns an error if the pragma query fails.
pub fn index_columns(conn: &Connection, index: &str) -> rusqlite::Result<Vec<IndexColumnInfo>> {
    let mut stmt = conn.prepare(
        "SELECT name, \"desc\", coll FROM pragma_index_xinfo(?1) WHERE key = 1 ORDER BY seqno",
    )?;
    let rows = stmt.query_map([index], |row| {
        Ok(IndexColumnInfo {
            column: row.get(0)?,
            descending: row.get(1)?,
            collation: row.get(2)?,
        })
    })?;
    rows.collect()
}

/// Indexes of `table`, sorted so that automatic index names do not matter.
///
/// # Errors
///
/// Returns an error if a pragma query fails.
pub fn table_indexes(conn: &Connection, table: &str) -> rusqlite::Result<Vec<IndexInfo>> {
    let listed: Vec<(String, bool, String, bool)> = {
        let mut stmt =
            conn.prepare("SELECT name, \"unique\", origin, partial FROM pragma_index_list(?1)")?;
        let rows = stmt.query_map([table], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?;
        rows.collect::<rusqlite::Result<_>>()?
    };

    let mut indexes = Vec::with_capacity(listed.len());
    for (name, unique, origin, partial) in listed {
        indexes.push(IndexInfo {
            origin,
            unique,
            partial,
            columns: index_columns(conn, &name)?,
        });
    }
    indexes.sort();
    Ok(indexes)
}

/// Declared types compare equal when they differ only in case and spacing.
fn normalize_type(declared: &str) -> String {
    declared
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

fn parse_table(sql: &str) -> CreateTable {
    match sql.parse::<Statement>() {
        Ok(Statement::CreateTable(table)) => table,
        other => panic!("Expected a complete CREATE TABLE for {sql:?}, got {other:?}"),
    }
}

/// Assert that the parsed model of `sql` agrees with what SQLite reports
/// after executing it.
///
/// # Panics
///
/// Panics if SQLite rejects `sql`, if it does not parse completely, or if a
/// column's name, type, nullability, default presence, key position or
/// generated flag differs.
pub fn assert_table_matches_sqlite(sql: &str) {
    let table = parse_table(sql);
    let conn = Connection::open_in_memory().expect("Failed to open database");
    conn.execute_batch(sql).expect("SQLite rejected the statement");
    let columns = table_columns(&conn, &table.name).expect("Failed to read table_xinfo");

    assert_eq!(
        table.column_names(),
        columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        "Column names differ for {sql:?}"
    );
    for (index, (field, column)) in table.fields.iter().zip(&columns).enumerate() {
        assert_eq!(
            normalize_type(&field.type_name),
            normalize_type(&column.declared_type),
            "Type of {} differs",
            field.name
        );
        // WITHOUT ROWID key columns are implicitly NOT NULL.
        if table.has_rowid || !field.is_primary_key {
            assert_eq!(field.is_not_null, column.not_null, "NOT NULL of {} differs", field.name);
        }
        assert_eq!(
            field.default.is_some(),
            column.default.is_some(),
            "Default presence of {} differs",
            field.name
        );
        let position = table
            .primary_key
            .iter()
            .position(|&i| i == index)
            .map_or(0, |p| p + 1);
        assert_eq!(
            i64::try_from(position).ok(),
            Some(column.primary_key_position),
            "Key position of {} differs",
            field.name
        );
        assert_eq!(
            field.generated.is_some(),
            column.hidden >= 2,
            "Generated flag of {} differs",
            field.name
        );
    }
}

/// Assert that re-rendering `statements` produces the same schema in SQLite.
///
/// The first statement must be a `CREATE TABLE`; the rest are its indexes.
/// Both the original and the rendered statements are executed in fresh
/// databases, then the table's columns and indexes are compared.
///
/// Returns without checking anything if SQLite rejects the original
/// statements, so that fuzz targets can feed generated input.
///
/// # Panics
///
/// Panics if an accepted statement does not parse completely, if SQLite
/// rejects the rendered form, or if the two schemas differ.
pub fn assert_render_equivalent(statements: &[&str]) {
    let original = Connection::open_in_memory().expect("Failed to open database");
    for sql in statements {
        if original.execute_batch(sql).is_err() {
            return;
        }
    }

    let rendered: Vec<String> = statements
        .iter()
        .map(|sql| match sql.parse::<Statement>() {
            Ok(statement) => statement.format_sql(),
            Err(error) => panic!("SQLite accepts {sql:?} but parsing failed: {error}"),
        })
        .collect();
    let copy = Connection::open_in_memory().expect("Failed to open database");
    for sql in &rendered {
        if let Err(error) = copy.execute_batch(sql) {
            panic!("SQLite rejects rendered {sql:?}: {error}");
        }
    }

    let Some(first) = statements.first() else {
        return;
    };
    let table = parse_table(first);
    assert_eq!(
        normalized(table_columns(&original, &table.name).expect("Failed to read original columns")),
        normalized(table_columns(&copy, &table.name).expect("Failed to read rendered columns")),
        "Columns differ, rendered as {rendered:?}"
    );
    assert_eq!(
        table_indexes(&original, &table.name).expect("Failed to read original indexes"),
        table_indexes(&copy, &table.name).expect("Failed to read rendered indexes"),
        "Indexes differ, rendered as {rendered:?}"
    );
}

/// Types and defaults are stored as written; compare them without spacing.
fn normalized(columns: Vec<ColumnInfo>) -> Vec<ColumnInfo> {
    columns
        .into_iter()
        .map(|column| ColumnInfo {
            declared_type: normalize_type(&column.declared_type),
            default: column.default.as_deref().map(normalize_type),
            ..column
        })
        .collect()
}

/// Retarget `index` at `table` under `renames` and create it in `conn`.
///
/// Returns the executed SQL, or `None` if the index references a dropped
/// column and was not replayed.
///
/// # Errors
///
/// Returns an error if SQLite rejects the retargeted index.
pub fn replay_index(
    conn: &Connection,
    index: &CreateIndex,
    table: &str,
    renames: &RenameMap,
) -> rusqlite::Result<Option<String>> {
    let mut index = index.clone();
    if index.retarget(table, renames).is_err() {
        return Ok(None);
    }
    let sql = index.format_sql();
    conn.execute_batch(&sql)?;
    Ok(Some(sql))
}

/// Column types the fuzzer picks from.
#[derive(Debug, Clone, Copy, Arbitrary)]
pub enum FuzzType {
    /// No declared type.
    Untyped,
    /// `INTEGER`
    Integer,
    /// `TEXT`
    Text,
    /// `REAL`
    Real,
    /// `BLOB`
    Blob,
    /// `VARCHAR(n)`
    Varchar(u8),
    /// `DECIMAL(p, s)`
    Decimal(u8, i8),
    /// `DOUBLE PRECISION`
    DoublePrecision,
}

/// Column defaults the fuzzer picks from.
#[derive(Debug, Clone, Arbitrary)]
pub enum FuzzDefault {
    /// `NULL`
    Null,
    /// A signed integer literal.
    Integer(i32),
    /// A string literal.
    Text(String),
    /// `(a + b)`
    Sum(i16, i16),
    /// `CURRENT_TIMESTAMP`
    CurrentTimestamp,
}

/// One generated column definition.
#[derive(Debug, Clone, Arbitrary)]
pub struct FuzzColumn {
    /// Column name, always written double-quoted.
    pub name: String,
    /// Declared type.
    pub column_type: FuzzType,
    /// `NOT NULL`
    pub not_null: bool,
    /// `UNIQUE`
    pub unique: bool,
    /// `COLLATE NOCASE`
    pub nocase: bool,
    /// `DEFAULT ...`
    pub default: Option<FuzzDefault>,
}

/// A generated `CREATE TABLE` statement.
#[derive(Debug, Clone, Arbitrary)]
pub struct FuzzTable {
    /// Column definitions.
    pub columns: Vec<FuzzColumn>,
    /// Positions of the primary key columns, reduced modulo the column count.
    pub primary_key: Vec<u8>,
    /// Whether the key's first column is descending.
    pub descending: bool,
    /// `WITHOUT ROWID`
    pub without_rowid: bool,
}

fn quote(text: &str, quote: char) -> String {
    let doubled = format!("{quote}{quote}");
    format!("{quote}{}{quote}", text.replace(quote, &doubled))
}

impl FuzzTable {
    /// Render the table as SQL text, `None` if no usable column was generated.
    ///
    /// Columns with empty, duplicate or NUL-containing names are skipped.
    #[must_use]
    pub fn to_sql(&self, table: &str) -> Option<String> {
        let columns = self.usable_columns();
        if columns.is_empty() {
            return None;
        }
        let names: Vec<&str> = columns.iter().map(|column| column.name.as_str()).collect();
        let mut definitions: Vec<String> = columns.iter().map(|column| column.to_sql()).collect();

        let mut key: Vec<&str> = Vec::new();
        for &position in &self.primary_key {
            let name = names[usize::from(position) % names.len()];
            if !key.contains(&name) {
                key.push(name);
            }
        }
        if !key.is_empty() {
            let columns: Vec<String> = key
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let name = quote(name, '"');
                    if i == 0 && self.descending {
                        format!("{name} DESC")
                    } else {
                        name
                    }
                })
                .collect();
            definitions.push(format!("PRIMARY KEY ({})", columns.join(", ")));
        }

        let mut sql = format!(
            "CREATE TABLE {} ({})",
            quote(table, '"'),
            definitions.join(", ")
        );
        if self.without_rowid {
            sql.push_str(" WITHOUT ROWID");
        }
        Some(sql)
    }

    /// The columns [`FuzzTable::to_sql`] writes, in order.
    #[must_use]
    pub fn usable_columns(&self) -> Vec<&FuzzColumn> {
        let mut usable: Vec<&FuzzColumn> = Vec::new();
        for column in &self.columns {
            let duplicate = usable
                .iter()
                .any(|kept| kept.name.eq_ignore_ascii_case(&column.name));
            if column.name.is_empty() || column.name.contains('\0') || duplicate {
                continue;
            }
            usable.push(column);
        }
        usable
    }
}

/// A generated index over a [`FuzzTable`], replayed against a rebuilt copy
/// of the table in which every column is renamed and one may be dropped.
#[derive(Debug, Clone, Arbitrary)]
pub struct FuzzIndexReplay {
    /// The indexed table.
    pub table: FuzzTable,
    /// Key columns: a column position, reduced modulo the column count, and
    /// whether to index `lower(column)` instead of the column itself.
    pub keys: Vec<(u8, bool)>,
    /// Column tested by a `WHERE column IS NOT NULL` predicate.
    pub predicate: Option<u8>,
    /// Column dropped by the rebuild.
    pub dropped: Option<u8>,
}

impl FuzzIndexReplay {
    /// Create the table and index, rebuild the table and replay the index.
    ///
    /// Inputs SQLite rejects are skipped. An index that references the
    /// dropped column must not be replayed; any other index must be accepted
    /// by SQLite with the same number of key columns.
    ///
    /// # Panics
    ///
    /// Panics if the catalog index does not parse, if replaying it fails, or
    /// if the replayed index differs from the expected shape.
    pub fn check(&self) {
        let columns = self.table.usable_columns();
        let Some(table_sql) = self.table.to_sql("fuzzed") else {
            return;
        };
        if self.keys.is_empty() {
            return;
        }
        let pick = |position: u8| usize::from(position) % columns.len();

        let keys: Vec<String> = self
            .keys
            .iter()
            .map(|&(position, lower)| {
                let name = quote(&columns[pick(position)].name, '"');
                if lower { format!("lower({name})") } else { name }
            })
            .collect();
        let mut index_sql = format!("CREATE INDEX fuzzed_index ON \"fuzzed\" ({})", keys.join(", "));
        if let Some(position) = self.predicate {
            let name = quote(&columns[pick(position)].name, '"');
            index_sql.push_str(&format!(" WHERE {name} IS NOT NULL"));
        }

        let conn = Connection::open_in_memory().expect("Failed to open database");
        if conn.execute_batch(&table_sql).is_err() || conn.execute_batch(&index_sql).is_err() {
            return;
        }
        let catalog: String = conn
            .query_row(
                "SELECT sql FROM sqlite_master WHERE name = 'fuzzed_index'",
                [],
                |row| row.get(0),
            )
            .expect("Failed to read the catalog index");
        let index = match catalog.parse::<Statement>() {
            Ok(Statement::CreateIndex(index)) => index,
            other => panic!("Catalog index {catalog:?} did not parse: {other:?}"),
        };

        let dropped = self.dropped.map(pick);
        let mut renames = RenameMap::new();
        let mut rebuilt = Vec::new();
        for (i, column) in columns.iter().enumerate() {
            if Some(i) == dropped {
                renames.drop_column(&column.name);
            } else {
                let new_name = format!("new_{}", column.name);
                rebuilt.push(quote(&new_name, '"'));
                renames.rename(&column.name, new_name);
            }
        }
        if rebuilt.is_empty() {
            return;
        }
        conn.execute_batch(&format!("CREATE TABLE rebuilt ({})", rebuilt.join(", ")))
            .expect("Failed to create the rebuilt table");

        let references_dropped = dropped.is_some_and(|dropped| {
            self.keys.iter().any(|&(position, _)| pick(position) == dropped)
                || self.predicate.is_some_and(|position| pick(position) == dropped)
        });
        conn.execute_batch("DROP INDEX fuzzed_index")
            .expect("Failed to drop the original index");
        let replayed = match replay_index(&conn, &index, "rebuilt", &renames) {
            Ok(replayed) => replayed,
            Err(error) => panic!("SQLite rejects the replay of {catalog:?}: {error}"),
        };
        assert_eq!(
            replayed.is_none(),
            references_dropped,
            "Replay of {catalog:?} gave {replayed:?}"
        );
        if replayed.is_some() {
            let replayed_columns = index_columns(&conn, "fuzzed_index")
                .expect("Failed to read the replayed index");
            assert_eq!(replayed_columns.len(), self.keys.len(), "Replayed {replayed:?}");
        }
    }
}

impl FuzzColumn {
    fn to_sql(&self) -> String {
        let mut definition = quote(&self.name, '"');
        match self.column_type {
            FuzzType::Untyped => {}
            FuzzType::Integer => definition.push_str(" INTEGER"),
            FuzzType::Text => definition.push_str(" TEXT"),
            FuzzType::Real => definition.push_str(" REAL"),
            FuzzType::Blob => definition.push_str(" BLOB"),
            FuzzType::Varchar(width) => definition.push_str(&format!(" VARCHAR({width})")),
            FuzzType::Decimal(precision, scale) => {
                definition.push_str(&format!(" DECIMAL({precision}, {scale})"));
            }
            FuzzType::DoublePrecision => definition.push_str(" DOUBLE PRECISION"),
        }
        if self.not_null {
            definition.push_str(" NOT NULL");
        }
        if self.unique {
            definition.push_str(" UNIQUE");
        }
        if self.nocase {
            definition.push_str(" COLLATE NOCASE");
        }
        let default = match &self.default {
            None => None,
            Some(FuzzDefault::Null) => Some(String::from("NULL")),
            Some(FuzzDefault::Integer(value)) => Some(value.to_string()),
            Some(FuzzDefault::Text(text)) if text.contains('\0') => None,
            Some(FuzzDefault::Text(text)) => Some(quote(text, '\'')),
            Some(FuzzDefault::Sum(a, b)) => Some(format!("({a} + {b})")),
            Some(FuzzDefault::CurrentTimestamp) => Some(String::from("CURRENT_TIMESTAMP")),
        };
        if let Some(default) = default {
            definition.push_str(" DEFAULT ");
            definition.push_str(&default);
        }
        definition
    }
}
