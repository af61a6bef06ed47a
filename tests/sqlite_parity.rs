//! Parity tests against SQLite itself.
//!
//! Parsed models are compared with what SQLite reports through its pragmas,
//! and rendered statements are executed to check they build the same schema.
#![cfg(feature = "testing")]

use rusqlite::Connection;
use sqlite_ddl_rs::testing::{
    assert_render_equivalent, assert_table_matches_sqlite, index_columns, replay_index,
    table_columns,
};
use sqlite_ddl_rs::{FormatSql, RenameMap, Statement};

// =============================================================================
// Parsed models
// =============================================================================

#[test]
fn test_tables_match_sqlite() {
    for sql in [
        "CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT NOT NULL, note)",
        "CREATE TABLE t (a VARCHAR(40), b DOUBLE PRECISION, c DECIMAL(10, -2), d UNSIGNED BIG INT)",
        "CREATE TABLE t (a INT, b TEXT DEFAULT 'x', c REAL DEFAULT (1 + 2), PRIMARY KEY (b, a))",
        "CREATE TABLE t (k TEXT PRIMARY KEY, v INT GENERATED ALWAYS AS (length(k)) STORED) WITHOUT ROWID",
        "CREATE TABLE \"we\"\"ird\" ([a b] INT UNIQUE, `c` INT REFERENCES p (x) ON DELETE CASCADE)",
    ] {
        assert_table_matches_sqlite(sql);
    }
}

// =============================================================================
// Rendered statements
// =============================================================================

#[test]
fn test_rendered_tables_build_the_same_schema() {
    assert_render_equivalent(&[
        "CREATE TABLE inventory (id INTEGER PRIMARY KEY AUTOINCREMENT, \
         label VARCHAR(40) NOT NULL DEFAULT 'it''s', \
         price DOUBLE PRECISION DEFAULT (1 + 2), \
         UNIQUE (label, price))",
    ]);
    assert_render_equivalent(&[
        "CREATE TABLE t (a INTEGER PRIMARY KEY DESC, b TEXT COLLATE NOCASE UNIQUE ON CONFLICT IGNORE)",
    ]);
    assert_render_equivalent(&[
        "CREATE TABLE t (a INT, b INT, c TEXT, PRIMARY KEY (a, b DESC) ON CONFLICT REPLACE, \
         UNIQUE (c COLLATE NOCASE, b), CHECK (a <> b)) WITHOUT ROWID",
    ]);
}

#[test]
fn test_rendered_indexes_build_the_same_schema() {
    assert_render_equivalent(&[
        "CREATE TABLE t (a INT, b TEXT, c INT)",
        "CREATE UNIQUE INDEX ix ON t (a, b COLLATE NOCASE DESC) WHERE a > 0",
        "CREATE INDEX ix_expr ON t (lower(b), c * 2 DESC) WHERE b IS NOT NULL AND c NOT IN (1, 2)",
        "CREATE INDEX ix_cast ON t (CAST(b AS INTEGER), 'c')",
    ]);
}

#[test]
fn test_keyword_names_and_identifier_defaults() {
    let table = r#"CREATE TABLE items (id INTEGER, desc TEXT DEFAULT "abc", match INT DEFAULT abc)"#;
    assert_table_matches_sqlite(table);
    assert_render_equivalent(&[
        table,
        "CREATE INDEX ix_desc ON items (desc, like(desc, 'x%')) WHERE match > 0",
    ]);
}

// =============================================================================
// Rebuild and replay
// =============================================================================

fn catalog_sql(conn: &Connection, kind: &str, table: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT sql FROM sqlite_master WHERE type = ?1 AND tbl_name = ?2 AND sql IS NOT NULL ORDER BY name")
        .unwrap();
    stmt.query_map([kind, table], |row| row.get::<_, String>(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap()
}

#[test]
fn test_rebuild_and_replay_indexes() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE t (a INT, b TEXT, c INT);
         CREATE INDEX ix_a ON t (a);
         CREATE INDEX ix_bc ON t (b, c) WHERE c > 0;
         CREATE INDEX ix_lower ON t (lower(b) COLLATE NOCASE) WHERE b <> '';
         INSERT INTO t VALUES (1, 'x', 2), (2, 'y', 3);",
    )
    .unwrap();

    let table_sql = &catalog_sql(&conn, "table", "t")[0];
    let Ok(Statement::CreateTable(original)) = table_sql.parse::<Statement>() else {
        panic!("Catalog table did not parse");
    };
    let indexes: Vec<_> = catalog_sql(&conn, "index", "t")
        .iter()
        .map(|sql| match sql.parse::<Statement>() {
            Ok(Statement::CreateIndex(index)) => index,
            other => panic!("Catalog index did not parse: {other:?}"),
        })
        .collect();

    // Rename b to beta and drop c.
    let renames = RenameMap::pair_by_position(
        &original.fields,
        &[Some(String::from("a")), Some(String::from("beta")), None],
    );
    let mut rebuilt = original.clone();
    rebuilt.name = String::from("t_new");
    rebuilt.fields[1].name = String::from("beta");
    rebuilt.fields.truncate(2);

    conn.execute_batch(&rebuilt.format_sql()).unwrap();
    conn.execute_batch(
        "INSERT INTO t_new SELECT a, b FROM t;
         DROP TABLE t;
         ALTER TABLE t_new RENAME TO t;",
    )
    .unwrap();

    let mut replayed = Vec::new();
    for index in &indexes {
        if replay_index(&conn, index, "t", &renames).unwrap().is_some() {
            replayed.push(index.name.clone());
        }
    }
    assert_eq!(replayed, ["ix_a", "ix_lower"]);

    let columns = table_columns(&conn, "t").unwrap();
    assert_eq!(
        columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        ["a", "beta"]
    );

    let ix_a = index_columns(&conn, "ix_a").unwrap();
    assert_eq!(ix_a[0].column.as_deref(), Some("a"));
    let ix_lower = index_columns(&conn, "ix_lower").unwrap();
    assert_eq!(ix_lower[0].column, None);
    assert_eq!(ix_lower[0].collation, "NOCASE");

    let lower_sql = catalog_sql(&conn, "index", "t")
        .into_iter()
        .find(|sql| sql.contains("ix_lower"))
        .unwrap();
    assert!(lower_sql.contains("\"beta\""), "{lower_sql}");
}

#[test]
fn test_replay_renames_columns_after_collation() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE t (a TEXT, b TEXT);
         CREATE INDEX ix ON t (a COLLATE NOCASE || b) WHERE a COLLATE NOCASE = b;
         CREATE TABLE t_new (a TEXT, beta TEXT);",
    )
    .unwrap();
    let Ok(Statement::CreateIndex(index)) = catalog_sql(&conn, "index", "t")[0].parse::<Statement>()
    else {
        panic!("Catalog index did not parse");
    };
    conn.execute_batch("DROP INDEX ix").unwrap();

    let mut renames = RenameMap::new();
    renames.rename("b", "beta");
    let sql = replay_index(&conn, &index, "t_new", &renames).unwrap().unwrap();
    assert!(!sql.contains("\"b\"") && !sql.contains("||b"), "{sql}");
    assert_eq!(index_columns(&conn, "ix").unwrap().len(), 1);

    let mut dropped = RenameMap::new();
    dropped.rename("a", "a").drop_column("b");
    assert_eq!(replay_index(&conn, &index, "t_new", &dropped).unwrap(), None);
}
