//! Round-trip tests for the DDL engine's public surface.
//!
//! Rendering only has to preserve meaning, so most checks compare token
//! sequences or re-parsed models rather than exact text.

use sqlite_ddl_rs::sql::{is_valid_default, parse_expression, tokenize};
use sqlite_ddl_rs::{
    CreateIndex, CreateTable, Error, FormatSql, ParseError, Parser, RenameError, RenameMap,
    Statement, TokenKind,
};
use tracing_subscriber::EnvFilter;

/// Route the crate's debug events to the test output, filtered by `RUST_LOG`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn table(sql: &str) -> CreateTable {
    match sql.parse::<Statement>() {
        Ok(Statement::CreateTable(table)) => table,
        other => panic!("Expected CreateTable, got {other:?}"),
    }
}

fn index(sql: &str) -> CreateIndex {
    match sql.parse::<Statement>() {
        Ok(Statement::CreateIndex(index)) => index,
        other => panic!("Expected CreateIndex, got {other:?}"),
    }
}

// =============================================================================
// Round trips
// =============================================================================

#[test]
fn test_table_renders_to_the_same_tokens() {
    let sql = "CREATE TABLE inventory (id INTEGER PRIMARY KEY AUTOINCREMENT, \
               label VARCHAR(40) NOT NULL DEFAULT 'it''s', \
               price DOUBLE PRECISION DEFAULT (1 + 2), \
               UNIQUE (label, price))";
    let rendered = table(sql).format_sql();
    assert_eq!(tokenize(&rendered), tokenize(sql), "rendered as {rendered}");
}

#[test]
fn test_index_renders_to_an_equivalent_statement() {
    let sql = "CREATE UNIQUE INDEX ix ON t (a, b COLLATE NOCASE DESC) WHERE a > 0";
    let rendered = index(sql).format_sql();
    assert_eq!(tokenize(&rendered), tokenize(sql));
    assert_eq!(index(&rendered), index(sql));
}

#[test]
fn test_render_is_idempotent() {
    let statements = [
        "CREATE TABLE t (a INT, b TEXT DEFAULT 'x' COLLATE NOCASE, PRIMARY KEY (b DESC, a))",
        "CREATE TEMP TABLE IF NOT EXISTS \"odd \"\"name\"\"\" ([a b] INTEGER PRIMARY KEY DESC, `c` BLOB)",
        "CREATE TABLE c (id INT REFERENCES p (id) ON DELETE CASCADE, n INT CHECK (n > 0), \
         g INT GENERATED ALWAYS AS (n * 2) VIRTUAL) STRICT",
        "CREATE INDEX ix ON t (lower(a), b + 1 DESC, 'c') WHERE a IS NOT NULL AND b NOT IN (1, 2)",
        "CREATE TABLE w (k TEXT, v INT, PRIMARY KEY (k)) WITHOUT ROWID",
    ];
    for sql in statements {
        let first: Statement = sql.parse().unwrap();
        let rendered = first.format_sql();
        let second: Statement = rendered.parse().unwrap();
        assert_eq!(first, second, "{sql} rendered as {rendered}");
        assert_eq!(second.format_sql(), rendered);
    }
}

#[test]
fn test_reparsed_fields_are_equal() {
    let sql = "CREATE TABLE t (a INTEGER NOT NULL ON CONFLICT FAIL, b DECIMAL(10, 2) UNIQUE, \
               c TEXT DEFAULT CURRENT_TIMESTAMP, d INT DEFAULT -7)";
    let first = table(sql);
    let second = table(&first.format_sql());
    assert_eq!(first.fields, second.fields);
}

// =============================================================================
// DEFAULT values
// =============================================================================

#[test]
fn test_default_validity() {
    for valid in ["5", "'abc'", "-5", "+1.5e3", "(1+2)", "NULL", "X'CAFE'", "current_date"] {
        assert!(is_valid_default(valid), "{valid}");
    }
    for invalid in ["1+2", "abc", "\"abc\"", "- 'a'", "(SELECT 1)", "(1", "'a' 'b'", ""] {
        assert!(!is_valid_default(invalid), "{invalid}");
    }
}

// =============================================================================
// Column substitution
// =============================================================================

#[test]
fn test_substitution_renames_columns() {
    let mut ix = index("CREATE INDEX ix ON t (a, b) WHERE a > 0");
    let mut renames = RenameMap::new();
    renames.rename("a", "z");
    ix.substitute_columns(&renames).unwrap();
    assert_eq!(
        ix.columns.iter().map(FormatSql::format_sql).collect::<Vec<_>>(),
        ["\"z\"", "b"]
    );
    assert_eq!(
        ix.predicate.as_ref().map(FormatSql::format_sql).as_deref(),
        Some("\"z\">0")
    );
}

#[test]
fn test_substitution_fails_on_dropped_column() {
    init_tracing();
    let ix = index("CREATE INDEX ix ON t (a, b) WHERE a > 0");
    let mut renames = RenameMap::new();
    renames.drop_column("a");
    let mut attempt = ix.clone();
    assert_eq!(
        attempt.retarget("t2", &renames).map_err(Error::from),
        Err(Error::Rename(RenameError::DroppedColumn {
            column: String::from("a")
        }))
    );
}

#[test]
fn test_pair_by_position_follows_edited_fields() {
    let t = table("CREATE TABLE t (a INT, b INT, c INT)");
    let renames = RenameMap::pair_by_position(&t.fields, &[Some(String::from("x")), None, Some(String::from("c"))]);
    let mut ix = index("CREATE INDEX ix ON t (c, a)");
    ix.retarget("t", &renames).unwrap();
    assert_eq!(ix.format_sql(), "CREATE INDEX ix ON t(\"c\",\"x\")");

    let mut ix = index("CREATE INDEX ix ON t (b)");
    assert!(ix.retarget("t", &renames).is_err());
}

// =============================================================================
// Tokenizer and expressions
// =============================================================================

#[test]
fn test_tokenizer_quoting() {
    let tokens = tokenize("'it''s' [weird name] x'1g'");
    assert_eq!(tokens.len(), 3);
    assert_eq!((tokens[0].kind, tokens[0].text.as_str()), (TokenKind::StringLiteral, "it's"));
    assert_eq!((tokens[1].kind, tokens[1].text.as_str()), (TokenKind::SquareIdentifier, "weird name"));
    assert_eq!(tokens[2].kind, TokenKind::Invalid);
}

#[test]
fn test_expressions_keep_source_order() {
    let expression = parse_expression("a + b * c").unwrap();
    assert_eq!(expression.format_sql(), "a+b*c");
    assert!(parse_expression("a +").is_err());
}

// =============================================================================
// Partial parses
// =============================================================================

#[test]
fn test_partial_parse_is_reported() {
    init_tracing();
    let parsed = Parser::new("CREATE TABLE t (a INT, b INT) garbage").parse();
    assert!(!parsed.is_complete());
    assert_eq!(
        parsed.statement.as_ref().map(Statement::name),
        Some("t")
    );
    assert_eq!(
        parsed.into_complete(),
        Err(ParseError::Incomplete {
            state: "TableEnd",
            token: Some(String::from("garbage"))
        })
    );
}
