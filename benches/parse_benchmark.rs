//! Benchmark measuring DDL parsing, rendering and index retargeting.
//!
//! Compares SQLite's own parse of the same statements, through `prepare` on a
//! scratch connection, as a baseline for the statement parser.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rusqlite::Connection;
use sqlite_ddl_rs::sql::{is_valid_default, parse_expression, tokenize};
use sqlite_ddl_rs::{FormatSql, Parser, RenameMap, Statement};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const SMALL_TABLE: &str = "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL)";

const WIDE_TABLE: &str = "CREATE TABLE IF NOT EXISTS main.inventory (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    sku VARCHAR(32) NOT NULL UNIQUE COLLATE NOCASE,
    label TEXT NOT NULL DEFAULT 'it''s',
    price DECIMAL(10, 2) DEFAULT (0.0 + 1),
    quantity INTEGER NOT NULL DEFAULT 0 CHECK (quantity >= 0),
    owner INTEGER REFERENCES users (id) ON DELETE SET NULL DEFERRABLE INITIALLY DEFERRED,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
    total REAL GENERATED ALWAYS AS (price * quantity) STORED,
    UNIQUE (label, price),
    CHECK (price IS NULL OR price > 0)
)";

const PARTIAL_INDEX: &str = "CREATE UNIQUE INDEX ix_inventory ON inventory \
    (lower(label) COLLATE NOCASE, price DESC, CAST(quantity AS TEXT)) \
    WHERE quantity > 0 AND owner IS NOT NULL AND sku NOT LIKE 'tmp%'";

const STATEMENTS: [(&str, &str); 3] = [
    ("small_table", SMALL_TABLE),
    ("wide_table", WIDE_TABLE),
    ("partial_index", PARTIAL_INDEX),
];

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");
    for (name, sql) in STATEMENTS {
        group.bench_with_input(BenchmarkId::from_parameter(name), sql, |b, sql| {
            b.iter(|| tokenize(black_box(sql)));
        });
    }
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, sql) in STATEMENTS {
        group.bench_with_input(BenchmarkId::new("sqlite_ddl_rs", name), sql, |b, sql| {
            b.iter(|| Parser::new(black_box(sql)).parse());
        });
        group.bench_with_input(BenchmarkId::new("rusqlite_prepare", name), sql, |b, sql| {
            let conn = Connection::open_in_memory().unwrap();
            conn.execute_batch("CREATE TABLE inventory (label, price, quantity, owner, sku)")
                .unwrap();
            // Table statements are prepared under a fresh name.
            let sql = sql
                .replace("CREATE TABLE IF NOT EXISTS main.inventory", "CREATE TABLE scratch")
                .replace("CREATE TABLE users", "CREATE TABLE scratch");
            b.iter(|| conn.prepare(black_box(&sql)).map(|stmt| stmt.column_count()));
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    for (name, sql) in STATEMENTS {
        let statement: Statement = sql.parse().unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(name), &statement, |b, statement| {
            b.iter(|| black_box(statement).format_sql());
        });
    }
    group.finish();
}

fn bench_retarget(c: &mut Criterion) {
    let Ok(Statement::CreateIndex(index)) = PARTIAL_INDEX.parse::<Statement>() else {
        panic!("Fixture index must parse");
    };
    let mut renames = RenameMap::new();
    renames
        .rename("label", "title")
        .rename("quantity", "stock")
        .drop_column("legacy");

    c.bench_function("retarget/partial_index", |b| {
        b.iter(|| {
            let mut index = index.clone();
            index.retarget("inventory_new", black_box(&renames)).unwrap();
            index
        });
    });
}

fn bench_defaults(c: &mut Criterion) {
    let inputs = ["5", "'abc'", "-5", "(1 + 2 * coalesce(x, 3))", "1+2", "(SELECT 1)"];
    c.bench_function("default/validate", |b| {
        b.iter(|| inputs.iter().filter(|text| is_valid_default(black_box(text))).count());
    });
    c.bench_function("expression/parse", |b| {
        b.iter(|| parse_expression(black_box("a IS NOT NULL AND b NOT IN (1, 2) OR c BETWEEN 1 AND 5")));
    });
}

criterion_group!(
    benches,
    bench_tokenize,
    bench_parse,
    bench_render,
    bench_retarget,
    bench_defaults
);
criterion_main!(benches);
