//! Differential fuzzer against SQLite.
//!
//! Generates a table definition, and whenever SQLite accepts it, checks that
//! the re-rendered statement builds the same columns and indexes.

use honggfuzz::fuzz;
use sqlite_ddl_rs::testing::{FuzzTable, assert_render_equivalent};

fn main() {
    loop {
        fuzz!(|table: FuzzTable| {
            if let Some(sql) = table.to_sql("fuzzed") {
                assert_render_equivalent(&[&sql]);
            }
        });
    }
}
