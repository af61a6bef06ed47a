//! Statement parser fuzzer.
//!
//! Feeds arbitrary text to the permissive parser, which must never panic.
//! Whenever a statement parses completely, its rendering must parse back to
//! the same model and render to the same text.

use honggfuzz::fuzz;
use sqlite_ddl_rs::{FormatSql, Parser, Statement};

fn main() {
    loop {
        fuzz!(|sql: &str| {
            let parsed = Parser::new(sql).parse();
            let Ok(statement) = parsed.into_complete() else {
                return;
            };
            let rendered = statement.format_sql();
            let reparsed: Statement = rendered
                .parse()
                .unwrap_or_else(|error| panic!("Rendered {rendered:?} does not parse: {error}"));
            assert_eq!(reparsed.format_sql(), rendered, "Rendering is not idempotent");
        });
    }
}
