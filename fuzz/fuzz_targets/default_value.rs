//! Column default fuzzer.
//!
//! Every accepted default must survive a trip through a column definition.

use honggfuzz::fuzz;
use sqlite_ddl_rs::sql::is_valid_default;
use sqlite_ddl_rs::{DefaultValue, FormatSql, Statement};

fn main() {
    loop {
        fuzz!(|text: &str| {
            let Some(default) = DefaultValue::parse(text) else {
                assert!(!is_valid_default(text));
                return;
            };
            assert!(is_valid_default(text));

            let mut table = sqlite_ddl_rs::CreateTable::new("t");
            table.fields.push(sqlite_ddl_rs::FieldInfo::new("c"));
            table.fields[0].default = Some(default.clone());
            let rendered = table.format_sql();
            let Ok(Statement::CreateTable(reparsed)) = rendered.parse::<Statement>() else {
                panic!("Rendered {rendered:?} does not parse");
            };
            assert_eq!(reparsed.fields[0].default.as_ref(), Some(&default));
        });
    }
}
