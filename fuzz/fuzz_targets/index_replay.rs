//! Replays generated indexes against a rebuilt table.
//!
//! Every column is renamed and one may be dropped; the retargeted index must
//! be accepted by SQLite unless it references the dropped column.

use honggfuzz::fuzz;
use sqlite_ddl_rs::testing::FuzzIndexReplay;

fn main() {
    loop {
        fuzz!(|replay: FuzzIndexReplay| {
            replay.check();
        });
    }
}
