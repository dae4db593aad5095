//! Command implementations.

pub mod schema;
pub mod translate;

use std::path::Path;

use rowcast::{CsvCursor, CsvOptions, Result};

/// Open a cursor with the shared source flags.
pub fn open_cursor(path: &Path, no_header: bool) -> Result<CsvCursor> {
    CsvCursor::open_with(
        path,
        CsvOptions {
            has_header: !no_header,
            ..CsvOptions::default()
        },
    )
}
