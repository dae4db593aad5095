//! Rowcast: typed ingestion engine for heterogeneous tabular sources.
//!
//! Rowcast turns row-oriented sources (CSV files, in-memory rows, anything
//! implementing [`RowCursor`]) into a typed, column-oriented [`Table`]
//! through a two-phase pipeline: a bounded probe pass that guesses a type
//! per column, then a translation pass that materializes values under the
//! resulting configuration.
//!
//! # Core Principles
//!
//! - **Two-phase**: guessing never materializes data; translation never
//!   revises types
//! - **Addressable failures**: every conversion error names its row,
//!   column, and offending text
//! - **Honest previews**: schema synthesis over a bounded prefix reports
//!   its own incompleteness
//!
//! # Example
//!
//! ```no_run
//! use rowcast::{CsvCursor, Ingester};
//!
//! let mut cursor = CsvCursor::open("measurements.csv").unwrap();
//! let result = Ingester::new().ingest(&mut cursor).unwrap();
//!
//! println!("Rows: {}", result.table.row_count());
//! println!("Attributes: {}", result.table.attribute_count());
//! ```

pub mod config;
pub mod cursor;
pub mod error;
pub mod inference;
pub mod parse;
pub mod schema;
pub mod table;
pub mod translate;

mod ingest;

pub use config::{AnnotationKind, ColumnMetaData, TranslationConfig, ValueType};
pub use cursor::{CsvCursor, CsvOptions, MemoryCursor, RowCursor, SourceMetadata};
pub use error::{CellError, ErrorCode, Result, RowcastError};
pub use inference::TypeGuesser;
pub use ingest::{IngestConfig, IngestResult, Ingester};
pub use schema::{
    ApproxCount, AttributeSummary, SchemaSummary, SchemaSynthesizer, SetRelation, ValueDomain,
};
pub use table::{Attribute, Table};
pub use translate::{CancelToken, Translation, Translator};
