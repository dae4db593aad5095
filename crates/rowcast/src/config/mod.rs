//! Configuration model: column metadata and translation settings.

mod column;
mod translation;

pub use column::{ColumnMetaData, ValueType};
pub use translation::{AnnotationKind, TranslationConfig};
