//! Schema synthesis: bounded metadata scans with honest completeness.

mod summary;
mod synthesizer;

pub use summary::{ApproxCount, AttributeSummary, SchemaSummary, SetRelation, ValueDomain};
pub use synthesizer::{SchemaSynthesizer, DEFAULT_MAX_NOMINAL_VALUES};
