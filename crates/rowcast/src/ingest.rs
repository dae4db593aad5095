//! One-call ingestion facade over the two-phase pipeline.

use crate::config::TranslationConfig;
use crate::cursor::RowCursor;
use crate::error::{CellError, Result};
use crate::inference::TypeGuesser;
use crate::schema::{SchemaSummary, SchemaSynthesizer, DEFAULT_MAX_NOMINAL_VALUES};
use crate::table::Table;
use crate::translate::{CancelToken, Translator};

/// Configuration for a full ingestion run.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Rows the type guesser inspects before concluding.
    pub probe_rows: usize,
    /// Distinct-value ceiling for schema previews.
    pub max_nominal_values: usize,
    /// Downgrade cell failures to missing values instead of aborting.
    pub fault_tolerant: bool,
    /// Explicit chrono date pattern; `None` tries the built-in formats.
    pub date_format: Option<String>,
    /// Data rows to materialize (None = all).
    pub max_rows: Option<usize>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            probe_rows: crate::inference::DEFAULT_PROBE_ROWS,
            max_nominal_values: DEFAULT_MAX_NOMINAL_VALUES,
            fault_tolerant: true,
            date_format: None,
            max_rows: None,
        }
    }
}

/// Outcome of a full ingestion run.
#[derive(Debug)]
pub struct IngestResult {
    /// The materialized table.
    pub table: Table,
    /// The configuration after type guessing, reusable for later runs
    /// over the same source.
    pub config: TranslationConfig,
    /// Cell failures downgraded to missing values.
    pub warnings: Vec<CellError>,
    /// Warnings beyond the stored cap.
    pub suppressed_warnings: usize,
    /// Structurally malformed rows the cursor skipped.
    pub skipped_rows: usize,
}

/// Drives bootstrap, type guessing, and translation as one operation.
///
/// The phases stay individually accessible for callers that want to edit
/// the [`TranslationConfig`] between guessing and translation; this facade
/// covers the common case where the guessed configuration is used as-is.
pub struct Ingester {
    config: IngestConfig,
    cancel: CancelToken,
}

impl Default for Ingester {
    fn default() -> Self {
        Self::new()
    }
}

impl Ingester {
    pub fn new() -> Self {
        Self::with_config(IngestConfig::default())
    }

    pub fn with_config(config: IngestConfig) -> Self {
        Self {
            config,
            cancel: CancelToken::new(),
        }
    }

    /// Abort the first conversion failure instead of downgrading it.
    pub fn strict(mut self) -> Self {
        self.config.fault_tolerant = false;
        self
    }

    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.config.date_format = Some(format.into());
        self
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.config.max_rows = Some(max_rows);
        self
    }

    /// Token that stops an in-flight run from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Bootstrap a configuration, guess types, and materialize the table.
    pub fn ingest(&self, cursor: &mut dyn RowCursor) -> Result<IngestResult> {
        let config = self.prepare(cursor)?;
        self.ingest_with(cursor, &config)
    }

    /// Materialize under a caller-supplied configuration, skipping the
    /// guessing pass.
    pub fn ingest_with(
        &self,
        cursor: &mut dyn RowCursor,
        config: &TranslationConfig,
    ) -> Result<IngestResult> {
        let translation =
            Translator::new().translate(cursor, config, self.config.max_rows, &self.cancel)?;
        Ok(IngestResult {
            table: translation.table,
            config: config.clone(),
            warnings: translation.warnings,
            suppressed_warnings: translation.suppressed_warnings,
            skipped_rows: cursor.skipped_rows(),
        })
    }

    /// Bounded schema preview: bootstrap, guess, then synthesize over at
    /// most `probe_rows` data rows. Claims in the result are downgraded
    /// accordingly when the source is longer than the probe.
    pub fn preview(&self, cursor: &mut dyn RowCursor) -> Result<SchemaSummary> {
        let config = self.prepare(cursor)?;
        SchemaSynthesizer::new()
            .with_max_nominal_values(self.config.max_nominal_values)
            .with_row_cap(self.config.probe_rows)
            .synthesize(cursor, &config)
    }

    /// Bootstrap from the cursor and run the guessing pass.
    pub fn prepare(&self, cursor: &mut dyn RowCursor) -> Result<TranslationConfig> {
        let mut config = TranslationConfig::bootstrap(cursor);
        config.fault_tolerant = self.config.fault_tolerant;
        config.date_format = self.config.date_format.clone();
        TypeGuesser::new()
            .with_probe_rows(self.config.probe_rows)
            .guess(cursor, &mut config)?;
        Ok(config)
    }
}
