//! Reference cursor over delimited text files.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use csv::StringRecord;
use sha2::{Digest, Sha256};

use crate::error::{Result, RowcastError};

use super::{cell_is_missing, RowCursor, SourceMetadata};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Reader options for a delimited text source.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the file starts with a header row naming the columns.
    pub has_header: bool,
    /// Quote character.
    pub quote: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            quote: b'"',
        }
    }
}

/// Replayable cursor over a delimited text file.
///
/// The file has no native typing, so every column reports `Text` and all
/// typing is inferred downstream. Reset reopens the file and replays the
/// identical row sequence. Structurally broken records are skipped and
/// counted, never fatal.
pub struct CsvCursor {
    path: PathBuf,
    delimiter: u8,
    quote: u8,
    names: Option<Vec<String>>,
    metadata: SourceMetadata,
    reader: Option<csv::Reader<File>>,
    current: Option<StringRecord>,
    pending: Option<StringRecord>,
    row: Option<usize>,
    observed_columns: usize,
    skipped: usize,
}

impl CsvCursor {
    /// Open with default options (header row, auto-detected delimiter).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, CsvOptions::default())
    }

    /// Open with explicit options.
    pub fn open_with(path: impl AsRef<Path>, options: CsvOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let contents = std::fs::read(&path).map_err(|e| RowcastError::Io {
            path: path.clone(),
            source: e,
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let delimiter = match options.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents)?,
        };
        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        }
        .to_string();

        let metadata = SourceMetadata::new(path.clone(), hash, contents.len() as u64, format);

        let mut cursor = Self {
            path,
            delimiter,
            quote: options.quote,
            names: if options.has_header { Some(Vec::new()) } else { None },
            metadata,
            reader: None,
            current: None,
            pending: None,
            row: None,
            observed_columns: 0,
            skipped: 0,
        };
        cursor.reopen()?;
        Ok(cursor)
    }

    /// Metadata captured when the source was opened.
    pub fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }

    /// The delimiter in use (detected or configured).
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Reopen the file and position before the first data row.
    fn reopen(&mut self) -> Result<()> {
        let file = File::open(&self.path).map_err(|e| RowcastError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        // Headers are handled manually so replay reads the same records.
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .quote(self.quote)
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        if self.names.is_some() {
            let mut header = StringRecord::new();
            if reader.read_record(&mut header)? {
                self.names = Some(header.iter().map(|s| s.trim().to_string()).collect());
            } else {
                return Err(RowcastError::EmptyData(format!(
                    "no header row in '{}'",
                    self.path.display()
                )));
            }
        }

        self.reader = Some(reader);
        self.current = None;
        self.row = None;
        self.skipped = 0;
        self.pending = None;
        self.fetch_next();
        Ok(())
    }

    /// Pull the next well-formed record into the lookahead slot, skipping
    /// and counting broken ones.
    fn fetch_next(&mut self) {
        let Some(reader) = self.reader.as_mut() else {
            self.pending = None;
            return;
        };
        let mut record = StringRecord::new();
        loop {
            match reader.read_record(&mut record) {
                Ok(true) => {
                    self.pending = Some(record);
                    return;
                }
                Ok(false) => {
                    self.pending = None;
                    return;
                }
                Err(_) => {
                    self.skipped += 1;
                }
            }
        }
    }
}

impl RowCursor for CsvCursor {
    fn has_next(&mut self) -> bool {
        self.pending.is_some()
    }

    fn advance(&mut self) -> Result<()> {
        match self.pending.take() {
            Some(record) => {
                self.observed_columns = self.observed_columns.max(record.len());
                self.row = Some(self.row.map_or(0, |r| r + 1));
                self.current = Some(record);
                self.fetch_next();
                Ok(())
            }
            None => Err(RowcastError::Exhausted(self.resource_name())),
        }
    }

    fn row_index(&self) -> Option<usize> {
        self.row
    }

    fn column_count(&self) -> usize {
        self.names
            .as_ref()
            .map_or(0, Vec::len)
            .max(self.observed_columns)
    }

    fn column_names(&self) -> Option<Vec<String>> {
        self.names.clone()
    }

    fn is_missing(&self, column: usize) -> bool {
        cell_is_missing(self.get_string(column))
    }

    fn get_string(&self, column: usize) -> Option<&str> {
        self.current.as_ref().and_then(|r| r.get(column))
    }

    fn reset(&mut self) -> Result<()> {
        if self.reader.is_none() {
            return Err(RowcastError::EmptyData(format!(
                "cursor for '{}' is closed",
                self.path.display()
            )));
        }
        self.reopen()
    }

    fn close(&mut self) -> Result<()> {
        self.reader = None;
        self.current = None;
        self.pending = None;
        Ok(())
    }

    fn resource_name(&self) -> String {
        self.path.display().to_string()
    }

    fn skipped_rows(&self) -> usize {
        self.skipped
    }
}

impl Drop for CsvCursor {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .map_while(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(RowcastError::EmptyData("no lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        // A delimiter that splits every line into the same number of cells
        // wins; tabs get a slight bonus since they rarely occur in data.
        let consistent = counts.iter().all(|&c| c == first_count);
        let score = if consistent {
            first_count * 1000 + usize::from(delim == b'\t') * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_with(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_detect_delimiter_comma() {
        assert_eq!(detect_delimiter(b"a,b,c\n1,2,3\n4,5,6").unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tab() {
        assert_eq!(detect_delimiter(b"a\tb\tc\n1\t2\t3").unwrap(), b'\t');
    }

    #[test]
    fn test_detect_delimiter_respects_quotes() {
        assert_eq!(
            detect_delimiter(b"a;b\n\"x;y;z\";2\n\"q;r\";3").unwrap(),
            b';'
        );
    }

    #[test]
    fn test_iterates_rows_with_header() {
        let file = file_with("name,age\nAlice,30\nBob,25\n");
        let mut cursor = CsvCursor::open(file.path()).unwrap();

        assert_eq!(cursor.column_names(), Some(vec!["name".into(), "age".into()]));
        assert_eq!(cursor.row_index(), None);

        assert!(cursor.has_next());
        cursor.advance().unwrap();
        assert_eq!(cursor.row_index(), Some(0));
        assert_eq!(cursor.get_string(0), Some("Alice"));
        assert_eq!(cursor.get_string(1), Some("30"));

        cursor.advance().unwrap();
        assert_eq!(cursor.get_string(0), Some("Bob"));
        assert!(!cursor.has_next());
        assert!(cursor.advance().is_err());
    }

    #[test]
    fn test_reset_replays_identical_sequence() {
        let file = file_with("a,b\n1,2\n3,4\n");
        let mut cursor = CsvCursor::open(file.path()).unwrap();

        let mut first = Vec::new();
        while cursor.has_next() {
            cursor.advance().unwrap();
            first.push(cursor.get_string(0).unwrap().to_string());
        }

        cursor.reset().unwrap();
        assert_eq!(cursor.row_index(), None);
        let mut second = Vec::new();
        while cursor.has_next() {
            cursor.advance().unwrap();
            second.push(cursor.get_string(0).unwrap().to_string());
        }
        assert_eq!(first, second);
    }

    #[test]
    fn test_ragged_rows_grow_column_count() {
        let file = file_with("a,b\n1,2\n1,2,3,4\n");
        let mut cursor = CsvCursor::open(file.path()).unwrap();
        assert_eq!(cursor.column_count(), 2);
        cursor.advance().unwrap();
        assert_eq!(cursor.column_count(), 2);
        cursor.advance().unwrap();
        assert_eq!(cursor.column_count(), 4);
        // Short row: surplus columns read as missing.
        assert!(!cursor.is_missing(3));
        cursor.reset().unwrap();
        cursor.advance().unwrap();
        assert!(cursor.is_missing(3));
        // Observed width never shrinks.
        assert_eq!(cursor.column_count(), 4);
    }

    #[test]
    fn test_missing_tokens_are_missing() {
        let file = file_with("a,b\nNA,1\n,2\n");
        let mut cursor = CsvCursor::open(file.path()).unwrap();
        cursor.advance().unwrap();
        assert!(cursor.is_missing(0));
        assert!(!cursor.is_missing(1));
        cursor.advance().unwrap();
        assert!(cursor.is_missing(0));
    }

    #[test]
    fn test_headerless_files_have_no_names() {
        let file = file_with("1,2\n3,4\n");
        let mut cursor = CsvCursor::open_with(
            file.path(),
            CsvOptions {
                has_header: false,
                ..CsvOptions::default()
            },
        )
        .unwrap();
        assert_eq!(cursor.column_names(), None);
        cursor.advance().unwrap();
        assert_eq!(cursor.get_string(0), Some("1"));
    }

    #[test]
    fn test_metadata_is_fingerprinted() {
        let file = file_with("a,b\n1,2\n");
        let cursor = CsvCursor::open(file.path()).unwrap();
        assert!(cursor.metadata().hash.starts_with("sha256:"));
        assert_eq!(cursor.metadata().format, "csv");
        assert_eq!(cursor.metadata().size_bytes, 8);
    }

    #[test]
    fn test_closed_cursor_rejects_reset() {
        let file = file_with("a\n1\n");
        let mut cursor = CsvCursor::open(file.path()).unwrap();
        cursor.close().unwrap();
        assert!(cursor.reset().is_err());
    }
}
