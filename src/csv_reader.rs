//! Row-oriented CSV reading on top of the field tokenizer

use crate::config::ReaderBuilder;
use crate::csv::Tokenizer;
use crate::error::Result;
use crate::source::{CharSource, ReadSource};
use std::fs::File;
use std::path::Path;
use tracing::trace;

/// Pulls whole rows out of a [`Tokenizer`]
///
/// Only the row being returned is held in memory. With `has_header(true)` the
/// first line is taken as the header the first time a row is read or skipped,
/// so [`headers`](Self::headers) stays `None` until then.
///
/// ```
/// use fieldstream::ReaderBuilder;
///
/// let mut reader = ReaderBuilder::new()
///     .separator(';')
///     .has_header(true)
///     .from_text("id;name\n1;Alice\n2;Bob\n")
///     .unwrap();
///
/// assert_eq!(reader.headers(), None);
/// assert_eq!(reader.skip_rows(1).unwrap(), 1);
/// assert_eq!(reader.headers(), Some(&["id".to_string(), "name".to_string()][..]));
///
/// let row = reader.read_row().unwrap();
/// assert_eq!(row, Some(vec!["2".to_string(), "Bob".to_string()]));
/// assert_eq!(reader.row_count(), 2);
/// ```
pub struct CsvReader<S: CharSource> {
    tokenizer: Tokenizer<S>,
    has_header: bool,
    header_read: bool,
    headers: Option<Vec<String>>,
    row_count: u64,
}

impl CsvReader<ReadSource<File>> {
    /// Open a CSV file with the default configuration (`,` separator, no header)
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        ReaderBuilder::new().from_path(path)
    }
}

impl<S: CharSource> CsvReader<S> {
    pub(crate) fn new(tokenizer: Tokenizer<S>, has_header: bool) -> Self {
        Self {
            tokenizer,
            has_header,
            header_read: false,
            headers: None,
            row_count: 0,
        }
    }

    /// The header row, once the first read or skip has consumed it
    pub fn headers(&self) -> Option<&[String]> {
        self.headers.as_deref()
    }

    /// Read a single data row
    ///
    /// Returns `Ok(None)` when the input is exhausted.
    pub fn read_row(&mut self) -> Result<Option<Vec<String>>> {
        self.read_header_once()?;

        let row = self.tokenizer.read_line()?;
        if row.is_some() {
            self.row_count += 1;
        }
        Ok(row)
    }

    /// Skip up to `count` data rows without building their field values
    ///
    /// Returns the number of rows actually skipped. A final row without a
    /// trailing newline counts as skipped.
    pub fn skip_rows(&mut self, count: u64) -> Result<u64> {
        self.read_header_once()?;

        let mut skipped = 0;
        while skipped < count && self.tokenizer.has_next() {
            self.tokenizer.skip_line()?;
            skipped += 1;
            self.row_count += 1;
        }
        trace!(requested = count, skipped, "skipped rows");
        Ok(skipped)
    }

    /// Get iterator over rows
    pub fn rows(&mut self) -> CsvRowIterator<'_, S> {
        CsvRowIterator { reader: self }
    }

    /// Number of data rows read or skipped so far
    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    /// Borrow the underlying tokenizer
    pub fn tokenizer(&self) -> &Tokenizer<S> {
        &self.tokenizer
    }

    /// Unwrap into the underlying tokenizer for field-level access
    pub fn into_tokenizer(self) -> Tokenizer<S> {
        self.tokenizer
    }

    fn read_header_once(&mut self) -> Result<()> {
        if self.has_header && !self.header_read {
            self.header_read = true;
            self.headers = self.tokenizer.read_line()?;
        }
        Ok(())
    }
}

/// Iterator over CSV rows
pub struct CsvRowIterator<'a, S: CharSource> {
    reader: &'a mut CsvReader<S>,
}

impl<'a, S: CharSource> Iterator for CsvRowIterator<'a, S> {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_row().transpose()
    }
}
