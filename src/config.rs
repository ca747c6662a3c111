//! Reader configuration

use crate::csv::{validate_separator, Tokenizer};
use crate::csv_reader::CsvReader;
use crate::error::Result;
use crate::source::{CharSource, IterSource, ReadSource};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::Chars;
use tracing::trace;

/// Builder for tokenizers and row readers
///
/// The separator is validated before any source is opened or read.
///
/// # Examples
///
/// ```
/// use fieldstream::{IterSource, ReaderBuilder};
///
/// let mut tokenizer = ReaderBuilder::new()
///     .separator('\t')
///     .tokenizer(IterSource::from("a\tb"))
///     .unwrap();
///
/// assert_eq!(tokenizer.next_field().unwrap(), "a");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderBuilder {
    separator: char,
    has_header: bool,
}

impl Default for ReaderBuilder {
    fn default() -> Self {
        Self {
            separator: ',',
            has_header: false,
        }
    }
}

impl ReaderBuilder {
    /// Create a builder with `,` as separator and no header row
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the field separator (builder pattern)
    ///
    /// `\n`, `\r` and `"` are rejected when the reader is built.
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Indicate that the first row contains headers (builder pattern)
    pub fn has_header(mut self, has: bool) -> Self {
        self.has_header = has;
        self
    }

    /// Build a bare tokenizer over `source`
    pub fn tokenizer<S: CharSource>(&self, source: S) -> Result<Tokenizer<S>> {
        trace!(separator = ?self.separator, "building tokenizer");
        Tokenizer::new(self.separator, source)
    }

    /// Build a row reader over `source`
    pub fn reader<S: CharSource>(&self, source: S) -> Result<CsvReader<S>> {
        Ok(CsvReader::new(self.tokenizer(source)?, self.has_header))
    }

    /// Build a row reader decoding UTF-8 from `reader`
    pub fn from_reader<R: Read>(&self, reader: R) -> Result<CsvReader<ReadSource<R>>> {
        self.reader(ReadSource::new(reader))
    }

    /// Open a file and build a row reader over it
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<CsvReader<ReadSource<File>>> {
        validate_separator(self.separator)?;
        let file = File::open(path.as_ref())?;
        self.reader(ReadSource::new(file))
    }

    /// Build a row reader over in-memory text
    pub fn from_text<'a>(&self, text: &'a str) -> Result<CsvReader<IterSource<Chars<'a>>>> {
        self.reader(IterSource::from(text))
    }
}
