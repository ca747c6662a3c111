//! Streaming field tokenizer with RFC 4180-like quoting
//!
//! The tokenizer pulls one character at a time from a [`CharSource`] and keeps a
//! single character of lookahead. Each field is accumulated into a reusable buffer
//! and handed out as an owned `String`. Carriage returns are dropped on ingestion,
//! so CRLF input behaves exactly like LF input.
//!
//! Quoting rules:
//! - a field starting with `"` is quoted; separators and newlines inside it are content
//! - `""` inside a quoted region is one literal `"`
//! - characters after the closing quote are kept as part of the same field
//! - a quoted region still open at end of input ends with the input (no error)

use crate::error::{CsvError, Result};
use crate::source::CharSource;
use tracing::{debug, trace, warn};

const QUOTE: char = '"';
const NEWLINE: char = '\n';
const CARRIAGE_RETURN: char = '\r';

/// Classification of the lookahead character before a field is consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    Regular,
    Quote,
    Separator,
    EndOfLine,
    EndOfInput,
}

/// Pull-based cursor over the fields of a CSV character stream
///
/// Fields are grouped implicitly into lines: [`has_next_for_line`](Self::has_next_for_line)
/// reports whether the field just produced was followed by another field on the same line.
///
/// # Examples
///
/// ```
/// use fieldstream::csv::Tokenizer;
/// use fieldstream::source::IterSource;
///
/// let mut tokenizer = Tokenizer::new(',', IterSource::from("a,\"b,c\"\nd")).unwrap();
///
/// assert_eq!(tokenizer.read_line().unwrap(), Some(vec!["a".to_string(), "b,c".to_string()]));
/// assert_eq!(tokenizer.next_field().unwrap(), "d");
/// assert!(!tokenizer.has_next());
/// ```
pub struct Tokenizer<S: CharSource> {
    separator: char,
    source: S,
    // Set once the source has been closed or has failed; it is never read again.
    source_done: bool,
    buffer: String,
    lookahead: Option<char>,
    state: ReadState,
    at_line_start: bool,
    // The last field ended on a separator directly followed by end of input.
    pending_trailing_field: bool,
    poisoned: bool,
}

impl<S: CharSource> Tokenizer<S> {
    /// Create a tokenizer and read the first character of `source`
    ///
    /// Fails with [`CsvError::InvalidConfiguration`] if `separator` is `\n`, `\r` or `"`.
    pub fn new(separator: char, source: S) -> Result<Self> {
        validate_separator(separator)?;

        let mut tokenizer = Self {
            separator,
            source,
            source_done: false,
            buffer: String::with_capacity(64),
            lookahead: None,
            state: ReadState::EndOfInput,
            at_line_start: true,
            pending_trailing_field: false,
            poisoned: false,
        };
        tokenizer.start_field()?;
        Ok(tokenizer)
    }

    /// The separator this tokenizer splits fields on
    pub fn separator(&self) -> char {
        self.separator
    }

    /// Borrow the underlying source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Give the source back to the caller
    ///
    /// If end of input has not been reached yet the source was never closed,
    /// and releasing it is up to the caller.
    pub fn into_source(self) -> S {
        self.source
    }

    /// Whether another field is available
    pub fn has_next(&self) -> bool {
        !self.poisoned && (self.state != ReadState::EndOfInput || self.pending_trailing_field)
    }

    /// Whether another field is available on the current line
    ///
    /// False at the start of the stream and right after a field that ended a line.
    pub fn has_next_for_line(&self) -> bool {
        self.has_next() && !self.at_line_start
    }

    /// Consume and return the next field
    pub fn next_field(&mut self) -> Result<String> {
        if self.poisoned {
            return Err(CsvError::Poisoned);
        }
        if !self.has_next() {
            return Err(CsvError::NoMoreFields);
        }

        self.at_line_start = false;
        let boundary = match self.state {
            // nothing before the boundary: empty field
            ReadState::EndOfInput | ReadState::Separator | ReadState::EndOfLine => self.lookahead,
            ReadState::Quote => {
                let after_quote = self.read_quoted()?;
                self.read_regular(after_quote)?
            }
            ReadState::Regular => self.read_regular(self.lookahead)?,
        };

        let value = self.buffer.clone();
        self.end_field(boundary)?;
        Ok(value)
    }

    /// Discard the rest of the current line without building field values
    ///
    /// Quotes carry no meaning while skipping. Returns `true` if a newline was
    /// found (the cursor is then at the start of the next line) and `false` if
    /// end of input came first, leaving the tokenizer exhausted.
    pub fn skip_line(&mut self) -> Result<bool> {
        if self.poisoned {
            return Err(CsvError::Poisoned);
        }

        let mut current = self.lookahead;
        while let Some(ch) = current {
            if ch == NEWLINE {
                self.at_line_start = true;
                self.pending_trailing_field = false;
                self.start_field()?;
                trace!("skipped line");
                return Ok(true);
            }
            current = self.read_raw()?;
        }

        self.mark_exhausted();
        trace!("skip_line reached end of input");
        Ok(false)
    }

    /// Read all remaining fields of the current line
    ///
    /// Returns `Ok(None)` once no fields are left.
    pub fn read_line(&mut self) -> Result<Option<Vec<String>>> {
        if !self.has_next() {
            return Ok(None);
        }

        let mut fields = Vec::new();
        loop {
            fields.push(self.next_field()?);
            if !self.has_next_for_line() {
                break;
            }
        }
        Ok(Some(fields))
    }

    /// Iterator over the remaining lines
    pub fn lines(&mut self) -> Lines<'_, S> {
        Lines { tokenizer: self }
    }

    /// Accumulate the inside of a quoted region; the opening quote is the lookahead.
    ///
    /// Returns the character after the closing quote, or `None` if input ended
    /// inside the quotes.
    fn read_quoted(&mut self) -> Result<Option<char>> {
        loop {
            match self.read_raw()? {
                None => return Ok(None),
                Some(QUOTE) => match self.read_raw()? {
                    Some(QUOTE) => self.buffer.push(QUOTE),
                    after => return Ok(after),
                },
                Some(ch) => self.buffer.push(ch),
            }
        }
    }

    /// Accumulate unquoted characters starting at `current` until a boundary.
    ///
    /// Returns the boundary: the separator, a newline, or `None` for end of input.
    fn read_regular(&mut self, mut current: Option<char>) -> Result<Option<char>> {
        while let Some(ch) = current {
            match self.classify(Some(ch)) {
                ReadState::Separator | ReadState::EndOfLine => break,
                _ => {
                    self.buffer.push(ch);
                    current = self.read_raw()?;
                }
            }
        }
        Ok(current)
    }

    fn end_field(&mut self, boundary: Option<char>) -> Result<()> {
        match boundary {
            None => self.mark_exhausted(),
            Some(ch) => {
                if ch == NEWLINE {
                    self.at_line_start = true;
                }
                self.start_field()?;
                self.pending_trailing_field =
                    ch == self.separator && self.state == ReadState::EndOfInput;
            }
        }
        Ok(())
    }

    fn start_field(&mut self) -> Result<()> {
        self.buffer.clear();
        self.lookahead = self.read_raw()?;
        self.state = self.classify(self.lookahead);
        Ok(())
    }

    fn mark_exhausted(&mut self) {
        self.buffer.clear();
        self.lookahead = None;
        self.state = ReadState::EndOfInput;
        self.pending_trailing_field = false;
    }

    fn classify(&self, ch: Option<char>) -> ReadState {
        match ch {
            None => ReadState::EndOfInput,
            Some(NEWLINE) => ReadState::EndOfLine,
            Some(QUOTE) => ReadState::Quote,
            Some(c) if c == self.separator => ReadState::Separator,
            Some(_) => ReadState::Regular,
        }
    }

    /// Next raw character with `\r` removed. Closes the source on first end of input.
    fn read_raw(&mut self) -> Result<Option<char>> {
        let read = loop {
            if self.source_done {
                return Ok(None);
            }
            match self.source.read_char() {
                Ok(Some(CARRIAGE_RETURN)) => continue,
                other => break other,
            }
        };

        match read {
            Ok(Some(ch)) => Ok(Some(ch)),
            Ok(None) => {
                self.close_source()?;
                Ok(None)
            }
            Err(e) => Err(self.poison(e)),
        }
    }

    fn close_source(&mut self) -> Result<()> {
        self.source_done = true;
        debug!(separator = ?self.separator, "end of input reached, closing character source");
        self.source.close().map_err(|e| self.poison(e))
    }

    /// Stop using the source after a failure. It stays owned (and unclosed) so
    /// `into_source` can still hand it back.
    fn poison(&mut self, error: std::io::Error) -> CsvError {
        warn!(%error, "character source failed, tokenizer is no longer usable");
        self.source_done = true;
        self.poisoned = true;
        self.mark_exhausted();
        CsvError::SourceRead(error)
    }
}

impl<S: CharSource> Iterator for Tokenizer<S> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_next() {
            Some(self.next_field())
        } else {
            None
        }
    }
}

/// Iterator over the lines of a [`Tokenizer`]
pub struct Lines<'a, S: CharSource> {
    tokenizer: &'a mut Tokenizer<S>,
}

impl<'a, S: CharSource> Iterator for Lines<'a, S> {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.tokenizer.read_line().transpose()
    }
}

/// Reject separators that collide with newline, carriage return or quote handling
pub(crate) fn validate_separator(separator: char) -> Result<()> {
    match separator {
        NEWLINE | CARRIAGE_RETURN | QUOTE => Err(CsvError::InvalidConfiguration(format!(
            "separator cannot be '\\n', '\\r' or '\"', got {:?}",
            separator
        ))),
        _ => Ok(()),
    }
}
