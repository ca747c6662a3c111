//! Character sources consumed by the tokenizer
//!
//! A source is a sequential supplier of characters that signals end of input
//! with `Ok(None)`. The tokenizer owns its source and calls [`CharSource::close`]
//! exactly once, the first time end of input is observed.

use std::io::{self, BufReader, ErrorKind, Read};

/// Sequential, single-owner supplier of characters
pub trait CharSource {
    /// Read the next character, or `Ok(None)` at end of input
    fn read_char(&mut self) -> io::Result<Option<char>>;

    /// Release the underlying resource
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: CharSource + ?Sized> CharSource for Box<S> {
    fn read_char(&mut self) -> io::Result<Option<char>> {
        (**self).read_char()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// UTF-8 decoding source over any [`Read`]
///
/// The reader is buffered internally. Closing drops it, which releases
/// files and sockets; reads after close report end of input.
///
/// # Examples
///
/// ```
/// use fieldstream::source::{CharSource, ReadSource};
///
/// let mut source = ReadSource::new("hé".as_bytes());
/// assert_eq!(source.read_char().unwrap(), Some('h'));
/// assert_eq!(source.read_char().unwrap(), Some('é'));
/// assert_eq!(source.read_char().unwrap(), None);
/// ```
pub struct ReadSource<R: Read> {
    inner: Option<BufReader<R>>,
}

impl<R: Read> ReadSource<R> {
    /// Wrap a reader
    pub fn new(reader: R) -> Self {
        Self {
            inner: Some(BufReader::new(reader)),
        }
    }

    /// Whether the wrapped reader has been released
    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// Return the wrapped reader unless it was already closed
    ///
    /// Bytes buffered but not yet decoded are discarded.
    pub fn into_inner(self) -> Option<R> {
        self.inner.map(BufReader::into_inner)
    }
}

impl<R: Read> CharSource for ReadSource<R> {
    fn read_char(&mut self) -> io::Result<Option<char>> {
        let reader = match self.inner.as_mut() {
            Some(reader) => reader,
            None => return Ok(None),
        };

        let mut bytes = [0u8; 4];
        if !read_byte(reader, &mut bytes[0])? {
            return Ok(None);
        }

        let width = utf8_width(bytes[0])
            .ok_or_else(|| invalid_utf8(format!("invalid leading byte 0x{:02x}", bytes[0])))?;
        if width > 1 {
            reader.read_exact(&mut bytes[1..width]).map_err(|e| {
                if e.kind() == ErrorKind::UnexpectedEof {
                    invalid_utf8("truncated multi-byte sequence".to_string())
                } else {
                    e
                }
            })?;
        }

        let decoded = std::str::from_utf8(&bytes[..width])
            .map_err(|e| invalid_utf8(e.to_string()))?;
        Ok(decoded.chars().next())
    }

    fn close(&mut self) -> io::Result<()> {
        self.inner = None;
        Ok(())
    }
}

/// Read one byte, retrying on interruption. Returns `false` at end of input.
fn read_byte<R: Read>(reader: &mut R, byte: &mut u8) -> io::Result<bool> {
    loop {
        match reader.read(std::slice::from_mut(byte)) {
            Ok(0) => return Ok(false),
            Ok(_) => return Ok(true),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Encoded length of a UTF-8 sequence from its leading byte
fn utf8_width(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

fn invalid_utf8(detail: String) -> io::Error {
    io::Error::new(ErrorKind::InvalidData, format!("Invalid UTF-8 input: {}", detail))
}

/// Source over any character iterator, typically [`str::Chars`]
pub struct IterSource<I> {
    chars: I,
    close_count: usize,
}

impl<I: Iterator<Item = char>> IterSource<I> {
    /// Wrap a character iterator
    pub fn new(chars: I) -> Self {
        Self {
            chars,
            close_count: 0,
        }
    }

    /// Number of times `close` has been called
    pub fn close_count(&self) -> usize {
        self.close_count
    }
}

impl<'a> From<&'a str> for IterSource<std::str::Chars<'a>> {
    fn from(text: &'a str) -> Self {
        Self::new(text.chars())
    }
}

impl<I: Iterator<Item = char>> CharSource for IterSource<I> {
    fn read_char(&mut self) -> io::Result<Option<char>> {
        Ok(self.chars.next())
    }

    fn close(&mut self) -> io::Result<()> {
        self.close_count += 1;
        Ok(())
    }
}
