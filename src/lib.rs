//! # fieldstream
//!
//! Streaming, single-pass CSV tokenizer. Characters are pulled one at a time from
//! a [`CharSource`] and turned into field values, with explicit control over line
//! boundaries:
//!
//! - field-at-a-time ([`Tokenizer::next_field`]) or line-at-a-time ([`Tokenizer::read_line`])
//! - allocation-free line skipping ([`Tokenizer::skip_line`])
//! - RFC 4180-style quoting: `""` escapes, quoted separators and quoted newlines
//! - `\r` is dropped, so CRLF and LF input read the same
//! - a stream ending in a bare separator yields one trailing empty field
//!
//! ## Quick Start
//!
//! ```
//! use fieldstream::ReaderBuilder;
//!
//! let mut reader = ReaderBuilder::new()
//!     .from_text("name,quote\nAlice,\"Say \"\"hi\"\"\"\n")
//!     .unwrap();
//!
//! let rows = reader.rows().collect::<Result<Vec<_>, _>>().unwrap();
//! assert_eq!(rows[1], vec!["Alice", "Say \"hi\""]);
//! ```

pub mod config;
pub mod csv;
pub mod csv_reader;
pub mod error;
pub mod source;

pub use config::ReaderBuilder;
pub use csv::{Lines, Tokenizer};
pub use csv_reader::{CsvReader, CsvRowIterator};
pub use error::{CsvError, Result};
pub use source::{CharSource, IterSource, ReadSource};
