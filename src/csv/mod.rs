//! CSV field tokenizing

mod tokenizer;

pub use tokenizer::{Lines, Tokenizer};

pub(crate) use tokenizer::validate_separator;
