//! Integration tests for fieldstream

use fieldstream::{CsvError, CsvReader, IterSource, ReaderBuilder, Tokenizer};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn read_all(input: &str) -> Vec<Vec<String>> {
    let mut tokenizer = Tokenizer::new(',', IterSource::from(input)).unwrap();
    tokenizer.lines().collect::<Result<Vec<_>, _>>().unwrap()
}

/// Quote every field, doubling embedded quotes
fn encode(lines: &[Vec<String>]) -> String {
    lines
        .iter()
        .map(|line| {
            line.iter()
                .map(|field| format!("\"{}\"", field.replace('"', "\"\"")))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_embedded_separator() {
    assert_eq!(read_all("a,\",b,b,\",c"), vec![vec!["a", ",b,b,", "c"]]);
}

#[test]
fn test_doubled_quotes() {
    assert_eq!(
        read_all("g,\"\"\"h\"\"h\"\"\",i"),
        vec![vec!["g", "\"h\"h\"", "i"]]
    );
}

#[test]
fn test_read_line_on_empty_stream() {
    let mut tokenizer = Tokenizer::new(',', IterSource::from("")).unwrap();
    assert_eq!(tokenizer.read_line().unwrap(), None);
    assert_eq!(tokenizer.read_line().unwrap(), None);
}

#[test]
fn test_skip_then_field_level_reading() {
    let mut tokenizer = Tokenizer::new(',', IterSource::from("h1,h2\nx,y\nz")).unwrap();
    assert!(tokenizer.skip_line().unwrap());
    assert!(!tokenizer.has_next_for_line());

    assert_eq!(tokenizer.next_field().unwrap(), "x");
    assert!(tokenizer.has_next_for_line());
    assert_eq!(tokenizer.next_field().unwrap(), "y");
    assert!(!tokenizer.has_next_for_line());

    assert!(!tokenizer.skip_line().unwrap());
    assert!(!tokenizer.has_next());
    assert!(matches!(tokenizer.next_field(), Err(CsvError::NoMoreFields)));
}

#[test]
fn test_file_with_multibyte_and_crlf() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all("città;prezzo\r\n\"Zürich; CH\";12€\r\n東京;\r\n".as_bytes())
        .unwrap();
    file.flush().unwrap();

    let mut reader = ReaderBuilder::new()
        .separator(';')
        .has_header(true)
        .from_path(file.path())
        .unwrap();
    let rows = reader.rows().collect::<Result<Vec<_>, _>>().unwrap();

    assert_eq!(
        reader.headers(),
        Some(&["città".to_string(), "prezzo".to_string()][..])
    );
    assert_eq!(rows, vec![vec!["Zürich; CH", "12€"], vec!["東京", ""]]);
    assert!(reader.tokenizer().source().is_closed());
}

#[test]
fn test_invalid_utf8_in_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"a,b\nc,\xff\n").unwrap();
    file.flush().unwrap();

    let mut reader = CsvReader::open(file.path()).unwrap();
    assert_eq!(
        reader.read_row().unwrap(),
        Some(vec!["a".to_string(), "b".to_string()])
    );
    assert!(matches!(reader.read_row(), Err(CsvError::SourceRead(_))));
    assert_eq!(reader.read_row().unwrap(), None);
}

#[test]
fn test_skip_large_file() {
    let mut file = NamedTempFile::new().unwrap();
    for i in 0..10_000 {
        writeln!(file, "{},\"name {}\",{}", i, i, i * 100).unwrap();
    }
    file.flush().unwrap();

    let mut reader = CsvReader::open(file.path()).unwrap();
    assert_eq!(reader.skip_rows(9_998).unwrap(), 9_998);
    assert_eq!(
        reader.read_row().unwrap(),
        Some(vec![
            "9998".to_string(),
            "name 9998".to_string(),
            "999800".to_string()
        ])
    );
    assert_eq!(reader.skip_rows(10).unwrap(), 1);
    assert_eq!(reader.row_count(), 10_000);
}

proptest! {
    #[test]
    fn prop_unquoted_input_matches_plain_split(
        lines in prop::collection::vec(
            prop::collection::vec("[a-z0-9 ;]{0,4}", 1..5),
            0..6,
        ),
        trailing_newline in any::<bool>(),
    ) {
        let mut text = lines
            .iter()
            .map(|line| line.join(","))
            .collect::<Vec<_>>()
            .join("\n");
        if trailing_newline && !lines.is_empty() {
            text.push('\n');
        }

        let expected: Vec<Vec<String>> = if text.is_empty() {
            Vec::new()
        } else {
            text.strip_suffix('\n')
                .unwrap_or(&text)
                .split('\n')
                .map(|line| line.split(',').map(str::to_string).collect())
                .collect()
        };

        prop_assert_eq!(read_all(&text), expected);
    }

    #[test]
    fn prop_quoted_fields_round_trip(
        lines in prop::collection::vec(
            prop::collection::vec("[a-c,\"\n ]{0,6}", 1..4),
            1..4,
        ),
    ) {
        prop_assert_eq!(read_all(&encode(&lines)), lines);
    }

    #[test]
    fn prop_queries_are_idempotent(input in "[ab,\"\n\r]{0,24}") {
        let mut tokenizer = Tokenizer::new(',', IterSource::from(input.as_str())).unwrap();
        loop {
            let has_next = tokenizer.has_next();
            let has_next_for_line = tokenizer.has_next_for_line();
            prop_assert_eq!(tokenizer.has_next(), has_next);
            prop_assert_eq!(tokenizer.has_next_for_line(), has_next_for_line);
            prop_assert!(!has_next_for_line || has_next);
            if !has_next {
                break;
            }
            let field = tokenizer.next_field().unwrap();
            prop_assert!(!field.contains('\r'));
        }
    }
}
