//! Event sources and JSON event parsing.
//!
//! Single mode reads a whole source and parses one JSON document. Stream mode
//! walks a source line by line; each non-blank line is an independent JSON
//! document (line-delimited JSON: no commas, no enclosing array).

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::PathBuf;

use serde_json::Value;

use crate::{EmulatorError, Result};

/// Designator that selects standard input instead of a file.
pub const STDIN_DESIGNATOR: &str = "-";

/// Longest line preview shown by stream progress markers.
pub const PREVIEW_CHARS: usize = 65;

/// Where events come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSource {
    Stdin,
    File(PathBuf),
}

impl From<&str> for EventSource {
    fn from(raw: &str) -> Self {
        if raw == STDIN_DESIGNATOR {
            EventSource::Stdin
        } else {
            EventSource::File(PathBuf::from(raw))
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventSource::Stdin => f.write_str("<stdin>"),
            EventSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl EventSource {
    /// Open the source for buffered reading.
    pub fn open(&self) -> Result<Box<dyn BufRead>> {
        match self {
            EventSource::Stdin => Ok(Box::new(BufReader::new(io::stdin()))),
            EventSource::File(path) => File::open(path)
                .map(|file| Box::new(BufReader::new(file)) as Box<dyn BufRead>)
                .map_err(|e| unreadable(self, e)),
        }
    }

    /// Read the whole source into a string.
    pub fn read_to_string(&self) -> Result<String> {
        let mut raw = String::new();
        self.open()?
            .read_to_string(&mut raw)
            .map_err(|e| unreadable(self, e))?;
        Ok(raw)
    }
}

fn unreadable(source: &EventSource, e: io::Error) -> EmulatorError {
    EmulatorError::EventParse(format!("File not found / readable! {}: {}", source, e))
}

/// Parse one JSON event.
pub fn parse_event(raw: &str) -> Result<Value> {
    serde_json::from_str(raw).map_err(|e| EmulatorError::EventParse(e.to_string()))
}

/// Read and parse a single-mode event.
pub fn read_event(source: &EventSource) -> Result<Value> {
    parse_event(&source.read_to_string()?)
}

/// One non-blank line of a stream, numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamLine {
    pub sequence: usize,
    pub raw: String,
}

impl StreamLine {
    pub fn parse(&self) -> Result<Value> {
        parse_event(&self.raw).map_err(|e| match e {
            EmulatorError::EventParse(message) => EmulatorError::EventParse(format!(
                "record {}: {}. Perhaps you are not passing in line-delimited JSON?",
                self.sequence, message
            )),
            other => other,
        })
    }
}

/// Iterator over the non-blank lines of a line-delimited JSON stream.
pub struct StreamLines<R> {
    reader: R,
    sequence: usize,
    buf: String,
}

impl<R: BufRead> StreamLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            sequence: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for StreamLines<R> {
    type Item = Result<StreamLine>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {
                    let line = self.buf.trim_end_matches(['\n', '\r']);
                    if line.trim().is_empty() {
                        continue;
                    }
                    self.sequence += 1;
                    return Some(Ok(StreamLine {
                        sequence: self.sequence,
                        raw: line.to_string(),
                    }));
                }
                Err(e) => {
                    return Some(Err(EmulatorError::EventParse(format!(
                        "failed to read stream after record {}: {}",
                        self.sequence, e
                    ))))
                }
            }
        }
    }
}

/// Progress-marker preview of a raw line: at most 65 characters, with `...`
/// appended when the line was longer.
pub fn preview(line: &str) -> String {
    let line = line.trim_end();
    let mut chars = line.char_indices();
    match chars.nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &line[..cut]),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    #[test]
    fn dash_selects_stdin() {
        assert_eq!(EventSource::from("-"), EventSource::Stdin);
        assert_eq!(
            EventSource::from("event.json"),
            EventSource::File(PathBuf::from("event.json"))
        );
    }

    #[test]
    fn invalid_json_is_an_event_parse_failure() {
        let err = parse_event("{x: }").unwrap_err();
        assert!(matches!(err, EmulatorError::EventParse(_)));
    }

    #[test]
    fn scalars_and_arrays_are_events() {
        assert_eq!(parse_event("3").unwrap(), serde_json::json!(3));
        assert_eq!(parse_event("[1, 2]").unwrap(), serde_json::json!([1, 2]));
    }

    #[test]
    fn missing_file_is_an_event_parse_failure() {
        let source = EventSource::from("/definitely/not/here.json");
        let err = read_event(&source).unwrap_err();
        assert!(err.to_string().contains("File not found / readable!"));
    }

    #[test]
    fn stream_lines_skip_blanks_and_number_records() {
        let input = "{\"a\":1}\n\n   \r\n[2]\r\n3";
        let lines: Vec<_> = StreamLines::new(Cursor::new(input))
            .map(|l| l.unwrap())
            .collect();

        assert_eq!(
            lines,
            vec![
                StreamLine { sequence: 1, raw: "{\"a\":1}".into() },
                StreamLine { sequence: 2, raw: "[2]".into() },
                StreamLine { sequence: 3, raw: "3".into() },
            ]
        );
    }

    #[test]
    fn stream_parse_error_names_the_record() {
        let line = StreamLine { sequence: 4, raw: "{nope".into() };
        let err = line.parse().unwrap_err();
        assert!(err.to_string().contains("record 4"));
    }

    #[test]
    fn preview_truncates_long_lines() {
        let long = "x".repeat(80);
        assert_eq!(preview(&long), format!("{}...", "x".repeat(65)));
        assert_eq!(preview("{\"a\": 1}\n"), "{\"a\": 1}");
        assert_eq!(preview(&"y".repeat(65)), "y".repeat(65));
    }

    proptest! {
        #[test]
        fn preview_never_exceeds_limit(line in "\\PC{0,200}") {
            let shown = preview(&line);
            let body = shown.strip_suffix("...").unwrap_or(&shown);
            prop_assert!(body.chars().count() <= PREVIEW_CHARS);
            prop_assert!(line.trim_end().starts_with(body));
        }
    }
}
