//! Streaming sample sources.
//!
//! Input is one JSON object per line: `{"x": {"name": 1.0, ...}, "y": <label>}`.
//! Lines are decoded one at a time and nothing is buffered beyond the
//! current line.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::marker::PhantomData;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::common::error::{EvalError, EvalResult};

use super::domain::Sample;

/// Iterator over the samples of a JSON-lines reader.
pub struct JsonLines<L, R> {
    reader: R,
    line: String,
    line_no: u64,
    done: bool,
    _label: PhantomData<fn() -> L>,
}

impl<L, R> JsonLines<L, R> {
    /// Number of lines consumed so far, including blank ones.
    pub fn line_no(&self) -> u64 {
        self.line_no
    }
}

impl<L: DeserializeOwned, R: BufRead> Iterator for JsonLines<L, R> {
    type Item = EvalResult<Sample<L>>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.line.clear();
            let read = match self.reader.read_line(&mut self.line) {
                Ok(read) => read,
                Err(err) => {
                    self.done = true;
                    return Some(Err(EvalError::Io(err)));
                }
            };
            if read == 0 {
                self.done = true;
                break;
            }
            self.line_no += 1;

            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }
            return Some(
                serde_json::from_str(trimmed)
                    .map_err(|err| EvalError::malformed(self.line_no, err.to_string())),
            );
        }
        None
    }
}

/// Decode samples lazily from a buffered reader.
pub fn read_jsonl<L, R>(reader: R) -> JsonLines<L, R>
where
    L: DeserializeOwned,
    R: BufRead,
{
    JsonLines {
        reader,
        line: String::new(),
        line_no: 0,
        done: false,
        _label: PhantomData,
    }
}

/// Open a JSON-lines file for streaming.
pub fn open_jsonl<L: DeserializeOwned>(
    path: impl AsRef<Path>,
) -> EvalResult<JsonLines<L, BufReader<File>>> {
    let file = File::open(path.as_ref())?;
    tracing::debug!(path = %path.as_ref().display(), "opened sample source");
    Ok(read_jsonl(BufReader::new(file)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn decodes_lines_and_skips_blanks() {
        let input = "{\"x\":{\"a\":1.0},\"y\":\"x\"}\n\n{\"x\":{\"a\":2.0,\"b\":0.5},\"y\":\"y\"}\n";
        let samples: Vec<Sample<String>> = read_jsonl(Cursor::new(input))
            .collect::<EvalResult<_>>()
            .unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].y, "x");
        assert_eq!(samples[1].x["b"], 0.5);
    }

    #[test]
    fn label_type_mismatch_is_malformed() {
        let input = "{\"x\":{\"a\":1.0},\"y\":2.5}\n{\"x\":{\"a\":1.0},\"y\":\"high\"}\n";
        let mut stream = read_jsonl::<f64, _>(Cursor::new(input));
        assert_eq!(stream.next().unwrap().unwrap().y, 2.5);
        match stream.next().unwrap() {
            Err(EvalError::MalformedSample { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected item: {other:?}"),
        }
    }

    #[test]
    fn empty_input_yields_nothing() {
        let mut stream = read_jsonl::<String, _>(Cursor::new(""));
        assert!(stream.next().is_none());
        assert_eq!(stream.line_no(), 0);
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = open_jsonl::<String>("/definitely/not/here.jsonl");
        assert!(matches!(result, Err(EvalError::Io(_))));
    }
}
