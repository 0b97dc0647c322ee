//! Character-incremental boundary scanner
//!
//! [`BoundaryParser`] consumes a JSON document one character at a time and
//! emits a [`QuizRecord`] the instant the closing delimiter of an element
//! matching the extraction path is consumed. All lexical state (nesting
//! stack, string/escape flags, partial keys, the captured span) survives
//! across `feed` calls, so chunk boundaries may fall anywhere.
//!
//! Leniency: scalars *outside* the extraction path are only shape-checked
//! (delimiters and character classes), not fully validated — the contract is
//! exact boundary detection for captured elements, which `serde_json`
//! re-validates in full. Escape sequences inside object keys are kept
//! literal rather than decoded; extraction path keys are compared against
//! that literal form (keys in practice are plain identifiers).

use super::path::{ExtractionPath, ValueSegment};
use super::ParseError;
use crate::types::QuizRecord;

/// What kind of container a stack frame tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerKind {
    Object,
    Array,
}

/// One level of object/array nesting
#[derive(Debug)]
struct Frame {
    kind: ContainerKind,
    /// Key of the value currently being read (objects only)
    pending_key: Option<String>,
    /// Completed child values so far; doubles as the next array index
    children: usize,
}

/// What the scanner expects next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lex {
    /// Start of a value
    Value,
    /// Object key or `}`
    Key,
    /// The `:` between a key and its value
    Colon,
    /// `,` or a container close
    Delim,
    /// Inside a string literal
    StringBody,
    /// Inside a number or `true`/`false`/`null`
    Scalar,
}

/// What kind of value a capture is buffering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureKind {
    Container,
    String,
    Scalar,
}

/// The raw text of an element matching the extraction path, in flight
#[derive(Debug)]
struct Capture {
    kind: CaptureKind,
    /// Stack depth the captured value lives at
    depth: usize,
    /// Byte offset where the capture began, for error reporting
    start_pos: usize,
    buf: String,
}

/// Incremental parser emitting records at configured path boundaries
#[derive(Debug)]
pub struct BoundaryParser {
    path: ExtractionPath,
    lex: Lex,
    stack: Vec<Frame>,
    /// Whether the string being lexed is an object key
    string_is_key: bool,
    escape: bool,
    key_buf: String,
    capture: Option<Capture>,
    /// Bytes consumed across all feeds
    pos: usize,
    /// Top-level value fully consumed
    document_complete: bool,
    poisoned: bool,
}

impl BoundaryParser {
    /// Create a parser emitting elements at `path`
    pub fn new(path: ExtractionPath) -> Self {
        Self {
            path,
            lex: Lex::Value,
            stack: Vec::new(),
            string_is_key: false,
            escape: false,
            key_buf: String::new(),
            capture: None,
            pos: 0,
            document_complete: false,
            poisoned: false,
        }
    }

    /// Feed the next chunk of the stream
    ///
    /// Returns every record whose closing delimiter was consumed within this
    /// chunk, in stream order. An error poisons the parser: the session is
    /// unrecoverable, but records returned by earlier feeds remain valid.
    pub fn feed(&mut self, chunk: &str) -> Result<Vec<QuizRecord>, ParseError> {
        if self.poisoned {
            return Err(ParseError::Poisoned);
        }

        let mut out = Vec::new();
        for c in chunk.chars() {
            match self.consume(c) {
                Ok(Some(record)) => out.push(record),
                Ok(None) => {}
                Err(e) => {
                    self.poisoned = true;
                    return Err(e);
                }
            }
            self.pos += c.len_utf8();
        }
        Ok(out)
    }

    /// Total bytes consumed so far
    pub fn bytes_consumed(&self) -> usize {
        self.pos
    }

    /// Whether the top-level value has been fully consumed
    pub fn is_document_complete(&self) -> bool {
        self.document_complete
    }

    /// Whether a previous feed failed
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    fn consume(&mut self, c: char) -> Result<Option<QuizRecord>, ParseError> {
        let mut emitted = None;

        // A scalar has no closing delimiter of its own; it ends at the first
        // structural character or whitespace, which must then be processed
        // normally (and must not land in the capture buffer).
        if self.lex == Lex::Scalar && is_scalar_terminator(c) {
            emitted = self.finish_value_if_captured(CaptureKind::Scalar)?;
            self.value_completed();
            self.lex = Lex::Delim;
        }

        if let Some(capture) = self.capture.as_mut() {
            capture.buf.push(c);
        }

        match self.lex {
            Lex::Value => {
                if c.is_ascii_whitespace() {
                    return Ok(emitted);
                }
                match c {
                    '{' => {
                        self.maybe_start_capture(c, CaptureKind::Container);
                        self.stack.push(Frame {
                            kind: ContainerKind::Object,
                            pending_key: None,
                            children: 0,
                        });
                        self.lex = Lex::Key;
                    }
                    '[' => {
                        self.maybe_start_capture(c, CaptureKind::Container);
                        self.stack.push(Frame {
                            kind: ContainerKind::Array,
                            pending_key: None,
                            children: 0,
                        });
                        self.lex = Lex::Value;
                    }
                    '"' => {
                        self.maybe_start_capture(c, CaptureKind::String);
                        self.string_is_key = false;
                        self.lex = Lex::StringBody;
                    }
                    ']' => match self.stack.last() {
                        // Empty array; after a comma this would be a
                        // trailing comma, caught by children > 0.
                        Some(frame)
                            if frame.kind == ContainerKind::Array && frame.children == 0 =>
                        {
                            let closed = self.close_container()?;
                            debug_assert!(emitted.is_none() || closed.is_none());
                            emitted = emitted.or(closed);
                        }
                        _ => return Err(self.unexpected(c)),
                    },
                    _ if c == '-' || c.is_ascii_digit() || matches!(c, 't' | 'f' | 'n') => {
                        self.maybe_start_capture(c, CaptureKind::Scalar);
                        self.lex = Lex::Scalar;
                    }
                    _ => return Err(self.unexpected(c)),
                }
            }
            Lex::Key => {
                if c.is_ascii_whitespace() {
                    return Ok(emitted);
                }
                match c {
                    '"' => {
                        self.key_buf.clear();
                        self.string_is_key = true;
                        self.lex = Lex::StringBody;
                    }
                    '}' => match self.stack.last() {
                        Some(frame)
                            if frame.kind == ContainerKind::Object && frame.children == 0 =>
                        {
                            let closed = self.close_container()?;
                            debug_assert!(emitted.is_none() || closed.is_none());
                            emitted = emitted.or(closed);
                        }
                        _ => return Err(self.unexpected(c)),
                    },
                    _ => return Err(self.unexpected(c)),
                }
            }
            Lex::Colon => {
                if c.is_ascii_whitespace() {
                    return Ok(emitted);
                }
                if c == ':' {
                    self.lex = Lex::Value;
                } else {
                    return Err(self.unexpected(c));
                }
            }
            Lex::StringBody => {
                if self.escape {
                    self.escape = false;
                    if self.string_is_key {
                        // Keys keep uncommon escapes literal; see module docs.
                        match c {
                            '"' | '\\' | '/' => self.key_buf.push(c),
                            _ => {
                                self.key_buf.push('\\');
                                self.key_buf.push(c);
                            }
                        }
                    }
                } else if c == '\\' {
                    self.escape = true;
                } else if c == '"' {
                    if self.string_is_key {
                        let key = std::mem::take(&mut self.key_buf);
                        if let Some(frame) = self.stack.last_mut() {
                            frame.pending_key = Some(key);
                        }
                        self.string_is_key = false;
                        self.lex = Lex::Colon;
                    } else {
                        let closed = self.finish_value_if_captured(CaptureKind::String)?;
                        debug_assert!(emitted.is_none() || closed.is_none());
                        emitted = emitted.or(closed);
                        self.value_completed();
                        self.lex = Lex::Delim;
                    }
                } else if self.string_is_key {
                    self.key_buf.push(c);
                }
            }
            Lex::Scalar => {
                // Terminators were handled above; anything else must look
                // like part of a number or keyword.
                if !(c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
                    return Err(self.unexpected(c));
                }
            }
            Lex::Delim => {
                if c.is_ascii_whitespace() {
                    return Ok(emitted);
                }
                let Some(frame) = self.stack.last() else {
                    return Err(ParseError::TrailingData { pos: self.pos });
                };
                match (c, frame.kind) {
                    (',', ContainerKind::Object) => self.lex = Lex::Key,
                    (',', ContainerKind::Array) => self.lex = Lex::Value,
                    ('}', ContainerKind::Object) | (']', ContainerKind::Array) => {
                        let closed = self.close_container()?;
                        debug_assert!(emitted.is_none() || closed.is_none());
                        emitted = emitted.or(closed);
                    }
                    _ => return Err(self.unexpected(c)),
                }
            }
        }

        Ok(emitted)
    }

    /// Begin capturing if the value starting with `c` sits at the path
    fn maybe_start_capture(&mut self, c: char, kind: CaptureKind) {
        if self.capture.is_some() || self.stack.len() != self.path.len() {
            return;
        }

        let location: Vec<ValueSegment<'_>> = self
            .stack
            .iter()
            .map(|frame| match frame.kind {
                ContainerKind::Object => {
                    ValueSegment::Key(frame.pending_key.as_deref().unwrap_or(""))
                }
                ContainerKind::Array => ValueSegment::Index(frame.children),
            })
            .collect();

        if self.path.matches(&location) {
            let mut buf = String::new();
            buf.push(c);
            self.capture = Some(Capture {
                kind,
                depth: self.stack.len(),
                start_pos: self.pos,
                buf,
            });
        }
    }

    /// Pop the current container and finish its capture if it was captured
    fn close_container(&mut self) -> Result<Option<QuizRecord>, ParseError> {
        self.stack.pop();
        let emitted = self.finish_value_if_captured(CaptureKind::Container)?;
        self.value_completed();
        self.lex = Lex::Delim;
        Ok(emitted)
    }

    /// Emit the capture if the value that just ended is the captured one
    fn finish_value_if_captured(
        &mut self,
        kind: CaptureKind,
    ) -> Result<Option<QuizRecord>, ParseError> {
        let finished = matches!(
            self.capture,
            Some(ref capture) if capture.kind == kind && capture.depth == self.stack.len()
        );
        if !finished {
            return Ok(None);
        }

        let capture = self.capture.take().expect("capture checked above");
        let record = serde_json::from_str::<QuizRecord>(&capture.buf).map_err(|source| {
            ParseError::InvalidRecord {
                pos: capture.start_pos,
                source,
            }
        })?;
        Ok(Some(record))
    }

    /// Bookkeeping after any value (scalar, string, or container) completes
    fn value_completed(&mut self) {
        if let Some(frame) = self.stack.last_mut() {
            frame.children += 1;
            frame.pending_key = None;
        } else {
            self.document_complete = true;
        }
    }

    fn unexpected(&self, c: char) -> ParseError {
        ParseError::Unexpected {
            pos: self.pos,
            found: c,
        }
    }
}

fn is_scalar_terminator(c: char) -> bool {
    matches!(c, ',' | '}' | ']') || c.is_ascii_whitespace()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parser(path: &str) -> BoundaryParser {
        BoundaryParser::new(ExtractionPath::parse(path).unwrap())
    }

    fn sample_record(id: &str) -> QuizRecord {
        QuizRecord {
            id: id.to_string(),
            question: format!("Question {}?", id),
            options: vec!["first".to_string(), "second".to_string()],
            answer: "second".to_string(),
        }
    }

    fn sample_payload(ids: &[&str]) -> String {
        let records: Vec<QuizRecord> = ids.iter().map(|id| sample_record(id)).collect();
        serde_json::json!({ "quizzes": records }).to_string()
    }

    #[test]
    fn test_single_chunk_emits_in_order() {
        let mut p = parser("quizzes.*");
        let records = p.feed(&sample_payload(&["1", "2", "3"])).unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        assert!(p.is_document_complete());
    }

    #[test]
    fn test_per_char_feed_matches_single_chunk() {
        let payload = sample_payload(&["1", "2", "3"]);

        let mut whole = parser("quizzes.*");
        let expected = whole.feed(&payload).unwrap();

        let mut incremental = parser("quizzes.*");
        let mut got = Vec::new();
        for c in payload.chars() {
            got.extend(incremental.feed(&c.to_string()).unwrap());
        }
        assert_eq!(got, expected);
        assert_eq!(incremental.bytes_consumed(), payload.len());
    }

    #[test]
    fn test_record_emitted_exactly_at_closing_brace() {
        let payload = sample_payload(&["1"]);
        // The first record's closing brace is the one right before the ']'.
        let close = payload.rfind("}]").unwrap();

        let mut p = parser("quizzes.*");
        assert!(p.feed(&payload[..close]).unwrap().is_empty());
        let records = p.feed("}").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "1");
    }

    #[test]
    fn test_truncated_stream_emits_nothing() {
        let mut p = parser("quizzes.*");
        let records = p.feed(r#"{"quizzes":[{"id":"1""#).unwrap();
        assert!(records.is_empty());
        assert!(!p.is_document_complete());
    }

    #[test]
    fn test_chunk_boundary_inside_escape() {
        let payload = r#"{"quizzes":[{"id":"1","question":"say \"hi\\\" now","options":["a"],"answer":"a"}]}"#;
        for split in 0..payload.len() {
            if !payload.is_char_boundary(split) {
                continue;
            }
            let mut p = parser("quizzes.*");
            let mut records = p.feed(&payload[..split]).unwrap();
            records.extend(p.feed(&payload[split..]).unwrap());
            assert_eq!(records.len(), 1, "split at {}", split);
            assert_eq!(records[0].question, "say \"hi\\\" now");
        }
    }

    #[test]
    fn test_braces_inside_strings_do_not_close_records() {
        let payload =
            r#"{"quizzes":[{"id":"1","question":"a } b ] c","options":["{","]"],"answer":"{"}]}"#;
        let mut p = parser("quizzes.*");
        let records = p.feed(payload).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].question, "a } b ] c");
    }

    #[test]
    fn test_nested_structures_and_unknown_fields() {
        let payload = concat!(
            r#"{"version":2,"quizzes":["#,
            r#"{"id":"1","question":"q","options":["a"],"answer":"a","#,
            r#""meta":{"tags":["x","}"],"depth":{"inner":[1,2,3]}}}"#,
            r#"],"trailer":null}"#
        );
        let mut p = parser("quizzes.*");
        let records = p.feed(payload).unwrap();
        assert_eq!(records.len(), 1);
        assert!(p.is_document_complete());
    }

    #[test]
    fn test_whitespace_rich_document() {
        let payload = "  {\n  \"quizzes\" : [\n    { \"id\" : \"1\" , \"question\" : \"q\" ,\n      \"options\" : [ \"a\" , \"b\" ] , \"answer\" : \"b\" }\n  ]\n}\n";
        let mut p = parser("quizzes.*");
        let records = p.feed(payload).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].options.len(), 2);
        assert!(p.is_document_complete());
    }

    #[test]
    fn test_empty_array_emits_nothing() {
        let mut p = parser("quizzes.*");
        let records = p.feed(r#"{"quizzes":[]}"#).unwrap();
        assert!(records.is_empty());
        assert!(p.is_document_complete());
    }

    #[test]
    fn test_top_level_array_with_root_wildcard() {
        let records: Vec<QuizRecord> = vec![sample_record("a"), sample_record("b")];
        let payload = serde_json::to_string(&records).unwrap();
        let mut p = parser("*");
        let got = p.feed(&payload).unwrap();
        assert_eq!(got, records);
    }

    #[test]
    fn test_deep_extraction_path() {
        let payload = r#"{"data":{"quizzes":[{"id":"1","question":"q","options":["a"],"answer":"a"}]}}"#;
        let mut p = parser("data.quizzes.*");
        let records = p.feed(payload).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_trailing_comma_is_an_error() {
        let mut p = parser("quizzes.*");
        let payload = sample_payload(&["1"]);
        // Splice a trailing comma before the array close.
        let bad = payload.replace("}]", "},]");
        let err = p.feed(&bad).unwrap_err();
        assert!(matches!(err, ParseError::Unexpected { .. }));
        assert!(p.is_poisoned());
        assert!(matches!(p.feed("x").unwrap_err(), ParseError::Poisoned));
    }

    #[test]
    fn test_error_preserves_earlier_records() {
        let mut p = parser("quizzes.*");
        let good = r#"{"quizzes":[{"id":"1","question":"q","options":["a"],"answer":"a"},"#;
        let records = p.feed(good).unwrap();
        assert_eq!(records.len(), 1);
        assert!(p.feed("%").is_err());
    }

    #[test]
    fn test_trailing_data_after_document() {
        let mut p = parser("quizzes.*");
        p.feed(r#"{"quizzes":[]}  "#).unwrap();
        let err = p.feed("{").unwrap_err();
        assert!(matches!(err, ParseError::TrailingData { .. }));
    }

    #[test]
    fn test_element_with_wrong_shape_is_invalid_record() {
        let mut p = parser("quizzes.*");
        let err = p.feed(r#"{"quizzes":[{"id":"1"}]}"#).unwrap_err();
        assert!(matches!(err, ParseError::InvalidRecord { .. }));
    }

    #[test]
    fn test_null_element_is_invalid_record() {
        let mut p = parser("quizzes.*");
        let err = p.feed(r#"{"quizzes":[null]}"#).unwrap_err();
        assert!(matches!(err, ParseError::InvalidRecord { .. }));
    }

    #[test]
    fn test_unicode_content() {
        let payload = r#"{"quizzes":[{"id":"1","question":"什么是平稳性？","options":["均值不变"],"answer":"均值不变"}]}"#;

        let mut whole = parser("quizzes.*");
        let expected = whole.feed(payload).unwrap();
        assert_eq!(expected[0].question, "什么是平稳性？");

        let mut incremental = parser("quizzes.*");
        let mut got = Vec::new();
        for c in payload.chars() {
            got.extend(incremental.feed(&c.to_string()).unwrap());
        }
        assert_eq!(got, expected);
    }

    proptest! {
        /// Splitting the stream at arbitrary points never changes what is
        /// emitted or in which order.
        #[test]
        fn prop_chunking_is_transparent(
            ids in prop::collection::vec("[a-z0-9]{1,8}", 0..8),
            splits in prop::collection::vec(any::<prop::sample::Index>(), 0..12),
        ) {
            // Duplicate ids are fine here; the parser emits them all and
            // deduplication is the driver's job.
            let payload = sample_payload(&ids.iter().map(String::as_str).collect::<Vec<_>>());

            let mut whole = parser("quizzes.*");
            let expected = whole.feed(&payload).unwrap();

            let mut cuts: Vec<usize> = splits
                .iter()
                .map(|idx| idx.index(payload.len() + 1))
                .filter(|&i| payload.is_char_boundary(i))
                .collect();
            cuts.push(0);
            cuts.push(payload.len());
            cuts.sort_unstable();
            cuts.dedup();

            let mut incremental = parser("quizzes.*");
            let mut got = Vec::new();
            for pair in cuts.windows(2) {
                got.extend(incremental.feed(&payload[pair[0]..pair[1]]).unwrap());
            }

            prop_assert_eq!(got, expected);
            prop_assert!(incremental.is_document_complete());
        }
    }
}
