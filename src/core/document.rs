/// Script document parser: a small JSON-shaped tree and its recursive-descent reader.
///
/// The reader accepts the subset of JSON that scripts and save files use:
/// the top level must be an object, numbers are kept as their source text,
/// and unknown string escapes pass their character through unchanged.

use rustc_hash::FxHashMap;
use thiserror::Error;

/// Nesting depth beyond which the reader gives up instead of recursing further.
const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected '{{' at offset {offset}")]
    ExpectedObject { offset: usize },
    #[error("expected a quoted key at offset {offset}")]
    ExpectedKey { offset: usize },
    #[error("expected ':' at offset {offset}")]
    ExpectedColon { offset: usize },
    #[error("expected ',' or '{close}' at offset {offset}")]
    ExpectedSeparator { offset: usize, close: char },
    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },
    #[error("invalid number at offset {offset}")]
    InvalidNumber { offset: usize },
    #[error("unexpected value at offset {offset}")]
    UnexpectedValue { offset: usize },
    #[error("document nested too deeply at offset {offset}")]
    TooDeep { offset: usize },
}

/// A parsed document node.
///
/// Objects keep their keys in first-seen order. A repeated key replaces the
/// earlier value but keeps the earlier position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    Object(Vec<(String, Document)>),
    Array(Vec<Document>),
    String(String),
    /// Raw source text of the number, e.g. `-12`, `3.5e2`.
    Number(String),
    Bool(bool),
    Null,
}

impl Document {
    /// Parse a document whose top level is an object.
    ///
    /// Anything after the closing brace of the top-level object is ignored.
    pub fn parse(input: &str) -> Result<Document, ParseError> {
        log::trace!("parsing document of {} bytes", input.len());
        let mut reader = Reader::new(input);
        reader.skip_whitespace();
        if reader.peek() != Some(b'{') {
            return Err(ParseError::ExpectedObject { offset: reader.pos });
        }
        reader.parse_object(0)
    }

    /// The scalar text of this node as a flat key-value view would store it.
    ///
    /// `null` reads as the empty string; containers have no scalar text.
    pub fn scalar_text(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Number(s) => Some(s),
            Self::Bool(true) => Some("true"),
            Self::Bool(false) => Some("false"),
            Self::Null => Some(""),
            Self::Object(_) | Self::Array(_) => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// True if this node is a scalar or a container holding at least one scalar.
    pub fn has_leaves(&self) -> bool {
        match self {
            Self::Object(entries) => entries.iter().any(|(_, v)| v.has_leaves()),
            Self::Array(items) => items.iter().any(Document::has_leaves),
            _ => true,
        }
    }
}

struct Reader<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    fn parse_value(&mut self, depth: usize) -> Result<Document, ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'{') => self.parse_object(depth + 1),
            Some(b'[') => self.parse_array(depth + 1),
            Some(b'"') => self.parse_string().map(Document::String),
            Some(b'-' | b'0'..=b'9') => self.parse_number(),
            _ => self.parse_literal(),
        }
    }

    fn parse_object(&mut self, depth: usize) -> Result<Document, ParseError> {
        if depth > MAX_DEPTH {
            return Err(ParseError::TooDeep { offset: self.pos });
        }
        // Caller has already seen '{'
        self.pos += 1;
        let mut entries: Vec<(String, Document)> = Vec::new();
        let mut index: FxHashMap<String, usize> = FxHashMap::default();

        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(Document::Object(entries));
        }

        loop {
            self.skip_whitespace();
            if self.peek() != Some(b'"') {
                return Err(ParseError::ExpectedKey { offset: self.pos });
            }
            let key = self.parse_string()?;

            self.skip_whitespace();
            if self.peek() != Some(b':') {
                return Err(ParseError::ExpectedColon { offset: self.pos });
            }
            self.pos += 1;

            let value = self.parse_value(depth)?;
            match index.get(&key) {
                Some(&slot) => entries[slot].1 = value,
                None => {
                    index.insert(key.clone(), entries.len());
                    entries.push((key, value));
                }
            }

            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(Document::Object(entries));
                }
                _ => {
                    return Err(ParseError::ExpectedSeparator {
                        offset: self.pos,
                        close: '}',
                    })
                }
            }
        }
    }

    fn parse_array(&mut self, depth: usize) -> Result<Document, ParseError> {
        if depth > MAX_DEPTH {
            return Err(ParseError::TooDeep { offset: self.pos });
        }
        self.pos += 1;
        let mut items = Vec::new();

        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(Document::Array(items));
        }

        loop {
            items.push(self.parse_value(depth)?);

            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    return Ok(Document::Array(items));
                }
                _ => {
                    return Err(ParseError::ExpectedSeparator {
                        offset: self.pos,
                        close: ']',
                    })
                }
            }
        }
    }

    fn parse_string(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        self.pos += 1;
        let mut out = String::new();

        loop {
            let c = self.next_char().ok_or(ParseError::UnterminatedString { offset: start })?;
            match c {
                '"' => return Ok(out),
                '\\' => {
                    let escaped = self
                        .next_char()
                        .ok_or(ParseError::UnterminatedString { offset: start })?;
                    out.push(match escaped {
                        'b' => '\u{0008}',
                        'f' => '\u{000C}',
                        'n' => '\n',
                        'r' => '\r',
                        't' => '\t',
                        // '"', '\\', '/' and anything unrecognised stand for themselves
                        other => other,
                    });
                }
                other => out.push(other),
            }
        }
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.src[self.pos..].chars().next()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn parse_number(&mut self) -> Result<Document, ParseError> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        if !matches!(self.peek(), Some(b'0'..=b'9')) {
            return Err(ParseError::InvalidNumber { offset: start });
        }
        self.skip_digits();

        if self.peek() == Some(b'.') {
            self.pos += 1;
            self.skip_digits();
        }
        if let Some(b'e' | b'E') = self.peek() {
            self.pos += 1;
            if let Some(b'+' | b'-') = self.peek() {
                self.pos += 1;
            }
            self.skip_digits();
        }

        Ok(Document::Number(self.src[start..self.pos].to_string()))
    }

    fn skip_digits(&mut self) {
        while let Some(b'0'..=b'9') = self.peek() {
            self.pos += 1;
        }
    }

    fn parse_literal(&mut self) -> Result<Document, ParseError> {
        let rest = &self.bytes[self.pos..];
        let (doc, len) = if rest.starts_with(b"true") {
            (Document::Bool(true), 4)
        } else if rest.starts_with(b"false") {
            (Document::Bool(false), 5)
        } else if rest.starts_with(b"null") {
            (Document::Null, 4)
        } else {
            return Err(ParseError::UnexpectedValue { offset: self.pos });
        };
        self.pos += len;
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(entries: &[(&str, Document)]) -> Document {
        Document::Object(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn parse_empty_object() {
        assert_eq!(Document::parse("{}").unwrap(), Document::Object(Vec::new()));
        assert_eq!(
            Document::parse(" \t\r\n{ \n }").unwrap(),
            Document::Object(Vec::new())
        );
    }

    #[test]
    fn parse_scalars() {
        let doc = Document::parse(r#"{"s":"hi","n":-12.5e+3,"t":true,"f":false,"z":null}"#)
            .unwrap();
        assert_eq!(
            doc,
            object(&[
                ("s", Document::String("hi".to_string())),
                ("n", Document::Number("-12.5e+3".to_string())),
                ("t", Document::Bool(true)),
                ("f", Document::Bool(false)),
                ("z", Document::Null),
            ])
        );
    }

    #[test]
    fn parse_nested_containers() {
        let doc = Document::parse(r#"{"a":[1,[2,3],{"b":"c"}],"d":{}}"#).unwrap();
        assert_eq!(
            doc,
            object(&[
                (
                    "a",
                    Document::Array(vec![
                        Document::Number("1".to_string()),
                        Document::Array(vec![
                            Document::Number("2".to_string()),
                            Document::Number("3".to_string()),
                        ]),
                        object(&[("b", Document::String("c".to_string()))]),
                    ])
                ),
                ("d", Document::Object(Vec::new())),
            ])
        );
    }

    #[test]
    fn string_escapes() {
        let doc = Document::parse(r#"{"k":"a\"b\\c\/d\be\ff\ng\rh\ti\qj"}"#).unwrap();
        assert_eq!(
            doc,
            object(&[(
                "k",
                Document::String("a\"b\\c/d\u{8}e\u{c}f\ng\rh\tiqj".to_string())
            )])
        );
    }

    #[test]
    fn unicode_text_passes_through() {
        let doc = Document::parse(r#"{"speaker":"さくら","text":"¡Hola!"}"#).unwrap();
        assert_eq!(
            doc,
            object(&[
                ("speaker", Document::String("さくら".to_string())),
                ("text", Document::String("¡Hola!".to_string())),
            ])
        );
    }

    #[test]
    fn duplicate_key_last_write_wins_in_first_position() {
        let doc = Document::parse(r#"{"a":1,"b":2,"a":3}"#).unwrap();
        assert_eq!(
            doc,
            object(&[
                ("a", Document::Number("3".to_string())),
                ("b", Document::Number("2".to_string())),
            ])
        );
    }

    #[test]
    fn number_forms_kept_as_text() {
        let doc = Document::parse(r#"{"a":0,"b":1.,"c":2e,"d":12}"#).unwrap();
        assert_eq!(
            doc,
            object(&[
                ("a", Document::Number("0".to_string())),
                ("b", Document::Number("1.".to_string())),
                ("c", Document::Number("2e".to_string())),
                ("d", Document::Number("12".to_string())),
            ])
        );
    }

    #[test]
    fn trailing_content_ignored() {
        assert!(Document::parse(r#"{"a":1} trailing"#).is_ok());
    }

    #[test]
    fn reject_non_object_top_level() {
        assert_eq!(
            Document::parse("[1,2]"),
            Err(ParseError::ExpectedObject { offset: 0 })
        );
        assert_eq!(
            Document::parse("  42"),
            Err(ParseError::ExpectedObject { offset: 2 })
        );
        assert_eq!(Document::parse(""), Err(ParseError::ExpectedObject { offset: 0 }));
    }

    #[test]
    fn reject_trailing_commas() {
        assert!(matches!(
            Document::parse(r#"{"a":1,}"#),
            Err(ParseError::ExpectedKey { .. })
        ));
        assert!(matches!(
            Document::parse(r#"{"a":1, }"#),
            Err(ParseError::ExpectedKey { .. })
        ));
        assert!(matches!(
            Document::parse(r#"{"a":[1,]}"#),
            Err(ParseError::UnexpectedValue { .. })
        ));
    }

    #[test]
    fn reject_malformed_documents() {
        assert!(matches!(
            Document::parse(r#"{a:1}"#),
            Err(ParseError::ExpectedKey { offset: 1 })
        ));
        assert!(matches!(
            Document::parse(r#"{"a" 1}"#),
            Err(ParseError::ExpectedColon { offset: 5 })
        ));
        assert!(matches!(
            Document::parse(r#"{"a":1 "b":2}"#),
            Err(ParseError::ExpectedSeparator { close: '}', .. })
        ));
        assert!(matches!(
            Document::parse(r#"{"a":[1 2]}"#),
            Err(ParseError::ExpectedSeparator { close: ']', .. })
        ));
        assert!(matches!(
            Document::parse(r#"{"a":"open}"#),
            Err(ParseError::UnterminatedString { offset: 5 })
        ));
        assert!(matches!(
            Document::parse(r#"{"a":"x\"#),
            Err(ParseError::UnterminatedString { .. })
        ));
        assert!(matches!(
            Document::parse(r#"{"a":-x}"#),
            Err(ParseError::InvalidNumber { offset: 5 })
        ));
        assert!(matches!(
            Document::parse(r#"{"a":nope}"#),
            Err(ParseError::UnexpectedValue { offset: 5 })
        ));
        assert!(matches!(
            Document::parse(r#"{"a":1"#),
            Err(ParseError::ExpectedSeparator { .. })
        ));
    }

    #[test]
    fn reject_excessive_nesting() {
        let deep = format!("{{\"a\":{}1{}}}", "[".repeat(400), "]".repeat(400));
        assert!(matches!(
            Document::parse(&deep),
            Err(ParseError::TooDeep { .. })
        ));
    }

    #[test]
    fn scalar_text_and_leaves() {
        assert_eq!(Document::Null.scalar_text(), Some(""));
        assert_eq!(Document::Bool(true).scalar_text(), Some("true"));
        assert_eq!(Document::Array(Vec::new()).scalar_text(), None);
        assert!(Document::Null.has_leaves());
        assert!(!Document::Array(vec![Document::Object(Vec::new())]).has_leaves());
        assert!(Document::Array(vec![Document::Null]).has_leaves());
    }
}
