//! Span-aware JSON scanner.
//!
//! `serde_json` discards source positions, so locating a value's bytes inside
//! the manifest needs a parser of our own. The scanner only tracks structure
//! and spans; string contents are handed to `serde_json` for decoding so
//! escape handling stays identical to a real JSON parser.

use crate::error::PatchError;

/// Nesting limit; deeper input is rejected rather than risking the stack.
const MAX_DEPTH: usize = 256;

/// Half-open byte range `[start, end)` into the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Borrow the spanned text.
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

/// A JSON value with the span it occupies in the source text.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Object { span: Span, members: Vec<Member> },
    Array { span: Span, items: Vec<Node> },
    /// `span` covers the quotes; `value` is the decoded content.
    String { span: Span, value: String },
    /// Numbers, `true`, `false` and `null`.
    Scalar { span: Span },
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::Object { span, .. }
            | Node::Array { span, .. }
            | Node::String { span, .. }
            | Node::Scalar { span } => *span,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn members(&self) -> Option<&[Member]> {
        match self {
            Node::Object { members, .. } => Some(members),
            _ => None,
        }
    }
}

/// An object member. Duplicate keys are kept, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub key: String,
    pub key_span: Span,
    pub value: Node,
}

/// Parse `text` as a single JSON value, ignoring a leading byte-order mark.
pub fn scan(text: &str) -> Result<Node, PatchError> {
    let mut scanner = Scanner {
        text,
        bytes: text.as_bytes(),
        pos: 0,
        depth: 0,
    };

    if text.starts_with('\u{feff}') {
        scanner.pos = '\u{feff}'.len_utf8();
    }

    scanner.skip_whitespace();
    let root = scanner.value()?;
    scanner.skip_whitespace();

    if scanner.pos != scanner.bytes.len() {
        return Err(scanner.error("unexpected trailing content"));
    }

    Ok(root)
}

struct Scanner<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
}

impl Scanner<'_> {
    fn error(&self, reason: &str) -> PatchError {
        PatchError::InvalidManifest {
            offset: self.pos,
            reason: reason.to_string(),
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

    fn expect(&mut self, byte: u8, reason: &str) -> Result<(), PatchError> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(reason))
        }
    }

    fn value(&mut self) -> Result<Node, PatchError> {
        match self.peek() {
            Some(b'{') => self.object(),
            Some(b'[') => self.array(),
            Some(b'"') => {
                let (span, value) = self.string()?;
                Ok(Node::String { span, value })
            }
            Some(b'-' | b'0'..=b'9') => self.number(),
            Some(b't') => self.literal("true"),
            Some(b'f') => self.literal("false"),
            Some(b'n') => self.literal("null"),
            Some(_) => Err(self.error("expected a JSON value")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn enter(&mut self) -> Result<(), PatchError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        Ok(())
    }

    fn object(&mut self) -> Result<Node, PatchError> {
        self.enter()?;
        let start = self.pos;
        self.pos += 1;
        let mut members = Vec::new();

        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.pos += 1;
        } else {
            loop {
                self.skip_whitespace();
                if self.peek() != Some(b'"') {
                    return Err(self.error("expected a string key"));
                }
                let (key_span, key) = self.string()?;
                self.skip_whitespace();
                self.expect(b':', "expected ':' after object key")?;
                self.skip_whitespace();
                let value = self.value()?;
                members.push(Member {
                    key,
                    key_span,
                    value,
                });

                self.skip_whitespace();
                match self.peek() {
                    Some(b',') => self.pos += 1,
                    Some(b'}') => {
                        self.pos += 1;
                        break;
                    }
                    _ => return Err(self.error("expected ',' or '}' in object")),
                }
            }
        }

        self.depth -= 1;
        Ok(Node::Object {
            span: Span::new(start, self.pos),
            members,
        })
    }

    fn array(&mut self) -> Result<Node, PatchError> {
        self.enter()?;
        let start = self.pos;
        self.pos += 1;
        let mut items = Vec::new();

        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.pos += 1;
        } else {
            loop {
                self.skip_whitespace();
                items.push(self.value()?);
                self.skip_whitespace();
                match self.peek() {
                    Some(b',') => self.pos += 1,
                    Some(b']') => {
                        self.pos += 1;
                        break;
                    }
                    _ => return Err(self.error("expected ',' or ']' in array")),
                }
            }
        }

        self.depth -= 1;
        Ok(Node::Array {
            span: Span::new(start, self.pos),
            items,
        })
    }

    /// Scan a string literal starting at the opening quote.
    ///
    /// Only ASCII bytes are inspected, so every offset we stop at is a char
    /// boundary even when the literal holds multi-byte UTF-8.
    fn string(&mut self) -> Result<(Span, String), PatchError> {
        let start = self.pos;
        self.pos += 1;

        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string")),
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't') => {
                            self.pos += 1;
                        }
                        Some(b'u') => {
                            self.pos += 1;
                            for _ in 0..4 {
                                match self.peek() {
                                    Some(b) if b.is_ascii_hexdigit() => self.pos += 1,
                                    _ => return Err(self.error("invalid unicode escape")),
                                }
                            }
                        }
                        _ => return Err(self.error("invalid escape sequence")),
                    }
                }
                Some(b) if b < 0x20 => {
                    return Err(self.error("control character in string"));
                }
                Some(_) => self.pos += 1,
            }
        }

        let span = Span::new(start, self.pos);
        let value: String = serde_json::from_str(span.slice(self.text)).map_err(|e| {
            PatchError::InvalidManifest {
                offset: start,
                reason: format!("invalid string literal: {}", e),
            }
        })?;

        Ok((span, value))
    }

    fn digits(&mut self) -> usize {
        let begin = self.pos;
        while let Some(b'0'..=b'9') = self.peek() {
            self.pos += 1;
        }
        self.pos - begin
    }

    fn number(&mut self) -> Result<Node, PatchError> {
        let start = self.pos;

        if self.peek() == Some(b'-') {
            self.pos += 1;
        }

        match self.peek() {
            Some(b'0') => self.pos += 1,
            Some(b'1'..=b'9') => {
                self.digits();
            }
            _ => return Err(self.error("invalid number")),
        }

        if self.peek() == Some(b'.') {
            self.pos += 1;
            if self.digits() == 0 {
                return Err(self.error("expected digits after decimal point"));
            }
        }

        if let Some(b'e' | b'E') = self.peek() {
            self.pos += 1;
            if let Some(b'+' | b'-') = self.peek() {
                self.pos += 1;
            }
            if self.digits() == 0 {
                return Err(self.error("expected digits in exponent"));
            }
        }

        Ok(Node::Scalar {
            span: Span::new(start, self.pos),
        })
    }

    fn literal(&mut self, word: &str) -> Result<Node, PatchError> {
        let start = self.pos;
        if self.bytes[self.pos..].starts_with(word.as_bytes()) {
            self.pos += word.len();
            Ok(Node::Scalar {
                span: Span::new(start, self.pos),
            })
        } else {
            Err(self.error("invalid literal"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_records_value_spans() {
        let text = r#"{"name": "demo", "version": "1.0.0"}"#;
        let root = scan(text).unwrap();
        let members = root.members().unwrap();

        assert_eq!(members.len(), 2);
        assert_eq!(members[1].key, "version");
        assert_eq!(members[1].key_span.slice(text), r#""version""#);
        assert_eq!(members[1].value.span().slice(text), r#""1.0.0""#);
        assert_eq!(members[1].value.as_str(), Some("1.0.0"));
    }

    #[test]
    fn test_scan_keeps_duplicate_keys_in_order() {
        let text = r#"{"a": "1", "a": "2"}"#;
        let root = scan(text).unwrap();
        let values: Vec<_> = root
            .members()
            .unwrap()
            .iter()
            .map(|m| m.value.as_str().unwrap())
            .collect();
        assert_eq!(values, vec!["1", "2"]);
    }

    #[test]
    fn test_scan_decodes_escapes() {
        let text = r#"{"k": "a\"bA\\"}"#;
        let root = scan(text).unwrap();
        assert_eq!(root.members().unwrap()[0].value.as_str(), Some("a\"bA\\"));
    }

    #[test]
    fn test_scan_multibyte_strings() {
        let text = "{\"描述\": \"ünïcödé\", \"v\": \"1\"}";
        let root = scan(text).unwrap();
        let members = root.members().unwrap();
        assert_eq!(members[0].key, "描述");
        assert_eq!(members[1].value.span().slice(text), "\"1\"");
    }

    #[test]
    fn test_scan_nested_and_scalars() {
        let text = "{\n  \"a\": [1, -2.5e3, true, false, null, {}],\n  \"b\": {\"c\": []}\n}\n";
        let root = scan(text).unwrap();
        let members = root.members().unwrap();
        match &members[0].value {
            Node::Array { items, .. } => assert_eq!(items.len(), 6),
            other => panic!("expected array, got {:?}", other),
        }
        assert!(members[1].value.members().is_some());
    }

    #[test]
    fn test_scan_skips_byte_order_mark() {
        let text = "\u{feff}{\"a\": \"1\"}";
        let root = scan(text).unwrap();
        assert_eq!(root.members().unwrap()[0].value.span().slice(text), "\"1\"");
    }

    #[test]
    fn test_scan_rejects_malformed_input() {
        for bad in [
            "",
            "{",
            r#"{"a" "b"}"#,
            r#"{"a": "b",}"#,
            r#"{"a": "unterminated}"#,
            r#"{"a": "\x"}"#,
            r#"{"a": 01}"#,
            r#"{"a": tru}"#,
            r#"{"a": "b"} extra"#,
            "{\"a\": \"line\nbreak\"}",
        ] {
            let err = scan(bad).unwrap_err();
            assert!(
                matches!(err, PatchError::InvalidManifest { .. }),
                "expected InvalidManifest for {:?}, got {:?}",
                bad,
                err
            );
        }
    }

    #[test]
    fn test_scan_reports_offset() {
        let err = scan(r#"{"a": ?}"#).unwrap_err();
        assert_eq!(
            err,
            PatchError::InvalidManifest {
                offset: 6,
                reason: "expected a JSON value".to_string(),
            }
        );
    }

    #[test]
    fn test_scan_rejects_excessive_nesting() {
        let text = "[".repeat(MAX_DEPTH + 1) + &"]".repeat(MAX_DEPTH + 1);
        assert!(scan(&text).is_err());
    }
}
