/// Dotted-path queries over a parsed `Document`.
///
/// Paths use the same shape a flattened key-value view would produce:
/// `nodes[2].choices[0].text`, `variables.gold`, `history[3]`. The empty
/// path addresses the root object.

use std::collections::BTreeMap;

use crate::core::document::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'p> {
    Key(&'p str),
    Index(usize),
}

/// Split a path into segments. Returns `None` for paths no document could
/// produce, such as a non-numeric index or text directly after `]`.
fn segments(path: &str) -> Option<Vec<Segment<'_>>> {
    let mut out = Vec::new();
    if path.is_empty() {
        return Some(out);
    }

    let mut rest = path;
    let mut first = true;
    loop {
        let end = rest.find(['.', '[']).unwrap_or(rest.len());
        // A leading `[` addresses the root directly; anywhere else the key may be empty
        if !(first && end == 0 && rest.starts_with('[')) {
            out.push(Segment::Key(&rest[..end]));
        }
        first = false;
        rest = &rest[end..];

        while let Some(inner) = rest.strip_prefix('[') {
            let close = inner.find(']')?;
            let token = &inner[..close];
            if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            out.push(Segment::Index(token.parse().ok()?));
            rest = &inner[close + 1..];
        }

        if rest.is_empty() {
            return Some(out);
        }
        rest = rest.strip_prefix('.')?;
    }
}

/// Sign-aware decimal scan of the leading digits of `text`.
///
/// Accepts an optional `+` or `-`, then reads digits up to the first
/// non-digit: `"12abc"` is 12, `"abc"` is 0, `"-7.9"` is -7. Overflow wraps.
pub fn parse_int_prefix(text: &str) -> i32 {
    let bytes = text.as_bytes();
    let (sign, digits) = match bytes.first() {
        Some(b'-') => (-1i32, &bytes[1..]),
        Some(b'+') => (1, &bytes[1..]),
        _ => (1, bytes),
    };

    let mut value: i32 = 0;
    for b in digits.iter().take_while(|b| b.is_ascii_digit()) {
        value = value.wrapping_mul(10).wrapping_add(i32::from(b - b'0'));
    }
    sign.wrapping_mul(value)
}

impl Document {
    /// Look up the node at `path`, if any.
    pub fn get(&self, path: &str) -> Option<&Document> {
        let mut node = self;
        for segment in segments(path)? {
            node = match (segment, node) {
                (Segment::Key(key), Document::Object(entries)) => {
                    &entries.iter().find(|(k, _)| k == key)?.1
                }
                (Segment::Index(i), Document::Array(items)) => items.get(i)?,
                _ => return None,
            };
        }
        Some(node)
    }

    /// The scalar text at `path`, or the empty string when there is none.
    /// `null` also reads as the empty string.
    pub fn get_string(&self, path: &str) -> &str {
        self.get(path)
            .and_then(Document::scalar_text)
            .unwrap_or("")
    }

    /// The integer prefix of the scalar text at `path`; 0 when absent.
    pub fn get_int(&self, path: &str) -> i32 {
        parse_int_prefix(self.get_string(path))
    }

    /// True iff the scalar text at `path` is exactly `true`.
    pub fn get_bool(&self, path: &str) -> bool {
        self.get_string(path) == "true"
    }

    /// Number of elements of the array at `path`.
    ///
    /// Trailing elements that hold no scalar at all (`[]`, `{}`) are not
    /// counted, so the result is one past the last element carrying data.
    pub fn get_array_size(&self, path: &str) -> usize {
        match self.get(path) {
            Some(Document::Array(items)) => items
                .iter()
                .rposition(Document::has_leaves)
                .map_or(0, |last| last + 1),
            _ => 0,
        }
    }

    /// Names of the direct children of the object at `path`, in first-seen
    /// order. Children that hold no scalar at all are skipped.
    pub fn get_object_keys(&self, path: &str) -> Vec<&str> {
        match self.get(path) {
            Some(Document::Object(entries)) => entries
                .iter()
                .filter(|(_, v)| v.has_leaves())
                .map(|(k, _)| k.as_str())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Flatten the document into a path → scalar-text mapping.
    pub fn flatten(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        flatten_into(self, String::new(), &mut out);
        out
    }
}

fn flatten_into(node: &Document, path: String, out: &mut BTreeMap<String, String>) {
    match node {
        Document::Object(entries) => {
            for (key, value) in entries {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                flatten_into(value, child, out);
            }
        }
        Document::Array(items) => {
            for (i, value) in items.iter().enumerate() {
                flatten_into(value, format!("{path}[{i}]"), out);
            }
        }
        scalar => {
            let text = scalar.scalar_text().unwrap_or_default();
            out.insert(path, text.to_string());
        }
    }
}
