//! Per-tier header storage.
//!
//! # Responsibilities
//! - Store one scalar or an ordered list of values per header name
//! - Render and parse `Name: value\r\n` header blocks
//!
//! # Design Decisions
//! - Names are normalized to ASCII lowercase on every operation
//! - Insertion order of names is preserved (small vec, linear lookup)
//! - A list keeps its list-ness even with a single element; the merge
//!   algorithm depends on the distinction

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value stored for one header name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    /// Value assigned with `set`.
    Single(String),
    /// Values accumulated with `add`, in order.
    List(Vec<String>),
}

impl HeaderValue {
    /// True for values accumulated with `add`.
    pub fn is_list(&self) -> bool {
        matches!(self, HeaderValue::List(_))
    }

    /// Values as a slice-like list; a scalar yields one element.
    pub fn values(&self) -> Vec<&str> {
        match self {
            HeaderValue::Single(v) => vec![v.as_str()],
            HeaderValue::List(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    /// Comma-joined rendering used by `HeaderCollection::get`.
    pub fn joined(&self) -> String {
        match self {
            HeaderValue::Single(v) => v.clone(),
            HeaderValue::List(vs) => vs.join(","),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            HeaderValue::Single(v) => v.is_empty(),
            HeaderValue::List(vs) => vs.is_empty(),
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        HeaderValue::Single(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        HeaderValue::Single(value)
    }
}

impl From<Vec<String>> for HeaderValue {
    fn from(values: Vec<String>) -> Self {
        HeaderValue::List(values)
    }
}

/// HTTP header collection for one tier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderCollection {
    entries: Vec<(String, HeaderValue)>,
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

impl HeaderCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        let name = normalize(name);
        self.entries.iter().position(|(n, _)| *n == name)
    }

    /// Set a header, overwriting any previous value with a single value.
    pub fn set(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.insert_value(name, HeaderValue::Single(value.into()));
    }

    /// Add a header value.
    ///
    /// A list-typed value is appended to. A scalar is promoted to a
    /// one-element list first, so a second `add` after `set` yields a list.
    pub fn add(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        let value = value.into();
        match self.position(name.as_ref()) {
            Some(idx) => {
                let slot = &mut self.entries[idx].1;
                match slot {
                    HeaderValue::List(values) => values.push(value),
                    HeaderValue::Single(prev) => {
                        let prev = std::mem::take(prev);
                        *slot = HeaderValue::List(vec![prev, value]);
                    }
                }
            }
            None => self
                .entries
                .push((normalize(name.as_ref()), HeaderValue::List(vec![value]))),
        }
    }

    /// Store a raw value (scalar or list) under `name`, replacing any previous one.
    pub fn insert_value(&mut self, name: impl AsRef<str>, value: HeaderValue) {
        match self.position(name.as_ref()) {
            Some(idx) => self.entries[idx].1 = value,
            None => self.entries.push((normalize(name.as_ref()), value)),
        }
    }

    /// Header value, comma-joined for lists. `None` if absent or empty.
    pub fn get(&self, name: &str) -> Option<String> {
        self.get_value(name)
            .filter(|v| !v.is_empty())
            .map(HeaderValue::joined)
    }

    /// Raw stored value.
    pub fn get_value(&self, name: &str) -> Option<&HeaderValue> {
        self.position(name).map(|idx| &self.entries[idx].1)
    }

    /// Check if a header exists.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Remove a header, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<HeaderValue> {
        self.position(name).map(|idx| self.entries.remove(idx).1)
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over (name, value) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Copy another collection into this one, the way a new tier is seeded:
    /// list values are added element by element, scalars are set.
    pub fn extend_from(&mut self, other: &HeaderCollection) {
        for (name, value) in other.iter() {
            match value {
                HeaderValue::Single(v) => self.set(name, v.clone()),
                HeaderValue::List(vs) => {
                    for v in vs {
                        self.add(name, v.clone());
                    }
                }
            }
        }
    }

    /// Render as an HTTP header block, one line per list element.
    pub fn to_header_block(&self) -> String {
        let mut block = String::new();
        for (name, value) in self.iter() {
            for v in value.values() {
                block.push_str(name);
                block.push_str(": ");
                block.push_str(v);
                block.push_str(crate::CRLF);
            }
        }
        block
    }

    /// Add every `Name: value` line of a header block.
    pub fn parse_header_block(&mut self, block: &str) {
        for line in block.split(crate::CRLF) {
            if let Some((name, value)) = line.split_once(':') {
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                self.add(name, value.trim());
            }
        }
    }

    /// Build a collection from a header block.
    pub fn from_header_block(block: &str) -> Self {
        let mut headers = Self::new();
        headers.parse_header_block(block);
        headers
    }
}

impl fmt::Display for HeaderCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_header_block())
    }
}

impl<N, V> FromIterator<(N, V)> for HeaderCollection
where
    N: AsRef<str>,
    V: Into<HeaderValue>,
{
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert_value(name, value.into());
        }
        headers
    }
}

impl Serialize for HeaderCollection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for HeaderCollection {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = std::collections::BTreeMap::<String, HeaderValue>::deserialize(deserializer)?;
        Ok(map.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_accumulates() {
        let mut headers = HeaderCollection::new();
        headers.add("X-Thing", "A");
        headers.add("X-Thing", "B");
        assert_eq!(headers.get("X-Thing").as_deref(), Some("A,B"));
        assert!(headers.get_value("x-thing").unwrap().is_list());
    }

    #[test]
    fn test_set_overwrites() {
        let mut headers = HeaderCollection::new();
        headers.add("X-Thing", "A");
        headers.set("X-Thing", "B");
        assert_eq!(headers.get("X-Thing").as_deref(), Some("B"));
        assert_eq!(headers.get_value("x-thing"), Some(&HeaderValue::from("B")));
    }

    #[test]
    fn test_add_after_set_promotes() {
        let mut headers = HeaderCollection::new();
        headers.set("Accept", "text/html");
        headers.add("Accept", "text/plain");
        assert_eq!(
            headers.get_value("accept"),
            Some(&HeaderValue::List(vec!["text/html".into(), "text/plain".into()]))
        );
    }

    #[test]
    fn test_get_absent_or_empty() {
        let mut headers = HeaderCollection::new();
        assert_eq!(headers.get("missing"), None);
        headers.set("empty", "");
        assert_eq!(headers.get("empty"), None);
        headers.insert_value("none", HeaderValue::List(Vec::new()));
        assert_eq!(headers.get("none"), None);
    }

    #[test]
    fn test_case_insensitive_names() {
        let mut headers = HeaderCollection::new();
        headers.set("Content-Type", "text/html");
        assert_eq!(headers.get("content-type").as_deref(), Some("text/html"));
        assert_eq!(headers.get("CONTENT-TYPE").as_deref(), Some("text/html"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_comma_values_lose_boundaries() {
        let mut headers = HeaderCollection::new();
        headers.add("x", "a,b");
        headers.add("x", "c");
        assert_eq!(headers.get("x").as_deref(), Some("a,b,c"));
    }

    #[test]
    fn test_header_block() {
        let mut headers = HeaderCollection::new();
        headers.add("foo", "you");
        headers.add("bar", "baz");
        headers.add("bar", "qux");
        let block = headers.to_header_block();
        assert_eq!(block, "foo: you\r\nbar: baz\r\nbar: qux\r\n");
    }

    #[test]
    fn test_parse_reproduces_pairs() {
        let mut headers = HeaderCollection::new();
        headers.add("set-cookie", "a=1");
        headers.add("set-cookie", "b=2");
        headers.add("x-single", "value");

        let parsed = HeaderCollection::from_header_block(&headers.to_header_block());
        assert_eq!(parsed, headers);
    }

    #[test]
    fn test_parse_skips_junk_lines() {
        let parsed = HeaderCollection::from_header_block("Host:  example.com \r\n\r\nnocolon\r\n: v\r\n");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.get("host").as_deref(), Some("example.com"));
    }

    #[test]
    fn test_extend_from_keeps_shape() {
        let mut source = HeaderCollection::new();
        source.set("a", "1");
        source.add("b", "2");
        source.add("b", "3");

        let mut target = HeaderCollection::new();
        target.add("b", "0");
        target.extend_from(&source);

        assert_eq!(target.get_value("a"), Some(&HeaderValue::from("1")));
        assert_eq!(target.get("b").as_deref(), Some("0,2,3"));
    }

    #[test]
    fn test_serde_shape() {
        let mut headers = HeaderCollection::new();
        headers.set("a", "1");
        headers.add("b", "2");
        let json = serde_json::to_string(&headers).unwrap();
        assert_eq!(json, r#"{"a":"1","b":["2"]}"#);

        let decoded: HeaderCollection = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, headers);
    }
}
