//! Header normalization.
//!
//! The transport hands headers over as a flat, alternating name/value
//! sequence. [`normalize`] folds that into a case-insensitive map: names and
//! values are lowercased, and a repeated name collects its values into an
//! ordered list instead of clobbering the earlier one.

use std::collections::HashMap;

use hyper::header::HeaderMap;

/// One normalized header: a single value, or every value a repeated header
/// arrived with, in arrival order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HeaderValue {
    One(String),
    Many(Vec<String>),
}

impl HeaderValue {
    /// The first (or only) value.
    pub fn first(&self) -> &str {
        match self {
            Self::One(v) => v,
            Self::Many(vs) => vs.first().map_or("", String::as_str),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            Self::One(existing) => {
                let first = std::mem::take(existing);
                *self = Self::Many(vec![first, value]);
            }
            Self::Many(vs) => vs.push(value),
        }
    }
}

/// Folds a flat alternating name/value sequence into a normalized map.
///
/// Consumes the sequence two entries at a time. A trailing unpaired name is a
/// caller bug and is dropped rather than panicking.
pub fn normalize<I, S>(raw: I) -> HashMap<String, HeaderValue>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut map = HashMap::new();
    let mut iter = raw.into_iter();
    while let Some(name) = iter.next() {
        let Some(value) = iter.next() else { break };
        let name = name.as_ref().to_ascii_lowercase();
        let value = value.as_ref().to_ascii_lowercase();
        map.entry(name)
            .and_modify(|v: &mut HeaderValue| v.push(value.clone()))
            .or_insert(HeaderValue::One(value));
    }
    map
}

/// Flattens hyper's header multimap into the normalized form.
///
/// `HeaderMap` already keeps repeated values in insertion order, so the fold
/// preserves arrival order the same way the raw-sequence path does. Values
/// that are not valid UTF-8 are skipped.
pub fn from_header_map(headers: &HeaderMap) -> HashMap<String, HeaderValue> {
    normalize(headers.iter().filter_map(|(name, value)| {
        let value = value.to_str().ok()?;
        Some([name.as_str().to_owned(), value.to_owned()])
    }).flatten())
}
