//! Dotted path access into JSON documents.
//!
//! Paths are dot-separated segments; bracketed array indices are normalized to
//! plain segments, so `a[0].b` and `a.0.b` address the same value. Lookups
//! never fail: an absent intermediate segment simply yields "not found".
//!
//! # Assignment never creates keys
//!
//! [`set`] only overwrites a terminal segment that already exists in its parent
//! (an own object field or an in-bounds array index). Expansion and collapse
//! rely on this: they can replace fields of a document but never add new ones.

use serde_json::Value;

/// Presence of a field at a path.
///
/// Distinguishes a field that is missing from one that exists but holds `null`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<'a> {
    Absent,
    Null,
    Present(&'a Value),
}

impl<'a> Field<'a> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    /// The value when present and not `null`.
    pub fn value(&self) -> Option<&'a Value> {
        match self {
            Field::Present(v) => Some(v),
            _ => None,
        }
    }
}

/// Split a path into normalized segments.
///
/// `authors[1].name` becomes `["authors", "1", "name"]`. Empty segments
/// (from `a..b` or a leading dot) are dropped.
pub fn segments(path: &str) -> Vec<&str> {
    path.split(['.', '[', ']'])
        .filter(|s| !s.is_empty())
        .collect()
}

/// Whether `name` contains any path separator characters.
pub fn is_path(name: &str) -> bool {
    name.contains(['.', '[', ']'])
}

/// The final segment of a path that is not an array index.
///
/// Used to address a model by the field it lives under (`inner.book` -> `book`,
/// `shelf.books[2]` -> `books`).
pub fn last_name_segment(path: &str) -> Option<&str> {
    segments(path)
        .into_iter()
        .rev()
        .find(|s| s.parse::<usize>().is_err())
}

fn step<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn step_mut<'a>(value: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(move |i| items.get_mut(i)),
        _ => None,
    }
}

/// Get the value at `path`, or `None` if any segment is absent.
///
/// An empty path addresses the document itself.
pub fn get<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    segments(path)
        .into_iter()
        .try_fold(document, |current, segment| step(current, segment))
}

/// Mutable variant of [`get`].
pub fn get_mut<'a>(document: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    let mut current = document;
    for segment in segments(path) {
        current = step_mut(current, segment)?;
    }
    Some(current)
}

/// Tagged lookup of the field at `path`.
pub fn lookup<'a>(document: &'a Value, path: &str) -> Field<'a> {
    match get(document, path) {
        None => Field::Absent,
        Some(Value::Null) => Field::Null,
        Some(v) => Field::Present(v),
    }
}

/// Overwrite the existing value at `path`.
///
/// Returns `false` without touching the document when the terminal segment does
/// not already exist. Never creates keys or grows arrays.
pub fn set(document: &mut Value, path: &str, value: Value) -> bool {
    match get_mut(document, path) {
        Some(slot) => {
            *slot = value;
            true
        }
        None => false,
    }
}
