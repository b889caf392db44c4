// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! RETURN clause projection.
//!
//! Path expressions are evaluated against the snapshot of accumulated
//! results and written into a nested output document keyed by the path's
//! dot-separated segments.
//!
//! # Path syntax
//!
//! - `$` - the snapshot root (prepended as `$.` when absent)
//! - `.key` - object member; on an array, the member of every element that has it
//! - `key[n]` - array index, negative counts from the end
//! - `key[*]` - every element
//! - `key[a:b]` - slice, either bound optional
//!
//! ```text
//! $.pods.metadata.name               -> ["web-0", "web-1"]
//! $.pods[0].metadata.name            -> "web-0"
//! $.pods[0].spec.containers[0].image -> "nginx:1.27"
//! ```

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// The output document built by RETURN clauses
pub type OutputDocument = Map<String, Value>;

/// A path that does not resolve against the snapshot. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("path lookup miss at '{segment}': {reason}")]
pub struct PathLookupMiss {
    pub segment: String,
    pub reason: String,
}

impl PathLookupMiss {
    fn new(segment: &str, reason: impl Into<String>) -> Self {
        Self {
            segment: segment.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Selector {
    Key(String),
    Index(i64),
    All,
    Slice(Option<i64>, Option<i64>),
}

/// Prefix a path with the root marker if missing
pub fn normalize_path(path: &str) -> String {
    if path.starts_with('$') {
        path.to_string()
    } else {
        format!("$.{}", path)
    }
}

/// Evaluate a path expression against a JSON document
pub fn lookup(root: &Value, path: &str) -> Result<Value, PathLookupMiss> {
    let path = normalize_path(path);
    let rest = path
        .strip_prefix('$')
        .ok_or_else(|| PathLookupMiss::new(&path, "missing root"))?;

    let mut current = root.clone();
    if rest.is_empty() {
        return Ok(current);
    }
    let rest = rest
        .strip_prefix('.')
        .ok_or_else(|| PathLookupMiss::new(rest, "expected '.' after root"))?;

    for segment in rest.split('.') {
        for selector in parse_segment(segment)? {
            current = apply(current, &selector, segment)?;
        }
    }
    Ok(current)
}

/// Parse "key", "key[0]", "key[*]", "[1:3]" and chains like "key[0][1]"
fn parse_segment(segment: &str) -> Result<Vec<Selector>, PathLookupMiss> {
    let (key, mut brackets) = match segment.find('[') {
        Some(pos) => segment.split_at(pos),
        None => (segment, ""),
    };

    let mut selectors = Vec::new();
    if !key.is_empty() {
        selectors.push(Selector::Key(key.to_string()));
    }

    while !brackets.is_empty() {
        let inner_end = brackets
            .find(']')
            .ok_or_else(|| PathLookupMiss::new(segment, "unclosed '['"))?;
        let inner = brackets[1..inner_end].trim();
        selectors.push(parse_bracket(inner, segment)?);
        brackets = &brackets[inner_end + 1..];
        if !brackets.is_empty() && !brackets.starts_with('[') {
            return Err(PathLookupMiss::new(segment, "unexpected text after ']'"));
        }
    }

    if selectors.is_empty() {
        return Err(PathLookupMiss::new(segment, "empty segment"));
    }
    Ok(selectors)
}

fn parse_bracket(inner: &str, segment: &str) -> Result<Selector, PathLookupMiss> {
    let parse_bound = |s: &str| -> Result<Option<i64>, PathLookupMiss> {
        let s = s.trim();
        if s.is_empty() {
            Ok(None)
        } else {
            s.parse()
                .map(Some)
                .map_err(|_| PathLookupMiss::new(segment, format!("invalid index '{}'", s)))
        }
    };

    if inner == "*" {
        return Ok(Selector::All);
    }
    if let Some((start, end)) = inner.split_once(':') {
        return Ok(Selector::Slice(parse_bound(start)?, parse_bound(end)?));
    }
    match parse_bound(inner)? {
        Some(idx) => Ok(Selector::Index(idx)),
        None => Err(PathLookupMiss::new(segment, "empty brackets")),
    }
}

/// Resolve a possibly negative index against a length
fn resolve_index(idx: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let idx = if idx < 0 { len + idx } else { idx };
    (0..len).contains(&idx).then_some(idx as usize)
}

fn apply(value: Value, selector: &Selector, segment: &str) -> Result<Value, PathLookupMiss> {
    match (selector, value) {
        (Selector::Key(key), Value::Object(mut map)) => map
            .remove(key)
            .ok_or_else(|| PathLookupMiss::new(segment, format!("key '{}' not found", key))),
        (Selector::Key(_), Value::Array(items)) => {
            let hits = items
                .into_iter()
                .filter_map(|item| apply(item, selector, segment).ok())
                .collect();
            Ok(Value::Array(hits))
        }
        (Selector::Index(idx), Value::Array(mut items)) => resolve_index(*idx, items.len())
            .map(|i| items.swap_remove(i))
            .ok_or_else(|| PathLookupMiss::new(segment, format!("index {} out of range", idx))),
        (Selector::All, Value::Array(items)) => Ok(Value::Array(items)),
        (Selector::Slice(start, end), Value::Array(items)) => {
            let len = items.len() as i64;
            let clamp = |b: i64| (if b < 0 { len + b } else { b }).clamp(0, len) as usize;
            let from = start.map(clamp).unwrap_or(0);
            let to = end.map(clamp).unwrap_or(items.len());
            Ok(Value::Array(
                items.into_iter().skip(from).take(to.saturating_sub(from)).collect(),
            ))
        }
        (_, other) => Err(PathLookupMiss::new(
            segment,
            format!("cannot apply selector to {}", type_name(&other)),
        )),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Evaluate `path` against `snapshot` and store the result in `output`
/// under the path's segments. Misses store an empty array.
pub fn project_path(output: &mut OutputDocument, snapshot: &Value, path: &str) {
    let path = normalize_path(path);
    let parts: Vec<&str> = path.split('.').skip(1).collect();
    let Some((last, intermediate)) = parts.split_last() else {
        return;
    };

    let mut current = output;
    for part in intermediate {
        let entry = current
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Value::Object(map) = entry else {
            return;
        };
        current = map;
    }

    let result = lookup(snapshot, &path).unwrap_or_else(|miss| {
        debug!(path = %path, reason = %miss, "Path not found");
        Value::Array(vec![])
    });
    current.insert(last.to_string(), result);
}
