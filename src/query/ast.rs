// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Query AST as produced by the query language parser.
//!
//! The parser lives outside this crate; these types are its output contract
//! and deserialize from its JSON form.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A parsed query: clauses in declared order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub clauses: Vec<Clause>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Clause {
    Match(MatchClause),
    Return(ReturnClause),
    /// Mutation clauses are recognized by the parser but not executed
    Create(MutationClause),
    Set(MutationClause),
    Delete(MutationClause),
}

impl Clause {
    pub fn name(&self) -> &'static str {
        match self {
            Clause::Match(_) => "MATCH",
            Clause::Return(_) => "RETURN",
            Clause::Create(_) => "CREATE",
            Clause::Set(_) => "SET",
            Clause::Delete(_) => "DELETE",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchClause {
    pub nodes: Vec<NodePattern>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnClause {
    /// Path expressions, e.g. "p.metadata.name" or "$.p.metadata.name"
    pub paths: Vec<String>,
}

/// Payload of an unexecuted mutation clause, kept opaque
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutationClause {
    #[serde(default)]
    pub nodes: Vec<NodePattern>,
}

/// One node in a MATCH pattern, e.g. `(p:Pod {namespace: "kube-system"})`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePattern {
    /// Alias used as the output key
    pub name: String,
    /// Resource kind identifier (plural, Kind, or short name; case-insensitive)
    pub kind: String,
    #[serde(default)]
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub key: String,
    pub value: PropertyValue,
}

impl Property {
    #[allow(dead_code)]
    pub fn new(key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Scalar property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Integer(i) => write!(f, "{}", i),
            PropertyValue::Float(x) => write!(f, "{}", x),
            PropertyValue::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Integer(i)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}
