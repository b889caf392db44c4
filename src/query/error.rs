// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that abort a whole query
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("resource discovery failed: {0}")]
    Discovery(#[source] BoxError),

    #[error("resource identifier not found: {0}")]
    ResourceNotFound(String),

    #[error("conflicting selectors: {0}")]
    ConflictingSelector(String),

    #[error("invalid label selector '{selector}': {reason}")]
    SelectorSyntax { selector: String, reason: String },

    #[error("failed to list {kind}: {source}")]
    List {
        kind: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to serialize query results: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unsupported clause: {0}")]
    UnsupportedClause(&'static str),
}

impl QueryError {
    pub fn discovery(err: impl Into<BoxError>) -> Self {
        QueryError::Discovery(err.into())
    }
}
