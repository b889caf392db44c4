// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Graph-pattern query execution against Kubernetes resources
//!
//! ```text
//! MATCH (p:Pod {namespace: "kube-system"}) RETURN p.metadata.name
//! ```
//!
//! MATCH node patterns are turned into list calls (kind resolution, field and
//! label selectors, namespace scoping); RETURN paths are projected from the
//! listed resources into a nested output document.

pub mod ast;
mod error;
mod executor;
mod label_selector;
mod lister;
mod projection;
mod resolver;
mod selectors;

#[cfg(test)]
mod testing;

pub use ast::Query;
pub use error::QueryError;
pub use executor::{ExecutorOptions, QueryExecutor};
pub use projection::OutputDocument;
