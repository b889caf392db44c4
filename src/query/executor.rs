// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Clause-by-clause query execution.
//!
//! Each call to [`QueryExecutor::execute`] owns a fresh [`QueryContext`]:
//! the discovery cache, the accumulated results per node alias, the latest
//! serialized snapshot of those results and the output document. Nothing
//! outlives the call, so repeated or concurrent queries never see each
//! other's results.

use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info};

use super::ast::{Clause, MatchClause, NodePattern, Query, ReturnClause};
use super::error::QueryError;
use super::lister::ResourceLister;
use super::projection::{OutputDocument, project_path};
use super::selectors::build_selectors;
use crate::kubernetes::ClusterApi;

/// Query-wide settings
#[derive(Debug, Clone)]
pub struct ExecutorOptions {
    /// Namespace used when a node pattern does not set one
    pub namespace: String,
    /// List across all namespaces when a node pattern does not set one
    pub all_namespaces: bool,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            all_namespaces: false,
        }
    }
}

pub struct QueryExecutor<C> {
    cluster: C,
    options: ExecutorOptions,
}

impl<C: ClusterApi> QueryExecutor<C> {
    pub fn new(cluster: C, options: ExecutorOptions) -> Self {
        Self { cluster, options }
    }

    /// Execute all clauses in order and return the output document.
    ///
    /// Any error aborts the whole query; no partial output is returned.
    pub async fn execute(&self, query: &Query) -> Result<OutputDocument, QueryError> {
        let start = Instant::now();
        let mut ctx = QueryContext::new(&self.cluster, &self.options);

        for (index, clause) in query.clauses.iter().enumerate() {
            debug!(index, clause = clause.name(), "Executing clause");
            match clause {
                Clause::Match(m) => ctx.execute_match(m).await?,
                Clause::Return(r) => ctx.execute_return(r)?,
                Clause::Create(_) | Clause::Set(_) | Clause::Delete(_) => {
                    return Err(QueryError::UnsupportedClause(clause.name()));
                }
            }
        }

        info!(
            clauses = query.clauses.len(),
            aliases = ctx.results.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Query executed"
        );
        Ok(ctx.output)
    }
}

/// State for a single query execution
struct QueryContext<'a, C: ?Sized> {
    lister: ResourceLister<'a, C>,
    options: &'a ExecutorOptions,
    /// Flattened resources per node alias
    results: BTreeMap<String, Vec<Value>>,
    /// Serialized `results` as of the last completed node pattern
    snapshot: Option<Vec<u8>>,
    output: OutputDocument,
}

impl<'a, C: ClusterApi + ?Sized> QueryContext<'a, C> {
    fn new(cluster: &'a C, options: &'a ExecutorOptions) -> Self {
        Self {
            lister: ResourceLister::new(cluster),
            options,
            results: BTreeMap::new(),
            snapshot: None,
            output: OutputDocument::new(),
        }
    }

    /// Namespace for a list call: the node's own namespace, else all
    /// namespaces in all-namespaces mode, else the default namespace
    fn list_namespace<'n>(&'n self, node_namespace: Option<&'n str>) -> Option<&'n str> {
        match node_namespace {
            Some(ns) => Some(ns),
            None if self.options.all_namespaces => None,
            None => Some(self.options.namespace.as_str()),
        }
    }

    async fn execute_match(&mut self, clause: &MatchClause) -> Result<(), QueryError> {
        for node in &clause.nodes {
            self.execute_node(node).await?;
        }
        Ok(())
    }

    async fn execute_node(&mut self, node: &NodePattern) -> Result<(), QueryError> {
        debug!(name = %node.name, kind = %node.kind, "Node pattern found");

        let selectors = build_selectors(&node.properties)?;
        let namespace = self
            .list_namespace(selectors.namespace.as_deref())
            .map(String::from);

        let items = self
            .lister
            .list(&node.kind, &selectors.filters, namespace.as_deref())
            .await?;

        let flattened = items
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        self.results.insert(node.name.clone(), flattened);
        self.snapshot = Some(serde_json::to_vec(&self.results)?);
        Ok(())
    }

    fn execute_return(&mut self, clause: &ReturnClause) -> Result<(), QueryError> {
        let snapshot = match &self.snapshot {
            Some(bytes) => serde_json::from_slice(bytes)?,
            None => Value::Null,
        };

        for path in &clause.paths {
            project_path(&mut self.output, &snapshot, path);
        }
        Ok(())
    }
}
