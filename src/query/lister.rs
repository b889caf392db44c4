// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Listing resources of a kind, with discovery done once per query

use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIResourceList;
use kube::api::{DynamicObject, TypeMeta};
use tracing::debug;

use super::error::QueryError;
use super::label_selector::LabelSelector;
use super::resolver::resolve_resource;
use crate::kubernetes::{ApiFilters, ClusterApi, ResolvedResource};

/// Resolves kinds and lists resources for a single query execution.
///
/// Discovery runs on the first resolution and is reused afterwards.
pub struct ResourceLister<'a, C: ?Sized> {
    cluster: &'a C,
    discovery: Option<Vec<APIResourceList>>,
}

impl<'a, C: ClusterApi + ?Sized> ResourceLister<'a, C> {
    pub fn new(cluster: &'a C) -> Self {
        Self {
            cluster,
            discovery: None,
        }
    }

    /// Resolve a kind identifier to a resource type
    pub async fn resolve(&mut self, kind: &str) -> Result<ResolvedResource, QueryError> {
        if self.discovery.is_none() {
            let lists = self
                .cluster
                .preferred_resources()
                .await
                .map_err(QueryError::discovery)?;
            debug!(group_versions = lists.len(), "Discovered API resources");
            self.discovery = Some(lists);
        }
        let lists = self.discovery.as_deref().unwrap_or_default();
        resolve_resource(lists, kind)
    }

    /// List resources of `kind` matching the given selectors.
    ///
    /// `namespace` of `None` lists across all namespaces. The label selector is
    /// validated and sent in canonical form. Every returned object carries the
    /// apiVersion and kind of the resolved resource.
    pub async fn list(
        &mut self,
        kind: &str,
        filters: &ApiFilters,
        namespace: Option<&str>,
    ) -> Result<Vec<DynamicObject>, QueryError> {
        let resource = self.resolve(kind).await?;

        let label_selector = match filters.label_selector.as_deref() {
            Some(raw) => {
                let parsed =
                    LabelSelector::parse(raw).map_err(|reason| QueryError::SelectorSyntax {
                        selector: raw.to_string(),
                        reason,
                    })?;
                (!parsed.is_empty()).then(|| parsed.to_string())
            }
            None => None,
        };
        let filters = ApiFilters {
            label_selector,
            field_selector: filters.field_selector.clone(),
        };

        debug!(
            kind = %kind,
            resource = %resource.coordinate,
            namespace = ?namespace,
            field_selector = ?filters.field_selector,
            label_selector = ?filters.label_selector,
            "Listing resources"
        );

        let mut items = self
            .cluster
            .list(&resource, namespace, &filters)
            .await
            .map_err(|e| QueryError::List {
                kind: kind.to_string(),
                source: e.into(),
            })?;

        // List items come back without their own apiVersion/kind
        let api_version = resource.coordinate.api_version();
        for item in &mut items {
            item.types.get_or_insert_with(|| TypeMeta {
                api_version: api_version.clone(),
                kind: resource.kind.clone(),
            });
        }

        debug!(kind = %kind, count = items.len(), "Listed resources");
        Ok(items)
    }
}
