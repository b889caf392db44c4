// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Cluster access for the query engine.
//!
//! The engine only talks to the cluster through [`ClusterApi`], which exposes
//! the two calls a query needs: preferred resource discovery and a generic list.

mod client;

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIResourceList;
use kube::api::DynamicObject;

pub use client::{KubeCluster, connect};

/// Parameters to push down to the Kubernetes API
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiFilters {
    /// Label selector string (e.g., "app=nginx,version=v1")
    pub label_selector: Option<String>,
    /// Field selector string (e.g., "metadata.name=coredns")
    pub field_selector: Option<String>,
}

/// (group, version, resource) triple addressing a resource type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceCoordinate {
    /// API group (empty string for core v1)
    pub group: String,
    pub version: String,
    /// Plural resource name (e.g., "pods", "deployments")
    pub resource: String,
}

impl ResourceCoordinate {
    /// Get the full API group/version string
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl fmt::Display for ResourceCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.api_version(), self.resource)
    }
}

/// A resource type found in discovery, with what the list call needs to address it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResource {
    pub coordinate: ResourceCoordinate,
    /// Kind name (e.g., "Pod")
    pub kind: String,
    /// Whether the resource lives in a namespace
    pub namespaced: bool,
}

/// The cluster capabilities the query engine depends on
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Preferred API resources, grouped by group-version, in discovery order
    async fn preferred_resources(&self) -> Result<Vec<APIResourceList>>;

    /// List instances of a resource type.
    ///
    /// `namespace` of `None` lists across all namespaces.
    async fn list(
        &self,
        resource: &ResolvedResource,
        namespace: Option<&str>,
        filters: &ApiFilters,
    ) -> Result<Vec<DynamicObject>>;
}
