// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! In-memory cluster used by the query engine tests

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIResourceList;
use kube::api::DynamicObject;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::resolver::tests::sample_discovery;
use crate::kubernetes::{ApiFilters, ClusterApi, ResolvedResource};

/// A list call as seen by the cluster
#[derive(Debug, Clone, PartialEq)]
pub struct ListCall {
    pub resource: String,
    pub namespace: Option<String>,
    pub filters: ApiFilters,
}

#[derive(Default)]
pub struct MockCluster {
    discovery: Vec<APIResourceList>,
    /// Objects keyed by plural resource name
    objects: HashMap<String, Vec<Value>>,
    pub fail_discovery: bool,
    pub fail_list: bool,
    discovery_calls: AtomicUsize,
    list_calls: Mutex<Vec<ListCall>>,
}

impl MockCluster {
    pub fn new() -> Self {
        Self {
            discovery: sample_discovery(),
            ..Default::default()
        }
    }

    pub fn with_objects(mut self, resource: &str, objects: Vec<Value>) -> Self {
        self.objects.insert(resource.to_string(), objects);
        self
    }

    pub fn discovery_calls(&self) -> usize {
        self.discovery_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> Vec<ListCall> {
        self.list_calls.lock().expect("list calls lock").clone()
    }
}

/// A pod as returned by the API server
pub fn pod(name: &str, namespace: &str) -> Value {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {"name": name, "namespace": namespace},
        "spec": {"containers": [{"name": "main", "image": "nginx:1.27"}]},
        "status": {"phase": "Running"}
    })
}

#[async_trait]
impl ClusterApi for MockCluster {
    async fn preferred_resources(&self) -> Result<Vec<APIResourceList>> {
        self.discovery_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_discovery {
            return Err(anyhow!("the server is currently unable to handle the request"));
        }
        Ok(self.discovery.clone())
    }

    async fn list(
        &self,
        resource: &ResolvedResource,
        namespace: Option<&str>,
        filters: &ApiFilters,
    ) -> Result<Vec<DynamicObject>> {
        self.list_calls
            .lock()
            .expect("list calls lock")
            .push(ListCall {
                resource: resource.coordinate.to_string(),
                namespace: namespace.map(String::from),
                filters: filters.clone(),
            });
        if self.fail_list {
            return Err(anyhow!("connection refused"));
        }

        let objects = self
            .objects
            .get(&resource.coordinate.resource)
            .cloned()
            .unwrap_or_default();
        objects
            .into_iter()
            .filter(|obj| match namespace {
                Some(ns) if resource.namespaced => obj["metadata"]["namespace"] == ns,
                _ => true,
            })
            .map(|obj| {
                // List items arrive without apiVersion/kind
                let mut object: DynamicObject = serde_json::from_value(obj)?;
                object.types = None;
                Ok::<_, anyhow::Error>(object)
            })
            .collect()
    }
}
