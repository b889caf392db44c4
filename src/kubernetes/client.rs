// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIResourceList;
use kube::api::{ApiResource, DynamicObject, GroupVersionKind, ListParams, ObjectList};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

use super::{ApiFilters, ClusterApi, ResolvedResource};

/// Timeout for connecting to K8s API
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for reading K8s API responses
const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum retry attempts for transient failures
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (doubles each retry)
const RETRY_BASE_DELAY: Duration = Duration::from_millis(100);

/// Build a client for the given kubeconfig context, or the current context if None
pub async fn connect(context: Option<&str>) -> Result<Client> {
    let kubeconfig = Kubeconfig::read().context("Failed to read kubeconfig")?;

    let context_name = context
        .map(String::from)
        .or_else(|| kubeconfig.current_context.clone())
        .ok_or_else(|| anyhow!("No context specified and no current context in kubeconfig"))?;

    if !kubeconfig.contexts.iter().any(|c| c.name == context_name) {
        return Err(anyhow!("Context '{}' not found in kubeconfig", context_name));
    }

    let start = std::time::Instant::now();

    let mut config = Config::from_custom_kubeconfig(
        kubeconfig,
        &KubeConfigOptions {
            context: Some(context_name.clone()),
            ..Default::default()
        },
    )
    .await
    .with_context(|| format!("Failed to load kubeconfig for context '{}'", context_name))?;

    config.connect_timeout = Some(CONNECT_TIMEOUT);
    config.read_timeout = Some(READ_TIMEOUT);

    let client = Client::try_from(config)
        .with_context(|| format!("Failed to create client for context '{}'", context_name))?;

    info!(
        context = %context_name,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Connected to cluster"
    );

    Ok(client)
}

/// [`ClusterApi`] backed by a live `kube::Client`
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetch a single list with retry logic
    async fn list_with_retry(
        &self,
        api: &Api<DynamicObject>,
        params: &ListParams,
        resource: &str,
    ) -> Result<ObjectList<DynamicObject>> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match api.list(params).await {
                Ok(list) => return Ok(list),
                Err(e) if Self::is_retryable_error(&e) => {
                    if attempt + 1 < MAX_RETRIES {
                        let delay = RETRY_BASE_DELAY * 2u32.pow(attempt);
                        warn!(
                            resource = %resource,
                            attempt = attempt + 1,
                            max_attempts = MAX_RETRIES,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "Retryable error, backing off"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    last_error = Some(e);
                }
                Err(e) => {
                    debug!(resource = %resource, error = %e, "Non-retryable error");
                    return Err(anyhow!("K8s API error: {}", e));
                }
            }
        }

        Err(anyhow!(
            "Failed after {} retries: {}",
            MAX_RETRIES,
            last_error.map(|e| e.to_string()).unwrap_or_default()
        ))
    }

    /// Check if an error is retryable (transient failures)
    fn is_retryable_error(err: &kube::Error) -> bool {
        match err {
            kube::Error::HyperError(_) => true,
            // 429 (rate limit), 503 (unavailable), 504 (timeout)
            kube::Error::Api(api_err) => matches!(api_err.code, 429 | 503 | 504),
            _ => false,
        }
    }
}

/// Endpoint a list call is sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListScope<'a> {
    Namespaced(&'a str),
    AllNamespaces,
    /// Cluster-scoped resources have no namespaced endpoint
    ClusterScoped,
}

fn list_scope<'a>(resource: &ResolvedResource, namespace: Option<&'a str>) -> ListScope<'a> {
    match namespace {
        _ if !resource.namespaced => ListScope::ClusterScoped,
        Some(ns) => ListScope::Namespaced(ns),
        None => ListScope::AllNamespaces,
    }
}

/// Build ListParams from API filters (label selectors, field selectors)
fn build_list_params(filters: &ApiFilters) -> ListParams {
    let mut params = ListParams::default();

    if let Some(ref label_sel) = filters.label_selector {
        params = params.labels(label_sel);
    }

    if let Some(ref field_sel) = filters.field_selector {
        params = params.fields(field_sel);
    }

    trace!(
        label_selector = ?filters.label_selector,
        field_selector = ?filters.field_selector,
        "Built ListParams"
    );

    params
}

#[async_trait]
impl ClusterApi for KubeCluster {
    /// Core resources at the first advertised version, then every API group at
    /// its preferred version. Groups whose discovery fails (commonly an
    /// unavailable aggregated API) are skipped.
    async fn preferred_resources(&self) -> Result<Vec<APIResourceList>> {
        let mut lists = Vec::new();

        let core = self
            .client
            .list_core_api_versions()
            .await
            .context("Failed to list core API versions")?;
        if let Some(version) = core.versions.first() {
            let resources = self
                .client
                .list_core_api_resources(version)
                .await
                .with_context(|| format!("Failed to list core resources for {}", version))?;
            lists.push(resources);
        }

        let groups = self
            .client
            .list_api_groups()
            .await
            .context("Failed to list API groups")?;

        for group in &groups.groups {
            let Some(preferred) = group
                .preferred_version
                .as_ref()
                .or_else(|| group.versions.first())
            else {
                continue;
            };

            match self
                .client
                .list_api_group_resources(&preferred.group_version)
                .await
            {
                Ok(resources) => lists.push(resources),
                Err(e) => {
                    warn!(
                        group_version = %preferred.group_version,
                        error = %e,
                        "Skipping API group that failed discovery"
                    );
                }
            }
        }

        debug!(group_versions = lists.len(), "Discovery complete");
        Ok(lists)
    }

    async fn list(
        &self,
        resource: &ResolvedResource,
        namespace: Option<&str>,
        filters: &ApiFilters,
    ) -> Result<Vec<DynamicObject>> {
        let coord = &resource.coordinate;
        let gvk = GroupVersionKind::gvk(&coord.group, &coord.version, &resource.kind);
        let ar = ApiResource::from_gvk_with_plural(&gvk, &coord.resource);
        let params = build_list_params(filters);

        let scope = list_scope(resource, namespace);
        let api: Api<DynamicObject> = match scope {
            ListScope::Namespaced(ns) => Api::namespaced_with(self.client.clone(), ns, &ar),
            ListScope::AllNamespaces | ListScope::ClusterScoped => {
                Api::all_with(self.client.clone(), &ar)
            }
        };

        debug!(
            resource = %coord,
            namespace = ?namespace,
            scope = ?scope,
            "Listing K8s resources"
        );

        let list = self
            .list_with_retry(&api, &params, &coord.resource)
            .await?;
        Ok(list.items)
    }
}
