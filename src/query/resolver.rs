// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Resource kind resolution against discovered API resources.
//!
//! A kind identifier matches a resource by plural name (`pods`), Kind
//! (`Pod`) or short name (`po`), case-insensitively. The first match in
//! discovery order wins.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{APIResource, APIResourceList};

use super::error::QueryError;
use crate::kubernetes::{ResolvedResource, ResourceCoordinate};

/// Split a group-version string ("v1", "apps/v1") into (group, version)
pub fn parse_group_version(gv: &str) -> Result<(String, String), QueryError> {
    let invalid = || QueryError::discovery(format!("unexpected GroupVersion string: '{}'", gv));

    if gv.is_empty() {
        return Err(invalid());
    }
    match gv.split_once('/') {
        None => Ok((String::new(), gv.to_string())),
        Some((group, version)) => {
            if group.is_empty() || version.is_empty() || version.contains('/') {
                return Err(invalid());
            }
            Ok((group.to_string(), version.to_string()))
        }
    }
}

fn matches_identifier(resource: &APIResource, identifier: &str) -> bool {
    resource.name.eq_ignore_ascii_case(identifier)
        || resource.kind.eq_ignore_ascii_case(identifier)
        || resource
            .short_names
            .iter()
            .flatten()
            .any(|short| short.eq_ignore_ascii_case(identifier))
}

/// Find the resource type a kind identifier refers to
pub fn resolve_resource(
    lists: &[APIResourceList],
    identifier: &str,
) -> Result<ResolvedResource, QueryError> {
    for list in lists {
        for resource in &list.resources {
            // Skip subresources (e.g., pods/log, deployments/scale)
            if resource.name.contains('/') {
                continue;
            }
            if matches_identifier(resource, identifier) {
                let (group, version) = parse_group_version(&list.group_version)?;
                return Ok(ResolvedResource {
                    coordinate: ResourceCoordinate {
                        group,
                        version,
                        resource: resource.name.clone(),
                    },
                    kind: resource.kind.clone(),
                    namespaced: resource.namespaced,
                });
            }
        }
    }

    Err(QueryError::ResourceNotFound(identifier.to_string()))
}
