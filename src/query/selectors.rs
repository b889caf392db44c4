// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Translation of node pattern properties into Kubernetes selectors
//!
//! - `namespace` / `metadata.namespace` scopes the list call, it never becomes a selector
//! - `name` / `metadata.name` becomes the field selector `metadata.name=<value>`
//! - every other property becomes a `key=value` label selector requirement
//!
//! A name selector identifies a single object, so it may only be combined
//! with a namespace.

use super::ast::Property;
use super::error::QueryError;
use crate::kubernetes::ApiFilters;

const NAME_KEYS: [&str; 2] = ["name", "metadata.name"];
const NAMESPACE_KEYS: [&str; 2] = ["namespace", "metadata.namespace"];

fn is_name_key(key: &str) -> bool {
    NAME_KEYS.contains(&key)
}

fn is_namespace_key(key: &str) -> bool {
    NAMESPACE_KEYS.contains(&key)
}

/// Selectors built from one node pattern
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSelectors {
    pub filters: ApiFilters,
    /// Namespace taken from a namespace property, if any
    pub namespace: Option<String>,
}

/// Build field and label selectors plus the namespace override for a node pattern.
///
/// The whole property list is validated before any selector is emitted.
pub fn build_selectors(properties: &[Property]) -> Result<NodeSelectors, QueryError> {
    let mut namespace: Option<String> = None;
    let mut remaining = Vec::with_capacity(properties.len());

    for prop in properties {
        if is_namespace_key(&prop.key) {
            let value = prop.value.to_string();
            match &namespace {
                Some(existing) if *existing != value => {
                    return Err(QueryError::ConflictingSelector(format!(
                        "namespace is set to both '{}' and '{}'",
                        existing, value
                    )));
                }
                _ => namespace = Some(value),
            }
        } else {
            remaining.push(prop);
        }
    }

    let name_count = remaining.iter().filter(|p| is_name_key(&p.key)).count();
    if name_count > 1 {
        return Err(QueryError::ConflictingSelector(
            "the 'name' selector can only be specified once".to_string(),
        ));
    }
    if name_count == 1 && remaining.len() > 1 {
        return Err(QueryError::ConflictingSelector(
            "the 'name' selector can be used by itself or combined with 'namespace', \
             but not with other label selectors"
                .to_string(),
        ));
    }

    let mut field_parts = Vec::new();
    let mut label_parts = Vec::new();
    for prop in remaining {
        if is_name_key(&prop.key) {
            field_parts.push(format!("metadata.name={}", prop.value));
        } else {
            label_parts.push(format!("{}={}", prop.key, prop.value));
        }
    }

    let join = |parts: Vec<String>| (!parts.is_empty()).then(|| parts.join(","));

    Ok(NodeSelectors {
        filters: ApiFilters {
            field_selector: join(field_parts),
            label_selector: join(label_parts),
        },
        namespace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> Vec<Property> {
        pairs.iter().map(|(k, v)| Property::new(*k, *v)).collect()
    }

    #[test]
    fn test_no_properties() {
        let sel = build_selectors(&[]).unwrap();
        assert_eq!(sel, NodeSelectors::default());
    }

    #[test]
    fn test_namespace_extracted() {
        for key in NAMESPACE_KEYS {
            let sel = build_selectors(&props(&[(key, "kube-system"), ("app", "dns")])).unwrap();
            assert_eq!(sel.namespace.as_deref(), Some("kube-system"));
            assert_eq!(sel.filters.label_selector.as_deref(), Some("app=dns"));
            assert!(sel.filters.field_selector.is_none());
        }
    }

    #[test]
    fn test_name_becomes_field_selector() {
        for key in NAME_KEYS {
            let sel = build_selectors(&props(&[(key, "coredns")])).unwrap();
            assert_eq!(
                sel.filters.field_selector.as_deref(),
                Some("metadata.name=coredns")
            );
            assert!(sel.filters.label_selector.is_none());
        }
    }

    #[test]
    fn test_name_with_namespace_allowed() {
        let sel = build_selectors(&props(&[("name", "web"), ("namespace", "prod")])).unwrap();
        assert_eq!(sel.filters.field_selector.as_deref(), Some("metadata.name=web"));
        assert_eq!(sel.namespace.as_deref(), Some("prod"));
    }

    #[test]
    fn test_labels_joined_in_order() {
        let sel = build_selectors(&props(&[("app", "nginx"), ("tier", "frontend")])).unwrap();
        assert_eq!(
            sel.filters.label_selector.as_deref(),
            Some("app=nginx,tier=frontend")
        );
    }

    #[test]
    fn test_name_conflicts_regardless_of_order() {
        let after = build_selectors(&props(&[("name", "web"), ("app", "nginx")]));
        assert!(matches!(after, Err(QueryError::ConflictingSelector(_))));

        let before = build_selectors(&props(&[("app", "nginx"), ("name", "web")]));
        assert!(matches!(before, Err(QueryError::ConflictingSelector(_))));
    }

    #[test]
    fn test_duplicate_name_conflicts() {
        let result = build_selectors(&props(&[("name", "a"), ("metadata.name", "b")]));
        assert!(matches!(result, Err(QueryError::ConflictingSelector(_))));
    }

    #[test]
    fn test_conflicting_namespaces() {
        let result = build_selectors(&props(&[("namespace", "a"), ("metadata.namespace", "b")]));
        assert!(matches!(result, Err(QueryError::ConflictingSelector(_))));

        let same = build_selectors(&props(&[("namespace", "a"), ("metadata.namespace", "a")]));
        assert_eq!(same.unwrap().namespace.as_deref(), Some("a"));
    }

    #[test]
    fn test_non_string_values() {
        let sel = build_selectors(&[Property::new("replicas", 3i64), Property::new("canary", true)])
            .unwrap();
        assert_eq!(
            sel.filters.label_selector.as_deref(),
            Some("replicas=3,canary=true")
        );
    }
}
