// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Kubernetes label selector parsing and validation
//!
//! Supported requirement forms (comma separated):
//!
//! - `key=value`, `key==value`, `key!=value`
//! - `key in (v1,v2)`, `key notin (v1,v2)`
//! - `key` (exists), `!key` (does not exist)
//!
//! Keys are `[prefix/]name` where the optional prefix is a DNS subdomain of at
//! most 253 characters and the name is at most 63 characters of alphanumerics,
//! `-`, `_` and `.`, beginning and ending with an alphanumeric. Values are empty
//! or follow the same rule as names.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]([-A-Za-z0-9_.]*[A-Za-z0-9])?$").expect("valid name regex")
});

static DNS_SUBDOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("valid subdomain regex")
});

static SET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+)\s+(in|notin)\s*\((.*)\)$").expect("valid set regex")
});

const MAX_NAME_LEN: usize = 63;
const MAX_PREFIX_LEN: usize = 253;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    Equals,
    NotEquals,
    In,
    NotIn,
    Exists,
    DoesNotExist,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub key: String,
    pub operator: Operator,
    /// Sorted values; empty for Exists/DoesNotExist
    pub values: Vec<String>,
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operator {
            Operator::Equals => write!(f, "{}={}", self.key, self.values[0]),
            Operator::NotEquals => write!(f, "{}!={}", self.key, self.values[0]),
            Operator::In => write!(f, "{} in ({})", self.key, self.values.join(",")),
            Operator::NotIn => write!(f, "{} notin ({})", self.key, self.values.join(",")),
            Operator::Exists => f.write_str(&self.key),
            Operator::DoesNotExist => write!(f, "!{}", self.key),
        }
    }
}

/// A validated label selector. An empty selector matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelector {
    requirements: Vec<Requirement>,
}

impl LabelSelector {
    /// Parse and validate a selector string
    pub fn parse(input: &str) -> Result<Self, String> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Self::default());
        }

        let mut requirements = split_requirements(input)?
            .into_iter()
            .map(parse_requirement)
            .collect::<Result<Vec<_>, _>>()?;
        requirements.sort_by(|a, b| a.key.cmp(&b.key));

        Ok(Self { requirements })
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    #[allow(dead_code)]
    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }
}

impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.requirements.iter().map(|r| r.to_string()).collect();
        f.write_str(&parts.join(","))
    }
}

/// Split on commas outside of parentheses
fn split_requirements(input: &str) -> Result<Vec<&str>, String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| "unbalanced ')'".to_string())?;
            }
            ',' if depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err("unbalanced '('".to_string());
    }
    parts.push(&input[start..]);
    Ok(parts)
}

fn parse_requirement(raw: &str) -> Result<Requirement, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("empty requirement".to_string());
    }

    if let Some(key) = raw.strip_prefix('!') {
        let key = key.trim();
        validate_key(key)?;
        return Ok(Requirement {
            key: key.to_string(),
            operator: Operator::DoesNotExist,
            values: vec![],
        });
    }

    if let Some(caps) = SET_RE.captures(raw) {
        let key = &caps[1];
        validate_key(key)?;
        let operator = if &caps[2] == "in" {
            Operator::In
        } else {
            Operator::NotIn
        };
        if caps[3].trim().is_empty() {
            return Err(format!("empty value set for '{}'", key));
        }
        let mut values = caps[3]
            .split(',')
            .map(|v| {
                let v = v.trim();
                validate_value(v).map(|_| v.to_string())
            })
            .collect::<Result<Vec<_>, _>>()?;
        values.sort();
        values.dedup();
        return Ok(Requirement {
            key: key.to_string(),
            operator,
            values,
        });
    }

    let split = raw
        .split_once("!=")
        .map(|(k, v)| (k, v, Operator::NotEquals))
        .or_else(|| raw.split_once("==").map(|(k, v)| (k, v, Operator::Equals)))
        .or_else(|| raw.split_once('=').map(|(k, v)| (k, v, Operator::Equals)));

    match split {
        Some((key, value, operator)) => {
            let (key, value) = (key.trim(), value.trim());
            validate_key(key)?;
            validate_value(value)?;
            Ok(Requirement {
                key: key.to_string(),
                operator,
                values: vec![value.to_string()],
            })
        }
        None => {
            validate_key(raw)?;
            Ok(Requirement {
                key: raw.to_string(),
                operator: Operator::Exists,
                values: vec![],
            })
        }
    }
}

fn validate_key(key: &str) -> Result<(), String> {
    let name = match key.split_once('/') {
        Some((prefix, name)) => {
            if prefix.is_empty()
                || prefix.len() > MAX_PREFIX_LEN
                || !DNS_SUBDOMAIN_RE.is_match(prefix)
            {
                return Err(format!("invalid label key prefix '{}'", prefix));
            }
            name
        }
        None => key,
    };

    if name.is_empty() || name.len() > MAX_NAME_LEN || !NAME_RE.is_match(name) {
        return Err(format!("invalid label key '{}'", key));
    }
    Ok(())
}

fn validate_value(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Ok(());
    }
    if value.len() > MAX_NAME_LEN || !NAME_RE.is_match(value) {
        return Err(format!("invalid label value '{}'", value));
    }
    Ok(())
}
