// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Configuration persistence for kubecypher
//!
//! All kubecypher data is stored under ~/.kubecypher/:
//! - ~/.kubecypher/config.json - user configuration
//! - ~/.kubecypher/log/ - rotated log files

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::query::ExecutorOptions;

/// Get the base kubecypher directory (~/.kubecypher/)
pub fn base_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|p| p.join(".kubecypher"))
        .context("Could not determine home directory")
}

/// kubecypher configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Kubeconfig context to use instead of the current one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Namespace for node patterns without a namespace property
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Query all namespaces by default
    #[serde(default)]
    pub all_namespaces: bool,
}

impl Config {
    /// Load config from disk, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Get the config file path (~/.kubecypher/config.json)
    pub fn config_path() -> Result<PathBuf> {
        Ok(base_dir()?.join("config.json"))
    }

    /// Executor settings from this config, with command line overrides applied
    pub fn executor_options(
        &self,
        namespace: Option<&str>,
        all_namespaces: bool,
    ) -> ExecutorOptions {
        let defaults = ExecutorOptions::default();
        ExecutorOptions {
            namespace: namespace
                .map(String::from)
                .or_else(|| self.namespace.clone())
                .unwrap_or(defaults.namespace),
            all_namespaces: all_namespaces || self.all_namespaces,
        }
    }
}
