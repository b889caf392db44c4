// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "kubecypher")]
#[command(author, version, about = "Query Kubernetes resources with graph patterns")]
pub struct Args {
    /// Parsed query (JSON AST) to execute. Reads stdin when omitted or "-"
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<String>,

    /// Kubernetes context to use (defaults to the kubeconfig current context)
    #[arg(short, long, value_name = "CONTEXT")]
    pub context: Option<String>,

    /// Namespace for node patterns without a namespace property
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Query all namespaces for node patterns without a namespace property
    #[arg(short = 'A', long)]
    pub all_namespaces: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["kubecypher"]);
        assert!(args.file.is_none());
        assert!(args.namespace.is_none());
        assert!(!args.all_namespaces);
        assert_eq!(args.output, OutputFormat::Json);
    }

    #[test]
    fn test_flags() {
        let args = Args::parse_from([
            "kubecypher",
            "-f",
            "query.json",
            "-c",
            "prod",
            "-n",
            "kube-system",
            "-A",
            "-o",
            "yaml",
            "-v",
        ]);
        assert_eq!(args.file.as_deref(), Some("query.json"));
        assert_eq!(args.context.as_deref(), Some("prod"));
        assert_eq!(args.namespace.as_deref(), Some("kube-system"));
        assert!(args.all_namespaces);
        assert_eq!(args.output, OutputFormat::Yaml);
        assert!(args.verbose);
    }
}
