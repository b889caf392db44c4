// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

mod cli;
pub mod config;
mod kubernetes;
mod output;
mod query;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use tracing_subscriber::prelude::*;

use cli::Args;
use kubernetes::KubeCluster;
use query::{Query, QueryExecutor};

/// Initialize logging with file output and optional stderr
fn init_logging(verbose: bool) {
    use tracing_rolling_file::{RollingConditionBase, RollingFileAppenderBase};
    use tracing_subscriber::fmt::format::FmtSpan;

    let log_dir = config::base_dir()
        .map(|p| p.join("log"))
        .unwrap_or_else(|_| std::path::PathBuf::from("."));

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Could not create log directory: {}", e);
        return;
    }

    // Rotate daily or at 10MB, keep 5 files
    let log_path = log_dir.join("kubecypher.log");
    let condition = RollingConditionBase::new()
        .daily()
        .max_size(10 * 1024 * 1024);

    let file_appender = match RollingFileAppenderBase::new(log_path, condition, 5) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Warning: Could not create log file: {}", e);
            return;
        }
    };

    let (non_blocking, _guard) = file_appender.get_non_blocking_appender();
    // Leak the guard to keep the background writer alive
    std::mem::forget(_guard);

    let filter = if verbose {
        "kubecypher=debug"
    } else {
        "kubecypher=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_span_events(FmtSpan::NONE);

    if verbose {
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::NONE);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .with(stderr_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .init();
    }
}

/// Read the query AST from a file, or stdin for None / "-"
fn read_query(file: Option<&str>) -> Result<Query> {
    let content = match file {
        Some(path) if path != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read query file: {}", path))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read query from stdin")?;
            buf
        }
    };
    serde_json::from_str(&content).context("Failed to parse query AST")
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider (aws-lc-rs)
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let args = Args::parse();
    init_logging(args.verbose);

    let config = config::Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: Ignoring config: {:#}", e);
        config::Config::default()
    });
    let options = config.executor_options(args.namespace.as_deref(), args.all_namespaces);

    let query = read_query(args.file.as_deref())?;

    let context = args.context.as_deref().or(config.context.as_deref());
    let client = kubernetes::connect(context).await?;
    let executor = QueryExecutor::new(KubeCluster::new(client), options);

    match executor.execute(&query).await {
        Ok(document) => {
            println!("{}", output::format(&document, &args.output));
            Ok(())
        }
        Err(e) => {
            eprintln!("Error executing query: {}", e);
            std::process::exit(1);
        }
    }
}
