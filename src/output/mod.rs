// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

mod json;
mod yaml;

pub use json::JsonFormatter;
pub use yaml::YamlFormatter;

use crate::cli::OutputFormat;
use crate::query::OutputDocument;

/// Render an output document in the requested format
pub fn format(document: &OutputDocument, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Json => JsonFormatter::format(document),
        OutputFormat::Yaml => YamlFormatter::format(document),
    }
}
