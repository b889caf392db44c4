// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use crate::query::OutputDocument;

pub struct JsonFormatter;

impl JsonFormatter {
    pub fn format(document: &OutputDocument) -> String {
        serde_json::to_string_pretty(document).unwrap_or_else(|_| "{}".to_string())
    }
}
