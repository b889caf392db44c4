// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use crate::query::OutputDocument;

pub struct YamlFormatter;

impl YamlFormatter {
    pub fn format(document: &OutputDocument) -> String {
        serde_yaml::to_string(document).unwrap_or_else(|_| "{}".to_string())
    }
}
