// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::Local;

/// Reserved label marking a unit deferred rather than categorized.
pub const SKIPPED_LABEL: &str = "SKIPPED";

/// Separator joining selection-path labels in the persisted `categories` column.
pub const PATH_SEPARATOR: &str = " > ";

/// Timestamp format used in records (`YYYY-MM-DD HH:MM:SS`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Persisted outcome for one annotation unit. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRecord {
    text: String,
    categories: String,
    final_subcategory: String,
    timestamp: String,
}

impl AnnotationRecord {
    /// Reconstructs a record from already-persisted parts; the codec's entry point.
    pub fn new(
        text: String,
        categories: String,
        final_subcategory: String,
        timestamp: String,
    ) -> Self {
        Self { text, categories, final_subcategory, timestamp }
    }

    /// A confirmed annotation: the full path joined with [`PATH_SEPARATOR`], the last label as
    /// the final subcategory, timestamped now.
    pub fn completed<S: AsRef<str>>(text: &str, path: &[S]) -> Self {
        let labels: Vec<&str> = path.iter().map(|label| label.as_ref()).collect();
        let categories = labels.join(PATH_SEPARATOR);
        let final_subcategory = labels.last().copied().unwrap_or_default().to_owned();
        Self {
            text: text.to_owned(),
            categories,
            final_subcategory,
            timestamp: now_timestamp(),
        }
    }

    /// A deferred annotation; path and final label both carry the sentinel.
    pub fn skipped(text: &str) -> Self {
        Self {
            text: text.to_owned(),
            categories: SKIPPED_LABEL.to_owned(),
            final_subcategory: SKIPPED_LABEL.to_owned(),
            timestamp: now_timestamp(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn categories(&self) -> &str {
        &self.categories
    }

    pub fn final_subcategory(&self) -> &str {
        &self.final_subcategory
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn is_skipped(&self) -> bool {
        self.final_subcategory == SKIPPED_LABEL
    }
}

fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}
