// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

/// One segmented piece of source text to be labeled.
///
/// Units are produced by the segmenter, already trimmed and non-empty, and are immutable from
/// then on. Their position in the unit sequence is the 0-based index used for resume and skip
/// bookkeeping; records reference units by text, not position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationUnit {
    text: String,
}

impl AnnotationUnit {
    /// Intended for the segmenter and tests; `text` must already be trimmed and non-empty.
    pub(crate) fn new(text: String) -> Self {
        debug_assert!(!text.is_empty());
        debug_assert_eq!(text, text.trim());
        Self { text }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for AnnotationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
