// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Reconciles saved progress with a freshly re-segmented source.
//!
//! Records reference units by text, so the chosen source file must re-segment to a sequence
//! containing every saved text verbatim; anything else means the user picked the wrong file and
//! the whole resume attempt is discarded.

use std::fmt;

use crate::model::{AnnotationRecord, AnnotationUnit, SubMode};

/// How to initialize a session from saved progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumePlan {
    /// Records the session starts with. When skips are being replayed this holds only the
    /// completed ones; the stale `SKIPPED` rows live on in the old progress file.
    pub records: Vec<AnnotationRecord>,
    pub start_position: usize,
    pub sub_mode: SubMode,
    /// Positions still to replay after `start_position`, ascending.
    pub skip_queue: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentError {
    text: String,
}

impl AlignmentError {
    /// The saved text that has no matching unit.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for AlignmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "saved progress does not match the selected text: no unit with text {:?}",
            self.text
        )
    }
}

impl std::error::Error for AlignmentError {}

/// Merges saved records with a fresh unit sequence into a [`ResumePlan`].
///
/// Skipped records are replayed in ascending unit order before any never-seen unit; with no
/// skips the walk resumes right after the last saved record, relying on the prior run's 1:1
/// ordering.
pub fn reconcile(
    saved: Vec<AnnotationRecord>,
    units: &[AnnotationUnit],
) -> Result<ResumePlan, AlignmentError> {
    let mut skip_positions = Vec::new();

    for record in &saved {
        let position = units
            .iter()
            .position(|unit| unit.text() == record.text())
            .ok_or_else(|| AlignmentError { text: record.text().to_owned() })?;
        if record.is_skipped() {
            skip_positions.push(position);
        }
    }

    if skip_positions.is_empty() {
        let start_position = saved.len();
        return Ok(ResumePlan {
            records: saved,
            start_position,
            sub_mode: SubMode::Normal,
            skip_queue: Vec::new(),
        });
    }

    skip_positions.sort_unstable();
    skip_positions.dedup();

    let start_position = skip_positions[0];
    let skip_queue = skip_positions.split_off(1);
    let records = saved.into_iter().filter(|record| !record.is_skipped()).collect();

    Ok(ResumePlan {
        records,
        start_position,
        sub_mode: SubMode::ReplayingSkips,
        skip_queue,
    })
}
