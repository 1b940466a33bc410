// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Splits raw source text into ordered annotation units.
//!
//! Splitting is purely lexical; `Sentence` mode cuts on the literal period character and makes
//! no attempt at real sentence-boundary detection. Determinism is load-bearing: resume matching
//! relies on re-segmenting the same file producing the same sequence.

use std::fmt;
use std::str::FromStr;

use crate::model::AnnotationUnit;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SegmentMode {
    #[default]
    Line,
    Sentence,
}

impl SegmentMode {
    fn delimiter(self) -> char {
        match self {
            Self::Line => '\n',
            Self::Sentence => '.',
        }
    }

    /// Short name used in CLI flags and progress filenames.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Sentence => "sentence",
        }
    }
}

impl fmt::Display for SegmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSegmentModeError {
    value: String,
}

impl fmt::Display for ParseSegmentModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown segmentation mode {:?} (expected 'line' or 'sentence')", self.value)
    }
}

impl std::error::Error for ParseSegmentModeError {}

impl FromStr for SegmentMode {
    type Err = ParseSegmentModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "line" => Ok(Self::Line),
            "sentence" => Ok(Self::Sentence),
            other => Err(ParseSegmentModeError { value: other.to_owned() }),
        }
    }
}

/// Splits `text` on the mode's delimiter, trims each piece, and drops empty results.
pub fn segment(text: &str, mode: SegmentMode) -> Vec<AnnotationUnit> {
    text.split(mode.delimiter())
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(|piece| AnnotationUnit::new(piece.to_owned()))
        .collect()
}
