// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! Sessions own a taxonomy, a sequence of annotation units, and the records produced so far.

pub mod record;
pub mod session;
pub mod taxonomy;
pub mod unit;

pub use record::{AnnotationRecord, PATH_SEPARATOR, SKIPPED_LABEL, TIMESTAMP_FORMAT};
pub use session::{Outcome, Phase, Session, SubMode};
pub use taxonomy::{CategoryNode, ConfigError, LevelView, Taxonomy};
pub use unit::AnnotationUnit;
