// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Calliope: terminal text annotation against hierarchical taxonomies.
//!
//! The core (model, segmenter, reconciler, store) is display-independent; the TUI shell in
//! [`tui`] drives it through discrete synchronous operations.

pub mod model;
pub mod resume;
pub mod segment;
pub mod store;
pub mod tui;
