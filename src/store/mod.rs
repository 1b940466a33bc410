// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence: progress CSV files and taxonomy configuration loading.

pub mod progress_file;

pub use progress_file::{
    load_taxonomy, progress_filename, read_records, read_source_text, write_records, StoreError,
};
