// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The progress-file format: one CSV row per annotation record.
//!
//! Columns are fixed (`text,categories,final_subcategory,timestamp`); a file missing any of
//! them is rejected. Unit text may contain commas, quotes, or embedded newlines, so fields are
//! quoted RFC-4180 style. Writes go through a temp file and rename so a failed save never
//! truncates an existing progress file.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::model::{AnnotationRecord, ConfigError, Taxonomy};
use crate::segment::SegmentMode;

const COLUMNS: [&str; 4] = ["text", "categories", "final_subcategory", "timestamp"];

#[derive(Debug)]
pub enum StoreError {
    Io { path: PathBuf, source: io::Error },
    Format { path: PathBuf, line: usize, message: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Format { path, line, message } => {
                write!(f, "malformed progress file {path:?} (line {line}): {message}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Format { .. } => None,
        }
    }
}

/// Progress filename embedding the current timestamp and segmentation mode, e.g.
/// `annotations_20260830_142500_line.csv`. The mode stamp keeps differently-segmented sessions
/// from colliding.
pub fn progress_filename(mode: SegmentMode) -> String {
    format!("annotations_{}_{}.csv", Local::now().format("%Y%m%d_%H%M%S"), mode.as_str())
}

/// Writes all records as CSV, atomically.
pub fn write_records(path: &Path, records: &[AnnotationRecord]) -> Result<(), StoreError> {
    let mut out = String::new();
    out.push_str(&COLUMNS.join(","));
    out.push('\n');
    for record in records {
        out.push_str(&csv_escape(record.text()));
        out.push(',');
        out.push_str(&csv_escape(record.categories()));
        out.push(',');
        out.push_str(&csv_escape(record.final_subcategory()));
        out.push(',');
        out.push_str(&csv_escape(record.timestamp()));
        out.push('\n');
    }

    write_atomic(path, out.as_bytes())
        .map_err(|source| StoreError::Io { path: path.to_path_buf(), source })
}

/// Reads a progress file back into records.
///
/// Column order is not significant, but all four columns must be present.
pub fn read_records(path: &Path) -> Result<Vec<AnnotationRecord>, StoreError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| StoreError::Io { path: path.to_path_buf(), source })?;

    let rows = parse_csv(&raw).map_err(|(line, message)| StoreError::Format {
        path: path.to_path_buf(),
        line,
        message,
    })?;

    let mut rows = rows.into_iter();
    let header = rows.next().ok_or_else(|| StoreError::Format {
        path: path.to_path_buf(),
        line: 1,
        message: "empty file, no header".to_owned(),
    })?;

    let mut indices = [0usize; COLUMNS.len()];
    for (slot, column) in indices.iter_mut().zip(COLUMNS) {
        *slot = header.iter().position(|h| h == column).ok_or_else(|| StoreError::Format {
            path: path.to_path_buf(),
            line: 1,
            message: format!("missing column {column:?}"),
        })?;
    }

    let mut records = Vec::new();
    for (row_index, row) in rows.enumerate() {
        if row.len() != header.len() {
            return Err(StoreError::Format {
                path: path.to_path_buf(),
                line: row_index + 2,
                message: format!("expected {} fields, found {}", header.len(), row.len()),
            });
        }
        let [text, categories, final_subcategory, timestamp] =
            indices.map(|i| row[i].clone());
        records.push(AnnotationRecord::new(text, categories, final_subcategory, timestamp));
    }

    Ok(records)
}

/// Reads the raw source text to be segmented.
pub fn read_source_text(path: &Path) -> Result<String, StoreError> {
    fs::read_to_string(path).map_err(|source| StoreError::Io { path: path.to_path_buf(), source })
}

/// Loads and normalizes a taxonomy configuration file.
pub fn load_taxonomy(path: &Path) -> Result<Taxonomy, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    Taxonomy::from_yaml_str(&raw)
}

fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

/// Minimal RFC-4180 reader: quoted fields may contain delimiters, doubled quotes, and
/// newlines. Carriage returns outside quotes are dropped so CRLF files read cleanly.
fn parse_csv(raw: &str) -> Result<Vec<Vec<String>>, (usize, String)> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1usize;

    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                '\n' => {
                    field.push('\n');
                    line += 1;
                }
                other => field.push(other),
            }
            continue;
        }

        match ch {
            '"' if field.is_empty() => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                line += 1;
                row.push(std::mem::take(&mut field));
                if row.len() > 1 || !row[0].is_empty() {
                    rows.push(std::mem::take(&mut row));
                } else {
                    row.clear();
                }
            }
            other => field.push(other),
        }
    }

    if in_quotes {
        return Err((line, "unterminated quoted field".to_owned()));
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    Ok(rows)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, bytes)?;
    match fs::rename(&tmp_path, path) {
        Ok(()) => Ok(()),
        Err(err) => {
            let _ = fs::remove_file(&tmp_path);
            Err(err)
        }
    }
}
