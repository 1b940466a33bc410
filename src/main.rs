// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Calliope CLI entrypoint.
//!
//! Loads a taxonomy configuration and a source text, optionally reconciles a previous progress
//! file, then runs the interactive annotation TUI.

use std::error::Error;
use std::path::{Path, PathBuf};

use calliope::model::Session;
use calliope::resume;
use calliope::segment::{segment, SegmentMode};
use calliope::store;
use calliope::tui;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} --config <categories.yaml> [--text] <source.txt> [--mode line|sentence] [--resume <progress.csv>] [--out-dir <dir>]\n  {program} --demo [--out-dir <dir>]\n\nThe configuration must contain a top-level `categories` key. --mode selects how the source\ntext is split into annotation units (default: line). --resume merges a previously saved\nprogress file; its texts must match the re-segmented source. Progress files are written to\n--out-dir (default: the current directory) with a timestamped, mode-stamped filename.\n\n--demo runs with a built-in taxonomy and sample text and cannot be combined with\n--config/--text/--mode/--resume."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    demo: bool,
    config: Option<String>,
    text: Option<String>,
    mode: Option<SegmentMode>,
    resume: Option<String>,
    out_dir: Option<String>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--demo" => {
                if options.demo {
                    return Err(());
                }
                options.demo = true;
            }
            "--config" => {
                if options.config.is_some() {
                    return Err(());
                }
                options.config = Some(args.next().ok_or(())?);
            }
            "--text" => {
                if options.text.is_some() {
                    return Err(());
                }
                options.text = Some(args.next().ok_or(())?);
            }
            "--mode" => {
                if options.mode.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                options.mode = Some(raw.parse().map_err(|_| ())?);
            }
            "--resume" => {
                if options.resume.is_some() {
                    return Err(());
                }
                options.resume = Some(args.next().ok_or(())?);
            }
            "--out-dir" => {
                if options.out_dir.is_some() {
                    return Err(());
                }
                options.out_dir = Some(args.next().ok_or(())?);
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.text.is_some() {
                    return Err(());
                }
                options.text = Some(arg);
            }
        }
    }

    if options.demo
        && (options.config.is_some()
            || options.text.is_some()
            || options.mode.is_some()
            || options.resume.is_some())
    {
        return Err(());
    }

    if !options.demo && (options.config.is_none() || options.text.is_none()) {
        return Err(());
    }

    Ok(options)
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "calliope".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        let out_dir = PathBuf::from(options.out_dir.unwrap_or_else(|| ".".to_owned()));

        let (session, mode) = if options.demo {
            tui::demo_session()
        } else {
            let config = options.config.expect("checked by parse_options");
            let text = options.text.expect("checked by parse_options");
            let mode = options.mode.unwrap_or_default();

            let taxonomy = store::load_taxonomy(Path::new(&config))?;
            let raw = store::read_source_text(Path::new(&text))?;
            let units = segment(&raw, mode);

            let mut session = Session::new(taxonomy);
            match options.resume {
                Some(progress) => {
                    let saved = store::read_records(Path::new(&progress))?;
                    let plan = resume::reconcile(saved, &units)?;
                    session.resume(units, plan);
                }
                None => session.load_units(units),
            }
            (session, mode)
        };

        tui::run(session, mode, out_dir)?;
        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("calliope: {err}");
        std::process::exit(1);
    }
}
