// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The annotation session state machine.
//!
//! A session walks an ordered unit sequence, one unit at a time, building a selection path
//! through the taxonomy for each. Confirm and skip share one advance rule; when resuming with a
//! skip backlog the session replays queued positions in ascending order before jumping to the
//! first never-annotated unit.

use std::collections::VecDeque;
use std::fmt;

use super::record::AnnotationRecord;
use super::taxonomy::{LevelView, Taxonomy};
use super::unit::AnnotationUnit;
use crate::resume::ResumePlan;

/// Coarse session lifecycle, derived from units and position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Empty,
    Annotating,
    Complete,
}

/// Orthogonal sub-mode of `Annotating`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubMode {
    #[default]
    Normal,
    ReplayingSkips,
}

/// What a confirm/skip produced. `Complete` signals the shell to run the implicit save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    NotAnnotating { phase: Phase },
    SelectionIncomplete,
    InvalidSelection { level: usize, label: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnnotating { phase } => {
                write!(f, "no unit to annotate (session is {phase:?})")
            }
            Self::SelectionIncomplete => write!(f, "selection path does not reach a leaf"),
            Self::InvalidSelection { level, label } => {
                write!(f, "label {label:?} is not a valid choice at level {level}")
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// The sole mutable aggregate of a run; owns the taxonomy, units, and records.
#[derive(Debug, Clone)]
pub struct Session {
    taxonomy: Taxonomy,
    units: Vec<AnnotationUnit>,
    position: usize,
    records: Vec<AnnotationRecord>,
    path: Vec<String>,
    sub_mode: SubMode,
    skip_queue: VecDeque<usize>,
}

impl Session {
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self {
            taxonomy,
            units: Vec::new(),
            position: 0,
            records: Vec::new(),
            path: Vec::new(),
            sub_mode: SubMode::Normal,
            skip_queue: VecDeque::new(),
        }
    }

    /// Replaces the unit sequence and resets all progress.
    pub fn load_units(&mut self, units: Vec<AnnotationUnit>) {
        self.units = units;
        self.position = 0;
        self.records.clear();
        self.path.clear();
        self.sub_mode = SubMode::Normal;
        self.skip_queue.clear();
    }

    /// Installs a reconciled resume plan over a fresh unit sequence.
    pub fn resume(&mut self, units: Vec<AnnotationUnit>, plan: ResumePlan) {
        let ResumePlan { records, start_position, sub_mode, skip_queue } = plan;
        self.units = units;
        self.position = start_position;
        self.records = records;
        self.path.clear();
        self.sub_mode = sub_mode;
        self.skip_queue = skip_queue.into();
    }

    pub fn phase(&self) -> Phase {
        if self.units.is_empty() {
            Phase::Empty
        } else if self.position >= self.units.len() {
            Phase::Complete
        } else {
            Phase::Annotating
        }
    }

    pub fn sub_mode(&self) -> SubMode {
        self.sub_mode
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn units(&self) -> &[AnnotationUnit] {
        &self.units
    }

    pub fn records(&self) -> &[AnnotationRecord] {
        &self.records
    }

    pub fn selection_path(&self) -> &[String] {
        &self.path
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn current_unit(&self) -> Option<&AnnotationUnit> {
        self.units.get(self.position)
    }

    /// Options for the level the user is about to choose at.
    pub fn level_options(&self) -> LevelView {
        self.taxonomy.children_of(&self.path)
    }

    /// True when the path terminates at a leaf (or at a stalled, leaf-equivalent position).
    pub fn selection_complete(&self) -> bool {
        !self.path.is_empty() && self.taxonomy.children_of(&self.path).is_terminal()
    }

    /// Truncates the selection path to `level` entries, then appends `label`.
    ///
    /// The label must be one of the taxonomy's children at that prefix; anything else leaves the
    /// path untouched. Returns the view for the extended path so callers can show either the
    /// next level or the ready-to-confirm state.
    pub fn select_at_level(
        &mut self,
        level: usize,
        label: &str,
    ) -> Result<LevelView, SessionError> {
        let level = level.min(self.path.len());
        let valid = match self.taxonomy.children_of(&self.path[..level]) {
            LevelView::Children(labels) => labels.iter().any(|l| l == label),
            LevelView::Leaf => false,
        };
        if !valid {
            return Err(SessionError::InvalidSelection { level, label: label.to_owned() });
        }

        self.path.truncate(level);
        self.path.push(label.to_owned());
        Ok(self.taxonomy.children_of(&self.path))
    }

    /// Drops the deepest selected label; rewind within the tree.
    pub fn pop_level(&mut self) -> Option<String> {
        self.path.pop()
    }

    /// Records the completed selection for the current unit and advances.
    pub fn confirm(&mut self) -> Result<Outcome, SessionError> {
        let unit = match self.current_unit() {
            Some(unit) => unit,
            None => return Err(SessionError::NotAnnotating { phase: self.phase() }),
        };
        if !self.selection_complete() {
            return Err(SessionError::SelectionIncomplete);
        }

        let record = AnnotationRecord::completed(unit.text(), &self.path);
        self.records.push(record);
        self.path.clear();
        Ok(self.advance())
    }

    /// Defers the current unit with a `SKIPPED` record and advances.
    pub fn skip(&mut self) -> Result<Outcome, SessionError> {
        let unit = match self.current_unit() {
            Some(unit) => unit,
            None => return Err(SessionError::NotAnnotating { phase: self.phase() }),
        };

        let record = AnnotationRecord::skipped(unit.text());
        self.records.push(record);
        self.path.clear();
        Ok(self.advance())
    }

    /// Shared advance rule.
    ///
    /// Replaying skips: pop the next queued position; once the queue is exhausted, fall back to
    /// normal mode at the first unit whose text is absent from the records. Normal mode simply
    /// steps forward by one.
    fn advance(&mut self) -> Outcome {
        match self.sub_mode {
            SubMode::ReplayingSkips => match self.skip_queue.pop_front() {
                Some(next) => self.position = next,
                None => {
                    self.sub_mode = SubMode::Normal;
                    self.position = self.first_unannotated().unwrap_or(self.units.len());
                }
            },
            SubMode::Normal => self.position += 1,
        }

        if self.position >= self.units.len() {
            Outcome::Complete
        } else {
            Outcome::Continue
        }
    }

    fn first_unannotated(&self) -> Option<usize> {
        self.units
            .iter()
            .position(|unit| !self.records.iter().any(|r| r.text() == unit.text()))
    }
}

#[cfg(test)]
mod tests {
    use super::{Outcome, Phase, Session, SessionError, SubMode};
    use crate::model::record::SKIPPED_LABEL;
    use crate::model::taxonomy::{LevelView, Taxonomy};
    use crate::resume::ResumePlan;
    use crate::segment::{segment, SegmentMode};

    fn taxonomy() -> Taxonomy {
        Taxonomy::from_yaml_str(
            "categories:\n  A:\n    types: [B, C]\n  D:\n    types:\n      - E:\n          types: [F]\n",
        )
        .expect("build taxonomy")
    }

    fn session_with(text: &str) -> Session {
        let mut session = Session::new(taxonomy());
        session.load_units(segment(text, SegmentMode::Line));
        session
    }

    #[test]
    fn starts_empty() {
        let session = Session::new(taxonomy());
        assert_eq!(session.phase(), Phase::Empty);
        assert!(session.current_unit().is_none());
    }

    #[test]
    fn load_units_resets_state() {
        let mut session = session_with("one\ntwo\n");
        session.select_at_level(0, "A").expect("select");
        session.load_units(segment("three\n", SegmentMode::Line));

        assert_eq!(session.phase(), Phase::Annotating);
        assert_eq!(session.position(), 0);
        assert!(session.selection_path().is_empty());
        assert!(session.records().is_empty());
        assert_eq!(session.sub_mode(), SubMode::Normal);
    }

    #[test]
    fn select_walks_levels_and_completes_at_leaf() {
        let mut session = session_with("x\n");

        let view = session.select_at_level(0, "A").expect("select A");
        assert_eq!(view, LevelView::Children(vec!["B".into(), "C".into()]));
        assert!(!session.selection_complete());

        let view = session.select_at_level(1, "B").expect("select B");
        assert_eq!(view, LevelView::Leaf);
        assert!(session.selection_complete());
    }

    #[test]
    fn select_truncates_deeper_levels() {
        let mut session = session_with("x\n");
        session.select_at_level(0, "D").expect("select D");
        session.select_at_level(1, "E").expect("select E");
        session.select_at_level(2, "F").expect("select F");

        session.select_at_level(0, "A").expect("reselect at root");
        assert_eq!(session.selection_path(), ["A"]);
        assert!(!session.selection_complete());
    }

    #[test]
    fn select_rejects_labels_the_taxonomy_would_reject() {
        let mut session = session_with("x\n");
        let err = session.select_at_level(0, "Nope").unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidSelection { level: 0, label: "Nope".into() }
        );
        assert!(session.selection_path().is_empty());

        session.select_at_level(0, "A").expect("select A");
        session.select_at_level(1, "B").expect("select B");
        // B is a leaf; nothing can be selected beneath it.
        session.select_at_level(2, "anything").unwrap_err();
        assert_eq!(session.selection_path(), ["A", "B"]);
    }

    #[test]
    fn pop_level_rewinds_the_path() {
        let mut session = session_with("x\n");
        session.select_at_level(0, "A").expect("select A");
        session.select_at_level(1, "B").expect("select B");

        assert_eq!(session.pop_level().as_deref(), Some("B"));
        assert_eq!(session.selection_path(), ["A"]);
        assert!(!session.selection_complete());
        assert_eq!(session.pop_level().as_deref(), Some("A"));
        assert_eq!(session.pop_level(), None);
    }

    #[test]
    fn confirm_requires_complete_selection() {
        let mut session = session_with("x\n");
        assert_eq!(session.confirm().unwrap_err(), SessionError::SelectionIncomplete);

        session.select_at_level(0, "A").expect("select A");
        assert_eq!(session.confirm().unwrap_err(), SessionError::SelectionIncomplete);
    }

    #[test]
    fn confirm_records_and_advances() {
        let mut session = session_with("x\ny\n");
        session.select_at_level(0, "A").expect("select A");
        session.select_at_level(1, "B").expect("select B");

        assert_eq!(session.confirm().expect("confirm"), Outcome::Continue);
        assert_eq!(session.position(), 1);
        assert!(session.selection_path().is_empty());

        let record = &session.records()[0];
        assert_eq!(record.text(), "x");
        assert_eq!(record.categories(), "A > B");
        assert_eq!(record.final_subcategory(), "B");
    }

    #[test]
    fn skip_needs_no_selection_and_advances() {
        let mut session = session_with("x\ny\n");
        assert_eq!(session.skip().expect("skip"), Outcome::Continue);
        assert_eq!(session.position(), 1);

        let record = &session.records()[0];
        assert_eq!(record.final_subcategory(), SKIPPED_LABEL);
        assert_eq!(record.categories(), SKIPPED_LABEL);
    }

    #[test]
    fn normal_mode_position_is_strictly_monotonic() {
        let mut session = session_with("a\nb\nc\nd\n");
        let mut previous = session.position();
        for _ in 0..3 {
            session.skip().expect("skip");
            assert_eq!(session.position(), previous + 1);
            previous = session.position();
        }
    }

    #[test]
    fn completing_the_last_unit_reports_complete() {
        let mut session = session_with("x\ny\n");
        session.select_at_level(0, "A").expect("select");
        session.select_at_level(1, "B").expect("select");
        assert_eq!(session.confirm().expect("confirm"), Outcome::Continue);

        assert_eq!(session.skip().expect("skip"), Outcome::Complete);
        assert_eq!(session.phase(), Phase::Complete);
        assert!(session.current_unit().is_none());
        assert!(session.confirm().is_err());
        assert!(session.skip().is_err());
    }

    #[test]
    fn replay_visits_queued_positions_in_order_then_jumps() {
        let units = segment("u0\nu1\nu2\nu3\nu4\nu5\nu6\nu7\n", SegmentMode::Line);
        let mut session = Session::new(taxonomy());
        // Units 0 and 1 were completed in a previous run; 2, 5, and 7 were skipped; the walk
        // stopped before ever reaching 3, 4, and 6.
        let records = vec![
            crate::model::AnnotationRecord::completed("u0", &["A", "B"]),
            crate::model::AnnotationRecord::completed("u1", &["A", "C"]),
        ];
        session.resume(
            units,
            ResumePlan {
                records,
                start_position: 2,
                sub_mode: SubMode::ReplayingSkips,
                skip_queue: vec![5, 7],
            },
        );

        assert_eq!(session.position(), 2);
        assert_eq!(session.sub_mode(), SubMode::ReplayingSkips);

        session.select_at_level(0, "A").expect("select");
        session.select_at_level(1, "B").expect("select");
        session.confirm().expect("confirm u2");
        assert_eq!(session.position(), 5);

        session.select_at_level(0, "A").expect("select");
        session.select_at_level(1, "B").expect("select");
        session.confirm().expect("confirm u5");
        assert_eq!(session.position(), 7);

        session.select_at_level(0, "A").expect("select");
        session.select_at_level(1, "B").expect("select");
        session.confirm().expect("confirm u7");

        // Queue exhausted: back to normal mode at the earliest never-annotated unit.
        assert_eq!(session.sub_mode(), SubMode::Normal);
        assert_eq!(session.position(), 3);
    }

    #[test]
    fn replay_completes_when_nothing_remains() {
        let units = segment("u0\nu1\n", SegmentMode::Line);
        let mut session = Session::new(taxonomy());
        let records = vec![crate::model::AnnotationRecord::completed("u0", &["A", "B"])];
        session.resume(
            units,
            ResumePlan {
                records,
                start_position: 1,
                sub_mode: SubMode::ReplayingSkips,
                skip_queue: Vec::new(),
            },
        );

        session.select_at_level(0, "A").expect("select");
        session.select_at_level(1, "C").expect("select");
        assert_eq!(session.confirm().expect("confirm"), Outcome::Complete);
        assert_eq!(session.phase(), Phase::Complete);
    }

    #[test]
    fn skipping_again_during_replay_keeps_the_unit_annotated_for_the_jump() {
        let units = segment("u0\nu1\nu2\n", SegmentMode::Line);
        let mut session = Session::new(taxonomy());
        session.resume(
            units,
            ResumePlan {
                records: vec![crate::model::AnnotationRecord::completed("u0", &["A", "B"])],
                start_position: 1,
                sub_mode: SubMode::ReplayingSkips,
                skip_queue: Vec::new(),
            },
        );

        // Re-skip the replayed unit: a fresh SKIPPED record is appended, so the
        // first-unannotated jump moves past it to u2.
        session.skip().expect("skip");
        assert_eq!(session.sub_mode(), SubMode::Normal);
        assert_eq!(session.position(), 2);
        assert!(session.records()[1].is_skipped());
    }

    #[test]
    fn confirm_never_removes_an_earlier_skipped_record() {
        let mut session = session_with("x\nx\n");
        session.skip().expect("skip first x");

        session.select_at_level(0, "A").expect("select");
        session.select_at_level(1, "B").expect("select");
        session.confirm().expect("confirm second x");

        // Both the SKIPPED row and the resolved row persist for the same text.
        assert_eq!(session.records().len(), 2);
        assert!(session.records()[0].is_skipped());
        assert!(!session.records()[1].is_skipped());
        assert_eq!(session.records()[0].text(), session.records()[1].text());
    }
}
