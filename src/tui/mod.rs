// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal UI.
//!
//! A thin ratatui/crossterm shell over the session core. Every key maps to one synchronous
//! session operation; failures surface as toasts and never mutate the session.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::model::{LevelView, Outcome, Phase, Session, SubMode, Taxonomy, PATH_SEPARATOR};
use crate::segment::{segment, SegmentMode};
use crate::store;

const FOCUS_COLOR: Color = Color::LightGreen;
const BREADCRUMB_COLOR: Color = Color::LightYellow;
const FOOTER_LABEL_COLOR: Color = Color::Gray;
const FOOTER_KEY_COLOR: Color = Color::Cyan;
const TOAST_COLOR: Color = Color::LightMagenta;

const DEMO_CONFIG: &str = "\
categories:
  Claim:
    types:
      - Factual
      - Opinion:
          types: [Mild, Strong]
  Question: ~
  Noise:
    types: [Greeting, Filler]
";

const DEMO_TEXT: &str = "\
Hello there!
The report was published on Tuesday.
I think the methodology is weak.
Could you forward the summary?
Anyway, moving on.
";

/// Runs the interactive annotation loop until the user quits.
pub fn run(session: Session, mode: SegmentMode, out_dir: PathBuf) -> Result<(), io::Error> {
    let mut terminal = TerminalSession::new()?;
    let mut app = App::new(session, mode, out_dir);

    while !app.should_quit {
        terminal.terminal.draw(|frame| draw(frame, &app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                _ => {}
            }
        }
    }

    Ok(())
}

/// A demo session with a built-in taxonomy and sample text.
pub fn demo_session() -> (Session, SegmentMode) {
    let taxonomy = Taxonomy::from_yaml_str(DEMO_CONFIG).expect("demo configuration is valid");
    let mut session = Session::new(taxonomy);
    session.load_units(segment(DEMO_TEXT, SegmentMode::Line));
    (session, SegmentMode::Line)
}

/// Raw-mode/alternate-screen guard; restores the terminal on drop.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self, io::Error> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
    }
}

struct App {
    session: Session,
    mode: SegmentMode,
    out_dir: PathBuf,
    cursor: usize,
    toast: Option<String>,
    should_quit: bool,
    saved_on_complete: bool,
}

impl App {
    fn new(session: Session, mode: SegmentMode, out_dir: PathBuf) -> Self {
        Self {
            session,
            mode,
            out_dir,
            cursor: 0,
            toast: None,
            should_quit: false,
            saved_on_complete: false,
        }
    }

    fn options(&self) -> Vec<String> {
        match self.session.level_options() {
            LevelView::Children(labels) => labels,
            LevelView::Leaf => Vec::new(),
        }
    }

    fn set_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(message.into());
    }

    fn handle_key(&mut self, key: KeyEvent) {
        self.toast = None;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor_up(),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor_down(),
            KeyCode::Enter => self.select_highlighted(),
            KeyCode::Backspace | KeyCode::Left => self.rewind_level(),
            KeyCode::Char('c') => self.confirm(),
            KeyCode::Char('s') => self.skip(),
            KeyCode::Char('w') => self.save(),
            _ => {}
        }
    }

    fn move_cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn move_cursor_down(&mut self) {
        let count = self.options().len();
        if count > 0 && self.cursor + 1 < count {
            self.cursor += 1;
        }
    }

    fn select_highlighted(&mut self) {
        if self.session.phase() != Phase::Annotating {
            return;
        }
        // Enter doubles as confirm once the path reaches a leaf.
        if self.session.selection_complete() {
            self.confirm();
            return;
        }
        let options = self.options();
        let Some(label) = options.get(self.cursor) else {
            return;
        };
        let level = self.session.selection_path().len();
        match self.session.select_at_level(level, label) {
            Ok(_) => self.cursor = 0,
            Err(err) => self.set_toast(err.to_string()),
        }
    }

    fn rewind_level(&mut self) {
        if self.session.pop_level().is_some() {
            self.cursor = 0;
        }
    }

    fn confirm(&mut self) {
        match self.session.confirm() {
            Ok(outcome) => self.after_advance(outcome),
            Err(err) => self.set_toast(err.to_string()),
        }
    }

    fn skip(&mut self) {
        match self.session.skip() {
            Ok(outcome) => self.after_advance(outcome),
            Err(err) => self.set_toast(err.to_string()),
        }
    }

    fn after_advance(&mut self, outcome: Outcome) {
        self.cursor = 0;
        if outcome == Outcome::Complete && !self.saved_on_complete {
            self.saved_on_complete = true;
            self.save();
        }
    }

    fn save(&mut self) {
        if self.session.records().is_empty() {
            self.set_toast("no annotations to save yet");
            return;
        }
        let path = self.out_dir.join(store::progress_filename(self.mode));
        match store::write_records(&path, self.session.records()) {
            Ok(()) => self.set_toast(format!(
                "saved {} records to {}",
                self.session.records().len(),
                path.display()
            )),
            Err(err) => self.set_toast(err.to_string()),
        }
    }
}

fn draw(frame: &mut Frame<'_>, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    draw_unit_panel(frame, app, layout[0]);
    draw_breadcrumb(frame, app, layout[1]);
    draw_options(frame, app, layout[2]);
    draw_toast(frame, app, layout[3]);
    draw_footer(frame, layout[4]);
}

fn draw_unit_panel(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let (title, text) = match app.session.phase() {
        Phase::Empty => ("No text".to_owned(), "No text loaded".to_owned()),
        Phase::Complete => (
            format!("Complete ({} units)", app.session.units().len()),
            "Annotation complete. Results saved.".to_owned(),
        ),
        Phase::Annotating => {
            let position = app.session.position();
            let total = app.session.units().len();
            let replaying = match app.session.sub_mode() {
                SubMode::ReplayingSkips => " · replaying skips",
                SubMode::Normal => "",
            };
            let text = app
                .session
                .current_unit()
                .map(|unit| unit.text().to_owned())
                .unwrap_or_default();
            (format!("Unit {}/{total}{replaying}", position + 1), text)
        }
    };

    let panel = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(panel, area);
}

fn draw_breadcrumb(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let path = app.session.selection_path();
    let content = if path.is_empty() {
        Line::from(Span::styled("(nothing chosen yet)", Style::default().fg(FOOTER_LABEL_COLOR)))
    } else {
        Line::from(Span::styled(
            path.join(PATH_SEPARATOR),
            Style::default().fg(BREADCRUMB_COLOR),
        ))
    };
    let panel = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL).title("Selection"));
    frame.render_widget(panel, area);
}

fn draw_options(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let level = app.session.selection_path().len();
    let options = app.options();

    if app.session.phase() == Phase::Annotating && app.session.selection_complete() {
        let panel = Paragraph::new("Selection complete. Press c (or enter) to confirm")
            .style(Style::default().fg(FOCUS_COLOR))
            .block(Block::default().borders(Borders::ALL).title(format!("Level {}", level + 1)));
        frame.render_widget(panel, area);
        return;
    }

    let items: Vec<ListItem<'_>> = options.iter().map(|label| ListItem::new(label.clone())).collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!("Level {}", level + 1)))
        .highlight_style(Style::default().fg(FOCUS_COLOR).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !options.is_empty() {
        state.select(Some(app.cursor.min(options.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_toast(frame: &mut Frame<'_>, app: &App, area: Rect) {
    if let Some(toast) = &app.toast {
        let line = Line::from(Span::styled(toast.clone(), Style::default().fg(TOAST_COLOR)));
        frame.render_widget(Paragraph::new(line), area);
    }
}

fn draw_footer(frame: &mut Frame<'_>, area: Rect) {
    let key = Style::default().fg(FOOTER_KEY_COLOR);
    let label = Style::default().fg(FOOTER_LABEL_COLOR);
    let hints = Line::from(vec![
        Span::styled("↑/↓", key),
        Span::styled(" move  ", label),
        Span::styled("enter", key),
        Span::styled(" select  ", label),
        Span::styled("c", key),
        Span::styled(" confirm  ", label),
        Span::styled("s", key),
        Span::styled(" skip  ", label),
        Span::styled("⌫", key),
        Span::styled(" back  ", label),
        Span::styled("w", key),
        Span::styled(" save  ", label),
        Span::styled("q", key),
        Span::styled(" quit", label),
    ]);
    frame.render_widget(Paragraph::new(hints), area);
}
