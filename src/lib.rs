use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use std::sync::mpsc::Sender;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use ratatui::widgets::{Block, Borders, Paragraph};
use tui_textarea::TextArea;

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod nav;
pub mod normalize;
pub mod ops;
pub mod pipeline;
pub mod registry;
pub mod scope;
pub mod script;
pub mod source;
pub mod widgets;

pub use cli::Args;
pub use config::{AppConfig, ConfigManager};
pub use error::{OpError, OpResult};
pub use nav::{Nav, NavOutcome, Page};
pub use ops::{ArithOp, CustomColumnSpec};
pub use pipeline::{apply_operation, run_script, ApplyReport, Session};
pub use registry::{OpKind, Section};
pub use script::{QueryScriptEngine, ScriptEngine};

use widgets::menu::{render_menu, render_picker};
use widgets::preview::render_preview;

/// Application name used for the config directory and other app paths
pub const APP_NAME: &str = "tabclean";

pub enum AppEvent {
    Key(KeyEvent),
    Open(PathBuf),
    Exit,
    Resize(u16, u16),
}

#[derive(Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    PickingColumns,
    EditingScript,
    CustomForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

struct StatusLine {
    level: StatusLevel,
    text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CustomFocus {
    Left,
    Operator,
    Right,
    Name,
}

impl CustomFocus {
    fn next(self) -> Self {
        match self {
            Self::Left => Self::Operator,
            Self::Operator => Self::Right,
            Self::Right => Self::Name,
            Self::Name => Self::Left,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Left => Self::Name,
            Self::Operator => Self::Left,
            Self::Right => Self::Operator,
            Self::Name => Self::Right,
        }
    }
}

/// State of the "Create Custom Column" form.
struct CustomForm {
    left: usize,
    right: usize,
    op: usize,
    name: String,
    focus: CustomFocus,
}

impl Default for CustomForm {
    fn default() -> Self {
        Self {
            left: 0,
            right: 0,
            op: 0,
            name: String::new(),
            focus: CustomFocus::Left,
        }
    }
}

pub struct App {
    events: Sender<AppEvent>,
    pub session: Session,
    pub nav: Nav,
    pub config: AppConfig,
    pub input_mode: InputMode,
    group_cursor: usize,
    op_cursor: usize,
    picker_cursor: usize,
    picker_checked: Vec<bool>,
    /// Honored only by operations that support the toggle.
    inplace: bool,
    script: TextArea<'static>,
    custom_form: CustomForm,
    status: Option<StatusLine>,
    suggestions: Vec<&'static str>,
    load_path: Option<PathBuf>,
    delimiter: Option<u8>,
    has_header: bool,
}

impl App {
    pub fn new(events: Sender<AppEvent>, config: AppConfig) -> Self {
        let mut script = TextArea::default();
        script.set_block(
            Block::default()
                .borders(Borders::ALL)
                .title("Script  (F5 run | Esc close)"),
        );
        Self {
            events,
            session: Session::new(),
            nav: Nav::new(),
            config,
            input_mode: InputMode::Normal,
            group_cursor: 0,
            op_cursor: 0,
            picker_cursor: 0,
            picker_checked: Vec::new(),
            inplace: true,
            script,
            custom_form: CustomForm::default(),
            status: None,
            suggestions: Vec::new(),
            load_path: None,
            delimiter: None,
            has_header: true,
        }
    }

    pub fn set_open_options(&mut self, path: Option<PathBuf>, delimiter: Option<u8>, has_header: bool) {
        self.load_path = path;
        self.delimiter = delimiter;
        self.has_header = has_header;
    }

    pub fn events(&self) -> Sender<AppEvent> {
        self.events.clone()
    }

    fn set_status(&mut self, level: StatusLevel, text: impl Into<String>) {
        self.status = Some(StatusLine {
            level,
            text: text.into(),
        });
    }

    fn section(&self) -> Section {
        self.nav.page.section()
    }

    fn column_names(&self) -> Vec<String> {
        self.session
            .df
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect()
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Open(path) => {
                match source::load_dataset(path, self.delimiter, self.has_header) {
                    Ok(df) => {
                        self.session.load(df);
                        let (rows, cols) = self.session.shape();
                        self.set_status(
                            StatusLevel::Success,
                            format!("Loaded {} ({rows} rows x {cols} cols)", path.display()),
                        );
                        self.nav.goto(Page::CleaningMenu, true);
                    }
                    Err(e) => {
                        self.set_status(StatusLevel::Error, format!("Load failed: {e}"));
                    }
                }
                None
            }
            AppEvent::Exit | AppEvent::Resize(_, _) => None,
        }
    }

    fn key(&mut self, key: &KeyEvent) -> Option<AppEvent> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(AppEvent::Exit);
        }
        match self.input_mode {
            InputMode::EditingScript => self.script_key(key),
            InputMode::PickingColumns => self.picker_key(key),
            InputMode::CustomForm => self.form_key(key),
            InputMode::Normal => self.normal_key(key),
        }
    }

    fn normal_key(&mut self, key: &KeyEvent) -> Option<AppEvent> {
        match key.code {
            KeyCode::Char('q') => return Some(AppEvent::Exit),
            KeyCode::Char('n') | KeyCode::Right => {
                self.navigate_forward();
                return None;
            }
            KeyCode::Char('b') | KeyCode::Left => {
                self.navigate_backward();
                return None;
            }
            _ => {}
        }

        match self.nav.page {
            Page::Upload => match key.code {
                KeyCode::Enter => match self.load_path.clone() {
                    Some(path) => return Some(AppEvent::Open(path)),
                    None => self.set_status(
                        StatusLevel::Warning,
                        "No file path given. Start with: tabclean <file>",
                    ),
                },
                _ => {}
            },
            Page::CleaningMenu | Page::TransformMenu => self.menu_key(key),
            Page::Operation | Page::TransformOperation => self.operation_key(key),
            Page::Visualize => match key.code {
                KeyCode::Char('e') => self.export_dataset(),
                _ => {}
            },
        }
        None
    }

    fn menu_key(&mut self, key: &KeyEvent) {
        let names = registry::group_names(self.section());
        match key.code {
            KeyCode::Up => {
                self.group_cursor = self.group_cursor.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.group_cursor + 1 < names.len() {
                    self.group_cursor += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(name) = names.get(self.group_cursor).copied() {
                    self.select_group(name);
                }
            }
            KeyCode::Char(c @ '1'..='9') => {
                let idx = (c as usize) - ('1' as usize);
                if let Some(name) = self.suggestions.get(idx).copied() {
                    self.select_group(name);
                }
            }
            _ => {}
        }
    }

    fn select_group(&mut self, name: &str) {
        if self.config.behavior.clear_selection_on_group_switch
            && self.nav.group.as_deref() != Some(name)
        {
            self.session.selection.clear();
        }
        self.nav.group = Some(name.to_string());
        let target = match self.nav.page {
            Page::TransformMenu | Page::TransformOperation => Page::TransformOperation,
            _ => Page::Operation,
        };
        match self.nav.goto(target, self.session.has_data()) {
            NavOutcome::Moved(_) => {
                self.op_cursor = 0;
                self.suggestions.clear();
                self.status = None;
            }
            NavOutcome::Denied { reason, .. } => {
                self.set_status(StatusLevel::Warning, reason);
            }
            NavOutcome::Suggest(suggestions) => {
                let hint = if suggestions.is_empty() {
                    "Unknown group.".to_string()
                } else {
                    format!("Unknown group. Did you mean: {}?", suggestions.join(", "))
                };
                self.suggestions = suggestions;
                self.set_status(StatusLevel::Warning, hint);
            }
        }
    }

    fn navigate_forward(&mut self) {
        let outcome = self.nav.forward(self.session.has_data());
        self.navigation_outcome(outcome);
    }

    fn navigate_backward(&mut self) {
        let outcome = self.nav.backward(self.session.has_data());
        self.navigation_outcome(outcome);
    }

    fn navigation_outcome(&mut self, outcome: NavOutcome) {
        match outcome {
            NavOutcome::Moved(_) => {
                self.group_cursor = 0;
                self.op_cursor = 0;
                self.suggestions.clear();
            }
            NavOutcome::Denied { reason, .. } => {
                self.set_status(StatusLevel::Warning, reason);
            }
            NavOutcome::Suggest(suggestions) => {
                let hint = format!("Unknown group. Did you mean: {}?", suggestions.join(", "));
                self.suggestions = suggestions;
                self.set_status(StatusLevel::Warning, hint);
            }
        }
    }

    fn operation_key(&mut self, key: &KeyEvent) {
        let Some(group) = self.nav.group.clone() else {
            return;
        };
        let Some(group_entry) = registry::group(self.section(), &group) else {
            return;
        };
        match key.code {
            KeyCode::Up => {
                self.op_cursor = self.op_cursor.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.op_cursor + 1 < group_entry.ops.len() {
                    self.op_cursor += 1;
                }
            }
            KeyCode::Enter => self.apply_current(),
            KeyCode::Char('c') => self.open_picker(),
            KeyCode::Char('i') => {
                self.inplace = !self.inplace;
                let state = if self.inplace { "in place" } else { "new columns" };
                self.set_status(StatusLevel::Info, format!("Results go {state}"));
            }
            KeyCode::Char('s') => {
                self.input_mode = InputMode::EditingScript;
            }
            _ => {}
        }
    }

    fn apply_current(&mut self) {
        let Some(group) = self.nav.group.clone() else {
            return;
        };
        let section = self.section();
        let Some(descriptor) =
            registry::group(section, &group).and_then(|g| g.ops.get(self.op_cursor))
        else {
            return;
        };
        if descriptor.label == "Create Custom Column" {
            self.open_custom_form();
            return;
        }
        let label = descriptor.label;
        match apply_operation(&mut self.session, section, &group, label, self.inplace, None) {
            Ok(report) => self.report_status(&report),
            Err(e) => self.set_status(StatusLevel::Error, e.to_string()),
        }
    }

    fn report_status(&mut self, report: &ApplyReport) {
        if !report.display {
            self.session.last_result = None;
        }
        let mut text = if report.display {
            format!("Output ready for '{}'", report.label)
        } else if report.shape_changed() {
            let (r0, c0) = report.shape_before;
            let (r1, c1) = report.shape_after;
            format!(
                "'{}' applied: {r0}x{c0} -> {r1}x{c1}",
                report.label
            )
        } else {
            format!("'{}' applied", report.label)
        };
        if report.warnings.is_empty() {
            self.set_status(StatusLevel::Success, text);
        } else {
            text.push_str(" | ");
            text.push_str(&report.warnings.join("; "));
            self.set_status(StatusLevel::Warning, text);
        }
    }

    fn open_picker(&mut self) {
        if !self.session.has_data() {
            self.set_status(StatusLevel::Warning, "No dataset loaded. Load data first.");
            return;
        }
        let names = self.column_names();
        self.picker_checked = names
            .iter()
            .map(|n| self.session.selection.contains(n))
            .collect();
        self.picker_cursor = 0;
        self.input_mode = InputMode::PickingColumns;
    }

    fn picker_key(&mut self, key: &KeyEvent) -> Option<AppEvent> {
        let count = self.picker_checked.len();
        match key.code {
            KeyCode::Up => {
                self.picker_cursor = self.picker_cursor.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.picker_cursor + 1 < count {
                    self.picker_cursor += 1;
                }
            }
            KeyCode::Char(' ') => {
                if let Some(flag) = self.picker_checked.get_mut(self.picker_cursor) {
                    *flag = !*flag;
                }
            }
            KeyCode::Enter => {
                let names = self.column_names();
                self.session.selection = names
                    .into_iter()
                    .zip(&self.picker_checked)
                    .filter(|(_, checked)| **checked)
                    .map(|(name, _)| name)
                    .collect();
                let summary = if self.session.selection.is_empty() {
                    "Selection cleared; operations use their default scope".to_string()
                } else {
                    format!("Selected columns: {}", self.session.selection.join(", "))
                };
                self.set_status(StatusLevel::Info, summary);
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
            }
            _ => {}
        }
        None
    }

    fn script_key(&mut self, key: &KeyEvent) -> Option<AppEvent> {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
            }
            KeyCode::F(5) => self.run_current_script(),
            _ => {
                self.script.input(*key);
            }
        }
        None
    }

    fn run_current_script(&mut self) {
        let source = self
            .script
            .lines()
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" | ");
        let engine = QueryScriptEngine;
        match run_script(&mut self.session, &engine, &source) {
            Ok(report) => {
                self.input_mode = InputMode::Normal;
                self.report_status(&report);
            }
            Err(e) => {
                // Dataset untouched; leave the editor open for a fix.
                self.set_status(StatusLevel::Error, e.to_string());
            }
        }
    }

    fn open_custom_form(&mut self) {
        if self.session.df.width() == 0 {
            self.set_status(StatusLevel::Warning, "No dataset loaded. Load data first.");
            return;
        }
        self.custom_form = CustomForm::default();
        self.input_mode = InputMode::CustomForm;
    }

    fn form_key(&mut self, key: &KeyEvent) -> Option<AppEvent> {
        let columns = self.column_names();
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => self.submit_custom_form(&columns),
            KeyCode::Tab => self.custom_form.focus = self.custom_form.focus.next(),
            KeyCode::BackTab => self.custom_form.focus = self.custom_form.focus.prev(),
            KeyCode::Up | KeyCode::Down => {
                let step = |idx: usize, len: usize, up: bool| {
                    if len == 0 {
                        0
                    } else if up {
                        (idx + len - 1) % len
                    } else {
                        (idx + 1) % len
                    }
                };
                let up = key.code == KeyCode::Up;
                let form = &mut self.custom_form;
                match form.focus {
                    CustomFocus::Left => form.left = step(form.left, columns.len(), up),
                    CustomFocus::Right => form.right = step(form.right, columns.len(), up),
                    CustomFocus::Operator => form.op = step(form.op, ArithOp::ALL.len(), up),
                    CustomFocus::Name => {}
                }
            }
            KeyCode::Char(c) if self.custom_form.focus == CustomFocus::Name => {
                self.custom_form.name.push(c)
            }
            KeyCode::Backspace if self.custom_form.focus == CustomFocus::Name => {
                self.custom_form.name.pop();
            }
            _ => {}
        }
        None
    }

    fn submit_custom_form(&mut self, columns: &[String]) {
        let form = &self.custom_form;
        if form.name.trim().is_empty() {
            self.set_status(StatusLevel::Warning, "Give the new column a name first");
            return;
        }
        let (Some(left), Some(right)) = (columns.get(form.left), columns.get(form.right)) else {
            return;
        };
        let spec = CustomColumnSpec {
            left: left.clone(),
            right: right.clone(),
            op: ArithOp::ALL[form.op % ArithOp::ALL.len()],
            name: form.name.trim().to_string(),
        };
        let outcome = apply_operation(
            &mut self.session,
            Section::Transform,
            "Create a New Column",
            "Create Custom Column",
            true,
            Some(spec),
        );
        self.input_mode = InputMode::Normal;
        match outcome {
            Ok(report) => self.report_status(&report),
            Err(e) => self.set_status(StatusLevel::Error, e.to_string()),
        }
    }

    fn export_dataset(&mut self) {
        if !self.session.has_data() {
            self.set_status(StatusLevel::Warning, "No dataset loaded. Load data first.");
            return;
        }
        let dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        match export::export_to_dir(&self.session.df, &dir, &self.config.export.stem) {
            Ok(path) => {
                self.set_status(StatusLevel::Success, format!("Exported to {}", path.display()))
            }
            Err(e) => self.set_status(StatusLevel::Error, format!("Export failed: {e}")),
        }
    }

    fn controls_hint(&self) -> String {
        match self.input_mode {
            InputMode::PickingColumns => {
                "up/down move | space toggle | enter apply | esc cancel".to_string()
            }
            InputMode::EditingScript => "type script | F5 run | esc close".to_string(),
            InputMode::CustomForm => {
                "tab field | up/down change | type name | enter create | esc cancel".to_string()
            }
            InputMode::Normal => match self.nav.page {
                Page::Upload => "enter load | n next | q quit".to_string(),
                Page::CleaningMenu | Page::TransformMenu => {
                    "up/down move | enter open group | n next | b back | q quit".to_string()
                }
                Page::Operation | Page::TransformOperation => {
                    "enter apply | c columns | i inplace | s script | n next | b back | q quit"
                        .to_string()
                }
                Page::Visualize => "e export | b back | q quit".to_string(),
            },
        }
    }

    fn selection_summary(&self) -> String {
        if self.session.selection.is_empty() {
            let (_, cols) = self.session.shape();
            format!("Columns: default scope ({cols} available)")
        } else {
            format!("Columns: {}", self.session.selection.join(", "))
        }
    }

    fn render_upload(&self, area: Rect, buf: &mut Buffer) {
        let path_line = match &self.load_path {
            Some(path) => format!("File: {}", path.display()),
            None => "No file supplied on the command line".to_string(),
        };
        let loaded = if self.session.has_data() {
            let (rows, cols) = self.session.shape();
            format!("Current dataset: {rows} rows x {cols} cols")
        } else {
            "No dataset loaded".to_string()
        };
        let text = format!("{path_line}\n{loaded}\n\nPress Enter to load the file.");
        let para = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Load Data"));
        Widget::render(para, area, buf);
    }

    fn render_data_pane(&self, area: Rect, buf: &mut Buffer) {
        if let Some(result) = &self.session.last_result {
            render_preview(area, buf, result, "Result", self.config.display.preview_rows);
        } else if self.session.has_data() {
            render_preview(area, buf, &self.session.df, "Data", self.config.display.preview_rows);
        } else {
            let para = Paragraph::new("No dataset loaded")
                .block(Block::default().borders(Borders::ALL).title("Data"));
            Widget::render(para, area, buf);
        }
    }

    fn render_menu_page(&self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(42), Constraint::Min(0)])
            .split(area);
        let names: Vec<String> = registry::group_names(self.section())
            .iter()
            .map(|n| n.to_string())
            .collect();
        render_menu(chunks[0], buf, self.nav.page.title(), &names, self.group_cursor);
        self.render_data_pane(chunks[1], buf);
    }

    fn render_operation_page(&self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(46), Constraint::Min(0)])
            .split(area);
        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(4)])
            .split(chunks[0]);

        match self.input_mode {
            InputMode::PickingColumns => {
                let names = self.column_names();
                render_picker(
                    side[0],
                    buf,
                    "Select Columns",
                    &names,
                    &self.picker_checked,
                    self.picker_cursor,
                );
            }
            InputMode::CustomForm => self.render_custom_form(side[0], buf),
            _ => {
                let group = self.nav.group.as_deref().unwrap_or_default();
                let labels: Vec<String> = registry::group(self.section(), group)
                    .map(|g| {
                        g.ops
                            .iter()
                            .map(|op| {
                                if op.kind == OpKind::Display {
                                    format!("{} (view)", op.label)
                                } else {
                                    op.label.to_string()
                                }
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                render_menu(side[0], buf, group, &labels, self.op_cursor);
            }
        }

        let inplace = if self.inplace { "in place" } else { "new columns" };
        let info = format!("{}\nResults: {inplace}", self.selection_summary());
        let para = Paragraph::new(info)
            .block(Block::default().borders(Borders::ALL).title("Scope"));
        Widget::render(para, side[1], buf);

        if self.input_mode == InputMode::EditingScript {
            let right = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(8)])
                .split(chunks[1]);
            self.render_data_pane(right[0], buf);
            Widget::render(&self.script, right[1], buf);
        } else {
            self.render_data_pane(chunks[1], buf);
        }
    }

    fn render_custom_form(&self, area: Rect, buf: &mut Buffer) {
        let columns = self.column_names();
        let pick = |idx: usize| {
            columns
                .get(idx)
                .cloned()
                .unwrap_or_else(|| "(none)".to_string())
        };
        let mark = |focus: CustomFocus| {
            if self.custom_form.focus == focus {
                "> "
            } else {
                "  "
            }
        };
        let text = format!(
            "{}Left column:  {}\n{}Operator:     {}\n{}Right column: {}\n{}New name:     {}",
            mark(CustomFocus::Left),
            pick(self.custom_form.left),
            mark(CustomFocus::Operator),
            ArithOp::ALL[self.custom_form.op % ArithOp::ALL.len()].as_str(),
            mark(CustomFocus::Right),
            pick(self.custom_form.right),
            mark(CustomFocus::Name),
            self.custom_form.name,
        );
        let para = Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Create Custom Column"),
        );
        Widget::render(para, area, buf);
    }

    fn render_visualize(&self, area: Rect, buf: &mut Buffer) {
        self.render_data_pane(area, buf);
    }

    fn render_status(&self, area: Rect, buf: &mut Buffer) {
        let Some(status) = &self.status else {
            return;
        };
        let color = match status.level {
            StatusLevel::Info => Color::Gray,
            StatusLevel::Success => Color::Green,
            StatusLevel::Warning => Color::Yellow,
            StatusLevel::Error => Color::Red,
        };
        let para = Paragraph::new(status.text.clone()).style(Style::default().fg(color));
        Widget::render(para, area, buf);
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);

        let title = Paragraph::new(format!("{APP_NAME} - {}", self.nav.page.title()))
            .style(Style::default().add_modifier(Modifier::BOLD));
        Widget::render(title, layout[0], buf);

        match self.nav.page {
            Page::Upload => self.render_upload(layout[1], buf),
            Page::CleaningMenu | Page::TransformMenu => self.render_menu_page(layout[1], buf),
            Page::Operation | Page::TransformOperation => {
                self.render_operation_page(layout[1], buf)
            }
            Page::Visualize => self.render_visualize(layout[1], buf),
        }

        self.render_status(layout[2], buf);

        let controls = Paragraph::new(self.controls_hint()).style(Style::default().fg(Color::DarkGray));
        Widget::render(controls, layout[3], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use std::sync::mpsc::channel;

    fn test_app() -> App {
        let (tx, _rx) = channel::<AppEvent>();
        App::new(tx, AppConfig::default())
    }

    fn press(app: &mut App, code: KeyCode) -> Option<AppEvent> {
        app.event(&AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn load_sample(app: &mut App) {
        let df = df!(
            "name" => ["ann", "bob", "cid"],
            "age" => [25i64, 35, 45]
        )
        .unwrap();
        app.session.load(df);
        app.nav.goto(Page::CleaningMenu, true);
    }

    #[test]
    fn test_quit_key_emits_exit() {
        let mut app = test_app();
        assert!(matches!(press(&mut app, KeyCode::Char('q')), Some(AppEvent::Exit)));
    }

    #[test]
    fn test_menu_enter_opens_operation_page() {
        let mut app = test_app();
        load_sample(&mut app);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.nav.page, Page::Operation);
        assert_eq!(app.nav.group.as_deref(), Some("Handling Missing Values"));
    }

    #[test]
    fn test_operation_page_guard_without_data() {
        let mut app = test_app();
        app.nav.page = Page::CleaningMenu;
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.nav.page, Page::CleaningMenu);
    }

    #[test]
    fn test_group_switch_clears_selection() {
        let mut app = test_app();
        load_sample(&mut app);
        app.session.selection = vec!["age".to_string()];
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert!(app.session.selection.is_empty());
    }

    #[test]
    fn test_apply_mutating_operation_from_keys() {
        let mut app = test_app();
        load_sample(&mut app);
        // Renaming Columns group, Lowercase Column Names
        app.nav.group = Some("Renaming Columns".to_string());
        app.nav.goto(Page::Operation, true);
        app.op_cursor = 1;
        press(&mut app, KeyCode::Enter);
        assert!(app.session.df.column("name").is_ok());
    }

    #[test]
    fn test_picker_commits_selection() {
        let mut app = test_app();
        load_sample(&mut app);
        app.nav.group = Some("Handling Missing Values".to_string());
        app.nav.goto(Page::Operation, true);
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.input_mode, InputMode::PickingColumns);
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session.selection, vec!["name".to_string()]);
        assert_eq!(app.input_mode, InputMode::Normal);
    }
}
