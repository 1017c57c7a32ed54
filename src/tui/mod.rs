use std::io;
use std::time::{Duration, Instant};

use color_eyre::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{ExecutableCommand, execute};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Margin, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use tracing::debug;
use unicode_width::UnicodeWidthStr;

use crate::dialog::Dialog;
use crate::launcher::{Launcher, Started};
use crate::picker::{Focus, Picker};
use crate::registry::Profile;

const TITLE: &str = "Chrome Profile Launcher";
const KEY_HINT: &str = "↓ list  •  Enter launch  •  Tab print command  •  Esc quit";
const DIALOG_HINT: &str = "Press any key to continue";
const EMPTY_LIST: &str = "No matching profiles";
const LIST_GAP: &str = "    ";
const PAGE: isize = 10;
const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(500);

/// How the picker window was closed.
#[derive(Debug, Clone)]
pub enum Outcome {
    Launched { profile: Profile, started: Started },
    Emit(Profile),
    Cancelled,
}

/// Run the picker window until the user launches a profile or closes it.
///
/// # Errors
///
/// Returns an error if terminal IO fails.
pub fn run(picker: Picker, launcher: &Launcher) -> Result<Outcome> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, ShellState::new(picker, launcher));

    disable_raw_mode()?;
    terminal
        .backend_mut()
        .execute(DisableMouseCapture)?
        .execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut state: ShellState<'_>) -> Result<Outcome> {
    loop {
        terminal.draw(|frame| draw(frame, &mut state))?;
        let event = event::read()?;
        if let Some(outcome) = state.handle_event(&event) {
            return Ok(outcome);
        }
    }
}

struct ShellState<'a> {
    picker: Picker,
    launcher: &'a Launcher,
    dialog: Option<Dialog>,
    list_state: ListState,
    list_area: Rect,
    last_click: Option<(usize, Instant)>,
}

impl<'a> ShellState<'a> {
    fn new(picker: Picker, launcher: &'a Launcher) -> Self {
        Self {
            picker,
            launcher,
            dialog: None,
            list_state: ListState::default(),
            list_area: Rect::default(),
            last_click: None,
        }
    }

    fn handle_event(&mut self, event: &Event) -> Option<Outcome> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(*key),
            Event::Mouse(mouse) => self.handle_mouse(*mouse),
            _ => None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Outcome> {
        if self.dialog.take().is_some() {
            return None;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Esc, _) => {
                Some(Outcome::Cancelled)
            }
            (KeyCode::Enter, _) => self.confirm(),
            (KeyCode::Tab, _) => self.picker.confirm().cloned().map(Outcome::Emit),
            (KeyCode::Down, _) => {
                self.picker.move_selection(1);
                None
            }
            (KeyCode::Up, _) => {
                self.picker.move_selection(-1);
                None
            }
            (KeyCode::PageDown, _) => {
                self.picker.move_selection(PAGE);
                None
            }
            (KeyCode::PageUp, _) => {
                self.picker.move_selection(-PAGE);
                None
            }
            (KeyCode::Home, _) if self.picker.focus() == Focus::List => {
                self.picker.select_first();
                None
            }
            (KeyCode::End, _) if self.picker.focus() == Focus::List => {
                self.picker.select_last();
                None
            }
            (KeyCode::Backspace, _) => {
                self.picker.pop_char();
                None
            }
            // AltGr arrives as CONTROL | ALT on Windows.
            (KeyCode::Char(ch), mods)
                if !mods.contains(KeyModifiers::CONTROL)
                    || mods.contains(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.picker.push_char(ch);
                None
            }
            _ => None,
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Option<Outcome> {
        if self.dialog.is_some() {
            if matches!(mouse.kind, MouseEventKind::Down(_)) {
                self.dialog = None;
            }
            return None;
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let index = self.row_at(mouse.column, mouse.row)?;
                if !self.picker.select(index) {
                    return None;
                }
                let now = Instant::now();
                let is_double = self.last_click.is_some_and(|(previous, at)| {
                    previous == index && now.duration_since(at) <= DOUBLE_CLICK_WINDOW
                });
                if is_double {
                    self.last_click = None;
                    return self.confirm();
                }
                self.last_click = Some((index, now));
                None
            }
            MouseEventKind::ScrollDown if self.picker.focus() == Focus::List => {
                self.picker.move_selection(1);
                None
            }
            MouseEventKind::ScrollUp if self.picker.focus() == Focus::List => {
                self.picker.move_selection(-1);
                None
            }
            _ => None,
        }
    }

    fn confirm(&mut self) -> Option<Outcome> {
        let profile = self.picker.confirm()?.clone();
        match self.launcher.launch(&profile.directory_id) {
            Ok(started) => Some(Outcome::Launched { profile, started }),
            Err(err) => {
                debug!(error = %err, directory_id = %profile.directory_id, "launch failed");
                self.dialog = Some(Dialog::launch_failed(&err));
                None
            }
        }
    }

    fn row_at(&self, column: u16, row: u16) -> Option<usize> {
        let inner = self.list_area.inner(Margin {
            horizontal: 1,
            vertical: 1,
        });
        if !inner.contains(Position::new(column, row)) {
            return None;
        }
        Some(self.list_state.offset() + usize::from(row - inner.y))
    }

    fn status_line(&self) -> String {
        format!(" {}  •  {KEY_HINT} ", self.picker.counts_line())
    }
}

fn draw(frame: &mut Frame<'_>, state: &mut ShellState<'_>) {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_filter(frame, vertical[0], state);
    draw_list(frame, vertical[1], state);
    draw_status(frame, vertical[2], state);
    if let Some(dialog) = &state.dialog {
        draw_dialog(frame, dialog);
    }
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn draw_filter(frame: &mut Frame<'_>, area: Rect, state: &ShellState<'_>) {
    let focused = state.picker.focus() == Focus::Filter;
    let block = Block::default()
        .title("Filter")
        .borders(Borders::ALL)
        .border_style(focus_style(focused));
    let paragraph = Paragraph::new(state.picker.query()).block(block);
    frame.render_widget(paragraph, area);

    if focused && state.dialog.is_none() && area.width > 2 && area.height > 2 {
        let typed = u16::try_from(state.picker.query().width()).unwrap_or(u16::MAX);
        let max_x = area.right().saturating_sub(2);
        let x = area.x.saturating_add(1).saturating_add(typed).min(max_x);
        frame.set_cursor_position(Position::new(x, area.y + 1));
    }
}

fn draw_list(frame: &mut Frame<'_>, area: Rect, state: &mut ShellState<'_>) {
    state.list_area = area;
    let selected = state.picker.selected();
    state.list_state.select(selected);
    if selected.is_none() {
        *state.list_state.offset_mut() = 0;
    }

    let items = if state.picker.visible().is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            EMPTY_LIST,
            Style::default().fg(Color::DarkGray),
        )))]
    } else {
        state
            .picker
            .visible()
            .iter()
            .map(|profile| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        profile.display_name.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(LIST_GAP),
                    Span::styled(
                        format!("[{}]", profile.directory_id),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect::<Vec<_>>()
    };

    let block = Block::default()
        .title(TITLE)
        .borders(Borders::ALL)
        .border_style(focus_style(state.picker.focus() == Focus::List));
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan))
        .highlight_symbol("▶ ");
    frame.render_stateful_widget(list, area, &mut state.list_state);
}

fn draw_status(frame: &mut Frame<'_>, area: Rect, state: &ShellState<'_>) {
    let paragraph = Paragraph::new(state.status_line())
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn draw_dialog(frame: &mut Frame<'_>, dialog: &Dialog) {
    let mut lines = dialog
        .message
        .lines()
        .map(|line| Line::from(line.to_string()))
        .collect::<Vec<_>>();
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        DIALOG_HINT,
        Style::default().fg(Color::DarkGray),
    )));

    let screen = frame.area();
    let width = (screen.width.saturating_mul(3) / 4).max(30);
    let height = u16::try_from(lines.len() + 4).unwrap_or(u16::MAX);
    let area = centered_rect(screen, width, height);

    let block = Block::default()
        .title(dialog.title.as_str())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
