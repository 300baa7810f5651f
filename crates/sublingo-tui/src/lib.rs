mod keymap;
mod settings_flow;
mod theme;
mod translate_flow;
mod ui;

use std::io::{Stdout, stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::text::{Line, Text};
use ratatui::widgets::{List, ListItem, ListState};

use sublingo_app::App;

use crate::settings_flow::SettingsScreen;
use crate::translate_flow::TranslateScreen;
use crate::ui::modal::render_error_modal;
use crate::ui::text::{
    compact_hint, focus_line, key_hint_height, key_hint_paragraph, wrapped_paragraph,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiExit {
    Completed,
    BackAtRoot,
    Canceled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RootAction {
    Translate,
    Settings,
}

impl RootAction {
    fn title(self) -> &'static str {
        match self {
            Self::Translate => "Translate a subtitle file",
            Self::Settings => "Settings (provider / API key)",
        }
    }
}

const ROOT_ACTIONS: [RootAction; 2] = [RootAction::Translate, RootAction::Settings];

/// Raw-mode + alternate-screen guard. Cleanup also runs on drop so a panic
/// or early return leaves the terminal usable.
pub(crate) struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    pub(crate) fn enter() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;

        let mut out = stdout();
        if let Err(error) =
            execute!(out, EnterAlternateScreen, Hide).context("failed to enter alternate screen")
        {
            let _ = disable_raw_mode();
            return Err(error);
        }

        match Terminal::new(CrosstermBackend::new(stdout()))
            .context("failed to create terminal backend")
        {
            Ok(terminal) => Ok(Self { terminal }),
            Err(error) => {
                let mut out = stdout();
                let _ = execute!(out, Show, LeaveAlternateScreen);
                let _ = disable_raw_mode();
                Err(error)
            }
        }
    }

    pub(crate) fn draw<F>(&mut self, draw_fn: F) -> Result<()>
    where
        F: FnOnce(&mut ratatui::Frame<'_>),
    {
        self.terminal
            .draw(draw_fn)
            .context("failed to render terminal")?;
        Ok(())
    }

    pub(crate) fn autoresize(&mut self) -> Result<()> {
        self.terminal
            .autoresize()
            .context("failed to autoresize terminal")?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(self.terminal.backend_mut(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

pub(crate) fn is_ctrl_c(key: KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

#[derive(Debug)]
struct RootScreen {
    selected: usize,
}

impl RootScreen {
    fn new() -> Self {
        Self { selected: 0 }
    }

    fn on_key(&mut self, key: KeyEvent) -> Option<RootExit> {
        if keymap::is_back(key) || keymap::is_quit(key) {
            return Some(RootExit::Quit);
        }

        if keymap::is_up(key) {
            self.selected = self.selected.saturating_sub(1);
            return None;
        }

        if keymap::is_down(key) {
            if self.selected + 1 < ROOT_ACTIONS.len() {
                self.selected += 1;
            }
            return None;
        }

        if keymap::is_confirm(key) {
            return Some(RootExit::Open(ROOT_ACTIONS[self.selected]));
        }

        None
    }

    fn render(&self, frame: &mut ratatui::Frame<'_>, server_url: &str) {
        let area = frame.area();
        let key_text = compact_hint(
            area.width,
            "Enter: select    Up/Down or j/k: move    Esc/q: exit",
            "Enter: select    j/k: move    Esc/q: exit",
            "Enter select | j/k move | Esc/q exit",
        );
        let footer_height = key_hint_height(area.width, key_text);
        let [header, body, footer] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(6),
                Constraint::Length(footer_height),
            ])
            .areas(area);

        let header_text = Text::from(vec![
            Line::from("sublingo — subtitle translator"),
            Line::from(format!("server: {server_url}")),
            focus_line("Choose what you want to do"),
        ]);
        frame.render_widget(
            wrapped_paragraph(header_text).block(theme::chrome("Home")),
            header,
        );

        let items: Vec<ListItem<'_>> = ROOT_ACTIONS
            .iter()
            .map(|action| ListItem::new(action.title()))
            .collect();
        let list = List::new(items)
            .block(theme::chrome(focus_line("Actions")))
            .highlight_style(theme::list_highlight());

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, body, &mut state);

        frame.render_widget(key_hint_paragraph(key_text).block(theme::key_block()), footer);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RootExit {
    Open(RootAction),
    Quit,
}

enum ActiveScreen {
    Root(RootScreen),
    Translate(Box<TranslateScreen>),
    Settings(Box<SettingsScreen>),
}

impl ActiveScreen {
    /// Worker events keep flowing while a job is in flight, whether or not
    /// the user types anything.
    fn drain_background(&mut self) {
        if let Self::Translate(screen) = self
            && screen.is_busy()
        {
            screen.on_tick();
        }
    }
}

const TICK_RATE: Duration = Duration::from_millis(120);

pub fn run_root(app: &App) -> Result<UiExit> {
    let mut session = TerminalSession::enter()?;
    let mut active = ActiveScreen::Root(RootScreen::new());
    let mut global_error: Option<String> = None;

    loop {
        session.draw(|frame| {
            match &active {
                ActiveScreen::Root(screen) => screen.render(frame, app.server_url()),
                ActiveScreen::Translate(screen) => screen.render(frame),
                ActiveScreen::Settings(screen) => screen.render(frame),
            }

            if let Some(message) = global_error.as_deref() {
                render_error_modal(frame, message, "Enter/Esc: continue");
            }
        })?;

        let has_event = event::poll(TICK_RATE).context("failed to poll terminal event")?;
        if !has_event {
            active.drain_background();
            continue;
        }

        let key = match event::read().context("failed to read terminal event")? {
            Event::Resize(_, _) => {
                session.autoresize()?;
                continue;
            }
            Event::Key(key) if matches!(key.kind, KeyEventKind::Press) => key,
            _ => continue,
        };

        if is_ctrl_c(key) {
            return Ok(UiExit::Canceled);
        }

        if global_error.is_some() {
            if keymap::is_confirm(key) || keymap::is_back(key) {
                global_error = None;
            }
            continue;
        }

        let transition = match &mut active {
            ActiveScreen::Root(screen) => match screen.on_key(key) {
                Some(RootExit::Open(action)) => Some(Transition::Open(action)),
                Some(RootExit::Quit) => Some(Transition::Return(UiExit::Completed)),
                None => None,
            },
            ActiveScreen::Translate(screen) => match screen.on_key(key, app) {
                Ok(value) => value.map(Transition::Return),
                Err(error) => {
                    global_error = Some(format!("{error:#}"));
                    None
                }
            },
            ActiveScreen::Settings(screen) => match screen.on_key(key, app) {
                Ok(value) => value.map(Transition::Return),
                Err(error) => {
                    global_error = Some(format!("{error:#}"));
                    None
                }
            },
        };

        match transition {
            Some(Transition::Open(action)) => {
                let opened = match action {
                    RootAction::Translate => {
                        TranslateScreen::new(app).map(|screen| ActiveScreen::Translate(Box::new(screen)))
                    }
                    RootAction::Settings => {
                        SettingsScreen::new(app).map(|screen| ActiveScreen::Settings(Box::new(screen)))
                    }
                };
                match opened {
                    Ok(screen) => active = screen,
                    Err(error) => global_error = Some(format!("{error:#}")),
                }
            }
            Some(Transition::Return(UiExit::BackAtRoot)) => {
                active = ActiveScreen::Root(RootScreen::new());
            }
            Some(Transition::Return(exit)) => return Ok(exit),
            None => {}
        }

        active.drain_background();
    }
}

enum Transition {
    Open(RootAction),
    Return(UiExit),
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::{ROOT_ACTIONS, RootAction, RootExit, RootScreen, is_ctrl_c};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn root_screen_esc_and_q_quit() {
        let mut root = RootScreen::new();
        assert_eq!(root.on_key(key(KeyCode::Esc)), Some(RootExit::Quit));
        assert_eq!(root.on_key(key(KeyCode::Char('q'))), Some(RootExit::Quit));
    }

    #[test]
    fn root_screen_navigates_and_opens() {
        let mut root = RootScreen::new();
        assert_eq!(
            root.on_key(key(KeyCode::Enter)),
            Some(RootExit::Open(RootAction::Translate))
        );

        root.on_key(key(KeyCode::Char('j')));
        assert_eq!(
            root.on_key(key(KeyCode::Enter)),
            Some(RootExit::Open(RootAction::Settings))
        );

        // bounded at the bottom
        root.on_key(key(KeyCode::Char('j')));
        assert_eq!(root.selected, ROOT_ACTIONS.len() - 1);
    }

    #[test]
    fn ctrl_c_is_detected() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(is_ctrl_c(ctrl_c));
        assert!(!is_ctrl_c(key(KeyCode::Char('c'))));
    }
}
