use crossterm::event::{Event, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::{List, ListItem, ListState, Paragraph};
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;

use crate::{keymap, theme};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PickerRow {
    /// What confirming this row hands back (a language code, a provider
    /// name).
    pub(crate) value: String,
    pub(crate) display: String,
}

impl PickerRow {
    pub(crate) fn new(value: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            display: display.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PickerSignal {
    Continue,
    Back,
    Picked,
}

/// List with a text filter. Tab moves focus between the filter line and the
/// list; confirming always acts on the highlighted visible row.
#[derive(Debug)]
pub(crate) struct FilterPicker {
    rows: Vec<PickerRow>,
    filter: Input,
    filter_focused: bool,
    selected: usize,
}

impl FilterPicker {
    pub(crate) fn new(rows: Vec<PickerRow>) -> Self {
        Self {
            rows,
            filter: Input::default(),
            filter_focused: false,
            selected: 0,
        }
    }

    /// Moves the highlight to the row carrying `value`, if present.
    pub(crate) fn preselect(&mut self, value: &str) {
        if let Some(index) = self
            .visible()
            .iter()
            .position(|row| row.value == value)
        {
            self.selected = index;
        }
    }

    fn visible(&self) -> Vec<&PickerRow> {
        let query = self.filter.value().trim().to_lowercase();
        self.rows
            .iter()
            .filter(|row| {
                query.is_empty()
                    || row.display.to_lowercase().contains(&query)
                    || row.value.to_lowercase().contains(&query)
            })
            .collect()
    }

    pub(crate) fn selected_row(&self) -> Option<&PickerRow> {
        self.visible().get(self.selected).copied()
    }

    pub(crate) fn on_key(&mut self, key: KeyEvent) -> PickerSignal {
        if keymap::is_back(key) {
            return PickerSignal::Back;
        }

        if keymap::is_filter_focus(key) {
            self.filter_focused = !self.filter_focused;
            return PickerSignal::Continue;
        }

        if self.filter_focused {
            if keymap::is_confirm(key) {
                self.filter_focused = false;
            } else if self.filter.handle_event(&Event::Key(key)).is_some() {
                self.selected = 0;
            }
            return PickerSignal::Continue;
        }

        if keymap::is_up(key) {
            self.selected = self.selected.saturating_sub(1);
            return PickerSignal::Continue;
        }

        if keymap::is_down(key) {
            if self.selected + 1 < self.visible().len() {
                self.selected += 1;
            }
            return PickerSignal::Continue;
        }

        if keymap::is_confirm(key) && self.selected_row().is_some() {
            return PickerSignal::Picked;
        }

        PickerSignal::Continue
    }

    pub(crate) fn render(&self, frame: &mut Frame<'_>, area: Rect, title: &str) {
        let [filter_area, list_area] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .areas(area);

        let filter_title = if self.filter_focused {
            "Filter (typing)"
        } else {
            "Filter (Tab to focus)"
        };
        let filter_block = if self.filter_focused {
            theme::chrome(crate::ui::text::focus_line(filter_title))
        } else {
            theme::chrome(filter_title)
        };
        frame.render_widget(
            Paragraph::new(self.filter.value()).block(filter_block),
            filter_area,
        );

        let items: Vec<ListItem<'_>> = self
            .visible()
            .iter()
            .map(|row| ListItem::new(row.display.clone()))
            .collect();
        let list = List::new(items)
            .block(theme::chrome(crate::ui::text::focus_line(title)))
            .highlight_style(theme::list_highlight());

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, list_area, &mut state);
    }
}
