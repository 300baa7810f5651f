use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::Clear;

use crate::theme;
use crate::ui::text::{key_hint_height, key_hint_paragraph, wrapped_paragraph};

pub(crate) struct ModalSpec<'a> {
    pub(crate) title: &'a str,
    pub(crate) title_style: Option<Style>,
    pub(crate) body: Text<'a>,
    pub(crate) key_hint: Option<&'a str>,
    pub(crate) width_pct: u16,
    pub(crate) height_pct: u16,
}

pub(crate) fn render_modal(frame: &mut Frame<'_>, spec: ModalSpec<'_>) {
    let area = centered_rect(spec.width_pct, spec.height_pct, frame.area());
    let title = match spec.title_style {
        Some(style) => Line::from(Span::styled(spec.title.to_string(), style)),
        None => Line::from(spec.title.to_string()),
    };

    let (body_area, key_area) = match spec.key_hint {
        Some(key_hint) => {
            let footer_height = key_hint_height(area.width, key_hint);
            let [body, keys] = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(3), Constraint::Length(footer_height)])
                .areas(area);
            (body, Some(keys))
        }
        None => (area, None),
    };

    frame.render_widget(Clear, body_area);
    frame.render_widget(
        wrapped_paragraph(spec.body).block(theme::chrome(title)),
        body_area,
    );

    if let (Some(key_hint), Some(key_area)) = (spec.key_hint, key_area) {
        frame.render_widget(Clear, key_area);
        frame.render_widget(
            key_hint_paragraph(key_hint).block(theme::key_block()),
            key_area,
        );
    }
}

pub(crate) fn render_error_modal(frame: &mut Frame<'_>, message: &str, footer: &str) {
    render_modal(
        frame,
        ModalSpec {
            title: "Error",
            title_style: Some(theme::error_prompt()),
            body: text_from_message(message),
            key_hint: Some(footer),
            width_pct: 80,
            height_pct: 60,
        },
    );
}

fn text_from_message(message: &str) -> Text<'static> {
    let trimmed = message.trim_end();
    if trimmed.is_empty() {
        return Text::from(Line::from(""));
    }
    Text::from(
        trimmed
            .lines()
            .map(|line| Line::from(line.to_string()))
            .collect::<Vec<_>>(),
    )
}

pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let pct_x = percent_x.min(100);
    let pct_y = percent_y.min(100);

    let [_, vertical, _] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - pct_y) / 2),
            Constraint::Percentage(pct_y),
            Constraint::Percentage((100 - pct_y) / 2),
        ])
        .areas(area);
    let [_, horizontal, _] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - pct_x) / 2),
            Constraint::Percentage(pct_x),
            Constraint::Percentage((100 - pct_x) / 2),
        ])
        .areas(vertical);
    horizontal
}
