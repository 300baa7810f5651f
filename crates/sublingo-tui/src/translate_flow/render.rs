use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Gauge, Paragraph};

use sublingo_core::languages;

use crate::theme;
use crate::ui::text::{
    compact_hint, focus_line, key_hint_height, key_hint_paragraph, label_value_line,
    wrapped_paragraph, yes_no,
};

use super::{TranslateFlow, View};

impl TranslateFlow {
    pub(super) fn render(&self, frame: &mut Frame<'_>) {
        let area = frame.area();
        let hint = self.footer_hint(area.width);
        let footer_height = key_hint_height(area.width, hint);
        let [header, body, footer] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6),
                Constraint::Min(8),
                Constraint::Length(footer_height),
            ])
            .areas(area);

        self.render_header(frame, header);
        match self.view {
            View::FileEntry => self.render_file_entry(frame, body),
            View::SourcePicker => {
                if let Some(picker) = &self.source_picker {
                    picker.render(frame, body, "Source language");
                }
            }
            View::TargetPicker => {
                if let Some(picker) = &self.target_picker {
                    picker.render(frame, body, "Target language");
                }
            }
            View::Review => self.render_review(frame, body),
            View::Translating => self.render_translating(frame, body),
            View::Done => self.render_done(frame, body),
        }

        frame.render_widget(key_hint_paragraph(hint).block(theme::key_block()), footer);
    }

    fn render_header(&self, frame: &mut Frame<'_>, area: Rect) {
        let file_line = match self.session.file() {
            Some(file) => file.filename.clone(),
            None => "(none)".to_string(),
        };
        let pair_line = format!(
            "{} -> {}",
            language_label(self.session.source_lang()),
            self.session
                .target_lang()
                .map(language_label)
                .unwrap_or_else(|| "(not set)".to_string()),
        );
        let mode = if self.session.use_ai() {
            format!("AI ({})", self.session.provider())
        } else {
            "Google Free".to_string()
        };

        let mut lines = vec![
            label_value_line("File", file_line),
            label_value_line("Languages", pair_line),
            label_value_line("Mode", mode),
        ];
        if let Some(notice) = &self.notice {
            lines.push(Line::from(Span::styled(
                notice.clone(),
                theme::warning_prompt(),
            )));
        } else {
            lines.push(self.step_line());
        }

        frame.render_widget(
            wrapped_paragraph(Text::from(lines)).block(theme::chrome("sublingo")),
            area,
        );
    }

    fn step_line(&self) -> Line<'static> {
        let text = match self.view {
            View::FileEntry => "Step 1 of 4 — pick a subtitle file",
            View::SourcePicker => "Step 2 of 4 — pick the source language",
            View::TargetPicker => "Step 3 of 4 — pick the target language",
            View::Review => "Step 4 of 4 — review and translate",
            View::Translating => "Translating…",
            View::Done => "Translation ready",
        };
        focus_line(text)
    }

    fn render_file_entry(&self, frame: &mut Frame<'_>, area: Rect) {
        let [input_area, message_area] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(2)])
            .areas(area);

        frame.render_widget(
            Paragraph::new(self.file_input.value())
                .block(theme::chrome(focus_line("Subtitle file path (.srt)"))),
            input_area,
        );

        let message = match &self.file_error {
            Some(error) => Text::from(Line::from(Span::styled(
                error.clone(),
                theme::error_prompt(),
            ))),
            None => Text::from(Line::from(Span::styled(
                "Type the path of the .srt file to translate.",
                theme::secondary_text(),
            ))),
        };
        frame.render_widget(wrapped_paragraph(message), message_area);
    }

    fn render_review(&self, frame: &mut Frame<'_>, area: Rect) {
        let gates = sublingo_core::session::ControlGates::for_session(&self.session);
        let mut lines = vec![
            label_value_line(
                "File",
                self.session
                    .file()
                    .map(|file| file.path.display().to_string())
                    .unwrap_or_else(|| "(none)".to_string()),
            ),
            label_value_line("Source", language_label(self.session.source_lang())),
            label_value_line(
                "Target",
                self.session
                    .target_lang()
                    .map(language_label)
                    .unwrap_or_else(|| "(not set)".to_string()),
            ),
            label_value_line("AI translation", yes_no(self.session.use_ai())),
            label_value_line("Provider", self.session.provider().label()),
            Line::from(""),
        ];

        if let Some(banner) = &self.error_banner {
            lines.push(Line::from(Span::styled(
                banner.clone(),
                theme::error_prompt(),
            )));
        } else if gates.launch {
            lines.push(focus_line("Press Enter to start the translation."));
        } else {
            lines.push(Line::from(Span::styled(
                "Not ready to launch — fix the configuration above.",
                theme::warning_prompt(),
            )));
        }

        frame.render_widget(
            wrapped_paragraph(Text::from(lines)).block(theme::chrome("Review")),
            area,
        );
    }

    fn render_translating(&self, frame: &mut Frame<'_>, area: Rect) {
        let [gauge_area, status_area] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .areas(area);

        let percent = self.progress.as_ref().map(|view| view.percent).unwrap_or(0);
        let gauge = Gauge::default()
            .block(theme::chrome("Progress"))
            .gauge_style(theme::gauge_style())
            .percent(u16::from(percent))
            .label(format!("{percent}%"));
        frame.render_widget(gauge, gauge_area);

        let mut lines = Vec::new();
        let status = self
            .progress
            .as_ref()
            .map(|view| view.status.clone())
            .unwrap_or_else(|| "Waiting for the first progress report".to_string());
        lines.push(Line::from(format!(
            "{} {status}",
            self.loading.current_frame()
        )));

        if let Some(mode) = self.progress.as_ref().and_then(|view| view.mode.clone()) {
            lines.push(label_value_line("Mode", mode));
        }
        if let Some(eta) = self.progress.as_ref().and_then(|view| view.eta.clone()) {
            lines.push(label_value_line("Remaining", eta));
        }

        frame.render_widget(
            wrapped_paragraph(Text::from(lines)).block(theme::chrome("Status")),
            status_area,
        );
    }

    fn render_done(&self, frame: &mut Frame<'_>, area: Rect) {
        let Some(job) = self.session.job_result() else {
            return;
        };

        let [summary_area, preview_area] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(4)])
            .areas(area);

        let mut lines = vec![
            label_value_line("Translated file", job.filename.clone()),
            label_value_line("Download", job.download_url.clone()),
        ];
        if let Some(notice) = &self.save_notice {
            lines.push(Line::from(Span::styled(
                notice.clone(),
                theme::success_prompt(),
            )));
        }
        frame.render_widget(
            wrapped_paragraph(Text::from(lines)).block(theme::chrome(Line::from(Span::styled(
                "Done".to_string(),
                theme::success_prompt(),
            )))),
            summary_area,
        );

        let preview = Text::from(
            job.preview
                .lines()
                .map(|line| Line::from(line.to_string()))
                .collect::<Vec<_>>(),
        );
        frame.render_widget(
            wrapped_paragraph(preview).block(theme::chrome("Preview")),
            preview_area,
        );
    }

    fn footer_hint(&self, width: u16) -> &'static str {
        match self.view {
            View::FileEntry => compact_hint(
                width,
                "Enter: use file    Esc: back to home",
                "Enter: use file    Esc: home",
                "Enter file | Esc home",
            ),
            View::SourcePicker | View::TargetPicker => compact_hint(
                width,
                "Enter: pick    Up/Down or j/k: move    Tab: filter    Esc: back",
                "Enter: pick    j/k: move    Tab: filter    Esc: back",
                "Enter pick | Tab filter | Esc back",
            ),
            View::Review => compact_hint(
                width,
                "Enter: translate    e: edit languages    f: change file    r: remove file    Esc: back",
                "Enter: translate    e: languages    f: file    r: remove    Esc: back",
                "Enter go | e/f/r edit | Esc back",
            ),
            View::Translating => compact_hint(
                width,
                "Translation in progress — controls unlock when it finishes",
                "Translating — controls locked",
                "Translating…",
            ),
            View::Done => compact_hint(
                width,
                "s: save to current directory    n: translate another    Esc: back to home",
                "s: save    n: translate another    Esc: home",
                "s save | n again | Esc home",
            ),
        }
    }
}

fn language_label(code: &str) -> String {
    match languages::label_for(code) {
        Some(label) => format!("{label} ({code})"),
        None => code.to_string(),
    }
}
