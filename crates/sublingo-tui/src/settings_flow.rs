//! Settings screen: pick a provider, enter or clear its API key, choose
//! AI vs free translation, and save. The key lands on the server first and
//! is mirrored into the local settings file afterwards.

use std::collections::BTreeMap;

use anyhow::Result;
use crossterm::event::{Event, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::Paragraph;
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;

use sublingo_app::App;
use sublingo_core::providers::{self, ALL_PROVIDERS, Provider};
use sublingo_core::settings::Settings;

use crate::UiExit;
use crate::keymap;
use crate::theme;
use crate::ui::binary_choice::{BinaryChoice, BinaryChoiceEvent};
use crate::ui::picker::{FilterPicker, PickerRow, PickerSignal};
use crate::ui::text::{
    compact_hint, focus_line, key_hint_height, key_hint_paragraph, label_value_line,
    wrapped_paragraph, yes_no,
};

pub(crate) trait SettingsOps {
    fn settings(&self) -> Result<Settings>;
    fn masked_keys(&self) -> Result<BTreeMap<String, String>>;
    fn save_key(&self, provider: Provider, api_key: &str, use_ai: bool) -> Result<String>;
}

impl SettingsOps for App {
    fn settings(&self) -> Result<Settings> {
        self.load_settings()
    }

    fn masked_keys(&self) -> Result<BTreeMap<String, String>> {
        self.fetch_masked_keys()
    }

    fn save_key(&self, provider: Provider, api_key: &str, use_ai: bool) -> Result<String> {
        self.save_provider_key(provider, api_key, use_ai)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettingsStep {
    ProviderPick,
    KeyEntry,
    AiToggle,
    Saved,
}

pub(crate) struct SettingsScreen {
    step: SettingsStep,
    settings: Settings,
    provider_picker: FilterPicker,
    selected_provider: Provider,
    key_input: Input,
    use_ai_choice: BinaryChoice,
    error: Option<String>,
    saved_masked: Option<String>,
}

impl SettingsScreen {
    pub(crate) fn new(ops: &dyn SettingsOps) -> Result<Self> {
        let settings = ops.settings()?;

        // server-side masked keys are a nicety; the screen works without
        // them when the server is down
        let masked = match ops.masked_keys() {
            Ok(masked) => masked,
            Err(error) => {
                log::warn!("could not list server API keys: {error:#}");
                BTreeMap::new()
            }
        };

        let rows = ALL_PROVIDERS
            .iter()
            .map(|provider| {
                let stored = masked
                    .get(provider.as_str())
                    .filter(|value| !value.is_empty())
                    .cloned()
                    .or_else(|| {
                        let local = settings.key_for(*provider);
                        (!local.is_empty()).then(|| providers::mask_key(local))
                    })
                    .unwrap_or_else(|| "no key stored".to_string());
                PickerRow::new(provider.as_str(), format!("{} — {stored}", provider.label()))
            })
            .collect();

        let mut provider_picker = FilterPicker::new(rows);
        provider_picker.preselect(settings.provider().as_str());
        let use_ai_choice = BinaryChoice::new(settings.use_ai);
        let selected_provider = settings.provider();

        Ok(Self {
            step: SettingsStep::ProviderPick,
            settings,
            provider_picker,
            selected_provider,
            key_input: Input::default(),
            use_ai_choice,
            error: None,
            saved_masked: None,
        })
    }

    pub(crate) fn on_key(
        &mut self,
        key: KeyEvent,
        ops: &dyn SettingsOps,
    ) -> Result<Option<UiExit>> {
        match self.step {
            SettingsStep::ProviderPick => match self.provider_picker.on_key(key) {
                PickerSignal::Back => return Ok(Some(UiExit::BackAtRoot)),
                PickerSignal::Picked => {
                    let value = self
                        .provider_picker
                        .selected_row()
                        .map(|row| row.value.clone());
                    if let Some(value) = value
                        && let Ok(provider) = Provider::parse(&value)
                    {
                        self.selected_provider = provider;
                        self.key_input = Input::new(self.settings.key_for(provider).to_string());
                        self.error = None;
                        self.step = SettingsStep::KeyEntry;
                    }
                }
                PickerSignal::Continue => {}
            },
            SettingsStep::KeyEntry => {
                if keymap::is_back(key) {
                    self.step = SettingsStep::ProviderPick;
                } else if keymap::is_confirm(key) {
                    let candidate = self.key_input.value().trim().to_string();
                    match providers::key_format_issue(self.selected_provider, &candidate) {
                        Some(issue) => self.error = Some(issue),
                        None => {
                            self.error = None;
                            self.step = SettingsStep::AiToggle;
                        }
                    }
                } else if self.key_input.handle_event(&Event::Key(key)).is_some() {
                    self.error = None;
                }
            }
            SettingsStep::AiToggle => match self.use_ai_choice.on_key(key) {
                BinaryChoiceEvent::Back => self.step = SettingsStep::KeyEntry,
                BinaryChoiceEvent::ConfirmYes | BinaryChoiceEvent::ConfirmNo => {
                    let use_ai = self.use_ai_choice.yes_selected;
                    let key_value = self.key_input.value().trim().to_string();
                    match ops.save_key(self.selected_provider, &key_value, use_ai) {
                        Ok(masked) => {
                            self.settings.set_provider(self.selected_provider);
                            self.settings.use_ai = use_ai;
                            self.settings.set_key(self.selected_provider, &key_value);
                            self.saved_masked = Some(masked);
                            self.error = None;
                            self.step = SettingsStep::Saved;
                        }
                        Err(error) => {
                            self.error = Some(format!("{error:#}"));
                            self.step = SettingsStep::KeyEntry;
                        }
                    }
                }
                BinaryChoiceEvent::Continue => {}
            },
            SettingsStep::Saved => {
                if keymap::is_back(key) || keymap::is_confirm(key) {
                    return Ok(Some(UiExit::BackAtRoot));
                }
            }
        }
        Ok(None)
    }

    pub(crate) fn render(&self, frame: &mut Frame<'_>) {
        let area = frame.area();
        let hint = self.footer_hint(area.width);
        let footer_height = key_hint_height(area.width, hint);
        let [header, body, footer] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Min(6),
                Constraint::Length(footer_height),
            ])
            .areas(area);

        let mut header_lines = vec![
            label_value_line("Provider", self.selected_provider.label()),
            label_value_line("AI translation", yes_no(self.use_ai_choice.yes_selected)),
        ];
        if let Some(error) = &self.error {
            header_lines.push(Line::from(Span::styled(
                error.clone(),
                theme::error_prompt(),
            )));
        }
        frame.render_widget(
            wrapped_paragraph(Text::from(header_lines)).block(theme::chrome("Settings")),
            header,
        );

        match self.step {
            SettingsStep::ProviderPick => {
                self.provider_picker.render(frame, body, "AI provider");
            }
            SettingsStep::KeyEntry => self.render_key_entry(frame, body),
            SettingsStep::AiToggle => self.render_ai_toggle(frame, body),
            SettingsStep::Saved => self.render_saved(frame, body),
        }

        frame.render_widget(key_hint_paragraph(hint).block(theme::key_block()), footer);
    }

    fn render_key_entry(&self, frame: &mut Frame<'_>, area: Rect) {
        let [input_area, message_area] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(2)])
            .areas(area);

        let title = format!("{} API key", self.selected_provider.label());
        frame.render_widget(
            Paragraph::new(self.key_input.value()).block(theme::chrome(focus_line(title))),
            input_area,
        );
        frame.render_widget(
            wrapped_paragraph(Text::from(Line::from(Span::styled(
                "Leave empty to clear the stored key.",
                theme::secondary_text(),
            )))),
            message_area,
        );
    }

    fn render_ai_toggle(&self, frame: &mut Frame<'_>, area: Rect) {
        let lines = vec![
            focus_line("Use AI translation?"),
            Line::from(""),
            Line::from(format!("Current selection: {}", self.use_ai_choice.selected_label())),
            Line::from(Span::styled(
                "No falls back to the free bulk translator.",
                theme::secondary_text(),
            )),
        ];
        frame.render_widget(
            wrapped_paragraph(Text::from(lines)).block(theme::chrome("Translation mode")),
            area,
        );
    }

    fn render_saved(&self, frame: &mut Frame<'_>, area: Rect) {
        let masked = self
            .saved_masked
            .as_deref()
            .filter(|value| !value.is_empty())
            .unwrap_or("(cleared)");
        let lines = vec![
            Line::from(Span::styled(
                "Settings saved.".to_string(),
                theme::success_prompt(),
            )),
            Line::from(""),
            label_value_line("Provider", self.selected_provider.label()),
            label_value_line("Key", masked),
            label_value_line("AI translation", yes_no(self.use_ai_choice.yes_selected)),
        ];
        frame.render_widget(
            wrapped_paragraph(Text::from(lines)).block(theme::chrome("Saved")),
            area,
        );
    }

    fn footer_hint(&self, width: u16) -> &'static str {
        match self.step {
            SettingsStep::ProviderPick => compact_hint(
                width,
                "Enter: pick provider    Up/Down or j/k: move    Tab: filter    Esc: back",
                "Enter: pick    j/k: move    Esc: back",
                "Enter pick | Esc back",
            ),
            SettingsStep::KeyEntry => compact_hint(
                width,
                "Enter: continue    Esc: back to providers",
                "Enter: continue    Esc: back",
                "Enter continue | Esc back",
            ),
            SettingsStep::AiToggle => compact_hint(
                width,
                "Enter: save settings    Space: toggle    Esc: back",
                "Enter: save    Space: toggle    Esc: back",
                "Enter save | Space toggle",
            ),
            SettingsStep::Saved => compact_hint(
                width,
                "Enter/Esc: back to home",
                "Enter/Esc: home",
                "Enter/Esc home",
            ),
        }
    }
}
