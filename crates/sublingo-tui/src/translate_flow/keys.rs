use std::path::{Path, PathBuf};

use crossterm::event::{Event, KeyCode, KeyEvent};
use tui_input::backend::crossterm::EventHandler;

use sublingo_core::languages::{AUTO, LANGUAGES};
use sublingo_core::session::{ControlGates, TransitionRejected};
use sublingo_core::subtitle;

use crate::UiExit;
use crate::keymap;
use crate::ui::picker::{FilterPicker, PickerRow, PickerSignal};

use super::{FlowSignal, TranslateFlow, TranslateOps, View};

fn language_rows(include_auto: bool) -> Vec<PickerRow> {
    LANGUAGES
        .iter()
        .filter(|language| include_auto || language.code != AUTO)
        .map(|language| {
            PickerRow::new(language.code, format!("{} — {}", language.code, language.label))
        })
        .collect()
}

impl TranslateFlow {
    pub(super) fn on_key(&mut self, key: KeyEvent, ops: &dyn TranslateOps) -> FlowSignal {
        self.notice = None;
        match self.view {
            View::FileEntry => self.on_key_file(key),
            View::SourcePicker => self.on_key_source(key),
            View::TargetPicker => self.on_key_target(key),
            View::Review => self.on_key_review(key, ops),
            View::Translating => self.on_key_translating(key),
            View::Done => self.on_key_done(key, ops),
        }
    }

    fn on_key_file(&mut self, key: KeyEvent) -> FlowSignal {
        if keymap::is_back(key) {
            return FlowSignal::Exit(UiExit::BackAtRoot);
        }

        if keymap::is_confirm(key) {
            let raw = self.file_input.value().trim().to_string();
            if raw.is_empty() {
                self.file_error = Some("enter the path of a subtitle file".to_string());
                return FlowSignal::Continue;
            }

            let candidate = match subtitle::select_file(Path::new(&raw)) {
                Ok(candidate) => candidate,
                Err(error) => {
                    self.file_error = Some(error.to_string());
                    return FlowSignal::Continue;
                }
            };

            match self.session.choose_file(candidate) {
                Ok(()) => {
                    self.file_error = None;
                    self.open_source_picker();
                }
                Err(rejection) => {
                    self.file_error = Some(rejection.to_string());
                }
            }
            return FlowSignal::Continue;
        }

        if self.file_input.handle_event(&Event::Key(key)).is_some() {
            self.file_error = None;
        }
        FlowSignal::Continue
    }

    fn open_source_picker(&mut self) {
        let mut picker = FilterPicker::new(language_rows(true));
        picker.preselect(self.session.source_lang());
        self.source_picker = Some(picker);
        self.view = View::SourcePicker;
    }

    fn open_target_picker(&mut self) {
        let mut picker = FilterPicker::new(language_rows(false));
        if let Some(target) = self.session.target_lang() {
            picker.preselect(target);
        }
        self.target_picker = Some(picker);
        self.view = View::TargetPicker;
    }

    fn on_key_source(&mut self, key: KeyEvent) -> FlowSignal {
        let Some(picker) = &mut self.source_picker else {
            self.view = View::FileEntry;
            return FlowSignal::Continue;
        };

        match picker.on_key(key) {
            PickerSignal::Back => {
                self.view = View::FileEntry;
            }
            PickerSignal::Picked => {
                let code = picker.selected_row().map(|row| row.value.clone());
                if let Some(code) = code {
                    match self.session.set_source_lang(&code) {
                        Ok(()) => self.open_target_picker(),
                        Err(rejection) => self.notice = Some(rejection.to_string()),
                    }
                }
            }
            PickerSignal::Continue => {}
        }
        FlowSignal::Continue
    }

    fn on_key_target(&mut self, key: KeyEvent) -> FlowSignal {
        let Some(picker) = &mut self.target_picker else {
            self.view = View::SourcePicker;
            return FlowSignal::Continue;
        };

        match picker.on_key(key) {
            PickerSignal::Back => {
                self.open_source_picker();
            }
            PickerSignal::Picked => {
                let code = picker.selected_row().map(|row| row.value.clone());
                if let Some(code) = code {
                    match self.session.set_target_lang(&code) {
                        // readiness is re-derived by the session; the review
                        // screen shows whether a launch is possible
                        Ok(()) => self.view = View::Review,
                        Err(rejection) => self.notice = Some(rejection.to_string()),
                    }
                }
            }
            PickerSignal::Continue => {}
        }
        FlowSignal::Continue
    }

    fn on_key_review(&mut self, key: KeyEvent, ops: &dyn TranslateOps) -> FlowSignal {
        if keymap::is_back(key) {
            self.open_target_picker();
            return FlowSignal::Continue;
        }

        if keymap::is_confirm(key) {
            self.request_launch(ops);
            return FlowSignal::Continue;
        }

        let gates = ControlGates::for_session(&self.session);
        match key.code {
            KeyCode::Char('f') if gates.pick_file => {
                self.view = View::FileEntry;
            }
            KeyCode::Char('e') if gates.edit_languages => {
                self.open_source_picker();
            }
            KeyCode::Char('r') if gates.remove_file => {
                if self.session.remove_file().is_ok() {
                    self.file_input = tui_input::Input::default();
                    self.error_banner = None;
                    self.view = View::FileEntry;
                }
            }
            _ => {}
        }
        FlowSignal::Continue
    }

    /// While a job runs every edit or navigation attempt is refused; the
    /// gate is the only thing standing between the user and a double
    /// submission.
    fn on_key_translating(&mut self, key: KeyEvent) -> FlowSignal {
        let locked = keymap::is_back(key)
            || keymap::is_quit(key)
            || keymap::is_confirm(key)
            || matches!(
                key.code,
                KeyCode::Char('f') | KeyCode::Char('e') | KeyCode::Char('r')
            );
        if locked {
            self.notice = Some(TransitionRejected::LockedWhileTranslating.to_string());
        }
        FlowSignal::Continue
    }

    fn on_key_done(&mut self, key: KeyEvent, ops: &dyn TranslateOps) -> FlowSignal {
        if keymap::is_back(key) {
            return FlowSignal::Exit(UiExit::BackAtRoot);
        }

        match key.code {
            KeyCode::Char('n') => {
                self.begin_next_run();
            }
            KeyCode::Char('s') => {
                let Some(job) = self.session.job_result().cloned() else {
                    return FlowSignal::Continue;
                };
                let dest_dir =
                    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                self.save_notice = Some(match ops.save_to(&job, &dest_dir) {
                    Ok(path) => format!("Saved to {}", path.display()),
                    Err(error) => format!("Save failed: {error:#}"),
                });
            }
            _ => {}
        }
        FlowSignal::Continue
    }
}
