//! The translation-session state machine. One [`Session`] lives for the
//! whole program run; every user action is proposed to it as a transition
//! and either accepted (state changes) or rejected (state untouched, the
//! caller shows the rejection message). Control enablement is derived from
//! the session by [`ControlGates`] and nowhere else.

use thiserror::Error;

use crate::languages::{self, PairError};
use crate::providers::Provider;
use crate::subtitle::{self, SelectedFile};

/// Lifecycle phase of the session. Exactly one is active; a failed job is
/// not a resting phase, it returns the session to `Configured` with the
/// error surfaced by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    FileSelected,
    Configured,
    Translating,
    Completed,
}

/// Terminal record of a successful job. Present iff the phase is
/// `Completed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedJob {
    pub preview: String,
    pub file_path: String,
    pub filename: String,
    pub download_url: String,
}

/// Immutable snapshot handed to the job runner at launch. Once issued, the
/// session locks the inputs it was built from until the job resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSnapshot {
    pub file: SelectedFile,
    pub source_lang: String,
    pub target_lang: String,
    pub provider: Provider,
    pub api_key: String,
    pub use_ai: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionRejected {
    #[error("{0}")]
    UnsupportedFile(String),
    #[error("file and languages are locked while a translation is running")]
    LockedWhileTranslating,
    #[error("a subtitle file must be selected first")]
    NoFileSelected,
    #[error("{0}")]
    InvalidPair(PairError),
    #[error("an API key for {provider} is required when AI translation is on")]
    MissingApiKey { provider: Provider },
    #[error("no translation is currently running")]
    NotTranslating,
    #[error("nothing to reset yet")]
    NothingToReset,
}

#[derive(Debug, Clone)]
pub struct Session {
    phase: Phase,
    file: Option<SelectedFile>,
    source_lang: String,
    target_lang: Option<String>,
    previous_source: String,
    previous_target: Option<String>,
    provider: Provider,
    api_key: String,
    use_ai: bool,
    job_result: Option<CompletedJob>,
}

impl Session {
    /// Seeds a fresh session from persisted settings. The session starts in
    /// `Idle` with auto-detect as the source language.
    pub fn new(provider: Provider, api_key: String, use_ai: bool) -> Self {
        Self {
            phase: Phase::Idle,
            file: None,
            source_lang: languages::AUTO.to_string(),
            target_lang: None,
            previous_source: languages::AUTO.to_string(),
            previous_target: None,
            provider,
            api_key,
            use_ai,
            job_result: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn source_lang(&self) -> &str {
        &self.source_lang
    }

    pub fn target_lang(&self) -> Option<&str> {
        self.target_lang.as_deref()
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn use_ai(&self) -> bool {
        self.use_ai
    }

    pub fn job_result(&self) -> Option<&CompletedJob> {
        self.job_result.as_ref()
    }

    /// The poller must run exactly while this is true.
    pub fn polling_expected(&self) -> bool {
        self.phase == Phase::Translating
    }

    /// File chosen. The extension guard lives here so an invalid pick leaves
    /// the session exactly as it was.
    pub fn choose_file(&mut self, candidate: SelectedFile) -> Result<(), TransitionRejected> {
        if self.phase == Phase::Translating {
            return Err(TransitionRejected::LockedWhileTranslating);
        }

        if !subtitle::has_subtitle_extension(&candidate.filename) {
            return Err(TransitionRejected::UnsupportedFile(format!(
                "only .{} subtitle files are supported (got '{}')",
                subtitle::SUBTITLE_EXTENSION,
                candidate.filename
            )));
        }

        self.file = Some(candidate);
        self.job_result = None;
        self.phase = self.ready_phase();
        Ok(())
    }

    /// File removed: back to `Idle`, preview (if any) discarded.
    pub fn remove_file(&mut self) -> Result<(), TransitionRejected> {
        if self.phase == Phase::Translating {
            return Err(TransitionRejected::LockedWhileTranslating);
        }

        self.file = None;
        self.job_result = None;
        self.phase = Phase::Idle;
        Ok(())
    }

    pub fn set_source_lang(&mut self, code: &str) -> Result<(), TransitionRejected> {
        if self.phase == Phase::Translating {
            return Err(TransitionRejected::LockedWhileTranslating);
        }

        if !languages::is_known(code) {
            return Err(TransitionRejected::InvalidPair(PairError::UnknownSource {
                code: code.to_string(),
            }));
        }

        self.previous_source = std::mem::replace(&mut self.source_lang, code.to_string());
        self.phase = self.ready_phase();
        Ok(())
    }

    /// Target chosen or changed. An empty code clears the target, dropping
    /// readiness back to `FileSelected`.
    pub fn set_target_lang(&mut self, code: &str) -> Result<(), TransitionRejected> {
        if self.phase == Phase::Translating {
            return Err(TransitionRejected::LockedWhileTranslating);
        }

        if !code.is_empty() && !languages::is_known(code) {
            return Err(TransitionRejected::InvalidPair(PairError::UnknownTarget {
                code: code.to_string(),
            }));
        }

        let accepted = (!code.is_empty()).then(|| code.to_string());
        self.previous_target = std::mem::replace(&mut self.target_lang, accepted);
        self.phase = self.ready_phase();
        Ok(())
    }

    /// Mirrors the external settings into the session. Rejected mid-job like
    /// any other mutation.
    pub fn apply_settings(
        &mut self,
        provider: Provider,
        api_key: String,
        use_ai: bool,
    ) -> Result<(), TransitionRejected> {
        if self.phase == Phase::Translating {
            return Err(TransitionRejected::LockedWhileTranslating);
        }

        self.provider = provider;
        self.api_key = api_key;
        self.use_ai = use_ai;
        Ok(())
    }

    /// Launch requested. All pre-flight guards run here, before any network
    /// activity: on success the phase is `Translating` and the returned
    /// snapshot is what the job runner must use verbatim.
    pub fn launch(&mut self) -> Result<LaunchSnapshot, TransitionRejected> {
        if self.phase == Phase::Translating {
            return Err(TransitionRejected::LockedWhileTranslating);
        }

        let Some(file) = self.file.clone() else {
            return Err(TransitionRejected::NoFileSelected);
        };

        let Some(target) = self.target_lang.clone() else {
            return Err(TransitionRejected::InvalidPair(PairError::MissingTarget));
        };

        languages::validate_pair(&self.source_lang, &target)
            .map_err(TransitionRejected::InvalidPair)?;

        if self.use_ai && self.api_key.trim().is_empty() {
            return Err(TransitionRejected::MissingApiKey {
                provider: self.provider,
            });
        }

        self.job_result = None;
        self.phase = Phase::Translating;
        Ok(LaunchSnapshot {
            file,
            source_lang: self.source_lang.clone(),
            target_lang: target,
            provider: self.provider,
            api_key: self.api_key.clone(),
            use_ai: self.use_ai,
        })
    }

    /// The job runner resolved successfully.
    pub fn job_succeeded(&mut self, job: CompletedJob) -> Result<(), TransitionRejected> {
        if self.phase != Phase::Translating {
            return Err(TransitionRejected::NotTranslating);
        }

        self.job_result = Some(job);
        self.phase = Phase::Completed;
        Ok(())
    }

    /// The job runner resolved with an error: back to `Configured`, inputs
    /// intact, ready for another attempt.
    pub fn job_failed(&mut self) -> Result<(), TransitionRejected> {
        if self.phase != Phase::Translating {
            return Err(TransitionRejected::NotTranslating);
        }

        self.job_result = None;
        self.phase = self.ready_phase();
        Ok(())
    }

    /// "Translate another": full reset to `Idle`. The settings mirror
    /// survives, everything job-specific is cleared.
    pub fn reset(&mut self) -> Result<(), TransitionRejected> {
        if self.phase == Phase::Translating {
            return Err(TransitionRejected::LockedWhileTranslating);
        }
        if self.phase == Phase::Idle {
            return Err(TransitionRejected::NothingToReset);
        }

        self.file = None;
        self.target_lang = None;
        self.source_lang = languages::AUTO.to_string();
        self.previous_source = languages::AUTO.to_string();
        self.previous_target = None;
        self.job_result = None;
        self.phase = Phase::Idle;
        Ok(())
    }

    /// Readiness from the configured inputs alone, ignoring job phases.
    fn ready_phase(&self) -> Phase {
        if self.file.is_none() {
            return Phase::Idle;
        }

        let pair_ok = self
            .target_lang
            .as_deref()
            .is_some_and(|target| languages::validate_pair(&self.source_lang, target).is_ok());
        if pair_ok {
            Phase::Configured
        } else {
            Phase::FileSelected
        }
    }
}

/// Enablement of every interactive control, derived purely from the session
/// phase. Event handlers consult this and never enable anything on their
/// own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlGates {
    pub pick_file: bool,
    pub remove_file: bool,
    pub edit_languages: bool,
    pub launch: bool,
    pub download: bool,
    pub reset: bool,
    pub open_settings: bool,
}

impl ControlGates {
    pub fn for_session(session: &Session) -> Self {
        match session.phase() {
            Phase::Idle => Self {
                pick_file: true,
                remove_file: false,
                edit_languages: false,
                launch: false,
                download: false,
                reset: false,
                open_settings: true,
            },
            Phase::FileSelected => Self {
                pick_file: true,
                remove_file: true,
                edit_languages: true,
                launch: false,
                download: false,
                reset: true,
                open_settings: true,
            },
            Phase::Configured => Self {
                pick_file: true,
                remove_file: true,
                edit_languages: true,
                launch: true,
                download: false,
                reset: true,
                open_settings: true,
            },
            Phase::Translating => Self {
                pick_file: false,
                remove_file: false,
                edit_languages: false,
                launch: false,
                download: false,
                reset: false,
                open_settings: false,
            },
            Phase::Completed => Self {
                pick_file: false,
                remove_file: false,
                edit_languages: false,
                launch: false,
                download: true,
                reset: true,
                open_settings: true,
            },
        }
    }
}
