//! The job runner: one upload-and-translate request per launch, split into
//! a local preparation half (no network, all user-correctable failures) and
//! a submission half (network, server/transport failures). The split lets
//! the UI refuse bad launches before it ever starts a poller.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use sublingo_core::backend::{Backend, BackendError, HttpBackend, TranslationUpload};
use sublingo_core::languages;
use sublingo_core::session::{CompletedJob, LaunchSnapshot};
use sublingo_core::subtitle;

use crate::App;

/// Job-level error taxonomy. All three unlock the UI the same way; only
/// `Validation` is guaranteed to have issued no request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("{0}")]
    Validation(String),
    #[error("translation failed: {message}")]
    Server { status: u16, message: String },
    #[error("could not reach the translation server: {message}")]
    Network { message: String },
}

impl From<BackendError> for JobError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::Server { status, message } => Self::Server { status, message },
            BackendError::Network { message } => Self::Network { message },
        }
    }
}

/// Builds the multipart payload from a launch snapshot. Re-checks the gate
/// invariants at the job boundary and reads the subtitle file; every failure
/// here is a `Validation` error and no request has been made.
pub fn prepare_upload(snapshot: &LaunchSnapshot) -> Result<TranslationUpload, JobError> {
    if !subtitle::has_subtitle_extension(&snapshot.file.filename) {
        return Err(JobError::Validation(format!(
            "only .{} subtitle files are supported (got '{}')",
            subtitle::SUBTITLE_EXTENSION,
            snapshot.file.filename
        )));
    }

    languages::validate_pair(&snapshot.source_lang, &snapshot.target_lang)
        .map_err(|error| JobError::Validation(error.to_string()))?;

    if snapshot.use_ai && snapshot.api_key.trim().is_empty() {
        return Err(JobError::Validation(format!(
            "an API key for {} is required when AI translation is on",
            snapshot.provider
        )));
    }

    let content = fs::read(&snapshot.file.path).map_err(|error| {
        JobError::Validation(format!(
            "could not read {}: {error}",
            snapshot.file.path.display()
        ))
    })?;

    if content.is_empty() {
        return Err(JobError::Validation(format!(
            "{} is empty",
            snapshot.file.path.display()
        )));
    }

    Ok(TranslationUpload {
        file_name: snapshot.file.filename.clone(),
        content,
        source_lang: snapshot.source_lang.clone(),
        target_lang: snapshot.target_lang.clone(),
        provider: snapshot.provider.as_str().to_string(),
        api_key: snapshot.api_key.clone(),
        use_ai: snapshot.use_ai,
    })
}

/// Issues the `/translate` request and shapes the outcome for the session.
/// Runs on a worker thread when called from the TUI.
pub fn submit_upload(
    backend: &dyn Backend,
    server_url: &str,
    upload: &TranslationUpload,
) -> Result<CompletedJob, JobError> {
    let ready = backend.submit_translation(upload)?;
    Ok(CompletedJob {
        download_url: HttpBackend::download_url(server_url, &ready.file_path, &ready.filename),
        preview: ready.preview,
        file_path: ready.file_path,
        filename: ready.filename,
    })
}

impl App {
    /// Prepare and submit in one call.
    pub fn translate_execute(&self, snapshot: &LaunchSnapshot) -> Result<CompletedJob, JobError> {
        let upload = prepare_upload(snapshot)?;
        submit_upload(self.shared_backend().as_ref(), self.server_url(), &upload)
    }

    /// Fetches the translated file and writes it next to wherever the caller
    /// wants it, using the server-provided filename.
    pub fn save_translated(&self, job: &CompletedJob, dest_dir: &Path) -> Result<PathBuf> {
        let bytes = self
            .shared_backend()
            .download(&job.file_path, &job.filename)
            .with_context(|| format!("failed to download {}", job.filename))?;

        let destination = dest_dir.join(&job.filename);
        fs::write(&destination, bytes)
            .with_context(|| format!("failed to write {}", destination.display()))?;
        Ok(destination)
    }
}
