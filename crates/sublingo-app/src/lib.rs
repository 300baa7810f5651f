pub mod runtime;
pub mod translate;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use sublingo_core::backend::Backend;
use sublingo_core::doctor::{DoctorReport, run_doctor};
use sublingo_core::providers::{self, Provider};
use sublingo_core::settings::{Settings, load_settings, save_settings};

pub use translate::JobError;

/// Application facade wiring the backend client, the resolved server URL
/// and the settings location together. Everything above this (TUI, CLI)
/// talks to the backend through here. The backend is shared so worker
/// threads can hold onto it across a long upload.
pub struct App {
    backend: Arc<dyn Backend>,
    server_url: String,
    settings_path: PathBuf,
}

impl App {
    pub fn new(backend: Arc<dyn Backend>, server_url: String, settings_path: PathBuf) -> Self {
        Self {
            backend,
            server_url,
            settings_path,
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Shared handle for worker threads.
    pub fn shared_backend(&self) -> Arc<dyn Backend> {
        Arc::clone(&self.backend)
    }

    pub fn doctor(&self) -> DoctorReport {
        run_doctor(self.backend.as_ref(), &self.server_url)
    }

    /// Loads settings, surfacing parse/validation problems with a pointer at
    /// the offending file. Used both as the root-command gate and by the
    /// flows.
    pub fn load_settings(&self) -> Result<Settings> {
        load_settings(&self.settings_path).with_context(|| {
            format!(
                "invalid settings at {}\nFix or delete the file and retry.",
                self.settings_path.display()
            )
        })
    }

    pub fn store_settings(&self, settings: &Settings) -> Result<()> {
        save_settings(&self.settings_path, settings).with_context(|| {
            format!(
                "failed to persist settings at {}",
                self.settings_path.display()
            )
        })
    }

    /// Masked keys as stored on the server, for display in the settings
    /// flow.
    pub fn fetch_masked_keys(&self) -> Result<BTreeMap<String, String>> {
        self.backend
            .fetch_api_keys()
            .context("failed to fetch stored API keys from the server")
    }

    /// Saves a provider key on the server and mirrors it (plus the active
    /// provider and AI flag) into local settings. Returns the masked form
    /// for display.
    pub fn save_provider_key(
        &self,
        provider: Provider,
        api_key: &str,
        use_ai: bool,
    ) -> Result<String> {
        let api_key = api_key.trim();
        if let Some(issue) = providers::key_format_issue(provider, api_key) {
            bail!("{issue}");
        }

        self.backend
            .save_api_key(provider.as_str(), api_key)
            .with_context(|| format!("failed to save the {provider} API key on the server"))?;

        let mut settings = self.load_settings()?;
        settings.set_provider(provider);
        settings.use_ai = use_ai;
        settings.set_key(provider, api_key);
        self.store_settings(&settings)?;

        Ok(providers::mask_key(api_key))
    }
}
