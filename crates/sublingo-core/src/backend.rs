//! HTTP client for the translation backend, behind a trait so flows and
//! tests can substitute fakes. All calls are blocking and carry bounded
//! timeouts; callers that must not block (the TUI) run them on worker
//! threads.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::blocking::multipart::{Form, Part};
use thiserror::Error;

use crate::protocol::{ErrorBody, ProgressReport, SaveKeyRequest, TranslationReady};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

const POLL_TIMEOUT: Duration = Duration::from_secs(5);
const CONTROL_TIMEOUT: Duration = Duration::from_secs(10);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);
/// A hung upload eventually fails the job instead of leaving the session
/// translating forever.
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Transport-level error taxonomy: the server answered with a rejection, or
/// no usable response arrived at all. Both carry plain strings so they can
/// cross thread boundaries and be compared in tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("translation server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("could not reach the translation server: {message}")]
    Network { message: String },
}

impl From<reqwest::Error> for BackendError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network {
            message: error.to_string(),
        }
    }
}

/// Everything the upload the server needs for one `/translate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUpload {
    pub file_name: String,
    pub content: Vec<u8>,
    pub source_lang: String,
    pub target_lang: String,
    pub provider: String,
    pub api_key: String,
    pub use_ai: bool,
}

pub trait Backend: Send + Sync {
    fn fetch_progress(&self) -> Result<ProgressReport, BackendError>;
    fn submit_translation(&self, upload: &TranslationUpload)
    -> Result<TranslationReady, BackendError>;
    fn fetch_api_keys(&self) -> Result<BTreeMap<String, String>, BackendError>;
    fn save_api_key(&self, provider: &str, api_key: &str) -> Result<(), BackendError>;
    fn download(&self, file_path: &str, filename: &str) -> Result<Vec<u8>, BackendError>;
}

pub struct HttpBackend {
    base_url: String,
    client: Client,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(CONTROL_TIMEOUT).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Display form of the download link, shown on the done screen so the
    /// result can also be fetched from outside the client.
    pub fn download_url(base_url: &str, file_path: &str, filename: &str) -> String {
        format!(
            "{}/download/{file_path}?filename={filename}",
            base_url.trim_end_matches('/')
        )
    }
}

impl Backend for HttpBackend {
    fn fetch_progress(&self) -> Result<ProgressReport, BackendError> {
        let response = self
            .client
            .get(self.endpoint("/progress"))
            .timeout(POLL_TIMEOUT)
            .send()?;
        let response = reject_error_status(response)?;
        Ok(response.json()?)
    }

    fn submit_translation(
        &self,
        upload: &TranslationUpload,
    ) -> Result<TranslationReady, BackendError> {
        let file_part = Part::bytes(upload.content.clone())
            .file_name(upload.file_name.clone())
            .mime_str("application/x-subrip")?;
        let form = Form::new()
            .text("source_lang", upload.source_lang.clone())
            .text("target_lang", upload.target_lang.clone())
            .text("provider", upload.provider.clone())
            .text("api_key", upload.api_key.clone())
            .text("use_ai", if upload.use_ai { "true" } else { "false" })
            .part("file", file_part);

        let response = self
            .client
            .post(self.endpoint("/translate"))
            .timeout(UPLOAD_TIMEOUT)
            .multipart(form)
            .send()?;
        let response = reject_error_status(response)?;
        Ok(response.json()?)
    }

    fn fetch_api_keys(&self) -> Result<BTreeMap<String, String>, BackendError> {
        let response = self.client.get(self.endpoint("/get-api-keys")).send()?;
        let response = reject_error_status(response)?;
        Ok(response.json()?)
    }

    fn save_api_key(&self, provider: &str, api_key: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.endpoint("/save-api-key"))
            .json(&SaveKeyRequest { provider, api_key })
            .send()?;
        reject_error_status(response)?;
        Ok(())
    }

    fn download(&self, file_path: &str, filename: &str) -> Result<Vec<u8>, BackendError> {
        let response = self
            .client
            .get(self.endpoint(&format!("/download/{file_path}")))
            .query(&[("filename", filename)])
            .timeout(DOWNLOAD_TIMEOUT)
            .send()?;
        let response = reject_error_status(response)?;
        Ok(response.bytes()?.to_vec())
    }
}

/// Non-2xx responses become `Server` errors carrying the body's `error`
/// field when the server provided one.
fn reject_error_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    Err(BackendError::Server {
        status: status.as_u16(),
        message: server_message(status, &body),
    })
}

fn server_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| format!("request failed with HTTP {}", status.as_u16()))
}
