//! Wire types for the translation backend. Server behavior is out of scope;
//! these model the request/response bodies only.

use serde::{Deserialize, Serialize};

/// Body of `GET /progress`. Every field is optional on the wire: the server
/// reports `processed` as a preformatted `"X/Y"` string which may be empty
/// before counting starts, and older deployments omit `status`/`mode`
/// entirely. Parsing into a typed sample lives in [`crate::progress`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProgressReport {
    #[serde(default)]
    pub progress: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub processed: Option<String>,
}

/// Success body of `POST /translate`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TranslationReady {
    pub preview: String,
    pub file_path: String,
    pub filename: String,
}

/// Error body the server attaches to non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `POST /save-api-key`.
#[derive(Debug, Clone, Serialize)]
pub struct SaveKeyRequest<'a> {
    pub provider: &'a str,
    pub api_key: &'a str,
}
