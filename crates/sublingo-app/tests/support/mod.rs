use std::collections::BTreeMap;
use std::sync::Mutex;

use sublingo_core::backend::{Backend, BackendError, TranslationUpload};
use sublingo_core::protocol::{ProgressReport, TranslationReady};

/// Scripted backend double recording every call it receives.
pub struct FakeBackend {
    pub submit_result: Result<TranslationReady, BackendError>,
    pub save_key_result: Result<(), BackendError>,
    pub download_body: Vec<u8>,
    pub submitted: Mutex<Vec<TranslationUpload>>,
    pub saved_keys: Mutex<Vec<(String, String)>>,
    pub downloads: Mutex<Vec<(String, String)>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            submit_result: Ok(TranslationReady {
                preview: "Bonjour".to_string(),
                file_path: "abc".to_string(),
                filename: "movie_fr.srt".to_string(),
            }),
            save_key_result: Ok(()),
            download_body: b"translated".to_vec(),
            submitted: Mutex::new(Vec::new()),
            saved_keys: Mutex::new(Vec::new()),
            downloads: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.submitted.lock().expect("submitted lock").len()
            + self.saved_keys.lock().expect("saved lock").len()
            + self.downloads.lock().expect("downloads lock").len()
    }
}

impl Backend for FakeBackend {
    fn fetch_progress(&self) -> Result<ProgressReport, BackendError> {
        Ok(ProgressReport::default())
    }

    fn submit_translation(
        &self,
        upload: &TranslationUpload,
    ) -> Result<TranslationReady, BackendError> {
        self.submitted
            .lock()
            .expect("submitted lock")
            .push(upload.clone());
        self.submit_result.clone()
    }

    fn fetch_api_keys(&self) -> Result<BTreeMap<String, String>, BackendError> {
        Ok(BTreeMap::new())
    }

    fn save_api_key(&self, provider: &str, api_key: &str) -> Result<(), BackendError> {
        self.saved_keys
            .lock()
            .expect("saved lock")
            .push((provider.to_string(), api_key.to_string()));
        self.save_key_result.clone()
    }

    fn download(&self, file_path: &str, filename: &str) -> Result<Vec<u8>, BackendError> {
        self.downloads
            .lock()
            .expect("downloads lock")
            .push((file_path.to_string(), filename.to_string()));
        Ok(self.download_body.clone())
    }
}
