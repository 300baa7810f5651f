//! Background workers for one translation job: a single submit thread for
//! the upload and a single poll thread feeding progress samples back over a
//! channel. Both are tagged with the launch token so events from a
//! superseded job are ignored by the flow.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use sublingo_app::JobError;
use sublingo_app::translate::submit_upload;
use sublingo_core::backend::{Backend, TranslationUpload};
use sublingo_core::progress::ProgressSample;
use sublingo_core::session::CompletedJob;

/// How often the poll thread asks the backend for progress. Sleeps happen in
/// short slices so a stop request lands promptly.
const POLL_INTERVAL: Duration = Duration::from_millis(800);
const POLL_SLICE: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub(crate) enum JobEvent {
    Resolved {
        token: u64,
        result: Result<CompletedJob, JobError>,
    },
}

#[derive(Debug)]
pub(crate) enum PollEvent {
    Sample { token: u64, sample: ProgressSample },
    Failed { token: u64, message: String },
}

pub(crate) trait TranslateWorker: Send + Sync {
    fn spawn_submit(&self, upload: TranslationUpload, token: u64) -> Receiver<JobEvent>;
    fn spawn_poll(&self, token: u64, stop: Arc<AtomicBool>) -> Receiver<PollEvent>;
}

pub(crate) struct SystemTranslateWorker {
    backend: Arc<dyn Backend>,
    server_url: String,
}

impl SystemTranslateWorker {
    pub(crate) fn new(backend: Arc<dyn Backend>, server_url: String) -> Self {
        Self {
            backend,
            server_url,
        }
    }
}

impl TranslateWorker for SystemTranslateWorker {
    fn spawn_submit(&self, upload: TranslationUpload, token: u64) -> Receiver<JobEvent> {
        let (sender, receiver) = mpsc::channel();
        let backend = Arc::clone(&self.backend);
        let server_url = self.server_url.clone();
        std::thread::spawn(move || {
            let result = submit_upload(backend.as_ref(), &server_url, &upload);
            let _ = sender.send(JobEvent::Resolved { token, result });
        });
        receiver
    }

    fn spawn_poll(&self, token: u64, stop: Arc<AtomicBool>) -> Receiver<PollEvent> {
        let (sender, receiver) = mpsc::channel();
        let backend = Arc::clone(&self.backend);
        std::thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                // a failed poll is advisory: log it, keep polling
                let event = match backend.fetch_progress() {
                    Ok(report) => PollEvent::Sample {
                        token,
                        sample: ProgressSample::from_report(&report),
                    },
                    Err(error) => {
                        log::warn!("progress poll failed: {error}");
                        PollEvent::Failed {
                            token,
                            message: error.to_string(),
                        }
                    }
                };

                if sender.send(event).is_err() {
                    break;
                }

                let mut slept = Duration::ZERO;
                while slept < POLL_INTERVAL {
                    if stop.load(Ordering::Relaxed) {
                        return;
                    }
                    std::thread::sleep(POLL_SLICE);
                    slept += POLL_SLICE;
                }
            }
        });
        receiver
    }
}

/// Owns the live poll thread for the current job. Stopping is idempotent and
/// also happens on drop, so no exit path from the translating phase can leak
/// a running poller.
#[derive(Debug)]
pub(crate) struct PollerHandle {
    token: u64,
    stop: Arc<AtomicBool>,
    pub(crate) events: Receiver<PollEvent>,
}

impl PollerHandle {
    pub(crate) fn new(token: u64, stop: Arc<AtomicBool>, events: Receiver<PollEvent>) -> Self {
        Self {
            token,
            stop,
            events,
        }
    }

    pub(crate) fn token(&self) -> u64 {
        self.token
    }

    pub(crate) fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}
