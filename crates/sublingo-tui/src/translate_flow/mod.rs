mod keys;
mod render;
pub(crate) mod worker;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Instant;

use anyhow::Result;
use crossterm::event::KeyEvent;
use tui_input::Input;

use sublingo_app::{App, JobError};
use sublingo_core::backend::TranslationUpload;
use sublingo_core::progress::{ProgressEstimator, ProgressView};
use sublingo_core::session::{CompletedJob, LaunchSnapshot, Phase, Session};
use sublingo_core::settings::Settings;

use crate::UiExit;
use crate::ui::loading::LoadingState;
use crate::ui::picker::FilterPicker;

use self::worker::{JobEvent, PollEvent, PollerHandle, SystemTranslateWorker, TranslateWorker};

/// Everything the flow needs from the application layer, as a trait so the
/// flow is testable without a server or a filesystem layout.
pub(crate) trait TranslateOps {
    fn settings(&self) -> Result<Settings>;
    fn prepare(&self, snapshot: &LaunchSnapshot) -> Result<TranslationUpload, JobError>;
    fn save_to(&self, job: &CompletedJob, dest_dir: &Path) -> Result<PathBuf>;
}

impl TranslateOps for App {
    fn settings(&self) -> Result<Settings> {
        self.load_settings()
    }

    fn prepare(&self, snapshot: &LaunchSnapshot) -> Result<TranslationUpload, JobError> {
        sublingo_app::translate::prepare_upload(snapshot)
    }

    fn save_to(&self, job: &CompletedJob, dest_dir: &Path) -> Result<PathBuf> {
        self.save_translated(job, dest_dir)
    }
}

/// Which screen of the wizard is showing. The session phase stays the
/// authority for what is allowed; the view only decides what is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    FileEntry,
    SourcePicker,
    TargetPicker,
    Review,
    Translating,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FlowSignal {
    Continue,
    Exit(UiExit),
}

struct TranslateFlow {
    session: Session,
    worker: Arc<dyn TranslateWorker>,
    view: View,
    file_input: Input,
    file_error: Option<String>,
    source_picker: Option<FilterPicker>,
    target_picker: Option<FilterPicker>,
    /// Job-level failure shown on the review screen.
    error_banner: Option<String>,
    /// Transient warning, e.g. an edit attempt while translating.
    notice: Option<String>,
    save_notice: Option<String>,
    loading: LoadingState,
    estimator: ProgressEstimator,
    progress: Option<ProgressView>,
    poller: Option<PollerHandle>,
    job_events: Option<Receiver<JobEvent>>,
    active_job_token: Option<u64>,
    next_token: u64,
}

pub(crate) struct TranslateScreen {
    flow: TranslateFlow,
}

impl TranslateScreen {
    pub(crate) fn new(app: &App) -> Result<Self> {
        let worker = Arc::new(SystemTranslateWorker::new(
            app.shared_backend(),
            app.server_url().to_string(),
        ));
        Ok(Self {
            flow: TranslateFlow::new(app, worker)?,
        })
    }

    pub(crate) fn render(&self, frame: &mut ratatui::Frame<'_>) {
        self.flow.render(frame);
    }

    pub(crate) fn on_key(&mut self, key: KeyEvent, app: &App) -> Result<Option<UiExit>> {
        match self.flow.on_key(key, app) {
            FlowSignal::Continue => Ok(None),
            FlowSignal::Exit(exit) => Ok(Some(exit)),
        }
    }

    pub(crate) fn on_tick(&mut self) {
        self.flow.on_tick();
    }

    /// The root loop keeps draining worker events while a job is in flight.
    pub(crate) fn is_busy(&self) -> bool {
        self.flow.session.phase() == Phase::Translating
    }
}

impl TranslateFlow {
    fn new(ops: &dyn TranslateOps, worker: Arc<dyn TranslateWorker>) -> Result<Self> {
        let settings = ops.settings()?;
        let session = Session::new(
            settings.provider(),
            settings.active_key().to_string(),
            settings.use_ai,
        );

        Ok(Self {
            session,
            worker,
            view: View::FileEntry,
            file_input: Input::default(),
            file_error: None,
            source_picker: None,
            target_picker: None,
            error_banner: None,
            notice: None,
            save_notice: None,
            loading: LoadingState::default(),
            estimator: ProgressEstimator::new(),
            progress: None,
            poller: None,
            job_events: None,
            active_job_token: None,
            next_token: 1,
        })
    }

    /// Launch path: the session gate first (no network, no state change on
    /// rejection), then local payload preparation, and only with a payload
    /// in hand the workers. A validation failure therefore never starts a
    /// poller.
    fn request_launch(&mut self, ops: &dyn TranslateOps) {
        self.error_banner = None;

        let snapshot = match self.session.launch() {
            Ok(snapshot) => snapshot,
            Err(rejection) => {
                self.error_banner = Some(rejection.to_string());
                return;
            }
        };

        let upload = match ops.prepare(&snapshot) {
            Ok(upload) => upload,
            Err(error) => {
                // locally caught before any request: unlock and stay put
                let _ = self.session.job_failed();
                self.error_banner = Some(error.to_string());
                return;
            }
        };

        let token = self.next_token;
        self.next_token = self.next_token.saturating_add(1);
        self.active_job_token = Some(token);

        self.estimator.reset();
        self.progress = None;
        self.start_polling(token);
        self.job_events = Some(self.worker.spawn_submit(upload, token));
        self.view = View::Translating;
    }

    /// Idempotent: any previous poller is stopped before a new one starts,
    /// so there is never more than one live poll timer.
    fn start_polling(&mut self, token: u64) {
        self.stop_polling();
        let stop = Arc::new(AtomicBool::new(false));
        let events = self.worker.spawn_poll(token, Arc::clone(&stop));
        self.poller = Some(PollerHandle::new(token, stop, events));
    }

    fn stop_polling(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop();
        }
    }

    fn on_tick(&mut self) {
        if self.session.phase() != Phase::Translating {
            return;
        }
        self.loading.next_frame();

        let mut samples = Vec::new();
        if let Some(poller) = &self.poller {
            loop {
                match poller.events.try_recv() {
                    Ok(PollEvent::Sample { token, sample })
                        if Some(token) == self.active_job_token =>
                    {
                        samples.push(sample);
                    }
                    // a failed poll was already logged by the worker; a
                    // stale token belongs to a superseded job
                    Ok(PollEvent::Failed { .. }) | Ok(PollEvent::Sample { .. }) => {}
                    Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
                }
            }
        }

        let now = Instant::now();
        for sample in samples {
            if let Some(view) = self.estimator.observe(&sample, now) {
                self.progress = Some(view);
            }
        }

        let mut resolution = None;
        let mut disconnected = false;
        if let Some(receiver) = &self.job_events {
            loop {
                match receiver.try_recv() {
                    Ok(JobEvent::Resolved { token, result })
                        if Some(token) == self.active_job_token =>
                    {
                        resolution = Some(result);
                        break;
                    }
                    Ok(JobEvent::Resolved { .. }) => {}
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }
        }

        if let Some(result) = resolution {
            self.resolve_job(result);
        } else if disconnected {
            self.resolve_job(Err(JobError::Network {
                message: "translation worker ended unexpectedly".to_string(),
            }));
        }
    }

    /// Single exit point from the translating phase. The poller is stopped
    /// on every path through here.
    fn resolve_job(&mut self, result: Result<CompletedJob, JobError>) {
        self.stop_polling();
        self.job_events = None;
        self.active_job_token = None;

        match result {
            Ok(job) => {
                // one final terminal render of the progress surface
                self.progress = Some(ProgressView {
                    percent: 100,
                    status: "Translation complete".to_string(),
                    eta: None,
                    mode: self
                        .progress
                        .as_ref()
                        .and_then(|view| view.mode.clone()),
                });
                if self.session.job_succeeded(job).is_ok() {
                    self.view = View::Done;
                }
            }
            Err(error) => {
                let _ = self.session.job_failed();
                self.error_banner = Some(error.to_string());
                self.progress = None;
                self.view = View::Review;
            }
        }
    }

    /// "Translate another": resets the session and every piece of
    /// job-specific screen state.
    fn begin_next_run(&mut self) {
        if self.session.reset().is_err() {
            return;
        }
        self.view = View::FileEntry;
        self.file_input = Input::default();
        self.file_error = None;
        self.source_picker = None;
        self.target_picker = None;
        self.error_banner = None;
        self.notice = None;
        self.save_notice = None;
        self.estimator.reset();
        self.progress = None;
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::sync::atomic::Ordering;
    use std::sync::mpsc::{self, Sender};

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::*;

    struct FakeOps {
        settings: Settings,
        prepare_error: Option<JobError>,
        prepare_calls: Mutex<u32>,
        saved: Mutex<Vec<(String, PathBuf)>>,
    }

    impl FakeOps {
        fn new() -> Self {
            let mut settings = Settings::default();
            settings.use_ai = false;
            Self {
                settings,
                prepare_error: None,
                prepare_calls: Mutex::new(0),
                saved: Mutex::new(Vec::new()),
            }
        }
    }

    impl TranslateOps for FakeOps {
        fn settings(&self) -> Result<Settings> {
            Ok(self.settings.clone())
        }

        fn prepare(&self, snapshot: &LaunchSnapshot) -> Result<TranslationUpload, JobError> {
            *self.prepare_calls.lock().expect("calls lock") += 1;
            if let Some(error) = &self.prepare_error {
                return Err(error.clone());
            }
            Ok(TranslationUpload {
                file_name: snapshot.file.filename.clone(),
                content: b"subtitle".to_vec(),
                source_lang: snapshot.source_lang.clone(),
                target_lang: snapshot.target_lang.clone(),
                provider: snapshot.provider.as_str().to_string(),
                api_key: snapshot.api_key.clone(),
                use_ai: snapshot.use_ai,
            })
        }

        fn save_to(&self, job: &CompletedJob, dest_dir: &Path) -> Result<PathBuf> {
            let destination = dest_dir.join(&job.filename);
            self.saved
                .lock()
                .expect("saved lock")
                .push((job.filename.clone(), destination.clone()));
            Ok(destination)
        }
    }

    #[derive(Default)]
    struct ScriptedWorker {
        submit_calls: Mutex<Vec<u64>>,
        poll_calls: Mutex<Vec<u64>>,
        submit_senders: Mutex<Vec<Sender<JobEvent>>>,
        poll_senders: Mutex<Vec<Sender<PollEvent>>>,
        stop_flags: Mutex<Vec<Arc<AtomicBool>>>,
    }

    impl ScriptedWorker {
        fn submit_count(&self) -> usize {
            self.submit_calls.lock().expect("submit lock").len()
        }

        fn poll_count(&self) -> usize {
            self.poll_calls.lock().expect("poll lock").len()
        }

        fn send_poll(&self, event: PollEvent) {
            self.poll_senders
                .lock()
                .expect("poll senders lock")
                .last()
                .expect("poll sender")
                .send(event)
                .expect("send poll event");
        }

        fn send_job(&self, event: JobEvent) {
            self.submit_senders
                .lock()
                .expect("submit senders lock")
                .last()
                .expect("submit sender")
                .send(event)
                .expect("send job event");
        }

        fn stop_flag(&self, index: usize) -> Arc<AtomicBool> {
            Arc::clone(&self.stop_flags.lock().expect("flags lock")[index])
        }
    }

    impl TranslateWorker for ScriptedWorker {
        fn spawn_submit(&self, _upload: TranslationUpload, token: u64) -> Receiver<JobEvent> {
            self.submit_calls.lock().expect("submit lock").push(token);
            let (sender, receiver) = mpsc::channel();
            self.submit_senders
                .lock()
                .expect("submit senders lock")
                .push(sender);
            receiver
        }

        fn spawn_poll(&self, token: u64, stop: Arc<AtomicBool>) -> Receiver<PollEvent> {
            self.poll_calls.lock().expect("poll lock").push(token);
            self.stop_flags.lock().expect("flags lock").push(stop);
            let (sender, receiver) = mpsc::channel();
            self.poll_senders
                .lock()
                .expect("poll senders lock")
                .push(sender);
            receiver
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(flow: &mut TranslateFlow, ops: &FakeOps, text: &str) {
        for character in text.chars() {
            flow.on_key(key(KeyCode::Char(character)), ops);
        }
    }

    fn write_subtitle(dir: &Path) -> PathBuf {
        let path = dir.join("movie.srt");
        std::fs::write(&path, "1\n00:00:01,000 --> 00:00:02,000\nhello\n")
            .expect("write subtitle");
        path
    }

    fn flow_with(ops: &FakeOps, worker: Arc<ScriptedWorker>) -> TranslateFlow {
        TranslateFlow::new(ops, worker).expect("flow")
    }

    /// Drives the wizard up to the review screen with auto -> fr.
    fn advance_to_review(flow: &mut TranslateFlow, ops: &FakeOps, subtitle: &Path) {
        type_text(flow, ops, &subtitle.display().to_string());
        flow.on_key(key(KeyCode::Enter), ops);
        assert_eq!(flow.view, View::SourcePicker, "{:?}", flow.file_error);

        flow.on_key(key(KeyCode::Enter), ops); // keep auto
        assert_eq!(flow.view, View::TargetPicker);

        // filter down to French, then pick it
        flow.on_key(key(KeyCode::Tab), ops);
        type_text(flow, ops, "french");
        flow.on_key(key(KeyCode::Tab), ops);
        flow.on_key(key(KeyCode::Enter), ops);
        assert_eq!(flow.view, View::Review);
        assert_eq!(flow.session.phase(), Phase::Configured);
    }

    fn launch(flow: &mut TranslateFlow, ops: &FakeOps) {
        flow.on_key(key(KeyCode::Enter), ops);
        assert_eq!(flow.session.phase(), Phase::Translating);
        assert_eq!(flow.view, View::Translating);
    }

    fn completed_job() -> CompletedJob {
        CompletedJob {
            preview: "Bonjour".to_string(),
            file_path: "abc".to_string(),
            filename: "movie_fr.srt".to_string(),
            download_url: "http://127.0.0.1:5000/download/abc?filename=movie_fr.srt".to_string(),
        }
    }

    #[test]
    fn wrong_extension_is_rejected_at_the_file_step() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = temp.path().join("movie.txt");
        std::fs::write(&path, "not a subtitle").expect("write");

        let ops = FakeOps::new();
        let mut flow = flow_with(&ops, Arc::new(ScriptedWorker::default()));
        type_text(&mut flow, &ops, &path.display().to_string());
        flow.on_key(key(KeyCode::Enter), &ops);

        assert_eq!(flow.view, View::FileEntry);
        assert_eq!(flow.session.phase(), Phase::Idle);
        assert!(flow.file_error.as_deref().expect("error").contains(".srt"));
    }

    #[test]
    fn launch_starts_exactly_one_submit_and_one_poller() {
        let temp = tempfile::tempdir().expect("temp dir");
        let subtitle = write_subtitle(temp.path());
        let ops = FakeOps::new();
        let worker = Arc::new(ScriptedWorker::default());
        let mut flow = flow_with(&ops, worker.clone());

        advance_to_review(&mut flow, &ops, &subtitle);
        launch(&mut flow, &ops);

        assert_eq!(worker.submit_count(), 1);
        assert_eq!(worker.poll_count(), 1);
        assert_eq!(*ops.prepare_calls.lock().expect("calls"), 1);
    }

    #[test]
    fn validation_failure_spawns_nothing_and_unlocks() {
        let temp = tempfile::tempdir().expect("temp dir");
        let subtitle = write_subtitle(temp.path());
        let mut ops = FakeOps::new();
        ops.prepare_error = Some(JobError::Validation("file vanished".to_string()));
        let worker = Arc::new(ScriptedWorker::default());
        let mut flow = flow_with(&ops, worker.clone());

        advance_to_review(&mut flow, &ops, &subtitle);
        flow.on_key(key(KeyCode::Enter), &ops);

        assert_eq!(flow.session.phase(), Phase::Configured);
        assert_eq!(flow.view, View::Review);
        assert_eq!(worker.submit_count(), 0);
        assert_eq!(worker.poll_count(), 0, "the poller must never start");
        assert!(flow.error_banner.as_deref().expect("banner").contains("file vanished"));
    }

    #[test]
    fn same_language_pair_cannot_launch() {
        let temp = tempfile::tempdir().expect("temp dir");
        let subtitle = write_subtitle(temp.path());
        let ops = FakeOps::new();
        let worker = Arc::new(ScriptedWorker::default());
        let mut flow = flow_with(&ops, worker.clone());

        type_text(&mut flow, &ops, &subtitle.display().to_string());
        flow.on_key(key(KeyCode::Enter), &ops);

        // pick English as source and as target
        flow.on_key(key(KeyCode::Tab), &ops);
        type_text(&mut flow, &ops, "english");
        flow.on_key(key(KeyCode::Tab), &ops);
        flow.on_key(key(KeyCode::Enter), &ops);

        flow.on_key(key(KeyCode::Tab), &ops);
        type_text(&mut flow, &ops, "english");
        flow.on_key(key(KeyCode::Tab), &ops);
        flow.on_key(key(KeyCode::Enter), &ops);
        assert_eq!(flow.view, View::Review);
        assert_eq!(flow.session.phase(), Phase::FileSelected);

        flow.on_key(key(KeyCode::Enter), &ops);
        assert_eq!(flow.session.phase(), Phase::FileSelected);
        assert_eq!(worker.submit_count(), 0);
        assert!(flow.error_banner.is_some());
    }

    #[test]
    fn progress_samples_update_the_rendered_view() {
        let temp = tempfile::tempdir().expect("temp dir");
        let subtitle = write_subtitle(temp.path());
        let ops = FakeOps::new();
        let worker = Arc::new(ScriptedWorker::default());
        let mut flow = flow_with(&ops, worker.clone());

        advance_to_review(&mut flow, &ops, &subtitle);
        launch(&mut flow, &ops);
        let token = flow.active_job_token.expect("token");

        worker.send_poll(PollEvent::Sample {
            token,
            sample: sublingo_core::progress::ProgressSample {
                processed: Some(50),
                total: Some(200),
                ..Default::default()
            },
        });
        flow.on_tick();

        let progress = flow.progress.as_ref().expect("progress");
        assert_eq!(progress.percent, 25);
    }

    #[test]
    fn stale_token_samples_are_ignored() {
        let temp = tempfile::tempdir().expect("temp dir");
        let subtitle = write_subtitle(temp.path());
        let ops = FakeOps::new();
        let worker = Arc::new(ScriptedWorker::default());
        let mut flow = flow_with(&ops, worker.clone());

        advance_to_review(&mut flow, &ops, &subtitle);
        launch(&mut flow, &ops);
        let token = flow.active_job_token.expect("token");

        worker.send_poll(PollEvent::Sample {
            token: token + 1,
            sample: sublingo_core::progress::ProgressSample {
                processed: Some(180),
                total: Some(200),
                ..Default::default()
            },
        });
        flow.on_tick();
        assert!(flow.progress.is_none());
    }

    #[test]
    fn poll_failures_change_nothing() {
        let temp = tempfile::tempdir().expect("temp dir");
        let subtitle = write_subtitle(temp.path());
        let ops = FakeOps::new();
        let worker = Arc::new(ScriptedWorker::default());
        let mut flow = flow_with(&ops, worker.clone());

        advance_to_review(&mut flow, &ops, &subtitle);
        launch(&mut flow, &ops);
        let token = flow.active_job_token.expect("token");

        worker.send_poll(PollEvent::Failed {
            token,
            message: "blip".to_string(),
        });
        flow.on_tick();

        assert_eq!(flow.session.phase(), Phase::Translating);
        assert!(flow.error_banner.is_none());
        assert!(!worker.stop_flag(0).load(Ordering::Relaxed));
    }

    #[test]
    fn successful_resolution_completes_and_stops_the_poller() {
        let temp = tempfile::tempdir().expect("temp dir");
        let subtitle = write_subtitle(temp.path());
        let ops = FakeOps::new();
        let worker = Arc::new(ScriptedWorker::default());
        let mut flow = flow_with(&ops, worker.clone());

        advance_to_review(&mut flow, &ops, &subtitle);
        launch(&mut flow, &ops);
        let token = flow.active_job_token.expect("token");

        worker.send_job(JobEvent::Resolved {
            token,
            result: Ok(completed_job()),
        });
        flow.on_tick();

        assert_eq!(flow.session.phase(), Phase::Completed);
        assert_eq!(flow.view, View::Done);
        assert!(worker.stop_flag(0).load(Ordering::Relaxed), "poller stopped");
        // the terminal render is the last one
        assert_eq!(flow.progress.as_ref().expect("progress").percent, 100);
        assert_eq!(
            flow.session.job_result().expect("result").filename,
            "movie_fr.srt"
        );
    }

    #[test]
    fn failed_resolution_returns_to_review_with_the_server_message() {
        let temp = tempfile::tempdir().expect("temp dir");
        let subtitle = write_subtitle(temp.path());
        let ops = FakeOps::new();
        let worker = Arc::new(ScriptedWorker::default());
        let mut flow = flow_with(&ops, worker.clone());

        advance_to_review(&mut flow, &ops, &subtitle);
        launch(&mut flow, &ops);
        let token = flow.active_job_token.expect("token");

        worker.send_job(JobEvent::Resolved {
            token,
            result: Err(JobError::Server {
                status: 500,
                message: "rate limited".to_string(),
            }),
        });
        flow.on_tick();

        assert_eq!(flow.session.phase(), Phase::Configured);
        assert_eq!(flow.view, View::Review);
        assert!(worker.stop_flag(0).load(Ordering::Relaxed), "poller stopped");
        assert!(flow.error_banner.as_deref().expect("banner").contains("rate limited"));
        // inputs survive for a retry
        assert_eq!(flow.session.target_lang(), Some("fr"));
    }

    #[test]
    fn edits_while_translating_are_refused_with_a_warning() {
        let temp = tempfile::tempdir().expect("temp dir");
        let subtitle = write_subtitle(temp.path());
        let ops = FakeOps::new();
        let worker = Arc::new(ScriptedWorker::default());
        let mut flow = flow_with(&ops, worker.clone());

        advance_to_review(&mut flow, &ops, &subtitle);
        launch(&mut flow, &ops);

        for code in [
            KeyCode::Char('f'),
            KeyCode::Char('e'),
            KeyCode::Char('r'),
            KeyCode::Esc,
        ] {
            flow.notice = None;
            let signal = flow.on_key(key(code), &ops);
            assert_eq!(signal, FlowSignal::Continue);
            assert!(flow.notice.is_some(), "{code:?} must warn");
        }

        assert_eq!(flow.session.phase(), Phase::Translating);
        assert_eq!(flow.session.file().expect("file").filename, "movie.srt");
        assert_eq!(flow.session.target_lang(), Some("fr"));
        assert_eq!(flow.view, View::Translating);
    }

    #[test]
    fn relaunch_after_failure_supersedes_the_old_poller() {
        let temp = tempfile::tempdir().expect("temp dir");
        let subtitle = write_subtitle(temp.path());
        let ops = FakeOps::new();
        let worker = Arc::new(ScriptedWorker::default());
        let mut flow = flow_with(&ops, worker.clone());

        advance_to_review(&mut flow, &ops, &subtitle);
        launch(&mut flow, &ops);
        let first_token = flow.active_job_token.expect("token");

        worker.send_job(JobEvent::Resolved {
            token: first_token,
            result: Err(JobError::Network {
                message: "connection reset".to_string(),
            }),
        });
        flow.on_tick();
        assert_eq!(flow.session.phase(), Phase::Configured);

        launch(&mut flow, &ops);
        let second_token = flow.active_job_token.expect("token");
        assert_ne!(first_token, second_token);
        assert_eq!(worker.poll_count(), 2);
        assert!(worker.stop_flag(0).load(Ordering::Relaxed));
        assert!(!worker.stop_flag(1).load(Ordering::Relaxed));
    }

    #[test]
    fn translate_another_resets_to_a_clean_file_step() {
        let temp = tempfile::tempdir().expect("temp dir");
        let subtitle = write_subtitle(temp.path());
        let ops = FakeOps::new();
        let worker = Arc::new(ScriptedWorker::default());
        let mut flow = flow_with(&ops, worker.clone());

        advance_to_review(&mut flow, &ops, &subtitle);
        launch(&mut flow, &ops);
        let token = flow.active_job_token.expect("token");
        worker.send_job(JobEvent::Resolved {
            token,
            result: Ok(completed_job()),
        });
        flow.on_tick();
        assert_eq!(flow.view, View::Done);

        flow.on_key(key(KeyCode::Char('n')), &ops);
        assert_eq!(flow.view, View::FileEntry);
        assert_eq!(flow.session.phase(), Phase::Idle);
        assert!(flow.session.file().is_none());
        assert!(flow.progress.is_none());
        assert_eq!(flow.file_input.value(), "");
    }

    #[test]
    fn saving_the_result_uses_the_server_filename() {
        let temp = tempfile::tempdir().expect("temp dir");
        let subtitle = write_subtitle(temp.path());
        let ops = FakeOps::new();
        let worker = Arc::new(ScriptedWorker::default());
        let mut flow = flow_with(&ops, worker.clone());

        advance_to_review(&mut flow, &ops, &subtitle);
        launch(&mut flow, &ops);
        let token = flow.active_job_token.expect("token");
        worker.send_job(JobEvent::Resolved {
            token,
            result: Ok(completed_job()),
        });
        flow.on_tick();

        flow.on_key(key(KeyCode::Char('s')), &ops);
        let saved = ops.saved.lock().expect("saved lock");
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0, "movie_fr.srt");
        assert!(flow.save_notice.as_deref().expect("notice").contains("movie_fr.srt"));
    }
}
