//! Opt-in diagnostics log (`--diagnostics`): one timestamped file per run
//! under the settings directory, plus a panic hook that records the payload
//! and backtrace before the process dies.

use std::backtrace::Backtrace;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, Once, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};

static HOOK_ONCE: Once = Once::new();
static LOG_FILE: OnceLock<Mutex<Option<(PathBuf, File)>>> = OnceLock::new();

fn log_state() -> &'static Mutex<Option<(PathBuf, File)>> {
    LOG_FILE.get_or_init(|| Mutex::new(None))
}

pub struct DiagnosticsSession {
    path: Option<PathBuf>,
}

impl DiagnosticsSession {
    pub fn initialize(enabled: bool) -> Result<Self> {
        install_panic_hook();
        if !enabled {
            *log_state()
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner) = None;
            return Ok(Self { path: None });
        }

        let path = create_log_path()?;
        let mut file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&path)
            .with_context(|| format!("failed to create diagnostics log at {}", path.display()))?;

        writeln!(
            file,
            "sublingo diagnostics start\nversion={}\nstart_epoch_ms={}\npid={}\nargv={:?}",
            env!("CARGO_PKG_VERSION"),
            epoch_ms(),
            std::process::id(),
            std::env::args().collect::<Vec<String>>()
        )
        .with_context(|| format!("failed to write diagnostics header to {}", path.display()))?;
        file.flush()
            .with_context(|| format!("failed to flush diagnostics header to {}", path.display()))?;

        *log_state()
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some((path.clone(), file));

        Ok(Self { path: Some(path) })
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    pub fn record<S: AsRef<str>>(&self, entry: S) {
        append_line(entry.as_ref());
    }
}

fn install_panic_hook() {
    HOOK_ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|panic_info| {
            let payload = panic_payload(panic_info);
            let location = panic_info
                .location()
                .map(|value| format!("{}:{}:{}", value.file(), value.line(), value.column()))
                .unwrap_or_else(|| "unknown".to_string());

            append_line("panic captured");
            append_line(format!("panic_message={payload}"));
            append_line(format!("panic_location={location}"));
            append_line(format!("panic_backtrace={:?}", Backtrace::force_capture()));

            let path = log_state()
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .as_ref()
                .map(|(path, _)| path.clone());

            eprintln!("Fatal internal error in sublingo.");
            match path {
                Some(path) => eprintln!("Diagnostics written to {}", path.display()),
                None => eprintln!("Run `sublingo --diagnostics` to capture a diagnostics log."),
            }
        }));
    });
}

fn panic_payload(panic_info: &std::panic::PanicHookInfo<'_>) -> String {
    if let Some(payload) = panic_info.payload().downcast_ref::<&str>() {
        return (*payload).to_string();
    }
    if let Some(payload) = panic_info.payload().downcast_ref::<String>() {
        return payload.clone();
    }
    "unknown panic payload".to_string()
}

fn append_line<S: AsRef<str>>(line: S) {
    let mut state = log_state()
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let Some((_, file)) = state.as_mut() else {
        return;
    };
    let _ = writeln!(file, "[{}] {}", epoch_ms(), line.as_ref());
    let _ = file.flush();
}

fn create_log_path() -> Result<PathBuf> {
    let settings_path = sublingo_core::settings::resolve_settings_path()
        .context("failed to resolve the settings path for diagnostics")?;
    let settings_dir = settings_path.parent().ok_or_else(|| {
        anyhow!(
            "failed to resolve a diagnostics directory from {}",
            settings_path.display()
        )
    })?;

    let diagnostics_dir = settings_dir.join("diagnostics");
    fs::create_dir_all(&diagnostics_dir).with_context(|| {
        format!(
            "failed to create diagnostics directory {}",
            diagnostics_dir.display()
        )
    })?;

    Ok(diagnostics_dir.join(format!("{}.log", epoch_ms())))
}

fn epoch_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}
