pub mod cli;
pub mod diagnostics;
pub mod dispatch;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use sublingo_app::App;
use sublingo_app::runtime::resolve_server_url;
use sublingo_core::backend::HttpBackend;
use sublingo_core::settings::resolve_settings_path;

use crate::cli::Cli;
use crate::diagnostics::DiagnosticsSession;

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let diagnostics = DiagnosticsSession::initialize(cli.diagnostics)?;
    if let Some(path) = diagnostics.path() {
        eprintln!("Diagnostics enabled: {}", path.display());
    }

    // quiet unless RUST_LOG is set, so log output never bleeds into the TUI
    let _ = env_logger::Builder::from_default_env().try_init();

    let server_url = resolve_server_url()?;
    diagnostics.record(format!("server_url={server_url}"));

    let settings_path = resolve_settings_path()?;
    let backend = Arc::new(HttpBackend::new(&server_url).context("failed to build HTTP client")?);
    let app = App::new(backend, server_url, settings_path);

    dispatch::run_with_deps(cli, &app)
}
