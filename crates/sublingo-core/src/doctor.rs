//! Environment checks for the `doctor` subcommand: settings sanity and
//! backend reachability.

use std::fmt;

use crate::backend::Backend;
use crate::settings::{load_settings, resolve_settings_path};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Pass,
    Fail,
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorCheck {
    pub name: String,
    pub state: CheckState,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorReport {
    pub checks: Vec<DoctorCheck>,
}

impl DoctorReport {
    pub fn has_failures(&self) -> bool {
        self.checks
            .iter()
            .any(|check| check.state == CheckState::Fail)
    }

    pub fn summary(&self) -> String {
        let passed = self
            .checks
            .iter()
            .filter(|check| check.state == CheckState::Pass)
            .count();
        let failed = self.checks.len().saturating_sub(passed);
        format!("{passed} passed, {failed} failed")
    }
}

pub fn run_doctor(backend: &dyn Backend, server_url: &str) -> DoctorReport {
    let mut checks = Vec::new();

    match resolve_settings_path() {
        Ok(settings_path) => {
            checks.push(pass_check(
                "settings path resolves",
                format!("at {}", settings_path.display()),
            ));

            if settings_path.exists() {
                match load_settings(&settings_path) {
                    Ok(settings) => {
                        checks.push(pass_check(
                            "settings file parses and validates",
                            "settings are valid",
                        ));
                        checks.push(check_api_key(
                            settings.use_ai,
                            settings.provider().label(),
                            settings.active_key(),
                        ));
                    }
                    Err(error) => {
                        checks.push(fail_check(
                            "settings file parses and validates",
                            error.to_string(),
                        ));
                        checks.push(skipped_check(
                            "api key configured for AI mode",
                            "settings file is invalid",
                        ));
                    }
                }
            } else {
                checks.push(pass_check(
                    "settings file parses and validates",
                    "no settings file yet; defaults apply",
                ));
                let defaults = crate::settings::Settings::default();
                checks.push(check_api_key(
                    defaults.use_ai,
                    defaults.provider().label(),
                    defaults.active_key(),
                ));
            }
        }
        Err(error) => {
            checks.push(fail_check("settings path resolves", error.to_string()));
            checks.push(skipped_check(
                "settings file parses and validates",
                "settings path did not resolve",
            ));
            checks.push(skipped_check(
                "api key configured for AI mode",
                "settings path did not resolve",
            ));
        }
    }

    checks.push(match backend.fetch_progress() {
        Ok(_) => pass_check(
            "translation server reachable",
            format!("answered at {server_url}"),
        ),
        Err(error) => fail_check("translation server reachable", error.to_string()),
    });

    DoctorReport { checks }
}

fn check_api_key(use_ai: bool, provider_label: &str, key: &str) -> DoctorCheck {
    if !use_ai {
        return pass_check(
            "api key configured for AI mode",
            "AI mode is off; no key needed",
        );
    }

    if key.trim().is_empty() {
        fail_check(
            "api key configured for AI mode",
            format!("AI mode is on but no {provider_label} key is stored"),
        )
    } else {
        pass_check(
            "api key configured for AI mode",
            format!("{provider_label} key is stored"),
        )
    }
}

fn pass_check(name: &str, details: impl Into<String>) -> DoctorCheck {
    DoctorCheck {
        name: name.to_string(),
        state: CheckState::Pass,
        details: details.into(),
    }
}

fn fail_check(name: &str, details: impl Into<String>) -> DoctorCheck {
    DoctorCheck {
        name: name.to_string(),
        state: CheckState::Fail,
        details: details.into(),
    }
}

fn skipped_check(name: &str, reason: &str) -> DoctorCheck {
    fail_check(name, format!("skipped: {reason}"))
}
