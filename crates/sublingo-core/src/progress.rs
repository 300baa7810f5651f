//! Turns raw backend progress reports into what the UI shows: a smoothed
//! percentage, a human status line, and a remaining-time estimate.

use std::time::Instant;

use crate::protocol::ProgressReport;

/// Rates at or below this (items per second) do not update the ETA; a
/// near-zero delta between two polls says nothing useful about remaining
/// time.
pub const STALL_SPEED_FLOOR: f64 = 0.1;

/// Typed progress sample. The wire `processed` field arrives as a
/// preformatted `"X/Y"` string; anything malformed or missing leaves the
/// counts unset and the percent falls back to the server's own hint, then 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressSample {
    pub processed: Option<u64>,
    pub total: Option<u64>,
    pub percent_hint: Option<u8>,
    pub status: Option<String>,
    pub mode: Option<String>,
}

impl ProgressSample {
    pub fn from_report(report: &ProgressReport) -> Self {
        let counts = report.processed.as_deref().and_then(parse_counts);
        Self {
            processed: counts.map(|(processed, _)| processed),
            total: counts.map(|(_, total)| total),
            percent_hint: report.progress.map(|value| value.clamp(0, 100) as u8),
            status: report
                .status
                .clone()
                .filter(|status| !status.trim().is_empty()),
            mode: report.mode.clone().filter(|mode| !mode.trim().is_empty()),
        }
    }
}

fn parse_counts(raw: &str) -> Option<(u64, u64)> {
    let (processed, total) = raw.trim().split_once('/')?;
    let processed = processed.trim().parse().ok()?;
    let total = total.trim().parse().ok()?;
    Some((processed, total))
}

/// What the progress surface renders for one accepted sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressView {
    pub percent: u8,
    pub status: String,
    pub eta: Option<String>,
    pub mode: Option<String>,
}

/// Stateful estimator for one job. Keeps only the previous `(time,
/// processed)` pair for the rate estimate and the last rendered percent for
/// monotonic display.
#[derive(Debug, Default)]
pub struct ProgressEstimator {
    last_rendered: Option<u8>,
    previous: Option<(Instant, u64)>,
    eta: Option<String>,
}

impl ProgressEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Feeds one sample. Returns `None` when the sample must not be
    /// rendered: the displayed percent only moves forward, except that 100
    /// always renders (terminal) and 0 always renders (restart).
    pub fn observe(&mut self, sample: &ProgressSample, now: Instant) -> Option<ProgressView> {
        let percent = raw_percent(sample);
        self.update_eta(sample, now);

        let renderable = match self.last_rendered {
            Some(last) => percent >= last || percent == 100 || percent == 0,
            None => true,
        };
        if !renderable {
            return None;
        }
        self.last_rendered = Some(percent);

        Some(ProgressView {
            percent,
            status: display_status(sample, percent),
            eta: if percent >= 100 { None } else { self.eta.clone() },
            mode: sample.mode.clone(),
        })
    }

    fn update_eta(&mut self, sample: &ProgressSample, now: Instant) {
        let (Some(processed), Some(total)) = (sample.processed, sample.total) else {
            return;
        };

        if let Some((previous_at, previous_processed)) = self.previous {
            if processed < previous_processed {
                // the counter went backwards: job restarted, rate is stale
                self.eta = None;
            } else {
                let elapsed = now.duration_since(previous_at).as_secs_f64();
                if elapsed > 0.0 {
                    let speed = (processed - previous_processed) as f64 / elapsed;
                    if speed > STALL_SPEED_FLOOR {
                        let remaining = total.saturating_sub(processed) as f64;
                        self.eta = Some(format_eta(remaining / speed));
                    }
                }
            }
        }

        self.previous = Some((now, processed));
    }
}

fn raw_percent(sample: &ProgressSample) -> u8 {
    match (sample.processed, sample.total) {
        (Some(processed), Some(total)) if total > 0 => {
            let ratio = processed as f64 / total as f64;
            (ratio * 100.0).round().min(100.0) as u8
        }
        _ => sample.percent_hint.unwrap_or(0).min(100),
    }
}

fn display_status(sample: &ProgressSample, percent: u8) -> String {
    if let Some(status) = &sample.status {
        return status.clone();
    }

    let fallback = if percent < 5 {
        "Preparing subtitles"
    } else if percent < 30 {
        "Starting translation"
    } else if percent < 70 {
        "Translating"
    } else {
        "Finishing up"
    };
    fallback.to_string()
}

/// Remaining-time text. Seconds below a minute, rounded minutes from there.
pub fn format_eta(seconds: f64) -> String {
    let rounded = seconds.round().max(1.0);
    if rounded < 60.0 {
        format!("{}s remaining", rounded as u64)
    } else {
        format!("{}m remaining", (seconds / 60.0).round().max(1.0) as u64)
    }
}
