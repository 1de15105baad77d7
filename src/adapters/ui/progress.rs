//! Implements ProgressPort with an indicatif progress bar.

use crate::domain::{BatchReport, DeliveryState, Recipient};
use crate::ports::ProgressPort;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use tracing::{info, warn};

const TEMPLATE: &str = "{spinner:.magenta} [{bar:40.magenta/cyan}] {pos}/{len} {msg}";

/// Terminal progress bar, one per batch.
#[derive(Default)]
pub struct BarProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl BarProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(bar) = guard.as_ref() {
                f(bar);
            }
        }
    }
}

impl ProgressPort for BarProgress {
    fn on_start(&self, total: usize) {
        let bar = ProgressBar::new(total as u64);
        match ProgressStyle::with_template(TEMPLATE) {
            Ok(style) => bar.set_style(style.progress_chars("█▓░")),
            Err(e) => warn!(error = %e, "invalid progress template, using default"),
        }
        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(bar);
        }
    }

    fn on_outcome(&self, position: usize, total: usize, recipient: &Recipient) {
        let status = match &recipient.state {
            DeliveryState::Sent => "sent".to_string(),
            DeliveryState::Failed(reason) => format!("failed: {}", reason),
            DeliveryState::Skipped(reason) => format!("skipped: {}", reason),
            DeliveryState::Pending => "pending".to_string(),
        };
        info!(position, total, number = %recipient.number, status = %status, "recipient processed");
        self.with_bar(|bar| {
            bar.set_position(position as u64);
            bar.set_message(format!("{} {}", recipient.number, status));
        });
    }

    fn on_finish(&self, report: &BatchReport) {
        let message = format!(
            "done: {} sent, {} failed, {} skipped",
            report.sent_count(),
            report.failed_count(),
            report.skipped_count()
        );
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(bar) = guard.take() {
                if report.is_fatal() || report.cancelled {
                    bar.abandon_with_message(message);
                } else {
                    bar.finish_with_message(message);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CountryRegistry, SessionStrategy, normalize};

    #[test]
    fn test_bar_lifecycle() {
        let progress = BarProgress::new();
        let registry = CountryRegistry::builtin().unwrap();
        let mut recipient =
            Recipient::new(normalize("05551234567", registry.lookup("tr").unwrap()).unwrap());
        recipient.state = DeliveryState::Sent;

        progress.on_start(1);
        progress.on_outcome(1, 1, &recipient);
        assert_eq!(
            progress.bar.lock().unwrap().as_ref().map(|b| b.position()),
            Some(1)
        );

        let mut report = BatchReport::new(SessionStrategy::Ephemeral);
        report.record(recipient);
        report.complete();
        progress.on_finish(&report);
        assert!(progress.bar.lock().unwrap().is_none());
    }
}
