//! Bulk dispatch: one message, many recipients, strictly one at a time.
//!
//! - Session scoping is delegated to a `DispatchSession` strategy
//! - A failed recipient is recorded and the batch moves on
//! - Only fatal errors (driver unreachable, shared session lost) abort; the
//!   partial report is still returned
//! - A stop request is honoured between recipients, never mid-send

use crate::domain::{
    BatchReport, BatchState, CanonicalNumber, DeliveryState, DomainError, NormalizationAttempt,
    Recipient, RecipientListBuilder, SessionStrategy,
};
use crate::ports::{ChannelDriver, ProgressPort};
use crate::usecases::session::{self, DispatchSession};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{error, info, warn};

/// Recognised dispatch options.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub strategy: SessionStrategy,
    /// Time allotted for the channel to become ready after acquiring a session.
    pub load_wait: Duration,
    /// Pause after each send, before the next recipient or teardown.
    pub settle: Duration,
    /// Leave the last (ephemeral) or shared (persistent) session open.
    pub keep_session_open: bool,
    /// Send each canonical number once; later duplicates are skipped.
    pub skip_duplicates: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            strategy: SessionStrategy::Ephemeral,
            load_wait: Duration::from_secs(40),
            settle: Duration::from_secs(3),
            keep_session_open: false,
            skip_duplicates: true,
        }
    }
}

/// Cooperative stop flag, checked at recipient boundaries.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Dispatch service. Holds no batch state between runs.
pub struct DispatchService {
    driver: Arc<dyn ChannelDriver>,
    config: DispatchConfig,
}

impl DispatchService {
    pub fn new(driver: Arc<dyn ChannelDriver>, config: DispatchConfig) -> Self {
        Self { driver, config }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Normalization attempts in, full report out: valid lines are dispatched,
    /// invalid ones are attached so every input line is accounted for.
    pub async fn run_attempts(
        &self,
        attempts: Vec<NormalizationAttempt>,
        message: &str,
        progress: &dyn ProgressPort,
        stop: &StopSignal,
    ) -> BatchReport {
        let (recipients, invalid) = RecipientListBuilder::partition(attempts);
        if !invalid.is_empty() {
            info!(invalid = invalid.len(), "excluding invalid lines from dispatch");
        }
        self.run(recipients, message, progress, stop)
            .await
            .with_invalid(invalid)
    }

    /// Send `message` to each recipient in order. Never fails as a whole: per
    /// recipient errors land in the report, fatal ones end the batch early.
    pub async fn run(
        &self,
        mut recipients: Vec<Recipient>,
        message: &str,
        progress: &dyn ProgressPort,
        stop: &StopSignal,
    ) -> BatchReport {
        let mut report = BatchReport::new(self.config.strategy);
        report.state = BatchState::Running;

        if self.config.skip_duplicates {
            mark_duplicates(&mut recipients);
        }
        let total = recipients.len();
        let last_to_send = recipients
            .iter()
            .rposition(|r| r.state == DeliveryState::Pending);

        progress.on_start(total);
        info!(total, strategy = %self.config.strategy, "batch started");

        let Some(last_to_send) = last_to_send else {
            // Nothing to send: do not touch the channel at all.
            for (idx, recipient) in recipients.into_iter().enumerate() {
                progress.on_outcome(idx + 1, total, &recipient);
                report.record(recipient);
            }
            report.complete();
            progress.on_finish(&report);
            return report;
        };

        let mut session = session::for_strategy(
            self.config.strategy,
            Arc::clone(&self.driver),
            self.config.load_wait,
            self.config.keep_session_open,
        );

        if let Err(e) = session.begin_batch().await {
            error!(error = %e, "could not open a session; aborting batch");
            report.abort(e.to_string(), recipients);
            progress.on_finish(&report);
            return report;
        }

        let mut queue = recipients.into_iter().enumerate();
        while let Some((idx, mut recipient)) = queue.next() {
            let position = idx + 1;
            if stop.is_stopped() {
                info!(position, "stop requested; ending batch");
                report.cancel(std::iter::once(recipient).chain(queue.map(|(_, r)| r)));
                break;
            }

            if recipient.state != DeliveryState::Pending {
                progress.on_outcome(position, total, &recipient);
                report.record(recipient);
                continue;
            }

            let result = deliver(&mut *session, &recipient.number, message).await;
            let fatal = match &result {
                Err(e) if session.is_fatal(e) => Some(e.to_string()),
                _ => None,
            };
            recipient.state = match result {
                Ok(()) => {
                    info!(number = %recipient.number, position, total, "sent");
                    DeliveryState::Sent
                }
                Err(e) => {
                    warn!(number = %recipient.number, position, total, error = %e, "send failed");
                    DeliveryState::Failed(e.to_string())
                }
            };
            progress.on_outcome(position, total, &recipient);
            report.record(recipient);

            if let Some(reason) = fatal {
                error!(position, error = %reason, "unrecoverable channel error; aborting batch");
                session.after_recipient(false).await;
                report.abort(reason, queue.map(|(_, r)| r));
                break;
            }

            if !self.config.settle.is_zero() {
                tokio::time::sleep(self.config.settle).await;
            }
            session.after_recipient(idx == last_to_send).await;
        }

        session.end_batch().await;
        if report.state == BatchState::Running {
            report.complete();
        }

        info!(
            sent = report.sent_count(),
            failed = report.failed_count(),
            skipped = report.skipped_count(),
            unattempted = report.unattempted.len(),
            "batch finished"
        );
        progress.on_finish(&report);
        report
    }
}

async fn deliver(
    session: &mut dyn DispatchSession,
    to: &CanonicalNumber,
    message: &str,
) -> Result<(), DomainError> {
    session.before_recipient().await?;
    session.send(to, message).await
}

/// Mark every repeat of an earlier canonical number as skipped.
fn mark_duplicates(recipients: &mut [Recipient]) {
    let mut first_seen: HashMap<CanonicalNumber, Option<usize>> = HashMap::new();
    for recipient in recipients.iter_mut() {
        match first_seen.get(&recipient.number) {
            Some(first_line) => {
                let reason = match first_line {
                    Some(line) => format!("duplicate of line {}", line),
                    None => format!("duplicate of {}", recipient.number),
                };
                recipient.state = DeliveryState::Skipped(reason);
            }
            None => {
                first_seen.insert(recipient.number.clone(), recipient.line);
            }
        }
    }
}
