//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{BatchReport, CanonicalNumber, ChannelSession, DomainError, Recipient};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Browser-driven messaging channel. One session at a time; no concurrent use.
#[async_trait::async_trait]
pub trait ChannelDriver: Send + Sync {
    /// Open a new session (e.g. launch a browser).
    async fn acquire(&self) -> Result<ChannelSession, DomainError>;

    /// Wait up to `timeout` for the channel to be usable in `session`.
    async fn wait_ready(&self, session: &ChannelSession, timeout: Duration)
    -> Result<(), DomainError>;

    /// Address `to` and submit `message`. Must not return before the submit.
    async fn send(
        &self,
        session: &ChannelSession,
        to: &CanonicalNumber,
        message: &str,
    ) -> Result<(), DomainError>;

    /// Tear the session down.
    async fn release(&self, session: ChannelSession) -> Result<(), DomainError>;
}

/// Per-recipient progress for live logging. Called from the dispatch loop.
pub trait ProgressPort: Send + Sync {
    fn on_start(&self, total: usize);

    /// Called once per recipient after its attempt (or skip). `position` is 1-based.
    fn on_outcome(&self, position: usize, total: usize, recipient: &Recipient);

    fn on_finish(&self, report: &BatchReport);
}

/// Progress sink that ignores everything.
pub struct NoopProgress;

impl ProgressPort for NoopProgress {
    fn on_start(&self, _total: usize) {}
    fn on_outcome(&self, _position: usize, _total: usize, _recipient: &Recipient) {}
    fn on_finish(&self, _report: &BatchReport) {}
}

/// Export a finished batch report.
#[async_trait::async_trait]
pub trait ReportPort: Send + Sync {
    async fn save_report(&self, report: &BatchReport, dest: &Path) -> Result<PathBuf, DomainError>;
}

/// Read recipient blocks and message bodies.
#[async_trait::async_trait]
pub trait InputSourcePort: Send + Sync {
    async fn read_recipients(&self, path: &Path) -> Result<String, DomainError>;

    /// Exactly one of `inline` and `file` must be given.
    async fn read_message(
        &self,
        inline: Option<&str>,
        file: Option<&Path>,
    ) -> Result<String, DomainError>;
}
