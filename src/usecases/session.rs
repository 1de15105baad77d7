//! Session strategies. Decide when channel sessions are opened and closed so the
//! dispatch loop stays identical for both modes.
//!
//! - `EphemeralSession`: acquire + wait before each recipient, release after it.
//! - `PersistentSession`: acquire + wait once per batch, release at the end.

use crate::domain::{CanonicalNumber, ChannelSession, DomainError, SessionStrategy};
use crate::ports::ChannelDriver;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Session lifecycle hooks driven by the dispatcher, in this order:
/// `begin_batch`, then per recipient `before_recipient` / `send` / `after_recipient`,
/// then `end_batch`.
#[async_trait::async_trait]
pub trait DispatchSession: Send {
    fn strategy(&self) -> SessionStrategy;

    /// An error here aborts the batch.
    async fn begin_batch(&mut self) -> Result<(), DomainError>;

    /// An error here fails only the current recipient, unless `is_fatal` says otherwise.
    async fn before_recipient(&mut self) -> Result<(), DomainError>;

    async fn send(&mut self, to: &CanonicalNumber, message: &str) -> Result<(), DomainError>;

    /// `is_last` is true for the final recipient that will be dispatched.
    async fn after_recipient(&mut self, is_last: bool);

    async fn end_batch(&mut self);

    /// Whether `err` ends the batch rather than just the current recipient.
    fn is_fatal(&self, err: &DomainError) -> bool;
}

/// Build the session strategy for `strategy`.
pub fn for_strategy(
    strategy: SessionStrategy,
    driver: Arc<dyn ChannelDriver>,
    load_wait: Duration,
    keep_open: bool,
) -> Box<dyn DispatchSession> {
    match strategy {
        SessionStrategy::Ephemeral => Box::new(EphemeralSession::new(driver, load_wait, keep_open)),
        SessionStrategy::Persistent => {
            Box::new(PersistentSession::new(driver, load_wait, keep_open))
        }
    }
}

/// Release a session, logging instead of failing: teardown errors never change an outcome.
async fn release_quietly(driver: &dyn ChannelDriver, session: ChannelSession) {
    let id = session.id.clone();
    match driver.release(session).await {
        Ok(()) => debug!(session = %id, "session released"),
        Err(e) => warn!(session = %id, error = %e, "session release failed"),
    }
}

pub struct EphemeralSession {
    driver: Arc<dyn ChannelDriver>,
    load_wait: Duration,
    keep_open: bool,
    current: Option<ChannelSession>,
}

impl EphemeralSession {
    pub fn new(driver: Arc<dyn ChannelDriver>, load_wait: Duration, keep_open: bool) -> Self {
        Self {
            driver,
            load_wait,
            keep_open,
            current: None,
        }
    }
}

#[async_trait::async_trait]
impl DispatchSession for EphemeralSession {
    fn strategy(&self) -> SessionStrategy {
        SessionStrategy::Ephemeral
    }

    async fn begin_batch(&mut self) -> Result<(), DomainError> {
        Ok(())
    }

    async fn before_recipient(&mut self) -> Result<(), DomainError> {
        let session = self.driver.acquire().await?;
        if let Err(e) = self.driver.wait_ready(&session, self.load_wait).await {
            release_quietly(&*self.driver, session).await;
            return Err(e);
        }
        self.current = Some(session);
        Ok(())
    }

    async fn send(&mut self, to: &CanonicalNumber, message: &str) -> Result<(), DomainError> {
        let session = self
            .current
            .as_ref()
            .ok_or_else(|| DomainError::SessionLost("no session acquired".into()))?;
        self.driver.send(session, to, message).await
    }

    async fn after_recipient(&mut self, is_last: bool) {
        let Some(session) = self.current.take() else {
            return;
        };
        if is_last && self.keep_open {
            info!(session = %session.id, "leaving last session open");
            return;
        }
        release_quietly(&*self.driver, session).await;
    }

    async fn end_batch(&mut self) {
        // Only reachable with a live session when the batch aborted mid-recipient.
        if let Some(session) = self.current.take() {
            release_quietly(&*self.driver, session).await;
        }
    }

    fn is_fatal(&self, err: &DomainError) -> bool {
        matches!(err, DomainError::DriverUnavailable(_))
    }
}

pub struct PersistentSession {
    driver: Arc<dyn ChannelDriver>,
    load_wait: Duration,
    keep_open: bool,
    shared: Option<ChannelSession>,
}

impl PersistentSession {
    pub fn new(driver: Arc<dyn ChannelDriver>, load_wait: Duration, keep_open: bool) -> Self {
        Self {
            driver,
            load_wait,
            keep_open,
            shared: None,
        }
    }
}

#[async_trait::async_trait]
impl DispatchSession for PersistentSession {
    fn strategy(&self) -> SessionStrategy {
        SessionStrategy::Persistent
    }

    async fn begin_batch(&mut self) -> Result<(), DomainError> {
        let session = self.driver.acquire().await?;
        if let Err(e) = self.driver.wait_ready(&session, self.load_wait).await {
            release_quietly(&*self.driver, session).await;
            return Err(e);
        }
        info!(session = %session.id, "shared session ready");
        self.shared = Some(session);
        Ok(())
    }

    async fn before_recipient(&mut self) -> Result<(), DomainError> {
        if self.shared.is_some() {
            Ok(())
        } else {
            Err(DomainError::SessionLost("shared session is gone".into()))
        }
    }

    async fn send(&mut self, to: &CanonicalNumber, message: &str) -> Result<(), DomainError> {
        let session = self
            .shared
            .as_ref()
            .ok_or_else(|| DomainError::SessionLost("shared session is gone".into()))?;
        self.driver.send(session, to, message).await
    }

    async fn after_recipient(&mut self, _is_last: bool) {}

    async fn end_batch(&mut self) {
        let Some(session) = self.shared.take() else {
            return;
        };
        if self.keep_open {
            info!(session = %session.id, "leaving shared session open");
            return;
        }
        release_quietly(&*self.driver, session).await;
    }

    fn is_fatal(&self, err: &DomainError) -> bool {
        matches!(
            err,
            DomainError::DriverUnavailable(_) | DomainError::SessionLost(_)
        )
    }
}
