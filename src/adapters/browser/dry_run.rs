//! Dry-run channel: logs what would be sent without starting a browser.
//!
//! Useful to check recipient lists and pacing before a real batch.

use crate::domain::{CanonicalNumber, ChannelSession, DomainError};
use crate::ports::ChannelDriver;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::info;

pub struct DryRunChannel {
    /// Simulated page latency in milliseconds.
    delay_ms: u64,
    next_id: AtomicU64,
}

impl DryRunChannel {
    /// Dry-run channel with the default delay (100ms).
    pub fn new() -> Self {
        Self::with_delay(100)
    }

    pub fn with_delay(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            next_id: AtomicU64::new(1),
        }
    }

    async fn pause(&self) {
        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
    }
}

impl Default for DryRunChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ChannelDriver for DryRunChannel {
    async fn acquire(&self) -> Result<ChannelSession, DomainError> {
        let id = format!("dry-run-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        info!(session = %id, "[DRY RUN] would open a browser session");
        Ok(ChannelSession::new(id))
    }

    async fn wait_ready(
        &self,
        session: &ChannelSession,
        timeout: Duration,
    ) -> Result<(), DomainError> {
        info!(session = %session.id, timeout_secs = timeout.as_secs(), "[DRY RUN] would wait for chat page");
        self.pause().await;
        Ok(())
    }

    async fn send(
        &self,
        session: &ChannelSession,
        to: &CanonicalNumber,
        message: &str,
    ) -> Result<(), DomainError> {
        info!(
            session = %session.id,
            number = %to,
            message_len = message.chars().count(),
            "[DRY RUN] would send message"
        );
        self.pause().await;
        Ok(())
    }

    async fn release(&self, session: ChannelSession) -> Result<(), DomainError> {
        info!(session = %session.id, "[DRY RUN] would close browser session");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CountryRegistry, normalize};

    #[tokio::test]
    async fn test_dry_run_session_cycle() {
        let channel = DryRunChannel::with_delay(1);
        let registry = CountryRegistry::builtin().unwrap();
        let number = normalize("+44 20 7946 0958", registry.lookup("gb").unwrap()).unwrap();

        let first = channel.acquire().await.unwrap();
        let second = channel.acquire().await.unwrap();
        assert_ne!(first.id, second.id);

        channel
            .wait_ready(&first, Duration::from_secs(1))
            .await
            .unwrap();
        channel.send(&first, &number, "hello").await.unwrap();
        channel.release(first).await.unwrap();
        channel.release(second).await.unwrap();
    }
}
