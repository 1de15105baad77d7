//! Implements ChannelDriver by remote-controlling Chrome through chromedriver.
//!
//! One WebDriver session per `ChannelSession`. Sending opens the click-to-chat URL
//! with the message prefilled, waits for the compose box and presses Enter.

use crate::adapters::browser::client::{KEY_ENTER, WebDriverClient, chrome_capabilities};
use crate::adapters::browser::mapper::to_domain;
use crate::domain::{CanonicalNumber, ChannelSession, DomainError};
use crate::ports::ChannelDriver;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// Present once the web client has loaded and is logged in.
const READY_SELECTOR: &str = "div[role='textbox']";
/// Compose box of an open conversation.
const COMPOSE_SELECTOR: &str = "div[contenteditable='true'][data-tab='10']";

pub struct WebDriverChannel {
    client: WebDriverClient,
    chat_url: String,
    profile_dir: Option<String>,
    headless: bool,
    send_timeout: Duration,
}

impl WebDriverChannel {
    /// * `webdriver_url` - chromedriver endpoint (e.g. "http://localhost:9515")
    /// * `chat_url` - web chat base URL
    /// * `send_timeout` - how long to wait for the compose box of one recipient
    pub fn new(webdriver_url: &str, chat_url: &str, send_timeout: Duration) -> Self {
        Self {
            client: WebDriverClient::new(webdriver_url),
            chat_url: chat_url.trim_end_matches('/').to_string(),
            profile_dir: None,
            headless: false,
            send_timeout,
        }
    }

    /// Reuse a Chrome profile so the chat login survives between sessions.
    pub fn with_profile_dir(mut self, dir: Option<String>) -> Self {
        self.profile_dir = dir;
        self
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }
}

/// Click-to-chat URL for `to` with `message` prefilled.
pub fn send_url(chat_url: &str, to: &CanonicalNumber, message: &str) -> Result<String, DomainError> {
    reqwest::Url::parse_with_params(
        &format!("{}/send", chat_url.trim_end_matches('/')),
        &[("phone", to.as_str()), ("text", message)],
    )
    .map(String::from)
    .map_err(|e| DomainError::Config(format!("invalid chat url '{}': {}", chat_url, e)))
}

#[async_trait]
impl ChannelDriver for WebDriverChannel {
    async fn acquire(&self) -> Result<ChannelSession, DomainError> {
        let caps = chrome_capabilities(self.profile_dir.as_deref(), self.headless);
        let id = self
            .client
            .new_session(caps)
            .await
            .map_err(|e| to_domain("open browser session", e))?;
        info!(session = %id, "browser session opened");
        Ok(ChannelSession::new(id))
    }

    async fn wait_ready(
        &self,
        session: &ChannelSession,
        timeout: Duration,
    ) -> Result<(), DomainError> {
        self.client
            .navigate(&session.id, &self.chat_url)
            .await
            .map_err(|e| to_domain("open chat page", e))?;
        self.client
            .wait_for_element(&session.id, READY_SELECTOR, timeout)
            .await
            .map_err(|e| to_domain("wait for chat page", e))?;
        debug!(session = %session.id, "chat page ready");
        Ok(())
    }

    async fn send(
        &self,
        session: &ChannelSession,
        to: &CanonicalNumber,
        message: &str,
    ) -> Result<(), DomainError> {
        let url = send_url(&self.chat_url, to, message)?;
        self.client
            .navigate(&session.id, &url)
            .await
            .map_err(|e| to_domain("open conversation", e))?;
        let compose = self
            .client
            .wait_for_element(&session.id, COMPOSE_SELECTOR, self.send_timeout)
            .await
            .map_err(|e| to_domain("wait for compose box", e))?;
        self.client
            .send_keys(&session.id, &compose, KEY_ENTER)
            .await
            .map_err(|e| to_domain("submit message", e))?;
        debug!(session = %session.id, number = %to, "message submitted");
        Ok(())
    }

    async fn release(&self, session: ChannelSession) -> Result<(), DomainError> {
        self.client
            .delete_session(&session.id)
            .await
            .map_err(|e| to_domain("close browser session", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CountryRegistry, normalize};

    #[test]
    fn test_send_url_encodes_message() {
        let registry = CountryRegistry::builtin().unwrap();
        let number = normalize("0555 123 45 67", registry.lookup("tr").unwrap()).unwrap();
        let url = send_url("https://web.whatsapp.com/", &number, "Merhaba & hi").unwrap();
        assert_eq!(
            url,
            "https://web.whatsapp.com/send?phone=905551234567&text=Merhaba+%26+hi"
        );
    }

    #[test]
    fn test_send_url_rejects_bad_base() {
        let registry = CountryRegistry::builtin().unwrap();
        let number = normalize("05551234567", registry.lookup("tr").unwrap()).unwrap();
        assert!(matches!(
            send_url("not a url", &number, "hi"),
            Err(DomainError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_acquire_without_chromedriver_is_unavailable() {
        let channel = WebDriverChannel::new(
            "http://127.0.0.1:9",
            "https://web.whatsapp.com",
            Duration::from_secs(1),
        )
        .headless(true);
        assert!(matches!(
            channel.acquire().await,
            Err(DomainError::DriverUnavailable(_))
        ));
    }
}
