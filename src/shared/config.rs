//! Application configuration. Inputs, pacing, browser driver.

use crate::domain::{DomainError, SessionStrategy};
use crate::usecases::DispatchConfig;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_COUNTRY: &str = "tr";
pub const DEFAULT_LOAD_WAIT_SECS: u64 = 40;
pub const DEFAULT_SETTLE_SECS: u64 = 3;
pub const DEFAULT_SEND_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";
pub const DEFAULT_CHAT_URL: &str = "https://web.whatsapp.com";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Text file with one number per line. Read from WPBULK_RECIPIENTS_PATH.
    #[serde(default)]
    pub recipients_path: Option<String>,

    /// Inline message body. Mutually exclusive with `message_file`.
    #[serde(default)]
    pub message: Option<String>,

    /// File whose contents are the message body.
    #[serde(default)]
    pub message_file: Option<String>,

    /// Country key (ISO alpha-2) or display name. Defaults to "tr".
    #[serde(default)]
    pub country: Option<String>,

    /// "ephemeral" (default) or "persistent".
    #[serde(default)]
    pub strategy: Option<String>,

    /// Seconds allotted for the chat page to become ready after opening a session (default 40).
    #[serde(default)]
    pub load_wait_secs: Option<u64>,

    /// Pause in seconds after each send (default 3).
    #[serde(default)]
    pub settle_secs: Option<u64>,

    /// Leave the final browser session open after the batch.
    #[serde(default)]
    pub keep_session_open: Option<bool>,

    /// Skip repeated numbers within one batch (default true).
    #[serde(default)]
    pub skip_duplicates: Option<bool>,

    // ─────────────────────────────────────────────────────────────────────────
    // Browser driver
    // ─────────────────────────────────────────────────────────────────────────
    /// chromedriver endpoint. Defaults to http://localhost:9515.
    #[serde(default)]
    pub webdriver_url: Option<String>,

    /// Web chat base URL.
    #[serde(default)]
    pub chat_url: Option<String>,

    /// Chrome user-data dir, so the chat login survives between sessions.
    #[serde(default)]
    pub browser_profile_dir: Option<String>,

    #[serde(default)]
    pub headless: Option<bool>,

    /// Max seconds to wait for the compose box of one recipient (default 30).
    #[serde(default)]
    pub send_timeout_secs: Option<u64>,

    /// Log instead of driving a browser.
    #[serde(default)]
    pub dry_run: Option<bool>,

    // ─────────────────────────────────────────────────────────────────────────
    // Output / interaction
    // ─────────────────────────────────────────────────────────────────────────
    /// Write the batch report as CSV here.
    #[serde(default)]
    pub report_path: Option<String>,

    /// Skip the confirmation prompt before sending.
    #[serde(default)]
    pub assume_yes: Option<bool>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        if let Ok(path) = std::env::var("WPBULK_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        // Env wins over the file.
        c = c.add_source(config::Environment::with_prefix("WPBULK").try_parsing(true));
        c.build()?.try_deserialize()
    }

    pub fn country_or_default(&self) -> &str {
        self.country.as_deref().unwrap_or(DEFAULT_COUNTRY)
    }

    pub fn strategy_or_default(&self) -> Result<SessionStrategy, DomainError> {
        match &self.strategy {
            Some(s) => s.parse().map_err(DomainError::Config),
            None => Ok(SessionStrategy::default()),
        }
    }

    pub fn load_wait_secs_or_default(&self) -> u64 {
        self.load_wait_secs.unwrap_or(DEFAULT_LOAD_WAIT_SECS)
    }

    pub fn settle_secs_or_default(&self) -> u64 {
        self.settle_secs.unwrap_or(DEFAULT_SETTLE_SECS)
    }

    pub fn send_timeout_secs_or_default(&self) -> u64 {
        self.send_timeout_secs.unwrap_or(DEFAULT_SEND_TIMEOUT_SECS)
    }

    pub fn webdriver_url_or_default(&self) -> String {
        self.webdriver_url
            .clone()
            .unwrap_or_else(|| DEFAULT_WEBDRIVER_URL.to_string())
    }

    pub fn chat_url_or_default(&self) -> String {
        self.chat_url
            .clone()
            .unwrap_or_else(|| DEFAULT_CHAT_URL.to_string())
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run.unwrap_or(false)
    }

    pub fn is_headless(&self) -> bool {
        self.headless.unwrap_or(false)
    }

    pub fn assume_yes(&self) -> bool {
        self.assume_yes.unwrap_or(false)
    }

    /// Options for the dispatcher. `strategy` overrides the configured one (e.g. from a prompt).
    pub fn dispatch_config(
        &self,
        strategy: Option<SessionStrategy>,
    ) -> Result<DispatchConfig, DomainError> {
        let strategy = match strategy {
            Some(s) => s,
            None => self.strategy_or_default()?,
        };
        if self.load_wait_secs == Some(0) {
            return Err(DomainError::Config(
                "load_wait_secs must be at least 1".into(),
            ));
        }
        Ok(DispatchConfig {
            strategy,
            load_wait: Duration::from_secs(self.load_wait_secs_or_default()),
            settle: Duration::from_secs(self.settle_secs_or_default()),
            keep_session_open: self.keep_session_open.unwrap_or(false),
            skip_duplicates: self.skip_duplicates.unwrap_or(true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_command_surface() {
        let cfg = AppConfig::default();
        let dispatch = cfg.dispatch_config(None).unwrap();
        assert_eq!(dispatch.strategy, SessionStrategy::Ephemeral);
        assert_eq!(dispatch.load_wait, Duration::from_secs(40));
        assert_eq!(dispatch.settle, Duration::from_secs(3));
        assert!(!dispatch.keep_session_open);
        assert!(dispatch.skip_duplicates);
        assert_eq!(cfg.country_or_default(), "tr");
    }

    #[test]
    fn test_strategy_parsing() {
        let cfg = AppConfig {
            strategy: Some("Persistent".into()),
            ..AppConfig::default()
        };
        assert_eq!(
            cfg.dispatch_config(None).unwrap().strategy,
            SessionStrategy::Persistent
        );

        let bad = AppConfig {
            strategy: Some("parallel".into()),
            ..AppConfig::default()
        };
        assert!(matches!(bad.dispatch_config(None), Err(DomainError::Config(_))));
        // An explicit choice bypasses the configured value.
        assert_eq!(
            bad.dispatch_config(Some(SessionStrategy::Ephemeral))
                .unwrap()
                .strategy,
            SessionStrategy::Ephemeral
        );
    }

    #[test]
    fn test_zero_load_wait_rejected() {
        let cfg = AppConfig {
            load_wait_secs: Some(0),
            ..AppConfig::default()
        };
        assert!(cfg.dispatch_config(None).is_err());
    }
}
