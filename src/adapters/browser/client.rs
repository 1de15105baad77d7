//! Minimal W3C WebDriver client over reqwest.
//!
//! Only the commands the chat channel needs: new session, navigate, find element,
//! send keys, delete session. Responses are unwrapped from the `{"value": ...}`
//! envelope; protocol errors keep their W3C error code.

use serde_json::{Value, json};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Key in a W3C element reference object.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735a61f0b4";

/// WebDriver code point for the Enter key.
pub const KEY_ENTER: &str = "\u{E007}";

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Failure of one WebDriver command, before mapping to the domain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// chromedriver is not listening.
    #[error("cannot reach webdriver: {0}")]
    Connect(String),

    /// W3C error response, e.g. `no such element` or `invalid session id`.
    #[error("{error}: {message}")]
    Protocol { error: String, message: String },

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("webdriver http error: {0}")]
    Http(String),
}

impl WireError {
    pub fn protocol_code(&self) -> Option<&str> {
        match self {
            Self::Protocol { error, .. } => Some(error),
            _ => None,
        }
    }
}

pub struct WebDriverClient {
    http: reqwest::Client,
    base_url: String,
}

impl WebDriverClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Open a browser session. Returns the session id.
    pub async fn new_session(&self, capabilities: Value) -> Result<String, WireError> {
        let value = self
            .command(reqwest::Method::POST, "/session", Some(capabilities))
            .await?;
        session_id_from(&value)
    }

    pub async fn navigate(&self, session_id: &str, url: &str) -> Result<(), WireError> {
        self.command(
            reqwest::Method::POST,
            &format!("/session/{}/url", session_id),
            Some(json!({ "url": url })),
        )
        .await
        .map(|_| ())
    }

    /// Find one element by CSS selector. Returns the element id.
    pub async fn find_element(&self, session_id: &str, css: &str) -> Result<String, WireError> {
        let value = self
            .command(
                reqwest::Method::POST,
                &format!("/session/{}/element", session_id),
                Some(json!({ "using": "css selector", "value": css })),
            )
            .await?;
        element_id_from(&value)
    }

    /// Poll for an element until it appears or `timeout` elapses.
    pub async fn wait_for_element(
        &self,
        session_id: &str,
        css: &str,
        timeout: Duration,
    ) -> Result<String, WireError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.find_element(session_id, css).await {
                Ok(id) => return Ok(id),
                Err(e) if e.protocol_code() == Some("no such element") => {}
                Err(e) => return Err(e),
            }
            if Instant::now() >= deadline {
                return Err(WireError::Timeout(format!(
                    "element `{}` not present after {}s",
                    css,
                    timeout.as_secs()
                )));
            }
            debug!(css, "element not present yet");
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    pub async fn send_keys(
        &self,
        session_id: &str,
        element_id: &str,
        text: &str,
    ) -> Result<(), WireError> {
        self.command(
            reqwest::Method::POST,
            &format!("/session/{}/element/{}/value", session_id, element_id),
            Some(json!({ "text": text })),
        )
        .await
        .map(|_| ())
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<(), WireError> {
        self.command(
            reqwest::Method::DELETE,
            &format!("/session/{}", session_id),
            None,
        )
        .await
        .map(|_| ())
    }

    async fn command(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, WireError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                WireError::Connect(format!("{}: {}", self.base_url, e))
            } else if e.is_timeout() {
                WireError::Timeout(e.to_string())
            } else {
                WireError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| WireError::Http(format!("failed to read response: {}", e)))?;
        let parsed: Option<Value> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            return Err(parsed
                .as_ref()
                .and_then(protocol_error_from)
                .unwrap_or_else(|| {
                    WireError::Http(format!(
                        "status {}: {}",
                        status,
                        text.chars().take(200).collect::<String>()
                    ))
                }));
        }

        let mut parsed = parsed.ok_or_else(|| {
            WireError::Http(format!(
                "non-JSON response: {}",
                text.chars().take(200).collect::<String>()
            ))
        })?;
        Ok(parsed
            .get_mut("value")
            .map(Value::take)
            .unwrap_or(Value::Null))
    }
}

/// Chrome capabilities for a new session.
pub fn chrome_capabilities(profile_dir: Option<&str>, headless: bool) -> Value {
    let mut args = vec!["--disable-notifications".to_string()];
    if let Some(dir) = profile_dir {
        args.push(format!("--user-data-dir={}", dir));
    }
    if headless {
        args.push("--headless=new".to_string());
    }
    json!({
        "capabilities": {
            "alwaysMatch": {
                "browserName": "chrome",
                "goog:chromeOptions": { "args": args }
            }
        }
    })
}

fn protocol_error_from(body: &Value) -> Option<WireError> {
    let value = body.get("value")?;
    let error = value.get("error")?.as_str()?.to_string();
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .lines()
        .next()
        .unwrap_or_default()
        .to_string();
    Some(WireError::Protocol { error, message })
}

fn session_id_from(value: &Value) -> Result<String, WireError> {
    value
        .get("sessionId")
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| WireError::Http("new session response has no sessionId".into()))
}

fn element_id_from(value: &Value) -> Result<String, WireError> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| WireError::Http("element response has no element reference".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_args() {
        let caps = chrome_capabilities(Some("/tmp/profile"), true);
        let args = &caps["capabilities"]["alwaysMatch"]["goog:chromeOptions"]["args"];
        assert_eq!(
            args,
            &json!([
                "--disable-notifications",
                "--user-data-dir=/tmp/profile",
                "--headless=new"
            ])
        );

        let plain = chrome_capabilities(None, false);
        let args = &plain["capabilities"]["alwaysMatch"]["goog:chromeOptions"]["args"];
        assert_eq!(args, &json!(["--disable-notifications"]));
    }

    #[test]
    fn test_protocol_error_keeps_first_message_line() {
        let body = json!({
            "value": {
                "error": "invalid session id",
                "message": "invalid session id\n  (Session info: chrome=120)",
                "stacktrace": ""
            }
        });
        assert_eq!(
            protocol_error_from(&body),
            Some(WireError::Protocol {
                error: "invalid session id".into(),
                message: "invalid session id".into()
            })
        );
        assert_eq!(protocol_error_from(&json!({ "value": null })), None);
    }

    #[test]
    fn test_session_and_element_ids() {
        let session = json!({ "sessionId": "abc123", "capabilities": {} });
        assert_eq!(session_id_from(&session).unwrap(), "abc123");
        assert!(session_id_from(&json!({})).is_err());

        let element = json!({ ELEMENT_KEY: "el-1" });
        assert_eq!(element_id_from(&element).unwrap(), "el-1");
        assert!(element_id_from(&json!({ "ELEMENT": "old" })).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_driver_is_connect_error() {
        // Port 9 (discard) on localhost is closed on CI hosts.
        let client = WebDriverClient::new("http://127.0.0.1:9/");
        let err = client
            .new_session(chrome_capabilities(None, true))
            .await
            .unwrap_err();
        assert!(matches!(err, WireError::Connect(_)), "got {:?}", err);
    }
}
