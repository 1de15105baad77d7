//! Implements InputSourcePort on the local filesystem.
//!
//! Recipient lists are UTF-8 text, one number per line. Inline messages are kept
//! verbatim; message files are trimmed. A blank message is rejected.

use crate::domain::DomainError;
use crate::ports::InputSourcePort;
use std::path::Path;
use tokio::fs;
use tracing::debug;

pub struct FsInputSource;

impl FsInputSource {
    pub fn new() -> Self {
        Self
    }

    async fn read_text(path: &Path, what: &str) -> Result<String, DomainError> {
        fs::read_to_string(path)
            .await
            .map_err(|e| DomainError::Input(format!("cannot read {} {}: {}", what, path.display(), e)))
    }
}

impl Default for FsInputSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl InputSourcePort for FsInputSource {
    async fn read_recipients(&self, path: &Path) -> Result<String, DomainError> {
        let text = Self::read_text(path, "recipients file").await?;
        debug!(path = %path.display(), lines = text.lines().count(), "recipients loaded");
        Ok(text)
    }

    async fn read_message(
        &self,
        inline: Option<&str>,
        file: Option<&Path>,
    ) -> Result<String, DomainError> {
        let body = match (inline, file) {
            (Some(_), Some(_)) => {
                return Err(DomainError::Input(
                    "give either an inline message or a message file, not both".into(),
                ));
            }
            (None, None) => return Err(DomainError::Input("no message given".into())),
            (Some(text), None) => text.to_string(),
            (None, Some(path)) => Self::read_text(path, "message file")
                .await?
                .trim()
                .to_string(),
        };
        if body.trim().is_empty() {
            return Err(DomainError::Input("message is empty".into()));
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_read_recipients() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "0555 123 45 67\n# office\n+90 555 987 65 43").unwrap();

        let text = FsInputSource::new()
            .read_recipients(file.path())
            .await
            .unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[tokio::test]
    async fn test_missing_recipients_file() {
        let err = FsInputSource::new()
            .read_recipients(Path::new("/definitely/not/here.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Input(_)));
    }

    #[tokio::test]
    async fn test_message_sources() {
        let source = FsInputSource::new();
        assert_eq!(
            source.read_message(Some("  - item one\n"), None).await.unwrap(),
            "  - item one\n"
        );

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "\nline one\nline two\n\n").unwrap();
        assert_eq!(
            source.read_message(None, Some(file.path())).await.unwrap(),
            "line one\nline two"
        );

        assert!(source.read_message(None, None).await.is_err());
        assert!(
            source
                .read_message(Some("hi"), Some(file.path()))
                .await
                .is_err()
        );
        assert!(source.read_message(Some("   "), None).await.is_err());
    }
}
