//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

/// Per-line normalization failure. Never aborts a batch; surfaced in the preview.
///
/// Besides the empty, malformed and length reasons there is a fourth code,
/// `calling_code_mismatch`. It refines what would otherwise be a
/// `LengthOutOfRange` for a `+` number of another country.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("empty input")]
    EmptyInput,

    #[error("unexpected character '{found}'")]
    MalformedCharacters { found: char },

    #[error("national number has {observed} digits, expected {min}..={max}")]
    LengthOutOfRange { observed: usize, min: usize, max: usize },

    /// A `+` number whose calling code is not the selected profile's. Reported
    /// instead of the length error its digits would produce under this profile.
    #[error("international number does not start with +{expected}")]
    CallingCodeMismatch { expected: String },
}

impl NormalizationError {
    /// Stable reason code for reports and exports.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::MalformedCharacters { .. } => "malformed_characters",
            Self::LengthOutOfRange { .. } => "length_out_of_range",
            Self::CallingCodeMismatch { .. } => "calling_code_mismatch",
        }
    }
}

/// Country registry construction failure. Fatal at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate country key '{0}'")]
    DuplicateKey(String),

    #[error("calling code +{code} used by both '{first}' and '{second}'")]
    DuplicateCallingCode {
        code: String,
        first: String,
        second: String,
    },

    #[error("profile '{key}': prefix patterns {left} and {right} are ambiguous")]
    AmbiguousPrefix {
        key: String,
        left: String,
        right: String,
    },

    #[error("profile '{key}': {reason}")]
    InvalidProfile { key: String, reason: String },
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("Country registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Session acquisition failed: {0}")]
    Acquisition(String),

    /// The channel session died under us (browser closed, session id invalid).
    #[error("Session lost: {0}")]
    SessionLost(String),

    /// The browser driver cannot be reached at all. Always fatal for a batch.
    #[error("Channel driver unavailable: {0}")]
    DriverUnavailable(String),

    /// The channel refused or could not address this recipient.
    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Channel driver error: {0}")]
    Driver(String),

    #[error("Report error: {0}")]
    Report(String),

    #[error("UI error: {0}")]
    Ui(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes_are_distinct() {
        let codes = [
            NormalizationError::EmptyInput.code(),
            NormalizationError::MalformedCharacters { found: 'x' }.code(),
            NormalizationError::LengthOutOfRange {
                observed: 3,
                min: 10,
                max: 10,
            }
            .code(),
            NormalizationError::CallingCodeMismatch {
                expected: "90".into(),
            }
            .code(),
        ];
        assert_eq!(codes[3], "calling_code_mismatch");
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), 4);
    }
}
