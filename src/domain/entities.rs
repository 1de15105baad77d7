//! Domain entities. Pure data structures for the core business.
//!
//! No browser or IO types here; adapters map into these.

use crate::domain::errors::NormalizationError;

/// Validated number in canonical international form: calling code followed by
/// the national significant number, digits only. Displays with a leading `+`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalNumber {
    digits: String,
}

impl CanonicalNumber {
    /// Only the normalizer builds these, after validating both parts.
    pub(crate) fn from_parts(calling_code: &str, national: &str) -> Self {
        Self {
            digits: format!("{}{}", calling_code, national),
        }
    }

    /// Bare digits, the form web chat links expect.
    pub fn as_str(&self) -> &str {
        &self.digits
    }
}

impl std::fmt::Display for CanonicalNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "+{}", self.digits)
    }
}

/// One input line, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecipientLine<'a> {
    /// 1-based.
    pub line: usize,
    pub text: &'a str,
}

/// Outcome of normalizing one line under a selected profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizationAttempt {
    pub line: usize,
    pub raw: String,
    pub profile_key: String,
    pub outcome: Result<CanonicalNumber, NormalizationError>,
}

impl NormalizationAttempt {
    pub fn is_valid(&self) -> bool {
        self.outcome.is_ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryState {
    Pending,
    Sent,
    Failed(String),
    /// Not sent by policy (e.g. a duplicate of an earlier line).
    Skipped(String),
}

/// A canonical number and where it is in delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    /// Source line, when the recipient came from a parsed block.
    pub line: Option<usize>,
    pub number: CanonicalNumber,
    pub state: DeliveryState,
}

impl Recipient {
    pub fn new(number: CanonicalNumber) -> Self {
        Self {
            line: None,
            number,
            state: DeliveryState::Pending,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

/// How channel sessions are scoped across a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStrategy {
    /// One throwaway session per recipient.
    #[default]
    Ephemeral,
    /// One session reused for the whole batch.
    Persistent,
}

impl std::str::FromStr for SessionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ephemeral" | "per-recipient" => Ok(Self::Ephemeral),
            "persistent" | "single-tab" | "shared" => Ok(Self::Persistent),
            other => Err(format!(
                "unknown strategy '{}' (expected ephemeral or persistent)",
                other
            )),
        }
    }
}

impl std::fmt::Display for SessionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ephemeral => f.write_str("ephemeral"),
            Self::Persistent => f.write_str("persistent"),
        }
    }
}

/// Opaque handle to one live channel session (e.g. a WebDriver session id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSession {
    pub id: String,
}

impl ChannelSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_number_forms() {
        let n = CanonicalNumber::from_parts("90", "5551234567");
        assert_eq!(n.as_str(), "905551234567");
        assert_eq!(n.to_string(), "+905551234567");
    }

    #[test]
    fn test_strategy_round_trips_through_text() {
        for s in [SessionStrategy::Ephemeral, SessionStrategy::Persistent] {
            assert_eq!(s.to_string().parse::<SessionStrategy>(), Ok(s));
        }
        assert_eq!(
            "single-tab".parse::<SessionStrategy>(),
            Ok(SessionStrategy::Persistent)
        );
        assert!("parallel".parse::<SessionStrategy>().is_err());
    }
}
