//! Map WebDriver failures to domain errors.
//!
//! The dispatcher decides what is fatal from the variant, so the mapping matters:
//! * unreachable driver → `DriverUnavailable` (fatal for every strategy)
//! * dead session or window → `SessionLost` (fatal for the persistent strategy)
//! * `session not created` → `Acquisition`
//! * missing element or timeout → `Delivery`

use crate::adapters::browser::client::WireError;
use crate::domain::DomainError;

/// Map a failure of the command `action` (e.g. "open chat") to a `DomainError`.
pub fn to_domain(action: &str, err: WireError) -> DomainError {
    let detail = format!("{}: {}", action, err);
    match &err {
        WireError::Connect(_) => DomainError::DriverUnavailable(detail),
        WireError::Timeout(_) => DomainError::Delivery(detail),
        WireError::Http(_) => DomainError::Driver(detail),
        WireError::Protocol { error, .. } => match error.as_str() {
            "invalid session id" | "no such window" => DomainError::SessionLost(detail),
            "session not created" => DomainError::Acquisition(detail),
            "no such element" | "timeout" | "element not interactable" => {
                DomainError::Delivery(detail)
            }
            _ => DomainError::Driver(detail),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn protocol(code: &str) -> WireError {
        WireError::Protocol {
            error: code.into(),
            message: "details".into(),
        }
    }

    #[test]
    fn test_mapping() {
        assert!(matches!(
            to_domain("open session", WireError::Connect("refused".into())),
            DomainError::DriverUnavailable(_)
        ));
        assert!(matches!(
            to_domain("send", protocol("invalid session id")),
            DomainError::SessionLost(_)
        ));
        assert!(matches!(
            to_domain("send", protocol("no such window")),
            DomainError::SessionLost(_)
        ));
        assert!(matches!(
            to_domain("open session", protocol("session not created")),
            DomainError::Acquisition(_)
        ));
        assert!(matches!(
            to_domain("send", WireError::Timeout("compose box".into())),
            DomainError::Delivery(_)
        ));
        assert!(matches!(
            to_domain("send", protocol("unknown error")),
            DomainError::Driver(_)
        ));
    }

    #[test]
    fn test_detail_names_action() {
        let err = to_domain("open chat", protocol("no such element"));
        assert!(err.to_string().contains("open chat"));
    }
}
