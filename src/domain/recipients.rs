//! Turns a raw block of lines into normalization attempts.
//!
//! Comments (`#`) and blank lines are dropped. Everything else yields exactly
//! one attempt tagged with its 1-based line number, in input order. Duplicates
//! are kept; whether to send them twice is the dispatcher's call.

use crate::domain::country::CountryProfile;
use crate::domain::entities::{NormalizationAttempt, RawRecipientLine, Recipient};
use crate::domain::normalizer::normalize;

pub const COMMENT_MARKER: char = '#';

pub struct RecipientListBuilder;

impl RecipientListBuilder {
    pub fn build(raw_text: &str, profile: &CountryProfile) -> Vec<NormalizationAttempt> {
        raw_text
            .lines()
            .enumerate()
            .map(|(idx, text)| RawRecipientLine {
                line: idx + 1,
                text: text.trim(),
            })
            .filter(|l| !l.text.is_empty() && !l.text.starts_with(COMMENT_MARKER))
            .map(|l| NormalizationAttempt {
                line: l.line,
                raw: l.text.to_string(),
                profile_key: profile.key.clone(),
                outcome: normalize(l.text, profile),
            })
            .collect()
    }

    /// Split attempts into dispatchable recipients and invalid lines, both in line order.
    pub fn partition(
        attempts: Vec<NormalizationAttempt>,
    ) -> (Vec<Recipient>, Vec<NormalizationAttempt>) {
        let mut recipients = Vec::new();
        let mut invalid = Vec::new();
        for attempt in attempts {
            match &attempt.outcome {
                Ok(number) => recipients.push(Recipient::new(number.clone()).at_line(attempt.line)),
                Err(_) => invalid.push(attempt),
            }
        }
        (recipients, invalid)
    }

    /// One preview row per attempt: `raw -> +canonical` or `raw -> reason`.
    pub fn preview_rows(attempts: &[NormalizationAttempt]) -> Vec<String> {
        attempts
            .iter()
            .map(|a| match &a.outcome {
                Ok(number) => format!("{:>4}  {:<24} -> {}", a.line, a.raw, number),
                Err(e) => format!("{:>4}  {:<24} -> invalid: {}", a.line, a.raw, e),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::country::CountryRegistry;
    use crate::domain::errors::NormalizationError;

    fn turkey() -> CountryProfile {
        CountryRegistry::builtin()
            .unwrap()
            .lookup("tr")
            .unwrap()
            .clone()
    }

    const BLOCK: &str = "# customers\n\
                         +90 555 123 45 67\n\
                         \n\
                         05559876543\n   # indented comment\n\
                         abc\n\
                         5551234567\n";

    #[test]
    fn test_build_skips_comments_and_blanks() {
        let attempts = RecipientListBuilder::build(BLOCK, &turkey());
        let lines: Vec<usize> = attempts.iter().map(|a| a.line).collect();
        assert_eq!(lines, vec![2, 4, 6, 7]);
        assert!(attempts.iter().all(|a| a.profile_key == "tr"));
        assert_eq!(attempts[2].raw, "abc");
        assert_eq!(
            attempts[2].outcome,
            Err(NormalizationError::MalformedCharacters { found: 'a' })
        );
    }

    #[test]
    fn test_build_keeps_duplicates_in_order() {
        let attempts = RecipientListBuilder::build(BLOCK, &turkey());
        let numbers: Vec<String> = attempts
            .iter()
            .filter_map(|a| a.outcome.as_ref().ok())
            .map(|n| n.as_str().to_string())
            .collect();
        assert_eq!(
            numbers,
            vec!["905551234567", "905559876543", "905551234567"]
        );
    }

    #[test]
    fn test_partition() {
        let attempts = RecipientListBuilder::build(BLOCK, &turkey());
        let (recipients, invalid) = RecipientListBuilder::partition(attempts);
        assert_eq!(recipients.len(), 3);
        assert_eq!(recipients[1].line, Some(4));
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].line, 6);
    }

    #[test]
    fn test_windows_line_endings() {
        let attempts = RecipientListBuilder::build("05551234567\r\n#x\r\n\r\n", &turkey());
        assert_eq!(attempts.len(), 1);
        assert!(attempts[0].is_valid());
    }

    #[test]
    fn test_preview_rows() {
        let attempts = RecipientListBuilder::build("05551234567\n12", &turkey());
        let rows = RecipientListBuilder::preview_rows(&attempts);
        assert!(rows[0].ends_with("-> +905551234567"));
        assert!(rows[1].contains("invalid: national number has 2 digits"));
    }
}
