//! Phone-number normalization: raw text + country profile -> canonical number.
//!
//! Pure and deterministic. The same (raw, profile) pair always yields the same
//! outcome, which keeps previews reproducible.

use crate::domain::country::CountryProfile;
use crate::domain::entities::CanonicalNumber;
use crate::domain::errors::NormalizationError;

/// Characters dropped before validation.
fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '-' | '.' | '(' | ')' | '/')
}

/// Normalize `raw` under `profile`.
///
/// Prefix patterns are tried longest first and exactly the first one that
/// matches is stripped. Only when no pattern matches is the whole digit string
/// read as a national number. The result must then fall in the profile's range.
pub fn normalize(raw: &str, profile: &CountryProfile) -> Result<CanonicalNumber, NormalizationError> {
    let (has_plus, digits) = clean(raw)?;

    if has_plus && !digits.starts_with(&profile.calling_code) {
        return Err(NormalizationError::CallingCodeMismatch {
            expected: profile.calling_code.clone(),
        });
    }

    let nsn = match profile.patterns().iter().find(|p| p.matches(has_plus, &digits)) {
        Some(pattern) => &digits[pattern.digits().len()..],
        None => digits.as_str(),
    };

    if !profile.accepts_length(nsn.len()) {
        return Err(NormalizationError::LengthOutOfRange {
            observed: nsn.len(),
            min: profile.nsn_min,
            max: profile.nsn_max,
        });
    }
    Ok(CanonicalNumber::from_parts(&profile.calling_code, nsn))
}

/// Strip separators and split off a single leading `+`.
fn clean(raw: &str) -> Result<(bool, String), NormalizationError> {
    let mut has_plus = false;
    let mut digits = String::with_capacity(raw.len());

    for c in raw.chars().filter(|&c| !is_separator(c)) {
        match c {
            '0'..='9' => digits.push(c),
            '+' if !has_plus && digits.is_empty() => has_plus = true,
            other => return Err(NormalizationError::MalformedCharacters { found: other }),
        }
    }

    if digits.is_empty() {
        return Err(NormalizationError::EmptyInput);
    }
    Ok((has_plus, digits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::country::CountryRegistry;

    fn profile(key: &str) -> CountryProfile {
        CountryRegistry::builtin()
            .unwrap()
            .lookup(key)
            .unwrap()
            .clone()
    }

    #[test]
    fn test_turkish_formats_agree() {
        let tr = profile("tr");
        for raw in [
            "+905551234567",
            "905551234567",
            "05551234567",
            "5551234567",
            "00905551234567",
            "+90 (555) 123-45-67",
            "0555.123.45.67",
        ] {
            assert_eq!(normalize(raw, &tr).unwrap().as_str(), "905551234567", "{}", raw);
        }
    }

    #[test]
    fn test_every_builtin_profile_accepts_its_own_formats() {
        let registry = CountryRegistry::builtin().unwrap();
        for (key, _) in registry.list_all() {
            let p = registry.lookup(key).unwrap();
            let nsn = "2".repeat(p.nsn_max);
            let expected = format!("{}{}", p.calling_code, nsn);

            let mut inputs = vec![
                format!("+{}{}", p.calling_code, nsn),
                format!("{}{}", p.calling_code, nsn),
                nsn.clone(),
            ];
            if let Some(trunk) = &p.trunk_prefix {
                inputs.push(format!("{}{}", trunk, nsn));
            }
            if let Some(idd) = &p.idd_prefix {
                inputs.push(format!("{}{}{}", idd, p.calling_code, nsn));
            }
            for raw in inputs {
                assert_eq!(normalize(&raw, p).unwrap().as_str(), expected, "{} {}", key, raw);
            }
        }
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let gb = profile("gb");
        let first = normalize("07700 900123", &gb).unwrap();
        let again = normalize(&first.to_string(), &gb).unwrap();
        assert_eq!(first, again);
        assert_eq!(first.to_string(), "+447700900123");
    }

    #[test]
    fn test_malformed_characters() {
        let tr = profile("tr");
        assert_eq!(
            normalize("555-CALL-NOW", &tr),
            Err(NormalizationError::MalformedCharacters { found: 'C' })
        );
        assert_eq!(
            normalize("90+5551234567", &tr),
            Err(NormalizationError::MalformedCharacters { found: '+' })
        );
        assert_eq!(
            normalize("++905551234567", &tr),
            Err(NormalizationError::MalformedCharacters { found: '+' })
        );
        assert_eq!(
            normalize("5551234567*", &tr),
            Err(NormalizationError::MalformedCharacters { found: '*' })
        );
    }

    #[test]
    fn test_empty_input() {
        let tr = profile("tr");
        assert_eq!(normalize("", &tr), Err(NormalizationError::EmptyInput));
        assert_eq!(normalize("  - ( ) ", &tr), Err(NormalizationError::EmptyInput));
        assert_eq!(normalize("+", &tr), Err(NormalizationError::EmptyInput));
    }

    #[test]
    fn test_length_out_of_range_carries_lengths() {
        let tr = profile("tr");
        assert_eq!(
            normalize("555123", &tr),
            Err(NormalizationError::LengthOutOfRange {
                observed: 6,
                min: 10,
                max: 10
            })
        );
        // Highest-priority match is the calling code, leaving 11 digits.
        assert_eq!(
            normalize("9055512345678", &tr),
            Err(NormalizationError::LengthOutOfRange {
                observed: 11,
                min: 10,
                max: 10
            })
        );
        assert!(matches!(
            normalize("+90555", &tr),
            Err(NormalizationError::LengthOutOfRange { observed: 3, .. })
        ));
    }

    #[test]
    fn test_foreign_plus_number_is_rejected() {
        let tr = profile("tr");
        assert_eq!(
            normalize("+447700900123", &tr),
            Err(NormalizationError::CallingCodeMismatch {
                expected: "90".into()
            })
        );
    }

    #[test]
    fn test_matched_prefix_is_never_reread_as_bare() {
        let tr = profile("tr");
        // Trunk zero plus a digit short: must not become +90 0555...
        assert!(matches!(
            normalize("0555123456", &tr),
            Err(NormalizationError::LengthOutOfRange { observed: 9, .. })
        ));
        // Leading 90 is the calling code even when the rest is too short.
        assert!(matches!(
            normalize("9012345678", &tr),
            Err(NormalizationError::LengthOutOfRange { observed: 8, .. })
        ));

        // Polish numbers whose national part starts with 48 need the +48 form.
        let pl = profile("pl");
        assert!(matches!(
            normalize("48 123 45 67", &pl),
            Err(NormalizationError::LengthOutOfRange { observed: 7, .. })
        ));
        assert_eq!(normalize("+48481234567", &pl).unwrap().as_str(), "48481234567");
    }

    #[test]
    fn test_multi_digit_trunk() {
        let hu = profile("hu");
        assert_eq!(normalize("06 20 123 4567", &hu).unwrap().as_str(), "36201234567");
    }
}
