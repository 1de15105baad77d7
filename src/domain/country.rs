//! Country profiles and the registry that holds them.
//!
//! The registry is built once at startup and validated eagerly: a duplicate key,
//! a shared calling code or two prefix patterns with the same literal fail the
//! whole construction instead of surfacing later per lookup.

use crate::domain::errors::RegistryError;
use std::collections::HashMap;

/// A leading segment that carries country or trunk information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefixPattern {
    /// `+<cc>`; only matches when the input carried a leading plus.
    PlusCallingCode(String),
    /// `<idd><cc>`, e.g. `0090`.
    IddCallingCode { idd: String, calling_code: String },
    /// Bare `<cc>`.
    CallingCode(String),
    /// National trunk prefix, e.g. `0`.
    Trunk(String),
}

impl PrefixPattern {
    /// Digits stripped when this pattern matches.
    pub fn digits(&self) -> String {
        match self {
            Self::PlusCallingCode(cc) | Self::CallingCode(cc) => cc.clone(),
            Self::IddCallingCode { idd, calling_code } => format!("{}{}", idd, calling_code),
            Self::Trunk(t) => t.clone(),
        }
    }

    pub fn requires_plus(&self) -> bool {
        matches!(self, Self::PlusCallingCode(_))
    }

    /// Literal form used for ordering and ambiguity checks.
    pub fn literal(&self) -> String {
        if self.requires_plus() {
            format!("+{}", self.digits())
        } else {
            self.digits()
        }
    }

    /// Tie-break rank among equal-length literals: international forms first.
    fn rank(&self) -> u8 {
        match self {
            Self::PlusCallingCode(_) => 0,
            Self::IddCallingCode { .. } => 1,
            Self::CallingCode(_) => 2,
            Self::Trunk(_) => 3,
        }
    }

    pub fn matches(&self, has_plus: bool, digits: &str) -> bool {
        if self.requires_plus() != has_plus {
            return false;
        }
        digits.starts_with(&self.digits())
    }
}

impl std::fmt::Display for PrefixPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}'", self.literal())
    }
}

/// Per-country normalization rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryProfile {
    pub key: String,
    pub name: String,
    pub description: String,
    /// Digits only, no leading `+`.
    pub calling_code: String,
    pub trunk_prefix: Option<String>,
    pub idd_prefix: Option<String>,
    pub nsn_min: usize,
    pub nsn_max: usize,
    /// Sorted by priority (longest literal first). Filled by `CountryProfile::new`.
    patterns: Vec<PrefixPattern>,
}

impl CountryProfile {
    pub fn new(
        key: &str,
        name: &str,
        calling_code: &str,
        trunk_prefix: Option<&str>,
        idd_prefix: Option<&str>,
        nsn_range: (usize, usize),
    ) -> Self {
        let mut patterns = vec![
            PrefixPattern::PlusCallingCode(calling_code.to_string()),
            PrefixPattern::CallingCode(calling_code.to_string()),
        ];
        if let Some(idd) = idd_prefix {
            patterns.push(PrefixPattern::IddCallingCode {
                idd: idd.to_string(),
                calling_code: calling_code.to_string(),
            });
        }
        if let Some(trunk) = trunk_prefix {
            patterns.push(PrefixPattern::Trunk(trunk.to_string()));
        }
        patterns.sort_by(|a, b| {
            b.literal()
                .len()
                .cmp(&a.literal().len())
                .then(a.rank().cmp(&b.rank()))
        });

        Self {
            key: key.to_ascii_lowercase(),
            name: name.to_string(),
            description: format!("{} mobile numbers", name),
            calling_code: calling_code.to_string(),
            trunk_prefix: trunk_prefix.map(String::from),
            idd_prefix: idd_prefix.map(String::from),
            nsn_min: nsn_range.0,
            nsn_max: nsn_range.1,
            patterns,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Prefix patterns in the order the normalizer tries them.
    pub fn patterns(&self) -> &[PrefixPattern] {
        &self.patterns
    }

    pub fn accepts_length(&self, len: usize) -> bool {
        (self.nsn_min..=self.nsn_max).contains(&len)
    }

    fn validate(&self) -> Result<(), RegistryError> {
        let invalid = |reason: &str| RegistryError::InvalidProfile {
            key: self.key.clone(),
            reason: reason.to_string(),
        };
        if self.key.is_empty() {
            return Err(invalid("empty key"));
        }
        if self.calling_code.is_empty() || !is_digits(&self.calling_code) {
            return Err(invalid("calling code must be 1-3 digits"));
        }
        if self.calling_code.len() > 3 || self.calling_code.starts_with('0') {
            return Err(invalid("calling code must be 1-3 digits"));
        }
        for prefix in [&self.trunk_prefix, &self.idd_prefix].into_iter().flatten() {
            if prefix.is_empty() || !is_digits(prefix) {
                return Err(invalid("trunk and IDD prefixes must be non-empty digits"));
            }
        }
        if self.nsn_min == 0 || self.nsn_min > self.nsn_max {
            return Err(invalid("national number length range is empty"));
        }
        for (i, left) in self.patterns.iter().enumerate() {
            for right in &self.patterns[i + 1..] {
                if left.literal() == right.literal() {
                    return Err(RegistryError::AmbiguousPrefix {
                        key: self.key.clone(),
                        left: left.to_string(),
                        right: right.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn is_digits(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_digit())
}

/// (key, name, calling code, trunk, IDD, NSN min, NSN max)
type Row = (
    &'static str,
    &'static str,
    &'static str,
    Option<&'static str>,
    Option<&'static str>,
    usize,
    usize,
);

const BUILTIN: &[Row] = &[
    ("tr", "Turkey", "90", Some("0"), Some("00"), 10, 10),
    ("us", "United States", "1", None, Some("011"), 10, 10),
    ("gb", "United Kingdom", "44", Some("0"), Some("00"), 9, 10),
    ("de", "Germany", "49", Some("0"), Some("00"), 7, 11),
    ("fr", "France", "33", Some("0"), Some("00"), 9, 9),
    ("it", "Italy", "39", None, Some("00"), 6, 11),
    ("es", "Spain", "34", None, Some("00"), 9, 9),
    ("nl", "Netherlands", "31", Some("0"), Some("00"), 9, 9),
    ("be", "Belgium", "32", Some("0"), Some("00"), 8, 9),
    ("ch", "Switzerland", "41", Some("0"), Some("00"), 9, 9),
    ("at", "Austria", "43", Some("0"), Some("00"), 7, 13),
    ("pl", "Poland", "48", None, Some("00"), 9, 9),
    ("cz", "Czech Republic", "420", None, Some("00"), 9, 9),
    ("hu", "Hungary", "36", Some("06"), Some("00"), 8, 9),
    ("ro", "Romania", "40", Some("0"), Some("00"), 9, 9),
    ("bg", "Bulgaria", "359", Some("0"), Some("00"), 8, 9),
    ("gr", "Greece", "30", None, Some("00"), 10, 10),
    ("pt", "Portugal", "351", None, Some("00"), 9, 9),
    ("se", "Sweden", "46", Some("0"), Some("00"), 7, 9),
    ("no", "Norway", "47", None, Some("00"), 8, 8),
    ("dk", "Denmark", "45", None, Some("00"), 8, 8),
    ("fi", "Finland", "358", Some("0"), Some("00"), 6, 10),
    ("ru", "Russia", "7", Some("8"), Some("810"), 10, 10),
    ("cn", "China", "86", Some("0"), Some("00"), 10, 11),
    ("jp", "Japan", "81", Some("0"), Some("010"), 9, 10),
    ("kr", "South Korea", "82", Some("0"), Some("001"), 8, 10),
    ("in", "India", "91", Some("0"), Some("00"), 10, 10),
    ("br", "Brazil", "55", Some("0"), Some("00"), 10, 11),
    ("mx", "Mexico", "52", None, Some("00"), 10, 10),
    ("ar", "Argentina", "54", Some("0"), Some("00"), 10, 11),
    ("au", "Australia", "61", Some("0"), Some("0011"), 9, 9),
    ("nz", "New Zealand", "64", Some("0"), Some("00"), 8, 10),
    ("za", "South Africa", "27", Some("0"), Some("00"), 9, 9),
    ("eg", "Egypt", "20", Some("0"), Some("00"), 9, 10),
    ("sa", "Saudi Arabia", "966", Some("0"), Some("00"), 9, 9),
    ("ae", "UAE", "971", Some("0"), Some("00"), 8, 9),
    ("il", "Israel", "972", Some("0"), Some("00"), 8, 9),
    ("ir", "Iran", "98", Some("0"), Some("00"), 10, 10),
    ("pk", "Pakistan", "92", Some("0"), Some("00"), 10, 10),
    ("bd", "Bangladesh", "880", Some("0"), Some("00"), 10, 10),
    ("th", "Thailand", "66", Some("0"), Some("001"), 8, 9),
    ("vn", "Vietnam", "84", Some("0"), Some("00"), 9, 10),
    ("id", "Indonesia", "62", Some("0"), Some("001"), 9, 12),
    ("my", "Malaysia", "60", Some("0"), Some("00"), 9, 10),
    ("sg", "Singapore", "65", None, Some("000"), 8, 8),
    ("ph", "Philippines", "63", Some("0"), Some("00"), 10, 10),
];

/// Read-only table of country profiles, keyed by lowercase ISO alpha-2 code.
#[derive(Debug, Clone)]
pub struct CountryRegistry {
    profiles: Vec<CountryProfile>,
    by_key: HashMap<String, usize>,
}

impl CountryRegistry {
    /// Build and validate a registry. Fails on the first inconsistency.
    pub fn new(profiles: Vec<CountryProfile>) -> Result<Self, RegistryError> {
        let mut by_key = HashMap::with_capacity(profiles.len());
        let mut by_code: HashMap<&str, &str> = HashMap::with_capacity(profiles.len());

        for (idx, profile) in profiles.iter().enumerate() {
            profile.validate()?;
            if by_key.insert(profile.key.clone(), idx).is_some() {
                return Err(RegistryError::DuplicateKey(profile.key.clone()));
            }
            if let Some(first) = by_code.insert(&profile.calling_code, &profile.key) {
                return Err(RegistryError::DuplicateCallingCode {
                    code: profile.calling_code.clone(),
                    first: first.to_string(),
                    second: profile.key.clone(),
                });
            }
        }

        Ok(Self { profiles, by_key })
    }

    /// The built-in table of supported countries.
    pub fn builtin() -> Result<Self, RegistryError> {
        let profiles = BUILTIN
            .iter()
            .map(|&(key, name, cc, trunk, idd, min, max)| {
                let profile = CountryProfile::new(key, name, cc, trunk, idd, (min, max));
                match key {
                    "us" => profile.with_description("US/Canada numbers"),
                    _ => profile,
                }
            })
            .collect();
        Self::new(profiles)
    }

    /// Exact key lookup (case-insensitive).
    pub fn lookup(&self, key: &str) -> Option<&CountryProfile> {
        self.by_key
            .get(&key.trim().to_ascii_lowercase())
            .map(|&idx| &self.profiles[idx])
    }

    /// Lookup by key, falling back to a case-insensitive display-name match.
    pub fn resolve(&self, key_or_name: &str) -> Option<&CountryProfile> {
        self.lookup(key_or_name).or_else(|| {
            let wanted = key_or_name.trim();
            self.profiles
                .iter()
                .find(|p| p.name.eq_ignore_ascii_case(wanted))
        })
    }

    /// (key, display name) pairs ordered by display name.
    pub fn list_all(&self) -> Vec<(&str, &str)> {
        let mut all: Vec<(&str, &str)> = self
            .profiles
            .iter()
            .map(|p| (p.key.as_str(), p.name.as_str()))
            .collect();
        all.sort_by(|a, b| a.1.cmp(b.1));
        all
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_is_valid() {
        let registry = CountryRegistry::builtin().unwrap();
        assert_eq!(registry.len(), 46);
        assert_eq!(registry.lookup("TR").unwrap().calling_code, "90");
        assert_eq!(registry.resolve("united kingdom").unwrap().key, "gb");
        assert!(registry.lookup("xx").is_none());
    }

    #[test]
    fn test_list_all_is_sorted_by_name() {
        let registry = CountryRegistry::builtin().unwrap();
        let names: Vec<&str> = registry.list_all().iter().map(|(_, n)| *n).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.first(), Some(&"Argentina"));
    }

    #[test]
    fn test_patterns_longest_first() {
        let tr = CountryProfile::new("tr", "Turkey", "90", Some("0"), Some("00"), (10, 10));
        let literals: Vec<String> = tr.patterns().iter().map(|p| p.literal()).collect();
        assert_eq!(literals, vec!["0090", "+90", "90", "0"]);
    }

    #[test]
    fn test_duplicate_calling_code_rejected() {
        let err = CountryRegistry::new(vec![
            CountryProfile::new("aa", "Alpha", "90", Some("0"), None, (10, 10)),
            CountryProfile::new("bb", "Beta", "90", None, None, (9, 9)),
        ])
        .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateCallingCode { .. }));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let err = CountryRegistry::new(vec![
            CountryProfile::new("aa", "Alpha", "90", None, None, (10, 10)),
            CountryProfile::new("AA", "Alpha again", "91", None, None, (10, 10)),
        ])
        .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateKey("aa".into()));
    }

    #[test]
    fn test_trunk_equal_to_calling_code_is_ambiguous() {
        let err = CountryRegistry::new(vec![CountryProfile::new(
            "us",
            "United States",
            "1",
            Some("1"),
            None,
            (10, 10),
        )])
        .unwrap_err();
        assert!(matches!(err, RegistryError::AmbiguousPrefix { .. }));
    }

    #[test]
    fn test_invalid_length_range_rejected() {
        let err = CountryRegistry::new(vec![CountryProfile::new(
            "zz", "Nowhere", "999", None, None, (9, 7),
        )])
        .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidProfile { .. }));
    }
}
