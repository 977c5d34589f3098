//! Locality: derive a `City, ST` signal from document text and resolve it to a
//! cost-of-living multiplier.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::BudgetError;

// ---------------------------------------------------------------------------
// Factor
// ---------------------------------------------------------------------------

/// Dimensionless cost multiplier, always within [`LocalityFactor::MIN`, `LocalityFactor::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct LocalityFactor(f64);

impl LocalityFactor {
    pub const MIN: f64 = 0.5;
    pub const MAX: f64 = 2.0;
    /// US average.
    pub const BASELINE: LocalityFactor = LocalityFactor(1.0);

    /// Clamp a caller-supplied override into range. Non-finite values are rejected.
    pub fn new(value: f64) -> Result<Self, BudgetError> {
        if !value.is_finite() {
            return Err(BudgetError::InvalidParameter {
                name: "locality_factor".into(),
                value: value.to_string(),
            });
        }
        let clamped = value.clamp(Self::MIN, Self::MAX);
        if clamped != value {
            log::warn!("locality factor {value} clamped to {clamped}");
        }
        Ok(Self(clamped))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for LocalityFactor {
    fn default() -> Self {
        Self::BASELINE
    }
}

impl std::fmt::Display for LocalityFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Signal extraction
// ---------------------------------------------------------------------------

/// A `City, ST` pair found in free text. Both halves are absent when nothing matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocalitySignal {
    pub city: Option<String>,
    pub state: Option<String>,
}

impl LocalitySignal {
    pub fn is_empty(&self) -> bool {
        self.city.is_none() && self.state.is_none()
    }

    pub fn resolve(&self) -> LocalityFactor {
        resolve_locality_factor(self.city.as_deref(), self.state.as_deref())
    }
}

// Capitalized words separated by spaces/tabs (never newlines), a comma, then a
// two-letter uppercase code. A period may only close a short abbreviation
// ("St.", "Mt.", "Ft."), so a sentence end never joins two places. An
// optional "City of"/"County of" lead-in is kept in the capture so it can be
// stripped from the chosen city afterwards.
static CITY_STATE_RE: Lazy<Regex> = Lazy::new(|| {
    const WORD: &str = r"(?:[A-Z][a-z]{0,2}\.|[A-Z][A-Za-z'\-]*)";
    Regex::new(&format!(
        r"\b((?:(?i:city|county)[ \t]+(?i:of)[ \t]+)?{WORD}(?:[ \t]+{WORD})*),[ \t]*([A-Z]{{2}})\b"
    ))
    .expect("city/state pattern is valid")
});

static JURISDICTION_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:city|county)\s+of\s+").expect("prefix pattern is valid"));

/// Return the most frequent `City, ST` pair in `text`.
///
/// Ties go to the pair that appeared first. A leading "City of " / "County of "
/// is stripped from the winning city.
pub fn find_city_state_from_text(text: &str) -> LocalitySignal {
    // (city, state) -> (count, first occurrence index)
    let mut counts: HashMap<(String, String), (usize, usize)> = HashMap::new();

    for (idx, caps) in CITY_STATE_RE.captures_iter(text).enumerate() {
        let (Some(city), Some(state)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let key = (city.as_str().to_string(), state.as_str().to_string());
        let entry = counts.entry(key).or_insert((0, idx));
        entry.0 += 1;
    }

    let best = counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        });

    match best {
        Some(((city, state), (count, _))) => {
            let city = JURISDICTION_PREFIX_RE.replace(&city, "").trim().to_string();
            log::debug!("locality signal: {city}, {state} ({count} occurrence(s))");
            LocalitySignal {
                city: Some(city),
                state: Some(state),
            }
        }
        None => {
            log::debug!("no City, ST pattern found in {} bytes of text", text.len());
            LocalitySignal::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Factor resolution
// ---------------------------------------------------------------------------

/// Major-metro overrides. Checked before the state table.
pub const CITY_FACTORS: &[(&str, f64)] = &[
    ("San Francisco", 1.50),
    ("San Jose", 1.45),
    ("Oakland", 1.40),
    ("New York", 1.45),
    ("Boston", 1.35),
    ("Honolulu", 1.35),
    ("Los Angeles", 1.30),
    ("Seattle", 1.30),
    ("Washington", 1.30),
    ("San Diego", 1.25),
    ("Chicago", 1.15),
    ("Miami", 1.15),
    ("Sacramento", 1.15),
    ("Denver", 1.12),
    ("Portland", 1.12),
    ("Philadelphia", 1.10),
    ("Austin", 1.08),
    ("Minneapolis", 1.05),
    ("Atlanta", 1.05),
    ("Baltimore", 1.05),
    ("Nashville", 1.03),
    ("Dallas", 1.02),
    ("Houston", 1.00),
    ("Phoenix", 1.00),
];

/// 50 states plus the District of Columbia.
pub const STATE_FACTORS: &[(&str, f64)] = &[
    ("AL", 0.88),
    ("AK", 1.25),
    ("AZ", 0.97),
    ("AR", 0.87),
    ("CA", 1.25),
    ("CO", 1.05),
    ("CT", 1.12),
    ("DE", 1.01),
    ("DC", 1.30),
    ("FL", 1.00),
    ("GA", 0.93),
    ("HI", 1.35),
    ("ID", 0.95),
    ("IL", 0.98),
    ("IN", 0.91),
    ("IA", 0.90),
    ("KS", 0.89),
    ("KY", 0.90),
    ("LA", 0.91),
    ("ME", 1.00),
    ("MD", 1.10),
    ("MA", 1.20),
    ("MI", 0.92),
    ("MN", 1.00),
    ("MS", 0.85),
    ("MO", 0.90),
    ("MT", 0.97),
    ("NE", 0.92),
    ("NV", 1.00),
    ("NH", 1.08),
    ("NJ", 1.15),
    ("NM", 0.92),
    ("NY", 1.20),
    ("NC", 0.94),
    ("ND", 0.94),
    ("OH", 0.94),
    ("OK", 0.87),
    ("OR", 1.08),
    ("PA", 0.98),
    ("RI", 1.08),
    ("SC", 0.93),
    ("SD", 0.92),
    ("TN", 0.91),
    ("TX", 0.95),
    ("UT", 0.98),
    ("VT", 1.05),
    ("VA", 1.02),
    ("WA", 1.12),
    ("WV", 0.86),
    ("WI", 0.95),
    ("WY", 0.95),
];

/// Map a locality signal to a cost multiplier.
///
/// A city override wins outright, ignoring the state. Otherwise the state
/// table is consulted, and anything unknown resolves to the baseline 1.00.
pub fn resolve_locality_factor(city: Option<&str>, state: Option<&str>) -> LocalityFactor {
    if let Some(city) = city {
        if let Some((_, factor)) = CITY_FACTORS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(city))
        {
            return LocalityFactor(*factor);
        }
    }

    if let Some(state) = state {
        if let Some((_, factor)) = STATE_FACTORS
            .iter()
            .find(|(code, _)| code.eq_ignore_ascii_case(state))
        {
            return LocalityFactor(*factor);
        }
    }

    LocalityFactor::BASELINE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(city: &str, state: &str) -> LocalitySignal {
        LocalitySignal {
            city: Some(city.into()),
            state: Some(state.into()),
        }
    }

    #[test]
    fn most_frequent_pair_wins() {
        let text = "serving Columbus, OH since 1990; our Dayton, OH office \
                    supports Columbus, OH families.";
        assert_eq!(find_city_state_from_text(text), signal("Columbus", "OH"));
    }

    #[test]
    fn tie_goes_to_first_occurrence() {
        let text = "Dayton, OH and Akron, OH. Later: Akron, OH and Dayton, OH.";
        assert_eq!(find_city_state_from_text(text), signal("Dayton", "OH"));
    }

    #[test]
    fn multi_word_city() {
        let text = "Headquarters: 100 Main St, San Francisco, CA 94105";
        assert_eq!(find_city_state_from_text(text), signal("San Francisco", "CA"));
    }

    #[test]
    fn city_of_prefix_is_stripped() {
        let text = "Funded by the City of Columbus, OH";
        assert_eq!(find_city_state_from_text(text), signal("Columbus", "OH"));

        let text = "COUNTY OF Franklin, OH";
        assert_eq!(find_city_state_from_text(text), signal("Franklin", "OH"));
    }

    #[test]
    fn match_stops_at_sentence_end() {
        let text = "Our main office is in Oakland. San Francisco, CA families are served.";
        let found = find_city_state_from_text(text);
        assert_eq!(found, signal("San Francisco", "CA"));
        assert_eq!(found.resolve().value(), 1.50);
    }

    #[test]
    fn abbreviated_city_keeps_its_period() {
        let text = "Programs run out of St. Louis, MO and Ft. Wayne, IN.";
        assert_eq!(find_city_state_from_text(text), signal("St. Louis", "MO"));
    }

    #[test]
    fn match_does_not_span_lines() {
        let text = "Statement of Need\nDayton, OH";
        assert_eq!(find_city_state_from_text(text), signal("Dayton", "OH"));
    }

    #[test]
    fn no_match_is_empty_signal() {
        assert!(find_city_state_from_text("").is_empty());
        assert!(find_city_state_from_text("no places here, ok").is_empty());
        // Three-letter code is not a state.
        assert!(find_city_state_from_text("Columbus, OHI").is_empty());
    }

    #[test]
    fn city_override_beats_state() {
        assert_eq!(resolve_locality_factor(Some("San Francisco"), Some("OH")).value(), 1.50);
        assert_eq!(resolve_locality_factor(Some("san francisco"), None).value(), 1.50);
    }

    #[test]
    fn state_lookup_is_case_insensitive() {
        assert_eq!(resolve_locality_factor(None, Some("oh")).value(), 0.94);
        assert_eq!(resolve_locality_factor(Some("Dayton"), Some("OH")).value(), 0.94);
    }

    #[test]
    fn unknown_resolves_to_baseline() {
        assert_eq!(resolve_locality_factor(None, None), LocalityFactor::BASELINE);
        assert_eq!(resolve_locality_factor(Some("Nowhere"), Some("ZZ")).value(), 1.0);
    }

    #[test]
    fn tables_are_complete_and_in_range() {
        assert_eq!(STATE_FACTORS.len(), 51);
        assert_eq!(CITY_FACTORS.len(), 24);
        for (_, f) in CITY_FACTORS.iter().chain(STATE_FACTORS) {
            assert!((LocalityFactor::MIN..=LocalityFactor::MAX).contains(f));
        }
    }

    #[test]
    fn override_is_clamped() {
        assert_eq!(LocalityFactor::new(3.0).unwrap().value(), 2.0);
        assert_eq!(LocalityFactor::new(0.1).unwrap().value(), 0.5);
        assert_eq!(LocalityFactor::new(1.2).unwrap().value(), 1.2);
        assert!(LocalityFactor::new(f64::NAN).is_err());
    }

    #[test]
    fn signal_resolves() {
        assert_eq!(signal("Boston", "MA").resolve().value(), 1.35);
        assert_eq!(LocalitySignal::default().resolve(), LocalityFactor::BASELINE);
    }
}
