//! Guess-versus-name comparison policy.

use serde::{Deserialize, Serialize};

/// Generic designator words that can optionally be ignored when comparing.
pub const DEFAULT_DESIGNATORS: &[&str] = &[
    "crater", "craters", "mons", "montes", "mensa", "mensae", "vallis", "valles", "planitia",
    "planum", "patera", "paterae", "chasma", "chasmata", "mare", "maria", "basin", "terra",
    "tholus", "dorsum", "dorsa", "fossa", "fossae", "rupes", "region", "landing", "site",
];

/// How a player's guess is compared to a feature name.
///
/// Comparison is always case-insensitive with surrounding and repeated
/// whitespace ignored. With `strip_designators` on, the listed words are
/// removed from both sides first, so `"gale"` matches `"Gale Crater"` and
/// `"Olympus"` matches `"Olympus Mons"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameMatcher {
    pub strip_designators: bool,
    pub designators: Vec<String>,
}

impl Default for NameMatcher {
    fn default() -> Self {
        Self {
            strip_designators: false,
            designators: DEFAULT_DESIGNATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl NameMatcher {
    pub fn stripping() -> Self {
        Self {
            strip_designators: true,
            ..Self::default()
        }
    }

    /// Canonical comparison form of a name or guess.
    pub fn normalize(&self, text: &str) -> String {
        let words = text.split_whitespace().map(str::to_lowercase);
        if !self.strip_designators {
            return words.collect::<Vec<_>>().join(" ");
        }
        let all: Vec<String> = words.collect();
        let kept: Vec<&str> = all
            .iter()
            .filter(|w| !self.designators.iter().any(|d| d.eq_ignore_ascii_case(w)))
            .map(String::as_str)
            .collect();
        // A name made only of designators ("Mare") stays comparable.
        if kept.is_empty() {
            all.join(" ")
        } else {
            kept.join(" ")
        }
    }

    pub fn matches(&self, guess: &str, name: &str) -> bool {
        let guess = self.normalize(guess);
        !guess.is_empty() && guess == self.normalize(name)
    }
}
