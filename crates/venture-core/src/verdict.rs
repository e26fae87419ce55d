use std::fmt;

use serde::{Deserialize, Serialize};

/// Composite scores at or above this are [`Verdict::Unicorn`].
pub const UNICORN_THRESHOLD: f64 = 80.0;
/// Composite scores at or above this (and below the unicorn bar) are [`Verdict::Caution`].
pub const CAUTION_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Unicorn,
    Caution,
    NoGo,
}

impl Verdict {
    pub fn from_score(final_score: f64) -> Self {
        if final_score >= UNICORN_THRESHOLD {
            Self::Unicorn
        } else if final_score >= CAUTION_THRESHOLD {
            Self::Caution
        } else {
            Self::NoGo
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unicorn => "UNICORN",
            Self::Caution => "CAUTION",
            Self::NoGo => "NO_GO",
        }
    }

    pub const fn headline(self) -> &'static str {
        match self {
            Self::Unicorn => "UNICORN POTENTIAL",
            Self::Caution => "CAUTION",
            Self::NoGo => "NO GO",
        }
    }

    pub const fn explanation(self) -> &'static str {
        match self {
            Self::Unicorn => "High growth, strong structure, and profitable unit economics.",
            Self::Caution => {
                "Good potential, but significant risks exist. Check the 'Unit Economics' or 'Analyst' inputs."
            }
            Self::NoGo => "Structural headwinds are too strong. Pivot required.",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_inclusive_at_the_lower_bound() {
        assert_eq!(Verdict::from_score(100.0), Verdict::Unicorn);
        assert_eq!(Verdict::from_score(80.0), Verdict::Unicorn);
        assert_eq!(Verdict::from_score(79.99), Verdict::Caution);
        assert_eq!(Verdict::from_score(50.0), Verdict::Caution);
        assert_eq!(Verdict::from_score(49.99), Verdict::NoGo);
        assert_eq!(Verdict::from_score(0.0), Verdict::NoGo);
    }

    #[test]
    fn serializes_in_upper_snake_case() {
        let encoded = serde_json::to_string(&Verdict::NoGo).expect("serialize verdict");
        assert_eq!(encoded, "\"NO_GO\"");
        assert_eq!(Verdict::NoGo.to_string(), "NO_GO");
    }
}
