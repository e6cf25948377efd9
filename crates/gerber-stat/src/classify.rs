//! Joint-observation classification.
//!
//! Every period of an asset pair falls into exactly one [`Outcome`]. How an
//! outcome moves the pair's counters is decided by a [`PairRule`], which keeps
//! the treatment of ambiguous periods swappable without touching the scan.

use crate::types::PairCounts;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Position of a single return relative to its asset's band `(-H, H)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    /// Breach upward (`r >= H`).
    Up,
    /// Breach downward (`r <= -H`).
    Down,
    /// Inside the band.
    Inside,
}

/// Place a return against its threshold.
///
/// With a zero threshold an exact-zero return stays inside the band.
#[inline]
pub fn band(r: f64, h: f64) -> Band {
    if r >= h && r > 0.0 {
        Band::Up
    } else if r <= -h && r < 0.0 {
        Band::Down
    } else {
        Band::Inside
    }
}

/// Classification of one joint observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Both series breach in the same direction.
    Concordant,
    /// The series breach in opposite directions.
    Discordant,
    /// Neither series breaches.
    Neutral,
    /// Exactly one series breaches.
    Ambiguous,
}

/// Classify a joint observation `(r_i, r_j)` against thresholds `(h_i, h_j)`.
#[inline]
pub fn classify(r_i: f64, r_j: f64, h_i: f64, h_j: f64) -> Outcome {
    match (band(r_i, h_i), band(r_j, h_j)) {
        (Band::Up, Band::Up) | (Band::Down, Band::Down) => Outcome::Concordant,
        (Band::Up, Band::Down) | (Band::Down, Band::Up) => Outcome::Discordant,
        (Band::Inside, Band::Inside) => Outcome::Neutral,
        _ => Outcome::Ambiguous,
    }
}

/// How an outcome updates a pair's counters.
pub trait PairRule {
    /// Fold one outcome into `counts`.
    fn tally(&self, outcome: Outcome, counts: &mut PairCounts);
}

/// Ambiguous periods touch no counter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExcludeAmbiguous;

impl PairRule for ExcludeAmbiguous {
    #[inline]
    fn tally(&self, outcome: Outcome, counts: &mut PairCounts) {
        match outcome {
            Outcome::Concordant => counts.concordant += 1,
            Outcome::Discordant => counts.discordant -= 1,
            Outcome::Neutral => counts.neutral -= 1,
            Outcome::Ambiguous => {}
        }
    }
}

/// Ambiguous periods count as neutral.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmbiguousAsNeutral;

impl PairRule for AmbiguousAsNeutral {
    #[inline]
    fn tally(&self, outcome: Outcome, counts: &mut PairCounts) {
        match outcome {
            Outcome::Concordant => counts.concordant += 1,
            Outcome::Discordant => counts.discordant -= 1,
            Outcome::Neutral | Outcome::Ambiguous => counts.neutral -= 1,
        }
    }
}

/// Configurable choice between the built-in rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguousPolicy {
    /// Ambiguous periods touch no counter.
    #[default]
    Exclude,
    /// Ambiguous periods count as neutral.
    AsNeutral,
}

impl PairRule for AmbiguousPolicy {
    #[inline]
    fn tally(&self, outcome: Outcome, counts: &mut PairCounts) {
        match self {
            AmbiguousPolicy::Exclude => ExcludeAmbiguous.tally(outcome, counts),
            AmbiguousPolicy::AsNeutral => AmbiguousAsNeutral.tally(outcome, counts),
        }
    }
}

impl AmbiguousPolicy {
    /// Returns the policy name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            AmbiguousPolicy::Exclude => "exclude",
            AmbiguousPolicy::AsNeutral => "as_neutral",
        }
    }
}

impl fmt::Display for AmbiguousPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AmbiguousPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exclude" => Ok(Self::Exclude),
            "as_neutral" | "as-neutral" | "neutral" => Ok(Self::AsNeutral),
            _ => Err(format!("Invalid ambiguous policy: {}", s)),
        }
    }
}

/// Scan two aligned series and accumulate their counters.
///
/// Both slices must have the same length.
pub fn count_pair<R>(x: &[f64], y: &[f64], h_x: f64, h_y: f64, rule: &R) -> PairCounts
where
    R: PairRule + ?Sized,
{
    debug_assert_eq!(x.len(), y.len());
    let mut counts = PairCounts::default();
    for (&r_x, &r_y) in x.iter().zip(y.iter()) {
        rule.tally(classify(r_x, r_y, h_x, h_y), &mut counts);
    }
    counts
}
