// League-wide statistics over style-attribute scores.

use crate::roster::Player;

/// Threshold below which a standard deviation is treated as zero.
pub const STDEV_EPSILON: f64 = 1e-9;

/// Population statistics of the attribute score (0-10 scale) across the
/// roster, restricted to players that carry a style-attribute bundle.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct LeagueStats {
    pub mean: f64,
    pub stdev: f64,
    pub min: f64,
    pub max: f64,
}

impl LeagueStats {
    /// The fallback used when no player carries a bundle: a centered mean
    /// with unit spread, so downstream adjustments stay well-defined.
    pub fn neutral() -> Self {
        LeagueStats {
            mean: 5.0,
            stdev: 1.0,
            min: 5.0,
            max: 5.0,
        }
    }
}

/// Compute league statistics for the given roster.
///
/// Uses the population standard deviation (N denominator): the roster is the
/// full relevant universe, not a sample. Returns [`LeagueStats::neutral`]
/// when no player has a style bundle.
pub fn attribute_stats(players: &[Player]) -> LeagueStats {
    let scores: Vec<f64> = players
        .iter()
        .filter_map(|p| p.attributes.as_ref())
        .map(|a| a.score())
        .collect();

    if scores.is_empty() {
        return LeagueStats::neutral();
    }

    let n = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / n;
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    LeagueStats {
        mean,
        stdev: variance.sqrt(),
        min,
        max,
    }
}
