// Confidence estimator: how much of the roster is rated on real history.

use serde::Serialize;

use crate::rating::RatedPlayer;

/// Confidence in the final assignment, driven by the share of players
/// without enough recorded games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::High => "high",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Confidence {
    pub level: ConfidenceLevel,
    pub message: String,
    /// Players with fewer than 10 recorded games.
    pub provisional: usize,
    pub roster_size: usize,
}

/// Categorize the result by the fraction of provisional players: more than
/// half → low, more than a quarter → medium, otherwise high.
pub fn estimate(rated: &[RatedPlayer]) -> Confidence {
    let roster_size = rated.len();
    let provisional = rated.iter().filter(|p| p.is_provisional).count();

    if roster_size == 0 {
        return Confidence {
            level: ConfidenceLevel::Low,
            message: "empty roster; nothing to balance".to_string(),
            provisional: 0,
            roster_size: 0,
        };
    }

    let ratio = provisional as f64 / roster_size as f64;
    let (level, message) = if ratio > 0.50 {
        (
            ConfidenceLevel::Low,
            format!(
                "{provisional} of {roster_size} players have limited game history; \
                 ratings lean heavily on self-reported skills"
            ),
        )
    } else if ratio > 0.25 {
        (
            ConfidenceLevel::Medium,
            format!(
                "{provisional} of {roster_size} players have limited game history; \
                 expect some drift as results come in"
            ),
        )
    } else {
        (
            ConfidenceLevel::High,
            format!("{provisional} of {roster_size} players lack history; most ratings are grounded in results"),
        )
    };

    Confidence {
        level,
        message,
        provisional,
        roster_size,
    }
}
