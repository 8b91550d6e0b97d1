// Rating engine: league statistics and the per-player composite rating.

pub mod composite;
pub mod league;

pub use composite::{
    rate_player, Momentum, RatedPlayer, ATTRIBUTE_WEIGHT, EXPERIENCE_THRESHOLD, MOMENTUM_WEIGHT,
    OVERALL_WEIGHT, RECENT_WEIGHT,
};
pub use league::{attribute_stats, LeagueStats};

use crate::roster::Player;
use tracing::debug;

/// Rate every player on the roster against the roster's own attribute
/// statistics. Order of the output matches the input.
pub fn rate_roster(players: &[Player]) -> Vec<RatedPlayer> {
    let stats = league::attribute_stats(players);
    debug!(
        mean = stats.mean,
        stdev = stats.stdev,
        "league attribute statistics computed"
    );
    players
        .iter()
        .map(|p| composite::rate_player(p, &stats))
        .collect()
}
