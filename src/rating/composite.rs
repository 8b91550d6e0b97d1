// Composite rating: fuse base skill, style attributes, track record,
// recent form, and momentum into a single scalar per player.

use serde::Serialize;

use super::league::{LeagueStats, STDEV_EPSILON};
use crate::roster::{Player, StyleAttributes};

// ---------------------------------------------------------------------------
// Weights and thresholds
// ---------------------------------------------------------------------------

/// Weight of the style-attribute adjustment in the composite.
pub const ATTRIBUTE_WEIGHT: f64 = 0.20;
/// Weight of the career-performance adjustment.
pub const OVERALL_WEIGHT: f64 = 0.12;
/// Weight of the recent-form adjustment.
pub const RECENT_WEIGHT: f64 = 0.08;
/// Weight of the momentum adjustment.
pub const MOMENTUM_WEIGHT: f64 = 0.10;

/// Players with fewer recorded games than this are rated on neutral
/// performance numbers.
pub const EXPERIENCE_THRESHOLD: u32 = 10;

/// Default for a missing base-skill component.
const DEFAULT_SKILL: f64 = 5.0;

/// Goal-differential normalization range for career stats.
const CAREER_GD_RANGE: f64 = 50.0;
/// Goal-differential normalization range for recent stats.
const RECENT_GD_RANGE: f64 = 20.0;

/// Form deltas smaller than this count as steady.
const MOMENTUM_DEADBAND: f64 = 0.1;
/// Form delta at which the momentum adjustment saturates.
const MOMENTUM_FULL_SCALE: f64 = 0.3;
/// Maximum upward momentum adjustment.
const HOT_BONUS: f64 = 0.05;
/// Maximum downward momentum adjustment.
const COLD_PENALTY: f64 = 0.03;

/// Win rates below this trigger the catastrophic penalty.
const CATASTROPHIC_WIN_RATE: f64 = 0.3;

// ---------------------------------------------------------------------------
// Momentum
// ---------------------------------------------------------------------------

/// Whether a player's recent form runs above, below, or level with their
/// career performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Momentum {
    Hot,
    Cold,
    Steady,
}

impl Momentum {
    pub fn label(&self) -> &'static str {
        match self {
            Momentum::Hot => "hot",
            Momentum::Cold => "cold",
            Momentum::Steady => "steady",
        }
    }
}

// ---------------------------------------------------------------------------
// Rated player
// ---------------------------------------------------------------------------

/// A player carried through the rating pipeline: resolved skills plus every
/// derived layer, ending in the composite rating. The `tier` field is
/// stamped later by the tier builder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatedPlayer {
    pub id: String,
    pub name: String,
    pub attack: f64,
    pub defense: f64,
    pub game_iq: f64,
    pub attributes: Option<StyleAttributes>,
    pub base_skill: f64,
    pub attribute_score: f64,
    pub attribute_adjustment: f64,
    pub overall_performance: f64,
    pub recent_form: f64,
    pub momentum_score: f64,
    pub momentum: Momentum,
    pub momentum_adjustment: f64,
    pub rating: f64,
    /// 1-based tier number; 0 until the tier builder stamps it.
    pub tier: usize,
    /// True when the player has fewer than 10 recorded games.
    pub is_provisional: bool,
}

// ---------------------------------------------------------------------------
// Normalization helpers
// ---------------------------------------------------------------------------

/// Normalize a win rate to a fraction in `[0, 1]`.
///
/// Values above 1 are treated as percentages and divided by 100, so callers
/// may supply either form interchangeably.
pub fn normalize_win_rate(value: f64) -> f64 {
    let fraction = if value > 1.0 { value / 100.0 } else { value };
    fraction.clamp(0.0, 1.0)
}

/// Clamp-normalize a goal differential from `[-range, range]` into `[0, 1]`.
pub fn normalize_goal_diff(goal_diff: f64, range: f64) -> f64 {
    ((goal_diff + range) / (2.0 * range)).clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Rating
// ---------------------------------------------------------------------------

/// Derive the full set of rating layers for one player.
///
/// Pure and total: any finite input produces a finite composite. Players
/// below the experience threshold are rated on neutral performance numbers
/// (win rate 0.5, goal differential 0) for both the career and recent
/// layers, which zeroes the performance and momentum terms.
pub fn rate_player(player: &Player, league: &LeagueStats) -> RatedPlayer {
    let attack = player.attack.unwrap_or(DEFAULT_SKILL);
    let defense = player.defense.unwrap_or(DEFAULT_SKILL);
    let game_iq = player.game_iq.unwrap_or(DEFAULT_SKILL);
    let base_skill = (attack + defense + game_iq) / 3.0;

    let attribute_score = player.attributes.as_ref().map_or(0.0, |a| a.score());

    let games = player.career.as_ref().and_then(|c| c.games).unwrap_or(0);
    let is_provisional = games < EXPERIENCE_THRESHOLD;

    let (win_rate_career, gd_career, win_rate_recent, gd_recent) = if is_provisional {
        // Neutral substitution: win rate 0.5, goal differential 0.
        (0.5, 0.5, 0.5, 0.5)
    } else {
        let career = player.career.as_ref();
        let recent = player.recent.as_ref();
        (
            career
                .and_then(|c| c.win_rate)
                .map_or(0.5, normalize_win_rate),
            normalize_goal_diff(
                career.and_then(|c| c.goal_diff).unwrap_or(0.0),
                CAREER_GD_RANGE,
            ),
            recent
                .and_then(|r| r.win_rate)
                .map_or(0.5, normalize_win_rate),
            normalize_goal_diff(
                recent.and_then(|r| r.goal_diff).unwrap_or(0.0),
                RECENT_GD_RANGE,
            ),
        )
    };

    let overall_performance = 0.7 * win_rate_career + 0.3 * gd_career;
    let recent_form = 0.7 * win_rate_recent + 0.3 * gd_recent;

    let momentum_score = recent_form - overall_performance;
    let (momentum, momentum_adjustment) = if momentum_score.abs() < MOMENTUM_DEADBAND {
        (Momentum::Steady, 0.0)
    } else {
        let scale = (momentum_score.abs() / MOMENTUM_FULL_SCALE).min(1.0);
        if momentum_score > 0.0 {
            (Momentum::Hot, scale * HOT_BONUS)
        } else {
            (Momentum::Cold, -(scale * COLD_PENALTY))
        }
    };

    // Center the performance signals around zero, then apply the
    // catastrophic penalty for win rates below 30%.
    let mut overall_adjustment = 2.0 * (overall_performance - 0.5);
    if win_rate_career < CATASTROPHIC_WIN_RATE {
        overall_adjustment -= 2.0 * (CATASTROPHIC_WIN_RATE - win_rate_career);
    }
    let mut recent_adjustment = 2.0 * (recent_form - 0.5);
    if win_rate_recent < CATASTROPHIC_WIN_RATE {
        recent_adjustment -= 2.0 * (CATASTROPHIC_WIN_RATE - win_rate_recent);
    }

    let attribute_adjustment = match &player.attributes {
        None => 0.0,
        Some(_) => {
            if league.stdev > STDEV_EPSILON {
                let z = ((attribute_score - league.mean) / league.stdev).clamp(-2.0, 2.0);
                0.15 * z
            } else {
                // Degenerate spread: fall back to a range-normalized offset.
                (attribute_score - league.mean) / (league.max - league.min).max(1.0) * 0.3
            }
        }
    };

    let rating = base_skill
        * (1.0
            + ATTRIBUTE_WEIGHT * attribute_adjustment
            + OVERALL_WEIGHT * overall_adjustment
            + RECENT_WEIGHT * recent_adjustment
            + MOMENTUM_WEIGHT * momentum_adjustment);

    RatedPlayer {
        id: player.id.clone(),
        name: player.name.clone(),
        attack,
        defense,
        game_iq,
        attributes: player.attributes,
        base_skill,
        attribute_score,
        attribute_adjustment,
        overall_performance,
        recent_form,
        momentum_score,
        momentum,
        momentum_adjustment,
        rating,
        tier: 0,
        is_provisional,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{CareerStats, RecentStats};

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn uniform_attrs(v: f64) -> StyleAttributes {
        StyleAttributes {
            pace: v,
            shooting: v,
            passing: v,
            dribbling: v,
            defending: v,
            physical: v,
        }
    }

    fn experienced(id: &str, games: u32, win_rate: f64, goal_diff: f64) -> Player {
        let mut p = Player::named(id, id);
        p.career = Some(CareerStats {
            games: Some(games),
            win_rate: Some(win_rate),
            goal_diff: Some(goal_diff),
        });
        p
    }

    // ---- Normalization ----

    #[test]
    fn win_rate_fraction_passthrough() {
        assert!(approx_eq(normalize_win_rate(0.65), 0.65, 1e-12));
        assert!(approx_eq(normalize_win_rate(1.0), 1.0, 1e-12));
        assert!(approx_eq(normalize_win_rate(0.0), 0.0, 1e-12));
    }

    #[test]
    fn win_rate_percentage_detected() {
        assert!(approx_eq(normalize_win_rate(65.0), 0.65, 1e-12));
        assert!(approx_eq(normalize_win_rate(100.0), 1.0, 1e-12));
        // 1.5% sits in the percentage band even though it is close to 1.
        assert!(approx_eq(normalize_win_rate(1.5), 0.015, 1e-12));
    }

    #[test]
    fn win_rate_clamped() {
        assert!(approx_eq(normalize_win_rate(-0.2), 0.0, 1e-12));
        assert!(approx_eq(normalize_win_rate(140.0), 1.0, 1e-12));
    }

    #[test]
    fn goal_diff_midpoint_and_edges() {
        assert!(approx_eq(normalize_goal_diff(0.0, 50.0), 0.5, 1e-12));
        assert!(approx_eq(normalize_goal_diff(50.0, 50.0), 1.0, 1e-12));
        assert!(approx_eq(normalize_goal_diff(-50.0, 50.0), 0.0, 1e-12));
        // Beyond the range clamps rather than extrapolating.
        assert!(approx_eq(normalize_goal_diff(80.0, 50.0), 1.0, 1e-12));
        assert!(approx_eq(normalize_goal_diff(-33.0, 20.0), 0.0, 1e-12));
    }

    // ---- Base skill ----

    #[test]
    fn missing_skills_default_to_five() {
        let p = Player::named("a", "A");
        let rated = rate_player(&p, &LeagueStats::neutral());
        assert!(approx_eq(rated.base_skill, 5.0, 1e-12));
        assert!(approx_eq(rated.attack, 5.0, 1e-12));
    }

    #[test]
    fn base_skill_is_mean_of_three() {
        let mut p = Player::named("a", "A");
        p.attack = Some(9.0);
        p.defense = Some(6.0);
        p.game_iq = Some(3.0);
        let rated = rate_player(&p, &LeagueStats::neutral());
        assert!(approx_eq(rated.base_skill, 6.0, 1e-12));
    }

    // ---- Neutral substitution ----

    #[test]
    fn provisional_player_rates_at_base() {
        // No history at all: every adjustment layer is neutral, so the
        // composite equals the base skill exactly.
        let mut p = Player::named("a", "A");
        p.attack = Some(7.0);
        p.defense = Some(7.0);
        p.game_iq = Some(7.0);
        let rated = rate_player(&p, &LeagueStats::neutral());
        assert!(rated.is_provisional);
        assert!(approx_eq(rated.overall_performance, 0.5, 1e-12));
        assert!(approx_eq(rated.recent_form, 0.5, 1e-12));
        assert_eq!(rated.momentum, Momentum::Steady);
        assert!(approx_eq(rated.rating, 7.0, 1e-12));
    }

    #[test]
    fn below_threshold_games_ignores_history() {
        // 9 games of a perfect record must not move the rating.
        let p = experienced("a", 9, 1.0, 40.0);
        let rated = rate_player(&p, &LeagueStats::neutral());
        assert!(rated.is_provisional);
        assert!(approx_eq(rated.rating, rated.base_skill, 1e-12));
    }

    #[test]
    fn at_threshold_games_uses_history() {
        let p = experienced("a", 10, 1.0, 40.0);
        let rated = rate_player(&p, &LeagueStats::neutral());
        assert!(!rated.is_provisional);
        assert!(rated.rating > rated.base_skill);
    }

    // ---- Performance layers ----

    #[test]
    fn overall_performance_blend() {
        // win rate 0.6, gd +25 → normalized 0.75
        // overall = 0.7*0.6 + 0.3*0.75 = 0.645
        let p = experienced("a", 30, 0.6, 25.0);
        let rated = rate_player(&p, &LeagueStats::neutral());
        assert!(approx_eq(rated.overall_performance, 0.645, 1e-12));
    }

    #[test]
    fn percentage_and_fraction_agree() {
        let frac = rate_player(&experienced("a", 30, 0.6, 10.0), &LeagueStats::neutral());
        let pct = rate_player(&experienced("a", 30, 60.0, 10.0), &LeagueStats::neutral());
        assert!(approx_eq(frac.rating, pct.rating, 1e-12));
    }

    #[test]
    fn missing_recent_falls_back_to_neutral() {
        let p = experienced("a", 30, 0.5, 0.0);
        let rated = rate_player(&p, &LeagueStats::neutral());
        assert!(approx_eq(rated.recent_form, 0.5, 1e-12));
    }

    // ---- Momentum ----

    #[test]
    fn small_delta_is_steady() {
        let mut p = experienced("a", 30, 0.5, 0.0);
        // overall = 0.5; recent win rate 0.56 → recent_form = 0.7*0.56+0.15 = 0.542
        p.recent = Some(RecentStats {
            win_rate: Some(0.56),
            goal_diff: Some(0.0),
        });
        let rated = rate_player(&p, &LeagueStats::neutral());
        assert_eq!(rated.momentum, Momentum::Steady);
        assert!(approx_eq(rated.momentum_adjustment, 0.0, 1e-12));
    }

    #[test]
    fn hot_momentum_scaled() {
        let mut p = experienced("a", 30, 0.5, 0.0);
        // recent win rate 0.8, gd +10 → recent_form = 0.7*0.8 + 0.3*0.75 = 0.785
        // delta = 0.285, scale = 0.95, adjustment = 0.0475
        p.recent = Some(RecentStats {
            win_rate: Some(0.8),
            goal_diff: Some(10.0),
        });
        let rated = rate_player(&p, &LeagueStats::neutral());
        assert_eq!(rated.momentum, Momentum::Hot);
        assert!(approx_eq(rated.momentum_score, 0.285, 1e-12));
        assert!(approx_eq(rated.momentum_adjustment, 0.0475, 1e-12));
    }

    #[test]
    fn cold_momentum_capped() {
        let mut p = experienced("a", 30, 0.9, 40.0);
        // overall = 0.7*0.9 + 0.3*0.9 = 0.9; recent win rate 0.1, gd -20 →
        // recent_form = 0.07; delta = -0.83 → scale saturates at 1.
        p.recent = Some(RecentStats {
            win_rate: Some(0.1),
            goal_diff: Some(-20.0),
        });
        let rated = rate_player(&p, &LeagueStats::neutral());
        assert_eq!(rated.momentum, Momentum::Cold);
        assert!(approx_eq(rated.momentum_adjustment, -0.03, 1e-12));
    }

    // ---- Catastrophic penalty ----

    #[test]
    fn catastrophic_penalty_applied() {
        // win rate 0.1, gd 0 → overall = 0.7*0.1 + 0.3*0.5 = 0.22
        // centered = -0.56, penalty = 2*(0.3-0.1) = 0.4 → overall_adj = -0.96
        let p = experienced("a", 20, 0.1, 0.0);
        let rated = rate_player(&p, &LeagueStats::neutral());
        // Composite must fall below the un-penalized rendering of the same
        // layers: base * (1 - 0.12*0.4) bounds it from above.
        assert!(rated.rating < rated.base_skill * (1.0 - OVERALL_WEIGHT * 0.4));
    }

    #[test]
    fn catastrophic_penalty_monotone() {
        // Strictly lower win rates below 0.3 must strictly lower the rating.
        let r_025 = rate_player(&experienced("a", 20, 0.25, 0.0), &LeagueStats::neutral());
        let r_015 = rate_player(&experienced("a", 20, 0.15, 0.0), &LeagueStats::neutral());
        let r_005 = rate_player(&experienced("a", 20, 0.05, 0.0), &LeagueStats::neutral());
        assert!(r_015.rating < r_025.rating);
        assert!(r_005.rating < r_015.rating);
    }

    #[test]
    fn no_penalty_at_exactly_threshold() {
        let at = rate_player(&experienced("a", 20, 0.30, 0.0), &LeagueStats::neutral());
        // centered only: overall = 0.7*0.3 + 0.15 = 0.36 → adj = -0.28
        let expected_adj = 2.0 * (0.36 - 0.5);
        let expected =
            at.base_skill * (1.0 + OVERALL_WEIGHT * expected_adj + MOMENTUM_WEIGHT * at.momentum_adjustment + RECENT_WEIGHT * 0.0);
        assert!(approx_eq(at.rating, expected, 1e-9));
    }

    // ---- Attribute adjustment ----

    #[test]
    fn no_bundle_means_no_attribute_adjustment() {
        let p = Player::named("a", "A");
        let league = LeagueStats {
            mean: 6.0,
            stdev: 1.2,
            min: 3.0,
            max: 8.0,
        };
        let rated = rate_player(&p, &league);
        assert!(approx_eq(rated.attribute_adjustment, 0.0, 1e-12));
        assert!(approx_eq(rated.attribute_score, 0.0, 1e-12));
    }

    #[test]
    fn attribute_z_score_clamped() {
        let mut p = Player::named("a", "A");
        p.attributes = Some(uniform_attrs(1.0)); // score 10
        let league = LeagueStats {
            mean: 5.0,
            stdev: 1.0,
            min: 2.0,
            max: 10.0,
        };
        // raw z = 5 → clamped to 2 → adjustment = 0.30
        let rated = rate_player(&p, &league);
        assert!(approx_eq(rated.attribute_adjustment, 0.30, 1e-12));
    }

    #[test]
    fn attribute_zero_spread_uses_range_fallback() {
        let mut p = Player::named("a", "A");
        p.attributes = Some(uniform_attrs(0.8)); // score 8
        let league = LeagueStats {
            mean: 6.0,
            stdev: 0.0,
            min: 5.5,
            max: 6.5,
        };
        // range = 1.0 → max(1, 1.0) = 1.0 → (8-6)/1 * 0.3 = 0.6
        let rated = rate_player(&p, &league);
        assert!(approx_eq(rated.attribute_adjustment, 0.6, 1e-12));
    }

    #[test]
    fn attribute_fallback_guards_tiny_range() {
        let mut p = Player::named("a", "A");
        p.attributes = Some(uniform_attrs(0.8));
        let league = LeagueStats {
            mean: 8.0,
            stdev: 0.0,
            min: 8.0,
            max: 8.0,
        };
        // range 0 → divisor max(1, 0) = 1; offset 0 → adjustment 0.
        let rated = rate_player(&p, &league);
        assert!(approx_eq(rated.attribute_adjustment, 0.0, 1e-12));
    }

    // ---- Composite assembly ----

    #[test]
    fn composite_combines_all_layers() {
        let mut p = Player::named("a", "A");
        p.attack = Some(8.0);
        p.defense = Some(6.0);
        p.game_iq = Some(7.0);
        p.attributes = Some(uniform_attrs(0.7)); // score 7
        p.career = Some(CareerStats {
            games: Some(40),
            win_rate: Some(0.6),
            goal_diff: Some(10.0),
        });
        p.recent = Some(RecentStats {
            win_rate: Some(0.8),
            goal_diff: Some(5.0),
        });
        let league = LeagueStats {
            mean: 5.0,
            stdev: 2.0,
            min: 2.0,
            max: 9.0,
        };

        let rated = rate_player(&p, &league);

        let base: f64 = 7.0;
        let attr_adj = 0.15 * 1.0; // z = (7-5)/2 = 1
        let overall = 0.7 * 0.6 + 0.3 * 0.6; // gd 10/[-50,50] → 0.6
        let recent = 0.7 * 0.8 + 0.3 * 0.625; // gd 5/[-20,20] → 0.625
        let overall_adj = 2.0 * (overall - 0.5);
        let recent_adj = 2.0 * (recent - 0.5);
        let delta: f64 = recent - overall;
        let scale = (delta.abs() / 0.3).min(1.0);
        let momentum_adj = scale * 0.05;
        let expected = base
            * (1.0
                + ATTRIBUTE_WEIGHT * attr_adj
                + OVERALL_WEIGHT * overall_adj
                + RECENT_WEIGHT * recent_adj
                + MOMENTUM_WEIGHT * momentum_adj);

        assert!(approx_eq(rated.rating, expected, 1e-9));
        assert_eq!(rated.momentum, Momentum::Hot);
    }

    #[test]
    fn rating_finite_for_extreme_inputs() {
        let mut p = Player::named("a", "A");
        p.attack = Some(0.0);
        p.defense = Some(0.0);
        p.game_iq = Some(0.0);
        p.career = Some(CareerStats {
            games: Some(1000),
            win_rate: Some(0.0),
            goal_diff: Some(-1e6),
        });
        p.recent = Some(RecentStats {
            win_rate: Some(0.0),
            goal_diff: Some(-1e6),
        });
        let rated = rate_player(&p, &LeagueStats::neutral());
        assert!(rated.rating.is_finite());
    }
}
