// Balance scorer: skill and style-attribute gaps between the two teams,
// combined into a single scalar. Lower is better; zero is a perfect match.

use serde::Serialize;

use crate::rating::RatedPlayer;

/// Share of the combined score carried by the skill gap.
pub const SKILL_GAP_WEIGHT: f64 = 0.8;
/// Share of the combined score carried by the attribute gap.
pub const ATTRIBUTE_GAP_WEIGHT: f64 = 0.2;
/// Sentinel for a split with an empty side, so any real split wins.
pub const EMPTY_TEAM_SCORE: f64 = 1000.0;

// ---------------------------------------------------------------------------
// Breakdown types
// ---------------------------------------------------------------------------

/// Which dimension family dominates the combined score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrimaryFactor {
    Skills,
    Attributes,
    Both,
}

impl PrimaryFactor {
    pub fn label(&self) -> &'static str {
        match self {
            PrimaryFactor::Skills => "skills",
            PrimaryFactor::Attributes => "attributes",
            PrimaryFactor::Both => "both",
        }
    }
}

/// Per-dimension attribute gaps, on the skill (0-10) scale.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AttributeGaps {
    pub pace: f64,
    pub shooting: f64,
    pub passing: f64,
    pub dribbling: f64,
    pub defending: f64,
    pub physical: f64,
}

impl AttributeGaps {
    pub fn max(&self) -> f64 {
        self.pace
            .max(self.shooting)
            .max(self.passing)
            .max(self.dribbling)
            .max(self.defending)
            .max(self.physical)
    }
}

/// Full per-dimension breakdown behind a combined score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    pub attack_gap: f64,
    pub defense_gap: f64,
    pub game_iq_gap: f64,
    /// Worst of the three skill gaps.
    pub skill_gap: f64,
    pub attribute_gaps: AttributeGaps,
    /// Worst of the six attribute gaps.
    pub attribute_gap: f64,
    pub score: f64,
    pub primary_factor: PrimaryFactor,
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

fn mean_of(team: &[RatedPlayer], f: impl Fn(&RatedPlayer) -> f64) -> f64 {
    if team.is_empty() {
        return 0.0;
    }
    team.iter().map(f).sum::<f64>() / team.len() as f64
}

/// Mean of one attribute component over the players that carry a bundle.
/// A team with no bundled players contributes zero.
fn attr_mean(team: &[RatedPlayer], f: impl Fn(&crate::roster::StyleAttributes) -> f64) -> f64 {
    let values: Vec<f64> = team
        .iter()
        .filter_map(|p| p.attributes.as_ref())
        .map(&f)
        .collect();
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Combined balance score for a candidate split. Equivalent to
/// `detailed_score(..).score`, kept separate because the optimizer calls it
/// in a tight loop.
pub fn balance_score(blue: &[RatedPlayer], orange: &[RatedPlayer]) -> f64 {
    if blue.is_empty() || orange.is_empty() {
        return EMPTY_TEAM_SCORE;
    }

    let skill_gap = (mean_of(blue, |p| p.attack) - mean_of(orange, |p| p.attack))
        .abs()
        .max((mean_of(blue, |p| p.defense) - mean_of(orange, |p| p.defense)).abs())
        .max((mean_of(blue, |p| p.game_iq) - mean_of(orange, |p| p.game_iq)).abs());

    SKILL_GAP_WEIGHT * skill_gap + ATTRIBUTE_GAP_WEIGHT * attribute_gap(blue, orange)
}

fn attribute_gap(blue: &[RatedPlayer], orange: &[RatedPlayer]) -> f64 {
    attribute_gaps(blue, orange).max()
}

fn attribute_gaps(blue: &[RatedPlayer], orange: &[RatedPlayer]) -> AttributeGaps {
    let any_bundle = blue
        .iter()
        .chain(orange.iter())
        .any(|p| p.attributes.is_some());
    if !any_bundle {
        return AttributeGaps::default();
    }

    // Differences are taken on the native 0..1 scale, then ×10 so the gap
    // lines up with skill units.
    let gap = |f: fn(&crate::roster::StyleAttributes) -> f64| {
        (attr_mean(blue, f) - attr_mean(orange, f)).abs() * 10.0
    };
    AttributeGaps {
        pace: gap(|a| a.pace),
        shooting: gap(|a| a.shooting),
        passing: gap(|a| a.passing),
        dribbling: gap(|a| a.dribbling),
        defending: gap(|a| a.defending),
        physical: gap(|a| a.physical),
    }
}

/// Score a split and report every per-dimension gap plus the dominating
/// factor. The factor thresholds are intentionally asymmetric: attributes
/// dominate only when their weighted share exceeds the weighted skill share
/// outright, and "both" covers the band above half of it.
pub fn detailed_score(blue: &[RatedPlayer], orange: &[RatedPlayer]) -> ScoreBreakdown {
    if blue.is_empty() || orange.is_empty() {
        return ScoreBreakdown {
            attack_gap: 0.0,
            defense_gap: 0.0,
            game_iq_gap: 0.0,
            skill_gap: 0.0,
            attribute_gaps: AttributeGaps::default(),
            attribute_gap: 0.0,
            score: EMPTY_TEAM_SCORE,
            primary_factor: PrimaryFactor::Skills,
        };
    }

    let attack_gap = (mean_of(blue, |p| p.attack) - mean_of(orange, |p| p.attack)).abs();
    let defense_gap = (mean_of(blue, |p| p.defense) - mean_of(orange, |p| p.defense)).abs();
    let game_iq_gap = (mean_of(blue, |p| p.game_iq) - mean_of(orange, |p| p.game_iq)).abs();
    let skill_gap = attack_gap.max(defense_gap).max(game_iq_gap);

    let attribute_gaps = attribute_gaps(blue, orange);
    let attribute_gap = attribute_gaps.max();

    let weighted_skill = SKILL_GAP_WEIGHT * skill_gap;
    let weighted_attr = ATTRIBUTE_GAP_WEIGHT * attribute_gap;
    let primary_factor = if weighted_attr > weighted_skill {
        PrimaryFactor::Attributes
    } else if weighted_attr > 0.5 * weighted_skill {
        PrimaryFactor::Both
    } else {
        PrimaryFactor::Skills
    };

    ScoreBreakdown {
        attack_gap,
        defense_gap,
        game_iq_gap,
        skill_gap,
        attribute_gaps,
        attribute_gap,
        score: weighted_skill + weighted_attr,
        primary_factor,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
