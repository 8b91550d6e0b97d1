// Audit trail: a structured record of inputs, intermediate values, swaps,
// and the final outcome, built once per balancing call and rendered to a
// single text blob on demand.

use std::fmt::Write as _;

use serde::Serialize;

use crate::balance::{ScoreBreakdown, SwapRecord};
use crate::confidence::Confidence;
use crate::draft::{DraftLog, Team, Tier};
use crate::rating::RatedPlayer;

// ---------------------------------------------------------------------------
// Quality bands
// ---------------------------------------------------------------------------

/// Coarse quality band for a final balance score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreQuality {
    Excellent,
    Good,
    Acceptable,
    Unbalanced,
}

impl ScoreQuality {
    pub fn from_score(score: f64) -> Self {
        if score <= 0.3 {
            ScoreQuality::Excellent
        } else if score <= 0.8 {
            ScoreQuality::Good
        } else if score <= 1.5 {
            ScoreQuality::Acceptable
        } else {
            ScoreQuality::Unbalanced
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreQuality::Excellent => "excellent",
            ScoreQuality::Good => "good",
            ScoreQuality::Acceptable => "acceptable",
            ScoreQuality::Unbalanced => "unbalanced",
        }
    }
}

// ---------------------------------------------------------------------------
// Report structure
// ---------------------------------------------------------------------------

/// Headline numbers for a balancing run.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutiveSummary {
    pub roster_size: usize,
    /// Players rated on real history.
    pub rated_players: usize,
    /// Players below the experience threshold.
    pub provisional_players: usize,
    pub tier_sizes: Vec<usize>,
    pub final_score: f64,
    pub quality: ScoreQuality,
    pub swap_count: usize,
    /// Which side ended up stronger on mean composite rating, or "even".
    pub advantage: String,
}

/// Tier layout entry: membership by name, plus the rating range.
#[derive(Debug, Clone, Serialize)]
pub struct TierSummary {
    pub number: usize,
    pub size: usize,
    pub min_rating: f64,
    pub max_rating: f64,
    pub players: Vec<String>,
}

/// The full audit record. Field order mirrors the pipeline: ratings, tiers,
/// draft, initial score, swaps, confidence.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub summary: ExecutiveSummary,
    pub players: Vec<RatedPlayer>,
    pub tiers: Vec<TierSummary>,
    pub draft: DraftLog,
    pub initial_score: f64,
    pub initial_breakdown: ScoreBreakdown,
    pub optimized_score: f64,
    pub swaps: Vec<SwapRecord>,
    pub confidence: Confidence,
}

/// Mean-composite advantage tag. Differences below a tenth of a rating
/// point read as even.
pub fn advantage_tag(blue: &[RatedPlayer], orange: &[RatedPlayer]) -> String {
    let mean = |team: &[RatedPlayer]| {
        if team.is_empty() {
            0.0
        } else {
            team.iter().map(|p| p.rating).sum::<f64>() / team.len() as f64
        }
    };
    let delta = mean(blue) - mean(orange);
    if delta.abs() < 0.1 {
        "even".to_string()
    } else if delta > 0.0 {
        format!("blue +{delta:.2}")
    } else {
        format!("orange +{:.2}", -delta)
    }
}

/// Assemble the audit record from the pipeline's intermediate values.
#[allow(clippy::too_many_arguments)]
pub fn build_report(
    rated: &[RatedPlayer],
    tiers: &[Tier],
    draft: DraftLog,
    initial_breakdown: ScoreBreakdown,
    swaps: Vec<SwapRecord>,
    optimized_score: f64,
    blue: &[RatedPlayer],
    orange: &[RatedPlayer],
    confidence: Confidence,
) -> AuditReport {
    let provisional_players = rated.iter().filter(|p| p.is_provisional).count();
    let summary = ExecutiveSummary {
        roster_size: rated.len(),
        rated_players: rated.len() - provisional_players,
        provisional_players,
        tier_sizes: tiers.iter().map(Tier::len).collect(),
        final_score: optimized_score,
        quality: ScoreQuality::from_score(optimized_score),
        swap_count: swaps.len(),
        advantage: advantage_tag(blue, orange),
    };

    let tier_summaries = tiers
        .iter()
        .map(|t| TierSummary {
            number: t.number,
            size: t.len(),
            min_rating: t.min_rating,
            max_rating: t.max_rating,
            players: t.players.iter().map(|p| p.name.clone()).collect(),
        })
        .collect();

    AuditReport {
        summary,
        players: rated.to_vec(),
        tiers: tier_summaries,
        draft,
        initial_score: initial_breakdown.score,
        initial_breakdown,
        optimized_score,
        swaps,
        confidence,
    }
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

impl AuditReport {
    /// Render the report to a single human-readable text blob. Every field
    /// of the structured record appears somewhere in the output.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let s = &self.summary;

        let _ = writeln!(out, "== TEAM BALANCE REPORT ==");
        let _ = writeln!(
            out,
            "Roster: {} players ({} rated, {} provisional)",
            s.roster_size, s.rated_players, s.provisional_players
        );
        let _ = writeln!(out, "Tiers: {:?}", s.tier_sizes);
        let _ = writeln!(
            out,
            "Final score: {:.3} ({})",
            s.final_score,
            s.quality.label()
        );
        let _ = writeln!(out, "Swaps applied: {}", s.swap_count);
        let _ = writeln!(out, "Advantage: {}", s.advantage);
        let _ = writeln!(
            out,
            "Confidence: {} - {}",
            self.confidence.level.label(),
            self.confidence.message
        );

        let _ = writeln!(out, "\n-- Player ratings --");
        for p in &self.players {
            let _ = writeln!(
                out,
                "  {:<20} base {:>5.2}  attrs {:>5.2} ({:+.3})  perf {:.3}  form {:.3}  \
                 momentum {:<6} ({:+.3})  rating {:>6.3}  tier {}",
                p.name,
                p.base_skill,
                p.attribute_score,
                p.attribute_adjustment,
                p.overall_performance,
                p.recent_form,
                p.momentum.label(),
                p.momentum_adjustment,
                p.rating,
                p.tier
            );
        }

        let _ = writeln!(out, "\n-- Tier layout --");
        for t in &self.tiers {
            let _ = writeln!(
                out,
                "  Tier {} [{:.3} .. {:.3}]: {}",
                t.number,
                t.min_rating,
                t.max_rating,
                t.players.join(", ")
            );
        }

        let _ = writeln!(out, "\n-- Draft --");
        let _ = writeln!(
            out,
            "  Coin flip: {} picks first{}",
            self.draft.initial_first_pick.label(),
            if self.draft.imbalance_flagged {
                " (size adjustment anticipated)"
            } else {
                ""
            }
        );
        for td in &self.draft.tiers {
            let _ = writeln!(
                out,
                "  Tier {}: {} first{}",
                td.tier,
                td.first_pick.label(),
                if td.adjusted { " (adjusted)" } else { "" }
            );
            for pick in self.draft.picks.iter().filter(|p| p.tier == td.tier) {
                let _ = writeln!(out, "    {} -> {}", pick.player_name, pick.team.label());
            }
        }
        if self.draft.size_corrected {
            let _ = writeln!(out, "  Size correction applied after the final tier");
        }

        let b = &self.initial_breakdown;
        let _ = writeln!(out, "\n-- Initial balance --");
        let _ = writeln!(
            out,
            "  attack {:.3}  defense {:.3}  game IQ {:.3}  => skill gap {:.3}",
            b.attack_gap, b.defense_gap, b.game_iq_gap, b.skill_gap
        );
        let g = &b.attribute_gaps;
        let _ = writeln!(
            out,
            "  pace {:.3}  shooting {:.3}  passing {:.3}  dribbling {:.3}  \
             defending {:.3}  physical {:.3}  => attribute gap {:.3}",
            g.pace, g.shooting, g.passing, g.dribbling, g.defending, g.physical, b.attribute_gap
        );
        let _ = writeln!(
            out,
            "  score {:.3} (primary factor: {})",
            self.initial_score,
            b.primary_factor.label()
        );

        let _ = writeln!(out, "\n-- Optimization --");
        if self.swaps.is_empty() {
            let _ = writeln!(out, "  no swaps applied");
        }
        for swap in &self.swaps {
            let tier_note = if swap.tier < 0 {
                "cross-tier".to_string()
            } else {
                format!("tier {}", swap.tier)
            };
            let _ = writeln!(
                out,
                "  {} <-> {} (improvement {:.3}, {})",
                swap.blue_player, swap.orange_player, swap.improvement, tier_note
            );
        }
        let _ = writeln!(out, "  final score {:.3}", self.optimized_score);

        out
    }
}

/// An empty-roster report: all counts zero, empty sections.
pub fn empty_report(confidence: Confidence) -> AuditReport {
    AuditReport {
        summary: ExecutiveSummary {
            roster_size: 0,
            rated_players: 0,
            provisional_players: 0,
            tier_sizes: Vec::new(),
            final_score: 0.0,
            quality: ScoreQuality::Excellent,
            swap_count: 0,
            advantage: "even".to_string(),
        },
        players: Vec::new(),
        tiers: Vec::new(),
        draft: DraftLog {
            initial_first_pick: Team::Blue,
            imbalance_flagged: false,
            tiers: Vec::new(),
            picks: Vec::new(),
            size_corrected: false,
        },
        initial_score: 0.0,
        initial_breakdown: ScoreBreakdown {
            attack_gap: 0.0,
            defense_gap: 0.0,
            game_iq_gap: 0.0,
            skill_gap: 0.0,
            attribute_gaps: Default::default(),
            attribute_gap: 0.0,
            score: 0.0,
            primary_factor: crate::balance::PrimaryFactor::Skills,
        },
        optimized_score: 0.0,
        swaps: Vec::new(),
        confidence,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
