// Local-search optimizer: tier-local swap passes over an initial draft,
// keeping only swaps that improve the balance score and respect the
// tier-distribution fairness policy.

use std::collections::BTreeMap;
use std::mem;

use serde::Serialize;
use tracing::debug;

use super::fairness::{check_distribution, is_swap_acceptable};
use super::score::balance_score;
use crate::rating::RatedPlayer;

/// Hard cap on accepted swaps, independent of remaining improvement.
pub const MAX_SWAPS: usize = 100;

/// Cross-tier swaps are only considered between players whose composite
/// ratings sit within this window of each other.
pub const CROSS_TIER_RATING_WINDOW: f64 = 1.5;

/// Tier recorded on a cross-tier swap.
pub const CROSS_TIER: i32 = -1;

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// One accepted swap, in application order.
#[derive(Debug, Clone, Serialize)]
pub struct SwapRecord {
    /// Player that moved from blue to orange.
    pub blue_player: String,
    /// Player that moved from orange to blue.
    pub orange_player: String,
    /// Score improvement bought by the swap. Always strictly positive.
    pub improvement: f64,
    /// Tier the swap happened in, or [`CROSS_TIER`] for an adjacent-tier swap.
    pub tier: i32,
}

/// The optimizer's result: final teams plus the swap trace.
#[derive(Debug, Clone)]
pub struct OptimizerOutcome {
    pub blue: Vec<RatedPlayer>,
    pub orange: Vec<RatedPlayer>,
    /// Balance score of the final assignment.
    pub score: f64,
    pub swaps: Vec<SwapRecord>,
    pub was_optimized: bool,
    /// The dynamic stopping threshold used for this run.
    pub threshold: f64,
}

// ---------------------------------------------------------------------------
// Stopping threshold
// ---------------------------------------------------------------------------

/// Dynamic stopping threshold: small teams and narrow rating ranges get a
/// looser target, large spreads a tighter one, clamped to `[0.15, 0.5]`.
pub fn improvement_threshold(team_size: usize, rating_range: f64) -> f64 {
    let size_term = (0.5 / (team_size.max(1) as f64).sqrt()).max(0.15);
    let range_factor = (rating_range / 3.0).min(1.5);
    (size_term * range_factor).clamp(0.15, 0.5)
}

// ---------------------------------------------------------------------------
// Optimization
// ---------------------------------------------------------------------------

/// Index of team members by tier number. Values are kept sorted so the scan
/// order, and therefore tie-breaking on equal candidate scores, is
/// deterministic.
fn index_by_tier(team: &[RatedPlayer]) -> BTreeMap<usize, Vec<usize>> {
    let mut map: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, p) in team.iter().enumerate() {
        map.entry(p.tier).or_default().push(i);
    }
    map
}

fn reindex(map: &mut BTreeMap<usize, Vec<usize>>, idx: usize, from: usize, to: usize) {
    if from == to {
        return;
    }
    if let Some(slots) = map.get_mut(&from) {
        slots.retain(|&i| i != idx);
        if slots.is_empty() {
            map.remove(&from);
        }
    }
    let slots = map.entry(to).or_default();
    slots.push(idx);
    slots.sort_unstable();
}

/// Candidate swap under evaluation: blue index, orange index, and the score
/// the split would have after the swap.
struct Candidate {
    blue_idx: usize,
    orange_idx: usize,
    score: f64,
}

/// Evaluate every (blue, orange) pair from the given index lists and return
/// the acceptable swap with the lowest candidate score, if any improves on
/// `current`.
#[allow(clippy::too_many_arguments)]
fn best_swap(
    blue: &mut [RatedPlayer],
    orange: &mut [RatedPlayer],
    blue_slots: &[usize],
    orange_slots: &[usize],
    current: f64,
    before_violation: &Option<String>,
    rating_window: Option<f64>,
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;

    for &bi in blue_slots {
        for &oj in orange_slots {
            if let Some(window) = rating_window {
                if (blue[bi].rating - orange[oj].rating).abs() > window {
                    continue;
                }
            }

            mem::swap(&mut blue[bi], &mut orange[oj]);
            let candidate = balance_score(blue, orange);
            let after_violation = if candidate < current {
                check_distribution(blue, orange)
            } else {
                None // not consulted; the swap is already out
            };
            mem::swap(&mut blue[bi], &mut orange[oj]);

            if candidate >= current {
                continue;
            }
            let improvement = current - candidate;
            if !is_swap_acceptable(before_violation, &after_violation, improvement) {
                continue;
            }
            if best.as_ref().is_none_or(|b| candidate < b.score) {
                best = Some(Candidate {
                    blue_idx: bi,
                    orange_idx: oj,
                    score: candidate,
                });
            }
        }
    }

    best
}

/// Run the tier-local hill-climbing pass over an initial assignment.
///
/// Tiers are visited from the lowest-skill band upward. Each visit tries a
/// same-tier phase, then a cross-tier phase against the adjacent
/// higher-skill tier (restricted to rating-comparable players). The best
/// acceptable swap of each phase is applied; the pass stops as soon as the
/// score reaches the dynamic threshold, every tier has been visited, or
/// [`MAX_SWAPS`] swaps have been applied.
///
/// Never fails: with no acceptable swap the initial assignment comes back
/// with `was_optimized = false`.
pub fn optimize(mut blue: Vec<RatedPlayer>, mut orange: Vec<RatedPlayer>) -> OptimizerOutcome {
    let n = blue.len() + orange.len();
    let team_size = (n / 2).max(1);

    let rating_range = {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for p in blue.iter().chain(orange.iter()) {
            min = min.min(p.rating);
            max = max.max(p.rating);
        }
        if min.is_finite() { max - min } else { 0.0 }
    };
    let threshold = improvement_threshold(team_size, rating_range);

    let mut score = balance_score(&blue, &orange);
    let mut swaps: Vec<SwapRecord> = Vec::new();

    if score <= threshold {
        debug!(score, threshold, "initial assignment already within threshold");
        return OptimizerOutcome {
            blue,
            orange,
            score,
            swaps,
            was_optimized: false,
            threshold,
        };
    }

    let mut blue_tiers = index_by_tier(&blue);
    let mut orange_tiers = index_by_tier(&orange);

    // Tier numbers, lowest-skill (highest number) first.
    let mut tier_numbers: Vec<usize> = blue_tiers
        .keys()
        .chain(orange_tiers.keys())
        .copied()
        .collect();
    tier_numbers.sort_unstable();
    tier_numbers.dedup();
    tier_numbers.reverse();

    'tiers: for &tier in &tier_numbers {
        // ---- Same-tier phase ----
        let before_violation = check_distribution(&blue, &orange);
        let blue_slots = blue_tiers.get(&tier).cloned().unwrap_or_default();
        let orange_slots = orange_tiers.get(&tier).cloned().unwrap_or_default();

        if let Some(cand) = best_swap(
            &mut blue,
            &mut orange,
            &blue_slots,
            &orange_slots,
            score,
            &before_violation,
            None,
        ) {
            let improvement = score - cand.score;
            mem::swap(&mut blue[cand.blue_idx], &mut orange[cand.orange_idx]);
            debug!(
                tier,
                blue = %orange[cand.orange_idx].name,
                orange = %blue[cand.blue_idx].name,
                improvement,
                "same-tier swap applied"
            );
            swaps.push(SwapRecord {
                blue_player: orange[cand.orange_idx].name.clone(),
                orange_player: blue[cand.blue_idx].name.clone(),
                improvement,
                tier: tier as i32,
            });
            score = cand.score;
            if score <= threshold || swaps.len() >= MAX_SWAPS {
                break 'tiers;
            }
        }

        // ---- Cross-tier phase against the adjacent higher-skill tier ----
        if tier < 2 {
            continue;
        }
        let upper = tier - 1;
        let before_violation = check_distribution(&blue, &orange);

        // Both directions: blue in this tier against orange in the upper
        // tier, and blue in the upper tier against orange in this one.
        let mut pairs: Vec<(Vec<usize>, Vec<usize>)> = Vec::with_capacity(2);
        pairs.push((
            blue_tiers.get(&tier).cloned().unwrap_or_default(),
            orange_tiers.get(&upper).cloned().unwrap_or_default(),
        ));
        pairs.push((
            blue_tiers.get(&upper).cloned().unwrap_or_default(),
            orange_tiers.get(&tier).cloned().unwrap_or_default(),
        ));

        let mut best: Option<Candidate> = None;
        for (blue_slots, orange_slots) in &pairs {
            if let Some(cand) = best_swap(
                &mut blue,
                &mut orange,
                blue_slots,
                orange_slots,
                score,
                &before_violation,
                Some(CROSS_TIER_RATING_WINDOW),
            ) {
                if best.as_ref().is_none_or(|b| cand.score < b.score) {
                    best = Some(cand);
                }
            }
        }

        if let Some(cand) = best {
            let improvement = score - cand.score;
            let from_blue_tier = blue[cand.blue_idx].tier;
            let from_orange_tier = orange[cand.orange_idx].tier;
            mem::swap(&mut blue[cand.blue_idx], &mut orange[cand.orange_idx]);
            // The players keep their tier stamps, so the indices move with
            // them.
            reindex(&mut blue_tiers, cand.blue_idx, from_blue_tier, from_orange_tier);
            reindex(
                &mut orange_tiers,
                cand.orange_idx,
                from_orange_tier,
                from_blue_tier,
            );
            debug!(
                tier,
                upper,
                improvement,
                "cross-tier swap applied"
            );
            swaps.push(SwapRecord {
                blue_player: orange[cand.orange_idx].name.clone(),
                orange_player: blue[cand.blue_idx].name.clone(),
                improvement,
                tier: CROSS_TIER,
            });
            score = cand.score;
            if score <= threshold || swaps.len() >= MAX_SWAPS {
                break 'tiers;
            }
        }
    }

    let was_optimized = !swaps.is_empty();
    OptimizerOutcome {
        blue,
        orange,
        score,
        swaps,
        was_optimized,
        threshold,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
