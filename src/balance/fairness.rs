// Distribution validator: tier-concentration rules and the swap
// acceptability policy used by the optimizer.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::rating::RatedPlayer;

/// Rating spread within a tier above which the bottom-concentration rule
/// applies.
pub const CONCENTRATION_SPREAD: f64 = 1.5;

/// Improvement a swap must clear to introduce a new (or different)
/// concentration violation.
pub const VIOLATION_MARGIN: f64 = 0.10;

// ---------------------------------------------------------------------------
// Distribution check
// ---------------------------------------------------------------------------

/// Check a candidate split for tier-concentration problems.
///
/// Returns `None` when the split is fair, otherwise a human-readable
/// description of the first violation found, walking tiers from the top:
///
/// 1. **Monopoly** — one team holds every member of a tier of two or more.
/// 2. **Bottom concentration** — in a tier of three or more whose rating
///    spread exceeds [`CONCENTRATION_SPREAD`], both of the two lowest-rated
///    members sit on the same team.
pub fn check_distribution(blue: &[RatedPlayer], orange: &[RatedPlayer]) -> Option<String> {
    let tier_numbers: BTreeSet<usize> = blue
        .iter()
        .chain(orange.iter())
        .map(|p| p.tier)
        .collect();

    for tier in tier_numbers {
        let blue_members: Vec<&RatedPlayer> = blue.iter().filter(|p| p.tier == tier).collect();
        let orange_members: Vec<&RatedPlayer> = orange.iter().filter(|p| p.tier == tier).collect();
        let total = blue_members.len() + orange_members.len();
        if total < 2 {
            continue;
        }

        // Monopoly rule.
        if orange_members.is_empty() {
            return Some(format!(
                "tier {tier} is entirely on the blue team ({total} players)"
            ));
        }
        if blue_members.is_empty() {
            return Some(format!(
                "tier {tier} is entirely on the orange team ({total} players)"
            ));
        }

        // Bottom-concentration rule.
        if total >= 3 {
            let mut members: Vec<(&RatedPlayer, &'static str)> = blue_members
                .iter()
                .map(|p| (*p, "blue"))
                .chain(orange_members.iter().map(|p| (*p, "orange")))
                .collect();
            members.sort_by(|a, b| {
                a.0.rating
                    .partial_cmp(&b.0.rating)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.0.id.cmp(&b.0.id))
            });

            if let [lowest, second, .., highest] = members.as_slice() {
                let spread = highest.0.rating - lowest.0.rating;
                if spread > CONCENTRATION_SPREAD && lowest.1 == second.1 {
                    return Some(format!(
                        "the two weakest players in tier {tier} ({}, {}) are both on the {} team",
                        lowest.0.name, second.0.name, lowest.1
                    ));
                }
            }
        }
    }

    None
}

// ---------------------------------------------------------------------------
// Swap acceptability
// ---------------------------------------------------------------------------

/// Decide whether a candidate swap may be applied, given the distribution
/// verdicts before and after and the score improvement it buys.
///
/// Moving towards fairness is always allowed; introducing a violation, or
/// trading one violation for a different one, must buy more than
/// [`VIOLATION_MARGIN`] of improvement.
pub fn is_swap_acceptable(
    before: &Option<String>,
    after: &Option<String>,
    improvement: f64,
) -> bool {
    match (before, after) {
        (None, None) => true,
        (Some(_), None) => true,
        (None, Some(_)) => improvement > VIOLATION_MARGIN,
        (Some(b), Some(a)) => b == a || improvement > VIOLATION_MARGIN,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::{rate_player, LeagueStats, RatedPlayer};
    use crate::roster::Player;

    fn tiered(id: &str, name: &str, skill: f64, tier: usize) -> RatedPlayer {
        let mut p = Player::named(id, name);
        p.attack = Some(skill);
        p.defense = Some(skill);
        p.game_iq = Some(skill);
        let mut rated = rate_player(&p, &LeagueStats::neutral());
        rated.tier = tier;
        rated
    }

    // ---- Monopoly rule ----

    #[test]
    fn balanced_tiers_are_fair() {
        let blue = vec![tiered("a", "A", 8.0, 1), tiered("c", "C", 6.0, 2)];
        let orange = vec![tiered("b", "B", 8.0, 1), tiered("d", "D", 6.0, 2)];
        assert_eq!(check_distribution(&blue, &orange), None);
    }

    #[test]
    fn monopoly_detected() {
        let blue = vec![
            tiered("a", "A", 8.0, 1),
            tiered("b", "B", 8.0, 1),
            tiered("c", "C", 6.0, 2),
        ];
        let orange = vec![tiered("d", "D", 6.0, 2), tiered("e", "E", 6.0, 2)];
        let issue = check_distribution(&blue, &orange).expect("tier 1 monopoly");
        assert!(issue.contains("tier 1"), "got: {issue}");
        assert!(issue.contains("blue"), "got: {issue}");
        assert!(issue.contains("2 players"), "got: {issue}");
    }

    #[test]
    fn single_member_tier_not_a_monopoly() {
        let blue = vec![tiered("a", "A", 8.0, 1)];
        let orange = vec![tiered("b", "B", 6.0, 2)];
        assert_eq!(check_distribution(&blue, &orange), None);
    }

    #[test]
    fn first_violation_reported() {
        // Monopolies in tiers 1 and 2; the report names tier 1.
        let blue = vec![tiered("a", "A", 8.0, 1), tiered("b", "B", 8.0, 1)];
        let orange = vec![tiered("c", "C", 6.0, 2), tiered("d", "D", 6.0, 2)];
        let issue = check_distribution(&blue, &orange).unwrap();
        assert!(issue.contains("tier 1"), "got: {issue}");
    }

    // ---- Bottom-concentration rule ----

    #[test]
    fn bottom_concentration_detected() {
        // Tier 1 spread = 8.0 - 6.0 = 2.0 > 1.5; the two weakest (6.0, 6.3)
        // both sit on orange.
        let blue = vec![tiered("a", "Ann", 8.0, 1), tiered("b", "Ben", 7.8, 1)];
        let orange = vec![tiered("c", "Cam", 6.3, 1), tiered("d", "Dee", 6.0, 1)];
        let issue = check_distribution(&blue, &orange).expect("bottom concentration");
        assert!(issue.contains("tier 1"), "got: {issue}");
        assert!(issue.contains("Dee"), "got: {issue}");
        assert!(issue.contains("Cam"), "got: {issue}");
        assert!(issue.contains("orange"), "got: {issue}");
    }

    #[test]
    fn narrow_spread_tolerated() {
        // Same shape but spread 1.0 ≤ 1.5: no violation.
        let blue = vec![tiered("a", "Ann", 7.0, 1), tiered("b", "Ben", 6.9, 1)];
        let orange = vec![tiered("c", "Cam", 6.2, 1), tiered("d", "Dee", 6.0, 1)];
        assert_eq!(check_distribution(&blue, &orange), None);
    }

    #[test]
    fn split_bottom_pair_tolerated() {
        // Wide spread but the two weakest are on different teams.
        let blue = vec![tiered("a", "Ann", 8.0, 1), tiered("d", "Dee", 6.0, 1)];
        let orange = vec![tiered("b", "Ben", 7.8, 1), tiered("c", "Cam", 6.3, 1)];
        assert_eq!(check_distribution(&blue, &orange), None);
    }

    #[test]
    fn two_member_tier_skips_concentration_rule() {
        // A pair with a wide spread split across teams is fine; the
        // concentration rule needs three members.
        let blue = vec![tiered("a", "Ann", 9.0, 1)];
        let orange = vec![tiered("b", "Ben", 5.0, 1)];
        assert_eq!(check_distribution(&blue, &orange), None);
    }

    // ---- Swap acceptability ----

    #[test]
    fn fair_to_fair_accepted() {
        assert!(is_swap_acceptable(&None, &None, 0.001));
    }

    #[test]
    fn violation_to_fair_accepted() {
        assert!(is_swap_acceptable(&Some("tier 1".into()), &None, 0.0));
    }

    #[test]
    fn fair_to_violation_needs_margin() {
        let after = Some("tier 3 is entirely on the blue team (2 players)".to_string());
        assert!(!is_swap_acceptable(&None, &after, 0.05));
        assert!(!is_swap_acceptable(&None, &after, 0.10));
        assert!(is_swap_acceptable(&None, &after, 0.12));
    }

    #[test]
    fn same_violation_accepted() {
        let v = Some("tier 2 is entirely on the blue team (2 players)".to_string());
        assert!(is_swap_acceptable(&v, &v.clone(), 0.0));
    }

    #[test]
    fn different_violation_needs_margin() {
        let before = Some("tier 2 is entirely on the blue team (2 players)".to_string());
        let after = Some("tier 4 is entirely on the orange team (3 players)".to_string());
        assert!(!is_swap_acceptable(&before, &after, 0.08));
        assert!(is_swap_acceptable(&before, &after, 0.11));
    }
}
