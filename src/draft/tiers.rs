// Tier builder: cut the rating-sorted roster into contiguous bands.

use std::cmp::Ordering;

use serde::Serialize;

use crate::rating::RatedPlayer;

/// A contiguous, rating-descending slice of the roster.
#[derive(Debug, Clone, Serialize)]
pub struct Tier {
    /// 1-based tier number; tier 1 holds the highest-rated players.
    pub number: usize,
    pub players: Vec<RatedPlayer>,
    pub min_rating: f64,
    pub max_rating: f64,
}

impl Tier {
    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Tier sizes for a roster of `n` players.
///
/// - up to 10 players: pairs, with a final tier of 3 when `n` is odd;
/// - 11 to 20: tiers of 4, the remainder either growing the last tier to 5
///   or appending a short tier of 2 or 3 (18 players get the hand-tuned
///   `[4, 4, 3, 4, 3]` layout);
/// - above 20: tiers of 5, with the trailing tiers shortened by one each to
///   absorb the excess capacity.
pub fn tier_sizes(n: usize) -> Vec<usize> {
    match n {
        0 => Vec::new(),
        1 => vec![1],
        2..=10 => {
            if n % 2 == 0 {
                vec![2; n / 2]
            } else {
                let mut sizes = vec![2; (n - 3) / 2];
                sizes.push(3);
                sizes
            }
        }
        18 => vec![4, 4, 3, 4, 3],
        11..=20 => {
            let full = n / 4;
            let mut sizes = vec![4; full];
            match n % 4 {
                0 => {}
                1 => {
                    if let Some(last) = sizes.last_mut() {
                        *last = 5;
                    }
                }
                2 => sizes.push(2),
                _ => sizes.push(3),
            }
            sizes
        }
        _ => {
            let count = n.div_ceil(5);
            let excess = count * 5 - n;
            let mut sizes = vec![5; count];
            for i in 0..excess {
                sizes[count - 1 - i] = 4;
            }
            sizes
        }
    }
}

/// Sort the rated roster (rating descending, identifier ascending on ties)
/// and cut it into tiers. Each member is stamped with its tier number.
pub fn build_tiers(mut rated: Vec<RatedPlayer>) -> Vec<Tier> {
    rated.sort_by(|a, b| {
        b.rating
            .partial_cmp(&a.rating)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    let sizes = tier_sizes(rated.len());
    let mut tiers = Vec::with_capacity(sizes.len());
    let mut rest = rated;

    for (idx, &size) in sizes.iter().enumerate() {
        let number = idx + 1;
        let tail = rest.split_off(size.min(rest.len()));
        let mut players = rest;
        rest = tail;

        for p in &mut players {
            p.tier = number;
        }
        // Players arrive rating-descending, so the range is first..last.
        let max_rating = players.first().map_or(0.0, |p| p.rating);
        let min_rating = players.last().map_or(0.0, |p| p.rating);
        tiers.push(Tier {
            number,
            players,
            min_rating,
            max_rating,
        });
    }

    tiers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::rate_roster;
    use crate::roster::Player;

    fn skilled(id: &str, skill: f64) -> Player {
        let mut p = Player::named(id, id);
        p.attack = Some(skill);
        p.defense = Some(skill);
        p.game_iq = Some(skill);
        p
    }

    fn rated_roster(skills: &[f64]) -> Vec<crate::rating::RatedPlayer> {
        let roster: Vec<Player> = skills
            .iter()
            .enumerate()
            .map(|(i, &s)| skilled(&format!("p{i:02}"), s))
            .collect();
        rate_roster(&roster)
    }

    // ---- tier_sizes ----

    #[test]
    fn sizes_small_even() {
        assert_eq!(tier_sizes(10), vec![2, 2, 2, 2, 2]);
        assert_eq!(tier_sizes(6), vec![2, 2, 2]);
        assert_eq!(tier_sizes(2), vec![2]);
    }

    #[test]
    fn sizes_small_odd() {
        assert_eq!(tier_sizes(9), vec![2, 2, 2, 3]);
        assert_eq!(tier_sizes(7), vec![2, 2, 3]);
        assert_eq!(tier_sizes(3), vec![3]);
        assert_eq!(tier_sizes(1), vec![1]);
    }

    #[test]
    fn sizes_mid_range() {
        assert_eq!(tier_sizes(12), vec![4, 4, 4]);
        assert_eq!(tier_sizes(16), vec![4, 4, 4, 4]);
        assert_eq!(tier_sizes(20), vec![4, 4, 4, 4, 4]);
        assert_eq!(tier_sizes(13), vec![4, 4, 5]);
        assert_eq!(tier_sizes(14), vec![4, 4, 4, 2]);
        assert_eq!(tier_sizes(11), vec![4, 4, 3]);
        assert_eq!(tier_sizes(15), vec![4, 4, 4, 3]);
    }

    #[test]
    fn sizes_eighteen_special_case() {
        assert_eq!(tier_sizes(18), vec![4, 4, 3, 4, 3]);
    }

    #[test]
    fn sizes_large() {
        assert_eq!(tier_sizes(25), vec![5, 5, 5, 5, 5]);
        assert_eq!(tier_sizes(23), vec![5, 5, 5, 4, 4]);
        assert_eq!(tier_sizes(21), vec![5, 4, 4, 4, 4]);
        assert_eq!(tier_sizes(24), vec![5, 5, 5, 5, 4]);
    }

    #[test]
    fn sizes_sum_to_n() {
        for n in 0..=60 {
            let total: usize = tier_sizes(n).iter().sum();
            assert_eq!(total, n, "tier sizes for {n} players sum to {total}");
        }
    }

    #[test]
    fn sizes_zero() {
        assert!(tier_sizes(0).is_empty());
    }

    // ---- build_tiers ----

    #[test]
    fn tiers_sorted_and_stamped() {
        let rated = rated_roster(&[3.0, 9.0, 5.0, 7.0, 4.0, 8.0, 6.0, 2.0]);
        let tiers = build_tiers(rated);

        assert_eq!(tiers.len(), 4);
        // Tier 1 holds the two highest ratings.
        assert_eq!(tiers[0].players[0].rating, 9.0);
        assert_eq!(tiers[0].players[1].rating, 8.0);
        for (idx, tier) in tiers.iter().enumerate() {
            assert_eq!(tier.number, idx + 1);
            for p in &tier.players {
                assert_eq!(p.tier, tier.number);
            }
            assert!(tier.max_rating >= tier.min_rating);
        }
    }

    #[test]
    fn tiers_monotone_across_boundaries() {
        let rated = rated_roster(&[5.5, 8.0, 3.0, 9.5, 4.0, 6.5, 7.0, 2.0, 5.0, 8.5, 6.0, 3.5]);
        let tiers = build_tiers(rated);
        for pair in tiers.windows(2) {
            assert!(
                pair[0].min_rating >= pair[1].max_rating,
                "tier {} floor {} below tier {} ceiling {}",
                pair[0].number,
                pair[0].min_rating,
                pair[1].number,
                pair[1].max_rating
            );
        }
    }

    #[test]
    fn ties_broken_by_identifier() {
        // Four identical ratings: order must be id-ascending, deterministically.
        let rated = rated_roster(&[5.0, 5.0, 5.0, 5.0]);
        let tiers = build_tiers(rated);
        let ids: Vec<&str> = tiers
            .iter()
            .flat_map(|t| t.players.iter().map(|p| p.id.as_str()))
            .collect();
        assert_eq!(ids, vec!["p00", "p01", "p02", "p03"]);
    }

    #[test]
    fn empty_roster_no_tiers() {
        assert!(build_tiers(Vec::new()).is_empty());
    }
}
