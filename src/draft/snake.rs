// Snake-draft allocator: walk the tiers, alternating which side picks
// first, with balance-preserving pattern adjustments.

use rand::Rng;
use serde::Serialize;
use tracing::{debug, warn};

use super::tiers::Tier;
use crate::rating::RatedPlayer;

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

/// The two sides of the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Team {
    Blue,
    Orange,
}

impl Team {
    pub fn other(self) -> Team {
        match self {
            Team::Blue => Team::Orange,
            Team::Orange => Team::Blue,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Team::Blue => "blue",
            Team::Orange => "orange",
        }
    }
}

// ---------------------------------------------------------------------------
// Draft log
// ---------------------------------------------------------------------------

/// One pick, in draft order.
#[derive(Debug, Clone, Serialize)]
pub struct DraftPick {
    pub player_id: String,
    pub player_name: String,
    pub team: Team,
    pub tier: usize,
}

/// Per-tier draft record. The first picker is written down at pick time
/// rather than reconstructed from the results afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct TierDraft {
    pub tier: usize,
    pub first_pick: Team,
    /// True when the lagging-team adjustment fired for this tier; the usual
    /// first-picker swap is suppressed on leaving an adjusted tier.
    pub adjusted: bool,
}

/// The complete draft trace.
#[derive(Debug, Clone, Serialize)]
pub struct DraftLog {
    /// Which side won the opening coin flip.
    pub initial_first_pick: Team,
    /// Whether the naive-snake pre-pass predicted a size imbalance.
    pub imbalance_flagged: bool,
    pub tiers: Vec<TierDraft>,
    pub picks: Vec<DraftPick>,
    /// True when the defended end-of-draft size correction fired.
    pub size_corrected: bool,
}

impl DraftLog {
    fn empty(first: Team) -> Self {
        DraftLog {
            initial_first_pick: first,
            imbalance_flagged: false,
            tiers: Vec::new(),
            picks: Vec::new(),
            size_corrected: false,
        }
    }
}

/// The allocation produced by the draft.
#[derive(Debug, Clone)]
pub struct DraftOutcome {
    pub blue: Vec<RatedPlayer>,
    pub orange: Vec<RatedPlayer>,
    pub log: DraftLog,
}

// ---------------------------------------------------------------------------
// Allocation
// ---------------------------------------------------------------------------

/// Simulate the naive snake (first picker of tier t+1 = second picker of
/// tier t) and report whether it would leave the team sizes more than one
/// apart.
fn naive_snake_imbalanced(tiers: &[Tier], mut first: Team) -> bool {
    let mut blue = 0usize;
    let mut orange = 0usize;
    for tier in tiers {
        let m = tier.len();
        let first_share = m.div_ceil(2);
        let second_share = m / 2;
        match first {
            Team::Blue => {
                blue += first_share;
                orange += second_share;
            }
            Team::Orange => {
                orange += first_share;
                blue += second_share;
            }
        }
        first = first.other();
    }
    blue.abs_diff(orange) > 1
}

/// Run the snake draft over the given tiers.
///
/// Exactly one random bit is drawn, to decide which side picks first in
/// tier 1; everything after that is a deterministic function of the sorted
/// tiers. Callers that need reproducibility inject a seeded source.
pub fn snake_draft(tiers: &[Tier], rng: &mut impl Rng) -> DraftOutcome {
    let n: usize = tiers.iter().map(Tier::len).sum();
    let target = n / 2;

    let initial_first = if rng.gen_bool(0.5) {
        Team::Blue
    } else {
        Team::Orange
    };

    let mut log = DraftLog::empty(initial_first);
    log.imbalance_flagged = naive_snake_imbalanced(tiers, initial_first);
    if log.imbalance_flagged {
        debug!("naive snake would leave team sizes more than one apart, adjustment may fire");
    }

    let mut blue: Vec<RatedPlayer> = Vec::with_capacity(target + 1);
    let mut orange: Vec<RatedPlayer> = Vec::with_capacity(target + 1);
    let mut first_pick = initial_first;
    let tier_count = tiers.len();

    for (idx, tier) in tiers.iter().enumerate() {
        let mut tier_first = first_pick;
        let mut adjusted = false;

        // Within the last two tiers, hand the first pick to a team that has
        // fallen two or more picks behind. One-shot: the usual first-picker
        // swap is suppressed when leaving an adjusted tier.
        if tier_count >= 2 && idx + 2 >= tier_count {
            let gap = blue.len().abs_diff(orange.len());
            if gap >= 2 {
                let lagging = if blue.len() > orange.len() {
                    Team::Orange
                } else {
                    Team::Blue
                };
                if tier_first != lagging {
                    debug!(tier = tier.number, team = lagging.label(), "first pick flipped to lagging team");
                }
                tier_first = lagging;
                // Latch even when the snake already pointed at the lagging
                // team, so the exit swap below stays suppressed.
                adjusted = true;
            }
        }

        for (i, player) in tier.players.iter().enumerate() {
            // A team that has reached the draft target stops picking.
            let team = if blue.len() >= target && orange.len() < target {
                Team::Orange
            } else if orange.len() >= target && blue.len() < target {
                Team::Blue
            } else if i % 2 == 0 {
                tier_first
            } else {
                tier_first.other()
            };

            match team {
                Team::Blue => blue.push(player.clone()),
                Team::Orange => orange.push(player.clone()),
            }
            log.picks.push(DraftPick {
                player_id: player.id.clone(),
                player_name: player.name.clone(),
                team,
                tier: tier.number,
            });
        }

        log.tiers.push(TierDraft {
            tier: tier.number,
            first_pick: tier_first,
            adjusted,
        });

        if !adjusted {
            first_pick = tier_first.other();
        } else {
            first_pick = tier_first;
        }
    }

    // Defended: the per-pick target routing keeps sizes within one, but a
    // final correction guards the invariant regardless.
    if blue.len().abs_diff(orange.len()) > 1 {
        warn!(
            blue = blue.len(),
            orange = orange.len(),
            "draft produced imbalanced sizes, moving last pick"
        );
        log.size_corrected = true;
        if blue.len() > orange.len() {
            if let Some(p) = blue.pop() {
                orange.push(p);
            }
        } else if let Some(p) = orange.pop() {
            blue.push(p);
        }
    }

    DraftOutcome { blue, orange, log }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
