// Top-level entry point: rate the roster, tier it, run the snake draft,
// optimize the split, and hand back the assignment with its audit record.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::audit::{self, AuditReport};
use crate::balance::{detailed_score, optimize};
use crate::confidence::{self, Confidence};
use crate::draft::{build_tiers, snake_draft, Tier};
use crate::rating::{rate_roster, RatedPlayer};
use crate::roster::{validate_roster, Player, RosterError};

/// The result of one balancing call.
#[derive(Debug, Clone)]
pub struct BalanceResult {
    pub blue_team: Vec<RatedPlayer>,
    pub orange_team: Vec<RatedPlayer>,
    pub tiers: Vec<Tier>,
    /// Balance score of the raw draft, before optimization.
    pub initial_score: f64,
    /// Balance score after optimization; equals `initial_score` when no
    /// swap was applied.
    pub optimized_score: f64,
    pub was_optimized: bool,
    pub confidence: Confidence,
    pub audit: AuditReport,
}

/// Balance a roster into two teams.
///
/// Exactly one bit is drawn from `rng`, to decide which side picks first in
/// tier 1; everything else is deterministic. The only failure modes are the
/// ingress rejections in [`RosterError`]; an empty roster yields an empty
/// result rather than an error.
pub fn generate_teams(
    roster: &[Player],
    rng: &mut impl Rng,
) -> Result<BalanceResult, RosterError> {
    validate_roster(roster)?;

    if roster.is_empty() {
        let confidence = confidence::estimate(&[]);
        return Ok(BalanceResult {
            blue_team: Vec::new(),
            orange_team: Vec::new(),
            tiers: Vec::new(),
            initial_score: 0.0,
            optimized_score: 0.0,
            was_optimized: false,
            confidence: confidence.clone(),
            audit: audit::empty_report(confidence),
        });
    }

    let rated = rate_roster(roster);
    let confidence = confidence::estimate(&rated);
    let tiers = build_tiers(rated);
    // The tier builder owns the sort and the tier stamps; the audit's
    // per-player list is read back out of the tiers so it carries them.
    let rated: Vec<RatedPlayer> = tiers.iter().flat_map(|t| t.players.clone()).collect();

    let draft = snake_draft(&tiers, rng);
    let initial_breakdown = detailed_score(&draft.blue, &draft.orange);
    let initial_score = initial_breakdown.score;

    let outcome = optimize(draft.blue, draft.orange);
    info!(
        roster = roster.len(),
        initial_score,
        optimized_score = outcome.score,
        swaps = outcome.swaps.len(),
        confidence = confidence.level.label(),
        "teams balanced"
    );

    let audit = audit::build_report(
        &rated,
        &tiers,
        draft.log,
        initial_breakdown,
        outcome.swaps,
        outcome.score,
        &outcome.blue,
        &outcome.orange,
        confidence.clone(),
    );

    Ok(BalanceResult {
        blue_team: outcome.blue,
        orange_team: outcome.orange,
        tiers,
        initial_score,
        optimized_score: outcome.score,
        was_optimized: outcome.was_optimized,
        confidence,
        audit,
    })
}

/// [`generate_teams`] with a seeded random source, for reproducible runs.
pub fn generate_teams_seeded(roster: &[Player], seed: u64) -> Result<BalanceResult, RosterError> {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_teams(roster, &mut rng)
}
