// Roster input records: player rows, CSV import, ingress validation.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::warn;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The six style-attribute components, each normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StyleAttributes {
    pub pace: f64,
    pub shooting: f64,
    pub passing: f64,
    pub dribbling: f64,
    pub defending: f64,
    pub physical: f64,
}

impl StyleAttributes {
    /// The components paired with their display names, in canonical order.
    pub fn components(&self) -> [(&'static str, f64); 6] {
        [
            ("pace", self.pace),
            ("shooting", self.shooting),
            ("passing", self.passing),
            ("dribbling", self.dribbling),
            ("defending", self.defending),
            ("physical", self.physical),
        ]
    }

    /// Attribute score on the skill scale: mean of the six components × 10.
    pub fn score(&self) -> f64 {
        let sum = self.pace
            + self.shooting
            + self.passing
            + self.dribbling
            + self.defending
            + self.physical;
        sum / 6.0 * 10.0
    }
}

/// Career track record. Any field may be absent; absent values fall back to
/// neutral during rating.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CareerStats {
    /// Total recorded games.
    pub games: Option<u32>,
    /// Career win rate: a fraction in `[0, 1]` or a percentage in `(1, 100]`.
    pub win_rate: Option<f64>,
    /// Career goal differential.
    pub goal_diff: Option<f64>,
}

/// Recent-window performance.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RecentStats {
    /// Recent win rate: a fraction in `[0, 1]` or a percentage in `(1, 100]`.
    pub win_rate: Option<f64>,
    /// Recent goal differential.
    pub goal_diff: Option<f64>,
}

/// A player row as supplied by the caller. Immutable input to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Opaque identifier, unique within one balancing call.
    pub id: String,
    /// Display name, used in the audit report only.
    pub name: String,
    /// Attack skill in `[0, 10]`. Missing defaults to 5.
    pub attack: Option<f64>,
    /// Defense skill in `[0, 10]`. Missing defaults to 5.
    pub defense: Option<f64>,
    /// Game-IQ skill in `[0, 10]`. Missing defaults to 5.
    pub game_iq: Option<f64>,
    /// Style-attribute bundle, if the player has one.
    pub attributes: Option<StyleAttributes>,
    /// Career track record, if any games are on file.
    pub career: Option<CareerStats>,
    /// Recent-window stats, if tracked.
    pub recent: Option<RecentStats>,
}

impl Player {
    /// A bare player with only an identifier and name; every rating field
    /// takes its default. Mostly useful in tests and fixtures.
    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Player {
            id: id.into(),
            name: name.into(),
            attack: None,
            defense: None,
            game_iq: None,
            attributes: None,
            career: None,
            recent: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Ingress validation
// ---------------------------------------------------------------------------

/// Rejection reasons for a roster handed to the engine. These are the only
/// errors the engine itself can produce.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("non-finite value in rating field `{field}` for player `{player_id}`")]
    InvalidRating {
        player_id: String,
        field: &'static str,
    },

    #[error("duplicate player identifier `{id}`")]
    DuplicateIdentifier { id: String },
}

/// Check a roster for non-finite rating fields and duplicate identifiers.
///
/// The engine never produces non-finite values itself, so rejecting them at
/// the ingress keeps every downstream computation total.
pub fn validate_roster(players: &[Player]) -> Result<(), RosterError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(players.len());

    for player in players {
        if !seen.insert(player.id.as_str()) {
            return Err(RosterError::DuplicateIdentifier {
                id: player.id.clone(),
            });
        }

        let mut fields: Vec<(&'static str, Option<f64>)> = vec![
            ("attack", player.attack),
            ("defense", player.defense),
            ("game_iq", player.game_iq),
        ];
        if let Some(attrs) = &player.attributes {
            for (name, value) in attrs.components() {
                fields.push((name, Some(value)));
            }
        }
        if let Some(career) = &player.career {
            fields.push(("career_win_rate", career.win_rate));
            fields.push(("career_goal_diff", career.goal_diff));
        }
        if let Some(recent) = &player.recent {
            fields.push(("recent_win_rate", recent.win_rate));
            fields.push(("recent_goal_diff", recent.goal_diff));
        }

        for (field, value) in fields {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(RosterError::InvalidRating {
                        player_id: player.id.clone(),
                        field,
                    });
                }
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// CSV import
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RosterFileError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

/// Raw CSV row. Every rating column is optional so partially-filled rosters
/// load cleanly; absent values fall back to engine defaults.
#[derive(Debug, Deserialize)]
struct RawPlayerRow {
    id: String,
    name: String,
    #[serde(default)]
    attack: Option<f64>,
    #[serde(default)]
    defense: Option<f64>,
    #[serde(default)]
    game_iq: Option<f64>,
    #[serde(default)]
    pace: Option<f64>,
    #[serde(default)]
    shooting: Option<f64>,
    #[serde(default)]
    passing: Option<f64>,
    #[serde(default)]
    dribbling: Option<f64>,
    #[serde(default)]
    defending: Option<f64>,
    #[serde(default)]
    physical: Option<f64>,
    #[serde(default)]
    games: Option<u32>,
    #[serde(default)]
    career_win_rate: Option<f64>,
    #[serde(default)]
    career_goal_diff: Option<f64>,
    #[serde(default)]
    recent_win_rate: Option<f64>,
    #[serde(default)]
    recent_goal_diff: Option<f64>,
}

impl RawPlayerRow {
    fn into_player(self) -> Player {
        // The bundle counts as present only when all six components parsed.
        let parts = [
            self.pace,
            self.shooting,
            self.passing,
            self.dribbling,
            self.defending,
            self.physical,
        ];
        let present = parts.iter().filter(|p| p.is_some()).count();
        let attributes = if present == 6 {
            Some(StyleAttributes {
                pace: self.pace.unwrap_or(0.0),
                shooting: self.shooting.unwrap_or(0.0),
                passing: self.passing.unwrap_or(0.0),
                dribbling: self.dribbling.unwrap_or(0.0),
                defending: self.defending.unwrap_or(0.0),
                physical: self.physical.unwrap_or(0.0),
            })
        } else {
            if present > 0 {
                warn!(
                    "player '{}' has {present} of 6 attribute columns, treating bundle as absent",
                    self.id.trim()
                );
            }
            None
        };

        let career = if self.games.is_some()
            || self.career_win_rate.is_some()
            || self.career_goal_diff.is_some()
        {
            Some(CareerStats {
                games: self.games,
                win_rate: self.career_win_rate,
                goal_diff: self.career_goal_diff,
            })
        } else {
            None
        };

        let recent = if self.recent_win_rate.is_some() || self.recent_goal_diff.is_some() {
            Some(RecentStats {
                win_rate: self.recent_win_rate,
                goal_diff: self.recent_goal_diff,
            })
        } else {
            None
        };

        Player {
            id: self.id.trim().to_string(),
            name: self.name.trim().to_string(),
            attack: self.attack,
            defense: self.defense,
            game_iq: self.game_iq,
            attributes,
            career,
            recent,
        }
    }
}

fn load_players_from_reader<R: Read>(rdr: R) -> Result<Vec<Player>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut players = Vec::new();
    for result in reader.deserialize::<RawPlayerRow>() {
        match result {
            Ok(raw) => players.push(raw.into_player()),
            Err(e) => {
                warn!("skipping malformed roster row: {}", e);
            }
        }
    }
    Ok(players)
}

/// Load a roster from a CSV file with header-named columns.
///
/// Malformed rows are skipped with a warning; non-finite values are passed
/// through so the engine's ingress validation can reject them with a typed
/// error naming the player and field.
pub fn load_roster_csv(path: &Path) -> Result<Vec<Player>, RosterFileError> {
    let file = std::fs::File::open(path).map_err(|e| RosterFileError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_players_from_reader(file).map_err(|e| RosterFileError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
