// SQLite player store: the read-only roster source the engine consumes.

use std::sync::Mutex;

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use crate::roster::{CareerStats, Player, RecentStats, StyleAttributes};

/// SQLite-backed roster storage. The engine only ever reads from it; the
/// insert path exists for the importer and for tests.
pub struct PlayerStore {
    conn: Mutex<Connection>,
}

impl PlayerStore {
    /// Open (or create) a player store at `path` and ensure the schema
    /// exists. Pass `":memory:"` for an ephemeral in-memory store (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open player store at {path}"))?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS players (
                id               TEXT PRIMARY KEY,
                name             TEXT NOT NULL,
                attack           REAL,
                defense          REAL,
                game_iq          REAL,
                pace             REAL,
                shooting         REAL,
                passing          REAL,
                dribbling        REAL,
                defending        REAL,
                physical         REAL,
                games            INTEGER,
                career_win_rate  REAL,
                career_goal_diff REAL,
                recent_win_rate  REAL,
                recent_goal_diff REAL,
                updated_at       TEXT NOT NULL
            );
            ",
        )
        .context("failed to create player store schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Insert or replace a player row.
    pub fn insert_player(&self, player: &Player) -> Result<()> {
        let conn = self.conn.lock().expect("player store mutex poisoned");
        let attrs = player.attributes.as_ref();
        let career = player.career.as_ref();
        let recent = player.recent.as_ref();
        conn.execute(
            "INSERT OR REPLACE INTO players
             (id, name, attack, defense, game_iq,
              pace, shooting, passing, dribbling, defending, physical,
              games, career_win_rate, career_goal_diff,
              recent_win_rate, recent_goal_diff, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                player.id,
                player.name,
                player.attack,
                player.defense,
                player.game_iq,
                attrs.map(|a| a.pace),
                attrs.map(|a| a.shooting),
                attrs.map(|a| a.passing),
                attrs.map(|a| a.dribbling),
                attrs.map(|a| a.defending),
                attrs.map(|a| a.physical),
                career.and_then(|c| c.games),
                career.and_then(|c| c.win_rate),
                career.and_then(|c| c.goal_diff),
                recent.and_then(|r| r.win_rate),
                recent.and_then(|r| r.goal_diff),
                chrono::Utc::now().to_rfc3339(),
            ],
        )
        .with_context(|| format!("failed to insert player {}", player.id))?;
        Ok(())
    }

    /// Load the full roster, ordered by identifier for determinism.
    pub fn load_roster(&self) -> Result<Vec<Player>> {
        let conn = self.conn.lock().expect("player store mutex poisoned");
        let mut stmt = conn
            .prepare(
                "SELECT id, name, attack, defense, game_iq,
                        pace, shooting, passing, dribbling, defending, physical,
                        games, career_win_rate, career_goal_diff,
                        recent_win_rate, recent_goal_diff
                 FROM players ORDER BY id",
            )
            .context("failed to prepare roster query")?;

        let players = stmt
            .query_map([], |row| {
                let pace: Option<f64> = row.get(5)?;
                let shooting: Option<f64> = row.get(6)?;
                let passing: Option<f64> = row.get(7)?;
                let dribbling: Option<f64> = row.get(8)?;
                let defending: Option<f64> = row.get(9)?;
                let physical: Option<f64> = row.get(10)?;
                // The bundle is only considered present when every column is.
                let attributes = match (pace, shooting, passing, dribbling, defending, physical) {
                    (Some(pa), Some(sh), Some(ps), Some(dr), Some(de), Some(ph)) => {
                        Some(StyleAttributes {
                            pace: pa,
                            shooting: sh,
                            passing: ps,
                            dribbling: dr,
                            defending: de,
                            physical: ph,
                        })
                    }
                    _ => None,
                };

                let games: Option<u32> = row.get(11)?;
                let career_win_rate: Option<f64> = row.get(12)?;
                let career_goal_diff: Option<f64> = row.get(13)?;
                let career = if games.is_some()
                    || career_win_rate.is_some()
                    || career_goal_diff.is_some()
                {
                    Some(CareerStats {
                        games,
                        win_rate: career_win_rate,
                        goal_diff: career_goal_diff,
                    })
                } else {
                    None
                };

                let recent_win_rate: Option<f64> = row.get(14)?;
                let recent_goal_diff: Option<f64> = row.get(15)?;
                let recent = if recent_win_rate.is_some() || recent_goal_diff.is_some() {
                    Some(RecentStats {
                        win_rate: recent_win_rate,
                        goal_diff: recent_goal_diff,
                    })
                } else {
                    None
                };

                Ok(Player {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    attack: row.get(2)?,
                    defense: row.get(3)?,
                    game_iq: row.get(4)?,
                    attributes,
                    career,
                    recent,
                })
            })
            .context("failed to query players")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map player rows")?;

        Ok(players)
    }

    /// Look up a single player row by identifier.
    pub fn find_player(&self, id: &str) -> Result<Option<Player>> {
        let roster = self.load_roster()?;
        Ok(roster.into_iter().find(|p| p.id == id))
    }
}
