// Team balancer entry point.
//
// Run sequence:
// 1. Initialize tracing
// 2. Load config (balancer.toml, or the path given as the first argument)
// 3. Load the roster (CSV file or SQLite player store)
// 4. Balance the teams (seeded when the config fixes a seed)
// 5. Print the team sheets and executive summary
// 6. Write the audit report to the configured paths

use std::path::Path;

use anyhow::Context;
use tracing::info;

use team_balancer::config;
use team_balancer::db::PlayerStore;
use team_balancer::engine::{self, BalanceResult};
use team_balancer::rating::RatedPlayer;
use team_balancer::roster;

fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "balancer.toml".to_string());
    let config = config::load_config(Path::new(&config_path))
        .with_context(|| format!("failed to load configuration from {config_path}"))?;

    let players = if let Some(csv_path) = &config.roster.csv {
        roster::load_roster_csv(Path::new(csv_path))
            .with_context(|| format!("failed to load roster from {csv_path}"))?
    } else if let Some(db_path) = &config.roster.sqlite {
        let store = PlayerStore::open(db_path)
            .with_context(|| format!("failed to open player store at {db_path}"))?;
        store.load_roster().context("failed to load roster rows")?
    } else {
        unreachable!("config validation guarantees a roster source");
    };
    info!("Loaded {} players", players.len());

    let result = match config.run.seed {
        Some(seed) => {
            info!(seed, "balancing with fixed seed");
            engine::generate_teams_seeded(&players, seed)?
        }
        None => engine::generate_teams(&players, &mut rand::thread_rng())?,
    };

    print_teams(&result);

    if let Some(path) = &config.run.audit_text {
        std::fs::write(path, result.audit.render())
            .with_context(|| format!("failed to write audit text to {path}"))?;
        info!("Audit report written to {path}");
    }
    if let Some(path) = &config.run.audit_json {
        let json = serde_json::to_string_pretty(&result.audit)
            .context("failed to serialize audit report")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write audit JSON to {path}"))?;
        info!("Audit JSON written to {path}");
    }

    Ok(())
}

fn print_teams(result: &BalanceResult) {
    let sheet = |team: &[RatedPlayer]| {
        team.iter()
            .map(|p| format!("  {:<20} rating {:>6.3}  tier {}", p.name, p.rating, p.tier))
            .collect::<Vec<_>>()
            .join("\n")
    };

    println!("BLUE ({} players)", result.blue_team.len());
    println!("{}", sheet(&result.blue_team));
    println!("\nORANGE ({} players)", result.orange_team.len());
    println!("{}", sheet(&result.orange_team));
    println!(
        "\nBalance: {:.3} -> {:.3} ({} swaps, {})",
        result.initial_score,
        result.optimized_score,
        result.audit.summary.swap_count,
        result.audit.summary.quality.label()
    );
    println!(
        "Confidence: {} - {}",
        result.confidence.level.label(),
        result.confidence.message
    );
}

/// Initialize tracing to stderr, leaving stdout to the team sheets.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("team_balancer=info,balancer=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
