// Configuration loading and parsing (balancer.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// balancer.toml structs
// ---------------------------------------------------------------------------

/// Where the roster comes from. Exactly one source must be set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterSection {
    /// Path to a roster CSV with header-named columns.
    pub csv: Option<String>,
    /// Path to a SQLite player store.
    pub sqlite: Option<String>,
}

/// Run options.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunSection {
    /// Fixed seed for the draft coin flip; omit for OS entropy.
    pub seed: Option<u64>,
    /// Where to write the rendered audit report.
    pub audit_text: Option<String>,
    /// Where to write the audit report as JSON.
    pub audit_json: Option<String>,
}

/// Raw deserialization target for the whole balancer.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    roster: RosterSection,
    #[serde(default)]
    run: RunSection,
}

/// The assembled, validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub roster: RosterSection,
    pub run: RunSection,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load and validate `balancer.toml` from `path`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let file: ConfigFile = toml::from_str(&raw).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    validate(&file)?;

    Ok(Config {
        roster: file.roster,
        run: file.run,
    })
}

fn validate(file: &ConfigFile) -> Result<(), ConfigError> {
    match (&file.roster.csv, &file.roster.sqlite) {
        (None, None) => Err(ConfigError::ValidationError {
            field: "roster".to_string(),
            message: "set either `csv` or `sqlite`".to_string(),
        }),
        (Some(_), Some(_)) => Err(ConfigError::ValidationError {
            field: "roster".to_string(),
            message: "`csv` and `sqlite` are mutually exclusive".to_string(),
        }),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<Config, ConfigError> {
        let file: ConfigFile = toml::from_str(raw).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("inline"),
            source: e,
        })?;
        validate(&file)?;
        Ok(Config {
            roster: file.roster,
            run: file.run,
        })
    }

    #[test]
    fn minimal_csv_config() {
        let config = parse(
            r#"
            [roster]
            csv = "players.csv"
            "#,
        )
        .unwrap();
        assert_eq!(config.roster.csv.as_deref(), Some("players.csv"));
        assert!(config.roster.sqlite.is_none());
        assert!(config.run.seed.is_none());
    }

    #[test]
    fn full_config() {
        let config = parse(
            r#"
            [roster]
            sqlite = "players.db"

            [run]
            seed = 42
            audit_text = "audit.txt"
            audit_json = "audit.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.roster.sqlite.as_deref(), Some("players.db"));
        assert_eq!(config.run.seed, Some(42));
        assert_eq!(config.run.audit_text.as_deref(), Some("audit.txt"));
    }

    #[test]
    fn missing_source_rejected() {
        let err = parse("[roster]\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn both_sources_rejected() {
        let err = parse(
            r#"
            [roster]
            csv = "players.csv"
            sqlite = "players.db"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn missing_file_reported() {
        let err = load_config(Path::new("definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }
}
