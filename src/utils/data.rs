use crate::models::{Player, Team};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Players and teams from a downloaded SportsDataIO CSV dump
#[derive(Debug, Clone, Default)]
pub struct StatsLoader {
    players: Vec<Player>,
    teams: Vec<Team>,
}

/// Read every row that parses; skip (and log) the ones that don't
fn read_rows<T: DeserializeOwned, R: Read>(reader: R, label: &str) -> Vec<T> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();

    for (line, record) in csv_reader.deserialize::<T>().enumerate() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) => warn!("Skipping {} row {}: {}", label, line + 2, e),
        }
    }

    rows
}

fn load_file<T: DeserializeOwned>(path: &Path, label: &str) -> Result<Vec<T>> {
    if !path.exists() {
        warn!("{} file not found: {}", label, path.display());
        return Ok(Vec::new());
    }

    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let rows = read_rows(file, label);
    info!("Loaded {} {} from {}", rows.len(), label, path.display());
    Ok(rows)
}

impl StatsLoader {
    /// Load `Player.<season>.csv` and `Team.<season>.csv` from `dir`
    /// Missing files leave the matching collection empty
    pub fn load(dir: &Path, season: &str) -> Result<Self> {
        let players = load_file(&dir.join(format!("Player.{}.csv", season)), "players")?;
        let teams = load_file(&dir.join(format!("Team.{}.csv", season)), "teams")?;
        Ok(Self { players, teams })
    }

    pub fn from_readers<P: Read, T: Read>(players: P, teams: T) -> Self {
        Self {
            players: read_rows(players, "players"),
            teams: read_rows(teams, "teams"),
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn active_players(&self, limit: usize) -> Vec<&Player> {
        self.players
            .iter()
            .filter(|p| p.is_active())
            .take(limit)
            .collect()
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    /// Case-insensitive substring search on "First Last"
    pub fn search_players(&self, query: &str, limit: usize) -> Vec<&Player> {
        let query = query.to_lowercase();
        self.players
            .iter()
            .filter(|p| p.full_name().to_lowercase().contains(&query))
            .take(limit)
            .collect()
    }
}
