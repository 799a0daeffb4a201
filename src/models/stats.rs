//! SportsDataIO records. Field names follow the provider's PascalCase, which
//! the CSV dump shares, so one struct reads both.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Player {
    #[serde(rename = "PlayerID", default)]
    pub player_id: u32,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub team: Option<String>,
    pub position: Option<String>,
    pub number: Option<u32>,
    pub height: Option<String>,
    pub status: Option<String>,
    pub injury_status: Option<String>,
}

impl Player {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some("Active")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Team {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub name: String,
    pub city: Option<String>,
    pub conference: Option<String>,
    pub division: Option<String>,
}

/// A scheduled or completed game from the stats provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScheduledGame {
    #[serde(default)]
    pub game_key: String,
    #[serde(default)]
    pub season: u32,
    #[serde(default)]
    pub week: u32,
    #[serde(default)]
    pub home_team: String,
    #[serde(default)]
    pub away_team: String,
    pub date: Option<String>,
    pub status: Option<String>,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PlayerSeasonStats {
    #[serde(rename = "PlayerID")]
    pub player_id: u32,
    pub name: String,
    pub team: String,
    pub position: String,
    pub passing_yards: f64,
    pub passing_touchdowns: f64,
    pub rushing_yards: f64,
    pub rushing_touchdowns: f64,
    pub receptions: f64,
    pub receiving_yards: f64,
    pub receiving_touchdowns: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Standing {
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub ties: u32,
    pub conference: Option<String>,
    pub division: Option<String>,
}

impl Standing {
    /// Ties count as half a win
    pub fn win_percentage(&self) -> f64 {
        let played = self.wins + self.losses + self.ties;
        if played == 0 {
            return 0.0;
        }
        (self.wins as f64 + 0.5 * self.ties as f64) / played as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_from_sportsdata_json() {
        let json = r#"{
            "PlayerID": 19801,
            "FirstName": "Christian",
            "LastName": "McCaffrey",
            "Team": "SF",
            "Position": "RB",
            "Number": 23,
            "Status": "Active",
            "InjuryStatus": null,
            "ExperienceString": "9th Season"
        }"#;
        let player: Player = serde_json::from_str(json).unwrap();
        assert_eq!(player.full_name(), "Christian McCaffrey");
        assert_eq!(player.number, Some(23));
        assert!(player.is_active());
        assert!(player.height.is_none());
    }

    #[test]
    fn test_season_stats_missing_fields_default() {
        let json = r#"{"PlayerID": 7, "Name": "Deebo Samuel", "ReceivingYards": 892.0}"#;
        let stats: PlayerSeasonStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.name, "Deebo Samuel");
        assert_eq!(stats.receiving_yards, 892.0);
        assert_eq!(stats.rushing_yards, 0.0);
    }

    #[test]
    fn test_win_percentage() {
        let standing = Standing {
            team: "SF".to_string(),
            name: "49ers".to_string(),
            wins: 12,
            losses: 4,
            ties: 1,
            conference: Some("NFC".to_string()),
            division: Some("West".to_string()),
        };
        assert!((standing.win_percentage() - 12.5 / 17.0).abs() < 1e-9);

        let empty = Standing {
            wins: 0,
            losses: 0,
            ties: 0,
            ..standing
        };
        assert_eq!(empty.win_percentage(), 0.0);
    }
}
