pub mod odds_api;
pub mod sportsdata_api;

use crate::error::ProviderUnavailable;
use crate::models::{Game, Player, PlayerSeasonStats, ScheduledGame, Standing, Team};
use async_trait::async_trait;

pub const ODDS_PROVIDER: &str = "The Odds API";
pub const STATS_PROVIDER: &str = "SportsDataIO";

/// Sportsbooks quoted on every odds request
pub const SPORTSBOOKS: [&str; 5] = ["draftkings", "fanduel", "betmgm", "caesars", "pointsbet"];

pub const GAME_LINE_MARKETS: [&str; 3] = ["h2h", "spreads", "totals"];

pub const PLAYER_PROP_MARKETS: [&str; 7] = [
    "player_pass_tds",
    "player_pass_yds",
    "player_rush_yds",
    "player_receptions",
    "player_reception_yds",
    "player_anytime_td",
    "player_first_td",
];

/// Whether `key` is one of the prop markets the odds provider is asked for
pub fn is_player_prop_market(key: &str) -> bool {
    PLAYER_PROP_MARKETS.contains(&key)
}

/// Source of sportsbook quotes
#[async_trait]
pub trait OddsProvider: Send + Sync {
    /// Upcoming NFL games with quotes for the given market keys
    async fn fetch_odds(&self, markets: &[&str]) -> Result<Vec<Game>, ProviderUnavailable>;
}

/// Source of league schedule, roster and stat data
#[async_trait]
pub trait StatsProvider: Send + Sync {
    async fn fetch_scores(&self, season: &str) -> Result<Vec<ScheduledGame>, ProviderUnavailable>;
    async fn fetch_players(&self) -> Result<Vec<Player>, ProviderUnavailable>;
    async fn fetch_teams(&self) -> Result<Vec<Team>, ProviderUnavailable>;
    async fn fetch_player_season_stats(
        &self,
        season: &str,
    ) -> Result<Vec<PlayerSeasonStats>, ProviderUnavailable>;
    async fn fetch_standings(&self, season: &str) -> Result<Vec<Standing>, ProviderUnavailable>;
    async fn fetch_current_week(&self) -> Result<u32, ProviderUnavailable>;
}
