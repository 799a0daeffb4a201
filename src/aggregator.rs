//! Cached access to the odds and stats providers, and the analyses composed
//! from them.
//!
//! Every provider-backed read comes in two flavors: `try_*` returns the typed
//! [`ProviderUnavailable`] error, the plain variant logs it and degrades to an
//! empty collection. Composed operations ([`DataAggregator::comprehensive_analysis`],
//! [`DataAggregator::insights`], [`DataAggregator::profitable_props`]) always use
//! the degrading flavor and never fail.

use crate::api::odds_api::OddsApiClient;
use crate::api::sportsdata_api::SportsDataClient;
use crate::api::{OddsProvider, StatsProvider, GAME_LINE_MARKETS, ODDS_PROVIDER, STATS_PROVIDER};
use crate::config::Config;
use crate::error::ProviderUnavailable;
use crate::models::{Edge, Game, Player, PlayerSeasonStats, Quote, ScheduledGame, Standing, Team};
use crate::utils::best_odds::{find_best_quote, subjects};
use crate::utils::cache::{Clock, SystemClock, TtlCache};
use crate::utils::ev_calculator::evaluate_quote;
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Prop markets priced for every player analysis
pub const ANALYSIS_MARKETS: [&str; 3] = [
    "player_anytime_td",
    "player_rush_yds",
    "player_reception_yds",
];

/// Stand-in until a real model supplies per-player probabilities
pub const PLACEHOLDER_TRUE_PROBABILITY: f64 = 0.35;

/// Edges above this become recommendations
pub const MIN_RECOMMENDATION_EDGE: f64 = 0.05;

const TOP_PLAYERS: usize = 10;
const FEATURED_GAMES: usize = 5;

/// Week reported when the stats provider can't say
pub const DEFAULT_WEEK: u32 = 1;

/// A cached provider read
pub type Fetched<V> = Result<Arc<V>, ProviderUnavailable>;

/// How far a provider has gotten toward being usable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderState {
    /// No credentials, so no provider was constructed
    Unconfigured,
    /// Provider present, no call has succeeded yet
    Configured,
    /// At least one call succeeded
    Verified,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataStatus {
    pub odds_api: ProviderState,
    pub sportsdata_api: ProviderState,
}

/// A bet worth placing
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub bet: String,
    pub odds: i32,
    pub edge: f64,
    pub confidence: f64, // edge scaled to 0-1
    pub bet_size: f64, // bankroll fraction, half-Kelly
}

impl Recommendation {
    pub fn format(&self) -> String {
        format!(
            "{} ({:+}) | Edge: {:+.2}% | Confidence: {:.0}% | Stake: {:.2}% of bankroll",
            self.bet,
            self.odds,
            self.edge * 100.0,
            self.confidence * 100.0,
            self.bet_size * 100.0
        )
    }
}

/// Everything known about one player's prop markets, keyed by market
#[derive(Debug, Clone, Serialize)]
pub struct PlayerAnalysis {
    pub player: String,
    pub timestamp: DateTime<Utc>,
    pub props: BTreeMap<String, Quote>,
    pub edges: BTreeMap<String, Edge>,
    pub recommendations: Vec<Recommendation>,
    pub season_stats: Option<PlayerSeasonStats>,
}

/// Best available price for a subject and the edge it carries
#[derive(Debug, Clone, Serialize)]
pub struct PropEdge {
    pub quote: Quote,
    pub edge: Edge,
}

impl PropEdge {
    pub fn format(&self) -> String {
        format!(
            "{} | Edge: {:+.2}% | Kelly: {:.2}%",
            self.quote.format(),
            self.edge.edge * 100.0,
            self.edge.kelly_fraction * 100.0
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamRecord {
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub win_percentage: f64,
    pub conference: Option<String>,
    pub division: Option<String>,
}

impl From<&Standing> for TeamRecord {
    fn from(standing: &Standing) -> Self {
        Self {
            name: standing.name.clone(),
            wins: standing.wins,
            losses: standing.losses,
            ties: standing.ties,
            win_percentage: standing.win_percentage(),
            conference: standing.conference.clone(),
            division: standing.division.clone(),
        }
    }
}

/// Dashboard summary built from whichever providers answered
#[derive(Debug, Clone, Default, Serialize)]
pub struct Insights {
    pub current_week: u32,
    pub games_today: usize,
    pub top_players: Vec<Player>,
    pub betting_edges: Vec<Game>,
    pub team_analysis: BTreeMap<String, TeamRecord>,
    /// Names of the sources that contributed data
    pub data_sources: Vec<&'static str>,
}

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub season: String,
    pub cache_duration: Duration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            season: "2025".to_string(),
            cache_duration: Duration::seconds(300),
        }
    }
}

impl From<&Config> for AggregatorConfig {
    fn from(config: &Config) -> Self {
        Self {
            season: config.season.clone(),
            cache_duration: Duration::seconds(config.cache_duration.as_secs() as i64),
        }
    }
}

fn mark_verified<T>(flag: &AtomicBool, result: &Fetched<T>) {
    if result.is_ok() {
        flag.store(true, Ordering::Relaxed);
    }
}

fn state_of<P: ?Sized>(provider: &Option<Arc<P>>, verified: &AtomicBool) -> ProviderState {
    match provider {
        None => ProviderState::Unconfigured,
        Some(_) if verified.load(Ordering::Relaxed) => ProviderState::Verified,
        Some(_) => ProviderState::Configured,
    }
}

fn log_failure(what: &str, err: &ProviderUnavailable) {
    if err.is_unconfigured() {
        debug!("No {}: {}", what, err);
    } else {
        warn!("Falling back to no {}: {}", what, err);
    }
}

fn empty_on_failure<V>(what: &str, result: Fetched<Vec<V>>) -> Arc<Vec<V>> {
    result.unwrap_or_else(|e| {
        log_failure(what, &e);
        Arc::new(Vec::new())
    })
}

/// "<subject> <market> <side>", plus the line when the quote has one
fn describe_bet(subject: &str, quote: &Quote) -> String {
    match quote.point {
        Some(point) => format!("{} {} {} {}", subject, quote.market, quote.side, point),
        None => format!("{} {} {}", subject, quote.market, quote.side),
    }
}

pub struct DataAggregator {
    odds: Option<Arc<dyn OddsProvider>>,
    stats: Option<Arc<dyn StatsProvider>>,
    clock: Arc<dyn Clock>,
    season: String,
    odds_verified: AtomicBool,
    stats_verified: AtomicBool,
    odds_cache: TtlCache<Vec<Game>>,
    scores_cache: TtlCache<Vec<ScheduledGame>>,
    players_cache: TtlCache<Vec<Player>>,
    teams_cache: TtlCache<Vec<Team>>,
    season_cache: TtlCache<Vec<PlayerSeasonStats>>,
    standings_cache: TtlCache<Vec<Standing>>,
    week_cache: TtlCache<u32>,
}

impl DataAggregator {
    pub fn new(
        odds: Option<Arc<dyn OddsProvider>>,
        stats: Option<Arc<dyn StatsProvider>>,
        config: AggregatorConfig,
    ) -> Self {
        let ttl = config.cache_duration;
        Self {
            odds,
            stats,
            clock: Arc::new(SystemClock),
            season: config.season,
            odds_verified: AtomicBool::new(false),
            stats_verified: AtomicBool::new(false),
            odds_cache: TtlCache::new(ttl),
            scores_cache: TtlCache::new(ttl),
            players_cache: TtlCache::new(ttl),
            teams_cache: TtlCache::new(ttl),
            season_cache: TtlCache::new(ttl),
            standings_cache: TtlCache::new(ttl),
            week_cache: TtlCache::new(ttl),
        }
    }

    /// Real HTTP clients for whichever API keys are set
    pub fn from_config(config: &Config) -> Result<Self> {
        let odds: Option<Arc<dyn OddsProvider>> = match &config.odds_api_key {
            Some(key) => {
                let client = OddsApiClient::new(key.clone(), config.request_timeout)?;
                Some(Arc::new(client))
            }
            None => {
                warn!("ODDS_API_KEY not set, odds will be unavailable");
                None
            }
        };
        let stats: Option<Arc<dyn StatsProvider>> = match &config.sportsdata_api_key {
            Some(key) => {
                let client = SportsDataClient::new(key.clone(), config.request_timeout)?;
                Some(Arc::new(client))
            }
            None => {
                warn!("SPORTSDATA_API_KEY not set, stats will be unavailable");
                None
            }
        };

        Ok(Self::new(odds, stats, AggregatorConfig::from(config)))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn status(&self) -> DataStatus {
        DataStatus {
            odds_api: state_of(&self.odds, &self.odds_verified),
            sportsdata_api: state_of(&self.stats, &self.stats_verified),
        }
    }

    /// Serve `cache_key` from `cache` while fresh, otherwise call the provider
    /// and store what it returns. Failures are not cached.
    async fn fetch<V, F, Fut>(
        &self,
        cache: &TtlCache<V>,
        cache_key: &str,
        provider_call: F,
    ) -> Fetched<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, ProviderUnavailable>>,
    {
        if let Some(payload) = cache.get(cache_key, self.clock.now()).await {
            debug!("Cache hit for {}", cache_key);
            return Ok(payload);
        }

        let payload = Arc::new(provider_call().await?);
        let now = self.clock.now();
        cache.insert(cache_key, payload.clone(), now).await;
        Ok(payload)
    }

    fn odds_provider(&self) -> Result<&Arc<dyn OddsProvider>, ProviderUnavailable> {
        self.odds.as_ref().ok_or(ProviderUnavailable::Unconfigured {
            provider: ODDS_PROVIDER,
        })
    }

    fn stats_provider(&self) -> Result<&Arc<dyn StatsProvider>, ProviderUnavailable> {
        self.stats.as_ref().ok_or(ProviderUnavailable::Unconfigured {
            provider: STATS_PROVIDER,
        })
    }

    /// Game lines (moneyline, spreads, totals) for upcoming games
    pub async fn try_get_games(&self) -> Fetched<Vec<Game>> {
        let odds = self.odds_provider()?;
        let call = || odds.fetch_odds(&GAME_LINE_MARKETS);
        let result = self.fetch(&self.odds_cache, "games", call).await;
        mark_verified(&self.odds_verified, &result);
        result
    }

    pub async fn get_games(&self) -> Arc<Vec<Game>> {
        empty_on_failure("games", self.try_get_games().await)
    }

    /// Games carrying quotes for a single prop market; each market is cached
    /// on its own
    pub async fn try_get_player_props(&self, market: &str) -> Fetched<Vec<Game>> {
        let odds = self.odds_provider()?;
        let cache_key = format!("props_{}", market);
        let markets = [market];
        let call = || odds.fetch_odds(&markets);
        let result = self.fetch(&self.odds_cache, &cache_key, call).await;
        mark_verified(&self.odds_verified, &result);
        result
    }

    pub async fn get_player_props(&self, market: &str) -> Arc<Vec<Game>> {
        empty_on_failure(market, self.try_get_player_props(market).await)
    }

    /// The stats provider's schedule and scores for the configured season
    pub async fn try_get_stats_games(&self) -> Fetched<Vec<ScheduledGame>> {
        let stats = self.stats_provider()?;
        let cache_key = format!("stats_games_{}", self.season);
        let call = || stats.fetch_scores(&self.season);
        let result = self.fetch(&self.scores_cache, &cache_key, call).await;
        mark_verified(&self.stats_verified, &result);
        result
    }

    pub async fn get_stats_games(&self) -> Arc<Vec<ScheduledGame>> {
        empty_on_failure("stats games", self.try_get_stats_games().await)
    }

    pub async fn try_get_players(&self) -> Fetched<Vec<Player>> {
        let stats = self.stats_provider()?;
        let call = || stats.fetch_players();
        let result = self.fetch(&self.players_cache, "players", call).await;
        mark_verified(&self.stats_verified, &result);
        result
    }

    pub async fn get_players(&self) -> Arc<Vec<Player>> {
        empty_on_failure("players", self.try_get_players().await)
    }

    pub async fn try_get_teams(&self) -> Fetched<Vec<Team>> {
        let stats = self.stats_provider()?;
        let call = || stats.fetch_teams();
        let result = self.fetch(&self.teams_cache, "teams", call).await;
        mark_verified(&self.stats_verified, &result);
        result
    }

    pub async fn get_teams(&self) -> Arc<Vec<Team>> {
        empty_on_failure("teams", self.try_get_teams().await)
    }

    pub async fn try_get_player_season_stats(&self) -> Fetched<Vec<PlayerSeasonStats>> {
        let stats = self.stats_provider()?;
        let cache_key = format!("player_stats_{}", self.season);
        let call = || stats.fetch_player_season_stats(&self.season);
        let result = self.fetch(&self.season_cache, &cache_key, call).await;
        mark_verified(&self.stats_verified, &result);
        result
    }

    pub async fn get_player_season_stats(&self) -> Arc<Vec<PlayerSeasonStats>> {
        empty_on_failure("player stats", self.try_get_player_season_stats().await)
    }

    pub async fn try_get_standings(&self) -> Fetched<Vec<Standing>> {
        let stats = self.stats_provider()?;
        let cache_key = format!("standings_{}", self.season);
        let call = || stats.fetch_standings(&self.season);
        let result = self.fetch(&self.standings_cache, &cache_key, call).await;
        mark_verified(&self.stats_verified, &result);
        result
    }

    pub async fn get_standings(&self) -> Arc<Vec<Standing>> {
        empty_on_failure("standings", self.try_get_standings().await)
    }

    pub async fn try_get_current_week(&self) -> Fetched<u32> {
        let stats = self.stats_provider()?;
        let call = || stats.fetch_current_week();
        let result = self.fetch(&self.week_cache, "current_week", call).await;
        mark_verified(&self.stats_verified, &result);
        result
    }

    /// Current NFL week, [`DEFAULT_WEEK`] when the stats provider can't say
    pub async fn current_week(&self) -> u32 {
        match self.try_get_current_week().await {
            Ok(week) => *week,
            Err(e) => {
                log_failure("current week", &e);
                DEFAULT_WEEK
            }
        }
    }

    /// Best price, edge and recommendation for a player across
    /// [`ANALYSIS_MARKETS`]
    ///
    /// `true_probability` defaults to [`PLACEHOLDER_TRUE_PROBABILITY`]. Markets
    /// with no quote for the player are left out of the record.
    pub async fn comprehensive_analysis(
        &self,
        subject_name: &str,
        true_probability: Option<f64>,
    ) -> PlayerAnalysis {
        let true_prob = true_probability.unwrap_or(PLACEHOLDER_TRUE_PROBABILITY);
        let mut analysis = PlayerAnalysis {
            player: subject_name.to_string(),
            timestamp: self.clock.now(),
            props: BTreeMap::new(),
            edges: BTreeMap::new(),
            recommendations: Vec::new(),
            season_stats: None,
        };

        for market in ANALYSIS_MARKETS {
            let props = self.get_player_props(market).await;
            let Some(best) = find_best_quote(&props, subject_name) else {
                continue;
            };

            match evaluate_quote(subject_name, &best, true_prob) {
                Ok(edge) => {
                    if edge.edge > MIN_RECOMMENDATION_EDGE {
                        analysis.recommendations.push(Recommendation {
                            bet: describe_bet(subject_name, &best),
                            odds: best.american_odds,
                            edge: edge.edge,
                            confidence: (edge.edge * 10.0).min(1.0),
                            bet_size: edge.kelly_fraction,
                        });
                    }
                    analysis.edges.insert(market.to_string(), edge);
                }
                Err(e) => warn!("Cannot price {} {}: {}", subject_name, market, e),
            }

            analysis.props.insert(market.to_string(), best);
        }

        analysis.season_stats = self
            .get_player_season_stats()
            .await
            .iter()
            .find(|s| s.name.to_lowercase() == subject_name.to_lowercase())
            .cloned();

        info!(
            "Analyzed {}: {} props, {} recommendations",
            subject_name,
            analysis.props.len(),
            analysis.recommendations.len()
        );
        analysis
    }

    /// Best-priced prop for every player in [`ANALYSIS_MARKETS`] whose edge
    /// at `true_probability` is at least `min_edge`, largest edge first
    pub async fn profitable_props(&self, min_edge: f64, true_probability: f64) -> Vec<PropEdge> {
        let mut profitable = Vec::new();

        for market in ANALYSIS_MARKETS {
            let props = self.get_player_props(market).await;

            for subject in subjects(&props) {
                let Some(quote) = find_best_quote(&props, &subject) else {
                    continue;
                };
                match evaluate_quote(&subject, &quote, true_probability) {
                    Ok(edge) if edge.edge >= min_edge => profitable.push(PropEdge { quote, edge }),
                    Ok(_) => {}
                    Err(e) => warn!("Cannot price {} {}: {}", subject, market, e),
                }
            }
        }

        // Sort by edge (descending)
        profitable.sort_by(|a, b| {
            b.edge
                .edge
                .partial_cmp(&a.edge.edge)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        profitable
    }

    /// Merge whatever both providers can deliver right now
    pub async fn insights(&self) -> Insights {
        let mut insights = Insights {
            current_week: self.current_week().await,
            ..Default::default()
        };

        let games = self.get_stats_games().await;
        if !games.is_empty() {
            insights.games_today = games.len();
            insights.data_sources.push("SportsDataIO Games");
        }

        let players = self.get_players().await;
        if !players.is_empty() {
            insights.top_players = players.iter().take(TOP_PLAYERS).cloned().collect();
            insights.data_sources.push("SportsDataIO Players");
        }

        let odds = self.get_games().await;
        if !odds.is_empty() {
            insights.betting_edges = odds.iter().take(FEATURED_GAMES).cloned().collect();
            insights.data_sources.push("Live Odds API");
        }

        let standings = self.get_standings().await;
        if !standings.is_empty() {
            insights.team_analysis = standings
                .iter()
                .map(|s| (s.team.clone(), TeamRecord::from(s)))
                .collect();
            insights.data_sources.push("SportsDataIO Standings");
        }

        insights
    }
}
