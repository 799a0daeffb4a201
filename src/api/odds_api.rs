use crate::api::{OddsProvider, ODDS_PROVIDER, SPORTSBOOKS};
use crate::error::ProviderUnavailable;
use crate::models::{Bookmaker, Game, Market, MarketQuotes, Quote};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

const ODDS_API_BASE_URL: &str = "https://api.the-odds-api.com/v4";
const SPORT_KEY: &str = "americanfootball_nfl";

/// Response from The Odds API for a single game
#[derive(Debug, Deserialize)]
struct OddsApiGame {
    id: String,
    sport_title: String,
    commence_time: DateTime<Utc>,
    home_team: String,
    away_team: String,
    #[serde(default)]
    bookmakers: Vec<OddsApiBookmaker>,
}

/// Bookmaker data from The Odds API
#[derive(Debug, Deserialize)]
struct OddsApiBookmaker {
    key: String,
    title: String,
    last_update: DateTime<Utc>,
    #[serde(default)]
    markets: Vec<OddsApiMarket>,
}

/// Market data (e.g., h2h, spreads, player_rush_yds) from The Odds API
#[derive(Debug, Deserialize)]
struct OddsApiMarket {
    key: String,
    #[serde(default)]
    outcomes: Vec<OddsApiOutcome>,
}

/// A priced outcome. Player props put the player in `description`
#[derive(Debug, Deserialize)]
struct OddsApiOutcome {
    name: String,
    description: Option<String>,
    price: f64,
    point: Option<f64>,
}

/// Request usage reported in the response headers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiQuota {
    pub requests_used: u64,
    pub requests_remaining: u64,
}

/// Parse a quota header that may be an integer or float (e.g. "14527.0").
fn parse_quota_header(headers: &reqwest::header::HeaderMap, name: &str) -> u64 {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<f64>().ok())
        .map(|v| v as u64)
        .unwrap_or(0)
}

fn into_game(api_game: OddsApiGame) -> Game {
    let bookmakers = api_game
        .bookmakers
        .into_iter()
        .map(|bookmaker| {
            let markets = bookmaker
                .markets
                .into_iter()
                .map(|market| {
                    let market_kind = Market::from_key(&market.key);
                    let quotes = market
                        .outcomes
                        .into_iter()
                        .map(|outcome| Quote {
                            sportsbook: bookmaker.title.clone(),
                            market: market_kind.clone(),
                            outcome_label: outcome
                                .description
                                .unwrap_or_else(|| outcome.name.clone()),
                            side: outcome.name,
                            american_odds: outcome.price.round() as i32,
                            point: outcome.point,
                        })
                        .collect();
                    MarketQuotes {
                        market: market_kind,
                        quotes,
                    }
                })
                .collect();

            Bookmaker {
                key: bookmaker.key,
                title: bookmaker.title,
                last_update: bookmaker.last_update,
                markets,
            }
        })
        .collect();

    Game {
        id: api_game.id,
        sport_title: api_game.sport_title,
        home_team: api_game.home_team,
        away_team: api_game.away_team,
        commence_time: api_game.commence_time,
        bookmakers,
    }
}

pub struct OddsApiClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OddsApiClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Odds API HTTP client")?;

        Ok(Self {
            api_key,
            base_url: ODDS_API_BASE_URL.to_string(),
            client,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Check how many API requests you have remaining
    pub async fn check_usage(&self) -> Result<ApiQuota> {
        let url = format!("{}/sports", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await
            .context("Failed to reach The Odds API for usage check")?;

        if !response.status().is_success() {
            anyhow::bail!("Odds API returned error: {}", response.status());
        }

        Ok(ApiQuota {
            requests_used: parse_quota_header(response.headers(), "x-requests-used"),
            requests_remaining: parse_quota_header(response.headers(), "x-requests-remaining"),
        })
    }
}

#[async_trait]
impl OddsProvider for OddsApiClient {
    async fn fetch_odds(&self, markets: &[&str]) -> Result<Vec<Game>, ProviderUnavailable> {
        let url = format!("{}/sports/{}/odds", self.base_url, SPORT_KEY);
        let markets = markets.join(",");
        let bookmakers = SPORTSBOOKS.join(",");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("regions", "us"),
                ("markets", markets.as_str()),
                ("oddsFormat", "american"),
                ("bookmakers", bookmakers.as_str()),
            ])
            .send()
            .await
            .map_err(|source| ProviderUnavailable::Network {
                provider: ODDS_PROVIDER,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderUnavailable::Status {
                provider: ODDS_PROVIDER,
                status,
            });
        }

        let api_games: Vec<OddsApiGame> = response
            .json()
            .await
            .map_err(|source| ProviderUnavailable::Decode {
                provider: ODDS_PROVIDER,
                source,
            })?;

        info!(
            "{}: got {} games for {}",
            ODDS_PROVIDER, api_games.len(), markets
        );
        Ok(api_games.into_iter().map(into_game).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::stub_server;
    use crate::api::GAME_LINE_MARKETS;
    use axum::http::StatusCode;

    const PROPS_RESPONSE: &str = r#"[
        {
            "id": "e912304de2b2ce35b473ce2ecd3d1502",
            "sport_key": "americanfootball_nfl",
            "sport_title": "NFL",
            "commence_time": "2025-09-07T20:25:00Z",
            "home_team": "San Francisco 49ers",
            "away_team": "Seattle Seahawks",
            "bookmakers": [
                {
                    "key": "draftkings",
                    "title": "DraftKings",
                    "last_update": "2025-09-07T17:01:12Z",
                    "markets": [
                        {
                            "key": "player_rush_yds",
                            "last_update": "2025-09-07T17:01:12Z",
                            "outcomes": [
                                {"name": "Over", "description": "Christian McCaffrey",
                                 "price": -115, "point": 85.5},
                                {"name": "Under", "description": "Christian McCaffrey",
                                 "price": -105.0, "point": 85.5}
                            ]
                        }
                    ]
                },
                {
                    "key": "fanduel",
                    "title": "FanDuel",
                    "last_update": "2025-09-07T17:00:40Z",
                    "markets": [
                        {
                            "key": "h2h",
                            "outcomes": [
                                {"name": "San Francisco 49ers", "price": -180},
                                {"name": "Seattle Seahawks", "price": 150}
                            ]
                        }
                    ]
                }
            ]
        }
    ]"#;

    #[test]
    fn test_parses_props_and_game_lines() {
        let api_games: Vec<OddsApiGame> = serde_json::from_str(PROPS_RESPONSE).unwrap();
        let games: Vec<Game> = api_games.into_iter().map(into_game).collect();
        assert_eq!(games.len(), 1);

        let game = &games[0];
        assert_eq!(game.home_team, "San Francisco 49ers");
        assert_eq!(game.bookmakers.len(), 2);

        let quotes: Vec<&Quote> = game.quotes().collect();
        assert_eq!(quotes.len(), 4);

        let over = quotes[0];
        assert_eq!(over.outcome_label, "Christian McCaffrey");
        assert_eq!(over.side, "Over");
        assert_eq!(over.american_odds, -115);
        assert_eq!(over.point, Some(85.5));
        assert_eq!(over.sportsbook, "DraftKings");
        assert_eq!(over.market, Market::Prop("player_rush_yds".to_string()));

        // Game lines have no description, the team is the label
        let dog = quotes[3];
        assert_eq!(dog.outcome_label, "Seattle Seahawks");
        assert_eq!(dog.market, Market::Moneyline);
        assert_eq!(dog.american_odds, 150);
        assert_eq!(dog.point, None);
    }

    #[test]
    fn test_missing_bookmakers_is_empty() {
        let json = r#"[{"id": "x", "sport_title": "NFL", "commence_time": "2025-09-08T00:20:00Z",
                        "home_team": "Chicago Bears", "away_team": "Minnesota Vikings"}]"#;
        let api_games: Vec<OddsApiGame> = serde_json::from_str(json).unwrap();
        let game = into_game(api_games.into_iter().next().unwrap());
        assert!(game.bookmakers.is_empty());
    }

    async fn client_for(status: StatusCode, body: &'static str) -> OddsApiClient {
        let base_url = stub_server(status, body).await;
        OddsApiClient::new("key".to_string(), Duration::from_secs(2))
            .unwrap()
            .with_base_url(&base_url)
    }

    #[tokio::test]
    async fn test_fetch_odds_decodes_response() {
        let client = client_for(StatusCode::OK, PROPS_RESPONSE).await;
        let games = client.fetch_odds(&["player_rush_yds"]).await.unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].quotes().count(), 4);
    }

    #[tokio::test]
    async fn test_quota_exhausted_is_status_error() {
        let body = r#"{"message": "Usage quota has been reached"}"#;
        let client = client_for(StatusCode::UNAUTHORIZED, body).await;
        let err = client.fetch_odds(&["h2h"]).await.unwrap_err();
        match err {
            ProviderUnavailable::Status { provider, status } => {
                assert_eq!(provider, ODDS_PROVIDER);
                assert_eq!(status, StatusCode::UNAUTHORIZED);
            }
            other => panic!("expected a status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unexpected_body_is_decode_error() {
        let client = client_for(StatusCode::OK, r#"{"games": []}"#).await;
        let err = client.fetch_odds(&["h2h"]).await.unwrap_err();
        assert!(matches!(err, ProviderUnavailable::Decode { .. }));
        assert!(!err.is_unconfigured());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let client = OddsApiClient::new("key".to_string(), Duration::from_secs(2))
            .unwrap()
            .with_base_url("http://127.0.0.1:9/");
        let err = client.fetch_odds(&["h2h"]).await.unwrap_err();
        assert!(matches!(err, ProviderUnavailable::Network { .. }));
    }

    #[tokio::test]
    #[ignore]
    async fn test_fetch_games() {
        dotenv::dotenv().ok();
        let api_key = std::env::var("ODDS_API_KEY").expect("ODDS_API_KEY not set");
        let client = OddsApiClient::new(api_key, Duration::from_secs(15)).unwrap();

        let games = client.fetch_odds(&GAME_LINE_MARKETS).await.unwrap();
        assert!(!games.is_empty());
    }
}
