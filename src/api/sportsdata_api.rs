use crate::api::{StatsProvider, STATS_PROVIDER};
use crate::error::ProviderUnavailable;
use crate::models::{Player, PlayerSeasonStats, ScheduledGame, Standing, Team};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::info;

const BASE_URL: &str = "https://api.sportsdata.io/v3/nfl";
const SUBSCRIPTION_HEADER: &str = "Ocp-Apim-Subscription-Key";

pub struct SportsDataClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl SportsDataClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build SportsDataIO HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderUnavailable> {
        let url = format!("{}/{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .header(SUBSCRIPTION_HEADER, self.api_key.as_str())
            .send()
            .await
            .map_err(|source| ProviderUnavailable::Network {
                provider: STATS_PROVIDER,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderUnavailable::Status {
                provider: STATS_PROVIDER,
                status,
            });
        }

        response
            .json()
            .await
            .map_err(|source| ProviderUnavailable::Decode {
                provider: STATS_PROVIDER,
                source,
            })
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Vec<T>, ProviderUnavailable> {
        let results: Vec<T> = self.get_json(path).await?;
        info!(
            "{}: got {} records from {}",
            STATS_PROVIDER, results.len(), path
        );
        Ok(results)
    }
}

#[async_trait]
impl StatsProvider for SportsDataClient {
    async fn fetch_scores(&self, season: &str) -> Result<Vec<ScheduledGame>, ProviderUnavailable> {
        let path = format!("scores/json/Scores/{}", season);
        self.get_list(&path).await
    }

    async fn fetch_players(&self) -> Result<Vec<Player>, ProviderUnavailable> {
        self.get_list("scores/json/Players").await
    }

    async fn fetch_teams(&self) -> Result<Vec<Team>, ProviderUnavailable> {
        self.get_list("scores/json/Teams").await
    }

    async fn fetch_player_season_stats(
        &self,
        season: &str,
    ) -> Result<Vec<PlayerSeasonStats>, ProviderUnavailable> {
        let path = format!("stats/json/PlayerSeasonStats/{}", season);
        self.get_list(&path).await
    }

    async fn fetch_standings(&self, season: &str) -> Result<Vec<Standing>, ProviderUnavailable> {
        let path = format!("scores/json/Standings/{}", season);
        self.get_list(&path).await
    }

    /// The body is a bare number, e.g. `5`
    async fn fetch_current_week(&self) -> Result<u32, ProviderUnavailable> {
        self.get_json("scores/json/CurrentWeek").await
    }
}
