use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use nfl_edge::{
    Config, DataAggregator, StatsLoader, MIN_RECOMMENDATION_EDGE, PLACEHOLDER_TRUE_PROBABILITY,
    SPORTSBOOKS,
};
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_PROP_MARKET: &str = "player_anytime_td";
const DEFAULT_PLAYER_LIMIT: usize = 50;
const DEFAULT_SEARCH_LIMIT: usize = 20;

// Built once at startup and handed to every handler
#[derive(Clone)]
struct AppState {
    aggregator: Arc<DataAggregator>,
    loader: Arc<StatsLoader>,
}

#[derive(Debug, Deserialize)]
struct PropsQuery {
    market: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnalysisQuery {
    probability: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ProfitableQuery {
    min_edge: Option<f64>,
    probability: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PlayersQuery {
    search: Option<String>,
    limit: Option<usize>,
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "platform": "NFL Edge Analytics",
        "status": "operational",
        "apis": state.aggregator.status(),
        "csv_players": state.loader.player_count(),
        "timestamp": Utc::now(),
    }))
}

async fn games(State(state): State<AppState>) -> Response {
    match state.aggregator.try_get_games().await {
        Ok(games) => Json(json!({
            "success": true,
            "games": *games,
            "timestamp": Utc::now(),
            "source": "The Odds API",
        }))
        .into_response(),
        Err(e) if e.is_unconfigured() => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
        Err(e) => {
            warn!("Serving no games: {}", e);
            Json(json!({
                "success": true,
                "games": [],
                "timestamp": Utc::now(),
                "source": "The Odds API",
            }))
            .into_response()
        }
    }
}

async fn odds(State(state): State<AppState>) -> impl IntoResponse {
    let games = state.aggregator.get_games().await;
    Json(json!({
        "success": true,
        "odds": *games,
        "timestamp": Utc::now(),
        "sportsbooks": SPORTSBOOKS,
    }))
}

async fn player_props(
    State(state): State<AppState>,
    Query(query): Query<PropsQuery>,
) -> impl IntoResponse {
    let market = query.market.as_deref().unwrap_or(DEFAULT_PROP_MARKET);
    let props = state.aggregator.get_player_props(market).await;
    Json(json!({
        "success": true,
        "market": market,
        "props": *props,
        "timestamp": Utc::now(),
    }))
}

async fn analytics(State(state): State<AppState>) -> impl IntoResponse {
    let insights = state.aggregator.insights().await;
    Json(json!({
        "success": true,
        "analytics": insights,
        "timestamp": Utc::now(),
    }))
}

async fn analysis(
    State(state): State<AppState>,
    Path(player): Path<String>,
    Query(query): Query<AnalysisQuery>,
) -> impl IntoResponse {
    let analysis = state
        .aggregator
        .comprehensive_analysis(&player, query.probability)
        .await;
    Json(analysis)
}

async fn profitable_props(
    State(state): State<AppState>,
    Query(query): Query<ProfitableQuery>,
) -> impl IntoResponse {
    let min_edge = query.min_edge.unwrap_or(MIN_RECOMMENDATION_EDGE);
    let probability = query.probability.unwrap_or(PLACEHOLDER_TRUE_PROBABILITY);
    let props = state
        .aggregator
        .profitable_props(min_edge, probability)
        .await;
    Json(json!({
        "success": true,
        "min_edge": min_edge,
        "props": props,
    }))
}

async fn players(
    State(state): State<AppState>,
    Query(query): Query<PlayersQuery>,
) -> impl IntoResponse {
    let players = match query.search.as_deref() {
        Some(search) => state
            .loader
            .search_players(search, query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT)),
        None => state
            .loader
            .active_players(query.limit.unwrap_or(DEFAULT_PLAYER_LIMIT)),
    };
    Json(json!({ "success": true, "players": players }))
}

/// Teams from the CSV dump, or from the stats provider when the dump has none
async fn teams(State(state): State<AppState>) -> impl IntoResponse {
    let csv_teams = state.loader.teams();
    if !csv_teams.is_empty() {
        return Json(json!({ "success": true, "teams": csv_teams, "source": "csv" }));
    }

    let teams = state.aggregator.get_teams().await;
    Json(json!({ "success": true, "teams": *teams, "source": "SportsDataIO" }))
}

async fn api_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "API endpoint not found" })),
    )
}

fn app(state: AppState, static_dir: PathBuf) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/games", get(games))
        .route("/odds", get(odds))
        .route("/player-props", get(player_props))
        .route("/analytics", get(analytics))
        .route("/analysis/:player", get(analysis))
        .route("/profitable-props", get(profitable_props))
        .route("/players", get(players))
        .route("/teams", get(teams))
        .fallback(api_not_found);

    // Client-side routes get the SPA shell with a 200
    let index = ServeFile::new(static_dir.join("index.html"));
    let spa = ServeDir::new(&static_dir).fallback(index);

    Router::new()
        .nest("/api", api)
        .fallback_service(spa)
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let aggregator = DataAggregator::from_config(&config)?;
    let loader = StatsLoader::load(&config.csv_dir, &config.season)?;

    let state = AppState {
        aggregator: Arc::new(aggregator),
        loader: Arc::new(loader),
    };
    let router = app(state, config.static_dir.clone());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("NFL Edge Analytics serving on http://{}", addr);
    axum::serve(listener, router).await.context("Server error")?;

    Ok(())
}
