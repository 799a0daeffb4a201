use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use nfl_edge::odds_api::OddsApiClient;
use nfl_edge::{
    is_player_prop_market, Config, DataAggregator, ProviderState, StatsLoader,
    MIN_RECOMMENDATION_EDGE, PLACEHOLDER_TRUE_PROBABILITY, PLAYER_PROP_MARKETS,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nfl-edge")]
#[command(author, version, about = "NFL odds edge finder", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upcoming games with moneyline, spread and total quotes
    Games,
    /// Every quote for one player prop market
    Props {
        /// Market key, e.g. player_anytime_td
        market: String,
    },
    /// Best prices and edges for a single player
    Analyze {
        player: String,

        /// Estimated probability the prop hits
        #[arg(short, long)]
        probability: Option<f64>,
    },
    /// Best-priced props whose edge clears a threshold
    Profitable {
        #[arg(long, default_value_t = MIN_RECOMMENDATION_EDGE)]
        min_edge: f64,

        #[arg(short, long, default_value_t = PLACEHOLDER_TRUE_PROBABILITY)]
        probability: f64,
    },
    /// Dashboard summary from every available source
    Insights,
    /// Which providers are configured
    Status,
    /// Players from the local CSV dump
    Players {
        #[arg(short, long)]
        search: Option<String>,

        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Remaining Odds API request quota
    Usage,
}

fn describe(state: ProviderState) -> &'static str {
    match state {
        ProviderState::Unconfigured => "not configured",
        ProviderState::Configured => "configured",
        ProviderState::Verified => "connected",
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let aggregator = DataAggregator::from_config(&config)?;

    match cli.command {
        Commands::Games => {
            let games = aggregator
                .try_get_games()
                .await
                .context("Failed to fetch NFL games")?;

            if games.is_empty() {
                println!("No upcoming games found.");
            }
            for game in games.iter() {
                println!(
                    "{} @ {} ({})",
                    game.away_team,
                    game.home_team,
                    game.commence_time.format("%a %b %-d %H:%M UTC")
                );
                for quote in game.quotes() {
                    println!("  {}", quote.format());
                }
                println!();
            }
        }
        Commands::Props { market } => {
            if !is_player_prop_market(&market) {
                bail!(
                    "Unknown prop market {}, expected one of: {}",
                    market,
                    PLAYER_PROP_MARKETS.join(", ")
                );
            }

            let games = aggregator
                .try_get_player_props(&market)
                .await
                .with_context(|| format!("Failed to fetch {} props", market))?;

            let mut count = 0;
            for game in games.iter() {
                for quote in game.quotes() {
                    println!("{}", quote.format());
                    count += 1;
                }
            }
            println!(
                "\n{} {} quotes across {} games",
                count,
                market,
                games.len()
            );
        }
        Commands::Analyze {
            player,
            probability,
        } => {
            let analysis = aggregator
                .comprehensive_analysis(&player, probability)
                .await;
            println!("Analysis for {}\n", analysis.player);

            if analysis.props.is_empty() {
                println!("No props found for {}.", analysis.player);
            }
            for (market, quote) in &analysis.props {
                match analysis.edges.get(market) {
                    Some(edge) => println!(
                        "{}: {} | Edge: {:+.2}% | Kelly: {:.2}%",
                        market,
                        quote.format(),
                        edge.edge * 100.0,
                        edge.kelly_fraction * 100.0
                    ),
                    None => println!("{}: {} | not priced", market, quote.format()),
                }
            }

            if let Some(stats) = &analysis.season_stats {
                let touchdowns = stats.passing_touchdowns
                    + stats.rushing_touchdowns
                    + stats.receiving_touchdowns;
                println!(
                    "\nSeason: {} {} | Pass {:.0} | Rush {:.0} | Rec {:.0} for {:.0} yds",
                    stats.team,
                    stats.position,
                    stats.passing_yards,
                    stats.rushing_yards,
                    stats.receptions,
                    stats.receiving_yards
                );
                println!("TDs: {:.0}", touchdowns);
            }

            println!("\nRECOMMENDATIONS\n");
            if analysis.recommendations.is_empty() {
                println!(
                    "No bets clear the {:.0}% edge bar.",
                    MIN_RECOMMENDATION_EDGE * 100.0
                );
            }
            for (i, rec) in analysis.recommendations.iter().enumerate() {
                println!("{}. {}", i + 1, rec.format());
            }
        }
        Commands::Profitable {
            min_edge,
            probability,
        } => {
            let props = aggregator.profitable_props(min_edge, probability).await;
            if props.is_empty() {
                println!(
                    "No props with an edge of at least {:.2}%.",
                    min_edge * 100.0
                );
            } else {
                println!("Top {} Profitable Props:\n", props.len());
                for (i, prop) in props.iter().enumerate() {
                    println!("{}. {}", i + 1, prop.format());
                }
            }
        }
        Commands::Insights => {
            let insights = aggregator.insights().await;
            println!("Week {}", insights.current_week);
            println!("Games on schedule: {}", insights.games_today);
            println!("\nTOP PLAYERS\n");
            for player in &insights.top_players {
                println!(
                    "{} ({} {})",
                    player.full_name(),
                    player.team.as_deref().unwrap_or("FA"),
                    player.position.as_deref().unwrap_or("-")
                );
            }
            println!("\nFEATURED GAMES\n");
            for game in &insights.betting_edges {
                println!("{} @ {}", game.away_team, game.home_team);
            }
            if !insights.team_analysis.is_empty() {
                println!("\nSTANDINGS\n");
                for (team, record) in &insights.team_analysis {
                    println!(
                        "{} {}-{}-{} ({:.3})",
                        team, record.wins, record.losses, record.ties, record.win_percentage
                    );
                }
            }
            if insights.data_sources.is_empty() {
                println!("\nNo data sources available.");
            } else {
                println!("\nSources: {}", insights.data_sources.join(", "));
            }
        }
        Commands::Status => {
            let status = aggregator.status();
            println!("The Odds API: {}", describe(status.odds_api));
            println!("SportsDataIO: {}", describe(status.sportsdata_api));

            let loader = StatsLoader::load(&config.csv_dir, &config.season)?;
            println!(
                "CSV dump: {} players, {} teams from {}",
                loader.player_count(),
                loader.teams().len(),
                config.csv_dir.display()
            );
        }
        Commands::Players { search, limit } => {
            let loader = StatsLoader::load(&config.csv_dir, &config.season)?;
            let players = match search.as_deref() {
                Some(query) => loader.search_players(query, limit),
                None => loader.active_players(limit),
            };
            if players.is_empty() {
                println!("No players found.");
            }
            for player in players {
                println!(
                    "{} | {} {} | {}",
                    player.full_name(),
                    player.team.as_deref().unwrap_or("FA"),
                    player.position.as_deref().unwrap_or("-"),
                    player.status.as_deref().unwrap_or("Unknown")
                );
            }
        }
        Commands::Usage => {
            let Some(api_key) = config.odds_api_key.clone() else {
                bail!("ODDS_API_KEY not set in .env file");
            };
            let client = OddsApiClient::new(api_key, config.request_timeout)?;
            let quota = client.check_usage().await?;
            println!("API Requests Used: {}", quota.requests_used);
            println!("API Requests Remaining: {}", quota.requests_remaining);
        }
    }

    Ok(())
}
