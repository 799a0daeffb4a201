use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod stats;

pub use stats::*;

/// A betting market, serialized by its Odds API key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Market {
    Moneyline,
    Spread,
    Total,
    Prop(String),
}

impl Market {
    pub fn from_key(key: &str) -> Self {
        match key {
            "h2h" => Market::Moneyline,
            "spreads" => Market::Spread,
            "totals" => Market::Total,
            other => Market::Prop(other.to_string()),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Market::Moneyline => "h2h",
            Market::Spread => "spreads",
            Market::Total => "totals",
            Market::Prop(key) => key,
        }
    }
}

impl From<String> for Market {
    fn from(key: String) -> Self {
        Market::from_key(&key)
    }
}

impl From<Market> for String {
    fn from(market: Market) -> Self {
        market.key().to_string()
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A single priced outcome from one sportsbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub sportsbook: String,
    pub market: Market,
    /// Who the price is for: the player on props, the team on game lines
    pub outcome_label: String,
    /// Raw outcome name ("Over", "Yes", or the team)
    pub side: String,
    pub american_odds: i32, // e.g. -110, +150
    pub point: Option<f64>,
}

impl Quote {
    pub fn format(&self) -> String {
        match self.point {
            Some(point) => format!(
                "{} {} {} {} ({:+}) on {}",
                self.outcome_label,
                self.market,
                self.side,
                point,
                self.american_odds,
                self.sportsbook
            ),
            None => format!(
                "{} {} ({:+}) on {}",
                self.outcome_label, self.market, self.american_odds, self.sportsbook
            ),
        }
    }
}

/// Quotes for one market at one bookmaker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuotes {
    pub market: Market,
    pub quotes: Vec<Quote>,
}

/// A sportsbook and the markets it is offering for a game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmaker {
    pub key: String,
    pub title: String,
    pub last_update: DateTime<Utc>,
    pub markets: Vec<MarketQuotes>,
}

/// An NFL game and every quote fetched for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub sport_title: String,
    pub home_team: String,
    pub away_team: String,
    pub commence_time: DateTime<Utc>,
    pub bookmakers: Vec<Bookmaker>,
}

impl Game {
    /// Every quote in the game, in bookmaker then market order
    pub fn quotes(&self) -> impl Iterator<Item = &Quote> {
        self.bookmakers
            .iter()
            .flat_map(|bookmaker| bookmaker.markets.iter())
            .flat_map(|market| market.quotes.iter())
    }
}

/// Edge of an estimated probability over a market price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub subject: String,
    pub market: Market,
    pub true_probability: f64,
    pub implied_probability: f64,
    pub edge: f64, // true_probability - implied_probability
    pub kelly_fraction: f64, // half-Kelly, never negative
    pub ev_per_dollar: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_keys() {
        assert_eq!(Market::from_key("h2h"), Market::Moneyline);
        assert_eq!(Market::from_key("spreads"), Market::Spread);
        assert_eq!(Market::from_key("totals"), Market::Total);
        assert_eq!(
            Market::from_key("player_rush_yds"),
            Market::Prop("player_rush_yds".to_string())
        );
        assert_eq!(
            Market::Prop("player_first_td".to_string()).key(),
            "player_first_td"
        );
    }

    #[test]
    fn test_market_serializes_as_key() {
        let json = serde_json::to_string(&Market::Moneyline).unwrap();
        assert_eq!(json, "\"h2h\"");
        let market: Market = serde_json::from_str("\"player_anytime_td\"").unwrap();
        assert_eq!(market, Market::Prop("player_anytime_td".to_string()));
    }

    #[test]
    fn test_quote_format() {
        let quote = Quote {
            sportsbook: "DraftKings".to_string(),
            market: Market::Prop("player_rush_yds".to_string()),
            outcome_label: "Christian McCaffrey".to_string(),
            side: "Over".to_string(),
            american_odds: -115,
            point: Some(85.5),
        };
        assert_eq!(
            quote.format(),
            "Christian McCaffrey player_rush_yds Over 85.5 (-115) on DraftKings"
        );
    }
}
