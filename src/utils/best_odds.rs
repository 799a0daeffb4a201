use crate::models::{Game, Quote};
use crate::utils::ev_calculator::to_decimal_odds;

fn matching_quotes<'a>(games: &'a [Game], subject_name: &str) -> impl Iterator<Item = &'a Quote> {
    let subject = subject_name.to_lowercase();
    games
        .iter()
        .flat_map(|game| game.quotes())
        .filter(move |quote| quote.outcome_label.to_lowercase() == subject)
}

/// Find the highest-priced quote for a player or team across all sportsbooks
///
/// Compares raw American odds, so any plus-money price beats any minus-money
/// price. First seen wins on ties.
pub fn find_best_quote(games: &[Game], subject_name: &str) -> Option<Quote> {
    let mut best: Option<&Quote> = None;

    for quote in matching_quotes(games, subject_name) {
        if best.map_or(true, |b| quote.american_odds > b.american_odds) {
            best = Some(quote);
        }
    }

    best.cloned()
}

/// Like [`find_best_quote`], but ranks by decimal payout instead of the raw
/// American number
pub fn find_best_quote_by_payout(games: &[Game], subject_name: &str) -> Option<Quote> {
    let mut best: Option<(&Quote, f64)> = None;

    for quote in matching_quotes(games, subject_name) {
        let Ok(decimal) = to_decimal_odds(quote.american_odds) else {
            continue;
        };
        if best.map_or(true, |(_, d)| decimal > d) {
            best = Some((quote, decimal));
        }
    }

    best.map(|(quote, _)| quote.clone())
}

/// Distinct outcome labels in first-seen order
pub fn subjects(games: &[Game]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    games
        .iter()
        .flat_map(|game| game.quotes())
        .filter(|quote| seen.insert(quote.outcome_label.to_lowercase()))
        .map(|quote| quote.outcome_label.clone())
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{Bookmaker, Market, MarketQuotes};
    use chrono::{TimeZone, Utc};

    pub(crate) fn quote(book: &str, market: &str, label: &str, odds: i32) -> Quote {
        Quote {
            sportsbook: book.to_string(),
            market: Market::from_key(market),
            outcome_label: label.to_string(),
            side: "Yes".to_string(),
            american_odds: odds,
            point: None,
        }
    }

    /// A game whose bookmakers and markets are grouped from `quotes` in order
    pub(crate) fn game(id: &str, quotes: Vec<Quote>) -> Game {
        let mut bookmakers: Vec<Bookmaker> = Vec::new();

        for quote in quotes {
            let position = bookmakers.iter().position(|b| b.title == quote.sportsbook);
            let bookmaker = match position {
                Some(i) => &mut bookmakers[i],
                None => {
                    bookmakers.push(Bookmaker {
                        key: quote.sportsbook.to_lowercase(),
                        title: quote.sportsbook.clone(),
                        last_update: Utc.with_ymd_and_hms(2025, 9, 7, 12, 0, 0).unwrap(),
                        markets: Vec::new(),
                    });
                    bookmakers.last_mut().unwrap()
                }
            };

            let markets = &mut bookmaker.markets;
            match markets.iter_mut().find(|m| m.market == quote.market) {
                Some(market) => market.quotes.push(quote),
                None => markets.push(MarketQuotes {
                    market: quote.market.clone(),
                    quotes: vec![quote],
                }),
            }
        }

        Game {
            id: id.to_string(),
            sport_title: "NFL".to_string(),
            home_team: "San Francisco 49ers".to_string(),
            away_team: "Seattle Seahawks".to_string(),
            commence_time: Utc.with_ymd_and_hms(2025, 9, 7, 20, 25, 0).unwrap(),
            bookmakers,
        }
    }

    #[test]
    fn test_empty_games_returns_none() {
        assert!(find_best_quote(&[], "Josh Allen").is_none());
        assert!(find_best_quote_by_payout(&[], "Josh Allen").is_none());
    }

    #[test]
    fn test_plus_money_beats_minus_money() {
        let games = vec![game(
            "g1",
            vec![
                quote("FanDuel", "player_anytime_td", "Derrick Henry", -110),
                quote("DraftKings", "player_anytime_td", "Derrick Henry", 120),
            ],
        )];

        let best = find_best_quote(&games, "Derrick Henry").unwrap();
        assert_eq!(best.american_odds, 120);
        assert_eq!(best.sportsbook, "DraftKings");
    }

    #[test]
    fn test_match_is_case_insensitive_and_exact() {
        let games = vec![game(
            "g1",
            vec![
                quote("BetMGM", "player_anytime_td", "Christian McCaffrey", 105),
                quote("BetMGM", "player_anytime_td", "McCaffrey", 900),
            ],
        )];

        let best = find_best_quote(&games, "christian MCCAFFREY").unwrap();
        assert_eq!(best.american_odds, 105);
        let exact = find_best_quote(&games, "mccaffrey").unwrap();
        assert_eq!(exact.american_odds, 900);
        assert!(find_best_quote(&games, "Caffrey").is_none());
    }

    #[test]
    fn test_ties_keep_first_seen() {
        let first = quote("Caesars", "h2h", "Seattle Seahawks", 140);
        let second = quote("PointsBet", "h2h", "Seattle Seahawks", 140);
        let games = vec![game("g1", vec![first]), game("g2", vec![second])];

        let best = find_best_quote(&games, "Seattle Seahawks").unwrap();
        assert_eq!(best.sportsbook, "Caesars");
    }

    #[test]
    fn test_by_payout_compares_decimal_odds() {
        let games = vec![game(
            "g1",
            vec![
                quote("FanDuel", "h2h", "San Francisco 49ers", -200),
                quote("DraftKings", "h2h", "San Francisco 49ers", -180),
            ],
        )];
        let team = "San Francisco 49ers";

        let best = find_best_quote_by_payout(&games, team).unwrap();
        assert_eq!(best.american_odds, -180);
        // The raw comparator agrees for same-sign prices
        let raw = find_best_quote(&games, team).unwrap();
        assert_eq!(raw.american_odds, -180);
    }

    #[test]
    fn test_subjects_dedupes_in_order() {
        let games = vec![game(
            "g1",
            vec![
                quote("FanDuel", "player_anytime_td", "George Kittle", 150),
                quote("FanDuel", "player_anytime_td", "Kenneth Walker III", 130),
                quote("DraftKings", "player_anytime_td", "george kittle", 160),
            ],
        )];

        let expected = vec!["George Kittle", "Kenneth Walker III"];
        assert_eq!(subjects(&games), expected);
    }
}
