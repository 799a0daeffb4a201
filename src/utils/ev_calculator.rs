use crate::error::InvalidOddsError;
use crate::models::{Edge, Quote};

/// Half-Kelly unless the caller asks otherwise
pub const DEFAULT_SAFETY_FACTOR: f64 = 0.5;

/// Convert American odds to decimal odds (total payout per unit staked)
/// Positive odds (+150) mean you win $150 on a $100 bet -> 2.5
/// Negative odds (-150) mean you need to bet $150 to win $100 -> 1.667
pub fn to_decimal_odds(american: i32) -> Result<f64, InvalidOddsError> {
    if american > 0 {
        Ok(american as f64 / 100.0 + 1.0)
    } else if american < 0 {
        Ok(100.0 / (american as f64).abs() + 1.0)
    } else {
        Err(InvalidOddsError::Zero)
    }
}

/// Net profit per unit staked if the bet wins
pub fn payout_multiple(american: i32) -> Result<f64, InvalidOddsError> {
    Ok(to_decimal_odds(american)? - 1.0)
}

/// Market-implied probability of an outcome priced at `american`
pub fn implied_probability(american: i32) -> Result<f64, InvalidOddsError> {
    Ok(1.0 / to_decimal_odds(american)?)
}

fn check_probability(probability: f64) -> Result<f64, InvalidOddsError> {
    if (0.0..=1.0).contains(&probability) {
        Ok(probability)
    } else {
        Err(InvalidOddsError::Probability(probability))
    }
}

/// Estimated probability minus the implied probability of the price
/// Positive means the bet is priced in the bettor's favor
pub fn calculate_edge(true_probability: f64, american_odds: i32) -> Result<f64, InvalidOddsError> {
    let p = check_probability(true_probability)?;
    Ok(p - implied_probability(american_odds)?)
}

/// Expected profit per dollar staked
pub fn ev_per_dollar(true_probability: f64, american_odds: i32) -> Result<f64, InvalidOddsError> {
    let edge = calculate_edge(true_probability, american_odds)?;
    Ok(edge * payout_multiple(american_odds)?)
}

/// Kelly criterion bankroll fraction, scaled by `safety_factor`
///
/// f* = (b*p - q) / b, with b = decimal odds - 1 and q = 1 - p.
/// Negative results are clamped to zero: a bet without an edge is not placed.
pub fn kelly_fraction(
    true_probability: f64,
    american_odds: i32,
    safety_factor: f64,
) -> Result<f64, InvalidOddsError> {
    let p = check_probability(true_probability)?;
    let b = payout_multiple(american_odds)?;
    if b == 0.0 {
        return Err(InvalidOddsError::ZeroPayout(american_odds));
    }

    let q = 1.0 - p;
    let raw_kelly = (b * p - q) / b;

    Ok((raw_kelly * safety_factor).max(0.0))
}

pub fn half_kelly(true_probability: f64, american_odds: i32) -> Result<f64, InvalidOddsError> {
    kelly_fraction(true_probability, american_odds, DEFAULT_SAFETY_FACTOR)
}

/// Price a quote against an estimated probability for `subject`
pub fn evaluate_quote(
    subject: &str,
    quote: &Quote,
    true_probability: f64,
) -> Result<Edge, InvalidOddsError> {
    let odds = quote.american_odds;
    Ok(Edge {
        subject: subject.to_string(),
        market: quote.market.clone(),
        true_probability,
        implied_probability: implied_probability(odds)?,
        edge: calculate_edge(true_probability, odds)?,
        kelly_fraction: half_kelly(true_probability, odds)?,
        ev_per_dollar: ev_per_dollar(true_probability, odds)?,
    })
}
