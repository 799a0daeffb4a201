pub mod aggregator;
pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod utils;

pub use aggregator::*;
pub use api::*;
pub use config::Config;
pub use error::*;
pub use models::*;
pub use utils::*;

pub use utils::best_odds::{find_best_quote, find_best_quote_by_payout};
pub use utils::data::StatsLoader;
pub use utils::ev_calculator::{
    calculate_edge, half_kelly, implied_probability, kelly_fraction, to_decimal_odds,
};
