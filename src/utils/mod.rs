pub mod best_odds;
pub mod cache;
pub mod data;
pub mod ev_calculator;
