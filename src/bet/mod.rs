use serde::Serialize;
use thiserror::Error;

pub mod calculator;

pub use calculator::{quote_win, BetQuote, EachWayQuote, LayQuote, PlaceTerms, Quote};

/// Rejected calculator input. No partial quote is ever produced.
#[derive(Debug, Clone, Copy, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvalidBetInputError {
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },

    #[error("stake must be positive, got {stake}")]
    NonPositiveStake { stake: f64 },

    #[error("price must be at least 1.0, got {price}")]
    PriceBelowOne { price: f64 },
}

/// Checks a stake/decimal price pair.
pub fn validate(stake: f64, price: f64) -> Result<(), InvalidBetInputError> {
    if !stake.is_finite() {
        return Err(InvalidBetInputError::NonFinite { field: "stake" });
    }
    if !price.is_finite() {
        return Err(InvalidBetInputError::NonFinite { field: "price" });
    }
    if stake <= 0.0 {
        return Err(InvalidBetInputError::NonPositiveStake { stake });
    }
    if price < 1.0 {
        return Err(InvalidBetInputError::PriceBelowOne { price });
    }
    Ok(())
}
