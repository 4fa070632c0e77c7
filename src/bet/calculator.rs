use serde::{Deserialize, Serialize};

use super::{validate, InvalidBetInputError};
use crate::utils::math::{back_profit, fractional_odds_price, implied_probability_pct, percent_of};

/// Returns on a back bet. Percentages are on a 0-100 scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BetQuote {
    pub stake: f64,
    pub price: f64,
    pub profit: f64,
    pub total_return: f64,
    pub roi: f64,
    pub implied_probability: f64,
}

impl BetQuote {
    pub fn back(stake: f64, price: f64) -> Result<Self, InvalidBetInputError> {
        validate(stake, price)?;
        let profit = back_profit(stake, price);
        Ok(Self {
            stake,
            price,
            profit,
            total_return: stake * price,
            roi: percent_of(profit, stake),
            implied_probability: implied_probability_pct(price),
        })
    }
}

/// Quote for a win bet of `stake` at decimal `price`.
pub fn quote_win(stake: f64, price: f64) -> Result<BetQuote, InvalidBetInputError> {
    BetQuote::back(stake, price)
}

/// Fraction of the win odds paid on the place part of an each-way bet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceTerms {
    Quarter,
    Fifth,
    Sixth,
}

impl PlaceTerms {
    pub fn divisor(self) -> u8 {
        match self {
            PlaceTerms::Quarter => 4,
            PlaceTerms::Fifth => 5,
            PlaceTerms::Sixth => 6,
        }
    }

    pub fn from_divisor(divisor: u8) -> Option<Self> {
        match divisor {
            4 => Some(PlaceTerms::Quarter),
            5 => Some(PlaceTerms::Fifth),
            6 => Some(PlaceTerms::Sixth),
            _ => None,
        }
    }
}

/// Each-way bet: half the stake to win, half to place at reduced odds.
///
/// The place part pays the fraction on the odds only, at `1 + (price - 1) / divisor`. Older
/// simulators divided the whole decimal price (`price / divisor`); that form can drop below
/// evens and pays less, so quotes here will not match them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EachWayQuote {
    pub terms: PlaceTerms,
    pub win: BetQuote,
    pub place: BetQuote,
    /// Both parts pay.
    pub return_if_wins: f64,
    /// Only the place part pays.
    pub return_if_places: f64,
}

impl EachWayQuote {
    /// `stake` is the total outlay across both parts.
    pub fn new(stake: f64, price: f64, terms: PlaceTerms) -> Result<Self, InvalidBetInputError> {
        validate(stake, price)?;
        let part = stake / 2.0;
        let place_price = fractional_odds_price(price, f64::from(terms.divisor()));
        let win = BetQuote::back(part, price)?;
        let place = BetQuote::back(part, place_price)?;
        Ok(Self {
            terms,
            win,
            place,
            return_if_wins: win.total_return + place.total_return,
            return_if_places: place.total_return,
        })
    }
}

/// Lay bet of a backer's `stake`: the layer keeps the stake if the runner loses.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LayQuote {
    pub stake: f64,
    pub price: f64,
    pub liability: f64,
    pub profit_if_loses: f64,
    pub implied_probability: f64,
}

impl LayQuote {
    pub fn new(stake: f64, price: f64) -> Result<Self, InvalidBetInputError> {
        validate(stake, price)?;
        Ok(Self {
            stake,
            price,
            liability: back_profit(stake, price),
            profit_if_loses: stake,
            implied_probability: implied_probability_pct(price),
        })
    }
}

/// Any of the supported quote shapes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "bet", rename_all = "snake_case")]
pub enum Quote {
    Win(BetQuote),
    EachWay(EachWayQuote),
    Lay(LayQuote),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn win_quote_matches_worked_example() {
        let q = quote_win(10.0, 2.5).expect("valid quote");
        assert!(approx(q.profit, 15.0));
        assert!(approx(q.total_return, 25.0));
        assert!(approx(q.roi, 150.0));
        assert!(approx(q.implied_probability, 40.0));
    }

    #[test]
    fn win_quote_longer_price() {
        let q = quote_win(10.0, 3.5).expect("valid quote");
        assert!(approx(q.profit, 25.0));
        assert!(approx(q.total_return, 35.0));
        assert!(approx(q.roi, 250.0));
        assert!(approx((q.implied_probability * 100.0).round() / 100.0, 28.57));
    }

    #[test]
    fn evens_floor_price_returns_stake() {
        let q = quote_win(5.0, 1.0).expect("valid quote");
        assert_eq!(q.profit, 0.0);
        assert!(approx(q.total_return, 5.0));
        assert!(approx(q.implied_probability, 100.0));
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        assert!(matches!(
            quote_win(0.0, 2.5),
            Err(InvalidBetInputError::NonPositiveStake { .. })
        ));
        assert!(matches!(
            quote_win(10.0, 0.9),
            Err(InvalidBetInputError::PriceBelowOne { .. })
        ));
        assert!(EachWayQuote::new(-1.0, 5.0, PlaceTerms::Quarter).is_err());
        assert!(LayQuote::new(10.0, 0.5).is_err());
    }

    #[test]
    fn each_way_splits_stake() {
        let q = EachWayQuote::new(20.0, 9.0, PlaceTerms::Quarter).expect("valid quote");
        assert!(approx(q.win.stake, 10.0));
        assert!(approx(q.place.stake, 10.0));
        assert!(approx(q.place.price, 3.0));
        assert!(approx(q.win.profit, 80.0));
        assert!(approx(q.place.profit, 20.0));
        assert!(approx(q.return_if_wins, 120.0));
        assert!(approx(q.return_if_places, 30.0));
    }

    #[test]
    fn place_terms_round_trip_divisors() {
        for terms in [PlaceTerms::Quarter, PlaceTerms::Fifth, PlaceTerms::Sixth] {
            assert_eq!(PlaceTerms::from_divisor(terms.divisor()), Some(terms));
        }
        assert_eq!(PlaceTerms::from_divisor(3), None);
    }

    #[test]
    fn lay_liability() {
        let q = LayQuote::new(10.0, 4.0).expect("valid quote");
        assert!(approx(q.liability, 30.0));
        assert!(approx(q.profit_if_loses, 10.0));
        assert!(approx(q.implied_probability, 25.0));
    }

    #[test]
    fn quotes_are_deterministic() {
        assert_eq!(quote_win(7.3, 4.2), quote_win(7.3, 4.2));
    }
}
