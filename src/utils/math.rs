/// Net winnings of a back bet at decimal `price`, excluding the returned stake.
pub fn back_profit(stake: f64, price: f64) -> f64 {
    stake * (price - 1.0)
}

/// Implied probability of a decimal price, as a percentage.
pub fn implied_probability_pct(price: f64) -> f64 {
    1.0 / price * 100.0
}

/// `part` as a percentage of `whole`. Zero when `whole` is zero.
pub fn percent_of(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    part / whole * 100.0
}

/// Decimal price paying `1 / divisor` of the win odds, e.g. a place price at 1/4 odds.
pub fn fractional_odds_price(price: f64, divisor: f64) -> f64 {
    1.0 + (price - 1.0) / divisor
}

/// True for a usable back price: finite and strictly positive.
pub fn is_quoted_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}
