use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use super::{InvalidMarketError, Market, MarketRecord};

/// Which list a market belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Upcoming,
    Finished,
}

/// A bucketed market plus display flags.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClassifiedMarket {
    pub market: Market,
    /// No runners declared; still listed so the race shows up.
    pub empty: bool,
}

impl From<Market> for ClassifiedMarket {
    fn from(market: Market) -> Self {
        Self {
            empty: market.is_empty(),
            market,
        }
    }
}

/// Result of one classification pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MarketBuckets {
    /// Soonest first.
    pub upcoming: Vec<ClassifiedMarket>,
    /// Most recent first.
    pub finished: Vec<ClassifiedMarket>,
    /// Records excluded from both buckets.
    pub rejected: Vec<InvalidMarketError>,
}

impl MarketBuckets {
    pub fn len(&self) -> usize {
        self.upcoming.len() + self.finished.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Upcoming means not closed and starting at or after `now`.
pub fn bucket_for(market: &Market, now: DateTime<Utc>) -> Bucket {
    if !market.status().is_closed() && market.start_time() >= now {
        Bucket::Upcoming
    } else {
        Bucket::Finished
    }
}

/// Splits validated markets into upcoming and finished lists.
///
/// Ties on start time are broken by market id ascending, so the output only depends on the
/// input set and `now`.
pub fn classify(markets: impl IntoIterator<Item = Market>, now: DateTime<Utc>) -> MarketBuckets {
    let mut buckets = MarketBuckets::default();
    for market in markets {
        match bucket_for(&market, now) {
            Bucket::Upcoming => buckets.upcoming.push(market.into()),
            Bucket::Finished => buckets.finished.push(market.into()),
        }
    }

    buckets.upcoming.sort_by(|a, b| {
        a.market
            .start_time()
            .cmp(&b.market.start_time())
            .then_with(|| a.market.id().cmp(b.market.id()))
    });
    buckets.finished.sort_by(|a, b| {
        b.market
            .start_time()
            .cmp(&a.market.start_time())
            .then_with(|| a.market.id().cmp(b.market.id()))
    });

    debug!(
        target: "classifier",
        upcoming = buckets.upcoming.len(),
        finished = buckets.finished.len(),
        now = %now.to_rfc3339(),
        "markets classified"
    );
    buckets
}

/// Validates raw records, logging and collecting the ones that fail.
pub fn parse_markets(records: &[MarketRecord]) -> (Vec<Market>, Vec<InvalidMarketError>) {
    let mut markets = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();
    for record in records {
        match Market::try_from(record) {
            Ok(market) => markets.push(market),
            Err(err) => {
                warn!(
                    target: "classifier",
                    market_id = err.market_id().unwrap_or("?"),
                    error = %err,
                    "excluding invalid market"
                );
                rejected.push(err);
            }
        }
    }
    (markets, rejected)
}

/// Keeps markets starting on `day` (UTC); all of them when `day` is `None`.
pub fn filter_day(markets: Vec<Market>, day: Option<NaiveDate>) -> Vec<Market> {
    match day {
        Some(day) => markets.into_iter().filter(|m| m.starts_on(day)).collect(),
        None => markets,
    }
}

/// Classifies raw records starting on `date` (UTC); invalid ones land in `rejected`.
pub fn classify_for_day(
    records: &[MarketRecord],
    date: NaiveDate,
    now: DateTime<Utc>,
) -> MarketBuckets {
    let (markets, rejected) = parse_markets(records);
    MarketBuckets {
        rejected,
        ..classify(filter_day(markets, Some(date)), now)
    }
}
