//! Race cards: the classifier, normalizer and resolver composed over one snapshot.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::Serialize;
use tracing::debug;

use crate::{
    market::{classify, filter_day, parse_markets, ClassifiedMarket, InvalidMarketError, Market},
    odds::{resolve, OddsEntry, OrderBook, Resolution},
    runner::Runner,
};

pub mod snapshot;

pub use snapshot::Snapshot;

/// Presentation knobs for a card pass.
#[derive(Clone, Copy, Debug)]
pub struct CardOptions {
    /// Offset race labels are rendered in.
    pub offset: FixedOffset,
    /// Keep only markets starting on this UTC date.
    pub day: Option<NaiveDate>,
}

impl Default for CardOptions {
    fn default() -> Self {
        Self {
            offset: Utc.fix(),
            day: None,
        }
    }
}

/// One runner line on a race card.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunnerView {
    #[serde(flatten)]
    pub runner: Runner,
    pub price: Option<f64>,
    pub favorite: bool,
    pub non_runner: bool,
    pub winner: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RaceCard {
    pub label: String,
    pub market: Market,
    pub empty: bool,
    pub has_book: bool,
    pub runners: Vec<RunnerView>,
    pub ranked_odds: Vec<OddsEntry>,
    pub resolution: Resolution,
}

impl RaceCard {
    fn build(classified: ClassifiedMarket, book: Option<&OrderBook>, offset: FixedOffset) -> Self {
        let ClassifiedMarket { market, empty } = classified;
        let resolution = resolve(&market, book);
        let runners = market
            .runners()
            .iter()
            .map(|runner| RunnerView {
                price: resolution.price(runner.selection_id),
                favorite: resolution.is_favorite(runner.selection_id),
                non_runner: resolution.is_non_runner(runner.selection_id),
                winner: resolution.is_winner(runner.selection_id),
                runner: runner.clone(),
            })
            .collect();
        Self {
            label: market.label(offset),
            empty,
            has_book: book.is_some(),
            runners,
            ranked_odds: resolution.ranked_prices(),
            resolution,
            market,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CardSet {
    pub upcoming: Vec<RaceCard>,
    pub finished: Vec<RaceCard>,
    pub rejected: Vec<InvalidMarketError>,
}

/// Builds race cards for every valid market in `snapshot`.
///
/// Records the snapshot could not read come first in `rejected`, then those failing validation.
/// Book statuses are applied to each market before classification, so a market the book
/// reports as closed lands in `finished`. A market without a book still gets a card.
pub fn build_cards(snapshot: &Snapshot, now: DateTime<Utc>, options: CardOptions) -> CardSet {
    let books: HashMap<&str, OrderBook> = snapshot
        .books
        .iter()
        .map(|(market_id, record)| (market_id.as_str(), OrderBook::from(record)))
        .collect();

    let (markets, invalid) = parse_markets(&snapshot.markets);
    let rejected: Vec<InvalidMarketError> =
        snapshot.rejected.iter().cloned().chain(invalid).collect();
    let markets = filter_day(markets, options.day)
        .into_iter()
        .map(|m| match books.get(m.id()) {
            Some(book) => m.with_book_statuses(book.status, &book.runner_statuses),
            None => m,
        });

    let buckets = classify(markets, now);
    let card = |classified: ClassifiedMarket| {
        let book = books.get(classified.market.id());
        RaceCard::build(classified, book, options.offset)
    };

    let cards = CardSet {
        upcoming: buckets.upcoming.into_iter().map(&card).collect(),
        finished: buckets.finished.into_iter().map(&card).collect(),
        rejected,
    };
    debug!(
        target: "card",
        upcoming = cards.upcoming.len(),
        finished = cards.finished.len(),
        rejected = cards.rejected.len(),
        books = books.len(),
        "race cards built"
    );
    cards
}
