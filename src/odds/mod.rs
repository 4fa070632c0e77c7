use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    market::MarketStatus,
    runner::{RunnerStatus, SelectionId},
    utils::{lenient, math::is_quoted_price},
};

pub mod resolver;

pub use resolver::{outcome_for, resolve, RaceOutcome, Resolution};

/// Raw market book as returned with best-offer price data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketBookRecord {
    #[serde(default, deserialize_with = "lenient::text")]
    pub market_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::records")]
    pub runners: Vec<RunnerBookRecord>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerBookRecord {
    pub selection_id: SelectionId,
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::record")]
    pub ex: Option<ExchangePrices>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangePrices {
    #[serde(default, deserialize_with = "lenient::records")]
    pub available_to_back: Vec<PriceSize>,
    #[serde(default, deserialize_with = "lenient::records")]
    pub available_to_lay: Vec<PriceSize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceSize {
    pub price: f64,
    /// Some feeds omit the matched size on best-offer-only ladders.
    #[serde(default)]
    pub size: f64,
}

impl RunnerBookRecord {
    /// Top rung of the back ladder, if any.
    pub fn best_back(&self) -> Option<f64> {
        self.ex
            .as_ref()
            .and_then(|ex| ex.available_to_back.first())
            .map(|rung| rung.price)
    }
}

/// One runner's derived price. Absent when nobody is offering.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct OddsEntry {
    pub selection_id: SelectionId,
    pub best_back: Option<f64>,
}

/// Order-book snapshot for a single market.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    /// Market status reported alongside the prices, if recognised.
    pub status: Option<MarketStatus>,
    pub prices: BTreeMap<SelectionId, Option<f64>>,
    /// Runner statuses reported by the book; newer than the catalogue's.
    pub runner_statuses: BTreeMap<SelectionId, RunnerStatus>,
}

impl OrderBook {
    pub fn from_prices(prices: impl IntoIterator<Item = (SelectionId, Option<f64>)>) -> Self {
        Self {
            prices: prices.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Best-back price for `selection_id`, treating unusable prices as absent.
    pub fn best_back(&self, selection_id: SelectionId) -> Option<f64> {
        self.prices
            .get(&selection_id)
            .copied()
            .flatten()
            .filter(|p| is_quoted_price(*p))
    }
}

impl From<&MarketBookRecord> for OrderBook {
    fn from(record: &MarketBookRecord) -> Self {
        let prices = record
            .runners
            .iter()
            .map(|r| (r.selection_id, r.best_back()))
            .collect();
        let runner_statuses = record
            .runners
            .iter()
            .filter(|r| r.status.is_some())
            .map(|r| (r.selection_id, RunnerStatus::from_feed(r.status.as_deref())))
            .collect();
        Self {
            status: record.status.as_deref().and_then(MarketStatus::parse),
            prices,
            runner_statuses,
        }
    }
}
