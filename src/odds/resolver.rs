use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::{OddsEntry, OrderBook};
use crate::{market::Market, runner::SelectionId};

/// Result state of a race.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "winners", rename_all = "snake_case")]
pub enum RaceOutcome {
    /// Market not closed yet.
    InProgress,
    /// Closed, but no runner settled as a winner yet.
    Pending,
    /// Every runner settled as a winner; more than one on a dead heat.
    Decided(Vec<SelectionId>),
}

/// Derived facts for one market.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Resolution {
    pub market_id: String,
    /// Displayable best-back prices. Non-runners and unpriced runners are absent.
    pub prices: BTreeMap<SelectionId, f64>,
    /// Co-favorites sharing the lowest price, ascending by selection id. Empty when none.
    pub favorites: Vec<SelectionId>,
    pub non_runners: Vec<SelectionId>,
    pub outcome: RaceOutcome,
}

impl Resolution {
    pub fn price(&self, selection_id: SelectionId) -> Option<f64> {
        self.prices.get(&selection_id).copied()
    }

    pub fn is_favorite(&self, selection_id: SelectionId) -> bool {
        self.favorites.contains(&selection_id)
    }

    pub fn is_non_runner(&self, selection_id: SelectionId) -> bool {
        self.non_runners.contains(&selection_id)
    }

    pub fn winners(&self) -> &[SelectionId] {
        match &self.outcome {
            RaceOutcome::Decided(winners) => winners,
            RaceOutcome::InProgress | RaceOutcome::Pending => &[],
        }
    }

    pub fn is_winner(&self, selection_id: SelectionId) -> bool {
        self.winners().contains(&selection_id)
    }

    /// Priced runners from shortest to longest, ties by selection id.
    pub fn ranked_prices(&self) -> Vec<OddsEntry> {
        let mut ranked: Vec<OddsEntry> = self
            .prices
            .iter()
            .map(|(&selection_id, &price)| OddsEntry {
                selection_id,
                best_back: Some(price),
            })
            .collect();
        ranked.sort_by(|a, b| {
            a.best_back
                .partial_cmp(&b.best_back)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.selection_id.cmp(&b.selection_id))
        });
        ranked
    }
}

/// Resolves prices, favorites, non-runners and the result of `market`.
///
/// Runner statuses come from `market`; `book` only contributes prices. Without a book the
/// market still gets its non-runners and outcome, but no prices and no favorite.
pub fn resolve(market: &Market, book: Option<&OrderBook>) -> Resolution {
    let non_runners: Vec<SelectionId> = market
        .runners()
        .iter()
        .filter(|r| r.status.is_removed())
        .map(|r| r.selection_id)
        .collect();

    let prices: BTreeMap<SelectionId, f64> = match book {
        Some(book) => market
            .runners()
            .iter()
            .filter(|r| !r.status.is_removed())
            .filter_map(|r| book.best_back(r.selection_id).map(|p| (r.selection_id, p)))
            .collect(),
        None => {
            debug!(target: "resolver", market_id = %market.id(), "no order book; skipping prices");
            BTreeMap::new()
        }
    };

    let favorites = co_favorites(&prices);
    let outcome = outcome_for(market);

    debug!(
        target: "resolver",
        market_id = %market.id(),
        priced = prices.len(),
        favorites = ?favorites,
        non_runners = non_runners.len(),
        outcome = ?outcome,
        "market resolved"
    );

    Resolution {
        market_id: market.id().to_string(),
        prices,
        favorites,
        non_runners,
        outcome,
    }
}

/// Winners of a closed market. Open and suspended markets are always in progress.
pub fn outcome_for(market: &Market) -> RaceOutcome {
    if !market.status().is_closed() {
        return RaceOutcome::InProgress;
    }
    let winners: Vec<SelectionId> = market
        .runners()
        .iter()
        .filter(|r| r.status.is_winner())
        .map(|r| r.selection_id)
        .collect();
    if winners.is_empty() {
        RaceOutcome::Pending
    } else {
        RaceOutcome::Decided(winners)
    }
}

/// Every selection sharing the minimum price.
fn co_favorites(prices: &BTreeMap<SelectionId, f64>) -> Vec<SelectionId> {
    let mut best: Option<f64> = None;
    let mut leaders = Vec::new();
    for (&selection_id, &price) in prices {
        match best {
            Some(b) if price > b => {}
            Some(b) if price == b => leaders.push(selection_id),
            _ => {
                best = Some(price);
                leaders.clear();
                leaders.push(selection_id);
            }
        }
    }
    leaders
}
