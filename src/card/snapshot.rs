use std::{collections::BTreeMap, fs};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::{
    market::{InvalidMarketError, MarketRecord},
    odds::MarketBookRecord,
    utils::lenient::value_text,
};

/// Already-fetched catalogue plus order books, keyed by market id.
///
/// Entries are parsed one at a time: a market record that cannot be read at all lands in
/// `rejected`, and an unreadable book is dropped, without affecting the rest of the file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSnapshot")]
pub struct Snapshot {
    pub markets: Vec<MarketRecord>,
    pub books: BTreeMap<String, MarketBookRecord>,
    #[serde(skip)]
    pub rejected: Vec<InvalidMarketError>,
}

#[derive(Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    markets: Vec<Value>,
    #[serde(default)]
    books: BTreeMap<String, Value>,
}

impl From<RawSnapshot> for Snapshot {
    fn from(raw: RawSnapshot) -> Self {
        let mut snapshot = Snapshot::default();
        for value in raw.markets {
            let market_id = value.get("marketId").and_then(value_text);
            match serde_json::from_value::<MarketRecord>(value) {
                Ok(record) => snapshot.markets.push(record),
                Err(err) => {
                    warn!(
                        target: "snapshot",
                        market_id = market_id.as_deref().unwrap_or("?"),
                        error = %err,
                        "unreadable market record"
                    );
                    snapshot.rejected.push(InvalidMarketError::Malformed {
                        market_id,
                        reason: err.to_string(),
                    });
                }
            }
        }
        for (market_id, value) in raw.books {
            match serde_json::from_value::<MarketBookRecord>(value) {
                Ok(book) => {
                    snapshot.books.insert(market_id, book);
                }
                Err(err) => {
                    warn!(
                        target: "snapshot",
                        market_id = %market_id,
                        error = %err,
                        "dropping unreadable order book"
                    );
                }
            }
        }
        snapshot
    }
}

impl Snapshot {
    pub fn from_json(contents: &str) -> anyhow::Result<Self> {
        let snapshot = serde_json::from_str(contents).context("failed to deserialize snapshot JSON")?;
        Ok(snapshot)
    }

    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot file at {path}"))?;
        Self::from_json(&contents).with_context(|| format!("invalid snapshot at {path}"))
    }
}
