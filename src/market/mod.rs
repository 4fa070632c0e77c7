use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::{
    runner::{normalize_runner, Runner, RunnerRecord, RunnerStatus, SelectionId, SENTINEL},
    utils::{
        lenient,
        time::{parse_start_time, race_label, within_day},
    },
};

pub mod classifier;

pub use classifier::{
    bucket_for, classify, classify_for_day, filter_day, parse_markets, Bucket, ClassifiedMarket,
    MarketBuckets,
};

/// Course shown when the event carries neither a venue nor a name.
pub const UNKNOWN_COURSE: &str = "Unknown Course";

/// Trading status of a market. Ordered by lifecycle: a market only moves forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketStatus {
    Open,
    Suspended,
    Closed,
}

impl MarketStatus {
    /// Parses a feed status. `INACTIVE` (not yet trading) reads as `Open`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "OPEN" | "INACTIVE" => Some(MarketStatus::Open),
            "SUSPENDED" => Some(MarketStatus::Suspended),
            "CLOSED" => Some(MarketStatus::Closed),
            _ => None,
        }
    }

    /// Whether a later snapshot may report `next` after `self`.
    pub fn can_transition_to(self, next: MarketStatus) -> bool {
        next >= self
    }

    pub fn is_closed(self) -> bool {
        matches!(self, MarketStatus::Closed)
    }
}

/// Reasons a market record cannot be turned into a [`Market`].
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvalidMarketError {
    #[error("market record has no id")]
    MissingId,

    #[error("market {market_id} has no start time")]
    MissingStartTime { market_id: String },

    #[error("market {market_id} has unparsable start time {raw:?}")]
    UnparsableStartTime { market_id: String, raw: String },

    #[error("market {market_id} has unknown status {raw:?}")]
    UnknownStatus { market_id: String, raw: String },

    #[error("malformed market record {}: {reason}", .market_id.as_deref().unwrap_or("without id"))]
    Malformed {
        market_id: Option<String>,
        reason: String,
    },
}

impl InvalidMarketError {
    pub fn market_id(&self) -> Option<&str> {
        match self {
            InvalidMarketError::MissingId => None,
            InvalidMarketError::Malformed { market_id, .. } => market_id.as_deref(),
            InvalidMarketError::MissingStartTime { market_id }
            | InvalidMarketError::UnparsableStartTime { market_id, .. }
            | InvalidMarketError::UnknownStatus { market_id, .. } => Some(market_id),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub venue: Option<String>,
}

/// Raw market catalogue entry.
///
/// Wrong-shaped fields read as absent and malformed runners are skipped, so validation in
/// [`Market::try_from`] decides what is fatal.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketRecord {
    #[serde(default, deserialize_with = "lenient::text")]
    pub market_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub market_name: Option<String>,
    /// Numeric epochs are kept as text and rejected as unparsable.
    #[serde(default, deserialize_with = "lenient::text")]
    pub market_start_time: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::record")]
    pub event: Option<EventRecord>,
    #[serde(default, deserialize_with = "lenient::records")]
    pub runners: Vec<RunnerRecord>,
}

impl MarketRecord {
    /// Venue, else event name, else [`UNKNOWN_COURSE`].
    pub fn course(&self) -> String {
        self.event
            .as_ref()
            .and_then(|event| {
                non_blank(event.venue.as_deref()).or_else(|| non_blank(event.name.as_deref()))
            })
            .unwrap_or_else(|| UNKNOWN_COURSE.to_string())
    }
}

/// A validated race market. Fields are fixed at construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Market {
    id: String,
    name: String,
    course: String,
    start_time: DateTime<Utc>,
    status: MarketStatus,
    runners: Vec<Runner>,
}

impl Market {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        course: impl Into<String>,
        start_time: DateTime<Utc>,
        status: MarketStatus,
        runners: Vec<Runner>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            course: course.into(),
            start_time,
            status,
            runners,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn course(&self) -> &str {
        &self.course
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn status(&self) -> MarketStatus {
        self.status
    }

    pub fn runners(&self) -> &[Runner] {
        &self.runners
    }

    pub fn runner(&self, selection_id: SelectionId) -> Option<&Runner> {
        self.runners.iter().find(|r| r.selection_id == selection_id)
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }

    pub fn starts_on(&self, date: NaiveDate) -> bool {
        within_day(self.start_time, date)
    }

    /// `HH:MM - Course - Name` in the given offset.
    pub fn label(&self, offset: FixedOffset) -> String {
        race_label(self.start_time, &self.course, &self.name, offset)
    }

    /// New market reflecting a later book snapshot.
    ///
    /// A market status that would move the lifecycle backwards is ignored. Runner statuses
    /// override the catalogue's for the selections they name.
    pub fn with_book_statuses(
        &self,
        status: Option<MarketStatus>,
        runner_statuses: &BTreeMap<SelectionId, RunnerStatus>,
    ) -> Market {
        let status = match status {
            Some(next) if self.status.can_transition_to(next) => next,
            Some(next) => {
                warn!(
                    target: "market",
                    market_id = %self.id,
                    current = ?self.status,
                    reported = ?next,
                    "ignoring backwards market status transition"
                );
                self.status
            }
            None => self.status,
        };
        let runners = self
            .runners
            .iter()
            .map(|runner| match runner_statuses.get(&runner.selection_id) {
                Some(s) => runner.with_status(*s),
                None => runner.clone(),
            })
            .collect();
        Market {
            status,
            runners,
            ..self.clone()
        }
    }
}

impl TryFrom<&MarketRecord> for Market {
    type Error = InvalidMarketError;

    fn try_from(record: &MarketRecord) -> Result<Self, Self::Error> {
        let id = non_blank(record.market_id.as_deref()).ok_or(InvalidMarketError::MissingId)?;

        let raw_start = record
            .market_start_time
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| InvalidMarketError::MissingStartTime {
                market_id: id.clone(),
            })?;
        let start_time =
            parse_start_time(raw_start).ok_or_else(|| InvalidMarketError::UnparsableStartTime {
                market_id: id.clone(),
                raw: raw_start.to_string(),
            })?;

        let status = match record.status.as_deref() {
            None => MarketStatus::Open,
            Some(raw) => MarketStatus::parse(raw).ok_or_else(|| InvalidMarketError::UnknownStatus {
                market_id: id.clone(),
                raw: raw.to_string(),
            })?,
        };

        let mut seen = HashSet::new();
        let mut runners = Vec::with_capacity(record.runners.len());
        for raw in &record.runners {
            if !seen.insert(raw.selection_id) {
                warn!(
                    target: "market",
                    market_id = %id,
                    selection_id = raw.selection_id,
                    "dropping duplicate selection"
                );
                continue;
            }
            runners.push(normalize_runner(raw));
        }

        Ok(Market {
            name: non_blank(record.market_name.as_deref()).unwrap_or_else(|| SENTINEL.to_string()),
            course: record.course(),
            id,
            start_time,
            status,
            runners,
        })
    }
}

fn non_blank(s: Option<&str>) -> Option<String> {
    s.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
