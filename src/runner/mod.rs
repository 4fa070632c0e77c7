use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::lenient;

pub mod normalizer;

pub use normalizer::{normalize_runner, parse_cloth_number, MetadataField, SENTINEL};

/// Exchange selection identifier, unique within a market.
pub type SelectionId = u64;

/// Lifecycle status of a runner. `Winner` and `Loser` only occur once the market is closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunnerStatus {
    Active,
    Removed,
    Winner,
    Loser,
}

impl RunnerStatus {
    /// Maps a feed status string. Missing or unrecognised values read as `Active`.
    pub fn from_feed(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return RunnerStatus::Active;
        };
        match raw.trim().to_ascii_uppercase().as_str() {
            "REMOVED" | "REMOVED_VACANT" | "HIDDEN" => RunnerStatus::Removed,
            "WINNER" => RunnerStatus::Winner,
            "LOSER" | "PLACED" => RunnerStatus::Loser,
            _ => RunnerStatus::Active,
        }
    }

    /// Non-runner: withdrawn before the off.
    pub fn is_removed(self) -> bool {
        matches!(self, RunnerStatus::Removed)
    }

    pub fn is_winner(self) -> bool {
        matches!(self, RunnerStatus::Winner)
    }
}

/// Raw runner entry as delivered by the market catalogue.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerRecord {
    pub selection_id: SelectionId,
    #[serde(default, deserialize_with = "lenient::text")]
    pub runner_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: Option<String>,
    /// Free-form provider metadata (`CLOTH_NUMBER`, `JOCKEY_NAME`, `TRAINER_NAME`, ...).
    /// Anything other than an object reads as absent.
    #[serde(default, deserialize_with = "lenient::record")]
    pub metadata: Option<BTreeMap<String, Value>>,
}

/// Runner with every display field resolved; missing values carry [`SENTINEL`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Runner {
    pub selection_id: SelectionId,
    pub name: String,
    pub cloth_number: String,
    pub jockey: String,
    pub trainer: String,
    pub status: RunnerStatus,
}

impl Runner {
    /// Copy of this runner carrying a different status.
    pub fn with_status(&self, status: RunnerStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }
}
