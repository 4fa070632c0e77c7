//! Total normalization of catalogue runner records into display-ready [`Runner`]s.
//!
//! Every display field is looked up through [`MetadataField`] and falls back to
//! [`SENTINEL`]; nothing in here can fail.

use serde_json::Value;

use super::{Runner, RunnerRecord, RunnerStatus};
use crate::utils::lenient::value_text;

/// Placeholder rendered for any missing display field.
pub const SENTINEL: &str = "N/A";

/// Metadata-backed display fields and the provider key each one is read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetadataField {
    ClothNumber,
    Jockey,
    Trainer,
}

impl MetadataField {
    pub const fn key(self) -> &'static str {
        match self {
            MetadataField::ClothNumber => "CLOTH_NUMBER",
            MetadataField::Jockey => "JOCKEY_NAME",
            MetadataField::Trainer => "TRAINER_NAME",
        }
    }

    /// Display value for this field, or [`SENTINEL`].
    pub fn resolve(self, record: &RunnerRecord) -> String {
        let value = metadata_value(record, self);
        let resolved = match self {
            MetadataField::ClothNumber => value.and_then(parse_cloth_number).map(|n| n.to_string()),
            MetadataField::Jockey | MetadataField::Trainer => value.and_then(text_value),
        };
        resolved.unwrap_or_else(|| SENTINEL.to_string())
    }
}

/// Normalizes a raw runner record. Never fails.
pub fn normalize_runner(record: &RunnerRecord) -> Runner {
    Runner {
        selection_id: record.selection_id,
        name: record
            .runner_name
            .as_deref()
            .and_then(non_blank)
            .unwrap_or_else(|| SENTINEL.to_string()),
        cloth_number: MetadataField::ClothNumber.resolve(record),
        jockey: MetadataField::Jockey.resolve(record),
        trainer: MetadataField::Trainer.resolve(record),
        status: RunnerStatus::from_feed(record.status.as_deref()),
    }
}

/// Reads a cloth number from a JSON number or numeric string.
///
/// Only positive integers that fit a `u16` are accepted; anything else is absent.
pub fn parse_cloth_number(value: &Value) -> Option<u16> {
    let number = match value {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u16>().ok(),
        _ => None,
    };
    number.filter(|n| *n > 0)
}

fn metadata_value(record: &RunnerRecord, field: MetadataField) -> Option<&Value> {
    record.metadata.as_ref()?.get(field.key())
}

fn text_value(value: &Value) -> Option<String> {
    value_text(value).as_deref().and_then(non_blank)
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
