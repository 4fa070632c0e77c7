use std::fs;

use anyhow::Context;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::{bet::PlaceTerms, utils::time::offset_from_minutes};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CardConfig {
    /// Minutes east of UTC used for race labels (e.g. 60 for BST).
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl CardConfig {
    pub fn offset(&self) -> FixedOffset {
        offset_from_minutes(self.utc_offset_minutes)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BetConfig {
    #[serde(default = "default_stake")]
    pub default_stake: f64,
    /// Each-way place terms as a divisor of the win odds: 4, 5 or 6.
    #[serde(default = "default_each_way_divisor")]
    pub each_way_divisor: u8,
}

impl Default for BetConfig {
    fn default() -> Self {
        Self {
            default_stake: default_stake(),
            each_way_divisor: default_each_way_divisor(),
        }
    }
}

fn default_stake() -> f64 {
    10.0
}

fn default_each_way_divisor() -> u8 {
    4
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub card: CardConfig,
    #[serde(default)]
    pub bet: BetConfig,
}

impl AppConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file at {path}"))?;
        let cfg: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to deserialize TOML config at {path}"))?;
        cfg.place_terms()?;
        Ok(cfg)
    }

    pub fn place_terms(&self) -> anyhow::Result<PlaceTerms> {
        PlaceTerms::from_divisor(self.bet.each_way_divisor).with_context(|| {
            format!(
                "unsupported each_way_divisor {}; expected 4, 5 or 6",
                self.bet.each_way_divisor
            )
        })
    }
}
