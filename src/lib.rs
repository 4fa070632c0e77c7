pub mod bet;
pub mod card;
pub mod market;
pub mod monitoring;
pub mod odds;
pub mod runner;
pub mod types;
pub mod utils;

pub use crate::types::*;
