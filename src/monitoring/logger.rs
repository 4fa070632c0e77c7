use serde::Serialize;
use tracing::info;

use crate::{
    bet::Quote,
    card::CardSet,
    odds::RaceOutcome,
    types::{AppConfig, LogFormat},
};

#[derive(Serialize)]
struct StartupLog {
    event: &'static str,
    log_format: &'static str,
    utc_offset_minutes: i32,
    each_way_divisor: u8,
}

pub fn log_startup(cfg: &AppConfig) {
    let log_format = match cfg.logging.format {
        LogFormat::Json => "json",
        LogFormat::Pretty => "pretty",
    };
    let payload = StartupLog {
        event: "startup",
        log_format,
        utc_offset_minutes: cfg.card.utc_offset_minutes,
        each_way_divisor: cfg.bet.each_way_divisor,
    };
    info!(target: "racecard", startup = serde_json::to_string(&payload).unwrap_or_default().as_str());
}

#[derive(Serialize)]
struct CardSummary<'a> {
    event: &'a str,
    upcoming: usize,
    finished: usize,
    rejected: Vec<String>,
    without_book: usize,
    pending_results: usize,
}

pub fn log_card_summary(cards: &CardSet) {
    let all = || cards.upcoming.iter().chain(cards.finished.iter());
    let summary = CardSummary {
        event: "card_summary",
        upcoming: cards.upcoming.len(),
        finished: cards.finished.len(),
        rejected: cards.rejected.iter().map(|e| e.to_string()).collect(),
        without_book: all().filter(|c| !c.has_book).count(),
        pending_results: cards
            .finished
            .iter()
            .filter(|c| matches!(c.resolution.outcome, RaceOutcome::Pending))
            .count(),
    };
    let payload = serde_json::to_string(&summary)
        .unwrap_or_else(|_| "{\"event\":\"card_summary_error\"}".to_string());
    info!(target: "card", "{payload}");
}

pub fn log_quote(quote: &Quote) {
    let payload = serde_json::to_string(quote)
        .unwrap_or_else(|_| "{\"event\":\"quote_error\"}".to_string());
    info!(target: "bet", quote = payload.as_str(), "quote computed");
}
