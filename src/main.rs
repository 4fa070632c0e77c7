use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing_subscriber::EnvFilter;

use racecard::{
    bet::{BetQuote, EachWayQuote, LayQuote, Quote},
    card::{build_cards, CardOptions, Snapshot},
    monitoring,
    types::{AppConfig, LogFormat},
};

#[derive(Parser, Debug)]
#[command(name = "racecard")]
#[command(about = "Race cards and bet quotes from racing market snapshots", long_about = None)]
struct Cli {
    /// Path to configuration file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build upcoming and finished race cards from a snapshot file
    Card {
        /// JSON snapshot with `markets` and optional `books`
        #[arg(short, long)]
        snapshot: String,
        /// Reference instant (RFC 3339); defaults to the current time
        #[arg(long)]
        now: Option<String>,
        /// Only races starting on this UTC date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Quote a hypothetical bet
    Quote {
        /// Decimal price
        #[arg(long)]
        price: f64,
        /// Stake; defaults to `bet.default_stake`
        #[arg(long)]
        stake: Option<f64>,
        /// Split the stake each-way using `bet.each_way_divisor` place terms
        #[arg(long, conflicts_with = "lay")]
        each_way: bool,
        /// Lay instead of back
        #[arg(long)]
        lay: bool,
    },
}

fn init_tracing(format: LogFormat) {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "racecard=debug,card=debug,info");
    }
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cli = Cli::parse();
    let cfg = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    init_tracing(cfg.logging.format);

    tracing::info!(target: "racecard", "racecard starting");
    tracing::debug!(target: "racecard", config = ?cli.config, "config loaded");
    monitoring::logger::log_startup(&cfg);

    match cli.command {
        Commands::Card {
            snapshot,
            now,
            date,
        } => {
            let now = match now {
                Some(raw) => DateTime::parse_from_rfc3339(&raw)
                    .with_context(|| format!("invalid --now instant {raw:?}"))?
                    .with_timezone(&Utc),
                None => Utc::now(),
            };
            let snap = Snapshot::from_file(&snapshot)?;
            tracing::debug!(
                target: "racecard",
                snapshot = %snapshot,
                markets = snap.markets.len(),
                books = snap.books.len(),
                "snapshot loaded"
            );
            let options = CardOptions {
                offset: cfg.card.offset(),
                day: date,
            };
            let cards = build_cards(&snap, now, options);
            monitoring::logger::log_card_summary(&cards);
            println!("{}", serde_json::to_string_pretty(&cards)?);
        }
        Commands::Quote {
            price,
            stake,
            each_way,
            lay,
        } => {
            let stake = stake.unwrap_or(cfg.bet.default_stake);
            let quote = if each_way {
                Quote::EachWay(EachWayQuote::new(stake, price, cfg.place_terms()?)?)
            } else if lay {
                Quote::Lay(LayQuote::new(stake, price)?)
            } else {
                Quote::Win(BetQuote::back(stake, price)?)
            };
            monitoring::logger::log_quote(&quote);
            println!("{}", serde_json::to_string_pretty(&quote)?);
        }
    }

    Ok(())
}
