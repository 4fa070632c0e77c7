use chrono::{DateTime, NaiveDate, Utc};

use racecard::bet::{quote_win, EachWayQuote, LayQuote, PlaceTerms};
use racecard::card::{build_cards, CardOptions, Snapshot};
use racecard::market::InvalidMarketError;
use racecard::odds::RaceOutcome;
use racecard::utils::time::offset_from_minutes;

fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

const SNAPSHOT: &str = r#"{
    "markets": [
        {"marketId": "1.20", "marketName": "2m Nov Hrd", "marketStartTime": "2024-06-01 18:30:00",
         "event": {"name": "Uttoxeter 1st Jun"},
         "runners": [
            {"selectionId": 7, "runnerName": "Gold Leaf", "metadata": {"CLOTH_NUMBER": 2, "JOCKEY_NAME": "B Jones", "TRAINER_NAME": "C Smith"}},
            {"selectionId": 8, "runnerName": "Silver Line", "metadata": {"CLOTH_NUMBER": "1", "JOCKEY_NAME": "", "TRAINER_NAME": null}},
            {"selectionId": 9, "runnerName": "Bronze Age", "metadata": {"CLOTH_NUMBER": "3"}}
         ]},
        {"marketId": "1.10", "marketName": "6f Hcap", "marketStartTime": "2024-06-01T12:15:00Z",
         "event": {"venue": "Ripon", "name": "Ripon 1st Jun"},
         "runners": [
            {"selectionId": 1, "runnerName": "Quick Step"},
            {"selectionId": 2, "runnerName": "Slow Burn"}
         ]},
        {"marketId": "1.30", "marketName": "1m Mdn", "marketStartTime": "2024-06-01T19:00:00Z",
         "runners": []},
        {"marketId": "1.40", "marketName": "Bad", "marketStartTime": "tomorrow-ish"},
        {"marketId": "1.50", "marketName": "Odd", "marketStartTime": "2024-06-01T20:00:00Z", "status": "UNHEARD_OF"}
    ],
    "books": {
        "1.20": {"status": "OPEN", "runners": [
            {"selectionId": 7, "status": "ACTIVE", "ex": {"availableToBack": [{"price": 2.5, "size": 40.0}, {"price": 2.4, "size": 10.0}]}},
            {"selectionId": 8, "status": "ACTIVE", "ex": {"availableToBack": [{"price": 2.5, "size": 12.0}]}},
            {"selectionId": 9, "status": "REMOVED", "ex": {"availableToBack": [{"price": 1.2, "size": 100.0}]}}
        ]},
        "1.10": {"status": "CLOSED", "runners": [
            {"selectionId": 1, "status": "WINNER"},
            {"selectionId": 2, "status": "LOSER"}
        ]}
    }
}"#;

#[test]
fn full_day_card_from_snapshot() {
    let snapshot = Snapshot::from_json(SNAPSHOT).expect("snapshot");
    let options = CardOptions {
        offset: offset_from_minutes(60),
        day: NaiveDate::from_ymd_opt(2024, 6, 1),
    };
    let cards = build_cards(&snapshot, ts("2024-06-01T15:00:00Z"), options);

    let upcoming: Vec<_> = cards.upcoming.iter().map(|c| c.market.id()).collect();
    let finished: Vec<_> = cards.finished.iter().map(|c| c.market.id()).collect();
    assert_eq!(upcoming, vec!["1.20", "1.30"]);
    assert_eq!(finished, vec!["1.10"]);

    let rejected: Vec<_> = cards.rejected.iter().filter_map(|e| e.market_id()).collect();
    assert_eq!(rejected, vec!["1.40", "1.50"]);

    let race = &cards.upcoming[0];
    // Naive start time read as UTC, rendered at +01:00; course falls back to the event name.
    assert_eq!(race.label, "19:30  -  Uttoxeter 1st Jun  -  2m Nov Hrd");
    assert_eq!(race.resolution.favorites, vec![7, 8]);
    assert_eq!(race.resolution.non_runners, vec![9]);
    assert_eq!(race.runners[0].runner.cloth_number, "2");
    assert_eq!(race.runners[1].runner.jockey, "N/A");
    assert_eq!(race.runners[1].runner.trainer, "N/A");
    assert!(race.runners[2].non_runner);
    assert_eq!(race.runners[2].price, None);
    let ranked: Vec<_> = race.ranked_odds.iter().map(|e| e.selection_id).collect();
    assert_eq!(ranked, vec![7, 8]);

    assert!(cards.upcoming[1].empty);
    assert!(!cards.upcoming[1].has_book);
    assert_eq!(cards.upcoming[1].label, "20:00  -  Unknown Course  -  1m Mdn");

    let result = &cards.finished[0];
    assert_eq!(result.market.course(), "Ripon");
    assert_eq!(result.resolution.outcome, RaceOutcome::Decided(vec![1]));
}

#[test]
fn card_set_serializes_for_display() {
    let snapshot = Snapshot::from_json(SNAPSHOT).expect("snapshot");
    let cards = build_cards(&snapshot, ts("2024-06-01T15:00:00Z"), CardOptions::default());
    let value = serde_json::to_value(&cards).expect("serialize");

    assert_eq!(value["upcoming"][0]["runners"][0]["name"], "Gold Leaf");
    assert_eq!(value["upcoming"][0]["runners"][0]["favorite"], true);
    assert_eq!(value["finished"][0]["resolution"]["outcome"]["state"], "decided");
    assert_eq!(value["rejected"].as_array().map(Vec::len), Some(2));
}

#[test]
fn quotes_match_worked_examples() {
    let win = quote_win(10.0, 3.5).expect("win");
    assert!(approx(win.profit, 25.0));
    assert!(approx(win.total_return, 35.0));
    assert!(approx(win.roi, 250.0));
    assert!((win.implied_probability - 28.57).abs() < 0.01);

    let each_way = EachWayQuote::new(10.0, 5.0, PlaceTerms::Quarter).expect("each way");
    assert!(approx(each_way.win.total_return, 25.0));
    assert!(approx(each_way.place.price, 2.0));
    assert!(approx(each_way.return_if_places, 10.0));
    assert!(approx(each_way.return_if_wins, 35.0));

    let lay = LayQuote::new(10.0, 4.0).expect("lay");
    assert!(approx(lay.liability, 30.0));
    assert!(approx(lay.profit_if_loses, 10.0));
}

#[test]
fn malformed_records_do_not_block_valid_markets() {
    let snapshot = Snapshot::from_json(
        r#"{
            "markets": [
                {"marketId": "1.1", "marketName": "7f Cond", "marketStartTime": "2024-06-01T16:00:00Z",
                 "event": {"venue": "York"},
                 "runners": [
                    {"selectionId": 1, "runnerName": "Steady"},
                    {"selectionId": 2, "runnerName": 42, "metadata": ["CLOTH_NUMBER", 2]},
                    {"runnerName": "No Id"},
                    {"selectionId": 3, "runnerName": {"en": "Nested"}, "status": 9}
                 ]},
                {"marketId": "1.2", "marketName": "Epoch", "marketStartTime": 1717257600000},
                {"marketId": "1.3", "marketStartTime": "2024-06-01T17:00:00Z", "event": "York", "runners": "tbc"},
                ["not", "a", "market"],
                "junk"
            ],
            "books": {
                "1.1": {"status": "OPEN", "runners": [
                    {"selectionId": 1, "ex": {"availableToBack": [{"price": 3.0}]}},
                    {"selectionId": 2, "ex": {"availableToBack": [{"price": 2.0, "size": 4.0}]}}
                ]},
                "1.9": {"runners": [{"selectionId": 5, "ex": {"availableToBack": [{"price": 1.5}]}}]},
                "1.3": 17
            }
        }"#,
    )
    .expect("snapshot");
    let cards = build_cards(&snapshot, ts("2024-06-01T15:00:00Z"), CardOptions::default());

    let upcoming: Vec<_> = cards.upcoming.iter().map(|c| c.market.id()).collect();
    assert_eq!(upcoming, vec!["1.1", "1.3"]);

    let york = &cards.upcoming[0];
    assert!(york.has_book);
    let names: Vec<_> = york.runners.iter().map(|r| r.runner.name.as_str()).collect();
    assert_eq!(names, vec!["Steady", "42", "N/A"]);
    assert_eq!(york.runners[1].runner.cloth_number, "N/A");
    assert_eq!(york.resolution.favorites, vec![2]);
    assert_eq!(york.runners[0].price, Some(3.0));

    let late = &cards.upcoming[1];
    assert!(late.empty);
    assert!(!late.has_book);
    assert_eq!(late.market.course(), "Unknown Course");

    assert!(cards
        .rejected
        .iter()
        .any(|e| matches!(e, InvalidMarketError::UnparsableStartTime { market_id, .. } if market_id == "1.2")));
    let malformed = cards
        .rejected
        .iter()
        .filter(|e| matches!(e, InvalidMarketError::Malformed { .. }))
        .count();
    assert!(malformed >= 1);
}
