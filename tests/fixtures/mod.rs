//! Test fixtures for ledger replay tests

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use elo_ledger::types::{MatchRecord, Participant};

/// Participant with matching id and name
pub fn player(id: &str) -> Participant {
    Participant::new(id, format!("Player {}", id))
}

pub fn singles(winner: &str, loser: &str) -> MatchRecord {
    MatchRecord::singles(player(winner), player(loser))
}

pub fn doubles(winners: (&str, &str), losers: (&str, &str)) -> MatchRecord {
    MatchRecord::doubles(
        (player(winners.0), player(winners.1)),
        (player(losers.0), player(losers.1)),
    )
}

/// Start of a synthetic season
pub fn season_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2019, 1, 7, 10, 0, 0).unwrap()
}

/// Stamp each record one day after the previous one
pub fn dated(matches: Vec<MatchRecord>) -> Vec<MatchRecord> {
    matches
        .into_iter()
        .enumerate()
        .map(|(day, record)| record.played_at(season_start() + Duration::days(day as i64)))
        .collect()
}

/// A small mixed season: round robin singles plus a few doubles
pub fn mixed_season() -> Vec<MatchRecord> {
    dated(vec![
        singles("1", "2"),
        singles("3", "4"),
        singles("1", "3"),
        doubles(("1", "2"), ("3", "4")),
        singles("2", "4"),
        doubles(("1", "4"), ("2", "3")),
        singles("1", "4"),
        singles("3", "2"),
    ])
}
