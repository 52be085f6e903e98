//! Common types used throughout the rating ledger

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for competitors
pub type PlayerId = String;

/// Position a participant occupies in a match record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    WinnerP1,
    WinnerP2,
    LoserP1,
    LoserP2,
}

impl Slot {
    /// Whether the slot belongs to the recorded winning side
    pub fn is_winner(&self) -> bool {
        matches!(self, Slot::WinnerP1 | Slot::WinnerP2)
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Slot::WinnerP1 => write!(f, "p1w"),
            Slot::WinnerP2 => write!(f, "p2w"),
            Slot::LoserP1 => write!(f, "p1l"),
            Slot::LoserP2 => write!(f, "p2l"),
        }
    }
}

/// A player named in a match record. Either field may be missing in source data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(default)]
    pub id: Option<PlayerId>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Participant {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
        }
    }

    /// Participant with a known name but no identifier
    pub fn unidentified(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }

    /// Identifier if present and non-blank
    pub fn usable_id(&self) -> Option<&str> {
        self.id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Name if present and non-blank
    pub fn usable_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// One side of a match: a single player, or two players for doubles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Side {
    pub p1: Participant,
    #[serde(default)]
    pub p2: Option<Participant>,
    /// Points won per game, in game order
    #[serde(default)]
    pub scores: Vec<u32>,
}

impl Side {
    pub fn single(player: Participant) -> Self {
        Self {
            p1: player,
            p2: None,
            scores: Vec::new(),
        }
    }

    pub fn pair(p1: Participant, p2: Participant) -> Self {
        Self {
            p1,
            p2: Some(p2),
            scores: Vec::new(),
        }
    }

    pub fn with_scores(mut self, scores: Vec<u32>) -> Self {
        self.scores = scores;
        self
    }
}

/// A normalized match result. The recorded winner always won.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub winner: Side,
    pub loser: Side,
    /// Explicit point margin; takes precedence over per-game scores
    #[serde(default)]
    pub margin: Option<f64>,
    #[serde(default)]
    pub played_at: Option<DateTime<Utc>>,
    /// Event category, e.g. "MS" for men's singles
    #[serde(default)]
    pub category: Option<String>,
}

impl MatchRecord {
    pub fn singles(winner: Participant, loser: Participant) -> Self {
        Self {
            winner: Side::single(winner),
            loser: Side::single(loser),
            ..Default::default()
        }
    }

    pub fn doubles(winners: (Participant, Participant), losers: (Participant, Participant)) -> Self {
        Self {
            winner: Side::pair(winners.0, winners.1),
            loser: Side::pair(losers.0, losers.1),
            ..Default::default()
        }
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = Some(margin);
        self
    }

    pub fn played_at(mut self, at: DateTime<Utc>) -> Self {
        self.played_at = Some(at);
        self
    }

    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// A second player on either side makes this a doubles match
    pub fn is_doubles(&self) -> bool {
        self.winner.p2.is_some() || self.loser.p2.is_some()
    }

    /// Explicit margin, or total points won by the winner minus the loser's total
    pub fn margin(&self) -> Option<f64> {
        if self.margin.is_some() {
            return self.margin;
        }
        if self.winner.scores.is_empty() && self.loser.scores.is_empty() {
            return None;
        }

        let won: i64 = self.winner.scores.iter().map(|&p| i64::from(p)).sum();
        let lost: i64 = self.loser.scores.iter().map(|&p| i64::from(p)).sum();
        Some((won - lost) as f64)
    }

    /// Winner's point difference for each game that both sides have a score for
    pub fn game_point_differences(&self) -> Vec<i64> {
        self.winner
            .scores
            .iter()
            .zip(&self.loser.scores)
            .map(|(&w, &l)| i64::from(w) - i64::from(l))
            .collect()
    }

    /// Participants by slot; `None` entries are empty doubles slots
    pub fn slots(&self) -> Vec<(Slot, Option<&Participant>)> {
        if self.is_doubles() {
            vec![
                (Slot::WinnerP1, Some(&self.winner.p1)),
                (Slot::WinnerP2, self.winner.p2.as_ref()),
                (Slot::LoserP1, Some(&self.loser.p1)),
                (Slot::LoserP2, self.loser.p2.as_ref()),
            ]
        } else {
            vec![
                (Slot::WinnerP1, Some(&self.winner.p1)),
                (Slot::LoserP1, Some(&self.loser.p1)),
            ]
        }
    }
}

/// Stable sort by match time; undated matches keep their relative position at the front
pub fn sort_chronologically(matches: &mut [MatchRecord]) {
    matches.sort_by_key(|m| m.played_at);
}

/// Index of the first record dated earlier than its dated predecessor
pub fn first_out_of_order(matches: &[MatchRecord]) -> Option<usize> {
    let mut latest: Option<DateTime<Utc>> = None;
    for (index, record) in matches.iter().enumerate() {
        if let Some(at) = record.played_at {
            if latest.is_some_and(|prev| at < prev) {
                return Some(index);
            }
            latest = Some(at);
        }
    }
    None
}

/// Keep only matches whose category is one of `categories`
pub fn filter_category(matches: Vec<MatchRecord>, categories: &[String]) -> Vec<MatchRecord> {
    matches
        .into_iter()
        .filter(|m| {
            m.category
                .as_ref()
                .is_some_and(|c| categories.iter().any(|wanted| wanted == c))
        })
        .collect()
}
