//! Rating ledger: competitor registry and chronological match replay
//!
//! The ledger owns every competitor it has seen and replays match records strictly
//! in input order. Each match is evaluated against the ratings produced by all
//! earlier matches, recorded in the evaluation table, and only then committed.
//! A match that cannot be processed is skipped without touching any state and is
//! recorded as a failure row.

use crate::config::{RatingConfig, ReplayOptions};
use crate::error::{RatingError, Result};
use crate::rating::competitor::Competitor;
use crate::rating::model::rating_delta;
use crate::rating::scorer::brier_score;
use crate::rating::team::TeamProjection;
use crate::types::{first_out_of_order, MatchRecord, Participant, PlayerId, Slot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, warn};

/// Realized outcome for the recorded winner
pub const WIN: f64 = 1.0;

/// Per-slot outcome of a processed match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotResult {
    pub slot: Slot,
    pub player_id: PlayerId,
    pub name: String,
    pub rating_prior: f64,
    pub rating_post: f64,
    pub delta: f64,
}

impl SlotResult {
    fn new(slot: Slot, competitor: &Competitor, delta: f64) -> Self {
        Self {
            slot,
            player_id: competitor.id().to_string(),
            name: competitor.name().to_string(),
            rating_prior: competitor.rating(),
            rating_post: competitor.rating() + delta,
            delta,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinglesResult {
    pub index: usize,
    pub prediction: f64,
    pub outcome: f64,
    pub winner: SlotResult,
    pub loser: SlotResult,
    pub min_rating_history_len: usize,
    pub scored: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoublesResult {
    pub index: usize,
    pub prediction: f64,
    pub outcome: f64,
    pub winners: [SlotResult; 2],
    pub losers: [SlotResult; 2],
    pub winning_team_rating: f64,
    pub losing_team_rating: f64,
    pub min_rating_history_len: usize,
    pub scored: bool,
    /// A team delta split had to be clamped
    pub degraded_split: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchFailure {
    pub index: usize,
    pub reason: String,
}

/// One row of the evaluation table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EvaluationRow {
    Singles(SinglesResult),
    Doubles(DoublesResult),
    Failure(MatchFailure),
}

impl EvaluationRow {
    pub fn index(&self) -> usize {
        match self {
            EvaluationRow::Singles(r) => r.index,
            EvaluationRow::Doubles(r) => r.index,
            EvaluationRow::Failure(f) => f.index,
        }
    }

    pub fn prediction(&self) -> Option<f64> {
        match self {
            EvaluationRow::Singles(r) => Some(r.prediction),
            EvaluationRow::Doubles(r) => Some(r.prediction),
            EvaluationRow::Failure(_) => None,
        }
    }

    pub fn outcome(&self) -> Option<f64> {
        match self {
            EvaluationRow::Singles(r) => Some(r.outcome),
            EvaluationRow::Doubles(r) => Some(r.outcome),
            EvaluationRow::Failure(_) => None,
        }
    }

    pub fn min_rating_history_len(&self) -> Option<usize> {
        match self {
            EvaluationRow::Singles(r) => Some(r.min_rating_history_len),
            EvaluationRow::Doubles(r) => Some(r.min_rating_history_len),
            EvaluationRow::Failure(_) => None,
        }
    }

    /// Whether the prediction counts towards the score
    pub fn is_scored(&self) -> bool {
        match self {
            EvaluationRow::Singles(r) => r.scored,
            EvaluationRow::Doubles(r) => r.scored,
            EvaluationRow::Failure(_) => false,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, EvaluationRow::Failure(_))
    }

    /// Slot results in p1w, p2w, p1l, p2l order
    pub fn slots(&self) -> Vec<&SlotResult> {
        match self {
            EvaluationRow::Singles(r) => vec![&r.winner, &r.loser],
            EvaluationRow::Doubles(r) => r.winners.iter().chain(r.losers.iter()).collect(),
            EvaluationRow::Failure(_) => Vec::new(),
        }
    }

    /// Result for a given slot, if the row has one
    pub fn slot(&self, slot: Slot) -> Option<&SlotResult> {
        self.slots().into_iter().find(|s| s.slot == slot)
    }
}

/// Evaluation rows in processing order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationTable {
    rows: Vec<EvaluationRow>,
}

impl EvaluationTable {
    pub fn rows(&self) -> &[EvaluationRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn push(&mut self, row: EvaluationRow) -> &EvaluationRow {
        self.rows.push(row);
        &self.rows[self.rows.len() - 1]
    }

    /// Predictions and outcomes of the rows that pass the cold-start gate
    pub fn scored_pairs(&self) -> (Vec<f64>, Vec<f64>) {
        self.rows
            .iter()
            .filter(|row| row.is_scored())
            .filter_map(|row| Some((row.prediction()?, row.outcome()?)))
            .unzip()
    }

    /// Brier score over the scored rows
    pub fn brier_score(&self) -> Result<f64> {
        let (predictions, outcomes) = self.scored_pairs();
        brier_score(&predictions, &outcomes)
    }

    pub fn failures(&self) -> impl Iterator<Item = &MatchFailure> {
        self.rows.iter().filter_map(|row| match row {
            EvaluationRow::Failure(f) => Some(f),
            _ => None,
        })
    }
}

/// Counts from a single replay call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaySummary {
    pub attempted: usize,
    pub processed: usize,
    pub failed: usize,
    pub scored: usize,
    pub degraded_splits: usize,
}

/// Participant resolved to a registered competitor or one to be created on commit
enum Resolved {
    Registered(PlayerId),
    New(Competitor),
}

/// Everything needed to commit a match, computed without mutating the ledger
struct MatchPlan {
    row: EvaluationRow,
    new_competitors: Vec<Competitor>,
    deltas: Vec<(PlayerId, f64)>,
    next_synthetic_id: u64,
}

/// Registry of competitors and the replay engine that updates them
#[derive(Debug, Clone)]
pub struct RatingLedger {
    config: RatingConfig,
    options: ReplayOptions,
    registry: HashMap<PlayerId, Competitor>,
    next_synthetic_id: u64,
    last_played_at: Option<DateTime<Utc>>,
    evaluation: EvaluationTable,
}

impl Default for RatingLedger {
    fn default() -> Self {
        let config = RatingConfig::default();
        Self {
            next_synthetic_id: config.synthetic_id_start,
            config,
            options: ReplayOptions::default(),
            registry: HashMap::new(),
            last_played_at: None,
            evaluation: EvaluationTable::default(),
        }
    }
}

impl RatingLedger {
    /// Create an empty ledger
    pub fn new(config: RatingConfig, options: ReplayOptions) -> Result<Self> {
        config.validate()?;
        options.validate()?;

        Ok(Self {
            next_synthetic_id: config.synthetic_id_start,
            config,
            options,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &RatingConfig {
        &self.config
    }

    pub fn options(&self) -> &ReplayOptions {
        &self.options
    }

    /// Replace the replay options used for subsequent matches
    pub fn set_options(&mut self, options: ReplayOptions) -> Result<()> {
        options.validate()?;
        self.options = options;
        Ok(())
    }

    pub fn get(&self, player_id: &str) -> Option<&Competitor> {
        self.registry.get(player_id)
    }

    pub fn competitors(&self) -> impl Iterator<Item = &Competitor> {
        self.registry.values()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Identifier the next participant without one will receive
    pub fn next_synthetic_id(&self) -> u64 {
        self.next_synthetic_id
    }

    /// Competitors ordered by rating, highest first
    pub fn standings(&self) -> Vec<&Competitor> {
        let mut standings: Vec<&Competitor> = self.registry.values().collect();
        standings.sort_by(|a, b| {
            b.rating()
                .partial_cmp(&a.rating())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id().cmp(b.id()))
        });
        standings
    }

    pub fn evaluation(&self) -> &EvaluationTable {
        &self.evaluation
    }

    /// Brier score over every scored match replayed so far
    pub fn brier_score(&self) -> Result<f64> {
        self.evaluation.brier_score()
    }

    /// Replay `matches` in order with the ledger's current options.
    ///
    /// The sequence must already be sorted by match time. Dated records that go
    /// backwards, within the slice or relative to matches already replayed, reject
    /// the whole call before any state changes. Individual match failures do not
    /// abort the replay.
    pub fn replay(&mut self, matches: &[MatchRecord]) -> Result<ReplaySummary> {
        self.check_order(matches)?;

        let mut summary = ReplaySummary {
            attempted: matches.len(),
            ..Default::default()
        };

        for record in matches {
            match self.process_match(record) {
                EvaluationRow::Failure(_) => summary.failed += 1,
                row => {
                    summary.processed += 1;
                    if row.is_scored() {
                        summary.scored += 1;
                    }
                    if matches!(row, EvaluationRow::Doubles(r) if r.degraded_split) {
                        summary.degraded_splits += 1;
                    }
                }
            }
        }

        info!(
            attempted = summary.attempted,
            processed = summary.processed,
            failed = summary.failed,
            scored = summary.scored,
            competitors = self.registry.len(),
            "Replay finished"
        );

        Ok(summary)
    }

    /// Replay with options supplied for this call; they stay in effect afterwards
    pub fn replay_with(
        &mut self,
        matches: &[MatchRecord],
        options: ReplayOptions,
    ) -> Result<ReplaySummary> {
        self.set_options(options)?;
        self.replay(matches)
    }

    /// Process a single match and record its evaluation row.
    ///
    /// Callers driving the loop themselves can stop at any point; ratings reflect
    /// every match committed so far.
    pub fn process_match(&mut self, record: &MatchRecord) -> &EvaluationRow {
        let index = self.evaluation.len();

        let plan = match self.check_recency(index, record).and_then(|()| self.plan(index, record)) {
            Ok(plan) => plan,
            Err(e) => {
                warn!(index, error = %e, "Skipping match");
                return self.evaluation.push(EvaluationRow::Failure(MatchFailure {
                    index,
                    reason: e.to_string(),
                }));
            }
        };

        debug!(
            index,
            prediction = ?plan.row.prediction(),
            scored = plan.row.is_scored(),
            "Processed match"
        );

        for competitor in plan.new_competitors {
            debug!(player_id = competitor.id(), name = competitor.name(), "New competitor");
            self.registry.insert(competitor.id().to_string(), competitor);
        }
        for (player_id, delta) in &plan.deltas {
            if let Some(competitor) = self.registry.get_mut(player_id) {
                competitor.apply_delta(*delta);
            }
        }
        self.next_synthetic_id = plan.next_synthetic_id;
        if record.played_at.is_some() {
            self.last_played_at = record.played_at;
        }

        self.evaluation.push(plan.row)
    }

    fn check_order(&self, matches: &[MatchRecord]) -> Result<()> {
        if let Some(index) = first_out_of_order(matches) {
            return Err(RatingError::UnorderedMatches { index }.into());
        }

        let first_dated = matches
            .iter()
            .enumerate()
            .find_map(|(i, m)| m.played_at.map(|at| (i, at)));
        if let (Some(last), Some((index, first))) = (self.last_played_at, first_dated) {
            if first < last {
                return Err(RatingError::UnorderedMatches { index }.into());
            }
        }

        Ok(())
    }

    fn check_recency(&self, index: usize, record: &MatchRecord) -> Result<()> {
        match (self.last_played_at, record.played_at) {
            (Some(last), Some(at)) if at < last => {
                Err(RatingError::UnorderedMatches { index }.into())
            }
            _ => Ok(()),
        }
    }

    /// Compute the evaluation row and deltas for a match without mutating anything
    fn plan(&self, index: usize, record: &MatchRecord) -> Result<MatchPlan> {
        let mut next_synthetic_id = self.next_synthetic_id;
        let mut seen: HashSet<PlayerId> = HashSet::new();
        let mut resolved = Vec::new();

        let slots = record.slots();
        // Real identifiers anywhere in this match are off limits for minting
        let reserved: HashSet<PlayerId> = slots
            .iter()
            .filter_map(|(_, participant)| participant.and_then(Participant::usable_id))
            .map(str::to_string)
            .collect();

        for (slot, participant) in slots {
            let entry = self.resolve(slot, participant, &mut next_synthetic_id, &reserved)?;
            let player_id = match &entry {
                Resolved::Registered(id) => id.clone(),
                Resolved::New(c) => c.id().to_string(),
            };
            if !seen.insert(player_id.clone()) {
                return Err(RatingError::DuplicateParticipant { player_id }.into());
            }
            resolved.push((slot, entry));
        }

        let players = resolved
            .iter()
            .map(|(slot, entry)| Ok((*slot, self.lookup(entry)?)))
            .collect::<Result<Vec<(Slot, &Competitor)>>>()?;

        let min_rating_history_len = players
            .iter()
            .map(|(_, c)| c.rating_history().len())
            .min()
            .unwrap_or(0);
        // A history of length n means n - 1 matches already played
        let scored = min_rating_history_len > self.options.cold_start_threshold;

        let margin = self.options.effective_margin(record.margin());
        let acf = self.options.autocorr_scale;
        let estimator = self.options.estimator;

        let (row, deltas) = match players.as_slice() {
            [(_, winner), (_, loser)] => {
                let winner_delta = rating_delta(winner, loser, WIN, margin, acf)?;
                let loser_delta = rating_delta(loser, winner, 1.0 - WIN, margin, acf)?;

                let row = EvaluationRow::Singles(SinglesResult {
                    index,
                    prediction: estimator.predict(winner, loser),
                    outcome: WIN,
                    winner: SlotResult::new(Slot::WinnerP1, winner, winner_delta),
                    loser: SlotResult::new(Slot::LoserP1, loser, loser_delta),
                    min_rating_history_len,
                    scored,
                });
                let deltas = vec![
                    (winner.id().to_string(), winner_delta),
                    (loser.id().to_string(), loser_delta),
                ];
                (row, deltas)
            }
            [(_, w1), (_, w2), (_, l1), (_, l2)] => {
                let winning_team = TeamProjection::combine(w1, w2);
                let losing_team = TeamProjection::combine(l1, l2);

                let winning_delta = rating_delta(&winning_team, &losing_team, WIN, margin, acf)?;
                let losing_delta =
                    rating_delta(&losing_team, &winning_team, 1.0 - WIN, margin, acf)?;

                let winning_split = TeamProjection::split_delta(w1, w2, winning_delta);
                let losing_split = TeamProjection::split_delta(l1, l2, losing_delta);

                let row = EvaluationRow::Doubles(DoublesResult {
                    index,
                    prediction: estimator.predict(&winning_team, &losing_team),
                    outcome: WIN,
                    winners: [
                        SlotResult::new(Slot::WinnerP1, w1, winning_split.first),
                        SlotResult::new(Slot::WinnerP2, w2, winning_split.second),
                    ],
                    losers: [
                        SlotResult::new(Slot::LoserP1, l1, losing_split.first),
                        SlotResult::new(Slot::LoserP2, l2, losing_split.second),
                    ],
                    winning_team_rating: winning_team.rating(),
                    losing_team_rating: losing_team.rating(),
                    min_rating_history_len,
                    scored,
                    degraded_split: winning_split.degraded || losing_split.degraded,
                });
                let deltas = vec![
                    (w1.id().to_string(), winning_split.first),
                    (w2.id().to_string(), winning_split.second),
                    (l1.id().to_string(), losing_split.first),
                    (l2.id().to_string(), losing_split.second),
                ];
                (row, deltas)
            }
            other => {
                return Err(RatingError::UnresolvedParticipant {
                    slot: "match".to_string(),
                    reason: format!("expected 2 or 4 participants, found {}", other.len()),
                }
                .into());
            }
        };

        let new_competitors = resolved
            .into_iter()
            .filter_map(|(_, entry)| match entry {
                Resolved::New(c) => Some(c),
                Resolved::Registered(_) => None,
            })
            .collect();

        Ok(MatchPlan {
            row,
            new_competitors,
            deltas,
            next_synthetic_id,
        })
    }

    fn resolve(
        &self,
        slot: Slot,
        participant: Option<&Participant>,
        next_synthetic_id: &mut u64,
        reserved: &HashSet<PlayerId>,
    ) -> Result<Resolved> {
        let participant = participant.ok_or_else(|| RatingError::UnresolvedParticipant {
            slot: slot.to_string(),
            reason: "doubles match is missing a partner".to_string(),
        })?;

        if let Some(id) = participant.usable_id() {
            if self.registry.contains_key(id) {
                return Ok(Resolved::Registered(id.to_string()));
            }
            let name = participant.usable_name().unwrap_or(id);
            return Ok(Resolved::New(self.new_competitor(id.to_string(), name)));
        }

        let name = participant
            .usable_name()
            .ok_or_else(|| RatingError::UnresolvedParticipant {
                slot: slot.to_string(),
                reason: "no identifier and no name".to_string(),
            })?;

        // Skip any synthetic value already used as a real identifier
        let mut id = next_synthetic_id.to_string();
        *next_synthetic_id += 1;
        while self.registry.contains_key(&id) || reserved.contains(&id) {
            id = next_synthetic_id.to_string();
            *next_synthetic_id += 1;
        }

        Ok(Resolved::New(self.new_competitor(id, name)))
    }

    fn lookup<'a>(&'a self, entry: &'a Resolved) -> Result<&'a Competitor> {
        match entry {
            Resolved::New(competitor) => Ok(competitor),
            Resolved::Registered(id) => self.registry.get(id).ok_or_else(|| {
                RatingError::UnresolvedParticipant {
                    slot: id.clone(),
                    reason: "competitor missing from registry".to_string(),
                }
                .into()
            }),
        }
    }

    fn new_competitor(&self, id: PlayerId, name: &str) -> Competitor {
        Competitor::with_params(
            id,
            name,
            self.config.initial_rating,
            self.config.default_spread,
            self.config.default_kfactor,
        )
    }
}

/// Replay each category in its own ledger. Matches without a category are ignored.
pub fn replay_by_category(
    matches: &[MatchRecord],
    config: &RatingConfig,
    options: &ReplayOptions,
) -> Result<BTreeMap<String, RatingLedger>> {
    let mut grouped: BTreeMap<String, Vec<MatchRecord>> = BTreeMap::new();
    for record in matches {
        if let Some(category) = &record.category {
            grouped.entry(category.clone()).or_default().push(record.clone());
        }
    }

    let mut ledgers = BTreeMap::new();
    for (category, records) in grouped {
        let mut ledger = RatingLedger::new(config.clone(), options.clone())?;
        ledger.replay(&records)?;
        ledgers.insert(category, ledger);
    }

    Ok(ledgers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn singles(winner: &str, loser: &str) -> MatchRecord {
        MatchRecord::singles(
            Participant::new(winner, winner.to_uppercase()),
            Participant::new(loser, loser.to_uppercase()),
        )
    }

    #[test]
    fn test_first_singles_match() {
        let mut ledger = RatingLedger::default();
        let row = ledger.process_match(&singles("a", "b")).clone();

        let EvaluationRow::Singles(result) = row else {
            panic!("expected singles row");
        };
        assert_eq!(result.prediction, 0.5);
        assert_eq!(result.outcome, 1.0);
        assert_eq!(result.winner.delta, 90.0);
        assert_eq!(result.loser.delta, -90.0);
        assert_eq!(result.min_rating_history_len, 1);

        assert_eq!(ledger.get("a").unwrap().rating(), 1590.0);
        assert_eq!(ledger.get("b").unwrap().rating(), 1410.0);
        assert_eq!(ledger.get("a").unwrap().name(), "A");
    }

    #[test]
    fn test_prediction_uses_pre_match_ratings() {
        let mut ledger = RatingLedger::default();
        ledger.process_match(&singles("a", "b"));
        let row = ledger.process_match(&singles("a", "b")).clone();

        let EvaluationRow::Singles(result) = row else {
            panic!("expected singles row");
        };
        assert_eq!(result.winner.rating_prior, 1590.0);
        assert_eq!(result.loser.rating_prior, 1410.0);
        assert!(result.prediction > 0.5);
        assert_eq!(result.min_rating_history_len, 2);
        assert_eq!(ledger.get("a").unwrap().rating_history().len(), 3);
    }

    #[test]
    fn test_synthetic_ids_for_unidentified_players() {
        let mut ledger = RatingLedger::default();
        let record = MatchRecord::singles(
            Participant::unidentified("Walk-in"),
            Participant::unidentified("Guest"),
        );

        ledger.process_match(&record);
        assert_eq!(ledger.get("2000001").unwrap().name(), "Walk-in");
        assert_eq!(ledger.get("2000002").unwrap().name(), "Guest");
        assert_eq!(ledger.next_synthetic_id(), 2_000_003);

        // The same unidentified name gets a fresh id every time
        ledger.process_match(&record);
        assert_eq!(ledger.len(), 4);
    }

    #[test]
    fn test_synthetic_id_skips_real_identifier() {
        let mut ledger = RatingLedger::default();
        ledger.process_match(&singles("2000001", "b"));

        ledger.process_match(&MatchRecord::singles(
            Participant::unidentified("Guest"),
            Participant::new("b", "B"),
        ));
        assert_eq!(ledger.get("2000002").unwrap().name(), "Guest");
        assert_eq!(ledger.get("2000001").unwrap().name(), "2000001");
    }

    #[test]
    fn test_synthetic_id_skips_identifier_later_in_same_match() {
        let mut ledger = RatingLedger::default();
        let row = ledger
            .process_match(&MatchRecord::singles(
                Participant::unidentified("Guest"),
                Participant::new("2000001", "Registered Later"),
            ))
            .clone();

        assert!(!row.is_failure());
        assert_eq!(row.slot(Slot::WinnerP1).unwrap().player_id, "2000002");
        assert_eq!(row.slot(Slot::LoserP1).unwrap().player_id, "2000001");
        assert_eq!(ledger.get("2000002").unwrap().name(), "Guest");
        assert_eq!(ledger.get("2000001").unwrap().name(), "Registered Later");
        assert_eq!(ledger.next_synthetic_id(), 2_000_003);
    }

    #[test]
    fn test_unresolved_participant_is_isolated() {
        let mut ledger = RatingLedger::default();
        ledger.process_match(&singles("a", "b"));

        let broken = MatchRecord::singles(Participant::new("a", "A"), Participant::default());
        let row = ledger.process_match(&broken).clone();

        assert!(row.is_failure());
        assert_eq!(row.prediction(), None);
        assert!(row.slots().is_empty());
        assert_eq!(ledger.get("a").unwrap().rating_history().len(), 2);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.evaluation().failures().count(), 1);
    }

    #[test]
    fn test_failure_does_not_register_or_mint() {
        let mut ledger = RatingLedger::default();
        let record = MatchRecord::doubles(
            (Participant::unidentified("X"), Participant::new("new", "New")),
            (Participant::new("c", "C"), Participant::default()),
        );

        assert!(ledger.process_match(&record).is_failure());
        assert!(ledger.is_empty());
        assert_eq!(ledger.next_synthetic_id(), 2_000_001);
    }

    #[test]
    fn test_duplicate_participant_rejected() {
        let mut ledger = RatingLedger::default();
        let row = ledger.process_match(&singles("a", "a")).clone();

        let EvaluationRow::Failure(failure) = row else {
            panic!("expected failure row");
        };
        assert!(failure.reason.contains("more than once"));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_doubles_missing_partner() {
        let mut ledger = RatingLedger::default();
        let mut record = singles("a", "b");
        record.winner.p2 = Some(Participant::new("c", "C"));

        let row = ledger.process_match(&record).clone();
        let EvaluationRow::Failure(failure) = row else {
            panic!("expected failure row");
        };
        assert!(failure.reason.contains("p2l"));
    }

    #[test]
    fn test_cold_start_gate() {
        let options = ReplayOptions {
            cold_start_threshold: 1,
            ..Default::default()
        };
        let mut ledger = RatingLedger::new(RatingConfig::default(), options).unwrap();

        assert!(!ledger.process_match(&singles("a", "b")).is_scored());
        assert!(ledger.process_match(&singles("a", "b")).is_scored());
        assert!(!ledger.process_match(&singles("a", "c")).is_scored());

        // Ratings of unscored matches still move
        assert_eq!(ledger.get("c").unwrap().rating_history().len(), 2);
        assert_eq!(ledger.evaluation().scored_pairs().0.len(), 1);
    }

    #[test]
    fn test_margin_only_when_enabled() {
        let record = singles("a", "b").with_margin(10.0);

        let mut plain = RatingLedger::default();
        plain.process_match(&record);
        assert_eq!(plain.get("a").unwrap().rating(), 1590.0);

        let options = ReplayOptions {
            margin_of_victory: true,
            ..Default::default()
        };
        let mut with_margin = RatingLedger::new(RatingConfig::default(), options).unwrap();
        with_margin.process_match(&record);
        let gain = with_margin.get("a").unwrap().rating() - 1500.0;
        assert!((gain - 215.81).abs() < 0.01);
    }

    #[test]
    fn test_replay_rejects_unordered_dates() {
        use chrono::TimeZone;
        let early = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2020, 6, 1, 0, 0, 0).unwrap();

        let mut ledger = RatingLedger::default();
        let matches = vec![singles("a", "b").played_at(late), singles("a", "b").played_at(early)];
        let err = ledger.replay(&matches).unwrap_err();
        assert_eq!(
            err.downcast_ref::<RatingError>(),
            Some(&RatingError::UnorderedMatches { index: 1 })
        );
        assert!(ledger.is_empty());
        assert!(ledger.evaluation().is_empty());

        // Ordering also holds across calls
        ledger.replay(&matches[..1]).unwrap();
        assert!(ledger.replay(&matches[1..]).is_err());
        assert!(ledger.process_match(&matches[1]).is_failure());
    }

    #[test]
    fn test_standings_order() {
        let mut ledger = RatingLedger::default();
        ledger
            .replay(&[singles("a", "b"), singles("a", "c"), singles("b", "c")])
            .unwrap();

        let ids: Vec<&str> = ledger.standings().iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = ReplayOptions {
            autocorr_scale: Some(-1.0),
            ..Default::default()
        };
        assert!(RatingLedger::new(RatingConfig::default(), options.clone()).is_err());

        let mut ledger = RatingLedger::default();
        assert!(ledger.replay_with(&[singles("a", "b")], options).is_err());
        assert!(ledger.evaluation().is_empty());
    }
}
