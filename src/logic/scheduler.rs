//! Court scheduling: manual bookings with double-booking checks, and the automatic
//! round-by-round distribution across courts.

use crate::logic::match_state;
use crate::models::{
    Court, CourtId, CourtSlot, GameMatch, MatchId, MatchState, Stage, Tournament,
    TournamentError,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A court and start time chosen for one match.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub match_id: MatchId,
    pub court_id: CourtId,
    pub scheduled_time: DateTime<Utc>,
}

/// Half-open windows `[a, a + d)` and `[b, b + d)` intersect.
fn overlaps(a: DateTime<Utc>, b: DateTime<Utc>, duration: Duration) -> bool {
    a < b + duration && b < a + duration
}

/// The first other match booked on `court_id` whose window overlaps `[time, time + duration)`.
pub fn find_conflict(
    tournament: &Tournament,
    match_id: MatchId,
    court_id: CourtId,
    time: DateTime<Utc>,
    duration: Duration,
) -> Option<MatchId> {
    tournament
        .matches
        .iter()
        .filter(|m| m.id != match_id)
        .filter_map(|m| m.court_slot().map(|slot| (m.id, slot)))
        .find(|(_, slot)| slot.court_id == court_id && overlaps(slot.scheduled_time, time, duration))
        .map(|(id, _)| id)
}

fn schedulable_court(courts: &[Court], court_id: CourtId) -> Result<&Court, TournamentError> {
    let court = courts
        .iter()
        .find(|c| c.id == court_id)
        .ok_or(TournamentError::CourtNotFound(court_id))?;
    if !court.is_schedulable() {
        return Err(TournamentError::CourtUnavailable { court_id });
    }
    Ok(court)
}

/// Manually book a match on a court, refusing double bookings.
pub fn assign(
    tournament: &mut Tournament,
    courts: &[Court],
    match_id: MatchId,
    court_id: CourtId,
    time: DateTime<Utc>,
    match_duration: Duration,
) -> Result<(), TournamentError> {
    schedulable_court(courts, court_id)?;
    tournament.get_match(match_id)?;
    if let Some(conflicting_match_id) = find_conflict(tournament, match_id, court_id, time, match_duration) {
        log::warn!(
            "Court {} conflict: match {} overlaps match {}",
            court_id,
            match_id,
            conflicting_match_id
        );
        return Err(TournamentError::CourtConflict {
            match_id,
            court_id,
            conflicting_match_id,
        });
    }
    match_state::schedule(tournament.get_match_mut(match_id)?, court_id, time)
}

/// Spread `matches` over `courts` starting at `start_time`.
///
/// 1. Group matches by round (group stage first) and handle rounds in ascending order.
/// 2. Within a round, match `i` goes to court `i % courts`.
/// 3. Each court hands out consecutive slots, `slot_duration` apart.
///
/// Each round begins after the last slot used by any court in the earlier rounds, so a later
/// round never starts before an earlier one. Courts that cannot take bookings are skipped.
pub fn auto_schedule(
    matches: &[&GameMatch],
    courts: &[Court],
    start_time: DateTime<Utc>,
    slot_duration: Duration,
) -> Result<Vec<Assignment>, TournamentError> {
    distribute(matches, courts, start_time, slot_duration, |_, _| true)
}

/// `auto_schedule` for every unscheduled match of `tournament`, stepping over slots that
/// would overlap a booking already on the court.
pub fn auto_schedule_tournament(
    tournament: &Tournament,
    courts: &[Court],
    start_time: DateTime<Utc>,
    slot_duration: Duration,
    match_duration: Duration,
) -> Result<Vec<Assignment>, TournamentError> {
    let booked: Vec<CourtSlot> = tournament
        .matches
        .iter()
        .filter_map(GameMatch::court_slot)
        .collect();
    let is_free = |court_id: CourtId, time: DateTime<Utc>| {
        !booked
            .iter()
            .any(|b| b.court_id == court_id && overlaps(b.scheduled_time, time, match_duration))
    };
    let pending = unscheduled_matches(tournament);
    distribute(&pending, courts, start_time, slot_duration, is_free)
}

fn distribute(
    matches: &[&GameMatch],
    courts: &[Court],
    start_time: DateTime<Utc>,
    slot_duration: Duration,
    is_free: impl Fn(CourtId, DateTime<Utc>) -> bool,
) -> Result<Vec<Assignment>, TournamentError> {
    if slot_duration <= Duration::zero() {
        return Err(TournamentError::InvalidSlotDuration);
    }
    let courts: Vec<&Court> = courts.iter().filter(|c| c.is_schedulable()).collect();
    if courts.is_empty() {
        return Err(TournamentError::NoCourts);
    }

    // Group stage rounds come before elimination rounds.
    let mut rounds: BTreeMap<(bool, u32), Vec<&GameMatch>> = BTreeMap::new();
    for &m in matches {
        rounds
            .entry((m.stage == Stage::Elimination, m.round))
            .or_default()
            .push(m);
    }

    let mut assignments = Vec::with_capacity(matches.len());
    let mut round_start = start_time;
    for (_, round_matches) in rounds {
        let mut next_slot = vec![0i32; courts.len()];
        for (i, m) in round_matches.iter().enumerate() {
            let c = i % courts.len();
            while !is_free(courts[c].id, round_start + slot_duration * next_slot[c]) {
                next_slot[c] += 1;
            }
            assignments.push(Assignment {
                match_id: m.id,
                court_id: courts[c].id,
                scheduled_time: round_start + slot_duration * next_slot[c],
            });
            next_slot[c] += 1;
        }
        let used = next_slot.iter().copied().max().unwrap_or(0);
        round_start = round_start + slot_duration * used;
    }
    Ok(assignments)
}

/// Apply a batch of assignments all-or-nothing.
///
/// Each one is checked against existing bookings and against the earlier entries of the
/// batch; on the first conflict nothing is applied.
pub fn apply_assignments(
    tournament: &mut Tournament,
    assignments: &[Assignment],
    match_duration: Duration,
) -> Result<(), TournamentError> {
    let mut draft = tournament.clone();
    for a in assignments {
        if let Some(conflicting_match_id) =
            find_conflict(&draft, a.match_id, a.court_id, a.scheduled_time, match_duration)
        {
            return Err(TournamentError::CourtConflict {
                match_id: a.match_id,
                court_id: a.court_id,
                conflicting_match_id,
            });
        }
        match_state::schedule(draft.get_match_mut(a.match_id)?, a.court_id, a.scheduled_time)?;
    }
    *tournament = draft;
    Ok(())
}

/// Matches still waiting for a court, in position order within each stage.
pub fn unscheduled_matches(tournament: &Tournament) -> Vec<&GameMatch> {
    let mut pending: Vec<&GameMatch> = tournament
        .matches
        .iter()
        .filter(|m| m.state() == MatchState::Unscheduled)
        .collect();
    pending.sort_by_key(|m| (m.stage == Stage::Elimination, m.round, m.position));
    pending
}
