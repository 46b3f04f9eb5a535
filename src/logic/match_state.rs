//! Per-match lifecycle: UNSCHEDULED → SCHEDULED → COMPLETED, plus BYE_COMPLETED.
//!
//! Every function validates before touching the match, so an error leaves it unchanged.
//! Successful mutations bump `version`.

use crate::models::{
    CourtId, CourtSlot, GameMatch, MatchResult, MatchStatus, Score, Side, TournamentError,
};
use chrono::{DateTime, Utc};

/// Book (or re-book) a court and time. Completion state is untouched.
pub fn schedule(
    m: &mut GameMatch,
    court_id: CourtId,
    time: DateTime<Utc>,
) -> Result<(), TournamentError> {
    match m.status {
        MatchStatus::Unscheduled | MatchStatus::Scheduled(_) => {}
        MatchStatus::Completed(_) | MatchStatus::ByeCompleted { .. } => {
            return Err(TournamentError::MatchAlreadyCompleted { match_id: m.id });
        }
    }
    let slot = CourtSlot {
        court_id,
        scheduled_time: time,
    };
    if m.status == MatchStatus::Scheduled(slot) {
        return Ok(());
    }
    m.status = MatchStatus::Scheduled(slot);
    m.touch();
    log::debug!("Match {} scheduled on court {} at {}", m.id, court_id, time);
    Ok(())
}

/// Organizer override: award the match to `winner` without play.
///
/// Only an untouched match with both teams present qualifies; anything with a booking or
/// a recorded score is refused so a real result can never be overwritten.
pub fn assign_bye(m: &mut GameMatch, winner: Side) -> Result<(), TournamentError> {
    if m.status != MatchStatus::Unscheduled || !m.is_ready() {
        return Err(TournamentError::MatchNotEligibleForBye { match_id: m.id });
    }
    let score = match winner {
        Side::One => Score::new(1, 0),
        Side::Two => Score::new(0, 1),
    };
    m.status = MatchStatus::Completed(MatchResult {
        score,
        winner,
        slot: None,
        forced_bye: true,
    });
    m.touch();
    log::debug!("Match {} awarded to {:?} by bye", m.id, winner);
    Ok(())
}

/// Record a final score and return the winning side.
///
/// Re-submitting the stored score on a completed match returns the stored winner without
/// changing anything; a different score is refused.
pub fn record_result(
    m: &mut GameMatch,
    score_1: u32,
    score_2: u32,
    require_scheduled: bool,
) -> Result<Side, TournamentError> {
    let score = Score::new(score_1, score_2);
    let winner = score.winner().ok_or(TournamentError::InvalidScore {
        match_id: m.id,
        score_1,
        score_2,
    })?;

    let slot = match m.status {
        MatchStatus::Completed(result) if result.score == score && !result.forced_bye => {
            return Ok(result.winner);
        }
        MatchStatus::Completed(_) | MatchStatus::ByeCompleted { .. } => {
            return Err(TournamentError::MatchAlreadyCompleted { match_id: m.id });
        }
        MatchStatus::Unscheduled if require_scheduled => {
            return Err(TournamentError::MatchNotScheduled { match_id: m.id });
        }
        MatchStatus::Unscheduled => None,
        MatchStatus::Scheduled(slot) => Some(slot),
    };
    if !m.is_ready() {
        return Err(TournamentError::MatchNotReady { match_id: m.id });
    }

    m.status = MatchStatus::Completed(MatchResult {
        score,
        winner,
        slot,
        forced_bye: false,
    });
    m.touch();
    log::debug!("Match {} completed {}-{}", m.id, score_1, score_2);
    Ok(winner)
}

/// Automatic BYE: if exactly one side is a BYE and the other holds a team, complete the match
/// for that team. Returns whether the match was completed.
pub fn complete_bye(m: &mut GameMatch) -> bool {
    if m.status != MatchStatus::Unscheduled {
        return false;
    }
    let winner = match (&m.team_1, &m.team_2) {
        (t, b) if b.is_bye() && t.team().is_some() => Side::One,
        (b, t) if b.is_bye() && t.team().is_some() => Side::Two,
        _ => return false,
    };
    m.status = MatchStatus::ByeCompleted { winner };
    m.touch();
    true
}
