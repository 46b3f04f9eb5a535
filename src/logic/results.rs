//! Results on the tournament aggregate: run the match transition, then advance bracket winners.
//!
//! Both steps run against a draft copy, so a failure in either leaves the tournament as it was.

use crate::logic::bracket::advance_winner;
use crate::logic::match_state;
use crate::models::{MatchId, Side, Stage, Tournament, TournamentError};
use serde::Serialize;

/// What a result submission changed.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ResultOutcome {
    pub winner: Side,
    /// Matches whose stored record must be rewritten (empty for an idempotent re-submit).
    pub changed: Vec<MatchId>,
}

/// Record a score on a match. Elimination winners move into their next-round slot.
pub fn record_match_result(
    tournament: &mut Tournament,
    match_id: MatchId,
    score_1: u32,
    score_2: u32,
    require_scheduled: bool,
) -> Result<ResultOutcome, TournamentError> {
    let mut draft = tournament.clone();
    let m = draft.get_match_mut(match_id)?;
    let before = m.version;
    let winner = match_state::record_result(m, score_1, score_2, require_scheduled)?;
    if m.version == before {
        return Ok(ResultOutcome {
            winner,
            changed: Vec::new(),
        });
    }
    let changed = advance(&mut draft, match_id)?;
    *tournament = draft;
    Ok(ResultOutcome { winner, changed })
}

/// Force a winner on an untouched match (no-show, withdrawal).
pub fn assign_match_bye(
    tournament: &mut Tournament,
    match_id: MatchId,
    winner: Side,
) -> Result<ResultOutcome, TournamentError> {
    let mut draft = tournament.clone();
    match_state::assign_bye(draft.get_match_mut(match_id)?, winner)?;
    let changed = advance(&mut draft, match_id)?;
    *tournament = draft;
    Ok(ResultOutcome { winner, changed })
}

fn advance(tournament: &mut Tournament, match_id: MatchId) -> Result<Vec<MatchId>, TournamentError> {
    let mut changed = vec![match_id];
    if tournament.get_match(match_id)?.stage == Stage::Elimination {
        changed.extend(advance_winner(tournament, match_id)?);
    }
    Ok(changed)
}
