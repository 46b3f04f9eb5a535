//! Single-elimination bracket: seeding, automatic byes and winner advancement.

use crate::logic::match_state::complete_bye;
use crate::logic::team_formation::validate_teams;
use crate::models::{
    GameMatch, MatchId, Side, Stage, Team, TeamSlot, Tournament, TournamentError, TournamentStage,
};

/// Build the bracket from `qualified` (best seed first).
///
/// The bracket is padded with BYEs to the next power of two, seeded so the top seeds meet the
/// byes, and every round is created up front with `Pending` slots. First-round bye matches are
/// completed immediately and their winners already sit in round 2.
pub fn build_elimination_bracket(
    tournament: &mut Tournament,
    qualified: Vec<Team>,
) -> Result<(), TournamentError> {
    if !matches!(
        tournament.stage,
        TournamentStage::Setup | TournamentStage::GroupStage | TournamentStage::Elimination
    ) {
        return Err(TournamentError::InvalidStage {
            stage: tournament.stage,
        });
    }
    let pending = tournament.pending_group_matches();
    if pending > 0 {
        return Err(TournamentError::IncompleteStage { pending });
    }
    if tournament.stage_started(Stage::Elimination) {
        return Err(TournamentError::BracketAlreadyStarted);
    }
    if qualified.len() < 2 {
        return Err(TournamentError::NotEnoughTeams {
            required: 2,
            available: qualified.len(),
        });
    }
    validate_teams(&qualified)?;

    let size = bracket_size(qualified.len());
    let rounds = size.trailing_zeros();
    let order = seeding_order(size);

    let mut matches = Vec::with_capacity(size - 1);
    for (position, pair) in order.chunks_exact(2).enumerate() {
        let slot = |seed: usize| {
            qualified
                .get(seed - 1)
                .cloned()
                .map_or(TeamSlot::Bye, TeamSlot::Assigned)
        };
        matches.push(GameMatch::new(
            tournament.id,
            Stage::Elimination,
            1,
            slot(pair[0]),
            slot(pair[1]),
            position as u32,
        ));
    }
    for round in 2..=rounds {
        let count = size >> round;
        for position in 0..count {
            matches.push(GameMatch::new(
                tournament.id,
                Stage::Elimination,
                round,
                TeamSlot::Pending,
                TeamSlot::Pending,
                position as u32,
            ));
        }
    }

    tournament.matches.retain(|m| m.stage != Stage::Elimination);
    tournament.matches.extend(matches);
    tournament.stage = TournamentStage::Elimination;

    let byes: Vec<MatchId> = tournament
        .matches
        .iter_mut()
        .filter(|m| m.stage == Stage::Elimination && m.round == 1)
        .filter_map(|m| complete_bye(m).then_some(m.id))
        .collect();
    for id in &byes {
        advance_winner(tournament, *id)?;
    }

    log::info!(
        "Built {}-slot bracket for tournament {}: {} team(s), {} bye(s)",
        size,
        tournament.id,
        qualified.len(),
        byes.len()
    );
    Ok(())
}

/// Push the winner of a completed elimination match into the next round.
///
/// Returns the id of the match that received the team, or `None` for the final (the
/// tournament is then marked completed) and for matches that are not decided yet.
pub fn advance_winner(
    tournament: &mut Tournament,
    match_id: MatchId,
) -> Result<Option<MatchId>, TournamentError> {
    let m = tournament.get_match(match_id)?;
    if m.stage != Stage::Elimination {
        return Ok(None);
    }
    let Some(winner) = m.winner().cloned() else {
        return Ok(None);
    };
    let (round, position) = (m.round, m.position);

    if round >= tournament.elimination_rounds() {
        tournament.refresh_stage();
        log::info!("Tournament {} completed", tournament.id);
        return Ok(None);
    }

    let side = if position % 2 == 0 { Side::One } else { Side::Two };
    let (next_round, next_position) = (round + 1, position / 2);
    let next = tournament
        .matches
        .iter_mut()
        .find(|n| n.stage == Stage::Elimination && n.round == next_round && n.position == next_position)
        .ok_or(TournamentError::BracketSlotMissing {
            round: next_round,
            position: next_position,
        })?;
    if next.is_completed() {
        return Err(TournamentError::MatchAlreadyCompleted { match_id: next.id });
    }
    let slot = next.slot_mut(side);
    if *slot != TeamSlot::Assigned(winner.clone()) {
        *slot = TeamSlot::Assigned(winner);
        next.touch();
    }
    Ok(Some(next.id))
}

/// Next power of two that holds `teams` entries.
pub fn bracket_size(teams: usize) -> usize {
    teams.max(1).next_power_of_two()
}

/// Standard seed order for a bracket of `size` slots (a power of two).
///
/// Consecutive pairs are the first-round matches: for 8 slots, 1-8, 4-5, 2-7, 3-6.
pub fn seeding_order(size: usize) -> Vec<usize> {
    let mut order = vec![1];
    while order.len() < size {
        let n = order.len() * 2;
        order = order.iter().flat_map(|&s| [s, n + 1 - s]).collect();
    }
    order
}
