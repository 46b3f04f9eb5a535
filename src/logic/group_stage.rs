//! Group stage: partition teams into groups and generate each group's round robin.

use crate::logic::team_formation::validate_teams;
use crate::models::{
    GameMatch, Group, Stage, Team, TeamSlot, Tournament, TournamentError, TournamentStage,
};

/// Split `teams` into groups and generate every pairing inside each group.
///
/// 1. Chunk teams in input order (no reshuffle); a trailing single team joins the previous group.
/// 2. For each group, emit all unordered pairs (i < j) as round 1 group matches.
/// 3. Positions count up from 1 across the whole match set.
///
/// Any earlier group stage is replaced entirely. Regenerating once play has begun is rejected.
pub fn generate_group_stage(
    tournament: &mut Tournament,
    teams: Vec<Team>,
    group_size: usize,
) -> Result<(), TournamentError> {
    if !matches!(
        tournament.stage,
        TournamentStage::Setup | TournamentStage::GroupStage
    ) {
        return Err(TournamentError::InvalidStage {
            stage: tournament.stage,
        });
    }
    if tournament.has_started() {
        return Err(TournamentError::StageAlreadyStarted);
    }
    if group_size < 2 {
        return Err(TournamentError::InvalidGroupSize(group_size));
    }
    if teams.len() < 2 {
        return Err(TournamentError::NotEnoughTeams {
            required: 2,
            available: teams.len(),
        });
    }
    validate_teams(&teams)?;

    let groups = partition(teams, group_size);
    let mut matches = round_robin_matches(tournament, &groups);

    log::info!(
        "Generated {} group(s) with {} match(es) for tournament {}",
        groups.len(),
        matches.len(),
        tournament.id
    );

    tournament.groups = groups;
    // Group matches lead; anything from other stages keeps its order after them.
    matches.extend(
        std::mem::take(&mut tournament.matches)
            .into_iter()
            .filter(|m| m.stage != Stage::Group),
    );
    tournament.matches = matches;
    tournament.stage = TournamentStage::GroupStage;
    Ok(())
}

fn partition(teams: Vec<Team>, group_size: usize) -> Vec<Group> {
    let mut chunks: Vec<Vec<Team>> = teams.chunks(group_size).map(<[Team]>::to_vec).collect();
    if chunks.len() > 1 && chunks.last().is_some_and(|c| c.len() == 1) {
        if let Some(lone) = chunks.pop() {
            if let Some(prev) = chunks.last_mut() {
                prev.extend(lone);
            }
        }
    }
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, teams)| Group::new(i as u32 + 1, teams))
        .collect()
}

fn round_robin_matches(tournament: &Tournament, groups: &[Group]) -> Vec<GameMatch> {
    let mut position = 0;
    let mut matches = Vec::new();
    for group in groups {
        for (i, a) in group.teams.iter().enumerate() {
            for b in &group.teams[i + 1..] {
                position += 1;
                matches.push(
                    GameMatch::new(
                        tournament.id,
                        Stage::Group,
                        1,
                        TeamSlot::Assigned(a.clone()),
                        TeamSlot::Assigned(b.clone()),
                        position,
                    )
                    .in_group(group.number),
                );
            }
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn teams(n: usize) -> Vec<Team> {
        (0..n).map(|_| Team::single(Uuid::new_v4())).collect()
    }

    #[test]
    fn partition_folds_trailing_single_team() {
        let groups = partition(teams(9), 4);
        let sizes: Vec<_> = groups.iter().map(|g| g.teams.len()).collect();
        assert_eq!(sizes, vec![4, 5]);
        assert_eq!(groups[1].number, 2);
    }

    #[test]
    fn partition_keeps_input_order() {
        let ts = teams(6);
        let groups = partition(ts.clone(), 3);
        assert_eq!(groups[0].teams, ts[..3]);
        assert_eq!(groups[1].teams, ts[3..]);
    }
}
