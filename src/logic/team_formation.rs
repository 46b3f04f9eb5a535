//! Team formation: turn the confirmed roster into teams according to the event's mode.

use crate::models::{Participant, ParticipantId, Team, TeamFormationMode, TournamentError};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;

/// Teams formed from a roster, plus the confirmed participants left without one.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct TeamFormation {
    pub teams: Vec<Team>,
    /// Confirmed but not placed in any team (no partner, odd one out, left out of manual pairs).
    pub unteamed: Vec<ParticipantId>,
}

/// Form teams for a tournament.
///
/// `manual_teams` is only read in `Manual` mode. `rng` is only used in `Random` mode.
pub fn form_teams<R: Rng + ?Sized>(
    participants: &[Participant],
    mode: TeamFormationMode,
    manual_teams: &[Team],
    rng: &mut R,
) -> Result<TeamFormation, TournamentError> {
    let confirmed: Vec<&Participant> = participants.iter().filter(|p| p.is_confirmed()).collect();

    let formation = match mode {
        TeamFormationMode::Formed => formed_pairs(&confirmed),
        TeamFormationMode::Random => {
            let mut ids: Vec<ParticipantId> = confirmed.iter().map(|p| p.id).collect();
            ids.shuffle(rng);
            let teams = ids
                .chunks_exact(2)
                .map(|pair| Team::pair(pair[0], pair[1]))
                .collect();
            let unteamed = ids.chunks_exact(2).remainder().to_vec();
            TeamFormation { teams, unteamed }
        }
        TeamFormationMode::Super8 => TeamFormation {
            teams: confirmed.iter().map(|p| Team::single(p.id)).collect(),
            unteamed: Vec::new(),
        },
        TeamFormationMode::Manual => manual(participants, &confirmed, manual_teams)?,
    };

    validate_teams(&formation.teams)?;
    log::debug!(
        "Formed {} team(s) in {:?} mode, {} unteamed",
        formation.teams.len(),
        mode,
        formation.unteamed.len()
    );
    Ok(formation)
}

/// Reject any participant that appears in more than one team (or twice in one team).
pub fn validate_teams(teams: &[Team]) -> Result<(), TournamentError> {
    let mut seen = HashSet::new();
    for id in teams.iter().flat_map(|t| t.members()) {
        if !seen.insert(*id) {
            return Err(TournamentError::DuplicateParticipant { participant_id: *id });
        }
    }
    Ok(())
}

/// Mutual, confirmed partner links become teams in roster order.
fn formed_pairs(confirmed: &[&Participant]) -> TeamFormation {
    let confirmed_ids: HashSet<ParticipantId> = confirmed.iter().map(|p| p.id).collect();
    let partner_of = |id: ParticipantId| {
        confirmed
            .iter()
            .find(|p| p.id == id)
            .and_then(|p| p.partner_id)
    };

    let mut teamed = HashSet::new();
    let mut formation = TeamFormation::default();
    for p in confirmed {
        if teamed.contains(&p.id) {
            continue;
        }
        let mutual = p
            .partner_id
            .filter(|partner| *partner != p.id && confirmed_ids.contains(partner))
            .filter(|partner| partner_of(*partner) == Some(p.id));
        match mutual {
            Some(partner) if !teamed.contains(&partner) => {
                teamed.insert(p.id);
                teamed.insert(partner);
                formation.teams.push(Team::pair(p.id, partner));
            }
            _ => formation.unteamed.push(p.id),
        }
    }
    formation
}

fn manual(
    participants: &[Participant],
    confirmed: &[&Participant],
    manual_teams: &[Team],
) -> Result<TeamFormation, TournamentError> {
    for team in manual_teams {
        let size = team.members().len();
        if !(1..=2).contains(&size) {
            return Err(TournamentError::InvalidTeamSize(size));
        }
        for id in team.members() {
            if !participants.iter().any(|p| p.id == *id) {
                return Err(TournamentError::ParticipantNotFound(*id));
            }
        }
    }
    let unteamed = confirmed
        .iter()
        .map(|p| p.id)
        .filter(|id| !manual_teams.iter().any(|t| t.contains(*id)))
        .collect();
    Ok(TeamFormation {
        teams: manual_teams.to_vec(),
        unteamed,
    })
}
