//! Group standings derived from completed group matches. Never stored; recomputed on demand.

use crate::models::{GameMatch, Group, Participant, ParticipantId, Side, Stage, Team, Tournament};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of a group table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandingEntry {
    pub team: Team,
    pub points: u32,
    pub played: u32,
    pub won: u32,
    pub lost: u32,
    pub sets_won: u32,
    pub sets_lost: u32,
    /// Mean member ranking; absent unless every member has one.
    pub average_ranking: Option<f64>,
}

impl StandingEntry {
    fn new(team: Team, rankings: &HashMap<ParticipantId, f64>) -> Self {
        let average_ranking = average_ranking(&team, rankings);
        Self {
            team,
            points: 0,
            played: 0,
            won: 0,
            lost: 0,
            sets_won: 0,
            sets_lost: 0,
            average_ranking,
        }
    }
}

/// Standings for one group, sorted by points (descending).
///
/// Ties keep group order: the sort is stable and looks at points only.
pub fn calculate_standings<'a>(
    group: &Group,
    matches: impl IntoIterator<Item = &'a GameMatch>,
    rankings: &HashMap<ParticipantId, f64>,
    points_per_win: u32,
) -> Vec<StandingEntry> {
    let mut table: Vec<StandingEntry> = group
        .teams
        .iter()
        .map(|t| StandingEntry::new(t.clone(), rankings))
        .collect();

    let relevant = matches
        .into_iter()
        .filter(|m| m.stage == Stage::Group && m.group == Some(group.number));
    for m in relevant {
        let (Some(score), Some(winner)) = (m.score(), m.winner_side()) else {
            continue;
        };
        for side in [Side::One, Side::Two] {
            let Some(team) = m.slot(side).team() else {
                continue;
            };
            let Some(row) = table.iter_mut().find(|r| &r.team == team) else {
                continue;
            };
            row.played += 1;
            row.sets_won = row.sets_won.saturating_add(score.for_side(side));
            row.sets_lost = row.sets_lost.saturating_add(score.for_side(side.other()));
            if side == winner {
                row.won += 1;
                row.points = row.points.saturating_add(points_per_win);
            } else {
                row.lost += 1;
            }
        }
    }

    table.sort_by(|a, b| b.points.cmp(&a.points));
    table
}

/// Group number paired with its table, for every group in the tournament.
pub fn group_standings(
    tournament: &Tournament,
    participants: &[Participant],
    points_per_win: u32,
) -> Vec<(u32, Vec<StandingEntry>)> {
    let rankings = ranking_index(participants);
    tournament
        .groups
        .iter()
        .map(|g| {
            (
                g.number,
                calculate_standings(g, &tournament.matches, &rankings, points_per_win),
            )
        })
        .collect()
}

/// Seed order for the bracket: all group winners first (in group order), then all runners-up, etc.
pub fn collect_qualifiers(standings: &[(u32, Vec<StandingEntry>)], per_group: usize) -> Vec<Team> {
    (0..per_group)
        .flat_map(|rank| {
            standings
                .iter()
                .filter_map(move |(_, table)| table.get(rank).map(|e| e.team.clone()))
        })
        .collect()
}

pub fn ranking_index(participants: &[Participant]) -> HashMap<ParticipantId, f64> {
    participants
        .iter()
        .filter_map(|p| p.ranking.map(|r| (p.id, r)))
        .collect()
}

fn average_ranking(team: &Team, rankings: &HashMap<ParticipantId, f64>) -> Option<f64> {
    let members = team.members();
    if members.is_empty() {
        return None;
    }
    let mut total = 0.0;
    for id in members {
        total += rankings.get(id)?;
    }
    Some(total / members.len() as f64)
}
