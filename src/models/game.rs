//! Match, Team and the tagged slot/status types that keep illegal match states unrepresentable.

use crate::models::court::CourtId;
use crate::models::participant::ParticipantId;
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// A team: participant ids (2 for doubles, 1 for Super 8).
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Team(pub Vec<ParticipantId>);

impl Team {
    pub fn pair(a: ParticipantId, b: ParticipantId) -> Self {
        Self(vec![a, b])
    }

    pub fn single(id: ParticipantId) -> Self {
        Self(vec![id])
    }

    pub fn members(&self) -> &[ParticipantId] {
        &self.0
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.0.contains(&id)
    }
}

/// One side of a match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    One,
    Two,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }
}

/// What occupies one side of a match.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "team")]
pub enum TeamSlot {
    Assigned(Team),
    /// No opponent will ever fill this side.
    Bye,
    /// Waiting on the winner of an earlier match.
    #[default]
    Pending,
}

impl TeamSlot {
    pub fn team(&self) -> Option<&Team> {
        match self {
            TeamSlot::Assigned(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_bye(&self) -> bool {
        matches!(self, TeamSlot::Bye)
    }
}

/// Phase of the tournament this match belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Group,
    Elimination,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub team_1: u32,
    pub team_2: u32,
}

impl Score {
    pub fn new(team_1: u32, team_2: u32) -> Self {
        Self { team_1, team_2 }
    }

    /// Higher score wins; `None` on a tie.
    pub fn winner(&self) -> Option<Side> {
        match self.team_1.cmp(&self.team_2) {
            std::cmp::Ordering::Greater => Some(Side::One),
            std::cmp::Ordering::Less => Some(Side::Two),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn for_side(&self, side: Side) -> u32 {
        match side {
            Side::One => self.team_1,
            Side::Two => self.team_2,
        }
    }
}

/// A court booking.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CourtSlot {
    pub court_id: CourtId,
    pub scheduled_time: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub score: Score,
    pub winner: Side,
    /// Booking the match was played on, if it was scheduled.
    pub slot: Option<CourtSlot>,
    /// Completed by organizer override rather than play.
    #[serde(default)]
    pub forced_bye: bool,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum MatchStatus {
    #[default]
    Unscheduled,
    Scheduled(CourtSlot),
    Completed(MatchResult),
    /// Opponent slot was a BYE; completed without a score.
    ByeCompleted { winner: Side },
}

/// Flat lifecycle state, for display and guards.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchState {
    Unscheduled,
    Scheduled,
    Completed,
    ByeCompleted,
}

/// A single match between two team slots.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub stage: Stage,
    pub round: u32,
    /// Group number (group stage only).
    pub group: Option<u32>,
    pub team_1: TeamSlot,
    pub team_2: TeamSlot,
    pub status: MatchStatus,
    /// Group stage: global 1-based order. Elimination: 0-based slot within the round.
    pub position: u32,
    /// Optimistic-locking token; bumped on every transition.
    #[serde(default)]
    pub version: u64,
}

impl GameMatch {
    pub fn new(
        tournament_id: TournamentId,
        stage: Stage,
        round: u32,
        team_1: TeamSlot,
        team_2: TeamSlot,
        position: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            stage,
            round,
            group: None,
            team_1,
            team_2,
            status: MatchStatus::Unscheduled,
            position,
            version: 0,
        }
    }

    pub fn in_group(mut self, group: u32) -> Self {
        self.group = Some(group);
        self
    }

    pub fn state(&self) -> MatchState {
        match self.status {
            MatchStatus::Unscheduled => MatchState::Unscheduled,
            MatchStatus::Scheduled(_) => MatchState::Scheduled,
            MatchStatus::Completed(_) => MatchState::Completed,
            MatchStatus::ByeCompleted { .. } => MatchState::ByeCompleted,
        }
    }

    pub fn slot(&self, side: Side) -> &TeamSlot {
        match side {
            Side::One => &self.team_1,
            Side::Two => &self.team_2,
        }
    }

    pub fn slot_mut(&mut self, side: Side) -> &mut TeamSlot {
        match side {
            Side::One => &mut self.team_1,
            Side::Two => &mut self.team_2,
        }
    }

    /// Both sides hold a real team.
    pub fn is_ready(&self) -> bool {
        self.team_1.team().is_some() && self.team_2.team().is_some()
    }

    pub fn is_completed(&self) -> bool {
        matches!(
            self.status,
            MatchStatus::Completed(_) | MatchStatus::ByeCompleted { .. }
        )
    }

    /// Scheduled, played or overridden. Automatic byes don't count.
    pub fn has_begun(&self) -> bool {
        matches!(
            self.status,
            MatchStatus::Scheduled(_) | MatchStatus::Completed(_)
        )
    }

    pub fn score(&self) -> Option<Score> {
        match self.status {
            MatchStatus::Completed(r) => Some(r.score),
            _ => None,
        }
    }

    pub fn winner_side(&self) -> Option<Side> {
        match self.status {
            MatchStatus::Completed(r) => Some(r.winner),
            MatchStatus::ByeCompleted { winner } => Some(winner),
            _ => None,
        }
    }

    pub fn winner(&self) -> Option<&Team> {
        self.winner_side().and_then(|side| self.slot(side).team())
    }

    pub fn loser(&self) -> Option<&Team> {
        self.winner_side().and_then(|side| self.slot(side.other()).team())
    }

    /// Current or historical booking.
    pub fn court_slot(&self) -> Option<CourtSlot> {
        match self.status {
            MatchStatus::Scheduled(slot) => Some(slot),
            MatchStatus::Completed(r) => r.slot,
            _ => None,
        }
    }

    pub fn court_id(&self) -> Option<CourtId> {
        self.court_slot().map(|s| s.court_id)
    }

    pub fn scheduled_time(&self) -> Option<DateTime<Utc>> {
        self.court_slot().map(|s| s.scheduled_time)
    }

    pub(crate) fn touch(&mut self) {
        self.version += 1;
    }
}

/// Unique identifier for a group.
pub type GroupId = Uuid;

/// A round-robin group.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    /// 1-based ordinal.
    pub number: u32,
    pub teams: Vec<Team>,
}

impl Group {
    pub fn new(number: u32, teams: Vec<Team>) -> Self {
        Self {
            id: Uuid::new_v4(),
            number,
            teams,
        }
    }
}
