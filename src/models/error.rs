//! TournamentError and the coarse ErrorKind callers use to pick a response.

use crate::models::court::CourtId;
use crate::models::game::MatchId;
use crate::models::participant::ParticipantId;
use crate::models::tournament::{EventId, TournamentStage};
use serde::Serialize;
use uuid::Uuid;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum TournamentError {
    /// A participant appears in more than one team.
    #[error("Participant {participant_id} appears in more than one team")]
    DuplicateParticipant { participant_id: ParticipantId },
    /// Scores must produce a winner.
    #[error("Match {match_id}: score {score_1}-{score_2} is a tie")]
    InvalidScore {
        match_id: MatchId,
        score_1: u32,
        score_2: u32,
    },
    #[error("Group size must be at least 2 (got {0})")]
    InvalidGroupSize(usize),
    #[error("A team must have 1 or 2 members (got {0})")]
    InvalidTeamSize(usize),
    #[error("Need at least {required} teams (have {available})")]
    NotEnoughTeams { required: usize, available: usize },
    #[error("No schedulable courts available")]
    NoCourts,
    #[error("Slot duration must be positive")]
    InvalidSlotDuration,

    #[error("Match {match_id} is already completed")]
    MatchAlreadyCompleted { match_id: MatchId },
    /// Forced byes only apply to untouched matches with both teams present.
    #[error("Match {match_id} is not eligible for a bye")]
    MatchNotEligibleForBye { match_id: MatchId },
    #[error("Match {match_id} must be scheduled before a result is recorded")]
    MatchNotScheduled { match_id: MatchId },
    /// One or both sides are still waiting on an earlier match.
    #[error("Match {match_id} does not have both teams yet")]
    MatchNotReady { match_id: MatchId },
    #[error("Matches have already been scheduled or played; the group stage cannot be regenerated")]
    StageAlreadyStarted,
    #[error("Bracket matches have already been scheduled or played")]
    BracketAlreadyStarted,
    #[error("Invalid tournament stage for this action ({stage:?})")]
    InvalidStage { stage: TournamentStage },

    /// The bracket has no match where a winner should advance to.
    #[error("Bracket has no match at round {round}, position {position}")]
    BracketSlotMissing { round: u32, position: u32 },

    #[error("Group stage has {pending} unfinished match(es)")]
    IncompleteStage { pending: usize },

    #[error("Court {court_id} is already booked by match {conflicting_match_id} at that time (match {match_id})")]
    CourtConflict {
        match_id: MatchId,
        court_id: CourtId,
        conflicting_match_id: MatchId,
    },
    #[error("Court {court_id} is not available for scheduling")]
    CourtUnavailable { court_id: CourtId },
    /// Version check failed on write; reload and retry.
    #[error("{entity_id} was modified concurrently (expected version {expected}, found {found})")]
    ConcurrentModification {
        entity_id: Uuid,
        expected: u64,
        found: u64,
    },

    #[error("Match {0} not found")]
    MatchNotFound(MatchId),
    #[error("Court {0} not found")]
    CourtNotFound(CourtId),
    #[error("No tournament for event {0}")]
    TournamentNotFound(EventId),
    #[error("Participant {0} not found")]
    ParticipantNotFound(ParticipantId),
}

/// Error taxonomy shared with callers (maps onto HTTP statuses in the web binary).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    StateConflict,
    PrerequisiteNotMet,
    ResourceConflict,
    NotFound,
}

impl TournamentError {
    pub fn kind(&self) -> ErrorKind {
        use TournamentError::*;
        match self {
            DuplicateParticipant { .. }
            | InvalidScore { .. }
            | InvalidGroupSize(_)
            | InvalidTeamSize(_)
            | NotEnoughTeams { .. }
            | NoCourts
            | InvalidSlotDuration => ErrorKind::Validation,
            MatchAlreadyCompleted { .. }
            | MatchNotEligibleForBye { .. }
            | MatchNotScheduled { .. }
            | MatchNotReady { .. }
            | StageAlreadyStarted
            | BracketAlreadyStarted
            | InvalidStage { .. }
            | BracketSlotMissing { .. } => ErrorKind::StateConflict,
            IncompleteStage { .. } => ErrorKind::PrerequisiteNotMet,
            CourtConflict { .. } | CourtUnavailable { .. } | ConcurrentModification { .. } => {
                ErrorKind::ResourceConflict
            }
            MatchNotFound(_) | CourtNotFound(_) | TournamentNotFound(_) | ParticipantNotFound(_) => {
                ErrorKind::NotFound
            }
        }
    }
}
