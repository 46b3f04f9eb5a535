//! Data structures for the court tournament: participants, teams, matches, courts, tournament state.

mod court;
mod error;
mod game;
mod participant;
mod tournament;

pub use court::{Court, CourtId, CourtStatus};
pub use error::{ErrorKind, TournamentError};
pub use game::{
    CourtSlot, GameMatch, Group, GroupId, MatchId, MatchResult, MatchState, MatchStatus, Score,
    Side, Stage, Team, TeamSlot,
};
pub use participant::{link_partners, unlink_partner, Participant, ParticipantId, RegistrationStatus};
pub use tournament::{EventId, TeamFormationMode, Tournament, TournamentId, TournamentStage};
