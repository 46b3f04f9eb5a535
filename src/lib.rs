//! Court tournament engine: teams, round-robin groups, standings, elimination bracket and
//! court scheduling, with a web binary on top.

pub mod config;
pub mod logic;
pub mod models;
pub mod roster;
pub mod service;
pub mod store;

pub use config::EngineConfig;
pub use logic::{
    advance_winner, apply_assignments, assign, assign_bye, assign_match_bye, auto_schedule,
    auto_schedule_tournament, bracket_size, build_elimination_bracket, calculate_standings,
    collect_qualifiers, complete_bye, find_conflict, form_teams, generate_group_stage,
    group_standings, ranking_index, record_match_result, record_result, schedule, seeding_order,
    unscheduled_matches, validate_teams, Assignment, ResultOutcome, StandingEntry, TeamFormation,
};
pub use models::{
    link_partners, unlink_partner, Court, CourtId, CourtSlot, CourtStatus, ErrorKind, EventId,
    GameMatch, Group, GroupId, MatchId, MatchResult, MatchState, MatchStatus, Participant,
    ParticipantId, RegistrationStatus, Score, Side, Stage, Team, TeamFormationMode, TeamSlot,
    Tournament, TournamentError, TournamentId, TournamentStage,
};
pub use roster::{parse_participants, RosterError};
pub use service::TournamentService;
pub use store::{MemoryStore, TournamentStore};
