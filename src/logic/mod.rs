//! Tournament engine: team formation, group stage, standings, bracket, match lifecycle, courts.

mod bracket;
mod group_stage;
mod match_state;
mod results;
mod scheduler;
mod standings;
mod team_formation;

pub use bracket::{advance_winner, bracket_size, build_elimination_bracket, seeding_order};
pub use group_stage::generate_group_stage;
pub use match_state::{assign_bye, complete_bye, record_result, schedule};
pub use results::{assign_match_bye, record_match_result, ResultOutcome};
pub use scheduler::{
    apply_assignments, assign, auto_schedule, auto_schedule_tournament, find_conflict,
    unscheduled_matches, Assignment,
};
pub use standings::{
    calculate_standings, collect_qualifiers, group_standings, ranking_index, StandingEntry,
};
pub use team_formation::{form_teams, validate_teams, TeamFormation};
