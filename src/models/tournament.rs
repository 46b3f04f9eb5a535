//! Tournament aggregate and TournamentStage.

use crate::models::error::TournamentError;
use crate::models::game::{GameMatch, Group, MatchId, Stage};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// The event a tournament is run for (registration, courts and payments hang off it).
pub type EventId = Uuid;

/// Current phase of the tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentStage {
    /// Registering participants; no matches yet.
    #[default]
    Setup,
    /// Round-robin groups generated.
    GroupStage,
    /// Bracket generated.
    Elimination,
    /// Final match decided.
    Completed,
}

/// How registered participants become teams.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeamFormationMode {
    /// Participants registered with a confirmed partner.
    #[default]
    Formed,
    /// Confirmed participants are shuffled into pairs.
    Random,
    /// Individual play: every team has one member.
    Super8,
    /// Pairs supplied by the organizer.
    Manual,
}

/// Full tournament state: groups, matches and phase.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub event_id: EventId,
    #[serde(default)]
    pub formation: TeamFormationMode,
    pub groups: Vec<Group>,
    pub matches: Vec<GameMatch>,
    pub stage: TournamentStage,
    /// Optimistic-locking token for bulk writes.
    #[serde(default)]
    pub version: u64,
}

impl Tournament {
    /// Create a new tournament in Setup state with no matches.
    pub fn new(event_id: EventId, formation: TeamFormationMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            formation,
            groups: Vec::new(),
            matches: Vec::new(),
            stage: TournamentStage::Setup,
            version: 0,
        }
    }

    pub fn get_match(&self, id: MatchId) -> Result<&GameMatch, TournamentError> {
        self.matches
            .iter()
            .find(|m| m.id == id)
            .ok_or(TournamentError::MatchNotFound(id))
    }

    pub fn get_match_mut(&mut self, id: MatchId) -> Result<&mut GameMatch, TournamentError> {
        self.matches
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(TournamentError::MatchNotFound(id))
    }

    pub fn matches_in(&self, stage: Stage) -> impl Iterator<Item = &GameMatch> {
        self.matches.iter().filter(move |m| m.stage == stage)
    }

    /// Clones of the given matches, in tournament order.
    pub fn matches_by_ids(&self, ids: &[MatchId]) -> Vec<GameMatch> {
        self.matches
            .iter()
            .filter(|m| ids.contains(&m.id))
            .cloned()
            .collect()
    }

    /// Any match scheduled or played. Gates registration and group regeneration.
    pub fn has_started(&self) -> bool {
        self.matches.iter().any(GameMatch::has_begun)
    }

    /// Same predicate restricted to one stage. Gates bracket regeneration.
    pub fn stage_started(&self, stage: Stage) -> bool {
        self.matches_in(stage).any(GameMatch::has_begun)
    }

    pub fn has_bracket(&self) -> bool {
        self.matches_in(Stage::Elimination).next().is_some()
    }

    /// New registrations and team changes are only accepted until play begins.
    pub fn is_open_for_registration(&self) -> bool {
        !self.has_started() && !self.has_bracket()
    }

    pub fn pending_group_matches(&self) -> usize {
        self.matches_in(Stage::Group)
            .filter(|m| !m.is_completed())
            .count()
    }

    pub fn group_stage_complete(&self) -> bool {
        self.pending_group_matches() == 0
    }

    /// Number of elimination rounds (0 without a bracket).
    pub fn elimination_rounds(&self) -> u32 {
        self.matches_in(Stage::Elimination)
            .map(|m| m.round)
            .max()
            .unwrap_or(0)
    }

    /// The final elimination match, if a bracket exists.
    pub fn final_match(&self) -> Option<&GameMatch> {
        let last = self.elimination_rounds();
        self.matches_in(Stage::Elimination)
            .find(|m| last > 0 && m.round == last)
    }

    /// Move to Completed once the final is decided.
    pub fn refresh_stage(&mut self) {
        if self.stage == TournamentStage::Elimination
            && self.final_match().is_some_and(GameMatch::is_completed)
        {
            self.stage = TournamentStage::Completed;
        }
    }
}
