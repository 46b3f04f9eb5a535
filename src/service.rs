//! Tournament service: every mutating call loads a snapshot, applies the engine transition and
//! writes back conditioned on the version it read. Conflicts surface as
//! `ConcurrentModification`; retrying is up to the caller.

use crate::config::EngineConfig;
use crate::logic::{self, Assignment, ResultOutcome, StandingEntry, TeamFormation};
use crate::models::{CourtId, EventId, MatchId, Side, Team, Tournament, TournamentError};
use crate::store::TournamentStore;
use chrono::{DateTime, Utc};
use rand::Rng;

pub struct TournamentService<S> {
    store: S,
    config: EngineConfig,
}

impl<S: TournamentStore> TournamentService<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tournament(&self, event_id: EventId) -> Result<Tournament, TournamentError> {
        self.store.load_tournament(event_id)
    }

    /// Teams for the event's formation mode, from the current roster.
    pub fn form_teams<R: Rng + ?Sized>(
        &self,
        event_id: EventId,
        manual_teams: &[Team],
        rng: &mut R,
    ) -> Result<TeamFormation, TournamentError> {
        let tournament = self.store.load_tournament(event_id)?;
        let participants = self.store.load_participants(event_id)?;
        logic::form_teams(&participants, tournament.formation, manual_teams, rng)
    }

    /// Generate (or fully replace) the group stage. `group_size` defaults to the config value.
    pub fn generate_group_stage(
        &self,
        event_id: EventId,
        teams: Vec<Team>,
        group_size: Option<usize>,
    ) -> Result<Tournament, TournamentError> {
        let mut tournament = self.store.load_tournament(event_id)?;
        let expected = tournament.version;
        logic::generate_group_stage(
            &mut tournament,
            teams,
            group_size.unwrap_or(self.config.default_group_size),
        )?;
        tournament.version = self.store.save_matches(&tournament, expected)?;
        Ok(tournament)
    }

    pub fn standings(&self, event_id: EventId) -> Result<Vec<(u32, Vec<StandingEntry>)>, TournamentError> {
        let tournament = self.store.load_tournament(event_id)?;
        let participants = self.store.load_participants(event_id)?;
        Ok(logic::group_standings(
            &tournament,
            &participants,
            self.config.points_per_win,
        ))
    }

    /// Build the bracket. Without explicit seeds, the top finishers of each group qualify.
    pub fn build_bracket(
        &self,
        event_id: EventId,
        seeds: Option<Vec<Team>>,
    ) -> Result<Tournament, TournamentError> {
        let mut tournament = self.store.load_tournament(event_id)?;
        let expected = tournament.version;
        let qualified = match seeds {
            Some(seeds) => seeds,
            None => {
                let participants = self.store.load_participants(event_id)?;
                let standings =
                    logic::group_standings(&tournament, &participants, self.config.points_per_win);
                logic::collect_qualifiers(&standings, self.config.qualifiers_per_group)
            }
        };
        logic::build_elimination_bracket(&mut tournament, qualified)?;
        tournament.version = self.store.save_matches(&tournament, expected)?;
        Ok(tournament)
    }

    /// Manually book a court and time for a match.
    pub fn schedule_match(
        &self,
        event_id: EventId,
        match_id: MatchId,
        court_id: CourtId,
        time: DateTime<Utc>,
    ) -> Result<(), TournamentError> {
        let mut tournament = self.store.load_tournament(event_id)?;
        let expected = tournament.version;
        let courts = self.store.load_courts()?;
        logic::assign(
            &mut tournament,
            &courts,
            match_id,
            court_id,
            time,
            self.config.match_duration(),
        )?;
        self.store
            .save_bookings(tournament.id, expected, &tournament.matches_by_ids(&[match_id]))
    }

    /// Book every unscheduled match from `start_time` on, around the existing bookings.
    pub fn auto_schedule(
        &self,
        event_id: EventId,
        start_time: DateTime<Utc>,
    ) -> Result<Vec<Assignment>, TournamentError> {
        let mut tournament = self.store.load_tournament(event_id)?;
        let expected = tournament.version;
        if logic::unscheduled_matches(&tournament).is_empty() {
            return Ok(Vec::new());
        }
        let courts = self.store.load_courts()?;
        let assignments = logic::auto_schedule_tournament(
            &tournament,
            &courts,
            start_time,
            self.config.slot_duration(),
            self.config.match_duration(),
        )?;
        logic::apply_assignments(&mut tournament, &assignments, self.config.match_duration())?;

        let ids: Vec<MatchId> = assignments.iter().map(|a| a.match_id).collect();
        self.store
            .save_bookings(tournament.id, expected, &tournament.matches_by_ids(&ids))?;
        log::info!(
            "Auto-scheduled {} match(es) for event {} from {}",
            assignments.len(),
            event_id,
            start_time
        );
        Ok(assignments)
    }

    pub fn record_result(
        &self,
        event_id: EventId,
        match_id: MatchId,
        score_1: u32,
        score_2: u32,
    ) -> Result<ResultOutcome, TournamentError> {
        let mut tournament = self.store.load_tournament(event_id)?;
        let outcome = logic::record_match_result(
            &mut tournament,
            match_id,
            score_1,
            score_2,
            self.config.require_schedule_before_result,
        )?;
        self.persist(&tournament, &outcome)?;
        Ok(outcome)
    }

    pub fn assign_bye(
        &self,
        event_id: EventId,
        match_id: MatchId,
        winner: Side,
    ) -> Result<ResultOutcome, TournamentError> {
        let mut tournament = self.store.load_tournament(event_id)?;
        let outcome = logic::assign_match_bye(&mut tournament, match_id, winner)?;
        self.persist(&tournament, &outcome)?;
        Ok(outcome)
    }

    pub fn is_open_for_registration(&self, event_id: EventId) -> Result<bool, TournamentError> {
        Ok(self.store.load_tournament(event_id)?.is_open_for_registration())
    }

    fn persist(&self, tournament: &Tournament, outcome: &ResultOutcome) -> Result<(), TournamentError> {
        if outcome.changed.is_empty() {
            return Ok(());
        }
        self.store
            .save_match_updates(tournament.id, &tournament.matches_by_ids(&outcome.changed))
    }
}
