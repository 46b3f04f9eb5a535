//! Persistence collaborator: the calls the engine makes to load and save records, plus an
//! in-memory implementation with version-checked writes.

use crate::models::{
    Court, EventId, GameMatch, Participant, Tournament, TournamentError, TournamentId,
};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Load/save operations the engine needs. Storage mechanics are the implementor's concern.
///
/// Writes are conditional: a stale version yields `ConcurrentModification` and writes nothing.
pub trait TournamentStore {
    fn load_participants(&self, event_id: EventId) -> Result<Vec<Participant>, TournamentError>;

    fn load_tournament(&self, event_id: EventId) -> Result<Tournament, TournamentError>;

    /// Bulk upsert after generation: groups, matches and stage replace the stored ones.
    /// Conditioned on the tournament version; returns the new version.
    fn save_matches(&self, tournament: &Tournament, expected_version: u64) -> Result<u64, TournamentError>;

    /// Write several updated matches at once. Each match's stored version must be exactly one
    /// behind the incoming one (or the stored record must already be identical).
    fn save_match_updates(&self, tournament_id: TournamentId, matches: &[GameMatch]) -> Result<(), TournamentError>;

    /// Single-match update (result, bye).
    fn save_match(&self, tournament_id: TournamentId, m: &GameMatch) -> Result<(), TournamentError> {
        self.save_match_updates(tournament_id, std::slice::from_ref(m))
    }

    /// Court bookings. Besides the per-match check, the tournament must still be at
    /// `expected_version`: the overlap check ran against that snapshot, and any booking made
    /// since could collide with these.
    fn save_bookings(
        &self,
        tournament_id: TournamentId,
        expected_version: u64,
        matches: &[GameMatch],
    ) -> Result<(), TournamentError>;

    fn load_courts(&self) -> Result<Vec<Court>, TournamentError>;
}

#[derive(Default)]
struct MemoryState {
    tournaments: HashMap<EventId, Tournament>,
    participants: HashMap<EventId, Vec<Participant>>,
    courts: Vec<Court>,
}

/// In-memory store shared by request handlers.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock only means another handler panicked mid-request; the data is still usable.
    fn read(&self) -> RwLockReadGuard<'_, MemoryState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a tournament for its event (replaces any previous one).
    pub fn insert_tournament(&self, tournament: Tournament) {
        self.write().tournaments.insert(tournament.event_id, tournament);
    }

    pub fn insert_participants(&self, event_id: EventId, participants: impl IntoIterator<Item = Participant>) {
        self.write()
            .participants
            .entry(event_id)
            .or_default()
            .extend(participants);
    }

    /// Edit an event's roster in place (partner invites, status changes).
    pub fn update_participants<T>(
        &self,
        event_id: EventId,
        f: impl FnOnce(&mut [Participant]) -> Result<T, TournamentError>,
    ) -> Result<T, TournamentError> {
        let mut state = self.write();
        let roster = state.participants.entry(event_id).or_default();
        f(roster.as_mut_slice())
    }

    pub fn insert_court(&self, court: Court) {
        self.write().courts.push(court);
    }
}

impl TournamentStore for MemoryStore {
    fn load_participants(&self, event_id: EventId) -> Result<Vec<Participant>, TournamentError> {
        Ok(self.read().participants.get(&event_id).cloned().unwrap_or_default())
    }

    fn load_tournament(&self, event_id: EventId) -> Result<Tournament, TournamentError> {
        self.read()
            .tournaments
            .get(&event_id)
            .cloned()
            .ok_or(TournamentError::TournamentNotFound(event_id))
    }

    fn save_matches(&self, tournament: &Tournament, expected_version: u64) -> Result<u64, TournamentError> {
        let mut state = self.write();
        let stored = state
            .tournaments
            .get_mut(&tournament.event_id)
            .ok_or(TournamentError::TournamentNotFound(tournament.event_id))?;
        if stored.version != expected_version {
            log::warn!(
                "Rejected bulk write to tournament {}: version {} != {}",
                stored.id,
                stored.version,
                expected_version
            );
            return Err(TournamentError::ConcurrentModification {
                entity_id: stored.id,
                expected: expected_version,
                found: stored.version,
            });
        }
        stored.groups = tournament.groups.clone();
        stored.matches = tournament.matches.clone();
        stored.stage = tournament.stage;
        stored.version = expected_version + 1;
        Ok(stored.version)
    }

    fn save_match_updates(&self, tournament_id: TournamentId, matches: &[GameMatch]) -> Result<(), TournamentError> {
        let mut state = self.write();
        write_matches(stored_by_id(&mut state, tournament_id)?, matches)
    }

    fn save_bookings(
        &self,
        tournament_id: TournamentId,
        expected_version: u64,
        matches: &[GameMatch],
    ) -> Result<(), TournamentError> {
        let mut state = self.write();
        let stored = stored_by_id(&mut state, tournament_id)?;
        if stored.version != expected_version {
            log::warn!(
                "Rejected booking on tournament {}: version {} != {}",
                stored.id,
                stored.version,
                expected_version
            );
            return Err(TournamentError::ConcurrentModification {
                entity_id: stored.id,
                expected: expected_version,
                found: stored.version,
            });
        }
        write_matches(stored, matches)
    }

    fn load_courts(&self) -> Result<Vec<Court>, TournamentError> {
        Ok(self.read().courts.clone())
    }
}

fn stored_by_id(state: &mut MemoryState, tournament_id: TournamentId) -> Result<&mut Tournament, TournamentError> {
    state
        .tournaments
        .values_mut()
        .find(|t| t.id == tournament_id)
        .ok_or(TournamentError::TournamentNotFound(tournament_id))
}

/// Version-check every match, then write them all. Nothing is written on a conflict.
fn write_matches(stored: &mut Tournament, matches: &[GameMatch]) -> Result<(), TournamentError> {
    for m in matches {
        let current = stored.get_match(m.id)?;
        if current == m {
            continue;
        }
        if current.version + 1 != m.version {
            log::warn!(
                "Rejected write to match {}: stored version {}, incoming {}",
                m.id,
                current.version,
                m.version
            );
            return Err(TournamentError::ConcurrentModification {
                entity_id: m.id,
                expected: m.version.saturating_sub(1),
                found: current.version,
            });
        }
    }
    let mut changed = false;
    for m in matches {
        let slot = stored.get_match_mut(m.id)?;
        if slot != m {
            *slot = m.clone();
            changed = true;
        }
    }
    // A bulk write or booking based on a snapshot from before this update must fail.
    if changed {
        stored.version += 1;
        stored.refresh_stage();
    }
    Ok(())
}
