//! End-to-end flow through `TournamentService` backed by `MemoryStore`.

use chrono::{DateTime, Duration, TimeZone, Utc};
use court_tournament_web::{
    assign, parse_participants, schedule, Court, EngineConfig, EventId, MatchState, MemoryStore,
    Stage, Team, TeamFormationMode, Tournament, TournamentError, TournamentService,
    TournamentStage, TournamentStore,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 6, hour, minute, 0).unwrap()
}

/// Sixteen players in eight mutual pairs: P0+P1, P2+P3, ...
fn roster_csv() -> String {
    let mut csv = String::from("name,email,phone,ranking,partner\n");
    for i in 0..16 {
        let partner = if i % 2 == 0 { i + 1 } else { i - 1 };
        csv.push_str(&format!("P{},,,{},P{}\n", i, 100 - i, partner));
    }
    csv
}

fn setup() -> (TournamentService<MemoryStore>, EventId) {
    let store = MemoryStore::new();
    let event_id = Uuid::new_v4();
    store.insert_tournament(Tournament::new(event_id, TeamFormationMode::Formed));
    store.insert_participants(event_id, parse_participants(roster_csv().as_bytes()).unwrap());
    store.insert_court(Court::new("Court 1"));
    store.insert_court(Court::new("Court 2"));
    (TournamentService::new(store, EngineConfig::default()), event_id)
}

fn formed_teams(service: &TournamentService<MemoryStore>, event_id: EventId) -> Vec<Team> {
    let mut rng = StdRng::seed_from_u64(7);
    service.form_teams(event_id, &[], &mut rng).unwrap().teams
}

/// Record 2-1 for team 1 on every match of `stage` that has both teams.
fn play_ready(service: &TournamentService<MemoryStore>, event_id: EventId, stage: Stage) -> usize {
    let t = service.tournament(event_id).unwrap();
    let ready: Vec<_> = t
        .matches_in(stage)
        .filter(|m| m.state() == MatchState::Scheduled && m.is_ready())
        .map(|m| m.id)
        .collect();
    for id in &ready {
        service.record_result(event_id, *id, 2, 1).unwrap();
    }
    ready.len()
}

#[test]
fn full_tournament_from_roster_to_champion() {
    let (service, event_id) = setup();
    assert!(service.is_open_for_registration(event_id).unwrap());

    let teams = formed_teams(&service, event_id);
    assert_eq!(teams.len(), 8);

    let t = service.generate_group_stage(event_id, teams.clone(), None).unwrap();
    assert_eq!(t.groups.len(), 2);
    assert_eq!(t.matches_in(Stage::Group).count(), 12);
    assert_eq!(t.stage, TournamentStage::GroupStage);

    // Bracket before the groups are done is refused.
    assert_eq!(
        service.build_bracket(event_id, None).unwrap_err(),
        TournamentError::IncompleteStage { pending: 12 }
    );

    let plan = service.auto_schedule(event_id, at(9, 0)).unwrap();
    assert_eq!(plan.len(), 12);
    assert!(!service.is_open_for_registration(event_id).unwrap());
    // Nothing left to book.
    assert!(service.auto_schedule(event_id, at(9, 0)).unwrap().is_empty());

    assert_eq!(play_ready(&service, event_id, Stage::Group), 12);

    let standings = service.standings(event_id).unwrap();
    assert_eq!(standings.len(), 2);
    for (_, table) in &standings {
        let points: Vec<u32> = table.iter().map(|e| e.points).collect();
        assert_eq!(points, vec![9, 6, 3, 0]);
        assert!(table.iter().all(|e| e.average_ranking.is_some()));
    }
    // Group 1 holds the first four teams in roster order.
    assert_eq!(standings[0].1[0].team, teams[0]);

    let t = service.build_bracket(event_id, None).unwrap();
    assert_eq!(t.stage, TournamentStage::Elimination);
    assert_eq!(t.matches_in(Stage::Elimination).count(), 3);
    let first_round: Vec<_> = t
        .matches_in(Stage::Elimination)
        .filter(|m| m.round == 1)
        .collect();
    // Winner of group 1 meets the runner-up of group 2.
    assert_eq!(first_round[0].team_1.team(), Some(&standings[0].1[0].team));
    assert_eq!(first_round[0].team_2.team(), Some(&standings[1].1[1].team));

    let plan = service.auto_schedule(event_id, at(13, 0)).unwrap();
    assert_eq!(plan.len(), 3);

    assert_eq!(play_ready(&service, event_id, Stage::Elimination), 2);
    assert_eq!(play_ready(&service, event_id, Stage::Elimination), 1);

    let t = service.tournament(event_id).unwrap();
    assert_eq!(t.stage, TournamentStage::Completed);
    assert_eq!(
        t.final_match().and_then(|m| m.winner()),
        Some(&standings[0].1[0].team)
    );
}

#[test]
fn regenerating_groups_after_play_started_is_refused() {
    let (service, event_id) = setup();
    let teams = formed_teams(&service, event_id);
    service.generate_group_stage(event_id, teams.clone(), Some(4)).unwrap();
    service.generate_group_stage(event_id, teams.clone(), Some(2)).unwrap();
    service.auto_schedule(event_id, at(9, 0)).unwrap();
    assert_eq!(
        service.generate_group_stage(event_id, teams, None).unwrap_err(),
        TournamentError::StageAlreadyStarted
    );
}

#[test]
fn repeated_result_is_a_no_op() {
    let (service, event_id) = setup();
    let teams = formed_teams(&service, event_id);
    service.generate_group_stage(event_id, teams, None).unwrap();
    service.auto_schedule(event_id, at(9, 0)).unwrap();
    let id = service.tournament(event_id).unwrap().matches[0].id;

    let first = service.record_result(event_id, id, 3, 1).unwrap();
    assert_eq!(first.changed, vec![id]);
    let version = service.tournament(event_id).unwrap().version;

    let again = service.record_result(event_id, id, 3, 1).unwrap();
    assert_eq!(again.winner, first.winner);
    assert!(again.changed.is_empty());
    assert_eq!(service.tournament(event_id).unwrap().version, version);

    assert_eq!(
        service.record_result(event_id, id, 1, 3).unwrap_err(),
        TournamentError::MatchAlreadyCompleted { match_id: id }
    );
}

#[test]
fn stale_bulk_write_is_rejected() {
    let (service, event_id) = setup();
    let teams = formed_teams(&service, event_id);
    service.generate_group_stage(event_id, teams.clone(), None).unwrap();

    let stale = service.tournament(event_id).unwrap();
    service.auto_schedule(event_id, at(9, 0)).unwrap();

    let err = service
        .store()
        .save_matches(&stale, stale.version)
        .unwrap_err();
    assert!(matches!(err, TournamentError::ConcurrentModification { .. }));
    // The scheduled matches survived.
    let current = service.tournament(event_id).unwrap();
    assert!(current.matches.iter().all(|m| m.state() == MatchState::Scheduled));
}

#[test]
fn stale_match_write_is_rejected() {
    let (service, event_id) = setup();
    let teams = formed_teams(&service, event_id);
    service.generate_group_stage(event_id, teams, None).unwrap();
    let t = service.tournament(event_id).unwrap();
    let mut stale = t.matches[0].clone();
    let court = service.store().load_courts().unwrap()[0].id;

    service.schedule_match(event_id, stale.id, court, at(9, 0)).unwrap();

    schedule(&mut stale, court, at(11, 0)).unwrap();
    let err = service.store().save_match(t.id, &stale).unwrap_err();
    assert_eq!(
        err,
        TournamentError::ConcurrentModification {
            entity_id: stale.id,
            expected: 0,
            found: 1,
        }
    );
    let stored = service.tournament(event_id).unwrap();
    assert_eq!(stored.get_match(stale.id).unwrap().scheduled_time(), Some(at(9, 0)));
}

#[test]
fn unknown_event_is_not_found() {
    let (service, _) = setup();
    let missing = Uuid::new_v4();
    let err = service.tournament(missing).unwrap_err();
    assert_eq!(err, TournamentError::TournamentNotFound(missing));
    assert_eq!(err.kind(), court_tournament_web::ErrorKind::NotFound);
}

#[test]
fn config_from_lookup_overrides_defaults() {
    let config = EngineConfig::from_lookup(|key| match key {
        "ENGINE_POINTS_PER_WIN" => Some("2".to_string()),
        "ENGINE_REQUIRE_SCHEDULE" => Some("false".to_string()),
        _ => None,
    });
    assert_eq!(config.points_per_win, 2);
    assert!(!config.require_schedule_before_result);
    assert_eq!(config.default_group_size, 4);
}

#[test]
fn bookings_from_stale_snapshots_cannot_share_a_court() {
    let (service, event_id) = setup();
    let teams = formed_teams(&service, event_id);
    service.generate_group_stage(event_id, teams, None).unwrap();
    let courts = service.store().load_courts().unwrap();
    let court = courts[0].id;
    let half_hour = Duration::minutes(30);

    let mut first = service.tournament(event_id).unwrap();
    let mut second = service.tournament(event_id).unwrap();
    let (a, b) = (first.matches[0].id, first.matches[1].id);
    assign(&mut first, &courts, a, court, at(9, 0), half_hour).unwrap();
    assign(&mut second, &courts, b, court, at(9, 0), half_hour).unwrap();

    service
        .store()
        .save_bookings(first.id, first.version, &first.matches_by_ids(&[a]))
        .unwrap();
    assert_eq!(
        service
            .store()
            .save_bookings(second.id, second.version, &second.matches_by_ids(&[b]))
            .unwrap_err(),
        TournamentError::ConcurrentModification {
            entity_id: second.id,
            expected: second.version,
            found: second.version + 1,
        }
    );

    // Retrying from a fresh snapshot sees the first booking.
    assert_eq!(
        service.schedule_match(event_id, b, court, at(9, 0)).unwrap_err(),
        TournamentError::CourtConflict {
            match_id: b,
            court_id: court,
            conflicting_match_id: a,
        }
    );
    let stored = service.tournament(event_id).unwrap();
    let on_court_at_nine = stored
        .matches
        .iter()
        .filter(|m| m.court_id() == Some(court) && m.scheduled_time() == Some(at(9, 0)))
        .count();
    assert_eq!(on_court_at_nine, 1);
}

#[test]
fn auto_schedule_fills_around_a_manual_booking() {
    let (service, event_id) = setup();
    let teams = formed_teams(&service, event_id);
    service.generate_group_stage(event_id, teams, None).unwrap();
    let court = service.store().load_courts().unwrap()[0].id;
    let manual = service.tournament(event_id).unwrap().matches[0].id;
    service.schedule_match(event_id, manual, court, at(9, 0)).unwrap();

    let plan = service.auto_schedule(event_id, at(9, 0)).unwrap();
    assert_eq!(plan.len(), 11);
    assert!(!plan
        .iter()
        .any(|a| a.court_id == court && a.scheduled_time == at(9, 0)));

    let t = service.tournament(event_id).unwrap();
    assert!(t.matches.iter().all(|m| m.state() == MatchState::Scheduled));
    let mut slots: Vec<_> = t.matches.iter().filter_map(|m| m.court_slot()).collect();
    let total = slots.len();
    slots.sort_by_key(|s| (s.court_id, s.scheduled_time));
    slots.dedup();
    assert_eq!(slots.len(), total);
}
