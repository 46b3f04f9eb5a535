//! Integration tests for the elimination bracket: seeding, byes, advancement, guards.

use court_tournament_web::{
    build_elimination_bracket, generate_group_stage, record_match_result, schedule, GameMatch,
    MatchState, Side, Stage, Team, TeamFormationMode, TeamSlot, Tournament, TournamentError,
    TournamentStage,
};
use chrono::Utc;
use uuid::Uuid;

fn teams(n: usize) -> Vec<Team> {
    (0..n).map(|_| Team::single(Uuid::new_v4())).collect()
}

fn new_tournament() -> Tournament {
    Tournament::new(Uuid::new_v4(), TeamFormationMode::Super8)
}

fn bracket_match(t: &Tournament, round: u32, position: u32) -> &GameMatch {
    t.matches_in(Stage::Elimination)
        .find(|m| m.round == round && m.position == position)
        .unwrap()
}

/// Schedule and play a ready elimination match, team 1 winning.
fn play(t: &mut Tournament, round: u32, position: u32) {
    let id = bracket_match(t, round, position).id;
    schedule(t.get_match_mut(id).unwrap(), Uuid::new_v4(), Utc::now()).unwrap();
    record_match_result(t, id, 2, 0, true).unwrap();
}

#[test]
fn five_seeds_get_three_byes_and_top_seed_auto_advances() {
    let seeds = teams(5);
    let mut t = new_tournament();
    build_elimination_bracket(&mut t, seeds.clone()).unwrap();

    assert_eq!(t.stage, TournamentStage::Elimination);
    assert_eq!(t.matches_in(Stage::Elimination).count(), 7);
    let round_1: Vec<_> = t
        .matches_in(Stage::Elimination)
        .filter(|m| m.round == 1)
        .collect();
    assert_eq!(round_1.len(), 4);
    assert_eq!(
        round_1
            .iter()
            .filter(|m| m.team_1.is_bye() || m.team_2.is_bye())
            .count(),
        3
    );

    // 1 v 8 (bye): completed without a score.
    let first = bracket_match(&t, 1, 0);
    assert_eq!(first.team_1, TeamSlot::Assigned(seeds[0].clone()));
    assert_eq!(first.team_2, TeamSlot::Bye);
    assert_eq!(first.state(), MatchState::ByeCompleted);
    assert_eq!(first.score(), None);
    assert_eq!(first.winner(), Some(&seeds[0]));

    // 4 v 5 is the only real first-round match.
    let real = bracket_match(&t, 1, 1);
    assert_eq!(real.team_1, TeamSlot::Assigned(seeds[3].clone()));
    assert_eq!(real.team_2, TeamSlot::Assigned(seeds[4].clone()));
    assert_eq!(real.state(), MatchState::Unscheduled);

    // Seeds 1, 2 and 3 already sit in round 2.
    let semi_top = bracket_match(&t, 2, 0);
    assert_eq!(semi_top.team_1, TeamSlot::Assigned(seeds[0].clone()));
    assert_eq!(semi_top.team_2, TeamSlot::Pending);
    let semi_bottom = bracket_match(&t, 2, 1);
    assert_eq!(semi_bottom.team_1, TeamSlot::Assigned(seeds[1].clone()));
    assert_eq!(semi_bottom.team_2, TeamSlot::Assigned(seeds[2].clone()));

    // Automatic byes are not "started".
    assert!(!t.stage_started(Stage::Elimination));
}

#[test]
fn winners_advance_until_the_final_completes_the_tournament() {
    let seeds = teams(4);
    let mut t = new_tournament();
    build_elimination_bracket(&mut t, seeds.clone()).unwrap();

    play(&mut t, 1, 0); // 1 beats 4
    play(&mut t, 1, 1); // 2 beats 3
    let final_match = bracket_match(&t, 2, 0);
    assert_eq!(final_match.team_1, TeamSlot::Assigned(seeds[0].clone()));
    assert_eq!(final_match.team_2, TeamSlot::Assigned(seeds[1].clone()));
    assert_eq!(t.stage, TournamentStage::Elimination);

    play(&mut t, 2, 0);
    assert_eq!(t.stage, TournamentStage::Completed);
    assert_eq!(t.final_match().and_then(|m| m.winner()), Some(&seeds[0]));
}

#[test]
fn result_on_match_waiting_for_a_team_is_refused() {
    let mut t = new_tournament();
    build_elimination_bracket(&mut t, teams(4)).unwrap();
    let id = bracket_match(&t, 2, 0).id;
    schedule(t.get_match_mut(id).unwrap(), Uuid::new_v4(), Utc::now()).unwrap();
    assert_eq!(
        record_match_result(&mut t, id, 2, 1, true),
        Err(TournamentError::MatchNotReady { match_id: id })
    );
}

#[test]
fn requires_finished_group_stage() {
    let ts = teams(4);
    let mut t = new_tournament();
    generate_group_stage(&mut t, ts.clone(), 4).unwrap();
    assert_eq!(
        build_elimination_bracket(&mut t, ts.clone()),
        Err(TournamentError::IncompleteStage { pending: 6 })
    );

    let ids: Vec<_> = t.matches.iter().map(|m| m.id).collect();
    for id in ids {
        schedule(t.get_match_mut(id).unwrap(), Uuid::new_v4(), Utc::now()).unwrap();
        record_match_result(&mut t, id, 2, 1, true).unwrap();
    }
    build_elimination_bracket(&mut t, ts).unwrap();
    assert_eq!(t.stage, TournamentStage::Elimination);
    assert_eq!(t.matches_in(Stage::Group).count(), 6);
}

#[test]
fn regeneration_allowed_until_a_bracket_match_begins() {
    let mut t = new_tournament();
    build_elimination_bracket(&mut t, teams(4)).unwrap();
    build_elimination_bracket(&mut t, teams(8)).unwrap();
    assert_eq!(t.matches_in(Stage::Elimination).count(), 7);

    let id = bracket_match(&t, 1, 0).id;
    schedule(t.get_match_mut(id).unwrap(), Uuid::new_v4(), Utc::now()).unwrap();
    assert_eq!(
        build_elimination_bracket(&mut t, teams(4)),
        Err(TournamentError::BracketAlreadyStarted)
    );
    assert!(!t.is_open_for_registration());
}

#[test]
fn forced_bye_in_bracket_advances_the_chosen_side() {
    let seeds = teams(4);
    let mut t = new_tournament();
    build_elimination_bracket(&mut t, seeds.clone()).unwrap();
    let id = bracket_match(&t, 1, 1).id;

    let outcome = court_tournament_web::assign_match_bye(&mut t, id, Side::Two).unwrap();
    assert_eq!(outcome.changed.len(), 2);
    // Seed order for 4 slots is [1, 4, 2, 3]: position 1 is seed 2 v seed 3.
    assert_eq!(bracket_match(&t, 2, 0).team_2, TeamSlot::Assigned(seeds[2].clone()));
}

#[test]
fn needs_two_teams() {
    let mut t = new_tournament();
    assert_eq!(
        build_elimination_bracket(&mut t, teams(1)),
        Err(TournamentError::NotEnoughTeams {
            required: 2,
            available: 1
        })
    );
}

#[test]
fn missing_next_round_match_is_reported_by_slot() {
    let mut t = new_tournament();
    build_elimination_bracket(&mut t, teams(8)).unwrap();
    t.matches
        .retain(|m| !(m.stage == Stage::Elimination && m.round == 2 && m.position == 0));

    let id = bracket_match(&t, 1, 0).id;
    schedule(t.get_match_mut(id).unwrap(), Uuid::new_v4(), Utc::now()).unwrap();
    let before = t.clone();
    assert_eq!(
        record_match_result(&mut t, id, 2, 0, true),
        Err(TournamentError::BracketSlotMissing {
            round: 2,
            position: 0
        })
    );
    assert_eq!(t, before);
}
