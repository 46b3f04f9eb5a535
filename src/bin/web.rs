//! Single binary web server: JSON API over the tournament engine with an in-memory store.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! Engine settings come from ENGINE_* variables (see `EngineConfig::from_env`).

use actix_web::{
    get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::{DateTime, Utc};
use court_tournament_web::{
    link_partners, parse_participants, unlink_partner, Court, EngineConfig, ErrorKind, EventId,
    MatchId, MemoryStore, Participant, ParticipantId, Side, StandingEntry, Team,
    TeamFormationMode, Tournament, TournamentError, TournamentService, TournamentStore,
};
use serde::{Deserialize, Serialize};

type AppState = Data<TournamentService<MemoryStore>>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    #[serde(default)]
    formation: TeamFormationMode,
}

#[derive(Deserialize)]
struct AddParticipantBody {
    name: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    ranking: Option<f64>,
}

#[derive(Deserialize)]
struct PartnerBody {
    /// `None` clears the link.
    partner_id: Option<ParticipantId>,
}

#[derive(Deserialize)]
struct AddCourtBody {
    name: String,
    #[serde(default)]
    location: Option<String>,
}

#[derive(Deserialize, Default)]
struct TeamsBody {
    #[serde(default)]
    teams: Vec<Team>,
}

#[derive(Deserialize, Default)]
struct GenerateGroupsBody {
    #[serde(default)]
    group_size: Option<usize>,
    /// Explicit teams; otherwise they are formed from the roster.
    #[serde(default)]
    teams: Option<Vec<Team>>,
}

#[derive(Deserialize, Default)]
struct BuildBracketBody {
    #[serde(default)]
    seeds: Option<Vec<Team>>,
}

#[derive(Deserialize)]
struct ScheduleBody {
    court_id: court_tournament_web::CourtId,
    time: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ResultBody {
    score_1: u32,
    score_2: u32,
}

#[derive(Deserialize)]
struct ByeBody {
    winner: Side,
}

#[derive(Deserialize)]
struct AutoScheduleBody {
    start_time: DateTime<Utc>,
}

#[derive(Serialize)]
struct GroupTable {
    group: u32,
    standings: Vec<StandingEntry>,
}

/// Path segment: event id (e.g. /api/events/{event_id})
#[derive(Deserialize)]
struct EventPath {
    event_id: EventId,
}

#[derive(Deserialize)]
struct EventMatchPath {
    event_id: EventId,
    match_id: MatchId,
}

#[derive(Deserialize)]
struct EventParticipantPath {
    event_id: EventId,
    participant_id: ParticipantId,
}

fn error_response(e: TournamentError) -> HttpResponse {
    let kind = e.kind();
    let mut builder = match kind {
        ErrorKind::Validation => HttpResponse::BadRequest(),
        ErrorKind::NotFound => HttpResponse::NotFound(),
        ErrorKind::StateConflict | ErrorKind::PrerequisiteNotMet | ErrorKind::ResourceConflict => {
            HttpResponse::Conflict()
        }
    };
    builder.json(serde_json::json!({ "error": e.to_string(), "kind": kind }))
}

fn respond<T: Serialize>(result: Result<T, TournamentError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(e),
    }
}

/// Registration is open until the tournament has started. No tournament yet counts as open.
fn ensure_registration_open(state: &AppState, event_id: EventId) -> Result<(), TournamentError> {
    match state.tournament(event_id) {
        Ok(t) if !t.is_open_for_registration() => Err(TournamentError::InvalidStage { stage: t.stage }),
        Ok(_) | Err(TournamentError::TournamentNotFound(_)) => Ok(()),
        Err(e) => Err(e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "court-tournament-web",
    })
}

/// Create (or reset, while nothing has started) the tournament for an event.
#[post("/api/events/{event_id}/tournament")]
async fn api_create_tournament(
    state: AppState,
    path: Path<EventPath>,
    body: Option<Json<CreateTournamentBody>>,
) -> HttpResponse {
    let formation = body.map(|b| b.formation).unwrap_or_default();
    respond(ensure_registration_open(&state, path.event_id).map(|()| {
        let tournament = Tournament::new(path.event_id, formation);
        state.store().insert_tournament(tournament.clone());
        log::info!("Created tournament {} for event {}", tournament.id, path.event_id);
        tournament
    }))
}

#[get("/api/events/{event_id}/tournament")]
async fn api_get_tournament(state: AppState, path: Path<EventPath>) -> HttpResponse {
    respond(state.tournament(path.event_id))
}

#[get("/api/events/{event_id}/participants")]
async fn api_list_participants(state: AppState, path: Path<EventPath>) -> HttpResponse {
    respond(state.store().load_participants(path.event_id))
}

/// Register a confirmed participant.
#[post("/api/events/{event_id}/participants")]
async fn api_add_participant(
    state: AppState,
    path: Path<EventPath>,
    body: Json<AddParticipantBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let name = body.name.trim();
    if name.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({ "error": "Name is required" }));
    }
    respond(ensure_registration_open(&state, path.event_id).map(|()| {
        let mut p = Participant::confirmed(name);
        p.email = body.email;
        p.phone = body.phone;
        p.ranking = body.ranking;
        state.store().insert_participants(path.event_id, [p.clone()]);
        p
    }))
}

/// Import a CSV roster (request body is the CSV text).
#[post("/api/events/{event_id}/participants/import")]
async fn api_import_participants(state: AppState, path: Path<EventPath>, body: String) -> HttpResponse {
    if let Err(e) = ensure_registration_open(&state, path.event_id) {
        return error_response(e);
    }
    match parse_participants(body.as_bytes()) {
        Ok(participants) => {
            state
                .store()
                .insert_participants(path.event_id, participants.iter().cloned());
            HttpResponse::Ok().json(participants)
        }
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Accept (partner_id set) or decline/withdraw (partner_id null) a partner invite.
#[put("/api/events/{event_id}/participants/{participant_id}/partner")]
async fn api_set_partner(
    state: AppState,
    path: Path<EventParticipantPath>,
    body: Json<PartnerBody>,
) -> HttpResponse {
    if let Err(e) = ensure_registration_open(&state, path.event_id) {
        return error_response(e);
    }
    let id = path.participant_id;
    respond(state.store().update_participants(path.event_id, |roster| {
        match body.partner_id {
            Some(partner) => link_partners(roster, id, partner)?,
            None => unlink_partner(roster, id)?,
        }
        Ok(roster.to_vec())
    }))
}

#[get("/api/courts")]
async fn api_list_courts(state: AppState) -> HttpResponse {
    respond(state.store().load_courts())
}

#[post("/api/courts")]
async fn api_add_court(state: AppState, body: Json<AddCourtBody>) -> HttpResponse {
    let body = body.into_inner();
    let mut court = Court::new(body.name.trim());
    court.location = body.location;
    state.store().insert_court(court.clone());
    HttpResponse::Ok().json(court)
}

/// Preview team formation for the event's mode (manual mode takes the teams from the body).
#[post("/api/events/{event_id}/teams")]
async fn api_form_teams(
    state: AppState,
    path: Path<EventPath>,
    body: Option<Json<TeamsBody>>,
) -> HttpResponse {
    let manual = body.map(|b| b.into_inner().teams).unwrap_or_default();
    respond(state.form_teams(path.event_id, &manual, &mut rand::thread_rng()))
}

/// Generate the group stage, forming teams from the roster unless they are supplied.
#[post("/api/events/{event_id}/groups")]
async fn api_generate_groups(
    state: AppState,
    path: Path<EventPath>,
    body: Option<Json<GenerateGroupsBody>>,
) -> HttpResponse {
    let body = body.map(Json::into_inner).unwrap_or_default();
    let teams = match body.teams {
        Some(teams) => Ok(teams),
        None => state
            .form_teams(path.event_id, &[], &mut rand::thread_rng())
            .map(|formation| formation.teams),
    };
    respond(teams.and_then(|teams| state.generate_group_stage(path.event_id, teams, body.group_size)))
}

#[get("/api/events/{event_id}/standings")]
async fn api_standings(state: AppState, path: Path<EventPath>) -> HttpResponse {
    respond(state.standings(path.event_id).map(|tables| {
        tables
            .into_iter()
            .map(|(group, standings)| GroupTable { group, standings })
            .collect::<Vec<_>>()
    }))
}

/// Build the elimination bracket (group stage must be finished).
#[post("/api/events/{event_id}/bracket")]
async fn api_build_bracket(
    state: AppState,
    path: Path<EventPath>,
    body: Option<Json<BuildBracketBody>>,
) -> HttpResponse {
    let seeds = body.and_then(|b| b.into_inner().seeds);
    respond(state.build_bracket(path.event_id, seeds))
}

#[put("/api/events/{event_id}/matches/{match_id}/schedule")]
async fn api_schedule_match(
    state: AppState,
    path: Path<EventMatchPath>,
    body: Json<ScheduleBody>,
) -> HttpResponse {
    respond(
        state
            .schedule_match(path.event_id, path.match_id, body.court_id, body.time)
            .and_then(|()| state.tournament(path.event_id)),
    )
}

#[post("/api/events/{event_id}/matches/{match_id}/result")]
async fn api_record_result(
    state: AppState,
    path: Path<EventMatchPath>,
    body: Json<ResultBody>,
) -> HttpResponse {
    respond(
        state
            .record_result(path.event_id, path.match_id, body.score_1, body.score_2)
            .and_then(|_| state.tournament(path.event_id)),
    )
}

/// Organizer override: award an untouched match to one side.
#[post("/api/events/{event_id}/matches/{match_id}/bye")]
async fn api_assign_bye(state: AppState, path: Path<EventMatchPath>, body: Json<ByeBody>) -> HttpResponse {
    respond(
        state
            .assign_bye(path.event_id, path.match_id, body.winner)
            .and_then(|_| state.tournament(path.event_id)),
    )
}

#[post("/api/events/{event_id}/schedule/auto")]
async fn api_auto_schedule(
    state: AppState,
    path: Path<EventPath>,
    body: Json<AutoScheduleBody>,
) -> HttpResponse {
    respond(state.auto_schedule(path.event_id, body.start_time))
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);

    let config = EngineConfig::from_env();
    log::info!("Engine config: {:?}", config);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state: AppState = Data::new(TournamentService::new(MemoryStore::new(), config));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_list_participants)
            .service(api_add_participant)
            .service(api_import_participants)
            .service(api_set_partner)
            .service(api_list_courts)
            .service(api_add_court)
            .service(api_form_teams)
            .service(api_generate_groups)
            .service(api_standings)
            .service(api_build_bracket)
            .service(api_schedule_match)
            .service(api_record_result)
            .service(api_assign_bye)
            .service(api_auto_schedule)
    })
    .bind(bind)?
    .run()
    .await
}
