//! Match HTTP API under `/api/matches`.
//!
//! Every mutation goes through the match's actor; reads come from the
//! actor's committed state or, for log pages, straight from storage.

use actix_web::http::header::{ETAG, LOCATION};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::require_db;
use crate::domain::actions::{Actor, Command, PlayerAction};
use crate::domain::types::{MatchMode, Millis, Seat};
use crate::domain::view::{MatchView, PublicEvent};
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::{CurrentUser, MatchId, ValidatedJson};
use crate::http::etag::{not_modified, view_etag};
use crate::runtime::clock::now_millis;
use crate::services::{matches as match_queries, snapshots};
use crate::state::app_state::AppState;

const DEFAULT_EVENTS_PAGE: u64 = 100;

#[derive(Debug, Deserialize)]
struct CreateMatchRequest {
    mode: MatchMode,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct JoinRequest {
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ActionRequest {
    action: PlayerAction,
    #[serde(default)]
    client_ts: Option<Millis>,
}

#[derive(Debug, Deserialize)]
struct EventsQuery {
    #[serde(default)]
    since: i64,
    limit: Option<u64>,
}

#[derive(Debug, Serialize)]
struct JoinResponse {
    match_id: i64,
    seat: Option<Seat>,
    accepted_seq: i64,
}

#[derive(Debug, Serialize)]
struct ActionResponse {
    accepted_seq: i64,
    events: Vec<PublicEvent>,
}

#[derive(Debug, Serialize)]
struct SnapshotResponse {
    match_id: i64,
    seq: i64,
    created: bool,
}

fn user_command(user: &CurrentUser, action: PlayerAction, client_ts: Option<Millis>) -> Command {
    Command::Act {
        actor: Actor::User { user_id: user.id },
        action,
        client_ts,
    }
}

/// POST /api/matches
async fn create_match(
    user: CurrentUser,
    body: ValidatedJson<CreateMatchRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let registry = app_state.registry()?;
    let body = body.into_inner();
    let host_name = body.display_name.unwrap_or_else(|| user.name_or_default());

    let state = app_state
        .flow
        .create_match(db, &app_state.config, body.mode, user.id, host_name, now_millis())
        .await?;
    let view = MatchView::for_viewer(&state, state.seat_of(user.id));
    registry.register(state);

    Ok(HttpResponse::Created()
        .insert_header((LOCATION, format!("/api/matches/{}", view.match_id)))
        .json(view))
}

/// POST /api/matches/{match_id}/join
async fn join_match(
    user: CurrentUser,
    match_id: MatchId,
    body: Option<ValidatedJson<JoinRequest>>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = body.map(ValidatedJson::into_inner).unwrap_or_default();
    let display_name = body.display_name.unwrap_or_else(|| user.name_or_default());
    let command = user_command(&user, PlayerAction::Join { display_name }, None);

    let accepted = app_state.registry()?.submit(match_id.0, command).await?;
    let seat = accepted.state.seat_of(user.id);
    info!(match_id = match_id.0, user_id = user.id, seat, "player joined");
    Ok(HttpResponse::Ok().json(JoinResponse {
        match_id: match_id.0,
        seat,
        accepted_seq: accepted.last_seq,
    }))
}

/// POST /api/matches/{match_id}/actions
async fn submit_action(
    user: CurrentUser,
    match_id: MatchId,
    body: ValidatedJson<ActionRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let ActionRequest { action, client_ts } = body.into_inner();
    let registry = app_state.registry()?;
    if !matches!(action, PlayerAction::Join { .. }) {
        let current = registry.state(match_id.0).await?;
        if current.seat_of(user.id).is_none() {
            return Err(AppError::forbidden(
                ErrorCode::NotAParticipant,
                format!("User {} holds no seat in match {}", user.id, match_id.0),
            ));
        }
    }
    let accepted = registry
        .submit(match_id.0, user_command(&user, action, client_ts))
        .await?;
    let reveal = accepted.state.status.is_terminal();
    Ok(HttpResponse::Ok().json(ActionResponse {
        accepted_seq: accepted.last_seq,
        events: PublicEvent::list(&accepted.events, reveal),
    }))
}

/// GET /api/matches/{match_id}/state
///
/// The caller's redacted view. Honors `If-None-Match`.
async fn get_state(
    req: HttpRequest,
    user: CurrentUser,
    match_id: MatchId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let state = app_state.registry()?.state(match_id.0).await?;
    let seat = state.seat_of(user.id);
    let etag = view_etag(state.match_id, state.last_seq, seat);
    if not_modified(&req, &etag) {
        return Ok(HttpResponse::build(StatusCode::NOT_MODIFIED)
            .insert_header((ETAG, etag))
            .finish());
    }
    Ok(HttpResponse::Ok()
        .insert_header((ETAG, etag))
        .json(MatchView::for_viewer(&state, seat)))
}

/// GET /api/matches/{match_id}/events?since=N&limit=M
async fn get_events(
    match_id: MatchId,
    query: web::Query<EventsQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let state = app_state.registry()?.state(match_id.0).await?;
    let page = match_queries::events_page(
        db,
        &state,
        query.since,
        query.limit.unwrap_or(DEFAULT_EVENTS_PAGE),
    )
    .await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /api/matches/{match_id}/ledger
async fn get_ledger(
    match_id: MatchId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let state = app_state.registry()?.state(match_id.0).await?;
    let report = match_queries::ledger_report(db, &state).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// POST /api/matches/{match_id}/snapshot
///
/// Host only.
async fn take_snapshot(
    user: CurrentUser,
    match_id: MatchId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let state = app_state.registry()?.state(match_id.0).await?;
    if state.host_user_id != user.id {
        return Err(AppError::forbidden(
            ErrorCode::Forbidden,
            "Only the host can snapshot a match",
        ));
    }
    let created = snapshots::take(db, &state).await?;
    Ok(HttpResponse::Ok().json(SnapshotResponse {
        match_id: state.match_id,
        seq: state.last_seq,
        created,
    }))
}

/// POST /api/matches/{match_id}/cancel
async fn cancel_match(
    user: CurrentUser,
    match_id: MatchId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let accepted = app_state
        .registry()?
        .submit(match_id.0, user_command(&user, PlayerAction::Cancel, None))
        .await?;
    info!(match_id = match_id.0, user_id = user.id, "match cancelled");
    Ok(HttpResponse::Ok().json(ActionResponse {
        accepted_seq: accepted.last_seq,
        events: PublicEvent::list(&accepted.events, true),
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("").route(web::post().to(create_match)))
        .service(web::resource("/{match_id}/join").route(web::post().to(join_match)))
        .service(web::resource("/{match_id}/actions").route(web::post().to(submit_action)))
        .service(web::resource("/{match_id}/state").route(web::get().to(get_state)))
        .service(web::resource("/{match_id}/events").route(web::get().to(get_events)))
        .service(web::resource("/{match_id}/ledger").route(web::get().to(get_ledger)))
        .service(web::resource("/{match_id}/snapshot").route(web::post().to(take_snapshot)))
        .service(web::resource("/{match_id}/cancel").route(web::post().to(cancel_match)));
}
