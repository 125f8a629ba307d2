// HTTP API routes (spawns, catches, quests, beasts, seasons, presence).

pub mod caller;

use axum::{
    body::Bytes,
    extract::{MatchedPath, Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

use crate::db::Database;
use crate::engine::names::{validate_display_name, MAX_NAME_LEN, MIN_NAME_LEN};
use crate::error::{Error, Result};
use crate::game::{
    self, beasts, catch,
    catch::CatchTarget,
    leaderboard::{self, LeaderboardMode},
    quests, seasons, spawns,
};
use crate::metrics;
use crate::presence::PresenceCache;
use caller::{resolve_caller, Caller, OptionalCaller};

// ── Request types ─────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RenameRequest {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CatchRequest {
    pub spawn_id: Option<String>,
    pub creature_id: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PresenceRequest {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub user_id: Option<String>,
}

/// Coordinates arrive as raw strings so a malformed value is a 400 with our
/// own message rather than the extractor's.
#[derive(Debug, Deserialize)]
pub struct AreaParams {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub mode: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
}

// ── Shared application state ─────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub presence: PresenceCache,
}

fn json_error(status: StatusCode, msg: &str) -> Response {
    (status, Json(json!({ "error": msg }))).into_response()
}

/// Parse an optional JSON body; an empty body means all defaults.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| Error::InvalidInput(format!("invalid JSON body: {e}")))
}

fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn valid_position(lat: Option<f64>, lng: Option<f64>) -> Option<(f64, f64)> {
    match (lat, lng) {
        (Some(lat), Some(lng))
            if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) =>
        {
            Some((lat, lng))
        }
        _ => None,
    }
}

fn require_position(lat: Option<f64>, lng: Option<f64>) -> Result<(f64, f64)> {
    valid_position(lat, lng).ok_or_else(|| Error::InvalidInput("lat and lng required".to_string()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ── Router ────────────────────────────────────────────────────────────

pub fn router(db: Arc<Database>, presence: PresenceCache) -> Router {
    let state = AppState { db, presence };

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_text))
        .route("/creatures", get(list_creatures))
        // Player
        .route("/me", post(register))
        .route("/me/name", patch(rename))
        .route("/me/stats", get(my_stats))
        .route("/me/collection", get(my_collection))
        // Spawns and catches
        .route("/spawns", get(nearby_spawns))
        .route("/catch", post(catch_creature))
        // Quests
        .route("/me/quests", get(my_quests))
        .route("/me/quests/{id}/claim", post(claim_quest))
        // Beasts
        .route("/me/beasts", get(my_beasts))
        .route("/me/beasts/{id}/evolve", post(evolve_beast))
        // Seasons and leaderboards
        .route("/seasons/current", get(current_season))
        .route("/seasons/current/leaderboard", get(season_leaderboard))
        .route("/leaderboard", get(xp_leaderboard))
        // Presence
        .route("/me/presence", put(update_presence))
        .route("/presence/nearby", get(nearby_players))
        .layer(middleware::from_fn(track_metrics))
        .with_state(state)
}

async fn track_metrics(req: Request, next: Next) -> Response {
    let endpoint = match req.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_string(),
        None => metrics::normalize_path(req.uri().path()),
    };
    let method = req.method().to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    metrics::API_REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), endpoint.as_str(), response.status().as_str()])
        .inc();
    metrics::API_REQUEST_DURATION_SECONDS
        .with_label_values(&[endpoint.as_str()])
        .observe(start.elapsed().as_secs_f64());
    response
}

// ── Service ───────────────────────────────────────────────────────────

async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "creature-hunt-backend" }))
}

async fn metrics_text() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::gather_metrics(),
    )
}

async fn list_creatures(State(state): State<AppState>) -> impl IntoResponse {
    match state.db.list_creatures().await {
        Ok(creatures) => (StatusCode::OK, Json(json!(creatures))).into_response(),
        Err(e) => Error::from(e).into_response(),
    }
}

// ── Player ────────────────────────────────────────────────────────────

async fn register(
    State(state): State<AppState>,
    OptionalCaller(header): OptionalCaller,
    body: Bytes,
) -> impl IntoResponse {
    let req: RegisterRequest = match parse_body(&body) {
        Ok(req) => req,
        Err(e) => return e.into_response(),
    };
    let user_id = resolve_caller(header, req.user_id);
    match game::ensure_player(&state.db, &user_id, Utc::now()).await {
        Ok(user) => {
            let user = user.into_inner();
            (
                StatusCode::OK,
                Json(json!({ "user_id": user.id, "display_name": user.display_name })),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

async fn rename(
    State(state): State<AppState>,
    Caller(user_id): Caller,
    body: Bytes,
) -> impl IntoResponse {
    let req: RenameRequest = match parse_body(&body) {
        Ok(req) => req,
        Err(e) => return e.into_response(),
    };
    let Some(name) = req.name.as_deref().and_then(validate_display_name) else {
        return json_error(
            StatusCode::BAD_REQUEST,
            &format!("Name must be {MIN_NAME_LEN}–{MAX_NAME_LEN} characters"),
        );
    };
    match state.db.set_display_name(&user_id, name).await {
        Ok(true) => {
            tracing::info!(user_id, display_name = name, "Player renamed");
            (StatusCode::OK, Json(json!({ "display_name": name }))).into_response()
        }
        Ok(false) => Error::NotFound("user").into_response(),
        Err(e) => Error::from(e).into_response(),
    }
}

async fn my_stats(
    State(state): State<AppState>,
    OptionalCaller(caller): OptionalCaller,
) -> impl IntoResponse {
    let Some(user_id) = caller else {
        return (
            StatusCode::OK,
            Json(json!({ "xp": 0, "level": 1, "coins": 0, "streak": 0 })),
        )
            .into_response();
    };
    let now = Utc::now();
    let result = async {
        game::ensure_player(&state.db, &user_id, now).await?;
        catch::player_stats(&state.db, &user_id, now).await
    }
    .await;
    match result {
        Ok(stats) => (StatusCode::OK, Json(json!(stats))).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn my_collection(
    State(state): State<AppState>,
    OptionalCaller(caller): OptionalCaller,
) -> impl IntoResponse {
    let Some(user_id) = caller else {
        return (StatusCode::OK, Json(json!([]))).into_response();
    };
    match state.db.list_catches(&user_id).await {
        Ok(catches) => (StatusCode::OK, Json(json!(catches))).into_response(),
        Err(e) => Error::from(e).into_response(),
    }
}

// ── Spawns and catches ────────────────────────────────────────────────

async fn nearby_spawns(
    State(state): State<AppState>,
    Query(params): Query<AreaParams>,
) -> impl IntoResponse {
    let (lat, lng) = match require_position(
        parse_number(params.lat.as_deref()),
        parse_number(params.lng.as_deref()),
    ) {
        Ok(position) => position,
        Err(e) => return e.into_response(),
    };
    let radius = parse_number(params.radius.as_deref());
    match spawns::spawns_near(&state.db, lat, lng, radius, Utc::now()).await {
        Ok(rows) => (StatusCode::OK, Json(json!(rows))).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn catch_creature(
    State(state): State<AppState>,
    OptionalCaller(header): OptionalCaller,
    body: Bytes,
) -> impl IntoResponse {
    let req: CatchRequest = match parse_body(&body) {
        Ok(req) => req,
        Err(e) => return e.into_response(),
    };
    let target = match (non_empty(req.spawn_id), non_empty(req.creature_id)) {
        (Some(spawn_id), _) => CatchTarget::Spawn(spawn_id),
        (None, Some(creature_id)) => CatchTarget::Creature(creature_id),
        (None, None) => {
            return json_error(StatusCode::BAD_REQUEST, "spawn_id or creature_id required")
        }
    };
    let position = valid_position(req.lat, req.lng);
    let user_id = resolve_caller(header, req.user_id);
    let now = Utc::now();

    let result = async {
        game::ensure_player(&state.db, &user_id, now).await?;
        catch::record_catch(
            &state.db,
            &user_id,
            &target,
            position.map(|p| p.0),
            position.map(|p| p.1),
            now,
        )
        .await
    }
    .await;
    match result {
        Ok(outcome) => (StatusCode::CREATED, Json(json!(outcome))).into_response(),
        Err(e) => e.into_response(),
    }
}

// ── Quests ────────────────────────────────────────────────────────────

async fn my_quests(
    State(state): State<AppState>,
    OptionalCaller(caller): OptionalCaller,
) -> impl IntoResponse {
    let Some(user_id) = caller else {
        return (StatusCode::OK, Json(json!([]))).into_response();
    };
    let now = Utc::now();
    let result = async {
        game::ensure_player(&state.db, &user_id, now).await?;
        quests::daily_quests(&state.db, &user_id, now).await
    }
    .await;
    match result {
        Ok(quests) => (StatusCode::OK, Json(json!(quests))).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn claim_quest(
    State(state): State<AppState>,
    Caller(user_id): Caller,
    Path(quest_id): Path<String>,
) -> impl IntoResponse {
    match quests::claim_quest(&state.db, &user_id, &quest_id, Utc::now()).await {
        Ok(outcome) => (StatusCode::OK, Json(json!(outcome))).into_response(),
        Err(e) => e.into_response(),
    }
}

// ── Beasts ────────────────────────────────────────────────────────────

async fn my_beasts(
    State(state): State<AppState>,
    OptionalCaller(caller): OptionalCaller,
) -> impl IntoResponse {
    let Some(user_id) = caller else {
        return (StatusCode::OK, Json(json!([]))).into_response();
    };
    match beasts::beast_roster(&state.db, &user_id).await {
        Ok(roster) => (StatusCode::OK, Json(json!(roster))).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn evolve_beast(
    State(state): State<AppState>,
    Caller(user_id): Caller,
    Path(beast_id): Path<String>,
) -> impl IntoResponse {
    match beasts::evolve_beast(&state.db, &user_id, &beast_id, Utc::now()).await {
        Ok(outcome) => (StatusCode::OK, Json(json!(outcome))).into_response(),
        Err(e) => e.into_response(),
    }
}

// ── Seasons and leaderboards ──────────────────────────────────────────

async fn current_season(
    State(state): State<AppState>,
    OptionalCaller(caller): OptionalCaller,
) -> impl IntoResponse {
    match seasons::current_season_summary(&state.db, caller.as_deref(), Utc::now()).await {
        Ok(summary) => (StatusCode::OK, Json(json!(summary))).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn season_leaderboard(
    State(state): State<AppState>,
    OptionalCaller(caller): OptionalCaller,
) -> impl IntoResponse {
    match seasons::season_leaderboard(&state.db, caller.as_deref(), Utc::now()).await {
        Ok(board) => (StatusCode::OK, Json(json!(board))).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn xp_leaderboard(
    State(state): State<AppState>,
    OptionalCaller(caller): OptionalCaller,
    Query(params): Query<LeaderboardParams>,
) -> impl IntoResponse {
    let mode = LeaderboardMode::from_query(params.mode.as_deref());
    let position = valid_position(
        parse_number(params.lat.as_deref()),
        parse_number(params.lng.as_deref()),
    );
    match leaderboard::leaderboard(&state.db, mode, position, caller.as_deref()).await {
        Ok(board) => (StatusCode::OK, Json(json!(board))).into_response(),
        Err(e) => e.into_response(),
    }
}

// ── Presence ──────────────────────────────────────────────────────────

async fn update_presence(
    State(state): State<AppState>,
    OptionalCaller(header): OptionalCaller,
    body: Bytes,
) -> impl IntoResponse {
    let req: PresenceRequest = match parse_body(&body) {
        Ok(req) => req,
        Err(e) => return e.into_response(),
    };
    let (lat, lng) = match require_position(req.lat, req.lng) {
        Ok(position) => position,
        Err(e) => return e.into_response(),
    };
    let user_id = resolve_caller(header, req.user_id);
    let now = Utc::now();

    let result = async {
        let user = game::ensure_player(&state.db, &user_id, now).await?.into_inner();
        let level = state.db.get_stats(&user_id).await?.map(|s| s.level).unwrap_or(1);
        Ok::<_, Error>((game::display_name_or_generated(&user_id, user.display_name), level))
    }
    .await;
    match result {
        Ok((display_name, level)) => {
            state.presence.update(&user_id, lat, lng, display_name, level);
            (StatusCode::OK, Json(json!({ "ok": true, "user_id": user_id }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

async fn nearby_players(
    State(state): State<AppState>,
    OptionalCaller(caller): OptionalCaller,
    Query(params): Query<AreaParams>,
) -> impl IntoResponse {
    let (lat, lng) = match require_position(
        parse_number(params.lat.as_deref()),
        parse_number(params.lng.as_deref()),
    ) {
        Ok(position) => position,
        Err(e) => return e.into_response(),
    };
    let radius = spawns::effective_radius_km(parse_number(params.radius.as_deref()));
    let players = state.presence.nearby(lat, lng, radius, caller.as_deref());
    (StatusCode::OK, Json(players)).into_response()
}
