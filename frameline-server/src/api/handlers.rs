//! HTTP request handlers
//!
//! Thin adapters between the REST surface and the room methods; every
//! handler resolves its room through [`SharedState`] and lets [`Error`]'s
//! response mapping produce the status code.

use crate::api::server::AppContext;
use crate::catalog::Direction;
use crate::composer::ThreadDraft;
use crate::error::{Error, Result};
use crate::session::KeyCode;
use crate::state::SharedState;
use crate::threads::{ResolutionFilter, ThreadListEntry, TimelinePin};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use frameline_common::events::ParticipantInfo;
use frameline_common::model::{
    Quality, Resource, ThreadData, TransportSnapshot, UserInfo, SPEED_OPTIONS,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: String,
}

impl StatusResponse {
    fn ok() -> Json<StatusResponse> {
        Json(StatusResponse {
            status: "ok".to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    /// Normalized position reported by the playback backend
    played: f64,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    applied: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationRequest {
    duration_secs: f64,
}

#[derive(Debug, Deserialize)]
pub struct ScrubRequest {
    value: f64,
}

#[derive(Debug, Deserialize)]
pub struct SkipToRequest {
    percentage: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeekResponse {
    seek_to: f64,
}

#[derive(Debug, Deserialize)]
pub struct VolumeRequest {
    volume: f64,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct FullscreenSupportRequest {
    supported: bool,
}

#[derive(Debug, Deserialize)]
pub struct SpeedRequest {
    speed: f64,
}

#[derive(Debug, Deserialize)]
pub struct QualityRequest {
    quality: Quality,
}

#[derive(Debug, Serialize)]
pub struct PlayerOptionsResponse {
    speeds: Vec<f64>,
    qualities: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct KeyRequest {
    code: KeyCode,
}

#[derive(Debug, Default, Deserialize)]
pub struct ThreadListQuery {
    #[serde(default)]
    filter: ResolutionFilter,
}

#[derive(Debug, Serialize)]
pub struct ThreadListResponse {
    threads: Vec<ThreadListEntry>,
}

#[derive(Debug, Serialize)]
pub struct TimelineResponse {
    pins: Vec<TimelinePin>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightRequest {
    thread_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct PresenceResponse {
    roster: Vec<ParticipantInfo>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
    connection_id: Uuid,
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "frameline-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Resource Catalog Endpoints
// ============================================================================

/// GET /resources - Full catalog
pub async fn list_resources(State(ctx): State<AppContext>) -> Json<Vec<Resource>> {
    Json(ctx.state.catalog.all().to_vec())
}

/// GET /resources/:id - Resolve one resource
pub async fn get_resource(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<Resource>> {
    Ok(Json(ctx.state.catalog.get(&id)?.clone()))
}

/// GET /resources/:id/adjacent/:direction - Prev/next with wrap-around
pub async fn navigate_resource(
    State(ctx): State<AppContext>,
    Path((id, direction)): Path<(String, String)>,
) -> Result<Json<Resource>> {
    let direction: Direction = direction.parse()?;
    Ok(Json(ctx.state.catalog.navigate(&id, direction)?.clone()))
}

// ============================================================================
// Playback Transport Endpoints
// ============================================================================

async fn room(state: &SharedState, id: &str) -> Result<std::sync::Arc<crate::state::Room>> {
    state.room(id).await
}

/// GET /rooms/:id/playback/state - Full transport snapshot
pub async fn get_transport(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<TransportSnapshot>> {
    Ok(Json(room(&ctx.state, &id).await?.transport().await))
}

/// POST /rooms/:id/playback/play
pub async fn play(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>> {
    room(&ctx.state, &id).await?.set_playing(true).await?;
    Ok(StatusResponse::ok())
}

/// POST /rooms/:id/playback/pause
pub async fn pause(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>> {
    room(&ctx.state, &id).await?.set_playing(false).await?;
    Ok(StatusResponse::ok())
}

/// POST /rooms/:id/playback/toggle - Click-on-player play/pause
pub async fn toggle_playing(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<ToggleResponse>> {
    let enabled = room(&ctx.state, &id).await?.toggle_playing().await?;
    Ok(Json(ToggleResponse { enabled }))
}

/// POST /rooms/:id/playback/progress - Backend progress tick
pub async fn report_progress(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(req): Json<ProgressRequest>,
) -> Result<Json<ProgressResponse>> {
    let applied = room(&ctx.state, &id).await?.report_progress(req.played).await?;
    Ok(Json(ProgressResponse { applied }))
}

/// POST /rooms/:id/playback/duration - Backend duration report
pub async fn report_duration(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(req): Json<DurationRequest>,
) -> Result<Json<StatusResponse>> {
    room(&ctx.state, &id).await?.report_duration(req.duration_secs).await?;
    Ok(StatusResponse::ok())
}

/// POST /rooms/:id/playback/ended - Media ran out
pub async fn report_ended(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>> {
    room(&ctx.state, &id).await?.report_ended().await?;
    Ok(StatusResponse::ok())
}

/// POST /rooms/:id/playback/scrub - Slider drag (display only)
pub async fn scrub(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(req): Json<ScrubRequest>,
) -> Result<Json<StatusResponse>> {
    room(&ctx.state, &id).await?.scrub(req.value).await?;
    Ok(StatusResponse::ok())
}

/// POST /rooms/:id/playback/scrub/commit - Slider release, one seek
pub async fn scrub_commit(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(req): Json<ScrubRequest>,
) -> Result<Json<SeekResponse>> {
    let seek = room(&ctx.state, &id).await?.scrub_commit(req.value).await?;
    Ok(Json(SeekResponse { seek_to: seek.to }))
}

/// POST /rooms/:id/playback/skip-to - Jump to a timeline percentage
pub async fn skip_to(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(req): Json<SkipToRequest>,
) -> Result<Json<SeekResponse>> {
    info!(room = %id, percentage = req.percentage, "Skip-to requested");
    let seek = room(&ctx.state, &id).await?.skip_to(req.percentage).await?;
    Ok(Json(SeekResponse { seek_to: seek.to }))
}

/// POST /rooms/:id/playback/volume
pub async fn set_volume(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(req): Json<VolumeRequest>,
) -> Result<Json<StatusResponse>> {
    room(&ctx.state, &id).await?.set_volume(req.volume).await?;
    Ok(StatusResponse::ok())
}

/// POST /rooms/:id/playback/mute
pub async fn toggle_mute(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<ToggleResponse>> {
    let enabled = room(&ctx.state, &id).await?.toggle_mute().await?;
    Ok(Json(ToggleResponse { enabled }))
}

/// POST /rooms/:id/playback/loop
pub async fn toggle_loop(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<ToggleResponse>> {
    let enabled = room(&ctx.state, &id).await?.toggle_loop().await?;
    Ok(Json(ToggleResponse { enabled }))
}

/// POST /rooms/:id/playback/fullscreen - Idempotent toggle, no-op without
/// native support
pub async fn toggle_fullscreen(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<ToggleResponse>> {
    let enabled = room(&ctx.state, &id).await?.toggle_fullscreen().await?;
    Ok(Json(ToggleResponse { enabled }))
}

/// POST /rooms/:id/playback/fullscreen/support - Surface capability report
pub async fn set_fullscreen_support(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(req): Json<FullscreenSupportRequest>,
) -> Result<Json<StatusResponse>> {
    room(&ctx.state, &id).await?.set_fullscreen_supported(req.supported).await?;
    Ok(StatusResponse::ok())
}

/// POST /rooms/:id/playback/speed
pub async fn set_speed(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(req): Json<SpeedRequest>,
) -> Result<Json<StatusResponse>> {
    room(&ctx.state, &id).await?.set_speed(req.speed).await?;
    Ok(StatusResponse::ok())
}

/// POST /rooms/:id/playback/quality
pub async fn set_quality(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(req): Json<QualityRequest>,
) -> Result<Json<StatusResponse>> {
    room(&ctx.state, &id).await?.set_quality(req.quality).await?;
    Ok(StatusResponse::ok())
}

/// GET /rooms/:id/playback/options - Speed and quality menus
pub async fn get_player_options() -> Json<PlayerOptionsResponse> {
    Json(PlayerOptionsResponse {
        speeds: SPEED_OPTIONS.to_vec(),
        qualities: Quality::OPTIONS.iter().map(|q| q.to_string()).collect(),
    })
}

/// POST /rooms/:id/playback/key - Document-level keyboard shortcut
pub async fn press_key(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(req): Json<KeyRequest>,
) -> Result<Json<StatusResponse>> {
    room(&ctx.state, &id).await?.handle_key(req.code).await?;
    Ok(StatusResponse::ok())
}

// ============================================================================
// Thread / Timeline / Composer Endpoints
// ============================================================================

/// GET /rooms/:id/threads?filter=Open - Filtered, sorted thread list
pub async fn get_threads(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Query(query): Query<ThreadListQuery>,
) -> Result<Json<ThreadListResponse>> {
    let threads = room(&ctx.state, &id).await?.thread_list(query.filter).await;
    Ok(Json(ThreadListResponse { threads }))
}

/// POST /rooms/:id/threads - Composer submit
pub async fn create_thread(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(draft): Json<ThreadDraft>,
) -> Result<Json<ThreadData>> {
    if draft.body.trim().is_empty() {
        return Err(Error::BadRequest("Comment body is empty".to_string()));
    }
    let thread = room(&ctx.state, &id).await?.create_thread(draft).await;
    Ok(Json(thread))
}

/// GET /rooms/:id/timeline - Pins for the player timeline
pub async fn get_timeline(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<TimelineResponse>> {
    let pins = room(&ctx.state, &id).await?.timeline_pins().await;
    Ok(Json(TimelineResponse { pins }))
}

/// POST /rooms/:id/composer/focus - Pause playback, suppress shortcuts
pub async fn composer_focus(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>> {
    room(&ctx.state, &id).await?.composer_focus().await;
    Ok(StatusResponse::ok())
}

/// POST /rooms/:id/composer/blur
pub async fn composer_blur(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>> {
    room(&ctx.state, &id).await?.composer_blur().await;
    Ok(StatusResponse::ok())
}

// ============================================================================
// Highlight Signal Endpoints
// ============================================================================

/// POST /rooms/:id/signals/highlight-thread - Pin hover/click
pub async fn highlight_thread(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(req): Json<HighlightRequest>,
) -> Result<Json<StatusResponse>> {
    room(&ctx.state, &id).await?.highlight_thread(req.thread_id).await?;
    Ok(StatusResponse::ok())
}

/// POST /rooms/:id/signals/highlight-pin - Thread hover
pub async fn highlight_pin(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(req): Json<HighlightRequest>,
) -> Result<Json<StatusResponse>> {
    room(&ctx.state, &id).await?.highlight_pin(req.thread_id).await?;
    Ok(StatusResponse::ok())
}

/// POST /rooms/:id/signals/reset - Pointer left, clear all highlights
pub async fn reset_highlights(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>> {
    room(&ctx.state, &id).await?.reset_highlights().await;
    Ok(StatusResponse::ok())
}

// ============================================================================
// Presence Endpoints
// ============================================================================

/// GET /rooms/:id/presence - Current roster
pub async fn get_presence(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<PresenceResponse>> {
    let roster = room(&ctx.state, &id).await?.presence_snapshot().await;
    Ok(Json(PresenceResponse { roster }))
}

/// POST /rooms/:id/presence/join
pub async fn presence_join(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(user): Json<UserInfo>,
) -> Result<Json<JoinResponse>> {
    let connection_id = room(&ctx.state, &id).await?.presence_join(user).await;
    Ok(Json(JoinResponse { connection_id }))
}

/// DELETE /rooms/:id/presence/:connection_id
pub async fn presence_leave(
    State(ctx): State<AppContext>,
    Path((id, connection_id)): Path<(String, Uuid)>,
) -> Result<Json<StatusResponse>> {
    room(&ctx.state, &id).await?.presence_leave(connection_id).await?;
    Ok(StatusResponse::ok())
}

/// POST /rooms/:id/presence/:connection_id/sync - Refresh status from the
/// transport
pub async fn presence_sync(
    State(ctx): State<AppContext>,
    Path((id, connection_id)): Path<(String, Uuid)>,
) -> Result<Json<StatusResponse>> {
    room(&ctx.state, &id).await?.presence_sync(connection_id).await?;
    Ok(StatusResponse::ok())
}
