//! Router wiring: pages, note views and the JSON API proxy behind the guard

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use notehub_client::{CreateNotePayload, ListNotesParams, Note, NotesClient, NotesPage};
use tower_http::trace::TraceLayer;

use crate::error::UpstreamError;
use crate::guard::{require_session, route_guard, RouteGuard};
use crate::pages;

/// Shared application state
pub struct AppState {
    pub notes: NotesClient,
}

type ApiResult<T> = Result<T, UpstreamError>;

/// Build the full application router with the guard in front of every route.
///
/// The JSON API lies outside the page guard's boundary and carries its own
/// session requirement, since it acts on the backend with the server's token.
pub fn router(state: Arc<AppState>, guard: Arc<RouteGuard>) -> Router {
    let api = Router::new()
        .route("/api/notes", get(list_notes).post(create_note))
        .route("/api/notes/{id}", get(get_note).delete(delete_note))
        .route_layer(middleware::from_fn_with_state(guard.clone(), require_session));

    Router::new()
        // Pages
        .route("/", get(pages::home))
        .route("/sign-in", get(pages::sign_in))
        .route("/sign-up", get(pages::sign_up))
        .route("/profile", get(pages::profile))
        // Note views (private)
        .route("/notes", get(list_notes))
        .route("/notes/{id}", get(get_note))
        .merge(api)
        .with_state(state)
        .layer(middleware::from_fn_with_state(guard, route_guard))
        .layer(TraceLayer::new_for_http())
}

async fn list_notes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListNotesParams>,
) -> ApiResult<Json<NotesPage>> {
    Ok(Json(state.notes.list_notes(&params).await?))
}

async fn get_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Note>> {
    Ok(Json(state.notes.get_note_by_id(&id).await?))
}

async fn create_note(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateNotePayload>,
) -> ApiResult<(StatusCode, Json<Note>)> {
    let note = state.notes.create_note(&payload).await?;
    tracing::info!("Created note {}", note.id);
    Ok((StatusCode::CREATED, Json(note)))
}

async fn delete_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Note>> {
    let note = state.notes.delete_note(&id).await?;
    tracing::info!("Deleted note {}", note.id);
    Ok(Json(note))
}
