//! Conversation routes.

use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::chat::dispatcher::{ChatError, SubmitReceipt};
use crate::chat::types::{AttachmentMeta, HistoryEntry, Message, Payload};
use crate::services::export;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SubmitBody {
    #[serde(default)]
    pub text: String,
    pub attachment: Option<AttachmentMeta>,
}

#[derive(Deserialize)]
pub struct RenameBody {
    pub title: String,
}

/// `POST /api/chat/messages` — submit a user message.
pub async fn submit(
    State(state): State<AppState>,
    Json(body): Json<SubmitBody>,
) -> Result<(StatusCode, Json<SubmitReceipt>), StatusCode> {
    let receipt = state
        .dispatcher
        .submit(&body.text, body.attachment)
        .map_err(chat_error_to_status)?;
    Ok((StatusCode::ACCEPTED, Json(receipt)))
}

/// `GET /api/chat/messages` — messages of the current session.
pub async fn list_messages(State(state): State<AppState>) -> Json<Vec<Message>> {
    Json(state.chat.snapshot().visible_messages().to_vec())
}

/// `GET /api/chat/sessions` — history entries, newest first.
pub async fn list_sessions(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    Json(state.chat.snapshot().history())
}

/// `POST /api/chat/sessions` — start a new chat.
pub async fn new_session(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.dispatcher.start_session();
    Json(serde_json::json!({ "ok": true }))
}

/// `POST /api/chat/sessions/:id/select` — make a session current.
pub async fn select_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    state
        .dispatcher
        .select_session(session_id)
        .map_err(chat_error_to_status)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// `PATCH /api/chat/sessions/:id` — rename a session.
pub async fn rename_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(body): Json<RenameBody>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    state
        .dispatcher
        .rename_session(session_id, &body.title)
        .map_err(chat_error_to_status)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// `GET /api/chat/sessions/:id/messages` — stored list for a session.
pub async fn session_messages(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Vec<Message>>, StatusCode> {
    let snapshot = state.chat.snapshot();
    let session = snapshot.sessions.get(&session_id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(session.messages.clone()))
}

/// `GET /api/chat/sessions/:id/export.csv` — download the most recent
/// tabular payload of a session as CSV.
pub async fn export_session_csv(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Response, StatusCode> {
    let snapshot = state.chat.snapshot();
    let session = snapshot.sessions.get(&session_id).ok_or(StatusCode::NOT_FOUND)?;

    let table = session
        .messages
        .iter()
        .rev()
        .find_map(|m| match &m.payload {
            Some(Payload::Table(table)) => Some(table),
            _ => None,
        })
        .ok_or(StatusCode::NOT_FOUND)?;

    let csv = export::render_csv(table);
    let filename = export::export_filename(session_id);

    let stream = futures::stream::iter(std::iter::once(Ok::<Bytes, std::convert::Infallible>(
        Bytes::from(csv),
    )));
    let body = Body::from_stream(stream);

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8"),
            (CONTENT_DISPOSITION, &format!("attachment; filename=\"{filename}\"")),
        ],
        body,
    )
        .into_response())
}

pub(crate) fn chat_error_to_status(err: ChatError) -> StatusCode {
    match err {
        ChatError::EmptySubmission | ChatError::EmptyTitle => StatusCode::BAD_REQUEST,
        ChatError::ReplyPending => StatusCode::CONFLICT,
        ChatError::SessionNotFound(_) => StatusCode::NOT_FOUND,
    }
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
