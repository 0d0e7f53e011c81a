//! User store routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::services::users::{User, UserError};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateUserBody {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct UserQuery {
    pub username: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: u64,
    pub username: String,
}

fn to_response(user: User) -> UserResponse {
    UserResponse { id: user.id, username: user.username }
}

/// `POST /api/users` — create a user.
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserBody>,
) -> Result<(StatusCode, Json<UserResponse>), StatusCode> {
    let user = state
        .users
        .create_user(&body.username, &body.password)
        .map_err(user_error_to_status)?;
    Ok((StatusCode::CREATED, Json(to_response(user))))
}

/// `GET /api/users/:id` — fetch by id.
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<UserResponse>, StatusCode> {
    let user = state.users.get_user(id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(to_response(user)))
}

/// `GET /api/users?username=` — fetch by username.
pub async fn get_user_by_username(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<UserResponse>, StatusCode> {
    let user = state
        .users
        .get_user_by_username(&query.username)
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(to_response(user)))
}

pub(crate) fn user_error_to_status(err: UserError) -> StatusCode {
    match err {
        UserError::DuplicateUsername(_) => StatusCode::CONFLICT,
    }
}
