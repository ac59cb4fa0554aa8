//! `/users` route handlers.
//!
//! Each handler follows the same shape: parse and validate the body, look up
//! the record, mutate, commit, and answer with JSON.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection, rejection::PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use user_directory_core::UserId;

use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::models::{CreateUsers, NewUser, User, UserChanges};
use crate::state::AppState;

/// Message returned for every failed update, whatever the store reported.
pub const UPDATE_CONFLICT_MESSAGE: &str = "update failed, username or email may already be taken";

/// Confirmation returned by `DELETE /users/{id}`.
///
/// Keys and wording stay in Indonesian; existing clients match on them.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub status: String,
    pub pesan: String,
}

/// Resolve the `{id}` segment; anything that is not an integer names no user.
fn user_id(path: std::result::Result<Path<i64>, PathRejection>) -> Result<UserId> {
    path.map(|Path(id)| UserId::new(id))
        .map_err(|_| not_found())
}

fn not_found() -> AppError {
    AppError::NotFound("user not found".to_string())
}

/// Create one user or a batch.
///
/// POST /users
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Response> {
    let Json(body) = body?;

    match CreateUsers::from_json(&body)? {
        CreateUsers::Single(new_user) => {
            let user = create_single(&state, &new_user).await?;
            Ok((StatusCode::CREATED, Json(user)).into_response())
        }
        CreateUsers::Bulk(new_users) => {
            let requested = new_users.len();
            let users = state.users().create_many(&new_users).await?;
            tracing::info!(
                requested,
                created = users.len(),
                "Bulk user creation committed"
            );
            Ok((StatusCode::CREATED, Json(users)).into_response())
        }
    }
}

async fn create_single(state: &AppState, new_user: &NewUser) -> Result<User> {
    let users = state.users();

    if users.get_by_username(&new_user.username).await?.is_some() {
        return Err(AppError::Conflict("username already taken".to_string()));
    }
    if users.get_by_email(&new_user.email).await?.is_some() {
        return Err(AppError::Conflict("email already taken".to_string()));
    }

    let user = users.create(new_user).await?;
    tracing::info!(user_id = %user.id, username = %user.username, "User created");
    Ok(user)
}

/// List every user.
///
/// GET /users
#[instrument(skip_all)]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    let users = state.users().list_all().await?;
    Ok(Json(users))
}

/// Fetch one user.
///
/// GET /users/{id}
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<User>> {
    let id = user_id(id)?;
    let user = state.users().get_by_id(id).await?.ok_or_else(not_found)?;
    Ok(Json(user))
}

/// Partially update a user.
///
/// PUT /users/{id}
///
/// Uniqueness is not pre-checked; whatever the store rejects comes back as a
/// generic conflict and the transaction is rolled back.
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<User>> {
    let id = user_id(id)?;
    let users = state.users();

    // Unknown ids are reported as 404 before the body is looked at.
    if users.get_by_id(id).await?.is_none() {
        return Err(not_found());
    }

    let Json(body) = body?;
    let changes = UserChanges::from_json(&body)?;

    match users.update(id, &changes).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "User updated");
            Ok(Json(user))
        }
        Err(RepositoryError::NotFound) => Err(not_found()),
        Err(e) => {
            tracing::warn!(user_id = %id, error = %e, "User update rolled back");
            Err(AppError::Conflict(UPDATE_CONFLICT_MESSAGE.to_string()))
        }
    }
}

/// Permanently delete a user.
///
/// DELETE /users/{id}
#[instrument(skip_all)]
pub async fn delete(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteResponse>> {
    let id = user_id(id)?;

    let user = state.users().delete(id).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User deleted");

    Ok(Json(DeleteResponse {
        status: "sukses".to_string(),
        pesan: format!("User {} (ID: {}) telah dihapus.", user.username, user.id),
    }))
}
