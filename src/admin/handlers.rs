use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::instrument;

use crate::{
    accounts::{dto::PublicUser, jwt::AuthUser, repo_types::Status},
    admin::services,
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct PendingCount {
    pub pending: usize,
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/pending-count", get(pending_count))
        .route("/admin/users/:id/approve", post(approve))
        .route("/admin/users/:id/reject", post(reject))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<PublicUser>>, (StatusCode, String)> {
    auth.require_admin()?;
    let users = state.accounts.list().await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state))]
pub async fn pending_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<PendingCount>, (StatusCode, String)> {
    auth.require_admin()?;
    let pending = services::pending_count(state.accounts.store()).await?;
    Ok(Json(PendingCount { pending }))
}

#[instrument(skip(state))]
pub async fn approve(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    decide(&state, &auth, &id, Status::Approved).await
}

#[instrument(skip(state))]
pub async fn reject(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    decide(&state, &auth, &id, Status::Rejected).await
}

async fn decide(
    state: &AppState,
    auth: &AuthUser,
    id: &str,
    next: Status,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    auth.require_admin()?;
    let user = services::set_status(state.accounts.store(), id, next).await?;
    Ok(Json(user.into()))
}
