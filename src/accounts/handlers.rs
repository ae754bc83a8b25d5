use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, instrument};

use crate::{
    accounts::{
        dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
        jwt::{AuthUser, JwtKeys},
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>), (StatusCode, String)> {
    let user = state.accounts.register(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let user = state
        .accounts
        .authenticate(&payload.username, &payload.password)
        .await?;

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(&user.id, user.role).map_err(|e| {
        error!(error = %e, "jwt sign access failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    Ok(Json(AuthResponse {
        access_token,
        user: user.into(),
    }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    let user = state.accounts.find_by_id(&auth.id).await?.ok_or_else(|| {
        error!(user_id = %auth.id, "user not found");
        (StatusCode::UNAUTHORIZED, "User not found".to_string())
    })?;
    Ok(Json(user.into()))
}
