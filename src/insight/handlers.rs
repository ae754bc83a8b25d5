use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    accounts::jwt::AuthUser,
    insight::services::{fetch_insight, Lang},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct InsightQuery {
    #[serde(default)]
    pub lang: Lang,
}

#[derive(Debug, Serialize)]
pub struct InsightResponse {
    pub insight: String,
}

pub fn insight_routes() -> Router<AppState> {
    Router::new().route("/dashboard/insight", get(get_insight))
}

#[instrument(skip(state))]
pub async fn get_insight(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(q): Query<InsightQuery>,
) -> Result<Json<InsightResponse>, (StatusCode, String)> {
    let user = state
        .accounts
        .find_by_id(&auth.id)
        .await?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    let timeout = Duration::from_secs(state.config.insight.timeout_secs);
    let insight = fetch_insight(state.insight.as_deref(), &user.username, q.lang, timeout).await;
    Ok(Json(InsightResponse { insight }))
}
