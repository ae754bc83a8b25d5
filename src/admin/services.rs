use axum::http::StatusCode;
use thiserror::Error;
use tracing::{info, warn};

use crate::accounts::repo::AccountStore;
use crate::accounts::repo_types::{Status, User};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("user not found")]
    NotFound,
    #[error("cannot change status from {from:?} to {to:?}")]
    InvalidTransition { from: Status, to: Status },
    #[error("storage failure: {0}")]
    Storage(#[source] anyhow::Error),
}

impl From<AdminError> for (StatusCode, String) {
    fn from(e: AdminError) -> Self {
        let code = match e {
            AdminError::NotFound => StatusCode::NOT_FOUND,
            AdminError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AdminError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (code, e.to_string())
    }
}

/// Decide a pending registration. Only pending records may move, and only
/// to approved or rejected.
pub async fn set_status(
    store: &AccountStore,
    user_id: &str,
    next: Status,
) -> Result<User, AdminError> {
    let mut users = store.load().await.map_err(AdminError::Storage)?;
    let user = users
        .users_mut()
        .find(|u| u.id == user_id)
        .ok_or(AdminError::NotFound)?;

    if !user.status.can_transition_to(next) {
        warn!(user_id = %user_id, from = ?user.status, to = ?next, "status change refused");
        return Err(AdminError::InvalidTransition {
            from: user.status,
            to: next,
        });
    }
    user.status = next;
    let updated = user.clone();

    store.save(&users).await.map_err(AdminError::Storage)?;
    info!(user_id = %user_id, status = ?next, "user status changed");
    Ok(updated)
}

pub async fn pending_count(store: &AccountStore) -> Result<usize, AdminError> {
    let users = store.load().await.map_err(AdminError::Storage)?;
    Ok(users.users().filter(|u| u.status == Status::Pending).count())
}
