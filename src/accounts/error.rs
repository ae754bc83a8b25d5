use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("please fill in all required fields")]
    ValidationFailed,
    #[error("username or email already exists")]
    DuplicateIdentity,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("your account is pending approval")]
    Pending,
    #[error("your registration has been rejected")]
    Rejected,
    #[error("storage failure: {0}")]
    Storage(#[source] anyhow::Error),
}

impl AccountError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AccountError::ValidationFailed => StatusCode::BAD_REQUEST,
            AccountError::DuplicateIdentity => StatusCode::CONFLICT,
            AccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AccountError::Pending | AccountError::Rejected => StatusCode::FORBIDDEN,
            AccountError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AccountError> for (StatusCode, String) {
    fn from(e: AccountError) -> Self {
        (e.status_code(), e.to_string())
    }
}
