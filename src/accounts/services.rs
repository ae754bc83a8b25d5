use std::sync::Arc;

use tracing::{info, warn};

use crate::accounts::clock::{Clock, SystemClock};
use crate::accounts::error::AccountError;
use crate::accounts::password::{CredentialVerifier, PlaintextVerifier};
use crate::accounts::repo::AccountStore;
use crate::accounts::repo_types::{Role, Status, User};
use crate::storage::KeyValueStore;

/// Fields supplied by a self-registering user.
#[derive(Debug, Clone, Default)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub building: String,
}

/// Account lifecycle: bootstrap, registration and credential checks.
///
/// Each operation reads the full collection, decides, and writes the full
/// collection back only when it inserted something. Two registrations racing
/// between load and save resolve as last writer wins.
#[derive(Clone)]
pub struct AccountService {
    pub(crate) store: AccountStore,
    pub(crate) verifier: Arc<dyn CredentialVerifier>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) admin_email: String,
}

impl AccountService {
    pub fn new(
        store: AccountStore,
        verifier: Arc<dyn CredentialVerifier>,
        clock: Arc<dyn Clock>,
        admin_email_domain: &str,
    ) -> Self {
        Self {
            store,
            verifier,
            clock,
            admin_email: format!("admin@{}", admin_email_domain),
        }
    }

    /// Plaintext credentials and the system clock.
    pub fn with_defaults(kv: Arc<dyn KeyValueStore>, admin_email_domain: &str) -> Self {
        Self::new(
            AccountStore::new(kv),
            Arc::new(PlaintextVerifier),
            Arc::new(SystemClock),
            admin_email_domain,
        )
    }

    pub fn store(&self) -> &AccountStore {
        &self.store
    }

    /// Create a pending account. Never logs the caller in.
    pub async fn register(&self, input: RegisterInput) -> Result<User, AccountError> {
        let mut users = self.bootstrapped_users().await?;

        if input.username.is_empty() || input.email.is_empty() || input.password.is_empty() {
            warn!("registration missing required fields");
            return Err(AccountError::ValidationFailed);
        }

        if users.has_username(&input.username) || users.has_email(&input.email) {
            warn!(username = %input.username, "username or email already registered");
            return Err(AccountError::DuplicateIdentity);
        }

        let user = User {
            id: self.clock.next_user_id(),
            username: input.username,
            email: Some(input.email),
            password: input.password,
            role: Role::User,
            building: input.building,
            status: Status::Pending,
            created_at: Some(self.clock.now()),
            extra: Default::default(),
        };
        users.push(user.clone());
        self.store.save(&users).await.map_err(AccountError::Storage)?;

        info!(
            user_id = %user.id,
            username = %user.username,
            building = %user.building,
            "user registered, pending approval"
        );
        Ok(user)
    }

    /// Check credentials and gate on approval state. Only `Approved` records
    /// succeed; a wrong username and a wrong password are indistinguishable.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AccountError> {
        let users = self.bootstrapped_users().await?;

        let found = users
            .users()
            .find(|u| u.username == username && self.verifier.verify(password, &u.password))
            .cloned();

        let Some(user) = found else {
            warn!(username = %username, "login invalid credentials");
            return Err(AccountError::InvalidCredentials);
        };

        match user.status {
            Status::Pending => {
                warn!(user_id = %user.id, "login refused: pending approval");
                Err(AccountError::Pending)
            }
            Status::Rejected => {
                warn!(user_id = %user.id, "login refused: registration rejected");
                Err(AccountError::Rejected)
            }
            Status::Approved => {
                info!(user_id = %user.id, role = ?user.role, "user logged in");
                Ok(user)
            }
        }
    }

    /// Records that do not decode are left out.
    pub async fn list(&self) -> Result<Vec<User>, AccountError> {
        let users = self.store.load().await.map_err(AccountError::Storage)?;
        Ok(users.into_users())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, AccountError> {
        Ok(self.list().await?.into_iter().find(|u| u.id == id))
    }
}
