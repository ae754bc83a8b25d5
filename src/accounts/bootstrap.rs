use tracing::{debug, warn};

use crate::accounts::error::AccountError;
use crate::accounts::repo_types::{Role, Status, User, UserCollection};
use crate::accounts::services::AccountService;

pub const ADMIN_ID: &str = "admin-1";
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin1234";
pub const ADMIN_BUILDING: &str = "all";

pub(crate) fn default_admin(email: &str) -> User {
    User {
        id: ADMIN_ID.into(),
        username: ADMIN_USERNAME.into(),
        email: Some(email.into()),
        password: ADMIN_PASSWORD.into(),
        role: Role::Admin,
        building: ADMIN_BUILDING.into(),
        status: Status::Approved,
        created_at: None,
        extra: Default::default(),
    }
}

impl AccountService {
    /// Make sure the `admin` account exists. Reads only when it already does.
    pub async fn ensure_admin(&self) -> Result<(), AccountError> {
        self.bootstrapped_users().await.map(|_| ())
    }

    /// Load the collection, provisioning the administrator first if missing.
    /// Runs at the start of every login and registration so a wiped store
    /// heals itself.
    pub(crate) async fn bootstrapped_users(&self) -> Result<UserCollection, AccountError> {
        let mut users = self.store.load().await.map_err(|e| {
            warn!(error = %e, "user store unusable; refusing to overwrite it");
            AccountError::Storage(e)
        })?;
        if users.has_username(ADMIN_USERNAME) {
            debug!("admin account present");
            return Ok(users);
        }

        users.push(default_admin(&self.admin_email));
        self.store.save(&users).await.map_err(|e| {
            warn!(error = %e, "failed to persist bootstrap admin");
            AccountError::Storage(e)
        })?;
        warn!(username = ADMIN_USERNAME, "bootstrapped default admin account");
        Ok(users)
    }
}

#[cfg(test)]
mod bootstrap_tests {
    use std::sync::Arc;

    use super::*;
    use crate::accounts::repo::{AccountStore, USERS_KEY};
    use crate::storage::{KeyValueStore, MemoryKvStore};

    fn service(kv: Arc<MemoryKvStore>) -> AccountService {
        AccountService::with_defaults(kv, "imatoms.pro")
    }

    #[tokio::test]
    async fn empty_store_gets_exactly_one_admin() {
        let kv = Arc::new(MemoryKvStore::new());
        service(kv.clone()).ensure_admin().await.unwrap();

        let users = AccountStore::new(kv).load().await.unwrap().into_users();
        assert_eq!(users.len(), 1);
        let admin = &users[0];
        assert_eq!(admin.id, "admin-1");
        assert_eq!(admin.username, "admin");
        assert_eq!(admin.password, "admin1234");
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.status, Status::Approved);
        assert_eq!(admin.building, "all");
        assert_eq!(admin.email.as_deref(), Some("admin@imatoms.pro"));
    }

    #[tokio::test]
    async fn second_call_changes_nothing() {
        let kv = Arc::new(MemoryKvStore::new());
        let svc = service(kv.clone());
        svc.ensure_admin().await.unwrap();
        let before = kv.get(USERS_KEY).await.unwrap();

        // a write now would fail, so success proves no write happened
        kv.set_fail_writes(true);
        svc.ensure_admin().await.unwrap();
        assert_eq!(kv.get(USERS_KEY).await.unwrap(), before);
    }

    #[tokio::test]
    async fn wiped_store_is_healed() {
        let kv = Arc::new(MemoryKvStore::new());
        let svc = service(kv.clone());
        svc.ensure_admin().await.unwrap();
        kv.set(USERS_KEY, "[]").await.unwrap();

        svc.ensure_admin().await.unwrap();
        let users = AccountStore::new(kv).load().await.unwrap().into_users();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "admin");
    }

    #[tokio::test]
    async fn existing_users_are_kept_when_admin_is_added() {
        let kv = Arc::new(MemoryKvStore::new());
        let mut someone = default_admin("x@y.z");
        someone.id = "user-1".into();
        someone.username = "carol".into();
        AccountStore::new(kv.clone())
            .save(&vec![someone].into())
            .await
            .unwrap();

        service(kv.clone()).ensure_admin().await.unwrap();
        let users = AccountStore::new(kv).load().await.unwrap().into_users();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "carol");
        assert_eq!(users[1].username, "admin");
    }

    #[tokio::test]
    async fn undecodable_admin_entry_is_not_duplicated() {
        let kv = Arc::new(MemoryKvStore::new());
        let raw = r#"[{"id":"admin-1","username":"admin","role":"superuser"}]"#;
        kv.set(USERS_KEY, raw).await.unwrap();

        service(kv.clone()).ensure_admin().await.unwrap();
        assert_eq!(kv.get(USERS_KEY).await.unwrap().as_deref(), Some(raw));
    }

    #[tokio::test]
    async fn corrupt_collection_is_left_alone() {
        let kv = Arc::new(MemoryKvStore::new());
        kv.set(USERS_KEY, "{truncated").await.unwrap();

        let err = service(kv.clone()).ensure_admin().await.unwrap_err();
        assert!(matches!(err, AccountError::Storage(_)));
        assert_eq!(kv.get(USERS_KEY).await.unwrap().as_deref(), Some("{truncated"));
    }

    #[tokio::test]
    async fn bootstrap_write_failure_surfaces() {
        let kv = Arc::new(MemoryKvStore::new());
        kv.set_fail_writes(true);
        let err = service(kv).ensure_admin().await.unwrap_err();
        assert!(matches!(err, AccountError::Storage(_)));
    }
}
