use std::sync::Arc;

use anyhow::Context;
use tracing::warn;

use crate::accounts::repo_types::UserCollection;
use crate::storage::KeyValueStore;

/// Key holding the JSON-encoded user collection.
pub const USERS_KEY: &str = "imatoms_users";

/// Whole-collection access to the user records.
///
/// Every call goes back to the key-value store; nothing is cached between
/// operations, so changes made by other writers are seen on the next call.
#[derive(Clone)]
pub struct AccountStore {
    kv: Arc<dyn KeyValueStore>,
}

impl AccountStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Load all records in stored order.
    ///
    /// A missing or unreadable value loads as empty. A value that is present
    /// but not a JSON array is an error, so it is never overwritten.
    /// Individual records that do not decode are kept as they are.
    pub async fn load(&self) -> anyhow::Result<UserCollection> {
        let raw = match self.kv.get(USERS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(UserCollection::default()),
            Err(e) => {
                warn!(error = %e, "user store read failed; treating as empty");
                return Ok(UserCollection::default());
            }
        };
        let users: UserCollection =
            serde_json::from_str(&raw).context("decode stored user collection")?;
        let skipped = users.unrecognised_count();
        if skipped > 0 {
            warn!(skipped, "user store holds records that do not decode; keeping them as-is");
        }
        Ok(users)
    }

    /// Replace the whole collection.
    pub async fn save(&self, users: &UserCollection) -> anyhow::Result<()> {
        let raw = serde_json::to_string(users).context("encode users")?;
        self.kv
            .set(USERS_KEY, &raw)
            .await
            .context("persist users")?;
        Ok(())
    }
}
