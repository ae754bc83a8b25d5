use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;

/// Durable string key-value store. Values are opaque to the store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// Postgres-backed store over the `kv_store` table.
#[derive(Clone)]
pub struct PgKvStore {
    db: PgPool,
}

impl PgKvStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl KeyValueStore for PgKvStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let row = sqlx::query_as::<_, (String,)>(
            r#"
            SELECT value
              FROM kv_store
             WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.db)
        .await
        .with_context(|| format!("kv get {}", key))?;
        Ok(row.map(|(v,)| v))
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (key) DO UPDATE
               SET value = EXCLUDED.value,
                   updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.db)
        .await
        .with_context(|| format!("kv set {}", key))?;
        Ok(())
    }
}

/// Process-local store. Lost on restart; used for local runs and tests.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent reads fail until switched back.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes fail until switched back.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            anyhow::bail!("memory kv: read failure injected for {}", key);
        }
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("memory kv: write failure injected for {}", key);
        }
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
