use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use crate::accounts::services::AccountService;
use crate::config::AppConfig;
use crate::insight::services::{GeminiProvider, InsightProvider};
use crate::storage::{KeyValueStore, MemoryKvStore, PgKvStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub accounts: AccountService,
    pub insight: Option<Arc<dyn InsightProvider>>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let kv: Arc<dyn KeyValueStore> = match &config.database_url {
            Some(url) => {
                let db = PgPoolOptions::new()
                    .max_connections(10)
                    .connect(url)
                    .await
                    .context("connect to database")?;

                if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
                    warn!(error = %e, "migration failed; continuing");
                }
                info!("using postgres key-value store");
                Arc::new(PgKvStore::new(db))
            }
            None => {
                warn!("DATABASE_URL not set; accounts are kept in memory only");
                Arc::new(MemoryKvStore::new())
            }
        };

        let insight = config.insight.api_key.clone().map(|key| {
            let provider = GeminiProvider::new(key, config.insight.model.clone());
            Arc::new(provider) as Arc<dyn InsightProvider>
        });
        if insight.is_none() {
            warn!("GEMINI_API_KEY not set; dashboard insight uses fallback text");
        }

        let accounts = AccountService::with_defaults(kv, &config.admin_email_domain);
        Ok(Self::from_parts(config, accounts, insight))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        accounts: AccountService,
        insight: Option<Arc<dyn InsightProvider>>,
    ) -> Self {
        Self {
            config,
            accounts,
            insight,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::{InsightConfig, JwtConfig};

        let config = Arc::new(AppConfig {
            database_url: None,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
            },
            admin_email_domain: "imatoms.pro".into(),
            insight: InsightConfig {
                api_key: None,
                model: "fake".into(),
                timeout_secs: 1,
            },
        });
        let accounts = AccountService::with_defaults(Arc::new(MemoryKvStore::new()), "imatoms.pro");
        Self::from_parts(config, accounts, None)
    }
}
