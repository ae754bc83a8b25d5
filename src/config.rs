use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InsightConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Postgres URL for the key-value table. Unset means in-memory storage.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub admin_email_domain: String,
    pub insight: InsightConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "imatoms".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "imatoms-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 8),
        };
        let insight = InsightConfig {
            api_key: std::env::var("GEMINI_API_KEY").ok().filter(|v| !v.is_empty()),
            model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-3-flash-preview".into()),
            timeout_secs: std::env::var("INSIGHT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(10),
        };
        Ok(Self {
            database_url,
            jwt,
            admin_email_domain: std::env::var("ADMIN_EMAIL_DOMAIN")
                .unwrap_or_else(|_| "imatoms.pro".into()),
            insight,
        })
    }
}
