use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

const SYSTEM_INSTRUCTION: &str = "You are the iMATOMs AI Hub. Futuristic and professional tone.";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
pub enum Lang {
    #[default]
    #[serde(alias = "en")]
    EN,
    #[serde(alias = "th")]
    TH,
}

impl Lang {
    fn name(self) -> &'static str {
        match self {
            Lang::EN => "English",
            Lang::TH => "Thai",
        }
    }

    pub fn fallback(self) -> &'static str {
        match self {
            Lang::EN => "Warning: Neural bridge unstable.",
            Lang::TH => "คำเตือน: ระบบเชื่อมต่อไม่เสถียร",
        }
    }

    pub fn ready(self) -> &'static str {
        match self {
            Lang::EN => "Neural connection established. Ready.",
            Lang::TH => "เชื่อมต่อระบบประสาทสำเร็จ ระบบพร้อมทำงาน",
        }
    }
}

/// Generates advisory text for the dashboard.
#[async_trait]
pub trait InsightProvider: Send + Sync {
    async fn generate(&self, system: &str, prompt: &str) -> anyhow::Result<String>;
}

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl InsightProvider for GeminiProvider {
    async fn generate(&self, system: &str, prompt: &str) -> anyhow::Result<String> {
        let url = format!("{}/{}:generateContent", GEMINI_BASE_URL, self.model);
        let body = json!({
            "systemInstruction": { "parts": [{ "text": system }] },
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("gemini request")?
            .error_for_status()
            .context("gemini status")?;

        let parsed: GenerateResponse = response.json().await.context("gemini response body")?;
        Ok(parsed.text())
    }
}

pub fn build_prompt(username: &str, lang: Lang) -> String {
    format!(
        "Provide a one-sentence professional facility manager summary in {} for iMATOMs v3.1.0. \
         Mention: Reliability, Safety, Efficiency, ESG, and Utilization. User: {}.",
        lang.name(),
        username
    )
}

/// Dashboard summary for `username`. Never fails: errors and timeouts fall
/// back to a fixed warning, empty output to a fixed ready message.
pub async fn fetch_insight(
    provider: Option<&dyn InsightProvider>,
    username: &str,
    lang: Lang,
    timeout: Duration,
) -> String {
    let Some(provider) = provider else {
        debug!("no insight provider configured");
        return lang.fallback().to_string();
    };

    let prompt = build_prompt(username, lang);
    match tokio::time::timeout(timeout, provider.generate(SYSTEM_INSTRUCTION, &prompt)).await {
        Ok(Ok(text)) if !text.trim().is_empty() => text,
        Ok(Ok(_)) => lang.ready().to_string(),
        Ok(Err(e)) => {
            warn!(error = %e, "insight generation failed");
            lang.fallback().to_string()
        }
        Err(_) => {
            warn!(timeout_ms = timeout.as_millis() as u64, "insight generation timed out");
            lang.fallback().to_string()
        }
    }
}
