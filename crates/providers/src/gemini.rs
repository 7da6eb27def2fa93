use crate::{reply_text, ProviderError, TextGenerator};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_KEY_HEADER: &str = "x-goog-api-key";

const NO_RESPONSE: &str = "No response from Gemini";
const MAX_ERROR_BODY: usize = 800;

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 2048,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

impl GeminiResponse {
    /// Text of the first candidate, all parts joined.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
    model: String,
    generation_config: GenerationConfig,
    api_key: Option<String>,
}

impl GeminiClient {
    /// An unconfigured client for `model`. Call [`configure`](Self::configure) before use.
    pub fn new(model: &str) -> Result<Self, ProviderError> {
        // No idle pooling: blocking calls each run on their own short-lived runtime.
        let http = Client::builder()
            .pool_max_idle_per_host(0)
            .build()?;
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.to_string(),
            generation_config: GenerationConfig::default(),
            api_key: None,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn request_body(&self, prompt: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: self.generation_config,
        }
    }

    /// Never fails: the reply text, or `"Error: <message>"`.
    pub async fn send_prompt(&self, prompt: &str) -> String {
        reply_text(self.generate(prompt).await)
    }

    /// Blocking form of [`send_prompt`](Self::send_prompt).
    pub fn send_prompt_blocking(&self, prompt: &str) -> String {
        reply_text(self.generate_blocking(prompt))
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn configure(&mut self, api_key: &str) {
        if api_key.trim().is_empty() {
            self.api_key = None;
        } else {
            self.api_key = Some(api_key.to_string());
            info!(model = %self.model, "gemini client configured");
        }
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let key = self.api_key.as_deref().ok_or(ProviderError::NotConfigured)?;
        debug!(model = %self.model, prompt_chars = prompt.chars().count(), "sending prompt");

        let resp = self
            .http
            .post(self.endpoint())
            .header(API_KEY_HEADER, key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| {
                let e = ProviderError::from(e);
                error!("Error calling Gemini API: {}", e);
                e
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            error!(%status, "Gemini API returned an error");
            return Err(ProviderError::Api {
                status,
                body: clip_body(&body),
            });
        }

        let body: GeminiResponse = resp.json().await?;
        Ok(body.into_text().unwrap_or_else(|| NO_RESPONSE.to_string()))
    }
}

fn clip_body(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return "(empty response body)".to_string();
    }
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
