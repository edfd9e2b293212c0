//! Gemini API client (https://generativelanguage.googleapis.com/v1beta).
//! Single-turn generateContent and model listing; no streaming.

use serde::{Deserialize, Serialize};
use serde_json::json;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// The four harm categories whose block thresholds are relaxed on every
/// request. The model can still refuse regardless of these settings; a
/// refusal shows up as an empty candidate list, not an error.
const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Client for the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("gemini request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("gemini api error: {0}")]
    Api(String),
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            base_url,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// POST /models/{model}:generateContent — single-turn generation with all
    /// safety thresholds set to BLOCK_NONE.
    pub async fn generate(
        &self,
        model: &str,
        prompt: &str,
    ) -> Result<GenerateResponse, GeminiError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );
        let safety_settings: Vec<serde_json::Value> = SAFETY_CATEGORIES
            .iter()
            .map(|c| json!({ "category": c, "threshold": "BLOCK_NONE" }))
            .collect();
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "safetySettings": safety_settings,
        });
        let res = self.client.post(&url).json(&body).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(GeminiError::Api(format!("{} {}", status, body)));
        }
        let data: GenerateResponse = res.json().await?;
        Ok(data)
    }

    /// GET /models — list available models.
    pub async fn list_models(&self) -> Result<Vec<GeminiModel>, GeminiError> {
        let url = format!("{}/models?key={}", self.base_url, self.api_key);
        let res = self.client.get(&url).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(GeminiError::Api(format!("{} {}", status, body)));
        }
        let data: ModelsResponse = res.json().await?;
        Ok(data.models.unwrap_or_default())
    }
}

/// One entry from the model listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiModel {
    /// Full resource name, e.g. "models/gemini-1.5-flash-latest".
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub input_token_limit: u64,
    #[serde(default)]
    pub output_token_limit: u64,
}

impl GeminiModel {
    /// Model code usable with the generate call: the last path segment of `name`.
    pub fn code(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    models: Option<Vec<GeminiModel>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Clone, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// Generated text: all parts of the first candidate concatenated. Empty
    /// when the model produced nothing (e.g. a safety refusal).
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_code_is_last_path_segment() {
        let model = GeminiModel {
            name: "models/gemini-1.5-flash-latest".to_string(),
            display_name: String::new(),
            description: String::new(),
            input_token_limit: 0,
            output_token_limit: 0,
        };
        assert_eq!(model.code(), "gemini-1.5-flash-latest");
    }

    #[test]
    fn generate_response_text_joins_parts() {
        let raw = r#"{
            "candidates": [
                { "content": { "parts": [{ "text": "Hello" }, { "text": " world" }] } }
            ]
        }"#;
        let res: GenerateResponse = serde_json::from_str(raw).expect("parse");
        assert_eq!(res.text(), "Hello world");
    }

    #[test]
    fn empty_candidates_is_empty_text_not_error() {
        let res: GenerateResponse = serde_json::from_str("{}").expect("parse");
        assert_eq!(res.text(), "");
    }

    #[test]
    fn model_list_parses_camel_case() {
        let raw = r#"{
            "models": [{
                "name": "models/gemini-1.5-pro-latest",
                "displayName": "Gemini 1.5 Pro",
                "description": "Mid-size multimodal model",
                "inputTokenLimit": 2000000,
                "outputTokenLimit": 8192
            }]
        }"#;
        let res: ModelsResponse = serde_json::from_str(raw).expect("parse");
        let models = res.models.expect("models");
        assert_eq!(models[0].code(), "gemini-1.5-pro-latest");
        assert_eq!(models[0].input_token_limit, 2_000_000);
    }
}
