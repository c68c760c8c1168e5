// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! AI draft generation for the admin editor.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use validator::Validate;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// What kind of text to draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationKind {
    BlogPost,
    Excerpt,
    SeoDescription,
    ServiceDescription,
}

impl GenerationKind {
    fn instructions(self) -> &'static str {
        match self {
            GenerationKind::BlogPost => {
                "Write a well structured blog post in Markdown with headings. \
                 Do not include a title line."
            }
            GenerationKind::Excerpt => "Write a one or two sentence teaser for a blog post.",
            GenerationKind::SeoDescription => {
                "Write a meta description under 160 characters. Plain text only."
            }
            GenerationKind::ServiceDescription => {
                "Write a short, persuasive description of a professional service offering."
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateRequest {
    pub kind: GenerationKind,
    #[validate(length(min = 3, max = 2000))]
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub kind: GenerationKind,
    pub text: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

/// AI provider client.
#[derive(Clone)]
pub struct AiService {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl AiService {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url,
            api_key,
            model,
        }
    }

    /// Generate a draft for the admin to edit.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<String, AppError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(request))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("AI request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "AI provider returned {}: {}",
                status, body
            )));
        }

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid AI provider response: {}", e)))?;

        let text = extract_text(body)
            .ok_or_else(|| AppError::Upstream("AI provider returned no text".to_string()))?;

        tracing::info!(kind = ?request.kind, chars = text.len(), "Generated draft");
        Ok(text)
    }
}

fn request_body(request: &GenerateRequest) -> serde_json::Value {
    json!({
        "systemInstruction": {
            "parts": [{ "text": request.kind.instructions() }]
        },
        "contents": [{
            "role": "user",
            "parts": [{ "text": request.prompt }]
        }]
    })
}

fn extract_text(response: ApiResponse) -> Option<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .map(|p| p.text)
        .collect();

    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}
