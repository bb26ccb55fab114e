use async_trait::async_trait;
use reqwest::Client;

use crate::error::{PriceRadarError, Result};
use crate::llm::types::*;
use crate::llm::PriceGenerator;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: Option<f32>,
}

impl GeminiClient {
    pub fn new(api_key: String, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: model.into(),
            base_url: GEMINI_BASE_URL.to_string(),
            temperature: None,
        }
    }

    /// Points the client at a different endpoint, e.g. a local proxy.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn generate_content(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let payload = GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let res = self.client.post(&url).json(&payload).send().await?;
        let status = res.status();

        if !status.is_success() {
            let err_text = res.text().await?;
            return Err(PriceRadarError::GenerationFailed(format!(
                "Gemini API Error (status {}): {}",
                status, err_text
            )));
        }

        let body: GenerateContentResponse = res.json().await?;
        first_text(body)
    }
}

fn first_text(body: GenerateContentResponse) -> Result<String> {
    let part = body
        .candidates
        .ok_or_else(|| PriceRadarError::GenerationFailed("No candidates returned".to_string()))?
        .into_iter()
        .next()
        .ok_or_else(|| PriceRadarError::GenerationFailed("Empty candidates list".to_string()))?
        .content
        .parts
        .into_iter()
        .next()
        .ok_or_else(|| PriceRadarError::GenerationFailed("No parts in content".to_string()))?;

    match part {
        Part::Text { text } => Ok(text),
        Part::Other(_) => Err(PriceRadarError::GenerationFailed(
            "Model returned non-text content".to_string(),
        )),
    }
}

#[async_trait]
impl PriceGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_content(prompt).await
    }
}
