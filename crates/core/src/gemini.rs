use crate::client::GenerationClient;
use crate::config::Config;
use crate::error::{AppError, GenerationFailure, Result};
use async_trait::async_trait;
use gemini_rust::{Content, Gemini, Message, Part, Role};
use tracing::{debug, warn};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";

/// [`GenerationClient`] backed by Google's hosted Gemini models.
pub struct GeminiClient {
    client: Gemini,
    model_name: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self> {
        // Set the base URL explicitly to avoid a BadScheme error from the client
        let base_url = url::Url::parse(BASE_URL)
            .map_err(|e| AppError::config(format!("Invalid base URL: {}", e)))?;

        let model_name = model_path(&config.model_name);
        let model_url = format!("{}{}", BASE_URL, model_name);

        let client = Gemini::with_model_and_base_url(&config.gemini_api_key, model_url, base_url)
            .map_err(|e| AppError::config(format!("Failed to create Gemini client: {}", e)))?;

        Ok(Self { client, model_name })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    /// Sends the prompt as a single user message and returns the joined text
    /// parts of the first candidate.
    async fn generate(&self, prompt: &str) -> std::result::Result<String, GenerationFailure> {
        let text_part = Part::Text {
            text: prompt.to_string(),
            thought: None,
            thought_signature: None,
        };

        let message = Message {
            role: Role::User,
            content: Content {
                role: Some(Role::User),
                parts: Some(vec![text_part]),
            },
        };

        debug!(model = %self.model_name, "sending generate request");
        let response = self
            .client
            .generate_content()
            .with_messages(vec![message])
            .execute()
            .await
            .map_err(|e| GenerationFailure::new(e.to_string()))?;

        let Some(candidate) = response.candidates.first() else {
            warn!(model = %self.model_name, "response contained no candidates");
            return Ok(String::new());
        };

        let parts = candidate.content.parts.as_deref().unwrap_or_default();
        Ok(collect_text(parts))
    }
}

/// Prefixes bare model names with `models/`.
fn model_path(model_name: &str) -> String {
    if model_name.starts_with("models/") {
        model_name.to_string()
    } else {
        format!("models/{}", model_name)
    }
}

/// Joins answer text, skipping thought parts and non-text parts.
fn collect_text(parts: &[Part]) -> String {
    parts
        .iter()
        .filter_map(|part| match part {
            Part::Text { text, thought, .. } if !thought.unwrap_or(false) => Some(text.as_str()),
            _ => None,
        })
        .collect()
}
