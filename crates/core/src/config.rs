use std::env;
use std::time::Duration;
use crate::controller::{ControllerOptions, EmptyOutputPolicy};
use crate::error::{AppError, Result};
use dotenvy::dotenv;

pub const DEFAULT_MODEL: &str = "gemini-flash-latest";

#[derive(Clone, Debug)]
pub struct Config {
    pub gemini_api_key: String,
    pub model_name: String,
    pub timeout: Option<Duration>,
    pub empty_output: EmptyOutputPolicy,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file if it exists, ignore if it doesn't
        let _ = dotenv();

        let api_key = env::var("GEMINI_API_KEY")
            .map_err(|_| AppError::MissingEnvVar("GEMINI_API_KEY".to_string()))?;

        let model_name = env::var("GEMINI_MODEL")
            .unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let timeout = env::var("GENERAI_TIMEOUT_SECS")
            .ok()
            .map(|raw| parse_timeout(&raw))
            .transpose()?;

        let empty_output = match env::var("GENERAI_EMPTY_OUTPUT") {
            Ok(raw) => raw.parse::<EmptyOutputPolicy>()?,
            Err(_) => EmptyOutputPolicy::default(),
        };

        Ok(Self {
            gemini_api_key: api_key,
            model_name,
            timeout,
            empty_output,
        })
    }

    /// Builds a config without touching the environment.
    pub fn new(api_key: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            gemini_api_key: api_key.into(),
            model_name: model_name.into(),
            timeout: None,
            empty_output: EmptyOutputPolicy::default(),
        }
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            timeout: self.timeout,
            empty_output: self.empty_output,
        }
    }
}

/// Parses a whole number of seconds; zero is rejected.
pub fn parse_timeout(raw: &str) -> Result<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(AppError::config(format!(
            "timeout must be a positive number of seconds, got '{raw}'"
        ))),
    }
}
