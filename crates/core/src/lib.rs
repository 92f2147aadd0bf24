//! Generai Core Library
//!
//! This library turns a topic plus a few stylistic choices into a prompt,
//! sends it to a hosted Gemini model and exposes the outcome as an observable
//! state.
//!
//! # Overview
//!
//! - **Prompts**: tone, format and length selections and the prompt template via [`prompt`]
//! - **Generation**: the [`GenerationClient`] capability and its Gemini implementation in [`gemini`]
//! - **Request lifecycle**: the `Initial -> Loading -> Success | Error` machine in [`controller`]
//! - **User Interface**: a desktop form via [`ui`]
//!
//! # Quick Start
//!
//! ```ignore
//! use generai_core::{Generai, GenerationRequest, Format, Length, Tone};
//!
//! let app = Generai::new()?;
//! let controller = app.controller()?;
//! let mut states = controller.subscribe();
//!
//! controller.request(&GenerationRequest::new("cats", Tone::Casual, Format::Paragraph, Length::Short));
//! let state = states.wait_for(|s| s.is_terminal()).await?.clone();
//! println!("{:?}", state);
//! ```
//!
//! # Module Structure
//!
//! - [`client`]: The generation capability trait
//! - [`config`]: Configuration loading and management
//! - [`controller`]: Request lifecycle and state publication
//! - [`error`]: Error types and result aliases
//! - [`gemini`]: Gemini API client
//! - [`prompt`]: Option enums and prompt construction
//! - [`state`]: The observable UI state
//! - [`ui`]: User interface components

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod gemini;
pub mod prompt;
pub mod state;
pub mod ui;

// Re-export primary types for convenience
pub use client::GenerationClient;
pub use config::Config;
pub use controller::{
    ControllerOptions, EmptyOutputPolicy, GenerationController, RequestId, RequestTicket,
};
pub use error::{AppError, GenerationFailure, Result};
pub use gemini::GeminiClient;
pub use prompt::{build_prompt, Format, GenerationRequest, Length, Tone};
pub use state::UiState;

use std::sync::Arc;

/// Main entry point for the Generai application.
///
/// This struct provides a facade over the various subsystems,
/// handling initialization and wiring.
pub struct Generai {
    config: Config,
}

impl Generai {
    /// Creates a new instance with configuration from the environment
    /// (including `.env` files).
    ///
    /// # Errors
    ///
    /// Returns an error if `GEMINI_API_KEY` is missing or an option is invalid.
    pub fn new() -> Result<Self> {
        let config = Config::load()?;
        Ok(Self { config })
    }

    /// Creates an instance with custom configuration.
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Builds a controller backed by Gemini, running on the caller's tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the Gemini client cannot be created or no runtime
    /// is active.
    pub fn controller(&self) -> Result<GenerationController> {
        let client: Arc<dyn GenerationClient> = Arc::new(GeminiClient::new(&self.config)?);
        GenerationController::with_current_runtime(client, self.config.controller_options())
    }

    /// Opens the desktop window and blocks until it is closed.
    pub fn run_interactive(&self) -> Result<()> {
        ui::run_generator_ui(self.config.clone())
    }

    /// Returns a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a mutable reference to the configuration.
    ///
    /// Allows modifying settings like the model name after initialization.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }
}

/// Initializes the library by loading environment variables.
///
/// Call this once at application startup. This loads `.env` files if present.
pub fn init() {
    let _ = dotenvy::dotenv();
}
