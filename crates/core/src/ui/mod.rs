//! Desktop user interface for generai.
//!
//! This module provides a small egui window that collects a topic, tone,
//! format and length, sends them through a
//! [`GenerationController`](crate::controller::GenerationController) and
//! renders the resulting state.
//!
//! # Architecture
//!
//! The UI is split into focused submodules:
//! - [`settings`]: User preferences and persistence
//! - [`form`]: Form state and submit rules, independent of egui
//! - [`rendering`]: Drawing helpers for selectors and the result area
//! - [`generator_app`]: Main application logic
//!
//! # Usage
//!
//! ```ignore
//! use generai_core::{ui, Config};
//!
//! let config = Config::load()?;
//! ui::run_generator_ui(config)?;
//! ```

mod form;
mod generator_app;
mod rendering;
mod settings;

// Public API exports
pub use form::GeneratorForm;
pub use generator_app::GeneratorApp;
pub use settings::{Settings, AVAILABLE_MODELS};

use crate::config::Config;
use crate::error::Result;

/// Opens the generator window and blocks until the user closes it.
///
/// # Arguments
/// * `config` - Application configuration with API key and defaults
///
/// # Errors
/// Returns an error if the window or its async runtime cannot be started.
pub fn run_generator_ui(config: Config) -> Result<()> {
    generator_app::run(config)
}
