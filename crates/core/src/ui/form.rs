//! Form state for the generator window.
//!
//! Kept free of egui types so the submit rules can be tested directly.

use super::settings::Settings;
use crate::error::Result;
use crate::prompt::{Format, GenerationRequest, Length, Tone};
use crate::state::UiState;

/// What the user has typed and selected so far.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GeneratorForm {
    pub topic: String,
    pub tone: Tone,
    pub format: Format,
    pub length: Length,
}

impl GeneratorForm {
    /// Starts an empty form with the selections remembered in `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            topic: String::new(),
            tone: settings.tone,
            format: settings.format,
            length: settings.length,
        }
    }

    /// Copies the current selections into `settings`.
    pub fn remember(&self, settings: &mut Settings) {
        settings.tone = self.tone;
        settings.format = self.format;
        settings.length = self.length;
    }

    /// The generate button is enabled only for a non-blank topic and while
    /// nothing is in flight.
    pub fn can_submit(&self, state: &UiState) -> bool {
        !self.topic.trim().is_empty() && !state.is_loading()
    }

    /// Builds a validated request from the form.
    pub fn to_request(&self) -> Result<GenerationRequest> {
        let request = GenerationRequest::new(self.topic.clone(), self.tone, self.format, self.length);
        request.validate()?;
        Ok(request)
    }
}
