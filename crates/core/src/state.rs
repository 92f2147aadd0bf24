//! Observable state of a generation attempt.

/// Current state of the generator, as seen by every observer.
///
/// The state follows a small machine:
/// `Initial` -> `Loading` -> `Success` | `Error`, and any terminal state goes
/// back to `Loading` when a new request is issued. Values are replaced whole,
/// never edited in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum UiState {
    /// Nothing has been requested yet.
    #[default]
    Initial,
    /// A request is in flight.
    Loading,
    /// The model produced text.
    Success {
        /// Text returned by the model.
        output_text: String,
    },
    /// The request failed.
    Error {
        /// Description of the failure, shown verbatim. May be empty.
        error_message: String,
    },
}

impl UiState {
    pub fn success(output_text: impl Into<String>) -> Self {
        Self::Success {
            output_text: output_text.into(),
        }
    }

    pub fn error(error_message: impl Into<String>) -> Self {
        Self::Error {
            error_message: error_message.into(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// True for `Success` and `Error`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Error { .. })
    }
}
