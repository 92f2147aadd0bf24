//! Prompt construction.
//!
//! Turns the three stylistic selections plus a free-form topic into the single
//! instruction string sent to the model.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Normalizes user input for option parsing: lower-case, `-`/`_` become spaces.
fn normalize(input: &str) -> String {
    input
        .trim()
        .to_ascii_lowercase()
        .replace(['-', '_'], " ")
}

/// Declares a closed option set whose variants each carry a prompt phrase.
macro_rules! prompt_option {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $phrase:literal, $label:literal;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// The phrase embedded into the rendered prompt.
            pub fn phrase(self) -> &'static str {
                match self {
                    $($name::$variant => $phrase,)+
                }
            }

            /// Label shown next to form controls.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.phrase())
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self> {
                let wanted = normalize(s);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| normalize(v.phrase()) == wanted || normalize(v.label()) == wanted)
                    .ok_or_else(|| AppError::invalid_option($kind, s))
            }
        }
    };
}

prompt_option! {
    /// Writing style of the generated text.
    Tone, "tone" {
        Professional => "professional", "PROFESSIONAL";
        Casual => "casual", "CASUAL";
        Funny => "funny", "FUNNY";
        Informative => "informative", "INFORMATIVE";
    }
}

prompt_option! {
    /// Shape of the generated text.
    Format, "format" {
        Paragraph => "paragraph", "PARAGRAPH";
        Email => "email draft", "EMAIL";
        Ideas => "list of ideas", "IDEAS";
        BlogPost => "blog post", "BLOG POST";
    }
}

prompt_option! {
    /// Rough size of the generated text.
    Length, "length" {
        Short => "short", "SHORT";
        Medium => "medium", "MEDIUM";
        Long => "long", "LONG";
    }
}

impl Default for Tone {
    fn default() -> Self {
        Tone::Casual
    }
}

impl Default for Format {
    fn default() -> Self {
        Format::Paragraph
    }
}

impl Default for Length {
    fn default() -> Self {
        Length::Medium
    }
}

/// Renders the generation prompt.
///
/// The topic is embedded verbatim and is not validated here; an empty topic
/// still yields a well-formed (if pointless) instruction.
///
/// ```
/// use generai_core::prompt::{build_prompt, Format, Length, Tone};
///
/// let prompt = build_prompt("cats", Tone::Casual, Format::Paragraph, Length::Short);
/// assert_eq!(prompt, "Compose a short paragraph addressing cats, employing a casual style.");
/// ```
pub fn build_prompt(topic: &str, tone: Tone, format: Format, length: Length) -> String {
    let prompt = format!(
        "Compose a {length} {format} addressing {topic}, employing a {tone} style.",
        length = length.phrase(),
        format = format.phrase(),
        tone = tone.phrase(),
    );
    prompt.trim().to_string()
}

/// One user action's worth of generation input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationRequest {
    pub topic: String,
    pub tone: Tone,
    pub format: Format,
    pub length: Length,
}

impl GenerationRequest {
    pub fn new(topic: impl Into<String>, tone: Tone, format: Format, length: Length) -> Self {
        Self {
            topic: topic.into(),
            tone,
            format,
            length,
        }
    }

    /// Renders this request's prompt.
    pub fn prompt(&self) -> String {
        build_prompt(&self.topic, self.tone, self.format, self.length)
    }

    /// Rejects a blank topic. Front-ends call this before submitting.
    pub fn validate(&self) -> Result<()> {
        if self.topic.trim().is_empty() {
            return Err(AppError::EmptyTopic);
        }
        Ok(())
    }
}
