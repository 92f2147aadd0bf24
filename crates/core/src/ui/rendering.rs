//! UI rendering helpers.
//!
//! Reusable drawing functions for the generator window: the radio rows used
//! for tone, format and length, and the result area that mirrors [`UiState`].

use crate::state::UiState;
use eframe::egui;
use egui_commonmark::{CommonMarkCache, CommonMarkViewer};
use tracing::warn;

/// Maximum height of the scrollable result area.
pub const RESULT_MAX_HEIGHT: f32 = 360.0;

/// Draws a titled row of radio buttons, one per option.
///
/// # Arguments
/// * `ui` - The egui ui to draw into
/// * `title` - Heading shown above the row
/// * `current` - The selected option, updated on click
/// * `options` - Every option, in display order
/// * `label` - Text shown next to each radio button
pub fn option_row<T>(
    ui: &mut egui::Ui,
    title: &str,
    current: &mut T,
    options: &[T],
    label: impl Fn(T) -> &'static str,
) where
    T: Copy + PartialEq,
{
    ui.label(egui::RichText::new(title).strong());
    ui.horizontal_wrapped(|ui| {
        for &option in options {
            ui.radio_value(current, option, label(option));
        }
    });
}

/// Draws the result area for the current state.
///
/// Nothing is shown before the first request. Loading shows a spinner,
/// success shows the generated markdown with a copy button and errors are
/// printed in red.
pub fn render_result(ui: &mut egui::Ui, state: &UiState, cache: &mut CommonMarkCache) {
    match state {
        UiState::Initial => {}
        UiState::Loading => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Generating...");
            });
        }
        UiState::Success { output_text } => {
            egui::ScrollArea::vertical()
                .max_height(RESULT_MAX_HEIGHT)
                .id_salt("result_scroll")
                .show(ui, |ui| {
                    CommonMarkViewer::new().show(ui, cache, output_text);
                });

            ui.separator();
            if ui.button("Copy").clicked() {
                copy_to_clipboard(output_text);
            }
        }
        UiState::Error { error_message } => {
            ui.label(egui::RichText::new(error_message).color(egui::Color32::RED));
        }
    }
}

fn copy_to_clipboard(text: &str) {
    match arboard::Clipboard::new() {
        Ok(mut clipboard) => {
            if let Err(e) = clipboard.set_text(text) {
                warn!("failed to copy to clipboard: {}", e);
            }
        }
        Err(e) => warn!("could not access clipboard: {}", e),
    }
}
