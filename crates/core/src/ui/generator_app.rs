//! Main generator window.
//!
//! This module contains the `GeneratorApp` struct which implements the
//! `eframe::App` trait: a topic field, tone/format/length selectors and the
//! result area driven by a [`GenerationController`].

use super::form::GeneratorForm;
use super::rendering::{option_row, render_result};
use super::settings::{Settings, AVAILABLE_MODELS};
use crate::client::GenerationClient;
use crate::config::Config;
use crate::controller::GenerationController;
use crate::error::{AppError, Result};
use crate::gemini::GeminiClient;
use crate::prompt::{Format, Length, Tone};
use crate::state::UiState;
use eframe::egui;
use egui_commonmark::CommonMarkCache;
use std::sync::Arc;
use tokio::runtime::{Handle, Runtime};
use tokio::sync::watch;
use tracing::{info, warn};

/// The generator desktop application.
pub struct GeneratorApp {
    ctx: egui::Context,
    runtime: Runtime,
    config: Config,

    // Form state
    form: GeneratorForm,
    /// Validation or setup problem shown under the form.
    notice: Option<String>,

    // API state
    controller: Option<GenerationController>,
    /// (api key, model) the current controller's client was built with.
    client_key: Option<(String, String)>,

    // Markdown rendering
    markdown_cache: CommonMarkCache,

    // Settings
    settings: Settings,
    show_settings: bool,
}

impl GeneratorApp {
    /// Creates the application.
    ///
    /// # Arguments
    /// * `ctx` - egui context, used to request repaints from background tasks
    /// * `runtime` - Runtime that generation requests run on
    /// * `config` - Application configuration
    pub fn new(ctx: egui::Context, runtime: Runtime, config: Config) -> Self {
        // Load settings, using config's API key as fallback
        let mut settings = Settings::load(&config.model_name);
        if settings.api_key.is_empty() {
            settings.api_key = config.gemini_api_key.clone();
        }
        let form = GeneratorForm::from_settings(&settings);

        Self {
            ctx,
            runtime,
            config,
            form,
            notice: None,
            controller: None,
            client_key: None,
            markdown_cache: CommonMarkCache::default(),
            settings,
            show_settings: false,
        }
    }

    fn current_state(&self) -> UiState {
        self.controller
            .as_ref()
            .map(|c| c.state())
            .unwrap_or_default()
    }

    /// Builds a controller for the current settings, replacing the old one
    /// when the model or API key changed.
    fn ensure_controller(&mut self) -> Result<()> {
        if !self.settings.has_api_key() {
            return Err(AppError::config("Set a Gemini API key in the settings panel"));
        }

        let wanted = (self.settings.api_key.clone(), self.settings.model.clone());
        if self.controller.is_some() && self.client_key.as_ref() == Some(&wanted) {
            return Ok(());
        }

        let mut config = self.config.clone();
        config.gemini_api_key = wanted.0.clone();
        config.model_name = wanted.1.clone();

        let client: Arc<dyn GenerationClient> = Arc::new(GeminiClient::new(&config)?);
        let controller = GenerationController::new(
            client,
            config.controller_options(),
            self.runtime.handle().clone(),
        );
        spawn_repaint_watcher(self.runtime.handle(), controller.subscribe(), self.ctx.clone());
        info!(model = %config.model_name, "generation client ready");

        self.controller = Some(controller);
        self.client_key = Some(wanted);
        Ok(())
    }

    /// Validates the form and starts a generation request.
    fn submit(&mut self) {
        self.notice = None;

        let request = match self.form.to_request() {
            Ok(request) => request,
            Err(e) => {
                self.notice = Some(e.to_string());
                return;
            }
        };

        if let Err(e) = self.ensure_controller() {
            self.notice = Some(e.to_string());
            return;
        }

        self.form.remember(&mut self.settings);
        if let Err(e) = self.settings.save() {
            warn!("failed to save settings: {}", e);
        }

        if let Some(controller) = &self.controller {
            controller.request(&request);
        }
    }

    /// Renders the topic field, the three selectors and the submit button.
    fn render_form(&mut self, ui: &mut egui::Ui, state: &UiState) {
        ui.label(egui::RichText::new("Topic").strong());
        ui.add(
            egui::TextEdit::multiline(&mut self.form.topic)
                .desired_rows(4)
                .desired_width(f32::INFINITY)
                .hint_text("e.g., The benefits of learning a second language"),
        );
        ui.add_space(6.0);

        option_row(ui, "Tone", &mut self.form.tone, Tone::ALL, Tone::label);
        option_row(ui, "Format", &mut self.form.format, Format::ALL, Format::label);
        option_row(ui, "Length", &mut self.form.length, Length::ALL, Length::label);
        ui.add_space(6.0);

        let button = egui::Button::new("Generate Content")
            .min_size(egui::vec2(ui.available_width(), 40.0));
        if ui.add_enabled(self.form.can_submit(state), button).clicked() {
            self.submit();
        }

        if let Some(notice) = &self.notice {
            ui.label(egui::RichText::new(notice).color(egui::Color32::YELLOW));
        }
    }

    /// Renders the settings panel.
    fn render_settings_ui(&mut self, ui: &mut egui::Ui) {
        ui.label("Settings");

        // Model selector
        egui::ComboBox::from_label("Model")
            .selected_text(&self.settings.model)
            .show_ui(ui, |ui| {
                for model in AVAILABLE_MODELS {
                    ui.selectable_value(&mut self.settings.model, model.to_string(), *model);
                }
            });

        // API Key
        ui.label("API Key:");
        ui.add(
            egui::TextEdit::singleline(&mut self.settings.api_key)
                .password(true)
                .hint_text("Paste Gemini API Key"),
        );
        ui.separator();
    }
}

impl eframe::App for GeneratorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let state = self.current_state();

        egui::TopBottomPanel::top("title_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Generai");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("⚙").clicked() {
                        self.show_settings = !self.show_settings;
                    }
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .id_salt("page_scroll")
                .show(ui, |ui| {
                    if self.show_settings {
                        self.render_settings_ui(ui);
                    }

                    self.render_form(ui, &state);

                    ui.add_space(8.0);
                    ui.label(egui::RichText::new("Result").strong());
                    render_result(ui, &state, &mut self.markdown_cache);
                });
        });
    }
}

/// Requests a repaint every time the controller publishes a new state.
///
/// The task ends once the controller and its in-flight requests are gone.
fn spawn_repaint_watcher(runtime: &Handle, mut rx: watch::Receiver<UiState>, ctx: egui::Context) {
    runtime.spawn(async move {
        while rx.changed().await.is_ok() {
            ctx.request_repaint();
        }
    });
}

/// Opens the generator window and blocks until it is closed.
///
/// # Errors
///
/// Returns an error if the async runtime cannot be created or the window
/// fails to start.
pub fn run(config: Config) -> Result<()> {
    let runtime = Runtime::new()?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Generai")
            .with_inner_size([520.0, 760.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Generai",
        options,
        Box::new(move |cc| {
            Ok(Box::new(GeneratorApp::new(cc.egui_ctx.clone(), runtime, config)) as Box<dyn eframe::App>)
        }),
    )
    .map_err(|e| AppError::ui(format!("Failed to run UI: {}", e)))
}
