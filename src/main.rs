#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod download;
mod error;
mod imagen;

use std::sync::mpsc::{self, Receiver, Sender};

use eframe::egui;

use crate::error::{FusionError, Result};
use crate::imagen::{GeneratedImage, ImagenClient};

const VALIDATION_MESSAGE: &str = "Please enter a description for your character.";
const PLACEHOLDER_TEXT: &str = "Your character will appear here...";
const PROMPT_HINT: &str = "e.g., A brave and curious little wasp named Buzzwing, \
    with big expressive hazel eyes and a friendly smile...";

/// Result-area state. The variants are mutually exclusive by construction:
/// starting a new attempt replaces any previous image or error.
enum Generation {
    Idle,
    Loading,
    Success(GeneratedImage),
    Error(String),
}

impl Generation {
    fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

struct FusionApp {
    prompt: String,
    generation: Generation,
    api_key: String,

    // egui caches decoded images by URI, so each attempt gets a fresh one
    attempt: u64,

    // Communication channel for the async request
    tx: Sender<Result<GeneratedImage>>,
    rx: Receiver<Result<GeneratedImage>>,
}

impl Default for FusionApp {
    fn default() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            prompt: String::new(),
            generation: Generation::Idle,
            api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            attempt: 0,
            tx,
            rx,
        }
    }
}

impl FusionApp {
    fn new(cc: &eframe::CreationContext<'_>) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);
        Self::default()
    }

    fn name() -> &'static str {
        "Character Fusion"
    }

    fn start_generation(&mut self) {
        if self.prompt.is_empty() {
            self.generation = Generation::Error(VALIDATION_MESSAGE.to_string());
            return;
        }

        self.generation = Generation::Loading;
        self.attempt += 1;
        tracing::info!(attempt = self.attempt, "generating character image");

        let prompt = self.prompt.clone();
        let api_key = self.api_key.clone();
        let tx = self.tx.clone();

        std::thread::spawn(move || {
            let client = ImagenClient::new(api_key);
            let result = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt.block_on(client.generate(&prompt)),
                Err(e) => Err(FusionError::from(e)),
            };
            let _ = tx.send(result);
        });
    }

    fn apply_result(&mut self, result: Result<GeneratedImage>) {
        self.generation = match result {
            Ok(image) => {
                tracing::info!(attempt = self.attempt, "image generated");
                Generation::Success(image)
            }
            Err(e) => {
                tracing::warn!(attempt = self.attempt, "generation failed: {e}");
                Generation::Error(e.user_message())
            }
        };
    }

    fn render_input_section(&mut self, ui: &mut egui::Ui) {
        let loading = self.generation.is_loading();

        ui.group(|ui| {
            ui.add_enabled(
                !loading,
                egui::TextEdit::multiline(&mut self.prompt)
                    .hint_text(PROMPT_HINT)
                    .desired_width(f32::INFINITY)
                    .desired_rows(4),
            );

            ui.add_space(6.0);

            let label = if loading { "Generating..." } else { "Generate" };
            let generate_button = ui.add_enabled(
                !loading && !self.prompt.is_empty(),
                egui::Button::new(label).min_size(egui::vec2(100.0, 30.0)),
            );
            if generate_button.clicked() {
                self.start_generation();
            }
        });
    }

    fn render_result_section(&mut self, ui: &mut egui::Ui) {
        egui::Frame::NONE
            .stroke(egui::Stroke::new(1.0, egui::Color32::from_gray(60)))
            .inner_margin(egui::Margin::same(10))
            .show(ui, |ui| {
                ui.expand_to_include_rect(ui.max_rect());

                egui::ScrollArea::vertical()
                    .id_salt("result_scroll")
                    .show(ui, |ui| match &self.generation {
                        Generation::Idle => {
                            ui.label(PLACEHOLDER_TEXT);
                        }
                        Generation::Loading => {
                            ui.vertical_centered(|ui| {
                                ui.add_space(20.0);
                                ui.spinner();
                            });
                        }
                        Generation::Success(image) => {
                            ui.image(egui::ImageSource::Bytes {
                                uri: format!("bytes://character-{}.png", self.attempt).into(),
                                bytes: egui::load::Bytes::from(image.png_bytes().to_vec()),
                            });
                            ui.add_space(8.0);
                            if ui.button("💾 Download").clicked() {
                                download::save_image(&self.prompt, image);
                            }
                        }
                        Generation::Error(message) => {
                            ui.colored_label(egui::Color32::from_rgb(255, 100, 100), message);
                        }
                    });
            });
    }
}

impl eframe::App for FusionApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for a finished request
        if let Ok(result) = self.rx.try_recv() {
            self.apply_result(result);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Character Fusion");
                ui.label("Describe your character and watch it come to life in spectacular 3D.");
            });

            ui.add_space(8.0);
            self.render_input_section(ui);

            ui.add_space(8.0);
            self.render_result_section(ui);
        });

        // Keep repainting while the request is in flight
        if self.generation.is_loading() {
            ctx.request_repaint();
        }
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt::init();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size((700.0, 850.0))
            .with_min_inner_size((400.0, 500.0)),
        ..eframe::NativeOptions::default()
    };

    eframe::run_native(
        FusionApp::name(),
        native_options,
        Box::new(|cc| Ok(Box::new(FusionApp::new(cc)))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NO_IMAGE_MESSAGE;

    fn sample_image() -> GeneratedImage {
        use base64::Engine;
        let png = base64::engine::general_purpose::STANDARD
            .decode("iVBORw0KGgo=")
            .unwrap();
        GeneratedImage::from_png(png)
    }

    #[test]
    fn test_empty_prompt_sets_validation_error_without_a_request() {
        let mut app = FusionApp::default();
        app.start_generation();

        match &app.generation {
            Generation::Error(message) => assert_eq!(message, VALIDATION_MESSAGE),
            _ => panic!("expected validation error"),
        }
        // No worker was spawned, so nothing ever arrives on the channel
        assert!(app.rx.try_recv().is_err());
        assert_eq!(app.attempt, 0);
    }

    #[test]
    fn test_successful_result_replaces_loading() {
        let mut app = FusionApp::default();
        app.generation = Generation::Loading;

        app.apply_result(Ok(sample_image()));

        match &app.generation {
            Generation::Success(image) => {
                assert!(image.data_uri().starts_with("data:image/png;base64,"));
            }
            _ => panic!("expected success state"),
        }
        assert!(!app.generation.is_loading());
    }

    #[test]
    fn test_failed_result_replaces_loading_with_error_message() {
        let mut app = FusionApp::default();
        app.generation = Generation::Loading;

        app.apply_result(Err(FusionError::NoImage));

        match &app.generation {
            Generation::Error(message) => assert_eq!(message, NO_IMAGE_MESSAGE),
            _ => panic!("expected error state"),
        }
        assert!(!app.generation.is_loading());
    }

    #[test]
    fn test_api_failure_surfaces_its_own_message() {
        let mut app = FusionApp::default();
        app.generation = Generation::Loading;

        app.apply_result(Err(FusionError::Api {
            status: 403,
            message: "API key not valid".into(),
        }));

        match &app.generation {
            Generation::Error(message) => {
                assert!(message.contains("API key not valid"));
            }
            _ => panic!("expected error state"),
        }
    }
}
