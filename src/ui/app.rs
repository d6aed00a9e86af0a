//! The MoodTunes window

use eframe::egui;
use image::{RgbImage, RgbaImage};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{debug, info};

use super::shell::{Phase, Shell, GRID_COLUMNS};
use super::worker::{
    spawn_detection, spawn_video_lookup, AppEvent, EventSender, PreviewSlot, Services,
};
use crate::core::Overlay;
use crate::utils::BrowserLauncher;

pub const APP_TITLE: &str = "Emotion-based Music Player";

const COVER_DISPLAY_SIZE: f32 = 220.0;
const OVERLAY_OK: egui::Color32 = egui::Color32::from_rgb(0, 255, 0);
const OVERLAY_NO_FACE: egui::Color32 = egui::Color32::from_rgb(255, 0, 0);

/// Card button clicks, applied after the UI pass
enum CardAction {
    OpenOnSpotify(usize),
    PlayOnYoutube(usize),
}

struct Preview {
    texture: egui::TextureHandle,
    overlay: Overlay,
}

pub struct MoodTunesApp {
    runtime: Option<Runtime>,
    services: Services,
    browser: Arc<dyn BrowserLauncher>,
    shell: Shell<egui::TextureHandle>,
    events_tx: mpsc::Sender<AppEvent>,
    events_rx: mpsc::Receiver<AppEvent>,
    confirm: Arc<AtomicBool>,
    frames: PreviewSlot,
    preview: Option<Preview>,
    pending_actions: Vec<CardAction>,
}

impl MoodTunesApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        runtime: Runtime,
        services: Services,
        browser: Arc<dyn BrowserLauncher>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel();

        Self {
            runtime: Some(runtime),
            services,
            browser,
            shell: Shell::new(),
            events_tx,
            events_rx,
            confirm: Arc::new(AtomicBool::new(false)),
            frames: PreviewSlot::default(),
            preview: None,
            pending_actions: Vec::new(),
        }
    }

    fn event_sender(&self, ctx: &egui::Context) -> EventSender {
        let ctx = ctx.clone();
        EventSender::new(self.events_tx.clone(), Arc::new(move || ctx.request_repaint()))
    }

    fn on_detect_click(&mut self, ctx: &egui::Context) {
        let Some(runtime) = self.runtime.as_ref() else {
            return;
        };
        if !self.shell.begin_detection() {
            return;
        }

        info!("Starting emotion detection");
        spawn_detection(
            runtime.handle(),
            self.services.clone(),
            self.event_sender(ctx),
            self.frames.clone(),
            self.confirm.clone(),
        );
    }

    fn confirm_emotion(&self) {
        self.confirm.store(true, Ordering::SeqCst);
    }

    fn poll_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                AppEvent::CaptureFinished => {
                    self.frames.take();
                    self.preview = None;
                }
                AppEvent::EmotionDetected(emotion) => self.shell.emotion_detected(emotion),
                AppEvent::TracksLoaded(loaded) => {
                    self.shell.tracks_loaded(loaded, |index, cover| {
                        ctx.load_texture(
                            format!("cover-{}", index),
                            rgba_to_color_image(&cover),
                            egui::TextureOptions::LINEAR,
                        )
                    });
                    debug!(
                        "Rendered {} cards with {} covers",
                        self.shell.cards().len(),
                        self.shell.retained_images()
                    );
                }
                AppEvent::VideoResolved(url) => {
                    self.shell.video_resolved(url, self.browser.as_ref());
                }
            }
        }

        if self.shell.phase() != Phase::Capturing {
            return;
        }
        if let Some((frame, overlay)) = self.frames.take() {
            self.show_frame(ctx, &frame, overlay);
        }
    }

    fn show_frame(&mut self, ctx: &egui::Context, frame: &RgbImage, overlay: Overlay) {
        let image = egui::ColorImage::from_rgb(
            [frame.width() as usize, frame.height() as usize],
            frame.as_raw(),
        );

        if let Some(preview) = self.preview.as_mut() {
            preview.texture.set(image, egui::TextureOptions::LINEAR);
            preview.overlay = overlay;
            return;
        }

        let texture = ctx.load_texture("webcam-preview", image, egui::TextureOptions::LINEAR);
        self.preview = Some(Preview { texture, overlay });
    }

    fn apply_actions(&mut self, ctx: &egui::Context) {
        let actions: Vec<CardAction> = self.pending_actions.drain(..).collect();
        for action in actions {
            match action {
                CardAction::OpenOnSpotify(index) => {
                    self.shell.open_on_catalog(index, self.browser.as_ref());
                }
                CardAction::PlayOnYoutube(index) => {
                    let Some(runtime) = self.runtime.as_ref() else {
                        continue;
                    };
                    if let Some(query) = self.shell.begin_video_lookup(index) {
                        spawn_video_lookup(
                            runtime.handle(),
                            self.services.videos.clone(),
                            query,
                            self.event_sender(ctx),
                        );
                    }
                }
            }
        }
    }

    fn preview_ui(&mut self, ui: &mut egui::Ui) {
        let Some(preview) = &self.preview else {
            ui.centered_and_justified(|ui| {
                ui.spinner();
            });
            return;
        };

        let available = ui.available_size() - egui::vec2(0.0, 48.0);
        let size = preview.texture.size_vec2();
        let scale = (available.x / size.x).min(available.y / size.y).clamp(0.1, 1.0);

        let response = ui.add(egui::Image::new(&preview.texture).fit_to_exact_size(size * scale));
        let color = match preview.overlay {
            Overlay::Emotion(_) => OVERLAY_OK,
            Overlay::NoFace => OVERLAY_NO_FACE,
        };
        ui.painter().text(
            response.rect.left_top() + egui::vec2(24.0, 24.0),
            egui::Align2::LEFT_TOP,
            preview.overlay.text(),
            egui::FontId::proportional(24.0),
            color,
        );

        if ui.button("Confirm emotion (Q)").clicked() {
            self.confirm_emotion();
        }
    }

    fn cards_ui(&mut self, ui: &mut egui::Ui) {
        let play_enabled = self.shell.play_enabled();
        let actions = &mut self.pending_actions;

        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("track_cards")
                .num_columns(GRID_COLUMNS)
                .spacing([16.0, 16.0])
                .show(ui, |ui| {
                    let mut current_row = 0;
                    for (index, card) in self.shell.cards().iter().enumerate() {
                        if card.row != current_row {
                            ui.end_row();
                            current_row = card.row;
                        }
                        ui.push_id((card.row, card.column), |ui| {
                            ui.group(|ui| {
                                ui.vertical(|ui| {
                                    let size = egui::vec2(COVER_DISPLAY_SIZE, COVER_DISPLAY_SIZE);
                                    match &card.cover {
                                        Some(texture) => {
                                            ui.add(egui::Image::new(texture).fit_to_exact_size(size));
                                        }
                                        None => {
                                            let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
                                            ui.painter().rect_filled(rect, 4.0, ui.visuals().faint_bg_color);
                                        }
                                    }

                                    ui.label(egui::RichText::new(&card.track.name).strong().size(15.0));
                                    ui.label(egui::RichText::new(&card.track.artist).size(13.0));

                                    ui.horizontal(|ui| {
                                        if ui.button("Open on Spotify").clicked() {
                                            actions.push(CardAction::OpenOnSpotify(index));
                                        }
                                        if ui
                                            .add_enabled(play_enabled, egui::Button::new("Play on YouTube"))
                                            .clicked()
                                        {
                                            actions.push(CardAction::PlayOnYoutube(index));
                                        }
                                    });
                                });
                            });
                        });
                    }
                });
        });
    }
}

impl eframe::App for MoodTunesApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_events(ctx);

        if self.shell.phase() == Phase::Capturing && ctx.input(|i| i.key_pressed(egui::Key::Q)) {
            self.confirm_emotion();
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(APP_TITLE).strong().size(20.0));
                ui.add_space(16.0);
                ui.label(egui::RichText::new(self.shell.emotion_text()).size(15.0));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let button = egui::Button::new("Detect Emotion");
                    if ui.add_enabled(self.shell.trigger_enabled(), button).clicked() {
                        self.on_detect_click(ctx);
                    }
                });
            });
            ui.label("Click 'Detect Emotion'. When the webcam preview appears, press Q to confirm your emotion.");
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.label(self.shell.status());
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.shell.phase() == Phase::Capturing {
                self.preview_ui(ui);
            } else {
                self.cards_ui(ui);
            }
        });

        self.apply_actions(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        // stops a running capture loop so the camera is released
        self.confirm_emotion();
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_timeout(Duration::from_secs(2));
        }
    }
}

fn rgba_to_color_image(image: &RgbaImage) -> egui::ColorImage {
    egui::ColorImage::from_rgba_unmultiplied(
        [image.width() as usize, image.height() as usize],
        image.as_raw(),
    )
}
