use std::{collections::HashMap, time::Duration};

use client_core::ViewState;
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{err_label, UiError, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::ui::preview::{GifPreview, GifPreviewState};
use crate::ui::widgets::gif_grid;

/// Preview downloads queued per frame, so a long list does not flood the
/// command queue.
const PREVIEW_REQUESTS_PER_FRAME: usize = 4;

pub struct PortalApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    view: ViewState,
    gif_input: String,
    status: String,
    last_error: Option<UiError>,
    alerts: Vec<String>,
    /// A command is in flight; buttons are disabled until the next view.
    busy: bool,
    previews: HashMap<String, GifPreviewState>,
}

impl PortalApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            view: ViewState::Disconnected,
            gif_input: String::new(),
            status: "Starting...".to_string(),
            last_error: None,
            alerts: Vec::new(),
            busy: true,
            previews: HashMap::new(),
        };
        app.send(BackendCommand::Load);
        app
    }

    fn send(&mut self, cmd: BackendCommand) {
        self.busy = true;
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status);
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => self.status = message,
                UiEvent::View(view) => {
                    self.busy = matches!(view, ViewState::Loading);
                    self.status = format!("GIF portal: {}", view.label());
                    if view.is_ready() {
                        self.last_error = None;
                    }
                    self.view = view;
                }
                UiEvent::Alert(message) => {
                    self.busy = false;
                    self.alerts.push(message);
                }
                UiEvent::InputCleared => self.gif_input.clear(),
                UiEvent::GifPreviewLoaded {
                    link,
                    image,
                    decoded_gif,
                } => {
                    self.previews.insert(
                        link,
                        GifPreviewState::Ready(GifPreview::new(image, decoded_gif)),
                    );
                }
                UiEvent::GifPreviewFailed { link, reason } => {
                    self.previews.insert(link, GifPreviewState::Error(reason));
                }
                UiEvent::Error(err) => {
                    tracing::warn!(
                        context = ?err.context(),
                        category = ?err.category(),
                        "backend operation failed: {}",
                        err.message()
                    );
                    self.busy = false;
                    self.last_error = Some(err);
                }
            }
        }
    }

    fn show_header(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.heading("🖼 GIF Portal");
            ui.label("View your GIF collection in the metaverse ✨");
        });
        ui.add_space(12.0);
    }

    fn show_body(&mut self, ui: &mut egui::Ui) {
        match self.view.clone() {
            ViewState::Disconnected => {
                ui.vertical_centered(|ui| {
                    let button = egui::Button::new("Connect to Wallet").min_size([180.0, 36.0].into());
                    if ui.add_enabled(!self.busy, button).clicked() {
                        self.send(BackendCommand::ConnectWallet);
                    }
                });
            }
            ViewState::Loading => {
                ui.vertical_centered(|ui| {
                    ui.spinner();
                    ui.label("Talking to the cluster...");
                });
            }
            ViewState::Uninitialized => {
                ui.vertical_centered(|ui| {
                    let button = egui::Button::new("Do One-Time Initialization For GIF Program Account");
                    if ui.add_enabled(!self.busy, button).clicked() {
                        self.send(BackendCommand::InitializeAccount);
                    }
                });
            }
            ViewState::Unavailable { reason } => {
                ui.vertical_centered(|ui| {
                    ui.colored_label(ui.visuals().warn_fg_color, "GIF list unavailable");
                    ui.small(reason);
                    if ui.add_enabled(!self.busy, egui::Button::new("Retry")).clicked() {
                        self.send(BackendCommand::RefreshGifList);
                    }
                });
            }
            ViewState::Ready { gifs } => {
                self.show_submit_form(ui);
                ui.separator();
                let wanted = gif_grid(ui, &gifs, &mut self.previews);
                self.request_previews(wanted);
            }
        }
    }

    fn request_previews(&mut self, wanted: Vec<String>) {
        for link in wanted.into_iter().take(PREVIEW_REQUESTS_PER_FRAME) {
            if self.cmd_tx.is_full() {
                break;
            }
            self.previews.insert(link.clone(), GifPreviewState::Loading);
            dispatch_backend_command(
                &self.cmd_tx,
                BackendCommand::FetchGifPreview { link },
                &mut self.status,
            );
        }
    }

    fn show_submit_form(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let input = ui.add(
                egui::TextEdit::singleline(&mut self.gif_input)
                    .hint_text("Enter gif link!")
                    .desired_width(ui.available_width() - 160.0),
            );
            let entered = input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let clicked = ui.add_enabled(!self.busy, egui::Button::new("Submit")).clicked();
            if (entered || clicked) && !self.busy {
                let link = self.gif_input.clone();
                self.send(BackendCommand::SubmitGif { link });
            }
            if ui.add_enabled(!self.busy, egui::Button::new("⟳")).on_hover_text("Refresh").clicked() {
                self.send(BackendCommand::RefreshGifList);
            }
        });
    }

    fn show_alerts(&mut self, ctx: &egui::Context) {
        let Some(message) = self.alerts.first().cloned() else {
            return;
        };
        let mut dismissed = false;
        egui::Window::new("Notice")
            .id(egui::Id::new("portal_alert_window"))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(message);
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.alerts.remove(0);
        }
    }

    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.small(&self.status);
                if let Some(err) = &self.last_error {
                    ui.separator();
                    ui.colored_label(
                        ui.visuals().error_fg_color,
                        format!("{}: {}", err_label(err.category()), err.message()),
                    );
                }
            });
        });
    }
}

impl eframe::App for PortalApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        self.show_status_bar(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_header(ui);
            self.show_body(ui);
        });
        self.show_alerts(ctx);

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
