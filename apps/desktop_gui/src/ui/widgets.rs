use std::collections::HashMap;

use eframe::egui;
use shared::domain::{short_address, GifItem};

use crate::ui::preview::GifPreviewState;

pub const GIF_GRID_COLUMNS: usize = 3;
const CARD_WIDTH: f32 = 260.0;
const PREVIEW_MAX_HEIGHT: f32 = 200.0;

/// Renders the GIF list in chain order, wrapping into fixed-width rows.
/// Returns the links whose preview has not been requested yet.
pub fn gif_grid(
    ui: &mut egui::Ui,
    gifs: &[GifItem],
    previews: &mut HashMap<String, GifPreviewState>,
) -> Vec<String> {
    let mut wanted = Vec::new();
    if gifs.is_empty() {
        ui.weak("No GIFs yet. Be the first to add one!");
        return wanted;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            egui::Grid::new("gif_grid")
                .num_columns(GIF_GRID_COLUMNS)
                .spacing([18.0, 12.0])
                .striped(true)
                .show(ui, |ui| {
                    for (index, item) in gifs.iter().enumerate() {
                        let preview = previews
                            .entry(item.gif_link.clone())
                            .or_insert(GifPreviewState::NotRequested);
                        if matches!(preview, GifPreviewState::NotRequested)
                            && !wanted.contains(&item.gif_link)
                        {
                            wanted.push(item.gif_link.clone());
                        }
                        gif_card(ui, index, item, preview);
                        if (index + 1) % GIF_GRID_COLUMNS == 0 {
                            ui.end_row();
                        }
                    }
                });
        });
    wanted
}

/// The image when it decoded, otherwise just the link.
fn gif_card(ui: &mut egui::Ui, index: usize, item: &GifItem, preview: &mut GifPreviewState) {
    ui.vertical(|ui| {
        ui.set_max_width(CARD_WIDTH);
        match preview {
            GifPreviewState::Ready(gif) => {
                let texture = gif.texture(ui.ctx(), &format!("gif_preview_{}", item.gif_link));
                let size = fit_preview(texture.size_vec2(), CARD_WIDTH, PREVIEW_MAX_HEIGHT);
                ui.add(egui::Image::new(&texture).fit_to_exact_size(size));
            }
            GifPreviewState::NotRequested | GifPreviewState::Loading => {
                ui.spinner();
            }
            GifPreviewState::Error(reason) => {
                ui.weak("Preview unavailable").on_hover_text(reason.as_str());
            }
        }
        ui.hyperlink_to(
            egui::RichText::new(card_title(index, &item.gif_link)).strong(),
            &item.gif_link,
        );
        ui.small(format!("added by {}", short_address(&item.user_address)));
    });
}

/// Scales `size` down, keeping the aspect ratio, until it fits the box.
fn fit_preview(size: egui::Vec2, max_width: f32, max_height: f32) -> egui::Vec2 {
    let mut fitted = size;
    if fitted.x > max_width {
        fitted *= max_width / fitted.x;
    }
    if fitted.y > max_height {
        fitted *= max_height / fitted.y;
    }
    fitted
}

fn card_title(index: usize, link: &str) -> String {
    let name = link
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or(link);
    format!("#{} {name}", index + 1)
}
