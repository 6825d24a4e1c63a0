//! Inline GIF previews: decoding fetched bytes into RGBA frames and playing
//! them back as an egui texture.

use std::io::Cursor;

use eframe::egui;
use image::AnimationDecoder;

/// Longest edge of a decoded preview, in pixels.
pub const PREVIEW_MAX_EDGE: u32 = 1024;
const MIN_FRAME_DELAY_MS: u32 = 20;
const MAX_FRAME_DELAY_MS: u32 = 10_000;
const DEFAULT_FRAME_DELAY_MS: u32 = 100;

#[derive(Clone)]
pub struct PreviewImage {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) rgba: Vec<u8>,
}

#[derive(Clone)]
pub struct AnimatedGifFrame {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) rgba: Vec<u8>,
    pub(crate) delay_ms: u32,
}

#[derive(Clone)]
pub struct DecodedGifPreview {
    pub(crate) frames: Vec<AnimatedGifFrame>,
}

pub enum GifPreviewState {
    NotRequested,
    Loading,
    Ready(GifPreview),
    Error(String),
}

pub struct GifPreview {
    image: PreviewImage,
    animation: Option<GifPlayback>,
    texture: Option<egui::TextureHandle>,
}

struct GifPlayback {
    frames: Vec<AnimatedGifFrame>,
    current_frame: usize,
    next_frame_at_secs: f64,
}

impl GifPlayback {
    /// Steps to the frame due at `now`. Returns whether the frame changed.
    fn advance(&mut self, now: f64) -> bool {
        let mut changed = false;
        while !self.frames.is_empty() && now >= self.next_frame_at_secs {
            self.current_frame = (self.current_frame + 1) % self.frames.len();
            self.next_frame_at_secs += self.frames[self.current_frame].delay_ms as f64 / 1000.0;
            changed = true;
        }
        changed
    }

    fn current(&self) -> Option<&AnimatedGifFrame> {
        self.frames.get(self.current_frame)
    }
}

impl GifPreview {
    pub fn new(image: PreviewImage, decoded_gif: Option<DecodedGifPreview>) -> Self {
        let animation = decoded_gif
            .filter(|gif| gif.frames.len() > 1)
            .map(|gif| GifPlayback {
                frames: gif.frames,
                current_frame: 0,
                next_frame_at_secs: 0.0,
            });
        Self {
            image,
            animation,
            texture: None,
        }
    }

    pub fn is_animated(&self) -> bool {
        self.animation.is_some()
    }

    /// Uploads the still image or the current animation frame and returns
    /// the texture to draw.
    pub fn texture(&mut self, ctx: &egui::Context, name: &str) -> egui::TextureHandle {
        let now = ctx.input(|i| i.time);
        let texture = match (&mut self.texture, &mut self.animation) {
            (Some(texture), Some(anim)) => {
                if anim.advance(now) {
                    if let Some(frame) = anim.current() {
                        texture.set(frame_image(frame), egui::TextureOptions::LINEAR);
                    }
                }
                texture.clone()
            }
            (Some(texture), None) => texture.clone(),
            (slot @ None, Some(anim)) => {
                let first = match anim.current() {
                    Some(frame) => {
                        let delay_secs = frame.delay_ms as f64 / 1000.0;
                        let image = frame_image(frame);
                        anim.next_frame_at_secs = now + delay_secs;
                        image
                    }
                    None => still_image(&self.image),
                };
                slot.insert(ctx.load_texture(name, first, egui::TextureOptions::LINEAR))
                    .clone()
            }
            (slot @ None, None) => slot
                .insert(ctx.load_texture(name, still_image(&self.image), egui::TextureOptions::LINEAR))
                .clone(),
        };
        if self.animation.is_some() {
            ctx.request_repaint_after(std::time::Duration::from_millis(16));
        }
        texture
    }
}

fn frame_image(frame: &AnimatedGifFrame) -> egui::ColorImage {
    egui::ColorImage::from_rgba_unmultiplied([frame.width, frame.height], &frame.rgba)
}

fn still_image(image: &PreviewImage) -> egui::ColorImage {
    egui::ColorImage::from_rgba_unmultiplied([image.width, image.height], &image.rgba)
}

/// First frame (or the whole image for other formats), scaled down to fit
/// [`PREVIEW_MAX_EDGE`].
pub fn decode_preview_image(bytes: &[u8]) -> Result<PreviewImage, String> {
    let dynamic = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let resized = dynamic.thumbnail(PREVIEW_MAX_EDGE, PREVIEW_MAX_EDGE).to_rgba8();
    Ok(PreviewImage {
        width: resized.width() as usize,
        height: resized.height() as usize,
        rgba: resized.into_raw(),
    })
}

/// All frames of a GIF with their display delays. `Ok(None)` for anything
/// that is not a GIF.
pub fn decode_gif_animation_preview(bytes: &[u8]) -> Result<Option<DecodedGifPreview>, String> {
    let is_gif = bytes.len() >= 6 && (&bytes[..6] == b"GIF87a" || &bytes[..6] == b"GIF89a");
    if !is_gif {
        return Ok(None);
    }

    let decoder = image::codecs::gif::GifDecoder::new(Cursor::new(bytes))
        .map_err(|e| format!("gif decode init failed: {e}"))?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .map_err(|e| format!("gif frame decode failed: {e}"))?;
    if frames.is_empty() {
        return Ok(None);
    }

    let mut out_frames = Vec::with_capacity(frames.len());
    for frame in frames {
        let (num, den) = frame.delay().numer_denom_ms();
        let delay_ms = if den == 0 {
            DEFAULT_FRAME_DELAY_MS
        } else {
            ((num as f32 / den as f32).round() as u32).clamp(MIN_FRAME_DELAY_MS, MAX_FRAME_DELAY_MS)
        };

        let resized = image::DynamicImage::ImageRgba8(frame.into_buffer())
            .thumbnail(PREVIEW_MAX_EDGE, PREVIEW_MAX_EDGE)
            .to_rgba8();
        out_frames.push(AnimatedGifFrame {
            width: resized.width() as usize,
            height: resized.height() as usize,
            rgba: resized.into_raw(),
            delay_ms,
        });
    }

    Ok(Some(DecodedGifPreview { frames: out_frames }))
}

/// Decodes fetched bytes into the still preview plus, for GIFs, the
/// animation frames. A broken animation still yields the still image.
pub fn decode_gif_preview(bytes: &[u8]) -> Result<(PreviewImage, Option<DecodedGifPreview>), String> {
    let decoded_gif = match decode_gif_animation_preview(bytes) {
        Ok(gif) => gif,
        Err(err) => {
            tracing::warn!("preview: gif animation decode failed: {err}");
            None
        }
    };
    let image = decode_preview_image(bytes)?;
    Ok((image, decoded_gif))
}
