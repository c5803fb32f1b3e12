use image::{Rgba, RgbaImage};
use std::path::Path;

use crate::LabelError;

pub const RASTER_WIDTH: u32 = 256;
pub const RASTER_HEIGHT: u32 = 100;
pub const FONT_PX: f32 = 80.0;
pub const LETTER_SPACING: f32 = 16.0;

/// Fill used for both the backing and the glyphs: white at half opacity.
const FILL_ALPHA: f32 = 0.5;

/// DejaVu Sans, the face used when no font file is configured.
const DEFAULT_FONT: &[u8] = include_bytes!("../fonts/DejaVuSans.ttf");

/// Draws label text onto a fixed 256x100 translucent white card.
///
/// Glyphs are laid out left to right with kerning and a fixed gap after
/// every glyph, centred horizontally, with the middle of the em box on the
/// card's horizontal midline. Without a font only the card is drawn.
pub struct TextRasterizer {
    font: Option<fontdue::Font>,
}

impl std::fmt::Debug for TextRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRasterizer")
            .field("has_font", &self.font.is_some())
            .finish()
    }
}

impl Default for TextRasterizer {
    fn default() -> Self {
        Self::load(None)
    }
}

impl TextRasterizer {
    pub fn backing_only() -> Self {
        Self { font: None }
    }

    /// The bundled sans-serif face.
    pub fn sans_serif() -> Result<Self, LabelError> {
        Self::from_font_bytes(DEFAULT_FONT)
    }

    pub fn from_font_bytes(bytes: &[u8]) -> Result<Self, LabelError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| LabelError::Font(e.to_string()))?;
        Ok(Self { font: Some(font) })
    }

    pub fn from_font_file(path: &Path) -> Result<Self, LabelError> {
        let bytes = std::fs::read(path)
            .map_err(|e| LabelError::Font(format!("{}: {e}", path.display())))?;
        Self::from_font_bytes(&bytes)
    }

    /// Load the configured face. Without one, or if it fails to load, the
    /// bundled sans-serif is used; backing-only is the last resort.
    pub fn load(path: Option<&Path>) -> Self {
        if let Some(path) = path {
            match Self::from_font_file(path) {
                Ok(rasterizer) => {
                    tracing::debug!(font = %path.display(), "label font loaded");
                    return rasterizer;
                }
                Err(e) => tracing::warn!("{e}, using the bundled sans-serif"),
            }
        }
        match Self::sans_serif() {
            Ok(rasterizer) => {
                tracing::debug!("using the bundled sans-serif label font");
                rasterizer
            }
            Err(e) => {
                tracing::warn!("{e}, label text will not be drawn");
                Self::backing_only()
            }
        }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn rasterize(&self, text: &str) -> RgbaImage {
        let backing = Rgba([255, 255, 255, to_byte(FILL_ALPHA)]);
        let mut canvas = RgbaImage::from_pixel(RASTER_WIDTH, RASTER_HEIGHT, backing);
        let Some(font) = &self.font else {
            return canvas;
        };

        let chars: Vec<char> = text.chars().collect();
        let glyphs: Vec<_> = chars.iter().map(|&c| font.rasterize(c, FONT_PX)).collect();
        let advances: Vec<f32> = glyphs
            .iter()
            .enumerate()
            .map(|(i, (metrics, _))| {
                let kern = chars
                    .get(i + 1)
                    .and_then(|&next| font.horizontal_kern(chars[i], next, FONT_PX))
                    .unwrap_or(0.0);
                metrics.advance_width + kern
            })
            .collect();
        let (ascent, descent) = font
            .horizontal_line_metrics(FONT_PX)
            .map(|l| (l.ascent, l.descent))
            .unwrap_or((FONT_PX * 0.8, -FONT_PX * 0.2));

        let mut pen_x = line_start(&advances);
        let baseline = middle_baseline(ascent, descent);

        for ((metrics, coverage), advance) in glyphs.iter().zip(&advances) {
            let left = (pen_x + metrics.xmin as f32).round() as i64;
            let top = (baseline - (metrics.ymin as f32 + metrics.height as f32)).round() as i64;
            for row in 0..metrics.height {
                for col in 0..metrics.width {
                    let x = left + col as i64;
                    let y = top + row as i64;
                    if x < 0 || y < 0 || x >= RASTER_WIDTH as i64 || y >= RASTER_HEIGHT as i64 {
                        continue;
                    }
                    let c = coverage[row * metrics.width + col];
                    if c == 0 {
                        continue;
                    }
                    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
                    pixel.0[3] = composite_alpha(c, pixel.0[3]);
                }
            }
            pen_x += advance + LETTER_SPACING;
        }
        canvas
    }
}

fn to_byte(alpha: f32) -> u8 {
    (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Left edge of a centred line. Every glyph, the last included, is
/// followed by the letter spacing.
fn line_start(advances: &[f32]) -> f32 {
    let width: f32 = advances.iter().map(|a| a + LETTER_SPACING).sum();
    RASTER_WIDTH as f32 / 2.0 - width / 2.0
}

/// Baseline that puts the middle of the em box on the canvas midline.
/// `descent` is negative below the baseline.
fn middle_baseline(ascent: f32, descent: f32) -> f32 {
    RASTER_HEIGHT as f32 / 2.0 + (ascent + descent) / 2.0
}

/// Source-over of white ink at `coverage * 0.5` onto a white pixel.
fn composite_alpha(coverage: u8, dst: u8) -> u8 {
    let src = FILL_ALPHA * coverage as f32 / 255.0;
    let dst = dst as f32 / 255.0;
    to_byte(src + dst * (1.0 - src))
}
