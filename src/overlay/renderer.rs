use std::path::{Path, PathBuf};
use std::sync::Arc;

use fontdue::Font;
use image::{ImageFormat, RgbaImage};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::RenderConfig;
use crate::error::{OverlayError, Result};
use crate::overlay::{FontBook, OverlayAsset, TextStyle};
use crate::speech::Language;
use crate::video::{CANVAS_HEIGHT, CANVAS_WIDTH};

/// Rasterizes text onto a transparent canvas the size of the video
///
/// Lines are centred horizontally on their measured ink bounds and the
/// block is centred vertically. Shadow passes are drawn beneath the text.
#[derive(Clone)]
pub struct OverlayRenderer {
    fonts: Arc<FontBook>,
    config: RenderConfig,
}

struct PlacedGlyph {
    font: usize,
    index: u16,
    x: f32,
}

struct LineLayout {
    glyphs: Vec<PlacedGlyph>,
    advance: f32,
}

impl OverlayRenderer {
    pub fn new(fonts: Arc<FontBook>, config: RenderConfig) -> Self {
        Self { fonts, config }
    }

    /// Default colour and size for a language
    pub fn style_for(&self, language: Language) -> TextStyle {
        match language {
            Language::English => TextStyle::new(self.config.hook_color, self.config.hook_font_size),
            Language::Arabic => TextStyle::new(self.config.body_color, self.config.body_font_size),
        }
    }

    /// Render on the blocking pool and write a PNG to `path`
    pub async fn render(
        &self,
        text: &str,
        language: Language,
        style: TextStyle,
        path: &Path,
    ) -> Result<OverlayAsset> {
        let renderer = self.clone();
        let text = text.to_string();
        let path = path.to_path_buf();

        tokio::task::spawn_blocking(move || renderer.render_to_file(&text, language, style, &path))
            .await
            .map_err(|e| OverlayError::WorkerFailed { reason: e.to_string() })?
    }

    pub fn render_to_file(
        &self,
        text: &str,
        language: Language,
        style: TextStyle,
        path: &Path,
    ) -> Result<OverlayAsset> {
        let canvas = self.render_image_styled(text, language, style);

        canvas
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| OverlayError::SaveFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        info!(path = %path.display(), language = %language, "🖼️  Overlay saved");

        Ok(OverlayAsset {
            path: PathBuf::from(path),
            width: canvas.width(),
            height: canvas.height(),
            language,
        })
    }

    /// Rasterize `text` into a canvas-sized RGBA image
    pub fn render_image(&self, text: &str, language: Language) -> RgbaImage {
        self.render_image_styled(text, language, self.style_for(language))
    }

    pub fn render_image_styled(&self, text: &str, language: Language, style: TextStyle) -> RgbaImage {
        let mut canvas = RgbaImage::new(CANVAS_WIDTH, CANVAS_HEIGHT);

        let chain = self.fonts.chain(language);
        if chain.is_empty() {
            warn!(language = %language, "No font available, writing blank overlay");
            return canvas;
        }

        let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        if lines.is_empty() {
            return canvas;
        }

        let size = self.fit_size(&lines, language, style.font_size);
        let mask = self.coverage_mask(&lines, language, size);

        let mut passes: Vec<([i32; 2], [u8; 3])> = self
            .config
            .shadow_offsets
            .iter()
            .rev()
            .map(|offset| (*offset, self.config.shadow_color.0))
            .collect();
        passes.push(([0, 0], style.color.0));

        composite(&mut canvas, &mask, &passes);
        canvas
    }

    fn fit_size(&self, lines: &[&str], language: Language, requested: f32) -> f32 {
        let widest = lines
            .iter()
            .map(|line| self.layout_line(line, language, requested).advance)
            .fold(0.0f32, f32::max);
        let available = CANVAS_WIDTH.saturating_sub(self.config.margin * 2) as f32;

        let size = fit_font_size(requested, self.config.min_font_size, widest, available);
        if size < requested {
            debug!(requested, size, widest, "Shrinking text to fit the canvas");
        }
        size
    }

    fn layout_line(&self, line: &str, language: Language, size: f32) -> LineLayout {
        let chain = self.fonts.chain(language);
        let mut glyphs = Vec::new();
        let mut caret = 0.0f32;
        let mut previous: Option<(usize, u16)> = None;

        for c in line.chars().filter(|c| !c.is_control()) {
            let Some(font) = self.fonts.font_for(language, c) else {
                continue;
            };
            let index = chain[font].lookup_glyph_index(c);

            if let Some((previous_font, previous_index)) = previous {
                if previous_font == font {
                    caret += chain[font]
                        .horizontal_kern_indexed(previous_index, index, size)
                        .unwrap_or(0.0);
                }
            }

            glyphs.push(PlacedGlyph { font, index, x: caret });
            caret += chain[font].metrics_indexed(index, size).advance_width;
            previous = Some((font, index));
        }

        LineLayout { glyphs, advance: caret }
    }

    /// Glyph coverage of the whole text block, one byte per canvas pixel
    fn coverage_mask(&self, lines: &[&str], language: Language, size: f32) -> Vec<u8> {
        let width = CANVAS_WIDTH as i32;
        let height = CANVAS_HEIGHT as i32;
        let mut mask = vec![0u8; (width * height) as usize];

        let chain = self.fonts.chain(language);
        let (ascent, natural, gap) = match chain[0].horizontal_line_metrics(size) {
            Some(metrics) => (metrics.ascent, metrics.ascent - metrics.descent, metrics.line_gap),
            None => (size * 0.8, size, 0.0),
        };
        let line_height = (natural + gap) * self.config.line_spacing;

        let block = line_height * (lines.len() - 1) as f32 + natural;
        let top = (CANVAS_HEIGHT as f32 - block) / 2.0;

        for (i, line) in lines.iter().enumerate() {
            let layout = self.layout_line(line, language, size);
            let baseline = (top + i as f32 * line_height + ascent).round() as i32;

            let Some((ink_min, ink_max)) = ink_extent(chain, &layout, size) else {
                continue;
            };
            let shift = (CANVAS_WIDTH as f32 - (ink_max - ink_min)) / 2.0 - ink_min;

            for placed in &layout.glyphs {
                let (metrics, bitmap) = chain[placed.font].rasterize_indexed(placed.index, size);
                if metrics.width == 0 || metrics.height == 0 {
                    continue;
                }

                // Bitmap rows run top-down; ymin is the bottom edge above the baseline
                let left = (placed.x + shift).round() as i32 + metrics.xmin;
                let glyph_top = baseline - metrics.ymin - metrics.height as i32;

                for row in 0..metrics.height {
                    let y = glyph_top + row as i32;
                    if y < 0 || y >= height {
                        continue;
                    }
                    for col in 0..metrics.width {
                        let x = left + col as i32;
                        if x < 0 || x >= width {
                            continue;
                        }
                        let coverage = bitmap[row * metrics.width + col];
                        let idx = (y * width + x) as usize;
                        mask[idx] = mask[idx].max(coverage);
                    }
                }
            }
        }

        mask
    }
}

/// Horizontal ink extent of a laid-out line
fn ink_extent(chain: &[Arc<Font>], layout: &LineLayout, size: f32) -> Option<(f32, f32)> {
    layout
        .glyphs
        .iter()
        .filter_map(|placed| {
            let metrics = chain[placed.font].metrics_indexed(placed.index, size);
            if metrics.width == 0 {
                return None;
            }
            let left = placed.x + metrics.xmin as f32;
            Some((left, left + metrics.width as f32))
        })
        .reduce(|(min_a, max_a), (min_b, max_b)| (min_a.min(min_b), max_a.max(max_b)))
}

/// Size at which text `widest` px wide at `requested` fits into `available`
pub fn fit_font_size(requested: f32, min: f32, widest: f32, available: f32) -> f32 {
    if widest <= available || widest <= 0.0 {
        return requested;
    }
    (requested * available / widest).max(min).min(requested)
}

/// Paint `mask` onto the canvas once per pass, in order
fn composite(canvas: &mut RgbaImage, mask: &[u8], passes: &[([i32; 2], [u8; 3])]) {
    let width = canvas.width() as i32;
    let height = canvas.height() as i32;
    let row_len = width as usize * 4;

    let raw: &mut [u8] = canvas;
    raw.par_chunks_mut(row_len).enumerate().for_each(|(y, row)| {
        for (offset, color) in passes {
            let source_y = y as i32 - offset[1];
            if source_y < 0 || source_y >= height {
                continue;
            }
            let mask_row = &mask[source_y as usize * width as usize..][..width as usize];

            for x in 0..width {
                let source_x = x - offset[0];
                if source_x < 0 || source_x >= width {
                    continue;
                }
                let coverage = mask_row[source_x as usize];
                if coverage == 0 {
                    continue;
                }
                let idx = x as usize * 4;
                blend_over(&mut row[idx..idx + 4], *color, coverage);
            }
        }
    });
}

/// Straight-alpha "over" of a solid colour at `alpha` onto `dst`
fn blend_over(dst: &mut [u8], color: [u8; 3], alpha: u8) {
    let src_a = alpha as f32 / 255.0;
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        return;
    }

    for channel in 0..3 {
        let src = color[channel] as f32;
        let below = dst[channel] as f32;
        dst[channel] = ((src * src_a + below * dst_a * (1.0 - src_a)) / out_a).round() as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}
