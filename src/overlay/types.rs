use std::path::PathBuf;

use crate::palette::Rgb;
use crate::speech::Language;

/// A transparent text raster stored on disk
///
/// Always the size of the video canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayAsset {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub language: Language,
}

/// Colour and size of one overlay's text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: Rgb,
    pub font_size: f32,
}

impl TextStyle {
    pub fn new(color: Rgb, font_size: f32) -> Self {
        Self { color, font_size }
    }
}
