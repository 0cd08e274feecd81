//! Text overlays
//!
//! Shaped text is rasterized onto a transparent PNG the size of the video
//! canvas, ready to be laid over a solid background by the clip composer.
//! Fonts come from per-language fallback chains; when no font loads at all
//! the overlay is still written, just without text.

pub mod fonts;
pub mod renderer;
pub mod types;

pub use fonts::FontBook;
pub use renderer::OverlayRenderer;
pub use types::{OverlayAsset, TextStyle};
