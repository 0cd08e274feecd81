//! # Right-to-Left Text
//!
//! Prepares Arabic script for a renderer that only knows how to draw glyphs
//! left to right: letters are joined into their contextual forms by
//! `ar_reshaper` and each line is reordered into visual order.
//!
//! ```rust
//! use bilingual_reels::text::TextShaper;
//!
//! let shaper = TextShaper::new();
//! assert_eq!(shaper.shape("\u{0644}\u{0627}"), "\u{FEFB}");
//! ```

pub mod shaper;

pub use shaper::TextShaper;
