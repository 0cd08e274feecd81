//! # Background Palettes
//!
//! A pillar (content theme) picks the background colour of the hook segment.
//! Palettes are registered statically at startup; an unknown pillar resolves
//! to the default palette instead of failing the run.
//!
//! ## Built-in Palettes
//!
//! - **wins**: dark green `0x1a4d2e`
//! - **tech**: dark blue `0x1e3a8a`
//! - **vision**: dark purple `0x581c87`
//! - **default**: charcoal `0x1a1a1a`

pub mod registry;
pub mod types;

pub use registry::PaletteRegistry;
pub use types::{Palette, Rgb};
