//! # Bilingual Reels
//!
//! Turn a short English hook line and an Arabic body script into one
//! vertical video reel with synthesized speech and text overlays.
//!
//! Each segment gets its own voice, a transparent text overlay and a solid
//! background clip; the two clips are joined hook first without
//! re-encoding.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bilingual_reels::{Config, ReelPipeline, RenderRequest};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let mut config = Config::default();
//! config.apply_env();
//!
//! let pipeline = ReelPipeline::from_config(config)?;
//! let video = pipeline
//!     .run(
//!         RenderRequest::new(
//!             "BITCOIN HITS SEVENTY THOUSAND!",
//!             "\u{0645}\u{0631}\u{062D}\u{0628}\u{0627} \u{0628}\u{0627}\u{0644}\u{0639}\u{0627}\u{0644}\u{0645}",
//!         )
//!         .with_pillar("wins"),
//!     )
//!     .await?;
//!
//! println!("{} ({} bytes)", video.path.display(), video.size_bytes);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`text`] - Arabic letter joining and bidi reordering for display
//! - [`speech`] - Neural speech provider, retries and audio duration
//! - [`overlay`] - Text rasterization onto a transparent 1080x1920 canvas
//! - [`palette`] - Pillar to background colour mapping
//! - [`video`] - Clip composition and concatenation through FFmpeg
//! - [`pipeline`] - Orchestration, run directories and cancellation
//! - [`config`] - Configuration management
//!
//! ## Custom collaborators
//!
//! The speech provider and the media backend are traits, so a pipeline can
//! run against other services or in tests without the network or FFmpeg:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bilingual_reels::{
//!     overlay::FontBook,
//!     pipeline::PipelineContext,
//!     speech::NeuralSpeechProvider,
//!     video::FfmpegBackend,
//!     Config, ReelPipeline,
//! };
//!
//! # fn main() -> bilingual_reels::Result<()> {
//! let config = Config::default();
//! let provider = Arc::new(NeuralSpeechProvider::new(&config.speech)?);
//! let media = Arc::new(FfmpegBackend::new(&config.video));
//! let fonts = FontBook::load(&config.render.extra_font_paths);
//!
//! let context = PipelineContext::with_components(config, provider, media, fonts)?;
//! let pipeline = ReelPipeline::new(context);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod overlay;
pub mod palette;
pub mod pipeline;
pub mod speech;
pub mod text;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    config::Config,
    error::{ReelError, Result, Stage},
    pipeline::{FinalVideo, ReelPipeline, RenderOutcome, RenderRequest},
    text::TextShaper,
};
