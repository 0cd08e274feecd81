use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::overlay::{FontBook, OverlayRenderer};
use crate::palette::{Palette, PaletteRegistry};
use crate::speech::{NeuralSpeechProvider, SpeechProvider, SpeechSynthesizer};
use crate::text::TextShaper;
use crate::video::{FfmpegBackend, MediaBackend};

/// Everything a run needs, built once per process and shared read-only
pub struct PipelineContext {
    pub config: Config,
    pub synthesizer: SpeechSynthesizer,
    pub renderer: OverlayRenderer,
    pub media: Arc<dyn MediaBackend>,
    pub palettes: PaletteRegistry,
    pub shaper: TextShaper,
}

impl PipelineContext {
    /// Build the production context: neural voices, FFmpeg, system fonts
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;

        let provider: Arc<dyn SpeechProvider> = Arc::new(NeuralSpeechProvider::new(&config.speech)?);
        let media: Arc<dyn MediaBackend> = Arc::new(FfmpegBackend::detect(&config.video)?);
        let fonts = FontBook::load(&config.render.extra_font_paths);

        Self::with_components(config, provider, media, fonts)
    }

    /// Build a context around caller-supplied collaborators
    pub fn with_components(
        config: Config,
        provider: Arc<dyn SpeechProvider>,
        media: Arc<dyn MediaBackend>,
        fonts: FontBook,
    ) -> Result<Self> {
        config.validate()?;

        let mut palettes = PaletteRegistry::new();
        for palette in &config.palettes {
            palettes.register(Palette::new(palette.name.clone(), palette.hook_background));
        }

        info!(
            provider = provider.name(),
            media = media.name(),
            pillars = ?palettes.available_pillars(),
            "Pipeline context ready"
        );

        Ok(Self {
            synthesizer: SpeechSynthesizer::from_config(provider, &config.speech),
            renderer: OverlayRenderer::new(Arc::new(fonts), config.render.clone()),
            media,
            palettes,
            shaper: TextShaper::new(),
            config,
        })
    }
}
