use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::config::VideoConfig;
use crate::error::Result;
use crate::overlay::OverlayAsset;
use crate::palette::Rgb;
use crate::speech::AudioAsset;
use crate::video::command::FfmpegRunner;
use crate::video::compositor::ClipComposer;
use crate::video::concat::Concatenator;
use crate::video::types::{Clip, EncodedVideo, Segment};

/// Local media tooling used by the pipeline
#[async_trait]
pub trait MediaBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Build one clip whose duration is the audio's duration
    async fn compose(
        &self,
        audio: &AudioAsset,
        overlay: &OverlayAsset,
        background: Rgb,
        segment: Segment,
        output: &Path,
    ) -> Result<Clip>;

    /// Join `clips` in the given order without re-encoding
    async fn concatenate(&self, clips: &[Clip], list_path: &Path, output: &Path) -> Result<EncodedVideo>;
}

/// [`MediaBackend`] driving the `ffmpeg` and `ffprobe` executables
#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    composer: ClipComposer,
    concatenator: Concatenator,
}

impl FfmpegBackend {
    pub fn new(config: &VideoConfig) -> Self {
        let ffmpeg = FfmpegRunner::new(&config.ffmpeg_path, Duration::from_secs(config.compose_timeout_secs));
        let ffprobe = FfmpegRunner::new(&config.ffprobe_path, Duration::from_secs(config.probe_timeout_secs));

        Self {
            composer: ClipComposer::new(ffmpeg.clone(), config.clone()),
            concatenator: Concatenator::new(
                ffmpeg.with_timeout(Duration::from_secs(config.concat_timeout_secs)),
                ffprobe,
                config.duration_tolerance,
            ),
        }
    }

    /// Like [`FfmpegBackend::new`], but fails when either tool is missing
    pub fn detect(config: &VideoConfig) -> Result<Self> {
        let ffmpeg = FfmpegRunner::new(&config.ffmpeg_path, Duration::from_secs(1)).locate()?;
        let ffprobe = FfmpegRunner::new(&config.ffprobe_path, Duration::from_secs(1)).locate()?;
        info!(ffmpeg = %ffmpeg.display(), ffprobe = %ffprobe.display(), "Media tools found");
        Ok(Self::new(config))
    }

    pub fn is_available(config: &VideoConfig) -> bool {
        Self::detect(config).is_ok()
    }
}

#[async_trait]
impl MediaBackend for FfmpegBackend {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn compose(
        &self,
        audio: &AudioAsset,
        overlay: &OverlayAsset,
        background: Rgb,
        segment: Segment,
        output: &Path,
    ) -> Result<Clip> {
        self.composer.compose(audio, overlay, background, segment, output).await
    }

    async fn concatenate(&self, clips: &[Clip], list_path: &Path, output: &Path) -> Result<EncodedVideo> {
        self.concatenator.concat(clips, list_path, output).await
    }
}
