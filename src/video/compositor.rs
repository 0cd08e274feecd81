use std::path::Path;

use tracing::info;

use crate::config::VideoConfig;
use crate::error::{CompositionError, Result};
use crate::overlay::OverlayAsset;
use crate::palette::Rgb;
use crate::speech::AudioAsset;
use crate::video::command::{FfmpegCommand, FfmpegRunner};
use crate::video::types::{Clip, Segment, CANVAS_HEIGHT, CANVAS_WIDTH, FPS};

/// Builds one clip from a solid background, an overlay and an audio track
///
/// The overlay is held for the whole clip and the video is cut to the
/// audio's measured duration, so the clip is exactly as long as its speech.
#[derive(Debug, Clone)]
pub struct ClipComposer {
    ffmpeg: FfmpegRunner,
    config: VideoConfig,
}

impl ClipComposer {
    pub fn new(ffmpeg: FfmpegRunner, config: VideoConfig) -> Self {
        Self { ffmpeg, config }
    }

    pub fn build_command(
        &self,
        audio: &AudioAsset,
        overlay: &OverlayAsset,
        background: Rgb,
        output: &Path,
    ) -> FfmpegCommand {
        let color = format!(
            "color=c={}:s={}x{}:r={}",
            background.to_ffmpeg(),
            CANVAS_WIDTH,
            CANVAS_HEIGHT,
            FPS
        );

        FfmpegCommand::new(output)
            .lavfi(color)
            .looped_image(&overlay.path)
            .input(&audio.path)
            .filter_complex("[0:v][1:v]overlay=0:0[v]")
            .map("[v]")
            .map("2:a")
            .video_codec(&self.config.video_codec)
            .preset(&self.config.preset)
            .crf(self.config.crf)
            .pixel_format(&self.config.pixel_format)
            .frame_rate(FPS)
            .audio_codec(&self.config.audio_codec)
            .audio_bitrate(&self.config.audio_bitrate)
            .audio_sample_rate(self.config.audio_sample_rate)
            .audio_channels(self.config.audio_channels)
            .threads(self.config.encoder_threads)
            .duration(audio.duration_seconds)
            .shortest()
    }

    pub async fn compose(
        &self,
        audio: &AudioAsset,
        overlay: &OverlayAsset,
        background: Rgb,
        segment: Segment,
        output: &Path,
    ) -> Result<Clip> {
        for input in [&audio.path, &overlay.path] {
            if !input.exists() {
                return Err(CompositionError::MissingInput { path: input.display().to_string() }.into());
            }
        }

        info!(
            segment = %segment,
            background = %background,
            duration = audio.duration_seconds,
            "🎬 Composing clip"
        );

        let cmd = self.build_command(audio, overlay, background, output);
        self.ffmpeg.run_command(&cmd).await?;

        let written = tokio::fs::metadata(output).await.map(|m| m.len()).unwrap_or(0);
        if written == 0 {
            return Err(CompositionError::MissingOutput {
                tool: self.ffmpeg.tool().to_string(),
                path: output.display().to_string(),
            }
            .into());
        }

        info!(segment = %segment, path = %output.display(), bytes = written, "✅ Clip ready");

        Ok(Clip {
            path: output.to_path_buf(),
            duration_seconds: audio.duration_seconds,
            segment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReelError;
    use crate::speech::Language;
    use std::path::PathBuf;
    use std::time::Duration;

    fn composer() -> ClipComposer {
        let config = VideoConfig {
            encoder_threads: 2,
            ..VideoConfig::default()
        };
        ClipComposer::new(FfmpegRunner::new("ffmpeg", Duration::from_secs(30)), config)
    }

    fn assets(dir: &Path) -> (AudioAsset, OverlayAsset) {
        (
            AudioAsset {
                path: dir.join("hook.mp3"),
                duration_seconds: 2.5,
                language: Language::English,
            },
            OverlayAsset {
                path: dir.join("hook.png"),
                width: CANVAS_WIDTH,
                height: CANVAS_HEIGHT,
                language: Language::English,
            },
        )
    }

    #[test]
    fn test_compose_command() {
        let (audio, overlay) = assets(Path::new("/run"));
        let args = composer()
            .build_command(&audio, &overlay, Rgb::new(0x1a, 0x4d, 0x2e), Path::new("/run/hook.mp4"))
            .build_args()
            .join(" ");

        assert!(args.starts_with("-y "));
        assert!(args.contains("-f lavfi -i color=c=0x1a4d2e:s=1080x1920:r=30"));
        assert!(args.contains("-loop 1 -i /run/hook.png -i /run/hook.mp3"));
        assert!(args.contains("-filter_complex [0:v][1:v]overlay=0:0[v] -map [v] -map 2:a"));
        assert!(args.contains("-c:v libx264 -preset ultrafast -crf 23 -pix_fmt yuv420p -r 30"));
        assert!(args.contains("-c:a aac -b:a 128k -ar 48000 -ac 2"));
        assert!(args.contains("-t 2.500 -shortest /run/hook.mp4"));
    }

    #[tokio::test]
    async fn test_missing_overlay_is_rejected_before_spawning() {
        let dir = tempfile::tempdir().unwrap();
        let (audio, overlay) = assets(dir.path());
        std::fs::write(&audio.path, b"audio").unwrap();

        let err = composer()
            .compose(&audio, &overlay, Rgb::BLACK, Segment::Hook, &dir.path().join("out.mp4"))
            .await
            .unwrap_err();

        match err {
            ReelError::Composition(CompositionError::MissingInput { path }) => {
                assert_eq!(PathBuf::from(path), overlay.path);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
