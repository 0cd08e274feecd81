use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{CompositionError, Result};
use crate::video::command::{FfmpegCommand, FfmpegRunner};
use crate::video::probe::probe_media;
use crate::video::types::{Clip, EncodedVideo, StreamSignature};

/// Joins clips in order with stream copy
///
/// Every clip must share the first clip's stream signature; a mismatch is
/// reported before FFmpeg runs.
#[derive(Debug, Clone)]
pub struct Concatenator {
    ffmpeg: FfmpegRunner,
    ffprobe: FfmpegRunner,
    duration_tolerance: f64,
}

impl Concatenator {
    pub fn new(ffmpeg: FfmpegRunner, ffprobe: FfmpegRunner, duration_tolerance: f64) -> Self {
        Self {
            ffmpeg,
            ffprobe,
            duration_tolerance,
        }
    }

    /// Concatenate `clips` into `output`, writing the demuxer list to `list_path`
    ///
    /// Every failure comes back wrapped in [`CompositionError::Concat`].
    pub async fn concat(&self, clips: &[Clip], list_path: &Path, output: &Path) -> Result<EncodedVideo> {
        self.join(clips, list_path, output)
            .await
            .map_err(|e| CompositionError::concat(e).into())
    }

    async fn join(
        &self,
        clips: &[Clip],
        list_path: &Path,
        output: &Path,
    ) -> std::result::Result<EncodedVideo, CompositionError> {
        if clips.len() < 2 {
            return Err(CompositionError::NotEnoughClips { count: clips.len() });
        }

        for clip in clips {
            if !tokio::fs::try_exists(&clip.path).await.unwrap_or(false) {
                return Err(CompositionError::MissingInput { path: clip.path.display().to_string() });
            }
        }

        self.check_signatures(clips).await?;

        let list = concat_list(clips);
        tokio::fs::write(list_path, list)
            .await
            .map_err(|e| CompositionError::ListWrite {
                path: list_path.display().to_string(),
                reason: e.to_string(),
            })?;

        info!(
            clips = clips.len(),
            order = %clips.iter().map(|c| c.segment.as_str()).collect::<Vec<_>>().join(","),
            "🔗 Concatenating clips"
        );

        let cmd = FfmpegCommand::new(output).concat_list(list_path).stream_copy();
        self.ffmpeg.run_command(&cmd).await?;

        let size_bytes = tokio::fs::metadata(output).await.map(|m| m.len()).unwrap_or(0);
        if size_bytes == 0 {
            return Err(CompositionError::MissingOutput {
                tool: self.ffmpeg.tool().to_string(),
                path: output.display().to_string(),
            });
        }

        let expected: f64 = clips.iter().map(|c| c.duration_seconds).sum();
        let probed = probe_media(&self.ffprobe, output).await?.duration_seconds;

        let duration_seconds = if probed > 0.0 { probed } else { expected };
        if (duration_seconds - expected).abs() > self.duration_tolerance {
            warn!(
                expected,
                probed = duration_seconds,
                "Final duration drifts from the sum of clip durations"
            );
        }

        info!(path = %output.display(), size_bytes, duration = duration_seconds, "✅ Concatenation complete");

        Ok(EncodedVideo {
            path: output.to_path_buf(),
            duration_seconds,
            size_bytes,
        })
    }

    async fn check_signatures(&self, clips: &[Clip]) -> std::result::Result<StreamSignature, CompositionError> {
        let mut expected: Option<StreamSignature> = None;

        for clip in clips {
            let info = probe_media(&self.ffprobe, &clip.path).await?;
            let signature = info.signature().ok_or_else(|| CompositionError::ProbeFailed {
                path: clip.path.display().to_string(),
                reason: "clip lacks a video or audio stream".to_string(),
            })?;

            match &expected {
                None => expected = Some(signature),
                Some(first) => check_signature(&clip.path, first, &signature)?,
            }
        }

        expected.ok_or(CompositionError::NotEnoughClips { count: 0 })
    }
}

/// Reject a clip whose streams differ from the first clip's
pub fn check_signature(
    path: &Path,
    expected: &StreamSignature,
    found: &StreamSignature,
) -> std::result::Result<(), CompositionError> {
    if expected == found {
        return Ok(());
    }
    Err(CompositionError::CodecMismatch {
        path: path.display().to_string(),
        expected: expected.to_string(),
        found: found.to_string(),
    })
}

/// Contents of the concat demuxer list, one `file` line per clip in order
pub fn concat_list(clips: &[Clip]) -> String {
    clips
        .iter()
        .map(|clip| format!("file '{}'\n", escape_list_path(&absolute(&clip.path))))
        .collect()
}

fn escape_list_path(path: &Path) -> String {
    path.to_string_lossy().replace('\'', "'\\''")
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
