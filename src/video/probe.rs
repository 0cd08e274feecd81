//! FFprobe media information.

use std::path::Path;

use serde::Deserialize;

use crate::error::CompositionError;
use crate::video::command::FfmpegRunner;
use crate::video::types::StreamSignature;

/// What ffprobe reports about a media file.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    pub duration_seconds: f64,
    pub size_bytes: u64,
    video: Option<VideoStream>,
    audio: Option<AudioStream>,
}

#[derive(Debug, Clone, PartialEq)]
struct VideoStream {
    codec: String,
    width: u32,
    height: u32,
    pixel_format: String,
    frame_rate: String,
}

#[derive(Debug, Clone, PartialEq)]
struct AudioStream {
    codec: String,
    sample_rate: u32,
    channels: u32,
}

impl MediaInfo {
    pub fn has_video(&self) -> bool {
        self.video.is_some()
    }

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.video.as_ref().map(|v| (v.width, v.height))
    }

    /// Stream signature; clips without both a video and an audio stream have none.
    pub fn signature(&self) -> Option<StreamSignature> {
        let video = self.video.as_ref()?;
        let audio = self.audio.as_ref()?;
        Some(StreamSignature {
            video_codec: video.codec.clone(),
            width: video.width,
            height: video.height,
            pixel_format: video.pixel_format.clone(),
            frame_rate: video.frame_rate.clone(),
            audio_codec: audio.codec.clone(),
            sample_rate: audio.sample_rate,
            channels: audio.channels,
        })
    }
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    size: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    pix_fmt: Option<String>,
    r_frame_rate: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u32>,
}

/// Parse `ffprobe -print_format json -show_format -show_streams` output.
pub fn parse_probe(path: &Path, json: &[u8]) -> Result<MediaInfo, CompositionError> {
    let probe: FfprobeOutput = serde_json::from_slice(json).map_err(|e| CompositionError::ProbeFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let format = probe.format.ok_or_else(|| CompositionError::ProbeFailed {
        path: path.display().to_string(),
        reason: "no format section".to_string(),
    })?;

    let duration_seconds = format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let size_bytes = format
        .size
        .as_deref()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0);

    let video = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .map(|s| VideoStream {
            codec: s.codec_name.clone().unwrap_or_default(),
            width: s.width.unwrap_or(0),
            height: s.height.unwrap_or(0),
            pixel_format: s.pix_fmt.clone().unwrap_or_default(),
            frame_rate: s.r_frame_rate.clone().unwrap_or_default(),
        });

    let audio = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"))
        .map(|s| AudioStream {
            codec: s.codec_name.clone().unwrap_or_default(),
            sample_rate: s.sample_rate.as_deref().and_then(|r| r.parse().ok()).unwrap_or(0),
            channels: s.channels.unwrap_or(0),
        });

    Ok(MediaInfo {
        duration_seconds,
        size_bytes,
        video,
        audio,
    })
}

/// Probe a media file for information.
pub async fn probe_media(runner: &FfmpegRunner, path: &Path) -> Result<MediaInfo, CompositionError> {
    if !path.exists() {
        return Err(CompositionError::MissingInput { path: path.display().to_string() });
    }

    let args = [
        "-v",
        "quiet",
        "-print_format",
        "json",
        "-show_format",
        "-show_streams",
    ]
    .iter()
    .map(|s| s.to_string())
    .chain(std::iter::once(path.to_string_lossy().to_string()))
    .collect::<Vec<_>>();

    let output = runner.run(&args).await?;
    parse_probe(path, &output.stdout)
}
