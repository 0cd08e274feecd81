use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Width of every overlay and clip
pub const CANVAS_WIDTH: u32 = 1080;
/// Height of every overlay and clip
pub const CANVAS_HEIGHT: u32 = 1920;
pub const FPS: u32 = 30;

/// Which part of the reel a clip belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Hook,
    Body,
}

impl Segment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Hook => "hook",
            Segment::Body => "body",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One encoded segment of the reel
///
/// Its duration is the duration of the audio it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pub path: PathBuf,
    pub duration_seconds: f64,
    pub segment: Segment,
}

/// The concatenated output of several clips
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedVideo {
    pub path: PathBuf,
    pub duration_seconds: f64,
    pub size_bytes: u64,
}

/// Encoder-relevant properties of a clip's streams
///
/// Stream-copy concatenation is only valid when every input has the same
/// signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSignature {
    pub video_codec: String,
    pub width: u32,
    pub height: u32,
    pub pixel_format: String,
    pub frame_rate: String,
    pub audio_codec: String,
    pub sample_rate: u32,
    pub channels: u32,
}

impl fmt::Display for StreamSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}x{} {} @{} / {} {}Hz {}ch",
            self.video_codec,
            self.width,
            self.height,
            self.pixel_format,
            self.frame_rate,
            self.audio_codec,
            self.sample_rate,
            self.channels
        )
    }
}
