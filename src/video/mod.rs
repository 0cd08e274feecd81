//! # Video Module
//!
//! Clip composition and concatenation through the external `ffmpeg` and
//! `ffprobe` tools. Every child process runs under a deadline and is killed
//! when its future is dropped.

pub mod backend;
pub mod command;
pub mod compositor;
pub mod concat;
pub mod probe;
pub mod types;

pub use backend::{FfmpegBackend, MediaBackend};
pub use command::{FfmpegCommand, FfmpegRunner};
pub use compositor::ClipComposer;
pub use concat::Concatenator;
pub use probe::{probe_media, MediaInfo};
pub use types::{Clip, EncodedVideo, Segment, StreamSignature, CANVAS_HEIGHT, CANVAS_WIDTH, FPS};
