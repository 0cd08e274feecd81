//! Speech synthesis
//!
//! A [`SpeechProvider`] turns a [`SpeechRequest`] into encoded audio bytes;
//! the [`SpeechSynthesizer`] wraps a provider with per-attempt timeouts and
//! bounded retries, stores the audio and measures how long it plays.

pub mod duration;
pub mod provider;
pub mod synthesizer;
pub mod types;

pub use duration::AudioDuration;
pub use provider::{extension_for_format, NeuralSpeechProvider, SpeechProvider};
pub use synthesizer::{RetryPolicy, SpeechSynthesizer};
pub use types::{AudioAsset, Language, Prosody, SpeechRequest, VoiceId};
