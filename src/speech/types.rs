use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Language of a script segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Primary, left-to-right
    English,
    /// Secondary, right-to-left and reshaping-dependent
    Arabic,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Arabic => "ar",
        }
    }

    pub fn is_rtl(&self) -> bool {
        matches!(self, Language::Arabic)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The fixed set of neural voices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VoiceId {
    EnMale,
    EnFemale,
    ArMale,
    ArFemale,
}

impl VoiceId {
    pub const ALL: [VoiceId; 4] = [
        VoiceId::EnMale,
        VoiceId::EnFemale,
        VoiceId::ArMale,
        VoiceId::ArFemale,
    ];

    /// Voice name understood by the provider
    pub fn provider_name(&self) -> &'static str {
        match self {
            VoiceId::EnMale => "en-US-GuyNeural",
            VoiceId::EnFemale => "en-US-JennyNeural",
            VoiceId::ArMale => "ar-EG-ShakirNeural",
            VoiceId::ArFemale => "ar-EG-SalmaNeural",
        }
    }

    /// BCP-47 locale of the voice, used for the SSML `xml:lang`
    pub fn locale(&self) -> &'static str {
        match self {
            VoiceId::EnMale | VoiceId::EnFemale => "en-US",
            VoiceId::ArMale | VoiceId::ArFemale => "ar-EG",
        }
    }

    pub fn language(&self) -> Language {
        match self {
            VoiceId::EnMale | VoiceId::EnFemale => Language::English,
            VoiceId::ArMale | VoiceId::ArFemale => Language::Arabic,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            VoiceId::EnMale => "en-male",
            VoiceId::EnFemale => "en-female",
            VoiceId::ArMale => "ar-male",
            VoiceId::ArFemale => "ar-female",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.key() == key.trim())
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.provider_name())
    }
}

/// Speaking rate and pitch adjustments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Prosody {
    /// Rate change in percent, 0 keeps the voice's natural rate
    pub rate_percent: i32,

    /// Pitch change in Hz
    pub pitch_hz: i32,
}

impl Prosody {
    pub fn new(rate_percent: i32, pitch_hz: i32) -> Self {
        Self { rate_percent, pitch_hz }
    }

    /// Rate in the signed form providers expect, e.g. `+10%`
    pub fn rate(&self) -> String {
        format!("{:+}%", self.rate_percent)
    }

    /// Pitch in the signed form providers expect, e.g. `-5Hz`
    pub fn pitch(&self) -> String {
        format!("{:+}Hz", self.pitch_hz)
    }

    pub fn is_valid(&self) -> bool {
        (-100..=200).contains(&self.rate_percent) && (-200..=200).contains(&self.pitch_hz)
    }
}

impl fmt::Display for Prosody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rate={} pitch={}", self.rate(), self.pitch())
    }
}

/// One synthesis call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub text: String,
    pub voice: VoiceId,
    pub prosody: Prosody,
}

impl SpeechRequest {
    pub fn new<S: Into<String>>(text: S, voice: VoiceId) -> Self {
        Self {
            text: text.into(),
            voice,
            prosody: Prosody::default(),
        }
    }

    pub fn with_prosody(mut self, prosody: Prosody) -> Self {
        self.prosody = prosody;
        self
    }
}

/// Synthesized speech stored on disk
///
/// The duration is measured from the decoded file and is authoritative for
/// the length of the clip built from it.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioAsset {
    pub path: PathBuf,
    pub duration_seconds: f64,
    pub language: Language,
}
