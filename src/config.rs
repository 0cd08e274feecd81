use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    palette::Rgb,
    speech::{Prosody, VoiceId},
};

/// Environment variable holding the speech provider key
pub const ENV_SPEECH_API_KEY: &str = "SPEECH_API_KEY";
/// Environment variable overriding the speech provider endpoint
pub const ENV_SPEECH_ENDPOINT: &str = "SPEECH_ENDPOINT";
pub const ENV_WORK_DIR: &str = "REELS_WORK_DIR";
pub const ENV_OUTPUT_DIR: &str = "REELS_OUTPUT_DIR";

/// Longest palette or pillar name; leaves room in a derived run id for the
/// timestamp and suffix
pub const MAX_PILLAR_LEN: usize = 32;

/// Main configuration for the reel pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Speech provider and voice settings
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Overlay rendering settings
    #[serde(default)]
    pub render: RenderConfig,

    /// Encoder and external tool settings
    #[serde(default)]
    pub video: VideoConfig,

    /// Run directories, cleanup and deadline
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Extra pillar palettes registered on top of the built-in ones
    #[serde(default)]
    pub palettes: Vec<PaletteConfig>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content).map_err(|source| crate::error::FilesystemError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(ENV_SPEECH_API_KEY) {
            if !key.trim().is_empty() {
                self.speech.api_key = Some(key.trim().to_string());
            }
        }
        if let Ok(endpoint) = std::env::var(ENV_SPEECH_ENDPOINT) {
            if !endpoint.trim().is_empty() {
                self.speech.endpoint = endpoint.trim().to_string();
            }
        }
        if let Ok(dir) = std::env::var(ENV_WORK_DIR) {
            self.pipeline.work_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var(ENV_OUTPUT_DIR) {
            self.pipeline.output_dir = PathBuf::from(dir);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.speech.validate()?;
        self.render.validate()?;
        self.video.validate()?;
        self.pipeline.validate()?;

        for palette in &self.palettes {
            if !is_valid_pillar(&palette.name) {
                return Err(invalid("palettes.name", &palette.name));
            }
        }
        Ok(())
    }
}

/// Palette names prefix derived run ids, so they share the run id alphabet
fn is_valid_pillar(name: &str) -> bool {
    name.len() <= MAX_PILLAR_LEN && crate::pipeline::types::is_valid_run_id(name)
}

fn invalid(key: &str, value: impl ToString) -> crate::error::ReelError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
    .into()
}

/// Speech provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// SSML synthesis endpoint
    pub endpoint: String,

    /// Subscription key, usually supplied through `SPEECH_API_KEY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Value of the `X-Microsoft-OutputFormat` header
    pub output_format: String,

    /// Per-attempt request timeout (seconds)
    pub request_timeout_secs: u64,

    /// Total attempts per synthesis, including the first
    pub max_attempts: u32,

    /// First retry delay (milliseconds), doubled on each attempt
    pub retry_base_delay_ms: u64,

    /// Upper bound for a single retry delay (milliseconds)
    pub retry_max_delay_ms: u64,

    pub hook_voice: VoiceId,
    pub body_voice: VoiceId,
    pub hook_prosody: Prosody,
    pub body_prosody: Prosody,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://eastus.tts.speech.microsoft.com/cognitiveservices/v1".to_string(),
            api_key: None,
            output_format: "audio-24khz-48kbitrate-mono-mp3".to_string(),
            request_timeout_secs: 30,
            max_attempts: 3,
            retry_base_delay_ms: 500,
            retry_max_delay_ms: 8_000,
            hook_voice: VoiceId::EnMale,
            body_voice: VoiceId::ArFemale,
            hook_prosody: Prosody::default(),
            body_prosody: Prosody::default(),
        }
    }
}

impl SpeechConfig {
    fn validate(&self) -> Result<()> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(invalid("speech.endpoint", &self.endpoint));
        }

        if crate::speech::extension_for_format(&self.output_format).is_none() {
            return Err(invalid("speech.output_format", &self.output_format));
        }

        if self.max_attempts == 0 {
            return Err(invalid("speech.max_attempts", self.max_attempts));
        }

        if self.request_timeout_secs == 0 {
            return Err(invalid("speech.request_timeout_secs", self.request_timeout_secs));
        }

        if self.retry_max_delay_ms < self.retry_base_delay_ms {
            return Err(invalid(
                "speech.retry_delay_range",
                format!("{}-{}", self.retry_base_delay_ms, self.retry_max_delay_ms),
            ));
        }

        for (key, prosody) in [("speech.hook_prosody", &self.hook_prosody), ("speech.body_prosody", &self.body_prosody)] {
            if !prosody.is_valid() {
                return Err(invalid(key, prosody));
            }
        }

        Ok(())
    }
}

/// Overlay rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Font size of the hook text (px)
    pub hook_font_size: f32,

    /// Font size of the body text (px)
    pub body_font_size: f32,

    /// Text wider than the canvas shrinks, but never below this size
    pub min_font_size: f32,

    /// Horizontal margin kept free on each side (px)
    pub margin: u32,

    /// Line height as a multiple of the font's natural line height
    pub line_spacing: f32,

    pub hook_color: Rgb,
    pub body_color: Rgb,
    pub shadow_color: Rgb,

    /// Offsets of the shadow passes drawn beneath the text
    pub shadow_offsets: Vec<[i32; 2]>,

    /// Font files tried before the built-in search paths
    pub extra_font_paths: Vec<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            hook_font_size: 120.0,
            body_font_size: 80.0,
            min_font_size: 36.0,
            margin: 60,
            line_spacing: 1.15,
            hook_color: Rgb::WHITE,
            body_color: Rgb::new(0x00, 0xf0, 0xff),
            shadow_color: Rgb::BLACK,
            shadow_offsets: vec![[3, 3], [6, 6]],
            extra_font_paths: Vec::new(),
        }
    }
}

impl RenderConfig {
    fn validate(&self) -> Result<()> {
        if self.min_font_size <= 0.0 {
            return Err(invalid("render.min_font_size", self.min_font_size));
        }

        if self.hook_font_size < self.min_font_size || self.body_font_size < self.min_font_size {
            return Err(invalid(
                "render.font_size",
                format!("hook={} body={} min={}", self.hook_font_size, self.body_font_size, self.min_font_size),
            ));
        }

        if self.margin.saturating_mul(2) >= crate::video::CANVAS_WIDTH {
            return Err(invalid("render.margin", self.margin));
        }

        if self.line_spacing <= 0.0 {
            return Err(invalid("render.line_spacing", self.line_spacing));
        }

        if self.shadow_offsets.len() > 3 {
            return Err(invalid("render.shadow_offsets", format!("{:?}", self.shadow_offsets)));
        }

        Ok(())
    }
}

/// Encoder and external tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub ffmpeg_path: String,
    pub ffprobe_path: String,

    pub video_codec: String,
    pub preset: String,
    pub crf: u8,
    pub pixel_format: String,

    pub audio_codec: String,
    pub audio_bitrate: String,
    pub audio_sample_rate: u32,
    pub audio_channels: u8,

    /// Encoder threads per FFmpeg process
    pub encoder_threads: usize,

    /// Deadline for one clip composition (seconds)
    pub compose_timeout_secs: u64,

    /// Deadline for the concatenation (seconds)
    pub concat_timeout_secs: u64,

    /// Deadline for one ffprobe call (seconds)
    pub probe_timeout_secs: u64,

    /// Background behind the body segment, independent of pillar
    pub body_background: Rgb,

    /// Accepted gap between probed and expected final duration (seconds)
    pub duration_tolerance: f64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            video_codec: "libx264".to_string(),
            preset: "ultrafast".to_string(),
            crf: 23,
            pixel_format: "yuv420p".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate: "128k".to_string(),
            audio_sample_rate: 48_000,
            audio_channels: 2,
            encoder_threads: num_cpus::get(),
            compose_timeout_secs: 300,
            concat_timeout_secs: 120,
            probe_timeout_secs: 30,
            body_background: Rgb::new(0x0a, 0x0a, 0x0a),
            duration_tolerance: 0.1,
        }
    }
}

impl VideoConfig {
    fn validate(&self) -> Result<()> {
        if self.crf > 51 {
            return Err(invalid("video.crf", self.crf));
        }

        if self.audio_sample_rate == 0 {
            return Err(invalid("video.audio_sample_rate", self.audio_sample_rate));
        }

        if !(1..=2).contains(&self.audio_channels) {
            return Err(invalid("video.audio_channels", self.audio_channels));
        }

        if self.encoder_threads == 0 {
            return Err(invalid("video.encoder_threads", self.encoder_threads));
        }

        if self.compose_timeout_secs == 0 || self.concat_timeout_secs == 0 || self.probe_timeout_secs == 0 {
            return Err(invalid(
                "video.timeouts",
                format!("{}/{}/{}", self.compose_timeout_secs, self.concat_timeout_secs, self.probe_timeout_secs),
            ));
        }

        if self.duration_tolerance < 0.0 {
            return Err(invalid("video.duration_tolerance", self.duration_tolerance));
        }

        Ok(())
    }
}

/// Run lifecycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Parent of the per-run working directories
    pub work_dir: PathBuf,

    /// Where finished reels are moved
    pub output_dir: PathBuf,

    /// Keep the run directory after a successful run
    pub keep_intermediates: bool,

    /// Keep the run directory after a failed run, for debugging
    pub preserve_on_failure: bool,

    /// Deadline for a whole run (seconds)
    pub run_timeout_secs: u64,

    /// Pillar used when a request does not name one
    pub default_pillar: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let root = std::env::temp_dir().join("bilingual-reels");
        Self {
            work_dir: root.join("work"),
            output_dir: root.join("out"),
            keep_intermediates: false,
            preserve_on_failure: false,
            run_timeout_secs: 900,
            default_pillar: "wins".to_string(),
        }
    }
}

impl PipelineConfig {
    fn validate(&self) -> Result<()> {
        if self.run_timeout_secs == 0 {
            return Err(invalid("pipeline.run_timeout_secs", self.run_timeout_secs));
        }

        if self.default_pillar.trim().is_empty() {
            return Err(ConfigError::MissingKey { key: "pipeline.default_pillar".to_string() }.into());
        }
        if !is_valid_pillar(&self.default_pillar) {
            return Err(invalid("pipeline.default_pillar", &self.default_pillar));
        }

        Ok(())
    }
}

/// A palette declared in the configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteConfig {
    pub name: String,
    pub hook_background: Rgb,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test_config.toml");

        let mut original_config = Config::default();
        original_config.palettes.push(PaletteConfig {
            name: "alerts".to_string(),
            hook_background: Rgb::new(0x80, 0, 0),
        });

        original_config.save_to_file(&file_path).unwrap();
        let loaded_config = Config::from_file(&file_path).unwrap();

        assert_eq!(original_config.speech.endpoint, loaded_config.speech.endpoint);
        assert_eq!(loaded_config.speech.body_voice, VoiceId::ArFemale);
        assert_eq!(loaded_config.render.body_color, Rgb::new(0x00, 0xf0, 0xff));
        assert_eq!(loaded_config.video.body_background.to_ffmpeg(), "0x0a0a0a");
        assert_eq!(loaded_config.palettes.len(), 1);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [speech]
            hook_voice = "en-female"

            [speech.body_prosody]
            rate_percent = -10
            pitch_hz = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.speech.hook_voice, VoiceId::EnFemale);
        assert_eq!(config.speech.body_prosody.rate_percent, -10);
        assert_eq!(config.speech.max_attempts, 3);
        assert_eq!(config.render.hook_font_size, 120.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file() {
        let result = Config::from_file("/definitely/not/here.toml");
        assert!(matches!(
            result,
            Err(crate::error::ReelError::Config(ConfigError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn test_invalid_speech_config() {
        let mut config = Config::default();
        config.speech.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.speech.endpoint = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.speech.output_format = "ogg-48khz-16bit-mono-opus".to_string();
        assert!(matches!(
            config.validate(),
            Err(crate::error::ReelError::Config(ConfigError::InvalidValue { ref key, .. })) if key == "speech.output_format"
        ));

        let mut config = Config::default();
        config.speech.output_format = "riff-24khz-16bit-mono-pcm".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_render_config() {
        let mut config = Config::default();
        config.render.body_font_size = 10.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.render.shadow_offsets = vec![[1, 1]; 4];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_video_config() {
        let mut config = Config::default();
        config.video.crf = 60;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.video.audio_channels = 6;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pillar_names_must_fit_a_run_id() {
        for bad in ["my pillar", "../x", "wins/2024", &"x".repeat(MAX_PILLAR_LEN + 1)] {
            let mut config = Config::default();
            config.palettes.push(PaletteConfig {
                name: bad.to_string(),
                hook_background: Rgb::new(0, 0, 0),
            });
            assert!(
                matches!(
                    config.validate(),
                    Err(crate::error::ReelError::Config(ConfigError::InvalidValue { ref key, .. })) if key == "palettes.name"
                ),
                "palette {:?} was accepted",
                bad
            );

            let mut config = Config::default();
            config.pipeline.default_pillar = bad.to_string();
            assert!(config.validate().is_err(), "default pillar {:?} was accepted", bad);
        }

        let mut config = Config::default();
        config.palettes.push(PaletteConfig {
            name: "launch-day_2".to_string(),
            hook_background: Rgb::new(0, 0, 0),
        });
        config.pipeline.default_pillar = "launch-day_2".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_longest_pillar_still_derives_a_valid_run_id() {
        let run_id = crate::pipeline::derive_run_id(&"p".repeat(MAX_PILLAR_LEN));
        assert!(crate::pipeline::types::is_valid_run_id(&run_id));
    }
}
