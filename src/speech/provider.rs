use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use tracing::debug;

use crate::config::SpeechConfig;
use crate::error::{ConfigError, Result, SynthesisError};
use crate::speech::SpeechRequest;

/// A remote text-to-speech service
///
/// One call is one outbound request; implementations do not cache and do
/// not retry. Retrying is the synthesizer's job.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// File extension of the audio this provider returns
    fn audio_extension(&self) -> &str;

    /// Synthesize `request` and return the encoded audio bytes
    async fn synthesize(&self, request: &SpeechRequest) -> std::result::Result<Vec<u8>, SynthesisError>;
}

/// Neural voice provider speaking SSML over HTTPS
///
/// Posts an SSML document and reads the encoded audio from the response body.
pub struct NeuralSpeechProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    output_format: String,
    extension: &'static str,
    timeout: Duration,
}

impl NeuralSpeechProvider {
    pub fn new(config: &SpeechConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingKey { key: "speech.api_key".to_string() })?;

        let extension = extension_for_format(&config.output_format).ok_or_else(|| ConfigError::InvalidValue {
            key: "speech.output_format".to_string(),
            value: config.output_format.clone(),
        })?;

        let timeout = Duration::from_secs(config.request_timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: "speech".to_string(),
                value: e.to_string(),
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            output_format: config.output_format.clone(),
            extension,
            timeout,
        })
    }

    fn headers(&self) -> std::result::Result<HeaderMap, SynthesisError> {
        let value = |v: &str| {
            HeaderValue::from_str(v).map_err(|e| SynthesisError::Transport { reason: e.to_string() })
        };

        let mut headers = HeaderMap::new();
        headers.insert("ocp-apim-subscription-key", value(&self.api_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/ssml+xml"));
        headers.insert("x-microsoft-outputformat", value(&self.output_format)?);
        headers.insert(
            USER_AGENT,
            value(concat!("bilingual-reels/", env!("CARGO_PKG_VERSION")))?,
        );
        Ok(headers)
    }
}

#[async_trait]
impl SpeechProvider for NeuralSpeechProvider {
    fn name(&self) -> &str {
        "neural-ssml"
    }

    fn audio_extension(&self) -> &str {
        self.extension
    }

    async fn synthesize(&self, request: &SpeechRequest) -> std::result::Result<Vec<u8>, SynthesisError> {
        let body = build_ssml(request);
        debug!(voice = %request.voice, bytes = body.len(), "Posting SSML");

        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.headers()?)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SynthesisError::Timeout { seconds: self.timeout.as_secs() }
                } else {
                    SynthesisError::Transport { reason: e.to_string() }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SynthesisError::Status {
                status: status.as_u16(),
                body: body.chars().take(512).collect(),
            });
        }

        let audio = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                SynthesisError::Timeout { seconds: self.timeout.as_secs() }
            } else {
                SynthesisError::Transport { reason: e.to_string() }
            }
        })?;

        if audio.is_empty() {
            return Err(SynthesisError::EmptyAudio { voice: request.voice.to_string() });
        }

        Ok(audio.to_vec())
    }
}

/// File extension for an output format whose audio can be measured
///
/// Only MP3 and RIFF PCM are accepted. Opus, WebM and headerless raw
/// formats return `None`.
pub fn extension_for_format(format: &str) -> Option<&'static str> {
    let format = format.to_ascii_lowercase();
    if format.ends_with("-mp3") {
        Some("mp3")
    } else if format.starts_with("riff-") {
        Some("wav")
    } else {
        None
    }
}

/// Build the SSML document for one request
pub fn build_ssml(request: &SpeechRequest) -> String {
    format!(
        "<speak version='1.0' xmlns='http://www.w3.org/2001/10/synthesis' xml:lang='{lang}'>\
<voice name='{voice}'><prosody rate='{rate}' pitch='{pitch}'>{text}</prosody></voice></speak>",
        lang = request.voice.locale(),
        voice = request.voice.provider_name(),
        rate = request.prosody.rate(),
        pitch = request.prosody.pitch(),
        text = escape_xml(request.text.trim()),
    )
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
