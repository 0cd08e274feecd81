use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::SpeechConfig;
use crate::error::{Result, SynthesisError};
use crate::speech::{AudioAsset, AudioDuration, SpeechProvider, SpeechRequest};

/// Bounded exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &SpeechConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
            max_delay: Duration::from_millis(config.retry_max_delay_ms),
        }
    }

    /// A single attempt, no retries
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (1-based), without jitter
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Backoff plus up to 25% random jitter
    fn jittered(&self, retry: u32) -> Duration {
        let delay = self.backoff(retry);
        let jitter_ms = (delay.as_millis() as u64) / 4;
        if jitter_ms == 0 {
            return delay;
        }
        delay + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&SpeechConfig::default())
    }
}

/// Turns text into a timed audio file through a [`SpeechProvider`]
///
/// Every attempt is bounded by a timeout; transient failures (transport
/// errors, timeouts, throttling, 5xx) are retried with backoff, anything
/// else fails immediately.
#[derive(Clone)]
pub struct SpeechSynthesizer {
    provider: Arc<dyn SpeechProvider>,
    retry: RetryPolicy,
    attempt_timeout: Duration,
}

impl SpeechSynthesizer {
    pub fn new(provider: Arc<dyn SpeechProvider>, retry: RetryPolicy, attempt_timeout: Duration) -> Self {
        Self {
            provider,
            retry,
            attempt_timeout,
        }
    }

    pub fn from_config(provider: Arc<dyn SpeechProvider>, config: &SpeechConfig) -> Self {
        Self::new(
            provider,
            RetryPolicy::from_config(config),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn provider(&self) -> &dyn SpeechProvider {
        self.provider.as_ref()
    }

    /// Synthesize `request` into `<stem>.<ext>` and measure it
    pub async fn synthesize(&self, request: &SpeechRequest, stem: &Path) -> Result<AudioAsset> {
        if request.text.trim().is_empty() {
            return Err(SynthesisError::EmptyText.into());
        }

        info!(
            voice = %request.voice,
            provider = self.provider.name(),
            "🎤 Synthesizing: {}",
            preview(&request.text)
        );

        let audio = self.fetch_with_retry(request).await?;
        let path = audio_path(stem, self.provider.audio_extension());

        tokio::fs::write(&path, &audio)
            .await
            .map_err(|e| SynthesisError::Store {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let measured = path.clone();
        let duration = tokio::task::spawn_blocking(move || AudioDuration::measure(&measured))
            .await
            .map_err(|e| SynthesisError::Undecodable {
                path: path.display().to_string(),
                reason: e.to_string(),
            })??;

        if duration <= 0.0 {
            return Err(SynthesisError::Undecodable {
                path: path.display().to_string(),
                reason: "audio has zero duration".to_string(),
            }
            .into());
        }

        info!(path = %path.display(), duration, "✅ Audio saved");

        Ok(AudioAsset {
            path,
            duration_seconds: duration,
            language: request.voice.language(),
        })
    }

    async fn fetch_with_retry(&self, request: &SpeechRequest) -> std::result::Result<Vec<u8>, SynthesisError> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let outcome = match tokio::time::timeout(self.attempt_timeout, self.provider.synthesize(request)).await {
                Ok(result) => result,
                Err(_) => Err(SynthesisError::Timeout { seconds: self.attempt_timeout.as_secs() }),
            };

            let err = match outcome {
                Ok(audio) => {
                    debug!(attempt, bytes = audio.len(), "Provider returned audio");
                    return Ok(audio);
                }
                Err(err) => err,
            };

            if !err.is_retryable() {
                warn!(attempt, error = %err, "Speech synthesis failed");
                return Err(err);
            }

            if attempt >= self.retry.max_attempts {
                warn!(attempts = attempt, error = %err, "Speech synthesis failed after retries");
                return Err(SynthesisError::Exhausted {
                    attempts: attempt,
                    last: err.to_string(),
                });
            }

            let delay = self.retry.jittered(attempt);
            debug!(attempt, delay_ms = delay.as_millis() as u64, error = %err, "Retrying speech synthesis");
            tokio::time::sleep(delay).await;
        }
    }
}

fn audio_path(stem: &Path, extension: &str) -> PathBuf {
    let mut path = stem.as_os_str().to_owned();
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}

fn preview(text: &str) -> String {
    let mut preview: String = text.chars().take(30).collect();
    if text.chars().count() > 30 {
        preview.push_str("...");
    }
    preview
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReelError;
    use crate::speech::{Language, VoiceId};
    use async_trait::async_trait;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tempfile::tempdir;

    fn wav_bytes(seconds: f64) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for _ in 0..(seconds * 16_000.0) as u32 {
                writer.write_sample(0i16).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    /// Fails with the given error a number of times, then returns audio
    struct FlakyProvider {
        failures: u32,
        status: u16,
        calls: AtomicU32,
    }

    #[async_trait]
    impl SpeechProvider for FlakyProvider {
        fn name(&self) -> &str {
            "flaky"
        }

        fn audio_extension(&self) -> &str {
            "wav"
        }

        async fn synthesize(&self, _request: &SpeechRequest) -> std::result::Result<Vec<u8>, SynthesisError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                return Err(SynthesisError::Status { status: self.status, body: String::new() });
            }
            Ok(wav_bytes(0.75))
        }
    }

    struct StalledProvider;

    #[async_trait]
    impl SpeechProvider for StalledProvider {
        fn name(&self) -> &str {
            "stalled"
        }

        fn audio_extension(&self) -> &str {
            "wav"
        }

        async fn synthesize(&self, _request: &SpeechRequest) -> std::result::Result<Vec<u8>, SynthesisError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        }
    }

    fn quick_retry(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_millis(1_500),
        };

        assert_eq!(policy.backoff(1), Duration::from_millis(500));
        assert_eq!(policy.backoff(2), Duration::from_millis(1_000));
        assert_eq!(policy.backoff(3), Duration::from_millis(1_500));
        assert_eq!(policy.backoff(10), Duration::from_millis(1_500));

        let jittered = policy.jittered(1);
        assert!(jittered >= Duration::from_millis(500) && jittered <= Duration::from_millis(625));
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let dir = tempdir().unwrap();
        let provider = Arc::new(FlakyProvider { failures: 2, status: 503, calls: AtomicU32::new(0) });
        let synthesizer = SpeechSynthesizer::new(provider.clone(), quick_retry(3), Duration::from_secs(5));

        let request = SpeechRequest::new("BITCOIN HITS SEVENTY THOUSAND!", VoiceId::EnMale);
        let asset = synthesizer.synthesize(&request, &dir.path().join("run_hook")).await.unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
        assert_eq!(asset.path, dir.path().join("run_hook.wav"));
        assert!(asset.path.exists());
        assert!((asset.duration_seconds - 0.75).abs() < 1e-3);
        assert_eq!(asset.language, Language::English);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let dir = tempdir().unwrap();
        let provider = Arc::new(FlakyProvider { failures: 10, status: 500, calls: AtomicU32::new(0) });
        let synthesizer = SpeechSynthesizer::new(provider.clone(), quick_retry(3), Duration::from_secs(5));

        let request = SpeechRequest::new("hello", VoiceId::EnMale);
        let err = synthesizer.synthesize(&request, &dir.path().join("x")).await.unwrap_err();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
        assert!(matches!(
            err,
            ReelError::Synthesis(SynthesisError::Exhausted { attempts: 3, .. })
        ));
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let dir = tempdir().unwrap();
        let provider = Arc::new(FlakyProvider { failures: 10, status: 400, calls: AtomicU32::new(0) });
        let synthesizer = SpeechSynthesizer::new(provider.clone(), quick_retry(3), Duration::from_secs(5));

        let request = SpeechRequest::new("hello", VoiceId::EnMale);
        let err = synthesizer.synthesize(&request, &dir.path().join("x")).await.unwrap_err();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert!(matches!(err, ReelError::Synthesis(SynthesisError::Status { status: 400, .. })));
    }

    #[tokio::test]
    async fn test_attempt_timeout() {
        let dir = tempdir().unwrap();
        let synthesizer = SpeechSynthesizer::new(
            Arc::new(StalledProvider),
            RetryPolicy::none(),
            Duration::from_millis(20),
        );

        let request = SpeechRequest::new("hello", VoiceId::EnMale);
        let err = synthesizer.synthesize(&request, &dir.path().join("x")).await.unwrap_err();

        assert!(matches!(
            err,
            ReelError::Synthesis(SynthesisError::Exhausted { attempts: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_text_makes_no_call() {
        let dir = tempdir().unwrap();
        let provider = Arc::new(FlakyProvider { failures: 0, status: 500, calls: AtomicU32::new(0) });
        let synthesizer = SpeechSynthesizer::new(provider.clone(), quick_retry(3), Duration::from_secs(5));

        let request = SpeechRequest::new("   ", VoiceId::ArFemale);
        let err = synthesizer.synthesize(&request, &dir.path().join("x")).await.unwrap_err();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert!(matches!(err, ReelError::Synthesis(SynthesisError::EmptyText)));
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview("short"), "short");
        assert_eq!(preview(&"a".repeat(40)), format!("{}...", "a".repeat(30)));
    }
}
