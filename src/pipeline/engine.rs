use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::{FilesystemError, ReelError, Result},
    palette::{Palette, Rgb},
    pipeline::{
        FinalVideo, PipelineContext, RenderRequest, RunState, RunTracker, RunWorkspace, Script,
    },
    speech::{Language, SpeechRequest},
    video::{Clip, EncodedVideo, Segment},
};

/// Drives one reel from script to final video
///
/// The pipeline follows a fixed sequence:
/// 1. Validation - reject empty texts and bad run ids before any side effect
/// 2. Run setup - resolve the palette and run id, create the run directory
/// 3. Segments - per segment, synthesize speech and render the overlay
///    concurrently, then compose the clip; hook and body run side by side
/// 4. Concatenation - join [hook, body] and move the result to the output directory
///
/// The run directory is removed on every exit path, including timeouts and
/// cancellation, unless configured otherwise.
#[derive(Clone)]
pub struct ReelPipeline {
    ctx: Arc<PipelineContext>,
}

impl ReelPipeline {
    pub fn new(ctx: PipelineContext) -> Self {
        Self { ctx: Arc::new(ctx) }
    }

    /// Build the production pipeline from configuration
    pub fn from_config(config: Config) -> Result<Self> {
        Ok(Self::new(PipelineContext::from_config(config)?))
    }

    pub fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    /// Render one reel, bounded by the configured run deadline
    pub async fn run(&self, request: RenderRequest) -> Result<FinalVideo> {
        let seconds = self.ctx.config.pipeline.run_timeout_secs;

        match tokio::time::timeout(Duration::from_secs(seconds), self.execute(request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("⏱️  Run exceeded its deadline of {}s", seconds);
                Err(ReelError::DeadlineExceeded { seconds })
            }
        }
    }

    /// Like [`ReelPipeline::run`], but stops as soon as `cancel` turns true
    pub async fn run_until_cancelled(
        &self,
        request: RenderRequest,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<FinalVideo> {
        tokio::select! {
            result = self.run(request) => result,
            _ = cancelled(&mut cancel) => {
                warn!("🛑 Run cancelled");
                Err(ReelError::Cancelled)
            }
        }
    }

    /// Release the pipeline, removing the work root if no run left anything in it
    pub async fn shutdown(self) {
        let work_dir = self.ctx.config.pipeline.work_dir.clone();
        drop(self);

        match tokio::fs::remove_dir(&work_dir).await {
            Ok(()) => debug!(path = %work_dir.display(), "Removed empty work root"),
            Err(e) => debug!(path = %work_dir.display(), error = %e, "Work root left in place"),
        }
        info!("Pipeline shut down");
    }

    async fn execute(&self, request: RenderRequest) -> Result<FinalVideo> {
        let pipeline = &self.ctx.config.pipeline;

        // No side effects before validation passes
        let script = Script::from_request(request, &pipeline.default_pillar)?;

        // Run setup
        let palette = self.ctx.palettes.resolve(script.pillar());
        let run_id = match script.run_id() {
            Some(run_id) => run_id.to_string(),
            None => derive_run_id(&palette.name),
        };

        let final_path = pipeline.output_dir.join(format!("{}_final.mp4", run_id));
        if tokio::fs::try_exists(&final_path).await.unwrap_or(false) {
            return Err(FilesystemError::OutputExists { path: final_path }.into());
        }
        tokio::fs::create_dir_all(&pipeline.output_dir)
            .await
            .map_err(|source| FilesystemError::CreateDir {
                path: pipeline.output_dir.clone(),
                source,
            })?;

        let mut workspace = RunWorkspace::create(
            &pipeline.work_dir,
            &run_id,
            pipeline.keep_intermediates,
            pipeline.preserve_on_failure,
        )
        .await?;
        let mut tracker = RunTracker::new(run_id.clone());

        info!("🎬 Starting reel {}", run_id);
        info!("   Pillar: {} (background {})", palette.name, palette.hook_background);
        info!("   Work dir: {}", workspace.path().display());

        match self.produce(&script, &palette, &workspace, &mut tracker, &final_path).await {
            Ok(encoded) => {
                tracker.advance(RunState::Finalized);
                workspace.mark_succeeded();

                let size_bytes = final_size(&final_path, encoded.size_bytes).await;

                info!(
                    "🎉 Reel {} complete in {:.1}s: {} ({:.2}s, {} bytes)",
                    run_id,
                    tracker.elapsed().as_secs_f64(),
                    final_path.display(),
                    encoded.duration_seconds,
                    size_bytes
                );

                Ok(FinalVideo {
                    path: final_path,
                    run_id,
                    size_bytes,
                    duration_seconds: encoded.duration_seconds,
                })
            }
            Err(e) => {
                tracker.fail();
                workspace.mark_failed();
                warn!(run_id = %run_id, stage = %e.stage(), "❌ Reel failed: {}", e);
                Err(e)
            }
        }
    }

    async fn produce(
        &self,
        script: &Script,
        palette: &Palette,
        workspace: &RunWorkspace,
        tracker: &mut RunTracker,
        final_path: &Path,
    ) -> Result<EncodedVideo> {
        // Both segments in parallel
        info!("🎤 Synthesizing speech and rendering overlays...");
        tracker.advance(RunState::AudioAndOverlaysInFlight);

        let shaped_body = self.ctx.shaper.shape(script.body_text());
        debug!("Shaped body: {}", shaped_body);

        let hook = self.segment(
            Segment::Hook,
            script.hook_text(),
            script.hook_text(),
            palette.hook_background,
            workspace,
        );
        let body = self.segment(
            Segment::Body,
            script.body_text(),
            &shaped_body,
            self.ctx.config.video.body_background,
            workspace,
        );
        let (hook_clip, body_clip) = tokio::try_join!(hook, body)?;

        tracker.advance(RunState::ClipsReady);
        info!(
            "   ✅ Clips ready: hook {:.2}s, body {:.2}s",
            hook_clip.duration_seconds, body_clip.duration_seconds
        );

        // Hook always precedes body
        info!("🔗 Concatenating clips...");
        let clips = [hook_clip, body_clip];
        let encoded = self
            .ctx
            .media
            .concatenate(
                &clips,
                &workspace.artifact("concat_list.txt"),
                &workspace.artifact("final.mp4"),
            )
            .await?;

        move_into_place(&encoded.path, final_path).await?;

        Ok(EncodedVideo {
            path: final_path.to_path_buf(),
            ..encoded
        })
    }

    /// Audio and overlay for one segment, then its clip
    async fn segment(
        &self,
        segment: Segment,
        speech_text: &str,
        overlay_text: &str,
        background: Rgb,
        workspace: &RunWorkspace,
    ) -> Result<Clip> {
        let speech = &self.ctx.config.speech;
        let (voice, prosody, language) = match segment {
            Segment::Hook => (speech.hook_voice, speech.hook_prosody, Language::English),
            Segment::Body => (speech.body_voice, speech.body_prosody, Language::Arabic),
        };

        let request = SpeechRequest::new(speech_text, voice).with_prosody(prosody);
        let style = self.ctx.renderer.style_for(language);
        let audio_stem = workspace.artifact(&format!("{}_audio", segment));
        let overlay_path = workspace.artifact(&format!("{}_overlay.png", segment));

        let (audio, overlay) = tokio::try_join!(
            self.ctx.synthesizer.synthesize(&request, &audio_stem),
            self.ctx.renderer.render(overlay_text, language, style, &overlay_path),
        )?;

        debug!(segment = %segment, duration = audio.duration_seconds, "Audio and overlay ready");

        self.ctx
            .media
            .compose(
                &audio,
                &overlay,
                background,
                segment,
                &workspace.artifact(&format!("{}.mp4", segment)),
            )
            .await
    }
}

static RUN_SEQUENCE: AtomicU32 = AtomicU32::new(0);

/// `<prefix>_<UTC timestamp with milliseconds>_<8 hex digits>`
///
/// The suffix is a process-wide sequence number followed by random bits, so
/// runs started within the same millisecond never share a directory.
pub fn derive_run_id(prefix: &str) -> String {
    let sequence = RUN_SEQUENCE.fetch_add(1, Ordering::Relaxed) & 0xffff;
    let salt: u16 = rand::thread_rng().gen();
    format!(
        "{}_{}_{:04x}{:04x}",
        prefix,
        Utc::now().format("%Y%m%d%H%M%S%3f"),
        sequence,
        salt
    )
}

/// Size of the moved output, or the encoder's figure if it cannot be read
async fn final_size(path: &Path, fallback: u64) -> u64 {
    match tokio::fs::metadata(path).await {
        Ok(meta) => meta.len(),
        Err(e) => {
            warn!("⚠️  Could not stat {}: {}, reporting {} bytes", path.display(), e, fallback);
            fallback
        }
    }
}

/// Resolves once `cancel` reads true; never resolves if the sender is gone
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

async fn move_into_place(from: &Path, to: &Path) -> Result<()> {
    if tokio::fs::rename(from, to).await.is_ok() {
        return Ok(());
    }

    // Rename fails across filesystems
    tokio::fs::copy(from, to)
        .await
        .map_err(|source| FilesystemError::MoveFailed {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })?;
    if let Err(e) = tokio::fs::remove_file(from).await {
        debug!("Could not remove {} after copy: {}", from.display(), e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CompositionError, Stage, SynthesisError, ValidationError};
    use crate::overlay::{FontBook, OverlayAsset};
    use crate::speech::{AudioAsset, SpeechProvider, VoiceId};
    use crate::video::MediaBackend;
    use async_trait::async_trait;
    use std::io::Cursor;
    use std::sync::Mutex;

    const HOOK: &str = "BITCOIN HITS SEVENTY THOUSAND!";
    const BODY: &str = "\u{0645}\u{0631}\u{062D}\u{0628}\u{0627} \u{0628}\u{0627}\u{0644}\u{0639}\u{0627}\u{0644}\u{0645}";

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

    /// English lines last one second, Arabic lines two
    #[derive(Default)]
    struct ToneProvider {
        calls: Mutex<Vec<SpeechRequest>>,
        delay: Duration,
    }

    impl ToneProvider {
        fn slow(delay: Duration) -> Self {
            Self { delay, ..Self::default() }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SpeechProvider for ToneProvider {
        fn name(&self) -> &str {
            "tone"
        }

        fn audio_extension(&self) -> &str {
            "wav"
        }

        async fn synthesize(&self, request: &SpeechRequest) -> std::result::Result<Vec<u8>, SynthesisError> {
            self.calls.lock().unwrap().push(request.clone());
            tokio::time::sleep(self.delay).await;
            let seconds = match request.voice.language() {
                Language::English => 1.0,
                Language::Arabic => 2.0,
            };
            Ok(wav_bytes(seconds))
        }
    }

    #[derive(Default)]
    struct RecordingMedia {
        composed: Mutex<Vec<(Segment, f64, Rgb)>>,
        concatenated: Mutex<Vec<Vec<Segment>>>,
        fail_compose: bool,
    }

    impl RecordingMedia {
        fn failing() -> Self {
            Self { fail_compose: true, ..Self::default() }
        }

        fn background_of(&self, segment: Segment) -> Option<Rgb> {
            self.composed
                .lock()
                .unwrap()
                .iter()
                .find(|(s, _, _)| *s == segment)
                .map(|(_, _, bg)| *bg)
        }
    }

    #[async_trait]
    impl MediaBackend for RecordingMedia {
        fn name(&self) -> &str {
            "recording"
        }

        async fn compose(
            &self,
            audio: &AudioAsset,
            overlay: &OverlayAsset,
            background: Rgb,
            segment: Segment,
            output: &Path,
        ) -> Result<Clip> {
            assert!(audio.path.exists());
            assert!(overlay.path.exists());
            assert_eq!((overlay.width, overlay.height), (1080, 1920));

            if self.fail_compose {
                return Err(CompositionError::ProcessFailed {
                    tool: "ffmpeg".to_string(),
                    exit_code: Some(1),
                    stderr: "encoder exploded".to_string(),
                }
                .into());
            }

            std::fs::write(output, b"clip").unwrap();
            self.composed
                .lock()
                .unwrap()
                .push((segment, audio.duration_seconds, background));

            Ok(Clip {
                path: output.to_path_buf(),
                duration_seconds: audio.duration_seconds,
                segment,
            })
        }

        async fn concatenate(&self, clips: &[Clip], _list_path: &Path, output: &Path) -> Result<EncodedVideo> {
            std::fs::write(output, b"final-video").unwrap();
            self.concatenated
                .lock()
                .unwrap()
                .push(clips.iter().map(|c| c.segment).collect());

            Ok(EncodedVideo {
                path: output.to_path_buf(),
                duration_seconds: clips.iter().map(|c| c.duration_seconds).sum(),
                size_bytes: 11,
            })
        }
    }

    fn test_config(root: &Path) -> Config {
        let mut config = Config::default();
        config.pipeline.work_dir = root.join("work");
        config.pipeline.output_dir = root.join("out");
        config.speech.retry_base_delay_ms = 1;
        config.speech.retry_max_delay_ms = 2;
        config
    }

    fn pipeline(config: Config, provider: Arc<ToneProvider>, media: Arc<RecordingMedia>) -> ReelPipeline {
        let ctx = PipelineContext::with_components(config, provider, media, FontBook::empty()).unwrap();
        ReelPipeline::new(ctx)
    }

    #[tokio::test]
    async fn test_end_to_end_with_fakes() {
        let root = tempfile::tempdir().unwrap();
        let provider = Arc::new(ToneProvider::default());
        let media = Arc::new(RecordingMedia::default());
        let reels = pipeline(test_config(root.path()), provider.clone(), media.clone());

        let video = reels
            .run(RenderRequest::new(HOOK, BODY).with_pillar("wins"))
            .await
            .unwrap();

        assert!(video.run_id.starts_with("wins_"));
        assert_eq!(video.path, root.path().join("out").join(format!("{}_final.mp4", video.run_id)));
        assert!(video.path.exists());
        assert!(video.size_bytes > 0);
        // Duration law: final = hook audio + body audio
        assert!((video.duration_seconds - 3.0).abs() < 1e-6);

        assert_eq!(*media.concatenated.lock().unwrap(), vec![vec![Segment::Hook, Segment::Body]]);
        assert_eq!(media.background_of(Segment::Hook), Some(Rgb::new(0x1a, 0x4d, 0x2e)));
        assert_eq!(media.background_of(Segment::Body), Some(Rgb::new(0x0a, 0x0a, 0x0a)));

        let calls = provider.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().any(|c| c.voice == VoiceId::EnMale && c.text == HOOK));
        // Speech gets the logical text, not the shaped one
        assert!(calls.iter().any(|c| c.voice == VoiceId::ArFemale && c.text == BODY));

        assert!(!root.path().join("work").join(&video.run_id).exists());
    }

    #[tokio::test]
    async fn test_empty_hook_makes_no_external_calls() {
        let root = tempfile::tempdir().unwrap();
        let provider = Arc::new(ToneProvider::default());
        let media = Arc::new(RecordingMedia::default());
        let reels = pipeline(test_config(root.path()), provider.clone(), media.clone());

        for (hook, body, expected) in [
            ("", BODY, ValidationError::EmptyHook),
            ("   ", BODY, ValidationError::EmptyHook),
            (HOOK, "\n\t", ValidationError::EmptyBody),
        ] {
            let err = reels.run(RenderRequest::new(hook, body)).await.unwrap_err();
            assert!(matches!(err, ReelError::Validation(ref e) if *e == expected));
            assert_eq!(err.stage(), Stage::Validation);
        }

        assert_eq!(provider.call_count(), 0);
        assert!(media.composed.lock().unwrap().is_empty());
        assert!(!root.path().join("work").exists());
        assert!(!root.path().join("out").exists());
    }

    #[tokio::test]
    async fn test_unknown_pillar_uses_default_palette() {
        let root = tempfile::tempdir().unwrap();
        let media = Arc::new(RecordingMedia::default());
        let reels = pipeline(test_config(root.path()), Arc::new(ToneProvider::default()), media.clone());

        let video = reels
            .run(RenderRequest::new(HOOK, BODY).with_pillar("crypto-memes"))
            .await
            .unwrap();

        assert!(video.run_id.starts_with("default_"));
        assert_eq!(media.background_of(Segment::Hook), Some(Rgb::new(0x1a, 0x1a, 0x1a)));
    }

    #[tokio::test]
    async fn test_explicit_run_id() {
        let root = tempfile::tempdir().unwrap();
        let reels = pipeline(
            test_config(root.path()),
            Arc::new(ToneProvider::default()),
            Arc::new(RecordingMedia::default()),
        );

        let video = reels
            .run(RenderRequest::new(HOOK, BODY).with_run_id("launch-day_01"))
            .await
            .unwrap();
        assert_eq!(video.run_id, "launch-day_01");
        assert_eq!(video.path, root.path().join("out").join("launch-day_01_final.mp4"));

        // Same id again: the output already exists
        let provider = Arc::new(ToneProvider::default());
        let reels = pipeline(test_config(root.path()), provider.clone(), Arc::new(RecordingMedia::default()));
        let err = reels
            .run(RenderRequest::new(HOOK, BODY).with_run_id("launch-day_01"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReelError::Filesystem(FilesystemError::OutputExists { .. })));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_removes_run_directory() {
        let root = tempfile::tempdir().unwrap();
        let reels = pipeline(
            test_config(root.path()),
            Arc::new(ToneProvider::default()),
            Arc::new(RecordingMedia::failing()),
        );

        let err = reels
            .run(RenderRequest::new(HOOK, BODY).with_run_id("broken"))
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Stage::Composition);
        assert!(!root.path().join("work").join("broken").exists());
        assert!(!root.path().join("out").join("broken_final.mp4").exists());
    }

    #[tokio::test]
    async fn test_preserve_on_failure() {
        let root = tempfile::tempdir().unwrap();
        let mut config = test_config(root.path());
        config.pipeline.preserve_on_failure = true;
        let reels = pipeline(config, Arc::new(ToneProvider::default()), Arc::new(RecordingMedia::failing()));

        reels
            .run(RenderRequest::new(HOOK, BODY).with_run_id("debug-me"))
            .await
            .unwrap_err();

        // The segment that failed left its audio and overlay behind
        let dir = root.path().join("work").join("debug-me");
        assert!(dir.exists());
        assert!(std::fs::read_dir(&dir).unwrap().count() >= 2);
    }

    #[tokio::test]
    async fn test_keep_intermediates() {
        let root = tempfile::tempdir().unwrap();
        let mut config = test_config(root.path());
        config.pipeline.keep_intermediates = true;
        let reels = pipeline(config, Arc::new(ToneProvider::default()), Arc::new(RecordingMedia::default()));

        reels
            .run(RenderRequest::new(HOOK, BODY).with_run_id("kept"))
            .await
            .unwrap();

        let dir = root.path().join("work").join("kept");
        for artifact in ["hook_audio.wav", "body_audio.wav", "hook_overlay.png", "body_overlay.png", "hook.mp4", "body.mp4"] {
            assert!(dir.join(artifact).exists(), "missing {}", artifact);
        }
        assert!(!dir.join("final.mp4").exists());
    }

    #[tokio::test]
    async fn test_cancellation_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let provider = Arc::new(ToneProvider::slow(Duration::from_secs(30)));
        let media = Arc::new(RecordingMedia::default());
        let reels = pipeline(test_config(root.path()), provider.clone(), media.clone());

        let (cancel_tx, cancel_rx) = watch::channel(false);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            let _ = cancel_tx.send(true);
        });

        let err = reels
            .run_until_cancelled(RenderRequest::new(HOOK, BODY).with_run_id("cancel-me"), cancel_rx)
            .await
            .unwrap_err();

        assert!(matches!(err, ReelError::Cancelled));
        assert_eq!(err.stage(), Stage::Cancelled);
        assert!(provider.call_count() > 0);
        assert!(media.composed.lock().unwrap().is_empty());
        assert!(!root.path().join("work").join("cancel-me").exists());
    }

    #[tokio::test]
    async fn test_deadline() {
        let root = tempfile::tempdir().unwrap();
        let mut config = test_config(root.path());
        config.pipeline.run_timeout_secs = 1;
        let reels = pipeline(config, Arc::new(ToneProvider::slow(Duration::from_secs(5))), Arc::new(RecordingMedia::default()));

        let err = reels
            .run(RenderRequest::new(HOOK, BODY).with_run_id("too-slow"))
            .await
            .unwrap_err();

        assert!(matches!(err, ReelError::DeadlineExceeded { seconds: 1 }));
        assert!(!root.path().join("work").join("too-slow").exists());
    }

    #[tokio::test]
    async fn test_shutdown_removes_empty_work_root() {
        let root = tempfile::tempdir().unwrap();
        let reels = pipeline(
            test_config(root.path()),
            Arc::new(ToneProvider::default()),
            Arc::new(RecordingMedia::default()),
        );
        reels.run(RenderRequest::new(HOOK, BODY)).await.unwrap();
        assert!(root.path().join("work").exists());

        reels.shutdown().await;
        assert!(!root.path().join("work").exists());
    }

    #[tokio::test]
    async fn test_concurrent_runs_get_distinct_ids() {
        let root = tempfile::tempdir().unwrap();
        let media = Arc::new(RecordingMedia::default());
        let reels = pipeline(test_config(root.path()), Arc::new(ToneProvider::default()), media.clone());

        let (first, second) = tokio::join!(
            reels.run(RenderRequest::new(HOOK, BODY).with_pillar("wins")),
            reels.run(RenderRequest::new(HOOK, BODY).with_pillar("wins")),
        );
        let (first, second) = (first.unwrap(), second.unwrap());

        assert_ne!(first.run_id, second.run_id);
        assert_ne!(first.path, second.path);
        assert!(first.path.exists());
        assert!(second.path.exists());
        assert_eq!(media.concatenated.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_derived_run_id_shape() {
        let run_id = derive_run_id("tech");
        let rest = run_id.strip_prefix("tech_").unwrap();
        let (stamp, suffix) = rest.split_once('_').unwrap();
        assert_eq!(stamp.len(), 17);
        assert!(stamp.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(crate::pipeline::types::is_valid_run_id(&run_id));
    }

    #[test]
    fn test_back_to_back_run_ids_differ() {
        let ids: std::collections::HashSet<_> = (0..64).map(|_| derive_run_id("wins")).collect();
        assert_eq!(ids.len(), 64);
    }

    #[tokio::test]
    async fn test_final_size_falls_back_when_output_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(final_size(&dir.path().join("gone.mp4"), 42).await, 42);

        let present = dir.path().join("here.mp4");
        std::fs::write(&present, b"12345").unwrap();
        assert_eq!(final_size(&present, 42).await, 5);
    }
}
