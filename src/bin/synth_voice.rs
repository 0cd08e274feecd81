// Synthesize one line with a configured voice and report its measured duration

use std::path::PathBuf;
use std::sync::Arc;

use bilingual_reels::{
    config::Config,
    speech::{NeuralSpeechProvider, SpeechRequest, SpeechSynthesizer, VoiceId},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut args = std::env::args().skip(1);
    let voice_key = args.next().unwrap_or_else(|| "en-male".to_string());
    let text = args.next().unwrap_or_else(|| "BITCOIN HITS SEVENTY THOUSAND!".to_string());
    let stem = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("voice_sample"));

    let voice = VoiceId::from_key(&voice_key).ok_or_else(|| {
        let known: Vec<&str> = VoiceId::ALL.iter().map(|v| v.key()).collect();
        format!("unknown voice '{}', expected one of {:?}", voice_key, known)
    })?;

    let mut config = Config::default();
    config.apply_env();

    println!("🎤 Synthesizing with {} ({})", voice.key(), voice);

    let provider = Arc::new(NeuralSpeechProvider::new(&config.speech)?);
    let synthesizer = SpeechSynthesizer::from_config(provider, &config.speech);

    let asset = synthesizer.synthesize(&SpeechRequest::new(text, voice), &stem).await?;

    println!("   ✅ {} ({:.3}s, {})", asset.path.display(), asset.duration_seconds, asset.language);
    Ok(())
}
