use std::fs::File;
use std::path::Path;

use symphonia::core::audio::AudioBufferRef;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::SynthesisError;

/// Measures how long an audio file plays
pub struct AudioDuration;

impl AudioDuration {
    /// Decode the file and return its playing time in seconds
    ///
    /// WAV goes through hound, everything else through Symphonia. The whole
    /// stream is decoded: header durations of VBR MP3 are estimates.
    pub fn measure<P: AsRef<Path>>(path: P) -> Result<f64, SynthesisError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "wav" => Self::measure_wav(path),
            _ => Self::measure_with_symphonia(path),
        }
    }

    fn measure_wav(path: &Path) -> Result<f64, SynthesisError> {
        let reader = hound::WavReader::open(path).map_err(|e| undecodable(path, e))?;

        let spec = reader.spec();
        if spec.sample_rate == 0 {
            return Err(undecodable(path, "zero sample rate"));
        }

        // duration() counts frames, i.e. samples per channel
        Ok(reader.duration() as f64 / spec.sample_rate as f64)
    }

    fn measure_with_symphonia(path: &Path) -> Result<f64, SynthesisError> {
        let file = File::open(path).map_err(|e| undecodable(path, e))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(extension);
        }

        let meta_opts: MetadataOptions = Default::default();
        let fmt_opts: FormatOptions = Default::default();

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &fmt_opts, &meta_opts)
            .map_err(|e| undecodable(path, e))?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| undecodable(path, "no decodable audio track"))?;

        let track_id = track.id;
        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| undecodable(path, "no sample rate found"))?;

        let dec_opts: DecoderOptions = Default::default();
        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &dec_opts)
            .map_err(|e| undecodable(path, e))?;

        let mut frames: u64 = 0;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::ResetRequired) => {
                    decoder.reset();
                    continue;
                }
                // End of stream
                Err(SymphoniaError::IoError(_)) => break,
                Err(_) => break,
            };

            while !format.metadata().is_latest() {
                format.metadata().pop();
            }

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => frames += Self::frame_count(&decoded),
                Err(SymphoniaError::IoError(_)) => break,
                Err(SymphoniaError::DecodeError(_)) => continue,
                Err(_) => break,
            }
        }

        Ok(frames as f64 / sample_rate as f64)
    }

    fn frame_count(buffer: &AudioBufferRef) -> u64 {
        buffer.frames() as u64
    }
}

fn undecodable(path: &Path, reason: impl ToString) -> SynthesisError {
    SynthesisError::Undecodable {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}
