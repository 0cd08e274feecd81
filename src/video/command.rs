//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::CompositionError;

/// Keep this much of a failing tool's stderr in the error
const STDERR_TAIL: usize = 2_000;

#[derive(Debug, Clone)]
struct Input {
    args: Vec<String>,
    source: String,
}

/// Builder for FFmpeg commands with any number of inputs.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    inputs: Vec<Input>,
    output: PathBuf,
    output_args: Vec<String>,
    overwrite: bool,
    log_level: String,
}

impl FfmpegCommand {
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self {
            inputs: Vec::new(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Add a plain file input.
    pub fn input(self, path: impl AsRef<Path>) -> Self {
        self.input_with(Vec::<String>::new(), path.as_ref().to_string_lossy())
    }

    /// Add an input preceded by its own options.
    pub fn input_with<I, S>(mut self, args: I, source: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.push(Input {
            args: args.into_iter().map(Into::into).collect(),
            source: source.into(),
        });
        self
    }

    /// Add a lavfi source such as `color=c=0x1a4d2e:s=1080x1920:r=30`.
    pub fn lavfi(self, graph: impl Into<String>) -> Self {
        self.input_with(["-f", "lavfi"], graph)
    }

    /// Add a still image repeated for as long as the output runs.
    pub fn looped_image(self, path: impl AsRef<Path>) -> Self {
        self.input_with(["-loop", "1"], path.as_ref().to_string_lossy())
    }

    /// Add an input in the concat demuxer list format.
    pub fn concat_list(self, list: impl AsRef<Path>) -> Self {
        self.input_with(["-f", "concat", "-safe", "0"], list.as_ref().to_string_lossy())
    }

    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn filter_complex(self, filter: impl Into<String>) -> Self {
        self.output_arg("-filter_complex").output_arg(filter)
    }

    pub fn map(self, stream: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(stream)
    }

    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    pub fn preset(self, preset: impl Into<String>) -> Self {
        self.output_arg("-preset").output_arg(preset)
    }

    pub fn crf(self, crf: u8) -> Self {
        self.output_arg("-crf").output_arg(crf.to_string())
    }

    pub fn pixel_format(self, format: impl Into<String>) -> Self {
        self.output_arg("-pix_fmt").output_arg(format)
    }

    pub fn frame_rate(self, fps: u32) -> Self {
        self.output_arg("-r").output_arg(fps.to_string())
    }

    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    pub fn audio_bitrate(self, bitrate: impl Into<String>) -> Self {
        self.output_arg("-b:a").output_arg(bitrate)
    }

    pub fn audio_sample_rate(self, rate: u32) -> Self {
        self.output_arg("-ar").output_arg(rate.to_string())
    }

    pub fn audio_channels(self, channels: u8) -> Self {
        self.output_arg("-ac").output_arg(channels.to_string())
    }

    pub fn threads(self, threads: usize) -> Self {
        self.output_arg("-threads").output_arg(threads.to_string())
    }

    /// Limit the output duration.
    pub fn duration(self, seconds: f64) -> Self {
        self.output_arg("-t").output_arg(format!("{:.3}", seconds))
    }

    /// End the output with the shortest input.
    pub fn shortest(self) -> Self {
        self.output_arg("-shortest")
    }

    /// Copy every stream without re-encoding.
    pub fn stream_copy(self) -> Self {
        self.output_arg("-c").output_arg("copy")
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-hide_banner".to_string());
        args.push("-v".to_string());
        args.push(self.log_level.clone());

        for input in &self.inputs {
            args.extend(input.args.iter().cloned());
            args.push("-i".to_string());
            args.push(input.source.clone());
        }

        args.extend(self.output_args.iter().cloned());
        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runs an external media tool with a deadline.
///
/// The child is killed if the deadline passes or the future is dropped.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    tool: String,
    program: PathBuf,
    timeout: Duration,
}

impl FfmpegRunner {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        let program = program.into();
        let tool = program
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| program.display().to_string());
        Self { tool, program, timeout }
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Same tool with a different deadline.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            timeout,
            ..self.clone()
        }
    }

    /// Resolve the program on `PATH`.
    pub fn locate(&self) -> Result<PathBuf, CompositionError> {
        which::which(&self.program).map_err(|_| CompositionError::ToolNotFound { tool: self.tool.clone() })
    }

    pub async fn run_command(&self, cmd: &FfmpegCommand) -> Result<Output, CompositionError> {
        self.run(&cmd.build_args()).await
    }

    /// Run with `args`, returning the captured output of a successful run.
    pub async fn run(&self, args: &[String]) -> Result<Output, CompositionError> {
        debug!("Running {}: {} {}", self.tool, self.program.display(), args.join(" "));

        let child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CompositionError::ToolNotFound { tool: self.tool.clone() }
                } else {
                    CompositionError::SpawnFailed {
                        tool: self.tool.clone(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| CompositionError::SpawnFailed {
                tool: self.tool.clone(),
                reason: e.to_string(),
            })?,
            Err(_) => {
                warn!("{} timed out after {} seconds, killing process", self.tool, self.timeout.as_secs());
                return Err(CompositionError::Timeout {
                    tool: self.tool.clone(),
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        if !output.status.success() {
            return Err(CompositionError::ProcessFailed {
                tool: self.tool.clone(),
                exit_code: output.status.code(),
                stderr: stderr_tail(&output.stderr),
            });
        }

        Ok(output)
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    let count = text.chars().count();
    if count <= STDERR_TAIL {
        return text.to_string();
    }
    text.chars().skip(count - STDERR_TAIL).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiple_inputs_keep_their_options() {
        let args = FfmpegCommand::new("/tmp/out.mp4")
            .lavfi("color=c=0x1a4d2e:s=1080x1920:r=30")
            .looped_image("/tmp/overlay.png")
            .input("/tmp/audio.mp3")
            .map("2:a")
            .build_args();

        assert_eq!(
            args,
            vec![
                "-y", "-hide_banner", "-v", "error",
                "-f", "lavfi", "-i", "color=c=0x1a4d2e:s=1080x1920:r=30",
                "-loop", "1", "-i", "/tmp/overlay.png",
                "-i", "/tmp/audio.mp3",
                "-map", "2:a",
                "/tmp/out.mp4",
            ]
        );
    }

    #[test]
    fn test_concat_input_and_stream_copy() {
        let args = FfmpegCommand::new("final.mp4")
            .concat_list("concat_list.txt")
            .stream_copy()
            .build_args();

        let joined = args.join(" ");
        assert!(joined.contains("-f concat -safe 0 -i concat_list.txt -c copy final.mp4"));
    }

    #[test]
    fn test_duration_is_millisecond_precise() {
        let args = FfmpegCommand::new("o.mp4").duration(2.04166666).build_args();
        assert!(args.windows(2).any(|w| w[0] == "-t" && w[1] == "2.042"));
    }

    #[test]
    fn test_stderr_tail_keeps_the_end() {
        let long = format!("{}END", "x".repeat(5_000));
        let tail = stderr_tail(long.as_bytes());
        assert_eq!(tail.chars().count(), STDERR_TAIL);
        assert!(tail.ends_with("END"));
    }

    #[tokio::test]
    async fn test_missing_program_is_tool_not_found() {
        let runner = FfmpegRunner::new("/nonexistent/bin/ffmpeg-missing", Duration::from_secs(5));
        let err = runner.run(&["-version".to_string()]).await.unwrap_err();

        assert!(matches!(err, CompositionError::ToolNotFound { ref tool } if tool == "ffmpeg-missing"));
        assert!(runner.locate().is_err());
    }
}
