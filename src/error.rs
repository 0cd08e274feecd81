use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the reel pipeline
#[derive(Error, Debug)]
pub enum ReelError {
    #[error("Input validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Speech synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("Overlay rendering error: {0}")]
    Overlay(#[from] OverlayError),

    #[error("Composition error: {0}")]
    Composition(#[from] CompositionError),

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Run was cancelled")]
    Cancelled,

    #[error("Run exceeded its deadline of {seconds}s")]
    DeadlineExceeded { seconds: u64 },
}

/// Rejections raised before any external call is made
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("hook text is missing or empty")]
    EmptyHook,

    #[error("body text is missing or empty")]
    EmptyBody,

    #[error("run id '{run_id}' must be 1-64 characters of [A-Za-z0-9_-]")]
    InvalidRunId { run_id: String },
}

/// Failures talking to the remote speech provider
#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("cannot synthesize empty text")]
    EmptyText,

    #[error("request to speech provider failed: {reason}")]
    Transport { reason: String },

    #[error("speech provider did not answer within {seconds}s")]
    Timeout { seconds: u64 },

    #[error("speech provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("speech provider returned no audio for voice {voice}")]
    EmptyAudio { voice: String },

    #[error("could not decode synthesized audio {path}: {reason}")]
    Undecodable { path: String, reason: String },

    #[error("could not store synthesized audio {path}: {reason}")]
    Store { path: String, reason: String },

    #[error("giving up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: String },
}

/// Overlay rasterization errors
#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("failed to write overlay {path}: {reason}")]
    SaveFailed { path: String, reason: String },

    #[error("overlay worker failed: {reason}")]
    WorkerFailed { reason: String },
}

/// Compositing and concatenation errors
#[derive(Error, Debug)]
pub enum CompositionError {
    #[error("{tool} not found in PATH")]
    ToolNotFound { tool: String },

    #[error("{tool} exited with status {exit_code:?}: {stderr}")]
    ProcessFailed {
        tool: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("failed to launch {tool}: {reason}")]
    SpawnFailed { tool: String, reason: String },

    #[error("{tool} timed out after {seconds}s")]
    Timeout { tool: String, seconds: u64 },

    #[error("input file not found: {path}")]
    MissingInput { path: String },

    #[error("{tool} produced no output at {path}")]
    MissingOutput { tool: String, path: String },

    #[error("clip {path} does not match the first clip's streams ({expected} vs {found})")]
    CodecMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("could not read stream info from {path}: {reason}")]
    ProbeFailed { path: String, reason: String },

    #[error("concatenation needs at least two clips, got {count}")]
    NotEnoughClips { count: usize },

    #[error("cannot write concat list {path}: {reason}")]
    ListWrite { path: String, reason: String },

    /// Any failure while joining clips
    #[error("concatenation failed: {source}")]
    Concat {
        #[source]
        source: Box<CompositionError>,
    },
}

impl CompositionError {
    pub fn concat(source: CompositionError) -> Self {
        match source {
            already @ Self::Concat { .. } => already,
            other => Self::Concat { source: Box::new(other) },
        }
    }

    /// The underlying failure, looking through the concat wrapper
    pub fn cause(&self) -> &CompositionError {
        match self {
            Self::Concat { source } => source.cause(),
            other => other,
        }
    }
}

/// Working and output directory errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("run directory {path} already exists")]
    RunDirExists { path: PathBuf },

    #[error("output {path} already exists")]
    OutputExists { path: PathBuf },

    #[error("cannot move {from} to {to}: {source}")]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {key}")]
    MissingKey { key: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using ReelError
pub type Result<T> = std::result::Result<T, ReelError>;

/// Pipeline stage an error is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validation,
    Synthesis,
    Overlay,
    Composition,
    Concatenation,
    Filesystem,
    Configuration,
    Cancelled,
    Deadline,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Validation => "validation",
            Stage::Synthesis => "synthesis",
            Stage::Overlay => "overlay",
            Stage::Composition => "composition",
            Stage::Concatenation => "concatenation",
            Stage::Filesystem => "filesystem",
            Stage::Configuration => "configuration",
            Stage::Cancelled => "cancelled",
            Stage::Deadline => "deadline",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SynthesisError {
    /// Whether another attempt against the provider could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Timeout { .. } | Self::EmptyAudio { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl ReelError {
    /// The stage that failed
    pub fn stage(&self) -> Stage {
        match self {
            Self::Validation(_) => Stage::Validation,
            Self::Synthesis(_) => Stage::Synthesis,
            Self::Overlay(_) => Stage::Overlay,
            Self::Composition(CompositionError::Concat { .. })
            | Self::Composition(CompositionError::CodecMismatch { .. })
            | Self::Composition(CompositionError::NotEnoughClips { .. }) => Stage::Concatenation,
            Self::Composition(_) => Stage::Composition,
            Self::Filesystem(_) => Stage::Filesystem,
            Self::Config(_) => Stage::Configuration,
            Self::Cancelled => Stage::Cancelled,
            Self::DeadlineExceeded { .. } => Stage::Deadline,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(ValidationError::EmptyHook) => {
                "The hook text is empty. Provide a short opening line.".to_string()
            }
            Self::Validation(ValidationError::EmptyBody) => {
                "The body text is empty. Provide the body script.".to_string()
            }
            Self::Composition(err) => match err.cause() {
                CompositionError::ToolNotFound { tool } => {
                    format!("'{}' was not found. Please install FFmpeg and make sure it is on PATH.", tool)
                }
                _ => self.to_string(),
            },
            Self::Synthesis(SynthesisError::Status { status: 401, .. })
            | Self::Synthesis(SynthesisError::Status { status: 403, .. }) => {
                "The speech provider rejected the credentials. Check SPEECH_API_KEY.".to_string()
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
