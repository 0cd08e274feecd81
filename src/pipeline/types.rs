use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Longest accepted run id
pub const MAX_RUN_ID_LEN: usize = 64;

/// A render request as it arrives from a caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub hook_text: String,
    pub body_text: String,

    /// Palette tag; the configured default pillar when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pillar: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
}

impl RenderRequest {
    pub fn new<H: Into<String>, B: Into<String>>(hook_text: H, body_text: B) -> Self {
        Self {
            hook_text: hook_text.into(),
            body_text: body_text.into(),
            pillar: None,
            run_id: None,
        }
    }

    pub fn with_pillar<S: Into<String>>(mut self, pillar: S) -> Self {
        self.pillar = Some(pillar.into());
        self
    }

    pub fn with_run_id<S: Into<String>>(mut self, run_id: S) -> Self {
        self.run_id = Some(run_id.into());
        self
    }
}

/// A validated request; immutable once accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    hook_text: String,
    body_text: String,
    pillar: String,
    run_id: Option<String>,
}

impl Script {
    /// Validate `request`, filling in `default_pillar` when it names none
    pub fn from_request(request: RenderRequest, default_pillar: &str) -> Result<Self, ValidationError> {
        let hook_text = request.hook_text.trim();
        if hook_text.is_empty() {
            return Err(ValidationError::EmptyHook);
        }

        let body_text = request.body_text.trim();
        if body_text.is_empty() {
            return Err(ValidationError::EmptyBody);
        }

        let run_id = match request.run_id {
            Some(run_id) if !is_valid_run_id(&run_id) => {
                return Err(ValidationError::InvalidRunId { run_id });
            }
            other => other,
        };

        let pillar = request
            .pillar
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| default_pillar.to_lowercase());

        Ok(Self {
            hook_text: hook_text.to_string(),
            body_text: body_text.to_string(),
            pillar,
            run_id,
        })
    }

    pub fn hook_text(&self) -> &str {
        &self.hook_text
    }

    pub fn body_text(&self) -> &str {
        &self.body_text
    }

    pub fn pillar(&self) -> &str {
        &self.pillar
    }

    pub fn run_id(&self) -> Option<&str> {
        self.run_id.as_deref()
    }
}

/// Run ids become directory and file names: 1-64 of `[A-Za-z0-9_-]`
pub fn is_valid_run_id(run_id: &str) -> bool {
    !run_id.is_empty()
        && run_id.len() <= MAX_RUN_ID_LEN
        && run_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// The finished reel
#[derive(Debug, Clone, PartialEq)]
pub struct FinalVideo {
    pub path: PathBuf,
    pub run_id: String,
    pub size_bytes: u64,
    pub duration_seconds: f64,
}

/// What a successful run reports back to its caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderOutcome {
    pub final_video_path: String,
    pub run_id: String,
    pub size_bytes: u64,
    pub duration_seconds: f64,
}

impl From<&FinalVideo> for RenderOutcome {
    fn from(video: &FinalVideo) -> Self {
        Self {
            final_video_path: video.path.display().to_string(),
            run_id: video.run_id.clone(),
            size_bytes: video.size_bytes,
            duration_seconds: video.duration_seconds,
        }
    }
}
