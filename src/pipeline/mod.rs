//! # Pipeline Module
//!
//! Sequences one reel: validation, speech and overlays for both segments in
//! parallel, clip composition per segment, then concatenation in the fixed
//! order hook, body. Each run owns an isolated directory that is cleaned up
//! however the run ends.

pub mod context;
pub mod engine;
pub mod state;
pub mod types;
pub mod workspace;

pub use context::PipelineContext;
pub use engine::{derive_run_id, ReelPipeline};
pub use state::{RunState, RunTracker};
pub use types::{FinalVideo, RenderOutcome, RenderRequest, Script};
pub use workspace::RunWorkspace;
