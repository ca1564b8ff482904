//! Progress-callback trait for poster generation stages.
//!
//! Inject an [`Arc<dyn PosterProgressCallback>`] via
//! [`crate::config::PosterConfigBuilder::progress_callback`] to receive events
//! as [`crate::generate::generate_poster`] moves through its stages:
//!
//! ```text
//! ReadManuscript → ExtractContent → Populate → Save
//! ```
//!
//! # Example
//!
//! ```rust
//! use edgequake_poster::{PosterConfig, PosterProgressCallback, Stage};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl PosterProgressCallback for Printer {
//!     fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
//!         eprintln!("{stage} done in {elapsed_ms} ms");
//!     }
//! }
//!
//! let config = PosterConfig::builder()
//!     .progress_callback(Arc::new(Printer))
//!     .build()
//!     .unwrap();
//! ```

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Pipeline stages reported to a [`PosterProgressCallback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ReadManuscript,
    ExtractContent,
    Populate,
    Save,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::ReadManuscript => "Reading manuscript",
            Stage::ExtractContent => "Extracting content",
            Stage::Populate => "Populating template",
            Stage::Save => "Saving poster",
        })
    }
}

/// Called by the generation pipeline at stage boundaries.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait PosterProgressCallback: Send + Sync {
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// # Arguments
    /// * `stage`: the stage that just finished
    /// * `elapsed_ms`: wall-clock time spent in it
    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        let _ = (stage, elapsed_ms);
    }

    /// Called for every non-fatal population warning, in order.
    fn on_warning(&self, message: &str) {
        let _ = message;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PosterProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PosterConfig`].
pub type ProgressCallback = Arc<dyn PosterProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl PosterProgressCallback for Recorder {
        fn on_stage_start(&self, stage: Stage) {
            self.events.lock().unwrap().push(format!("start {stage:?}"));
        }

        fn on_stage_complete(&self, stage: Stage, _elapsed_ms: u64) {
            self.events.lock().unwrap().push(format!("done {stage:?}"));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_stage_start(Stage::Populate);
        cb.on_stage_complete(Stage::Populate, 12);
        cb.on_warning("Figure 2: placeholder missing");
    }

    #[test]
    fn arc_dyn_callback_receives_events() {
        let recorder = Arc::new(Recorder::default());
        let cb: ProgressCallback = recorder.clone();
        cb.on_stage_start(Stage::Save);
        cb.on_stage_complete(Stage::Save, 3);
        assert_eq!(
            *recorder.events.lock().unwrap(),
            ["start Save", "done Save"]
        );
    }

    #[test]
    fn stage_display() {
        assert_eq!(Stage::ExtractContent.to_string(), "Extracting content");
    }
}
