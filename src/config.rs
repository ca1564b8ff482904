//! Configuration for poster generation.
//!
//! Every knob lives in [`PosterConfig`], built via [`PosterConfigBuilder`].
//! The config is passed explicitly into extraction and population; there is
//! no process-wide provider selector or test-mode switch.

use crate::error::PosterError;
use crate::pptx::RgbColor;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Where structured poster content comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExtractionMode {
    /// Ask the configured LLM provider (default).
    #[default]
    Live,
    /// Load a previously recorded extraction from a JSON file. No network.
    Fixture(PathBuf),
}

/// Configuration for a poster generation run.
///
/// Built via [`PosterConfig::builder()`] or using [`PosterConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_poster::PosterConfig;
///
/// let config = PosterConfig::builder()
///     .provider_name("openai")
///     .model("gpt-4.1-mini")
///     .max_retries(1)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct PosterConfig {
    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `provider`, the provider is resolved from the
    /// environment.
    pub provider_name: Option<String>,

    /// LLM model identifier, e.g. "gpt-4.1-mini". If None, uses provider default.
    pub model: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for the extraction call. Default: 0.4.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 4000.
    pub max_tokens: usize,

    /// Retry attempts after a failed LLM call. Default: 2.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled per attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Manuscript characters sent to the model. Default: 30 000.
    pub max_manuscript_chars: usize,

    /// Custom system prompt. If None, uses the built-in poster prompt.
    pub system_prompt: Option<String>,

    /// Live LLM extraction or a recorded fixture. Default: Live.
    pub mode: ExtractionMode,

    /// When set, live extractions are also written here as a fixture.
    pub record_fixture: Option<PathBuf>,

    /// Download timeout for URL manuscripts in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Smallest accepted figure file. Default: 1 KiB.
    pub min_image_bytes: u64,

    /// Largest accepted figure file. Default: 50 MiB.
    pub max_image_bytes: u64,

    /// Colour of `*highlighted*` headline words. Default: #FF8C00.
    pub highlight_color: RgbColor,

    /// Template library directory (holds `available/`, `premium/`,
    /// `coming_soon/`). Default: `templates`.
    pub library_root: PathBuf,

    /// Optional JSON file overriding built-in template styles.
    pub style_config: Option<PathBuf>,

    /// Stage progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for PosterConfig {
    fn default() -> Self {
        Self {
            provider_name: None,
            model: None,
            provider: None,
            temperature: 0.4,
            max_tokens: 4000,
            max_retries: 2,
            retry_backoff_ms: 500,
            max_manuscript_chars: 30_000,
            system_prompt: None,
            mode: ExtractionMode::Live,
            record_fixture: None,
            download_timeout_secs: 120,
            min_image_bytes: 1024,
            max_image_bytes: 50 * 1024 * 1024,
            highlight_color: RgbColor(255, 140, 0),
            library_root: PathBuf::from("templates"),
            style_config: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PosterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PosterConfig")
            .field("provider_name", &self.provider_name)
            .field("model", &self.model)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("max_manuscript_chars", &self.max_manuscript_chars)
            .field("mode", &self.mode)
            .field("record_fixture", &self.record_fixture)
            .field("image_bytes", &(self.min_image_bytes..=self.max_image_bytes))
            .field("highlight_color", &self.highlight_color)
            .field("library_root", &self.library_root)
            .field("style_config", &self.style_config)
            .finish()
    }
}

impl PosterConfig {
    /// Create a new builder for `PosterConfig`.
    pub fn builder() -> PosterConfigBuilder {
        PosterConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`PosterConfig`].
pub struct PosterConfigBuilder {
    config: PosterConfig,
}

impl fmt::Debug for PosterConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PosterConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl PosterConfigBuilder {
    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn max_manuscript_chars(mut self, n: usize) -> Self {
        self.config.max_manuscript_chars = n.max(1000);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn mode(mut self, mode: ExtractionMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Shorthand for `mode(ExtractionMode::Fixture(path))`.
    pub fn fixture(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.mode = ExtractionMode::Fixture(path.into());
        self
    }

    pub fn record_fixture(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.record_fixture = Some(path.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn min_image_bytes(mut self, n: u64) -> Self {
        self.config.min_image_bytes = n;
        self
    }

    pub fn max_image_bytes(mut self, n: u64) -> Self {
        self.config.max_image_bytes = n;
        self
    }

    pub fn highlight_color(mut self, color: RgbColor) -> Self {
        self.config.highlight_color = color;
        self
    }

    pub fn library_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.library_root = root.into();
        self
    }

    pub fn style_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.style_config = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PosterConfig, PosterError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(PosterError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if c.min_image_bytes > c.max_image_bytes {
            return Err(PosterError::InvalidConfig(format!(
                "min_image_bytes ({}) exceeds max_image_bytes ({})",
                c.min_image_bytes, c.max_image_bytes
            )));
        }
        if c.record_fixture.is_some() && matches!(c.mode, ExtractionMode::Fixture(_)) {
            return Err(PosterError::InvalidConfig(
                "record_fixture needs live extraction; it cannot be combined with a fixture".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = PosterConfig::default();
        assert_eq!(c.temperature, 0.4);
        assert_eq!(c.max_tokens, 4000);
        assert_eq!(c.max_manuscript_chars, 30_000);
        assert_eq!(c.min_image_bytes, 1024);
        assert_eq!(c.max_image_bytes, 52_428_800);
        assert_eq!(c.highlight_color, RgbColor(0xFF, 0x8C, 0x00));
        assert_eq!(c.mode, ExtractionMode::Live);
    }

    #[test]
    fn setters_clamp() {
        let c = PosterConfig::builder()
            .temperature(9.0)
            .max_manuscript_chars(10)
            .build()
            .unwrap();
        assert_eq!(c.temperature, 2.0);
        assert_eq!(c.max_manuscript_chars, 1000);
    }

    #[test]
    fn inverted_image_bounds_are_rejected() {
        let err = PosterConfig::builder()
            .min_image_bytes(10)
            .max_image_bytes(5)
            .build()
            .unwrap_err();
        assert!(matches!(err, PosterError::InvalidConfig(_)));
    }

    #[test]
    fn fixture_and_recording_are_exclusive() {
        let err = PosterConfig::builder()
            .fixture("a.json")
            .record_fixture("b.json")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("record_fixture"));
    }
}
