//! LLM interaction: resolve a provider and extract poster content.
//!
//! Prompt text lives in [`crate::prompts`]; this module owns retries and
//! provider selection only.
//!
//! ## Retry Strategy
//!
//! API errors (429 / 503) and unparseable answers are both retried with
//! exponential backoff (`retry_backoff_ms * 2^attempt`): with 500 ms base and
//! 2 retries the waits are 500 ms → 1 s.

use crate::config::PosterConfig;
use crate::content::ExtractedContent;
use crate::error::{PopulateWarning, PosterError};
use crate::pipeline::response::parse_response;
use crate::pipeline::text::truncate_chars;
use crate::prompts::{extraction_prompt, DEFAULT_SYSTEM_PROMPT};
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

/// Model used when a provider is named without one.
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// A successful extraction.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub content: ExtractedContent,
    /// Values that had to be coerced or dropped.
    pub warnings: Vec<PopulateWarning>,
    /// The model's answer before repair.
    pub raw_response: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub retries: u32,
    pub duration_ms: u64,
}

/// Ask the model for poster content.
///
/// The manuscript is cut to `config.max_manuscript_chars` characters.
/// Returns the last error once every attempt has failed.
pub async fn extract_content(
    provider: &Arc<dyn LLMProvider>,
    manuscript: &str,
    config: &PosterConfig,
) -> Result<Extraction, PosterError> {
    let start = Instant::now();
    let text = truncate_chars(manuscript, config.max_manuscript_chars);
    if text.len() < manuscript.len() {
        info!(
            "Manuscript truncated to {} of {} chars",
            config.max_manuscript_chars,
            manuscript.chars().count()
        );
    }

    let system_prompt = config
        .system_prompt
        .as_deref()
        .unwrap_or(DEFAULT_SYSTEM_PROMPT);
    let messages = vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user(extraction_prompt(text)),
    ];
    let options = build_options(config);

    let mut last_err = PosterError::LlmApiError {
        message: "no attempt made".to_string(),
    };

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = config.retry_backoff_ms * 2u64.pow(attempt - 1);
            warn!(
                "Extraction: retry {}/{} after {}ms",
                attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        let response = match provider.chat(&messages, Some(&options)).await {
            Ok(r) => r,
            Err(e) => {
                warn!("Extraction: attempt {} failed: {}", attempt + 1, e);
                last_err = PosterError::LlmApiError {
                    message: e.to_string(),
                };
                continue;
            }
        };
        debug!(
            "Extraction: {} input tokens, {} output tokens",
            response.prompt_tokens, response.completion_tokens
        );

        match parse_response(&response.content) {
            Ok((content, warnings)) => {
                return Ok(Extraction {
                    content,
                    warnings,
                    raw_response: response.content,
                    input_tokens: response.prompt_tokens as u64,
                    output_tokens: response.completion_tokens as u64,
                    retries: attempt,
                    duration_ms: start.elapsed().as_millis() as u64,
                });
            }
            Err(e) => {
                warn!("Extraction: attempt {} unparseable: {}", attempt + 1, e);
                last_err = e;
            }
        }
    }

    Err(last_err)
}

fn build_options(config: &PosterConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, PosterError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        PosterError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific:
///
/// 1. **Pre-built provider** (`config.provider`), used as-is.
/// 2. **Named provider + model** (`config.provider_name`); the API key comes
///    from the provider's usual environment variable.
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`),
///    both non-empty.
/// 4. **OpenAI** when `OPENAI_API_KEY` is set.
/// 5. **Full auto-detection** (`ProviderFactory::from_env`).
pub async fn resolve_provider(config: &PosterConfig) -> Result<Arc<dyn LLMProvider>, PosterError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| PosterError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Use --fixture to populate from a recorded extraction without a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}
