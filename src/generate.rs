//! End-to-end poster generation.
//!
//! ```text
//! manuscript ─▶ read ─▶ extract (LLM or fixture) ─▶ populate ─▶ save
//! ```
//!
//! [`generate_poster`] runs every stage. [`populate_from_fixture`] skips the
//! model entirely and populates from a recorded extraction, which is how the
//! tests and offline demos drive the populator.

use crate::config::{ExtractionMode, PosterConfig};
use crate::content::{ExtractedContent, FigureSet};
use crate::error::{PopulateWarning, PosterError};
use crate::pipeline::{input, llm, response, text};
use crate::populate::{open_template, save_poster, PopulateReport, Populator};
use crate::progress::Stage;
use crate::templates::{template_name, TemplateLibrary};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Timings and token usage for one generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationStats {
    /// Characters of manuscript text read (0 in fixture mode).
    pub manuscript_chars: usize,
    pub read_ms: u64,
    pub extract_ms: u64,
    pub populate_ms: u64,
    pub save_ms: u64,
    pub total_ms: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    /// Extraction attempts beyond the first.
    pub retries: u32,
    /// True when content came from a fixture rather than a model.
    pub from_fixture: bool,
}

/// Everything a generation produced besides the `.pptx` itself.
#[derive(Debug, Clone, Serialize)]
pub struct PosterOutput {
    pub output_path: PathBuf,
    pub template_path: PathBuf,
    pub content: ExtractedContent,
    pub report: PopulateReport,
    pub stats: GenerationStats,
}

/// Generate a poster from a manuscript (local PDF, text file or URL).
///
/// In [`ExtractionMode::Fixture`] the manuscript is ignored and content is
/// read from the fixture file instead.
///
/// # Errors
/// Input, extraction, template and save failures are fatal. Missing shapes
/// and rejected images are not; they are listed in
/// `output.report.warnings`.
pub async fn generate_poster(
    manuscript: impl AsRef<str>,
    template: &str,
    output: impl AsRef<Path>,
    figures: &FigureSet,
    config: &PosterConfig,
) -> Result<PosterOutput, PosterError> {
    let total_start = Instant::now();
    let manuscript = manuscript.as_ref();
    let output = output.as_ref();

    // ── Step 1: Resolve template and styles before any model call ────────
    let template_path = TemplateLibrary::new(&config.library_root).resolve(template)?;
    let populator = Populator::from_config(config)?;

    let mut stats = GenerationStats::default();
    let (content, extraction_warnings) = match &config.mode {
        ExtractionMode::Fixture(path) => {
            info!("Using fixture {} (manuscript ignored)", path.display());
            stats.from_fixture = true;
            timed(config, Stage::ExtractContent, &mut stats.extract_ms, || async {
                load_fixture(path).await
            })
            .await?
        }
        ExtractionMode::Live => {
            info!("Generating poster from {}", manuscript);

            // ── Step 2: Read manuscript ──────────────────────────────────
            let manuscript_text = timed(config, Stage::ReadManuscript, &mut stats.read_ms, || async {
                let resolved = input::resolve_input(manuscript, config.download_timeout_secs).await?;
                text::read_manuscript(&resolved).await
            })
            .await?;
            stats.manuscript_chars = manuscript_text.chars().count();
            debug!("Manuscript: {} chars", stats.manuscript_chars);

            // ── Step 3: Extract content ──────────────────────────────────
            let extraction = timed(config, Stage::ExtractContent, &mut stats.extract_ms, || async {
                let provider = llm::resolve_provider(config).await?;
                llm::extract_content(&provider, &manuscript_text, config).await
            })
            .await?;
            stats.input_tokens = extraction.input_tokens;
            stats.output_tokens = extraction.output_tokens;
            stats.retries = extraction.retries;

            if let Some(ref path) = config.record_fixture {
                save_fixture(path, &extraction.content).await?;
                info!("Recorded extraction to {}", path.display());
            }
            (extraction.content, extraction.warnings)
        }
    };

    // ── Step 4+5: Populate and save ──────────────────────────────────────
    let (mut report, content) =
        populate_and_save(populator, &template_path, output, content, figures, config, &mut stats).await?;
    prepend_warnings(&mut report, extraction_warnings);
    notify_warnings(config, &report.warnings);

    stats.total_ms = total_start.elapsed().as_millis() as u64;
    info!(
        "Poster saved to {} in {}ms ({} warnings)",
        output.display(),
        stats.total_ms,
        report.warnings.len()
    );

    Ok(PosterOutput {
        output_path: output.to_path_buf(),
        template_path,
        content,
        report,
        stats,
    })
}

/// Populate `template` from a recorded extraction, without a model.
///
/// The fixture may be a content JSON (as written by
/// [`PosterConfig::record_fixture`]) or a raw model answer.
/// See [`load_fixture`].
pub async fn populate_from_fixture(
    fixture: impl AsRef<Path>,
    template: &str,
    output: impl AsRef<Path>,
    figures: &FigureSet,
    config: &PosterConfig,
) -> Result<PosterOutput, PosterError> {
    let mut config = config.clone();
    config.mode = ExtractionMode::Fixture(fixture.as_ref().to_path_buf());
    generate_poster("", template, output, figures, &config).await
}

/// Synchronous wrapper around [`generate_poster`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_poster_sync(
    manuscript: impl AsRef<str>,
    template: &str,
    output: impl AsRef<Path>,
    figures: &FigureSet,
    config: &PosterConfig,
) -> Result<PosterOutput, PosterError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PosterError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate_poster(manuscript, template, output, figures, config))
}

/// Read extracted content from a fixture file.
///
/// A well-formed JSON object is taken as recorded. Anything else is treated
/// as a raw model answer and repaired like a live response.
pub async fn load_fixture(path: &Path) -> Result<(ExtractedContent, Vec<PopulateWarning>), PosterError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| PosterError::FixtureIo {
            path: path.to_path_buf(),
            source,
        })?;
    match ExtractedContent::from_json(&raw) {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            debug!("Fixture {} is not plain JSON ({}), repairing", path.display(), e);
            response::parse_response(&raw)
        }
    }
}

/// Write extracted content as pretty JSON with all twelve keys.
pub async fn save_fixture(path: &Path, content: &ExtractedContent) -> Result<(), PosterError> {
    let json = serde_json::to_string_pretty(content)
        .map_err(|e| PosterError::Internal(format!("Failed to serialise content: {}", e)))?;
    tokio::fs::write(path, json)
        .await
        .map_err(|source| PosterError::FixtureIo {
            path: path.to_path_buf(),
            source,
        })
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Run one stage, firing progress events and recording its duration.
async fn timed<T, F, Fut>(
    config: &PosterConfig,
    stage: Stage,
    elapsed_ms: &mut u64,
    f: F,
) -> Result<T, PosterError>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, PosterError>>,
{
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_start(stage);
    }
    let start = Instant::now();
    let result = f().await;
    *elapsed_ms = start.elapsed().as_millis() as u64;
    if result.is_ok() {
        if let Some(ref cb) = config.progress_callback {
            cb.on_stage_complete(stage, *elapsed_ms);
        }
    }
    result
}

/// Open, populate and save on the blocking pool; zip and XML work is
/// synchronous.
async fn populate_and_save(
    populator: Populator,
    template_path: &Path,
    output: &Path,
    content: ExtractedContent,
    figures: &FigureSet,
    config: &PosterConfig,
    stats: &mut GenerationStats,
) -> Result<(PopulateReport, ExtractedContent), PosterError> {
    let template_path = template_path.to_path_buf();
    let figures = figures.clone();
    let (pres, report, content) = timed(config, Stage::Populate, &mut stats.populate_ms, move || async move {
        tokio::task::spawn_blocking(move || {
            let name = template_name(&template_path);
            let mut pres = open_template(&template_path)?;
            let report = populator.populate(&mut pres, &name, &content, &figures);
            Ok::<_, PosterError>((pres, report, content))
        })
        .await
        .map_err(|e| PosterError::Internal(format!("Populate task panicked: {}", e)))?
    })
    .await?;

    let output = output.to_path_buf();
    timed(config, Stage::Save, &mut stats.save_ms, move || async move {
        tokio::task::spawn_blocking(move || save_poster(&pres, &output))
            .await
            .map_err(|e| PosterError::Internal(format!("Save task panicked: {}", e)))?
    })
    .await?;

    Ok((report, content))
}

fn prepend_warnings(report: &mut PopulateReport, mut earlier: Vec<PopulateWarning>) {
    if earlier.is_empty() {
        return;
    }
    earlier.append(&mut report.warnings);
    report.warnings = earlier;
}

fn notify_warnings(config: &PosterConfig, warnings: &[PopulateWarning]) {
    if let Some(ref cb) = config.progress_callback {
        for w in warnings {
            cb.on_warning(&w.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Field;
    use crate::pptx::fixture::{package_with_tree, text_box};
    use crate::pptx::Presentation;
    use crate::progress::PosterProgressCallback;
    use std::sync::{Arc, Mutex};

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
        fn on_warning(&self, message: &str) {
            self.events.lock().unwrap().push(format!("warn {message}"));
        }
    }

    fn write_template(dir: &Path) -> PathBuf {
        let tree = [
            text_box(2, "TitleBox", (0, 0, 9_000_000, 1_000_000)),
            text_box(3, "AuthorBox", (0, 1_000_000, 9_000_000, 500_000)),
        ]
        .concat();
        let path = dir.join("Green.pptx");
        std::fs::write(&path, package_with_tree(&tree)).unwrap();
        path
    }

    #[tokio::test]
    async fn fixture_round_trip_populates_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let template = write_template(dir.path());
        let fixture = dir.path().join("content.json");
        let content = ExtractedContent::new()
            .with(Field::Title, "Short Title")
            .with(Field::Authors, "A. Author, B. Author");
        save_fixture(&fixture, &content).await.unwrap();

        let recorder = Arc::new(Recorder::default());
        let config = PosterConfig::builder()
            .progress_callback(recorder.clone())
            .build()
            .unwrap();
        let out = dir.path().join("poster.pptx");
        let result = populate_from_fixture(
            &fixture,
            template.to_str().unwrap(),
            &out,
            &FigureSet::default(),
            &config,
        )
        .await
        .unwrap();

        assert!(result.stats.from_fixture);
        assert_eq!(result.report.template_name, "Green");
        assert_eq!(result.content.get(Field::Title), "Short Title");
        assert!(result.report.fields_written.contains(&"authors".to_string()));

        let pres = Presentation::open(&out).unwrap();
        let texts: Vec<String> = pres.slide().shapes().shapes().filter_map(|s| s.text()).collect();
        assert!(texts.contains(&"Short Title".to_string()));

        let events = recorder.events.lock().unwrap();
        let starts: Vec<&str> = events
            .iter()
            .filter(|e| e.starts_with("start"))
            .map(|e| e.as_str())
            .collect();
        assert_eq!(starts, ["start ExtractContent", "start Populate", "start Save"]);
        assert!(events.contains(&"done Save".to_string()));
        assert!(events.iter().all(|e| !e.starts_with("warn")));
    }

    #[tokio::test]
    async fn missing_template_fails_before_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let config = PosterConfig::builder()
            .library_root(dir.path())
            .fixture(dir.path().join("never-read.json"))
            .build()
            .unwrap();
        let err = generate_poster("", "Nope", dir.path().join("o.pptx"), &FigureSet::default(), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, PosterError::TemplateNotFound { .. }));
    }

    #[tokio::test]
    async fn missing_fixture_is_fixture_io() {
        let dir = tempfile::tempdir().unwrap();
        let template = write_template(dir.path());
        let err = populate_from_fixture(
            dir.path().join("absent.json"),
            template.to_str().unwrap(),
            dir.path().join("o.pptx"),
            &FigureSet::default(),
            &PosterConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PosterError::FixtureIo { .. }));
        assert!(!dir.path().join("o.pptx").exists());
    }

    #[tokio::test]
    async fn raw_model_answer_works_as_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = dir.path().join("raw.txt");
        std::fs::write(&fixture, "```json\n{\"title\": \"T\", \"authors\": [\"A\", \"B\"],}\n```").unwrap();
        let (content, warnings) = load_fixture(&fixture).await.unwrap();
        assert_eq!(content.get(Field::Authors), "A, B");
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn extraction_warnings_come_first() {
        let mut report = PopulateReport::default();
        report.warn(PopulateWarning::ShapeNotFound {
            field: "title".into(),
            shape: "TitleBox".into(),
        });
        prepend_warnings(
            &mut report,
            vec![PopulateWarning::MalformedValue {
                field: "authors".into(),
                detail: "joined".into(),
            }],
        );
        assert!(matches!(report.warnings[0], PopulateWarning::MalformedValue { .. }));
        assert_eq!(report.warnings.len(), 2);
    }
}
