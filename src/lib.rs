//! # edgequake-poster
//!
//! Turn a research manuscript into a populated A0 academic poster.
//!
//! ## Why this crate?
//!
//! Poster templates are ordinary PowerPoint files whose text boxes carry
//! well-known names (`TitleBox`, `MethodsBox`, `Fig1PlaceholderLarge`, …).
//! An LLM condenses the manuscript into one short text per section; the
//! populator then writes each text into its box with the template's fonts,
//! colours and length-dependent point sizes, and drops figures into the
//! picture placeholders. The result opens in PowerPoint for final edits.
//!
//! ## Pipeline Overview
//!
//! ```text
//! manuscript (PDF / .txt / URL)
//!  │
//!  ├─ 1. Input     resolve local file or download from URL
//!  ├─ 2. Text      pdfium text extraction (spawn_blocking)
//!  ├─ 3. Extract   one chat call with retry → repaired JSON → ExtractedContent
//!  ├─ 4. Populate  style lookup, size tiers, headline highlight, figures
//!  └─ 5. Save      atomic .pptx write + PopulateReport
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_poster::{generate_poster, FigureSet, PosterConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / …
//!     let config = PosterConfig::default();
//!     let figures = FigureSet::from_paths(["fig1.png", "fig2.png"]);
//!     let output = generate_poster("paper.pdf", "Green", "poster.pptx", &figures, &config).await?;
//!     for w in &output.report.warnings {
//!         eprintln!("warning: {w}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Without a model, populate from a recorded extraction:
//!
//! ```rust,no_run
//! use edgequake_poster::{populate_from_fixture, FigureSet, PosterConfig};
//!
//! # async fn run() -> Result<(), edgequake_poster::PosterError> {
//! let out = populate_from_fixture(
//!     "content.json",
//!     "Modular Impact",
//!     "poster.pptx",
//!     &FigureSet::default(),
//!     &PosterConfig::default(),
//! )
//! .await?;
//! println!("title set at {} pt", out.report.title_size);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2poster` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-poster = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod content;
pub mod error;
pub mod generate;
pub mod pipeline;
pub mod populate;
pub mod pptx;
pub mod progress;
pub mod prompts;
pub mod templates;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionMode, PosterConfig, PosterConfigBuilder};
pub use content::{ExtractedContent, Field, FigureDescriptor, FigureSet};
pub use error::{PopulateWarning, PosterError};
pub use generate::{
    generate_poster, generate_poster_sync, load_fixture, populate_from_fixture, save_fixture,
    GenerationStats, PosterOutput,
};
pub use populate::{populate_template, PopulateReport, Populator};
pub use progress::{NoopProgressCallback, PosterProgressCallback, ProgressCallback, Stage};
pub use templates::{TemplateLibrary, TemplateRegistry};
