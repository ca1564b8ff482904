//! CLI binary for edgequake-poster.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `PosterConfig` and prints the populate report.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_poster::pptx::RgbColor;
use edgequake_poster::templates::descriptions;
use edgequake_poster::{
    generate_poster, FigureSet, PosterConfig, PosterOutput, PosterProgressCallback,
    ProgressCallback, Stage, TemplateLibrary,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one spinner whose message follows the current
/// stage, plus a log line per finished stage and per warning.
struct CliProgressCallback {
    bar: ProgressBar,
    warnings: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            warnings: AtomicUsize::new(0),
        })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl PosterProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_prefix("Working");
        self.bar.set_message(format!("{stage}…"));
    }

    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        self.bar.println(format!(
            "  {} {:<22} {}",
            green("✓"),
            stage.to_string(),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
    }

    fn on_warning(&self, message: &str) {
        self.warnings.fetch_add(1, Ordering::SeqCst);
        // Keep one line per warning.
        let msg = if message.chars().count() > 100 {
            format!("{}\u{2026}", message.chars().take(99).collect::<String>())
        } else {
            message.to_string()
        };
        self.bar.println(format!("  {} {}", yellow("⚠"), msg));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Generate a poster from a PDF
  pdf2poster paper.pdf -t Green -o poster.pptx

  # With figures and their captions
  pdf2poster paper.pdf -t "Modular Impact" -o poster.pptx \
      --figure fig1.png --figure fig2.jpg \
      --figure-desc 1="Enrolment flow" --figure-desc 2="Primary outcome"

  # From a URL, with a specific model
  pdf2poster https://example.org/paper.pdf -t Blue -o poster.pptx \
      --provider openai --model gpt-4.1

  # Record the extraction once, then iterate on templates offline
  pdf2poster paper.pdf -t Green -o a.pptx --record-fixture content.json
  pdf2poster --fixture content.json -t "Headline Impact" -o b.pptx

  # Template library
  pdf2poster --list-templates --library ./templates
  pdf2poster --describe "Headline Impact"

  # Machine-readable report
  pdf2poster paper.pdf -t Green -o poster.pptx --json > report.json

TEMPLATE LIBRARY:
  <library>/available/<name>.pptx
  <library>/premium/<name>.pptx
  <library>/coming_soon/<name>.pptx
  Names match with spaces or underscores. A path to an existing .pptx is
  used as-is. "default" selects available/default_template.pptx.

FIGURES:
  Up to 4 PNG/JPEG files, 1 KiB to 50 MiB each. Figures 1-2 go into
  Fig1PlaceholderLarge / Fig2PlaceholderLarge, figures 3-4 into the
  Small placeholders. Descriptions go into FigureDesc<N>.

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
"#;

/// Generate academic posters from manuscripts and PowerPoint templates.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2poster",
    version,
    about = "Generate academic posters from manuscripts using LLMs and PowerPoint templates",
    long_about = "Extract poster content (headline, title, authors, sections, references) from a \
research manuscript with an LLM and write it into a PowerPoint poster template, applying the \
template's fonts, colours and length-dependent sizes. Supports OpenAI, Anthropic, Google Gemini, \
Azure OpenAI and any OpenAI-compatible endpoint (Ollama, vLLM, LiteLLM, etc.).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Manuscript: local PDF, .txt/.md file, or HTTP/HTTPS URL.
    manuscript: Option<String>,

    /// Template name in the library, or a path to a .pptx file.
    #[arg(short, long, env = "PDF2POSTER_TEMPLATE")]
    template: Option<String>,

    /// Where to write the populated poster.
    #[arg(short, long, env = "PDF2POSTER_OUTPUT")]
    output: Option<PathBuf>,

    /// Figure image (PNG or JPEG); repeat up to 4 times, in order.
    #[arg(long = "figure", value_name = "PATH")]
    figures: Vec<PathBuf>,

    /// Figure description as N=TEXT (N is 1-4); repeatable.
    #[arg(long = "figure-desc", value_name = "N=TEXT")]
    figure_descs: Vec<String>,

    /// JSON file of figure descriptions: {"1": {"description": "…"}, …}.
    #[arg(long, value_name = "FILE")]
    figure_descriptions: Option<PathBuf>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(
        long,
        env = "EDGEQUAKE_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set.\n\
          Supported: openai, anthropic, gemini, azure, ollama, or any OpenAI-compatible URL."
    )]
    provider: Option<String>,

    /// LLM model ID (default: gpt-4.1-mini).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "PDF2POSTER_TEMPERATURE", default_value_t = 0.4)]
    temperature: f32,

    /// Max LLM output tokens.
    #[arg(long, env = "PDF2POSTER_MAX_TOKENS", default_value_t = 4000)]
    max_tokens: usize,

    /// Retries on LLM failure or unparseable output.
    #[arg(long, env = "PDF2POSTER_MAX_RETRIES", default_value_t = 2)]
    max_retries: u32,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "PDF2POSTER_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Populate from a recorded extraction instead of calling a model.
    #[arg(long, value_name = "FILE", conflicts_with = "record_fixture")]
    fixture: Option<PathBuf>,

    /// Save the model's extraction to FILE for later --fixture runs.
    #[arg(long, value_name = "FILE")]
    record_fixture: Option<PathBuf>,

    /// Template library root.
    #[arg(long, env = "PDF2POSTER_LIBRARY", default_value = "templates")]
    library: PathBuf,

    /// JSON file with per-template style overrides.
    #[arg(long, env = "PDF2POSTER_STYLE_CONFIG")]
    style_config: Option<PathBuf>,

    /// Colour of highlighted headline words (#RRGGBB).
    #[arg(long, default_value = "#FF8C00")]
    highlight_color: String,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PDF2POSTER_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// List the templates found in the library and exit.
    #[arg(long)]
    list_templates: bool,

    /// Print guidance for a template and exit.
    #[arg(long, value_name = "NAME")]
    describe: Option<String>,

    /// Print the full result (content, report, stats) as JSON.
    #[arg(long, env = "PDF2POSTER_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "PDF2POSTER_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2POSTER_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2POSTER_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner replaces INFO logs unless --verbose asks for them.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Informational modes ──────────────────────────────────────────────
    if cli.list_templates {
        return list_templates(&cli);
    }
    if let Some(ref name) = cli.describe {
        return describe_template(name, cli.json);
    }

    // ── Validate arguments ───────────────────────────────────────────────
    let template = cli
        .template
        .clone()
        .context("--template is required (see --list-templates)")?;
    let output_path = cli.output.clone().context("--output is required")?;
    let manuscript = match (&cli.manuscript, &cli.fixture) {
        (Some(m), _) => m.clone(),
        (None, Some(_)) => String::new(),
        (None, None) => anyhow::bail!("A manuscript is required unless --fixture is given"),
    };

    let figures = build_figures(&cli).await?;

    // ── Build config ─────────────────────────────────────────────────────
    let progress = if show_progress {
        Some(CliProgressCallback::new())
    } else {
        None
    };
    let config = build_config(
        &cli,
        progress.clone().map(|cb| cb as Arc<dyn PosterProgressCallback>),
    )
    .await?;

    // ── Run generation ───────────────────────────────────────────────────
    let result = generate_poster(&manuscript, &template, &output_path, &figures, &config).await;
    if let Some(ref cb) = progress {
        cb.finish();
    }
    let output = result.context("Poster generation failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        print_summary(&output, progress.is_none());
    }

    Ok(())
}

/// Map CLI args to `PosterConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<PosterConfig> {
    let system_prompt = if let Some(ref path) = cli.system_prompt {
        Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read system prompt from {:?}", path))?,
        )
    } else {
        None
    };
    let highlight = RgbColor::from_hex(&cli.highlight_color)
        .with_context(|| format!("Invalid --highlight-color '{}'", cli.highlight_color))?;

    let mut builder = PosterConfig::builder()
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .max_retries(cli.max_retries)
        .download_timeout_secs(cli.download_timeout)
        .library_root(&cli.library)
        .highlight_color(highlight);

    if let Some(ref p) = cli.provider {
        builder = builder.provider_name(p);
    }
    if let Some(ref m) = cli.model {
        builder = builder.model(m);
    }
    if let Some(prompt) = system_prompt {
        builder = builder.system_prompt(prompt);
    }
    if let Some(ref f) = cli.fixture {
        builder = builder.fixture(f);
    }
    if let Some(ref f) = cli.record_fixture {
        builder = builder.record_fixture(f);
    }
    if let Some(ref s) = cli.style_config {
        builder = builder.style_config(s);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Collect `--figure`, `--figure-descriptions` and `--figure-desc` into a
/// `FigureSet`. Inline descriptions override the JSON file.
async fn build_figures(cli: &Cli) -> Result<FigureSet> {
    if cli.figures.len() > edgequake_poster::content::MAX_FIGURES {
        anyhow::bail!(
            "At most {} figures are supported (got {})",
            edgequake_poster::content::MAX_FIGURES,
            cli.figures.len()
        );
    }
    let mut figures = FigureSet::from_paths(&cli.figures);

    if let Some(ref path) = cli.figure_descriptions {
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read figure descriptions from {:?}", path))?;
        figures
            .merge_descriptions_json(&json)
            .with_context(|| format!("Invalid figure descriptions in {:?}", path))?;
    }

    for raw in &cli.figure_descs {
        let (n, text) = parse_figure_desc(raw)?;
        figures.set_description(n, text);
    }
    Ok(figures)
}

/// Parse `N=TEXT` with N in 1..=4.
fn parse_figure_desc(raw: &str) -> Result<(usize, String)> {
    let (n, text) = raw
        .split_once('=')
        .with_context(|| format!("Expected N=TEXT, got '{}'", raw))?;
    let n: usize = n
        .trim()
        .parse()
        .with_context(|| format!("Invalid figure number in '{}'", raw))?;
    if !(1..=edgequake_poster::content::MAX_FIGURES).contains(&n) {
        anyhow::bail!("Figure number must be 1-4 (got {})", n);
    }
    Ok((n, text.trim().to_string()))
}

fn list_templates(cli: &Cli) -> Result<()> {
    let library = TemplateLibrary::new(&cli.library);
    let entries = library.list();

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&entries).context("Failed to serialise templates")?
        );
        return Ok(());
    }
    if entries.is_empty() {
        eprintln!("No templates found under {}", cli.library.display());
        return Ok(());
    }
    for e in &entries {
        let mut tags = Vec::new();
        if e.is_premium {
            tags.push(cyan("premium"));
        }
        if e.is_coming_soon {
            tags.push(dim("coming soon"));
        }
        if e.is_new {
            tags.push(green("new"));
        }
        println!(
            "{:<28} {:>8}  {}",
            bold(&e.name),
            dim(&format!("{} KB", e.size_bytes / 1024)),
            tags.join(" ")
        );
    }
    Ok(())
}

fn describe_template(name: &str, json: bool) -> Result<()> {
    let Some(d) = descriptions::describe(name) else {
        let known: Vec<&str> = descriptions::all().map(|(n, _)| n).collect();
        anyhow::bail!("No description for '{}'. Known: {}", name, known.join(", "));
    };
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(d).context("Failed to serialise description")?
        );
        return Ok(());
    }
    println!("{}", bold(d.title));
    println!("{}", d.description);
    println!();
    println!("{}", cyan("Choose it if:"));
    for reason in d.choose_if {
        println!("  • {reason}");
    }
    println!();
    println!("{} {}", cyan("Ideal for:"), d.ideal_for);
    Ok(())
}

fn print_summary(output: &PosterOutput, print_warnings: bool) {
    let report = &output.report;
    if print_warnings {
        for w in &report.warnings {
            eprintln!("  {} {}", yellow("⚠"), w);
        }
    }
    eprintln!(
        "{}  {} fields  {} figures  {} descriptions  →  {}",
        if report.is_complete() {
            green("✔")
        } else {
            cyan("⚠")
        },
        report.fields_written.len(),
        report.figures_inserted.len(),
        report.descriptions_written.len(),
        bold(&output.output_path.display().to_string()),
    );
    let styling = if report.registered {
        format!("template '{}'", report.template_name)
    } else {
        format!("template '{}' (default styles)", report.template_name)
    };
    eprintln!(
        "   {}  title {} pt  {}ms total",
        dim(&styling),
        report.title_size,
        output.stats.total_ms,
    );
    if !output.stats.from_fixture {
        eprintln!(
            "   {} tokens in  /  {} tokens out{}",
            dim(&output.stats.input_tokens.to_string()),
            dim(&output.stats.output_tokens.to_string()),
            if output.stats.retries > 0 {
                format!("  ({} retries)", output.stats.retries)
            } else {
                String::new()
            }
        );
    }
    if !report.warnings.is_empty() {
        eprintln!("   {}", red(&format!("{} warning(s)", report.warnings.len())));
    }
}
