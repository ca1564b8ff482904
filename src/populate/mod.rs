//! Template Populator.
//!
//! One pass over a template's first slide:
//!
//! ```text
//! for field in Field::ALL            (title before subtitle)
//!   value empty?            → skip   (title → "(No Title Extracted)")
//!   find_shape(field.shape) → ShapeNotFound / NoTextFrame warning
//!   headline + highlight    → one run per *segment*
//!   otherwise               → set_text, then style every paragraph and run
//! for figure in 1..=4        placeholder → stretched picture
//! for description in 1..=4   "Figure N: " (bold) + description
//! ```
//!
//! Field and figure problems never abort the pass; they are collected in the
//! [`PopulateReport`]. Only opening the template and saving the result can
//! fail.

pub mod figures;
pub mod headline;
pub mod locate;

pub use figures::{validate_image, ImageLimits};
pub use headline::{split_headline, strip_markup, Segment};
pub use locate::{find_shape, find_shape_mut};

use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::PosterConfig;
use crate::content::{ExtractedContent, Field, FigureSet};
use crate::error::{PopulateWarning, PosterError};
use crate::pptx::{Font, PptxError, Presentation, RgbColor, Run, Slide, TextFrame};
use crate::templates::{template_name, SectionType, StyleRecord, TemplateRegistry, TemplateStyleConfig};

/// Default colour of highlighted headline words (dark orange).
pub const DEFAULT_HIGHLIGHT: RgbColor = RgbColor(255, 140, 0);

/// What a populate pass did. Present even when some fields failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PopulateReport {
    /// Style lookup key derived from the template file name.
    pub template_name: String,
    /// Whether the template has its own style configuration.
    pub registered: bool,
    /// Content keys written, in population order.
    pub fields_written: Vec<String>,
    /// Title point size; subtitles are sized from it.
    pub title_size: u32,
    /// 1-based figure numbers inserted.
    pub figures_inserted: Vec<usize>,
    /// 1-based figure numbers whose description was written.
    pub descriptions_written: Vec<usize>,
    pub warnings: Vec<PopulateWarning>,
}

impl PopulateReport {
    /// True when nothing was skipped.
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }

    pub(crate) fn warn(&mut self, warning: PopulateWarning) {
        self.warnings.push(warning);
    }
}

/// Applies extracted content to templates using a style registry.
#[derive(Debug, Clone)]
pub struct Populator {
    registry: TemplateRegistry,
    highlight_color: RgbColor,
    limits: ImageLimits,
}

impl Default for Populator {
    fn default() -> Self {
        Self::new(TemplateRegistry::builtin())
    }
}

impl Populator {
    pub fn new(registry: TemplateRegistry) -> Self {
        Self {
            registry,
            highlight_color: DEFAULT_HIGHLIGHT,
            limits: ImageLimits::default(),
        }
    }

    /// Built-in registry plus any style overrides, highlight colour and
    /// image limits from `config`.
    pub fn from_config(config: &PosterConfig) -> Result<Self, PosterError> {
        let mut registry = TemplateRegistry::builtin();
        if let Some(path) = &config.style_config {
            let n = registry.load_overrides(path)?;
            info!("Loaded {} template style override(s) from {}", n, path.display());
        }
        Ok(Self::new(registry)
            .with_highlight_color(config.highlight_color)
            .with_image_limits(ImageLimits {
                min_bytes: config.min_image_bytes,
                max_bytes: config.max_image_bytes,
            }))
    }

    pub fn with_highlight_color(mut self, color: RgbColor) -> Self {
        self.highlight_color = color;
        self
    }

    pub fn with_image_limits(mut self, limits: ImageLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Populate an opened presentation in memory, styling it as
    /// `template_name`.
    pub fn populate(
        &self,
        pres: &mut Presentation,
        template_name: &str,
        content: &ExtractedContent,
        figures: &FigureSet,
    ) -> PopulateReport {
        let config = self.registry.config_for(template_name);
        let title_size = config.font_size_for(content.title_or_fallback(), SectionType::Title);
        let mut report = PopulateReport {
            template_name: template_name.to_string(),
            registered: self.registry.is_registered(template_name),
            title_size,
            ..Default::default()
        };
        debug!(
            "Populating '{}' (registered: {}, title {} pt)",
            template_name, report.registered, title_size
        );

        for field in Field::ALL {
            let value = match field {
                Field::Title => content.title_or_fallback(),
                _ => content.get(field),
            };
            if value.trim().is_empty() {
                continue;
            }
            self.write_field(pres.slide_mut(), config, field, value, title_size, &mut report);
        }

        figures::insert_figures(pres, figures, self.limits, &mut report);
        figures::write_descriptions(pres.slide_mut(), figures, config, &mut report);

        for w in &report.warnings {
            warn!("{}", w);
        }
        report
    }

    /// Open `template`, populate it and save the result to `output`.
    ///
    /// The style key is the template's file stem with underscores read as
    /// spaces. Nothing is written when the template cannot be opened.
    pub fn populate_file(
        &self,
        template: &Path,
        content: &ExtractedContent,
        figures: &FigureSet,
        output: &Path,
    ) -> Result<PopulateReport, PosterError> {
        let name = template_name(template);
        let mut pres = open_template(template)?;
        let report = self.populate(&mut pres, &name, content, figures);
        save_poster(&pres, output)?;
        info!(
            "Saved {} ({} fields, {} figures, {} warnings)",
            output.display(),
            report.fields_written.len(),
            report.figures_inserted.len(),
            report.warnings.len()
        );
        Ok(report)
    }

    fn write_field(
        &self,
        slide: &mut Slide,
        config: &TemplateStyleConfig,
        field: Field,
        value: &str,
        title_size: u32,
        report: &mut PopulateReport,
    ) {
        let shape_name = field.shape_name();
        let Some(shape) = find_shape_mut(slide.shapes_mut(), shape_name) else {
            debug!("No shape '{}' for field '{}'", shape_name, field.key());
            report.warn(PopulateWarning::ShapeNotFound {
                field: field.key().into(),
                shape: shape_name.into(),
            });
            return;
        };
        let Some(mut frame) = shape.text_frame_mut() else {
            report.warn(PopulateWarning::NoTextFrame {
                field: field.key().into(),
                shape: shape_name.into(),
            });
            return;
        };

        match field {
            Field::Headline if config.highlight_headline => {
                self.write_highlighted_headline(&mut frame, config, value);
            }
            Field::Headline => {
                // Without highlighting, a headline is set like a title.
                let text = strip_markup(value);
                let size = config.font_size_for(&text, SectionType::Title);
                let mut style = config.style_for(SectionType::Title);
                style.bold = true;
                write_uniform(&mut frame, &text, &style, size);
            }
            _ => {
                let section = field.section_type();
                let mut style = config.style_for(section);
                // Titles are always bold; subtitles and author lists never are.
                match field {
                    Field::Title => style.bold = true,
                    Field::Subtitle | Field::Authors => style.bold = false,
                    _ => {}
                }
                let size = match field {
                    Field::Title => title_size,
                    Field::Subtitle => style
                        .font_size
                        .unwrap_or_else(|| config.subtitle_size(title_size)),
                    _ => config.font_size_for(value, section),
                };
                write_uniform(&mut frame, value, &style, size);
            }
        }
        debug!("Wrote '{}' into {}", field.key(), shape_name);
        report.fields_written.push(field.key().to_string());
    }

    fn write_highlighted_headline(
        &self,
        frame: &mut TextFrame<'_>,
        config: &TemplateStyleConfig,
        headline: &str,
    ) {
        let style = config.style_for(SectionType::Headline);
        let size = config.font_size_for(headline, SectionType::Headline);
        frame.clear();
        let mut paragraph = frame.first_paragraph();
        paragraph.set_alignment(style.alignment);
        for segment in split_headline(headline) {
            let mut run = paragraph.add_run(segment.text);
            let mut font = style_run(&mut run, &style, size);
            if segment.highlighted {
                font.set_color(self.highlight_color);
            }
        }
    }
}

/// Open a template file, distinguishing a missing file from an unusable one.
pub fn open_template(template: &Path) -> Result<Presentation, PosterError> {
    Presentation::open(template).map_err(|e| match e {
        PptxError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
            PosterError::TemplateNotFound {
                name: template_name(template),
                path: template.to_path_buf(),
            }
        }
        other => PosterError::TemplateUnreadable {
            path: template.to_path_buf(),
            detail: other.to_string(),
        },
    })
}

/// Write a populated presentation to `output` atomically.
pub fn save_poster(pres: &Presentation, output: &Path) -> Result<(), PosterError> {
    pres.save(output).map_err(|e| PosterError::SaveFailed {
        path: output.to_path_buf(),
        detail: e.to_string(),
    })
}

/// Populate `template` with the built-in styles and save to `output`.
pub fn populate_template(
    template: &Path,
    content: &ExtractedContent,
    figures: &FigureSet,
    output: &Path,
) -> Result<PopulateReport, PosterError> {
    Populator::default().populate_file(template, content, figures, output)
}

/// Replace the frame's text and give every paragraph and run one style.
fn write_uniform(frame: &mut TextFrame<'_>, text: &str, style: &StyleRecord, size: u32) {
    frame.set_text(text);
    for mut paragraph in frame.paragraphs() {
        paragraph.set_alignment(style.alignment);
        for mut run in paragraph.runs() {
            style_run(&mut run, style, size);
        }
    }
}

/// Set family, size, weight, slant and colour of `run` from `style`.
pub(crate) fn style_run<'r>(run: &'r mut Run<'_>, style: &StyleRecord, size: u32) -> Font<'r> {
    let mut font = run.font();
    font.set_name(&style.font_family)
        .set_size(size)
        .set_bold(style.bold)
        .set_italic(style.italic.unwrap_or(false))
        .set_color(style.font_color);
    font
}
