//! Figure images and their description boxes.

use std::path::Path;
use tracing::{debug, info, warn};

use super::locate::{find_shape, find_shape_mut};
use super::{style_run, PopulateReport};
use crate::content::{description_box_name, placeholder_name, FigureSet, MAX_FIGURES};
use crate::error::PopulateWarning;
use crate::pptx::{PictureFormat, Presentation, Slide};
use crate::templates::{SectionType, TemplateStyleConfig};

/// Accepted figure file sizes, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageLimits {
    pub min_bytes: u64,
    pub max_bytes: u64,
}

impl Default for ImageLimits {
    fn default() -> Self {
        Self {
            min_bytes: 1024,
            max_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Read an image and check its size and format. The error is a
/// human-readable reason.
pub fn validate_image(path: &Path, limits: ImageLimits) -> Result<(Vec<u8>, PictureFormat), String> {
    let len = std::fs::metadata(path)
        .map_err(|e| format!("cannot read file: {e}"))?
        .len();
    if len < limits.min_bytes {
        return Err(format!(
            "file is too small ({len} bytes, minimum {} bytes)",
            limits.min_bytes
        ));
    }
    if len > limits.max_bytes {
        return Err(format!(
            "file is too large ({} MB, maximum {} MB)",
            len / (1024 * 1024),
            limits.max_bytes / (1024 * 1024)
        ));
    }
    let bytes = std::fs::read(path).map_err(|e| format!("cannot read file: {e}"))?;
    let format = PictureFormat::sniff(&bytes)
        .ok_or_else(|| "not a PNG, JPEG, GIF, BMP or TIFF image".to_string())?;
    Ok((bytes, format))
}

/// Replace each supplied figure's placeholder with a picture stretched to
/// the placeholder's box, in the placeholder's position in the shape tree.
pub(crate) fn insert_figures(
    pres: &mut Presentation,
    figures: &FigureSet,
    limits: ImageLimits,
    report: &mut PopulateReport,
) {
    for (index, path) in figures.images() {
        let figure = index + 1;
        let name = placeholder_name(index);

        let Some(at) = find_shape(pres.slide().shapes(), &name) else {
            debug!("Placeholder {} not found, dropping figure {}", name, figure);
            report.warn(PopulateWarning::PlaceholderMissing { figure, shape: name });
            continue;
        };

        let (bytes, format) = match validate_image(path, limits) {
            Ok(ok) => ok,
            Err(reason) => {
                warn!("Figure {} ({}): {}", figure, path.display(), reason);
                report.warn(PopulateWarning::ImageRejected {
                    figure,
                    path: path.to_path_buf(),
                    reason,
                });
                continue;
            }
        };

        let Some(placeholder) = pres.slide_mut().shapes_mut().remove(at) else {
            continue;
        };
        let geometry = placeholder.geometry();
        match pres.add_picture(&bytes, format, geometry, at) {
            Ok(id) => {
                info!(
                    "Figure {} → {} (shape {}, {}x{} EMU)",
                    figure, name, id, geometry.width, geometry.height
                );
                report.figures_inserted.push(figure);
            }
            Err(e) => {
                warn!("Figure {}: {}", figure, e);
                pres.slide_mut().shapes_mut().insert(at, placeholder);
                report.warn(PopulateWarning::ImageInsertFailed {
                    figure,
                    detail: e.to_string(),
                });
            }
        }
    }
}

/// Write `Figure N: ` (bold) plus the description into each `FigureDescN`
/// box. Without a template FigureDesc style the text is written plain.
pub(crate) fn write_descriptions(
    slide: &mut Slide,
    figures: &FigureSet,
    config: &TemplateStyleConfig,
    report: &mut PopulateReport,
) {
    let styled = config.defines(SectionType::FigureDesc);
    let style = config.style_for(SectionType::FigureDesc);

    for figure in 1..=MAX_FIGURES {
        let Some(description) = figures.description(figure) else {
            continue;
        };
        let name = description_box_name(figure);
        let Some(shape) = find_shape_mut(slide.shapes_mut(), &name) else {
            debug!("Description box {} not found", name);
            report.warn(PopulateWarning::DescriptionBoxMissing { figure, shape: name });
            continue;
        };
        let Some(mut frame) = shape.text_frame_mut() else {
            report.warn(PopulateWarning::NoTextFrame {
                field: format!("figure {figure} description"),
                shape: name,
            });
            continue;
        };

        let label = format!("Figure {figure}: ");
        if styled {
            let size = config.font_size_for(description, SectionType::FigureDesc);
            frame.clear();
            let mut paragraph = frame.first_paragraph();
            paragraph.set_alignment(style.alignment);
            style_run(&mut paragraph.add_run(&label), &style, size).set_bold(true);
            style_run(&mut paragraph.add_run(description), &style, size).set_bold(false);
        } else {
            frame.set_text(&format!("{label}{description}"));
        }
        report.descriptions_written.push(figure);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ExtractedContent;
    use crate::populate::Populator;
    use crate::pptx::fixture::{group, package_with_tree, png_bytes, text_box};
    use crate::pptx::{Geometry, ShapeKind, ShapePath};

    #[test]
    fn validation_checks_size_then_format() {
        let dir = tempfile::tempdir().unwrap();
        let limits = ImageLimits::default();

        let tiny = dir.path().join("tiny.png");
        std::fs::write(&tiny, png_bytes(0)).unwrap();
        let err = validate_image(&tiny, limits).unwrap_err();
        assert!(err.contains("too small"), "{err}");

        let text = dir.path().join("notes.png");
        std::fs::write(&text, vec![b'x'; 2048]).unwrap();
        assert!(validate_image(&text, limits).unwrap_err().contains("not a PNG"));

        let good = dir.path().join("fig.png");
        std::fs::write(&good, png_bytes(2048)).unwrap();
        let (bytes, format) = validate_image(&good, limits).unwrap();
        assert_eq!(format, PictureFormat::Png);
        assert_eq!(bytes.len(), png_bytes(2048).len());

        let strict = ImageLimits {
            min_bytes: 1,
            max_bytes: 100,
        };
        assert!(validate_image(&good, strict).unwrap_err().contains("too large"));
        assert!(validate_image(&dir.path().join("missing.png"), limits).is_err());
    }

    #[test]
    fn grouped_placeholder_is_swapped_at_group_geometry() {
        let dir = tempfile::tempdir().unwrap();
        let tree = group(
            5,
            "Fig1PlaceholderLarge",
            (5000, 6000, 7000, 8000),
            &[text_box(6, "Inner", (0, 0, 7000, 8000))],
        );
        let mut pres = Presentation::from_bytes(&package_with_tree(&tree)).unwrap();
        assert_eq!(
            find_shape(pres.slide().shapes(), "fig1placeholderlarge"),
            Some(ShapePath::top(0))
        );

        let image = dir.path().join("fig1.png");
        std::fs::write(&image, png_bytes(2048)).unwrap();
        let figures = FigureSet::from_paths([&image]);
        let report =
            Populator::default().populate(&mut pres, "Blue Template", &ExtractedContent::new(), &figures);

        assert_eq!(report.figures_inserted, [1]);
        assert!(!report
            .warnings
            .iter()
            .any(|w| matches!(w, PopulateWarning::PlaceholderMissing { .. })));
        let pic = pres.slide().shapes().get(ShapePath::top(0)).unwrap();
        assert!(matches!(pic.kind(), ShapeKind::Picture));
        assert_eq!(pic.geometry(), Geometry::new(5000, 6000, 7000, 8000));
        assert!(find_shape(pres.slide().shapes(), "Inner").is_none());
    }
}
