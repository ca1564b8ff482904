//! Minimal PresentationML model: just enough OOXML to open a template,
//! find named shapes on its first slide, rewrite their text, swap
//! placeholders for pictures and save the result.
//!
//! ```text
//! Presentation
//!  ├─ Package        zip parts, content types, relationships
//!  └─ Slide
//!      └─ ShapeTree  Shape { Text | Picture | Group | Other }
//!                     └─ TextFrame → Paragraph → Run → Font
//! ```
//!
//! Everything the model does not understand is kept as XML and written back
//! untouched.

pub mod package;
pub mod picture;
pub mod shape;
pub mod text;
pub mod units;
pub mod xml;

#[cfg(test)]
pub(crate) mod fixture;

pub use package::{Presentation, Slide};
pub use picture::PictureFormat;
pub use shape::{GroupShape, Shape, ShapeKind, ShapePath};
pub use text::{Alignment, Font, Paragraph, RgbColor, Run, TextFrame};
pub use units::{Emu, Geometry};

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or writing a presentation package.
#[derive(Debug, Error)]
pub enum PptxError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid zip package: {0}")]
    Zip(String),

    #[error("Malformed XML: {0}")]
    Xml(String),

    #[error("Package part '{0}' is missing")]
    MissingPart(String),

    #[error("Presentation contains no slides")]
    NoSlides,

    #[error("No shape position {0} on the slide")]
    InvalidPosition(String),

    #[error("Invalid colour '{0}': expected #RRGGBB")]
    InvalidColor(String),
}

impl From<zip::result::ZipError> for PptxError {
    fn from(e: zip::result::ZipError) -> Self {
        PptxError::Zip(e.to_string())
    }
}
