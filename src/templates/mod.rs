//! Template Configuration Store.
//!
//! ```text
//! TemplateRegistry ── name ──▶ TemplateStyleConfig
//!                                ├─ SectionStyles   style_for(section) → StyleRecord
//!                                └─ DynamicSizes    title / subtitle / length tiers
//! TemplateLibrary  ── name ──▶ <root>/{available,premium,coming_soon}/<name>.pptx
//! ```
//!
//! Unregistered template names fall through entirely to the global defaults.

pub mod catalog;
pub mod descriptions;
pub mod library;
pub mod sizing;
pub mod style;

pub use catalog::{SectionStyles, TemplateRegistry, TemplateStyleConfig, HEADLINE_IMPACT};
pub use descriptions::TemplateDescription;
pub use library::{template_name, LibraryEntry, TemplateCategory, TemplateLibrary};
pub use sizing::{DynamicSizes, SizeTiers, SubtitleRule, Tier};
pub use style::{SectionType, SizeLaw, StyleRecord};
