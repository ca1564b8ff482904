//! Section types and their style records.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pptx::{Alignment, RgbColor};

/// The style-lookup category a content field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SectionType {
    #[serde(rename = "headline")]
    Headline,
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "subtitle")]
    Subtitle,
    #[serde(rename = "authors")]
    Authors,
    #[serde(rename = "affiliations")]
    Affiliations,
    #[serde(rename = "main_body_text")]
    MainBody,
    #[serde(rename = "references")]
    References,
    #[serde(rename = "FigureDesc")]
    FigureDesc,
}

/// How a section's point size is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeLaw {
    /// Three title tiers: >120 chars long, >80 medium, else short.
    TitleTiers,
    /// `max(round(title × ratio), min_size)`.
    DerivedFromTitle,
    /// Four length tiers: ≤80 short, ≤160 medium, ≤250 long, else extra_long.
    LengthTiers,
    /// Always the `short` tier.
    FixedShort,
    /// The style's `font_size`, else the given default.
    StyleOr(u32),
}

impl SectionType {
    pub const ALL: [SectionType; 8] = [
        SectionType::Headline,
        SectionType::Title,
        SectionType::Subtitle,
        SectionType::Authors,
        SectionType::Affiliations,
        SectionType::MainBody,
        SectionType::References,
        SectionType::FigureDesc,
    ];

    /// Key used in style configuration files.
    pub fn key(self) -> &'static str {
        match self {
            SectionType::Headline => "headline",
            SectionType::Title => "title",
            SectionType::Subtitle => "subtitle",
            SectionType::Authors => "authors",
            SectionType::Affiliations => "affiliations",
            SectionType::MainBody => "main_body_text",
            SectionType::References => "references",
            SectionType::FigureDesc => "FigureDesc",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }

    pub fn size_law(self) -> SizeLaw {
        match self {
            SectionType::Headline => SizeLaw::StyleOr(100),
            SectionType::Title => SizeLaw::TitleTiers,
            SectionType::Subtitle => SizeLaw::DerivedFromTitle,
            SectionType::Authors | SectionType::Affiliations | SectionType::References => {
                SizeLaw::LengthTiers
            }
            SectionType::MainBody => SizeLaw::FixedShort,
            SectionType::FigureDesc => SizeLaw::StyleOr(18),
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Font and paragraph style for one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleRecord {
    pub font_color: RgbColor,
    pub font_family: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, deserialize_with = "alignment_lenient")]
    pub alignment: Alignment,
    /// Fixed point size, overriding length tiers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
}

/// Unknown alignment names fall back to left instead of failing the file.
fn alignment_lenient<'de, D>(deserializer: D) -> Result<Alignment, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(Alignment::from_name(&raw))
}

impl StyleRecord {
    pub fn new(font_color: RgbColor, font_family: &str, bold: bool, alignment: Alignment) -> Self {
        Self {
            font_color,
            font_family: font_family.to_string(),
            bold,
            italic: None,
            alignment,
            font_size: None,
        }
    }

    pub fn italic(mut self) -> Self {
        self.italic = Some(true);
        self
    }

    pub fn sized(mut self, points: u32) -> Self {
        self.font_size = Some(points);
        self
    }

    /// The global default for a section, used whenever a template does not
    /// define that section. Title and subtitle default to white text for dark
    /// banners; everything else to black.
    pub fn default_for(section: SectionType) -> Self {
        use Alignment::{Center, Left};
        let black = RgbColor::BLACK;
        let white = RgbColor::WHITE;
        match section {
            SectionType::Headline => StyleRecord::new(white, "Intro Rust", true, Center).sized(125),
            SectionType::Title => StyleRecord::new(white, "Futura", true, Center),
            SectionType::Subtitle => StyleRecord::new(white, "Futura", false, Center),
            SectionType::Authors
            | SectionType::Affiliations
            | SectionType::MainBody
            | SectionType::References
            | SectionType::FigureDesc => StyleRecord::new(black, "Futura", false, Left),
        }
    }
}
