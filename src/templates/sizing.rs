//! Length-tiered font sizes.
//!
//! ```text
//! title      len > 120 → long    len > 80 → medium   else short
//! others     len ≤ 80 → short    ≤ 160 → medium      ≤ 250 → long   else extra_long
//! subtitle   max(round(title_pt × ratio), min_size)
//! ```
//!
//! Titles use three tiers and every other section four. Lengths are counted
//! in characters, not bytes.

use serde::{Deserialize, Serialize};

/// A length bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Short,
    Medium,
    Long,
    ExtraLong,
}

impl Tier {
    /// Four-tier bucket used by authors, affiliations and references.
    pub fn for_length(chars: usize) -> Self {
        match chars {
            0..=80 => Tier::Short,
            81..=160 => Tier::Medium,
            161..=250 => Tier::Long,
            _ => Tier::ExtraLong,
        }
    }

    /// Three-tier bucket used by titles.
    pub fn for_title_length(chars: usize) -> Self {
        if chars > 120 {
            Tier::Long
        } else if chars > 80 {
            Tier::Medium
        } else {
            Tier::Short
        }
    }
}

/// Point sizes per tier. Missing tiers fall back to the next smaller one, so
/// a table with only `short` is a fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeTiers {
    pub short: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_long: Option<u32>,
}

impl SizeTiers {
    pub const fn fixed(points: u32) -> Self {
        Self {
            short: points,
            medium: None,
            long: None,
            extra_long: None,
        }
    }

    pub const fn three(short: u32, medium: u32, long: u32) -> Self {
        Self {
            short,
            medium: Some(medium),
            long: Some(long),
            extra_long: None,
        }
    }

    pub const fn four(short: u32, medium: u32, long: u32, extra_long: u32) -> Self {
        Self {
            short,
            medium: Some(medium),
            long: Some(long),
            extra_long: Some(extra_long),
        }
    }

    pub fn size(&self, tier: Tier) -> u32 {
        let medium = self.medium.unwrap_or(self.short);
        let long = self.long.unwrap_or(medium);
        match tier {
            Tier::Short => self.short,
            Tier::Medium => medium,
            Tier::Long => long,
            Tier::ExtraLong => self.extra_long.unwrap_or(long),
        }
    }

    /// Size for `text` under the four-tier rule.
    pub fn for_text(&self, text: &str) -> u32 {
        self.size(Tier::for_length(text.chars().count()))
    }

    /// Size for `title` under the three-tier title rule.
    pub fn for_title(&self, title: &str) -> u32 {
        self.size(Tier::for_title_length(title.chars().count()))
    }
}

/// Subtitle size derived from the title size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubtitleRule {
    pub ratio: f64,
    pub min_size: u32,
}

impl SubtitleRule {
    /// `max(round(title_pt × ratio), min_size)`, rounding halves to even.
    pub fn size_for(&self, title_pt: u32) -> u32 {
        let scaled = (f64::from(title_pt) * self.ratio).round_ties_even();
        (scaled.max(0.0) as u32).max(self.min_size)
    }
}

/// The `dynamic_font_sizes` table of a template. Absent sections use
/// [`DynamicSizes::builtin_defaults`] for that section only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DynamicSizes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<SizeTiers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<SubtitleRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<SizeTiers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliations: Option<SizeTiers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_body: Option<SizeTiers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<SizeTiers>,
}

/// Fully resolved size rules: every section present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedSizes {
    pub title: SizeTiers,
    pub subtitle: SubtitleRule,
    pub authors: SizeTiers,
    pub affiliations: SizeTiers,
    pub main_body: SizeTiers,
    pub references: SizeTiers,
}

impl DynamicSizes {
    /// The global default size table.
    pub const fn builtin_defaults() -> ResolvedSizes {
        ResolvedSizes {
            title: SizeTiers::three(48, 38, 34),
            subtitle: SubtitleRule {
                ratio: 0.6,
                min_size: 32,
            },
            authors: SizeTiers::four(18, 16, 13, 11),
            affiliations: SizeTiers::four(18, 16, 13, 11),
            main_body: SizeTiers::fixed(18),
            references: SizeTiers::four(18, 16, 13, 11),
        }
    }

    pub fn resolve(&self) -> ResolvedSizes {
        let d = Self::builtin_defaults();
        ResolvedSizes {
            title: self.title.unwrap_or(d.title),
            subtitle: self.subtitle.unwrap_or(d.subtitle),
            authors: self.authors.unwrap_or(d.authors),
            affiliations: self.affiliations.unwrap_or(d.affiliations),
            main_body: self.main_body.unwrap_or(d.main_body),
            references: self.references.unwrap_or(d.references),
        }
    }
}
