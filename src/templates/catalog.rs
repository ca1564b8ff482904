//! Per-template style configuration and the built-in registry.
//!
//! Lookup is all-or-nothing per section: a template either defines a style
//! record for a section, which is used as-is, or it does not and the global
//! default record for that section applies. Fields are never merged.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use super::sizing::{DynamicSizes, ResolvedSizes};
use super::style::{SectionType, SizeLaw, StyleRecord};
use crate::error::PosterError;
use crate::pptx::{Alignment, RgbColor};

/// Name of the template that renders `*highlighted*` headline words.
pub const HEADLINE_IMPACT: &str = "Headline Impact Template";

/// Style records for the eight section types. Absent sections use defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SectionStyles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<StyleRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<StyleRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<StyleRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<StyleRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliations: Option<StyleRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_body_text: Option<StyleRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<StyleRecord>,
    #[serde(default, rename = "FigureDesc", skip_serializing_if = "Option::is_none")]
    pub figure_desc: Option<StyleRecord>,
}

impl SectionStyles {
    pub fn get(&self, section: SectionType) -> Option<&StyleRecord> {
        match section {
            SectionType::Headline => self.headline.as_ref(),
            SectionType::Title => self.title.as_ref(),
            SectionType::Subtitle => self.subtitle.as_ref(),
            SectionType::Authors => self.authors.as_ref(),
            SectionType::Affiliations => self.affiliations.as_ref(),
            SectionType::MainBody => self.main_body_text.as_ref(),
            SectionType::References => self.references.as_ref(),
            SectionType::FigureDesc => self.figure_desc.as_ref(),
        }
    }
}

/// Full configuration of one template.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TemplateStyleConfig {
    #[serde(flatten)]
    pub styles: SectionStyles,
    #[serde(default, rename = "dynamic_font_sizes")]
    pub sizes: DynamicSizes,
    /// Render `*marked*` headline words in the highlight colour.
    #[serde(default)]
    pub highlight_headline: bool,
}

static DEFAULT_CONFIG: Lazy<TemplateStyleConfig> = Lazy::new(TemplateStyleConfig::default);

impl TemplateStyleConfig {
    /// Style for `section`: the template's record if defined, else the
    /// global default record.
    pub fn style_for(&self, section: SectionType) -> StyleRecord {
        self.styles
            .get(section)
            .cloned()
            .unwrap_or_else(|| StyleRecord::default_for(section))
    }

    /// Whether the template defines `section` itself.
    pub fn defines(&self, section: SectionType) -> bool {
        self.styles.get(section).is_some()
    }

    pub fn sizes(&self) -> ResolvedSizes {
        self.sizes.resolve()
    }

    /// Title point size for `title` under the three-tier rule.
    pub fn title_size(&self, title: &str) -> u32 {
        self.sizes().title.for_title(title)
    }

    /// Subtitle point size derived from the title's.
    pub fn subtitle_size(&self, title_pt: u32) -> u32 {
        self.sizes().subtitle.size_for(title_pt)
    }

    /// Point size for `content` in `section`.
    ///
    /// A style record's `font_size` takes precedence over tiers. Subtitles
    /// need the title size and go through [`Self::subtitle_size`]; here they
    /// are derived from the default short title size.
    pub fn font_size_for(&self, content: &str, section: SectionType) -> u32 {
        if let Some(fixed) = self.styles.get(section).and_then(|s| s.font_size) {
            return fixed;
        }
        let sizes = self.sizes();
        match section.size_law() {
            SizeLaw::TitleTiers => sizes.title.for_title(content),
            SizeLaw::DerivedFromTitle => sizes.subtitle.size_for(sizes.title.short),
            SizeLaw::LengthTiers => match section {
                SectionType::Authors => sizes.authors.for_text(content),
                SectionType::Affiliations => sizes.affiliations.for_text(content),
                _ => sizes.references.for_text(content),
            },
            SizeLaw::FixedShort => sizes.main_body.short,
            SizeLaw::StyleOr(default) => default,
        }
    }
}

/// Template name → configuration. Names match exactly, including case and
/// spaces.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, TemplateStyleConfig>,
}

impl TemplateRegistry {
    /// A registry with no templates; every lookup uses defaults.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The eight configured templates.
    pub fn builtin() -> Self {
        let templates = builtin_templates()
            .into_iter()
            .map(|(name, cfg)| (name.to_string(), cfg))
            .collect();
        Self { templates }
    }

    pub fn get(&self, name: &str) -> Option<&TemplateStyleConfig> {
        self.templates.get(name)
    }

    /// The configuration for `name`, or the default configuration for an
    /// unregistered template.
    pub fn config_for(&self, name: &str) -> &TemplateStyleConfig {
        self.templates.get(name).unwrap_or(&DEFAULT_CONFIG)
    }

    pub fn style_for(&self, name: &str, section: SectionType) -> StyleRecord {
        self.config_for(name).style_for(section)
    }

    pub fn font_size_for(&self, content: &str, name: &str, section: SectionType) -> u32 {
        self.config_for(name).font_size_for(content, section)
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Register or replace a template.
    pub fn insert(&mut self, name: impl Into<String>, config: TemplateStyleConfig) {
        self.templates.insert(name.into(), config);
    }

    /// Merge a JSON object of `name → config` over the registry. Entries
    /// replace built-ins of the same name wholesale. Returns the number of
    /// entries read.
    pub fn merge_json(&mut self, json: &str) -> Result<usize, serde_json::Error> {
        let overrides: BTreeMap<String, TemplateStyleConfig> = serde_json::from_str(json)?;
        let n = overrides.len();
        for (name, cfg) in overrides {
            debug!("Style override for template '{}'", name);
            self.templates.insert(name, cfg);
        }
        Ok(n)
    }

    /// [`Self::merge_json`] from a file.
    pub fn load_overrides(&mut self, path: &Path) -> Result<usize, PosterError> {
        let json = std::fs::read_to_string(path).map_err(|e| PosterError::StyleConfigInvalid {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        self.merge_json(&json)
            .map_err(|e| PosterError::StyleConfigInvalid {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })
    }
}

// ── Built-in table ───────────────────────────────────────────────────────

fn hex(s: &str) -> RgbColor {
    RgbColor::from_hex(s).unwrap_or(RgbColor::BLACK)
}

fn plain(color: &str, family: &str, alignment: Alignment) -> StyleRecord {
    StyleRecord::new(hex(color), family, false, alignment)
}

fn bold(color: &str, family: &str, alignment: Alignment) -> StyleRecord {
    StyleRecord::new(hex(color), family, true, alignment)
}

/// Blue-family layout shared by "Blue Template" and "Clean 5-Panel Flow
/// Template".
fn blue_layout() -> TemplateStyleConfig {
    use super::sizing::{SizeTiers, SubtitleRule};
    use Alignment::{Center, Left};
    TemplateStyleConfig {
        styles: SectionStyles {
            headline: None,
            title: Some(bold("#FFFFFF", "Futura", Center)),
            subtitle: Some(plain("#000000", "Futura", Center)),
            authors: Some(plain("#000000", "Futura", Left)),
            affiliations: Some(plain("#000000", "Futura", Left)),
            main_body_text: Some(plain("#000000", "Futura", Left)),
            references: Some(plain("#000000", "Futura", Left)),
            figure_desc: Some(plain("#000000", "Futura", Left)),
        },
        sizes: DynamicSizes {
            title: Some(SizeTiers::three(48, 38, 34)),
            subtitle: Some(SubtitleRule {
                ratio: 0.6,
                min_size: 32,
            }),
            authors: Some(SizeTiers::four(18, 16, 13, 11)),
            affiliations: Some(SizeTiers::four(18, 16, 13, 11)),
            main_body: Some(SizeTiers::fixed(18)),
            references: Some(SizeTiers::four(18, 16, 13, 11)),
        },
        highlight_headline: false,
    }
}

fn builtin_templates() -> Vec<(&'static str, TemplateStyleConfig)> {
    use super::sizing::{SizeTiers, SubtitleRule};
    use Alignment::{Center, Left};

    let headline_impact = TemplateStyleConfig {
        styles: SectionStyles {
            headline: Some(bold("#ffffff", "Intro Rust", Left).sized(125)),
            title: Some(bold("#ffffff", "Intro Rust", Left)),
            subtitle: Some(plain("#ffffff", "Intro Rust", Center)),
            authors: Some(plain("#ffffff", "Intro Rust", Left)),
            affiliations: Some(plain("#222222", "Intro Rust", Left)),
            main_body_text: Some(plain("#222222", "Aptos", Left).sized(32)),
            references: Some(plain("#ffffff", "Aptos", Left).sized(24)),
            figure_desc: Some(plain("#222222", "Aptos", Left).sized(32)),
        },
        sizes: DynamicSizes {
            title: Some(SizeTiers::three(88, 66, 60)),
            subtitle: Some(SubtitleRule {
                ratio: 0.6,
                min_size: 28,
            }),
            authors: Some(SizeTiers::four(38, 32, 24, 22)),
            affiliations: Some(SizeTiers::four(18, 16, 13, 11)),
            main_body: Some(SizeTiers::fixed(28)),
            references: None,
        },
        highlight_headline: true,
    };

    let green = TemplateStyleConfig {
        styles: SectionStyles {
            headline: None,
            title: Some(bold("#FFFFFF", "Darker Grotesque", Left)),
            subtitle: Some(plain("#FFFFFF", "Darker Grotesque", Left)),
            authors: Some(bold("#FFFFFF", "Darker Grotesque", Left)),
            affiliations: Some(plain("#FFFFFF", "Darker Grotesque", Left)),
            main_body_text: Some(plain("#000000", "Darker Grotesque", Left)),
            references: Some(plain("#000000", "Darker Grotesque", Left)),
            figure_desc: Some(plain("#000000", "Darker Grotesque", Left)),
        },
        sizes: DynamicSizes {
            title: Some(SizeTiers::three(80, 80, 60)),
            subtitle: Some(SubtitleRule {
                ratio: 0.8,
                min_size: 40,
            }),
            authors: Some(SizeTiers::three(44, 40, 36)),
            affiliations: Some(SizeTiers::three(20, 18, 16)),
            main_body: Some(SizeTiers::fixed(40)),
            references: Some(SizeTiers::three(30, 26, 26)),
        },
        highlight_headline: false,
    };

    let personal_blue = TemplateStyleConfig {
        styles: SectionStyles {
            headline: None,
            title: Some(bold("#FFFFFF", "Futura", Left)),
            subtitle: Some(bold("#000000", "Futura", Left)),
            authors: Some(plain("#FFFFFF", "Futura", Left)),
            affiliations: Some(plain("#FFFFFF", "Futura", Left).italic()),
            main_body_text: Some(plain("#000000", "Futura", Left)),
            references: Some(plain("#000000", "Futura", Left)),
            figure_desc: Some(plain("#000000", "Futura", Left)),
        },
        sizes: DynamicSizes {
            title: Some(SizeTiers::three(60, 60, 48)),
            subtitle: Some(SubtitleRule {
                ratio: 0.6,
                min_size: 32,
            }),
            authors: Some(SizeTiers::four(40, 36, 32, 28)),
            affiliations: Some(SizeTiers::four(24, 24, 24, 24)),
            main_body: Some(SizeTiers::fixed(36)),
            references: Some(SizeTiers::four(18, 16, 13, 11)),
        },
        highlight_headline: false,
    };

    let cyan_flow = TemplateStyleConfig {
        styles: SectionStyles {
            headline: None,
            title: Some(bold("#05bbd6", "Aptos", Center)),
            subtitle: Some(plain("#000000", "Aptos", Center)),
            authors: Some(plain("#000000", "Aptos", Center)),
            affiliations: Some(plain("#000000", "Aptos", Center)),
            main_body_text: Some(plain("#000000", "Futura", Left)),
            references: Some(plain("#000000", "Aptos", Left)),
            figure_desc: Some(plain("#000000", "Aptos", Left)),
        },
        sizes: DynamicSizes {
            title: Some(SizeTiers::three(80, 72, 60)),
            subtitle: Some(SubtitleRule {
                ratio: 0.7,
                min_size: 28,
            }),
            authors: Some(SizeTiers::four(40, 36, 32, 28)),
            affiliations: Some(SizeTiers::four(24, 24, 20, 16)),
            main_body: Some(SizeTiers::fixed(36)),
            // The long tier really is 128 pt in the shipped configuration.
            references: Some(SizeTiers::four(32, 28, 128, 28)),
        },
        highlight_headline: false,
    };

    let modular_impact = TemplateStyleConfig {
        styles: SectionStyles {
            headline: None,
            title: Some(bold("#FFFFFF", "Futura", Center)),
            subtitle: Some(plain("#000000", "Futura", Center)),
            authors: Some(plain("#000000", "Futura", Left)),
            affiliations: Some(plain("#000000", "Futura", Left)),
            main_body_text: Some(plain("#000000", "Futura", Left)),
            references: Some(plain("#000000", "Futura", Left)),
            figure_desc: Some(plain("#000000", "Futura", Left)),
        },
        sizes: DynamicSizes {
            title: Some(SizeTiers::three(56, 46, 40)),
            subtitle: Some(SubtitleRule {
                ratio: 0.65,
                min_size: 30,
            }),
            authors: Some(SizeTiers::four(22, 20, 18, 16)),
            affiliations: Some(SizeTiers::four(18, 16, 14, 12)),
            main_body: Some(SizeTiers::fixed(22)),
            references: Some(SizeTiers::four(18, 16, 14, 12)),
        },
        highlight_headline: false,
    };

    let emerald = TemplateStyleConfig {
        styles: SectionStyles {
            headline: Some(bold("#ffffff", "Poppins", Left)),
            title: Some(bold("#000000", "Poppins", Left)),
            subtitle: Some(plain("#000000", "Poppins", Left)),
            authors: Some(plain("#000000", "Poppins", Left)),
            affiliations: Some(plain("#000000", "Poppins", Left).italic()),
            main_body_text: Some(plain("#000000", "Poppins", Left)),
            references: Some(plain("#ffffff", "Poppins", Left)),
            figure_desc: Some(plain("#000000", "Poppins", Left)),
        },
        sizes: DynamicSizes {
            title: Some(SizeTiers::three(100, 80, 60)),
            subtitle: Some(SubtitleRule {
                ratio: 0.68,
                min_size: 32,
            }),
            authors: Some(SizeTiers::four(44, 44, 32, 28)),
            affiliations: Some(SizeTiers::four(30, 24, 20, 16)),
            main_body: Some(SizeTiers::fixed(24)),
            references: Some(SizeTiers::four(20, 20, 20, 20)),
        },
        highlight_headline: false,
    };

    vec![
        ("Blue Template", blue_layout()),
        (HEADLINE_IMPACT, headline_impact),
        ("Green Template", green),
        ("Personal Blue Basic", personal_blue),
        ("Clean 5-Panel Flow Template", blue_layout()),
        ("Cyan Flow Template", cyan_flow),
        ("Modular Impact", modular_impact),
        ("Emerald Headline Template", emerald),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eight_builtin_templates() {
        let reg = TemplateRegistry::builtin();
        assert_eq!(reg.names().count(), 8);
        assert!(reg.is_registered("Cyan Flow Template"));
        assert!(!reg.is_registered("cyan flow template"));
        assert!(reg.config_for(HEADLINE_IMPACT).highlight_headline);
        assert!(!reg.config_for("Emerald Headline Template").highlight_headline);
    }

    #[test]
    fn unregistered_template_equals_explicit_default() {
        let reg = TemplateRegistry::builtin();
        let explicit = TemplateStyleConfig::default();
        let long = "x".repeat(200);
        let longer = "y".repeat(300);
        for section in SectionType::ALL {
            assert_eq!(reg.style_for("No Such Template", section), explicit.style_for(section));
            for text in ["short", long.as_str(), longer.as_str()] {
                assert_eq!(
                    reg.font_size_for(text, "No Such Template", section),
                    explicit.font_size_for(text, section)
                );
            }
        }
    }

    #[test]
    fn missing_section_falls_back_wholesale() {
        let mut reg = TemplateRegistry::empty();
        reg.merge_json(
            r##"{"Partial": {"title": {"font_color": "#123456", "font_family": "Gill Sans",
                  "bold": false, "alignment": "right", "font_size": 99}}}"##,
        )
        .unwrap();
        let body = reg.style_for("Partial", SectionType::MainBody);
        assert_eq!(body, StyleRecord::default_for(SectionType::MainBody));
        assert_eq!(body.font_family, "Futura");
        assert_eq!(reg.font_size_for("text", "Partial", SectionType::MainBody), 18);
        assert_eq!(reg.font_size_for("text", "Partial", SectionType::Title), 99);
    }

    #[test]
    fn fixed_style_size_beats_tiers() {
        let reg = TemplateRegistry::builtin();
        let long = "r".repeat(400);
        assert_eq!(reg.font_size_for(&long, HEADLINE_IMPACT, SectionType::References), 24);
        assert_eq!(reg.font_size_for(&long, HEADLINE_IMPACT, SectionType::MainBody), 32);
        assert_eq!(reg.font_size_for("x", HEADLINE_IMPACT, SectionType::Headline), 125);
        assert_eq!(reg.font_size_for("x", "Blue Template", SectionType::FigureDesc), 18);
    }

    #[test]
    fn headline_impact_without_reference_tiers_uses_defaults() {
        let cfg = TemplateStyleConfig {
            styles: SectionStyles::default(),
            ..TemplateRegistry::builtin().config_for(HEADLINE_IMPACT).clone()
        };
        assert_eq!(cfg.font_size_for(&"r".repeat(200), SectionType::References), 13);
    }

    #[test]
    fn cyan_flow_keeps_its_long_reference_tier() {
        let reg = TemplateRegistry::builtin();
        let refs = "r".repeat(200);
        assert_eq!(reg.font_size_for(&refs, "Cyan Flow Template", SectionType::References), 128);
    }

    #[test]
    fn subtitle_follows_each_template_rule() {
        let reg = TemplateRegistry::builtin();
        let cases = [
            ("Blue Template", 48, 32),
            (HEADLINE_IMPACT, 88, 53),
            ("Green Template", 80, 64),
            ("Cyan Flow Template", 80, 56),
            ("Modular Impact", 56, 36),
            ("Emerald Headline Template", 100, 68),
        ];
        for (name, title_pt, expected) in cases {
            assert_eq!(reg.config_for(name).subtitle_size(title_pt), expected, "{name}");
        }
    }

    #[test]
    fn overrides_replace_whole_entries() {
        let mut reg = TemplateRegistry::builtin();
        let n = reg
            .merge_json(r#"{"Blue Template": {"highlight_headline": true}}"#)
            .unwrap();
        assert_eq!(n, 1);
        let blue = reg.config_for("Blue Template");
        assert!(blue.highlight_headline);
        assert!(!blue.defines(SectionType::Title));
        assert_eq!(
            blue.style_for(SectionType::Title),
            StyleRecord::default_for(SectionType::Title)
        );
    }

    #[test]
    fn config_serialises_in_source_layout() {
        let reg = TemplateRegistry::builtin();
        let json = serde_json::to_value(reg.config_for(HEADLINE_IMPACT)).unwrap();
        assert_eq!(json["FigureDesc"]["font_size"], 32);
        assert_eq!(json["dynamic_font_sizes"]["main_body"]["short"], 28);
        assert_eq!(json["title"]["font_color"], "#FFFFFF");
    }
}
