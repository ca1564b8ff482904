//! Poster content: the extracted fields and the figures supplied with them.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::PopulateWarning;
use crate::templates::SectionType;

/// Substituted when the title is missing or empty.
pub const TITLE_FALLBACK: &str = "(No Title Extracted)";

/// Written to the references box when no usable references remain.
pub const REFERENCES_PLACEHOLDER: &str = "[Reference details not found]";

/// Figures a poster can hold.
pub const MAX_FIGURES: usize = 4;

/// A content field and the shape it is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Headline,
    Title,
    Authors,
    Affiliations,
    Subtitle,
    Introduction,
    Objective,
    Methods,
    Results,
    Discussion,
    Conclusions,
    References,
}

impl Field {
    /// Population order. Title precedes subtitle, whose size derives from it.
    pub const ALL: [Field; 12] = [
        Field::Headline,
        Field::Title,
        Field::Authors,
        Field::Affiliations,
        Field::Subtitle,
        Field::Introduction,
        Field::Objective,
        Field::Methods,
        Field::Results,
        Field::Discussion,
        Field::Conclusions,
        Field::References,
    ];

    /// JSON key in extracted content.
    pub fn key(self) -> &'static str {
        match self {
            Field::Headline => "headline",
            Field::Title => "title",
            Field::Authors => "authors",
            Field::Affiliations => "affiliations",
            Field::Subtitle => "subtitle",
            Field::Introduction => "Introduction",
            Field::Objective => "Objective",
            Field::Methods => "Methods",
            Field::Results => "Results",
            Field::Discussion => "Discussion",
            Field::Conclusions => "Conclusions",
            Field::References => "References",
        }
    }

    /// Name of the template shape the field is written to.
    pub fn shape_name(self) -> &'static str {
        match self {
            Field::Headline => "HeadlineBox",
            Field::Title => "TitleBox",
            Field::Authors => "AuthorBox",
            Field::Affiliations => "AffiliationBox",
            Field::Subtitle => "SubtitleBox",
            Field::Introduction => "IntroductionBox",
            Field::Objective => "ObjectiveBox",
            Field::Methods => "MethodsBox",
            Field::Results => "ResultsBox",
            Field::Discussion => "DiscussionBox",
            Field::Conclusions => "ConclusionBox",
            Field::References => "ReferencesBox",
        }
    }

    pub fn section_type(self) -> SectionType {
        match self {
            Field::Headline => SectionType::Headline,
            Field::Title => SectionType::Title,
            Field::Subtitle => SectionType::Subtitle,
            Field::Authors => SectionType::Authors,
            Field::Affiliations => SectionType::Affiliations,
            Field::References => SectionType::References,
            Field::Introduction
            | Field::Objective
            | Field::Methods
            | Field::Results
            | Field::Discussion
            | Field::Conclusions => SectionType::MainBody,
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

/// Structured poster content, one string per [`Field`]. Missing fields read
/// as empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtractedContent {
    fields: BTreeMap<Field, String>,
}

impl ExtractedContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    /// The value of `field`, or `""`.
    pub fn get(&self, field: Field) -> &str {
        self.fields.get(&field).map(String::as_str).unwrap_or("")
    }

    /// The title, or [`TITLE_FALLBACK`] when empty.
    pub fn title_or_fallback(&self) -> &str {
        let title = self.get(Field::Title);
        if title.trim().is_empty() {
            TITLE_FALLBACK
        } else {
            title
        }
    }

    /// Fields with non-empty values, in population order.
    pub fn filled(&self) -> impl Iterator<Item = (Field, &str)> {
        Field::ALL
            .into_iter()
            .map(|f| (f, self.get(f)))
            .filter(|(_, v)| !v.trim().is_empty())
    }

    /// Build from loosely-typed JSON. Problems are reported as warnings and
    /// the affected field is left empty or coerced to text.
    pub fn from_value(value: Value) -> (Self, Vec<PopulateWarning>) {
        let mut content = Self::new();
        let mut warnings = Vec::new();
        let Value::Object(map) = value else {
            warnings.push(PopulateWarning::MalformedValue {
                field: "*".into(),
                detail: "content is not a JSON object".into(),
            });
            return (content, warnings);
        };

        for (key, value) in map {
            let Some(field) = Field::from_key(&key) else {
                debug!("Ignoring unknown content key '{}'", key);
                continue;
            };
            match value {
                Value::String(s) => content.set(field, s),
                Value::Null => {}
                Value::Number(n) => content.set(field, n.to_string()),
                Value::Bool(b) => content.set(field, b.to_string()),
                Value::Array(items) if items.iter().all(Value::is_string) => {
                    let joined = items
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join(", ");
                    warnings.push(PopulateWarning::MalformedValue {
                        field: key,
                        detail: "list joined into one line".into(),
                    });
                    content.set(field, joined);
                }
                other => {
                    let kind = if other.is_array() { "array" } else { "object" };
                    warn!("Field '{}': expected text, got {}", key, kind);
                    warnings.push(PopulateWarning::MalformedValue {
                        field: key,
                        detail: format!("expected text, got {kind}; field skipped"),
                    });
                }
            }
        }
        (content, warnings)
    }

    pub fn from_json(json: &str) -> Result<(Self, Vec<PopulateWarning>), serde_json::Error> {
        Ok(Self::from_value(serde_json::from_str(json)?))
    }

    /// Apply [`clean_references`] to the references field, if present.
    pub fn clean_references(&mut self) {
        if let Some(refs) = self.fields.get_mut(&Field::References) {
            *refs = clean_references(refs);
        }
    }
}

impl Serialize for ExtractedContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(Field::ALL.len()))?;
        for field in Field::ALL {
            map.serialize_entry(field.key(), self.get(field))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ExtractedContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(value).0)
    }
}

/// Tidy a references string: drop placeholder markers, collapse empty list
/// slots and trim separators. Empty input becomes [`REFERENCES_PLACEHOLDER`].
pub fn clean_references(raw: &str) -> String {
    let cleaned = raw
        .trim()
        .replace(REFERENCES_PLACEHOLDER, "")
        .replace(" ,", ",")
        .replace(", ,", ",");
    let cleaned = cleaned
        .trim_matches(|c| matches!(c, ',' | ';' | ' ' | '.' | '\n'))
        .trim();
    if cleaned.is_empty() {
        REFERENCES_PLACEHOLDER.to_string()
    } else {
        cleaned.to_string()
    }
}

// ── Figures ──────────────────────────────────────────────────────────────

/// Side-channel description of one figure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FigureDescriptor {
    #[serde(default)]
    pub description: String,
}

/// Up to four figure images (by position) plus their descriptions (by
/// 1-based figure number).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FigureSet {
    images: [Option<PathBuf>; MAX_FIGURES],
    descriptions: BTreeMap<usize, FigureDescriptor>,
}

impl FigureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill positions in order from `paths`. Empty paths keep their slot
    /// empty; paths past the fourth are ignored.
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut set = Self::new();
        for (i, p) in paths.into_iter().enumerate() {
            let p = p.as_ref();
            if i >= MAX_FIGURES {
                warn!("Ignoring figure {} ({}): at most {} figures", i + 1, p.display(), MAX_FIGURES);
                continue;
            }
            if !p.as_os_str().is_empty() {
                set.images[i] = Some(p.to_path_buf());
            }
        }
        set
    }

    /// Set the image for 0-based position `index`. Out-of-range is ignored.
    pub fn set_image(&mut self, index: usize, path: impl Into<PathBuf>) {
        if let Some(slot) = self.images.get_mut(index) {
            *slot = Some(path.into());
        }
    }

    /// Supplied images as `(0-based index, path)`.
    pub fn images(&self) -> impl Iterator<Item = (usize, &Path)> {
        self.images
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.as_deref().map(|p| (i, p)))
    }

    pub fn image_count(&self) -> usize {
        self.images().count()
    }

    pub fn set_description(&mut self, figure: usize, text: impl Into<String>) {
        self.descriptions.insert(
            figure,
            FigureDescriptor {
                description: text.into(),
            },
        );
    }

    /// Non-empty description for 1-based `figure`.
    pub fn description(&self, figure: usize) -> Option<&str> {
        self.descriptions
            .get(&figure)
            .map(|d| d.description.trim())
            .filter(|d| !d.is_empty())
    }

    /// Merge descriptions from JSON: `{"1": {"description": "…"}}` or
    /// `{"1": "…"}`. Keys outside 1–4 are ignored.
    pub fn merge_descriptions_json(&mut self, json: &str) -> Result<usize, serde_json::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Entry {
            Full(FigureDescriptor),
            Text(String),
        }

        let raw: BTreeMap<String, Entry> = serde_json::from_str(json)?;
        let mut n = 0;
        for (key, entry) in raw {
            let Some(figure) = key.trim().parse::<usize>().ok().filter(|f| (1..=MAX_FIGURES).contains(f)) else {
                debug!("Ignoring figure description key '{}'", key);
                continue;
            };
            let text = match entry {
                Entry::Full(d) => d.description,
                Entry::Text(t) => t,
            };
            self.set_description(figure, text);
            n += 1;
        }
        Ok(n)
    }
}

/// Placeholder shape for 0-based figure position `index`: the first two are
/// large, the last two small.
pub fn placeholder_name(index: usize) -> String {
    let size = if index < 2 { "Large" } else { "Small" };
    format!("Fig{}Placeholder{}", index + 1, size)
}

/// Description box for 1-based `figure`.
pub fn description_box_name(figure: usize) -> String {
    format!("FigureDesc{figure}")
}
