//! Template library on disk and its premium / coming-soon membership.
//!
//! ```text
//! <root>/
//!   available/    default_template.pptx, Blue Template.pptx, …
//!   premium/
//!   coming_soon/
//! ```
//!
//! Membership lists are owned by a [`TemplateLibrary`] value; add/remove are
//! idempotent and report whether anything changed.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::PosterError;

/// File used when no template name is given.
pub const DEFAULT_TEMPLATE_FILE: &str = "default_template.pptx";

const SEED_PREMIUM: &[&str] = &["Playground Template"];

const SEED_COMING_SOON: &[&str] = &[
    "Grey Classic",
    "Space 3D Template",
    "Modern Blue Template",
    "Grounded Template",
    "Pastel Template",
    "Playful Template",
];

/// Library folder a template lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateCategory {
    Available,
    Premium,
    ComingSoon,
}

impl TemplateCategory {
    pub const SEARCH_ORDER: [TemplateCategory; 3] = [
        TemplateCategory::Available,
        TemplateCategory::Premium,
        TemplateCategory::ComingSoon,
    ];

    pub fn folder(self) -> &'static str {
        match self {
            TemplateCategory::Available => "available",
            TemplateCategory::Premium => "premium",
            TemplateCategory::ComingSoon => "coming_soon",
        }
    }
}

/// A template file found in the library.
#[derive(Debug, Clone, Serialize)]
pub struct LibraryEntry {
    pub name: String,
    pub path: PathBuf,
    pub folder: TemplateCategory,
    pub size_bytes: u64,
    pub is_premium: bool,
    pub is_coming_soon: bool,
    pub is_new: bool,
}

#[derive(Debug, Clone)]
pub struct TemplateLibrary {
    root: PathBuf,
    premium: Vec<String>,
    coming_soon: Vec<String>,
}

impl TemplateLibrary {
    /// A library rooted at `root` with the shipped membership lists.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            premium: SEED_PREMIUM.iter().map(|s| s.to_string()).collect(),
            coming_soon: SEED_COMING_SOON.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // ── Membership ───────────────────────────────────────────────────────

    pub fn is_premium(&self, name: &str) -> bool {
        self.premium.iter().any(|n| n == name)
    }

    pub fn premium(&self) -> &[String] {
        &self.premium
    }

    /// Returns false if `name` was already premium.
    pub fn add_premium(&mut self, name: &str) -> bool {
        add_unique(&mut self.premium, name)
    }

    /// Returns false if `name` was not premium.
    pub fn remove_premium(&mut self, name: &str) -> bool {
        remove_present(&mut self.premium, name)
    }

    pub fn is_coming_soon(&self, name: &str) -> bool {
        self.coming_soon.iter().any(|n| n == name)
    }

    pub fn coming_soon(&self) -> &[String] {
        &self.coming_soon
    }

    pub fn add_coming_soon(&mut self, name: &str) -> bool {
        add_unique(&mut self.coming_soon, name)
    }

    pub fn remove_coming_soon(&mut self, name: &str) -> bool {
        remove_present(&mut self.coming_soon, name)
    }

    /// Every template that is not coming soon counts as new.
    pub fn is_new(&self, name: &str) -> bool {
        !self.is_coming_soon(name)
    }

    /// Marking a template new takes it off the coming-soon list.
    pub fn add_new(&mut self, name: &str) -> bool {
        self.remove_coming_soon(name)
    }

    /// Un-marking a template as new puts it on the coming-soon list.
    pub fn remove_new(&mut self, name: &str) -> bool {
        self.add_coming_soon(name)
    }

    /// Category by membership: premium first, then coming soon.
    pub fn category_of(&self, name: &str) -> TemplateCategory {
        if self.is_premium(name) {
            TemplateCategory::Premium
        } else if self.is_coming_soon(name) {
            TemplateCategory::ComingSoon
        } else {
            TemplateCategory::Available
        }
    }

    // ── Files ────────────────────────────────────────────────────────────

    /// Resolve a template name or path to a `.pptx` file.
    ///
    /// An existing file path is used as-is (an uploaded template). Otherwise
    /// `<name>.pptx` is looked up in `available/`, `premium/` and
    /// `coming_soon/`, also trying underscores for spaces. An empty name or
    /// `default` selects `available/default_template.pptx`.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, PosterError> {
        let direct = Path::new(name);
        if direct.is_file() {
            return Ok(direct.to_path_buf());
        }

        let stem = name.trim();
        let stem = stem.strip_suffix(".pptx").unwrap_or(stem);
        let file_names = if stem.is_empty() || stem.eq_ignore_ascii_case("default") {
            vec![DEFAULT_TEMPLATE_FILE.to_string()]
        } else {
            let mut names = vec![format!("{stem}.pptx")];
            let underscored = format!("{}.pptx", stem.replace(' ', "_"));
            if underscored != names[0] {
                names.push(underscored);
            }
            names
        };

        for category in TemplateCategory::SEARCH_ORDER {
            for file_name in &file_names {
                let candidate = self.root.join(category.folder()).join(file_name);
                if candidate.is_file() {
                    if category == TemplateCategory::ComingSoon {
                        warn!("Template '{}' is marked coming soon", stem);
                    }
                    debug!("Resolved template '{}' → {}", name, candidate.display());
                    return Ok(candidate);
                }
            }
        }

        Err(PosterError::TemplateNotFound {
            name: name.to_string(),
            path: self
                .root
                .join(TemplateCategory::Available.folder())
                .join(&file_names[0]),
        })
    }

    /// All `.pptx` files in the library folders, sorted by name.
    pub fn list(&self) -> Vec<LibraryEntry> {
        let mut entries = Vec::new();
        for folder in TemplateCategory::SEARCH_ORDER {
            let dir = self.root.join(folder.folder());
            let Ok(read_dir) = std::fs::read_dir(&dir) else {
                continue;
            };
            for item in read_dir.flatten() {
                let path = item.path();
                if path.extension().and_then(|e| e.to_str()) != Some("pptx") {
                    continue;
                }
                let name = template_name(&path);
                entries.push(LibraryEntry {
                    size_bytes: item.metadata().map(|m| m.len()).unwrap_or(0),
                    is_premium: folder == TemplateCategory::Premium || self.is_premium(&name),
                    is_coming_soon: folder == TemplateCategory::ComingSoon
                        || self.is_coming_soon(&name),
                    is_new: self.is_new(&name),
                    name,
                    path,
                    folder,
                });
            }
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }
}

/// Display name of a template file: its stem with underscores as spaces.
/// This is the key used for style lookup.
pub fn template_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().replace('_', " "))
        .unwrap_or_default()
}

fn add_unique(list: &mut Vec<String>, name: &str) -> bool {
    if list.iter().any(|n| n == name) {
        return false;
    }
    list.push(name.to_string());
    true
}

fn remove_present(list: &mut Vec<String>, name: &str) -> bool {
    let before = list.len();
    list.retain(|n| n != name);
    list.len() != before
}
