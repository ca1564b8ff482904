//! Reading and writing the `.pptx` zip package.
//!
//! Only three XML parts are ever parsed: the first slide, its relationships
//! and `[Content_Types].xml`. Every other part is carried as raw bytes and
//! written back unchanged, in its original order.

use std::io::{Cursor, Read, Write};
use std::path::Path;

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::picture::{picture_element, PictureFormat};
use super::shape::{GroupShape, Shape, ShapePath};
use super::units::Geometry;
use super::xml::{Document, Element, Node};
use super::PptxError;

const CONTENT_TYPES: &str = "[Content_Types].xml";
const PRESENTATION: &str = "ppt/presentation.xml";
const PRESENTATION_RELS: &str = "ppt/_rels/presentation.xml.rels";
const FALLBACK_SLIDE: &str = "ppt/slides/slide1.xml";

const NS_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_OFFICE_RELS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL_IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

struct Part {
    name: String,
    data: Vec<u8>,
}

/// The first slide of a presentation, with its shape tree lifted out of the
/// XML for editing.
#[derive(Debug, Clone)]
pub struct Slide {
    part_name: String,
    /// The slide document with an empty `p:spTree`.
    document: Document,
    shapes: GroupShape,
}

impl Slide {
    fn parse(part_name: &str, xml: &str) -> Result<Self, PptxError> {
        let mut document = Document::parse(xml)?;
        let tree = document
            .root
            .descend_mut(&["cSld", "spTree"])
            .ok_or_else(|| PptxError::MissingPart(format!("{part_name}: p:cSld/p:spTree")))?;
        let shapes = GroupShape::from_nodes(std::mem::take(&mut tree.children));
        Ok(Self {
            part_name: part_name.to_string(),
            document,
            shapes,
        })
    }

    pub fn part_name(&self) -> &str {
        &self.part_name
    }

    /// Top-level shapes of the slide (`p:spTree`).
    pub fn shapes(&self) -> &GroupShape {
        &self.shapes
    }

    pub fn shapes_mut(&mut self) -> &mut GroupShape {
        &mut self.shapes
    }

    fn to_bytes(&self) -> Result<Vec<u8>, PptxError> {
        let mut document = self.document.clone();
        if let Some(tree) = document.root.descend_mut(&["cSld", "spTree"]) {
            tree.children = self.shapes.clone().into_nodes();
        }
        document.to_bytes()
    }
}

/// An opened presentation package.
pub struct Presentation {
    parts: Vec<Part>,
    slide: Slide,
    slide_rels_name: String,
    slide_rels: Document,
    content_types: Document,
}

impl std::fmt::Debug for Presentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Presentation")
            .field("parts", &self.parts.len())
            .field("slide", &self.slide.part_name)
            .finish()
    }
}

impl Presentation {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PptxError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| PptxError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PptxError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)
                .map_err(|e| PptxError::Zip(format!("{name}: {e}")))?;
            parts.push(Part { name, data });
        }

        let content_types = parse_part(&parts, CONTENT_TYPES)?
            .ok_or_else(|| PptxError::MissingPart(CONTENT_TYPES.into()))?;

        let slide_name = first_slide_name(&parts)?;
        let slide_xml = part_text(&parts, &slide_name)?.ok_or(PptxError::NoSlides)?;
        let slide = Slide::parse(&slide_name, &slide_xml)?;

        let slide_rels_name = rels_name_for(&slide_name);
        let slide_rels = match parse_part(&parts, &slide_rels_name)? {
            Some(doc) => doc,
            None => Document::new(Element::new("Relationships").with_attr("xmlns", NS_RELATIONSHIPS)),
        };

        debug!(
            "Opened presentation: {} parts, first slide {}",
            parts.len(),
            slide_name
        );
        Ok(Self {
            parts,
            slide,
            slide_rels_name,
            slide_rels,
            content_types,
        })
    }

    pub fn slide(&self) -> &Slide {
        &self.slide
    }

    pub fn slide_mut(&mut self) -> &mut Slide {
        &mut self.slide
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }

    /// Raw bytes of an unparsed part, such as a media file.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.data.as_slice())
    }

    /// Resolve a slide relationship id to a package part name.
    pub fn relationship_target(&self, rel_id: &str) -> Option<String> {
        self.slide_rels
            .root
            .elements()
            .find(|r| r.attr("Id") == Some(rel_id))
            .and_then(|r| r.attr("Target"))
            .map(|target| resolve_target(&self.slide.part_name, target))
    }

    /// Store `bytes` as a new media part and place a picture shape showing
    /// it at `at`, stretched to `geometry`. Returns the new shape's id.
    pub fn add_picture(
        &mut self,
        bytes: &[u8],
        format: PictureFormat,
        geometry: Geometry,
        at: ShapePath,
    ) -> Result<u32, PptxError> {
        let media_name = self.next_media_name(format);
        let rel_id = self.next_relationship_id();
        let id = self.slide.shapes.max_id() + 1;

        let pic = Shape::from_element(picture_element(
            id,
            &format!("Picture {id}"),
            &rel_id,
            geometry,
        ));
        if !self.slide.shapes.insert(at, pic) {
            return Err(PptxError::InvalidPosition(format!("{at:?}")));
        }

        let target = format!("../media/{}", media_name.trim_start_matches("ppt/media/"));
        self.slide_rels.root.children.push(Node::Element(
            Element::new("Relationship")
                .with_attr("Id", rel_id.as_str())
                .with_attr("Type", REL_IMAGE)
                .with_attr("Target", target),
        ));
        self.ensure_default_content_type(format);
        if self.slide.document.root.attr("xmlns:r").is_none() {
            self.slide.document.root.set_attr("xmlns:r", NS_OFFICE_RELS);
        }
        debug!("Added picture {} as {} ({})", id, media_name, rel_id);
        self.parts.push(Part {
            name: media_name,
            data: bytes.to_vec(),
        });
        Ok(id)
    }

    fn next_media_name(&self, format: PictureFormat) -> String {
        (1..)
            .map(|n| format!("ppt/media/image{n}.{}", format.extension()))
            .find(|candidate| self.part(candidate).is_none())
            .unwrap_or_default()
    }

    fn next_relationship_id(&self) -> String {
        let max = self
            .slide_rels
            .root
            .elements()
            .filter_map(|r| r.attr("Id"))
            .filter_map(|id| id.strip_prefix("rId"))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        format!("rId{}", max + 1)
    }

    fn ensure_default_content_type(&mut self, format: PictureFormat) {
        let ext = format.extension();
        let known = self.content_types.root.elements().any(|e| {
            e.local_name() == "Default"
                && e.attr("Extension")
                    .is_some_and(|x| x.eq_ignore_ascii_case(ext))
        });
        if !known {
            self.content_types.root.insert_ordered(
                Element::new("Default")
                    .with_attr("Extension", ext)
                    .with_attr("ContentType", format.content_type()),
                &["Default", "Override"],
            );
        }
    }

    /// Serialise the package.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PptxError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        let mut wrote_rels = false;
        for part in &self.parts {
            let rendered;
            let data: &[u8] = if part.name == self.slide.part_name {
                rendered = self.slide.to_bytes()?;
                &rendered
            } else if part.name == self.slide_rels_name {
                wrote_rels = true;
                rendered = self.slide_rels.to_bytes()?;
                &rendered
            } else if part.name == CONTENT_TYPES {
                rendered = self.content_types.to_bytes()?;
                &rendered
            } else {
                &part.data
            };
            let options = if part.name.starts_with("ppt/media/") {
                stored
            } else {
                deflated
            };
            write_part(&mut writer, &part.name, data, options)?;
        }
        if !wrote_rels && !self.slide_rels.root.children.is_empty() {
            let rels = self.slide_rels.to_bytes()?;
            write_part(&mut writer, &self.slide_rels_name, &rels, deflated)?;
        }

        Ok(writer.finish()?.into_inner())
    }

    /// Write the package to `path` atomically: a temp file in the target
    /// directory is renamed over the destination.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PptxError> {
        let path = path.as_ref();
        let io_err = |source| PptxError::Io {
            path: path.to_path_buf(),
            source,
        };
        let bytes = self.to_bytes()?;

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => std::path::PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(io_err)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(io_err)?;
        tmp.write_all(&bytes).map_err(io_err)?;
        tmp.persist(path).map_err(|e| io_err(e.error))?;
        debug!("Saved presentation to {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }
}

fn write_part(
    writer: &mut ZipWriter<Cursor<Vec<u8>>>,
    name: &str,
    data: &[u8],
    options: SimpleFileOptions,
) -> Result<(), PptxError> {
    writer.start_file(name, options)?;
    writer
        .write_all(data)
        .map_err(|e| PptxError::Zip(format!("{name}: {e}")))
}

fn part_text(parts: &[Part], name: &str) -> Result<Option<String>, PptxError> {
    match parts.iter().find(|p| p.name == name) {
        None => Ok(None),
        Some(part) => {
            let text = String::from_utf8(part.data.clone())
                .map_err(|e| PptxError::Xml(format!("{name}: {e}")))?;
            Ok(Some(text.trim_start_matches('\u{feff}').to_string()))
        }
    }
}

fn parse_part(parts: &[Part], name: &str) -> Result<Option<Document>, PptxError> {
    part_text(parts, name)?
        .map(|xml| Document::parse(&xml).map_err(|e| PptxError::Xml(format!("{name}: {e}"))))
        .transpose()
}

/// First slide in presentation order, falling back to `slide1.xml`.
fn first_slide_name(parts: &[Part]) -> Result<String, PptxError> {
    let from_presentation = || -> Result<Option<String>, PptxError> {
        let (Some(pres), Some(rels)) = (
            parse_part(parts, PRESENTATION)?,
            parse_part(parts, PRESENTATION_RELS)?,
        ) else {
            return Ok(None);
        };
        let Some(rel_id) = pres
            .root
            .descend(&["sldIdLst", "sldId"])
            .and_then(|s| s.attr("r:id"))
        else {
            return Ok(None);
        };
        let target = rels
            .root
            .elements()
            .find(|r| r.attr("Id") == Some(rel_id))
            .and_then(|r| r.attr("Target"))
            .map(|t| resolve_target(PRESENTATION, t));
        Ok(target)
    };

    match from_presentation()? {
        Some(name) if parts.iter().any(|p| p.name == name) => Ok(name),
        _ if parts.iter().any(|p| p.name == FALLBACK_SLIDE) => Ok(FALLBACK_SLIDE.to_string()),
        _ => Err(PptxError::NoSlides),
    }
}

/// `ppt/slides/slide1.xml` → `ppt/slides/_rels/slide1.xml.rels`.
fn rels_name_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

/// Resolve a relationship target relative to the part that owns it.
fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = source_part.split('/').collect();
    segments.pop();
    for seg in target.split('/') {
        match seg {
            ".." => {
                segments.pop();
            }
            "." | "" => {}
            other => segments.push(other),
        }
    }
    segments.join("/")
}
