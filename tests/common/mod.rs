//! Shared helpers for integration tests: synthetic poster templates, figure
//! images and sample content.

#![allow(dead_code)]

use edgequake_poster::populate::find_shape;
use edgequake_poster::pptx::{Geometry, Presentation, Shape};
use edgequake_poster::{ExtractedContent, Field};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slides/slide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/></Types>"#;

const PRESENTATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldIdLst><p:sldId id="256" r:id="rId2"/></p:sldIdLst><p:sldSz cx="32918400" cy="46812200"/></p:presentation>"#;

const PRESENTATION_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/></Relationships>"#;

const SLIDE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"></Relationships>"#;

/// Builds a one-slide template from named shapes.
#[derive(Debug, Default, Clone)]
pub struct TemplateBuilder {
    tree: Vec<String>,
    next_id: u32,
}

impl TemplateBuilder {
    pub fn new() -> Self {
        Self {
            tree: Vec::new(),
            next_id: 2,
        }
    }

    fn id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn text_box(mut self, name: &str, g: Geometry) -> Self {
        let id = self.id();
        self.tree.push(text_box_xml(id, name, g));
        self
    }

    /// A rectangle without a text body, as picture placeholders usually are.
    pub fn placeholder(mut self, name: &str, g: Geometry) -> Self {
        let id = self.id();
        self.tree.push(format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:sp>"#,
            g.left.0, g.top.0, g.width.0, g.height.0
        ));
        self
    }

    /// A group of text boxes.
    pub fn group(mut self, name: &str, members: &[(&str, Geometry)]) -> Self {
        let id = self.id();
        let inner: String = members
            .iter()
            .map(|(n, g)| {
                let mid = self.id();
                text_box_xml(mid, n, *g)
            })
            .collect();
        self.tree.push(format!(
            r#"<p:grpSp><p:nvGrpSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="100" cy="100"/><a:chOff x="0" y="0"/><a:chExt cx="100" cy="100"/></a:xfrm></p:grpSpPr>{inner}</p:grpSp>"#
        ));
        self
    }

    pub fn bytes(&self) -> Vec<u8> {
        let slide = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld></p:sld>"#,
            self.tree.concat()
        );
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, data) in [
            ("[Content_Types].xml", CONTENT_TYPES),
            ("ppt/presentation.xml", PRESENTATION),
            ("ppt/_rels/presentation.xml.rels", PRESENTATION_RELS),
            ("ppt/slides/slide1.xml", slide.as_str()),
            ("ppt/slides/_rels/slide1.xml.rels", SLIDE_RELS),
        ] {
            writer.start_file(name, options).unwrap();
            writer.write_all(data.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    /// Write the template as `<dir>/<file_name>` and return its path.
    pub fn write(&self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        std::fs::write(&path, self.bytes()).unwrap();
        path
    }
}

fn text_box_xml(id: u32, name: &str, g: Geometry) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US" sz="1000"/><a:t>Lorem ipsum</a:t></a:r></a:p></p:txBody></p:sp>"#,
        g.left.0, g.top.0, g.width.0, g.height.0
    )
}

/// Geometry of the n-th figure placeholder (1-based).
pub fn figure_geometry(n: i64) -> Geometry {
    Geometry::new(1_000_000 * n, 30_000_000 + 100_000 * n, 8_000_000 + n, 6_000_000 + n)
}

/// A template with every standard box. Introduction and Methods sit inside
/// a group; all four figure placeholders and description boxes exist.
pub fn full_template() -> TemplateBuilder {
    let row = |i: i64| Geometry::new(1_000_000, 1_000_000 + 2_000_000 * i, 30_000_000, 1_800_000);
    TemplateBuilder::new()
        .text_box("HeadlineBox", row(0))
        .text_box("TitleBox", row(1))
        .text_box("AuthorBox", row(2))
        .text_box("AffiliationBox", row(3))
        .text_box("SubtitleBox", row(4))
        .group(
            "LeftColumn",
            &[("IntroductionBox", row(5)), ("MethodsBox", row(6))],
        )
        .text_box("ObjectiveBox", row(7))
        .text_box("ResultsBox", row(8))
        .text_box("DiscussionBox", row(9))
        .text_box("ConclusionBox", row(10))
        .text_box("ReferencesBox", row(11))
        .placeholder("Fig1PlaceholderLarge", figure_geometry(1))
        .placeholder("Fig2PlaceholderLarge", figure_geometry(2))
        .placeholder("Fig3PlaceholderSmall", figure_geometry(3))
        .placeholder("Fig4PlaceholderSmall", figure_geometry(4))
        .text_box("FigureDesc1", row(12))
        .text_box("FigureDesc2", row(13))
        .text_box("FigureDesc3", row(14))
        .text_box("FigureDesc4", row(15))
}

/// A PNG signature plus an IHDR chunk, padded to `len` bytes.
pub fn png(len: usize) -> Vec<u8> {
    let mut bytes = vec![
        0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13, b'I', b'H', b'D', b'R', 0, 0,
        0, 1, 0, 0, 0, 1, 8, 6, 0, 0, 0, 0x1F, 0x15, 0xC4, 0x89,
    ];
    bytes.resize(len.max(bytes.len()), 0);
    bytes
}

pub fn write_png(dir: &Path, name: &str, len: usize) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, png(len)).unwrap();
    path
}

/// Content for every field, with a short title.
pub fn sample_content() -> ExtractedContent {
    ExtractedContent::new()
        .with(Field::Headline, "DIGITAL HEALTH *BOOSTS* OUTCOMES")
        .with(Field::Title, "App-Based Self-Management for Chronic Low Back Pain")
        .with(Field::Authors, "Jane Smith, Ali Rahman, Maria Costa")
        .with(Field::Affiliations, "1 University of Somewhere; 2 City Hospital")
        .with(Field::Subtitle, "A randomised controlled trial")
        .with(Field::Introduction, "Chronic low back pain is common.")
        .with(Field::Objective, "To test an app.")
        .with(Field::Methods, "We randomised 120 adults.")
        .with(Field::Results, "Pain fell by 30%.")
        .with(Field::Discussion, "Effects were durable.")
        .with(Field::Conclusions, "Apps help.")
        .with(Field::References, "1. Smith J. Pain. 2020.\n2. Doe A. Apps. 2021.")
}

/// Find a shape by name at the top level or one group level down.
pub fn shape<'a>(pres: &'a Presentation, name: &str) -> Option<&'a Shape> {
    let tree = pres.slide().shapes();
    find_shape(tree, name).and_then(|path| tree.get(path))
}

/// Text of the named shape; panics if the shape or its text body is missing.
pub fn text_of(pres: &Presentation, name: &str) -> String {
    shape(pres, name)
        .and_then(Shape::text)
        .unwrap_or_else(|| panic!("no text shape named {name}"))
}
