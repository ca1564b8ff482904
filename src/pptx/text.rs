//! Text frames (`p:txBody`): paragraphs, runs and run-level fonts.
//!
//! The mutable wrappers ([`TextFrame`], [`Paragraph`], [`Run`], [`Font`])
//! borrow the underlying XML and edit it in place. [`ParagraphProps`] is an
//! owned, read-only snapshot used for inspection and tests.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::xml::{Element, Node};
use super::PptxError;

const NS_A: &str = "a:";

/// Child order inside `a:p`.
const P_ORDER: &[&str] = &["pPr", "r", "br", "fld", "endParaRPr"];

/// Child order inside `a:r`.
const R_ORDER: &[&str] = &["rPr", "t"];

/// Child order inside `a:rPr` (CT_TextCharacterProperties).
const RPR_ORDER: &[&str] = &[
    "ln",
    "noFill",
    "solidFill",
    "gradFill",
    "blipFill",
    "pattFill",
    "grpFill",
    "effectLst",
    "effectDag",
    "highlight",
    "uLnTx",
    "uLn",
    "uFillTx",
    "uFill",
    "latin",
    "ea",
    "cs",
    "sym",
    "hlinkClick",
    "hlinkMouseOver",
    "rtl",
    "extLst",
];

const FILLS: &[&str] = &["noFill", "solidFill", "gradFill", "blipFill", "pattFill", "grpFill"];

// ── Value types ──────────────────────────────────────────────────────────

/// Paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// Parse a configuration name. Unknown names map to [`Alignment::Left`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "center" | "centre" | "middle" => Alignment::Center,
            "right" => Alignment::Right,
            "justify" => Alignment::Justify,
            _ => Alignment::Left,
        }
    }

    /// Value of the `algn` attribute.
    pub fn as_ooxml(self) -> &'static str {
        match self {
            Alignment::Left => "l",
            Alignment::Center => "ctr",
            Alignment::Right => "r",
            Alignment::Justify => "just",
        }
    }

    fn from_ooxml(value: &str) -> Option<Self> {
        match value {
            "l" => Some(Alignment::Left),
            "ctr" => Some(Alignment::Center),
            "r" => Some(Alignment::Right),
            "just" => Some(Alignment::Justify),
            _ => None,
        }
    }
}

/// A 24-bit sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RgbColor(pub u8, pub u8, pub u8);

impl RgbColor {
    pub const BLACK: RgbColor = RgbColor(0, 0, 0);
    pub const WHITE: RgbColor = RgbColor(255, 255, 255);

    /// Parse `#RRGGBB` or `RRGGBB` (case-insensitive).
    pub fn from_hex(hex: &str) -> Result<Self, PptxError> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(PptxError::InvalidColor(hex.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| PptxError::InvalidColor(hex.to_string()))
        };
        Ok(RgbColor(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Upper-case hex without `#`, as stored in `a:srgbClr@val`.
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

impl FromStr for RgbColor {
    type Err = PptxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RgbColor::from_hex(s)
    }
}

impl Serialize for RgbColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RgbColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        RgbColor::from_hex(&raw).map_err(serde::de::Error::custom)
    }
}

// ── Read-only snapshots ──────────────────────────────────────────────────

/// Run-level font properties as found in `a:rPr`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FontProps {
    pub name: Option<String>,
    /// Whole points.
    pub size: Option<u32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub color: Option<RgbColor>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunProps {
    pub text: String,
    pub font: FontProps,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParagraphProps {
    pub alignment: Option<Alignment>,
    pub runs: Vec<RunProps>,
}

impl ParagraphProps {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Snapshot every paragraph of a `p:txBody`.
pub fn describe(body: &Element) -> Vec<ParagraphProps> {
    body.elements()
        .filter(|e| e.local_name() == "p")
        .map(|p| ParagraphProps {
            alignment: p
                .child("pPr")
                .and_then(|ppr| ppr.attr("algn"))
                .and_then(Alignment::from_ooxml),
            runs: p
                .elements()
                .filter(|e| e.local_name() == "r")
                .map(|r| RunProps {
                    text: r.child("t").map(Element::text).unwrap_or_default(),
                    font: r.child("rPr").map(font_props).unwrap_or_default(),
                })
                .collect(),
        })
        .collect()
}

/// Plain text of a `p:txBody`, one line per paragraph.
pub fn plain_text(body: &Element) -> String {
    describe(body)
        .iter()
        .map(ParagraphProps::text)
        .collect::<Vec<_>>()
        .join("\n")
}

fn font_props(rpr: &Element) -> FontProps {
    FontProps {
        name: rpr
            .child("latin")
            .and_then(|l| l.attr("typeface"))
            .map(str::to_string),
        size: rpr
            .attr("sz")
            .and_then(|sz| sz.parse::<u32>().ok())
            .map(|hundredths| hundredths / 100),
        bold: rpr.attr("b").map(parse_bool),
        italic: rpr.attr("i").map(parse_bool),
        color: rpr
            .descend(&["solidFill", "srgbClr"])
            .and_then(|c| c.attr("val"))
            .and_then(|v| RgbColor::from_hex(v).ok()),
    }
}

fn parse_bool(v: &str) -> bool {
    matches!(v, "1" | "true")
}

fn ooxml_bool(v: bool) -> &'static str {
    if v {
        "1"
    } else {
        "0"
    }
}

// ── Mutable wrappers ─────────────────────────────────────────────────────

/// Mutable view of a `p:txBody`.
pub struct TextFrame<'a> {
    body: &'a mut Element,
}

impl<'a> TextFrame<'a> {
    pub(crate) fn new(body: &'a mut Element) -> Self {
        Self { body }
    }

    pub fn text(&self) -> String {
        plain_text(&*self.body)
    }

    pub fn paragraphs_snapshot(&self) -> Vec<ParagraphProps> {
        describe(&*self.body)
    }

    /// Replace all text: one paragraph per `\n`-separated line, one plain run
    /// per non-empty line. Existing paragraphs and their formatting are
    /// discarded; `a:bodyPr` and `a:lstStyle` are kept.
    pub fn set_text(&mut self, text: &str) {
        self.body.remove_children(&["p"]);
        for line in text.split('\n') {
            let mut p = Element::new(format!("{NS_A}p"));
            if !line.is_empty() {
                p.children
                    .push(Node::Element(new_run(line.trim_end_matches('\r'))));
            }
            self.body.children.push(Node::Element(p));
        }
    }

    /// Remove all text, leaving a single empty paragraph.
    pub fn clear(&mut self) {
        self.set_text("");
    }

    pub fn paragraphs(&mut self) -> Vec<Paragraph<'_>> {
        self.body
            .elements_mut()
            .filter(|e| e.local_name() == "p")
            .map(|el| Paragraph { el })
            .collect()
    }

    /// The first paragraph, created if the body has none.
    pub fn first_paragraph(&mut self) -> Paragraph<'_> {
        let el = self
            .body
            .child_or_insert(&format!("{NS_A}p"), &["bodyPr", "lstStyle", "p"]);
        Paragraph { el }
    }
}

/// Mutable view of an `a:p`.
pub struct Paragraph<'a> {
    el: &'a mut Element,
}

impl<'a> Paragraph<'a> {
    pub fn alignment(&self) -> Option<Alignment> {
        self.el
            .child("pPr")
            .and_then(|p| p.attr("algn"))
            .and_then(Alignment::from_ooxml)
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.el
            .child_or_insert(&format!("{NS_A}pPr"), P_ORDER)
            .set_attr("algn", alignment.as_ooxml());
    }

    /// Remove runs, breaks and fields; paragraph properties stay.
    pub fn clear(&mut self) {
        self.el.remove_children(&["r", "br", "fld"]);
    }

    /// Append a run (before any `a:endParaRPr`).
    pub fn add_run(&mut self, text: &str) -> Run<'_> {
        let idx = self.el.position("endParaRPr").unwrap_or(self.el.children.len());
        Run {
            el: self.el.insert_child(idx, new_run(text)),
        }
    }

    pub fn runs(&mut self) -> Vec<Run<'_>> {
        self.el
            .elements_mut()
            .filter(|e| e.local_name() == "r")
            .map(|el| Run { el })
            .collect()
    }

    pub fn text(&self) -> String {
        self.el
            .elements()
            .filter(|e| e.local_name() == "r")
            .filter_map(|r| r.child("t"))
            .map(Element::text)
            .collect()
    }
}

/// Mutable view of an `a:r`.
pub struct Run<'a> {
    el: &'a mut Element,
}

impl<'a> Run<'a> {
    pub fn text(&self) -> String {
        self.el.child("t").map(Element::text).unwrap_or_default()
    }

    pub fn font(&mut self) -> Font<'_> {
        Font {
            rpr: self.el.child_or_insert(&format!("{NS_A}rPr"), R_ORDER),
        }
    }
}

/// Mutable view of an `a:rPr`.
pub struct Font<'a> {
    rpr: &'a mut Element,
}

impl<'a> Font<'a> {
    /// Font size in whole points.
    pub fn set_size(&mut self, points: u32) -> &mut Self {
        self.rpr.set_attr("sz", (points * 100).to_string());
        self
    }

    pub fn set_bold(&mut self, bold: bool) -> &mut Self {
        self.rpr.set_attr("b", ooxml_bool(bold));
        self
    }

    pub fn set_italic(&mut self, italic: bool) -> &mut Self {
        self.rpr.set_attr("i", ooxml_bool(italic));
        self
    }

    /// Latin typeface.
    pub fn set_name(&mut self, family: &str) -> &mut Self {
        self.rpr
            .child_or_insert(&format!("{NS_A}latin"), RPR_ORDER)
            .set_attr("typeface", family);
        self
    }

    /// Solid fill colour; replaces any existing fill.
    pub fn set_color(&mut self, color: RgbColor) -> &mut Self {
        self.rpr.remove_children(FILLS);
        let fill = Element::new(format!("{NS_A}solidFill"))
            .with_child(Element::new(format!("{NS_A}srgbClr")).with_attr("val", color.to_hex()));
        self.rpr.insert_ordered(fill, RPR_ORDER);
        self
    }

    pub fn props(&self) -> FontProps {
        font_props(&*self.rpr)
    }
}

fn new_run(text: &str) -> Element {
    Element::new(format!("{NS_A}r"))
        .with_child(
            Element::new(format!("{NS_A}rPr"))
                .with_attr("lang", "en-US")
                .with_attr("dirty", "0"),
        )
        .with_child(Element::new(format!("{NS_A}t")).with_text(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pptx::xml::Document;

    fn body() -> Element {
        Document::parse(
            r#"<p:txBody xmlns:a="a" xmlns:p="p"><a:bodyPr/><a:lstStyle/><a:p><a:pPr algn="ctr"/><a:r><a:rPr sz="1200"/><a:t>old</a:t></a:r><a:endParaRPr/></a:p><a:p><a:r><a:t>second</a:t></a:r></a:p></p:txBody>"#,
        )
        .unwrap()
        .root
    }

    #[test]
    fn set_text_replaces_every_paragraph() {
        let mut el = body();
        let mut frame = TextFrame::new(&mut el);
        frame.set_text("new text");
        assert_eq!(frame.text(), "new text");
        let snap = frame.paragraphs_snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].alignment, None);
        assert!(el.child("bodyPr").is_some());
        assert!(el.child("lstStyle").is_some());
    }

    #[test]
    fn set_text_splits_lines_into_paragraphs() {
        let mut el = body();
        TextFrame::new(&mut el).set_text("one\ntwo\n");
        let snap = describe(&el);
        assert_eq!(snap.len(), 3);
        assert_eq!(snap[1].text(), "two");
        assert!(snap[2].runs.is_empty());
    }

    #[test]
    fn font_properties_round_trip_through_snapshot() {
        let mut el = body();
        let mut frame = TextFrame::new(&mut el);
        frame.set_text("styled");
        for mut p in frame.paragraphs() {
            p.set_alignment(Alignment::Justify);
            for mut r in p.runs() {
                r.font()
                    .set_size(18)
                    .set_bold(true)
                    .set_italic(false)
                    .set_name("Futura")
                    .set_color(RgbColor(0x05, 0xBB, 0xD6));
            }
        }
        let snap = describe(&el);
        assert_eq!(snap[0].alignment, Some(Alignment::Justify));
        let font = &snap[0].runs[0].font;
        assert_eq!(font.size, Some(18));
        assert_eq!(font.bold, Some(true));
        assert_eq!(font.italic, Some(false));
        assert_eq!(font.name.as_deref(), Some("Futura"));
        assert_eq!(font.color, Some(RgbColor(0x05, 0xBB, 0xD6)));
    }

    #[test]
    fn fill_precedes_latin_in_rpr() {
        let mut el = body();
        let mut frame = TextFrame::new(&mut el);
        frame.set_text("x");
        let mut p = frame.first_paragraph();
        let mut runs = p.runs();
        runs[0].font().set_name("Aptos").set_color(RgbColor::WHITE);
        let rpr = el.descend(&["p", "r", "rPr"]).unwrap();
        let order: Vec<_> = rpr.elements().map(|e| e.local_name().to_string()).collect();
        assert_eq!(order, ["solidFill", "latin"]);
    }

    #[test]
    fn add_run_goes_before_end_paragraph_properties() {
        let mut el = body();
        let mut frame = TextFrame::new(&mut el);
        let mut p = frame.first_paragraph();
        p.clear();
        p.add_run("a");
        p.add_run("b");
        assert_eq!(p.text(), "ab");
        let para = el.child("p").unwrap();
        let order: Vec<_> = para.elements().map(|e| e.local_name().to_string()).collect();
        assert_eq!(order, ["pPr", "r", "r", "endParaRPr"]);
    }

    #[test]
    fn hex_colours() {
        assert_eq!(RgbColor::from_hex("#ffffff").unwrap(), RgbColor::WHITE);
        assert_eq!(RgbColor::from_hex("05bbd6").unwrap(), RgbColor(5, 187, 214));
        assert!(RgbColor::from_hex("#fff").is_err());
        assert!(RgbColor::from_hex("#gggggg").is_err());
        assert_eq!(RgbColor(255, 140, 0).to_string(), "#FF8C00");
    }

    #[test]
    fn alignment_names() {
        assert_eq!(Alignment::from_name("Center"), Alignment::Center);
        assert_eq!(Alignment::from_name("middle"), Alignment::Center);
        assert_eq!(Alignment::from_name("justify"), Alignment::Justify);
        assert_eq!(Alignment::from_name("diagonal"), Alignment::Left);
    }
}
