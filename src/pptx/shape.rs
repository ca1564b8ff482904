//! Slide shape tree.
//!
//! `p:spTree` and every `p:grpSp` below it are parsed into a [`GroupShape`]:
//! an ordered list of members, each either a [`Shape`] or an XML node that is
//! not a shape (`p:nvGrpSpPr`, `p:grpSpPr`, `p:extLst`, whitespace). Shapes
//! are addressed by their ordinal among shape members, so non-shape nodes
//! never shift a [`ShapePath`].

use serde::Serialize;

use super::text::{self, ParagraphProps, TextFrame};
use super::units::{Emu, Geometry};
use super::xml::{Element, Node};

/// What a shape is, decided once from its element name.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    /// `p:sp`: an autoshape or text box.
    Text,
    /// `p:pic`.
    Picture,
    /// `p:grpSp` with its child shapes.
    Group(GroupShape),
    /// Connectors, graphic frames, content parts. Preserved verbatim.
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    /// For groups, the bare `p:grpSp` element. Its children, header
    /// included, are moved into [`ShapeKind::Group`].
    element: Element,
    kind: ShapeKind,
}

#[derive(Debug, Clone, PartialEq)]
enum Member {
    Shape(Shape),
    Node(Node),
}

/// A container of shapes: the slide's `p:spTree` or a `p:grpSp`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupShape {
    members: Vec<Member>,
}

/// Address of a shape in a slide: a top-level index and, for shapes inside a
/// group, the index within that group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ShapePath {
    pub top: usize,
    pub child: Option<usize>,
}

impl ShapePath {
    pub fn top(index: usize) -> Self {
        Self { top: index, child: None }
    }

    pub fn nested(group: usize, index: usize) -> Self {
        Self {
            top: group,
            child: Some(index),
        }
    }
}

const SHAPE_ELEMENTS: &[&str] = &["sp", "pic", "grpSp", "cxnSp", "graphicFrame", "contentPart"];

const NV_PROPS: &[&str] = &[
    "nvSpPr",
    "nvPicPr",
    "nvGrpSpPr",
    "nvCxnSpPr",
    "nvGraphicFramePr",
    "nvContentPartPr",
];

// ── Shape ────────────────────────────────────────────────────────────────

impl Shape {
    pub(crate) fn from_element(mut element: Element) -> Self {
        let kind = match element.local_name() {
            "sp" => ShapeKind::Text,
            "pic" => ShapeKind::Picture,
            "grpSp" => {
                let children = std::mem::take(&mut element.children);
                ShapeKind::Group(GroupShape::from_nodes(children))
            }
            _ => ShapeKind::Other,
        };
        Self { element, kind }
    }

    pub(crate) fn into_element(self) -> Element {
        let mut element = self.element;
        if let ShapeKind::Group(group) = self.kind {
            element.children = group.into_nodes();
        }
        element
    }

    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    /// A property child of the shape. Group properties live in the group's
    /// header members.
    fn props(&self, local: &str) -> Option<&Element> {
        match &self.kind {
            ShapeKind::Group(group) => group.header(local),
            _ => self.element.child(local),
        }
    }

    fn c_nv_pr(&self) -> Option<&Element> {
        NV_PROPS
            .iter()
            .find_map(|nv| self.props(nv)?.child("cNvPr"))
    }

    /// The shape name from `cNvPr@name` (empty when absent).
    pub fn name(&self) -> &str {
        self.c_nv_pr().and_then(|c| c.attr("name")).unwrap_or("")
    }

    /// The drawing id from `cNvPr@id`.
    pub fn id(&self) -> Option<u32> {
        self.c_nv_pr()
            .and_then(|c| c.attr("id"))
            .and_then(|id| id.parse().ok())
    }

    /// True when the shape carries an editable text body.
    pub fn has_text_frame(&self) -> bool {
        matches!(self.kind, ShapeKind::Text) && self.element.child("txBody").is_some()
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, ShapeKind::Group(_))
    }

    pub fn as_group(&self) -> Option<&GroupShape> {
        match &self.kind {
            ShapeKind::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut GroupShape> {
        match &mut self.kind {
            ShapeKind::Group(g) => Some(g),
            _ => None,
        }
    }

    /// Position and size from the shape's `a:xfrm`. Missing values read as 0.
    pub fn geometry(&self) -> Geometry {
        let props = if self.is_group() { "grpSpPr" } else { "spPr" };
        let xfrm = self
            .props(props)
            .and_then(|p| p.child("xfrm"))
            .or_else(|| self.element.child("xfrm"));
        let off = xfrm.and_then(|x| x.child("off"));
        let ext = xfrm.and_then(|x| x.child("ext"));
        Geometry {
            left: Emu::parse(off.and_then(|o| o.attr("x"))),
            top: Emu::parse(off.and_then(|o| o.attr("y"))),
            width: Emu::parse(ext.and_then(|e| e.attr("cx"))),
            height: Emu::parse(ext.and_then(|e| e.attr("cy"))),
        }
    }

    /// Plain text of the text body, one line per paragraph.
    pub fn text(&self) -> Option<String> {
        self.element.child("txBody").map(text::plain_text)
    }

    /// Paragraph and run snapshot of the text body (empty without one).
    pub fn paragraphs(&self) -> Vec<ParagraphProps> {
        self.element
            .child("txBody")
            .map(text::describe)
            .unwrap_or_default()
    }

    pub fn text_frame_mut(&mut self) -> Option<TextFrame<'_>> {
        if !matches!(self.kind, ShapeKind::Text) {
            return None;
        }
        self.element.child_mut("txBody").map(TextFrame::new)
    }

    /// Largest `cNvPr@id` in this shape and, for groups, its descendants.
    fn max_id(&self) -> u32 {
        let own = self.id().unwrap_or(0);
        match &self.kind {
            ShapeKind::Group(g) => own.max(g.max_id()),
            _ => own,
        }
    }
}

// ── GroupShape ───────────────────────────────────────────────────────────

impl GroupShape {
    pub(crate) fn from_nodes(nodes: Vec<Node>) -> Self {
        let members = nodes
            .into_iter()
            .map(|node| match node {
                Node::Element(el) if SHAPE_ELEMENTS.contains(&el.local_name()) => {
                    Member::Shape(Shape::from_element(el))
                }
                other => Member::Node(other),
            })
            .collect();
        Self { members }
    }

    pub(crate) fn into_nodes(self) -> Vec<Node> {
        self.members
            .into_iter()
            .map(|m| match m {
                Member::Shape(s) => Node::Element(s.into_element()),
                Member::Node(n) => n,
            })
            .collect()
    }

    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.members.iter().filter_map(|m| match m {
            Member::Shape(s) => Some(s),
            Member::Node(_) => None,
        })
    }

    pub fn shapes_mut(&mut self) -> impl Iterator<Item = &mut Shape> {
        self.members.iter_mut().filter_map(|m| match m {
            Member::Shape(s) => Some(s),
            Member::Node(_) => None,
        })
    }

    /// A non-shape member element such as `p:nvGrpSpPr` or `p:grpSpPr`.
    pub(crate) fn header(&self, local: &str) -> Option<&Element> {
        self.members.iter().find_map(|m| match m {
            Member::Node(Node::Element(e)) if e.local_name() == local => Some(e),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.shapes().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index into `members` of the `index`-th shape.
    fn member_index(&self, index: usize) -> Option<usize> {
        self.members
            .iter()
            .enumerate()
            .filter(|(_, m)| matches!(m, Member::Shape(_)))
            .nth(index)
            .map(|(i, _)| i)
    }

    pub fn get(&self, path: ShapePath) -> Option<&Shape> {
        let top = self.shapes().nth(path.top)?;
        match path.child {
            None => Some(top),
            Some(child) => top.as_group()?.shapes().nth(child),
        }
    }

    pub fn get_mut(&mut self, path: ShapePath) -> Option<&mut Shape> {
        let top = self.shapes_mut().nth(path.top)?;
        match path.child {
            None => Some(top),
            Some(child) => top.as_group_mut()?.shapes_mut().nth(child),
        }
    }

    /// Detach and return the shape at `path`.
    pub fn remove(&mut self, path: ShapePath) -> Option<Shape> {
        match path.child {
            None => self.remove_at(path.top),
            Some(child) => self
                .shapes_mut()
                .nth(path.top)?
                .as_group_mut()?
                .remove_at(child),
        }
    }

    fn remove_at(&mut self, index: usize) -> Option<Shape> {
        let idx = self.member_index(index)?;
        match self.members.remove(idx) {
            Member::Shape(s) => Some(s),
            Member::Node(_) => None,
        }
    }

    /// Put `shape` at `path`. The index may equal the container's shape
    /// count, which appends after the last shape.
    pub fn insert(&mut self, path: ShapePath, shape: Shape) -> bool {
        match path.child {
            None => self.insert_at(path.top, shape),
            Some(child) => match self.shapes_mut().nth(path.top).and_then(Shape::as_group_mut) {
                Some(group) => group.insert_at(child, shape),
                None => false,
            },
        }
    }

    fn insert_at(&mut self, index: usize, shape: Shape) -> bool {
        let idx = match self.member_index(index) {
            Some(idx) => idx,
            None if index == self.len() => self.append_index(),
            None => return false,
        };
        self.members.insert(idx, Member::Shape(shape));
        true
    }

    /// After the last shape, or after the group header when there are none.
    fn append_index(&self) -> usize {
        let last_shape = self
            .members
            .iter()
            .rposition(|m| matches!(m, Member::Shape(_)));
        let last_header = self.members.iter().rposition(|m| {
            matches!(m, Member::Node(Node::Element(e))
                if matches!(e.local_name(), "nvGrpSpPr" | "grpSpPr"))
        });
        match last_shape.or(last_header) {
            Some(i) => i + 1,
            None => 0,
        }
    }

    /// Largest shape id anywhere in the tree; new shapes take `max_id + 1`.
    pub fn max_id(&self) -> u32 {
        let header = self
            .members
            .iter()
            .filter_map(|m| match m {
                Member::Node(Node::Element(e)) if e.local_name() == "nvGrpSpPr" => e
                    .child("cNvPr")
                    .and_then(|c| c.attr("id"))
                    .and_then(|id| id.parse().ok()),
                _ => None,
            })
            .max()
            .unwrap_or(0);
        self.shapes().map(Shape::max_id).fold(header, u32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pptx::xml::Document;

    const TREE: &str = r#"<p:spTree xmlns:p="p" xmlns:a="a">
  <p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
  <p:grpSpPr/>
  <p:sp><p:nvSpPr><p:cNvPr id="2" name="TitleBox"/></p:nvSpPr>
    <p:spPr><a:xfrm><a:off x="100" y="200"/><a:ext cx="300" cy="400"/></a:xfrm></p:spPr>
    <p:txBody><a:bodyPr/><a:p><a:r><a:t>Title</a:t></a:r></a:p></p:txBody></p:sp>
  <p:grpSp><p:nvGrpSpPr><p:cNvPr id="3" name="Group 1"/></p:nvGrpSpPr>
    <p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="10" cy="10"/></a:xfrm></p:grpSpPr>
    <p:sp><p:nvSpPr><p:cNvPr id="7" name="Fig1PlaceholderLarge"/></p:nvSpPr><p:spPr/></p:sp>
  </p:grpSp>
  <p:cxnSp><p:nvCxnSpPr><p:cNvPr id="4" name="Line"/></p:nvCxnSpPr></p:cxnSp>
</p:spTree>"#;

    fn tree() -> GroupShape {
        let root = Document::parse(TREE).unwrap().root;
        GroupShape::from_nodes(root.children)
    }

    #[test]
    fn classifies_shapes() {
        let tree = tree();
        let kinds: Vec<_> = tree
            .shapes()
            .map(|s| match s.kind() {
                ShapeKind::Text => "text",
                ShapeKind::Picture => "pic",
                ShapeKind::Group(_) => "group",
                ShapeKind::Other => "other",
            })
            .collect();
        assert_eq!(kinds, ["text", "group", "other"]);
        let title = tree.get(ShapePath::top(0)).unwrap();
        assert_eq!(title.name(), "TitleBox");
        assert!(title.has_text_frame());
        assert_eq!(title.text().as_deref(), Some("Title"));
        assert_eq!(title.geometry(), Geometry::new(100, 200, 300, 400));
    }

    #[test]
    fn nested_paths_and_max_id() {
        let mut tree = tree();
        let fig = tree.get(ShapePath::nested(1, 0)).unwrap();
        assert_eq!(fig.name(), "Fig1PlaceholderLarge");
        assert!(!fig.has_text_frame());
        assert_eq!(tree.max_id(), 7);

        let removed = tree.remove(ShapePath::nested(1, 0)).unwrap();
        assert_eq!(removed.id(), Some(7));
        assert!(tree.get(ShapePath::top(1)).unwrap().as_group().unwrap().is_empty());
        assert_eq!(tree.max_id(), 4);
    }

    #[test]
    fn groups_read_name_id_and_geometry_from_header() {
        let tree = tree();
        let group = tree.get(ShapePath::top(1)).unwrap();
        assert!(group.is_group());
        assert_eq!(group.name(), "Group 1");
        assert_eq!(group.id(), Some(3));
        assert_eq!(group.geometry(), Geometry::new(0, 0, 10, 10));
        assert!(!group.has_text_frame());
    }

    #[test]
    fn insert_and_serialise_keep_member_order() {
        let mut tree = tree();
        let removed = tree.remove(ShapePath::top(0)).unwrap();
        assert_eq!(tree.len(), 2);
        assert!(tree.insert(ShapePath::top(0), removed));
        assert!(!tree.insert(ShapePath::top(9), Shape::from_element(Element::new("p:sp"))));

        let names: Vec<_> = tree.into_nodes().into_iter().filter_map(|n| match n {
            Node::Element(e) => Some(e.local_name().to_string()),
            _ => None,
        }).collect();
        assert_eq!(names, ["nvGrpSpPr", "grpSpPr", "sp", "grpSp", "cxnSp"]);
    }

    #[test]
    fn append_into_empty_group_goes_after_header() {
        let mut tree = tree();
        tree.remove(ShapePath::nested(1, 0)).unwrap();
        assert!(tree.insert(
            ShapePath::nested(1, 0),
            Shape::from_element(Element::new("p:pic"))
        ));
        let group = tree.get(ShapePath::top(1)).unwrap().as_group().unwrap();
        assert!(matches!(group.shapes().next().unwrap().kind(), ShapeKind::Picture));
    }
}
