//! A small owned XML tree over `quick-xml` events.
//!
//! OOXML parts are modified in place and written back, so the tree keeps
//! everything it reads: declaration, attribute order, namespace prefixes and
//! whitespace-only text nodes. Element names are kept fully qualified
//! (`p:sp`, `a:t`); [`Element::local_name`] strips the prefix for matching.

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::PptxError;

/// A node inside an [`Element`].
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    /// Comments and processing instructions, written back verbatim.
    Raw(String),
}

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// A parsed XML part: optional declaration plus the root element.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub declaration: Option<Declaration>,
    pub root: Element,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

impl Default for Declaration {
    fn default() -> Self {
        Self {
            version: "1.0".into(),
            encoding: Some("UTF-8".into()),
            standalone: Some("yes".into()),
        }
    }
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder-style child append.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((key.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, key: &str) {
        self.attrs.retain(|(k, _)| k != key);
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First child element with the given local name.
    pub fn child(&self, local: &str) -> Option<&Element> {
        self.elements().find(|e| e.local_name() == local)
    }

    pub fn child_mut(&mut self, local: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.local_name() == local)
    }

    /// Follow a chain of local names, e.g. `["spPr", "xfrm", "off"]`.
    pub fn descend(&self, path: &[&str]) -> Option<&Element> {
        path.iter().try_fold(self, |el, local| el.child(local))
    }

    pub fn descend_mut(&mut self, path: &[&str]) -> Option<&mut Element> {
        let mut current = self;
        for local in path {
            current = current.child_mut(local)?;
        }
        Some(current)
    }

    /// Index (into `children`) of the first element with the given local name.
    pub fn position(&self, local: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|n| matches!(n, Node::Element(e) if e.local_name() == local))
    }

    /// Remove every child element whose local name is in `locals`.
    pub fn remove_children(&mut self, locals: &[&str]) {
        self.children
            .retain(|n| !matches!(n, Node::Element(e) if locals.contains(&e.local_name())));
    }

    /// Return the child named `local`, creating it if absent.
    ///
    /// A new child is placed according to `order`: before the first existing
    /// sibling whose local name comes later in `order`. Siblings not listed
    /// in `order` are treated as coming after every listed name.
    pub fn child_or_insert(&mut self, name: &str, order: &[&str]) -> &mut Element {
        let local = local_name(name).to_string();
        match self.position(&local) {
            Some(idx) => self.element_at(idx),
            None => {
                let idx = self.ordered_insert_index(&local, order);
                self.insert_child(idx, Element::new(name))
            }
        }
    }

    /// Insert `child` at `children[idx]` and return it.
    pub fn insert_child(&mut self, idx: usize, child: Element) -> &mut Element {
        self.children.insert(idx, Node::Element(child));
        self.element_at(idx)
    }

    fn element_at(&mut self, idx: usize) -> &mut Element {
        match &mut self.children[idx] {
            Node::Element(e) => e,
            _ => unreachable!("index points at an element node"),
        }
    }

    /// Insert `child` at its schema position given by `order`.
    pub fn insert_ordered(&mut self, child: Element, order: &[&str]) {
        let idx = self.ordered_insert_index(child.local_name(), order);
        self.children.insert(idx, Node::Element(child));
    }

    fn ordered_insert_index(&self, local: &str, order: &[&str]) -> usize {
        let rank = |name: &str| order.iter().position(|o| *o == name).unwrap_or(order.len());
        let own = rank(local);
        self.children
            .iter()
            .position(|n| matches!(n, Node::Element(e) if rank(e.local_name()) > own))
            .unwrap_or(self.children.len())
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(el: &Element, out: &mut String) {
    for node in &el.children {
        match node {
            Node::Text(t) | Node::CData(t) => out.push_str(t),
            Node::Element(e) => collect_text(e, out),
            Node::Raw(_) => {}
        }
    }
}

pub fn local_name(qualified: &str) -> &str {
    qualified
        .rsplit_once(':')
        .map(|(_, local)| local)
        .unwrap_or(qualified)
}

// ── Parsing ──────────────────────────────────────────────────────────────

impl Document {
    pub fn new(root: Element) -> Self {
        Self {
            declaration: Some(Declaration::default()),
            root,
        }
    }

    /// Parse a complete XML part.
    pub fn parse(xml: &str) -> Result<Self, PptxError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut declaration = None;
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| xml_error(&reader, e.to_string()))?;
            match event {
                Event::Decl(decl) => {
                    let version = decl
                        .version()
                        .map(|v| String::from_utf8_lossy(&v).into_owned())
                        .unwrap_or_else(|_| "1.0".into());
                    let encoding = decl
                        .encoding()
                        .and_then(|r| r.ok())
                        .map(|v| String::from_utf8_lossy(&v).into_owned());
                    let standalone = decl
                        .standalone()
                        .and_then(|r| r.ok())
                        .map(|v| String::from_utf8_lossy(&v).into_owned());
                    declaration = Some(Declaration {
                        version,
                        encoding,
                        standalone,
                    });
                }
                Event::Start(start) => {
                    stack.push(element_from_start(&reader, &start)?);
                }
                Event::Empty(start) => {
                    let el = element_from_start(&reader, &start)?;
                    attach(&mut stack, &mut root, el);
                }
                Event::End(_) => {
                    let el = stack
                        .pop()
                        .ok_or_else(|| xml_error(&reader, "unbalanced end tag".into()))?;
                    attach(&mut stack, &mut root, el);
                }
                Event::Text(text) => {
                    if let Some(parent) = stack.last_mut() {
                        let value = text
                            .unescape()
                            .map_err(|e| xml_error(&reader, e.to_string()))?;
                        parent.children.push(Node::Text(value.into_owned()));
                    }
                }
                Event::CData(data) => {
                    if let Some(parent) = stack.last_mut() {
                        let value = String::from_utf8_lossy(&data).into_owned();
                        parent.children.push(Node::CData(value));
                    }
                }
                Event::Comment(c) => {
                    if let Some(parent) = stack.last_mut() {
                        let body = String::from_utf8_lossy(&c).into_owned();
                        parent.children.push(Node::Raw(format!("<!--{body}-->")));
                    }
                }
                Event::PI(pi) => {
                    if let Some(parent) = stack.last_mut() {
                        let body = String::from_utf8_lossy(&pi).into_owned();
                        parent.children.push(Node::Raw(format!("<?{body}?>")));
                    }
                }
                Event::DocType(_) => {}
                Event::Eof => break,
            }
        }

        if !stack.is_empty() {
            return Err(PptxError::Xml("unexpected end of document".into()));
        }
        let root = root.ok_or_else(|| PptxError::Xml("document has no root element".into()))?;
        Ok(Self { declaration, root })
    }

    /// Serialise back to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PptxError> {
        let mut writer = Writer::new(Vec::new());
        if let Some(decl) = &self.declaration {
            writer
                .write_event(Event::Decl(BytesDecl::new(
                    &decl.version,
                    decl.encoding.as_deref(),
                    decl.standalone.as_deref(),
                )))
                .map_err(|e| PptxError::Xml(e.to_string()))?;
            // PowerPoint writes the declaration on its own line.
            writer.get_mut().extend_from_slice(b"\r\n");
        }
        write_element(&mut writer, &self.root)?;
        Ok(writer.into_inner())
    }
}

fn element_from_start(reader: &Reader<&[u8]>, start: &BytesStart<'_>) -> Result<Element, PptxError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut el = Element::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| xml_error(reader, e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| xml_error(reader, e.to_string()))?
            .into_owned();
        el.attrs.push((key, value));
    }
    Ok(el)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, el: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(el)),
        None => *root = Some(el),
    }
}

fn xml_error(reader: &Reader<&[u8]>, detail: String) -> PptxError {
    PptxError::Xml(format!("at byte {}: {}", reader.buffer_position(), detail))
}

// ── Writing ──────────────────────────────────────────────────────────────

fn write_element(writer: &mut Writer<Vec<u8>>, el: &Element) -> Result<(), PptxError> {
    let mut start = BytesStart::new(el.name.as_str());
    for (k, v) in &el.attrs {
        start.push_attribute((k.as_str(), v.as_str()));
    }

    if el.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| PptxError::Xml(e.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| PptxError::Xml(e.to_string()))?;
    for child in &el.children {
        match child {
            Node::Element(e) => write_element(writer, e)?,
            Node::Text(t) => writer
                .write_event(Event::Text(BytesText::new(t)))
                .map_err(|e| PptxError::Xml(e.to_string()))?,
            Node::CData(t) => writer
                .write_event(Event::CData(BytesCData::new(t.as_str())))
                .map_err(|e| PptxError::Xml(e.to_string()))?,
            Node::Raw(raw) => writer.get_mut().extend_from_slice(raw.as_bytes()),
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(el.name.as_str())))
        .map_err(|e| PptxError::Xml(e.to_string()))
}
