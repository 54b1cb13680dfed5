//! A small mutable XML tree for slide, master and layout parts.
//!
//! The tree is built from the `quick-xml` event stream and keeps every event
//! it does not understand as-is, so writing back an untouched node emits
//! the same markup it was read from. Elements are matched by qualified name
//! (`a:t`, `a:rPr`, ...), which is how DrawingML parts are written.

use deck_core::{Error, Result};
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// One node of the tree.
#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    /// Character data, kept escaped as it appeared in the source.
    Text(BytesText<'static>),
    /// Declarations, comments, CDATA, processing instructions.
    Other(Event<'static>),
}

/// An element with its start tag and children.
#[derive(Debug, Clone)]
pub struct Element {
    start: BytesStart<'static>,
    children: Vec<Node>,
    self_closing: bool,
}

impl Element {
    /// Qualified name, e.g. `a:rPr`.
    pub fn name(&self) -> &[u8] {
        self.start.name().into_inner()
    }

    pub fn is(&self, name: &str) -> bool {
        self.name() == name.as_bytes()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Unescaped value of an attribute.
    pub fn attribute(&self, key: &str) -> Option<String> {
        let attr = self.start.try_get_attribute(key).ok().flatten()?;
        attr.unescape_value().ok().map(|v| v.into_owned())
    }

    /// Set an attribute, appending it when absent.
    ///
    /// Returns `false` when the attribute already had this value, in which
    /// case the start tag is left byte-for-byte as it was.
    pub fn set_attribute(&mut self, key: &str, value: &str) -> bool {
        if self.attribute(key).as_deref() == Some(value) {
            return false;
        }

        let name = String::from_utf8_lossy(self.name()).into_owned();
        let mut start = BytesStart::new(name);
        let mut replaced = false;
        for attr in self.start.attributes().with_checks(false).flatten() {
            if attr.key.as_ref() == key.as_bytes() {
                start.push_attribute((key, value));
                replaced = true;
            } else {
                start.push_attribute(attr);
            }
        }
        if !replaced {
            start.push_attribute((key, value));
        }

        self.start = start;
        true
    }

    /// Concatenated character data of the direct children.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for child in &self.children {
            match child {
                Node::Text(t) => match t.unescape() {
                    Ok(s) => text.push_str(&s),
                    Err(_) => text.push_str(&String::from_utf8_lossy(t)),
                },
                Node::Other(Event::CData(c)) => text.push_str(&String::from_utf8_lossy(c)),
                _ => {}
            }
        }
        text
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: &str) {
        self.children.clear();
        if !text.is_empty() {
            let escaped = BytesText::from_escaped(partial_escape(text)).into_owned();
            self.children.push(Node::Text(escaped));
            self.self_closing = false;
        }
    }

    /// Outermost descendants with the given name, in document order.
    pub fn descendants_named(&self, name: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        collect_named(&self.children, name.as_bytes(), &mut out);
        out
    }

    /// Mutable variant of [`Element::descendants_named`].
    pub fn descendants_named_mut(&mut self, name: &str) -> Vec<&mut Element> {
        let mut out = Vec::new();
        collect_named_mut(&mut self.children, name.as_bytes(), &mut out);
        out
    }

    /// First descendant with the given name.
    pub fn first_descendant_named_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.descendants_named_mut(name).into_iter().next()
    }
}

/// A parsed slide, master or layout part.
#[derive(Debug, Clone)]
pub struct SlideDocument {
    nodes: Vec<Node>,
}

impl SlideDocument {
    /// Build the tree for a part's XML text.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut open: Vec<Element> = Vec::new();
        let mut nodes: Vec<Node> = Vec::new();

        loop {
            let event = reader.read_event().map_err(|e| {
                Error::Xml(format!("at byte {}: {}", reader.buffer_position(), e))
            })?;

            let node = match event {
                Event::Start(start) => {
                    open.push(Element {
                        start: start.into_owned(),
                        children: Vec::new(),
                        self_closing: false,
                    });
                    continue;
                }
                Event::End(_) => {
                    let element = open
                        .pop()
                        .ok_or_else(|| Error::Xml("closing tag without opening tag".to_string()))?;
                    Node::Element(element)
                }
                Event::Empty(start) => Node::Element(Element {
                    start: start.into_owned(),
                    children: Vec::new(),
                    self_closing: true,
                }),
                Event::Text(text) => Node::Text(text.into_owned()),
                Event::Eof => break,
                other => Node::Other(other.into_owned()),
            };

            match open.last_mut() {
                Some(parent) => parent.children.push(node),
                None => nodes.push(node),
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(Error::Xml(format!(
                "unclosed element <{}>",
                String::from_utf8_lossy(unclosed.name())
            )));
        }

        Ok(Self { nodes })
    }

    /// Outermost elements with the given name, in document order.
    pub fn elements_named(&self, name: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        collect_named(&self.nodes, name.as_bytes(), &mut out);
        out
    }

    /// Mutable variant of [`SlideDocument::elements_named`]. The returned
    /// elements are disjoint subtrees.
    pub fn elements_named_mut(&mut self, name: &str) -> Vec<&mut Element> {
        let mut out = Vec::new();
        collect_named_mut(&mut self.nodes, name.as_bytes(), &mut out);
        out
    }

    /// Serialize the tree back to XML text.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.nodes {
            write_node(&mut writer, node)?;
        }
        String::from_utf8(writer.into_inner())
            .map_err(|e| Error::Serialization(format!("XML output is not UTF-8: {}", e)))
    }
}

fn collect_named<'a>(nodes: &'a [Node], name: &[u8], out: &mut Vec<&'a Element>) {
    for node in nodes {
        if let Node::Element(element) = node {
            if element.name() == name {
                out.push(element);
            } else {
                collect_named(&element.children, name, out);
            }
        }
    }
}

fn collect_named_mut<'a>(nodes: &'a mut [Node], name: &[u8], out: &mut Vec<&'a mut Element>) {
    for node in nodes {
        if let Node::Element(element) = node {
            if element.name() == name {
                out.push(element);
            } else {
                collect_named_mut(&mut element.children, name, out);
            }
        }
    }
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<()> {
    match node {
        Node::Element(element) => {
            if element.self_closing && element.children.is_empty() {
                write_event(writer, Event::Empty(element.start.borrow()))
            } else {
                write_event(writer, Event::Start(element.start.borrow()))?;
                for child in &element.children {
                    write_node(writer, child)?;
                }
                write_event(writer, Event::End(element.start.to_end()))
            }
        }
        Node::Text(text) => write_event(writer, Event::Text(text.clone())),
        Node::Other(event) => write_event(writer, event.clone()),
    }
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:sp><p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US" sz="2400" b="1"/><a:t>Fish &amp; chips</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#;

    #[test]
    fn test_untouched_document_round_trips() {
        let doc = SlideDocument::parse(SLIDE).unwrap();
        assert_eq!(doc.to_xml().unwrap(), SLIDE);
    }

    #[test]
    fn test_text_is_unescaped_and_reescaped() {
        let mut doc = SlideDocument::parse(SLIDE).unwrap();
        let mut texts = doc.elements_named_mut("a:t");
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].text(), "Fish & chips");

        texts[0].set_text("Poisson <frit> & l'eau");
        let xml = doc.to_xml().unwrap();
        assert!(xml.contains("<a:t>Poisson &lt;frit&gt; &amp; l'eau</a:t>"));
    }

    #[test]
    fn test_set_attribute_replaces_in_place_and_appends() {
        let mut doc = SlideDocument::parse(SLIDE).unwrap();
        let mut props = doc.elements_named_mut("a:rPr");
        assert_eq!(props[0].attribute("sz").as_deref(), Some("2400"));

        assert!(props[0].set_attribute("sz", "2000"));
        assert!(props[0].set_attribute("dirty", "0"));
        assert!(!props[0].set_attribute("dirty", "0"));

        let xml = doc.to_xml().unwrap();
        assert!(xml.contains(r#"<a:rPr lang="en-US" sz="2000" b="1" dirty="0"/>"#));
    }

    #[test]
    fn test_unchanged_attribute_keeps_tag_bytes() {
        let xml = r#"<a:latin  typeface="Arial"   pitchFamily="34"/>"#;
        let mut doc = SlideDocument::parse(xml).unwrap();
        assert!(!doc.elements_named_mut("a:latin")[0].set_attribute("typeface", "Arial"));
        assert_eq!(doc.to_xml().unwrap(), xml);
    }

    #[test]
    fn test_elements_named_returns_outermost_in_order() {
        let xml = "<r><a:p><a:r><a:t>1</a:t></a:r><a:r><a:t>2</a:t></a:r></a:p><x><a:p/></x></r>";
        let doc = SlideDocument::parse(xml).unwrap();
        let paragraphs = doc.elements_named("a:p");
        assert_eq!(paragraphs.len(), 2);
        let texts: Vec<String> = paragraphs[0]
            .descendants_named("a:t")
            .iter()
            .map(|t| t.text())
            .collect();
        assert_eq!(texts, vec!["1", "2"]);
    }

    #[test]
    fn test_matching_is_by_qualified_name() {
        let xml = "<r><m:t>x</m:t><a:t>y</a:t></r>";
        let doc = SlideDocument::parse(xml).unwrap();
        let texts = doc.elements_named("a:t");
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].text(), "y");
    }

    #[test]
    fn test_set_text_on_empty_element_opens_it() {
        let mut doc = SlideDocument::parse("<a:r><a:t/></a:r>").unwrap();
        doc.elements_named_mut("a:t")[0].set_text("hi");
        assert_eq!(doc.to_xml().unwrap(), "<a:r><a:t>hi</a:t></a:r>");
    }

    #[test]
    fn test_malformed_xml_is_rejected() {
        assert!(matches!(
            SlideDocument::parse("<a:p><a:r></a:p>"),
            Err(Error::Xml(_))
        ));
        assert!(matches!(SlideDocument::parse("<a:p><a:r>"), Err(Error::Xml(_))));
    }
}
