//! Minimal XML element tree
//!
//! Just enough structure to assemble and render the OCPP 1.5 SOAP envelope:
//! qualified element names, attributes in insertion order, element and text
//! children. No parsing and no schema awareness.

use std::fmt;

/// Child of an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum XNode {
    Element(XElement),
    Text(String),
}

/// An XML element with a qualified name such as `SOAP:Envelope`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct XElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XNode>,
}

impl XElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute, replacing an existing one of the same name.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(n, _)| n == name)?;
        Some(self.attributes.remove(index).1)
    }

    pub fn with_child(mut self, child: XElement) -> Self {
        self.children.push(XNode::Element(child));
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = XElement>) -> Self {
        self.children.extend(children.into_iter().map(XNode::Element));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XNode::Text(text.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Element children, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &XElement> {
        self.children.iter().filter_map(|child| match child {
            XNode::Element(e) => Some(e),
            XNode::Text(_) => None,
        })
    }

    /// First child element with the given qualified name.
    pub fn element(&self, name: &str) -> Option<&XElement> {
        self.elements().find(|e| e.name == name)
    }

    /// Concatenated text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                XNode::Text(t) => Some(t.as_str()),
                XNode::Element(_) => None,
            })
            .collect()
    }

    pub fn to_xml_string(&self) -> String {
        self.to_string()
    }

    fn write_to(&self, out: &mut impl fmt::Write) -> fmt::Result {
        write!(out, "<{}", self.name)?;
        for (name, value) in &self.attributes {
            write!(out, " {}=\"{}\"", name, escape(value, true))?;
        }
        if self.children.is_empty() {
            return out.write_str("/>");
        }

        out.write_char('>')?;
        for child in &self.children {
            match child {
                XNode::Element(e) => e.write_to(out)?,
                XNode::Text(t) => out.write_str(&escape(t, false))?,
            }
        }
        write!(out, "</{}>", self.name)
    }
}

impl fmt::Display for XElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f)
    }
}

/// Characters XML 1.0 cannot carry, not even as character references.
fn is_forbidden(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}'
    )
}

/// Escape markup; forbidden characters become U+FFFD.
fn escape(text: &str, attribute: bool) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if attribute => escaped.push_str("&quot;"),
            // Attribute value normalization would fold these into spaces.
            '\t' if attribute => escaped.push_str("&#9;"),
            '\n' if attribute => escaped.push_str("&#10;"),
            '\r' if attribute => escaped.push_str("&#13;"),
            c if is_forbidden(c) => escaped.push(char::REPLACEMENT_CHARACTER),
            _ => escaped.push(c),
        }
    }
    escaped
}
