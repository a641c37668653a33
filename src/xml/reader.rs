//! Builds a small element tree from markup input.
//!
//! This is the only place that sees raw quick-xml events, so it is the only
//! place malformed input is reported from. The decoders in
//! [`super::decode`] work on the finished tree and only ever fail on content
//! they do not recognize.

use crate::error::XmlParseError;
use crate::utils::get_line_and_column;
use miette::NamedSource;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Result<Self, quick_xml::Error> {
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Element {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attributes,
            children: Vec::new(),
            text: String::new(),
        })
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Fails on the first attribute not in `allowed`.
    pub fn deny_unknown_attributes(&self, allowed: &[&str]) -> Result<(), XmlParseError> {
        match self
            .attributes
            .iter()
            .find(|(key, _)| !allowed.contains(&key.as_str()))
        {
            Some((key, _)) => Err(XmlParseError::UnknownAttribute {
                element: self.name.clone(),
                attribute: key.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Fails if the element has any child elements.
    pub fn deny_children(&self) -> Result<(), XmlParseError> {
        match self.children.first() {
            Some(child) => Err(self.unknown_child(child)),
            None => Ok(()),
        }
    }

    /// Fails if a container element carries anything but whitespace text.
    pub fn deny_text(&self) -> Result<(), XmlParseError> {
        if self.text.trim().is_empty() {
            Ok(())
        } else {
            Err(XmlParseError::UnexpectedText {
                element: self.name.clone(),
            })
        }
    }

    pub fn unknown_child(&self, child: &Element) -> XmlParseError {
        XmlParseError::UnknownElement {
            parent: self.name.clone(),
            element: child.name.clone(),
        }
    }
}

/// Parses `source` into its root element. Anything before the root (a
/// declaration header, comments) is skipped without validation, and anything
/// after the root's closing tag is ignored.
pub(crate) fn parse_root(source: &str) -> Result<Element, XmlParseError> {
    let mut reader = Reader::from_str(source);
    let mut stack: Vec<Element> = Vec::new();

    loop {
        let position = reader.buffer_position() as usize;
        let event = reader
            .read_event()
            .map_err(|err| syntax_error(source, reader.error_position() as usize, err))?;

        let finished = match event {
            Event::Start(start) => {
                let element =
                    Element::open(&start).map_err(|err| syntax_error(source, position, err))?;
                stack.push(element);
                None
            }
            Event::Empty(start) => {
                Some(Element::open(&start).map_err(|err| syntax_error(source, position, err))?)
            }
            // quick-xml already checks that end tags match their start tags.
            Event::End(_) => stack.pop(),
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|err| syntax_error(source, position, err))?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
                None
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
                None
            }
            Event::Eof => return Err(XmlParseError::UnexpectedEof),
            _ => None,
        };

        if let Some(element) = finished {
            match stack.last_mut() {
                Some(parent) => parent.children.push(element),
                None => return Ok(element),
            }
        }
    }
}

fn syntax_error(source: &str, offset: usize, err: quick_xml::Error) -> XmlParseError {
    let offset = offset.min(source.len());
    let (line, column) = get_line_and_column(source, offset);
    XmlParseError::Syntax {
        src: NamedSource::new("VirtualMachineSpec.xml", source.to_string()),
        span: (offset, 0).into(),
        line,
        column,
        source: err,
    }
}
