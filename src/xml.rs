//! Minimal element tree over quick-xml's event reader.
//!
//! The reader is left with its default of not trimming text, so element
//! text reaches the records exactly as the API sent it, padding and line
//! breaks included.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ApiError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    /// Character data directly inside this element, CDATA included.
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    /// Last child called `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().rev().find(|child| child.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |child| child.name == name)
    }
}

/// Read the root element of `body`. Anything after it is ignored.
pub fn parse_document(body: &[u8]) -> Result<Element, ApiError> {
    let mut reader = Reader::from_reader(body);
    reader.expand_empty_elements(true);

    let mut buf = Vec::new();
    let mut open: Vec<Element> = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) => {
                let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                open.push(Element::new(name));
            }
            Event::End(_) => {
                let element = open.pop().ok_or(ApiError::Incomplete)?;
                match open.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            Event::Text(text) => {
                if let Some(current) = open.last_mut() {
                    current.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = open.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => return Err(ApiError::Incomplete),
            _ => {}
        }
        buf.clear();
    }
}
