// XML helpers for FSAPI response documents.
//
// Responses look like:
//
//   <fsapiResponse>
//     <status>FS_OK</status>
//     <value><u8>5</u8></value>
//   </fsapiResponse>
//
// Values and list fields wrap their payload in a typed child element.

use std::borrow::Cow;

use xmltree::{Element, ParseError, XMLNode};

use crate::status::Status;

/// Typed children probed on list item `<field>` nodes, in order.
pub const TYPED_FIELD_TAGS: &[&str] = &["c8_array", "u8", "u16", "u32", "s8", "s16", "s32"];

/// Typed children probed on `<value>` nodes, in order. Enumerations only
/// show up in scalar reads.
pub const TYPED_VALUE_TAGS: &[&str] = &["c8_array", "u8", "u16", "u32", "s8", "s16", "s32", "e8"];

pub fn parse_document(raw: &str) -> Result<Element, ParseError> {
    Element::parse(raw.as_bytes())
}

/// Status of a response document. A missing document is a parse error;
/// a document without a `<status>` child is [`Status::Unknown`].
pub fn document_status(document: Option<&Element>) -> Status {
    let Some(document) = document else {
        return Status::XmlParseError;
    };
    document
        .get_child("status")
        .and_then(Element::get_text)
        .map_or(Status::Unknown, |text| Status::parse(&text))
}

/// Text of a direct child, trimmed, if present and non-empty.
pub fn child_text(element: &Element, name: &str) -> Option<String> {
    element
        .get_child(name)
        .and_then(Element::get_text)
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

/// Text of the first child in `probe` order that carries non-empty text.
pub fn first_typed_text(element: &Element, probe: &[&str]) -> Option<String> {
    probe.iter().find_map(|tag| {
        element
            .get_child(*tag)
            .and_then(Element::get_text)
            .filter(|text| !text.is_empty())
            .map(Cow::into_owned)
    })
}

/// Payload of a `<value>` node: its first typed child, else its own
/// direct text.
pub fn value_text(value: &Element) -> Option<String> {
    first_typed_text(value, TYPED_VALUE_TAGS).or_else(|| {
        value
            .get_text()
            .filter(|text| !text.trim().is_empty())
            .map(Cow::into_owned)
    })
}

/// First element named `name` below `root` (depth-first, root excluded).
pub fn find_descendant<'a>(root: &'a Element, name: &str) -> Option<&'a Element> {
    child_elements(root).find_map(|child| {
        if child.name == name {
            Some(child)
        } else {
            find_descendant(child, name)
        }
    })
}

/// Every element named `name` below `root`, in document order.
pub fn find_descendants<'a>(root: &'a Element, name: &str) -> Vec<&'a Element> {
    let mut found = Vec::new();
    collect_descendants(root, name, &mut found);
    found
}

fn collect_descendants<'a>(root: &'a Element, name: &str, found: &mut Vec<&'a Element>) {
    for child in child_elements(root) {
        if child.name == name {
            found.push(child);
        }
        collect_descendants(child, name, found);
    }
}

pub(crate) fn child_elements(element: &Element) -> impl Iterator<Item = &Element> {
    element.children.iter().filter_map(XMLNode::as_element)
}
