//! XML utility functions for navigating OAI-PMH response trees.
//!
//! Lookups compare local names only. OAI-PMH responses put the protocol
//! elements in one namespace, so prefixes carry no extra information here.

use std::sync::LazyLock;

use regex::Regex;
use roxmltree::Node;

/// Namespace declarations on a start tag; group 1 is the prefix, if any.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static XMLNS_DECLARATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\sxmlns(?::([\w.\-]+))?\s*=").expect("valid regex"));

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use crosswalk_harvester::xml::get_tag_name;
///
/// let xml = r#"<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/"><responseDate/></OAI-PMH>"#;
/// let doc = Document::parse(xml).unwrap();
/// let date = doc.root_element().first_element_child().unwrap();
/// assert_eq!(get_tag_name(date), "responseDate");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Find the first child element with the given local name.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use crosswalk_harvester::xml::find_child;
///
/// let xml = r#"<record><header/><metadata/></record>"#;
/// let doc = Document::parse(xml).unwrap();
/// let record = doc.root_element();
///
/// assert!(find_child(record, "header").is_some());
/// assert!(find_child(record, "about").is_none());
/// ```
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && get_tag_name(*child) == tag)
}

/// Find all child elements with the given local name.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use crosswalk_harvester::xml::find_children;
///
/// let xml = r#"<header><setSpec>a</setSpec><setSpec>b</setSpec><datestamp/></header>"#;
/// let doc = Document::parse(xml).unwrap();
///
/// let sets: Vec<_> = find_children(doc.root_element(), "setSpec").collect();
/// assert_eq!(sets.len(), 2);
/// ```
pub fn find_children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && get_tag_name(*child) == tag)
}

/// Find a descendant element following a slash-separated path of local names.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use crosswalk_harvester::xml::find_by_path;
///
/// let xml = r#"<GetRecord><record><header><identifier>oai:x:1</identifier></header></record></GetRecord>"#;
/// let doc = Document::parse(xml).unwrap();
///
/// let id = find_by_path(doc.root_element(), "record/header/identifier");
/// assert_eq!(id.and_then(|n| n.text()), Some("oai:x:1"));
/// ```
pub fn find_by_path<'a, 'input>(node: Node<'a, 'input>, path: &str) -> Option<Node<'a, 'input>> {
    path.split('/')
        .try_fold(node, |current, part| find_child(current, part))
}

/// Get the text content of a node, trimmed.
pub fn get_text(node: Node<'_, '_>) -> String {
    node.text()
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

pub fn get_attribute<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute(name)
}

/// Cut an element out of its document as a standalone XML string.
///
/// Namespaces declared on ancestors are copied onto the fragment's start tag,
/// so prefixed names inside still resolve once the fragment is parsed alone.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use crosswalk_harvester::xml::{find_child, standalone_fragment};
///
/// let xml = r#"<root xmlns:dc="http://purl.org/dc/elements/1.1/"><item><dc:title>T</dc:title></item></root>"#;
/// let doc = Document::parse(xml).unwrap();
/// let item = find_child(doc.root_element(), "item").unwrap();
///
/// let fragment = standalone_fragment(item, xml);
/// assert!(Document::parse(&fragment).is_ok());
/// assert!(fragment.starts_with(r#"<item xmlns:dc="http://purl.org/dc/elements/1.1/""#));
/// ```
pub fn standalone_fragment(node: Node<'_, '_>, input: &str) -> String {
    let range = node.range();
    let raw = &input[range.clone()];
    let name_end = raw
        .char_indices()
        .skip(1)
        .find(|(_, c)| c.is_whitespace() || *c == '>' || *c == '/')
        .map_or(raw.len(), |(i, _)| i);
    let start_tag = &raw[..start_tag_len(node, raw, range.start)];

    let declared: Vec<Option<&str>> = XMLNS_DECLARATION
        .captures_iter(start_tag)
        .map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();

    let declarations: String = node
        .namespaces()
        .filter(|namespace| {
            namespace.name() != Some("xml") && !declared.contains(&namespace.name())
        })
        .map(|namespace| {
            let uri = namespace.uri().replace('&', "&amp;").replace('"', "&quot;");
            match namespace.name() {
                Some(prefix) => format!(r#" xmlns:{prefix}="{uri}""#),
                None => format!(r#" xmlns="{uri}""#),
            }
        })
        .collect();

    let mut fragment = String::with_capacity(raw.len() + declarations.len());
    fragment.push_str(&raw[..name_end]);
    fragment.push_str(&declarations);
    fragment.push_str(&raw[name_end..]);
    fragment
}

/// Length of the element's start tag within `raw`.
///
/// The first child starts right after the start tag. Childless elements are
/// scanned for the first `>` outside a quoted attribute value.
fn start_tag_len(node: Node<'_, '_>, raw: &str, offset: usize) -> usize {
    if let Some(child) = node.first_child() {
        return child.range().start - offset;
    }
    let mut quote = None;
    for (index, c) in raw.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return index + 1,
            _ => {}
        }
    }
    raw.len()
}
