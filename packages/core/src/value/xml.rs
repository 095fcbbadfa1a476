//! XML backend: an owned element tree built from `roxmltree`.
//!
//! `roxmltree` documents borrow their input text, which makes them awkward to
//! hand out from a parser that owns its record. The tree is therefore copied
//! once into an index-addressed arena and shared behind an `Arc`; every
//! [`XmlValue`] is just a node index plus the namespace table in scope.

use std::collections::BTreeMap;
use std::sync::Arc;

use roxmltree::{Document, NodeType};

use super::{Navigate, Value, ValueArray};
use crate::error::Result;
use crate::path::PathExpr;

/// Mapping from namespace prefix to namespace URI.
pub type NamespaceTable = BTreeMap<String, String>;

/// An attribute on an element.
#[derive(Debug, Clone)]
pub(crate) struct XmlAttribute {
    pub(crate) namespace: Option<String>,
    pub(crate) name: String,
    pub(crate) value: String,
}

/// Element data.
#[derive(Debug, Clone)]
pub(crate) struct XmlElement {
    pub(crate) namespace: Option<String>,
    pub(crate) name: String,
    /// Element lives in the default namespace declared in its scope.
    pub(crate) in_default_namespace: bool,
    pub(crate) attributes: Vec<XmlAttribute>,
}

#[derive(Debug, Clone)]
pub(crate) enum XmlKind {
    Document,
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct XmlNode {
    pub(crate) kind: XmlKind,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
}

/// Owned copy of a parsed XML document.
#[derive(Debug, Clone)]
pub struct XmlTree {
    nodes: Vec<XmlNode>,
    namespaces: NamespaceTable,
}

impl XmlTree {
    /// Index of the document node.
    pub(crate) const ROOT: usize = 0;

    /// Parse XML text into an owned tree.
    pub fn parse(text: &str) -> Result<Self> {
        let doc = Document::parse(text)?;
        let mut tree = Self {
            nodes: Vec::new(),
            namespaces: NamespaceTable::new(),
        };
        tree.append(doc.root(), None);
        Ok(tree)
    }

    /// Every prefixed namespace declared anywhere in the document.
    ///
    /// When a prefix is declared twice with different URIs the first
    /// declaration in document order wins.
    #[must_use]
    pub fn declared_namespaces(&self) -> &NamespaceTable {
        &self.namespaces
    }

    fn append(&mut self, node: roxmltree::Node<'_, '_>, parent: Option<usize>) -> Option<usize> {
        let kind = match node.node_type() {
            NodeType::Root => XmlKind::Document,
            NodeType::Element => {
                for ns in node.namespaces() {
                    if let Some(prefix) = ns.name() {
                        self.namespaces
                            .entry(prefix.to_string())
                            .or_insert_with(|| ns.uri().to_string());
                    }
                }
                let namespace = node.tag_name().namespace().map(String::from);
                let in_default_namespace =
                    namespace.is_some() && namespace.as_deref() == node.lookup_namespace_uri(None);
                XmlKind::Element(XmlElement {
                    namespace,
                    name: node.tag_name().name().to_string(),
                    in_default_namespace,
                    attributes: node
                        .attributes()
                        .map(|attr| XmlAttribute {
                            namespace: attr.namespace().map(String::from),
                            name: attr.name().to_string(),
                            value: attr.value().to_string(),
                        })
                        .collect(),
                })
            }
            NodeType::Text => XmlKind::Text(node.text().unwrap_or_default().to_string()),
            NodeType::Comment | NodeType::PI => return None,
        };

        let id = self.nodes.len();
        self.nodes.push(XmlNode {
            kind,
            parent,
            children: Vec::new(),
        });

        for child in node.children() {
            if let Some(child_id) = self.append(child, Some(id)) {
                self.nodes[id].children.push(child_id);
            }
        }

        Some(id)
    }

    pub(crate) fn element(&self, id: usize) -> Option<&XmlElement> {
        match &self.nodes.get(id)?.kind {
            XmlKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn parent(&self, id: usize) -> Option<usize> {
        self.nodes.get(id)?.parent
    }

    /// Element children of a node, in document order.
    pub(crate) fn element_children(&self, id: usize) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
            .iter()
            .copied()
            .filter(|child| self.element(*child).is_some())
    }

    /// Element descendants of a node (excluding the node), in document order.
    pub(crate) fn descendants(&self, id: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.element_children(id).collect();
        stack.reverse();
        while let Some(next) = stack.pop() {
            out.push(next);
            let mut children: Vec<usize> = self.element_children(next).collect();
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Concatenated text of all descendant text nodes.
    pub(crate) fn text_content(&self, id: usize) -> String {
        let mut text = String::new();
        self.collect_text(id, &mut text);
        text
    }

    fn collect_text(&self, id: usize, out: &mut String) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if let XmlKind::Text(text) = &node.kind {
            out.push_str(text);
        }
        for child in &node.children {
            self.collect_text(*child, out);
        }
    }

    /// Whether the node has a direct, non-blank text child.
    pub(crate) fn has_text(&self, id: usize) -> bool {
        self.nodes.get(id).is_some_and(|node| {
            node.children.iter().any(|child| {
                matches!(&self.nodes[*child].kind, XmlKind::Text(text) if !text.trim().is_empty())
            })
        })
    }
}

/// Render a namespaced name using the prefix bound to its URI in `namespaces`.
///
/// Falls back to the bare local name when the URI has no prefix in the table.
pub(crate) fn qualified_name(
    namespace: Option<&str>,
    name: &str,
    namespaces: &NamespaceTable,
) -> String {
    namespace
        .and_then(|uri| {
            namespaces
                .iter()
                .find(|(_, candidate)| candidate.as_str() == uri)
                .map(|(prefix, _)| format!("{prefix}:{name}"))
        })
        .unwrap_or_else(|| name.to_string())
}

/// A node inside an XML record.
#[derive(Debug, Clone)]
pub struct XmlValue {
    tree: Arc<XmlTree>,
    id: usize,
    namespaces: Arc<NamespaceTable>,
}

impl XmlValue {
    pub(crate) fn new(tree: Arc<XmlTree>, id: usize, namespaces: Arc<NamespaceTable>) -> Self {
        Self {
            tree,
            id,
            namespaces,
        }
    }

    /// The document node of a tree.
    #[must_use]
    pub fn document(tree: Arc<XmlTree>, namespaces: Arc<NamespaceTable>) -> Self {
        Self::new(tree, XmlTree::ROOT, namespaces)
    }

    /// Namespace table in scope for lookups from this node.
    #[must_use]
    pub fn namespaces(&self) -> &NamespaceTable {
        &self.namespaces
    }

    /// Copy of this node with one more prefix bound.
    #[must_use]
    pub fn with_namespace(&self, prefix: &str, uri: &str) -> Self {
        let mut namespaces = (*self.namespaces).clone();
        namespaces.insert(prefix.to_string(), uri.to_string());
        Self::new(Arc::clone(&self.tree), self.id, Arc::new(namespaces))
    }

    /// Evaluate a path expression relative to this node.
    pub fn xpath(&self, expr: &str) -> Result<ValueArray> {
        let path = PathExpr::compile(expr)?;
        let ids = path.evaluate(&self.tree, &self.namespaces, self.id)?;
        Ok(ids
            .into_iter()
            .map(|id| {
                Value::Xml(Self::new(
                    Arc::clone(&self.tree),
                    id,
                    Arc::clone(&self.namespaces),
                ))
            })
            .collect())
    }
}

impl Navigate for XmlValue {
    fn name(&self) -> String {
        self.tree
            .element(self.id)
            .map(|element| {
                qualified_name(element.namespace.as_deref(), &element.name, &self.namespaces)
            })
            .unwrap_or_default()
    }

    fn attributes(&self) -> Result<Vec<String>> {
        Ok(self
            .tree
            .element(self.id)
            .map(|element| {
                element
                    .attributes
                    .iter()
                    .map(|attr| {
                        qualified_name(attr.namespace.as_deref(), &attr.name, &self.namespaces)
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn attribute(&self, name: &str) -> Result<Option<String>> {
        let Some(element) = self.tree.element(self.id) else {
            return Ok(None);
        };
        let (namespace, local) = match name.split_once(':') {
            Some((prefix, local)) => match self.namespaces.get(prefix) {
                Some(uri) => (Some(uri.as_str()), local),
                None => return Ok(None),
            },
            None => (None, name),
        };
        Ok(element
            .attributes
            .iter()
            .find(|attr| attr.name == local && attr.namespace.as_deref() == namespace)
            .map(|attr| attr.value.clone()))
    }

    /// Distinct qualified names of the element children, in order of first
    /// appearance. Repeated elements such as several `dc:subject`s give one
    /// name; use [`Navigate::child`] to get every occurrence.
    fn children(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for child in self.tree.element_children(self.id) {
            if let Some(element) = self.tree.element(child) {
                let name =
                    qualified_name(element.namespace.as_deref(), &element.name, &self.namespaces);
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Concatenated text of every descendant text node, with leading and
    /// trailing whitespace trimmed.
    fn value(&self) -> String {
        self.tree.text_content(self.id).trim().to_string()
    }

    fn has_values(&self) -> bool {
        self.tree.has_text(self.id)
    }

    fn child(&self, name: &str) -> Result<ValueArray> {
        self.xpath(name)
    }
}
