//! Parsed record nodes.
//!
//! Mapping rules navigate records through one contract, [`Navigate`],
//! regardless of whether the record was XML or JSON. [`Value`] is the closed
//! set of backends; [`ValueArray`] applies lookups across many nodes at once.

mod json;
mod xml;

pub use json::JsonValue;
pub use xml::{NamespaceTable, XmlTree, XmlValue};

pub(crate) use xml::XmlElement;

use crate::error::Result;

/// Navigation contract shared by every record backend.
pub trait Navigate {
    /// Qualified name of this node (empty for document nodes).
    fn name(&self) -> String;

    /// Names of the attributes on this node.
    fn attributes(&self) -> Result<Vec<String>>;

    /// Value of one attribute, if present.
    fn attribute(&self, name: &str) -> Result<Option<String>>;

    /// Names of the immediate structural children, without duplicates.
    /// [`Navigate::child`] returns every occurrence of a name.
    fn children(&self) -> Vec<String>;

    /// Scalar content of this node. XML text is trimmed.
    fn value(&self) -> String;

    /// Whether the node carries text content of its own.
    fn has_values(&self) -> bool;

    /// Look up children by name (or path expression, for XML).
    fn child(&self, name: &str) -> Result<ValueArray>;
}

/// A node in a parsed record.
#[derive(Debug, Clone)]
pub enum Value {
    Xml(XmlValue),
    Json(JsonValue),
}

impl Navigate for Value {
    fn name(&self) -> String {
        match self {
            Self::Xml(v) => v.name(),
            Self::Json(v) => v.name(),
        }
    }

    fn attributes(&self) -> Result<Vec<String>> {
        match self {
            Self::Xml(v) => v.attributes(),
            Self::Json(v) => v.attributes(),
        }
    }

    fn attribute(&self, name: &str) -> Result<Option<String>> {
        match self {
            Self::Xml(v) => v.attribute(name),
            Self::Json(v) => v.attribute(name),
        }
    }

    fn children(&self) -> Vec<String> {
        match self {
            Self::Xml(v) => v.children(),
            Self::Json(v) => v.children(),
        }
    }

    fn value(&self) -> String {
        match self {
            Self::Xml(v) => v.value(),
            Self::Json(v) => v.value(),
        }
    }

    fn has_values(&self) -> bool {
        match self {
            Self::Xml(v) => v.has_values(),
            Self::Json(v) => v.has_values(),
        }
    }

    fn child(&self, name: &str) -> Result<ValueArray> {
        match self {
            Self::Xml(v) => v.child(name),
            Self::Json(v) => v.child(name),
        }
    }
}

/// An ordered sequence of nodes.
///
/// Lookups apply to every member and flatten the results; lookups on an
/// empty array yield an empty array.
#[derive(Debug, Clone, Default)]
pub struct ValueArray(Vec<Value>);

impl ValueArray {
    #[must_use]
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    #[must_use]
    pub fn first(&self) -> Option<&Value> {
        self.0.first()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Value> {
        self.0.last()
    }

    /// Child lookup applied to every member, flattened in order.
    pub fn child(&self, name: &str) -> Result<Self> {
        let mut out = Vec::new();
        for value in &self.0 {
            out.extend(value.child(name)?.0);
        }
        Ok(Self(out))
    }

    /// Chained child lookups, one path segment at a time.
    ///
    /// # Examples
    /// ```
    /// use crosswalk_core::parser::{Parser, ParserConfig};
    /// use crosswalk_core::record::Record;
    /// use crosswalk_core::value::ValueArray;
    ///
    /// let record = Record::json(r#"{"creator": [{"name": "Tove"}, {"name": "Lars"}]}"#);
    /// let parser = Parser::parse(&record, &ParserConfig::json("")).unwrap();
    /// let root = ValueArray::new(vec![parser.root().clone()]);
    ///
    /// let names = root.field(["creator", "name"]).unwrap();
    /// assert_eq!(names.values(), vec!["Tove", "Lars"]);
    /// ```
    pub fn field<I, S>(&self, path: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut current = self.clone();
        for segment in path {
            if current.is_empty() {
                break;
            }
            current = current.child(segment.as_ref())?;
        }
        Ok(current)
    }

    /// Scalar values of every member.
    #[must_use]
    pub fn values(&self) -> Vec<String> {
        self.0.iter().map(Navigate::value).collect()
    }

    /// One-element array holding the first member (empty if none).
    #[must_use]
    pub fn first_value(&self) -> Self {
        Self(self.0.first().cloned().into_iter().collect())
    }

    /// One-element array holding the last member (empty if none).
    #[must_use]
    pub fn last_value(&self) -> Self {
        Self(self.0.last().cloned().into_iter().collect())
    }

    /// Members whose attribute `name` equals `value`.
    pub fn match_attribute(&self, name: &str, value: &str) -> Result<Self> {
        self.filter_attribute(name, value, true)
    }

    /// Members whose attribute `name` is absent or differs from `value`.
    pub fn reject_attribute(&self, name: &str, value: &str) -> Result<Self> {
        self.filter_attribute(name, value, false)
    }

    fn filter_attribute(&self, name: &str, value: &str, keep_matches: bool) -> Result<Self> {
        let mut out = Vec::new();
        for member in &self.0 {
            let matched = member.attribute(name)?.as_deref() == Some(value);
            if matched == keep_matches {
                out.push(member.clone());
            }
        }
        Ok(Self(out))
    }

    /// Members having a child `name` whose value equals `value`.
    pub fn match_child(&self, name: &str, value: &str) -> Result<Self> {
        let mut out = Vec::new();
        for member in &self.0 {
            if member.child(name)?.iter().any(|c| c.value() == value) {
                out.push(member.clone());
            }
        }
        Ok(Self(out))
    }

    /// Append all members of `other`.
    #[must_use]
    pub fn concat(mut self, other: Self) -> Self {
        self.0.extend(other.0);
        self
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Value> {
        self.0
    }
}

impl From<Vec<Value>> for ValueArray {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl From<Value> for ValueArray {
    fn from(value: Value) -> Self {
        Self(vec![value])
    }
}

impl FromIterator<Value> for ValueArray {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ValueArray {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValueArray {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Parser, ParserConfig, Schema};
    use crate::record::Record;

    const MODS: &str = r#"<mods xmlns="http://www.loc.gov/mods/v3">
      <name type="personal"><namePart>Jansson, Tove</namePart><role>author</role></name>
      <name type="corporate"><namePart>Schildts</namePart><role>publisher</role></name>
      <name><namePart>Unknown</namePart></name>
    </mods>"#;

    fn root() -> ValueArray {
        let parser = Parser::parse(&Record::xml(MODS), &Schema::Mods.config()).unwrap();
        ValueArray::from(parser.root().clone())
    }

    #[test]
    fn test_empty_array_lookups_are_empty() {
        let empty = ValueArray::default();
        assert!(empty.child("anything").unwrap().is_empty());
        assert!(empty.field(["a", "b"]).unwrap().is_empty());
        assert!(empty.first_value().is_empty());
    }

    #[test]
    fn test_field_flattens() {
        let parts = root().field(["mods:name", "mods:namePart"]).unwrap();
        assert_eq!(parts.values(), vec!["Jansson, Tove", "Schildts", "Unknown"]);
    }

    #[test]
    fn test_match_and_reject_attribute() {
        let names = root().child("mods:name").unwrap();
        let personal = names.match_attribute("type", "personal").unwrap();
        assert_eq!(
            personal.field(["mods:namePart"]).unwrap().values(),
            vec!["Jansson, Tove"]
        );
        let others = names.reject_attribute("type", "personal").unwrap();
        assert_eq!(others.len(), 2);
    }

    #[test]
    fn test_match_child() {
        let names = root().child("mods:name").unwrap();
        let publishers = names.match_child("mods:role", "publisher").unwrap();
        assert_eq!(
            publishers.child("mods:namePart").unwrap().values(),
            vec!["Schildts"]
        );
    }

    #[test]
    fn test_first_and_last_value() {
        let parts = root().field(["mods:name", "mods:namePart"]).unwrap();
        assert_eq!(parts.first_value().values(), vec!["Jansson, Tove"]);
        assert_eq!(parts.last_value().values(), vec!["Unknown"]);
    }

    #[test]
    fn test_json_match_attribute_fails() {
        let parser =
            Parser::parse(&Record::json(r#"{"a": [1]}"#), &ParserConfig::json("")).unwrap();
        let root = ValueArray::from(parser.root().clone());
        assert!(root.match_attribute("type", "x").is_err());
    }
}
