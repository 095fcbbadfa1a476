//! The entity graph a mapping produces.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use super::source::Datum;
use crate::date::ExtendedDate;
use crate::value::Navigate;

/// Class of a target entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Class {
    Aggregation,
    SourceResource,
    WebResource,
    Agent,
    Concept,
    Place,
    TimeSpan,
    Collection,
    Other(String),
}

impl Class {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Aggregation => "ore:Aggregation",
            Self::SourceResource => "dpla:SourceResource",
            Self::WebResource => "edm:WebResource",
            Self::Agent => "edm:Agent",
            Self::Concept => "skos:Concept",
            Self::Place => "edm:Place",
            Self::TimeSpan => "edm:TimeSpan",
            Self::Collection => "dcmitype:Collection",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Class {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A stored property value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    Literal(String),
    Uri(String),
    Date(ExtendedDate),
    Resource(Resource),
}

impl Term {
    /// Text of a literal or URI term.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Literal(text) | Self::Uri(text) => Some(text),
            _ => None,
        }
    }
}

impl From<Datum> for Term {
    fn from(datum: Datum) -> Self {
        match datum {
            Datum::Text(text) => Self::Literal(text),
            Datum::Uri(uri) => Self::Uri(uri),
            Datum::Date(date) => Self::Date(date),
            Datum::Node(node) => Self::Literal(node.value()),
            Datum::Resource(resource) => Self::Resource(*resource),
        }
    }
}

/// A typed entity with an optional subject URI and multi-valued properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    class: Class,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    properties: BTreeMap<String, Vec<Term>>,
}

impl Resource {
    #[must_use]
    pub fn new(class: Class) -> Self {
        Self {
            class,
            subject: None,
            properties: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn class(&self) -> &Class {
        &self.class
    }

    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn set_subject(&mut self, uri: impl Into<String>) {
        self.subject = Some(uri.into());
    }

    /// Replace a property's values. An empty list clears it.
    pub fn set_property(&mut self, name: &str, values: Vec<Datum>) {
        let terms: Vec<Term> = values.into_iter().map(Term::from).collect();
        if terms.is_empty() {
            self.properties.remove(name);
        } else {
            self.properties.insert(name.to_string(), terms);
        }
    }

    /// Add one value to a property.
    pub fn append(&mut self, name: &str, term: Term) {
        self.properties
            .entry(name.to_string())
            .or_default()
            .push(term);
    }

    #[must_use]
    pub fn property(&self, name: &str) -> &[Term] {
        self.properties.get(name).map_or(&[], Vec::as_slice)
    }

    /// Literal and URI values of a property.
    #[must_use]
    pub fn texts(&self, name: &str) -> Vec<&str> {
        self.property(name).iter().filter_map(Term::as_text).collect()
    }

    #[must_use]
    pub fn dates(&self, name: &str) -> Vec<&ExtendedDate> {
        self.property(name)
            .iter()
            .filter_map(|term| match term {
                Term::Date(date) => Some(date),
                _ => None,
            })
            .collect()
    }

    /// Nested resources held by a property.
    #[must_use]
    pub fn children(&self, name: &str) -> Vec<&Resource> {
        self.property(name)
            .iter()
            .filter_map(|term| match term {
                Term::Resource(resource) => Some(resource),
                _ => None,
            })
            .collect()
    }

    /// Names of the properties that hold at least one value.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_property_replaces_and_clears() {
        let mut resource = Resource::new(Class::Agent);
        resource.set_property("name", vec![Datum::from("Tove")]);
        resource.set_property("name", vec![Datum::from("Lars")]);
        assert_eq!(resource.texts("name"), vec!["Lars"]);

        resource.set_property("name", Vec::new());
        assert!(resource.property("name").is_empty());
        assert_eq!(resource.property_names().count(), 0);
    }

    #[test]
    fn test_serializes_to_json() {
        let mut agent = Resource::new(Class::Agent);
        agent.set_property("name", vec![Datum::from("Tove Jansson")]);
        let mut resource = Resource::new(Class::SourceResource);
        resource.set_subject("http://example.org/1");
        resource.append("creator", Term::Resource(agent));

        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "class": "dpla:SourceResource",
                "subject": "http://example.org/1",
                "properties": {
                    "creator": [{"resource": {
                        "class": "edm:Agent",
                        "properties": {"name": [{"literal": "Tove Jansson"}]}
                    }}]
                }
            })
        );
    }

    #[test]
    fn test_custom_class_name() {
        assert_eq!(Class::Other("ex:Thing".to_string()).to_string(), "ex:Thing");
    }
}
