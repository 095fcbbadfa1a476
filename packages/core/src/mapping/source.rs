//! Where a declaration's value comes from.

use std::fmt;

use super::resource::Resource;
use super::Scope;
use crate::date::ExtendedDate;
use crate::error::{CrosswalkError, Result};
use crate::parser::OaiHeaders;
use crate::value::{Navigate, Value, ValueArray};

/// One value flowing through a mapping.
#[derive(Debug, Clone)]
pub enum Datum {
    Text(String),
    Uri(String),
    Date(ExtendedDate),
    /// A node of the source record, stored as its text value.
    Node(Value),
    Resource(Box<Resource>),
}

impl Datum {
    /// Text form of scalar data; `None` for nested resources.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        match self {
            Self::Text(text) | Self::Uri(text) => Some(text.clone()),
            Self::Date(date) => Some(date.to_string()),
            Self::Node(node) => Some(node.value()),
            Self::Resource(_) => None,
        }
    }

    #[must_use]
    pub fn as_node(&self) -> Option<&Value> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }
}

impl From<&str> for Datum {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Datum {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Value> for Datum {
    fn from(node: Value) -> Self {
        Self::Node(node)
    }
}

impl From<ExtendedDate> for Datum {
    fn from(date: ExtendedDate) -> Self {
        Self::Date(date)
    }
}

impl From<Resource> for Datum {
    fn from(resource: Resource) -> Self {
        Self::Resource(Box::new(resource))
    }
}

/// A resolved source: a single datum or an ordered collection.
#[derive(Debug, Clone)]
pub enum Resolved {
    One(Datum),
    Many(Vec<Datum>),
}

impl Resolved {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(items) => items.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply `f` to the single datum, or to each element of a collection.
    pub fn try_map<F>(self, f: F) -> Result<Self>
    where
        F: Fn(Datum) -> Result<Datum>,
    {
        Ok(match self {
            Self::One(datum) => Self::One(f(datum)?),
            Self::Many(items) => Self::Many(items.into_iter().map(f).collect::<Result<_>>()?),
        })
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Datum> {
        match self {
            Self::One(datum) => vec![datum],
            Self::Many(items) => items,
        }
    }
}

impl From<Datum> for Resolved {
    fn from(datum: Datum) -> Self {
        Self::One(datum)
    }
}

impl From<&str> for Resolved {
    fn from(text: &str) -> Self {
        Self::One(text.into())
    }
}

impl From<String> for Resolved {
    fn from(text: String) -> Self {
        Self::One(text.into())
    }
}

impl From<Value> for Resolved {
    fn from(node: Value) -> Self {
        Self::One(Datum::Node(node))
    }
}

impl From<ValueArray> for Resolved {
    fn from(values: ValueArray) -> Self {
        Self::Many(values.into_iter().map(Datum::Node).collect())
    }
}

/// Deferred computation evaluated against a record scope.
pub type Computation = dyn Fn(&Scope<'_>) -> Result<Resolved> + Send + Sync;

/// The value a declaration assigns: a literal, or a computation run against
/// each record.
pub enum ValueSource {
    Literal(Resolved),
    Computed(Box<Computation>),
}

impl ValueSource {
    pub fn literal(value: impl Into<Datum>) -> Self {
        Self::Literal(Resolved::One(value.into()))
    }

    pub fn literals<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Datum>,
    {
        Self::Literal(Resolved::Many(values.into_iter().map(Into::into).collect()))
    }

    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Scope<'_>) -> Result<Resolved> + Send + Sync + 'static,
    {
        Self::Computed(Box::new(f))
    }

    /// Chained child lookups from the record root.
    pub fn field<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path = collect_path(path);
        Self::computed(move |scope| {
            Ok(ValueArray::from(scope.root().clone())
                .field(&path)?
                .into())
        })
    }

    /// Chained child lookups from the record's OAI header.
    pub fn header_field<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path = collect_path(path);
        Self::computed(move |scope| Ok(scope.parser().header()?.field(&path)?.into()))
    }

    /// The value bound by an enclosing `each` iteration.
    pub fn binding(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::computed(move |scope| {
            scope
                .binding(&name)
                .cloned()
                .map(Resolved::One)
                .ok_or_else(|| CrosswalkError::MissingBinding(name.clone()))
        })
    }

    /// Chained child lookups starting at a bound node.
    pub fn binding_field<I, S>(name: impl Into<String>, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let path = collect_path(path);
        Self::computed(move |scope| {
            let bound = scope
                .binding(&name)
                .ok_or_else(|| CrosswalkError::MissingBinding(name.clone()))?;
            let node = bound.as_node().ok_or_else(|| {
                CrosswalkError::UnsupportedOperation(format!(
                    "binding '{name}' is not a record node"
                ))
            })?;
            Ok(ValueArray::from(node.clone()).field(&path)?.into())
        })
    }

    /// Evaluate against a record scope.
    pub fn resolve(&self, scope: &Scope<'_>) -> Result<Resolved> {
        match self {
            Self::Literal(value) => Ok(value.clone()),
            Self::Computed(f) => f(scope),
        }
    }
}

fn collect_path<I, S>(path: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    path.into_iter().map(Into::into).collect()
}

impl fmt::Debug for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<&str> for ValueSource {
    fn from(text: &str) -> Self {
        Self::literal(text)
    }
}

impl From<String> for ValueSource {
    fn from(text: String) -> Self {
        Self::literal(text)
    }
}

impl From<Vec<&str>> for ValueSource {
    fn from(texts: Vec<&str>) -> Self {
        Self::literals(texts)
    }
}

impl From<Datum> for ValueSource {
    fn from(datum: Datum) -> Self {
        Self::Literal(Resolved::One(datum))
    }
}
