//! The three kinds of mapping declaration.

use std::fmt;

use super::resource::{Resource, Term};
use super::source::{Datum, ValueSource};
use super::{Mapping, Scope};
use crate::error::{CrosswalkError, Result};

/// Per-value transform applied after a source resolves.
pub type Transform = dyn Fn(Datum) -> Result<Datum> + Send + Sync;

/// Assign a resolved value to a named property.
pub struct PropertyDeclaration {
    name: String,
    value: ValueSource,
    transform: Option<Box<Transform>>,
}

impl PropertyDeclaration {
    pub fn new(name: impl Into<String>, value: impl Into<ValueSource>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            transform: None,
        }
    }

    /// Transform each resolved value before it is stored.
    #[must_use]
    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(Datum) -> Result<Datum> + Send + Sync + 'static,
    {
        self.transform = Some(Box::new(transform));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, target: &mut Resource, scope: &Scope<'_>) -> Result<()> {
        let mut resolved = self.value.resolve(scope)?;
        if let Some(transform) = &self.transform {
            resolved = resolved.try_map(|datum| transform(datum))?;
        }
        target.set_property(&self.name, resolved.into_vec());
        Ok(())
    }
}

impl fmt::Debug for PropertyDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDeclaration")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

#[derive(Debug)]
struct Each {
    values: ValueSource,
    binding: String,
}

/// Build nested resources from a sub-mapping and append them to a property.
#[derive(Debug)]
pub struct ChildDeclaration {
    name: String,
    mapping: Mapping,
    each: Option<Each>,
}

impl ChildDeclaration {
    pub fn new(name: impl Into<String>, mapping: Mapping) -> Self {
        Self {
            name: name.into(),
            mapping,
            each: None,
        }
    }

    /// Build one child per element of `values`, each evaluated with the
    /// element bound under `binding`.
    #[must_use]
    pub fn each(mut self, values: impl Into<ValueSource>, binding: impl Into<String>) -> Self {
        self.each = Some(Each {
            values: values.into(),
            binding: binding.into(),
        });
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, target: &mut Resource, scope: &Scope<'_>) -> Result<()> {
        let Some(each) = &self.each else {
            let child = self.mapping.evaluate(scope)?;
            target.append(&self.name, Term::Resource(child));
            return Ok(());
        };

        for seed in each.values.resolve(scope)?.into_vec() {
            let child_scope = scope.bind(&each.binding, seed);
            let child = self.mapping.evaluate(&child_scope)?;
            target.append(&self.name, Term::Resource(child));
        }
        Ok(())
    }
}

/// Assign the target's subject URI. The source must resolve to exactly one
/// value.
#[derive(Debug)]
pub struct SubjectDeclaration {
    value: ValueSource,
}

impl SubjectDeclaration {
    pub fn new(value: impl Into<ValueSource>) -> Self {
        Self {
            value: value.into(),
        }
    }

    fn apply(&self, target: &mut Resource, scope: &Scope<'_>) -> Result<()> {
        let mut values = self.value.resolve(scope)?.into_vec();
        if values.len() != 1 {
            return Err(CrosswalkError::InvalidSubject {
                count: values.len(),
            });
        }
        let Some(uri) = values.pop().and_then(|datum| datum.text()) else {
            return Err(CrosswalkError::UnsupportedOperation(
                "subject must be a scalar value".to_string(),
            ));
        };
        target.set_subject(uri);
        Ok(())
    }
}

/// One step of a mapping.
#[derive(Debug)]
pub enum Declaration {
    Property(PropertyDeclaration),
    Child(ChildDeclaration),
    Subject(SubjectDeclaration),
}

impl Declaration {
    pub(crate) fn apply(&self, target: &mut Resource, scope: &Scope<'_>) -> Result<()> {
        match self {
            Self::Property(declaration) => declaration.apply(target, scope),
            Self::Child(declaration) => declaration.apply(target, scope),
            Self::Subject(declaration) => declaration.apply(target, scope),
        }
    }
}

impl From<PropertyDeclaration> for Declaration {
    fn from(declaration: PropertyDeclaration) -> Self {
        Self::Property(declaration)
    }
}

impl From<ChildDeclaration> for Declaration {
    fn from(declaration: ChildDeclaration) -> Self {
        Self::Child(declaration)
    }
}

impl From<SubjectDeclaration> for Declaration {
    fn from(declaration: SubjectDeclaration) -> Self {
        Self::Subject(declaration)
    }
}
