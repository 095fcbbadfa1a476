//! Declarative record-to-resource mapping.
//!
//! A [`Mapping`] is an ordered list of declarations for one target
//! [`Class`]. Evaluating it against a [`Parser`] builds a [`Resource`]:
//!
//! - `property(name, source)` resolves a [`ValueSource`] and stores the result
//! - `child(name, class, ..)` builds a nested resource from a sub-mapping
//! - `child_each(name, class, each, binding, ..)` builds one nested resource
//!   per element of `each`, with the element bound under `binding`
//! - `uri(source)` sets the resource's subject; only the latest one is kept
//!
//! Bindings live in a [`Scope`] passed down to nested evaluations, so a
//! binding introduced for one child is never visible to its siblings.

mod declaration;
mod mapper;
mod resource;
mod source;
pub mod transforms;

use std::collections::HashMap;

pub use declaration::{
    ChildDeclaration, Declaration, PropertyDeclaration, SubjectDeclaration, Transform,
};
pub use mapper::Mapper;
pub use resource::{Class, Resource, Term};
pub use source::{Computation, Datum, Resolved, ValueSource};

use crate::error::Result;
use crate::parser::Parser;
use crate::value::Value;

/// Evaluation context for one record.
///
/// Child scopes inherit the parent's bindings and may add their own.
#[derive(Debug, Clone)]
pub struct Scope<'a> {
    parser: &'a Parser,
    bindings: HashMap<String, Datum>,
}

impl<'a> Scope<'a> {
    #[must_use]
    pub fn new(parser: &'a Parser) -> Self {
        Self {
            parser,
            bindings: HashMap::new(),
        }
    }

    #[must_use]
    pub fn parser(&self) -> &'a Parser {
        self.parser
    }

    /// Root node of the record being mapped.
    #[must_use]
    pub fn root(&self) -> &'a Value {
        self.parser.root()
    }

    #[must_use]
    pub fn binding(&self, name: &str) -> Option<&Datum> {
        self.bindings.get(name)
    }

    /// A child scope with one more binding.
    #[must_use]
    pub fn bind(&self, name: &str, value: Datum) -> Self {
        let mut child = self.clone();
        child.bindings.insert(name.to_string(), value);
        child
    }
}

/// Ordered declarations producing one [`Resource`] of a given class.
#[derive(Debug)]
pub struct Mapping {
    class: Class,
    declarations: Vec<Declaration>,
}

impl Mapping {
    #[must_use]
    pub fn new(class: Class) -> Self {
        Self {
            class,
            declarations: Vec::new(),
        }
    }

    #[must_use]
    pub fn class(&self) -> &Class {
        &self.class
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Add a declaration. A subject declaration replaces any earlier one.
    pub fn declare(&mut self, declaration: impl Into<Declaration>) -> &mut Self {
        let declaration = declaration.into();
        if matches!(declaration, Declaration::Subject(_)) {
            self.declarations
                .retain(|existing| !matches!(existing, Declaration::Subject(_)));
        }
        self.declarations.push(declaration);
        self
    }

    pub fn uri(&mut self, value: impl Into<ValueSource>) -> &mut Self {
        self.declare(SubjectDeclaration::new(value))
    }

    pub fn property(&mut self, name: &str, value: impl Into<ValueSource>) -> &mut Self {
        self.declare(PropertyDeclaration::new(name, value))
    }

    /// Property whose resolved values each pass through `transform`.
    pub fn property_with<F>(
        &mut self,
        name: &str,
        value: impl Into<ValueSource>,
        transform: F,
    ) -> &mut Self
    where
        F: Fn(Datum) -> Result<Datum> + Send + Sync + 'static,
    {
        self.declare(PropertyDeclaration::new(name, value).with_transform(transform))
    }

    pub fn child<F>(&mut self, name: &str, class: Class, build: F) -> &mut Self
    where
        F: FnOnce(&mut Mapping),
    {
        let mut mapping = Mapping::new(class);
        build(&mut mapping);
        self.declare(ChildDeclaration::new(name, mapping))
    }

    pub fn child_each<F>(
        &mut self,
        name: &str,
        class: Class,
        each: impl Into<ValueSource>,
        binding: &str,
        build: F,
    ) -> &mut Self
    where
        F: FnOnce(&mut Mapping),
    {
        let mut mapping = Mapping::new(class);
        build(&mut mapping);
        self.declare(ChildDeclaration::new(name, mapping).each(each, binding))
    }

    /// Build a resource from one parsed record.
    pub fn process_record(&self, parser: &Parser) -> Result<Resource> {
        self.evaluate(&Scope::new(parser))
    }

    pub(crate) fn evaluate(&self, scope: &Scope<'_>) -> Result<Resource> {
        let mut resource = Resource::new(self.class.clone());
        for declaration in &self.declarations {
            declaration.apply(&mut resource, scope)?;
        }
        tracing::trace!(
            class = %self.class,
            declarations = self.declarations.len(),
            "evaluated mapping"
        );
        Ok(resource)
    }
}
