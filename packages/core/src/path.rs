//! Path expressions for XML child lookups.
//!
//! Supports the XPath subset that crosswalk rules actually use:
//!
//! - absolute (`/doc`) and relative (`mods:name`) paths
//! - descendant steps (`//marc:datafield`)
//! - `.` and `..`
//! - `*` and `prefix:*` wildcards
//! - predicates: `[2]`, `[@type]`, `[@type='personal']`, `[mods:role='author']`,
//!   `[.='text']`
//!
//! Unprefixed names match elements without a namespace as well as elements
//! in the default namespace of their scope.

use std::collections::HashSet;

use crate::error::{CrosswalkError, Result};
use crate::value::{NamespaceTable, XmlElement, XmlTree};

/// A compiled path expression.
#[derive(Debug, Clone, PartialEq)]
pub struct PathExpr {
    source: String,
    absolute: bool,
    steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct QName {
    prefix: Option<String>,
    local: String,
}

#[derive(Debug, Clone, PartialEq)]
enum NodeTest {
    Current,
    Parent,
    AnyElement,
    AnyInNamespace(String),
    Named(QName),
}

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    Position(usize),
    HasAttribute(QName),
    AttributeEquals(QName, String),
    HasChild(QName),
    ChildEquals(QName, String),
    TextEquals(String),
}

#[derive(Debug, Clone, PartialEq)]
struct Step {
    axis: Axis,
    test: NodeTest,
    predicates: Vec<Predicate>,
}

impl PathExpr {
    /// Compile a path expression.
    ///
    /// # Examples
    /// ```
    /// use crosswalk_core::path::PathExpr;
    ///
    /// assert!(PathExpr::compile("//marc:datafield[@tag='245']/marc:subfield").is_ok());
    /// assert!(PathExpr::compile("a[").is_err());
    /// assert!(PathExpr::compile("").is_err());
    /// ```
    pub fn compile(expr: &str) -> Result<Self> {
        let source = expr.trim();
        if source.is_empty() {
            return Err(CrosswalkError::invalid_path(expr, "empty expression"));
        }

        let absolute = source.starts_with('/');
        if source == "/" {
            return Ok(Self {
                source: source.to_string(),
                absolute,
                steps: Vec::new(),
            });
        }

        let mut steps = Vec::new();
        let mut rest = source;
        loop {
            let axis = if let Some(r) = rest.strip_prefix("//") {
                rest = r;
                Axis::Descendant
            } else if let Some(r) = rest.strip_prefix('/') {
                rest = r;
                Axis::Child
            } else {
                Axis::Child
            };

            let end = step_end(source, rest)?;
            let text = rest[..end].trim();
            if text.is_empty() {
                return Err(CrosswalkError::invalid_path(source, "empty step"));
            }
            steps.push(parse_step(source, axis, text)?);

            rest = &rest[end..];
            if rest.is_empty() {
                break;
            }
        }

        Ok(Self {
            source: source.to_string(),
            absolute,
            steps,
        })
    }

    /// The expression as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Evaluate against `tree`, starting from node `context`.
    ///
    /// Results are unique and in document order.
    pub(crate) fn evaluate(
        &self,
        tree: &XmlTree,
        namespaces: &NamespaceTable,
        context: usize,
    ) -> Result<Vec<usize>> {
        let mut current = vec![if self.absolute { XmlTree::ROOT } else { context }];

        for step in &self.steps {
            let mut seen = HashSet::new();
            let mut next = Vec::new();
            for &node in &current {
                for id in self.apply_step(step, tree, namespaces, node)? {
                    if seen.insert(id) {
                        next.push(id);
                    }
                }
            }
            // arena ids follow document order
            next.sort_unstable();
            current = next;
            if current.is_empty() {
                break;
            }
        }

        Ok(current)
    }

    /// Apply one step from `node`. Predicates filter each parent's matching
    /// children on their own, so `//a[1]` is the first `a` of every parent.
    fn apply_step(
        &self,
        step: &Step,
        tree: &XmlTree,
        namespaces: &NamespaceTable,
        node: usize,
    ) -> Result<Vec<usize>> {
        let scope: Vec<usize> = match step.axis {
            Axis::Child => vec![node],
            Axis::Descendant => std::iter::once(node).chain(tree.descendants(node)).collect(),
        };

        let groups: Vec<Vec<usize>> = match &step.test {
            NodeTest::Current => vec![scope],
            NodeTest::Parent => vec![scope.iter().filter_map(|id| tree.parent(*id)).collect()],
            test => {
                let matcher = self.resolve_test(test, namespaces)?;
                scope
                    .iter()
                    .map(|&id| {
                        tree.element_children(id)
                            .filter(|child| tree.element(*child).is_some_and(|e| matcher.matches(e)))
                            .collect()
                    })
                    .collect()
            }
        };

        let mut selected = Vec::new();
        for mut group in groups {
            for predicate in &step.predicates {
                group = self.filter(predicate, tree, namespaces, group)?;
            }
            selected.extend(group);
        }
        Ok(selected)
    }

    fn filter(
        &self,
        predicate: &Predicate,
        tree: &XmlTree,
        namespaces: &NamespaceTable,
        candidates: Vec<usize>,
    ) -> Result<Vec<usize>> {
        let kept = match predicate {
            Predicate::Position(position) => candidates
                .get(position - 1)
                .copied()
                .into_iter()
                .collect(),
            Predicate::HasAttribute(name) | Predicate::AttributeEquals(name, _) => {
                let namespace = self.resolve_prefix(name.prefix.as_deref(), namespaces)?;
                let expected = match predicate {
                    Predicate::AttributeEquals(_, value) => Some(value.as_str()),
                    _ => None,
                };
                candidates
                    .into_iter()
                    .filter(|id| {
                        tree.element(*id).is_some_and(|element| {
                            element.attributes.iter().any(|attr| {
                                attr.name == name.local
                                    && attr.namespace.as_deref() == namespace
                                    && expected.map_or(true, |v| attr.value == v)
                            })
                        })
                    })
                    .collect()
            }
            Predicate::HasChild(name) | Predicate::ChildEquals(name, _) => {
                let matcher = self.name_matcher(name, namespaces)?;
                let expected = match predicate {
                    Predicate::ChildEquals(_, value) => Some(value.as_str()),
                    _ => None,
                };
                candidates
                    .into_iter()
                    .filter(|id| {
                        tree.element_children(*id).any(|child| {
                            tree.element(child).is_some_and(|e| matcher.matches(e))
                                && expected.map_or(true, |v| tree.text_content(child).trim() == v)
                        })
                    })
                    .collect()
            }
            Predicate::TextEquals(value) => candidates
                .into_iter()
                .filter(|id| tree.text_content(*id).trim() == value)
                .collect(),
        };
        Ok(kept)
    }

    fn resolve_prefix<'n>(
        &self,
        prefix: Option<&str>,
        namespaces: &'n NamespaceTable,
    ) -> Result<Option<&'n str>> {
        match prefix {
            None => Ok(None),
            Some(prefix) => namespaces
                .get(prefix)
                .map(|uri| Some(uri.as_str()))
                .ok_or_else(|| {
                    CrosswalkError::invalid_path(
                        &self.source,
                        format!("undeclared namespace prefix '{prefix}'"),
                    )
                }),
        }
    }

    fn resolve_test<'n>(
        &self,
        test: &'n NodeTest,
        namespaces: &'n NamespaceTable,
    ) -> Result<Matcher<'n>> {
        Ok(match test {
            NodeTest::AnyElement | NodeTest::Current | NodeTest::Parent => Matcher::Any,
            NodeTest::AnyInNamespace(prefix) => {
                Matcher::Namespace(self.resolve_prefix(Some(prefix), namespaces)?.unwrap_or_default())
            }
            NodeTest::Named(name) => self.name_matcher(name, namespaces)?,
        })
    }

    fn name_matcher<'n>(&self, name: &'n QName, namespaces: &'n NamespaceTable) -> Result<Matcher<'n>> {
        Ok(match self.resolve_prefix(name.prefix.as_deref(), namespaces)? {
            Some(uri) => Matcher::Qualified(uri, &name.local),
            None => Matcher::Local(&name.local),
        })
    }
}

/// A name test with its prefix resolved.
enum Matcher<'a> {
    Any,
    Namespace(&'a str),
    Qualified(&'a str, &'a str),
    Local(&'a str),
}

impl Matcher<'_> {
    fn matches(&self, element: &XmlElement) -> bool {
        match self {
            Self::Any => true,
            Self::Namespace(uri) => element.namespace.as_deref() == Some(*uri),
            Self::Qualified(uri, local) => {
                element.name == *local && element.namespace.as_deref() == Some(*uri)
            }
            Self::Local(local) => {
                element.name == *local
                    && (element.namespace.is_none() || element.in_default_namespace)
            }
        }
    }
}

/// Byte offset of the next `/` outside predicates and string literals.
fn step_end(source: &str, rest: &str) -> Result<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (index, c) in rest.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| CrosswalkError::invalid_path(source, "unbalanced ']'"))?;
            }
            (None, '/') if depth == 0 => return Ok(index),
            _ => {}
        }
    }
    if quote.is_some() {
        return Err(CrosswalkError::invalid_path(source, "unterminated string literal"));
    }
    if depth > 0 {
        return Err(CrosswalkError::invalid_path(source, "unterminated predicate"));
    }
    Ok(rest.len())
}

fn parse_step(source: &str, axis: Axis, text: &str) -> Result<Step> {
    let (test_text, mut rest) = match text.find('[') {
        Some(index) => (text[..index].trim(), &text[index..]),
        None => (text, ""),
    };

    let test = match test_text {
        "." => NodeTest::Current,
        ".." => NodeTest::Parent,
        "*" => NodeTest::AnyElement,
        other => match other.strip_suffix(":*") {
            Some(prefix) => NodeTest::AnyInNamespace(parse_ncname(source, prefix)?.to_string()),
            None => NodeTest::Named(parse_qname(source, other)?),
        },
    };

    let mut predicates = Vec::new();
    while !rest.is_empty() {
        let close = predicate_end(source, rest)?;
        predicates.push(parse_predicate(source, rest[1..close].trim())?);
        rest = rest[close + 1..].trim_start();
    }

    Ok(Step {
        axis,
        test,
        predicates,
    })
}

/// Index of the `]` closing the predicate that `rest` starts with.
fn predicate_end(source: &str, rest: &str) -> Result<usize> {
    if !rest.starts_with('[') {
        return Err(CrosswalkError::invalid_path(
            source,
            format!("unexpected '{rest}' after node test"),
        ));
    }
    let mut quote: Option<char> = None;
    for (index, c) in rest.char_indices().skip(1) {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, ']') => return Ok(index),
            _ => {}
        }
    }
    Err(CrosswalkError::invalid_path(source, "unterminated predicate"))
}

fn parse_predicate(source: &str, text: &str) -> Result<Predicate> {
    if text.is_empty() {
        return Err(CrosswalkError::invalid_path(source, "empty predicate"));
    }

    if text.chars().all(|c| c.is_ascii_digit()) {
        return match text.parse::<usize>() {
            Ok(position) if position > 0 => Ok(Predicate::Position(position)),
            _ => Err(CrosswalkError::invalid_path(
                source,
                "positions start at 1",
            )),
        };
    }

    let (lhs, literal) = match text.split_once('=') {
        Some((lhs, rhs)) => (lhs.trim(), Some(parse_literal(source, rhs.trim())?)),
        None => (text, None),
    };

    if let Some(attribute) = lhs.strip_prefix('@') {
        let name = parse_qname(source, attribute.trim())?;
        return Ok(match literal {
            Some(value) => Predicate::AttributeEquals(name, value),
            None => Predicate::HasAttribute(name),
        });
    }

    if lhs == "." {
        return literal.map(Predicate::TextEquals).ok_or_else(|| {
            CrosswalkError::invalid_path(source, "'[.]' needs a comparison")
        });
    }

    let name = parse_qname(source, lhs)?;
    Ok(match literal {
        Some(value) => Predicate::ChildEquals(name, value),
        None => Predicate::HasChild(name),
    })
}

fn parse_literal(source: &str, text: &str) -> Result<String> {
    let mut chars = text.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open), Some(close)) if open == close && (open == '\'' || open == '"') => {
            Ok(text[1..text.len() - 1].to_string())
        }
        _ => Err(CrosswalkError::invalid_path(
            source,
            format!("expected quoted literal, found '{text}'"),
        )),
    }
}

fn parse_qname(source: &str, text: &str) -> Result<QName> {
    match text.split_once(':') {
        Some((prefix, local)) => Ok(QName {
            prefix: Some(parse_ncname(source, prefix)?.to_string()),
            local: parse_ncname(source, local)?.to_string(),
        }),
        None => Ok(QName {
            prefix: None,
            local: parse_ncname(source, text)?.to_string(),
        }),
    }
}

fn parse_ncname<'a>(source: &str, text: &'a str) -> Result<&'a str> {
    let mut chars = text.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(text)
    } else {
        Err(CrosswalkError::invalid_path(
            source,
            format!("invalid name '{text}'"),
        ))
    }
}
