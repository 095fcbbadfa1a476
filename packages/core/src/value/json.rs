//! JSON backend.
//!
//! A [`JsonValue`] is a shared document plus a JSON pointer to one node in it.

use std::sync::Arc;

use serde_json::Value as Json;

use super::{Navigate, Value, ValueArray};
use crate::error::{CrosswalkError, Result};

/// A node inside a JSON record.
#[derive(Debug, Clone)]
pub struct JsonValue {
    document: Arc<Json>,
    pointer: String,
}

impl JsonValue {
    /// The top-level node of a document.
    #[must_use]
    pub fn document(document: Arc<Json>) -> Self {
        Self {
            document,
            pointer: String::new(),
        }
    }

    fn at(&self, pointer: String) -> Self {
        Self {
            document: Arc::clone(&self.document),
            pointer,
        }
    }

    /// JSON pointer to this node within its document.
    #[must_use]
    pub fn pointer(&self) -> &str {
        &self.pointer
    }

    /// The raw JSON node.
    #[must_use]
    pub fn node(&self) -> &Json {
        self.document.pointer(&self.pointer).unwrap_or(&Json::Null)
    }

    /// The node keys are looked up on: arrays are flattened and their first
    /// leaf element is used in their place.
    fn lookup_base(&self) -> Option<(String, &Json)> {
        first_flattened(self.pointer.clone(), self.node())
    }
}

/// Depth-first first non-array element of a (possibly nested) array.
fn first_flattened(pointer: String, node: &Json) -> Option<(String, &Json)> {
    match node {
        Json::Array(items) => items
            .iter()
            .enumerate()
            .find_map(|(index, item)| first_flattened(format!("{pointer}/{index}"), item)),
        other => Some((pointer, other)),
    }
}

fn escape_token(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

impl Navigate for JsonValue {
    fn name(&self) -> String {
        self.pointer
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .replace("~1", "/")
            .replace("~0", "~")
    }

    fn attributes(&self) -> Result<Vec<String>> {
        Err(CrosswalkError::UnsupportedOperation(
            "JSON nodes have no attributes".to_string(),
        ))
    }

    fn attribute(&self, _name: &str) -> Result<Option<String>> {
        Err(CrosswalkError::UnsupportedOperation(
            "JSON nodes have no attributes".to_string(),
        ))
    }

    fn children(&self) -> Vec<String> {
        match self.lookup_base() {
            Some((_, Json::Object(map))) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    fn value(&self) -> String {
        match self.node() {
            Json::Null => String::new(),
            Json::String(text) => text.clone(),
            other => other.to_string(),
        }
    }

    fn has_values(&self) -> bool {
        !matches!(self.node(), Json::Object(_))
    }

    fn child(&self, name: &str) -> Result<ValueArray> {
        let Some((base_pointer, base)) = self.lookup_base() else {
            return Ok(ValueArray::default());
        };
        let child_pointer = format!("{base_pointer}/{}", escape_token(name));

        let values = match base.get(name) {
            None | Some(Json::Null) => Vec::new(),
            Some(Json::Array(items)) => items
                .iter()
                .enumerate()
                .filter(|(_, item)| !item.is_null())
                .map(|(index, _)| Value::Json(self.at(format!("{child_pointer}/{index}"))))
                .collect(),
            Some(_) => vec![Value::Json(self.at(child_pointer))],
        };

        Ok(ValueArray::new(values))
    }
}
