//! Core data types for the harvester.
//!
//! These types model the parts of an OAI-PMH response the harvester consumes:
//! record headers, metadata payloads and resumable pages.

use std::fmt;

use crate::config::{validate_datestamp, validate_metadata_prefix};
use crate::error::Result;

/// OAI-PMH verbs the harvester issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    ListIdentifiers,
    ListRecords,
    GetRecord,
}

impl Verb {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListIdentifiers => "ListIdentifiers",
            Self::ListRecords => "ListRecords",
            Self::GetRecord => "GetRecord",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An OAI-PMH record header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Unique identifier of the item in the repository.
    pub identifier: String,

    /// Date of creation, modification or deletion.
    pub datestamp: String,

    /// Sets the item belongs to.
    pub set_specs: Vec<String>,

    /// Whether the header carries `status="deleted"`.
    pub deleted: bool,
}

/// One harvested record: its header and the serialized metadata payload.
///
/// `metadata` is `None` for deleted records. When present it is a standalone
/// XML document holding the whole `<record>` element, so schema parsers can
/// reach both the header and the metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OaiRecord {
    pub header: Header,
    pub metadata: Option<String>,
}

/// One page of a list response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,

    /// Token for the next page; `None` when the listing is complete.
    pub resumption_token: Option<String>,
}

impl<T> Page<T> {
    /// A final page with no items.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            resumption_token: None,
        }
    }
}

/// Selective harvesting arguments for list requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    pub metadata_prefix: String,

    pub set: Option<String>,

    pub from: Option<String>,

    pub until: Option<String>,
}

impl ListOptions {
    #[must_use]
    pub fn new(metadata_prefix: impl Into<String>) -> Self {
        Self {
            metadata_prefix: metadata_prefix.into(),
            set: None,
            from: None,
            until: None,
        }
    }

    #[must_use]
    pub fn with_set(mut self, set: impl Into<String>) -> Self {
        self.set = Some(set.into());
        self
    }

    #[must_use]
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    #[must_use]
    pub fn with_until(mut self, until: impl Into<String>) -> Self {
        self.until = Some(until.into());
        self
    }

    /// Check the prefix and datestamps before any request goes out.
    pub fn validate(&self) -> Result<()> {
        validate_metadata_prefix(&self.metadata_prefix)?;
        for datestamp in self.from.iter().chain(self.until.iter()) {
            validate_datestamp(datestamp)?;
        }
        Ok(())
    }

    /// Query arguments for an initial list request.
    #[must_use]
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("metadataPrefix", self.metadata_prefix.clone())];
        if let Some(set) = &self.set {
            query.push(("set", set.clone()));
        }
        if let Some(from) = &self.from {
            query.push(("from", from.clone()));
        }
        if let Some(until) = &self.until {
            query.push(("until", until.clone()));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_query_order() {
        let options = ListOptions::new("oai_dc")
            .with_set("maps")
            .with_from("2014-01-01");
        assert_eq!(
            options.query(),
            vec![
                ("metadataPrefix", "oai_dc".to_string()),
                ("set", "maps".to_string()),
                ("from", "2014-01-01".to_string()),
            ]
        );
    }

    #[test]
    fn test_validate_rejects_bad_datestamp() {
        let options = ListOptions::new("oai_dc").with_until("last week");
        assert!(options.validate().is_err());
        assert!(ListOptions::new("oai_dc").validate().is_ok());
    }

    #[test]
    fn test_verb_display() {
        assert_eq!(Verb::ListRecords.to_string(), "ListRecords");
    }
}
