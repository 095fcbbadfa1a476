//! Record parsers.
//!
//! A [`Parser`] turns a [`Record`] into a tree of [`Value`]s and picks out the
//! root node mapping rules operate on. Schema-specific parsers are plain
//! [`ParserConfig`] presets (see [`Schema`]); they differ only in their root
//! path and namespace table.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{CrosswalkError, Result};
use crate::record::{ContentType, Record};
use crate::value::{JsonValue, NamespaceTable, Value, ValueArray, XmlTree, XmlValue};

/// OAI-PMH namespace, bound to the `oai` prefix for header lookups.
pub const OAI_NAMESPACE: &str = "http://www.openarchives.org/OAI/2.0/";

/// Path of the OAI-PMH `<header>` element, relative to the document.
const OAI_HEADER_PATH: &str = "//oai:header";

/// How to locate the root of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    content_type: ContentType,
    root_path: String,
    namespaces: NamespaceTable,
    oai_headers: bool,
}

impl ParserConfig {
    /// XML parser rooted at a path expression.
    #[must_use]
    pub fn xml(root_path: impl Into<String>) -> Self {
        Self {
            content_type: ContentType::Xml,
            root_path: root_path.into(),
            namespaces: NamespaceTable::new(),
            oai_headers: false,
        }
    }

    /// JSON parser rooted at a dotted key path (empty for the whole document).
    #[must_use]
    pub fn json(root_path: impl Into<String>) -> Self {
        Self {
            content_type: ContentType::Json,
            root_path: root_path.into(),
            namespaces: NamespaceTable::new(),
            oai_headers: false,
        }
    }

    /// Replace the root path.
    #[must_use]
    pub fn with_root_path(mut self, root_path: impl Into<String>) -> Self {
        self.root_path = root_path.into();
        self
    }

    /// Bind a namespace prefix, overriding any declaration in the document.
    #[must_use]
    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.insert(prefix.into(), uri.into());
        self
    }

    /// Opt into OAI-PMH header access (see [`OaiHeaders`]).
    #[must_use]
    pub fn with_oai_headers(mut self) -> Self {
        self.oai_headers = true;
        self
    }

    #[must_use]
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    #[must_use]
    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    #[must_use]
    pub fn namespaces(&self) -> &NamespaceTable {
        &self.namespaces
    }

    #[must_use]
    pub fn oai_headers(&self) -> bool {
        self.oai_headers
    }
}

/// Metadata schemas with a preset parser configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Schema {
    /// Metadata Object Description Schema.
    Mods,
    /// MARC 21 in XML.
    Marcxml,
    /// Simple Dublin Core as wrapped by OAI-PMH.
    OaiDc,
    /// Qualified Dublin Core.
    Qdc,
    /// Ex Libris Primo search results.
    Primo,
    /// Smithsonian EDAN records.
    Smithsonian,
}

impl Schema {
    pub const ALL: [Schema; 6] = [
        Self::Mods,
        Self::Marcxml,
        Self::OaiDc,
        Self::Qdc,
        Self::Primo,
        Self::Smithsonian,
    ];

    /// The preset configuration for this schema.
    ///
    /// # Examples
    /// ```
    /// use crosswalk_core::parser::Schema;
    ///
    /// let config = Schema::Mods.config();
    /// assert_eq!(config.root_path(), "//mods:mods");
    /// assert_eq!(config.namespaces()["mods"], "http://www.loc.gov/mods/v3");
    /// ```
    #[must_use]
    pub fn config(&self) -> ParserConfig {
        match self {
            Self::Mods => ParserConfig::xml("//mods:mods")
                .with_namespace("mods", "http://www.loc.gov/mods/v3"),
            Self::Marcxml => ParserConfig::xml("//marc:record")
                .with_namespace("marc", "http://www.loc.gov/MARC21/slim")
                .with_oai_headers(),
            Self::OaiDc => ParserConfig::xml("//oai_dc:dc")
                .with_namespace("oai_dc", "http://www.openarchives.org/OAI/2.0/oai_dc/")
                .with_namespace("dc", "http://purl.org/dc/elements/1.1/")
                .with_oai_headers(),
            Self::Qdc => ParserConfig::xml("//qdc:qualifieddc")
                .with_namespace("qdc", "http://worldcat.org/xmlschemas/qdc-1.0/")
                .with_namespace("dc", "http://purl.org/dc/elements/1.1/")
                .with_namespace("dcterms", "http://purl.org/dc/terms/"),
            Self::Primo => ParserConfig::xml("//sear:DOC")
                .with_namespace("sear", "http://www.exlibrisgroup.com/xsd/jaguar/search")
                .with_namespace("primo", "http://www.exlibrisgroup.com/xsd/primo/primo_nm_bib"),
            Self::Smithsonian => ParserConfig::xml("//doc").with_oai_headers(),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mods => "mods",
            Self::Marcxml => "marcxml",
            Self::OaiDc => "oai_dc",
            Self::Qdc => "qdc",
            Self::Primo => "primo",
            Self::Smithsonian => "smithsonian",
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Schema {
    type Err = CrosswalkError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|schema| schema.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CrosswalkError::UnknownSchema(s.to_string()))
    }
}

/// A parsed record with its root resolved.
#[derive(Debug, Clone)]
pub struct Parser {
    record: Record,
    config: ParserConfig,
    document: Value,
    root: Value,
}

impl Parser {
    /// Parse a record and resolve the configured root.
    ///
    /// Fails with [`CrosswalkError::EmptyRootNode`] when the root path matches
    /// nothing.
    pub fn parse(record: &Record, config: &ParserConfig) -> Result<Self> {
        if record.content_type() != config.content_type() {
            return Err(CrosswalkError::ContentType {
                expected: config.content_type().to_string(),
                actual: record.content_type().to_string(),
            });
        }

        let (document, root) = match config.content_type() {
            ContentType::Xml => Self::parse_xml(record, config)?,
            ContentType::Json => Self::parse_json(record, config)?,
        };

        tracing::debug!(
            root_path = config.root_path(),
            local_name = record.local_name(),
            "Parsed record"
        );

        Ok(Self {
            record: record.clone(),
            config: config.clone(),
            document,
            root,
        })
    }

    fn parse_xml(record: &Record, config: &ParserConfig) -> Result<(Value, Value)> {
        let tree = Arc::new(XmlTree::parse(record.content())?);

        let mut namespaces = tree.declared_namespaces().clone();
        namespaces.extend(
            config
                .namespaces()
                .iter()
                .map(|(prefix, uri)| (prefix.clone(), uri.clone())),
        );

        let document = XmlValue::document(tree, Arc::new(namespaces));
        let root_path = match config.root_path().trim() {
            "" => "/*",
            path => path,
        };
        let root = document
            .xpath(root_path)?
            .into_iter()
            .next()
            .ok_or_else(|| CrosswalkError::EmptyRootNode {
                root_path: config.root_path().to_string(),
            })?;

        Ok((Value::Xml(document), root))
    }

    fn parse_json(record: &Record, config: &ParserConfig) -> Result<(Value, Value)> {
        let json: serde_json::Value = serde_json::from_str(record.content())?;
        let document = Value::Json(JsonValue::document(Arc::new(json)));

        let mut current = ValueArray::from(document.clone());
        for segment in config.root_path().split('.').filter(|s| !s.is_empty()) {
            current = current.child(segment)?;
        }

        let root = current
            .into_iter()
            .next()
            .ok_or_else(|| CrosswalkError::EmptyRootNode {
                root_path: config.root_path().to_string(),
            })?;

        Ok((document, root))
    }

    /// The node mapping rules operate against.
    #[must_use]
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// The whole document, above the configured root.
    #[must_use]
    pub fn document(&self) -> &Value {
        &self.document
    }

    #[must_use]
    pub fn record(&self) -> &Record {
        &self.record
    }

    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }
}

/// Access to the OAI-PMH `<header>` wrapping a harvested record.
///
/// Available to any XML parser whose configuration opted in with
/// [`ParserConfig::with_oai_headers`], independent of the metadata schema.
pub trait OaiHeaders {
    /// The `<header>` element as a one-element array (empty when the record
    /// carries no header).
    fn header(&self) -> Result<ValueArray>;
}

impl OaiHeaders for Parser {
    fn header(&self) -> Result<ValueArray> {
        let Value::Xml(document) = &self.document else {
            return Err(CrosswalkError::UnsupportedOperation(
                "OAI headers require an XML record".to_string(),
            ));
        };
        if !self.config.oai_headers() {
            return Err(CrosswalkError::UnsupportedOperation(
                "parser is not configured for OAI headers".to_string(),
            ));
        }

        Ok(document
            .with_namespace("oai", OAI_NAMESPACE)
            .xpath(OAI_HEADER_PATH)?
            .first_value())
    }
}
