//! Harvest source configuration.
//!
//! A harvest source names a repository endpoint and the metadata format to
//! request from it, and picks the parser for the records that come back.
//!
//! ```yaml
//! endpoint: https://example.org/oai
//! metadata_prefix: oai_dc
//! set: maps
//! source_type: oai_dc
//! ```

use std::fs;
use std::path::Path;

use clap::ValueEnum;
use crosswalk_core::parser::{ParserConfig, Schema};
use serde::{Deserialize, Serialize};

use crate::config::{validate_endpoint, validate_metadata_prefix};
use crate::error::Result;
use crate::types::ListOptions;

/// Record format a source delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum SourceType {
    Mods,
    Marcxml,
    OaiDc,
    Qdc,
    Primo,
    Smithsonian,
    Json,
}

impl SourceType {
    /// The XML schema preset, if this is an XML format.
    #[must_use]
    pub fn schema(&self) -> Option<Schema> {
        match self {
            Self::Mods => Some(Schema::Mods),
            Self::Marcxml => Some(Schema::Marcxml),
            Self::OaiDc => Some(Schema::OaiDc),
            Self::Qdc => Some(Schema::Qdc),
            Self::Primo => Some(Schema::Primo),
            Self::Smithsonian => Some(Schema::Smithsonian),
            Self::Json => None,
        }
    }

    /// Parser configuration for records from this source.
    ///
    /// # Examples
    /// ```
    /// use crosswalk_core::record::ContentType;
    /// use crosswalk_harvester::source::SourceType;
    ///
    /// assert_eq!(SourceType::Mods.parser_config().root_path(), "//mods:mods");
    /// assert_eq!(SourceType::Json.parser_config().content_type(), ContentType::Json);
    /// ```
    #[must_use]
    pub fn parser_config(&self) -> ParserConfig {
        self.schema()
            .map_or_else(|| ParserConfig::json(""), |schema| schema.config())
    }
}

/// A repository to harvest from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestSource {
    pub endpoint: String,
    pub metadata_prefix: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<String>,

    pub source_type: SourceType,
}

impl HarvestSource {
    /// Parse and validate a source from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let source: Self = serde_yaml_ng::from_str(yaml)?;
        source.validate()?;
        Ok(source)
    }

    /// Load and validate a source from a YAML file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let yaml = fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<()> {
        validate_endpoint(&self.endpoint)?;
        validate_metadata_prefix(&self.metadata_prefix)
    }

    #[must_use]
    pub fn list_options(&self) -> ListOptions {
        let options = ListOptions::new(&self.metadata_prefix);
        match &self.set {
            Some(set) => options.with_set(set),
            None => options,
        }
    }

    #[must_use]
    pub fn parser_config(&self) -> ParserConfig {
        self.source_type.parser_config()
    }
}
