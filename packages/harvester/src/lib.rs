//! Crosswalk Harvester - Lazy OAI-PMH harvesting of metadata records.
//!
//! This crate walks OAI-PMH repositories page by page and hands each
//! harvested payload to the core crate as a [`Record`](crosswalk_core::Record),
//! ready for a schema parser and a mapping.
//!
//! # Example
//!
//! ```
//! use crosswalk_harvester::config;
//! use crosswalk_harvester::types::ListOptions;
//!
//! assert!(config::validate_endpoint("https://example.org/oai").is_ok());
//! assert!(ListOptions::new("oai_dc").with_from("2014-06-01").validate().is_ok());
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Configuration constants and validation
//! - [`source`]: Harvest source files (YAML)
//! - [`types`]: Headers, records, pages and list options
//! - [`error`]: Error types and Result alias
//! - [`http`]: HTTP client with retry
//! - [`response`]: OAI-PMH response parsing
//! - [`xml`]: XML utilities
//! - [`client`]: Protocol client seam and HTTP implementation
//! - [`pager`]: Lazy iteration over resumable pages
//! - [`harvester`]: The harvester trait and its OAI-PMH implementation
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod harvester;
pub mod http;
pub mod pager;
pub mod response;
pub mod source;
pub mod types;
pub mod xml;

// Re-export commonly used items
pub use client::{HttpOaiClient, OaiClient};
pub use config::{validate_datestamp, validate_endpoint, validate_metadata_prefix};
pub use error::{HarvesterError, Result};
pub use harvester::{Harvester, OaiHarvester};
pub use source::{HarvestSource, SourceType};
pub use types::{Header, ListOptions, OaiRecord, Page};
