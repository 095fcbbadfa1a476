//! Crosswalk core - turn harvested metadata records into a typed entity graph.
//!
//! This crate provides the format-independent pieces of the ingest pipeline:
//!
//! - [`record`]: Raw record content tagged with its content type
//! - [`value`]: Backend-specific node wrappers (XML, JSON) behind one
//!   navigation contract, plus [`ValueArray`] for path lookups over many nodes
//! - [`path`]: The XPath subset used for XML child lookups
//! - [`parser`]: Parser configuration, schema presets and OAI header access
//! - [`mapping`]: The declarative mapping DSL and the resulting [`Resource`] graph
//! - [`date`]: Heuristic free-text to extended date normalization
//! - [`error`]: Error types and Result alias
//!
//! # Example
//!
//! ```
//! use crosswalk_core::mapping::{Class, Mapping, ValueSource};
//! use crosswalk_core::parser::{Parser, Schema};
//! use crosswalk_core::record::Record;
//!
//! let record = Record::xml(
//!     r#"<mods xmlns="http://www.loc.gov/mods/v3">
//!          <titleInfo><title>Moominsummer Madness</title></titleInfo>
//!        </mods>"#,
//! );
//! let parser = Parser::parse(&record, &Schema::Mods.config()).unwrap();
//!
//! let mut mapping = Mapping::new(Class::SourceResource);
//! mapping.property("title", ValueSource::field(["mods:titleInfo", "mods:title"]));
//!
//! let resource = mapping.process_record(&parser).unwrap();
//! assert_eq!(resource.texts("title"), vec!["Moominsummer Madness"]);
//! ```

pub mod date;
pub mod error;
pub mod mapping;
pub mod parser;
pub mod path;
pub mod record;
pub mod value;

// Re-export commonly used items
pub use date::{ExtendedDate, PartialDate, Precision};
pub use error::{CrosswalkError, Result};
pub use mapping::{Class, Datum, Mapper, Mapping, Resource, ValueSource};
pub use parser::{OaiHeaders, Parser, ParserConfig, Schema};
pub use record::{ContentType, Record};
pub use value::{Navigate, Value, ValueArray};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
