//! Named mapping definitions.

use std::collections::HashMap;

use super::resource::Resource;
use super::Mapping;
use crate::error::{CrosswalkError, Result};
use crate::parser::{Parser, ParserConfig};
use crate::record::Record;

struct Definition {
    config: ParserConfig,
    mapping: Mapping,
}

/// Registry of mappings by name, each paired with the parser configuration
/// its records are read with.
#[derive(Default)]
pub struct Mapper {
    definitions: HashMap<String, Definition>,
}

impl Mapper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mapping, replacing any earlier one with the same name.
    pub fn define(&mut self, name: impl Into<String>, config: ParserConfig, mapping: Mapping) {
        self.definitions
            .insert(name.into(), Definition { config, mapping });
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Map a single record.
    pub fn map_one(&self, name: &str, record: &Record) -> Result<Resource> {
        let definition = self.definition(name)?;
        let parser = Parser::parse(record, &definition.config)?;
        definition.mapping.process_record(&parser)
    }

    /// Map records lazily, one result per record.
    ///
    /// The name is checked up front; errors for individual records are
    /// yielded in place and do not stop the iteration.
    pub fn map<'a, I>(
        &'a self,
        name: &str,
        records: I,
    ) -> Result<impl Iterator<Item = Result<Resource>> + 'a>
    where
        I: IntoIterator<Item = Record>,
        I::IntoIter: 'a,
    {
        let definition = self.definition(name)?;
        Ok(records.into_iter().map(move |record| {
            let parser = Parser::parse(&record, &definition.config)?;
            definition.mapping.process_record(&parser)
        }))
    }

    fn definition(&self, name: &str) -> Result<&Definition> {
        self.definitions
            .get(name)
            .ok_or_else(|| CrosswalkError::UnknownMapping(name.to_string()))
    }
}

impl std::fmt::Debug for Mapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mapper")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{Class, ValueSource};
    use crate::parser::Schema;

    fn mapper() -> Mapper {
        let mut mapping = Mapping::new(Class::SourceResource);
        mapping.property("title", ValueSource::field(["dc:title"]));
        let mut mapper = Mapper::new();
        mapper.define("oai_dc", Schema::OaiDc.config(), mapping);
        mapper
    }

    fn record(title: &str) -> Record {
        Record::xml(format!(
            r#"<oai_dc:dc xmlns:oai_dc="http://www.openarchives.org/OAI/2.0/oai_dc/"
                 xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>{title}</dc:title></oai_dc:dc>"#
        ))
    }

    #[test]
    fn test_unknown_mapping() {
        let mapper = mapper();
        let result = mapper.map("nope", Vec::new());
        assert!(matches!(result, Err(CrosswalkError::UnknownMapping(name)) if name == "nope"));
    }

    #[test]
    fn test_map_yields_per_record_results() {
        let mapper = mapper();
        let records = vec![
            record("Comet in Moominland"),
            Record::xml("<unrelated/>"),
            record("Finn Family Moomintroll"),
        ];
        let results: Vec<_> = mapper.map("oai_dc", records).unwrap().collect();
        assert_eq!(results.len(), 3);
        assert_eq!(
            results[0].as_ref().unwrap().texts("title"),
            vec!["Comet in Moominland"]
        );
        assert!(matches!(
            results[1],
            Err(CrosswalkError::EmptyRootNode { .. })
        ));
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_map_is_lazy() {
        let mapper = mapper();
        let mut seen = 0;
        let records = std::iter::from_fn(|| {
            seen += 1;
            Some(record("again"))
        });
        let taken: Vec<_> = mapper.map("oai_dc", records).unwrap().take(2).collect();
        assert_eq!(taken.len(), 2);
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_names_sorted() {
        let mut mapper = mapper();
        mapper.define("mods", Schema::Mods.config(), Mapping::new(Class::SourceResource));
        assert_eq!(mapper.names(), vec!["mods", "oai_dc"]);
        assert!(mapper.contains("mods"));
    }
}
