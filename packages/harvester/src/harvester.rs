//! Lazy record harvesting.
//!
//! A [`Harvester`] exposes a remote collection as lazy sequences. Nothing is
//! fetched until the caller pulls from a sequence, and each page is requested
//! only once the previous one is exhausted.

use crosswalk_core::record::Record;

use crate::client::{HttpOaiClient, OaiClient};
use crate::error::{HarvesterError, Result};
use crate::pager::Pages;
use crate::source::HarvestSource;
use crate::types::{ListOptions, OaiRecord};

/// A source of harvested records.
pub trait Harvester {
    /// Identifiers of every item in the collection, deleted ones included.
    fn record_ids(&self) -> impl Iterator<Item = Result<String>> + '_;

    /// Every live record in the collection.
    fn records(&self) -> impl Iterator<Item = Result<Record>> + '_;

    /// Fetch a single record eagerly.
    fn get_record(&self, identifier: &str) -> Result<Record>;

    /// Number of records in the collection.
    fn count(&self) -> Result<usize>;
}

/// Harvester over an OAI-PMH repository.
#[derive(Debug, Clone)]
pub struct OaiHarvester<C> {
    client: C,
    options: ListOptions,
}

impl<C: OaiClient> OaiHarvester<C> {
    /// Create a harvester; fails if the list options are malformed.
    pub fn new(client: C, options: ListOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { client, options })
    }

    #[must_use]
    pub fn options(&self) -> &ListOptions {
        &self.options
    }

    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }
}

impl OaiHarvester<HttpOaiClient> {
    /// Harvester over HTTP for a configured source.
    pub fn from_source(source: &HarvestSource) -> Result<Self> {
        Self::new(HttpOaiClient::new(&source.endpoint)?, source.list_options())
    }
}

impl<C: OaiClient> Harvester for OaiHarvester<C> {
    fn record_ids(&self) -> impl Iterator<Item = Result<String>> + '_ {
        Pages::new(move |token| self.client.list_identifiers(&self.options, token))
            .map(|header| header.map(|header| header.identifier))
    }

    fn records(&self) -> impl Iterator<Item = Result<Record>> + '_ {
        Pages::new(move |token| self.client.list_records(&self.options, token))
            .filter_map(|record| record.and_then(into_record).transpose())
    }

    fn get_record(&self, identifier: &str) -> Result<Record> {
        let record = self
            .client
            .get_record(identifier, &self.options.metadata_prefix)?;
        into_record(record)?.ok_or_else(|| HarvesterError::MissingElement {
            element: "metadata".to_string(),
            context: format!("record {identifier}"),
        })
    }

    fn count(&self) -> Result<usize> {
        Err(HarvesterError::Unsupported(
            "OAI-PMH has no record count; iterate a bounded sequence instead".to_string(),
        ))
    }
}

/// Wrap a harvested payload as a record named by its identifier.
///
/// Deleted records and records without metadata yield `None`.
fn into_record(record: OaiRecord) -> Result<Option<Record>> {
    let OaiRecord { header, metadata } = record;
    match metadata {
        Some(content) => Ok(Some(Record::xml(content).with_local_name(header.identifier))),
        None => {
            tracing::debug!(
                identifier = %header.identifier,
                deleted = header.deleted,
                "Skipping record without metadata"
            );
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Header, Page};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    const PAGE_SIZE: usize = 2;
    const TOTAL: usize = 7;

    /// Serves a simulated listing of `TOTAL` items and counts requests.
    #[derive(Debug, Default)]
    struct CountingClient {
        requests: Cell<usize>,
    }

    impl CountingClient {
        fn page(&self, token: Option<&str>) -> (usize, Option<String>) {
            self.requests.set(self.requests.get() + 1);
            let start: usize = token.and_then(|t| t.parse().ok()).unwrap_or(0);
            let end = (start + PAGE_SIZE).min(TOTAL);
            (start, (end < TOTAL).then(|| end.to_string()))
        }

        fn header(index: usize) -> Header {
            Header {
                identifier: format!("oai:test:{index}"),
                datestamp: "2014-06-01".to_string(),
                set_specs: Vec::new(),
                deleted: index % 3 == 2,
            }
        }
    }

    impl OaiClient for CountingClient {
        fn list_identifiers(
            &self,
            _options: &ListOptions,
            token: Option<&str>,
        ) -> Result<Page<Header>> {
            let (start, resumption_token) = self.page(token);
            let end = (start + PAGE_SIZE).min(TOTAL);
            Ok(Page {
                items: (start..end).map(Self::header).collect(),
                resumption_token,
            })
        }

        fn list_records(
            &self,
            _options: &ListOptions,
            token: Option<&str>,
        ) -> Result<Page<OaiRecord>> {
            let (start, resumption_token) = self.page(token);
            let end = (start + PAGE_SIZE).min(TOTAL);
            Ok(Page {
                items: (start..end)
                    .map(|index| {
                        let header = Self::header(index);
                        let metadata = (!header.deleted).then(|| format!("<r n=\"{index}\"/>"));
                        OaiRecord { header, metadata }
                    })
                    .collect(),
                resumption_token,
            })
        }

        fn get_record(&self, identifier: &str, _metadata_prefix: &str) -> Result<OaiRecord> {
            self.requests.set(self.requests.get() + 1);
            let index: usize = identifier
                .rsplit(':')
                .next()
                .and_then(|n| n.parse().ok())
                .unwrap_or(0);
            let header = Self::header(index);
            let metadata = (!header.deleted).then(|| format!("<r n=\"{index}\"/>"));
            Ok(OaiRecord { header, metadata })
        }
    }

    fn harvester(client: &CountingClient) -> OaiHarvester<&CountingClient> {
        OaiHarvester::new(client, ListOptions::new("oai_dc")).unwrap()
    }

    #[test]
    fn test_nothing_fetched_until_consumed() {
        let client = CountingClient::default();
        let harvester = harvester(&client);
        let ids = harvester.record_ids();
        assert_eq!(client.requests.get(), 0);
        drop(ids);
        assert_eq!(client.requests.get(), 0);
    }

    #[test]
    fn test_take_three_ids_fetches_two_pages() {
        let client = CountingClient::default();
        let harvester = harvester(&client);

        let ids: Vec<String> = harvester
            .record_ids()
            .take(3)
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(ids, vec!["oai:test:0", "oai:test:1", "oai:test:2"]);
        assert_eq!(client.requests.get(), 2);
    }

    #[test]
    fn test_full_listing_includes_deleted_ids() {
        let client = CountingClient::default();
        let ids: Vec<String> = harvester(&client)
            .record_ids()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(ids.len(), TOTAL);
        assert_eq!(client.requests.get(), 4);
    }

    #[test]
    fn test_records_skip_deleted() {
        let client = CountingClient::default();
        let records: Vec<Record> = harvester(&client)
            .records()
            .take(3)
            .collect::<Result<_>>()
            .unwrap();

        let names: Vec<_> = records.iter().filter_map(Record::local_name).collect();
        assert_eq!(names, vec!["oai:test:0", "oai:test:1", "oai:test:3"]);
        assert_eq!(records[2].content(), "<r n=\"3\"/>");
        assert_eq!(client.requests.get(), 2);
    }

    #[test]
    fn test_sequences_restart_from_scratch() {
        let client = CountingClient::default();
        let harvester = harvester(&client);
        let first: Vec<String> = harvester.record_ids().take(1).collect::<Result<_>>().unwrap();
        let again: Vec<String> = harvester.record_ids().take(1).collect::<Result<_>>().unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_get_record() {
        let client = CountingClient::default();
        let record = harvester(&client).get_record("oai:test:4").unwrap();
        assert_eq!(record.local_name(), Some("oai:test:4"));
        assert_eq!(client.requests.get(), 1);

        let deleted = harvester(&client).get_record("oai:test:5").unwrap_err();
        assert!(matches!(deleted, HarvesterError::MissingElement { .. }));
    }

    #[test]
    fn test_count_is_unsupported() {
        let client = CountingClient::default();
        let err = harvester(&client).count().unwrap_err();
        assert!(matches!(err, HarvesterError::Unsupported(_)));
        assert_eq!(client.requests.get(), 0);
    }

    #[test]
    fn test_invalid_options_rejected() {
        let client = CountingClient::default();
        let err = OaiHarvester::new(&client, ListOptions::new("oai dc")).unwrap_err();
        assert!(matches!(err, HarvesterError::InvalidMetadataPrefix(_)));
    }
}
