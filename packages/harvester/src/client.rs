//! OAI-PMH protocol client.
//!
//! [`OaiClient`] is the seam between the lazy harvester and the network.
//! [`HttpOaiClient`] speaks OAI-PMH over HTTP; tests substitute in-memory
//! implementations.

use reqwest::blocking::Client;
use url::Url;

use crate::config::validate_endpoint;
use crate::error::Result;
use crate::http::{create_client, fetch_xml};
use crate::response::{parse_get_record, parse_identifiers, parse_records};
use crate::types::{Header, ListOptions, OaiRecord, Page, Verb};

/// One request per call; pagination state lives with the caller.
pub trait OaiClient {
    /// Fetch one `ListIdentifiers` page. With a token, `options` are not resent.
    fn list_identifiers(&self, options: &ListOptions, token: Option<&str>)
        -> Result<Page<Header>>;

    /// Fetch one `ListRecords` page. With a token, `options` are not resent.
    fn list_records(&self, options: &ListOptions, token: Option<&str>) -> Result<Page<OaiRecord>>;

    fn get_record(&self, identifier: &str, metadata_prefix: &str) -> Result<OaiRecord>;
}

impl<C: OaiClient + ?Sized> OaiClient for &C {
    fn list_identifiers(
        &self,
        options: &ListOptions,
        token: Option<&str>,
    ) -> Result<Page<Header>> {
        (**self).list_identifiers(options, token)
    }

    fn list_records(&self, options: &ListOptions, token: Option<&str>) -> Result<Page<OaiRecord>> {
        (**self).list_records(options, token)
    }

    fn get_record(&self, identifier: &str, metadata_prefix: &str) -> Result<OaiRecord> {
        (**self).get_record(identifier, metadata_prefix)
    }
}

/// OAI-PMH over HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpOaiClient {
    client: Client,
    endpoint: Url,
}

impl HttpOaiClient {
    /// Create a client for a repository base URL.
    pub fn new(endpoint: &str) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            endpoint: validate_endpoint(endpoint)?,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Build the request URL for a verb and its arguments.
    ///
    /// # Examples
    /// ```
    /// use crosswalk_harvester::client::HttpOaiClient;
    /// use crosswalk_harvester::types::{ListOptions, Verb};
    ///
    /// let client = HttpOaiClient::new("https://example.org/oai").unwrap();
    /// let url = client.request_url(Verb::ListRecords, &ListOptions::new("oai_dc").query());
    /// assert_eq!(url.as_str(), "https://example.org/oai?verb=ListRecords&metadataPrefix=oai_dc");
    /// ```
    #[must_use]
    pub fn request_url(&self, verb: Verb, arguments: &[(&str, String)]) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("verb", verb.as_str());
            for (key, value) in arguments {
                pairs.append_pair(key, value);
            }
        }
        url
    }

    fn fetch(&self, verb: Verb, arguments: &[(&str, String)]) -> Result<String> {
        let url = self.request_url(verb, arguments);
        tracing::debug!(verb = %verb, url = %url, "Requesting OAI-PMH page");
        fetch_xml(&self.client, url.as_str())
    }

    fn list_arguments(options: &ListOptions, token: Option<&str>) -> Vec<(&'static str, String)> {
        match token {
            Some(token) => vec![("resumptionToken", token.to_string())],
            None => options.query(),
        }
    }
}

impl OaiClient for HttpOaiClient {
    fn list_identifiers(
        &self,
        options: &ListOptions,
        token: Option<&str>,
    ) -> Result<Page<Header>> {
        let xml = self.fetch(
            Verb::ListIdentifiers,
            &Self::list_arguments(options, token),
        )?;
        parse_identifiers(&xml)
    }

    fn list_records(&self, options: &ListOptions, token: Option<&str>) -> Result<Page<OaiRecord>> {
        let xml = self.fetch(Verb::ListRecords, &Self::list_arguments(options, token))?;
        parse_records(&xml)
    }

    fn get_record(&self, identifier: &str, metadata_prefix: &str) -> Result<OaiRecord> {
        let xml = self.fetch(
            Verb::GetRecord,
            &[
                ("identifier", identifier.to_string()),
                ("metadataPrefix", metadata_prefix.to_string()),
            ],
        )?;
        parse_get_record(&xml)
    }
}
