//! Configuration constants and validation functions for the harvester.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::error::{HarvesterError, Result};

/// HTTP timeout in seconds.
///
/// Large `ListRecords` pages from slow repositories can take a while.
pub const HTTP_TIMEOUT_SECS: u64 = 60;

/// User agent string identifying this harvester.
pub const USER_AGENT: &str = concat!("crosswalk-harvester/", env!("CARGO_PKG_VERSION"));

/// Maximum number of attempts for transient failures.
pub const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
pub const RETRY_BASE_DELAY_MS: u64 = 500;

/// Longest server-requested `Retry-After` delay honoured (seconds).
pub const MAX_RETRY_AFTER_SECS: u64 = 300;

/// Metadata prefix: URL-safe unreserved characters only.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static METADATA_PREFIX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9\-_.!~*'()]+$").expect("valid regex"));

/// Datestamp: day granularity or seconds granularity in UTC.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATESTAMP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}(?:T\d{2}:\d{2}:\d{2}Z)?$").expect("valid regex")
});

/// Validate an OAI-PMH base URL.
///
/// # Examples
/// ```
/// use crosswalk_harvester::config::validate_endpoint;
///
/// assert!(validate_endpoint("https://example.org/oai").is_ok());
/// assert!(validate_endpoint("ftp://example.org/oai").is_err());
/// assert!(validate_endpoint("not a url").is_err());
/// ```
pub fn validate_endpoint(endpoint: &str) -> Result<Url> {
    let url =
        Url::parse(endpoint).map_err(|_| HarvesterError::InvalidEndpoint(endpoint.to_string()))?;
    match url.scheme() {
        "http" | "https" if url.host().is_some() => Ok(url),
        _ => Err(HarvesterError::InvalidEndpoint(endpoint.to_string())),
    }
}

/// Validate a metadata prefix such as `oai_dc` or `marc21`.
///
/// # Examples
/// ```
/// use crosswalk_harvester::config::validate_metadata_prefix;
///
/// assert!(validate_metadata_prefix("oai_dc").is_ok());
/// assert!(validate_metadata_prefix("oai dc").is_err());
/// ```
pub fn validate_metadata_prefix(prefix: &str) -> Result<()> {
    if METADATA_PREFIX_PATTERN.is_match(prefix) {
        Ok(())
    } else {
        Err(HarvesterError::InvalidMetadataPrefix(prefix.to_string()))
    }
}

/// Validate a `from`/`until` datestamp.
///
/// # Examples
/// ```
/// use crosswalk_harvester::config::validate_datestamp;
///
/// assert!(validate_datestamp("2014-06-01").is_ok());
/// assert!(validate_datestamp("2014-06-01T10:00:00Z").is_ok());
/// assert!(validate_datestamp("2014-13-01").is_err()); // Invalid month
/// ```
pub fn validate_datestamp(datestamp: &str) -> Result<()> {
    if !DATESTAMP_PATTERN.is_match(datestamp) {
        return Err(HarvesterError::InvalidDatestamp(datestamp.to_string()));
    }

    let valid = if datestamp.len() == 10 {
        chrono::NaiveDate::parse_from_str(datestamp, "%Y-%m-%d").is_ok()
    } else {
        chrono::NaiveDateTime::parse_from_str(datestamp, "%Y-%m-%dT%H:%M:%SZ").is_ok()
    };

    if valid {
        Ok(())
    } else {
        Err(HarvesterError::InvalidDatestamp(datestamp.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_endpoint_valid() {
        let url = validate_endpoint("http://example.org/oai/request").unwrap();
        assert_eq!(url.path(), "/oai/request");
        assert!(validate_endpoint("https://example.org").is_ok());
    }

    #[test]
    fn test_validate_endpoint_invalid() {
        assert!(validate_endpoint("").is_err());
        assert!(validate_endpoint("example.org/oai").is_err());
        assert!(validate_endpoint("file:///tmp/oai.xml").is_err());
    }

    #[test]
    fn test_validate_metadata_prefix() {
        assert!(validate_metadata_prefix("oai_dc").is_ok());
        assert!(validate_metadata_prefix("marc21").is_ok());
        assert!(validate_metadata_prefix("mods-3.5").is_ok());
        assert!(validate_metadata_prefix("").is_err());
        assert!(validate_metadata_prefix("a&b").is_err());
    }

    #[test]
    fn test_validate_datestamp_valid() {
        assert!(validate_datestamp("2014-06-01").is_ok());
        assert!(validate_datestamp("2000-02-29").is_ok());
        assert!(validate_datestamp("2014-06-01T23:59:59Z").is_ok());
    }

    #[test]
    fn test_validate_datestamp_invalid() {
        assert!(validate_datestamp("").is_err());
        assert!(validate_datestamp("2014/06/01").is_err());
        assert!(validate_datestamp("2014-6-1").is_err());
        assert!(validate_datestamp("2014-02-30").is_err());
        assert!(validate_datestamp("2014-06-01T25:00:00Z").is_err());
        assert!(validate_datestamp("2014-06-01T10:00:00").is_err());
    }
}
