//! HTTP transport for OAI-PMH requests.
//!
//! Repositories throttle harvesters with `503 Service Unavailable` plus a
//! `Retry-After` header (OAI-PMH 2.0, section 3.1.2.1). [`fetch_xml`] honours
//! that delay, falls back to exponential backoff for other transient
//! failures, and refuses bodies that are not XML.

use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, Response};
use reqwest::header::{CONTENT_TYPE, RETRY_AFTER};
use reqwest::StatusCode;

use crate::config::{
    HTTP_TIMEOUT_SECS, MAX_RETRIES, MAX_RETRY_AFTER_SECS, RETRY_BASE_DELAY_MS, USER_AGENT,
};
use crate::error::{HarvesterError, Result};

/// Create a configured HTTP client.
pub fn create_client() -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// What to do after one request attempt.
enum Attempt {
    Done(String),
    Retry { delay: Duration, reason: String },
}

/// Fetch an OAI-PMH response document.
///
/// A `503` carrying `Retry-After` waits for the server-given delay (capped at
/// [`MAX_RETRY_AFTER_SECS`]). Other 5xx responses and connection failures
/// back off exponentially. 4xx responses fail at once, as does a successful
/// response whose content type is not XML. The body is decoded as UTF-8 with
/// invalid sequences replaced.
pub fn fetch_xml(client: &Client, url: &str) -> Result<String> {
    let mut last_error = String::new();

    for attempt in 1..=MAX_RETRIES {
        let outcome = match client.get(url).send() {
            Ok(response) => inspect(response, url, attempt)?,
            Err(e) if e.is_connect() || e.is_timeout() => Attempt::Retry {
                delay: backoff(attempt),
                reason: e.to_string(),
            },
            Err(e) => return Err(HarvesterError::Http(e)),
        };

        match outcome {
            Attempt::Done(body) => return Ok(body),
            Attempt::Retry { delay, reason } => {
                if attempt < MAX_RETRIES {
                    tracing::warn!(
                        reason = %reason,
                        attempt,
                        max_retries = MAX_RETRIES,
                        delay_ms = delay.as_millis(),
                        "Transient failure, will retry"
                    );
                    thread::sleep(delay);
                }
                last_error = reason;
            }
        }
    }

    Err(HarvesterError::RetriesExhausted {
        attempts: MAX_RETRIES,
        message: last_error,
    })
}

fn inspect(response: Response, url: &str, attempt: u32) -> Result<Attempt> {
    let status = response.status();

    if status.is_server_error() {
        let requested = (status == StatusCode::SERVICE_UNAVAILABLE)
            .then(|| response.headers().get(RETRY_AFTER))
            .flatten()
            .and_then(|value| value.to_str().ok())
            .and_then(|value| parse_retry_after(value, Utc::now()));
        return Ok(Attempt::Retry {
            delay: requested.unwrap_or_else(|| backoff(attempt)),
            reason: format!("Server error: {status}"),
        });
    }

    let response = response.error_for_status()?;
    if let Some(content_type) = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    {
        if !is_xml_content_type(content_type) {
            return Err(HarvesterError::ContentType {
                url: url.to_string(),
                content_type: content_type.to_string(),
            });
        }
    }

    let bytes = response.bytes()?;
    Ok(Attempt::Done(String::from_utf8_lossy(&bytes).into_owned()))
}

/// Exponential backoff before the retry that follows `attempt`: 500ms, 1s, 2s.
fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(RETRY_BASE_DELAY_MS << (attempt - 1).min(16))
}

/// Parse a `Retry-After` value, either delay seconds or an HTTP date.
///
/// Dates in the past give a zero delay; anything longer than
/// [`MAX_RETRY_AFTER_SECS`] is capped.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use chrono::Utc;
/// use crosswalk_harvester::http::parse_retry_after;
///
/// assert_eq!(parse_retry_after("5", Utc::now()), Some(Duration::from_secs(5)));
/// assert_eq!(parse_retry_after("soon", Utc::now()), None);
/// ```
#[must_use]
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();
    let seconds = match value.parse::<u64>() {
        Ok(seconds) => seconds,
        Err(_) => {
            let at = DateTime::parse_from_rfc2822(value).ok()?;
            u64::try_from((at.with_timezone(&Utc) - now).num_seconds()).unwrap_or(0)
        }
    };
    Some(Duration::from_secs(seconds.min(MAX_RETRY_AFTER_SECS)))
}

/// Whether a `Content-Type` header names an XML media type.
///
/// # Examples
/// ```
/// use crosswalk_harvester::http::is_xml_content_type;
///
/// assert!(is_xml_content_type("text/xml; charset=UTF-8"));
/// assert!(!is_xml_content_type("text/html"));
/// ```
#[must_use]
pub fn is_xml_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence.ends_with("/xml") || essence.ends_with("+xml")
}
